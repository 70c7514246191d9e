use crate::config::CalcConfig;
use crate::domain::ports::Calculator;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::{validate_finite, validate_result};
use pest::error::LineColLocation;
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use serde::{Deserialize, Serialize};
use std::f64::consts::{E, PI};
use tracing::debug;

pub const MAX_FACTORIAL: u32 = 170;

#[derive(Parser)]
#[grammar = "calculators/expression.pest"]
struct ExpressionParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleMode {
    #[default]
    Degrees,
    Radians,
}

impl AngleMode {
    fn to_radians(self, angle: f64) -> f64 {
        match self {
            AngleMode::Degrees => angle.to_radians(),
            AngleMode::Radians => angle,
        }
    }

    fn from_radians(self, radians: f64) -> f64 {
        match self {
            AngleMode::Degrees => radians.to_degrees(),
            AngleMode::Radians => radians,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Modulo,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "×",
            BinaryOp::Divide => "÷",
            BinaryOp::Power => "^",
            BinaryOp::Modulo => "mod",
        }
    }

    pub fn apply(self, left: f64, right: f64) -> Result<f64> {
        let value = match self {
            BinaryOp::Add => left + right,
            BinaryOp::Subtract => left - right,
            BinaryOp::Multiply => left * right,
            BinaryOp::Divide => {
                if right == 0.0 {
                    return Err(CalcError::division_by_zero("division"));
                }
                left / right
            }
            BinaryOp::Power => left.powf(right),
            BinaryOp::Modulo => {
                if right == 0.0 {
                    return Err(CalcError::division_by_zero("modulo"));
                }
                left % right
            }
        };
        validate_result(self.symbol(), value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryFunction {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Log,
    Ln,
    Sqrt,
    Square,
    Cube,
    Factorial,
    Reciprocal,
    Abs,
    Negate,
}

impl UnaryFunction {
    pub fn name(self) -> &'static str {
        match self {
            UnaryFunction::Sin => "sin",
            UnaryFunction::Cos => "cos",
            UnaryFunction::Tan => "tan",
            UnaryFunction::Asin => "asin",
            UnaryFunction::Acos => "acos",
            UnaryFunction::Atan => "atan",
            UnaryFunction::Log => "log",
            UnaryFunction::Ln => "ln",
            UnaryFunction::Sqrt => "sqrt",
            UnaryFunction::Square => "square",
            UnaryFunction::Cube => "cube",
            UnaryFunction::Factorial => "factorial",
            UnaryFunction::Reciprocal => "reciprocal",
            UnaryFunction::Abs => "abs",
            UnaryFunction::Negate => "negate",
        }
    }

    /// Looks up a function by the name used inside expressions.
    pub fn from_name(name: &str) -> Option<Self> {
        let function = match name.to_ascii_lowercase().as_str() {
            "sin" => UnaryFunction::Sin,
            "cos" => UnaryFunction::Cos,
            "tan" => UnaryFunction::Tan,
            "asin" => UnaryFunction::Asin,
            "acos" => UnaryFunction::Acos,
            "atan" => UnaryFunction::Atan,
            "log" => UnaryFunction::Log,
            "ln" => UnaryFunction::Ln,
            "sqrt" => UnaryFunction::Sqrt,
            "square" | "sqr" => UnaryFunction::Square,
            "cube" => UnaryFunction::Cube,
            "factorial" | "fact" => UnaryFunction::Factorial,
            "reciprocal" | "recip" => UnaryFunction::Reciprocal,
            "abs" => UnaryFunction::Abs,
            "negate" | "neg" => UnaryFunction::Negate,
            _ => return None,
        };
        Some(function)
    }

    pub fn apply(self, value: f64, angle_mode: AngleMode) -> Result<f64> {
        let result = match self {
            UnaryFunction::Sin => angle_mode.to_radians(value).sin(),
            UnaryFunction::Cos => angle_mode.to_radians(value).cos(),
            UnaryFunction::Tan => angle_mode.to_radians(value).tan(),
            UnaryFunction::Asin | UnaryFunction::Acos => {
                if !(-1.0..=1.0).contains(&value) {
                    return Err(CalcError::out_of_domain(self.name(), "argument must be between -1 and 1"));
                }
                let radians = if self == UnaryFunction::Asin {
                    value.asin()
                } else {
                    value.acos()
                };
                angle_mode.from_radians(radians)
            }
            UnaryFunction::Atan => angle_mode.from_radians(value.atan()),
            UnaryFunction::Log | UnaryFunction::Ln => {
                if value <= 0.0 {
                    return Err(CalcError::out_of_domain(self.name(), "argument must be greater than 0"));
                }
                if self == UnaryFunction::Log {
                    value.log10()
                } else {
                    value.ln()
                }
            }
            UnaryFunction::Sqrt => {
                if value < 0.0 {
                    return Err(CalcError::out_of_domain("sqrt", "argument cannot be negative"));
                }
                value.sqrt()
            }
            UnaryFunction::Square => value * value,
            UnaryFunction::Cube => value * value * value,
            UnaryFunction::Factorial => factorial(value)?,
            UnaryFunction::Reciprocal => {
                if value == 0.0 {
                    return Err(CalcError::division_by_zero("reciprocal of 0"));
                }
                1.0 / value
            }
            UnaryFunction::Abs => value.abs(),
            UnaryFunction::Negate => -value,
        };
        validate_result(self.name(), result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => PI,
            Constant::E => E,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Constant::Pi => "π",
            Constant::E => "e",
        }
    }
}

pub fn factorial(value: f64) -> Result<f64> {
    if value < 0.0 || value.fract() != 0.0 {
        return Err(CalcError::out_of_domain(
            "factorial",
            "argument must be a non-negative integer",
        ));
    }
    if value > MAX_FACTORIAL as f64 {
        return Err(CalcError::overflow(format!("factorial is limited to {}!", MAX_FACTORIAL)));
    }
    Ok((2..=value as u32).fold(1.0, |acc, n| acc * n as f64))
}

/// Shortest rendering with at most ten decimals.
pub fn format_number(value: f64) -> String {
    if value != 0.0 && (value.abs() >= 1e15 || value.abs() < 1e-10) {
        return format!("{:e}", value);
    }
    let text = format!("{:.10}", value);
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text.as_str()
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

// Expression evaluation

fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>, expected: &str) -> Result<Pair<'i, Rule>> {
    pairs
        .next()
        .ok_or_else(|| CalcError::out_of_domain("expression", format!("expected {}", expected)))
}

fn eval_sum(pair: Pair<Rule>, mode: AngleMode) -> Result<f64> {
    let mut inner = pair.into_inner();
    let mut acc = eval_product(next_pair(&mut inner, "a term")?, mode)?;
    while let Some(op) = inner.next() {
        let rhs = eval_product(next_pair(&mut inner, "a term after an operator")?, mode)?;
        let op = if op.as_str() == "+" {
            BinaryOp::Add
        } else {
            BinaryOp::Subtract
        };
        acc = op.apply(acc, rhs)?;
    }
    Ok(acc)
}

fn eval_product(pair: Pair<Rule>, mode: AngleMode) -> Result<f64> {
    let mut inner = pair.into_inner();
    let mut acc = eval_unary(next_pair(&mut inner, "a factor")?, mode)?;
    while let Some(op) = inner.next() {
        let rhs = eval_unary(next_pair(&mut inner, "a factor after an operator")?, mode)?;
        let op = match op.as_str() {
            "*" | "×" => BinaryOp::Multiply,
            "/" | "÷" => BinaryOp::Divide,
            _ => BinaryOp::Modulo,
        };
        acc = op.apply(acc, rhs)?;
    }
    Ok(acc)
}

fn eval_unary(pair: Pair<Rule>, mode: AngleMode) -> Result<f64> {
    let mut negations = 0;
    for child in pair.into_inner() {
        match child.as_rule() {
            Rule::neg => negations += 1,
            Rule::power => {
                let value = eval_power(child, mode)?;
                return Ok(if negations % 2 == 1 { -value } else { value });
            }
            _ => break,
        }
    }
    Err(CalcError::out_of_domain("expression", "expected a value"))
}

fn eval_power(pair: Pair<Rule>, mode: AngleMode) -> Result<f64> {
    let mut inner = pair.into_inner();
    let base = eval_postfix(next_pair(&mut inner, "a value")?, mode)?;
    match inner.next() {
        Some(exponent) => BinaryOp::Power.apply(base, eval_unary(exponent, mode)?),
        None => Ok(base),
    }
}

fn eval_postfix(pair: Pair<Rule>, mode: AngleMode) -> Result<f64> {
    let mut inner = pair.into_inner();
    let mut value = eval_primary(next_pair(&mut inner, "a value")?, mode)?;
    for _bang in inner {
        value = factorial(value)?;
    }
    Ok(value)
}

fn eval_primary(pair: Pair<Rule>, mode: AngleMode) -> Result<f64> {
    match pair.as_rule() {
        Rule::number => pair.as_str().parse::<f64>().map_err(|_| CalcError::ParseError {
            field: "expression".to_string(),
            value: pair.as_str().to_string(),
        }),
        Rule::constant => Ok(match pair.as_str() {
            "e" => E,
            _ => PI,
        }),
        Rule::call => {
            let mut inner = pair.into_inner();
            let name = next_pair(&mut inner, "a function name")?;
            let function = UnaryFunction::from_name(name.as_str()).ok_or_else(|| {
                CalcError::out_of_domain("expression", format!("unknown function '{}'", name.as_str()))
            })?;
            let argument = eval_sum(next_pair(&mut inner, "a function argument")?, mode)?;
            function.apply(argument, mode)
        }
        Rule::sum => eval_sum(pair, mode),
        other => Err(CalcError::out_of_domain(
            "expression",
            format!("unexpected {:?}", other),
        )),
    }
}

/// Evaluates an infix expression such as `2 * sin(30) + 5!`.
pub fn evaluate(expression: &str, mode: AngleMode) -> Result<f64> {
    let mut pairs = ExpressionParser::parse(Rule::expression, expression).map_err(|e| {
        debug!(error = %e, "Expression failed to parse");
        let column = match e.line_col {
            LineColLocation::Pos((_, col)) | LineColLocation::Span((_, col), _) => col,
        };
        CalcError::out_of_domain("expression", format!("syntax error at column {}", column))
    })?;

    let root = next_pair(&mut pairs, "an expression")?;
    let sum = next_pair(&mut root.into_inner(), "an expression")?;
    eval_sum(sum, mode)
}

// Calculator surface

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScientificInput {
    Binary {
        left: f64,
        operation: BinaryOp,
        right: f64,
    },
    Function {
        function: UnaryFunction,
        value: f64,
        #[serde(default)]
        angle_mode: AngleMode,
    },
    Constant {
        constant: Constant,
    },
    Expression {
        expression: String,
        #[serde(default)]
        angle_mode: AngleMode,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScientificResult {
    pub value: f64,
    pub display: String,
    /// History line in the form `lhs = result`.
    pub history_entry: String,
}

impl Calculator for ScientificInput {
    type Output = ScientificResult;

    fn compute(&self, _config: &CalcConfig) -> Result<ScientificResult> {
        let (label, value) = match self {
            ScientificInput::Binary {
                left,
                operation,
                right,
            } => {
                let left = validate_finite("left", *left)?;
                let right = validate_finite("right", *right)?;
                (
                    format!("{} {} {}", format_number(left), operation.symbol(), format_number(right)),
                    operation.apply(left, right)?,
                )
            }
            ScientificInput::Function {
                function,
                value,
                angle_mode,
            } => {
                let value = validate_finite("value", *value)?;
                (
                    format!("{}({})", function.name(), format_number(value)),
                    function.apply(value, *angle_mode)?,
                )
            }
            ScientificInput::Constant { constant } => (constant.symbol().to_string(), constant.value()),
            ScientificInput::Expression {
                expression,
                angle_mode,
            } => {
                if expression.trim().is_empty() {
                    return Err(CalcError::MissingField {
                        field: "expression".to_string(),
                    });
                }
                (expression.trim().to_string(), evaluate(expression, *angle_mode)?)
            }
        };

        let display = format_number(value);
        Ok(ScientificResult {
            value,
            history_entry: format!("{} = {}", label, display),
            display,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expression: &str) -> f64 {
        evaluate(expression, AngleMode::Degrees).unwrap()
    }

    #[test]
    fn test_binary_operations() {
        assert_eq!(BinaryOp::Power.apply(2.0, 10.0).unwrap(), 1024.0);
        assert_eq!(BinaryOp::Modulo.apply(10.0, 3.0).unwrap(), 1.0);
        assert!(matches!(
            BinaryOp::Divide.apply(1.0, 0.0),
            Err(CalcError::DivisionByZero { .. })
        ));
        assert!(BinaryOp::Modulo.apply(1.0, 0.0).is_err());
    }

    #[test]
    fn test_trig_in_both_angle_modes() {
        let deg = UnaryFunction::Sin.apply(30.0, AngleMode::Degrees).unwrap();
        assert!((deg - 0.5).abs() < 1e-12);
        let rad = UnaryFunction::Cos.apply(PI, AngleMode::Radians).unwrap();
        assert!((rad + 1.0).abs() < 1e-12);
        let angle = UnaryFunction::Atan.apply(1.0, AngleMode::Degrees).unwrap();
        assert!((angle - 45.0).abs() < 1e-9);
        assert!(UnaryFunction::Asin.apply(2.0, AngleMode::Degrees).is_err());
    }

    #[test]
    fn test_domain_errors() {
        assert!(UnaryFunction::Log.apply(0.0, AngleMode::Degrees).is_err());
        assert!(UnaryFunction::Ln.apply(-1.0, AngleMode::Degrees).is_err());
        assert!(UnaryFunction::Sqrt.apply(-4.0, AngleMode::Degrees).is_err());
        assert!(UnaryFunction::Reciprocal.apply(0.0, AngleMode::Degrees).is_err());
        assert!(factorial(2.5).is_err());
        assert!(matches!(factorial(171.0), Err(CalcError::Overflow { .. })));
    }

    #[test]
    fn test_factorial_bounds() {
        assert_eq!(factorial(0.0).unwrap(), 1.0);
        assert_eq!(factorial(5.0).unwrap(), 120.0);
        assert!(factorial(170.0).unwrap().is_finite());
    }

    #[test]
    fn test_expression_precedence() {
        assert_eq!(eval("2 + 3 * 4"), 14.0);
        assert_eq!(eval("(2 + 3) * 4"), 20.0);
        assert_eq!(eval("2 ^ 3 ^ 2"), 512.0);
        assert_eq!(eval("-2 ^ 2"), -4.0);
        assert_eq!(eval("2 ^ -1"), 0.5);
        assert_eq!(eval("10 - 4 - 3"), 3.0);
        assert_eq!(eval("17 mod 5 + 3!"), 8.0);
        assert_eq!(eval("1.5e2 / .5"), 300.0);
    }

    #[test]
    fn test_expression_functions_and_constants() {
        assert!((eval("2 * sin(30)") - 1.0).abs() < 1e-12);
        assert!((eval("ln(e)") - 1.0).abs() < 1e-12);
        assert!((eval("cos(pi)") - 0.99849714).abs() < 1e-6);
        assert!((evaluate("cos(pi)", AngleMode::Radians).unwrap() + 1.0).abs() < 1e-12);
        assert!((eval("sqrt(16) + square(3) + log(1000)") - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_expression_errors() {
        assert!(evaluate("1 / (2 - 2)", AngleMode::Degrees).is_err());
        assert!(evaluate("foo(2)", AngleMode::Degrees).is_err());
        assert!(evaluate("2 +", AngleMode::Degrees).is_err());
        assert!(evaluate("sqrt(-1)", AngleMode::Degrees).is_err());
        assert!(evaluate("(3.5)!", AngleMode::Degrees).is_err());
    }

    #[test]
    fn test_calculator_history_entry() {
        let input: ScientificInput =
            serde_json::from_str(r#"{"mode": "binary", "left": 7, "operation": "divide", "right": 2}"#).unwrap();
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert_eq!(result.value, 3.5);
        assert_eq!(result.history_entry, "7 ÷ 2 = 3.5");

        let input = ScientificInput::Function {
            function: UnaryFunction::Factorial,
            value: 6.0,
            angle_mode: AngleMode::Degrees,
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert_eq!(result.history_entry, "factorial(6) = 720");

        let input = ScientificInput::Constant { constant: Constant::Pi };
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert_eq!(result.display, "3.1415926536");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(1e20), "1e20");
    }
}
