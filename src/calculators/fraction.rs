use crate::config::CalcConfig;
use crate::domain::ports::Calculator;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::validate_finite;
use serde::{Deserialize, Serialize};

const MAX_CONTINUED_FRACTION_TERMS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: i64,
    pub denominator: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MixedNumber {
    pub whole: i64,
    pub numerator: i64,
    pub denominator: i64,
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

fn checked(value: Option<i64>, context: &str) -> Result<i64> {
    value.ok_or_else(|| CalcError::overflow(context))
}

impl Fraction {
    pub fn new(numerator: i64, denominator: i64) -> Result<Self> {
        if denominator == 0 {
            return Err(CalcError::division_by_zero("fraction with denominator 0"));
        }
        Ok(Fraction {
            numerator,
            denominator,
        })
    }

    /// Lowest terms with a positive denominator.
    pub fn reduce(self) -> Result<Self> {
        let Fraction {
            numerator,
            denominator,
        } = Fraction::new(self.numerator, self.denominator)?;
        let divisor = gcd(numerator.unsigned_abs(), denominator.unsigned_abs());
        let divisor = i64::try_from(divisor).map_err(|_| CalcError::overflow("reducing fraction"))?;
        let (mut n, mut d) = (numerator / divisor, denominator / divisor);
        if d < 0 {
            n = checked(n.checked_neg(), "normalizing sign")?;
            d = checked(d.checked_neg(), "normalizing sign")?;
        }
        Ok(Fraction {
            numerator: n,
            denominator: d,
        })
    }

    pub fn value(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    pub fn to_mixed(self) -> MixedNumber {
        let n = self.numerator.unsigned_abs();
        let d = self.denominator.unsigned_abs();
        if n < d {
            return MixedNumber {
                whole: 0,
                numerator: self.numerator,
                denominator: self.denominator,
            };
        }
        let whole = (n / d) as i64;
        let negative = (self.numerator < 0) != (self.denominator < 0);
        MixedNumber {
            whole: if negative { -whole } else { whole },
            numerator: (n % d) as i64,
            denominator: d as i64,
        }
    }

    pub fn checked_add(self, other: Fraction) -> Result<Fraction> {
        let left = checked(self.numerator.checked_mul(other.denominator), "fraction addition")?;
        let right = checked(other.numerator.checked_mul(self.denominator), "fraction addition")?;
        Fraction::new(
            checked(left.checked_add(right), "fraction addition")?,
            checked(self.denominator.checked_mul(other.denominator), "fraction addition")?,
        )
    }

    pub fn checked_sub(self, other: Fraction) -> Result<Fraction> {
        let left = checked(self.numerator.checked_mul(other.denominator), "fraction subtraction")?;
        let right = checked(other.numerator.checked_mul(self.denominator), "fraction subtraction")?;
        Fraction::new(
            checked(left.checked_sub(right), "fraction subtraction")?,
            checked(self.denominator.checked_mul(other.denominator), "fraction subtraction")?,
        )
    }

    pub fn checked_mul(self, other: Fraction) -> Result<Fraction> {
        Fraction::new(
            checked(self.numerator.checked_mul(other.numerator), "fraction multiplication")?,
            checked(self.denominator.checked_mul(other.denominator), "fraction multiplication")?,
        )
    }

    pub fn checked_div(self, other: Fraction) -> Result<Fraction> {
        if other.numerator == 0 {
            return Err(CalcError::division_by_zero("division by a zero fraction"));
        }
        Fraction::new(
            checked(self.numerator.checked_mul(other.denominator), "fraction division")?,
            checked(self.denominator.checked_mul(other.numerator), "fraction division")?,
        )
    }
}

/// Continued-fraction approximation of `decimal` within `|decimal| * tolerance`.
pub fn decimal_to_fraction(decimal: f64, tolerance: f64) -> Result<Fraction> {
    let decimal = validate_finite("decimal", decimal)?;
    if decimal == 0.0 {
        return Ok(Fraction {
            numerator: 0,
            denominator: 1,
        });
    }

    let target = decimal.abs();
    let (mut h1, mut h2, mut k1, mut k2): (i64, i64, i64, i64) = (1, 0, 0, 1);
    let mut b = target;

    for _ in 0..MAX_CONTINUED_FRACTION_TERMS {
        let a = b.floor();
        if a >= i64::MAX as f64 {
            return Err(CalcError::overflow("decimal to fraction"));
        }
        let a = a as i64;
        let h = checked(a.checked_mul(h1).and_then(|v| v.checked_add(h2)), "decimal to fraction")?;
        let k = checked(a.checked_mul(k1).and_then(|v| v.checked_add(k2)), "decimal to fraction")?;
        h2 = h1;
        h1 = h;
        k2 = k1;
        k1 = k;

        let remainder = b - a as f64;
        if (target - h1 as f64 / k1 as f64).abs() <= target * tolerance || remainder == 0.0 {
            break;
        }
        b = 1.0 / remainder;
    }

    let numerator = if decimal < 0.0 { -h1 } else { h1 };
    Fraction::new(numerator, k1)?.reduce()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractionOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl FractionOp {
    pub fn symbol(self) -> char {
        match self {
            FractionOp::Add => '+',
            FractionOp::Subtract => '-',
            FractionOp::Multiply => '×',
            FractionOp::Divide => '÷',
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FractionInput {
    Arithmetic {
        left: Fraction,
        operation: FractionOp,
        right: Fraction,
    },
    Simplify {
        fraction: Fraction,
    },
    FromDecimal {
        decimal: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FractionResult {
    pub expression: String,
    pub original: Fraction,
    pub reduced: Fraction,
    pub mixed: MixedNumber,
    pub decimal: f64,
}

impl FractionResult {
    fn from_fraction(expression: String, original: Fraction) -> Result<Self> {
        let reduced = original.reduce()?;
        Ok(FractionResult {
            expression,
            original,
            reduced,
            mixed: reduced.to_mixed(),
            decimal: reduced.value(),
        })
    }
}

impl Calculator for FractionInput {
    type Output = FractionResult;

    fn compute(&self, config: &CalcConfig) -> Result<FractionResult> {
        match *self {
            FractionInput::Arithmetic {
                left,
                operation,
                right,
            } => {
                let left = Fraction::new(left.numerator, left.denominator)?;
                let right = Fraction::new(right.numerator, right.denominator)?;
                let original = match operation {
                    FractionOp::Add => left.checked_add(right)?,
                    FractionOp::Subtract => left.checked_sub(right)?,
                    FractionOp::Multiply => left.checked_mul(right)?,
                    FractionOp::Divide => left.checked_div(right)?,
                };
                let expression = format!(
                    "{}/{} {} {}/{}",
                    left.numerator,
                    left.denominator,
                    operation.symbol(),
                    right.numerator,
                    right.denominator
                );
                FractionResult::from_fraction(expression, original)
            }
            FractionInput::Simplify { fraction } => {
                let original = Fraction::new(fraction.numerator, fraction.denominator)?;
                FractionResult::from_fraction(
                    format!("{}/{}", original.numerator, original.denominator),
                    original,
                )
            }
            FractionInput::FromDecimal { decimal } => {
                let original = decimal_to_fraction(decimal, config.limits.fraction_tolerance)?;
                FractionResult::from_fraction(decimal.to_string(), original)
            }
        }
    }
}
