use crate::config::CalcConfig;
use crate::domain::ports::Calculator;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::validate_finite;
use serde::{Deserialize, Serialize};

/// Two-operand percentage questions. `value` is the percentage or the
/// part, `base` is the whole or the price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PercentageInput {
    PercentOf { percent: f64, base: f64 },
    IsWhatPercent { part: f64, whole: f64 },
    PercentChange { from: f64, to: f64 },
    PercentOff { percent: f64, price: f64 },
    Markup { percent: f64, price: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentageResult {
    pub kind: &'static str,
    pub question: String,
    pub answer: f64,
    pub formula: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_increase: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<f64>,
}

impl PercentageResult {
    fn plain(kind: &'static str, question: String, answer: f64, formula: String) -> Self {
        PercentageResult {
            kind,
            question,
            answer,
            formula,
            is_increase: None,
            adjustment: None,
        }
    }
}

impl Calculator for PercentageInput {
    type Output = PercentageResult;

    fn compute(&self, _config: &CalcConfig) -> Result<PercentageResult> {
        match *self {
            PercentageInput::PercentOf { percent, base } => {
                let percent = validate_finite("percent", percent)?;
                let base = validate_finite("base", base)?;
                let answer = percent / 100.0 * base;
                Ok(PercentageResult::plain(
                    "Basic Percentage",
                    format!("What is {}% of {}?", percent, base),
                    answer,
                    format!("({} ÷ 100) × {} = {:.2}", percent, base, answer),
                ))
            }
            PercentageInput::IsWhatPercent { part, whole } => {
                let part = validate_finite("part", part)?;
                let whole = validate_finite("whole", whole)?;
                if whole == 0.0 {
                    return Err(CalcError::division_by_zero("percentage of a zero whole"));
                }
                let answer = part / whole * 100.0;
                Ok(PercentageResult::plain(
                    "Percentage Of",
                    format!("{} is what percent of {}?", part, whole),
                    answer,
                    format!("({} ÷ {}) × 100 = {:.2}%", part, whole, answer),
                ))
            }
            PercentageInput::PercentChange { from, to } => {
                let from = validate_finite("from", from)?;
                let to = validate_finite("to", to)?;
                if from == 0.0 {
                    return Err(CalcError::division_by_zero("percentage change from 0"));
                }
                let answer = (to - from) / from * 100.0;
                Ok(PercentageResult {
                    is_increase: Some(answer >= 0.0),
                    ..PercentageResult::plain(
                        "Percentage Change",
                        format!("What is the percentage change from {} to {}?", from, to),
                        answer,
                        format!("(({} - {}) ÷ {}) × 100 = {:.2}%", to, from, from, answer),
                    )
                })
            }
            PercentageInput::PercentOff { percent, price } => {
                let percent = validate_finite("percent", percent)?;
                let price = validate_finite("price", price)?;
                let discount = percent / 100.0 * price;
                let answer = price - discount;
                Ok(PercentageResult {
                    adjustment: Some(-discount),
                    ..PercentageResult::plain(
                        "Percentage Discount",
                        format!("What is {}% off of {}?", percent, price),
                        answer,
                        format!(
                            "{} - ({}% × {}) = {} - {:.2} = {:.2}",
                            price, percent, price, price, discount, answer
                        ),
                    )
                })
            }
            PercentageInput::Markup { percent, price } => {
                let percent = validate_finite("percent", percent)?;
                let price = validate_finite("price", price)?;
                let markup = percent / 100.0 * price;
                let answer = price + markup;
                Ok(PercentageResult {
                    adjustment: Some(markup),
                    ..PercentageResult::plain(
                        "Percentage Markup",
                        format!("What is {} with {}% markup?", price, percent),
                        answer,
                        format!(
                            "{} + ({}% × {}) = {} + {:.2} = {:.2}",
                            price, percent, price, price, markup, answer
                        ),
                    )
                })
            }
        }
    }
}
