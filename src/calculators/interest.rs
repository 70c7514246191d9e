use crate::config::CalcConfig;
use crate::domain::ports::Calculator;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_negative, validate_positive, validate_result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundFrequency {
    #[default]
    Annually,
    SemiAnnually,
    Quarterly,
    Monthly,
    Weekly,
    Daily,
}

impl CompoundFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            CompoundFrequency::Annually => 1,
            CompoundFrequency::SemiAnnually => 2,
            CompoundFrequency::Quarterly => 4,
            CompoundFrequency::Monthly => 12,
            CompoundFrequency::Weekly => 52,
            CompoundFrequency::Daily => 365,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CompoundFrequency::Annually => "Annually",
            CompoundFrequency::SemiAnnually => "Semi-annually",
            CompoundFrequency::Quarterly => "Quarterly",
            CompoundFrequency::Monthly => "Monthly",
            CompoundFrequency::Weekly => "Weekly",
            CompoundFrequency::Daily => "Daily",
        }
    }
}

/// `P·(1 + r/k)^(k·t)`
pub fn compound_amount(principal: f64, annual_rate: f64, periods_per_year: u32, years: f64) -> f64 {
    let k = periods_per_year as f64;
    principal * (1.0 + annual_rate / k).powf(k * years)
}

/// `P·(1 + r·t)`
pub fn simple_amount(principal: f64, annual_rate: f64, years: f64) -> f64 {
    principal * (1.0 + annual_rate * years)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InterestInput {
    Simple {
        principal: f64,
        annual_rate_percent: f64,
        years: f64,
    },
    Compound {
        principal: f64,
        annual_rate_percent: f64,
        years: f64,
        #[serde(default)]
        frequency: CompoundFrequency,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterestResult {
    pub interest: f64,
    pub amount: f64,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<&'static str>,
}

impl Calculator for InterestInput {
    type Output = InterestResult;

    fn compute(&self, _config: &CalcConfig) -> Result<InterestResult> {
        match *self {
            InterestInput::Simple {
                principal,
                annual_rate_percent,
                years,
            } => {
                let p = validate_positive("principal", principal)?;
                let r = validate_non_negative("annual_rate_percent", annual_rate_percent)? / 100.0;
                let t = validate_non_negative("years", years)?;
                let amount = validate_result("amount", simple_amount(p, r, t))?;
                Ok(InterestResult {
                    interest: amount - p,
                    amount,
                    kind: "Simple Interest",
                    frequency: None,
                })
            }
            InterestInput::Compound {
                principal,
                annual_rate_percent,
                years,
                frequency,
            } => {
                let p = validate_positive("principal", principal)?;
                let r = validate_non_negative("annual_rate_percent", annual_rate_percent)? / 100.0;
                let t = validate_non_negative("years", years)?;
                let amount = validate_result("amount", compound_amount(p, r, frequency.periods_per_year(), t))?;
                Ok(InterestResult {
                    interest: amount - p,
                    amount,
                    kind: "Compound Interest",
                    frequency: Some(frequency.label()),
                })
            }
        }
    }
}
