use crate::config::CalcConfig;
use crate::domain::ports::Calculator;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::{validate_non_negative, validate_range};
use serde::{Deserialize, Serialize};

const WEEKS_PER_YEAR: f64 = 52.0;
const WORKING_DAYS_PER_YEAR: f64 = 260.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayPeriod {
    #[default]
    Annual,
    Monthly,
    Biweekly,
    Weekly,
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryInput {
    pub amount: f64,
    #[serde(default)]
    pub period: PayPeriod,
    #[serde(default = "default_hours")]
    pub hours_per_week: f64,
}

fn default_hours() -> f64 {
    40.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryResult {
    pub annual: f64,
    pub monthly: f64,
    pub biweekly: f64,
    pub weekly: f64,
    pub daily: f64,
    pub hourly: f64,
}

impl Calculator for SalaryInput {
    type Output = SalaryResult;

    fn compute(&self, _config: &CalcConfig) -> Result<SalaryResult> {
        let amount = validate_non_negative("amount", self.amount)?;
        let hours = validate_range("hours_per_week", self.hours_per_week, 0.0, 168.0)?;
        if hours == 0.0 {
            return Err(CalcError::out_of_domain(
                "hours_per_week",
                "must be greater than 0",
            ));
        }

        let annual = match self.period {
            PayPeriod::Annual => amount,
            PayPeriod::Monthly => amount * 12.0,
            PayPeriod::Biweekly => amount * 26.0,
            PayPeriod::Weekly => amount * WEEKS_PER_YEAR,
            PayPeriod::Daily => amount * WORKING_DAYS_PER_YEAR,
            PayPeriod::Hourly => amount * hours * WEEKS_PER_YEAR,
        };

        Ok(SalaryResult {
            annual,
            monthly: annual / 12.0,
            biweekly: annual / 26.0,
            weekly: annual / WEEKS_PER_YEAR,
            daily: annual / WORKING_DAYS_PER_YEAR,
            hourly: annual / (hours * WEEKS_PER_YEAR),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hourly_to_annual() {
        let input = SalaryInput {
            amount: 25.0,
            period: PayPeriod::Hourly,
            hours_per_week: 40.0,
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert_eq!(result.annual, 52_000.0);
        assert_eq!(result.weekly, 1000.0);
        assert_eq!(result.daily, 200.0);
        assert_eq!(result.hourly, 25.0);
    }

    #[test]
    fn test_annual_breakdown() {
        let input = SalaryInput {
            amount: 78_000.0,
            period: PayPeriod::Annual,
            hours_per_week: 40.0,
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert_eq!(result.monthly, 6500.0);
        assert_eq!(result.biweekly, 3000.0);
        assert_eq!(result.hourly, 37.5);
    }

    #[test]
    fn test_zero_hours_rejected() {
        let input = SalaryInput {
            amount: 1000.0,
            period: PayPeriod::Weekly,
            hours_per_week: 0.0,
        };
        assert!(input.compute(&CalcConfig::default()).is_err());
    }
}
