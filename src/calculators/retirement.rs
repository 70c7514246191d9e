use crate::config::CalcConfig;
use crate::domain::ports::Calculator;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::{validate_non_negative, validate_positive, validate_result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementInput {
    pub current_age: f64,
    #[serde(default = "default_retirement_age")]
    pub retirement_age: f64,
    #[serde(default)]
    pub current_savings: f64,
    #[serde(default)]
    pub monthly_contribution: f64,
    #[serde(default = "default_return")]
    pub expected_return_percent: f64,
    #[serde(default)]
    pub retirement_goal: f64,
    #[serde(default = "default_inflation")]
    pub inflation_percent: f64,
}

fn default_retirement_age() -> f64 {
    65.0
}

fn default_return() -> f64 {
    7.0
}

fn default_inflation() -> f64 {
    3.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetirementResult {
    pub years_to_retirement: f64,
    pub current_savings_future_value: f64,
    pub contributions_future_value: f64,
    pub total_at_retirement: f64,
    pub inflation_adjusted_value: f64,
    pub inflation_adjusted_goal: f64,
    pub shortfall: f64,
    pub surplus: f64,
    pub required_monthly_contribution: f64,
}

impl Calculator for RetirementInput {
    type Output = RetirementResult;

    fn compute(&self, _config: &CalcConfig) -> Result<RetirementResult> {
        let age = validate_non_negative("current_age", self.current_age)?;
        let retirement_age = validate_positive("retirement_age", self.retirement_age)?;
        if age >= retirement_age {
            return Err(CalcError::out_of_domain(
                "retirement_age",
                "must be greater than current age",
            ));
        }
        let savings = validate_non_negative("current_savings", self.current_savings)?;
        let monthly = validate_non_negative("monthly_contribution", self.monthly_contribution)?;
        let annual_return = validate_non_negative("expected_return_percent", self.expected_return_percent)? / 100.0;
        let goal = validate_non_negative("retirement_goal", self.retirement_goal)?;
        let inflation = validate_non_negative("inflation_percent", self.inflation_percent)? / 100.0;

        let years = retirement_age - age;
        let monthly_return = annual_return / 12.0;
        let months = years * 12.0;
        let annuity_factor = if monthly_return > 0.0 {
            ((1.0 + monthly_return).powf(months) - 1.0) / monthly_return
        } else {
            months
        };

        let current_savings_future_value = validate_result(
            "current_savings_future_value",
            savings * (1.0 + annual_return).powf(years),
        )?;
        let contributions_future_value = validate_result("contributions_future_value", monthly * annuity_factor)?;
        let total_at_retirement = validate_result(
            "total_at_retirement",
            current_savings_future_value + contributions_future_value,
        )?;

        let inflation_growth = validate_result("inflation_percent", (1.0 + inflation).powf(years))?;
        let inflation_adjusted_goal = validate_result("inflation_adjusted_goal", goal * inflation_growth)?;
        let gap = inflation_adjusted_goal - total_at_retirement;

        let required_monthly_contribution = if goal > 0.0 && gap > 0.0 {
            validate_result(
                "required_monthly_contribution",
                ((inflation_adjusted_goal - current_savings_future_value) / annuity_factor).max(0.0),
            )?
        } else {
            0.0
        };

        Ok(RetirementResult {
            years_to_retirement: years,
            current_savings_future_value,
            contributions_future_value,
            total_at_retirement,
            inflation_adjusted_value: total_at_retirement / inflation_growth,
            inflation_adjusted_goal,
            shortfall: gap.max(0.0),
            surplus: (-gap).max(0.0),
            required_monthly_contribution,
        })
    }
}
