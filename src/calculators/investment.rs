use crate::calculators::interest::{compound_amount, CompoundFrequency};
use crate::config::CalcConfig;
use crate::domain::model::Capped;
use crate::domain::ports::{Calculator, TabularResult};
use crate::utils::error::Result;
use crate::utils::export::rows_to_csv;
use crate::utils::validation::{validate_non_negative, validate_positive, validate_result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionTiming {
    Beginning,
    #[default]
    End,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentInput {
    #[serde(default)]
    pub initial_amount: f64,
    #[serde(default)]
    pub monthly_contribution: f64,
    pub annual_return_percent: f64,
    pub years: f64,
    #[serde(default = "default_frequency")]
    pub compound_frequency: CompoundFrequency,
    #[serde(default)]
    pub contribution_timing: ContributionTiming,
}

fn default_frequency() -> CompoundFrequency {
    CompoundFrequency::Monthly
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentYear {
    pub year: u32,
    pub total_contributed: f64,
    pub total_value: f64,
    pub total_return: f64,
    pub yearly_gain: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentResult {
    pub total_future_value: f64,
    pub total_contributions: f64,
    pub total_return: f64,
    pub return_percent: f64,
    pub average_annual_return_percent: Option<f64>,
    pub yearly_breakdown: Capped<InvestmentYear>,
}

/// Future value of level monthly contributions after `months`.
pub fn contributions_future_value(
    monthly: f64,
    annual_rate: f64,
    months: f64,
    timing: ContributionTiming,
) -> f64 {
    if monthly == 0.0 {
        return 0.0;
    }
    let r = annual_rate / 12.0;
    if r == 0.0 {
        return monthly * months;
    }
    let due_factor = match timing {
        ContributionTiming::Beginning => 1.0 + r,
        ContributionTiming::End => 1.0,
    };
    monthly * due_factor * ((1.0 + r).powf(months) - 1.0) / r
}

impl InvestmentInput {
    fn value_after(&self, annual_rate: f64, years: f64) -> f64 {
        compound_amount(
            self.initial_amount,
            annual_rate,
            self.compound_frequency.periods_per_year(),
            years,
        ) + contributions_future_value(
            self.monthly_contribution,
            annual_rate,
            years * 12.0,
            self.contribution_timing,
        )
    }
}

impl Calculator for InvestmentInput {
    type Output = InvestmentResult;

    fn compute(&self, config: &CalcConfig) -> Result<InvestmentResult> {
        let initial = validate_non_negative("initial_amount", self.initial_amount)?;
        let monthly = validate_non_negative("monthly_contribution", self.monthly_contribution)?;
        let rate = validate_non_negative("annual_return_percent", self.annual_return_percent)? / 100.0;
        let years = validate_positive("years", self.years)?;

        let total_future_value = validate_result("total_future_value", self.value_after(rate, years))?;
        let total_contributions = validate_result("total_contributions", initial + monthly * 12.0 * years)?;
        let total_return = total_future_value - total_contributions;
        let return_percent = if total_contributions > 0.0 {
            total_return / total_contributions * 100.0
        } else {
            0.0
        };
        let return_percent = validate_result("return_percent", return_percent)?;
        let average_annual_return_percent = (total_contributions > 0.0)
            .then(|| ((total_future_value / total_contributions).powf(1.0 / years) - 1.0) * 100.0)
            .map(|value| validate_result("average_annual_return_percent", value))
            .transpose()?;

        let whole_years = years.floor() as usize;
        let mut previous_return = 0.0;
        let yearly_breakdown = Capped::build(
            whole_years,
            config.limits.investment_breakdown_years,
            |index| {
                let year = index as u32 + 1;
                let total_value = self.value_after(rate, year as f64);
                let total_contributed = initial + monthly * 12.0 * year as f64;
                let total_return = total_value - total_contributed;
                let yearly_gain = total_return - previous_return;
                previous_return = total_return;
                InvestmentYear {
                    year,
                    total_contributed,
                    total_value,
                    total_return,
                    yearly_gain,
                }
            },
        );

        Ok(InvestmentResult {
            total_future_value,
            total_contributions,
            total_return,
            return_percent,
            average_annual_return_percent,
            yearly_breakdown,
        })
    }
}

#[derive(Debug, Serialize)]
struct InvestmentCsvRow {
    #[serde(rename = "Year")]
    year: u32,
    #[serde(rename = "Total Contributed")]
    total_contributed: String,
    #[serde(rename = "Total Value")]
    total_value: String,
    #[serde(rename = "Total Return")]
    total_return: String,
    #[serde(rename = "Yearly Gain")]
    yearly_gain: String,
}

impl TabularResult for InvestmentResult {
    fn export_name(&self) -> &'static str {
        "investment_growth.csv"
    }

    fn to_csv(&self) -> Result<String> {
        let rows: Vec<InvestmentCsvRow> = self
            .yearly_breakdown
            .rows
            .iter()
            .map(|r| InvestmentCsvRow {
                year: r.year,
                total_contributed: format!("{:.2}", r.total_contributed),
                total_value: format!("{:.2}", r.total_value),
                total_return: format!("{:.2}", r.total_return),
                yearly_gain: format!("{:.2}", r.yearly_gain),
            })
            .collect();
        rows_to_csv(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::CalcError;

    fn input(initial: f64, monthly: f64, rate: f64, years: f64) -> InvestmentInput {
        InvestmentInput {
            initial_amount: initial,
            monthly_contribution: monthly,
            annual_return_percent: rate,
            years,
            compound_frequency: CompoundFrequency::Monthly,
            contribution_timing: ContributionTiming::End,
        }
    }

    #[test]
    fn test_zero_return_is_sum_of_contributions() {
        let result = input(1000.0, 100.0, 0.0, 5.0)
            .compute(&CalcConfig::default())
            .unwrap();
        assert!((result.total_future_value - 7000.0).abs() < 1e-9);
        assert!(result.total_return.abs() < 1e-9);
        assert_eq!(result.yearly_breakdown.rows.len(), 5);
    }

    #[test]
    fn test_last_breakdown_row_matches_total() {
        let result = input(10_000.0, 250.0, 7.0, 12.0)
            .compute(&CalcConfig::default())
            .unwrap();
        let last = result.yearly_breakdown.rows.last().unwrap();
        assert_eq!(last.year, 12);
        assert!((last.total_value - result.total_future_value).abs() < 1e-6);
        let gains: f64 = result.yearly_breakdown.rows.iter().map(|r| r.yearly_gain).sum();
        assert!((gains - last.total_return).abs() < 1e-6);
    }

    #[test]
    fn test_annuity_due_beats_ordinary_annuity() {
        let end = contributions_future_value(100.0, 0.06, 120.0, ContributionTiming::End);
        let beginning = contributions_future_value(100.0, 0.06, 120.0, ContributionTiming::Beginning);
        assert!((beginning - end * 1.005).abs() < 1e-9);
        assert!((end - 16_387.93).abs() < 0.01);
    }

    #[test]
    fn test_breakdown_truncation_is_reported() {
        let result = input(1000.0, 0.0, 5.0, 40.0)
            .compute(&CalcConfig::default())
            .unwrap();
        assert_eq!(result.yearly_breakdown.rows.len(), 30);
        assert_eq!(result.yearly_breakdown.available, 40);
        assert!(result.yearly_breakdown.truncated);
    }

    #[test]
    fn test_overflowing_growth_is_an_error() {
        let result = input(1000.0, 100.0, 1e6, 1000.0).compute(&CalcConfig::default());
        assert!(matches!(result, Err(CalcError::Overflow { .. })));
    }

    #[test]
    fn test_invalid_years_rejected() {
        assert!(input(1000.0, 0.0, 5.0, 0.0)
            .compute(&CalcConfig::default())
            .is_err());
        assert!(input(1000.0, 0.0, -1.0, 3.0)
            .compute(&CalcConfig::default())
            .is_err());
    }

    #[test]
    fn test_csv_has_one_row_per_year() {
        let result = input(500.0, 50.0, 4.0, 3.0)
            .compute(&CalcConfig::default())
            .unwrap();
        let csv = result.to_csv().unwrap();
        assert!(csv.starts_with("Year,Total Contributed,Total Value,Total Return,Yearly Gain\n"));
        assert_eq!(csv.lines().count(), 4);
    }
}
