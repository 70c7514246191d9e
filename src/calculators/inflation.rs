use crate::config::CalcConfig;
use crate::domain::model::Capped;
use crate::domain::ports::{Calculator, TabularResult};
use crate::utils::error::{CalcError, Result};
use crate::utils::export::rows_to_csv;
use crate::utils::validation::{validate_finite, validate_positive, validate_result};
use serde::{Deserialize, Serialize};

/// Approximate annual US CPI inflation, percent.
const HISTORICAL_RATES: [(i32, f64); 24] = [
    (2000, 3.4),
    (2001, 2.8),
    (2002, 1.6),
    (2003, 2.3),
    (2004, 2.7),
    (2005, 3.4),
    (2006, 3.2),
    (2007, 2.8),
    (2008, 3.8),
    (2009, -0.4),
    (2010, 1.5),
    (2011, 3.1),
    (2012, 2.1),
    (2013, 1.5),
    (2014, 1.6),
    (2015, 0.1),
    (2016, 1.3),
    (2017, 2.1),
    (2018, 2.4),
    (2019, 1.8),
    (2020, 1.2),
    (2021, 4.7),
    (2022, 8.0),
    (2023, 3.2),
];

pub fn historical_rate(year: i32) -> Option<f64> {
    HISTORICAL_RATES
        .iter()
        .find(|(y, _)| *y == year)
        .map(|(_, rate)| *rate)
}

pub fn historical_year_range() -> (i32, i32) {
    (HISTORICAL_RATES[0].0, HISTORICAL_RATES[HISTORICAL_RATES.len() - 1].0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InflationInput {
    FutureValue {
        amount: f64,
        rate_percent: f64,
        years: f64,
    },
    PastValue {
        final_amount: f64,
        rate_percent: f64,
        years: f64,
    },
    Historical {
        amount: f64,
        start_year: i32,
        end_year: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InflationYear {
    pub year: u32,
    pub equivalent_value: f64,
    pub inflation_loss: f64,
    pub purchasing_power_loss_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalYear {
    pub year: i32,
    pub rate_percent: f64,
    pub cumulative_inflation_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InflationResult {
    FutureValue {
        initial_amount: f64,
        future_value: f64,
        total_inflation: f64,
        cumulative_inflation_percent: f64,
        purchasing_power_loss_percent: f64,
        yearly_breakdown: Capped<InflationYear>,
    },
    PastValue {
        final_amount: f64,
        past_value: f64,
        inflation_increase: f64,
        cumulative_inflation_percent: f64,
        years: f64,
    },
    Historical {
        initial_amount: f64,
        final_value: f64,
        total_inflation: f64,
        cumulative_inflation_percent: f64,
        start_year: i32,
        end_year: i32,
        yearly_data: Vec<HistoricalYear>,
    },
}

fn validate_rate(rate_percent: f64) -> Result<f64> {
    validate_finite("rate_percent", rate_percent)?;
    if rate_percent <= -100.0 {
        return Err(CalcError::out_of_domain("rate_percent", "must be greater than -100"));
    }
    Ok(rate_percent / 100.0)
}

impl Calculator for InflationInput {
    type Output = InflationResult;

    fn compute(&self, config: &CalcConfig) -> Result<InflationResult> {
        match *self {
            InflationInput::FutureValue {
                amount,
                rate_percent,
                years,
            } => {
                let amount = validate_positive("amount", amount)?;
                let rate = validate_rate(rate_percent)?;
                let years = validate_positive("years", years)?;

                let future_value = validate_result("future_value", amount * (1.0 + rate).powf(years))?;
                let yearly_breakdown = Capped::build(
                    years.floor() as usize,
                    config.limits.inflation_breakdown_years,
                    |index| {
                        let year = index as u32 + 1;
                        let equivalent_value = amount * (1.0 + rate).powi(year as i32);
                        InflationYear {
                            year,
                            equivalent_value,
                            inflation_loss: equivalent_value - amount,
                            purchasing_power_loss_percent: (equivalent_value / amount - 1.0) * 100.0,
                        }
                    },
                );

                Ok(InflationResult::FutureValue {
                    initial_amount: amount,
                    future_value,
                    total_inflation: future_value - amount,
                    cumulative_inflation_percent: (future_value / amount - 1.0) * 100.0,
                    purchasing_power_loss_percent: 100.0 - amount / future_value * 100.0,
                    yearly_breakdown,
                })
            }
            InflationInput::PastValue {
                final_amount,
                rate_percent,
                years,
            } => {
                let final_amount = validate_positive("final_amount", final_amount)?;
                let rate = validate_rate(rate_percent)?;
                let years = validate_positive("years", years)?;

                let past_value = validate_result("past_value", final_amount / (1.0 + rate).powf(years))?;
                let cumulative_inflation_percent =
                    validate_result("cumulative_inflation_percent", (final_amount / past_value - 1.0) * 100.0)?;
                Ok(InflationResult::PastValue {
                    final_amount,
                    past_value,
                    inflation_increase: final_amount - past_value,
                    cumulative_inflation_percent,
                    years,
                })
            }
            InflationInput::Historical {
                amount,
                start_year,
                end_year,
            } => {
                let amount = validate_positive("amount", amount)?;
                let (first, last) = historical_year_range();
                if start_year >= end_year {
                    return Err(CalcError::out_of_domain("start_year", "must be before end_year"));
                }
                if start_year < first || end_year > last {
                    return Err(CalcError::out_of_domain(
                        "start_year",
                        format!("historical data covers {} to {}", first, last),
                    ));
                }

                let mut cumulative = 1.0;
                let mut yearly_data = Vec::new();
                for year in start_year..end_year {
                    let rate_percent = historical_rate(year).ok_or_else(|| {
                        CalcError::out_of_domain("start_year", format!("no data for {}", year))
                    })?;
                    cumulative *= 1.0 + rate_percent / 100.0;
                    yearly_data.push(HistoricalYear {
                        year,
                        rate_percent,
                        cumulative_inflation_percent: (cumulative - 1.0) * 100.0,
                    });
                }

                let final_value = amount * cumulative;
                Ok(InflationResult::Historical {
                    initial_amount: amount,
                    final_value,
                    total_inflation: final_value - amount,
                    cumulative_inflation_percent: (cumulative - 1.0) * 100.0,
                    start_year,
                    end_year,
                    yearly_data,
                })
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct InflationCsvRow {
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "Value")]
    value: String,
    #[serde(rename = "Cumulative Inflation (%)")]
    cumulative: String,
}

impl TabularResult for InflationResult {
    fn export_name(&self) -> &'static str {
        "inflation_breakdown.csv"
    }

    fn to_csv(&self) -> Result<String> {
        let rows: Vec<InflationCsvRow> = match self {
            InflationResult::FutureValue {
                yearly_breakdown, ..
            } => yearly_breakdown
                .rows
                .iter()
                .map(|r| InflationCsvRow {
                    year: r.year.to_string(),
                    value: format!("{:.2}", r.equivalent_value),
                    cumulative: format!("{:.2}", r.purchasing_power_loss_percent),
                })
                .collect(),
            InflationResult::Historical {
                initial_amount,
                yearly_data,
                ..
            } => yearly_data
                .iter()
                .map(|r| InflationCsvRow {
                    year: r.year.to_string(),
                    value: format!("{:.2}", initial_amount * (1.0 + r.cumulative_inflation_percent / 100.0)),
                    cumulative: format!("{:.2}", r.cumulative_inflation_percent),
                })
                .collect(),
            InflationResult::PastValue { .. } => Vec::new(),
        };
        rows_to_csv(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_future_value() {
        let input = InflationInput::FutureValue {
            amount: 100.0,
            rate_percent: 3.0,
            years: 10.0,
        };
        match input.compute(&CalcConfig::default()).unwrap() {
            InflationResult::FutureValue {
                future_value,
                yearly_breakdown,
                ..
            } => {
                assert!((future_value - 134.391638).abs() < 1e-5);
                assert_eq!(yearly_breakdown.rows.len(), 10);
                assert!(!yearly_breakdown.truncated);
                let last = yearly_breakdown.rows.last().unwrap();
                assert!((last.equivalent_value - future_value).abs() < 1e-9);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_future_value_breakdown_is_capped() {
        let input = InflationInput::FutureValue {
            amount: 100.0,
            rate_percent: 2.0,
            years: 75.0,
        };
        match input.compute(&CalcConfig::default()).unwrap() {
            InflationResult::FutureValue {
                yearly_breakdown, ..
            } => {
                assert_eq!(yearly_breakdown.rows.len(), 50);
                assert_eq!(yearly_breakdown.cap, 50);
                assert!(yearly_breakdown.truncated);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_past_value_inverts_future_value() {
        let input = InflationInput::PastValue {
            final_amount: 134.391638,
            rate_percent: 3.0,
            years: 10.0,
        };
        match input.compute(&CalcConfig::default()).unwrap() {
            InflationResult::PastValue { past_value, .. } => assert!((past_value - 100.0).abs() < 1e-5),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_overflowing_rate_is_an_error() {
        let future = InflationInput::FutureValue {
            amount: 100.0,
            rate_percent: 1e6,
            years: 1000.0,
        };
        assert!(matches!(
            future.compute(&CalcConfig::default()),
            Err(CalcError::Overflow { .. })
        ));

        let past = InflationInput::PastValue {
            final_amount: 100.0,
            rate_percent: 1e6,
            years: 1000.0,
        };
        assert!(matches!(
            past.compute(&CalcConfig::default()),
            Err(CalcError::Overflow { .. })
        ));
    }

    #[test]
    fn test_historical_compounds_each_year() {
        let input = InflationInput::Historical {
            amount: 1000.0,
            start_year: 2020,
            end_year: 2022,
        };
        match input.compute(&CalcConfig::default()).unwrap() {
            InflationResult::Historical {
                final_value,
                yearly_data,
                ..
            } => {
                assert_eq!(yearly_data.len(), 2);
                assert!((final_value - 1000.0 * 1.012 * 1.047).abs() < 1e-9);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_historical_rejects_unknown_years() {
        let config = CalcConfig::default();
        let reversed = InflationInput::Historical {
            amount: 1000.0,
            start_year: 2010,
            end_year: 2005,
        };
        assert!(reversed.compute(&config).is_err());

        let out_of_range = InflationInput::Historical {
            amount: 1000.0,
            start_year: 1990,
            end_year: 2005,
        };
        assert!(out_of_range.compute(&config).is_err());
    }

    #[test]
    fn test_historical_rate_lookup() {
        assert_eq!(historical_rate(2009), Some(-0.4));
        assert_eq!(historical_rate(1999), None);
    }
}
