use crate::config::CalcConfig;
use crate::domain::ports::Calculator;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::{validate_non_negative, validate_positive};
use serde::{Deserialize, Serialize};

/// Base state sales tax rates in percent. Local taxes are not included.
pub const STATE_RATES: [(&str, f64); 50] = [
    ("Alabama", 4.00),
    ("Alaska", 0.00),
    ("Arizona", 5.60),
    ("Arkansas", 6.50),
    ("California", 7.25),
    ("Colorado", 2.90),
    ("Connecticut", 6.35),
    ("Delaware", 0.00),
    ("Florida", 6.00),
    ("Georgia", 4.00),
    ("Hawaii", 4.17),
    ("Idaho", 6.00),
    ("Illinois", 6.25),
    ("Indiana", 7.00),
    ("Iowa", 6.00),
    ("Kansas", 6.50),
    ("Kentucky", 6.00),
    ("Louisiana", 4.45),
    ("Maine", 5.50),
    ("Maryland", 6.00),
    ("Massachusetts", 6.25),
    ("Michigan", 6.00),
    ("Minnesota", 6.88),
    ("Mississippi", 7.07),
    ("Missouri", 4.23),
    ("Montana", 0.00),
    ("Nebraska", 5.50),
    ("Nevada", 6.85),
    ("New Hampshire", 0.00),
    ("New Jersey", 6.63),
    ("New Mexico", 5.13),
    ("New York", 8.00),
    ("North Carolina", 4.75),
    ("North Dakota", 5.00),
    ("Ohio", 5.75),
    ("Oklahoma", 4.50),
    ("Oregon", 0.00),
    ("Pennsylvania", 6.00),
    ("Rhode Island", 7.00),
    ("South Carolina", 6.00),
    ("South Dakota", 4.50),
    ("Tennessee", 7.00),
    ("Texas", 6.25),
    ("Utah", 5.95),
    ("Vermont", 6.00),
    ("Virginia", 5.30),
    ("Washington", 6.50),
    ("West Virginia", 6.00),
    ("Wisconsin", 5.00),
    ("Wyoming", 4.00),
];

/// Case-insensitive lookup of a state's base rate.
pub fn state_rate(name: &str) -> Option<f64> {
    let wanted = name.trim();
    STATE_RATES
        .iter()
        .find(|(state, _)| state.eq_ignore_ascii_case(wanted))
        .map(|(_, rate)| *rate)
}

/// Either an explicit percentage or a state whose base rate is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaxRate {
    Percent(f64),
    State { state: String },
}

impl TaxRate {
    pub fn resolve(&self) -> Result<f64> {
        match self {
            TaxRate::Percent(rate) => validate_non_negative("rate_percent", *rate),
            TaxRate::State { state } => state_rate(state).ok_or_else(|| {
                CalcError::out_of_domain("state", format!("no sales tax rate known for '{}'", state))
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SalesTaxInput {
    AddTax { amount: f64, rate: TaxRate },
    RemoveTax { total: f64, rate: TaxRate },
    FindRate { amount: f64, total: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesTaxResult {
    pub kind: &'static str,
    pub base_amount: f64,
    pub tax_rate_percent: f64,
    pub tax_amount: f64,
    pub total: f64,
}

impl Calculator for SalesTaxInput {
    type Output = SalesTaxResult;

    fn compute(&self, _config: &CalcConfig) -> Result<SalesTaxResult> {
        match self {
            SalesTaxInput::AddTax { amount, rate } => {
                let base_amount = validate_non_negative("amount", *amount)?;
                let rate = rate.resolve()?;
                let tax_amount = base_amount * rate / 100.0;
                Ok(SalesTaxResult {
                    kind: "Add Tax",
                    base_amount,
                    tax_rate_percent: rate,
                    tax_amount,
                    total: base_amount + tax_amount,
                })
            }
            SalesTaxInput::RemoveTax { total, rate } => {
                let total = validate_non_negative("total", *total)?;
                let rate = rate.resolve()?;
                let base_amount = total / (1.0 + rate / 100.0);
                Ok(SalesTaxResult {
                    kind: "Remove Tax",
                    base_amount,
                    tax_rate_percent: rate,
                    tax_amount: total - base_amount,
                    total,
                })
            }
            SalesTaxInput::FindRate { amount, total } => {
                let base_amount = validate_positive("amount", *amount)?;
                let total = validate_non_negative("total", *total)?;
                if total < base_amount {
                    return Err(CalcError::out_of_domain(
                        "total",
                        "must not be less than the amount before tax",
                    ));
                }
                let tax_amount = total - base_amount;
                Ok(SalesTaxResult {
                    kind: "Calculate Tax Rate",
                    base_amount,
                    tax_rate_percent: tax_amount / base_amount * 100.0,
                    tax_amount,
                    total,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_tax() {
        let input = SalesTaxInput::AddTax {
            amount: 100.0,
            rate: TaxRate::Percent(8.0),
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert!((result.tax_amount - 8.0).abs() < 1e-9);
        assert!((result.total - 108.0).abs() < 1e-9);
    }

    #[test]
    fn test_remove_tax_inverts_add_tax() {
        let input = SalesTaxInput::RemoveTax {
            total: 108.0,
            rate: TaxRate::Percent(8.0),
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert!((result.base_amount - 100.0).abs() < 1e-9);
        assert!((result.tax_amount - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_find_rate() {
        let input = SalesTaxInput::FindRate {
            amount: 50.0,
            total: 53.625,
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert!((result.tax_rate_percent - 7.25).abs() < 1e-9);
    }

    #[test]
    fn test_state_rate_lookup() {
        assert_eq!(state_rate("california"), Some(7.25));
        assert_eq!(state_rate(" New York "), Some(8.0));
        assert_eq!(state_rate("Puerto Rico"), None);
        assert_eq!(STATE_RATES.len(), 50);
    }

    #[test]
    fn test_rate_from_state_in_json() {
        let input: SalesTaxInput = serde_json::from_str(
            r#"{"mode": "add_tax", "amount": 200.0, "rate": {"state": "Texas"}}"#,
        )
        .unwrap();
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert!((result.tax_amount - 12.5).abs() < 1e-9);

        let unknown = SalesTaxInput::AddTax {
            amount: 10.0,
            rate: TaxRate::State {
                state: "Atlantis".to_string(),
            },
        };
        assert!(unknown.compute(&CalcConfig::default()).is_err());
    }
}
