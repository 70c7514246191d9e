//! Loan, mortgage, amortization and payment calculators.
//!
//! All of them share the annuity payment formula
//! `P·r·(1+r)^n / ((1+r)^n − 1)`, which degrades to `P/n` when the rate is zero.

use crate::config::CalcConfig;
use crate::domain::ports::{Calculator, TabularResult};
use crate::utils::error::{CalcError, Result};
use crate::utils::export::rows_to_csv;
use crate::utils::validation::{period_count, validate_non_negative, validate_positive, validate_result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Remaining balance at or below this is treated as paid off.
pub const BALANCE_EPSILON: f64 = 0.01;

/// Periodic payment for a fully amortizing loan.
pub fn payment(principal: f64, rate_per_period: f64, periods: u32) -> f64 {
    let n = periods as f64;
    if rate_per_period == 0.0 {
        return principal / n;
    }
    let growth = (1.0 + rate_per_period).powf(n);
    principal * rate_per_period * growth / (growth - 1.0)
}

/// Principal that a given periodic payment pays off.
pub fn principal_for_payment(payment: f64, rate_per_period: f64, periods: u32) -> f64 {
    let n = periods as f64;
    if rate_per_period == 0.0 {
        return payment * n;
    }
    let growth = (1.0 + rate_per_period).powf(n);
    payment * (growth - 1.0) / (rate_per_period * growth)
}

fn monthly_rate(field: &str, annual_rate_percent: f64) -> Result<f64> {
    validate_non_negative(field, annual_rate_percent)?;
    Ok(annual_rate_percent / 100.0 / 12.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    pub amount: f64,
    pub annual_rate_percent: f64,
    pub term_years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanResult {
    pub monthly_payment: f64,
    pub total_payment: f64,
    pub total_interest: f64,
    pub number_of_payments: u32,
}

impl Calculator for LoanInput {
    type Output = LoanResult;

    fn compute(&self, _config: &CalcConfig) -> Result<LoanResult> {
        let principal = validate_positive("amount", self.amount)?;
        let rate = monthly_rate("annual_rate_percent", self.annual_rate_percent)?;
        let periods = period_count("term_years", self.term_years, 12)?;

        let monthly_payment = validate_result("monthly_payment", payment(principal, rate, periods))?;
        let total_payment = validate_result("total_payment", monthly_payment * periods as f64)?;

        Ok(LoanResult {
            monthly_payment,
            total_payment,
            total_interest: total_payment - principal,
            number_of_payments: periods,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageInput {
    pub home_price: f64,
    pub down_payment: f64,
    #[serde(default = "default_mortgage_term")]
    pub term_years: f64,
    pub annual_rate_percent: f64,
    #[serde(default)]
    pub annual_property_tax: f64,
    #[serde(default)]
    pub annual_insurance: f64,
    #[serde(default)]
    pub annual_pmi: f64,
}

fn default_mortgage_term() -> f64 {
    30.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MortgageResult {
    pub loan_amount: f64,
    pub monthly_principal_and_interest: f64,
    pub monthly_tax: f64,
    pub monthly_insurance: f64,
    pub monthly_pmi: f64,
    pub total_monthly_payment: f64,
    pub total_payment: f64,
    pub total_interest: f64,
}

impl Calculator for MortgageInput {
    type Output = MortgageResult;

    fn compute(&self, _config: &CalcConfig) -> Result<MortgageResult> {
        let price = validate_positive("home_price", self.home_price)?;
        let down = validate_non_negative("down_payment", self.down_payment)?;
        if down >= price {
            return Err(CalcError::out_of_domain(
                "down_payment",
                "must be less than the home price",
            ));
        }
        let rate = monthly_rate("annual_rate_percent", self.annual_rate_percent)?;
        let periods = period_count("term_years", self.term_years, 12)?;
        let monthly_tax = validate_non_negative("annual_property_tax", self.annual_property_tax)? / 12.0;
        let monthly_insurance = validate_non_negative("annual_insurance", self.annual_insurance)? / 12.0;
        let monthly_pmi = validate_non_negative("annual_pmi", self.annual_pmi)? / 12.0;

        let principal = price - down;
        let monthly_pi = validate_result("monthly_principal_and_interest", payment(principal, rate, periods))?;
        let total_payment = validate_result("total_payment", monthly_pi * periods as f64)?;

        Ok(MortgageResult {
            loan_amount: principal,
            monthly_principal_and_interest: monthly_pi,
            monthly_tax,
            monthly_insurance,
            monthly_pmi,
            total_monthly_payment: monthly_pi + monthly_tax + monthly_insurance + monthly_pmi,
            total_payment,
            total_interest: total_payment - principal,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub amount: f64,
    pub annual_rate_percent: f64,
    pub term_years: f64,
    /// Date of the first payment; defaults to today.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmortizationRow {
    pub period: u32,
    pub date: NaiveDate,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub balance: f64,
    pub cumulative_interest: f64,
    pub cumulative_principal: f64,
}

#[derive(Debug, Serialize)]
struct AmortizationCsvRow {
    #[serde(rename = "Payment")]
    period: u32,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Payment Amount")]
    payment: String,
    #[serde(rename = "Principal")]
    principal: String,
    #[serde(rename = "Interest")]
    interest: String,
    #[serde(rename = "Balance")]
    balance: String,
    #[serde(rename = "Cumulative Interest")]
    cumulative_interest: String,
    #[serde(rename = "Cumulative Principal")]
    cumulative_principal: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmortizationResult {
    pub monthly_payment: f64,
    pub total_payment: f64,
    pub total_interest: f64,
    pub total_principal: f64,
    pub number_of_payments: u32,
    pub schedule: Vec<AmortizationRow>,
}

/// Builds the per-period schedule. The last row absorbs any rounding remainder,
/// so the balance always ends at exactly zero. Schedules longer than
/// `max_periods` are rejected before anything is allocated.
pub fn amortization_schedule(
    principal: f64,
    rate_per_period: f64,
    periods: u32,
    start_date: NaiveDate,
    max_periods: usize,
) -> Result<Vec<AmortizationRow>> {
    if periods as usize > max_periods {
        return Err(CalcError::out_of_domain(
            "term_years",
            format!("schedule is limited to {} monthly payments", max_periods),
        ));
    }
    let scheduled_payment = validate_result("monthly_payment", payment(principal, rate_per_period, periods))?;
    let mut balance = principal;
    let mut cumulative_interest = 0.0;
    let mut cumulative_principal = 0.0;
    let mut rows = Vec::with_capacity(periods as usize);

    for period in 1..=periods {
        let interest = balance * rate_per_period;
        let mut principal_part = scheduled_payment - interest;

        if period == periods || balance - principal_part <= BALANCE_EPSILON {
            principal_part = balance;
        }
        balance -= principal_part;
        if balance < BALANCE_EPSILON {
            balance = 0.0;
        }
        cumulative_interest += interest;
        cumulative_principal += principal_part;

        let date = start_date
            .checked_add_months(Months::new(period - 1))
            .ok_or_else(|| CalcError::out_of_domain("start_date", "schedule runs past the supported calendar"))?;

        rows.push(AmortizationRow {
            period,
            date,
            payment: principal_part + interest,
            principal: principal_part,
            interest,
            balance,
            cumulative_interest,
            cumulative_principal,
        });

        if balance == 0.0 {
            break;
        }
    }

    Ok(rows)
}

impl Calculator for AmortizationInput {
    type Output = AmortizationResult;

    fn compute(&self, config: &CalcConfig) -> Result<AmortizationResult> {
        let principal = validate_positive("amount", self.amount)?;
        let rate = monthly_rate("annual_rate_percent", self.annual_rate_percent)?;
        let periods = period_count("term_years", self.term_years, 12)?;

        let start = self.start_date.unwrap_or_else(|| {
            let today = chrono::Local::now().date_naive();
            today.with_day(1).unwrap_or(today)
        });
        let schedule = amortization_schedule(principal, rate, periods, start, config.limits.max_schedule_periods)?;
        let monthly_payment = validate_result("monthly_payment", payment(principal, rate, periods))?;
        let total_interest = schedule.last().map(|r| r.cumulative_interest).unwrap_or(0.0);
        let total_principal = schedule.last().map(|r| r.cumulative_principal).unwrap_or(0.0);

        Ok(AmortizationResult {
            monthly_payment,
            total_payment: total_principal + total_interest,
            total_interest,
            total_principal,
            number_of_payments: periods,
            schedule,
        })
    }
}

impl TabularResult for AmortizationResult {
    fn export_name(&self) -> &'static str {
        "amortization_schedule.csv"
    }

    fn to_csv(&self) -> Result<String> {
        let rows: Vec<AmortizationCsvRow> = self
            .schedule
            .iter()
            .map(|r| AmortizationCsvRow {
                period: r.period,
                date: r.date,
                payment: format!("{:.2}", r.payment),
                principal: format!("{:.2}", r.principal),
                interest: format!("{:.2}", r.interest),
                balance: format!("{:.2}", r.balance),
                cumulative_interest: format!("{:.2}", r.cumulative_interest),
                cumulative_principal: format!("{:.2}", r.cumulative_principal),
            })
            .collect();
        rows_to_csv(&rows)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Weekly,
    Biweekly,
    #[default]
    Monthly,
    Quarterly,
    Annually,
}

impl PaymentFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Weekly => 52,
            PaymentFrequency::Biweekly => 26,
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::Annually => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PaymentInput {
    LoanPayment {
        amount: f64,
        annual_rate_percent: f64,
        term_years: f64,
        #[serde(default)]
        frequency: PaymentFrequency,
    },
    LoanAmount {
        payment: f64,
        annual_rate_percent: f64,
        term_years: f64,
        #[serde(default)]
        frequency: PaymentFrequency,
    },
    Annuity {
        present_value: f64,
        #[serde(default)]
        future_value: f64,
        annual_rate_percent: f64,
        periods: u32,
        #[serde(default)]
        frequency: PaymentFrequency,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PaymentResult {
    LoanPayment {
        payment: f64,
        principal: f64,
        total_paid: f64,
        total_interest: f64,
        frequency: PaymentFrequency,
        total_payments: u32,
    },
    LoanAmount {
        loan_amount: f64,
        payment: f64,
        total_paid: f64,
        total_interest: f64,
        frequency: PaymentFrequency,
        total_payments: u32,
    },
    Annuity {
        payment: f64,
        total_paid: f64,
        net_cost: f64,
        present_value: f64,
        future_value: f64,
        periods: u32,
        frequency: PaymentFrequency,
    },
}

/// Level payment that takes a balance of `present_value` to `future_value` over `periods`.
pub fn annuity_payment(present_value: f64, future_value: f64, rate_per_period: f64, periods: u32) -> f64 {
    let n = periods as f64;
    if rate_per_period == 0.0 {
        return (present_value - future_value) / n;
    }
    let growth = (1.0 + rate_per_period).powf(n);
    rate_per_period * (present_value * growth - future_value) / (growth - 1.0)
}

impl Calculator for PaymentInput {
    type Output = PaymentResult;

    fn compute(&self, _config: &CalcConfig) -> Result<PaymentResult> {
        match *self {
            PaymentInput::LoanPayment {
                amount,
                annual_rate_percent,
                term_years,
                frequency,
            } => {
                let principal = validate_positive("amount", amount)?;
                validate_non_negative("annual_rate_percent", annual_rate_percent)?;
                let per_year = frequency.periods_per_year();
                let rate = annual_rate_percent / 100.0 / per_year as f64;
                let total_payments = period_count("term_years", term_years, per_year)?;

                let periodic = validate_result("payment", payment(principal, rate, total_payments))?;
                let total_paid = validate_result("total_paid", periodic * total_payments as f64)?;
                Ok(PaymentResult::LoanPayment {
                    payment: periodic,
                    principal,
                    total_paid,
                    total_interest: total_paid - principal,
                    frequency,
                    total_payments,
                })
            }
            PaymentInput::LoanAmount {
                payment: periodic,
                annual_rate_percent,
                term_years,
                frequency,
            } => {
                validate_positive("payment", periodic)?;
                validate_non_negative("annual_rate_percent", annual_rate_percent)?;
                let per_year = frequency.periods_per_year();
                let rate = annual_rate_percent / 100.0 / per_year as f64;
                let total_payments = period_count("term_years", term_years, per_year)?;

                let loan_amount =
                    validate_result("loan_amount", principal_for_payment(periodic, rate, total_payments))?;
                let total_paid = validate_result("total_paid", periodic * total_payments as f64)?;
                Ok(PaymentResult::LoanAmount {
                    loan_amount,
                    payment: periodic,
                    total_paid,
                    total_interest: total_paid - loan_amount,
                    frequency,
                    total_payments,
                })
            }
            PaymentInput::Annuity {
                present_value,
                future_value,
                annual_rate_percent,
                periods,
                frequency,
            } => {
                validate_non_negative("present_value", present_value)?;
                validate_non_negative("future_value", future_value)?;
                validate_non_negative("annual_rate_percent", annual_rate_percent)?;
                if periods == 0 {
                    return Err(CalcError::out_of_domain("periods", "must be at least 1"));
                }
                let rate = annual_rate_percent / 100.0 / frequency.periods_per_year() as f64;

                let periodic = validate_result("payment", annuity_payment(present_value, future_value, rate, periods))?;
                let total_paid = validate_result("total_paid", periodic.abs() * periods as f64)?;
                Ok(PaymentResult::Annuity {
                    payment: periodic,
                    total_paid,
                    net_cost: total_paid - (future_value - present_value).abs(),
                    present_value,
                    future_value,
                    periods,
                    frequency,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} within {} of {}",
            actual,
            tolerance,
            expected
        );
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_thirty_year_loan_payment() {
        let input = LoanInput {
            amount: 200_000.0,
            annual_rate_percent: 6.0,
            term_years: 30.0,
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert_close(result.monthly_payment, 1199.10, 0.005);
        assert_eq!(result.number_of_payments, 360);
        assert_close(result.total_interest, result.total_payment - 200_000.0, 1e-6);
    }

    #[test]
    fn test_zero_rate_payment_is_linear() {
        assert_close(payment(12_000.0, 0.0, 12), 1000.0, 1e-9);
        assert_close(principal_for_payment(1000.0, 0.0, 12), 12_000.0, 1e-9);
    }

    #[test]
    fn test_principal_for_payment_inverts_payment() {
        let pmt = payment(50_000.0, 0.005, 60);
        assert_close(principal_for_payment(pmt, 0.005, 60), 50_000.0, 1e-6);
    }

    #[test]
    fn test_loan_rejects_invalid_input() {
        let config = CalcConfig::default();
        let bad_amount = LoanInput {
            amount: -1.0,
            annual_rate_percent: 5.0,
            term_years: 10.0,
        };
        assert!(bad_amount.compute(&config).is_err());

        let bad_term = LoanInput {
            amount: 1000.0,
            annual_rate_percent: 5.0,
            term_years: 0.0,
        };
        assert!(bad_term.compute(&config).is_err());
    }

    #[test]
    fn test_schedule_principal_sums_to_loan_and_ends_at_zero() {
        for (principal, rate, periods) in [
            (200_000.0, 0.06 / 12.0, 360),
            (15_000.0, 0.0, 48),
            (9_999.99, 0.199 / 12.0, 7),
            (1_000_000.0, 0.03 / 12.0, 600),
        ] {
            let schedule = amortization_schedule(principal, rate, periods, date(2024, 1, 31), 600).unwrap();
            let total: f64 = schedule.iter().map(|r| r.principal).sum();
            assert_close(total, principal, 1e-6 * principal.max(1.0));
            assert_eq!(schedule.last().unwrap().balance, 0.0);
            assert!(schedule.len() <= periods as usize);
        }
    }

    #[test]
    fn test_schedule_dates_advance_by_month() {
        let schedule = amortization_schedule(1200.0, 0.01, 3, date(2024, 1, 31), 600).unwrap();
        let dates: Vec<NaiveDate> = schedule.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31)]);
    }

    #[test]
    fn test_schedule_rejects_period_count_above_limit() {
        let result = amortization_schedule(1000.0, 0.01, u32::MAX, date(2024, 1, 1), 600);
        assert!(matches!(result, Err(CalcError::OutOfDomain { .. })));
    }

    #[test]
    fn test_overflowing_rate_is_an_error_not_nan() {
        let config = CalcConfig::default();
        let loan = LoanInput {
            amount: 200_000.0,
            annual_rate_percent: 1e6,
            term_years: 30.0,
        };
        assert!(matches!(
            loan.compute(&config),
            Err(CalcError::Overflow { .. } | CalcError::OutOfDomain { .. })
        ));

        let mortgage = MortgageInput {
            home_price: 300_000.0,
            down_payment: 0.0,
            term_years: 30.0,
            annual_rate_percent: 1e6,
            annual_property_tax: 0.0,
            annual_insurance: 0.0,
            annual_pmi: 0.0,
        };
        assert!(mortgage.compute(&config).is_err());

        let schedule = AmortizationInput {
            amount: 200_000.0,
            annual_rate_percent: 1e6,
            term_years: 30.0,
            start_date: Some(date(2024, 1, 1)),
        };
        assert!(schedule.compute(&config).is_err());
    }

    #[test]
    fn test_payment_modes_reject_overflowing_rate() {
        let config = CalcConfig::default();
        let loan_payment = PaymentInput::LoanPayment {
            amount: 200_000.0,
            annual_rate_percent: 1e6,
            term_years: 30.0,
            frequency: PaymentFrequency::Monthly,
        };
        assert!(matches!(
            loan_payment.compute(&config),
            Err(CalcError::Overflow { .. } | CalcError::OutOfDomain { .. })
        ));

        let annuity = PaymentInput::Annuity {
            present_value: 10_000.0,
            future_value: 0.0,
            annual_rate_percent: 1e6,
            periods: 600,
            frequency: PaymentFrequency::Monthly,
        };
        assert!(annuity.compute(&config).is_err());
    }

    #[test]
    fn test_amortization_respects_period_limit() {
        let input = AmortizationInput {
            amount: 100_000.0,
            annual_rate_percent: 5.0,
            term_years: 51.0,
            start_date: Some(date(2024, 1, 1)),
        };
        assert!(input.compute(&CalcConfig::default()).is_err());
    }

    #[test]
    fn test_amortization_result_totals() {
        let input = AmortizationInput {
            amount: 200_000.0,
            annual_rate_percent: 6.0,
            term_years: 30.0,
            start_date: Some(date(2024, 1, 1)),
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert_eq!(result.schedule.len(), 360);
        assert_close(result.total_principal, 200_000.0, 1e-4);
        assert_close(result.total_interest, 231_676.38, 1.0);
        assert_close(result.schedule[0].interest, 1000.0, 1e-9);
    }

    #[test]
    fn test_amortization_csv_export() {
        let input = AmortizationInput {
            amount: 1200.0,
            annual_rate_percent: 0.0,
            term_years: 0.25,
            start_date: Some(date(2024, 5, 1)),
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        let csv = result.to_csv().unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Payment,Date,Payment Amount,Principal,Interest,Balance,Cumulative Interest,Cumulative Principal"
        );
        assert_eq!(lines.next().unwrap(), "1,2024-05-01,400.00,400.00,0.00,800.00,0.00,400.00");
        assert_eq!(csv.lines().count(), 4);
    }

    #[test]
    fn test_mortgage_breakdown() {
        let input = MortgageInput {
            home_price: 250_000.0,
            down_payment: 50_000.0,
            term_years: 30.0,
            annual_rate_percent: 6.0,
            annual_property_tax: 2400.0,
            annual_insurance: 1200.0,
            annual_pmi: 0.0,
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert_close(result.loan_amount, 200_000.0, 1e-9);
        assert_close(result.monthly_tax, 200.0, 1e-9);
        assert_close(result.monthly_insurance, 100.0, 1e-9);
        assert_close(result.total_monthly_payment, 1199.10 + 300.0, 0.01);
    }

    #[test]
    fn test_mortgage_down_payment_must_be_below_price() {
        let input = MortgageInput {
            home_price: 100_000.0,
            down_payment: 100_000.0,
            term_years: 15.0,
            annual_rate_percent: 4.0,
            annual_property_tax: 0.0,
            annual_insurance: 0.0,
            annual_pmi: 0.0,
        };
        assert!(input.compute(&CalcConfig::default()).is_err());
    }

    #[test]
    fn test_payment_modes() {
        let config = CalcConfig::default();
        let biweekly = PaymentInput::LoanPayment {
            amount: 26_000.0,
            annual_rate_percent: 0.0,
            term_years: 1.0,
            frequency: PaymentFrequency::Biweekly,
        };
        match biweekly.compute(&config).unwrap() {
            PaymentResult::LoanPayment { payment, total_payments, .. } => {
                assert_eq!(total_payments, 26);
                assert_close(payment, 1000.0, 1e-9);
            }
            other => panic!("unexpected result {:?}", other),
        }

        let amount = PaymentInput::LoanAmount {
            payment: 1199.101050,
            annual_rate_percent: 6.0,
            term_years: 30.0,
            frequency: PaymentFrequency::Monthly,
        };
        match amount.compute(&config).unwrap() {
            PaymentResult::LoanAmount { loan_amount, .. } => assert_close(loan_amount, 200_000.0, 0.01),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_annuity_payment_matches_loan_payment_without_future_value() {
        let r = 0.05 / 12.0;
        assert_close(annuity_payment(10_000.0, 0.0, r, 36), payment(10_000.0, r, 36), 1e-9);
        assert_close(annuity_payment(10_000.0, 4_000.0, 0.0, 10), 600.0, 1e-9);
    }

    #[test]
    fn test_annuity_mode_net_cost() {
        let input = PaymentInput::Annuity {
            present_value: 10_000.0,
            future_value: 0.0,
            annual_rate_percent: 0.0,
            periods: 10,
            frequency: PaymentFrequency::Monthly,
        };
        match input.compute(&CalcConfig::default()).unwrap() {
            PaymentResult::Annuity { payment, total_paid, net_cost, .. } => {
                assert_close(payment, 1000.0, 1e-9);
                assert_close(total_paid, 10_000.0, 1e-9);
                assert_close(net_cost, 0.0, 1e-9);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
