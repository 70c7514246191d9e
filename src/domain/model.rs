use crate::calculators::{
    concrete::{ConcreteInput, ConcreteResult},
    conversion::{ConversionInput, ConversionResult},
    datetime::{AgeInput, AgeResult, DateInput, DateResult, HoursInput, HoursResult, TimeInput, TimeResult},
    fraction::{FractionInput, FractionResult},
    grades::{GpaInput, GpaResult, GradeInput, GradeResult},
    health::{
        BmiInput, BmiResult, BodyFatInput, BodyFatResult, CalorieInput, CalorieResult, IdealWeightInput,
        IdealWeightResult,
    },
    inflation::{InflationInput, InflationResult},
    interest::{InterestInput, InterestResult},
    investment::{InvestmentInput, InvestmentResult},
    loan::{
        AmortizationInput, AmortizationResult, LoanInput, LoanResult, MortgageInput, MortgageResult, PaymentInput,
        PaymentResult,
    },
    password::{PasswordInput, PasswordResult},
    percentage::{PercentageInput, PercentageResult},
    random::{RandomInput, RandomResult},
    retirement::{RetirementInput, RetirementResult},
    salary::{SalaryInput, SalaryResult},
    sales_tax::{SalesTaxInput, SalesTaxResult},
    scientific::{ScientificInput, ScientificResult},
    statistics::{StatisticsInput, StatisticsResult},
    subnet::{SubnetInput, SubnetResult},
    triangle::{TriangleInput, TriangleResult},
};
use crate::domain::ports::TabularResult;
use serde::{Deserialize, Serialize};

/// A breakdown table limited to `cap` rows out of `available`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capped<T> {
    pub rows: Vec<T>,
    pub cap: usize,
    pub available: usize,
    pub truncated: bool,
}

impl<T> Capped<T> {
    /// Builds rows `0..min(available, cap)` with `make_row`.
    pub fn build(available: usize, cap: usize, make_row: impl FnMut(usize) -> T) -> Self {
        let rows = (0..available.min(cap)).map(make_row).collect();
        Capped {
            rows,
            cap,
            available,
            truncated: available > cap,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Names accepted in the `calculator` field, in menu order.
pub const CALCULATOR_NAMES: [&str; 30] = [
    "loan",
    "mortgage",
    "amortization",
    "payment",
    "interest",
    "investment",
    "inflation",
    "retirement",
    "salary",
    "sales_tax",
    "percentage",
    "fraction",
    "statistics",
    "random",
    "password",
    "subnet",
    "triangle",
    "conversion",
    "bmi",
    "body_fat",
    "calorie",
    "ideal_weight",
    "age",
    "date",
    "time",
    "hours",
    "gpa",
    "grade",
    "concrete",
    "scientific",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "calculator", content = "input", rename_all = "snake_case")]
pub enum CalculatorRequest {
    Loan(LoanInput),
    Mortgage(MortgageInput),
    Amortization(AmortizationInput),
    Payment(PaymentInput),
    Interest(InterestInput),
    Investment(InvestmentInput),
    Inflation(InflationInput),
    Retirement(RetirementInput),
    Salary(SalaryInput),
    SalesTax(SalesTaxInput),
    Percentage(PercentageInput),
    Fraction(FractionInput),
    Statistics(StatisticsInput),
    Random(RandomInput),
    Password(PasswordInput),
    Subnet(SubnetInput),
    Triangle(TriangleInput),
    Conversion(ConversionInput),
    Bmi(BmiInput),
    BodyFat(BodyFatInput),
    Calorie(CalorieInput),
    IdealWeight(IdealWeightInput),
    Age(AgeInput),
    Date(DateInput),
    Time(TimeInput),
    Hours(HoursInput),
    Gpa(GpaInput),
    Grade(GradeInput),
    Concrete(ConcreteInput),
    Scientific(ScientificInput),
}

impl CalculatorRequest {
    pub fn name(&self) -> &'static str {
        match self {
            CalculatorRequest::Loan(_) => "loan",
            CalculatorRequest::Mortgage(_) => "mortgage",
            CalculatorRequest::Amortization(_) => "amortization",
            CalculatorRequest::Payment(_) => "payment",
            CalculatorRequest::Interest(_) => "interest",
            CalculatorRequest::Investment(_) => "investment",
            CalculatorRequest::Inflation(_) => "inflation",
            CalculatorRequest::Retirement(_) => "retirement",
            CalculatorRequest::Salary(_) => "salary",
            CalculatorRequest::SalesTax(_) => "sales_tax",
            CalculatorRequest::Percentage(_) => "percentage",
            CalculatorRequest::Fraction(_) => "fraction",
            CalculatorRequest::Statistics(_) => "statistics",
            CalculatorRequest::Random(_) => "random",
            CalculatorRequest::Password(_) => "password",
            CalculatorRequest::Subnet(_) => "subnet",
            CalculatorRequest::Triangle(_) => "triangle",
            CalculatorRequest::Conversion(_) => "conversion",
            CalculatorRequest::Bmi(_) => "bmi",
            CalculatorRequest::BodyFat(_) => "body_fat",
            CalculatorRequest::Calorie(_) => "calorie",
            CalculatorRequest::IdealWeight(_) => "ideal_weight",
            CalculatorRequest::Age(_) => "age",
            CalculatorRequest::Date(_) => "date",
            CalculatorRequest::Time(_) => "time",
            CalculatorRequest::Hours(_) => "hours",
            CalculatorRequest::Gpa(_) => "gpa",
            CalculatorRequest::Grade(_) => "grade",
            CalculatorRequest::Concrete(_) => "concrete",
            CalculatorRequest::Scientific(_) => "scientific",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "calculator", content = "result", rename_all = "snake_case")]
pub enum CalculatorResponse {
    Loan(LoanResult),
    Mortgage(MortgageResult),
    Amortization(AmortizationResult),
    Payment(PaymentResult),
    Interest(InterestResult),
    Investment(InvestmentResult),
    Inflation(InflationResult),
    Retirement(RetirementResult),
    Salary(SalaryResult),
    SalesTax(SalesTaxResult),
    Percentage(PercentageResult),
    Fraction(FractionResult),
    Statistics(StatisticsResult),
    Random(RandomResult),
    Password(PasswordResult),
    Subnet(SubnetResult),
    Triangle(TriangleResult),
    Conversion(ConversionResult),
    Bmi(BmiResult),
    BodyFat(BodyFatResult),
    Calorie(CalorieResult),
    IdealWeight(IdealWeightResult),
    Age(AgeResult),
    Date(DateResult),
    Time(TimeResult),
    Hours(HoursResult),
    Gpa(GpaResult),
    Grade(GradeResult),
    Concrete(ConcreteResult),
    Scientific(ScientificResult),
}

impl CalculatorResponse {
    /// The exportable table carried by this result, if any.
    pub fn tabular(&self) -> Option<&dyn TabularResult> {
        let table: &dyn TabularResult = match self {
            CalculatorResponse::Amortization(result) => result,
            CalculatorResponse::Investment(result) => result,
            CalculatorResponse::Inflation(result) => result,
            CalculatorResponse::Random(result) => result,
            CalculatorResponse::Subnet(result) => result,
            _ => return None,
        };
        Some(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capped_truncates_at_cap() {
        let capped = Capped::build(10, 3, |i| i * 2);
        assert_eq!(capped.rows, vec![0, 2, 4]);
        assert_eq!(capped.available, 10);
        assert!(capped.truncated);

        let whole = Capped::build(2, 3, |i| i);
        assert_eq!(whole.len(), 2);
        assert!(!whole.truncated);
    }

    #[test]
    fn test_request_tagging() {
        let request: CalculatorRequest = serde_json::from_str(
            r#"{"calculator": "sales_tax", "input": {"mode": "add_tax", "amount": 100, "rate": 8.25}}"#,
        )
        .unwrap();
        assert_eq!(request.name(), "sales_tax");
    }

    #[test]
    fn test_unknown_calculator_rejected() {
        let request = serde_json::from_str::<CalculatorRequest>(r#"{"calculator": "horoscope", "input": {}}"#);
        assert!(request.is_err());
    }

    #[test]
    fn test_every_name_is_listed_once() {
        let mut names = CALCULATOR_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CALCULATOR_NAMES.len());
    }
}
