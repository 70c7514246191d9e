use crate::config::CalcConfig;
use crate::domain::model::{CalculatorRequest, CalculatorResponse};
use crate::domain::ports::Calculator;
use crate::utils::error::{CalcError, Result};
use std::path::{Path, PathBuf};

/// Dispatches calculator requests against one immutable configuration.
#[derive(Debug, Clone, Default)]
pub struct CalcEngine {
    config: CalcConfig,
}

fn compute<C: Calculator>(
    input: &C,
    config: &CalcConfig,
    wrap: fn(C::Output) -> CalculatorResponse,
) -> Result<CalculatorResponse> {
    input.compute(config).map(wrap)
}

impl CalcEngine {
    pub fn new(config: CalcConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, request: &CalculatorRequest) -> Result<CalculatorResponse> {
        let name = request.name();
        tracing::debug!("Running {} calculator", name);

        let config = &self.config;
        let outcome = match request {
            CalculatorRequest::Loan(input) => compute(input, config, CalculatorResponse::Loan),
            CalculatorRequest::Mortgage(input) => compute(input, config, CalculatorResponse::Mortgage),
            CalculatorRequest::Amortization(input) => compute(input, config, CalculatorResponse::Amortization),
            CalculatorRequest::Payment(input) => compute(input, config, CalculatorResponse::Payment),
            CalculatorRequest::Interest(input) => compute(input, config, CalculatorResponse::Interest),
            CalculatorRequest::Investment(input) => compute(input, config, CalculatorResponse::Investment),
            CalculatorRequest::Inflation(input) => compute(input, config, CalculatorResponse::Inflation),
            CalculatorRequest::Retirement(input) => compute(input, config, CalculatorResponse::Retirement),
            CalculatorRequest::Salary(input) => compute(input, config, CalculatorResponse::Salary),
            CalculatorRequest::SalesTax(input) => compute(input, config, CalculatorResponse::SalesTax),
            CalculatorRequest::Percentage(input) => compute(input, config, CalculatorResponse::Percentage),
            CalculatorRequest::Fraction(input) => compute(input, config, CalculatorResponse::Fraction),
            CalculatorRequest::Statistics(input) => compute(input, config, CalculatorResponse::Statistics),
            CalculatorRequest::Random(input) => compute(input, config, CalculatorResponse::Random),
            CalculatorRequest::Password(input) => compute(input, config, CalculatorResponse::Password),
            CalculatorRequest::Subnet(input) => compute(input, config, CalculatorResponse::Subnet),
            CalculatorRequest::Triangle(input) => compute(input, config, CalculatorResponse::Triangle),
            CalculatorRequest::Conversion(input) => compute(input, config, CalculatorResponse::Conversion),
            CalculatorRequest::Bmi(input) => compute(input, config, CalculatorResponse::Bmi),
            CalculatorRequest::BodyFat(input) => compute(input, config, CalculatorResponse::BodyFat),
            CalculatorRequest::Calorie(input) => compute(input, config, CalculatorResponse::Calorie),
            CalculatorRequest::IdealWeight(input) => compute(input, config, CalculatorResponse::IdealWeight),
            CalculatorRequest::Age(input) => compute(input, config, CalculatorResponse::Age),
            CalculatorRequest::Date(input) => compute(input, config, CalculatorResponse::Date),
            CalculatorRequest::Time(input) => compute(input, config, CalculatorResponse::Time),
            CalculatorRequest::Hours(input) => compute(input, config, CalculatorResponse::Hours),
            CalculatorRequest::Gpa(input) => compute(input, config, CalculatorResponse::Gpa),
            CalculatorRequest::Grade(input) => compute(input, config, CalculatorResponse::Grade),
            CalculatorRequest::Concrete(input) => compute(input, config, CalculatorResponse::Concrete),
            CalculatorRequest::Scientific(input) => compute(input, config, CalculatorResponse::Scientific),
        };

        match &outcome {
            Ok(_) => tracing::info!("{} calculation complete", name),
            Err(e) if e.is_validation() => tracing::warn!("{} input rejected: {}", name, e),
            Err(e) => tracing::error!("{} calculation failed: {}", name, e),
        }
        outcome
    }

    /// Parses a JSON request and runs it.
    pub fn run_json(&self, request: &str) -> Result<CalculatorResponse> {
        let request: CalculatorRequest = serde_json::from_str(request)?;
        self.run(&request)
    }

    /// Runs a request and writes its table as CSV. `output` may be a file or a
    /// directory, in which case the result's suggested file name is used.
    pub fn export(&self, request: &CalculatorRequest, output: &Path) -> Result<PathBuf> {
        let response = self.run(request)?;
        let table = response.tabular().ok_or_else(|| {
            CalcError::out_of_domain(
                "calculator",
                format!("{} results have no table to export", request.name()),
            )
        })?;

        let path = if output.is_dir() {
            output.join(table.export_name())
        } else {
            output.to_path_buf()
        };
        let csv = table.to_csv()?;
        std::fs::write(&path, csv)?;
        tracing::info!("Exported {} table to {}", request.name(), path.display());
        Ok(path)
    }
}
