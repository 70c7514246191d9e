use crate::config::CalcConfig;
use crate::utils::error::Result;
use serde::Serialize;

/// One form-driven calculation: an input snapshot in, a result snapshot out.
pub trait Calculator {
    type Output: Serialize;

    fn compute(&self, config: &CalcConfig) -> Result<Self::Output>;
}

/// Results that carry a table which can be exported as delimited text.
pub trait TabularResult {
    /// Suggested file name for the export.
    fn export_name(&self) -> &'static str;

    fn to_csv(&self) -> Result<String>;
}
