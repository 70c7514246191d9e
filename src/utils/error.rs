use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Export error: {message}")]
    ExportError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid number for '{field}': '{value}'")]
    ParseError { field: String, value: String },

    #[error("Invalid value for '{field}': {reason}")]
    OutOfDomain { field: String, reason: String },

    #[error("Division by zero: {context}")]
    DivisionByZero { context: String },

    #[error("Invalid triangle: {reason}")]
    InvalidTriangle { reason: String },

    #[error("Invalid address '{value}': {reason}")]
    InvalidAddress { value: String, reason: String },

    #[error("Unknown unit '{unit}' for {category}")]
    UnknownUnit { category: String, unit: String },

    #[error("Arithmetic overflow: {context}")]
    Overflow { context: String },
}

pub type Result<T> = std::result::Result<T, CalcError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Validation,
    Configuration,
    Export,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CalcError {
    pub fn out_of_domain(field: &str, reason: impl Into<String>) -> Self {
        CalcError::OutOfDomain {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn division_by_zero(context: impl Into<String>) -> Self {
        CalcError::DivisionByZero {
            context: context.into(),
        }
    }

    pub fn overflow(context: impl Into<String>) -> Self {
        CalcError::Overflow {
            context: context.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CalcError::MissingField { .. }
            | CalcError::ParseError { .. }
            | CalcError::OutOfDomain { .. }
            | CalcError::DivisionByZero { .. }
            | CalcError::InvalidTriangle { .. }
            | CalcError::InvalidAddress { .. }
            | CalcError::UnknownUnit { .. }
            | CalcError::Overflow { .. } => ErrorCategory::Validation,
            CalcError::ConfigError { .. } | CalcError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            CalcError::CsvError(_) | CalcError::SerializationError(_) | CalcError::ExportError { .. } => {
                ErrorCategory::Export
            }
            CalcError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Export => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.category() == ErrorCategory::Validation
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CalcError::MissingField { field } => format!("Please enter a value for {}", field),
            CalcError::ParseError { field, value } => {
                format!("'{}' is not a valid number for {}", value, field)
            }
            CalcError::OutOfDomain { field, reason } => format!("{}: {}", field, reason),
            CalcError::DivisionByZero { context } => format!("Cannot divide by zero ({})", context),
            CalcError::InvalidTriangle { reason } => format!("These values do not form a triangle: {}", reason),
            CalcError::InvalidAddress { value, reason } => format!("{} is not valid: {}", value, reason),
            CalcError::UnknownUnit { category, unit } => {
                format!("'{}' is not a known {} unit", unit, category)
            }
            CalcError::Overflow { .. } => "The numbers are too large to calculate exactly".to_string(),
            CalcError::ConfigError { message } => format!("Configuration problem: {}", message),
            CalcError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            CalcError::CsvError(_) | CalcError::SerializationError(_) => {
                "The result could not be exported".to_string()
            }
            CalcError::ExportError { message } => format!("The result could not be exported: {}", message),
            CalcError::IoError(e) => format!("File access failed: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CalcError::MissingField { .. } => "Fill in every required field and try again",
            CalcError::ParseError { .. } => "Use plain decimal numbers such as 1200 or 4.5",
            CalcError::OutOfDomain { .. } => "Adjust the value into the allowed range",
            CalcError::DivisionByZero { .. } => "Use a non-zero value for the divisor",
            CalcError::InvalidTriangle { .. } => {
                "Check that the sides satisfy the triangle inequality and the angles sum below 180"
            }
            CalcError::InvalidAddress { .. } => "Use dotted-quad notation such as 192.168.1.10",
            CalcError::UnknownUnit { .. } => "Run `quickcalc list` to see the supported units",
            CalcError::Overflow { .. } => "Use smaller input values",
            CalcError::ConfigError { .. } | CalcError::InvalidConfigValueError { .. } => {
                "Check the TOML configuration file"
            }
            CalcError::CsvError(_) | CalcError::SerializationError(_) => {
                "Only tabular results can be exported"
            }
            CalcError::ExportError { .. } => "Export the result again to a new file",
            CalcError::IoError(_) => "Check the file path and permissions",
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            category: self.category(),
            severity: self.severity(),
            message: self.to_string(),
            suggestion: self.recovery_suggestion().to_string(),
        }
    }
}

/// Structured error payload handed to the rendering layer.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub message: String,
    pub suggestion: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_medium_severity() {
        let err = CalcError::division_by_zero("percent change from 0");
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.is_validation());
    }

    #[test]
    fn test_config_errors_are_not_validation() {
        let err = CalcError::ConfigError {
            message: "bad".to_string(),
        };
        assert!(!err.is_validation());
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_export_errors_are_in_export_category() {
        let err = CalcError::ExportError {
            message: "CSV output is not valid UTF-8".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Export);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_ne!(err.recovery_suggestion(), "Check the TOML configuration file");
    }

    #[test]
    fn test_report_carries_message_and_suggestion() {
        let err = CalcError::out_of_domain("term_years", "must be greater than 0");
        let report = err.report();
        assert_eq!(report.message, "Invalid value for 'term_years': must be greater than 0");
        assert_eq!(report.suggestion, "Adjust the value into the allowed range");
    }
}
