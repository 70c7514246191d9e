pub mod calculators;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, Command};

pub use crate::config::CalcConfig;
pub use crate::core::engine::CalcEngine;
pub use crate::domain::model::{CalculatorRequest, CalculatorResponse, CALCULATOR_NAMES};
pub use crate::utils::error::{CalcError, Result};
