pub mod engine;

pub use crate::core::engine::CalcEngine;
pub use crate::domain::model::{CalculatorRequest, CalculatorResponse};
pub use crate::domain::ports::{Calculator, TabularResult};
pub use crate::utils::error::Result;
