use crate::utils::error::{CalcError, Result};
use crate::utils::validation::{validate_positive_number, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalcConfig {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub concrete: ConcretePricingConfig,
    pub logging: Option<LoggingConfig>,
}

/// Upper bounds on generated rows and iteration tolerances.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_schedule_periods: usize,
    pub investment_breakdown_years: usize,
    pub inflation_breakdown_years: usize,
    pub max_subnet_rows: usize,
    pub max_random_count: usize,
    pub fraction_tolerance: f64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_schedule_periods: 600,
            investment_breakdown_years: 30,
            inflation_breakdown_years: 50,
            max_subnet_rows: 256,
            max_random_count: 10_000,
            fraction_tolerance: 1.0e-6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcretePricingConfig {
    pub ready_mix_per_cubic_yard: f64,
    pub bag_60lb_price: f64,
    pub bag_80lb_price: f64,
    pub weight_lb_per_cubic_foot: f64,
}

impl Default for ConcretePricingConfig {
    fn default() -> Self {
        Self {
            ready_mix_per_cubic_yard: 100.0,
            bag_60lb_price: 4.50,
            bag_80lb_price: 5.50,
            weight_lb_per_cubic_foot: 150.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl CalcConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CalcError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses the configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CalcError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` references with environment values; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CalcError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        let limits = &self.limits;
        validate_positive_number("limits.max_schedule_periods", limits.max_schedule_periods, 1)?;
        validate_positive_number(
            "limits.investment_breakdown_years",
            limits.investment_breakdown_years,
            1,
        )?;
        validate_positive_number(
            "limits.inflation_breakdown_years",
            limits.inflation_breakdown_years,
            1,
        )?;
        validate_positive_number("limits.max_subnet_rows", limits.max_subnet_rows, 1)?;
        validate_positive_number("limits.max_random_count", limits.max_random_count, 1)?;

        if !(limits.fraction_tolerance > 0.0 && limits.fraction_tolerance < 1.0) {
            return Err(CalcError::InvalidConfigValueError {
                field: "limits.fraction_tolerance".to_string(),
                value: limits.fraction_tolerance.to_string(),
                reason: "Value must be between 0 and 1 (exclusive)".to_string(),
            });
        }

        let pricing = [
            ("concrete.ready_mix_per_cubic_yard", self.concrete.ready_mix_per_cubic_yard),
            ("concrete.bag_60lb_price", self.concrete.bag_60lb_price),
            ("concrete.bag_80lb_price", self.concrete.bag_80lb_price),
            ("concrete.weight_lb_per_cubic_foot", self.concrete.weight_lb_per_cubic_foot),
        ];
        for (field, value) in pricing {
            if !value.is_finite() || value < 0.0 {
                return Err(CalcError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: "Value must be a non-negative number".to_string(),
                });
            }
        }

        if let Some(level) = self.logging.as_ref().and_then(|l| l.level.as_deref()) {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level) {
                return Err(CalcError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("Unsupported level. Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }

    pub fn json_logging(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }
}

impl Validate for CalcConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
