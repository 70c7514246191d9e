use crate::config::CalcConfig;
use crate::domain::ports::Calculator;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::parse_decimal;
use serde::{Deserialize, Serialize};

const Z_95: f64 = 1.96;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationType {
    #[default]
    Sample,
    Population,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsInput {
    /// Numbers separated by commas or whitespace.
    pub data: String,
    #[serde(default)]
    pub population_type: PopulationType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsResult {
    pub population_type: PopulationType,
    pub data: Vec<f64>,
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub modes: Vec<f64>,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub variance: f64,
    pub standard_deviation: f64,
    pub standard_error: f64,
    pub coefficient_of_variation: Option<f64>,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub confidence_interval_95: ConfidenceInterval,
}

pub fn parse_data(raw: &str) -> Result<Vec<f64>> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| parse_decimal("data", token))
        .collect()
}

/// Values sharing the highest frequency, ascending. Empty when every value is unique.
fn modes(sorted: &[f64]) -> Vec<f64> {
    let mut runs: Vec<(f64, usize)> = Vec::new();
    for &value in sorted {
        match runs.last_mut() {
            Some((last, count)) if *last == value => *count += 1,
            _ => runs.push((value, 1)),
        }
    }
    let max_count = runs.iter().map(|(_, count)| *count).max().unwrap_or(0);
    if max_count <= 1 {
        return Vec::new();
    }
    runs.into_iter()
        .filter(|(_, count)| *count == max_count)
        .map(|(value, _)| value)
        .collect()
}

pub fn describe(data: Vec<f64>, population_type: PopulationType) -> Result<StatisticsResult> {
    let n = data.len();
    if n == 0 {
        return Err(CalcError::MissingField {
            field: "data".to_string(),
        });
    }
    if population_type == PopulationType::Sample && n < 2 {
        return Err(CalcError::out_of_domain(
            "data",
            "sample standard deviation requires at least 2 values",
        ));
    }

    let mut sorted = data.clone();
    sorted.sort_by(f64::total_cmp);

    let count = n as f64;
    let sum: f64 = data.iter().sum();
    let mean = sum / count;
    let squared: f64 = data.iter().map(|x| (x - mean).powi(2)).sum();
    let denominator = match population_type {
        PopulationType::Sample => count - 1.0,
        PopulationType::Population => count,
    };
    let variance = squared / denominator;
    let standard_deviation = variance.sqrt();
    let standard_error = standard_deviation / count.sqrt();

    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let q1 = sorted[(count * 0.25).floor() as usize];
    let q3 = sorted[(count * 0.75).floor() as usize];
    let (min, max) = (sorted[0], sorted[n - 1]);

    Ok(StatisticsResult {
        population_type,
        count: n,
        sum,
        mean,
        median,
        modes: modes(&sorted),
        min,
        max,
        range: max - min,
        variance,
        standard_deviation,
        standard_error,
        coefficient_of_variation: (mean != 0.0).then(|| standard_deviation / mean.abs() * 100.0),
        q1,
        q3,
        iqr: q3 - q1,
        confidence_interval_95: ConfidenceInterval {
            lower: mean - Z_95 * standard_error,
            upper: mean + Z_95 * standard_error,
        },
        data,
    })
}

impl Calculator for StatisticsInput {
    type Output = StatisticsResult;

    fn compute(&self, _config: &CalcConfig) -> Result<StatisticsResult> {
        describe(parse_data(&self.data)?, self.population_type)
    }
}
