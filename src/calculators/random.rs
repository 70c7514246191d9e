use crate::calculators::statistics::{describe, PopulationType};
use crate::config::CalcConfig;
use crate::domain::ports::{Calculator, TabularResult};
use crate::utils::error::{CalcError, Result};
use crate::utils::export::{join_values, rows_to_csv};
use crate::utils::validation::validate_range;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RandomMode {
    Single,
    Multiple {
        count: usize,
        #[serde(default = "default_allow_duplicates")]
        allow_duplicates: bool,
    },
    Sequence,
}

fn default_allow_duplicates() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomInput {
    pub min: i64,
    pub max: i64,
    #[serde(flatten)]
    pub mode: RandomMode,
    /// Fixed seed for reproducible output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RandomSummary {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub modes: Vec<f64>,
    pub standard_deviation: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RandomResult {
    pub values: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RandomSummary>,
}

impl RandomResult {
    /// One value per line.
    pub fn as_text(&self) -> String {
        join_values(&self.values, "\n")
    }

    pub fn clipboard_text(&self) -> String {
        join_values(&self.values, ", ")
    }
}

fn summarize(values: &[i64]) -> Result<RandomSummary> {
    let stats = describe(values.iter().map(|v| *v as f64).collect(), PopulationType::Population)?;
    Ok(RandomSummary {
        count: stats.count,
        sum: stats.sum,
        mean: stats.mean,
        median: stats.median,
        modes: stats.modes,
        standard_deviation: stats.standard_deviation,
        min: stats.min,
        max: stats.max,
        range: stats.range,
    })
}

impl RandomInput {
    fn range_size(&self) -> u128 {
        (self.max as i128 - self.min as i128 + 1) as u128
    }

    /// Draws with the supplied generator.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R, config: &CalcConfig) -> Result<RandomResult> {
        if self.min >= self.max {
            return Err(CalcError::out_of_domain("max", "must be greater than min"));
        }
        let limit = config.limits.max_random_count;

        let values = match self.mode {
            RandomMode::Single => vec![rng.gen_range(self.min..=self.max)],
            RandomMode::Multiple {
                count,
                allow_duplicates,
            } => {
                validate_range("count", count, 1, limit)?;
                if allow_duplicates {
                    (0..count).map(|_| rng.gen_range(self.min..=self.max)).collect()
                } else {
                    if count as u128 > self.range_size() {
                        return Err(CalcError::out_of_domain(
                            "count",
                            "cannot draw more unique numbers than the range contains",
                        ));
                    }
                    let mut seen = HashSet::with_capacity(count);
                    let mut values = Vec::with_capacity(count);
                    while values.len() < count {
                        let value = rng.gen_range(self.min..=self.max);
                        if seen.insert(value) {
                            values.push(value);
                        }
                    }
                    values
                }
            }
            RandomMode::Sequence => {
                if self.range_size() > limit as u128 {
                    return Err(CalcError::out_of_domain(
                        "max",
                        format!("a sequence may contain at most {} numbers", limit),
                    ));
                }
                let mut values: Vec<i64> = (self.min..=self.max).collect();
                values.shuffle(rng);
                values
            }
        };

        let summary = match self.mode {
            RandomMode::Single => None,
            _ => Some(summarize(&values)?),
        };
        Ok(RandomResult { values, summary })
    }
}

impl Calculator for RandomInput {
    type Output = RandomResult;

    fn compute(&self, config: &CalcConfig) -> Result<RandomResult> {
        match self.seed {
            Some(seed) => self.generate_with(&mut StdRng::seed_from_u64(seed), config),
            None => self.generate_with(&mut rand::thread_rng(), config),
        }
    }
}

#[derive(Debug, Serialize)]
struct RandomCsvRow {
    #[serde(rename = "Index")]
    index: usize,
    #[serde(rename = "Value")]
    value: i64,
}

impl TabularResult for RandomResult {
    fn export_name(&self) -> &'static str {
        "random_numbers.csv"
    }

    fn to_csv(&self) -> Result<String> {
        let rows: Vec<RandomCsvRow> = self
            .values
            .iter()
            .enumerate()
            .map(|(i, value)| RandomCsvRow {
                index: i + 1,
                value: *value,
            })
            .collect();
        rows_to_csv(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(min: i64, max: i64, mode: RandomMode) -> RandomInput {
        RandomInput {
            min,
            max,
            mode,
            seed: None,
        }
    }

    #[test]
    fn test_single_is_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = CalcConfig::default();
        for _ in 0..100 {
            let result = input(1, 6, RandomMode::Single)
                .generate_with(&mut rng, &config)
                .unwrap();
            assert_eq!(result.values.len(), 1);
            assert!((1..=6).contains(&result.values[0]));
            assert!(result.summary.is_none());
        }
    }

    #[test]
    fn test_unique_draws_have_no_duplicates() {
        let mut rng = StdRng::seed_from_u64(42);
        let result = input(
            1,
            20,
            RandomMode::Multiple {
                count: 20,
                allow_duplicates: false,
            },
        )
        .generate_with(&mut rng, &CalcConfig::default())
        .unwrap();
        let mut sorted = result.values.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=20).collect::<Vec<_>>());
        assert_eq!(result.summary.unwrap().count, 20);
    }

    #[test]
    fn test_unique_count_larger_than_range_rejected() {
        let result = input(
            1,
            5,
            RandomMode::Multiple {
                count: 6,
                allow_duplicates: false,
            },
        )
        .compute(&CalcConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_count_limit() {
        let config = CalcConfig::default();
        let too_many = input(
            1,
            100,
            RandomMode::Multiple {
                count: 10_001,
                allow_duplicates: true,
            },
        );
        assert!(too_many.compute(&config).is_err());
        let zero = input(
            1,
            100,
            RandomMode::Multiple {
                count: 0,
                allow_duplicates: true,
            },
        );
        assert!(zero.compute(&config).is_err());
    }

    #[test]
    fn test_sequence_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(3);
        let result = input(-5, 5, RandomMode::Sequence)
            .generate_with(&mut rng, &CalcConfig::default())
            .unwrap();
        let mut sorted = result.values.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (-5..=5).collect::<Vec<_>>());
        let summary = result.summary.unwrap();
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.range, 10.0);
    }

    #[test]
    fn test_seed_makes_output_reproducible() {
        let seeded = RandomInput {
            seed: Some(99),
            ..input(
                1,
                1000,
                RandomMode::Multiple {
                    count: 10,
                    allow_duplicates: true,
                },
            )
        };
        let config = CalcConfig::default();
        assert_eq!(
            seeded.compute(&config).unwrap().values,
            seeded.compute(&config).unwrap().values
        );
    }

    #[test]
    fn test_min_must_be_below_max() {
        assert!(input(5, 5, RandomMode::Single)
            .compute(&CalcConfig::default())
            .is_err());
    }

    #[test]
    fn test_text_exports() {
        let result = RandomResult {
            values: vec![4, 8, 15],
            summary: None,
        };
        assert_eq!(result.as_text(), "4\n8\n15");
        assert_eq!(result.clipboard_text(), "4, 8, 15");
        assert_eq!(result.to_csv().unwrap(), "Index,Value\n1,4\n2,8\n3,15\n");
    }
}
