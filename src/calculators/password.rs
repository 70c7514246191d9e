use crate::config::CalcConfig;
use crate::domain::ports::Calculator;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::validate_range;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";
const SIMILAR: &str = "il1Lo0O";
const AMBIGUOUS: &str = "{}[]()/\\'\"~,;<>.";

pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 128;
pub const MAX_SCORE: u8 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordOptions {
    #[serde(default = "default_length")]
    pub length: usize,
    #[serde(default = "enabled")]
    pub uppercase: bool,
    #[serde(default = "enabled")]
    pub lowercase: bool,
    #[serde(default = "enabled")]
    pub digits: bool,
    #[serde(default = "enabled")]
    pub symbols: bool,
    #[serde(default)]
    pub exclude_similar: bool,
    #[serde(default)]
    pub exclude_ambiguous: bool,
}

fn default_length() -> usize {
    12
}

fn enabled() -> bool {
    true
}

impl Default for PasswordOptions {
    fn default() -> Self {
        PasswordOptions {
            length: default_length(),
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: true,
            exclude_similar: false,
            exclude_ambiguous: false,
        }
    }
}

impl PasswordOptions {
    /// Selected character classes after exclusions. Classes left empty are dropped.
    fn character_classes(&self) -> Vec<Vec<char>> {
        [
            (self.uppercase, UPPERCASE),
            (self.lowercase, LOWERCASE),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ]
        .into_iter()
        .filter(|(selected, _)| *selected)
        .map(|(_, chars)| {
            chars
                .chars()
                .filter(|c| !(self.exclude_similar && SIMILAR.contains(*c)))
                .filter(|c| !(self.exclude_ambiguous && AMBIGUOUS.contains(*c)))
                .collect::<Vec<char>>()
        })
        .filter(|class| !class.is_empty())
        .collect()
    }
}

/// Generates a password containing at least one character of every selected class.
pub fn generate<R: Rng + ?Sized>(options: &PasswordOptions, rng: &mut R) -> Result<String> {
    validate_range("length", options.length, MIN_LENGTH, MAX_LENGTH)?;
    let classes = options.character_classes();
    if classes.is_empty() {
        return Err(CalcError::out_of_domain(
            "character_classes",
            "select at least one character type",
        ));
    }

    let charset: Vec<char> = classes.iter().flatten().copied().collect();
    let mut password: Vec<char> = classes
        .iter()
        .filter_map(|class| class.choose(rng).copied())
        .collect();
    while password.len() < options.length {
        if let Some(c) = charset.choose(rng) {
            password.push(*c);
        }
    }
    password.shuffle(rng);
    Ok(password.into_iter().collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PasswordStrength {
    pub score: u8,
    pub max_score: u8,
    pub label: &'static str,
    pub feedback: Vec<&'static str>,
}

pub fn assess(password: &str) -> PasswordStrength {
    let length = password.chars().count();
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_ascii_alphanumeric());

    let score = [
        length >= 8,
        length >= 12,
        length >= 16,
        has_lower,
        has_upper,
        has_digit,
        has_symbol,
    ]
    .iter()
    .filter(|passed| **passed)
    .count() as u8;

    let mut feedback = Vec::new();
    if length < 8 {
        feedback.push("Use at least 8 characters");
    }
    if !has_lower {
        feedback.push("Add lowercase letters");
    }
    if !has_upper {
        feedback.push("Add uppercase letters");
    }
    if !has_digit {
        feedback.push("Add numbers");
    }
    if !has_symbol {
        feedback.push("Add symbols");
    }

    let label = match score {
        0..=1 => "Very Weak",
        2..=3 => "Weak",
        4 => "Good",
        5..=6 => "Strong",
        _ => "Very Strong",
    };

    PasswordStrength {
        score,
        max_score: MAX_SCORE,
        label,
        feedback,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PasswordInput {
    Generate {
        #[serde(flatten)]
        options: PasswordOptions,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },
    Assess {
        password: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PasswordResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub strength: PasswordStrength,
}

impl Calculator for PasswordInput {
    type Output = PasswordResult;

    fn compute(&self, _config: &CalcConfig) -> Result<PasswordResult> {
        match self {
            PasswordInput::Generate { options, seed } => {
                let password = match seed {
                    Some(seed) => generate(options, &mut StdRng::seed_from_u64(*seed))?,
                    None => generate(options, &mut rand::thread_rng())?,
                };
                Ok(PasswordResult {
                    strength: assess(&password),
                    password: Some(password),
                })
            }
            PasswordInput::Assess { password } => Ok(PasswordResult {
                password: None,
                strength: assess(password),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_password_contains_every_class() {
        let mut rng = StdRng::seed_from_u64(11);
        for length in [4, 12, 64] {
            let options = PasswordOptions {
                length,
                ..PasswordOptions::default()
            };
            let password = generate(&options, &mut rng).unwrap();
            assert_eq!(password.chars().count(), length);
            assert!(password.chars().any(|c| c.is_ascii_uppercase()));
            assert!(password.chars().any(|c| c.is_ascii_lowercase()));
            assert!(password.chars().any(|c| c.is_ascii_digit()));
            assert!(password.chars().any(|c| SYMBOLS.contains(c)));
        }
    }

    #[test]
    fn test_exclusions_are_respected() {
        let mut rng = StdRng::seed_from_u64(5);
        let options = PasswordOptions {
            length: 128,
            exclude_similar: true,
            exclude_ambiguous: true,
            ..PasswordOptions::default()
        };
        for _ in 0..20 {
            let password = generate(&options, &mut rng).unwrap();
            assert!(!password.chars().any(|c| SIMILAR.contains(c)));
            assert!(!password.chars().any(|c| AMBIGUOUS.contains(c)));
        }
    }

    #[test]
    fn test_length_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for length in [3, 129] {
            let options = PasswordOptions {
                length,
                ..PasswordOptions::default()
            };
            assert!(generate(&options, &mut rng).is_err());
        }
    }

    #[test]
    fn test_no_classes_selected() {
        let options = PasswordOptions {
            uppercase: false,
            lowercase: false,
            digits: false,
            symbols: false,
            ..PasswordOptions::default()
        };
        assert!(generate(&options, &mut StdRng::seed_from_u64(1)).is_err());
    }

    #[test]
    fn test_strength_scoring() {
        let weak = assess("abc");
        assert_eq!(weak.score, 1);
        assert_eq!(weak.label, "Very Weak");
        assert_eq!(weak.feedback.len(), 4);

        let medium = assess("password12");
        assert_eq!(medium.score, 3);
        assert_eq!(medium.label, "Weak");

        let strong = assess("Tr0ub4dor&3xyzQ!");
        assert_eq!(strong.score, 7);
        assert_eq!(strong.label, "Very Strong");
        assert!(strong.feedback.is_empty());
    }

    #[test]
    fn test_generate_from_json() {
        let input: PasswordInput =
            serde_json::from_str(r#"{"mode": "generate", "length": 20, "symbols": false, "seed": 8}"#)
                .unwrap();
        let result = input.compute(&CalcConfig::default()).unwrap();
        let password = result.password.unwrap();
        assert_eq!(password.len(), 20);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(result.strength.score >= 5);
    }
}
