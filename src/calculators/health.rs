use crate::config::CalcConfig;
use crate::domain::ports::Calculator;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::{validate_positive, validate_range, validate_required_field};
use serde::{Deserialize, Serialize};

const CM_PER_INCH: f64 = 2.54;
const KG_PER_POUND: f64 = 0.453_592_37;
const BASE_HEIGHT_CM: f64 = 152.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    /// Centimeters and kilograms.
    #[default]
    Metric,
    /// Inches and pounds.
    Imperial,
}

impl UnitSystem {
    fn height_cm(self, height: f64) -> f64 {
        match self {
            UnitSystem::Metric => height,
            UnitSystem::Imperial => height * CM_PER_INCH,
        }
    }

    fn weight_kg(self, weight: f64) -> f64 {
        match self {
            UnitSystem::Metric => weight,
            UnitSystem::Imperial => weight * KG_PER_POUND,
        }
    }

    fn weight_out(self, kg: f64) -> f64 {
        match self {
            UnitSystem::Metric => kg,
            UnitSystem::Imperial => kg / KG_PER_POUND,
        }
    }

    fn weight_label(self) -> &'static str {
        match self {
            UnitSystem::Metric => "kg",
            UnitSystem::Imperial => "lbs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

// BMI

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmiInput {
    pub height: f64,
    pub weight: f64,
    #[serde(default)]
    pub units: UnitSystem,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BmiResult {
    pub bmi: f64,
    pub category: &'static str,
}

pub fn bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let meters = height_cm / 100.0;
    weight_kg / (meters * meters)
}

pub fn bmi_category(bmi: f64) -> &'static str {
    if bmi < 18.5 {
        "Underweight"
    } else if bmi < 25.0 {
        "Normal weight"
    } else if bmi < 30.0 {
        "Overweight"
    } else {
        "Obese"
    }
}

impl Calculator for BmiInput {
    type Output = BmiResult;

    fn compute(&self, _config: &CalcConfig) -> Result<BmiResult> {
        let height = self.units.height_cm(validate_positive("height", self.height)?);
        let weight = self.units.weight_kg(validate_positive("weight", self.weight)?);
        let value = bmi(height, weight);
        Ok(BmiResult {
            bmi: value,
            category: bmi_category(value),
        })
    }
}

// Body fat

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyFatMethod {
    #[default]
    Navy,
    Ymca,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyFatInput {
    pub sex: Sex,
    #[serde(default)]
    pub method: BodyFatMethod,
    #[serde(default)]
    pub units: UnitSystem,
    pub height: f64,
    pub weight: f64,
    pub neck: Option<f64>,
    pub waist: Option<f64>,
    pub hip: Option<f64>,
    pub age: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyFatResult {
    pub body_fat_percent: f64,
    pub category: &'static str,
    pub fat_mass: f64,
    pub lean_mass: f64,
    pub mass_unit: &'static str,
}

fn log_argument(field: &str, value: f64) -> Result<f64> {
    if value <= 0.0 {
        return Err(CalcError::out_of_domain(
            field,
            "measurements give a non-positive logarithm argument",
        ));
    }
    Ok(value.log10())
}

fn body_fat_category(sex: Sex, percent: f64) -> &'static str {
    let limits = match sex {
        Sex::Male => [6.0, 14.0, 18.0, 25.0],
        Sex::Female => [14.0, 21.0, 25.0, 32.0],
    };
    let labels = ["Essential Fat", "Athletes", "Fitness", "Average"];
    limits
        .iter()
        .zip(labels)
        .find(|(limit, _)| percent < **limit)
        .map(|(_, label)| label)
        .unwrap_or("Obese")
}

impl BodyFatInput {
    fn measurement(&self, field: &str, value: &Option<f64>) -> Result<f64> {
        let value = validate_positive(field, *validate_required_field(field, value)?)?;
        Ok(self.units.height_cm(value))
    }
}

impl Calculator for BodyFatInput {
    type Output = BodyFatResult;

    fn compute(&self, _config: &CalcConfig) -> Result<BodyFatResult> {
        let height = self.units.height_cm(validate_positive("height", self.height)?);
        let weight = self.units.weight_kg(validate_positive("weight", self.weight)?);

        let raw = match self.method {
            BodyFatMethod::Navy => {
                let neck = self.measurement("neck", &self.neck)?;
                let waist = self.measurement("waist", &self.waist)?;
                let log_height = height.log10();
                match self.sex {
                    Sex::Male => {
                        let log_girth = log_argument("waist", waist - neck)?;
                        495.0 / (1.0324 - 0.19077 * log_girth + 0.15456 * log_height) - 450.0
                    }
                    Sex::Female => {
                        let hip = self.measurement("hip", &self.hip)?;
                        let log_girth = log_argument("waist", waist + hip - neck)?;
                        495.0 / (1.29579 - 0.35004 * log_girth + 0.22100 * log_height) - 450.0
                    }
                }
            }
            BodyFatMethod::Ymca => {
                let age = validate_range("age", *validate_required_field("age", &self.age)?, 1.0, 120.0)?;
                let value = bmi(height, weight);
                match self.sex {
                    Sex::Male => 1.61 * value + 0.13 * age - 12.1,
                    Sex::Female => 1.48 * value + 0.16 * age - 7.0,
                }
            }
        };

        let percent = raw.max(0.0);
        let fat_mass = percent / 100.0 * weight;
        Ok(BodyFatResult {
            body_fat_percent: percent,
            category: body_fat_category(self.sex, percent),
            fat_mass: self.units.weight_out(fat_mass),
            lean_mass: self.units.weight_out(weight - fat_mass),
            mass_unit: self.units.weight_label(),
        })
    }
}

// Calories

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightGoal {
    #[default]
    Maintain,
    #[serde(rename = "lose_1")]
    LoseOne,
    #[serde(rename = "lose_2")]
    LoseTwo,
    #[serde(rename = "gain_1")]
    GainOne,
    #[serde(rename = "gain_2")]
    GainTwo,
}

impl WeightGoal {
    /// Daily calorie adjustment and the resulting weekly change in pounds.
    pub fn adjustment(self) -> (f64, i8) {
        match self {
            WeightGoal::Maintain => (0.0, 0),
            WeightGoal::LoseOne => (-500.0, -1),
            WeightGoal::LoseTwo => (-1000.0, -2),
            WeightGoal::GainOne => (500.0, 1),
            WeightGoal::GainTwo => (1000.0, 2),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalorieInput {
    pub sex: Sex,
    pub age: f64,
    pub height: f64,
    pub weight: f64,
    #[serde(default)]
    pub units: UnitSystem,
    #[serde(default)]
    pub activity: ActivityLevel,
    #[serde(default)]
    pub goal: WeightGoal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalorieResult {
    pub bmr: f64,
    pub maintenance: f64,
    pub target: f64,
    pub weekly_change_lb: i8,
}

/// Mifflin-St Jeor basal metabolic rate in kcal/day.
pub fn mifflin_st_jeor(sex: Sex, weight_kg: f64, height_cm: f64, age: f64) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age;
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

impl Calculator for CalorieInput {
    type Output = CalorieResult;

    fn compute(&self, _config: &CalcConfig) -> Result<CalorieResult> {
        let age = validate_range("age", self.age, 1.0, 120.0)?;
        let height = self.units.height_cm(validate_positive("height", self.height)?);
        let weight = self.units.weight_kg(validate_positive("weight", self.weight)?);

        let bmr = mifflin_st_jeor(self.sex, weight, height, age);
        let maintenance = bmr * self.activity.multiplier();
        let (delta, weekly_change_lb) = self.goal.adjustment();
        Ok(CalorieResult {
            bmr: bmr.round(),
            maintenance: maintenance.round(),
            target: (maintenance + delta).round(),
            weekly_change_lb,
        })
    }
}

// Ideal weight

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FrameSize {
    fn factor(self) -> f64 {
        match self {
            FrameSize::Small => 0.9,
            FrameSize::Medium => 1.0,
            FrameSize::Large => 1.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdealWeightInput {
    pub sex: Sex,
    pub height: f64,
    #[serde(default)]
    pub units: UnitSystem,
    #[serde(default)]
    pub frame: FrameSize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdealWeightResult {
    pub robinson: f64,
    pub miller: f64,
    pub devine: f64,
    pub hamwi: f64,
    pub average: f64,
    pub healthy_range: WeightRange,
    pub unit: &'static str,
}

/// `base + per_inch * inches over 5 ft`, never below `base`.
fn formula(height_cm: f64, base: f64, per_inch: f64) -> f64 {
    let inches_over = ((height_cm - BASE_HEIGHT_CM) / CM_PER_INCH).max(0.0);
    base + per_inch * inches_over
}

impl Calculator for IdealWeightInput {
    type Output = IdealWeightResult;

    fn compute(&self, _config: &CalcConfig) -> Result<IdealWeightResult> {
        let height = self.units.height_cm(validate_positive("height", self.height)?);

        let [robinson, miller, devine, hamwi] = match self.sex {
            Sex::Male => [
                formula(height, 52.0, 1.9),
                formula(height, 56.2, 1.41),
                formula(height, 50.0, 2.3),
                formula(height, 48.0, 2.7),
            ],
            Sex::Female => [
                formula(height, 49.0, 1.7),
                formula(height, 53.1, 1.36),
                formula(height, 45.5, 2.3),
                formula(height, 45.5, 2.2),
            ],
        };

        let frame = self.frame.factor();
        let out = |kg: f64| self.units.weight_out(kg);
        let meters = height / 100.0;
        Ok(IdealWeightResult {
            robinson: out(robinson * frame),
            miller: out(miller * frame),
            devine: out(devine * frame),
            hamwi: out(hamwi * frame),
            average: out((robinson + miller + devine + hamwi) / 4.0 * frame),
            healthy_range: WeightRange {
                min: out(18.5 * meters * meters),
                max: out(24.9 * meters * meters),
            },
            unit: self.units.weight_label(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_metric_and_imperial() {
        let metric = BmiInput {
            height: 180.0,
            weight: 81.0,
            units: UnitSystem::Metric,
        }
        .compute(&CalcConfig::default())
        .unwrap();
        assert!((metric.bmi - 25.0).abs() < 1e-9);
        assert_eq!(metric.category, "Overweight");

        let imperial = BmiInput {
            height: 70.0,
            weight: 150.0,
            units: UnitSystem::Imperial,
        }
        .compute(&CalcConfig::default())
        .unwrap();
        assert!((imperial.bmi - 21.52).abs() < 0.01);
        assert_eq!(imperial.category, "Normal weight");
    }

    #[test]
    fn test_bmi_categories() {
        assert_eq!(bmi_category(18.4), "Underweight");
        assert_eq!(bmi_category(18.5), "Normal weight");
        assert_eq!(bmi_category(29.9), "Overweight");
        assert_eq!(bmi_category(30.0), "Obese");
    }

    fn navy_male() -> BodyFatInput {
        BodyFatInput {
            sex: Sex::Male,
            method: BodyFatMethod::Navy,
            units: UnitSystem::Metric,
            height: 178.0,
            weight: 80.0,
            neck: Some(38.0),
            waist: Some(86.0),
            hip: None,
            age: None,
        }
    }

    #[test]
    fn test_navy_body_fat_male() {
        let result = navy_male().compute(&CalcConfig::default()).unwrap();
        let expected = 495.0 / (1.0324 - 0.19077 * 48f64.log10() + 0.15456 * 178f64.log10()) - 450.0;
        assert!((result.body_fat_percent - expected).abs() < 1e-9);
        assert!((result.fat_mass + result.lean_mass - 80.0).abs() < 1e-9);
        assert_eq!(result.category, "Fitness");
    }

    #[test]
    fn test_navy_requires_positive_girth() {
        let input = BodyFatInput {
            waist: Some(30.0),
            neck: Some(38.0),
            ..navy_male()
        };
        assert!(input.compute(&CalcConfig::default()).is_err());

        let female_without_hip = BodyFatInput {
            sex: Sex::Female,
            ..navy_male()
        };
        assert!(matches!(
            female_without_hip.compute(&CalcConfig::default()),
            Err(CalcError::MissingField { .. })
        ));
    }

    #[test]
    fn test_ymca_body_fat() {
        let input = BodyFatInput {
            method: BodyFatMethod::Ymca,
            sex: Sex::Female,
            height: 165.0,
            weight: 60.0,
            age: Some(30.0),
            ..navy_male()
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        let expected = 1.48 * (60.0 / (1.65 * 1.65)) + 0.16 * 30.0 - 7.0;
        assert!((result.body_fat_percent - expected).abs() < 1e-9);
    }

    #[test]
    fn test_calories() {
        let input = CalorieInput {
            sex: Sex::Male,
            age: 30.0,
            height: 180.0,
            weight: 80.0,
            units: UnitSystem::Metric,
            activity: ActivityLevel::Moderate,
            goal: WeightGoal::LoseOne,
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert_eq!(result.bmr, 1780.0);
        assert_eq!(result.maintenance, 2759.0);
        assert_eq!(result.target, 2259.0);
        assert_eq!(result.weekly_change_lb, -1);
    }

    #[test]
    fn test_ideal_weight() {
        let input = IdealWeightInput {
            sex: Sex::Male,
            height: 177.8,
            units: UnitSystem::Metric,
            frame: FrameSize::Medium,
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert!((result.robinson - 71.0).abs() < 1e-9);
        assert!((result.devine - 73.0).abs() < 1e-9);
        assert!((result.hamwi - 75.0).abs() < 1e-9);
        assert!((result.miller - 70.3).abs() < 1e-9);
        assert!((result.average - (71.0 + 70.3 + 73.0 + 75.0) / 4.0).abs() < 1e-9);
        assert_eq!(result.unit, "kg");
    }

    #[test]
    fn test_ideal_weight_short_height_uses_base() {
        let input = IdealWeightInput {
            sex: Sex::Female,
            height: 58.0,
            units: UnitSystem::Imperial,
            frame: FrameSize::Small,
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert!((result.devine - 45.5 * 0.9 / KG_PER_POUND).abs() < 1e-9);
        assert_eq!(result.unit, "lbs");
    }
}
