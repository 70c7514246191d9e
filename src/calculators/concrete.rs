use crate::config::CalcConfig;
use crate::domain::ports::Calculator;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::{validate_positive, validate_range};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const CUBIC_FEET_PER_YARD: f64 = 27.0;
const CUBIC_METERS_PER_FOOT: f64 = 0.028_316_846_592;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    Inches,
    #[default]
    Feet,
    Yards,
    Meters,
    Centimeters,
}

impl LengthUnit {
    pub fn to_feet(self, value: f64) -> f64 {
        match self {
            LengthUnit::Inches => value / 12.0,
            LengthUnit::Feet => value,
            LengthUnit::Yards => value * 3.0,
            LengthUnit::Meters => value / 0.3048,
            LengthUnit::Centimeters => value / 30.48,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ConcreteShape {
    Slab { length: f64, width: f64, thickness: f64 },
    Footing { length: f64, width: f64, depth: f64 },
    Wall { length: f64, height: f64, thickness: f64 },
    Column { diameter: f64, height: f64 },
    Stairs { steps: Vec<Step> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcreteInput {
    #[serde(flatten)]
    pub shape: ConcreteShape,
    #[serde(default)]
    pub unit: LengthUnit,
    #[serde(default = "default_waste_percent")]
    pub waste_percent: f64,
}

fn default_waste_percent() -> f64 {
    10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BagCounts {
    pub lb40: u64,
    pub lb60: u64,
    pub lb80: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConcreteCosts {
    pub ready_mix: f64,
    pub bags_60lb: f64,
    pub bags_80lb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcreteResult {
    pub volume_cubic_feet: f64,
    pub volume_with_waste_cubic_feet: f64,
    pub cubic_yards: f64,
    pub cubic_meters: f64,
    pub waste_percent: f64,
    pub bags: BagCounts,
    pub costs: ConcreteCosts,
    pub weight_pounds: f64,
    pub weight_tons: f64,
}

/// Bags needed, rounding up while tolerating float noise on exact counts.
fn bags_needed(cubic_yards: f64, bags_per_yard: f64) -> u64 {
    (cubic_yards * bags_per_yard - 1e-9).ceil().max(0.0) as u64
}

impl ConcreteInput {
    fn feet(&self, field: &str, value: f64) -> Result<f64> {
        Ok(self.unit.to_feet(validate_positive(field, value)?))
    }

    pub fn volume_cubic_feet(&self) -> Result<f64> {
        match &self.shape {
            ConcreteShape::Slab {
                length,
                width,
                thickness,
            } => Ok(self.feet("length", *length)? * self.feet("width", *width)? * self.feet("thickness", *thickness)?),
            ConcreteShape::Footing { length, width, depth } => {
                Ok(self.feet("length", *length)? * self.feet("width", *width)? * self.feet("depth", *depth)?)
            }
            ConcreteShape::Wall {
                length,
                height,
                thickness,
            } => Ok(self.feet("length", *length)? * self.feet("height", *height)? * self.feet("thickness", *thickness)?),
            ConcreteShape::Column { diameter, height } => {
                let radius = self.feet("diameter", *diameter)? / 2.0;
                Ok(PI * radius * radius * self.feet("height", *height)?)
            }
            ConcreteShape::Stairs { steps } => {
                if steps.is_empty() {
                    return Err(CalcError::MissingField {
                        field: "steps".to_string(),
                    });
                }
                steps.iter().try_fold(0.0, |total, step| {
                    Ok(total
                        + self.feet("step.length", step.length)?
                            * self.feet("step.width", step.width)?
                            * self.feet("step.height", step.height)?)
                })
            }
        }
    }
}

impl Calculator for ConcreteInput {
    type Output = ConcreteResult;

    fn compute(&self, config: &CalcConfig) -> Result<ConcreteResult> {
        let waste_percent = validate_range("waste_percent", self.waste_percent, 0.0, 100.0)?;
        let volume = self.volume_cubic_feet()?;
        let with_waste = volume * (1.0 + waste_percent / 100.0);
        let cubic_yards = with_waste / CUBIC_FEET_PER_YARD;

        let bags = BagCounts {
            lb40: bags_needed(cubic_yards, 90.0),
            lb60: bags_needed(cubic_yards, 60.0),
            lb80: bags_needed(cubic_yards, 45.0),
        };
        let pricing = &config.concrete;
        let weight_pounds = with_waste * pricing.weight_lb_per_cubic_foot;

        Ok(ConcreteResult {
            volume_cubic_feet: volume,
            volume_with_waste_cubic_feet: with_waste,
            cubic_yards,
            cubic_meters: with_waste * CUBIC_METERS_PER_FOOT,
            waste_percent,
            bags,
            costs: ConcreteCosts {
                ready_mix: cubic_yards * pricing.ready_mix_per_cubic_yard,
                bags_60lb: bags.lb60 as f64 * pricing.bag_60lb_price,
                bags_80lb: bags.lb80 as f64 * pricing.bag_80lb_price,
            },
            weight_pounds,
            weight_tons: weight_pounds / 2000.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slab(length: f64, width: f64, thickness: f64, unit: LengthUnit, waste_percent: f64) -> ConcreteInput {
        ConcreteInput {
            shape: ConcreteShape::Slab {
                length,
                width,
                thickness,
            },
            unit,
            waste_percent,
        }
    }

    #[test]
    fn test_slab_one_cubic_yard() {
        let result = slab(3.0, 3.0, 3.0, LengthUnit::Feet, 0.0)
            .compute(&CalcConfig::default())
            .unwrap();
        assert_eq!(result.volume_cubic_feet, 27.0);
        assert_eq!(result.cubic_yards, 1.0);
        assert_eq!(result.bags, BagCounts { lb40: 90, lb60: 60, lb80: 45 });
        assert_eq!(result.costs.ready_mix, 100.0);
        assert_eq!(result.costs.bags_60lb, 270.0);
        assert_eq!(result.costs.bags_80lb, 247.5);
        assert_eq!(result.weight_pounds, 4050.0);
        assert!((result.cubic_meters - 0.764554857984).abs() < 1e-9);
    }

    #[test]
    fn test_waste_factor_and_inch_thickness() {
        let padded = slab(10.0, 10.0, 4.0, LengthUnit::Feet, 10.0)
            .compute(&CalcConfig::default())
            .unwrap();
        assert!((padded.volume_with_waste_cubic_feet - 440.0).abs() < 1e-9);

        let inches = slab(120.0, 120.0, 4.0, LengthUnit::Inches, 0.0)
            .compute(&CalcConfig::default())
            .unwrap();
        assert!((inches.volume_cubic_feet - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(inches.bags.lb80, 56);
    }

    #[test]
    fn test_column_and_stairs() {
        let column = ConcreteInput {
            shape: ConcreteShape::Column {
                diameter: 2.0,
                height: 10.0,
            },
            unit: LengthUnit::Feet,
            waste_percent: 0.0,
        };
        let result = column.compute(&CalcConfig::default()).unwrap();
        assert!((result.volume_cubic_feet - 10.0 * PI).abs() < 1e-9);

        let stairs: ConcreteInput = serde_json::from_str(
            r#"{"shape": "stairs", "unit": "feet", "waste_percent": 0,
                "steps": [{"length": 4, "width": 1, "height": 0.5}, {"length": 4, "width": 1, "height": 1}]}"#,
        )
        .unwrap();
        let result = stairs.compute(&CalcConfig::default()).unwrap();
        assert!((result.volume_cubic_feet - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_configured_pricing() {
        let mut config = CalcConfig::default();
        config.concrete.ready_mix_per_cubic_yard = 150.0;
        let result = slab(3.0, 3.0, 3.0, LengthUnit::Feet, 0.0).compute(&config).unwrap();
        assert_eq!(result.costs.ready_mix, 150.0);
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        let config = CalcConfig::default();
        assert!(slab(0.0, 3.0, 3.0, LengthUnit::Feet, 10.0).compute(&config).is_err());
        assert!(slab(3.0, 3.0, 3.0, LengthUnit::Feet, -5.0).compute(&config).is_err());
        let no_steps = ConcreteInput {
            shape: ConcreteShape::Stairs { steps: vec![] },
            unit: LengthUnit::Feet,
            waste_percent: 10.0,
        };
        assert!(matches!(no_steps.compute(&config), Err(CalcError::MissingField { .. })));
    }

    #[test]
    fn test_metric_units() {
        let result = slab(1.0, 1.0, 1.0, LengthUnit::Meters, 0.0)
            .compute(&CalcConfig::default())
            .unwrap();
        assert!((result.cubic_meters - 1.0).abs() < 1e-9);
    }
}
