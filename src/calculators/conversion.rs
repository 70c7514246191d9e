use crate::config::CalcConfig;
use crate::domain::ports::Calculator;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::validate_finite;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitCategory {
    Length,
    Weight,
    Temperature,
    Area,
    Volume,
    Speed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Unit {
    pub code: &'static str,
    pub name: &'static str,
    /// Multiplier to the category's base unit. Unused for temperature.
    pub factor: f64,
}

const fn unit(code: &'static str, name: &'static str, factor: f64) -> Unit {
    Unit { code, name, factor }
}

// base: millimeter
const LENGTH: &[Unit] = &[
    unit("mm", "Millimeters", 1.0),
    unit("cm", "Centimeters", 10.0),
    unit("m", "Meters", 1_000.0),
    unit("km", "Kilometers", 1_000_000.0),
    unit("in", "Inches", 25.4),
    unit("ft", "Feet", 304.8),
    unit("yd", "Yards", 914.4),
    unit("mi", "Miles", 1_609_344.0),
];

// base: milligram
const WEIGHT: &[Unit] = &[
    unit("mg", "Milligrams", 1.0),
    unit("g", "Grams", 1_000.0),
    unit("kg", "Kilograms", 1_000_000.0),
    unit("oz", "Ounces", 28_349.523125),
    unit("lb", "Pounds", 453_592.37),
    unit("ton", "Tons (metric)", 1_000_000_000.0),
];

const TEMPERATURE: &[Unit] = &[
    unit("c", "Celsius", 1.0),
    unit("f", "Fahrenheit", 1.0),
    unit("k", "Kelvin", 1.0),
    unit("r", "Rankine", 1.0),
];

// base: square millimeter
const AREA: &[Unit] = &[
    unit("sqmm", "Square Millimeters", 1.0),
    unit("sqcm", "Square Centimeters", 100.0),
    unit("sqm", "Square Meters", 1_000_000.0),
    unit("hectare", "Hectares", 10_000_000_000.0),
    unit("sqin", "Square Inches", 645.16),
    unit("sqft", "Square Feet", 92_903.04),
    unit("sqyd", "Square Yards", 836_127.36),
    unit("acre", "Acres", 4_046_856_422.4),
];

// base: milliliter
const VOLUME: &[Unit] = &[
    unit("ml", "Milliliters", 1.0),
    unit("l", "Liters", 1_000.0),
    unit("gal", "Gallons (US)", 3_785.411784),
    unit("qt", "Quarts (US)", 946.352946),
    unit("pt", "Pints (US)", 473.176473),
    unit("cup", "Cups (US)", 236.5882365),
    unit("floz", "Fluid Ounces (US)", 29.5735295625),
    unit("tbsp", "Tablespoons", 14.78676478125),
    unit("tsp", "Teaspoons", 4.92892159375),
];

// base: meter per second
const SPEED: &[Unit] = &[
    unit("mps", "Meters per Second", 1.0),
    unit("kph", "Kilometers per Hour", 1.0 / 3.6),
    unit("mph", "Miles per Hour", 0.44704),
    unit("fps", "Feet per Second", 0.3048),
    unit("knot", "Knots", 1_852.0 / 3_600.0),
];

impl UnitCategory {
    pub const ALL: [UnitCategory; 6] = [
        UnitCategory::Length,
        UnitCategory::Weight,
        UnitCategory::Temperature,
        UnitCategory::Area,
        UnitCategory::Volume,
        UnitCategory::Speed,
    ];

    pub fn units(self) -> &'static [Unit] {
        match self {
            UnitCategory::Length => LENGTH,
            UnitCategory::Weight => WEIGHT,
            UnitCategory::Temperature => TEMPERATURE,
            UnitCategory::Area => AREA,
            UnitCategory::Volume => VOLUME,
            UnitCategory::Speed => SPEED,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UnitCategory::Length => "length",
            UnitCategory::Weight => "weight",
            UnitCategory::Temperature => "temperature",
            UnitCategory::Area => "area",
            UnitCategory::Volume => "volume",
            UnitCategory::Speed => "speed",
        }
    }

    pub fn find(self, code: &str) -> Result<&'static Unit> {
        let code = code.trim();
        self.units()
            .iter()
            .find(|u| u.code.eq_ignore_ascii_case(code))
            .ok_or_else(|| CalcError::UnknownUnit {
                category: self.name().to_string(),
                unit: code.to_string(),
            })
    }
}

fn to_celsius(value: f64, code: &str) -> f64 {
    match code {
        "f" => (value - 32.0) * 5.0 / 9.0,
        "k" => value - 273.15,
        "r" => (value - 491.67) * 5.0 / 9.0,
        _ => value,
    }
}

fn from_celsius(celsius: f64, code: &str) -> f64 {
    match code {
        "f" => celsius * 9.0 / 5.0 + 32.0,
        "k" => celsius + 273.15,
        "r" => celsius * 9.0 / 5.0 + 491.67,
        _ => celsius,
    }
}

/// Converts `value` between two unit codes of the same category.
pub fn convert(category: UnitCategory, value: f64, from: &str, to: &str) -> Result<f64> {
    let value = validate_finite("value", value)?;
    let from = category.find(from)?;
    let to = category.find(to)?;

    if category == UnitCategory::Temperature {
        let celsius = to_celsius(value, from.code);
        if celsius < -273.15 - 1e-9 {
            return Err(CalcError::out_of_domain("value", "temperature is below absolute zero"));
        }
        return Ok(from_celsius(celsius, to.code));
    }
    Ok(value * from.factor / to.factor)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionInput {
    pub category: UnitCategory,
    pub value: f64,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    pub value: f64,
    pub from_unit: &'static str,
    pub converted: f64,
    pub to_unit: &'static str,
    pub formatted: String,
}

/// Up to six decimals with trailing zeros removed.
fn format_trimmed(value: f64) -> String {
    let text = format!("{:.6}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

impl Calculator for ConversionInput {
    type Output = ConversionResult;

    fn compute(&self, _config: &CalcConfig) -> Result<ConversionResult> {
        let converted = convert(self.category, self.value, &self.from, &self.to)?;
        let from = self.category.find(&self.from)?;
        let to = self.category.find(&self.to)?;
        Ok(ConversionResult {
            value: self.value,
            from_unit: from.name,
            converted,
            to_unit: to.name,
            formatted: format!("{} {}", format_trimmed(converted), to.name),
        })
    }
}
