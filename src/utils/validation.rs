use crate::utils::error::{CalcError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Parses a free-text decimal field, rejecting blanks and non-finite values.
pub fn parse_decimal(field_name: &str, raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CalcError::MissingField {
            field: field_name.to_string(),
        });
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CalcError::ParseError {
            field: field_name.to_string(),
            value: trimmed.to_string(),
        }),
    }
}

pub fn validate_finite(field_name: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(CalcError::ParseError {
            field: field_name.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Rejects a computed value that overflowed to infinity or lost meaning as NaN.
pub fn validate_result(field_name: &str, value: f64) -> Result<f64> {
    if value.is_nan() {
        return Err(CalcError::out_of_domain(field_name, "result is not a real number"));
    }
    if value.is_infinite() {
        return Err(CalcError::overflow(field_name));
    }
    Ok(value)
}

pub fn validate_positive(field_name: &str, value: f64) -> Result<f64> {
    validate_finite(field_name, value)?;
    if value <= 0.0 {
        return Err(CalcError::out_of_domain(field_name, "must be greater than 0"));
    }
    Ok(value)
}

pub fn validate_non_negative(field_name: &str, value: f64) -> Result<f64> {
    validate_finite(field_name, value)?;
    if value < 0.0 {
        return Err(CalcError::out_of_domain(field_name, "cannot be negative"));
    }
    Ok(value)
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<T> {
    if value < min || value > max {
        return Err(CalcError::out_of_domain(
            field_name,
            format!("must be between {} and {}", min, max),
        ));
    }
    Ok(value)
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| CalcError::MissingField {
        field: field_name.to_string(),
    })
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(CalcError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// Turns a `years * periods_per_year` product into a whole period count.
pub fn period_count(field_name: &str, years: f64, periods_per_year: u32) -> Result<u32> {
    validate_positive(field_name, years)?;
    let periods = (years * periods_per_year as f64).round();
    if periods < 1.0 {
        return Err(CalcError::out_of_domain(field_name, "term is shorter than one payment period"));
    }
    if periods > u32::MAX as f64 {
        return Err(CalcError::overflow(format!("{} periods", field_name)));
    }
    Ok(periods as u32)
}
