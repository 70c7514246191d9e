use crate::config::CalcConfig;
use crate::domain::ports::Calculator;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::validate_finite;
use serde::{Deserialize, Serialize};

const RIGHT_ANGLE_TOLERANCE: f64 = 0.01;
const SIDE_TOLERANCE: f64 = 0.001;

/// Angles are in degrees. Side `a` is opposite angle A, and so on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TriangleInput {
    Sss { a: f64, b: f64, c: f64 },
    Sas { a: f64, b: f64, angle_c: f64 },
    Asa { angle_a: f64, angle_b: f64, c: f64 },
    Aas { angle_a: f64, angle_b: f64, a: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sides {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Angles {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AngleKind {
    Right,
    Obtuse,
    Acute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SideKind {
    Equilateral,
    Isosceles,
    Scalene,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriangleResult {
    pub sides: Sides,
    pub angles: Angles,
    pub area: f64,
    pub perimeter: f64,
    pub inradius: f64,
    pub circumradius: f64,
    pub angle_kind: AngleKind,
    pub side_kind: SideKind,
    pub classification: String,
}

fn invalid(reason: impl Into<String>) -> CalcError {
    CalcError::InvalidTriangle {
        reason: reason.into(),
    }
}

fn positive_side(name: &str, value: f64) -> Result<f64> {
    validate_finite(name, value)?;
    if value <= 0.0 {
        return Err(invalid(format!("side {} must be positive", name)));
    }
    Ok(value)
}

fn open_angle(name: &str, value: f64) -> Result<f64> {
    validate_finite(name, value)?;
    if value <= 0.0 || value >= 180.0 {
        return Err(invalid(format!("angle {} must be between 0 and 180 degrees", name)));
    }
    Ok(value)
}

fn angle_pair(angle_a: f64, angle_b: f64) -> Result<(f64, f64, f64)> {
    let a = open_angle("A", angle_a)?;
    let b = open_angle("B", angle_b)?;
    if a + b >= 180.0 {
        return Err(invalid("angles A and B must sum to less than 180 degrees"));
    }
    Ok((a, b, 180.0 - a - b))
}

/// Angle opposite `opposite`, in degrees, by the law of cosines.
fn angle_from_sides(opposite: f64, adjacent1: f64, adjacent2: f64) -> f64 {
    let cos = (adjacent1.powi(2) + adjacent2.powi(2) - opposite.powi(2)) / (2.0 * adjacent1 * adjacent2);
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

pub fn classify_angles(angles: &Angles) -> AngleKind {
    let all = [angles.a, angles.b, angles.c];
    if all.iter().any(|x| (x - 90.0).abs() < RIGHT_ANGLE_TOLERANCE) {
        AngleKind::Right
    } else if all.iter().any(|x| *x > 90.0) {
        AngleKind::Obtuse
    } else {
        AngleKind::Acute
    }
}

pub fn classify_sides(sides: &Sides) -> SideKind {
    let ab = (sides.a - sides.b).abs() < SIDE_TOLERANCE;
    let bc = (sides.b - sides.c).abs() < SIDE_TOLERANCE;
    let ac = (sides.a - sides.c).abs() < SIDE_TOLERANCE;
    if ab && bc {
        SideKind::Equilateral
    } else if ab || bc || ac {
        SideKind::Isosceles
    } else {
        SideKind::Scalene
    }
}

impl TriangleInput {
    fn solve(&self) -> Result<(Sides, Angles)> {
        match *self {
            TriangleInput::Sss { a, b, c } => {
                let (a, b, c) = (positive_side("a", a)?, positive_side("b", b)?, positive_side("c", c)?);
                if a + b <= c || a + c <= b || b + c <= a {
                    return Err(invalid("sides do not satisfy the triangle inequality"));
                }
                let angle_a = angle_from_sides(a, b, c);
                let angle_b = angle_from_sides(b, a, c);
                Ok((
                    Sides { a, b, c },
                    Angles {
                        a: angle_a,
                        b: angle_b,
                        c: 180.0 - angle_a - angle_b,
                    },
                ))
            }
            TriangleInput::Sas { a, b, angle_c } => {
                let (a, b) = (positive_side("a", a)?, positive_side("b", b)?);
                let angle_c = open_angle("C", angle_c)?;
                let c = (a * a + b * b - 2.0 * a * b * angle_c.to_radians().cos()).sqrt();
                let angle_a = angle_from_sides(a, b, c);
                Ok((
                    Sides { a, b, c },
                    Angles {
                        a: angle_a,
                        b: 180.0 - angle_a - angle_c,
                        c: angle_c,
                    },
                ))
            }
            TriangleInput::Asa { angle_a, angle_b, c } => {
                let c = positive_side("c", c)?;
                let (angle_a, angle_b, angle_c) = angle_pair(angle_a, angle_b)?;
                let ratio = c / angle_c.to_radians().sin();
                Ok((
                    Sides {
                        a: ratio * angle_a.to_radians().sin(),
                        b: ratio * angle_b.to_radians().sin(),
                        c,
                    },
                    Angles {
                        a: angle_a,
                        b: angle_b,
                        c: angle_c,
                    },
                ))
            }
            TriangleInput::Aas { angle_a, angle_b, a } => {
                let a = positive_side("a", a)?;
                let (angle_a, angle_b, angle_c) = angle_pair(angle_a, angle_b)?;
                let ratio = a / angle_a.to_radians().sin();
                Ok((
                    Sides {
                        a,
                        b: ratio * angle_b.to_radians().sin(),
                        c: ratio * angle_c.to_radians().sin(),
                    },
                    Angles {
                        a: angle_a,
                        b: angle_b,
                        c: angle_c,
                    },
                ))
            }
        }
    }
}

impl Calculator for TriangleInput {
    type Output = TriangleResult;

    fn compute(&self, _config: &CalcConfig) -> Result<TriangleResult> {
        let (sides, angles) = self.solve()?;

        let perimeter = sides.a + sides.b + sides.c;
        let s = perimeter / 2.0;
        let area = (s * (s - sides.a) * (s - sides.b) * (s - sides.c)).max(0.0).sqrt();
        if area == 0.0 {
            return Err(invalid("the triangle is degenerate"));
        }

        let angle_kind = classify_angles(&angles);
        let side_kind = classify_sides(&sides);
        Ok(TriangleResult {
            sides,
            angles,
            area,
            perimeter,
            inradius: area / s,
            circumradius: sides.a * sides.b * sides.c / (4.0 * area),
            angle_kind,
            side_kind,
            classification: format!("{:?}, {:?}", angle_kind, side_kind),
        })
    }
}
