use crate::config::CalcConfig;
use crate::domain::ports::Calculator;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::{validate_non_negative, validate_positive, validate_range};
use serde::{Deserialize, Serialize};

const FOUR_POINT_LETTERS: [(&str, f64); 13] = [
    ("A+", 4.0),
    ("A", 4.0),
    ("A-", 3.7),
    ("B+", 3.3),
    ("B", 3.0),
    ("B-", 2.7),
    ("C+", 2.3),
    ("C", 2.0),
    ("C-", 1.7),
    ("D+", 1.3),
    ("D", 1.0),
    ("D-", 0.7),
    ("F", 0.0),
];

const FIVE_POINT_LETTERS: [(&str, f64); 12] = [
    ("A+", 5.0),
    ("A", 4.5),
    ("A-", 4.0),
    ("B+", 3.5),
    ("B", 3.0),
    ("B-", 2.5),
    ("C+", 2.0),
    ("C", 1.5),
    ("C-", 1.0),
    ("D+", 0.5),
    ("D", 0.0),
    ("F", 0.0),
];

/// Lower percentage bound and the grade value it earns, highest first.
const FOUR_POINT_PERCENT: [(f64, f64); 12] = [
    (93.0, 4.0),
    (90.0, 3.7),
    (87.0, 3.3),
    (83.0, 3.0),
    (80.0, 2.7),
    (77.0, 2.3),
    (73.0, 2.0),
    (70.0, 1.7),
    (67.0, 1.3),
    (65.0, 1.0),
    (60.0, 0.7),
    (0.0, 0.0),
];

const FIVE_POINT_PERCENT: [(f64, f64); 11] = [
    (97.0, 5.0),
    (90.0, 4.5),
    (87.0, 4.0),
    (83.0, 3.5),
    (80.0, 3.0),
    (77.0, 2.5),
    (73.0, 2.0),
    (70.0, 1.5),
    (67.0, 1.0),
    (60.0, 0.5),
    (0.0, 0.0),
];

const PERCENT_LETTERS: [(f64, &str); 12] = [
    (97.0, "A+"),
    (93.0, "A"),
    (90.0, "A-"),
    (87.0, "B+"),
    (83.0, "B"),
    (80.0, "B-"),
    (77.0, "C+"),
    (73.0, "C"),
    (70.0, "C-"),
    (67.0, "D+"),
    (65.0, "D"),
    (60.0, "D-"),
];

const GPA_LETTERS: [(f64, &str); 10] = [
    (4.0, "A"),
    (3.7, "A-"),
    (3.3, "B+"),
    (3.0, "B"),
    (2.7, "B-"),
    (2.3, "C+"),
    (2.0, "C"),
    (1.7, "C-"),
    (1.3, "D+"),
    (1.0, "D"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GpaScale {
    #[default]
    FourPoint,
    FivePoint,
}

impl GpaScale {
    pub fn letter_value(self, letter: &str) -> Result<f64> {
        let table: &[(&str, f64)] = match self {
            GpaScale::FourPoint => &FOUR_POINT_LETTERS,
            GpaScale::FivePoint => &FIVE_POINT_LETTERS,
        };
        let wanted = letter.trim().to_ascii_uppercase();
        table
            .iter()
            .find(|(grade, _)| *grade == wanted)
            .map(|(_, value)| *value)
            .ok_or_else(|| CalcError::out_of_domain("grade", format!("unknown letter grade '{}'", letter)))
    }

    pub fn percent_value(self, percent: f64) -> Result<f64> {
        let percent = validate_range("grade", percent, 0.0, 100.0)?;
        let table: &[(f64, f64)] = match self {
            GpaScale::FourPoint => &FOUR_POINT_PERCENT,
            GpaScale::FivePoint => &FIVE_POINT_PERCENT,
        };
        Ok(table
            .iter()
            .find(|(bound, _)| percent >= *bound)
            .map(|(_, value)| *value)
            .unwrap_or(0.0))
    }
}

pub fn letter_for_percent(percent: f64) -> &'static str {
    PERCENT_LETTERS
        .iter()
        .find(|(bound, _)| percent >= *bound)
        .map(|(_, letter)| *letter)
        .unwrap_or("F")
}

/// Letter equivalent of a GPA on the 4.0 scale.
pub fn letter_for_gpa(gpa: f64) -> &'static str {
    GPA_LETTERS
        .iter()
        .find(|(bound, _)| gpa >= *bound)
        .map(|(_, letter)| *letter)
        .unwrap_or("F")
}

// GPA

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CourseGrade {
    Percent(f64),
    Letter(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    #[serde(default)]
    pub name: Option<String>,
    pub grade: CourseGrade,
    pub credits: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpaInput {
    #[serde(default)]
    pub scale: GpaScale,
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedCourse {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub credits: f64,
    pub grade_value: f64,
    pub grade_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpaResult {
    pub scale: GpaScale,
    pub gpa: f64,
    pub total_credits: f64,
    pub total_grade_points: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_grade: Option<&'static str>,
    pub courses: Vec<GradedCourse>,
}

impl Calculator for GpaInput {
    type Output = GpaResult;

    fn compute(&self, _config: &CalcConfig) -> Result<GpaResult> {
        if self.courses.is_empty() {
            return Err(CalcError::MissingField {
                field: "courses".to_string(),
            });
        }

        let courses = self
            .courses
            .iter()
            .enumerate()
            .map(|(i, course)| {
                let credits = validate_positive("credits", course.credits)?;
                let grade_value = match &course.grade {
                    CourseGrade::Percent(percent) => self.scale.percent_value(*percent)?,
                    CourseGrade::Letter(letter) => self.scale.letter_value(letter)?,
                };
                Ok(GradedCourse {
                    index: i + 1,
                    name: course.name.clone(),
                    credits,
                    grade_value,
                    grade_points: grade_value * credits,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let total_credits: f64 = courses.iter().map(|c| c.credits).sum();
        let total_grade_points: f64 = courses.iter().map(|c| c.grade_points).sum();
        let gpa = total_grade_points / total_credits;
        Ok(GpaResult {
            scale: self.scale,
            gpa,
            total_credits,
            total_grade_points,
            letter_grade: (self.scale == GpaScale::FourPoint).then(|| letter_for_gpa(gpa)),
            courses,
        })
    }
}

// Course grade

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default)]
    pub name: Option<String>,
    pub score: f64,
    pub max_score: f64,
    /// Ignored when the course is unweighted.
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetInput {
    pub target_grade: f64,
    pub final_exam_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeInput {
    #[serde(default = "default_weighted")]
    pub weighted: bool,
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub target: Option<TargetInput>,
}

fn default_weighted() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredAssignment {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub percentage: f64,
    pub weight: f64,
    pub weighted_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetAnalysis {
    pub target_grade: f64,
    pub final_exam_weight: f64,
    pub required_exam_score: f64,
    pub is_achievable: bool,
    pub difficulty: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeResult {
    pub current_grade: f64,
    pub letter_grade: &'static str,
    pub total_weighted_score: f64,
    pub total_weight: f64,
    pub assignments: Vec<ScoredAssignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetAnalysis>,
}

pub fn difficulty(required: f64) -> &'static str {
    if required > 100.0 {
        "Impossible"
    } else if required > 95.0 {
        "Very Hard"
    } else if required > 85.0 {
        "Hard"
    } else if required > 70.0 {
        "Moderate"
    } else if required > 50.0 {
        "Easy"
    } else {
        "Very Easy"
    }
}

impl Calculator for GradeInput {
    type Output = GradeResult;

    fn compute(&self, _config: &CalcConfig) -> Result<GradeResult> {
        if self.assignments.is_empty() {
            return Err(CalcError::MissingField {
                field: "assignments".to_string(),
            });
        }

        let assignments = self
            .assignments
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let score = validate_non_negative("score", a.score)?;
                let max_score = validate_positive("max_score", a.max_score)?;
                let weight = if self.weighted {
                    validate_positive(
                        "weight",
                        *a.weight.as_ref().ok_or_else(|| CalcError::MissingField {
                            field: format!("assignments[{}].weight", i + 1),
                        })?,
                    )?
                } else {
                    1.0
                };
                let percentage = score / max_score * 100.0;
                Ok(ScoredAssignment {
                    index: i + 1,
                    name: a.name.clone(),
                    percentage,
                    weight,
                    weighted_score: percentage * weight,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let total_weight: f64 = assignments.iter().map(|a| a.weight).sum();
        let total_weighted_score: f64 = assignments.iter().map(|a| a.weighted_score).sum();
        let current_grade = total_weighted_score / total_weight;

        let target = match &self.target {
            Some(t) => {
                let target_grade = validate_non_negative("target_grade", t.target_grade)?;
                let exam_weight = validate_positive("final_exam_weight", t.final_exam_weight)?;
                let required_exam_score =
                    (target_grade * (total_weight + exam_weight) - current_grade * total_weight) / exam_weight;
                Some(TargetAnalysis {
                    target_grade,
                    final_exam_weight: exam_weight,
                    required_exam_score,
                    is_achievable: required_exam_score <= 100.0,
                    difficulty: difficulty(required_exam_score),
                })
            }
            None => None,
        };

        Ok(GradeResult {
            current_grade,
            letter_grade: letter_for_percent(current_grade),
            total_weighted_score,
            total_weight,
            assignments,
            target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(grade: CourseGrade, credits: f64) -> Course {
        Course {
            name: None,
            grade,
            credits,
        }
    }

    #[test]
    fn test_gpa_from_letters() {
        let input = GpaInput {
            scale: GpaScale::FourPoint,
            courses: vec![
                course(CourseGrade::Letter("A".to_string()), 3.0),
                course(CourseGrade::Letter("b+".to_string()), 4.0),
                course(CourseGrade::Letter("C".to_string()), 2.0),
            ],
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert!((result.total_grade_points - (12.0 + 13.2 + 4.0)).abs() < 1e-9);
        assert_eq!(result.total_credits, 9.0);
        assert!((result.gpa - 29.2 / 9.0).abs() < 1e-9);
        assert_eq!(result.letter_grade, Some("B"));
    }

    #[test]
    fn test_gpa_from_percentages_on_five_point_scale() {
        let input = GpaInput {
            scale: GpaScale::FivePoint,
            courses: vec![
                course(CourseGrade::Percent(98.0), 3.0),
                course(CourseGrade::Percent(84.0), 3.0),
            ],
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert!((result.gpa - 4.25).abs() < 1e-9);
        assert_eq!(result.letter_grade, None);
    }

    #[test]
    fn test_gpa_rejects_bad_grades() {
        let config = CalcConfig::default();
        let unknown = GpaInput {
            scale: GpaScale::FourPoint,
            courses: vec![course(CourseGrade::Letter("E".to_string()), 3.0)],
        };
        assert!(unknown.compute(&config).is_err());

        let percent = GpaInput {
            scale: GpaScale::FourPoint,
            courses: vec![course(CourseGrade::Percent(104.0), 3.0)],
        };
        assert!(percent.compute(&config).is_err());

        let credits = GpaInput {
            scale: GpaScale::FourPoint,
            courses: vec![course(CourseGrade::Letter("A".to_string()), 0.0)],
        };
        assert!(credits.compute(&config).is_err());
    }

    #[test]
    fn test_grade_from_json_course_list() {
        let input: GpaInput = serde_json::from_str(
            r#"{"courses": [{"grade": "B", "credits": 3}, {"grade": 85, "credits": 1}]}"#,
        )
        .unwrap();
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert_eq!(result.gpa, 3.0);
        assert_eq!(result.letter_grade, Some("B"));
    }

    fn assignment(score: f64, max_score: f64, weight: f64) -> Assignment {
        Assignment {
            name: None,
            score,
            max_score,
            weight: Some(weight),
        }
    }

    #[test]
    fn test_weighted_course_grade_with_target() {
        let input = GradeInput {
            weighted: true,
            assignments: vec![
                assignment(18.0, 20.0, 20.0),
                assignment(80.0, 100.0, 20.0),
                assignment(85.0, 100.0, 25.0),
            ],
            target: Some(TargetInput {
                target_grade: 90.0,
                final_exam_weight: 35.0,
            }),
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        let expected = (90.0 * 20.0 + 80.0 * 20.0 + 85.0 * 25.0) / 65.0;
        assert!((result.current_grade - expected).abs() < 1e-9);
        assert_eq!(result.letter_grade, "B");

        let target = result.target.unwrap();
        let required = (90.0 * 100.0 - expected * 65.0) / 35.0;
        assert!((target.required_exam_score - required).abs() < 1e-9);
        assert!(target.is_achievable);
        assert_eq!(target.difficulty, "Very Hard");
    }

    #[test]
    fn test_unachievable_target_is_a_flag() {
        let input = GradeInput {
            weighted: false,
            assignments: vec![Assignment {
                name: None,
                score: 50.0,
                max_score: 100.0,
                weight: None,
            }],
            target: Some(TargetInput {
                target_grade: 95.0,
                final_exam_weight: 1.0,
            }),
        };
        let result = input.compute(&CalcConfig::default()).unwrap();
        assert_eq!(result.letter_grade, "F");
        let target = result.target.unwrap();
        assert_eq!(target.required_exam_score, 140.0);
        assert!(!target.is_achievable);
        assert_eq!(target.difficulty, "Impossible");
    }

    #[test]
    fn test_invalid_assignments_rejected() {
        let config = CalcConfig::default();
        let zero_max = GradeInput {
            weighted: true,
            assignments: vec![assignment(5.0, 0.0, 10.0)],
            target: None,
        };
        assert!(zero_max.compute(&config).is_err());

        let missing_weight = GradeInput {
            weighted: true,
            assignments: vec![Assignment {
                name: None,
                score: 5.0,
                max_score: 10.0,
                weight: None,
            }],
            target: None,
        };
        assert!(matches!(
            missing_weight.compute(&config),
            Err(CalcError::MissingField { .. })
        ));
    }

    #[test]
    fn test_letter_lookups() {
        assert_eq!(letter_for_percent(97.0), "A+");
        assert_eq!(letter_for_percent(59.9), "F");
        assert_eq!(letter_for_gpa(4.0), "A");
        assert_eq!(letter_for_gpa(3.99), "A-");
        assert_eq!(letter_for_gpa(0.5), "F");
    }
}
