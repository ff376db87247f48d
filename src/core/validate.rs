//! Input validation for course and grade forms.
//!
//! Validation runs before anything reaches the store. Each failure names the
//! offending field so a front end can show the message next to it. The store
//! itself accepts any values; these limits exist only here.

use std::fmt;

use crate::core::engine::FULL_WEIGHT;
use crate::core::{Course, CourseUpdate, GradeUpdate, NewCourse, NewGrade};
use crate::error::GradepalError;

/// Maximum credit hours accepted for a course.
pub const MAX_CREDITS: f64 = 10.0;

/// Maximum score accepted for a grade (extra credit allowed).
pub const MAX_SCORE: f64 = 120.0;

/// Maximum weight accepted for a single grade.
pub const MAX_WEIGHT: f64 = 100.0;

/// Tolerance for the weight budget so that e.g. 70.1 + 29.9 is not rejected.
const WEIGHT_EPSILON: f64 = 1e-9;

/// Form field a validation error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Credits,
    Score,
    Weight,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Credits => "credits",
            Field::Score => "score",
            Field::Weight => "weight",
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Course name is empty.
    CourseNameRequired,
    /// Assignment name is empty.
    AssignmentNameRequired,
    /// Credits below zero (or not a number).
    CreditsNegative(f64),
    /// Credits above [`MAX_CREDITS`].
    CreditsTooHigh(f64),
    /// Score below zero (or not a number).
    ScoreNegative(f64),
    /// Score above [`MAX_SCORE`].
    ScoreTooHigh(f64),
    /// Weight below zero (or not a number).
    WeightNegative(f64),
    /// Weight above [`MAX_WEIGHT`].
    WeightTooHigh(f64),
    /// The course's weights would add up to more than 100.
    WeightBudgetExceeded { requested: f64, remaining: f64 },
}

impl ValidationError {
    /// The form field this error should be shown on.
    pub fn field(&self) -> Field {
        match self {
            ValidationError::CourseNameRequired | ValidationError::AssignmentNameRequired => {
                Field::Name
            }
            ValidationError::CreditsNegative(_) | ValidationError::CreditsTooHigh(_) => {
                Field::Credits
            }
            ValidationError::ScoreNegative(_) | ValidationError::ScoreTooHigh(_) => Field::Score,
            ValidationError::WeightNegative(_)
            | ValidationError::WeightTooHigh(_)
            | ValidationError::WeightBudgetExceeded { .. } => Field::Weight,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::CourseNameRequired => write!(f, "Course name is required."),
            ValidationError::AssignmentNameRequired => write!(f, "Assignment name is required."),
            ValidationError::CreditsNegative(_) => write!(f, "Credits must be a positive number."),
            ValidationError::CreditsTooHigh(_) => write!(f, "Credits seem too high."),
            ValidationError::ScoreNegative(_) => write!(f, "Score must be positive."),
            ValidationError::ScoreTooHigh(_) => write!(f, "Score can't exceed 120."),
            ValidationError::WeightNegative(_) => write!(f, "Weight must be positive."),
            ValidationError::WeightTooHigh(_) => write!(f, "Weight can't exceed 100."),
            ValidationError::WeightBudgetExceeded { remaining, .. } => write!(
                f,
                "Total weight cannot exceed 100%. Remaining weight available: {}%",
                format_percent(*remaining)
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<Vec<ValidationError>> for GradepalError {
    fn from(errors: Vec<ValidationError>) -> Self {
        let message = errors
            .iter()
            .map(|e| format!("{}: {}", e.field().as_str(), e))
            .collect::<Vec<_>>()
            .join("; ");
        GradepalError::validation(message)
    }
}

/// Render a percentage with at most two decimals and no trailing zeros.
pub fn format_percent(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid printing "-0"
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{}", rounded)
}

fn check_name(name: &str, error: ValidationError, errors: &mut Vec<ValidationError>) {
    if name.trim().is_empty() {
        errors.push(error);
    }
}

/// Range check where the lower bound is always zero.
///
/// NaN fails the lower-bound check.
fn check_range(
    value: f64,
    max: f64,
    negative: fn(f64) -> ValidationError,
    too_high: fn(f64) -> ValidationError,
    errors: &mut Vec<ValidationError>,
) {
    if value.is_nan() || value < 0.0 {
        errors.push(negative(value));
    } else if value > max {
        errors.push(too_high(value));
    }
}

fn check_credits(credits: f64, errors: &mut Vec<ValidationError>) {
    check_range(
        credits,
        MAX_CREDITS,
        ValidationError::CreditsNegative,
        ValidationError::CreditsTooHigh,
        errors,
    );
}

fn check_score(score: f64, errors: &mut Vec<ValidationError>) {
    check_range(
        score,
        MAX_SCORE,
        ValidationError::ScoreNegative,
        ValidationError::ScoreTooHigh,
        errors,
    );
}

fn check_weight(weight: f64, errors: &mut Vec<ValidationError>) {
    check_range(
        weight,
        MAX_WEIGHT,
        ValidationError::WeightNegative,
        ValidationError::WeightTooHigh,
        errors,
    );
}

fn into_result(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a new course.
pub fn validate_new_course(draft: &NewCourse) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_name(&draft.name, ValidationError::CourseNameRequired, &mut errors);
    check_credits(draft.credits, &mut errors);
    into_result(errors)
}

/// Validate the fields set on a course update.
pub fn validate_course_update(update: &CourseUpdate) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    if let Some(name) = &update.name {
        check_name(name, ValidationError::CourseNameRequired, &mut errors);
    }
    if let Some(credits) = update.credits {
        check_credits(credits, &mut errors);
    }
    into_result(errors)
}

/// Check that `weight`, added to every other grade in the course, stays
/// within the course's full weight.
///
/// `editing` is the id of the grade being replaced, whose current weight is
/// not counted.
pub fn check_weight_budget(
    course: &Course,
    editing: Option<&str>,
    weight: f64,
) -> Result<(), ValidationError> {
    let other = course.weight_excluding(editing);
    if other + weight > FULL_WEIGHT + WEIGHT_EPSILON {
        return Err(ValidationError::WeightBudgetExceeded {
            requested: weight,
            remaining: FULL_WEIGHT - other,
        });
    }
    Ok(())
}

/// Validate a new grade for `course`.
pub fn validate_new_grade(course: &Course, draft: &NewGrade) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_name(&draft.name, ValidationError::AssignmentNameRequired, &mut errors);
    check_score(draft.score, &mut errors);
    check_weight(draft.weight, &mut errors);

    if errors.is_empty() {
        if let Err(e) = check_weight_budget(course, None, draft.weight) {
            errors.push(e);
        }
    }

    into_result(errors)
}

/// Validate an update to grade `grade_id` of `course`.
///
/// The weight budget is only checked when the update changes the weight.
pub fn validate_grade_update(
    course: &Course,
    grade_id: &str,
    update: &GradeUpdate,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    if let Some(name) = &update.name {
        check_name(name, ValidationError::AssignmentNameRequired, &mut errors);
    }
    if let Some(score) = update.score {
        check_score(score, &mut errors);
    }
    if let Some(weight) = update.weight {
        check_weight(weight, &mut errors);
        if errors.is_empty() {
            if let Err(e) = check_weight_budget(course, Some(grade_id), weight) {
                errors.push(e);
            }
        }
    }
    into_result(errors)
}
