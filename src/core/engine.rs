//! Grade and GPA calculations.
//!
//! Pure functions over course and grade records. A course with no usable
//! grades has no grade at all (`None`), which is distinct from a grade of 0.
//!
//! Grade point scale (percentage meets or exceeds threshold):
//! - 93: 4.0, 90: 3.7, 87: 3.3, 83: 3.0, 80: 2.7, 77: 2.3
//! - 73: 2.0, 70: 1.7, 67: 1.3, 63: 1.0, 60: 0.7, below: 0.0
//!
//! Scores above 100 (extra credit) are not clamped.

use serde::{Deserialize, Serialize};

use crate::core::{Course, Grade};

/// Total weight a course's grades may add up to.
pub const FULL_WEIGHT: f64 = 100.0;

/// One step of the grade scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleStep {
    /// Minimum percentage for this step.
    pub threshold: f64,
    /// Grade points awarded.
    pub point: f64,
    /// Letter shown for this step.
    pub letter: &'static str,
}

const fn step(threshold: f64, point: f64, letter: &'static str) -> ScaleStep {
    ScaleStep {
        threshold,
        point,
        letter,
    }
}

/// Grade scale, highest threshold first.
pub const GRADE_SCALE: [ScaleStep; 12] = [
    step(93.0, 4.0, "A"),
    step(90.0, 3.7, "A-"),
    step(87.0, 3.3, "B+"),
    step(83.0, 3.0, "B"),
    step(80.0, 2.7, "B-"),
    step(77.0, 2.3, "C+"),
    step(73.0, 2.0, "C"),
    step(70.0, 1.7, "C-"),
    step(67.0, 1.3, "D+"),
    step(63.0, 1.0, "D"),
    step(60.0, 0.7, "D-"),
    step(0.0, 0.0, "F"),
];

/// Find the highest scale step the percentage reaches.
fn scale_step(percentage: f64) -> Option<&'static ScaleStep> {
    GRADE_SCALE.iter().find(|step| percentage >= step.threshold)
}

/// Map a percentage to grade points.
///
/// Returns 0.0 when there is no grade yet, and for anything below the
/// lowest threshold (including negative and NaN input).
pub fn grade_point(percentage: Option<f64>) -> f64 {
    percentage
        .and_then(scale_step)
        .map(|step| step.point)
        .unwrap_or(0.0)
}

/// Map a percentage to its letter grade, or `None` when there is no grade yet.
pub fn letter_grade(percentage: Option<f64>) -> Option<&'static str> {
    let percentage = percentage?;
    Some(scale_step(percentage).map(|step| step.letter).unwrap_or("F"))
}

/// Derived grade of a single course.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseGrade {
    /// Weighted mean score, or `None` when nothing is graded yet.
    pub grade: Option<f64>,
    /// Sum of the weights of all recorded grades.
    pub weight_completed: f64,
}

impl CourseGrade {
    /// The "no grade yet" result.
    pub const UNGRADED: CourseGrade = CourseGrade {
        grade: None,
        weight_completed: 0.0,
    };

    /// Weight still to be graded.
    pub fn remaining_weight(&self) -> f64 {
        remaining_weight(self.weight_completed)
    }
}

/// Compute the weighted mean of a course's grades.
///
/// Returns [`CourseGrade::UNGRADED`] when there are no grades or their
/// weights sum to exactly zero.
pub fn course_grade(grades: &[Grade]) -> CourseGrade {
    if grades.is_empty() {
        return CourseGrade::UNGRADED;
    }

    let total_weight: f64 = grades.iter().map(|g| g.weight).sum();
    let weighted_score: f64 = grades.iter().map(|g| g.score * g.weight).sum();

    if total_weight == 0.0 {
        return CourseGrade::UNGRADED;
    }

    CourseGrade {
        grade: Some(weighted_score / total_weight),
        weight_completed: total_weight,
    }
}

/// Weight not yet covered by recorded grades.
///
/// Negative when the recorded weights already exceed 100.
pub fn remaining_weight(weight_completed: f64) -> f64 {
    FULL_WEIGHT - weight_completed
}

/// Compute the credit-weighted GPA across courses.
///
/// A course counts only when it has positive credits, at least one grade and
/// a defined course grade. Returns 0.0 when no course counts.
pub fn gpa(courses: &[Course]) -> f64 {
    let mut total_points = 0.0;
    let mut total_credits = 0.0;

    for course in courses {
        if course.credits <= 0.0 || course.grades.is_empty() {
            continue;
        }
        if let Some(grade) = course_grade(&course.grades).grade {
            total_points += grade_point(Some(grade)) * course.credits;
            total_credits += course.credits;
        }
    }

    if total_credits == 0.0 {
        return 0.0;
    }

    let gpa = total_points / total_credits;
    if gpa.is_nan() {
        0.0
    } else {
        gpa
    }
}
