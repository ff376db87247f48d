//! Prediction request and response payloads.
//!
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::core::{course_grade, Course};
use crate::error::{GradepalError, Result};

/// Scenario used when the caller does not describe an optimistic outcome.
pub const DEFAULT_OPTIMISTIC_SCENARIO: &str = "I will study hard for the final exam and complete all remaining assignments to the best of my ability.";

/// Scenario used when the caller does not describe a pessimistic outcome.
pub const DEFAULT_PESSIMISTIC_SCENARIO: &str =
    "I will not study much for the final exam and might miss one of the remaining small assignments.";

/// Input to a final-grade prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    /// Current course grade (0-100, may exceed 100 with extra credit).
    pub current_grade: f64,
    /// Percentage of the course still to be graded.
    pub remaining_weight: f64,
    pub optimistic_scenario: String,
    pub pessimistic_scenario: String,
}

impl PredictionRequest {
    /// Build a request from a course's current state.
    ///
    /// Blank scenarios fall back to the defaults. Fails when the course has
    /// no grade yet or nothing remains to be graded.
    pub fn for_course(
        course: &Course,
        optimistic: Option<&str>,
        pessimistic: Option<&str>,
    ) -> Result<Self> {
        let derived = course_grade(&course.grades);

        let Some(current_grade) = derived.grade else {
            return Err(GradepalError::prediction(format!(
                "course '{}' has no graded work yet",
                course.name
            )));
        };

        let remaining_weight = derived.remaining_weight();
        if remaining_weight <= 0.0 {
            return Err(GradepalError::prediction(format!(
                "course '{}' has no remaining weight to predict",
                course.name
            )));
        }

        Ok(Self {
            current_grade,
            remaining_weight,
            optimistic_scenario: scenario_or(optimistic, DEFAULT_OPTIMISTIC_SCENARIO),
            pessimistic_scenario: scenario_or(pessimistic, DEFAULT_PESSIMISTIC_SCENARIO),
        })
    }
}

fn scenario_or(text: Option<&str>, default: &str) -> String {
    match text.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => default.to_string(),
    }
}

/// Predicted final grades under both scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub optimistic_prediction: f64,
    pub pessimistic_prediction: f64,
    /// Advice on reaching the desired outcome.
    pub advice: String,
}
