//! Predict command for GradePal.
//!
//! Asks a [`Predictor`] for the final grade of one course under an
//! optimistic and a pessimistic scenario.

use serde::Serialize;

use crate::cli::CommandOutput;
use crate::error::GradepalError;
use crate::predict::{PredictionRequest, PredictionResponse, Predictor};
use crate::storage::KeyValueStore;
use crate::store::CourseStore;

/// Output format for the predict command.
#[derive(Debug, Clone, Serialize)]
pub struct PredictOutput {
    pub success: bool,
    pub course_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    /// What was sent to the prediction service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<PredictionRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictOutput {
    pub fn failure(course_id: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            course_id: course_id.to_string(),
            course_name: None,
            request: None,
            prediction: None,
            error: Some(error.into()),
        }
    }
}

impl CommandOutput for PredictOutput {
    fn is_success(&self) -> bool {
        self.success
    }

    fn format_text(&self) -> String {
        let (Some(request), Some(prediction)) = (&self.request, &self.prediction) else {
            return format!(
                "Prediction failed: {}\n",
                self.error.as_deref().unwrap_or("unknown error")
            );
        };

        let mut text = format!(
            "Final grade prediction for {}\n",
            self.course_name.as_deref().unwrap_or(&self.course_id)
        );
        text.push_str(&format!(
            "Current grade {:.1}% with {:.0}% of the coursework remaining.\n\n",
            request.current_grade, request.remaining_weight
        ));
        text.push_str(&format!(
            "  Optimistic:  {:.1}%\n",
            prediction.optimistic_prediction
        ));
        text.push_str(&format!(
            "  Pessimistic: {:.1}%\n\n",
            prediction.pessimistic_prediction
        ));
        text.push_str(&format!("Advice: {}\n", prediction.advice));
        text
    }
}

/// The predict command implementation.
pub struct PredictCommand<'a, S: KeyValueStore, P: Predictor> {
    store: &'a CourseStore<S>,
    predictor: P,
}

impl<'a, S: KeyValueStore, P: Predictor> PredictCommand<'a, S, P> {
    pub fn new(store: &'a CourseStore<S>, predictor: P) -> Self {
        Self { store, predictor }
    }

    /// Predict the final grade of `course_id`.
    ///
    /// Courses without a grade, or with nothing left to grade, are refused
    /// before any request is made.
    pub fn run(
        &self,
        course_id: &str,
        optimistic: Option<&str>,
        pessimistic: Option<&str>,
    ) -> PredictOutput {
        let Some(course) = self.store.get_course_by_id(course_id) else {
            return PredictOutput::failure(
                course_id,
                GradepalError::course_not_found(course_id).to_string(),
            );
        };

        let request = match PredictionRequest::for_course(course, optimistic, pessimistic) {
            Ok(request) => request,
            Err(e) => return PredictOutput::failure(course_id, e.to_string()),
        };

        match self.predictor.predict(&request) {
            Ok(prediction) => PredictOutput {
                success: true,
                course_id: course_id.to_string(),
                course_name: Some(course.name.clone()),
                request: Some(request),
                prediction: Some(prediction),
                error: None,
            },
            Err(e) => {
                tracing::warn!(course_id, error = %e, "grade prediction failed");
                PredictOutput {
                    course_name: Some(course.name.clone()),
                    request: Some(request),
                    ..PredictOutput::failure(course_id, e.to_string())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PredictionConfig;
    use crate::core::{NewCourse, NewGrade};
    use crate::predict::tests::MockPredictor;
    use crate::predict::{ConfiguredPredictor, DEFAULT_OPTIMISTIC_SCENARIO};
    use crate::storage::MemoryKeyValueStore;
    use serial_test::serial;
    use std::sync::Arc;

    fn setup() -> (CourseStore<MemoryKeyValueStore>, String) {
        let mut store = CourseStore::open(MemoryKeyValueStore::new(), "test");
        let id = store.add_course(NewCourse::new("Organic Chemistry", 4.0));
        store.add_grade(&id, NewGrade::new("Midterm", 78.0, 30.0));
        store.add_grade(&id, NewGrade::new("Labs", 88.0, 20.0));
        (store, id)
    }

    #[test]
    fn test_predict_success() {
        let (store, id) = setup();
        let predictor = Arc::new(MockPredictor::answering(86.0, 71.5, "Focus on the final."));

        let output = PredictCommand::new(&store, Arc::clone(&predictor)).run(&id, None, None);

        assert!(output.success);
        let request = output.request.as_ref().unwrap();
        assert_eq!(request.current_grade, 82.0);
        assert_eq!(request.remaining_weight, 50.0);
        assert_eq!(request.optimistic_scenario, DEFAULT_OPTIMISTIC_SCENARIO);
        assert_eq!(output.prediction.as_ref().unwrap().pessimistic_prediction, 71.5);
        assert_eq!(predictor.request_count(), 1);

        let text = output.format_text();
        assert!(text.contains("Organic Chemistry"));
        assert!(text.contains("Optimistic:  86.0%"));
        assert!(text.contains("Pessimistic: 71.5%"));
        assert!(text.contains("Advice: Focus on the final."));
    }

    #[test]
    fn test_predict_custom_scenarios() {
        let (store, id) = setup();
        let predictor = Arc::new(MockPredictor::answering(90.0, 60.0, "ok"));

        PredictCommand::new(&store, Arc::clone(&predictor)).run(
            &id,
            Some("Office hours every week"),
            Some("Miss the final"),
        );

        let requests = predictor.requests.lock().unwrap();
        assert_eq!(requests[0].optimistic_scenario, "Office hours every week");
        assert_eq!(requests[0].pessimistic_scenario, "Miss the final");
    }

    #[test]
    fn test_predict_service_failure() {
        let (store, id) = setup();

        let output = PredictCommand::new(&store, MockPredictor::failing()).run(&id, None, None);

        assert!(!output.success);
        assert!(output.request.is_some());
        assert!(output.error.as_deref().unwrap().contains("service unavailable"));
        assert!(output.format_text().starts_with("Prediction failed"));
    }

    #[test]
    fn test_predict_refused_without_grade() {
        let mut store = CourseStore::open(MemoryKeyValueStore::new(), "test");
        let id = store.add_course(NewCourse::new("Empty", 3.0));
        let predictor = Arc::new(MockPredictor::answering(90.0, 60.0, "ok"));

        let output = PredictCommand::new(&store, Arc::clone(&predictor)).run(&id, None, None);

        assert!(!output.success);
        assert_eq!(predictor.request_count(), 0);
    }

    #[test]
    fn test_predict_refused_when_fully_graded() {
        let (mut store, id) = setup();
        store.add_grade(&id, NewGrade::new("Final", 90.0, 50.0));
        let predictor = Arc::new(MockPredictor::answering(90.0, 60.0, "ok"));

        let output = PredictCommand::new(&store, Arc::clone(&predictor)).run(&id, None, None);

        assert!(!output.success);
        assert!(output.error.unwrap().contains("no remaining weight"));
        assert_eq!(predictor.request_count(), 0);
    }

    #[test]
    fn test_predict_missing_course() {
        let (store, _id) = setup();

        let output =
            PredictCommand::new(&store, MockPredictor::failing()).run("missing", None, None);

        assert!(!output.success);
        assert!(output.error.unwrap().contains("course not found"));
    }

    #[test]
    #[serial]
    fn test_refusals_come_before_credentials() {
        std::env::remove_var("GRADEPAL_TEST_UNSET_KEY");
        let predictor = || {
            ConfiguredPredictor::new(PredictionConfig {
                api_key_env: "GRADEPAL_TEST_UNSET_KEY".to_string(),
                ..Default::default()
            })
        };

        let mut store = CourseStore::open(MemoryKeyValueStore::new(), "test");
        let empty = store.add_course(NewCourse::new("Empty", 3.0));
        let graded = store.add_course(NewCourse::new("Graded", 3.0));
        store.add_grade(&graded, NewGrade::new("Quiz", 80.0, 10.0));

        let output = PredictCommand::new(&store, predictor()).run("missing", None, None);
        assert!(output.error.unwrap().contains("course not found"));

        let output = PredictCommand::new(&store, predictor()).run(&empty, None, None);
        assert!(output.error.unwrap().contains("no graded work"));

        // Only a request that would actually be sent needs the key
        let output = PredictCommand::new(&store, predictor()).run(&graded, None, None);
        assert!(!output.success);
        assert!(output.error.unwrap().contains("GRADEPAL_TEST_UNSET_KEY"));
    }

    #[test]
    fn test_predict_json_output() {
        let (store, id) = setup();
        let output = PredictCommand::new(&store, MockPredictor::answering(86.0, 71.5, "Go"))
            .run(&id, None, None);

        let value = serde_json::to_value(&output).unwrap();

        assert_eq!(value["request"]["currentGrade"], 82.0);
        assert_eq!(value["prediction"]["optimisticPrediction"], 86.0);
        assert!(value.get("error").is_none());
    }
}
