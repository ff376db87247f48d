//! Final-grade prediction.
//!
//! A [`Predictor`] turns the current state of a course plus two effort
//! scenarios into predicted final grades. [`HttpPredictor`] asks an
//! OpenAI-compatible chat-completions service; [`ConfiguredPredictor`] builds
//! one from config when a request is made. There is no retry and no
//! caching; a failed call surfaces as [`GradepalError::Prediction`].
//!
//! [`GradepalError::Prediction`]: crate::error::GradepalError::Prediction

pub mod http;
pub mod types;

pub use http::{ConfiguredPredictor, HttpPredictor};
pub use types::{
    PredictionRequest, PredictionResponse, DEFAULT_OPTIMISTIC_SCENARIO,
    DEFAULT_PESSIMISTIC_SCENARIO,
};

use std::sync::Arc;

use crate::error::Result;

/// Something that can predict final grades.
pub trait Predictor: Send + Sync {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse>;
}

impl<P: Predictor + ?Sized> Predictor for Arc<P> {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        (**self).predict(request)
    }
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        (**self).predict(request)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::error::GradepalError;
    use std::sync::Mutex;

    /// Predictor returning a canned answer and recording requests.
    #[derive(Default)]
    pub struct MockPredictor {
        pub response: Option<PredictionResponse>,
        pub requests: Mutex<Vec<PredictionRequest>>,
    }

    impl MockPredictor {
        pub fn answering(optimistic: f64, pessimistic: f64, advice: &str) -> Self {
            Self {
                response: Some(PredictionResponse {
                    optimistic_prediction: optimistic,
                    pessimistic_prediction: pessimistic,
                    advice: advice.to_string(),
                }),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self::default()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl Predictor for MockPredictor {
        fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.response
                .clone()
                .ok_or_else(|| GradepalError::prediction("service unavailable"))
        }
    }

    #[test]
    fn test_arc_and_box_delegate() {
        let request = PredictionRequest {
            current_grade: 80.0,
            remaining_weight: 20.0,
            optimistic_scenario: DEFAULT_OPTIMISTIC_SCENARIO.to_string(),
            pessimistic_scenario: DEFAULT_PESSIMISTIC_SCENARIO.to_string(),
        };

        let shared = Arc::new(MockPredictor::answering(88.0, 75.0, "ok"));
        assert_eq!(shared.predict(&request).unwrap().optimistic_prediction, 88.0);

        let boxed: Box<dyn Predictor> = Box::new(MockPredictor::failing());
        assert!(boxed.predict(&request).is_err());

        assert_eq!(shared.request_count(), 1);
    }
}
