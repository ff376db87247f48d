//! Prediction over an OpenAI-compatible chat-completions endpoint.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::config::PredictionConfig;
use crate::error::{GradepalError, Result};
use crate::predict::{PredictionRequest, PredictionResponse, Predictor};

const SYSTEM_PROMPT: &str = "You are a seasoned academic advisor, skilled at helping students \
understand their grades and plan for success. Reply with a JSON object containing \
\"optimisticPrediction\" (number), \"pessimisticPrediction\" (number) and \"advice\" (string).";

/// Blocking HTTP predictor.
#[derive(Debug, Clone)]
pub struct HttpPredictor {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl HttpPredictor {
    /// Build a predictor from configuration.
    ///
    /// Fails when the API key variable is unset or the client cannot be built.
    pub fn from_config(config: &PredictionConfig) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            GradepalError::config(format!(
                "no API key: set the {} environment variable",
                config.api_key_env
            ))
        })?;

        Self::new(
            &config.endpoint,
            &config.model,
            api_key,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Predictor for HttpPredictor {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        let body = completion_body(&self.model, request);

        tracing::debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            current_grade = request.current_grade,
            remaining_weight = request.remaining_weight,
            "requesting grade prediction"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;

        parse_completion(status, &decode_body(&text))
    }
}

/// A predictor configured up front but built on first use.
///
/// Missing credentials only surface once a request is actually made.
#[derive(Debug, Clone)]
pub struct ConfiguredPredictor {
    config: PredictionConfig,
}

impl ConfiguredPredictor {
    pub fn new(config: PredictionConfig) -> Self {
        Self { config }
    }
}

impl Predictor for ConfiguredPredictor {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        HttpPredictor::from_config(&self.config)?.predict(request)
    }
}

/// Parse a response body, or `Null` if it is not JSON (e.g. a proxy's HTML
/// error page).
fn decode_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or(Value::Null)
}

/// Render the user prompt for a request.
pub fn user_prompt(request: &PredictionRequest) -> String {
    format!(
        "A student currently has a grade of {current} and {remaining} percent of the grade remains.\n\n\
         Here are two scenarios regarding the remaining {remaining} percent of the grade, \
         one optimistic and one pessimistic:\n\n\
         Optimistic Scenario: {optimistic}\n\
         Pessimistic Scenario: {pessimistic}\n\n\
         Based on these scenarios, predict the student's final grade in both cases, and provide \
         advice on what the student should do to achieve their desired outcome. Return the \
         predicted grades as numbers between 0 and 100.",
        current = request.current_grade,
        remaining = request.remaining_weight,
        optimistic = request.optimistic_scenario,
        pessimistic = request.pessimistic_scenario,
    )
}

/// Build the chat-completions request body.
fn completion_body(model: &str, request: &PredictionRequest) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": user_prompt(request) },
        ],
        "response_format": { "type": "json_object" },
    })
}

/// Extract the prediction from a chat-completions response.
fn parse_completion(status: StatusCode, body: &Value) -> Result<PredictionResponse> {
    if !status.is_success() {
        let message = body["error"]["message"]
            .as_str()
            .unwrap_or("unknown error");
        tracing::warn!(status = %status, error = %message, "prediction service returned error");
        return Err(GradepalError::prediction(format!("{}: {}", status, message)));
    }

    let content = body["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| GradepalError::prediction("response has no message content"))?;

    serde_json::from_str(content).map_err(|e| {
        GradepalError::prediction(format!("unexpected prediction payload: {}", e))
    })
}
