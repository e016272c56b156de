//! AI advisory: optional diagnostic-test suggestions and an emergency flag
//! for a predicted disease.
//!
//! `AppState` holds an `Option<Arc<dyn AdvisorySource>>`; `None` when no API
//! key is configured. Callers treat every error as "no advisory".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::{LlmClient, LlmError};
use crate::prediction::features::PredictRequest;
use crate::prediction::prompts::{advisory_system, ADVISORY_PROMPT_TEMPLATE};

const MAX_TESTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    #[serde(default)]
    pub diagnostic_tests: Vec<String>,
    #[serde(default)]
    pub emergency: bool,
    #[serde(default)]
    pub emergency_note: String,
}

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("advisory request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("advisory response was empty")]
    Empty,
}

#[async_trait]
pub trait AdvisorySource: Send + Sync {
    async fn advise(&self, disease: &str, input: &PredictRequest) -> Result<Advisory, AdvisoryError>;
}

/// Gemini-backed advisory.
pub struct GeminiAdvisor(pub LlmClient);

#[async_trait]
impl AdvisorySource for GeminiAdvisor {
    async fn advise(&self, disease: &str, input: &PredictRequest) -> Result<Advisory, AdvisoryError> {
        let prompt = build_prompt(disease, input);
        let advisory: Advisory = self.0.call_json(&prompt, &advisory_system()).await?;
        clean(advisory)
    }
}

fn build_prompt(disease: &str, input: &PredictRequest) -> String {
    let symptoms = if input.symptoms.is_empty() {
        "none reported".to_string()
    } else {
        input.symptoms.join(", ").replace('_', " ")
    };
    ADVISORY_PROMPT_TEMPLATE
        .replace("{disease}", disease)
        .replace("{age}", &input.age.to_string())
        .replace("{temperature}", &input.temperature.to_string())
        .replace("{humidity}", &input.humidity.to_string())
        .replace("{wind_speed}", &input.wind_speed.to_string())
        .replace("{symptoms}", &symptoms)
}

/// Trims blanks, caps the test list, and rejects advisories with nothing to show.
fn clean(mut advisory: Advisory) -> Result<Advisory, AdvisoryError> {
    advisory.diagnostic_tests = advisory
        .diagnostic_tests
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .take(MAX_TESTS)
        .collect();
    advisory.emergency_note = advisory.emergency_note.trim().to_string();

    if advisory.diagnostic_tests.is_empty() && advisory.emergency_note.is_empty() {
        return Err(AdvisoryError::Empty);
    }
    Ok(advisory)
}
