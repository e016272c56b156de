// Prompt constants for the disease advisory.

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, MEDICAL_DISCLAIMER_INSTRUCTION};

/// System prompt for the advisory call. Built from the shared fragments.
pub fn advisory_system() -> String {
    format!(
        "You are a careful clinical information assistant. {MEDICAL_DISCLAIMER_INSTRUCTION} {JSON_ONLY_SYSTEM}"
    )
}

/// Advisory prompt template. Replace `{disease}`, `{age}`, `{temperature}`,
/// `{humidity}`, `{wind_speed}` and `{symptoms}` before sending.
pub const ADVISORY_PROMPT_TEMPLATE: &str = r#"A weather-based screening model suggests the patient may have: {disease}

Patient context:
- Age: {age}
- Ambient temperature (C): {temperature}
- Humidity: {humidity}
- Wind speed (km/h): {wind_speed}
- Reported symptoms: {symptoms}

Return a JSON object with this EXACT schema (no extra fields):
{
  "diagnostic_tests": ["Complete blood count", "NS1 antigen test"],
  "emergency": false,
  "emergency_note": "Seek care immediately if ..."
}

Rules:
- "diagnostic_tests": 1 to 5 short test names relevant to {disease}.
- "emergency": true only if the reported symptoms together with {disease} need urgent care.
- "emergency_note": one sentence describing warning signs that require urgent care."#;
