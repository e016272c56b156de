// Disease prediction from weather and symptom inputs.
// All Gemini calls go through llm_client via the advisory module.

pub mod advisory;
pub mod features;
pub mod handlers;
pub mod model;
pub mod prompts;
