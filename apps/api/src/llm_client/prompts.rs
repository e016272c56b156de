// Cross-cutting prompt fragments. Feature-specific prompts live next to the
// feature that sends them.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Reminder attached to every medical prompt.
pub const MEDICAL_DISCLAIMER_INSTRUCTION: &str = "\
    You are not diagnosing the patient. Suggest only widely used, non-invasive \
    confirmatory tests a clinician would typically order, and flag an emergency \
    only for symptoms that warrant immediate in-person care.";
