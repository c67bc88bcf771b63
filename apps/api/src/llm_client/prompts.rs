// Cross-cutting prompt fragments. Each feature keeps its own prompts.rs alongside it.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps generated text tied to the facts handed to the model.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Only mention skills, interests, or experience that appear in the \
    provided context. Do NOT infer, interpolate, or invent details.";
