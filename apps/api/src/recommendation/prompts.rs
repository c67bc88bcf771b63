// Prompt constants for optional reason polish.

use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, JSON_ONLY_SYSTEM};

/// System prompt for reason polish. Built from the shared fragments.
pub fn reason_polish_system() -> String {
    format!(
        "You are a friendly career counselor writing one-line internship recommendations \
        for students. {JSON_ONLY_SYSTEM} {GROUNDING_INSTRUCTION}"
    )
}

/// Reason polish prompt template.
/// Replace: {title}, {organization}, {factors}, {draft}
pub const REASON_POLISH_PROMPT_TEMPLATE: &str = r#"Rewrite the draft recommendation reason below so it reads naturally to the student.

Internship: {title} at {organization}
Matching factors: {factors}
Draft reason: {draft}

Return a JSON object:
{
  "reason": "Matches your expertise in Python and Data Science."
}

HARD RULES:
1. At most 20 words
2. Mention at least one of the matching factors verbatim
3. Do NOT mention any skill, interest, or experience that is not a matching factor
4. Do NOT mention scores or percentages"#;
