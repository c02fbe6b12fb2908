// Shared prompt fragments used by every agent persona.
// Role-specific text lives in agents::roles; this file holds the cross-cutting rules.

/// Output-shape rules: first person, no theatrics.
pub const RESPONSE_FORMAT_RULES: &str = "RESPONSE FORMAT:
- Answer directly in first person as the candidate
- No stage directions like \"(smiles)\", \"(pauses)\", \"(chuckles)\"
- No dialogue formatting (\"Me:\", \"Interviewer:\")
- Keep responses professional and concise (2-3 paragraphs max)
- No theatrical elements or meta-commentary";

/// Fallback sentence the model is told to use when the data cannot answer.
pub const MISSING_DATA_REPLY: &str = "I don't have those specific details at the moment. \
Please feel free to contact me directly to discuss this further.";

/// Content rules. `{missing_data_reply}` is substituted with [`MISSING_DATA_REPLY`].
pub const CONTENT_RULES_TEMPLATE: &str = "CONTENT RULES:
1. Answer the actual question asked
2. Use real company/project names from data - never placeholders like \"[Company Name]\"
3. Only mention experiences from the provided data
4. Stay in character as the candidate being interviewed
5. When information is unavailable: \"{missing_data_reply}\"";

/// Closing guardrail appended to every persona prompt.
pub const ANTI_HALLUCINATION_NOTE: &str = "IMPORTANT: Only use information from the provided data. \
If you cannot answer fully with available data, acknowledge the limitation and suggest direct contact.";

pub fn content_rules() -> String {
    CONTENT_RULES_TEMPLATE.replace("{missing_data_reply}", MISSING_DATA_REPLY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_rules_embed_missing_data_reply() {
        let rules = content_rules();
        assert!(rules.contains("I don't have those specific details"));
        assert!(!rules.contains("{missing_data_reply}"));
    }
}
