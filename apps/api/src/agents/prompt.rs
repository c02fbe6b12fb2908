use chrono::NaiveDate;

use crate::agents::history::{format_context, Turn};
use crate::agents::roles::AgentRole;
use crate::resume::ResumeData;

/// Assembles the single completion prompt for `role`.
///
/// Layout: system prompt, the role's data section, the conversation tail,
/// the question, then the role's closing instruction.
pub fn build_agent_prompt(
    role: AgentRole,
    message: &str,
    history: &[Turn],
    data: &ResumeData,
    today: NaiveDate,
) -> String {
    let profile = role.profile();
    let projected = (profile.project)(data, today);
    let data_block = serde_json::to_string_pretty(&projected).unwrap_or_else(|_| "{}".to_string());

    format!(
        "System: {system}\n\n{title}\n{data_block}\n\nConversation Context:\n{context}\n\nQuestion: {message}\n\n{instruction}",
        system = role.system_prompt(today),
        title = profile.section_title,
        context = format_context(history),
        instruction = profile.response_instruction,
    )
}
