use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::agents::confidence::ConfidenceScorer;
use crate::agents::history::Turn;
use crate::agents::prompt::build_agent_prompt;
use crate::agents::roles::AgentRole;
use crate::llm_client::{LlmError, LlmProvider};
use crate::resume::ResumeData;

/// What a persona produced for one question.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    pub content: String,
    /// Display name, e.g. `"Technical"`.
    pub agent_name: String,
    pub confidence: f32,
    pub metadata: Value,
}

/// Runs a persona: one prompt, one completion, one confidence score.
pub struct AgentDispatcher {
    llm: Arc<dyn LlmProvider>,
    scorer: Arc<dyn ConfidenceScorer>,
}

impl AgentDispatcher {
    pub fn new(llm: Arc<dyn LlmProvider>, scorer: Arc<dyn ConfidenceScorer>) -> Self {
        Self { llm, scorer }
    }

    pub async fn process(
        &self,
        role: AgentRole,
        message: &str,
        history: &[Turn],
        data: &ResumeData,
    ) -> Result<AgentReply, LlmError> {
        self.process_on(role, message, history, data, Local::now().date_naive())
            .await
    }

    /// Resolves `name` case-insensitively; unknown names are answered by Help.
    // The HTTP surface always routes first; kept for callers holding a raw label.
    #[allow(dead_code)]
    pub async fn process_named(
        &self,
        name: &str,
        message: &str,
        history: &[Turn],
        data: &ResumeData,
    ) -> Result<AgentReply, LlmError> {
        let role = name.parse::<AgentRole>().unwrap_or_else(|_| {
            warn!("Unknown agent '{}', falling back to help", name);
            AgentRole::Help
        });
        self.process(role, message, history, data).await
    }

    pub(crate) async fn process_on(
        &self,
        role: AgentRole,
        message: &str,
        history: &[Turn],
        data: &ResumeData,
        today: NaiveDate,
    ) -> Result<AgentReply, LlmError> {
        let profile = role.profile();
        let prompt = build_agent_prompt(role, message, history, data, today);
        let content = self.llm.complete(&prompt, role.temperature()).await?;
        let confidence = self.scorer.score(message, &content).clamp(0.0, 1.0);

        debug!(
            "{} agent answered ({} chars, confidence {:.2})",
            role.display_name(),
            content.len(),
            confidence
        );

        Ok(AgentReply {
            content,
            agent_name: role.display_name().to_string(),
            confidence,
            metadata: json!({
                "focus": profile.focus,
                "role": role.label(),
                "confidence_kind": self.scorer.label(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::confidence::HeuristicConfidence;
    use crate::llm_client::testing::ScriptedLlm;

    const ANSWER: &str = "I mostly write Python and Rust, with some TypeScript on the frontend side.";

    fn dispatcher(llm: Arc<ScriptedLlm>) -> AgentDispatcher {
        AgentDispatcher::new(llm, Arc::new(HeuristicConfidence))
    }

    #[tokio::test]
    async fn test_technical_reply_shape() {
        let llm = Arc::new(ScriptedLlm::new([ANSWER]));
        let reply = dispatcher(llm.clone())
            .process(AgentRole::Technical, "What languages?", &[], &ResumeData::default())
            .await
            .unwrap();

        assert_eq!(reply.agent_name, "Technical");
        assert_eq!(reply.content, ANSWER);
        assert_eq!(reply.confidence, 0.85);
        assert_eq!(reply.metadata["focus"], "technical");
        assert_eq!(reply.metadata["confidence_kind"], "heuristic");
        assert_eq!(llm.temperatures(), vec![0.2]);
    }

    #[tokio::test]
    async fn test_unknown_name_falls_back_to_help() {
        let llm = Arc::new(ScriptedLlm::new(["I can talk about my projects."]));
        let reply = dispatcher(llm.clone())
            .process_named("recruiter", "hi", &[], &ResumeData::default())
            .await
            .unwrap();

        assert_eq!(reply.agent_name, "Help");
        assert_eq!(reply.metadata["focus"], "guidance");
        assert_eq!(llm.temperatures(), vec![0.3]);
    }

    #[tokio::test]
    async fn test_background_prompt_uses_given_date() {
        let llm = Arc::new(ScriptedLlm::new([ANSWER]));
        let today = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        dispatcher(llm.clone())
            .process_on(AgentRole::Background, "Recent roles?", &[], &ResumeData::default(), today)
            .await
            .unwrap();

        let prompt = &llm.prompts()[0];
        assert!(prompt.contains("Today's date is 2025-08-01."));
        assert_eq!(llm.temperatures(), vec![0.1]);
    }

    struct FixedScorer(f32);

    impl ConfidenceScorer for FixedScorer {
        fn score(&self, _message: &str, _response: &str) -> f32 {
            self.0
        }

        fn label(&self) -> &'static str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_out_of_range_scores_are_clamped() {
        for (raw, expected) in [(1.5, 1.0), (-0.3, 0.0)] {
            let llm = Arc::new(ScriptedLlm::new([ANSWER]));
            let reply = AgentDispatcher::new(llm, Arc::new(FixedScorer(raw)))
                .process(AgentRole::Technical, "What languages?", &[], &ResumeData::default())
                .await
                .unwrap();
            assert_eq!(reply.confidence, expected);
            assert_eq!(reply.metadata["confidence_kind"], "fixed");
        }
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let llm = Arc::new(ScriptedLlm::default().then_fail("boom"));
        let result = dispatcher(llm)
            .process(AgentRole::Personal, "hi", &[], &ResumeData::default())
            .await;
        assert!(result.is_err());
    }
}
