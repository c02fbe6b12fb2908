/// Scores how much an agent's answer can be trusted. Advisory only; nothing
/// downstream branches on the value.
pub trait ConfidenceScorer: Send + Sync {
    fn score(&self, message: &str, response: &str) -> f32;

    /// Recorded in reply metadata so clients can tell which scorer produced the number.
    fn label(&self) -> &'static str;
}

const UNCERTAIN_PHRASES: [&str; 2] = ["i'm not sure", "i don't know"];
const SHORT_RESPONSE_CHARS: usize = 50;

/// Length and hedging heuristic shared by every persona.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicConfidence;

impl ConfidenceScorer for HeuristicConfidence {
    fn score(&self, _message: &str, response: &str) -> f32 {
        let lowered = response.to_lowercase().replace('\u{2019}', "'");
        let score: f32 = if UNCERTAIN_PHRASES.iter().any(|p| lowered.contains(p)) {
            0.4
        } else if response.chars().count() < SHORT_RESPONSE_CHARS {
            0.6
        } else {
            0.85
        };
        score.clamp(0.0, 1.0)
    }

    fn label(&self) -> &'static str {
        "heuristic"
    }
}
