//! Persona registry. Every difference between the five agents is expressed
//! here as data: prompt text, data projection, temperature.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agents::projection;
use crate::llm_client::prompts::{content_rules, ANTI_HALLUCINATION_NOTE, RESPONSE_FORMAT_RULES};
use crate::resume::ResumeData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Interview,
    Technical,
    Personal,
    Background,
    Help,
}

/// Static description of one persona.
pub struct RoleProfile {
    /// Display name reported as `agent_name`.
    pub name: &'static str,
    /// One-line description shown to the router.
    pub routing_hint: &'static str,
    pub temperature: f32,
    pub section_title: &'static str,
    pub focus: &'static str,
    /// Role-specific rules placed between the shared content rules and the guardrail.
    pub guidance: &'static str,
    pub response_instruction: &'static str,
    pub project: fn(&ResumeData, NaiveDate) -> Value,
}

impl AgentRole {
    /// Fixed enumeration order. The router resolves ambiguous replies in this order.
    pub const ALL: [AgentRole; 5] = [
        AgentRole::Interview,
        AgentRole::Technical,
        AgentRole::Personal,
        AgentRole::Background,
        AgentRole::Help,
    ];

    /// Lowercase label used on the wire (`"technical"`).
    pub fn label(self) -> &'static str {
        match self {
            AgentRole::Interview => "interview",
            AgentRole::Technical => "technical",
            AgentRole::Personal => "personal",
            AgentRole::Background => "background",
            AgentRole::Help => "help",
        }
    }

    /// Uppercase token the router asks the model to answer with.
    pub fn token(self) -> &'static str {
        match self {
            AgentRole::Interview => "INTERVIEW",
            AgentRole::Technical => "TECHNICAL",
            AgentRole::Personal => "PERSONAL",
            AgentRole::Background => "BACKGROUND",
            AgentRole::Help => "HELP",
        }
    }

    pub fn profile(self) -> &'static RoleProfile {
        match self {
            AgentRole::Interview => &INTERVIEW,
            AgentRole::Technical => &TECHNICAL,
            AgentRole::Personal => &PERSONAL,
            AgentRole::Background => &BACKGROUND,
            AgentRole::Help => &HELP,
        }
    }

    pub fn display_name(self) -> &'static str {
        self.profile().name
    }

    pub fn temperature(self) -> f32 {
        self.profile().temperature
    }

    /// Full system prompt for this persona. `today` is only referenced by Background.
    pub fn system_prompt(self, today: NaiveDate) -> String {
        let profile = self.profile();
        let opening = match self {
            AgentRole::Background => format!(
                "You are answering interview questions as the candidate. Today's date is {}.",
                today.format("%Y-%m-%d")
            ),
            AgentRole::Technical => {
                "You are answering technical interview questions as the candidate.".to_string()
            }
            _ => "You are answering interview questions as the candidate.".to_string(),
        };

        format!(
            "{opening}\n\n{RESPONSE_FORMAT_RULES}\n\n{}\n\n{}\n\n{ANTI_HALLUCINATION_NOTE}",
            content_rules(),
            profile.guidance
        )
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgentRole {
    type Err = String;

    /// Case-insensitive exact match on the label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        AgentRole::ALL
            .into_iter()
            .find(|role| role.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown agent '{needle}'"))
    }
}

static INTERVIEW: RoleProfile = RoleProfile {
    name: "Interview",
    routing_hint: "Handles resume-style interview questions like \"tell me about yourself\", \
        \"what are your strengths/weaknesses\", \"why should we hire you\", \
        \"describe a challenging project\", \"how do you handle pressure\", behavioral questions",
    temperature: 0.2,
    section_title: "My Background & Data:",
    focus: "interview",
    guidance: "Common interview questions: strengths/weaknesses, challenging projects, handling pressure, motivations.
Use the STAR method (Situation, Task, Action, Result) for behavioral questions.",
    response_instruction: "Respond as the candidate in an interview. Be authentic, use specific examples \
        from actual experience. If this is a behavioral question, use the STAR method.",
    project: projection::interview,
};

static TECHNICAL: RoleProfile = RoleProfile {
    name: "Technical",
    routing_hint: "Handles questions about programming languages, frameworks, tools, system design, \
        technical projects",
    temperature: 0.2,
    section_title: "My Technical Background:",
    focus: "technical",
    guidance: "Technical focus areas (use data to support):
- Backend development, APIs and services
- LLM & AI engineering: multi-agent systems, retrieval, prompt design
- Data engineering: databases and data pipelines
- Frontend work only where the data shows it",
    response_instruction: "Respond as the candidate in first person. Showcase technical expertise \
        with specific examples from projects and experience.",
    project: projection::technical,
};

static PERSONAL: RoleProfile = RoleProfile {
    name: "Personal",
    routing_hint: "Handles questions about personality, work style, motivations, interests, \
        soft skills, culture fit",
    temperature: 0.3,
    section_title: "My Personal Background:",
    focus: "personal",
    guidance: "Topics you can discuss (using real data):
- Work style and collaboration approach
- Motivations and career goals
- Soft skills and interpersonal abilities
- Values and work culture preferences
- Interests and passions",
    response_instruction: "Respond as the candidate. Be genuine and personable, giving insight into \
        personality and work style.",
    project: projection::personal,
};

static BACKGROUND: RoleProfile = RoleProfile {
    name: "Background",
    routing_hint: "Handles questions about education, work history, career progression, past companies",
    temperature: 0.1,
    section_title: "My Professional Background:",
    focus: "background",
    guidance: "Additional background-specific rules:
- Never invent platform/product names - use exact wording from data
- Each work experience entry is a ROLE at a COMPANY, not a project name
- Achievements are individual tasks, not parts of named platforms
- Be time-aware: calculate which roles fall within requested timeframes",
    response_instruction: "Provide clear, factual details about background and experience, including \
        specific details about roles, achievements, and career progression.",
    project: projection::background,
};

static HELP: RoleProfile = RoleProfile {
    name: "Help",
    routing_hint: "Handles unclear questions, requests for guidance, or when user needs help \
        understanding capabilities",
    temperature: 0.3,
    section_title: "My Background and Information:",
    focus: "guidance",
    guidance: "For broad questions, provide helpful overview of what you can discuss:
- Technical skills and experience
- Work experience and projects
- Education background
- Work style and approach

When appropriate, suggest scheduling an interview for deeper discussion.",
    response_instruction: "Be conversational yet professional. If the question is broad, provide a \
        helpful overview. When appropriate, suggest scheduling an interview for deeper discussion.",
    project: projection::help,
};
