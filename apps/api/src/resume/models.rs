use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub name: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Skill {
    pub category: String,
    pub skill_name: String,
    pub proficiency_level: Option<i64>,
    pub years_experience: Option<f64>,
    pub last_used: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkExperience {
    pub company: String,
    pub position: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
    pub achievements: Vec<String>,
    pub tech_stack: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub field_of_study: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub description: Option<String>,
    pub tech_stack: Vec<String>,
    pub github_url: Option<String>,
    pub impact_score: Option<i64>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publication {
    pub title: String,
    pub authors: Vec<String>,
    pub journal: String,
    pub year: i64,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Personality {
    pub personality_summary: Option<String>,
    pub work_style: Option<String>,
    pub strengths: Vec<String>,
    pub personal_values: Vec<String>,
    pub motivations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interest {
    pub interest_name: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Achievement {
    pub achievement_text: String,
    pub category: Option<String>,
    pub year: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Certification {
    pub certification_name: String,
    pub issuer: String,
    pub year: Option<i64>,
}

/// Everything the agents may draw on, loaded in one pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeData {
    pub profile: Option<Profile>,
    pub skills: Vec<Skill>,
    pub experience: Vec<WorkExperience>,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
    pub publications: Vec<Publication>,
    pub personality: Option<Personality>,
    pub interests: Vec<Interest>,
    pub achievements: Vec<Achievement>,
    pub certifications: Vec<Certification>,
}

impl ResumeData {
    /// Skill names grouped by category, preserving the load order within each group.
    pub fn skills_by_category(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for skill in &self.skills {
            grouped
                .entry(skill.category.clone())
                .or_default()
                .push(skill.skill_name.clone());
        }
        grouped
    }

    pub fn name(&self) -> Option<&str> {
        self.profile.as_ref().map(|p| p.name.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.profile.as_ref().and_then(|p| p.title.as_deref())
    }

    pub fn summary(&self) -> &str {
        self.profile
            .as_ref()
            .and_then(|p| p.summary.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(category: &str, name: &str) -> Skill {
        Skill {
            category: category.to_string(),
            skill_name: name.to_string(),
            proficiency_level: Some(4),
            years_experience: None,
            last_used: None,
        }
    }

    #[test]
    fn test_skills_grouped_by_category() {
        let data = ResumeData {
            skills: vec![
                skill("Backend", "Python"),
                skill("AI/ML", "LangChain"),
                skill("Backend", "FastAPI"),
            ],
            ..Default::default()
        };

        let grouped = data.skills_by_category();
        assert_eq!(grouped["Backend"], vec!["Python", "FastAPI"]);
        assert_eq!(grouped["AI/ML"], vec!["LangChain"]);
    }

    #[test]
    fn test_summary_defaults_to_empty_without_profile() {
        assert_eq!(ResumeData::default().summary(), "");
        assert_eq!(ResumeData::default().name(), None);
    }
}
