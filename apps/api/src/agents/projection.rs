//! Data projections: which slice of the resume each persona sees.
//!
//! Pure functions of `ResumeData` and the current date so they can be tested
//! without a clock or a database.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use serde_json::{json, Value};

use crate::resume::models::WorkExperience;
use crate::resume::ResumeData;

const TECHNICAL_MARKERS: [&str; 3] = ["engineer", "developer", "tech"];
const LEADERSHIP_MARKERS: [&str; 3] = ["led", "team", "managed"];

const BACKGROUND_NOTE: &str = "WORK_EXPERIENCE_ONLY contains ONLY job titles and companies. \
DO NOT confuse work experience with specific projects. Each work experience entry is a ROLE at a \
COMPANY, NOT a project name.\n\nCRITICAL: The 'achievements' field contains a LIST of separate \
features/tasks completed. These are INDIVIDUAL achievements, NOT parts of one named platform. \
DO NOT invent umbrella names like 'the X Platform' or 'the Y System'. Just describe what was done.";

#[derive(Debug, Serialize)]
struct DatedExperience<'a> {
    #[serde(flatten)]
    experience: &'a WorkExperience,
    #[serde(rename = "DATE_RANGE")]
    date_range: String,
}

#[derive(Debug, Serialize)]
struct CareerStep<'a> {
    role: &'a str,
    company: &'a str,
    duration: String,
    key_achievement: &'a str,
}

pub fn technical(data: &ResumeData, _today: NaiveDate) -> Value {
    json!({
        "skills": data.skills_by_category(),
        "projects": data.projects,
        "experience": technical_experience(&data.experience),
    })
}

pub fn personal(data: &ResumeData, _today: NaiveDate) -> Value {
    json!({
        "personality": data.personality,
        "interests": data.interests.iter().map(|i| i.interest_name.as_str()).collect::<Vec<_>>(),
        "summary": data.summary(),
        "leadership_examples": leadership_examples(&data.experience),
    })
}

pub fn background(data: &ResumeData, today: NaiveDate) -> Value {
    let dated: Vec<DatedExperience<'_>> = data
        .experience
        .iter()
        .map(|experience| DatedExperience {
            experience,
            date_range: date_range(experience),
        })
        .collect();

    json!({
        "TODAY_DATE": today.format("%Y-%m-%d").to_string(),
        "ONE_YEAR_AGO": one_year_ago(today).format("%Y-%m-%d").to_string(),
        "WORK_EXPERIENCE_ONLY": dated,
        "EDUCATION_ONLY": data.education,
        "summary": data.summary(),
        "career_progression": career_progression(&data.experience),
        "achievements": data.achievements,
        "certifications": data.certifications,
        "IMPORTANT_NOTE": BACKGROUND_NOTE,
    })
}

pub fn interview(data: &ResumeData, _today: NaiveDate) -> Value {
    json!({
        "name": data.name(),
        "work_experience": data.experience,
        "skills": data.skills_by_category(),
        "projects": data.projects,
        "education": data.education,
        "personality": data.personality,
        "publications": data.publications,
    })
}

pub fn help(data: &ResumeData, today: NaiveDate) -> Value {
    json!({
        "name": data.name(),
        "title": data.title(),
        "areas_of_expertise": data.skills_by_category().into_keys().collect::<Vec<_>>(),
        "years_experience": years_experience(&data.experience, today),
        "number_of_projects": data.projects.len(),
        "education_level": data.education.first().map(|e| e.degree.as_str()).unwrap_or(""),
    })
}

pub fn one_year_ago(today: NaiveDate) -> NaiveDate {
    today - Duration::days(365)
}

/// `"<start> to <end>"`, with `Unknown` / `Present` standing in for missing dates.
pub fn date_range(experience: &WorkExperience) -> String {
    format!(
        "{} to {}",
        experience.start_date.as_deref().unwrap_or("Unknown"),
        experience.end_date.as_deref().unwrap_or("Present")
    )
}

/// Roles whose text mentions engineering work at all.
pub fn technical_experience(experience: &[WorkExperience]) -> Vec<&WorkExperience> {
    experience
        .iter()
        .filter(|e| mentions_any(e, &TECHNICAL_MARKERS))
        .collect()
}

/// Achievement lists of roles that mention leading or managing people.
pub fn leadership_examples(experience: &[WorkExperience]) -> Vec<&[String]> {
    experience
        .iter()
        .filter(|e| mentions_any(e, &LEADERSHIP_MARKERS))
        .map(|e| e.achievements.as_slice())
        .collect()
}

fn career_progression(experience: &[WorkExperience]) -> Vec<CareerStep<'_>> {
    experience
        .iter()
        .map(|e| CareerStep {
            role: &e.position,
            company: &e.company,
            duration: date_range(e),
            key_achievement: e.achievements.first().map(String::as_str).unwrap_or(""),
        })
        .collect()
}

/// Whole years between the earliest start and the latest end (open roles end today).
pub fn years_experience(experience: &[WorkExperience], today: NaiveDate) -> String {
    if experience.is_empty() {
        return "N/A".to_string();
    }

    let first = experience
        .iter()
        .filter_map(|e| e.start_date.as_deref().and_then(leading_year))
        .min();
    let last = experience
        .iter()
        .map(|e| match e.end_date.as_deref() {
            None => Some(today.year()),
            Some(end) if end.eq_ignore_ascii_case("present") => Some(today.year()),
            Some(end) => leading_year(end),
        })
        .max()
        .flatten();

    match (first, last) {
        (Some(first), Some(last)) if last >= first => (last - first).to_string(),
        _ => "Multiple years".to_string(),
    }
}

fn leading_year(date: &str) -> Option<i32> {
    date.trim().get(..4)?.parse().ok()
}

// Field values only; key names like `tech_stack` must not count as a mention.
fn mentions_any(experience: &WorkExperience, markers: &[&str]) -> bool {
    let text = [
        experience.company.as_str(),
        experience.position.as_str(),
        experience.description.as_deref().unwrap_or(""),
    ]
    .into_iter()
    .chain(experience.achievements.iter().map(String::as_str))
    .chain(experience.tech_stack.iter().map(String::as_str))
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase();
    markers.iter().any(|m| text.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::models::{Education, Project, Skill};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn role(company: &str, position: &str, start: &str, end: Option<&str>, achievements: &[&str]) -> WorkExperience {
        WorkExperience {
            company: company.to_string(),
            position: position.to_string(),
            start_date: Some(start.to_string()),
            end_date: end.map(str::to_string),
            achievements: achievements.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    fn sample() -> ResumeData {
        ResumeData {
            skills: vec![Skill {
                category: "Programming Languages".to_string(),
                skill_name: "Python".to_string(),
                proficiency_level: Some(5),
                years_experience: Some(4.0),
                last_used: None,
            }],
            experience: vec![
                role("Acme", "Software Engineer", "2022-01-01", None, &["Led a team of 4"]),
                role("Cafe", "Barista", "2018-05-01", Some("2019-12-31"), &["Opened the shop"]),
            ],
            education: vec![Education {
                institution: "State University".to_string(),
                degree: "BS Computer Science".to_string(),
                ..Default::default()
            }],
            projects: vec![Project {
                name: "Resume Dashboard".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_technical_keeps_only_engineering_roles() {
        let data = sample();
        let roles = technical_experience(&data.experience);
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].company, "Acme");

        let value = technical(&data, today());
        assert_eq!(value["skills"]["Programming Languages"][0], "Python");
        assert_eq!(value["projects"][0]["name"], "Resume Dashboard");
    }

    #[test]
    fn test_leadership_examples_surface_achievements() {
        let data = sample();
        let examples = leadership_examples(&data.experience);
        assert_eq!(examples, vec![&["Led a team of 4".to_string()][..]]);
    }

    #[test]
    fn test_background_includes_recency_dates() {
        let value = background(&sample(), today());
        assert_eq!(value["TODAY_DATE"], "2025-06-01");
        assert_eq!(value["ONE_YEAR_AGO"], "2024-06-01");
        assert_eq!(value["WORK_EXPERIENCE_ONLY"][0]["DATE_RANGE"], "2022-01-01 to Present");
        assert_eq!(value["WORK_EXPERIENCE_ONLY"][0]["company"], "Acme");
        assert_eq!(value["career_progression"][1]["key_achievement"], "Opened the shop");
        assert_eq!(value["EDUCATION_ONLY"][0]["degree"], "BS Computer Science");
    }

    #[test]
    fn test_one_year_ago_is_365_days() {
        let leap = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(one_year_ago(leap), NaiveDate::from_ymd_opt(2023, 3, 2).unwrap());
    }

    #[test]
    fn test_help_overview_counts() {
        let value = help(&sample(), today());
        assert_eq!(value["areas_of_expertise"][0], "Programming Languages");
        assert_eq!(value["number_of_projects"], 1);
        assert_eq!(value["education_level"], "BS Computer Science");
        assert_eq!(value["years_experience"], "7");
    }

    #[test]
    fn test_years_experience_edge_cases() {
        assert_eq!(years_experience(&[], today()), "N/A");
        let undated = WorkExperience {
            company: "X".to_string(),
            position: "Y".to_string(),
            ..Default::default()
        };
        assert_eq!(years_experience(&[undated], today()), "Multiple years");
    }

    #[test]
    fn test_interview_sees_everything_relevant() {
        let value = interview(&sample(), today());
        for key in ["work_experience", "skills", "projects", "education", "personality", "publications"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_personal_on_empty_data_is_well_formed() {
        let value = personal(&ResumeData::default(), today());
        assert_eq!(value["summary"], "");
        assert!(value["personality"].is_null());
        assert_eq!(value["interests"], json!([]));
    }
}
