use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use tracing::warn;

use crate::resume::models::{
    Achievement, Certification, Education, Interest, Personality, Profile, Project, Publication,
    ResumeData, Skill, WorkExperience,
};

/// Read-only access to the candidate's resume records.
#[async_trait]
pub trait ResumeSource: Send + Sync {
    async fn load(&self) -> Result<ResumeData, sqlx::Error>;
}

/// `ResumeSource` backed by the dashboard's SQLite database.
#[derive(Clone)]
pub struct SqliteResumeStore {
    pool: SqlitePool,
}

impl SqliteResumeStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeSource for SqliteResumeStore {
    async fn load(&self) -> Result<ResumeData, sqlx::Error> {
        load_resume_data(&self.pool).await
    }
}

#[async_trait]
impl ResumeSource for ResumeData {
    async fn load(&self) -> Result<ResumeData, sqlx::Error> {
        Ok(self.clone())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Raw rows (JSON-list columns arrive as TEXT)
// ────────────────────────────────────────────────────────────────────────────

#[derive(FromRow)]
struct WorkExperienceRow {
    company: String,
    position: String,
    start_date: Option<String>,
    end_date: Option<String>,
    description: Option<String>,
    achievements: Option<String>,
    tech_stack: Option<String>,
}

#[derive(FromRow)]
struct EducationRow {
    institution: String,
    degree: String,
    field_of_study: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    achievements: Option<String>,
}

#[derive(FromRow)]
struct ProjectRow {
    name: String,
    description: Option<String>,
    tech_stack: Option<String>,
    github_url: Option<String>,
    impact_score: Option<i64>,
    status: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(FromRow)]
struct PublicationRow {
    title: String,
    authors: String,
    journal: String,
    year: i64,
    link: Option<String>,
}

#[derive(FromRow)]
struct PersonalityRow {
    personality_summary: Option<String>,
    work_style: Option<String>,
    strengths: Option<String>,
    personal_values: Option<String>,
    motivations: Option<String>,
}

/// Loads every resume table in one pass.
pub async fn load_resume_data(pool: &SqlitePool) -> Result<ResumeData, sqlx::Error> {
    let profile = sqlx::query_as::<_, Profile>(
        "SELECT name, title, summary, email, location FROM profile ORDER BY id LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    let skills = sqlx::query_as::<_, Skill>(
        r#"
        SELECT category, skill_name, proficiency_level, years_experience, last_used
        FROM skills
        ORDER BY category, proficiency_level DESC, skill_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let experience = sqlx::query_as::<_, WorkExperienceRow>(
        r#"
        SELECT company, position, start_date, end_date, description, achievements, tech_stack
        FROM work_experience
        ORDER BY start_date DESC
        "#,
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| WorkExperience {
        company: row.company,
        position: row.position,
        start_date: row.start_date,
        end_date: row.end_date,
        description: row.description,
        achievements: json_list(row.achievements, "work_experience.achievements"),
        tech_stack: json_list(row.tech_stack, "work_experience.tech_stack"),
    })
    .collect();

    let education = sqlx::query_as::<_, EducationRow>(
        r#"
        SELECT institution, degree, field_of_study, start_date, end_date, achievements
        FROM education
        ORDER BY start_date DESC
        "#,
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| Education {
        institution: row.institution,
        degree: row.degree,
        field_of_study: row.field_of_study,
        start_date: row.start_date,
        end_date: row.end_date,
        achievements: json_list(row.achievements, "education.achievements"),
    })
    .collect();

    let projects = sqlx::query_as::<_, ProjectRow>(
        r#"
        SELECT name, description, tech_stack, github_url, impact_score, status, start_date, end_date
        FROM projects
        ORDER BY start_date DESC
        "#,
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| Project {
        name: row.name,
        description: row.description,
        tech_stack: json_list(row.tech_stack, "projects.tech_stack"),
        github_url: row.github_url,
        impact_score: row.impact_score,
        status: row.status,
        start_date: row.start_date,
        end_date: row.end_date,
    })
    .collect();

    let publications = sqlx::query_as::<_, PublicationRow>(
        "SELECT title, authors, journal, year, link FROM publications ORDER BY year DESC",
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| Publication {
        title: row.title,
        authors: split_authors(&row.authors),
        journal: row.journal,
        year: row.year,
        link: row.link,
    })
    .collect();

    let personality = sqlx::query_as::<_, PersonalityRow>(
        r#"
        SELECT personality_summary, work_style, strengths, personal_values, motivations
        FROM personality
        ORDER BY created_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?
    .map(|row| Personality {
        personality_summary: row.personality_summary,
        work_style: row.work_style,
        strengths: json_list(row.strengths, "personality.strengths"),
        personal_values: json_list(row.personal_values, "personality.personal_values"),
        motivations: json_list(row.motivations, "personality.motivations"),
    });

    let interests = sqlx::query_as::<_, Interest>(
        "SELECT interest_name, category FROM interests ORDER BY category, interest_name",
    )
    .fetch_all(pool)
    .await?;

    let achievements = sqlx::query_as::<_, Achievement>(
        "SELECT achievement_text, category, year FROM achievements ORDER BY year DESC",
    )
    .fetch_all(pool)
    .await?;

    let certifications = sqlx::query_as::<_, Certification>(
        "SELECT certification_name, issuer, year FROM certifications ORDER BY year DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(ResumeData {
        profile,
        skills,
        experience,
        education,
        projects,
        publications,
        personality,
        interests,
        achievements,
        certifications,
    })
}

/// Decodes a JSON string array column. Malformed content is logged and treated as empty.
fn json_list(raw: Option<String>, column: &str) -> Vec<String> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Vec::new();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Ignoring malformed JSON list in {column}: {e}");
        Vec::new()
    })
}

fn split_authors(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}
