use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::auth::domain::{categorize_domain, DOMAIN_NOT_PROVIDED};
use crate::auth::tokens::parse_timestamp;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, FromRow)]
pub struct VisitorRow {
    pub company: Option<String>,
    pub company_name: Option<String>,
    pub last_accessed: Option<String>,
    pub created_at: String,
    pub visit_count: i64,
    pub latest_domain: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Visitor {
    pub company: String,
    pub company_name: String,
    pub last_accessed: Option<String>,
    pub first_accessed: String,
    pub visit_count: i64,
    pub latest_domain: Option<String>,
    pub domain_category: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub total_visitors: usize,
    pub total_visits: i64,
    pub visitors_this_week: usize,
    pub visitors: Vec<Visitor>,
}

pub async fn load_analytics(pool: &SqlitePool, now: DateTime<Utc>) -> Result<AnalyticsSummary, sqlx::Error> {
    let rows = sqlx::query_as::<_, VisitorRow>(
        r#"
        SELECT
            t.company,
            t.company_name,
            t.last_accessed,
            t.created_at,
            COUNT(a.id) AS visit_count,
            (
                SELECT l.company_domain
                FROM access_logs l
                WHERE l.token_hash = t.token_hash
                  AND l.company_domain IS NOT NULL
                  AND l.company_domain != ?
                ORDER BY l.accessed_at DESC, l.id DESC
                LIMIT 1
            ) AS latest_domain
        FROM token_access t
        LEFT JOIN access_logs a ON t.token_hash = a.token_hash
        WHERE t.company IS NOT NULL
        GROUP BY t.token_hash
        ORDER BY t.last_accessed DESC
        "#,
    )
    .bind(DOMAIN_NOT_PROVIDED)
    .fetch_all(pool)
    .await?;

    Ok(summarize(rows, now))
}

/// Every listed token counts as at least one visit.
pub fn summarize(rows: Vec<VisitorRow>, now: DateTime<Utc>) -> AnalyticsSummary {
    let week_ago = now - Duration::days(7);

    let visitors: Vec<Visitor> = rows
        .into_iter()
        .map(|row| {
            let company = row.company.unwrap_or_else(|| UNKNOWN.to_string());
            let category_source = row.latest_domain.as_deref().unwrap_or(&company);
            let domain_category = categorize_domain(category_source);
            Visitor {
                company_name: row.company_name.unwrap_or_else(|| company.clone()),
                last_accessed: row.last_accessed,
                first_accessed: row.created_at,
                visit_count: row.visit_count.max(1),
                latest_domain: row.latest_domain,
                domain_category,
                company,
            }
        })
        .collect();

    let total_visits = visitors.iter().map(|v| v.visit_count).sum();
    let visitors_this_week = visitors
        .iter()
        .filter_map(|v| v.last_accessed.as_deref().and_then(parse_timestamp))
        .filter(|at| *at > week_ago)
        .count();

    AnalyticsSummary {
        total_visitors: visitors.len(),
        total_visits,
        visitors_this_week,
        visitors,
    }
}
