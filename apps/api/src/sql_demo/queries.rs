use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Executor, FromRow, Row, SqlitePool, Statement, TypeInfo, ValueRef};
use tracing::info;

use crate::errors::AppError;

/// A registered demonstration query as listed to visitors.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DemoQuery {
    #[sqlx(rename = "query_name")]
    pub name: String,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub success: bool,
    pub query_name: String,
    pub description: String,
    pub sql: String,
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
    pub row_count: usize,
}

#[derive(FromRow)]
struct StoredQuery {
    query_sql: String,
    description: String,
}

fn write_keywords() -> &'static Regex {
    static WRITE_KEYWORDS: OnceLock<Regex> = OnceLock::new();
    WRITE_KEYWORDS.get_or_init(|| {
        Regex::new(
            r"(?i)\b(INSERT|UPDATE|DELETE|DROP|ALTER|CREATE|REPLACE|ATTACH|DETACH|PRAGMA|VACUUM)\b",
        )
        .expect("valid write keyword regex")
    })
}

pub async fn list_queries(pool: &SqlitePool) -> Result<Vec<DemoQuery>, sqlx::Error> {
    sqlx::query_as::<_, DemoQuery>(
        "SELECT query_name, description, category FROM query_demonstrations ORDER BY category, query_name",
    )
    .fetch_all(pool)
    .await
}

/// Rejects anything but a single `SELECT`/`WITH` statement.
pub fn ensure_read_only(sql: &str) -> Result<(), AppError> {
    let statement = sql.trim().trim_end_matches(';').trim();

    if statement.is_empty() {
        return Err(AppError::Validation("Query is empty".to_string()));
    }
    if statement.contains(';') {
        return Err(AppError::Validation(
            "Only a single statement may be executed".to_string(),
        ));
    }

    let first = statement
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase();
    if first != "SELECT" && first != "WITH" {
        return Err(AppError::Validation(
            "Only SELECT queries may be executed".to_string(),
        ));
    }

    if let Some(keyword) = write_keywords().find(statement) {
        return Err(AppError::Validation(format!(
            "Query contains a forbidden keyword: {}",
            keyword.as_str().to_uppercase()
        )));
    }

    Ok(())
}

/// Looks up `query_name` and runs it inside a transaction that is always rolled back.
pub async fn execute_demo_query(pool: &SqlitePool, query_name: &str) -> Result<QueryResult, AppError> {
    let stored = sqlx::query_as::<_, StoredQuery>(
        "SELECT query_sql, description FROM query_demonstrations WHERE query_name = ?",
    )
    .bind(query_name)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Query '{query_name}' not found")))?;

    ensure_read_only(&stored.query_sql)?;

    let mut tx = pool.begin().await?;
    let columns: Vec<String> = (&mut *tx)
        .prepare(stored.query_sql.as_str())
        .await?
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    let fetched = sqlx::query(&stored.query_sql).fetch_all(&mut *tx).await?;
    tx.rollback().await?;

    let rows = fetched
        .iter()
        .map(|row| row_to_object(row, &columns))
        .collect::<Result<Vec<_>, _>>()?;

    info!("Executed demo query '{query_name}' ({} rows)", rows.len());

    Ok(QueryResult {
        success: true,
        query_name: query_name.to_string(),
        description: stored.description,
        sql: stored.query_sql,
        row_count: rows.len(),
        columns,
        rows,
    })
}

fn row_to_object(row: &SqliteRow, columns: &[String]) -> Result<Map<String, Value>, sqlx::Error> {
    let mut object = Map::with_capacity(columns.len());
    for (index, name) in columns.iter().enumerate() {
        object.insert(name.clone(), cell_value(row, index)?);
    }
    Ok(object)
}

/// Converts one cell by its runtime storage class, so computed columns work too.
fn cell_value(row: &SqliteRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let value = match raw.type_info().name() {
        "INTEGER" => Value::from(row.try_get::<i64, _>(index)?),
        "REAL" => Number::from_f64(row.try_get::<f64, _>(index)?)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "BLOB" => Value::String(String::from_utf8_lossy(&row.try_get::<Vec<u8>, _>(index)?).into_owned()),
        _ => Value::String(row.try_get::<String, _>(index)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn seed_projects(pool: &SqlitePool) {
        sqlx::query(
            r#"
            INSERT INTO projects (name, description, status, impact_score, start_date, tech_stack)
            VALUES ('Dashboard', 'Resume site', 'active', 9, '2024-03-01', '["Rust"]'),
                   ('Scraper', NULL, 'done', 5, '2023-01-01', '[]')
            "#,
        )
        .execute(pool)
        .await
        .unwrap();
    }

    #[test]
    fn test_read_only_accepts_select_and_with() {
        assert!(ensure_read_only("SELECT * FROM skills;").is_ok());
        assert!(ensure_read_only("with t as (select 1) select * from t").is_ok());
        assert!(ensure_read_only("SELECT created_at, last_updated FROM x").is_ok());
    }

    #[test]
    fn test_read_only_rejects_writes_and_batches() {
        for sql in [
            "DELETE FROM skills",
            "SELECT 1; DROP TABLE skills",
            "WITH t AS (SELECT 1) INSERT INTO skills SELECT * FROM t",
            "PRAGMA table_info(skills)",
            "   ",
        ] {
            assert!(
                matches!(ensure_read_only(sql), Err(AppError::Validation(_))),
                "{sql}"
            );
        }
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_category_then_name() {
        let pool = test_pool().await;
        let queries = list_queries(&pool).await.unwrap();
        let keys: Vec<_> = queries
            .iter()
            .map(|q| (q.category.clone(), q.name.clone()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert!(queries.iter().any(|q| q.name == "Project Overview"));
    }

    #[tokio::test]
    async fn test_execute_returns_typed_rows() {
        let pool = test_pool().await;
        seed_projects(&pool).await;

        let result = execute_demo_query(&pool, "Project Overview").await.unwrap();
        assert!(result.success);
        assert_eq!(result.columns, vec!["name", "description", "status", "impact_score"]);
        assert_eq!(result.row_count, 2);
        assert_eq!(result.rows[0]["name"], "Dashboard");
        assert_eq!(result.rows[0]["impact_score"], 9);
        assert_eq!(result.rows[1]["description"], Value::Null);
    }

    #[tokio::test]
    async fn test_execute_computed_columns() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO skills (category, skill_name, proficiency_level) VALUES ('Backend', 'Rust', 4), ('Backend', 'Go', 3)")
            .execute(&pool)
            .await
            .unwrap();

        let result = execute_demo_query(&pool, "Skills by Category").await.unwrap();
        assert_eq!(result.rows[0]["category"], "Backend");
        assert_eq!(result.rows[0]["skill_count"], 2);
        assert_eq!(result.rows[0]["avg_proficiency"], 3.5);
    }

    #[tokio::test]
    async fn test_empty_result_still_reports_columns() {
        let pool = test_pool().await;
        let result = execute_demo_query(&pool, "Career Timeline").await.unwrap();
        assert_eq!(result.row_count, 0);
        assert_eq!(result.columns, vec!["company", "position", "start_date", "end_date"]);
    }

    #[tokio::test]
    async fn test_unknown_query_is_not_found() {
        let pool = test_pool().await;
        let err = execute_demo_query(&pool, "Nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_stored_write_statement_is_refused() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO query_demonstrations (query_name, query_sql, description, category) VALUES ('Wipe', 'DELETE FROM skills', 'bad', 'x')")
            .execute(&pool)
            .await
            .unwrap();

        let err = execute_demo_query(&pool, "Wipe").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
