use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::sql_demo::queries::{execute_demo_query, list_queries, DemoQuery, QueryResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ExecuteParams {
    pub query_name: String,
}

/// GET /api/sql/queries
pub async fn handle_list_queries(
    State(state): State<AppState>,
) -> Result<Json<Vec<DemoQuery>>, AppError> {
    Ok(Json(list_queries(&state.db).await?))
}

/// POST /api/sql/execute?query_name=
pub async fn handle_execute(
    State(state): State<AppState>,
    Query(params): Query<ExecuteParams>,
) -> Result<Json<QueryResult>, AppError> {
    Ok(Json(execute_demo_query(&state.db, &params.query_name).await?))
}
