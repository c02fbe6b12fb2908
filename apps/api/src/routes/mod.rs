pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::admin::handlers as admin;
use crate::auth::handlers as auth;
use crate::chat::handlers as chat;
use crate::sql_demo::handlers as sql_demo;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Visitor access
        .route("/auth/token", post(auth::handle_token))
        // Chat
        .route("/api/chat/message", post(chat::handle_message))
        .route("/api/chat/message/stream", post(chat::handle_message_stream))
        .route(
            "/api/chat/history/:session_id",
            get(chat::handle_history).delete(chat::handle_clear_history),
        )
        .route("/api/chat/feedback", post(chat::handle_feedback))
        .route("/api/chat/suggestions", get(chat::handle_suggestions))
        // SQL demo
        .route("/api/sql/queries", get(sql_demo::handle_list_queries))
        .route("/api/sql/execute", post(sql_demo::handle_execute))
        // Admin (bearer-token gated)
        .route("/admin/analytics", get(admin::handle_analytics))
        .route(
            "/admin/tokens",
            get(admin::handle_list_tokens).post(admin::handle_create_token),
        )
        .route("/admin/tokens/:hash", delete(admin::handle_revoke_token))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::tokens::NewToken;
    use crate::llm_client::testing::ScriptedLlm;
    use crate::state::testing::{test_state, ADMIN_TOKEN};

    const ANSWER: &str = "I work mostly in Python and Rust on backend services and LLM tooling.";

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn admin_req(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn app_with(replies: Vec<&str>) -> (Router, crate::state::AppState) {
        let state = test_state(Arc::new(ScriptedLlm::new(replies))).await;
        (build_router(state.clone()), state)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app_with(vec![]).await;
        let (status, body) = send_json(&app, get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "resume-dashboard-api");
    }

    #[tokio::test]
    async fn test_auth_token_flow() {
        let (app, state) = app_with(vec![]).await;
        state
            .tokens
            .create(&NewToken {
                token: "GOOGLE2024".to_string(),
                company: "Google".to_string(),
                company_name: "Google LLC".to_string(),
                custom_data: None,
                expires_at: Some(Utc::now() + Duration::days(7)),
            })
            .await
            .unwrap();

        let (status, body) = send_json(&app, post_json("/auth/token", json!({"token": "GOOGLE2024"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["company"], "Google");
        assert_eq!(body["company_name"], "Google LLC");
        assert_eq!(body["domain_valid"], true);
        assert_eq!(body["domain_message"], "Domain not required");
        assert!(body["session_id"].as_str().unwrap().contains('_'));

        let (_, body) = send_json(
            &app,
            post_json(
                "/auth/token",
                json!({"token": "GOOGLE2024", "company_domain": "Recruiter@Google.com"}),
            ),
        )
        .await;
        assert_eq!(body["company"], "google.com");
        assert_eq!(body["domain_message"], "Domain accepted");
    }

    #[tokio::test]
    async fn test_auth_failures_are_reported_in_band() {
        let (app, _) = app_with(vec![]).await;

        let (status, body) = send_json(&app, post_json("/auth/token", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["authenticated"], false);
        assert_eq!(body["error"], "No token provided");
        assert!(body["company"].is_null());

        let (_, body) = send_json(&app, post_json("/auth/token", json!({"token": "WRONG"}))).await;
        assert_eq!(body["error"], "Invalid token");
    }

    #[tokio::test]
    async fn test_chat_message_then_history() {
        let (app, _) = app_with(vec!["TECHNICAL", ANSWER]).await;

        let (status, body) = send_json(
            &app,
            post_json(
                "/api/chat/message",
                json!({"message": "What programming languages do you know?", "token": "GOOGLE2024"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["agent"], "technical");
        assert_eq!(body["response"], ANSWER);
        let session_id = body["session_id"].as_str().unwrap().to_string();

        let (status, history) =
            send_json(&app, get_req(&format!("/api/chat/history/{session_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history["session_id"], session_id.as_str());
        let messages = history["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["agent"], "technical");
        assert_eq!(history["current_agent"], "technical");

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/api/chat/history/{session_id}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, get_req(&format!("/api/chat/history/{session_id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chat_turn_is_logged() {
        let (app, state) = app_with(vec!["HELP", ANSWER]).await;
        send(&app, post_json("/api/chat/message", json!({"message": "hi", "session_id": "s1"}))).await;

        let (agent, session): (String, String) =
            sqlx::query_as("SELECT agent_type, session_id FROM chat_logs")
                .fetch_one(&state.db)
                .await
                .unwrap();
        assert_eq!(agent, "help");
        assert_eq!(session, "s1");
    }

    #[tokio::test]
    async fn test_chat_llm_failure_is_opaque_500() {
        let state = test_state(Arc::new(ScriptedLlm::default().then_fail("secret upstream detail"))).await;
        let app = build_router(state);

        let (status, body) = send_json(&app, post_json("/api/chat/message", json!({"message": "hi"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"]["message"].as_str().unwrap();
        assert!(!message.contains("secret upstream detail"));
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_message() {
        let (app, _) = app_with(vec![]).await;
        let (status, body) = send_json(&app, post_json("/api/chat/message", json!({"message": " "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_history_is_404() {
        let (app, _) = app_with(vec![]).await;
        let (status, _) = send(&app, get_req("/api/chat/history/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    fn sse_payloads(body: &[u8]) -> Vec<Value> {
        String::from_utf8_lossy(body)
            .lines()
            .filter_map(|line| line.strip_prefix("data: "))
            .map(|data| serde_json::from_str(data).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_stream_emits_chunks_in_order() {
        let (app, _) = app_with(vec!["PERSONAL", "I enjoy hiking"]).await;
        let (status, body) = send(
            &app,
            post_json("/api/chat/message/stream", json!({"message": "Hobbies?", "session_id": "s9"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let chunks = sse_payloads(&body);
        let kinds: Vec<&str> = chunks.iter().map(|c| c["type"].as_str().unwrap()).collect();
        assert_eq!(
            kinds,
            vec!["status", "status", "agent_change", "status", "token", "token", "token", "done"]
        );
        assert_eq!(chunks[2]["agent"], "personal");
        assert!(chunks[3]["message"].is_null());
        let text: String = chunks[4..7]
            .iter()
            .map(|c| c["content"].as_str().unwrap())
            .collect();
        assert_eq!(text, "I enjoy hiking");
        assert_eq!(chunks[7]["session_id"], "s9");
    }

    #[tokio::test]
    async fn test_stream_failure_sends_error_chunk() {
        let state = test_state(Arc::new(ScriptedLlm::default().then_fail("boom"))).await;
        let app = build_router(state);
        let (_, body) = send(&app, post_json("/api/chat/message/stream", json!({"message": "hi"}))).await;

        let chunks = sse_payloads(&body);
        let kinds: Vec<&str> = chunks.iter().map(|c| c["type"].as_str().unwrap()).collect();
        assert_eq!(kinds, vec!["status", "status", "error", "done"]);
        assert_eq!(chunks[2]["message"], "Failed to generate response");
    }

    #[tokio::test]
    async fn test_feedback_and_suggestions() {
        let (app, _) = app_with(vec![]).await;
        let (status, body) = send_json(
            &app,
            post_json(
                "/api/chat/feedback",
                json!({"session_id": "s1", "message_index": 1, "feedback": "helpful"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (_, body) = send_json(&app, get_req("/api/chat/suggestions")).await;
        assert_eq!(body["suggestions"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_sql_demo_endpoints() {
        let (app, _) = app_with(vec![]).await;

        let (status, body) = send_json(&app, get_req("/api/sql/queries")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.as_array().unwrap().is_empty());

        let (status, body) = send_json(
            &app,
            post_json("/api/sql/execute?query_name=Career%20Timeline", json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query_name"], "Career Timeline");
        assert_eq!(body["row_count"], 0);

        let (status, _) = send(&app, post_json("/api/sql/execute?query_name=Missing", json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_requires_bearer_token() {
        let (app, _) = app_with(vec![]).await;

        let (status, _) = send(&app, admin_req("GET", "/admin/analytics", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, admin_req("GET", "/admin/analytics", Some("guess"), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) =
            send_json(&app, admin_req("GET", "/admin/analytics", Some(ADMIN_TOKEN), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_visitors"], 0);
    }

    #[tokio::test]
    async fn test_admin_token_lifecycle() {
        let (app, _) = app_with(vec![]).await;

        let (status, body) = send_json(
            &app,
            admin_req(
                "POST",
                "/admin/tokens",
                Some(ADMIN_TOKEN),
                Some(json!({"token": "ACME2025", "company": "Acme", "company_name": "Acme Corp"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let hash = body["token_hash"].as_str().unwrap().to_string();

        let (_, auth) = send_json(&app, post_json("/auth/token", json!({"token": "ACME2025"}))).await;
        assert_eq!(auth["authenticated"], true);

        let (_, listed) = send_json(&app, admin_req("GET", "/admin/tokens", Some(ADMIN_TOKEN), None)).await;
        assert_eq!(listed[0]["token_prefix"], &hash[..8]);

        let uri = format!("/admin/tokens/{hash}");
        let (status, _) = send(&app, admin_req("DELETE", &uri, Some(ADMIN_TOKEN), None)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, admin_req("DELETE", &uri, Some(ADMIN_TOKEN), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, auth) = send_json(&app, post_json("/auth/token", json!({"token": "ACME2025"}))).await;
        assert_eq!(auth["authenticated"], false);
    }
}
