use std::convert::Infallible;
use std::time::{Duration, Instant};

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::agents::{AgentRole, Turn};
use crate::chat::logs::{log_chat, log_feedback, ChatLogEntry};
use crate::chat::workflow::ChatTurn;
use crate::errors::AppError;
use crate::state::AppState;

const STREAM_FAILURE_MESSAGE: &str = "Failed to generate response";

#[derive(Debug, Deserialize)]
pub struct ChatMessageRequest {
    pub message: String,
    pub session_id: Option<String>,
    pub token: Option<String>,
    /// Free-form company hint from the dashboard; only traced.
    pub company: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessageResponse {
    pub success: bool,
    pub response: String,
    pub agent: String,
    pub confidence: f32,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub session_id: String,
    pub messages: Vec<Turn>,
    pub current_agent: Option<AgentRole>,
    pub agent_history: Vec<AgentRole>,
    pub created_at: String,
    pub last_updated: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub session_id: String,
    pub message_index: usize,
    pub feedback: String,
    pub token: Option<String>,
}

impl ChatMessageRequest {
    fn validated_message(&self) -> Result<&str, AppError> {
        let message = self.message.trim();
        if message.is_empty() {
            return Err(AppError::Validation("Message must not be empty".to_string()));
        }
        Ok(message)
    }

    fn session_id_or_new(&self) -> String {
        self.session_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }
}

/// POST /api/chat/message
pub async fn handle_message(
    State(state): State<AppState>,
    Json(req): Json<ChatMessageRequest>,
) -> Result<Json<ChatMessageResponse>, AppError> {
    let message = req.validated_message()?;
    let session_id = req.session_id_or_new();
    debug!("Chat message for session {session_id} (company hint: {:?})", req.company);

    let started = Instant::now();
    let turn = state.workflow.handle(message, &session_id).await?;
    debug!(
        "Routing confidence {:.2}, answer confidence {:.2}",
        turn.routing_confidence, turn.reply.confidence
    );
    record_turn(&state, &req, message, &turn, started.elapsed()).await;

    Ok(Json(ChatMessageResponse {
        success: true,
        response: turn.reply.content,
        agent: turn.role.label().to_string(),
        confidence: turn.reply.confidence,
        session_id,
    }))
}

/// POST /api/chat/message/stream
///
/// Emits `data:` chunks in order: status, status, agent_change, status(null),
/// one token chunk per word, done. A failed turn sends an error chunk before done.
pub async fn handle_message_stream(
    State(state): State<AppState>,
    Json(req): Json<ChatMessageRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let message = req.validated_message()?.to_string();
    let session_id = req.session_id_or_new();
    let word_delay = Duration::from_millis(state.config.stream_word_delay_ms);

    let stream = async_stream::stream! {
        yield Ok::<_, Infallible>(chunk(json!({"type": "status", "message": "Processing your question..."})));
        yield Ok(chunk(json!({"type": "status", "message": "Generating response..."})));

        let started = Instant::now();
        match state.workflow.handle(&message, &session_id).await {
            Ok(turn) => {
                yield Ok(chunk(json!({"type": "agent_change", "agent": turn.role.label()})));
                yield Ok(chunk(json!({"type": "status", "message": null})));

                let mut tokens = std::pin::pin!(token_events(&turn.reply.content, word_delay));
                while let Some(event) = tokens.next().await {
                    yield Ok(event);
                }

                record_turn(&state, &req, &message, &turn, started.elapsed()).await;
            }
            Err(e) => {
                warn!("Streaming chat turn failed for session {session_id}: {e}");
                yield Ok(chunk(json!({"type": "error", "message": STREAM_FAILURE_MESSAGE})));
            }
        }

        yield Ok(chunk(json!({"type": "done", "session_id": session_id})));
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// GET /api/chat/history/:session_id
pub async fn handle_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ChatHistoryResponse>, AppError> {
    let not_found = || AppError::NotFound("Session not found".to_string());
    let handle = state.workflow.sessions().get(&session_id).ok_or_else(not_found)?;
    let session = handle.lock().await;
    if session.messages.is_empty() {
        return Err(not_found());
    }

    Ok(Json(ChatHistoryResponse {
        session_id: session.session_id.clone(),
        messages: session.messages.clone(),
        current_agent: session.current_agent,
        agent_history: session.agent_history.clone(),
        created_at: session.created_at.to_rfc3339(),
        last_updated: session.last_updated.to_rfc3339(),
    }))
}

/// DELETE /api/chat/history/:session_id
pub async fn handle_clear_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !state.workflow.sessions().remove(&session_id) {
        return Err(AppError::NotFound("Session not found".to_string()));
    }
    Ok(Json(json!({"success": true, "session_id": session_id})))
}

/// POST /api/chat/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<Value>, AppError> {
    if req.feedback.trim().is_empty() {
        return Err(AppError::Validation("Feedback must not be empty".to_string()));
    }

    log_feedback(
        &state.db,
        req.token.as_deref(),
        &req.session_id,
        "chat_message",
        &req.feedback,
        &json!({"message_index": req.message_index}),
    )
    .await?;

    Ok(Json(json!({"success": true, "message": "Feedback recorded"})))
}

/// GET /api/chat/suggestions
pub async fn handle_suggestions() -> Json<Value> {
    Json(json!({
        "suggestions": [
            {
                "category": "Technical Skills",
                "questions": [
                    "What programming languages are you most proficient in?",
                    "Can you describe a complex technical problem you've solved?",
                    "What's your experience with distributed systems?",
                    "How do you approach system design challenges?"
                ]
            },
            {
                "category": "AI/ML Experience",
                "questions": [
                    "Can you explain a project where you used AI/ML?",
                    "How do you approach prompt engineering?",
                    "What's your experience with RAG systems?"
                ]
            },
            {
                "category": "Work Style",
                "questions": [
                    "How do you prefer to collaborate with team members?",
                    "What motivates you in your work?",
                    "How do you handle tight deadlines?",
                    "What's your approach to code reviews?"
                ]
            },
            {
                "category": "Background",
                "questions": [
                    "Tell me about your education",
                    "Why did you transition between roles?",
                    "What's been your most impactful project?",
                    "How has your career progressed over time?"
                ]
            }
        ]
    }))
}

fn chunk(payload: Value) -> Event {
    Event::default().data(payload.to_string())
}

/// Splits on single spaces; every word after the first carries its leading space
/// so concatenating the tokens reproduces the reply exactly.
pub fn typing_tokens(text: &str) -> Vec<String> {
    text.split(' ')
        .enumerate()
        .map(|(i, word)| if i == 0 { word.to_string() } else { format!(" {word}") })
        .collect()
}

/// One `token` chunk per word, each followed by `delay` to mimic typing.
fn token_events(text: &str, delay: Duration) -> impl Stream<Item = Event> {
    let tokens = typing_tokens(text);
    async_stream::stream! {
        for token in tokens {
            yield chunk(json!({"type": "token", "content": token}));
            tokio::time::sleep(delay).await;
        }
    }
}

/// Chat logging is best-effort: a failed insert never fails the visitor's request.
async fn record_turn(
    state: &AppState,
    req: &ChatMessageRequest,
    message: &str,
    turn: &ChatTurn,
    elapsed: Duration,
) {
    let entry = ChatLogEntry {
        session_id: &turn.session_id,
        token: req.token.as_deref(),
        agent: turn.role.label(),
        user_message: message,
        bot_response: &turn.reply.content,
        response_time_ms: i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
    };
    if let Err(e) = log_chat(&state.db, entry).await {
        warn!("Failed to log chat turn for session {}: {e}", turn.session_id);
    }
}
