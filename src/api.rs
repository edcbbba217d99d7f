//! REST endpoints for email management.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::analysis::AnalysisEngine;
use crate::config::MailConfig;
use crate::mail::{MailService, SendRequest};
use crate::model::EmailMessage;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: MailConfig,
    pub engine: Arc<AnalysisEngine>,
    pub mail: MailService,
}

/// Build the Axum router with all email-management routes.
pub fn routes(config: MailConfig) -> Router {
    let state = AppState {
        engine: Arc::new(AnalysisEngine::new()),
        mail: MailService::new(config.clone()),
        config,
    };

    Router::new()
        .route("/", get(root))
        .route("/api/v1/health", get(health))
        .route("/api/v1/emails/fetch", post(fetch_emails))
        .route("/api/v1/emails/send", post(send_email))
        .route("/api/v1/emails/analyze", post(analyze_email))
        .route("/api/v1/emails/classify", post(classify_email))
        .route("/api/v1/emails/spam-check", post(spam_check))
        .route("/api/v1/config", get(get_config))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Requests ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FetchRequest {
    #[serde(default = "default_fetch_folder")]
    pub folder: String,
    #[serde(default = "default_fetch_limit")]
    pub limit: usize,
    #[serde(default)]
    pub unread_only: bool,
}

fn default_fetch_folder() -> String {
    "INBOX".to_string()
}

fn default_fetch_limit() -> usize {
    50
}

// ── Service endpoints ───────────────────────────────────────────────

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Welcome to the AI-Powered Email Management Assistant",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/api/v1/health",
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "AI Email Management Assistant",
    }))
}

async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.config.redacted())
}

// ── Mail endpoints ──────────────────────────────────────────────────

async fn fetch_emails(
    State(state): State<AppState>,
    Json(request): Json<FetchRequest>,
) -> impl IntoResponse {
    if let Err(e) = state.config.ensure_credentials() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": e.to_string()})),
        );
    }

    match state
        .mail
        .fetch_emails(&request.folder, request.limit, request.unread_only)
        .await
    {
        Ok(emails) => (StatusCode::OK, Json(serde_json::json!(emails))),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({"error": e.to_string()})),
        ),
    }
}

async fn send_email(
    State(state): State<AppState>,
    Json(request): Json<SendRequest>,
) -> impl IntoResponse {
    if let Err(e) = state.config.ensure_credentials() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": e.to_string()})),
        );
    }
    if request.to.is_empty() {
        warn!("Send request with no recipients rejected");
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "At least one recipient is required"})),
        );
    }

    match state.mail.send_email(request).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "success",
                "message": "Email sent successfully",
            })),
        ),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({"error": e.to_string()})),
        ),
    }
}

// ── Analysis endpoints ──────────────────────────────────────────────

async fn analyze_email(
    State(state): State<AppState>,
    Json(email): Json<EmailMessage>,
) -> impl IntoResponse {
    Json(state.engine.analyze(&email))
}

async fn classify_email(
    State(state): State<AppState>,
    Json(email): Json<EmailMessage>,
) -> impl IntoResponse {
    Json(state.engine.classify(&email))
}

async fn spam_check(
    State(state): State<AppState>,
    Json(email): Json<EmailMessage>,
) -> impl IntoResponse {
    let is_spam = state.engine.detect_spam(&email);
    Json(serde_json::json!({
        "is_spam": is_spam,
        "email_id": email.id,
    }))
}
