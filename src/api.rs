//! HTTP API endpoints.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::prompts::shuffled_prompts;
use crate::round::{play_round, request_guesses, RoundError};
use crate::state::AppState;
use crate::types::{Difficulty, Guess, Prompt, ProviderKind};

/// Who should guess, and with what credentials
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessRequest {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub custom_instructions: Option<String>,
    #[serde(default)]
    pub provider: Option<ProviderKind>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessResponse {
    pub guesses: Vec<Guess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoundRequest {
    pub prompt: Prompt,
    #[serde(flatten)]
    pub guess: GuessRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PromptQuery {
    pub difficulty: Option<Difficulty>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/prompts", get(list_prompts))
        .route("/api/guess", post(guess))
        .route("/api/round", post(round))
        .with_state(state)
}

/// Shuffled prompt pool.
///
/// GET /api/prompts[?difficulty=easy|medium|hard]
pub async fn list_prompts(Query(query): Query<PromptQuery>) -> Json<Vec<Prompt>> {
    Json(shuffled_prompts(query.difficulty))
}

/// Ask the AI for three ranked guesses.
///
/// POST /api/guess
///
/// Always returns exactly three guesses on success, padded with
/// "[No guess]" placeholders when the reply could not be parsed.
pub async fn guess(State(state): State<Arc<AppState>>, Json(req): Json<GuessRequest>) -> Response {
    if req.description.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(GuessResponse {
                guesses: Vec::new(),
                error: Some("Missing required fields".to_string()),
            }),
        )
            .into_response();
    }

    let kind = req.provider.unwrap_or_else(|| state.default_provider());
    let provider = match state.resolve_provider(kind, req.api_key.as_deref()) {
        Ok(provider) => provider,
        Err(e) => return error_response(e.into()),
    };
    let settings = state.guesser_settings(kind, req.model, req.custom_instructions);

    match request_guesses(provider.as_ref(), &settings, &req.description).await {
        Ok(guesses) => Json(GuessResponse {
            guesses,
            error: None,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// Validate a clue, ask the AI, and score its guesses against the prompt.
///
/// POST /api/round
pub async fn round(State(state): State<Arc<AppState>>, Json(req): Json<RoundRequest>) -> Response {
    let RoundRequest { prompt, guess } = req;

    let kind = guess.provider.unwrap_or_else(|| state.default_provider());
    let provider = match state.resolve_provider(kind, guess.api_key.as_deref()) {
        Ok(provider) => provider,
        Err(e) => return error_response(e.into()),
    };
    let settings = state.guesser_settings(kind, guess.model, guess.custom_instructions);

    match play_round(provider.as_ref(), &settings, &prompt, &guess.description).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: RoundError) -> Response {
    match err {
        RoundError::Provider(ref e) => {
            tracing::error!("AI guess error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GuessResponse {
                    guesses: Vec::new(),
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
        RoundError::ForbiddenWords(ref words) => (
            StatusCode::BAD_REQUEST,
            Json(ValidationError {
                error: err.to_string(),
                violations: words.clone(),
            }),
        )
            .into_response(),
        RoundError::EmptyDescription | RoundError::InstructionsTooLong { .. } => (
            StatusCode::BAD_REQUEST,
            Json(ValidationError {
                error: err.to_string(),
                violations: Vec::new(),
            }),
        )
            .into_response(),
    }
}
