use axum::Json;
use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::CurrentUser;
use crate::assistant::{ChatMessage, validate_conversation};
use crate::error::AppError;
use crate::preferences::{AccessibilityPreferences, UpdatePreferencesRequest};
use crate::simulation::{self, SimulationOutcome, SimulationRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    reply: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/simulations", post(run_simulation))
        .route("/assistant/chat", post(chat))
        .route("/preferences", get(get_preferences).put(update_preferences))
}

async fn run_simulation(Json(req): Json<SimulationRequest>) -> Result<Json<SimulationOutcome>, AppError> {
    let outcome = simulation::run(&req, &mut rand::rng())?;
    Ok(Json(outcome))
}

async fn chat(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    validate_conversation(&req.messages)?;
    info!(user_id = %user_id, messages = req.messages.len(), "assistant request");
    let reply = state.assistant.reply(&req.messages).await?;
    Ok(Json(ChatResponse { reply }))
}

async fn get_preferences(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<AccessibilityPreferences>, AppError> {
    let prefs = AccessibilityPreferences::load(state.preferences.as_ref(), &user_id).await?;
    Ok(Json(prefs))
}

async fn update_preferences(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<UpdatePreferencesRequest>,
) -> Result<Json<AccessibilityPreferences>, AppError> {
    let store = state.preferences.as_ref();
    let prefs = AccessibilityPreferences::load(store, &user_id).await?.apply(&req)?;
    prefs.save(store, &user_id).await?;
    Ok(Json(prefs))
}
