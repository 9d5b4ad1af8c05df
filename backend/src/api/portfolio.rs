use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::Router;

use crate::api::CurrentUser;
use crate::error::AppError;
use crate::models::{NewPortfolioItemRequest, PortfolioItem, UpdatePortfolioItemRequest};
use crate::services::{PortfolioService, PortfolioSummary};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/portfolio", get(list_items).post(create_item))
        .route("/portfolio/summary", get(summary))
        .route("/portfolio/{id}", put(update_item).delete(delete_item))
}

async fn list_items(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<PortfolioItem>>, AppError> {
    let items = PortfolioService::new(state.db).list(&user_id).await?;
    Ok(Json(items))
}

async fn summary(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<PortfolioSummary>, AppError> {
    let summary = PortfolioService::new(state.db).summary(&user_id).await?;
    Ok(Json(summary))
}

async fn create_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<NewPortfolioItemRequest>,
) -> Result<(StatusCode, Json<PortfolioItem>), AppError> {
    let item = PortfolioService::new(state.db).create(&user_id, req).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdatePortfolioItemRequest>,
) -> Result<Json<PortfolioItem>, AppError> {
    let item = PortfolioService::new(state.db).update(&user_id, &id, req).await?;
    Ok(Json(item))
}

async fn delete_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    PortfolioService::new(state.db).delete(&user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
