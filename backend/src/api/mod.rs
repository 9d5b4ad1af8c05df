mod admin;
mod identity;
mod portfolio;
mod tools;

use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::error::AppError;
use crate::models::{Enrollment, LessonId, Module, ModuleFilter};
use crate::services::{CatalogService, CompletionState, LearningService, LessonView, ModuleView};
use crate::state::AppState;

pub use identity::{CurrentUser, USER_ID_HEADER};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/modules", get(list_modules))
        .route("/modules/{id}", get(module_view))
        .route("/modules/{id}/enrollment", post(enroll).delete(unenroll))
        .route("/modules/{id}/lessons/{lesson_id}", get(lesson_view))
        .route("/lessons/{id}/complete", post(complete_lesson))
        .route("/enrollments", get(list_enrollments))
        .merge(admin::routes())
        .merge(portfolio::routes())
        .merge(tools::routes())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_modules(
    State(state): State<AppState>,
    Query(filter): Query<ModuleFilter>,
) -> Result<Json<Vec<Module>>, AppError> {
    let modules = CatalogService::new(state.db).list_modules(&filter).await?;
    Ok(Json(modules))
}

async fn module_view(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ModuleView>, AppError> {
    let view = LearningService::new(state.db).module_view(id, &user_id).await?;
    Ok(Json(view))
}

async fn lesson_view(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path((module_id, lesson_id)): Path<(i64, LessonId)>,
) -> Result<Json<LessonView>, AppError> {
    let view = LearningService::new(state.db)
        .lesson_view(module_id, lesson_id, &user_id)
        .await?;
    Ok(Json(view))
}

async fn complete_lesson(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<LessonId>,
) -> Result<Json<CompletionState>, AppError> {
    let completion = LearningService::new(state.db)
        .mark_lesson_complete(&user_id, id)
        .await?;
    Ok(Json(completion))
}

async fn enroll(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = LearningService::new(state.db).enroll(&user_id, id).await?;
    Ok(Json(enrollment))
}

async fn unenroll(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    LearningService::new(state.db).unenroll(&user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_enrollments(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Enrollment>>, AppError> {
    let enrollments = LearningService::new(state.db).enrollments(&user_id).await?;
    Ok(Json(enrollments))
}
