//! Content administration. Access control sits in front of this service
//! together with authentication.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::Router;

use crate::error::AppError;
use crate::models::{
    Lesson, LessonId, Module, ModuleFilter, NewLessonRequest, NewModuleRequest, UpdateLessonRequest,
    UpdateModuleRequest,
};
use crate::services::CatalogService;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/modules", get(list_modules).post(create_module))
        .route(
            "/admin/modules/{id}",
            get(get_module).put(update_module).delete(delete_module),
        )
        .route("/admin/modules/{id}/lessons", get(list_lessons).post(create_lesson))
        .route("/admin/lessons/{id}", put(update_lesson).delete(delete_lesson))
}

async fn list_modules(State(state): State<AppState>) -> Result<Json<Vec<Module>>, AppError> {
    let modules = CatalogService::new(state.db)
        .list_modules(&ModuleFilter::default())
        .await?;
    Ok(Json(modules))
}

async fn get_module(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Module>, AppError> {
    let module = CatalogService::new(state.db).get_module(id).await?;
    Ok(Json(module))
}

async fn create_module(
    State(state): State<AppState>,
    Json(req): Json<NewModuleRequest>,
) -> Result<(StatusCode, Json<Module>), AppError> {
    let module = CatalogService::new(state.db).create_module(req).await?;
    Ok((StatusCode::CREATED, Json(module)))
}

async fn update_module(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateModuleRequest>,
) -> Result<Json<Module>, AppError> {
    let module = CatalogService::new(state.db).update_module(id, req).await?;
    Ok(Json(module))
}

async fn delete_module(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    CatalogService::new(state.db).delete_module(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_lessons(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Vec<Lesson>>, AppError> {
    let lessons = CatalogService::new(state.db).list_lessons(id).await?;
    Ok(Json(lessons))
}

async fn create_lesson(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<NewLessonRequest>,
) -> Result<(StatusCode, Json<Lesson>), AppError> {
    let lesson = CatalogService::new(state.db).create_lesson(id, req).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

async fn update_lesson(
    State(state): State<AppState>,
    Path(id): Path<LessonId>,
    Json(req): Json<UpdateLessonRequest>,
) -> Result<Json<Lesson>, AppError> {
    let lesson = CatalogService::new(state.db).update_lesson(id, req).await?;
    Ok(Json(lesson))
}

async fn delete_lesson(State(state): State<AppState>, Path(id): Path<LessonId>) -> Result<StatusCode, AppError> {
    CatalogService::new(state.db).delete_lesson(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
