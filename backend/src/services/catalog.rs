use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{
    Lesson, LessonId, Module, ModuleFilter, NewLessonRequest, NewModuleRequest,
    UpdateLessonRequest, UpdateModuleRequest,
};

/// Administrative CRUD over modules and lessons. This is the boundary where
/// lesson records are checked against the two-level hierarchy before they
/// reach the progression engine.
pub struct CatalogService {
    db: SqlitePool,
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(())
}

impl CatalogService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list_modules(&self, filter: &ModuleFilter) -> Result<Vec<Module>, AppError> {
        Ok(repository::fetch_modules(&self.db, filter).await?)
    }

    pub async fn get_module(&self, id: i64) -> Result<Module, AppError> {
        repository::find_module_by_id(&self.db, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create_module(&self, req: NewModuleRequest) -> Result<Module, AppError> {
        require_text("title", &req.title)?;
        require_text("category", &req.category)?;

        let module = repository::insert_module(&self.db, req).await?;
        info!(module_id = module.id, "module created");
        Ok(module)
    }

    pub async fn update_module(&self, id: i64, req: UpdateModuleRequest) -> Result<Module, AppError> {
        if let Some(title) = &req.title {
            require_text("title", title)?;
        }
        if let Some(category) = &req.category {
            require_text("category", category)?;
        }

        repository::update_module(&self.db, id, req)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete_module(&self, id: i64) -> Result<(), AppError> {
        if repository::delete_module(&self.db, id).await? {
            info!(module_id = id, "module deleted");
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    /// Every lesson of a module, drafts included.
    pub async fn list_lessons(&self, module_id: i64) -> Result<Vec<Lesson>, AppError> {
        self.get_module(module_id).await?;
        Ok(repository::fetch_all_lessons(&self.db, module_id).await?)
    }

    pub async fn create_lesson(&self, module_id: i64, req: NewLessonRequest) -> Result<Lesson, AppError> {
        self.get_module(module_id).await?;
        require_text("title", &req.title)?;
        if let Some(parent_id) = req.parent_id {
            self.check_parent(module_id, parent_id, None).await?;
        }

        let lesson = repository::insert_lesson(&self.db, module_id, req).await?;
        info!(module_id, lesson_id = lesson.id, "lesson created");
        Ok(lesson)
    }

    pub async fn update_lesson(&self, id: LessonId, req: UpdateLessonRequest) -> Result<Lesson, AppError> {
        let current = repository::find_lesson_by_id(&self.db, id)
            .await?
            .ok_or(AppError::NotFound)?;

        if let Some(title) = &req.title {
            require_text("title", title)?;
        }
        if let Some(Some(parent_id)) = req.parent_id {
            self.check_parent(current.module_id, parent_id, Some(id)).await?;
            if repository::count_child_lessons(&self.db, id).await? > 0 {
                return Err(AppError::BadRequest(
                    "a lesson with children cannot be nested under another lesson".to_string(),
                ));
            }
        }

        Ok(repository::update_lesson(&self.db, current, req).await?)
    }

    pub async fn delete_lesson(&self, id: LessonId) -> Result<(), AppError> {
        if repository::delete_lesson(&self.db, id).await? {
            info!(lesson_id = id, "lesson deleted");
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    /// A parent must be a top-level lesson of the same module.
    async fn check_parent(
        &self,
        module_id: i64,
        parent_id: LessonId,
        lesson_id: Option<LessonId>,
    ) -> Result<(), AppError> {
        if lesson_id == Some(parent_id) {
            return Err(AppError::BadRequest("a lesson cannot be its own parent".to_string()));
        }

        let parent = repository::find_lesson_by_id(&self.db, parent_id)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("parent lesson {} does not exist", parent_id)))?;

        if parent.module_id != module_id {
            return Err(AppError::BadRequest(format!(
                "parent lesson {} belongs to another module",
                parent_id
            )));
        }
        if !parent.is_top_level() {
            return Err(AppError::BadRequest(
                "lessons can only be nested one level deep".to_string(),
            ));
        }
        Ok(())
    }
}
