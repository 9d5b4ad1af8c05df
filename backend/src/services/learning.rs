use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::models::{CompletionRecord, Enrollment, Lesson, LessonId, Module};
use crate::progression::{
    LessonNode, ModuleProgress, build_lesson_tree, completed_within, linearize, module_progress,
    neighbours, unlocked_lessons,
};

#[derive(Debug, Serialize)]
pub struct ModuleView {
    pub module: Module,
    pub lessons: Vec<LessonNode>,
    pub completed_lesson_ids: BTreeSet<LessonId>,
    pub unlocked_lesson_ids: BTreeSet<LessonId>,
    pub progress: ModuleProgress,
    pub enrolled: bool,
}

#[derive(Debug, Serialize)]
pub struct LessonView {
    pub lesson: Lesson,
    pub previous_lesson_id: Option<LessonId>,
    pub next_lesson_id: Option<LessonId>,
    pub completed: bool,
    pub progress: ModuleProgress,
}

#[derive(Debug, Serialize)]
pub struct CompletionState {
    pub record: CompletionRecord,
    pub module_id: i64,
    pub completed_lesson_ids: BTreeSet<LessonId>,
    pub unlocked_lesson_ids: BTreeSet<LessonId>,
    pub progress: ModuleProgress,
}

/// Progression of one user through one module, computed from published
/// lessons and the user's completion records.
struct Progression {
    tree: Vec<LessonNode>,
    completed: HashSet<LessonId>,
    unlocked: BTreeSet<LessonId>,
    progress: ModuleProgress,
}

impl Progression {
    fn compute(lessons: Vec<Lesson>, completed_anywhere: &HashSet<LessonId>) -> Self {
        let tree = build_lesson_tree(lessons);
        let linear = linearize(&tree);
        let completed = completed_within(&linear, completed_anywhere);
        let unlocked = unlocked_lessons(&linear, &completed);
        let progress = module_progress(&tree, &completed);

        Self {
            tree,
            completed,
            unlocked,
            progress,
        }
    }

    fn completed_ids(&self) -> BTreeSet<LessonId> {
        self.completed.iter().copied().collect()
    }
}

pub struct LearningService {
    db: SqlitePool,
}

impl LearningService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    async fn load_progression(&self, module_id: i64, user_id: &str) -> Result<Progression, AppError> {
        let lessons = repository::fetch_published_lessons(&self.db, module_id).await?;
        let completed = repository::fetch_completed_lesson_ids(&self.db, user_id).await?;
        Ok(Progression::compute(lessons, &completed))
    }

    async fn require_module(&self, module_id: i64) -> Result<Module, AppError> {
        repository::find_module_by_id(&self.db, module_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn module_view(&self, module_id: i64, user_id: &str) -> Result<ModuleView, AppError> {
        let module = self.require_module(module_id).await?;
        let progression = self.load_progression(module_id, user_id).await?;
        let enrolled = repository::touch_enrollment(&self.db, user_id, module_id).await?;
        let completed_lesson_ids = progression.completed_ids();

        Ok(ModuleView {
            module,
            lessons: progression.tree,
            completed_lesson_ids,
            unlocked_lesson_ids: progression.unlocked,
            progress: progression.progress,
            enrolled,
        })
    }

    /// Opens a lesson for reading. Locked lessons are refused rather than
    /// rendered.
    pub async fn lesson_view(
        &self,
        module_id: i64,
        lesson_id: LessonId,
        user_id: &str,
    ) -> Result<LessonView, AppError> {
        self.require_module(module_id).await?;
        let progression = self.load_progression(module_id, user_id).await?;

        let linear = linearize(&progression.tree);
        let (previous_lesson_id, next_lesson_id) =
            neighbours(&linear, lesson_id).ok_or(AppError::NotFound)?;

        if !progression.unlocked.contains(&lesson_id) {
            warn!(user_id, lesson_id, "refusing locked lesson");
            return Err(AppError::Forbidden(
                "lesson is locked until the previous lesson is completed".to_string(),
            ));
        }

        let lesson = linear
            .iter()
            .find(|lesson| lesson.id == lesson_id)
            .map(|lesson| (*lesson).clone())
            .ok_or(AppError::NotFound)?;

        repository::touch_enrollment(&self.db, user_id, module_id).await?;

        Ok(LessonView {
            lesson,
            previous_lesson_id,
            next_lesson_id,
            completed: progression.completed.contains(&lesson_id),
            progress: progression.progress,
        })
    }

    /// Records that the user finished a lesson. The user must be enrolled in
    /// the lesson's module; nothing is written otherwise.
    pub async fn mark_lesson_complete(
        &self,
        user_id: &str,
        lesson_id: LessonId,
    ) -> Result<CompletionState, AppError> {
        let lesson = repository::find_lesson_by_id(&self.db, lesson_id)
            .await?
            .filter(|lesson| lesson.is_published)
            .ok_or(AppError::NotFound)?;
        let module_id = lesson.module_id;

        let record = match repository::record_completion(&self.db, user_id, lesson_id, module_id).await? {
            Some(record) => record,
            None => {
                warn!(user_id, lesson_id, module_id, "completion rejected: not enrolled");
                return Err(AppError::Forbidden(format!(
                    "enroll in module {} before completing its lessons",
                    module_id
                )));
            }
        };
        info!(user_id, lesson_id, module_id, "lesson completed");

        let progression = self.load_progression(module_id, user_id).await?;
        Ok(CompletionState {
            record,
            module_id,
            completed_lesson_ids: progression.completed_ids(),
            unlocked_lesson_ids: progression.unlocked,
            progress: progression.progress,
        })
    }

    pub async fn enroll(&self, user_id: &str, module_id: i64) -> Result<Enrollment, AppError> {
        self.require_module(module_id).await?;
        let enrollment = repository::upsert_enrollment(&self.db, user_id, module_id).await?;
        info!(user_id, module_id, "enrolled");
        Ok(enrollment)
    }

    pub async fn unenroll(&self, user_id: &str, module_id: i64) -> Result<(), AppError> {
        if repository::delete_enrollment(&self.db, user_id, module_id).await? {
            info!(user_id, module_id, "unenrolled");
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    pub async fn enrollments(&self, user_id: &str) -> Result<Vec<Enrollment>, AppError> {
        Ok(repository::fetch_enrollments(&self.db, user_id).await?)
    }
}
