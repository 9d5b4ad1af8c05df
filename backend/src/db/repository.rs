use std::collections::HashSet;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{
    CompletionRecord, Enrollment, Lesson, LessonId, Module, ModuleFilter, NewLessonRequest,
    NewModuleRequest, UpdateLessonRequest, UpdateModuleRequest,
};

const MODULE_COLUMNS: &str =
    "id, title, description, difficulty, category, content_type, duration, created_at, updated_at";

const LESSON_COLUMNS: &str =
    "id, module_id, parent_id, title, content, order_index, is_published, created_at, updated_at";

pub async fn fetch_modules(db: &SqlitePool, filter: &ModuleFilter) -> Result<Vec<Module>, sqlx::Error> {
    sqlx::query_as::<_, Module>(&format!(
        r#"
        SELECT {MODULE_COLUMNS}
        FROM modules
        WHERE (?1 IS NULL OR difficulty = ?1)
          AND (?2 IS NULL OR category = ?2)
        ORDER BY id
        "#
    ))
    .bind(filter.difficulty)
    .bind(filter.category.as_deref())
    .fetch_all(db)
    .await
}

pub async fn find_module_by_id(db: &SqlitePool, id: i64) -> Result<Option<Module>, sqlx::Error> {
    sqlx::query_as::<_, Module>(&format!("SELECT {MODULE_COLUMNS} FROM modules WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_module(db: &SqlitePool, req: NewModuleRequest) -> Result<Module, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    let id = sqlx::query(
        r#"
        INSERT INTO modules
            (title, description, difficulty, category, content_type, duration,
            created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        "#,
    )
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.difficulty)
    .bind(&req.category)
    .bind(req.content_type)
    .bind(&req.duration)
    .bind(&now)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(Module {
        id,
        title: req.title,
        description: req.description,
        difficulty: req.difficulty,
        category: req.category,
        content_type: req.content_type,
        duration: req.duration,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn update_module(
    db: &SqlitePool,
    id: i64,
    req: UpdateModuleRequest,
) -> Result<Option<Module>, sqlx::Error> {
    let mut current = match find_module_by_id(db, id).await? {
        Some(m) => m,
        None => return Ok(None),
    };

    if let Some(title) = req.title {
        current.title = title;
    }
    if let Some(description) = req.description {
        current.description = description;
    }
    if let Some(difficulty) = req.difficulty {
        current.difficulty = difficulty;
    }
    if let Some(category) = req.category {
        current.category = category;
    }
    if let Some(content_type) = req.content_type {
        current.content_type = content_type;
    }
    if let Some(duration) = req.duration {
        current.duration = duration;
    }
    current.updated_at = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        UPDATE modules
        SET title = ?1,
            description = ?2,
            difficulty = ?3,
            category = ?4,
            content_type = ?5,
            duration = ?6,
            updated_at = ?7
        WHERE id = ?8
        "#,
    )
    .bind(&current.title)
    .bind(&current.description)
    .bind(current.difficulty)
    .bind(&current.category)
    .bind(current.content_type)
    .bind(&current.duration)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_module(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM modules WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Published lessons of a module, ordered for display. The tree builder
/// re-sorts, the ordering here only keeps responses stable.
pub async fn fetch_published_lessons(db: &SqlitePool, module_id: i64) -> Result<Vec<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!(
        r#"
        SELECT {LESSON_COLUMNS}
        FROM lessons
        WHERE module_id = ?1 AND is_published = 1
        ORDER BY order_index, id
        "#
    ))
    .bind(module_id)
    .fetch_all(db)
    .await
}

pub async fn fetch_all_lessons(db: &SqlitePool, module_id: i64) -> Result<Vec<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!(
        r#"
        SELECT {LESSON_COLUMNS}
        FROM lessons
        WHERE module_id = ?1
        ORDER BY order_index, id
        "#
    ))
    .bind(module_id)
    .fetch_all(db)
    .await
}

pub async fn find_lesson_by_id(db: &SqlitePool, id: LessonId) -> Result<Option<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn count_child_lessons(db: &SqlitePool, id: LessonId) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lessons WHERE parent_id = ?")
        .bind(id)
        .fetch_one(db)
        .await
}

pub async fn insert_lesson(
    db: &SqlitePool,
    module_id: i64,
    req: NewLessonRequest,
) -> Result<Lesson, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    let id = sqlx::query(
        r#"
        INSERT INTO lessons
            (module_id, parent_id, title, content, order_index, is_published,
            created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        "#,
    )
    .bind(module_id)
    .bind(req.parent_id)
    .bind(&req.title)
    .bind(&req.content)
    .bind(req.order_index)
    .bind(req.is_published)
    .bind(&now)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(Lesson {
        id,
        module_id,
        parent_id: req.parent_id,
        title: req.title,
        content: req.content,
        order_index: req.order_index,
        is_published: req.is_published,
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Applies `req` on top of `current` and writes the result.
pub async fn update_lesson(
    db: &SqlitePool,
    mut current: Lesson,
    req: UpdateLessonRequest,
) -> Result<Lesson, sqlx::Error> {
    if let Some(parent_id) = req.parent_id {
        current.parent_id = parent_id;
    }
    if let Some(title) = req.title {
        current.title = title;
    }
    if let Some(content) = req.content {
        current.content = content;
    }
    if let Some(order_index) = req.order_index {
        current.order_index = order_index;
    }
    if let Some(is_published) = req.is_published {
        current.is_published = is_published;
    }
    current.updated_at = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        UPDATE lessons
        SET parent_id = ?1,
            title = ?2,
            content = ?3,
            order_index = ?4,
            is_published = ?5,
            updated_at = ?6
        WHERE id = ?7
        "#,
    )
    .bind(current.parent_id)
    .bind(&current.title)
    .bind(&current.content)
    .bind(current.order_index)
    .bind(current.is_published)
    .bind(&current.updated_at)
    .bind(current.id)
    .execute(db)
    .await?;

    Ok(current)
}

pub async fn delete_lesson(db: &SqlitePool, id: LessonId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM lessons WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Every lesson the user has completed, across all modules.
pub async fn fetch_completed_lesson_ids(db: &SqlitePool, user_id: &str) -> Result<HashSet<LessonId>, sqlx::Error> {
    let ids = sqlx::query_scalar::<_, i64>("SELECT lesson_id FROM lesson_completions WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(db)
        .await?;

    Ok(ids.into_iter().collect())
}

/// Records a completion. A second call for the same pair keeps the original
/// row and its timestamp.
/// Records a completion for an enrolled user. The enrollment check, the
/// completion insert and the access bump share one transaction; returns
/// `None` and writes nothing when the user is not enrolled in `module_id`.
///
/// Completing an already completed lesson keeps the first `completed_at`.
pub async fn record_completion(
    db: &SqlitePool,
    user_id: &str,
    lesson_id: LessonId,
    module_id: i64,
) -> Result<Option<CompletionRecord>, sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    let mut tx = db.begin().await?;

    // Writing first takes the SQLite write lock before the check is read.
    let enrolled = sqlx::query(
        "UPDATE enrollments SET last_accessed_at = ?1 WHERE user_id = ?2 AND module_id = ?3",
    )
    .bind(&now)
    .bind(user_id)
    .bind(module_id)
    .execute(&mut *tx)
    .await?
    .rows_affected()
        > 0;

    if !enrolled {
        tx.rollback().await?;
        return Ok(None);
    }

    sqlx::query(
        r#"
        INSERT INTO lesson_completions (user_id, lesson_id, completed_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(user_id, lesson_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(lesson_id)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    let record = sqlx::query_as::<_, CompletionRecord>(
        "SELECT user_id, lesson_id, completed_at FROM lesson_completions WHERE user_id = ? AND lesson_id = ?",
    )
    .bind(user_id)
    .bind(lesson_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(record))
}

pub async fn find_enrollment(
    db: &SqlitePool,
    user_id: &str,
    module_id: i64,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(
        "SELECT user_id, module_id, enrolled_at, last_accessed_at FROM enrollments WHERE user_id = ? AND module_id = ?",
    )
    .bind(user_id)
    .bind(module_id)
    .fetch_optional(db)
    .await
}

pub async fn fetch_enrollments(db: &SqlitePool, user_id: &str) -> Result<Vec<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(
        r#"
        SELECT user_id, module_id, enrolled_at, last_accessed_at
        FROM enrollments
        WHERE user_id = ?
        ORDER BY last_accessed_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// Creates the enrollment, or bumps `last_accessed_at` when it exists.
pub async fn upsert_enrollment(
    db: &SqlitePool,
    user_id: &str,
    module_id: i64,
) -> Result<Enrollment, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO enrollments (user_id, module_id, enrolled_at, last_accessed_at)
        VALUES (?1, ?2, ?3, ?3)
        ON CONFLICT(user_id, module_id) DO UPDATE
        SET last_accessed_at = excluded.last_accessed_at
        "#,
    )
    .bind(user_id)
    .bind(module_id)
    .bind(&now)
    .execute(db)
    .await?;

    find_enrollment(db, user_id, module_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

/// Bumps `last_accessed_at` of an existing enrollment; returns whether one existed.
pub async fn touch_enrollment(db: &SqlitePool, user_id: &str, module_id: i64) -> Result<bool, sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    let result = sqlx::query(
        "UPDATE enrollments SET last_accessed_at = ?1 WHERE user_id = ?2 AND module_id = ?3",
    )
    .bind(now)
    .bind(user_id)
    .bind(module_id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn delete_enrollment(db: &SqlitePool, user_id: &str, module_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM enrollments WHERE user_id = ? AND module_id = ?")
        .bind(user_id)
        .bind(module_id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
