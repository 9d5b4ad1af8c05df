//! Lesson progression: the two-level lesson tree, the linear reading order,
//! sequential unlocking and module progress.
//!
//! Everything here is pure and synchronous. Callers fetch published lessons
//! and completion records first, then hand them over; identical inputs always
//! produce identical outputs.

mod gating;
mod tree;

pub use gating::{ModuleProgress, completed_within, module_progress, unlocked_lessons};
pub use tree::{LessonNode, build_lesson_tree, linearize, neighbours};

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{Lesson, LessonId};

    pub fn lesson(id: LessonId, parent_id: Option<LessonId>, order_index: i64) -> Lesson {
        Lesson {
            id,
            module_id: 1,
            parent_id,
            title: format!("Materi {}", id),
            content: String::new(),
            order_index,
            is_published: true,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            updated_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }
}
