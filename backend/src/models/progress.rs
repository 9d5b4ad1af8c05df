use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompletionRecord {
    pub user_id: String,
    pub lesson_id: i64,
    pub completed_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub user_id: String,
    pub module_id: i64,
    pub enrolled_at: String,
    pub last_accessed_at: String,
}
