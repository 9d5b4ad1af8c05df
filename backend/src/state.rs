use std::sync::Arc;

use sqlx::SqlitePool;

use crate::assistant::AssistantClient;
use crate::preferences::PreferenceStore;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub assistant: Arc<dyn AssistantClient>,
    pub preferences: Arc<dyn PreferenceStore>,
}
