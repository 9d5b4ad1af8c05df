use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use investedu::api::router;
use investedu::assistant::{AssistantClient, DisabledAssistant, HttpAssistantClient};
use investedu::config::AppConfig;
use investedu::db;
use investedu::preferences::SqlitePreferenceStore;
use investedu::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "investedu=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = db::connect(&config.database_url, config.max_connections).await?;
    db::migrate(&pool).await?;

    let assistant: Arc<dyn AssistantClient> = match config.assistant.clone() {
        Some(assistant_config) => {
            info!("assistant enabled (model: {})", assistant_config.model);
            Arc::new(HttpAssistantClient::new(assistant_config)?)
        }
        None => {
            warn!("LLM_API_KEY not set, assistant disabled");
            Arc::new(DisabledAssistant)
        }
    };

    let state = AppState {
        db: pool.clone(),
        assistant,
        preferences: Arc::new(SqlitePreferenceStore::new(pool)),
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
