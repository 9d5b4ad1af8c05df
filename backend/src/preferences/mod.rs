//! Accessibility preferences.
//!
//! Preferences travel as an explicit [`AccessibilityPreferences`] value; where
//! they are kept is the business of a [`PreferenceStore`], a plain per-user
//! key-value map.

mod store;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AppError;

pub use store::{MemoryPreferenceStore, SqlitePreferenceStore};

pub const MIN_FONT_SCALE: u16 = 80;
pub const MAX_FONT_SCALE: u16 = 200;

const FONT_SCALE: &str = "font_scale";
const HIGH_CONTRAST: &str = "high_contrast";
const VOICE_ENABLED: &str = "voice_enabled";
const REDUCE_MOTION: &str = "reduce_motion";

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, user_id: &str, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, user_id: &str, key: &str, value: &str) -> Result<(), AppError>;

    /// Writes several values for one user. Stores that can should apply the
    /// batch atomically; the default writes one key at a time.
    async fn set_many(&self, user_id: &str, values: &[(&str, String)]) -> Result<(), AppError> {
        for (key, value) in values {
            self.set(user_id, key, value).await?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityPreferences {
    /// Text size in percent of the base size.
    pub font_scale: u16,
    pub high_contrast: bool,
    pub voice_enabled: bool,
    pub reduce_motion: bool,
}

impl Default for AccessibilityPreferences {
    fn default() -> Self {
        Self {
            font_scale: 100,
            high_contrast: false,
            voice_enabled: false,
            reduce_motion: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub font_scale: Option<u16>,
    pub high_contrast: Option<bool>,
    pub voice_enabled: Option<bool>,
    pub reduce_motion: Option<bool>,
}

impl AccessibilityPreferences {
    /// Loads a user's preferences, falling back to the default for any value
    /// that is missing or unreadable.
    pub async fn load(store: &dyn PreferenceStore, user_id: &str) -> Result<Self, AppError> {
        let defaults = Self::default();

        let font_scale = parse_or(store.get(user_id, FONT_SCALE).await?, FONT_SCALE, defaults.font_scale)
            .clamp(MIN_FONT_SCALE, MAX_FONT_SCALE);
        let high_contrast = parse_or(store.get(user_id, HIGH_CONTRAST).await?, HIGH_CONTRAST, defaults.high_contrast);
        let voice_enabled = parse_or(store.get(user_id, VOICE_ENABLED).await?, VOICE_ENABLED, defaults.voice_enabled);
        let reduce_motion = parse_or(store.get(user_id, REDUCE_MOTION).await?, REDUCE_MOTION, defaults.reduce_motion);

        Ok(Self {
            font_scale,
            high_contrast,
            voice_enabled,
            reduce_motion,
        })
    }

    pub fn apply(mut self, req: &UpdatePreferencesRequest) -> Result<Self, AppError> {
        if let Some(scale) = req.font_scale {
            if !(MIN_FONT_SCALE..=MAX_FONT_SCALE).contains(&scale) {
                return Err(AppError::BadRequest(format!(
                    "font_scale must be between {} and {}",
                    MIN_FONT_SCALE, MAX_FONT_SCALE
                )));
            }
            self.font_scale = scale;
        }
        if let Some(v) = req.high_contrast {
            self.high_contrast = v;
        }
        if let Some(v) = req.voice_enabled {
            self.voice_enabled = v;
        }
        if let Some(v) = req.reduce_motion {
            self.reduce_motion = v;
        }
        Ok(self)
    }

    /// Saves every field in one batch, so a failed save leaves the stored
    /// preferences as they were in a store with atomic batches.
    pub async fn save(&self, store: &dyn PreferenceStore, user_id: &str) -> Result<(), AppError> {
        let values = [
            (FONT_SCALE, self.font_scale.to_string()),
            (HIGH_CONTRAST, self.high_contrast.to_string()),
            (VOICE_ENABLED, self.voice_enabled.to_string()),
            (REDUCE_MOTION, self.reduce_motion.to_string()),
        ];
        store.set_many(user_id, &values).await
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!("ignoring malformed preference {}={:?}", key, value);
            default
        }),
        None => default,
    }
}
