//! services/shell/src/app/persistence.rs
//!
//! Mirrors the dark-mode flag, the video-progress map and the completed-lesson
//! list into local storage, and reads them back when the app mounts.

use growify_core::domain::{CompletedLessons, ProgressBook};
use growify_core::ports::{LocalStorage, PortError, PortResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DARK_MODE_KEY: &str = "darkMode";
pub const VIDEO_PROGRESS_KEY: &str = "videoProgress";
pub const COMPLETED_LESSONS_KEY: &str = "completedLessons";

/// Everything restored from storage at mount time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hydrated {
    pub dark_mode: bool,
    pub video_progress: ProgressBook,
    pub completed_lessons: CompletedLessons,
}

#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn LocalStorage>,
}

impl Persistence {
    pub fn new(store: Arc<dyn LocalStorage>) -> Self {
        Self { store }
    }

    /// Reads all persisted state. A missing dark-mode flag falls back to
    /// `prefers_dark`; a value that fails to parse is logged and replaced by its default.
    pub async fn hydrate(&self, prefers_dark: bool) -> PortResult<Hydrated> {
        let dark_mode = self
            .load::<bool>(DARK_MODE_KEY)
            .await?
            .unwrap_or(prefers_dark);
        let video_progress = self
            .load::<ProgressBook>(VIDEO_PROGRESS_KEY)
            .await?
            .unwrap_or_default();
        let completed_lessons = self
            .load::<CompletedLessons>(COMPLETED_LESSONS_KEY)
            .await?
            .unwrap_or_default();

        debug!(
            dark_mode,
            progress_entries = video_progress.len(),
            completed = completed_lessons.len(),
            "Hydrated persisted state"
        );
        Ok(Hydrated {
            dark_mode,
            video_progress,
            completed_lessons,
        })
    }

    pub async fn save_dark_mode(&self, dark_mode: bool) -> PortResult<()> {
        self.save(DARK_MODE_KEY, &dark_mode).await
    }

    pub async fn save_progress(&self, progress: &ProgressBook) -> PortResult<()> {
        self.save(VIDEO_PROGRESS_KEY, progress).await
    }

    pub async fn save_completed(&self, completed: &CompletedLessons) -> PortResult<()> {
        self.save(COMPLETED_LESSONS_KEY, completed).await
    }

    /// Drops the progress map and the completed list. The dark-mode flag stays.
    pub async fn clear_learning_data(&self) -> PortResult<()> {
        self.store.remove_item(VIDEO_PROGRESS_KEY).await?;
        self.store.remove_item(COMPLETED_LESSONS_KEY).await
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> PortResult<Option<T>> {
        let Some(raw) = self.store.get_item(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "Ignoring malformed stored value");
                Ok(None)
            }
        }
    }

    async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> PortResult<()> {
        let raw =
            serde_json::to_string(value).map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.store.set_item(key, &raw).await
    }
}
