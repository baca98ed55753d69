//! Application configuration.

use std::num::NonZeroUsize;

use ferry_core::{ClassifierConfig, DEFAULT_TIME_FORMAT};

/// Default number of notifications kept for display.
pub const DEFAULT_NOTIFICATION_HISTORY: usize = 64;

/// Configuration for [`App`](crate::App).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FerryConfig {
    /// `chrono` format string for received text timestamps (UTC).
    pub time_format: String,
    /// Received files kept before the oldest is evicted. `None` keeps all.
    pub max_files: Option<NonZeroUsize>,
    /// Received texts kept before the oldest is evicted. `None` keeps all.
    pub max_texts: Option<NonZeroUsize>,
    /// Notifications kept for display.
    pub notification_history: usize,
}

impl Default for FerryConfig {
    fn default() -> Self {
        Self {
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            max_files: None,
            max_texts: None,
            notification_history: DEFAULT_NOTIFICATION_HISTORY,
        }
    }
}

impl FerryConfig {
    /// Classifier settings derived from this configuration.
    pub fn classifier(&self) -> ClassifierConfig {
        ClassifierConfig {
            time_format: self.time_format.clone(),
            max_files: self.max_files,
            max_texts: self.max_texts,
        }
    }
}
