use localwrite_config::{Config, HistoryConfig};
use localwrite_history::RetentionPolicy;
use std::time::Duration;

/// Timing and behaviour of an [`EditorSession`](crate::EditorSession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Quiet period after the last edit before the file is written.
    pub save_debounce: Duration,
    /// Minimum time between two automatic history snapshots.
    pub auto_save_interval: Duration,
    pub autoformat: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            save_debounce: config.editor.save_debounce(),
            auto_save_interval: config.history.auto_save_interval(),
            autoformat: config.editor.autoformat,
        }
    }
}

pub fn retention_policy(config: &HistoryConfig) -> RetentionPolicy {
    RetentionPolicy {
        recent: config.recent_versions,
        daily_window_days: config.daily_window_days,
    }
}

pub(crate) fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
