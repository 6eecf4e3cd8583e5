//! Notification timing configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Timing knobs for notification lifecycles
///
/// `default-duration-ms` applies to the convenience entry points when the
/// caller does not pass a duration; `0` there makes those notifications
/// sticky. `fade-window-ms` is the fixed fade animation length shared by all
/// notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Display time before fading starts, in milliseconds
    #[serde(rename = "default-duration-ms", default = "default_duration_ms")]
    pub default_duration_ms: u64,

    /// Fade animation window, in milliseconds
    #[serde(rename = "fade-window-ms", default = "default_fade_window_ms")]
    pub fade_window_ms: u64,
}

fn default_duration_ms() -> u64 {
    debug!("default_duration_ms: called");
    2000
}

fn default_fade_window_ms() -> u64 {
    debug!("default_fade_window_ms: called");
    300
}

impl Default for NotifyConfig {
    fn default() -> Self {
        debug!("NotifyConfig::default: called");
        Self {
            default_duration_ms: 2000,
            fade_window_ms: 300,
        }
    }
}

impl NotifyConfig {
    /// Display duration applied when a caller does not choose one
    ///
    /// Returns `None` when the configured default is `0` (sticky).
    pub fn default_duration(&self) -> Option<Duration> {
        debug!(default_duration_ms = %self.default_duration_ms, "NotifyConfig::default_duration: called");
        if self.default_duration_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.default_duration_ms))
        }
    }

    pub fn fade_window(&self) -> Duration {
        Duration::from_millis(self.fade_window_ms)
    }
}
