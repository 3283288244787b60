//! Session reminder window.

use serde::{Deserialize, Serialize};

const fn default_window_hours() -> u32 {
    24
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReminderConfig {
    /// Sessions starting within this many hours get a reminder.
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
        }
    }
}
