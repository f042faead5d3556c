// Playback tuning constants - adjust these to balance responsiveness vs churn
// All timing-related constants in one place for easy tuning

use std::time::Duration;

// === UI timing ===
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_OVERLAY_TIMEOUT: Duration = Duration::from_secs(3);

// === Seeking ===
pub const DEFAULT_SEEK_STEP: Duration = Duration::from_secs(5);
