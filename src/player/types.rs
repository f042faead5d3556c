use thiserror::Error;

use crate::config::Config;
use crate::engine::EngineError;

/// Errors surfaced to the controller. "Not ready" conditions (no live
/// session) are not errors; operations silently no-op instead.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("failed to open {url}")]
    Open {
        url: String,
        #[source]
        source: EngineError,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Per-session knobs, taken from the config file at construction.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Start playback as soon as the media reports ready.
    pub autoplay: bool,
    pub hardware_accel: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autoplay: true,
            hardware_accel: true,
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(config: &Config) -> Self {
        Self {
            autoplay: config.playback.autoplay,
            hardware_accel: config.playback.hardware_acceleration,
        }
    }
}
