use anyhow::{Context, Result};
use dirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Remember the last opened file and restore it with the reopen key.
    #[serde(default = "default_true")]
    pub remember_last_file: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Engine backend: "sim" or "native".
    #[serde(default = "default_backend")]
    pub backend: String,

    #[serde(default = "default_true")]
    pub hardware_acceleration: bool,

    /// Start playback as soon as the media reports ready.
    #[serde(default = "default_true")]
    pub autoplay: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_seek_step")]
    pub seek_step_secs: u64,

    #[serde(default = "default_overlay_timeout")]
    pub overlay_timeout_secs: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config file found, using defaults");
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
        info!("Config loaded successfully");
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("mpx").join("config.toml"))
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            remember_last_file: default_true(),
            last_file: None,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            hardware_acceleration: default_true(),
            autoplay: default_true(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            seek_step_secs: default_seek_step(),
            overlay_timeout_secs: default_overlay_timeout(),
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}
fn default_backend() -> String {
    "sim".to_string()
}
fn default_poll_interval() -> u64 {
    crate::constants::DEFAULT_POLL_INTERVAL.as_millis() as u64
}
fn default_seek_step() -> u64 {
    crate::constants::DEFAULT_SEEK_STEP.as_secs()
}
fn default_overlay_timeout() -> u64 {
    crate::constants::DEFAULT_OVERLAY_TIMEOUT.as_secs()
}
