use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use super::MediaEngine;
use super::sim::{SimEngine, SimOptions};
use crate::config::Config;

pub enum EngineBackend {
    Sim,
    Native,
}

impl From<&str> for EngineBackend {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "native" => EngineBackend::Native,
            _ => EngineBackend::Sim, // Default to the in-process engine
        }
    }
}

/// Pick an engine backend from the config. `native` is only available when
/// the crate was built with the matching feature.
pub fn create_engine(config: &Config) -> Result<Arc<dyn MediaEngine>> {
    let backend = EngineBackend::from(config.playback.backend.as_str());

    match backend {
        EngineBackend::Sim => {
            info!("Creating simulated engine backend");
            Ok(Arc::new(SimEngine::new(SimOptions::default())))
        }
        EngineBackend::Native => {
            #[cfg(feature = "native")]
            {
                info!("Creating native engine backend");
                Ok(Arc::new(super::native::NativeEngine::new(
                    config.playback.hardware_acceleration,
                )))
            }
            #[cfg(not(feature = "native"))]
            {
                Err(super::EngineError::BackendUnavailable("native".into()).into())
            }
        }
    }
}
