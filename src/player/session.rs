//! The playback session wrapper.
//!
//! Owns at most one live engine backend plus the state mirrored from its
//! info events. All transport operations degrade to no-ops when no media is
//! open; only actual engine failures surface as errors.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::app::MainLoopHandle;
use crate::engine::{MediaEngine, MediaInfo, PlaybackState, PlayerBackend, SetupOptions};

use super::bridge::{self, FrameSlot};
use super::renderer::Renderer;
use super::types::{PlayerError, SessionConfig};

pub(crate) struct SessionInner {
    pub(crate) engine: Arc<dyn MediaEngine>,
    pub(crate) main_loop: MainLoopHandle,
    pub(crate) config: SessionConfig,

    /// Bumped on every teardown. Callbacks and posted render passes capture
    /// the generation they were created under and no-op once it moves on.
    pub(crate) generation: AtomicU64,

    pub(crate) backend: Mutex<Option<Box<dyn PlayerBackend>>>,
    pub(crate) info: Mutex<Option<Arc<MediaInfo>>>,
    pub(crate) is_playing: AtomicBool,
    pub(crate) hardware_accel: AtomicBool,
    pub(crate) slot: FrameSlot,
    pub(crate) renderer: Mutex<Renderer>,
}

/// Handle to the playback session. Cloning shares the same session.
#[derive(Clone)]
pub struct PlayerSession {
    inner: Arc<SessionInner>,
}

impl PlayerSession {
    pub fn new(
        engine: Arc<dyn MediaEngine>,
        main_loop: MainLoopHandle,
        config: SessionConfig,
    ) -> Self {
        let renderer = Renderer::new(engine.clone());
        Self {
            inner: Arc::new(SessionInner {
                engine,
                main_loop,
                config,
                generation: AtomicU64::new(0),
                backend: Mutex::new(None),
                info: Mutex::new(None),
                is_playing: AtomicBool::new(false),
                hardware_accel: AtomicBool::new(false),
                slot: FrameSlot::default(),
                renderer: Mutex::new(renderer),
            }),
        }
    }

    /// Open a media URL, tearing down any session already live. On failure
    /// the session is left empty; there is no half-built state to observe.
    pub fn open(&self, url: &str) -> Result<(), PlayerError> {
        self.close();

        info!("opening {url}");
        let generation = self.inner.generation.load(Ordering::SeqCst);
        let callbacks = bridge::make_callbacks(&self.inner, generation);
        let options = SetupOptions {
            url: url.to_string(),
            hardware_accel: self.inner.config.hardware_accel,
            gl_context: None,
        };

        let backend = self
            .inner
            .engine
            .create_player(options, callbacks)
            .map_err(|source| PlayerError::Open {
                url: url.to_string(),
                source,
            })?;

        *self.inner.backend.lock().unwrap() = Some(backend);
        Ok(())
    }

    /// Seek/prepare to a media time offset. No-op without open media.
    pub fn prepare(&self, position: Duration) -> Result<(), PlayerError> {
        let mut backend = self.inner.backend.lock().unwrap();
        match backend.as_mut() {
            Some(backend) => {
                debug!("preparing at {position:?}");
                backend.prepare(position)?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Toggle playback. Returns the intended state, true when now playing.
    /// Without open media this returns `Ok(false)` and calls nothing.
    pub fn start_or_pause(&self) -> Result<bool, PlayerError> {
        let mut backend = self.inner.backend.lock().unwrap();
        let Some(backend) = backend.as_mut() else {
            return Ok(false);
        };

        if self.inner.is_playing.load(Ordering::SeqCst) {
            backend.pause()?;
            self.inner.is_playing.store(false, Ordering::SeqCst);
            Ok(false)
        } else {
            backend.start()?;
            self.inner.is_playing.store(true, Ordering::SeqCst);
            Ok(true)
        }
    }

    /// Drop buffered frames, pausing first when playing.
    pub fn flush(&self) -> Result<(), PlayerError> {
        let mut backend = self.inner.backend.lock().unwrap();
        let Some(backend) = backend.as_mut() else {
            return Ok(());
        };

        if self.inner.is_playing.load(Ordering::SeqCst) {
            backend.pause()?;
            self.inner.is_playing.store(false, Ordering::SeqCst);
        }
        backend.flush()?;
        Ok(())
    }

    /// Tear everything down. Safe to call repeatedly from any state; the
    /// second call finds nothing live and issues no engine calls. Release
    /// order: quiesce the backend, close the sink, clear the pending frame,
    /// drop the metadata, drop the backend last.
    pub fn close(&self) {
        // Stale callbacks must go quiet before anything is released.
        self.inner.generation.fetch_add(1, Ordering::SeqCst);

        let mut backend = self.inner.backend.lock().unwrap().take();

        if let Some(backend) = backend.as_mut() {
            debug!("closing session");
            if self.inner.is_playing.load(Ordering::SeqCst) {
                if let Err(e) = backend.pause() {
                    warn!("pause during close failed: {e}");
                }
            }
            if let Err(e) = backend.flush() {
                warn!("flush during close failed: {e}");
            }
        }

        if let Err(e) = self.inner.renderer.lock().unwrap().close() {
            warn!("sink close failed: {e}");
        }
        self.inner.slot.clear();
        *self.inner.info.lock().unwrap() = None;
        self.inner.is_playing.store(false, Ordering::SeqCst);
        self.inner.hardware_accel.store(false, Ordering::SeqCst);

        drop(backend);
    }

    pub fn is_open(&self) -> bool {
        self.inner.backend.lock().unwrap().is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.inner.is_playing.load(Ordering::SeqCst)
    }

    pub fn hardware_accelerated(&self) -> bool {
        self.inner.hardware_accel.load(Ordering::SeqCst)
    }

    /// Playback clock. `Duration::ZERO` without open media or a clock.
    pub fn position(&self) -> Duration {
        self.inner
            .backend
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|backend| backend.position())
            .unwrap_or(Duration::ZERO)
    }

    /// Media duration. `Duration::ZERO` until the ready event arrives.
    pub fn duration(&self) -> Duration {
        self.inner
            .info
            .lock()
            .unwrap()
            .as_ref()
            .map(|info| info.duration)
            .unwrap_or(Duration::ZERO)
    }

    pub fn state(&self) -> PlaybackState {
        self.inner
            .backend
            .lock()
            .unwrap()
            .as_ref()
            .map(|backend| backend.state())
            .unwrap_or(PlaybackState::Idle)
    }

    /// Video dimensions, preferring the live sink over file metadata.
    pub fn video_dimensions(&self) -> Option<(u32, u32)> {
        if let Some(format) = self.inner.renderer.lock().unwrap().sink_format() {
            return Some((format.width, format.height));
        }
        let info = self.inner.info.lock().unwrap();
        let info = info.as_ref()?;
        Some((info.width?, info.height?))
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        // The backend field drops with the struct; nothing else to release.
        debug!("session dropped");
    }
}
