//! Boundary to the external media engine.
//!
//! Everything that decodes, synchronizes, or renders lives behind these
//! traits. The rest of the crate only sees opaque sessions and outputs,
//! never raw handles. Backends: `sim` (in-process, always available) and
//! `native` (bindings to the engine's C handle API, feature-gated).

pub mod factory;
pub mod frame;
#[cfg(feature = "native")]
pub mod native;
pub mod sim;

pub use factory::create_engine;
pub use frame::{FrameData, FrameFormat, InfoEvent, MediaInfo, PixelFormat, VideoFrame};

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Playback state of an engine session, reported by explicit queries and
/// mirrored locally from info events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Preparing,
    Ready,
    Playing,
    Paused,
    Flushed,
    EndOfStream,
    Released,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine refused to create a player for {url}")]
    CreateFailed { url: String },

    #[error("engine call {op} failed with code {code}")]
    CallFailed { op: &'static str, code: i32 },

    #[error("engine cannot open a video output for {width}x{height} {pixel_format:?}")]
    OutputUnavailable {
        pixel_format: PixelFormat,
        width: u32,
        height: u32,
    },

    #[error("engine backend {0:?} is not compiled in")]
    BackendUnavailable(String),
}

/// Video/audio frame callback. `None` is a legitimate "no more frames"
/// signal, not an error.
pub type FrameCallback = Arc<dyn Fn(Option<VideoFrame>) + Send + Sync>;

/// Player lifecycle callback.
pub type InfoCallback = Arc<dyn Fn(InfoEvent) + Send + Sync>;

/// Callback bundle registered at session creation. Replaces the C API's
/// function pointer + user-data pairs. All callbacks are invoked on an
/// engine-owned thread and must not block.
#[derive(Clone, Default)]
pub struct EngineCallbacks {
    pub on_info: Option<InfoCallback>,
    pub on_video: Option<FrameCallback>,
    pub on_audio: Option<FrameCallback>,
}

/// Options marshalled into the engine when creating a session.
#[derive(Debug, Clone, Default)]
pub struct SetupOptions {
    pub url: String,
    pub hardware_accel: bool,
    /// Raw GL context pointer for direct-to-context rendering. When set, the
    /// native backend hands it to the engine and registers no video frame
    /// callback; the engine draws into the context itself.
    pub gl_context: Option<usize>,
}

/// The external engine. Creates playback sessions and per-session video
/// outputs. Implementations must be callable from any thread.
pub trait MediaEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Create a playback session for `options.url`. A failure leaves no
    /// session behind; callers must not retry on the same return value
    /// without re-reading state.
    fn create_player(
        &self,
        options: SetupOptions,
        callbacks: EngineCallbacks,
    ) -> Result<Box<dyn PlayerBackend>, EngineError>;

    /// Create a render target for frames of the given format.
    fn create_video_out(&self, format: &FrameFormat) -> Result<Box<dyn VideoOut>, EngineError>;
}

/// One live playback session. Dropping it releases the underlying engine
/// resources exactly once.
pub trait PlayerBackend: Send {
    /// Seek/prepare to a media time offset.
    fn prepare(&mut self, position: Duration) -> Result<(), EngineError>;

    fn start(&mut self) -> Result<(), EngineError>;

    fn pause(&mut self) -> Result<(), EngineError>;

    /// Drop buffered frames without releasing the session.
    fn flush(&mut self) -> Result<(), EngineError>;

    /// Explicit state query against the engine.
    fn state(&self) -> PlaybackState;

    /// Current playback clock, `None` when the session has no clock yet.
    fn position(&self) -> Option<Duration>;
}

/// Per-session render target the bridge writes delivered frames into.
pub trait VideoOut: Send {
    fn format(&self) -> &FrameFormat;

    fn write(&mut self, frame: &VideoFrame) -> Result<(), EngineError>;

    /// Clear buffered/stale content. Called when frame delivery stops; not
    /// a teardown.
    fn flush(&mut self) -> Result<(), EngineError>;
}
