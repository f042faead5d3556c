//! Scripted engine double for unit tests.
//!
//! Records every call made against it so tests can assert call order, and
//! hands back the callback bundle of the most recent session so tests can
//! play the engine thread.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::engine::{
    EngineCallbacks, EngineError, FrameFormat, InfoEvent, MediaEngine, PlaybackState,
    PlayerBackend, SetupOptions, VideoFrame, VideoOut,
};

#[derive(Default)]
pub struct MockEngine {
    ops: Arc<Mutex<Vec<String>>>,
    callbacks: Mutex<Option<EngineCallbacks>>,
    fail_next_create: AtomicBool,
    video_outs: AtomicUsize,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call recorded so far, in order.
    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    /// Callback bundle of the most recently created session.
    pub fn callbacks(&self) -> EngineCallbacks {
        self.callbacks
            .lock()
            .unwrap()
            .clone()
            .expect("no session created yet")
    }

    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    pub fn video_outs_created(&self) -> usize {
        self.video_outs.load(Ordering::SeqCst)
    }

    /// Deliver an info event as the engine thread would.
    pub fn fire_info(&self, event: InfoEvent) {
        if let Some(on_info) = &self.callbacks().on_info {
            on_info(event);
        }
    }

    /// Deliver a video frame (or the nil end-of-frames signal).
    pub fn fire_video(&self, frame: Option<VideoFrame>) {
        if let Some(on_video) = &self.callbacks().on_video {
            on_video(frame);
        }
    }

    fn record(&self, op: impl Into<String>) {
        self.ops.lock().unwrap().push(op.into());
    }
}

impl MediaEngine for MockEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn create_player(
        &self,
        options: SetupOptions,
        callbacks: EngineCallbacks,
    ) -> Result<Box<dyn PlayerBackend>, EngineError> {
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(EngineError::CreateFailed { url: options.url });
        }
        self.record(format!("create_player {}", options.url));
        *self.callbacks.lock().unwrap() = Some(callbacks);
        Ok(Box::new(MockPlayer {
            ops: self.ops.clone(),
            state: PlaybackState::Idle,
            position: None,
        }))
    }

    fn create_video_out(&self, format: &FrameFormat) -> Result<Box<dyn VideoOut>, EngineError> {
        self.record(format!("create_video_out {}x{}", format.width, format.height));
        self.video_outs.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockVideoOut {
            ops: self.ops.clone(),
            format: *format,
        }))
    }
}

struct MockPlayer {
    ops: Arc<Mutex<Vec<String>>>,
    state: PlaybackState,
    position: Option<Duration>,
}

impl MockPlayer {
    fn record(&self, op: &str) {
        self.ops.lock().unwrap().push(op.to_string());
    }
}

impl PlayerBackend for MockPlayer {
    fn prepare(&mut self, position: Duration) -> Result<(), EngineError> {
        self.record("player.prepare");
        self.state = PlaybackState::Ready;
        self.position = Some(position);
        Ok(())
    }

    fn start(&mut self) -> Result<(), EngineError> {
        self.record("player.start");
        self.state = PlaybackState::Playing;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.record("player.pause");
        self.state = PlaybackState::Paused;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), EngineError> {
        self.record("player.flush");
        self.state = PlaybackState::Flushed;
        Ok(())
    }

    fn state(&self) -> PlaybackState {
        self.state
    }

    fn position(&self) -> Option<Duration> {
        self.position
    }
}

struct MockVideoOut {
    ops: Arc<Mutex<Vec<String>>>,
    format: FrameFormat,
}

impl VideoOut for MockVideoOut {
    fn format(&self) -> &FrameFormat {
        &self.format
    }

    fn write(&mut self, _frame: &VideoFrame) -> Result<(), EngineError> {
        self.ops.lock().unwrap().push("video_out.write".to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), EngineError> {
        self.ops.lock().unwrap().push("video_out.flush".to_string());
        Ok(())
    }
}
