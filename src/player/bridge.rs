//! Bridge from engine callback threads to the UI thread.
//!
//! Callbacks run on a thread owned by the engine and must return quickly.
//! The video path swaps the delivered frame into a single pending slot and
//! posts a render pass to the main loop, fire-and-forget; the info path only
//! mutates shared state. Every closure captures the session generation it
//! was created under and goes silent once the session is torn down, so a
//! callback racing `close()` can never touch released resources.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, trace, warn};

use crate::engine::{EngineCallbacks, InfoEvent, VideoFrame};

use super::session::SessionInner;

/// Holder for the most recently delivered video frame. Latest-wins: a new
/// frame replaces the previous one whether or not it was rendered, and a nil
/// delivery empties the slot.
#[derive(Default)]
pub struct FrameSlot {
    inner: Mutex<Option<VideoFrame>>,
}

impl FrameSlot {
    /// Swap a frame in. The previous occupant is released by the swap.
    pub fn put(&self, frame: VideoFrame) {
        *self.inner.lock().unwrap() = Some(frame);
    }

    pub fn clear(&self) {
        *self.inner.lock().unwrap() = None;
    }

    /// Clone the current frame out. The lock is held only for the clone,
    /// never across a render.
    pub fn snapshot(&self) -> Option<VideoFrame> {
        self.inner.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_none()
    }
}

pub(crate) fn make_callbacks(inner: &Arc<SessionInner>, generation: u64) -> EngineCallbacks {
    let on_info = {
        let weak = Arc::downgrade(inner);
        Arc::new(move |event: InfoEvent| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.generation.load(Ordering::SeqCst) != generation {
                trace!("dropping info event from stale session");
                return;
            }
            handle_info(&inner, event);
        })
    };

    let on_video = {
        let weak = Arc::downgrade(inner);
        Arc::new(move |frame: Option<VideoFrame>| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.generation.load(Ordering::SeqCst) != generation {
                trace!("dropping frame from stale session");
                return;
            }
            match frame {
                Some(frame) => inner.slot.put(frame),
                None => inner.slot.clear(),
            }
            post_render_pass(&weak, generation, &inner);
        })
    };

    // The engine owns audio output; this stays registered only as a seam.
    let on_audio = Arc::new(move |frame: Option<VideoFrame>| {
        if frame.is_none() {
            trace!("audio: end of frames");
        }
    });

    EngineCallbacks {
        on_info: Some(on_info),
        on_video: Some(on_video),
        on_audio: Some(on_audio),
    }
}

fn handle_info(inner: &Arc<SessionInner>, event: InfoEvent) {
    match event {
        InfoEvent::Ready(info) => {
            debug!(
                "media ready: duration {:?}, {:?}x{:?}",
                info.duration, info.width, info.height
            );
            *inner.info.lock().unwrap() = Some(info);
            if inner.config.autoplay {
                let mut backend = inner.backend.lock().unwrap();
                if let Some(backend) = backend.as_mut() {
                    match backend.start() {
                        Ok(()) => inner.is_playing.store(true, Ordering::SeqCst),
                        Err(e) => warn!("autoplay start failed: {e}"),
                    }
                }
            }
        }
        InfoEvent::Playing => inner.is_playing.store(true, Ordering::SeqCst),
        InfoEvent::Paused => inner.is_playing.store(false, Ordering::SeqCst),
        InfoEvent::EndOfStream => {
            debug!("end of stream");
            inner.is_playing.store(false, Ordering::SeqCst);
        }
        InfoEvent::HardwareAccelerated => {
            inner.hardware_accel.store(true, Ordering::SeqCst);
        }
        InfoEvent::Other(kind) => debug!("ignoring unknown info event {kind}"),
    }
}

/// Queue a render pass on the UI thread. Never blocks, never waits for the
/// pass to run; if the main loop is gone the pass is dropped.
fn post_render_pass(weak: &Weak<SessionInner>, generation: u64, inner: &Arc<SessionInner>) {
    let weak = weak.clone();
    inner.main_loop.post(move || {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        if inner.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        let frame = inner.slot.snapshot();
        if let Err(e) = inner.renderer.lock().unwrap().render_pass(frame.as_ref()) {
            warn!("render pass failed: {e}");
        }
    });
}
