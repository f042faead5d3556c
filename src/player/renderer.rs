//! The render sink, created lazily from the first delivered frame.
//!
//! The engine only reveals the frame format at delivery time, so the video
//! output cannot exist before the first frame. Once built, the sink lives
//! for the rest of the session; a mid-stream format change does not rebuild
//! it, the sink keeps the format it was opened with.

use std::sync::Arc;
use tracing::{debug, trace};

use crate::engine::{EngineError, FrameFormat, MediaEngine, VideoFrame, VideoOut};

pub struct Renderer {
    engine: Arc<dyn MediaEngine>,
    sink: Option<Box<dyn VideoOut>>,
    frames_written: u64,
}

impl Renderer {
    pub fn new(engine: Arc<dyn MediaEngine>) -> Self {
        Self {
            engine,
            sink: None,
            frames_written: 0,
        }
    }

    /// One pass of the draw path. A frame is written to the sink, creating
    /// it first if this is the first frame of the session; no frame means
    /// delivery stopped, so stale sink content is flushed instead.
    pub fn render_pass(&mut self, frame: Option<&VideoFrame>) -> Result<(), EngineError> {
        match frame {
            Some(frame) => {
                let sink = match self.sink.as_mut() {
                    Some(sink) => sink,
                    None => {
                        let format = frame.format();
                        debug!(
                            "opening video out: {}x{} {:?}",
                            format.width, format.height, format.pixel_format
                        );
                        self.sink.insert(self.engine.create_video_out(&format)?)
                    }
                };
                sink.write(frame)?;
                self.frames_written += 1;
                Ok(())
            }
            None => match self.sink.as_mut() {
                Some(sink) => {
                    trace!("no pending frame, flushing sink");
                    sink.flush()
                }
                None => Ok(()),
            },
        }
    }

    /// Flush then drop the sink. The session calls this before releasing
    /// the backend.
    pub fn close(&mut self) -> Result<(), EngineError> {
        if let Some(mut sink) = self.sink.take() {
            debug!("closing video out after {} frames", self.frames_written);
            sink.flush()?;
        }
        self.frames_written = 0;
        Ok(())
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    pub fn sink_format(&self) -> Option<FrameFormat> {
        self.sink.as_ref().map(|sink| *sink.format())
    }
}
