use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Pixel layout of a decoded video frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Yuv420p,
    Nv12,
    Rgba,
    /// Opaque hardware surface (VideoToolbox image, GL texture). The engine
    /// renders these directly; the front end never touches the pixels.
    HardwareSurface,
}

impl PixelFormat {
    pub fn is_hardware(&self) -> bool {
        matches!(self, PixelFormat::HardwareSurface)
    }
}

/// Image format of a frame, as reported by the engine alongside the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFormat {
    pub pixel_format: PixelFormat,
    pub width: u32,
    pub height: u32,
}

/// Frame payload. The engine's frames are reference counted; `Arc` carries
/// that here. Cloning retains, dropping the last clone releases.
pub enum FrameData {
    /// Pixel data owned on the Rust side (sim backend, tests).
    Pixels(Box<[u8]>),
    /// A retained reference into the native engine's frame object.
    #[cfg(feature = "native")]
    Native(crate::engine::native::RetainedFrame),
}

/// One decoded video frame delivered by the engine.
///
/// `Clone` is cheap: the payload is shared, not copied.
#[derive(Clone)]
pub struct VideoFrame {
    format: FrameFormat,
    pts: Duration,
    data: Arc<FrameData>,
}

impl VideoFrame {
    pub fn new(format: FrameFormat, pts: Duration, data: Arc<FrameData>) -> Self {
        Self { format, pts, data }
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    pub fn pts(&self) -> Duration {
        self.pts
    }

    pub fn data(&self) -> &Arc<FrameData> {
        &self.data
    }
}

impl fmt::Debug for VideoFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VideoFrame({}x{} {:?} @ {:?})",
            self.format.width, self.format.height, self.format.pixel_format, self.pts
        )
    }
}

/// File metadata delivered once via [`InfoEvent::Ready`]. Retained by the
/// session until teardown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    pub duration: Duration,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub title: Option<String>,
}

/// Asynchronous player lifecycle notifications from the engine.
#[derive(Debug, Clone)]
pub enum InfoEvent {
    /// Media is prepared; the payload is the authoritative file metadata.
    Ready(Arc<MediaInfo>),
    Playing,
    Paused,
    EndOfStream,
    /// The engine switched to a hardware decode/render path.
    HardwareAccelerated,
    /// Anything this front end does not understand; logged and ignored.
    Other(i32),
}
