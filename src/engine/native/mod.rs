//! Bindings to the native media engine.
//!
//! Thin ownership layer over the C handle API: one retain per stored
//! reference, one release when it is superseded or dropped, trampoline
//! callbacks that recover the session context from the user-data pointer.
//! The engine delivers callbacks on its own looper thread; nothing here may
//! block on UI work.

pub mod ffi;

use libc::{c_char, c_int, c_void};
use std::ffi::{CStr, CString};
use std::sync::{Arc, Once};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{
    EngineCallbacks, EngineError, FrameData, FrameFormat, InfoEvent, MediaEngine, MediaInfo,
    PixelFormat, PlaybackState, PlayerBackend, SetupOptions, VideoFrame, VideoOut,
};

static LOG_CALLBACK: Once = Once::new();

unsafe extern "C" fn log_trampoline(line: *const c_char) {
    if line.is_null() {
        return;
    }
    let line = unsafe { CStr::from_ptr(line) }.to_string_lossy();
    info!(target: "mpx::engine", "{}", line.trim_end());
}

/// A retained reference to an engine frame. Owns exactly one reference;
/// dropping it releases.
pub struct RetainedFrame {
    raw: ffi::MediaFrameRef,
}

// The engine's shared objects are internally synchronized.
unsafe impl Send for RetainedFrame {}
unsafe impl Sync for RetainedFrame {}

impl RetainedFrame {
    /// # Safety
    /// `raw` must be a live frame reference for the duration of the call.
    unsafe fn retain(raw: ffi::MediaFrameRef) -> Self {
        unsafe { ffi::SharedObjectRetain(raw.cast()) };
        Self { raw }
    }

    fn as_ptr(&self) -> ffi::MediaFrameRef {
        self.raw
    }
}

impl Drop for RetainedFrame {
    fn drop(&mut self) {
        unsafe { ffi::SharedObjectRelease(self.raw.cast()) };
    }
}

pub struct NativeEngine {
    hardware_accel: bool,
}

impl NativeEngine {
    pub fn new(hardware_accel: bool) -> Self {
        // Process-lifetime log forwarding, installed once, torn down never.
        LOG_CALLBACK.call_once(|| unsafe { ffi::LogSetCallback(log_trampoline) });
        Self { hardware_accel }
    }
}

struct CallbackCtx {
    callbacks: EngineCallbacks,
}

unsafe extern "C" fn info_trampoline(
    kind: c_int,
    payload: ffi::MessageObjectRef,
    user: *mut c_void,
) {
    let ctx = unsafe { &*(user as *const CallbackCtx) };
    let Some(on_info) = &ctx.callbacks.on_info else {
        return;
    };
    let event = match kind {
        ffi::kInfoPlayerReady => {
            if payload.is_null() {
                warn!("engine reported ready without file info");
                return;
            }
            let duration_us =
                unsafe { ffi::MessageObjectGetInt64(payload, ffi::kKeyDuration, 0) };
            InfoEvent::Ready(Arc::new(MediaInfo {
                duration: Duration::from_micros(duration_us.max(0) as u64),
                ..MediaInfo::default()
            }))
        }
        ffi::kInfoPlayerPlaying => InfoEvent::Playing,
        ffi::kInfoPlayerPaused => InfoEvent::Paused,
        ffi::kInfoEndOfFile => InfoEvent::EndOfStream,
        ffi::kInfoVideoToolboxEnabled => InfoEvent::HardwareAccelerated,
        other => InfoEvent::Other(other),
    };
    on_info(event);
}

unsafe extern "C" fn video_trampoline(frame: ffi::MediaFrameRef, user: *mut c_void) {
    let ctx = unsafe { &*(user as *const CallbackCtx) };
    let Some(on_video) = &ctx.callbacks.on_video else {
        return;
    };
    if frame.is_null() {
        on_video(None);
        return;
    }
    let image = unsafe { ffi::MediaFrameGetImageFormat(frame) };
    if image.is_null() {
        warn!("dropping frame without an image format");
        return;
    }
    let image = unsafe { &*image };
    let format = FrameFormat {
        pixel_format: pixel_format_from(image.format),
        width: image.width.max(0) as u32,
        height: image.height.max(0) as u32,
    };
    let retained = unsafe { RetainedFrame::retain(frame) };
    // Frames arrive in display order; the C surface exposes no pts accessor.
    on_video(Some(VideoFrame::new(
        format,
        Duration::ZERO,
        Arc::new(FrameData::Native(retained)),
    )));
}

impl MediaEngine for NativeEngine {
    fn name(&self) -> &'static str {
        "native"
    }

    fn create_player(
        &self,
        options: SetupOptions,
        callbacks: EngineCallbacks,
    ) -> Result<Box<dyn PlayerBackend>, EngineError> {
        let url = CString::new(options.url.clone()).map_err(|_| EngineError::CreateFailed {
            url: options.url.clone(),
        })?;
        if callbacks.on_audio.is_some() {
            // The engine owns audio out; no audio event is registered.
            debug!("ignoring audio callback for native session");
        }
        let ctx = Box::into_raw(Box::new(CallbackCtx { callbacks }));

        unsafe {
            let looper = ffi::LooperObjectCreate(c"mpx.player".as_ptr());
            let media = ffi::MessageObjectCreate();
            let opts = ffi::MessageObjectCreate();

            ffi::MessageObjectPutString(media, ffi::kKeyURL, url.as_ptr());

            let info_event = ffi::PlayerInfoEventCreate(looper, info_trampoline, ctx.cast());
            ffi::MessageObjectPutObject(opts, ffi::kKeyPlayerInfoEvent, info_event.cast());
            ffi::SharedObjectRelease(info_event.cast());

            match options.gl_context {
                // Direct-to-context rendering: the engine draws into the GL
                // context and no frame callback exists.
                Some(gl_context) => {
                    ffi::MessageObjectPutPointer(
                        opts,
                        ffi::kKeyOpenGLContext,
                        gl_context as *mut c_void,
                    );
                }
                None => {
                    let frame_event =
                        ffi::FrameEventCreate(looper, video_trampoline, ctx.cast());
                    ffi::MessageObjectPutObject(media, ffi::kKeyVideoFrameEvent, frame_event.cast());
                    ffi::SharedObjectRelease(frame_event.cast());
                }
            }

            debug!("MediaPlayerCreate for {}", options.url);
            let player = ffi::MediaPlayerCreate(media, opts);
            ffi::SharedObjectRelease(media.cast());
            ffi::SharedObjectRelease(opts.cast());

            if player.is_null() {
                ffi::SharedObjectRelease(looper.cast());
                drop(Box::from_raw(ctx));
                return Err(EngineError::CreateFailed { url: options.url });
            }

            let clock = ffi::MediaPlayerGetClock(player);

            Ok(Box::new(NativePlayer {
                player,
                clock,
                looper,
                ctx,
            }))
        }
    }

    fn create_video_out(&self, format: &FrameFormat) -> Result<Box<dyn VideoOut>, EngineError> {
        unsafe {
            let message = ffi::MessageObjectCreate();
            ffi::MessageObjectPutInt32(
                message,
                ffi::kKeyFormat,
                pixel_format_to(format.pixel_format) as i32,
            );
            ffi::MessageObjectPutInt32(message, ffi::kKeyWidth, format.width as i32);
            ffi::MessageObjectPutInt32(message, ffi::kKeyHeight, format.height as i32);
            ffi::MessageObjectPutInt32(message, ffi::kKeyType, ffi::kCodecTypeVideo as i32);

            let options = ffi::MessageObjectCreate();
            if self.hardware_accel || format.pixel_format.is_hardware() {
                ffi::MessageObjectPutInt32(options, ffi::kKeyOpenGLCompatible, 1);
            }

            let out = ffi::MediaOutCreate(message, options);
            ffi::SharedObjectRelease(message.cast());
            ffi::SharedObjectRelease(options.cast());

            if out.is_null() {
                return Err(EngineError::OutputUnavailable {
                    pixel_format: format.pixel_format,
                    width: format.width,
                    height: format.height,
                });
            }
            Ok(Box::new(NativeVideoOut {
                raw: out,
                format: *format,
            }))
        }
    }
}

struct NativePlayer {
    player: ffi::MediaPlayerRef,
    clock: ffi::MediaClockRef,
    looper: ffi::LooperObjectRef,
    ctx: *mut CallbackCtx,
}

unsafe impl Send for NativePlayer {}

impl NativePlayer {
    fn check(op: &'static str, code: c_int) -> Result<(), EngineError> {
        if code == ffi::kMediaNoError {
            Ok(())
        } else {
            Err(EngineError::CallFailed { op, code })
        }
    }
}

impl PlayerBackend for NativePlayer {
    fn prepare(&mut self, position: Duration) -> Result<(), EngineError> {
        let code = unsafe { ffi::MediaPlayerPrepare(self.player, position.as_micros() as i64) };
        Self::check("MediaPlayerPrepare", code)
    }

    fn start(&mut self) -> Result<(), EngineError> {
        let code = unsafe { ffi::MediaPlayerStart(self.player) };
        Self::check("MediaPlayerStart", code)
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        let code = unsafe { ffi::MediaPlayerPause(self.player) };
        Self::check("MediaPlayerPause", code)
    }

    fn flush(&mut self) -> Result<(), EngineError> {
        let code = unsafe { ffi::MediaPlayerFlush(self.player) };
        Self::check("MediaPlayerFlush", code)
    }

    fn state(&self) -> PlaybackState {
        match unsafe { ffi::MediaPlayerGetState(self.player) } {
            ffi::kStateInitial => PlaybackState::Preparing,
            ffi::kStateReady => PlaybackState::Ready,
            ffi::kStatePlaying => PlaybackState::Playing,
            ffi::kStateIdle => PlaybackState::Paused,
            ffi::kStateFlushed => PlaybackState::Flushed,
            ffi::kStateReleased => PlaybackState::Released,
            _ => PlaybackState::Idle,
        }
    }

    fn position(&self) -> Option<Duration> {
        if self.clock.is_null() {
            return None;
        }
        let us = unsafe { ffi::MediaClockGetTime(self.clock) };
        Some(Duration::from_micros(us.max(0) as u64))
    }
}

impl Drop for NativePlayer {
    fn drop(&mut self) {
        unsafe {
            if !self.clock.is_null() {
                ffi::SharedObjectRelease(self.clock.cast());
            }
            ffi::SharedObjectRelease(self.player.cast());
            // Releasing the looper stops callback delivery; only then is the
            // trampoline context safe to free.
            ffi::SharedObjectRelease(self.looper.cast());
            drop(Box::from_raw(self.ctx));
        }
    }
}

struct NativeVideoOut {
    raw: ffi::MediaOutRef,
    format: FrameFormat,
}

unsafe impl Send for NativeVideoOut {}

impl VideoOut for NativeVideoOut {
    fn format(&self) -> &FrameFormat {
        &self.format
    }

    fn write(&mut self, frame: &VideoFrame) -> Result<(), EngineError> {
        match frame.data().as_ref() {
            FrameData::Native(retained) => {
                let code = unsafe { ffi::MediaOutWrite(self.raw, retained.as_ptr()) };
                NativePlayer::check("MediaOutWrite", code)
            }
            FrameData::Pixels(_) => Err(EngineError::CallFailed {
                op: "MediaOutWrite",
                code: -1,
            }),
        }
    }

    fn flush(&mut self) -> Result<(), EngineError> {
        let code = unsafe { ffi::MediaOutFlush(self.raw) };
        NativePlayer::check("MediaOutFlush", code)
    }
}

impl Drop for NativeVideoOut {
    fn drop(&mut self) {
        unsafe { ffi::SharedObjectRelease(self.raw.cast()) };
    }
}

fn pixel_format_from(fourcc: u32) -> PixelFormat {
    match fourcc {
        ffi::kPixelFormat420YpCbCrPlanar => PixelFormat::Yuv420p,
        ffi::kPixelFormatNV12 => PixelFormat::Nv12,
        ffi::kPixelFormatRGBA => PixelFormat::Rgba,
        ffi::kPixelFormatVideoToolbox => PixelFormat::HardwareSurface,
        other => {
            warn!("unknown pixel format {:#010x}, treating as RGBA", other);
            PixelFormat::Rgba
        }
    }
}

fn pixel_format_to(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Yuv420p => ffi::kPixelFormat420YpCbCrPlanar,
        PixelFormat::Nv12 => ffi::kPixelFormatNV12,
        PixelFormat::Rgba => ffi::kPixelFormatRGBA,
        PixelFormat::HardwareSurface => ffi::kPixelFormatVideoToolbox,
    }
}
