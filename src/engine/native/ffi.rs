//! Raw declarations for the engine's C handle API.
//!
//! Handle kinds are distinct opaque types so a clock cannot be passed where
//! a player is expected; every handle is reference counted through the
//! shared-object calls. Option keys and enum values are fourcc codes in the
//! engine's header convention; verify them against the engine headers that
//! ship with the library being linked.

#![allow(non_upper_case_globals)]

use libc::{c_char, c_int, c_void};

macro_rules! opaque_handle {
    ($name:ident, $ref_name:ident) => {
        #[repr(C)]
        pub struct $name {
            _private: [u8; 0],
        }
        pub type $ref_name = *mut $name;
    };
}

opaque_handle!(SharedObject, SharedObjectRef);
opaque_handle!(MessageObject, MessageObjectRef);
opaque_handle!(LooperObject, LooperObjectRef);
opaque_handle!(MediaPlayer, MediaPlayerRef);
opaque_handle!(MediaClock, MediaClockRef);
opaque_handle!(MediaOut, MediaOutRef);
opaque_handle!(MediaFrame, MediaFrameRef);
opaque_handle!(PlayerInfoEvent, PlayerInfoEventRef);
opaque_handle!(FrameEvent, FrameEventRef);

pub const fn fourcc(tag: [u8; 4]) -> u32 {
    u32::from_be_bytes(tag)
}

// Option keys.
pub const kKeyURL: u32 = fourcc(*b"url ");
pub const kKeyDuration: u32 = fourcc(*b"dura");
pub const kKeyFormat: u32 = fourcc(*b"form");
pub const kKeyWidth: u32 = fourcc(*b"widt");
pub const kKeyHeight: u32 = fourcc(*b"heig");
pub const kKeyType: u32 = fourcc(*b"type");
pub const kKeyOpenGLCompatible: u32 = fourcc(*b"oglc");
pub const kKeyOpenGLContext: u32 = fourcc(*b"oglx");
pub const kKeyPlayerInfoEvent: u32 = fourcc(*b"pinf");
pub const kKeyVideoFrameEvent: u32 = fourcc(*b"vfrm");

// Codec types.
pub const kCodecTypeVideo: u32 = fourcc(*b"vide");
pub const kCodecTypeAudio: u32 = fourcc(*b"audi");

// Pixel formats.
pub const kPixelFormat420YpCbCrPlanar: u32 = fourcc(*b"420p");
pub const kPixelFormatNV12: u32 = fourcc(*b"nv12");
pub const kPixelFormatRGBA: u32 = fourcc(*b"rgba");
pub const kPixelFormatVideoToolbox: u32 = fourcc(*b"vtbx");

// ePlayerInfoType.
pub const kInfoPlayerReady: c_int = 0;
pub const kInfoPlayerPlaying: c_int = 1;
pub const kInfoPlayerPaused: c_int = 2;
pub const kInfoEndOfFile: c_int = 3;
pub const kInfoVideoToolboxEnabled: c_int = 4;

// eStateType.
pub const kStateInvalid: c_int = -1;
pub const kStateInitial: c_int = 0;
pub const kStateReady: c_int = 1;
pub const kStatePlaying: c_int = 2;
pub const kStateIdle: c_int = 3;
pub const kStateFlushed: c_int = 4;
pub const kStateReleased: c_int = 5;

pub const kMediaNoError: c_int = 0;

/// Image format attached to a video frame.
#[repr(C)]
pub struct ImageFormat {
    pub format: u32,
    pub width: i32,
    pub height: i32,
}

pub type LogCallback = unsafe extern "C" fn(*const c_char);
pub type PlayerInfoCallback = unsafe extern "C" fn(c_int, MessageObjectRef, *mut c_void);
pub type FrameCallback = unsafe extern "C" fn(MediaFrameRef, *mut c_void);

unsafe extern "C" {
    pub fn SharedObjectRetain(object: SharedObjectRef) -> SharedObjectRef;
    pub fn SharedObjectRelease(object: SharedObjectRef);

    pub fn MessageObjectCreate() -> MessageObjectRef;
    pub fn MessageObjectPutString(message: MessageObjectRef, key: u32, value: *const c_char);
    pub fn MessageObjectPutInt32(message: MessageObjectRef, key: u32, value: i32);
    pub fn MessageObjectPutInt64(message: MessageObjectRef, key: u32, value: i64);
    pub fn MessageObjectPutObject(message: MessageObjectRef, key: u32, object: SharedObjectRef);
    pub fn MessageObjectPutPointer(message: MessageObjectRef, key: u32, value: *mut c_void);
    pub fn MessageObjectGetInt64(message: MessageObjectRef, key: u32, fallback: i64) -> i64;

    pub fn LooperObjectCreate(name: *const c_char) -> LooperObjectRef;

    pub fn PlayerInfoEventCreate(
        looper: LooperObjectRef,
        callback: PlayerInfoCallback,
        user: *mut c_void,
    ) -> PlayerInfoEventRef;
    pub fn FrameEventCreate(
        looper: LooperObjectRef,
        callback: FrameCallback,
        user: *mut c_void,
    ) -> FrameEventRef;

    pub fn MediaPlayerCreate(media: MessageObjectRef, options: MessageObjectRef)
    -> MediaPlayerRef;
    pub fn MediaPlayerPrepare(player: MediaPlayerRef, time_us: i64) -> c_int;
    pub fn MediaPlayerStart(player: MediaPlayerRef) -> c_int;
    pub fn MediaPlayerPause(player: MediaPlayerRef) -> c_int;
    pub fn MediaPlayerFlush(player: MediaPlayerRef) -> c_int;
    pub fn MediaPlayerGetState(player: MediaPlayerRef) -> c_int;
    pub fn MediaPlayerGetClock(player: MediaPlayerRef) -> MediaClockRef;

    pub fn MediaClockGetTime(clock: MediaClockRef) -> i64;

    pub fn MediaFrameGetImageFormat(frame: MediaFrameRef) -> *mut ImageFormat;

    pub fn MediaOutCreate(format: MessageObjectRef, options: MessageObjectRef) -> MediaOutRef;
    pub fn MediaOutWrite(out: MediaOutRef, frame: MediaFrameRef) -> c_int;
    pub fn MediaOutFlush(out: MediaOutRef) -> c_int;

    pub fn LogSetCallback(callback: LogCallback);
}
