//! In-process engine backend.
//!
//! Behaves like the real engine from the wrapper's point of view: one looper
//! thread per session, `Ready` delivered after `prepare`, synthetic frames
//! at a fixed rate while playing, `EndOfStream` when the configured duration
//! runs out. Used for development without the native engine and by the
//! end-to-end tests.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::{
    EngineCallbacks, EngineError, FrameData, FrameFormat, InfoEvent, MediaEngine, MediaInfo,
    PixelFormat, PlaybackState, PlayerBackend, SetupOptions, VideoFrame, VideoOut,
};

#[derive(Debug, Clone)]
pub struct SimOptions {
    /// Reported media duration.
    pub duration: Duration,
    pub frame_rate: u32,
    pub format: FrameFormat,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(60),
            frame_rate: 25,
            format: FrameFormat {
                pixel_format: PixelFormat::Rgba,
                width: 640,
                height: 360,
            },
        }
    }
}

pub struct SimEngine {
    options: SimOptions,
}

impl SimEngine {
    pub fn new(options: SimOptions) -> Self {
        Self { options }
    }
}

impl MediaEngine for SimEngine {
    fn name(&self) -> &'static str {
        "sim"
    }

    fn create_player(
        &self,
        options: SetupOptions,
        callbacks: EngineCallbacks,
    ) -> Result<Box<dyn PlayerBackend>, EngineError> {
        if options.url.is_empty() {
            return Err(EngineError::CreateFailed { url: options.url });
        }

        debug!("sim: creating session for {}", options.url);

        let shared = Arc::new(Shared {
            state: Mutex::new(PlaybackState::Idle),
            position: Mutex::new(Duration::ZERO),
        });
        let (tx, rx) = unbounded();

        let looper = {
            let sim = self.options.clone();
            let shared = shared.clone();
            let url = options.url;
            thread::Builder::new()
                .name("sim-looper".into())
                .spawn(move || run_looper(sim, url, callbacks, shared, rx))
                .map_err(|_| EngineError::CallFailed {
                    op: "create_player",
                    code: -1,
                })?
        };

        Ok(Box::new(SimPlayer {
            tx,
            shared,
            looper: Some(looper),
        }))
    }

    fn create_video_out(&self, format: &FrameFormat) -> Result<Box<dyn VideoOut>, EngineError> {
        debug!(
            "sim: opening video out {}x{} {:?}",
            format.width, format.height, format.pixel_format
        );
        Ok(Box::new(SimVideoOut {
            format: *format,
            frames_written: 0,
        }))
    }
}

enum Command {
    Prepare(Duration),
    Start,
    Pause,
    Flush,
    Shutdown,
}

struct Shared {
    state: Mutex<PlaybackState>,
    position: Mutex<Duration>,
}

impl Shared {
    fn set_state(&self, state: PlaybackState) {
        *self.state.lock().unwrap() = state;
    }

    fn state(&self) -> PlaybackState {
        *self.state.lock().unwrap()
    }
}

struct SimPlayer {
    tx: Sender<Command>,
    shared: Arc<Shared>,
    looper: Option<thread::JoinHandle<()>>,
}

impl SimPlayer {
    fn send(&self, op: &'static str, cmd: Command) -> Result<(), EngineError> {
        self.tx
            .send(cmd)
            .map_err(|_| EngineError::CallFailed { op, code: -1 })
    }
}

impl PlayerBackend for SimPlayer {
    fn prepare(&mut self, position: Duration) -> Result<(), EngineError> {
        self.send("prepare", Command::Prepare(position))
    }

    fn start(&mut self) -> Result<(), EngineError> {
        self.send("start", Command::Start)
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.send("pause", Command::Pause)
    }

    fn flush(&mut self) -> Result<(), EngineError> {
        self.send("flush", Command::Flush)
    }

    fn state(&self) -> PlaybackState {
        self.shared.state()
    }

    fn position(&self) -> Option<Duration> {
        match self.shared.state() {
            PlaybackState::Idle => None,
            _ => Some(*self.shared.position.lock().unwrap()),
        }
    }
}

impl Drop for SimPlayer {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Some(looper) = self.looper.take() {
            let _ = looper.join();
        }
        self.shared.set_state(PlaybackState::Released);
    }
}

fn run_looper(
    sim: SimOptions,
    url: String,
    callbacks: EngineCallbacks,
    shared: Arc<Shared>,
    rx: Receiver<Command>,
) {
    let frame_interval = Duration::from_micros(1_000_000 / u64::from(sim.frame_rate.max(1)));
    let info = Arc::new(MediaInfo {
        duration: sim.duration,
        width: Some(sim.format.width),
        height: Some(sim.format.height),
        title: url.rsplit('/').next().map(str::to_owned),
    });

    // One test-pattern buffer shared by every frame of the session.
    let pixels: Arc<FrameData> = Arc::new(FrameData::Pixels(
        vec![0u8; (sim.format.width * sim.format.height * 4) as usize].into_boxed_slice(),
    ));

    loop {
        let cmd = if shared.state() == PlaybackState::Playing {
            match rx.recv_timeout(frame_interval) {
                Ok(cmd) => Some(cmd),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match rx.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => break,
            }
        };

        match cmd {
            Some(Command::Prepare(position)) => {
                let position = position.min(sim.duration);
                *shared.position.lock().unwrap() = position;
                // A seek mid-playback keeps frames flowing; only a cold
                // prepare lands in Ready.
                if shared.state() != PlaybackState::Playing {
                    shared.set_state(PlaybackState::Ready);
                }
                emit_info(&callbacks, InfoEvent::Ready(info.clone()));
            }
            Some(Command::Start) => {
                shared.set_state(PlaybackState::Playing);
                emit_info(&callbacks, InfoEvent::Playing);
            }
            Some(Command::Pause) => {
                shared.set_state(PlaybackState::Paused);
                emit_info(&callbacks, InfoEvent::Paused);
            }
            Some(Command::Flush) => {
                shared.set_state(PlaybackState::Flushed);
                emit_video(&callbacks, None);
            }
            Some(Command::Shutdown) => break,
            None => {
                // Frame tick.
                let position = {
                    let mut position = shared.position.lock().unwrap();
                    *position = (*position + frame_interval).min(sim.duration);
                    *position
                };
                if position >= sim.duration {
                    shared.set_state(PlaybackState::EndOfStream);
                    emit_video(&callbacks, None);
                    emit_info(&callbacks, InfoEvent::EndOfStream);
                } else {
                    let frame = VideoFrame::new(sim.format, position, pixels.clone());
                    emit_video(&callbacks, Some(frame));
                }
            }
        }
    }

    trace!("sim: looper for {} exiting", url);
}

fn emit_info(callbacks: &EngineCallbacks, event: InfoEvent) {
    if let Some(on_info) = &callbacks.on_info {
        on_info(event);
    }
}

fn emit_video(callbacks: &EngineCallbacks, frame: Option<VideoFrame>) {
    if let Some(on_video) = &callbacks.on_video {
        on_video(frame);
    } else if frame.is_none() {
        warn!("sim: dropping end-of-frames signal, no video callback registered");
    }
}

struct SimVideoOut {
    format: FrameFormat,
    frames_written: u64,
}

impl VideoOut for SimVideoOut {
    fn format(&self) -> &FrameFormat {
        &self.format
    }

    fn write(&mut self, frame: &VideoFrame) -> Result<(), EngineError> {
        self.frames_written += 1;
        trace!("sim: wrote {:?} ({} total)", frame, self.frames_written);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), EngineError> {
        trace!("sim: video out flushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn wait_for<F: Fn() -> bool>(cond: F, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        cond()
    }

    #[test]
    fn prepare_reports_ready_with_metadata() {
        let engine = SimEngine::new(SimOptions {
            duration: Duration::from_secs(120),
            ..SimOptions::default()
        });
        let info: Arc<Mutex<Option<Arc<MediaInfo>>>> = Arc::new(Mutex::new(None));
        let info_cb = info.clone();
        let callbacks = EngineCallbacks {
            on_info: Some(Arc::new(move |event| {
                if let InfoEvent::Ready(media) = event {
                    *info_cb.lock().unwrap() = Some(media);
                }
            })),
            ..EngineCallbacks::default()
        };

        let mut player = engine
            .create_player(
                SetupOptions {
                    url: "file:///a.mp4".into(),
                    ..SetupOptions::default()
                },
                callbacks,
            )
            .unwrap();
        assert_eq!(player.state(), PlaybackState::Idle);
        assert!(player.position().is_none());

        player.prepare(Duration::ZERO).unwrap();
        assert!(wait_for(
            || info.lock().unwrap().is_some(),
            Duration::from_secs(2)
        ));
        let media = info.lock().unwrap().clone().unwrap();
        assert_eq!(media.duration, Duration::from_secs(120));
        assert_eq!(player.state(), PlaybackState::Ready);
    }

    #[test]
    fn playing_delivers_frames_then_end_of_stream() {
        let engine = SimEngine::new(SimOptions {
            duration: Duration::from_millis(100),
            frame_rate: 100,
            ..SimOptions::default()
        });
        let frames = Arc::new(AtomicUsize::new(0));
        let nils = Arc::new(AtomicUsize::new(0));
        let (frames_cb, nils_cb) = (frames.clone(), nils.clone());
        let callbacks = EngineCallbacks {
            on_video: Some(Arc::new(move |frame| match frame {
                Some(_) => {
                    frames_cb.fetch_add(1, Ordering::SeqCst);
                }
                None => {
                    nils_cb.fetch_add(1, Ordering::SeqCst);
                }
            })),
            ..EngineCallbacks::default()
        };

        let mut player = engine
            .create_player(
                SetupOptions {
                    url: "file:///b.mkv".into(),
                    ..SetupOptions::default()
                },
                callbacks,
            )
            .unwrap();
        player.prepare(Duration::ZERO).unwrap();
        player.start().unwrap();

        assert!(wait_for(
            || player.state() == PlaybackState::EndOfStream,
            Duration::from_secs(3)
        ));
        assert!(frames.load(Ordering::SeqCst) > 0);
        assert_eq!(nils.load(Ordering::SeqCst), 1);
        assert_eq!(player.position(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn seek_while_playing_keeps_frames_flowing() {
        let engine = SimEngine::new(SimOptions {
            duration: Duration::from_secs(60),
            frame_rate: 200,
            ..SimOptions::default()
        });
        let frames = Arc::new(AtomicUsize::new(0));
        let frames_cb = frames.clone();
        let callbacks = EngineCallbacks {
            on_video: Some(Arc::new(move |frame| {
                if frame.is_some() {
                    frames_cb.fetch_add(1, Ordering::SeqCst);
                }
            })),
            ..EngineCallbacks::default()
        };

        let mut player = engine
            .create_player(
                SetupOptions {
                    url: "file:///c.mp4".into(),
                    ..SetupOptions::default()
                },
                callbacks,
            )
            .unwrap();
        player.prepare(Duration::ZERO).unwrap();
        player.start().unwrap();
        assert!(wait_for(
            || frames.load(Ordering::SeqCst) > 0,
            Duration::from_secs(2)
        ));

        player.prepare(Duration::from_secs(30)).unwrap();
        let before = frames.load(Ordering::SeqCst);
        assert!(wait_for(
            || frames.load(Ordering::SeqCst) > before + 5,
            Duration::from_secs(2)
        ));
        assert_eq!(player.state(), PlaybackState::Playing);
        assert!(player.position().unwrap() >= Duration::from_secs(30));
    }

    #[test]
    fn empty_url_is_rejected() {
        let engine = SimEngine::new(SimOptions::default());
        let result = engine.create_player(SetupOptions::default(), EngineCallbacks::default());
        assert!(matches!(result, Err(EngineError::CreateFailed { .. })));
    }
}
