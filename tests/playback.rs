//! End-to-end playback against the in-process engine backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use mpx::app::MainLoop;
use mpx::engine::sim::{SimEngine, SimOptions};
use mpx::engine::{FrameFormat, MediaEngine, PixelFormat, PlaybackState};
use mpx::player::{PlayerSession, SessionConfig};

fn sim_session(
    options: SimOptions,
    autoplay: bool,
) -> (PlayerSession, MainLoop) {
    let engine: Arc<dyn MediaEngine> = Arc::new(SimEngine::new(options));
    let (handle, main_loop) = MainLoop::new();
    let session = PlayerSession::new(
        engine,
        handle,
        SessionConfig {
            autoplay,
            hardware_accel: false,
        },
    );
    (session, main_loop)
}

/// Drive the main loop while waiting on a condition, with a deadline so a
/// regression fails instead of hanging.
fn drive_until<F: Fn() -> bool>(main_loop: &mut MainLoop, cond: F, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        main_loop.drain();
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    main_loop.drain();
    cond()
}

#[test]
fn open_prepare_play_close() {
    let (session, mut main_loop) = sim_session(
        SimOptions {
            duration: Duration::from_secs(120),
            frame_rate: 50,
            format: FrameFormat {
                pixel_format: PixelFormat::Rgba,
                width: 1920,
                height: 1080,
            },
        },
        false,
    );

    session.open("file:///movie.mp4").unwrap();
    session.prepare(Duration::ZERO).unwrap();

    assert!(drive_until(
        &mut main_loop,
        || session.duration() == Duration::from_secs(120),
        Duration::from_secs(2),
    ));
    assert!(!session.is_playing());

    assert!(session.start_or_pause().unwrap());
    assert!(session.is_playing());

    // Frames flow; the sink is built from the first one.
    assert!(drive_until(
        &mut main_loop,
        || session.video_dimensions() == Some((1920, 1080)),
        Duration::from_secs(2),
    ));
    assert!(drive_until(
        &mut main_loop,
        || session.position() > Duration::ZERO,
        Duration::from_secs(2),
    ));

    session.close();
    assert!(!session.is_open());
    assert!(!session.is_playing());
    assert_eq!(session.position(), Duration::ZERO);
    assert_eq!(session.duration(), Duration::ZERO);
    assert!(session.video_dimensions().is_none());
}

#[test]
fn short_file_runs_to_end_of_stream() {
    let (session, mut main_loop) = sim_session(
        SimOptions {
            duration: Duration::from_millis(100),
            frame_rate: 100,
            ..SimOptions::default()
        },
        false,
    );

    session.open("file:///short.mkv").unwrap();
    session.prepare(Duration::ZERO).unwrap();
    assert!(drive_until(
        &mut main_loop,
        || session.duration() > Duration::ZERO,
        Duration::from_secs(2),
    ));

    session.start_or_pause().unwrap();
    assert!(drive_until(
        &mut main_loop,
        || session.state() == PlaybackState::EndOfStream,
        Duration::from_secs(3),
    ));
    assert!(!session.is_playing());
    assert_eq!(session.position(), Duration::from_millis(100));
}

#[test]
fn autoplay_starts_after_prepare() {
    let (session, mut main_loop) = sim_session(SimOptions::default(), true);

    session.open("file:///movie.mp4").unwrap();
    session.prepare(Duration::ZERO).unwrap();

    assert!(drive_until(
        &mut main_loop,
        || session.is_playing(),
        Duration::from_secs(2),
    ));
    session.close();
}

#[test]
fn toggling_pauses_frame_delivery_state() {
    let (session, mut main_loop) = sim_session(SimOptions::default(), false);

    session.open("file:///movie.mp4").unwrap();
    session.prepare(Duration::ZERO).unwrap();
    assert!(drive_until(
        &mut main_loop,
        || session.duration() > Duration::ZERO,
        Duration::from_secs(2),
    ));

    assert!(session.start_or_pause().unwrap());
    assert!(drive_until(
        &mut main_loop,
        || session.position() > Duration::ZERO,
        Duration::from_secs(2),
    ));

    assert!(!session.start_or_pause().unwrap());
    assert!(!session.is_playing());
    // Wait for the engine to act on the pause; until then ticks may still
    // land.
    assert!(drive_until(
        &mut main_loop,
        || session.state() == PlaybackState::Paused,
        Duration::from_secs(2),
    ));
    let paused_at = session.position();

    // A paused session's clock stands still.
    std::thread::sleep(Duration::from_millis(60));
    main_loop.drain();
    assert_eq!(session.position(), paused_at);

    session.close();
}
