//! Transport controller: key handling, the periodic poll, and the on-screen
//! display state a front end would bind to.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::UiConfig;
use crate::player::PlayerSession;

/// Keys the transport understands. Anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Left,
    Right,
    Char(char),
}

/// What the poll most recently observed. This is the display state; it lags
/// the engine by at most one poll interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportSnapshot {
    pub position: Duration,
    pub duration: Duration,
    pub playing: bool,
}

pub struct Controller {
    session: PlayerSession,
    last_url: Option<String>,
    seek_step: Duration,
    overlay_timeout: Duration,
    snapshot: TransportSnapshot,
    overlay_deadline: Option<Instant>,
}

impl Controller {
    pub fn new(session: PlayerSession, ui: &UiConfig, last_url: Option<String>) -> Self {
        Self {
            session,
            last_url,
            seek_step: Duration::from_secs(ui.seek_step_secs),
            overlay_timeout: Duration::from_secs(ui.overlay_timeout_secs),
            snapshot: TransportSnapshot::default(),
            overlay_deadline: None,
        }
    }

    /// Open a URL and prepare it at the start. Remembered for the reopen key.
    pub fn open(&mut self, url: &str) -> Result<(), crate::player::PlayerError> {
        self.session.open(url)?;
        self.session.prepare(Duration::ZERO)?;
        self.last_url = Some(url.to_string());
        self.show_overlay();
        Ok(())
    }

    pub fn handle_key(&mut self, key: Key) {
        match key {
            Key::Space => {
                match self.session.start_or_pause() {
                    Ok(playing) => info!("{}", if playing { "playing" } else { "paused" }),
                    Err(e) => warn!("play/pause failed: {e}"),
                }
                self.show_overlay();
            }
            Key::Left => self.seek_by(SeekDirection::Back),
            Key::Right => self.seek_by(SeekDirection::Forward),
            Key::Char('o') => {
                if let Some(url) = self.last_url.clone() {
                    if let Err(e) = self.open(&url) {
                        warn!("reopen failed: {e}");
                    }
                } else {
                    debug!("nothing to reopen");
                }
            }
            Key::Char('q') => {
                info!("stopping");
                self.session.close();
                self.overlay_deadline = None;
            }
            Key::Char(c) => debug!("ignoring key {c:?}"),
        }
    }

    fn seek_by(&mut self, direction: SeekDirection) {
        let position = self.session.position();
        let duration = self.session.duration();
        let target = match direction {
            SeekDirection::Back => position.saturating_sub(self.seek_step),
            SeekDirection::Forward => (position + self.seek_step).min(duration),
        };
        debug!("seeking {position:?} -> {target:?}");
        if let Err(e) = self.session.prepare(target) {
            warn!("seek failed: {e}");
        }
        self.show_overlay();
    }

    /// Periodic poll: refresh the display state and expire the overlay.
    pub fn tick(&mut self) {
        self.snapshot = TransportSnapshot {
            position: self.session.position(),
            duration: self.session.duration(),
            playing: self.session.is_playing(),
        };
        if let Some(deadline) = self.overlay_deadline {
            if Instant::now() >= deadline {
                self.overlay_deadline = None;
            }
        }
    }

    pub fn snapshot(&self) -> TransportSnapshot {
        self.snapshot
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_deadline.is_some()
    }

    pub fn last_url(&self) -> Option<&str> {
        self.last_url.as_deref()
    }

    fn show_overlay(&mut self) {
        self.overlay_deadline = Some(Instant::now() + self.overlay_timeout);
    }
}

enum SeekDirection {
    Back,
    Forward,
}
