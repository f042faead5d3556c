use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mpx::app::MainLoop;
use mpx::config::Config;
use mpx::engine;
use mpx::player::{PlayerSession, SessionConfig};
use mpx::ui::{self, Controller, Key};

#[derive(Parser)]
#[command(name = "mpx", about = "Media player front end", version)]
struct Args {
    /// Media file or URL to open
    file: Option<PathBuf>,

    /// Engine backend override ("sim" or "native")
    #[arg(long)]
    backend: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mpx=debug")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("falling back to default config: {e:#}");
        Config::default()
    });
    if let Some(backend) = args.backend {
        config.playback.backend = backend;
    }

    let engine = engine::create_engine(&config)?;
    info!("engine backend: {}", engine.name());

    let (handle, mut main_loop) = MainLoop::new();
    let session = PlayerSession::new(engine, handle, SessionConfig::from(&config));

    let remembered = config
        .general
        .remember_last_file
        .then(|| config.general.last_file.clone())
        .flatten();
    let mut controller = Controller::new(session.clone(), &config.ui, remembered);

    if let Some(file) = &args.file {
        let url = to_url(file)?;
        controller.open(&url)?;
    }

    let mut poll = tokio::time::interval(Duration::from_millis(config.ui.poll_interval_ms));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            task = main_loop.recv() => {
                match task {
                    Some(task) => task(),
                    None => break,
                }
            }
            _ = poll.tick() => {
                controller.tick();
                if controller.overlay_visible() {
                    let s = controller.snapshot();
                    info!(
                        "{} {:?} / {:?}",
                        if s.playing { "playing" } else { "paused" },
                        s.position,
                        s.duration,
                    );
                }
            }
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                let Some(key) = ui::parse_key(&line) else { continue };
                let quit = key == Key::Char('q');
                controller.handle_key(key);
                if quit {
                    break;
                }
            }
        }
    }

    session.close();

    if config.general.remember_last_file {
        config.general.last_file = controller.last_url().map(str::to_owned);
        if let Err(e) = config.save() {
            warn!("could not save config: {e:#}");
        }
    }

    Ok(())
}

/// Turn a CLI path argument into a URL the engine understands. Absolute and
/// relative paths become file:// URLs; anything with a scheme passes through.
fn to_url(path: &Path) -> Result<String> {
    if let Ok(url) = url::Url::parse(&path.to_string_lossy()) {
        if url.scheme().len() > 1 {
            return Ok(url.to_string());
        }
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("cannot resolve current directory")?
            .join(path)
    };
    let url = url::Url::from_file_path(&absolute)
        .map_err(|_| anyhow::anyhow!("not a valid file path: {}", absolute.display()))?;
    Ok(url.to_string())
}
