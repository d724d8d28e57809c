//! Binary entrypoint for the media slideshow.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use media_slideshow::config::{Configuration, DEFAULT_IMAGE_INTERVAL};
use media_slideshow::media::MediaItem;
use media_slideshow::pipeline::DEFAULT_IMAGE_SINK;
use media_slideshow::platform::gst_backend;
use media_slideshow::playlist::Playlist;
use media_slideshow::scan::scan_media;
use media_slideshow::tasks::viewer;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Number of files echoed at startup before the list is summarised.
const MAX_LISTED: usize = 20;

#[derive(Debug, Parser)]
#[command(
    name = "slideshow",
    version,
    about = "Fullscreen image and video slideshow"
)]
struct Cli {
    /// Directory containing images and videos
    #[arg(value_name = "DIRECTORY")]
    directory: PathBuf,

    /// Seconds to display each image
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_IMAGE_INTERVAL.as_secs())]
    interval: u64,

    /// Search subdirectories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Shuffle media files randomly
    #[arg(short, long)]
    shuffle: bool,

    /// Fixed RNG seed for --shuffle (reproducible order)
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// GStreamer sink element used for still images
    #[arg(long, value_name = "ELEMENT", default_value = DEFAULT_IMAGE_SINK)]
    image_sink: String,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            // map -v to log level
            let level = match verbosity {
                0 => Level::INFO,
                1 => Level::DEBUG,
                _ => Level::TRACE,
            };
            EnvFilter::new(format!("media_slideshow={level},slideshow={level}"))
                .add_directive("gstreamer=warn".parse().context("bad log directive")?)
                .add_directive("winit=warn".parse().context("bad log directive")?)
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

fn log_media_listing(cfg: &Configuration, items: &[MediaItem]) {
    info!(count = items.len(), "found media files");
    for item in items.iter().take(MAX_LISTED) {
        info!(
            "  - {} ({})",
            item.display_name(&cfg.directory, cfg.recursive),
            item.kind()
        );
    }
    if items.len() > MAX_LISTED {
        info!("  ... and {} more files", items.len() - MAX_LISTED);
    }
    if cfg.shuffle {
        info!(seed = ?cfg.seed, "playback order: shuffled");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        directory,
        interval,
        recursive,
        shuffle,
        seed,
        image_sink,
        verbose,
    } = Cli::parse();
    init_tracing(verbose)?;

    let cfg = Configuration {
        directory,
        image_interval: Duration::from_secs(interval),
        recursive,
        shuffle,
        seed,
        image_sink,
    }
    .validated()
    .context("invalid arguments")?;

    if cfg.recursive {
        info!(directory = %cfg.directory.display(), "searching recursively for media files");
    } else {
        info!(directory = %cfg.directory.display(), "looking for media files");
    }
    let items = scan_media(&cfg.directory, &cfg.scan_options())
        .with_context(|| format!("cannot start slideshow from {}", cfg.directory.display()))?;
    log_media_listing(&cfg, &items);
    let playlist = Playlist::from_vec(items, cfg.order())?;

    gst_backend::init()?;

    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    #[cfg(unix)]
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        received = sigterm.recv() => {
                            if received.is_some() {
                                info!("SIGTERM received; initiating shutdown");
                                cancel.cancel();
                            }
                        }
                    }
                }
                Err(err) => tracing::warn!("failed to register SIGTERM handler: {err}"),
            }
        });
    }

    // The window runs on the main thread and returns once the user quits.
    let result = viewer::run_windowed(playlist, cfg, cancel.clone()).context("slideshow failed");
    cancel.cancel();
    result?;

    info!("closing application");
    Ok(())
}
