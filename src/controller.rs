//! Playback state machine: one item on screen at a time, advanced by an image
//! timer or by the video's end-of-stream.
//!
//! The controller never reads a clock or touches GStreamer directly. Callers
//! pass the current [`Instant`] into every operation and supply a
//! [`MediaBackend`] that builds and tears down pipelines, which keeps the
//! transition rules testable without a display.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{Error, MediaLoadError};
use crate::events::{Generation, PlaybackEvent};
use crate::media::{MediaItem, MediaKind};
use crate::pipeline::{PipelineFactory, PipelinePlan};
use crate::playlist::Playlist;

/// Builds and releases the live pipelines the controller asks for.
pub trait MediaBackend {
    type Pipeline;

    /// Build the graph for `plan` and set it playing. Signals from the new
    /// pipeline must be tagged with `generation`.
    fn start(
        &mut self,
        plan: &PipelinePlan,
        generation: Generation,
    ) -> Result<Self::Pipeline, MediaLoadError>;

    /// Pause or resume a running pipeline, e.g. while buffering.
    fn set_paused(&mut self, pipeline: &Self::Pipeline, paused: bool);

    /// Release the pipeline and everything it holds. Must not return before
    /// the underlying decode and render resources are freed.
    fn stop(&mut self, pipeline: Self::Pipeline);

    /// Paint the display surface black.
    fn clear_surface(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Showing,
    Advancing,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdvanceReason {
    TimerElapsed,
    EndOfStream,
    Failed,
}

struct ActivePipeline<P> {
    pipeline: P,
    generation: Generation,
    kind: MediaKind,
    /// Set for images only.
    deadline: Option<Instant>,
}

pub struct PlaybackController<B: MediaBackend> {
    backend: B,
    factory: PipelineFactory,
    playlist: Playlist,
    image_interval: Duration,
    state: PlaybackState,
    active: Option<ActivePipeline<B::Pipeline>>,
    last_generation: u64,
    root: PathBuf,
    relative_names: bool,
}

impl<B: MediaBackend> PlaybackController<B> {
    pub fn new(
        backend: B,
        factory: PipelineFactory,
        playlist: Playlist,
        image_interval: Duration,
    ) -> Self {
        Self {
            backend,
            factory,
            playlist,
            image_interval,
            state: PlaybackState::Idle,
            active: None,
            last_generation: 0,
            root: PathBuf::new(),
            relative_names: false,
        }
    }

    /// Log item names relative to `root` (used for recursive scans).
    #[must_use]
    pub fn with_display_root(mut self, root: PathBuf, relative: bool) -> Self {
        self.root = root;
        self.relative_names = relative;
        self
    }

    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// The item on screen, if any.
    #[must_use]
    pub fn current(&self) -> Option<&MediaItem> {
        (self.state == PlaybackState::Showing).then(|| self.playlist.current())
    }

    #[must_use]
    pub fn active_generation(&self) -> Option<Generation> {
        self.active.as_ref().map(|a| a.generation)
    }

    /// When the current image should give way to the next item.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.active.as_ref().and_then(|a| a.deadline)
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub const fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Show the first item.
    ///
    /// # Errors
    /// Returns [`Error::NothingPlayable`] when no item can be started.
    pub fn start(&mut self, now: Instant) -> Result<(), Error> {
        if self.state != PlaybackState::Idle {
            return Ok(());
        }
        info!(
            items = self.playlist.len(),
            interval = %humantime::format_duration(self.image_interval),
            shuffled = self.playlist.order().is_shuffled(),
            "starting slideshow"
        );
        self.enter_showing(now)
    }

    /// Advance past an image whose display time is up.
    ///
    /// # Errors
    /// Returns [`Error::NothingPlayable`] when no item can be started.
    pub fn on_tick(&mut self, now: Instant) -> Result<(), Error> {
        if self.state != PlaybackState::Showing {
            return Ok(());
        }
        match self.deadline() {
            Some(deadline) if now >= deadline => self.advance(AdvanceReason::TimerElapsed, now),
            _ => Ok(()),
        }
    }

    /// React to a signal from a pipeline.
    ///
    /// # Errors
    /// Returns [`Error::NothingPlayable`] when no item can be started.
    pub fn on_playback_event(&mut self, event: PlaybackEvent, now: Instant) -> Result<(), Error> {
        let Some(active) = self.active.as_ref() else {
            debug!(generation = %event.generation(), "signal with no active pipeline; ignoring");
            return Ok(());
        };
        if active.generation != event.generation() {
            debug!(
                generation = %event.generation(),
                active = %active.generation,
                "stale pipeline signal; ignoring"
            );
            return Ok(());
        }

        match event {
            PlaybackEvent::EndOfStream(_) => {
                if active.kind == MediaKind::Video {
                    info!(item = %self.current_name(), "video completed");
                    self.advance(AdvanceReason::EndOfStream, now)
                } else {
                    // The freeze holds the frame until the timer fires.
                    debug!(item = %self.current_name(), "end-of-stream on still image");
                    Ok(())
                }
            }
            PlaybackEvent::Error { message, debug, .. } => {
                if let Some(details) = debug.as_deref() {
                    debug!(details, "pipeline error details");
                }
                let err = MediaLoadError::Playback { message, debug };
                warn!(item = %self.current_name(), error = %err, "playback failed; skipping");
                self.advance(AdvanceReason::Failed, now)
            }
            PlaybackEvent::Buffering { percent, .. } => {
                let paused = percent < 100;
                debug!(percent, paused, "buffering");
                self.backend.set_paused(&active.pipeline, paused);
                Ok(())
            }
        }
    }

    /// Tear down the active pipeline and stop for good.
    pub fn shutdown(&mut self) {
        if self.state == PlaybackState::Stopped {
            return;
        }
        self.teardown();
        self.state = PlaybackState::Stopped;
        info!("slideshow stopped");
    }

    fn advance(&mut self, reason: AdvanceReason, now: Instant) -> Result<(), Error> {
        self.state = PlaybackState::Advancing;
        debug!(?reason, "advancing");
        self.teardown();
        self.playlist.advance();
        self.enter_showing(now)
    }

    /// Start the current item, skipping forward past items that fail to start.
    ///
    /// Gives up once every item has failed to start in this pass. Errors from
    /// pipelines that did start only skip the item.
    fn enter_showing(&mut self, now: Instant) -> Result<(), Error> {
        let mut attempts = 0;
        loop {
            let item = self.playlist.current().clone();
            match self.start_item(&item, now) {
                Ok(active) => {
                    self.active = Some(active);
                    self.state = PlaybackState::Showing;
                    return Ok(());
                }
                Err(err) => {
                    warn!(item = %self.current_name(), error = %err, "failed to load; trying next");
                    attempts += 1;
                    if attempts >= self.playlist.len() {
                        self.state = PlaybackState::Stopped;
                        return Err(Error::NothingPlayable(attempts));
                    }
                    self.playlist.advance();
                }
            }
        }
    }

    fn start_item(
        &mut self,
        item: &MediaItem,
        now: Instant,
    ) -> Result<ActivePipeline<B::Pipeline>, MediaLoadError> {
        debug_assert!(self.active.is_none(), "previous pipeline must be released first");
        let plan = self.factory.plan(item)?;
        self.last_generation += 1;
        let generation = Generation(self.last_generation);

        info!(
            item = %self.current_name(),
            kind = %item.kind(),
            pipeline = plan.label(),
            generation = %generation,
            "loading"
        );
        if item.is_video() {
            self.backend.clear_surface();
        }
        let pipeline = self.backend.start(&plan, generation)?;

        let deadline = match item.kind() {
            MediaKind::Image => {
                debug!(
                    after = %humantime::format_duration(self.image_interval),
                    "next item scheduled"
                );
                Some(now + self.image_interval)
            }
            MediaKind::Video => {
                debug!("playing video to completion");
                None
            }
        };
        Ok(ActivePipeline {
            pipeline,
            generation,
            kind: item.kind(),
            deadline,
        })
    }

    fn teardown(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(generation = %active.generation, "releasing pipeline");
            self.backend.stop(active.pipeline);
        }
    }

    fn current_name(&self) -> String {
        self.playlist
            .current()
            .display_name(&self.root, self.relative_names)
    }
}

impl<B: MediaBackend> Drop for PlaybackController<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}
