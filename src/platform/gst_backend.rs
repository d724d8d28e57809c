//! GStreamer implementation of [`MediaBackend`].
//!
//! Pipelines render into the slideshow window through the video overlay
//! interface. Bus messages are handled synchronously on the streaming thread:
//! the window handle is applied there, everything else is converted into a
//! [`PlaybackEvent`] and handed to the notifier, which posts it to the event
//! loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_video as gst_video;
use gstreamer_video::prelude::*;
use tracing::{debug, info, trace, warn};

use crate::controller::MediaBackend;
use crate::error::MediaLoadError;
use crate::events::{Generation, PlaybackEvent};
use crate::pipeline::PipelinePlan;
use crate::platform::surface::BlankSurface;

/// Receives pipeline signals from GStreamer streaming threads.
pub type Notifier = Arc<dyn Fn(PlaybackEvent) + Send + Sync>;

/// Initialise GStreamer and warn about missing plugins.
pub fn init() -> Result<()> {
    gst::init().context("failed to initialize GStreamer")?;
    let registry = gst::Registry::get();
    if registry.find_plugin("playback").is_none() {
        warn!("GStreamer playback plugin not found; video playback may not work");
        warn!("install it with: sudo apt-get install gstreamer1.0-plugins-base");
    }
    let (major, minor, micro, _) = gst::version();
    info!(version = %format!("{major}.{minor}.{micro}"), "GStreamer initialized");
    Ok(())
}

/// A live pipeline owned by the controller.
pub struct GstPipeline {
    element: gst::Element,
    bus: gst::Bus,
    path: PathBuf,
}

pub struct GstBackend {
    window_handle: Option<usize>,
    notifier: Notifier,
    surface: Option<BlankSurface>,
}

impl GstBackend {
    /// `window_handle` is the native (X11) window id that sinks render into;
    /// without one each sink opens its own window.
    pub fn new(
        window_handle: Option<usize>,
        notifier: Notifier,
        surface: Option<BlankSurface>,
    ) -> Self {
        if window_handle.is_none() {
            warn!("no native window handle; video sinks will create their own windows");
        }
        Self {
            window_handle,
            notifier,
            surface,
        }
    }

    fn build(&self, plan: &PipelinePlan) -> Result<gst::Element, MediaLoadError> {
        let path = plan.path();
        match plan.launch_description() {
            Some(desc) => {
                debug!(pipeline = %desc, "parsing pipeline");
                gst::parse::launch(&desc).map_err(|err| construct_error(path, err))
            }
            None => {
                let uri = file_uri(path)?;
                debug!(%uri, "creating playbin");
                gst::ElementFactory::make("playbin")
                    .name("player")
                    .property("uri", uri.as_str())
                    .build()
                    .map_err(|err| construct_error(path, err))
            }
        }
    }

    fn watch_bus(&self, bus: &gst::Bus, element: &gst::Element, generation: Generation) {
        let notifier = Arc::clone(&self.notifier);
        let window_handle = self.window_handle;
        let pipeline = element.downgrade();
        bus.set_sync_handler(move |_bus, msg| {
            if gst_video::is_video_overlay_prepare_window_handle_message(msg) {
                if let Some(handle) = window_handle {
                    attach_overlay(msg, handle);
                }
                return gst::BusSyncReply::Drop;
            }

            use gst::MessageView;
            match msg.view() {
                MessageView::Eos(_) => notifier(PlaybackEvent::EndOfStream(generation)),
                MessageView::Error(err) => notifier(PlaybackEvent::Error {
                    generation,
                    message: err.error().to_string(),
                    debug: err.debug().map(|d| d.to_string()),
                }),
                MessageView::Buffering(buffering) => notifier(PlaybackEvent::Buffering {
                    generation,
                    percent: buffering.percent(),
                }),
                MessageView::StateChanged(change) => {
                    let from_pipeline = pipeline.upgrade().is_some_and(|p| {
                        change.src() == Some(p.upcast_ref::<gst::Object>())
                    });
                    if from_pipeline {
                        trace!(
                            %generation,
                            old = ?change.old(),
                            new = ?change.current(),
                            "pipeline state changed"
                        );
                    }
                }
                _ => {}
            }
            gst::BusSyncReply::Drop
        });
    }
}

impl MediaBackend for GstBackend {
    type Pipeline = GstPipeline;

    fn start(
        &mut self,
        plan: &PipelinePlan,
        generation: Generation,
    ) -> Result<GstPipeline, MediaLoadError> {
        let path = plan.path().to_path_buf();
        let element = self.build(plan)?;
        let bus = element.bus().ok_or_else(|| MediaLoadError::Construct {
            path: path.clone(),
            reason: "pipeline has no bus".to_string(),
        })?;
        self.watch_bus(&bus, &element, generation);

        let pipeline = GstPipeline { element, bus, path };
        if pipeline.element.set_state(gst::State::Playing).is_err() {
            let path = pipeline.path.clone();
            self.stop(pipeline);
            return Err(MediaLoadError::StateChange { path });
        }
        debug!(%generation, "pipeline started");
        Ok(pipeline)
    }

    fn set_paused(&mut self, pipeline: &GstPipeline, paused: bool) {
        let target = if paused {
            gst::State::Paused
        } else {
            gst::State::Playing
        };
        if let Err(err) = pipeline.element.set_state(target) {
            warn!(path = %pipeline.path.display(), ?target, error = %err, "state change failed");
        }
    }

    fn stop(&mut self, pipeline: GstPipeline) {
        pipeline.bus.unset_sync_handler();
        if let Err(err) = pipeline.element.set_state(gst::State::Null) {
            warn!(path = %pipeline.path.display(), error = %err, "failed to stop pipeline");
        }
        // Block until decoder and sink resources are actually released.
        let (result, state, _) = pipeline.element.state(gst::ClockTime::NONE);
        debug!(path = %pipeline.path.display(), ?result, ?state, "pipeline released");
    }

    fn clear_surface(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            if let Err(err) = surface.fill_black() {
                debug!(error = %err, "failed to clear surface");
            }
        }
    }
}

fn attach_overlay(msg: &gst::Message, handle: usize) {
    let Some(overlay) = msg
        .src()
        .and_then(|src| src.dynamic_cast_ref::<gst_video::VideoOverlay>())
    else {
        return;
    };
    debug!("binding video sink to slideshow window");
    // SAFETY: `handle` is the id of the slideshow window, which outlives every
    // pipeline because pipelines are stopped before the window is dropped.
    unsafe {
        overlay.set_window_handle(handle);
    }
}

fn file_uri(path: &Path) -> Result<String, MediaLoadError> {
    let abs = std::path::absolute(path).map_err(|err| construct_error(path, err))?;
    gst::glib::filename_to_uri(&abs, None)
        .map(|uri| uri.to_string())
        .map_err(|err| construct_error(path, err))
}

fn construct_error(path: &Path, err: impl std::fmt::Display) -> MediaLoadError {
    MediaLoadError::Construct {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}
