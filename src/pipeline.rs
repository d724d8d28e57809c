//! Chooses the playback graph for each media item.
//!
//! Plans are plain data so the choice can be inspected without GStreamer.
//! The backend in `platform::gst_backend` turns a plan into a live pipeline.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::MediaLoadError;
use crate::media::{MediaItem, MediaKind};
use crate::meta::{self, Orientation};

/// Sink used for still images unless overridden.
pub const DEFAULT_IMAGE_SINK: &str = "xvimagesink";

/// Sinks that understand `force-aspect-ratio`.
const ASPECT_AWARE_SINKS: &[&str] = &["xvimagesink", "ximagesink", "glimagesink"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Element name of the sink used for still images.
    pub image_sink: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            image_sink: DEFAULT_IMAGE_SINK.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageDecoder {
    /// `jpegparse ! jpegdec`
    Jpeg,
    /// `decodebin`
    Generic,
}

/// Description of the graph to build for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelinePlan {
    /// Decode a still image once and hold the frame on screen.
    Freeze {
        path: PathBuf,
        decoder: ImageDecoder,
        /// `None` lets `videoflip` follow the image-orientation tag.
        orientation: Option<Orientation>,
        sink: String,
    },
    /// `playbin` with automatic demux, decode and sink selection.
    PlayBin { path: PathBuf },
    /// Hand-linked graph for AVI files, which are usually MJPEG and trip up `playbin`.
    AviMjpeg { path: PathBuf },
}

impl PipelinePlan {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Freeze { path, .. } | Self::PlayBin { path } | Self::AviMjpeg { path } => path,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Freeze { .. } => "image-freeze",
            Self::PlayBin { .. } => "playbin",
            Self::AviMjpeg { .. } => "avi-mjpeg",
        }
    }

    /// gst-launch description for the hand-assembled graphs.
    ///
    /// Returns `None` for [`PipelinePlan::PlayBin`], which is built from the
    /// element factory instead.
    #[must_use]
    pub fn launch_description(&self) -> Option<String> {
        match self {
            Self::Freeze {
                path,
                decoder,
                orientation,
                sink,
            } => {
                let decode = match decoder {
                    ImageDecoder::Jpeg => "jpegparse ! jpegdec",
                    ImageDecoder::Generic => "decodebin",
                };
                let method = orientation.map_or("automatic", Orientation::flip_method);
                let mut sink_desc = format!("{sink} name=sink");
                if ASPECT_AWARE_SINKS.contains(&sink.as_str()) {
                    sink_desc.push_str(" force-aspect-ratio=true");
                }
                Some(format!(
                    "filesrc location={} ! {decode} ! videoconvert ! videoflip method={method} \
                     ! videoscale ! video/x-raw,format=RGB ! imagefreeze ! videoconvert ! {sink_desc}",
                    quote_location(path)
                ))
            }
            Self::AviMjpeg { path } => Some(format!(
                "filesrc location={} ! avidemux ! jpegdec ! videoconvert ! autovideosink name=sink",
                quote_location(path)
            )),
            Self::PlayBin { .. } => None,
        }
    }
}

/// Builds [`PipelinePlan`]s for media items.
#[derive(Debug, Clone, Default)]
pub struct PipelineFactory {
    options: PipelineOptions,
}

impl PipelineFactory {
    #[must_use]
    pub const fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// Plan the graph for `item`, probing still images for orientation.
    ///
    /// # Errors
    /// Returns [`MediaLoadError::Probe`] when an image header is unreadable.
    pub fn plan(&self, item: &MediaItem) -> Result<PipelinePlan, MediaLoadError> {
        let orientation = match item.kind() {
            MediaKind::Image => {
                let meta = meta::probe_image(item.path())?;
                debug!(
                    path = %item.path().display(),
                    width = meta.display_w,
                    height = meta.display_h,
                    orientation = ?meta.orientation,
                    "probed image"
                );
                meta.orientation
            }
            MediaKind::Video => None,
        };
        Ok(self.plan_with_orientation(item, orientation))
    }

    /// Plan without touching the filesystem.
    #[must_use]
    pub fn plan_with_orientation(
        &self,
        item: &MediaItem,
        orientation: Option<Orientation>,
    ) -> PipelinePlan {
        let path = item.path().to_path_buf();
        let ext = item.extension();
        match item.kind() {
            MediaKind::Image => {
                let decoder = match ext.as_deref() {
                    Some("jpg" | "jpeg") => ImageDecoder::Jpeg,
                    _ => ImageDecoder::Generic,
                };
                PipelinePlan::Freeze {
                    path,
                    decoder,
                    orientation,
                    sink: self.options.image_sink.clone(),
                }
            }
            MediaKind::Video if ext.as_deref() == Some("avi") => PipelinePlan::AviMjpeg { path },
            MediaKind::Video => PipelinePlan::PlayBin { path },
        }
    }
}

fn quote_location(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
