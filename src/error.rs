use std::path::PathBuf;

use thiserror::Error;

/// Library error type for fatal slideshow conditions.
#[derive(Debug, Error)]
pub enum Error {
    /// The media directory is missing or not a directory.
    #[error("invalid media directory: {0}")]
    BadDir(String),

    /// The scan completed but found no supported files.
    #[error("no media files found in {}", .0.display())]
    EmptyDirectory(PathBuf),

    /// A playlist was built from an empty list.
    #[error("playlist is empty")]
    EmptyPlaylist,

    /// Every item in the playlist failed back to back.
    #[error("none of the {0} media files could be played")]
    NothingPlayable(usize),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Per-file failure. Always recovered by skipping to the next item.
#[derive(Debug, Error)]
pub enum MediaLoadError {
    /// The file header or metadata could not be read.
    #[error("failed to probe {}: {reason}", path.display())]
    Probe { path: PathBuf, reason: String },

    /// The pipeline for the file could not be assembled.
    #[error("failed to build pipeline for {}: {reason}", path.display())]
    Construct { path: PathBuf, reason: String },

    /// The pipeline refused to start playing.
    #[error("pipeline for {} failed to start", path.display())]
    StateChange { path: PathBuf },

    /// The pipeline reported an error while playing.
    #[error("playback error: {message}")]
    Playback {
        message: String,
        debug: Option<String>,
    },
}
