//! Runtime configuration assembled from the command line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, ensure};

use crate::pipeline::{DEFAULT_IMAGE_SINK, PipelineOptions};
use crate::scan::{PlaybackOrder, ScanOptions};

pub const DEFAULT_IMAGE_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Configuration {
    /// Root directory to scan for media.
    pub directory: PathBuf,
    /// How long each still image stays on screen.
    pub image_interval: Duration,
    pub recursive: bool,
    pub shuffle: bool,
    /// Fixed RNG seed for shuffling; random when absent.
    pub seed: Option<u64>,
    /// Sink element for still images.
    pub image_sink: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            image_interval: DEFAULT_IMAGE_INTERVAL,
            recursive: false,
            shuffle: false,
            seed: None,
            image_sink: DEFAULT_IMAGE_SINK.to_string(),
        }
    }
}

impl Configuration {
    /// Expand `~` in the directory and check the values.
    pub fn validated(mut self) -> Result<Self> {
        self.directory = expand_home(&self.directory);
        ensure!(
            !self.image_interval.is_zero(),
            "interval must be at least one second"
        );
        ensure!(
            !self.image_sink.trim().is_empty(),
            "image sink element name must not be empty"
        );
        Ok(self)
    }

    #[must_use]
    pub const fn order(&self) -> PlaybackOrder {
        if self.shuffle {
            PlaybackOrder::Shuffled { seed: self.seed }
        } else {
            PlaybackOrder::Sorted
        }
    }

    #[must_use]
    pub const fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            recursive: self.recursive,
            order: self.order(),
        }
    }

    #[must_use]
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            image_sink: self.image_sink.clone(),
        }
    }
}

/// Replace a leading `~` with `$HOME`.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}
