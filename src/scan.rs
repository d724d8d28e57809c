//! Directory scanning for supported images and videos.

use std::path::Path;

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::Error;
use crate::media::MediaItem;

/// How the discovered files are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackOrder {
    /// Lexicographic path order.
    #[default]
    Sorted,
    /// Random permutation. A fixed seed makes it reproducible.
    Shuffled { seed: Option<u64> },
}

impl PlaybackOrder {
    #[must_use]
    pub const fn is_shuffled(self) -> bool {
        matches!(self, Self::Shuffled { .. })
    }
}

/// Options controlling directory scanning.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Whether to descend into subdirectories.
    pub recursive: bool,
    pub order: PlaybackOrder,
}

/// Scan `root` for media files.
///
/// # Errors
/// Returns [`Error::BadDir`] if `root` is missing or not a directory,
/// [`Error::Io`] if `root` itself cannot be read and
/// [`Error::EmptyDirectory`] if nothing playable was found. Unreadable
/// entries below the root are logged and skipped.
pub fn scan_media(root: &Path, opts: &ScanOptions) -> Result<Vec<MediaItem>, Error> {
    if !root.is_dir() {
        return Err(Error::BadDir(root.display().to_string()));
    }

    let mut wd = WalkDir::new(root).follow_links(true);
    if !opts.recursive {
        wd = wd.max_depth(1);
    }

    let mut out = Vec::new();
    for entry in wd.into_iter().filter_entry(|e| !is_hidden(e)) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(Error::Io(err.into())),
            Err(err) => {
                warn!(error = %err, "scan: unreadable entry; skipping");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        match MediaItem::from_path(entry.path()) {
            Some(item) => out.push(item),
            None => debug!(path = %entry.path().display(), "scan: unsupported; skipping"),
        }
    }

    if out.is_empty() {
        return Err(Error::EmptyDirectory(root.to_path_buf()));
    }

    apply_order(&mut out, opts.order);
    Ok(out)
}

/// Sort or shuffle `items` in place.
pub fn apply_order(items: &mut [MediaItem], order: PlaybackOrder) {
    match order {
        PlaybackOrder::Sorted => items.sort_by(|a, b| a.path().cmp(b.path())),
        PlaybackOrder::Shuffled { seed } => {
            // Sort first so a seed maps to the same order regardless of readdir order.
            items.sort_by(|a, b| a.path().cmp(b.path()));
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            items.shuffle(&mut rng);
        }
    }
}

/// Dot-files and dot-directories below the root, e.g. `.cache` or `._IMG.jpg`.
fn is_hidden(entry: &DirEntry) -> bool {
    // Never skip the root; tempfile roots can be dot-dirs.
    if entry.depth() == 0 {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|n| n.starts_with('.'))
}
