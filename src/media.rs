//! Media classification by file extension.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

/// Still image extensions (lowercase, without dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif"];

/// Video extensions (lowercase, without dot).
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mkv", "mov", "webm", "flv", "wmv", "mpg", "mpeg",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify `path` by extension, case-insensitively.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = lowercase_extension(path)?;
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Video)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A playable file: its path plus how it should be shown.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaItem {
    path: PathBuf,
    kind: MediaKind,
}

impl MediaItem {
    /// Build an item if `path` has a supported extension.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let kind = MediaKind::from_path(&path)?;
        Some(Self { path, kind })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    #[must_use]
    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    /// Lowercase extension, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        lowercase_extension(&self.path)
    }

    /// Name used in logs: relative to `root` when possible, else the file name.
    #[must_use]
    pub fn display_name(&self, root: &Path, relative: bool) -> String {
        if relative {
            if let Ok(rel) = self.path.strip_prefix(root) {
                return rel.display().to_string();
            }
        }
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_case_insensitively() {
        assert_eq!(
            MediaKind::from_path(Path::new("/m/A.JPG")),
            Some(MediaKind::Image)
        );
        assert_eq!(
            MediaKind::from_path(Path::new("/m/clip.MpEg")),
            Some(MediaKind::Video)
        );
        assert_eq!(MediaKind::from_path(Path::new("/m/notes.txt")), None);
        assert_eq!(MediaKind::from_path(Path::new("/m/noext")), None);
    }

    #[test]
    fn display_name_prefers_relative_path() {
        let item = MediaItem::from_path("/media/trips/a.png").unwrap();
        assert_eq!(item.display_name(Path::new("/media"), true), "trips/a.png");
        assert_eq!(item.display_name(Path::new("/media"), false), "a.png");
        assert_eq!(item.display_name(Path::new("/elsewhere"), true), "a.png");
    }
}
