use std::fs;
use std::io::BufReader;
use std::path::Path;

use crate::error::MediaLoadError;

/// EXIF orientation values 1..=8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Normal,
    MirrorHorizontal,
    Rotate180,
    MirrorVertical,
    Transpose,
    Rotate90Cw,
    Transverse,
    Rotate270Cw,
}

impl Orientation {
    #[must_use]
    pub const fn from_exif(v: u16) -> Option<Self> {
        Some(match v {
            1 => Self::Normal,
            2 => Self::MirrorHorizontal,
            3 => Self::Rotate180,
            4 => Self::MirrorVertical,
            5 => Self::Transpose,
            6 => Self::Rotate90Cw,
            7 => Self::Transverse,
            8 => Self::Rotate270Cw,
            _ => return None,
        })
    }

    /// `videoflip` method nick that undoes this orientation.
    #[must_use]
    pub const fn flip_method(self) -> &'static str {
        match self {
            Self::Normal => "none",
            Self::MirrorHorizontal => "horizontal-flip",
            Self::Rotate180 => "rotate-180",
            Self::MirrorVertical => "vertical-flip",
            Self::Transpose => "upper-left-diagonal",
            Self::Rotate90Cw => "clockwise",
            Self::Transverse => "upper-right-diagonal",
            Self::Rotate270Cw => "counterclockwise",
        }
    }

    /// Whether the displayed frame swaps width and height.
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        matches!(
            self,
            Self::Transpose | Self::Rotate90Cw | Self::Transverse | Self::Rotate270Cw
        )
    }
}

#[derive(Debug, Clone)]
pub struct ImageMeta {
    pub raw_w: u32,
    pub raw_h: u32,
    pub display_w: u32,
    pub display_h: u32,
    /// `None` when the file carries no readable EXIF orientation.
    pub orientation: Option<Orientation>,
}

/// Read only the header for dimensions, plus the EXIF orientation.
///
/// A file whose header cannot be parsed is reported as a probe failure so the
/// slideshow can skip it before building a pipeline.
pub fn probe_image(path: &Path) -> Result<ImageMeta, MediaLoadError> {
    let (raw_w, raw_h) = image::image_dimensions(path).map_err(|err| MediaLoadError::Probe {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let orientation = read_exif_orientation(path).and_then(Orientation::from_exif);
    let swap = orientation.is_some_and(Orientation::swaps_axes);
    let (display_w, display_h) = if swap { (raw_h, raw_w) } else { (raw_w, raw_h) };
    Ok(ImageMeta {
        raw_w,
        raw_h,
        display_w,
        display_h,
        orientation,
    })
}

fn read_exif_orientation(path: &Path) -> Option<u16> {
    use exif::{In, Tag, Value};

    let f = fs::File::open(path).ok()?;
    let mut buf = BufReader::new(f);
    let reader = exif::Reader::new().read_from_container(&mut buf).ok()?;
    let field = reader.get_field(Tag::Orientation, In::PRIMARY)?;
    match &field.value {
        Value::Short(arr) if !arr.is_empty() => Some(arr[0]),
        Value::Long(arr) if !arr.is_empty() => u16::try_from(arr[0]).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    // JPEG 2x1 with EXIF orientation 6 (rotate 90 CW), base64 encoded
    const ORIENT6_JPEG: &str = concat!(
        "/9j/4AAQSkZJRgABAQAAAQABAAD/4QAiRXhpZgAATU0AKgAAAAgAAQESAAMAAAABAAYAAAAAAAD/2wBDAAgGBgcGBQgHBwcJCQgKDBQNDAsLDBkSEw8UHRofHh0aHBwgJC4nICIsIxwcKDcpLDAxNDQ0Hyc5PTgyPC4zNDL/",
        "2wBDAQkJCQwLDBgNDRgyIRwhMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjL/wAARCAABAAIDASIAAhEBAxEB/8QAHwAAAQUBAQEBAQEAAAAAAAAAAAECAwQFBgcICQoL/8QAtRAAAgEDAwIEAwUFBAQAAAF9AQIDAAQRBRIhMUEGE1FhByJxFDKBkaEII0KxwRVS0fAkM2JyggkKFhcYGRolJicoKSo0NTY3ODk6Q0RFRkdISUpTVFVWV1hZWmNkZWZnaGlqc3R1dnd4eXqDhIWGh4iJipKTlJWWl5iZmqKjpKWmp6ipqrKztLW2t7i5usLDxMXGx8jJytLT1NXW19jZ2uHi4+Tl5ufo6erx8vP09fb3+Pn6/8QAHwEAAwEBAQEBAQEBAQAAAAAAAAECAwQFBgcICQoL/8QAtREAAgECBAQDBAcFBAQAAQJ3AAECAxEEBSExBhJBUQdhcRMiMoEIFEKRobHBCSMzUvAVYnLRChYkNOEl8RcYGRomJygpKjU2Nzg5OkNERUZHSElKU1RVVldYWVpjZGVmZ2hpanN0dXZ3eHl6goOEhYaHiImKkpOUlZaXmJmaoqOkpaanqKmqsrO0tba3uLm6wsPExcbHyMnK0tPU1dbX2Nna4uPk5ebn6Onq8vP09fb3+Pn6/9oADAMBAAIRAxEAPwDi6KKK+ZP3E//Z"
    );

    #[test]
    fn reads_orientation_six() {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(ORIENT6_JPEG)
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orient6.jpg");
        fs::write(&path, &bytes).unwrap();

        let meta = probe_image(&path).unwrap();
        assert_eq!(meta.orientation, Some(Orientation::Rotate90Cw));
        assert_eq!((meta.raw_w, meta.raw_h), (2, 1));
        assert_eq!((meta.display_w, meta.display_h), (1, 2));
        assert_eq!(meta.orientation.unwrap().flip_method(), "clockwise");
    }

    #[test]
    fn garbage_is_a_probe_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"definitely not a jpeg").unwrap();

        let err = probe_image(&path).unwrap_err();
        assert!(matches!(err, MediaLoadError::Probe { .. }));
    }

    #[test]
    fn out_of_range_orientation_is_ignored() {
        assert_eq!(Orientation::from_exif(0), None);
        assert_eq!(Orientation::from_exif(9), None);
        assert_eq!(Orientation::from_exif(3), Some(Orientation::Rotate180));
    }
}
