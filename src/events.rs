use std::fmt;

/// Identifies one constructed pipeline. Signals carrying an older value
/// belong to a pipeline that has already been torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Asynchronous signals raised by a running pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    EndOfStream(Generation),
    Error {
        generation: Generation,
        message: String,
        debug: Option<String>,
    },
    Buffering {
        generation: Generation,
        percent: i32,
    },
}

impl PlaybackEvent {
    #[must_use]
    pub const fn generation(&self) -> Generation {
        match self {
            Self::EndOfStream(generation)
            | Self::Error { generation, .. }
            | Self::Buffering { generation, .. } => *generation,
        }
    }
}
