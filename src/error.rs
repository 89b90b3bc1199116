use thiserror::Error;

/// Errors produced while turning chapter lists into tag frames or FFmetadata.
#[derive(Debug, Error)]
pub enum ChapterError {
    /// A chapter start matched none of the accepted time-code formats.
    #[error("bad chapter start time format {0:?} (expected HH:MM:SS.mmm)")]
    MalformedTimeCode(String),

    #[error("duration can not be zero")]
    ZeroDuration,

    /// The probed duration does not fit the 32-bit millisecond fields of CHAP.
    #[error("duration of {0} ms does not fit in a CHAP frame")]
    DurationOutOfRange(u64),

    /// A CTOC frame counts its children in a single byte.
    #[error("{0} chapters do not fit in a CTOC frame (at most 255)")]
    TooManyChapters(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Probe(#[from] symphonia::core::errors::Error),
}

pub type Result<T, E = ChapterError> = std::result::Result<T, E>;
