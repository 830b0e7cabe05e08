use crate::info::ImageFormat;

/// Errors from header probing.
///
/// Per-format decoders use these internally; the public `decode_*` functions
/// and [`crate::parse`] flatten every variant to `None`. [`crate::ParseRequest`]
/// surfaces them so callers can tell an unsupported input from a corrupt one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ProbeError {
    #[error("unrecognized format magic bytes")]
    UnrecognizedFormat,

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("seek to {position} is past the end of a {length}-byte buffer")]
    SeekOutOfRange { position: usize, length: usize },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("no dimensions found: {0}")]
    MissingDimensions(&'static str),

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("unsupported or unrecognized image format")]
    Unsupported,

    #[error("corrupt or truncated {format} image")]
    Corrupt { format: ImageFormat },
}
