use thiserror::Error;

/// Boxed error returned by a codec implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur at the serialization boundary of a map.
///
/// Regular map operations never fail: a missing key is reported as `None`
/// or `false`, not as an error.
#[derive(Debug, Error)]
pub enum Error {
    /// The input bytes could not be decoded into a key/value mapping.
    #[error("decode error: {0}")]
    Decode(#[source] BoxError),
    /// The map contents could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[source] BoxError),
}

impl Error {
    /// Wrap a codec failure as [`Error::Decode`].
    pub fn decode(err: impl Into<BoxError>) -> Self {
        Error::Decode(err.into())
    }

    /// Wrap a codec failure as [`Error::Encode`].
    pub fn encode(err: impl Into<BoxError>) -> Self {
        Error::Encode(err.into())
    }
}

/// Result alias used by the codec entry points.
pub type Result<T> = std::result::Result<T, Error>;
