use base64::DecodeError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The block pattern for a category failed to compile.
    #[error("invalid block pattern: {0}")]
    Pattern(String),

    /// The payload between the boundaries is not valid base64.
    #[error("base64 decode: {0}")]
    Base64Decode(DecodeError),
}
