use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid boolean")]
    InvalidBoolean,
    #[error("invalid integer: {0}")]
    InvalidInteger(String),
    #[error("invalid bit string: {0}")]
    InvalidBitString(String),
    #[error("invalid object identifier: {0}")]
    InvalidObjectIdentifier(String),
    #[error("invalid {kind}: {msg}")]
    InvalidString { kind: &'static str, msg: String },
    #[error("invalid time: {0}")]
    InvalidTime(String),
    #[error("invalid context-specific element [{slot}]: {msg}")]
    InvalidContextSpecific { slot: u8, msg: String },
    #[error("invalid element: {0}")]
    InvalidElement(String),
    #[error("failed to decode der: {0}")]
    FailedToDecodeDer(#[source] kagi_der::error::Error),
}

impl From<kagi_der::error::Error> for Error {
    fn from(err: kagi_der::error::Error) -> Self {
        Error::FailedToDecodeDer(err)
    }
}
