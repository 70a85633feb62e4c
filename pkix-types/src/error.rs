use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("{0} must be a SEQUENCE")]
    ExpectedSequence(&'static str),

    #[error("{0} must be a SET")]
    ExpectedSet(&'static str),

    #[error("{context}: expected {expected} elements, got {actual}")]
    InvalidElementCount {
        context: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("{context}: expected {expected}")]
    TypeMismatch {
        context: &'static str,
        expected: &'static str,
    },

    #[error("algorithm {0} requires parameters")]
    MissingParameters(String),

    #[error("unsupported named curve {0}")]
    UnsupportedCurve(String),

    #[error("empty DER input")]
    EmptyInput,

    #[error("DER error: {0}")]
    Der(#[from] kagi_der::error::Error),

    #[error("ASN.1 error: {0}")]
    Asn1(#[from] kagi_asn1::error::Error),
}
