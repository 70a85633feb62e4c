use std::fmt;

use thiserror::Error;

use crate::resolver::KeyFamily;

pub type Result<T> = std::result::Result<T, Error>;

/// One failed family in an ordered key trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub family: KeyFamily,
    pub reason: String,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.family, self.reason)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{context}: {reason}")]
    InvalidStructure {
        context: &'static str,
        reason: String,
    },

    #[error("{context}: unsupported version {version}")]
    UnsupportedVersion {
        context: &'static str,
        version: String,
    },

    #[error("unsupported {context} algorithm {oid}")]
    UnsupportedAlgorithm { context: &'static str, oid: String },

    #[error("expected {expected} key, found algorithm {found}")]
    AlgorithmMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("curve {inner} in ECPrivateKey does not match {outer}")]
    CurveMismatch { outer: String, inner: String },

    #[error("{field} out of range: {reason}")]
    OutOfRange {
        field: &'static str,
        reason: String,
    },

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("no algorithm matched key material")]
    NoAlgorithmMatched(Vec<Attempt>),

    #[error("DER error: {0}")]
    Der(#[from] kagi_der::error::Error),

    #[error("ASN.1 error: {0}")]
    Asn1(#[from] kagi_asn1::error::Error),

    #[error(transparent)]
    PkixTypes(#[from] kagi_pkix_types::Error),
}

impl Error {
    pub(crate) fn structure(context: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidStructure {
            context,
            reason: reason.into(),
        }
    }

    /// Failed attempts, in trial order, when no key family matched.
    pub fn attempts(&self) -> &[Attempt] {
        match self {
            Error::NoAlgorithmMatched(attempts) => attempts,
            _ => &[],
        }
    }
}
