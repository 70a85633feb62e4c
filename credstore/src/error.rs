use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`], for callers that only branch on the
/// kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    Decode,
    Crypto,
    Certificate,
    Io,
    Config,
}

#[derive(Debug, Error)]
pub enum Error {
    /// No block of the requested category, or a block pattern that failed
    /// to compile.
    #[error("{0}")]
    Parse(String),

    #[error("malformed PEM payload: {0}")]
    Decode(kagi_pem::error::Error),

    /// Decryption failed or no key family accepted the key bytes.
    #[error(transparent)]
    Crypto(#[from] kagi_pkcs::Error),

    #[error(transparent)]
    Certificate(#[from] CertificateError),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("Certificate file does not contain any certificates{}", path_suffix(.path))]
    Empty { path: Option<PathBuf> },

    #[error(transparent)]
    Invalid(kagi_x509::Error),
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(": {}", path.display()))
        .unwrap_or_default()
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse(_) => ErrorKind::Parse,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Crypto(_) => ErrorKind::Crypto,
            Error::Certificate(_) => ErrorKind::Certificate,
            Error::Io { .. } => ErrorKind::Io,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<kagi_pem::error::Error> for Error {
    fn from(error: kagi_pem::error::Error) -> Self {
        match error {
            kagi_pem::error::Error::Pattern(_) => Error::Parse(error.to_string()),
            kagi_pem::error::Error::Base64Decode(_) => Error::Decode(error),
        }
    }
}

impl From<kagi_x509::Error> for Error {
    fn from(error: kagi_x509::Error) -> Self {
        match error {
            kagi_x509::Error::Pem(pem) => Error::from(pem),
            other => Error::Certificate(CertificateError::Invalid(other)),
        }
    }
}
