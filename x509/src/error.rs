use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),

    #[error("invalid TBSCertificate: {0}")]
    InvalidTBSCertificate(String),

    #[error("invalid version: {0}")]
    InvalidVersion(String),

    #[error("invalid validity: {0}")]
    InvalidValidity(String),

    #[error(transparent)]
    Pem(#[from] kagi_pem::error::Error),

    #[error("PKIX types error: {0}")]
    PKIXTypes(#[from] kagi_pkix_types::Error),
}
