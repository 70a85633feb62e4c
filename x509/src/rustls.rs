//! Conversions to and from `rustls-pki-types`.

use rustls_pki_types::CertificateDer;

use crate::Certificate;
use crate::error::Error;

impl From<&Certificate> for CertificateDer<'static> {
    fn from(cert: &Certificate) -> Self {
        CertificateDer::from(cert.der().to_vec())
    }
}

impl TryFrom<&CertificateDer<'_>> for Certificate {
    type Error = Error;

    fn try_from(cert: &CertificateDer<'_>) -> Result<Self, Self::Error> {
        Certificate::from_der(cert.as_ref())
    }
}
