//! Serializable summaries of what was loaded. `Display` gives the text
//! output.

use std::fmt;

use kagi_credstore::{Certificate, CredentialStore, KeyEntry, ResolvedPrivateKey, ResolvedPublicKey};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct CertificateReport {
    subject: String,
    issuer: String,
    serial: String,
    version: String,
    signature_algorithm: String,
    not_before: String,
    not_after: String,
}

impl From<&Certificate> for CertificateReport {
    fn from(certificate: &Certificate) -> Self {
        let validity = certificate.validity();
        Self {
            subject: certificate.subject_rfc2253(),
            issuer: certificate.issuer().to_rfc2253(),
            serial: format!("{:x}", certificate.serial_number()),
            version: certificate.version().to_string(),
            signature_algorithm: certificate.signature_algorithm().to_string(),
            not_before: validity.not_before.to_string(),
            not_after: validity.not_after.to_string(),
        }
    }
}

impl fmt::Display for CertificateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Subject: {}", self.subject)?;
        writeln!(f, "    Issuer: {}", self.issuer)?;
        writeln!(f, "    Serial Number: {}", self.serial)?;
        writeln!(f, "    Version: {}", self.version)?;
        writeln!(f, "    Signature Algorithm: {}", self.signature_algorithm)?;
        writeln!(f, "    Not Before: {}", self.not_before)?;
        writeln!(f, "    Not After : {}", self.not_after)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CertificatesReport {
    certificates: Vec<CertificateReport>,
}

impl<'a> FromIterator<&'a Certificate> for CertificatesReport {
    fn from_iter<I: IntoIterator<Item = &'a Certificate>>(iter: I) -> Self {
        Self {
            certificates: iter.into_iter().map(CertificateReport::from).collect(),
        }
    }
}

impl fmt::Display for CertificatesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Certificates: {}", self.certificates.len())?;
        for (index, certificate) in self.certificates.iter().enumerate() {
            write!(f, "[{index}] {certificate}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct KeyReport {
    family: String,
    key_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    curve: Option<String>,
}

impl From<&ResolvedPrivateKey> for KeyReport {
    fn from(key: &ResolvedPrivateKey) -> Self {
        Self {
            family: key.family().to_string(),
            key_size: key.key_size(),
            curve: key.curve().map(|curve| curve.to_string()),
        }
    }
}

impl From<&ResolvedPublicKey> for KeyReport {
    fn from(key: &ResolvedPublicKey) -> Self {
        Self {
            family: key.family().to_string(),
            key_size: key.key_size(),
            curve: key.curve().map(|curve| curve.to_string()),
        }
    }
}

impl fmt::Display for KeyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bit", self.family, self.key_size)?;
        if let Some(curve) = &self.curve {
            write!(f, ", {curve}")?;
        }
        writeln!(f, ")")
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TrustedEntryReport {
    alias: String,
    issuer: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TrustStoreReport {
    entries: Vec<TrustedEntryReport>,
}

impl From<&CredentialStore> for TrustStoreReport {
    fn from(store: &CredentialStore) -> Self {
        let entries = store
            .trusted_certificates()
            .map(|(alias, certificate)| TrustedEntryReport {
                alias: alias.to_string(),
                issuer: certificate.issuer().to_rfc2253(),
            })
            .collect();
        Self { entries }
    }
}

impl fmt::Display for TrustStoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Trusted certificates: {}", self.entries.len())?;
        for entry in &self.entries {
            writeln!(f, "  {}", entry.alias)?;
            writeln!(f, "    Issuer: {}", entry.issuer)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct KeyStoreReport {
    alias: String,
    key: KeyReport,
    chain: Vec<String>,
}

impl KeyStoreReport {
    pub(crate) fn new(alias: &str, entry: &KeyEntry) -> Self {
        Self {
            alias: alias.to_string(),
            key: KeyReport::from(entry.private_key()),
            chain: entry.chain().iter().map(Certificate::subject_rfc2253).collect(),
        }
    }
}

impl fmt::Display for KeyStoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Alias: {}", self.alias)?;
        write!(f, "  Key: {}", self.key)?;
        writeln!(f, "  Chain:")?;
        for (index, subject) in self.chain.iter().enumerate() {
            writeln!(f, "    [{index}] {subject}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ConfigReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) trust_store: Option<TrustStoreReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) key_store: Option<KeyStoreReport>,
}

impl fmt::Display for ConfigReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(trust_store) = &self.trust_store {
            write!(f, "{trust_store}")?;
        }
        if let Some(key_store) = &self.key_store {
            write!(f, "{key_store}")?;
        }
        Ok(())
    }
}
