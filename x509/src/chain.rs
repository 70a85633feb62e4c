//! Certificate chains read from PEM text.
//!
//! Order is the order of appearance: index 0 is conventionally the
//! end-entity certificate, followed by its issuers.

use std::ops::Deref;
use std::str::FromStr;

use kagi::decoder::Decoder;
use kagi_pem::Category;
use log::debug;

use crate::Certificate;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateChain {
    certificates: Vec<Certificate>,
}

impl CertificateChain {
    pub fn new(certificates: Vec<Certificate>) -> Self {
        Self { certificates }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Decodes every CERTIFICATE block in `text`. Text around and between
    /// the blocks is ignored; no blocks gives an empty chain.
    pub fn from_pem(text: &str) -> Result<Self> {
        let certificates = kagi_pem::find_blocks(text, Category::Certificate)?
            .map(|block| {
                let der: Vec<u8> = block.decode()?;
                Certificate::from_der(&der)
            })
            .collect::<Result<Vec<_>>>()?;
        debug!("read {} certificate(s)", certificates.len());
        Ok(Self { certificates })
    }

    pub fn end_entity(&self) -> Option<&Certificate> {
        self.certificates.first()
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Certificate> {
        self.certificates.iter()
    }

    pub fn as_slice(&self) -> &[Certificate] {
        &self.certificates
    }

    pub fn into_vec(self) -> Vec<Certificate> {
        self.certificates
    }
}

impl From<Vec<Certificate>> for CertificateChain {
    fn from(certificates: Vec<Certificate>) -> Self {
        Self::new(certificates)
    }
}

impl FromIterator<Certificate> for CertificateChain {
    fn from_iter<I: IntoIterator<Item = Certificate>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Deref for CertificateChain {
    type Target = [Certificate];

    fn deref(&self) -> &Self::Target {
        &self.certificates
    }
}

impl<'a> IntoIterator for &'a CertificateChain {
    type Item = &'a Certificate;
    type IntoIter = std::slice::Iter<'a, Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certificates.iter()
    }
}

impl IntoIterator for CertificateChain {
    type Item = Certificate;
    type IntoIter = std::vec::IntoIter<Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certificates.into_iter()
    }
}

impl FromStr for CertificateChain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_pem(s)
    }
}
