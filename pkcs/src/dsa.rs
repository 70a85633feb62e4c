//! DSA key values, [RFC 3279 Section 2.3.2](https://datatracker.ietf.org/doc/html/rfc3279#section-2.3.2)
//!
//! Both keys are bare INTEGERs: `x` inside the PKCS#8 privateKey OCTET
//! STRING and `y` inside the SubjectPublicKeyInfo BIT STRING. The domain
//! parameters travel in the AlgorithmIdentifier.

use kagi::decoder::{DecodableFrom, Decoder};
use kagi_asn1::{Element, Integer};
use kagi_pkix_types::DsaParameters;

use crate::error::{Error, Result};

#[derive(Clone, PartialEq, Eq)]
pub struct DsaPrivateKey {
    pub x: Integer,
}

impl DsaPrivateKey {
    /// Requires `0 < x < q`.
    pub fn validate(&self, params: &DsaParameters) -> Result<()> {
        if !self.x.is_positive() || self.x >= params.q {
            return Err(Error::OutOfRange {
                field: "x",
                reason: "must satisfy 0 < x < q".to_string(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for DsaPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DsaPrivateKey").finish_non_exhaustive()
    }
}

impl DecodableFrom<Element> for DsaPrivateKey {}

impl Decoder<Element, DsaPrivateKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<DsaPrivateKey> {
        match self {
            Element::Integer(x) => Ok(DsaPrivateKey { x: x.clone() }),
            _ => Err(Error::structure("DSAPrivateKey", "expected INTEGER")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsaPublicKey {
    pub y: Integer,
}

impl DsaPublicKey {
    /// Requires `1 < y < p`.
    pub fn validate(&self, params: &DsaParameters) -> Result<()> {
        if self.y <= Integer::from(1u64) || self.y >= params.p {
            return Err(Error::OutOfRange {
                field: "y",
                reason: "must satisfy 1 < y < p".to_string(),
            });
        }
        Ok(())
    }
}

impl DecodableFrom<Element> for DsaPublicKey {}

impl Decoder<Element, DsaPublicKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<DsaPublicKey> {
        match self {
            Element::Integer(y) => Ok(DsaPublicKey { y: y.clone() }),
            _ => Err(Error::structure("DSAPublicKey", "expected INTEGER")),
        }
    }
}
