//! RSA key structures, [RFC 8017 Appendix A.1](https://datatracker.ietf.org/doc/html/rfc8017#appendix-A.1)
//!
//! ```asn1
//! RSAPublicKey ::= SEQUENCE {
//!     modulus           INTEGER,  -- n
//!     publicExponent    INTEGER   -- e
//! }
//!
//! RSAPrivateKey ::= SEQUENCE {
//!     version           Version,
//!     modulus           INTEGER,  -- n
//!     publicExponent    INTEGER,  -- e
//!     privateExponent   INTEGER,  -- d
//!     prime1            INTEGER,  -- p
//!     prime2            INTEGER,  -- q
//!     exponent1         INTEGER,  -- d mod (p-1)
//!     exponent2         INTEGER,  -- d mod (q-1)
//!     coefficient       INTEGER,  -- (inverse of q) mod p
//!     otherPrimeInfos   OtherPrimeInfos OPTIONAL
//! }
//! ```
//!
//! Only two-prime keys (version 0) are accepted.

use kagi::decoder::{DecodableFrom, Decoder};
use kagi_asn1::{Element, Integer};

use crate::error::{Error, Result};

#[derive(Clone, PartialEq, Eq)]
pub struct RSAPrivateKey {
    pub modulus: Integer,
    pub public_exponent: Integer,
    pub private_exponent: Integer,
    pub prime1: Integer,
    pub prime2: Integer,
    pub exponent1: Integer,
    pub exponent2: Integer,
    pub coefficient: Integer,
}

impl RSAPrivateKey {
    pub fn key_size(&self) -> u32 {
        self.modulus.bits() as u32
    }

    pub fn public_key(&self) -> RSAPublicKey {
        RSAPublicKey {
            modulus: self.modulus.clone(),
            public_exponent: self.public_exponent.clone(),
        }
    }
}

impl std::fmt::Debug for RSAPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RSAPrivateKey")
            .field("key_size", &self.key_size())
            .finish_non_exhaustive()
    }
}

impl DecodableFrom<Element> for RSAPrivateKey {}

impl Decoder<Element, RSAPrivateKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<RSAPrivateKey> {
        let Element::Sequence(elements) = self else {
            return Err(Error::structure("RSAPrivateKey", "expected SEQUENCE"));
        };
        let integers = elements
            .iter()
            .map(|element| match element {
                Element::Integer(int) => Ok(int.clone()),
                _ => Err(Error::structure("RSAPrivateKey", "expected INTEGER fields")),
            })
            .collect::<Result<Vec<Integer>>>()?;
        let [version, n, e, d, p, q, dp, dq, qinv] = integers.as_slice() else {
            return Err(Error::structure(
                "RSAPrivateKey",
                format!("expected 9 INTEGER fields, got {}", elements.len()),
            ));
        };
        if version.to_i64() != Some(0) {
            return Err(Error::UnsupportedVersion {
                context: "RSAPrivateKey",
                version: version.to_string(),
            });
        }
        check_positive("modulus", n)?;
        check_positive("publicExponent", e)?;
        Ok(RSAPrivateKey {
            modulus: n.clone(),
            public_exponent: e.clone(),
            private_exponent: d.clone(),
            prime1: p.clone(),
            prime2: q.clone(),
            exponent1: dp.clone(),
            exponent2: dq.clone(),
            coefficient: qinv.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RSAPublicKey {
    pub modulus: Integer,
    pub public_exponent: Integer,
}

impl RSAPublicKey {
    pub fn key_size(&self) -> u32 {
        self.modulus.bits() as u32
    }
}

impl DecodableFrom<Element> for RSAPublicKey {}

impl Decoder<Element, RSAPublicKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<RSAPublicKey> {
        let Element::Sequence(elements) = self else {
            return Err(Error::structure("RSAPublicKey", "expected SEQUENCE"));
        };
        let [Element::Integer(n), Element::Integer(e)] = elements.as_slice() else {
            return Err(Error::structure(
                "RSAPublicKey",
                "expected modulus and publicExponent INTEGERs",
            ));
        };
        check_positive("modulus", n)?;
        check_positive("publicExponent", e)?;
        Ok(RSAPublicKey {
            modulus: n.clone(),
            public_exponent: e.clone(),
        })
    }
}

fn check_positive(field: &'static str, value: &Integer) -> Result<()> {
    if value.is_positive() {
        Ok(())
    } else {
        Err(Error::OutOfRange {
            field,
            reason: "must be positive".to_string(),
        })
    }
}
