//! EC private keys, [RFC 5915](https://datatracker.ietf.org/doc/html/rfc5915)
//!
//! ```asn1
//! ECPrivateKey ::= SEQUENCE {
//!     version        INTEGER { ecPrivkeyVer1(1) } (ecPrivkeyVer1),
//!     privateKey     OCTET STRING,
//!     parameters [0] ECParameters {{ NamedCurve }} OPTIONAL,
//!     publicKey  [1] BIT STRING OPTIONAL
//! }
//! ```

use kagi::decoder::{DecodableFrom, Decoder};
use kagi_asn1::{BitString, Element};
use kagi_pkix_types::{NamedCurve, OidName};

use crate::error::{Error, Result};

#[derive(Clone, PartialEq, Eq)]
pub struct ECPrivateKey {
    pub private_key: Vec<u8>,
    pub parameters: Option<NamedCurve>,
    pub public_key: Option<BitString>,
}

impl std::fmt::Debug for ECPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ECPrivateKey")
            .field("parameters", &self.parameters)
            .field("public_key", &self.public_key.is_some())
            .finish_non_exhaustive()
    }
}

impl ECPrivateKey {
    /// Checks the key against the curve named by the enclosing container.
    pub fn validate(&self, curve: NamedCurve) -> Result<()> {
        if let Some(inner) = self.parameters {
            if inner != curve {
                return Err(Error::CurveMismatch {
                    outer: curve.to_string(),
                    inner: inner.to_string(),
                });
            }
        }
        if self.private_key.len() > curve.field_bytes() {
            return Err(Error::OutOfRange {
                field: "privateKey",
                reason: format!(
                    "{} octets is longer than the {} order",
                    self.private_key.len(),
                    curve.oid_name().unwrap_or(curve.oid_str())
                ),
            });
        }
        if self.private_key.iter().all(|b| *b == 0) {
            return Err(Error::OutOfRange {
                field: "privateKey",
                reason: "must not be zero".to_string(),
            });
        }
        if let Some(public_key) = &self.public_key {
            validate_point(curve, public_key.as_bytes())?;
        }
        Ok(())
    }
}

impl DecodableFrom<Element> for ECPrivateKey {}

impl Decoder<Element, ECPrivateKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<ECPrivateKey> {
        let Element::Sequence(elements) = self else {
            return Err(Error::structure("ECPrivateKey", "expected SEQUENCE"));
        };
        let (version, private_key, optional) = match elements.as_slice() {
            [Element::Integer(version), Element::OctetString(key), rest @ ..] => {
                (version, key, rest)
            }
            _ => {
                return Err(Error::structure(
                    "ECPrivateKey",
                    "expected version INTEGER and privateKey OCTET STRING",
                ));
            }
        };
        if version.to_i64() != Some(1) {
            return Err(Error::UnsupportedVersion {
                context: "ECPrivateKey",
                version: version.to_string(),
            });
        }

        let mut parameters = None;
        let mut public_key = None;
        let mut last_slot = None;
        for element in optional {
            let Element::ContextSpecific { slot, element, .. } = element else {
                return Err(Error::structure(
                    "ECPrivateKey",
                    "unexpected element after privateKey",
                ));
            };
            if last_slot.is_some_and(|last| last >= *slot) {
                return Err(Error::structure("ECPrivateKey", "fields out of order"));
            }
            last_slot = Some(*slot);
            match (*slot, element.as_ref()) {
                (0, Element::ObjectIdentifier(oid)) => {
                    parameters = Some(NamedCurve::try_from(oid)?);
                }
                (1, Element::BitString(bits)) => public_key = Some(bits.clone()),
                (0, _) => {
                    return Err(Error::structure(
                        "ECPrivateKey",
                        "parameters must be a namedCurve",
                    ));
                }
                (1, _) => {
                    return Err(Error::structure(
                        "ECPrivateKey",
                        "publicKey must be a BIT STRING",
                    ));
                }
                (other, _) => {
                    return Err(Error::structure(
                        "ECPrivateKey",
                        format!("unknown field [{}]", other),
                    ));
                }
            }
        }

        Ok(ECPrivateKey {
            private_key: private_key.as_bytes().to_vec(),
            parameters,
            public_key,
        })
    }
}

/// Checks an encoded EC point (SEC 1 Section 2.3.3) against the curve's
/// coordinate size.
pub fn validate_point(curve: NamedCurve, point: &[u8]) -> Result<()> {
    let size = curve.field_bytes();
    let expected = match point.first() {
        Some(0x04) => 1 + 2 * size,
        Some(0x02 | 0x03) => 1 + size,
        Some(other) => {
            return Err(Error::structure(
                "ECPoint",
                format!("unsupported point format 0x{:02x}", other),
            ));
        }
        None => return Err(Error::structure("ECPoint", "empty point")),
    };
    if point.len() != expected {
        return Err(Error::structure(
            "ECPoint",
            format!(
                "{} octets do not fit {}, expected {}",
                point.len(),
                curve,
                expected
            ),
        ));
    }
    Ok(())
}
