//! Named curves, [RFC 5480 Section 2.1.1.1](https://datatracker.ietf.org/doc/html/rfc5480#section-2.1.1.1)
//!
//! Only prime curves are listed; binary (sect*) curves are rejected like
//! any other unknown curve.

use kagi_asn1::{Element, ObjectIdentifier};

use super::{AlgorithmParameter, RawAlgorithmParameter};
use crate::OidName;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedCurve {
    Secp192r1,
    Secp224r1,
    Secp256r1,
    Secp384r1,
    Secp521r1,
    Secp256k1,
}

impl NamedCurve {
    pub const OID_SECP192R1: &'static str = "1.2.840.10045.3.1.1";
    pub const OID_SECP224R1: &'static str = "1.3.132.0.33";
    pub const OID_SECP256R1: &'static str = "1.2.840.10045.3.1.7";
    pub const OID_SECP384R1: &'static str = "1.3.132.0.34";
    pub const OID_SECP521R1: &'static str = "1.3.132.0.35";
    pub const OID_SECP256K1: &'static str = "1.3.132.0.10";

    const ALL: [NamedCurve; 6] = [
        NamedCurve::Secp192r1,
        NamedCurve::Secp224r1,
        NamedCurve::Secp256r1,
        NamedCurve::Secp384r1,
        NamedCurve::Secp521r1,
        NamedCurve::Secp256k1,
    ];

    pub const fn oid_str(&self) -> &'static str {
        match self {
            Self::Secp192r1 => Self::OID_SECP192R1,
            Self::Secp224r1 => Self::OID_SECP224R1,
            Self::Secp256r1 => Self::OID_SECP256R1,
            Self::Secp384r1 => Self::OID_SECP384R1,
            Self::Secp521r1 => Self::OID_SECP521R1,
            Self::Secp256k1 => Self::OID_SECP256K1,
        }
    }

    /// Bit length of the group order, which is also the key size.
    pub const fn order_bits(&self) -> u32 {
        match self {
            Self::Secp192r1 => 192,
            Self::Secp224r1 => 224,
            Self::Secp256r1 | Self::Secp256k1 => 256,
            Self::Secp384r1 => 384,
            Self::Secp521r1 => 521,
        }
    }

    /// Octets in one encoded field element (a point coordinate).
    pub const fn field_bytes(&self) -> usize {
        (self.order_bits() as usize).div_ceil(8)
    }
}

impl OidName for NamedCurve {
    fn oid_name(&self) -> Option<&'static str> {
        Some(match self {
            Self::Secp192r1 => "secp192r1",
            Self::Secp224r1 => "secp224r1",
            Self::Secp256r1 => "secp256r1",
            Self::Secp384r1 => "secp384r1",
            Self::Secp521r1 => "secp521r1",
            Self::Secp256k1 => "secp256k1",
        })
    }
}

impl std::fmt::Display for NamedCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.oid_name().unwrap_or(self.oid_str()))
    }
}

impl TryFrom<&ObjectIdentifier> for NamedCurve {
    type Error = Error;

    fn try_from(oid: &ObjectIdentifier) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|curve| *oid == curve.oid_str())
            .ok_or_else(|| Error::UnsupportedCurve(oid.to_string()))
    }
}

impl AlgorithmParameter for NamedCurve {
    fn parse(raw: &RawAlgorithmParameter) -> Result<Self> {
        match raw.element() {
            Element::ObjectIdentifier(oid) => NamedCurve::try_from(oid),
            _ => Err(Error::TypeMismatch {
                context: "ECParameters",
                expected: "namedCurve OBJECT IDENTIFIER",
            }),
        }
    }
}
