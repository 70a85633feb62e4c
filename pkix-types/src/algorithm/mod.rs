//! AlgorithmIdentifier
//!
//! [RFC 5280 Section 4.1.1.2](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.1.2):
//! ```asn1
//! AlgorithmIdentifier ::= SEQUENCE {
//!     algorithm   OBJECT IDENTIFIER,
//!     parameters  ANY DEFINED BY algorithm OPTIONAL
//! }
//! ```

use kagi::decoder::{DecodableFrom, Decoder};
use kagi_asn1::{Element, ObjectIdentifier};

use crate::OidName;
use crate::error::{Error, Result};

pub mod parameters;

use parameters::{AlgorithmParameter, RawAlgorithmParameter};

/// The `parameters` field, when present.
///
/// RSA keys carry an explicit NULL; EC keys a curve OID; DSA keys the
/// Dss-Parms SEQUENCE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmParameters {
    Null,
    Other(RawAlgorithmParameter),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    pub algorithm: ObjectIdentifier,
    pub parameters: Option<AlgorithmParameters>,
}

impl AlgorithmIdentifier {
    // Key algorithms (RFC 3279, RFC 4055, RFC 5480)
    pub const OID_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.1";
    pub const OID_RSASSA_PSS: &'static str = "1.2.840.113549.1.1.10";
    pub const OID_EC_PUBLIC_KEY: &'static str = "1.2.840.10045.2.1";
    pub const OID_ID_DSA: &'static str = "1.2.840.10040.4.1";

    // Signature algorithms, for display
    pub const OID_SHA1_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.5";
    pub const OID_SHA256_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.11";
    pub const OID_SHA384_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.12";
    pub const OID_SHA512_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.13";
    pub const OID_ECDSA_WITH_SHA256: &'static str = "1.2.840.10045.4.3.2";
    pub const OID_ECDSA_WITH_SHA384: &'static str = "1.2.840.10045.4.3.3";
    pub const OID_ECDSA_WITH_SHA512: &'static str = "1.2.840.10045.4.3.4";
    pub const OID_DSA_WITH_SHA256: &'static str = "2.16.840.1.101.3.4.3.2";

    pub fn new(algorithm: ObjectIdentifier, parameters: Option<AlgorithmParameters>) -> Self {
        Self {
            algorithm,
            parameters,
        }
    }

    pub fn is(&self, oid: &str) -> bool {
        self.algorithm == oid
    }

    /// Interprets the parameters as `P`, failing when they are absent.
    pub fn parameter<P: AlgorithmParameter>(&self) -> Result<P> {
        match &self.parameters {
            Some(AlgorithmParameters::Other(raw)) => P::parse(raw),
            _ => Err(Error::MissingParameters(self.algorithm.to_string())),
        }
    }
}

impl OidName for AlgorithmIdentifier {
    fn oid_name(&self) -> Option<&'static str> {
        let name = match self.algorithm.to_string().as_str() {
            Self::OID_RSA_ENCRYPTION => "rsaEncryption",
            Self::OID_RSASSA_PSS => "RSASSA-PSS",
            Self::OID_EC_PUBLIC_KEY => "id-ecPublicKey",
            Self::OID_ID_DSA => "id-dsa",
            Self::OID_SHA1_WITH_RSA_ENCRYPTION => "sha1WithRSAEncryption",
            Self::OID_SHA256_WITH_RSA_ENCRYPTION => "sha256WithRSAEncryption",
            Self::OID_SHA384_WITH_RSA_ENCRYPTION => "sha384WithRSAEncryption",
            Self::OID_SHA512_WITH_RSA_ENCRYPTION => "sha512WithRSAEncryption",
            Self::OID_ECDSA_WITH_SHA256 => "ecdsa-with-SHA256",
            Self::OID_ECDSA_WITH_SHA384 => "ecdsa-with-SHA384",
            Self::OID_ECDSA_WITH_SHA512 => "ecdsa-with-SHA512",
            Self::OID_DSA_WITH_SHA256 => "dsa-with-sha256",
            _ => return None,
        };
        Some(name)
    }
}

impl std::fmt::Display for AlgorithmIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.oid_name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{}", self.algorithm),
        }
    }
}

impl DecodableFrom<Element> for AlgorithmIdentifier {}

impl Decoder<Element, AlgorithmIdentifier> for Element {
    type Error = Error;

    fn decode(&self) -> Result<AlgorithmIdentifier> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence("AlgorithmIdentifier"));
        };
        let (oid, parameters) = match elements.as_slice() {
            [oid] => (oid, None),
            [oid, Element::Null] => (oid, Some(AlgorithmParameters::Null)),
            [oid, other] => (
                oid,
                Some(AlgorithmParameters::Other(RawAlgorithmParameter::new(
                    other.clone(),
                ))),
            ),
            _ => {
                return Err(Error::InvalidElementCount {
                    context: "AlgorithmIdentifier",
                    expected: "1 or 2",
                    actual: elements.len(),
                });
            }
        };
        let Element::ObjectIdentifier(algorithm) = oid else {
            return Err(Error::TypeMismatch {
                context: "AlgorithmIdentifier",
                expected: "OBJECT IDENTIFIER for algorithm",
            });
        };
        Ok(AlgorithmIdentifier {
            algorithm: algorithm.clone(),
            parameters,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;
    use crate::NamedCurve;

    fn oid(s: &str) -> Element {
        Element::ObjectIdentifier(ObjectIdentifier::from_str(s).unwrap())
    }

    #[rstest]
    #[case::rsa_null(
        Element::Sequence(vec![oid(AlgorithmIdentifier::OID_RSA_ENCRYPTION), Element::Null]),
        Some(AlgorithmParameters::Null)
    )]
    #[case::absent(Element::Sequence(vec![oid(AlgorithmIdentifier::OID_RSASSA_PSS)]), None)]
    fn test_decode(#[case] input: Element, #[case] parameters: Option<AlgorithmParameters>) {
        let decoded: AlgorithmIdentifier = input.decode().unwrap();
        assert_eq!(parameters, decoded.parameters);
    }

    #[test]
    fn test_curve_parameter() {
        let input = Element::Sequence(vec![
            oid(AlgorithmIdentifier::OID_EC_PUBLIC_KEY),
            oid(NamedCurve::OID_SECP384R1),
        ]);
        let decoded: AlgorithmIdentifier = input.decode().unwrap();

        assert!(decoded.is(AlgorithmIdentifier::OID_EC_PUBLIC_KEY));
        assert_eq!(decoded.to_string(), "id-ecPublicKey");
        assert_eq!(
            decoded.parameter::<NamedCurve>().unwrap(),
            NamedCurve::Secp384r1
        );
    }

    #[test]
    fn test_missing_parameter() {
        let input = Element::Sequence(vec![oid(AlgorithmIdentifier::OID_EC_PUBLIC_KEY)]);
        let decoded: AlgorithmIdentifier = input.decode().unwrap();
        assert!(matches!(
            decoded.parameter::<NamedCurve>(),
            Err(Error::MissingParameters(_))
        ));
    }

    #[rstest]
    #[case::not_sequence(Element::Null)]
    #[case::empty(Element::Sequence(vec![]))]
    #[case::not_oid(Element::Sequence(vec![Element::Null]))]
    fn test_decode_invalid(#[case] input: Element) {
        let result: Result<AlgorithmIdentifier> = input.decode();
        assert!(result.is_err());
    }
}
