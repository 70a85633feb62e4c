//! SubjectPublicKeyInfo, [RFC 5280 Section 4.1.2.7](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.2.7)
//!
//! ```asn1
//! SubjectPublicKeyInfo  ::=  SEQUENCE  {
//!     algorithm            AlgorithmIdentifier,
//!     subjectPublicKey     BIT STRING
//! }
//! ```

use kagi::decoder::{DecodableFrom, Decoder};
use kagi_asn1::{BitString, Element};

use crate::algorithm::AlgorithmIdentifier;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectPublicKeyInfo {
    algorithm: AlgorithmIdentifier,
    subject_public_key: BitString,
}

impl SubjectPublicKeyInfo {
    pub fn new(algorithm: AlgorithmIdentifier, subject_public_key: BitString) -> Self {
        Self {
            algorithm,
            subject_public_key,
        }
    }

    pub fn algorithm(&self) -> &AlgorithmIdentifier {
        &self.algorithm
    }

    pub fn subject_public_key(&self) -> &BitString {
        &self.subject_public_key
    }

    /// Key bytes, provided the BIT STRING is octet aligned.
    pub fn key_bytes(&self) -> Result<&[u8]> {
        if self.subject_public_key.unused_bits() != 0 {
            return Err(Error::TypeMismatch {
                context: "SubjectPublicKeyInfo",
                expected: "octet-aligned subjectPublicKey",
            });
        }
        Ok(self.subject_public_key.as_bytes())
    }
}

impl DecodableFrom<Element> for SubjectPublicKeyInfo {}

impl Decoder<Element, SubjectPublicKeyInfo> for Element {
    type Error = Error;

    fn decode(&self) -> Result<SubjectPublicKeyInfo> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence("SubjectPublicKeyInfo"));
        };
        let [algorithm, key] = elements.as_slice() else {
            return Err(Error::InvalidElementCount {
                context: "SubjectPublicKeyInfo",
                expected: "2",
                actual: elements.len(),
            });
        };
        let algorithm: AlgorithmIdentifier = algorithm.decode()?;
        let Element::BitString(subject_public_key) = key else {
            return Err(Error::TypeMismatch {
                context: "SubjectPublicKeyInfo",
                expected: "BIT STRING for subjectPublicKey",
            });
        };
        Ok(SubjectPublicKeyInfo {
            algorithm,
            subject_public_key: subject_public_key.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use kagi_asn1::ObjectIdentifier;
    use rstest::rstest;

    use super::*;
    use crate::{AlgorithmParameters, NamedCurve};

    fn ec_algorithm() -> Element {
        Element::Sequence(vec![
            Element::ObjectIdentifier(
                ObjectIdentifier::from_str(AlgorithmIdentifier::OID_EC_PUBLIC_KEY).unwrap(),
            ),
            Element::ObjectIdentifier(ObjectIdentifier::from_str(NamedCurve::OID_SECP256R1).unwrap()),
        ])
    }

    #[test]
    fn test_decode() {
        let element = Element::Sequence(vec![
            ec_algorithm(),
            Element::BitString(BitString::new(0, vec![0x04, 0x01, 0x02])),
        ]);
        let spki: SubjectPublicKeyInfo = element.decode().unwrap();

        assert!(matches!(
            spki.algorithm().parameters,
            Some(AlgorithmParameters::Other(_))
        ));
        assert_eq!(spki.key_bytes().unwrap(), &[0x04, 0x01, 0x02]);
    }

    #[test]
    fn test_unaligned_key_bytes() {
        let spki = SubjectPublicKeyInfo::new(
            ec_algorithm().decode().unwrap(),
            BitString::new(4, vec![0xf0]),
        );
        assert!(spki.key_bytes().is_err());
    }

    #[rstest]
    #[case::not_sequence(Element::Null)]
    #[case::missing_key(Element::Sequence(vec![ec_algorithm()]))]
    #[case::octet_string_key(Element::Sequence(vec![
        ec_algorithm(),
        Element::OctetString(vec![0x04].into()),
    ]))]
    fn test_decode_invalid(#[case] element: Element) {
        let result: Result<SubjectPublicKeyInfo> = element.decode();
        assert!(result.is_err());
    }
}
