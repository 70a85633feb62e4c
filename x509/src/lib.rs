//! X.509 certificates, [RFC 5280 Section 4.1](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1)
//!
//! ```asn1
//! Certificate  ::=  SEQUENCE  {
//!     tbsCertificate       TBSCertificate,
//!     signatureAlgorithm   AlgorithmIdentifier,
//!     signatureValue       BIT STRING
//! }
//!
//! TBSCertificate  ::=  SEQUENCE  {
//!     version         [0]  EXPLICIT Version DEFAULT v1,
//!     serialNumber         CertificateSerialNumber,
//!     signature            AlgorithmIdentifier,
//!     issuer               Name,
//!     validity             Validity,
//!     subject              Name,
//!     subjectPublicKeyInfo SubjectPublicKeyInfo,
//!     issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
//!     subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
//!     extensions      [3]  EXPLICIT Extensions OPTIONAL
//! }
//! ```
//!
//! The decoder reads the fields needed to identify a certificate and keeps
//! the original DER for handing to a TLS stack. Unique identifiers and
//! extensions are skipped; signatures are not verified.

#![forbid(unsafe_code)]

use std::fmt;

use chrono::NaiveDateTime;
use kagi::decoder::{DecodableFrom, Decoder};
use kagi_asn1::{BitString, Element, Integer};
use kagi_pkix_types::{AlgorithmIdentifier, Name, SubjectPublicKeyInfo, decode_der_to_element};

mod chain;
pub mod error;
#[cfg(feature = "rustls")]
mod rustls;

pub use chain::CertificateChain;
pub use error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    tbs_certificate: TBSCertificate,
    signature_algorithm: AlgorithmIdentifier,
    signature_value: BitString,
    der: Vec<u8>,
}

impl Certificate {
    /// Decodes one DER certificate. Trailing bytes are rejected.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let element = decode_der_to_element(der)?;
        let Element::Sequence(elements) = &element else {
            return Err(Error::InvalidCertificate("expected SEQUENCE".to_string()));
        };
        let [tbs, signature_algorithm, Element::BitString(signature_value)] = elements.as_slice()
        else {
            return Err(Error::InvalidCertificate(
                "expected tbsCertificate, signatureAlgorithm and signatureValue".to_string(),
            ));
        };
        Ok(Certificate {
            tbs_certificate: tbs.decode()?,
            signature_algorithm: signature_algorithm.decode()?,
            signature_value: signature_value.clone(),
            der: der.to_vec(),
        })
    }

    pub fn tbs_certificate(&self) -> &TBSCertificate {
        &self.tbs_certificate
    }

    pub fn signature_algorithm(&self) -> &AlgorithmIdentifier {
        &self.signature_algorithm
    }

    pub fn signature_value(&self) -> &BitString {
        &self.signature_value
    }

    pub fn version(&self) -> Version {
        self.tbs_certificate.version
    }

    pub fn serial_number(&self) -> &Integer {
        &self.tbs_certificate.serial_number
    }

    pub fn issuer(&self) -> &Name {
        &self.tbs_certificate.issuer
    }

    pub fn subject(&self) -> &Name {
        &self.tbs_certificate.subject
    }

    pub fn validity(&self) -> &Validity {
        &self.tbs_certificate.validity
    }

    pub fn subject_public_key_info(&self) -> &SubjectPublicKeyInfo {
        &self.tbs_certificate.subject_public_key_info
    }

    /// Subject in RFC 2253 form; the alias used by trust stores.
    pub fn subject_rfc2253(&self) -> String {
        self.subject().to_rfc2253()
    }

    pub fn is_self_issued(&self) -> bool {
        self.issuer() == self.subject()
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }
}

impl TryFrom<&[u8]> for Certificate {
    type Error = Error;

    fn try_from(der: &[u8]) -> Result<Self> {
        Certificate::from_der(der)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Version {
    V1,
    V2,
    V3,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::V1 => write!(f, "1"),
            Version::V2 => write!(f, "2"),
            Version::V3 => write!(f, "3"),
        }
    }
}

impl DecodableFrom<Element> for Version {}

impl Decoder<Element, Version> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Version> {
        let Element::ContextSpecific { slot: 0, element, .. } = self else {
            return Err(Error::InvalidVersion("expected [0] EXPLICIT".to_string()));
        };
        let Element::Integer(version) = element.as_ref() else {
            return Err(Error::InvalidVersion("expected INTEGER".to_string()));
        };
        match version.to_i64() {
            Some(0) => Ok(Version::V1),
            Some(1) => Ok(Version::V2),
            Some(2) => Ok(Version::V3),
            _ => Err(Error::InvalidVersion(version.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validity {
    pub not_before: NaiveDateTime,
    pub not_after: NaiveDateTime,
}

impl DecodableFrom<Element> for Validity {}

impl Decoder<Element, Validity> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Validity> {
        let Element::Sequence(elements) = self else {
            return Err(Error::InvalidValidity("expected SEQUENCE".to_string()));
        };
        let [not_before, not_after] = elements.as_slice() else {
            return Err(Error::InvalidValidity(format!(
                "expected 2 elements, got {}",
                elements.len()
            )));
        };
        let time = |element: &Element, field: &str| match element {
            Element::UTCTime(dt) | Element::GeneralizedTime(dt) => Ok(*dt),
            _ => Err(Error::InvalidValidity(format!("invalid {} time", field))),
        };
        Ok(Validity {
            not_before: time(not_before, "notBefore")?,
            not_after: time(not_after, "notAfter")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TBSCertificate {
    pub version: Version,
    pub serial_number: Integer,
    pub signature: AlgorithmIdentifier,
    pub issuer: Name,
    pub validity: Validity,
    pub subject: Name,
    pub subject_public_key_info: SubjectPublicKeyInfo,
}

impl DecodableFrom<Element> for TBSCertificate {}

impl Decoder<Element, TBSCertificate> for Element {
    type Error = Error;

    fn decode(&self) -> Result<TBSCertificate> {
        let Element::Sequence(elements) = self else {
            return Err(Error::InvalidTBSCertificate("expected SEQUENCE".to_string()));
        };
        let (version, fields) = match elements.split_first() {
            Some((first @ Element::ContextSpecific { slot: 0, .. }, rest)) => {
                let version: Version = first.decode()?;
                (version, rest)
            }
            _ => (Version::V1, elements.as_slice()),
        };
        let [
            Element::Integer(serial_number),
            signature,
            issuer,
            validity,
            subject,
            subject_public_key_info,
            optional @ ..,
        ] = fields
        else {
            return Err(Error::InvalidTBSCertificate(format!(
                "expected at least 6 fields after version, got {}",
                fields.len()
            )));
        };
        if let Some(unexpected) = optional
            .iter()
            .find(|element| !matches!(element, Element::ContextSpecific { slot: 1..=3, .. }))
        {
            return Err(Error::InvalidTBSCertificate(format!(
                "unexpected trailing element {:?}",
                unexpected
            )));
        }

        Ok(TBSCertificate {
            version,
            serial_number: serial_number.clone(),
            signature: signature.decode()?,
            issuer: issuer.decode()?,
            validity: validity.decode()?,
            subject: subject.decode()?,
            subject_public_key_info: subject_public_key_info.decode()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use kagi_pem::Category;
    use kagi_pkix_types::{NamedCurve, OidName};
    use rstest::rstest;

    use super::*;

    pub(crate) const CA: &str = include_str!("../../testdata/ca.pem");
    pub(crate) const LEAF: &str = include_str!("../../testdata/leaf.pem");
    pub(crate) const EC_CERT: &str = include_str!("../../testdata/ec_cert.pem");

    pub(crate) fn certificate(text: &str) -> Certificate {
        let block = kagi_pem::find_blocks(text, Category::Certificate)
            .unwrap()
            .next()
            .unwrap();
        let der: Vec<u8> = block.decode().unwrap();
        Certificate::from_der(&der).unwrap()
    }

    #[rstest]
    #[case::ca(CA, "CN=Kagi Test Root CA,O=Kagi Test,C=JP")]
    #[case::escaped_comma(LEAF, "CN=localhost,OU=Platform,O=Example\\, Inc.,ST=Tokyo,C=JP")]
    #[case::multi_valued_and_email(
        EC_CERT,
        "1.2.840.113549.1.9.1=#160f6f7073406578616d706c652e6f7267,CN=node-1+UID=kagi,DC=example,DC=org"
    )]
    fn test_subject_rfc2253(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(expected, certificate(text).subject_rfc2253());
    }

    #[rstest]
    #[case::v3(CA, Version::V3, "0cd60479d186f92d0e8c55e6669e036f93bac17b")]
    #[case::v1_without_version_field(LEAF, Version::V1, "233b97143c4122951631cfcdb742a34f2a3738d7")]
    fn test_version_and_serial(#[case] text: &str, #[case] version: Version, #[case] serial: &str) {
        let cert = certificate(text);
        assert_eq!(version, cert.version());
        let hex = cert
            .serial_number()
            .to_unsigned_bytes()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<String>();
        assert_eq!(serial, hex);
    }

    #[test]
    fn test_validity_mixes_time_types() {
        let cert = certificate(EC_CERT);
        let validity = cert.validity();

        let not_before = NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(9, 9, 4)
            .unwrap();
        let not_after = NaiveDate::from_ymd_opt(2126, 9, 24)
            .unwrap()
            .and_hms_opt(9, 9, 4)
            .unwrap();
        assert_eq!(validity.not_before, not_before);
        assert_eq!(validity.not_after, not_after);
    }

    #[test]
    fn test_issuer_and_keys() {
        let ca = certificate(CA);
        let leaf = certificate(LEAF);
        let ec = certificate(EC_CERT);

        assert!(ca.is_self_issued());
        assert!(!leaf.is_self_issued());
        assert_eq!(leaf.issuer(), ca.subject());
        assert_eq!(ca.signature_algorithm().oid_name(), Some("sha256WithRSAEncryption"));
        assert_eq!(
            ec.subject_public_key_info()
                .algorithm()
                .parameter::<NamedCurve>()
                .unwrap(),
            NamedCurve::Secp256r1
        );
    }

    #[test]
    fn test_der_is_kept() {
        let block = kagi_pem::find_blocks(CA, Category::Certificate)
            .unwrap()
            .next()
            .unwrap();
        let der: Vec<u8> = block.decode().unwrap();
        assert_eq!(Certificate::try_from(der.as_slice()).unwrap().der(), der.as_slice());
    }

    #[rstest]
    #[case::empty(&[])]
    #[case::null(&[0x05, 0x00])]
    #[case::empty_sequence(&[0x30, 0x00])]
    #[case::truncated(&[0x30, 0x82, 0x01])]
    fn test_from_der_invalid(#[case] der: &[u8]) {
        assert!(Certificate::from_der(der).is_err());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut der = certificate(CA).der().to_vec();
        der.extend_from_slice(&[0x05, 0x00]);
        assert!(Certificate::from_der(&der).is_err());
    }
}
