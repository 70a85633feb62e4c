//! ```asn1
//! OneAsymmetricKey ::= SEQUENCE {
//!     version                   Version,
//!     privateKeyAlgorithm       PrivateKeyAlgorithmIdentifier,
//!     privateKey                PrivateKey,
//!     attributes            [0] Attributes OPTIONAL,
//!     ...,
//!     [[2: publicKey        [1] PublicKey OPTIONAL ]],
//!     ...
//! }
//!
//! PrivateKey ::= OCTET STRING
//! ```

use kagi::decoder::{DecodableFrom, Decoder};
use kagi_asn1::Element;
use kagi_pkix_types::{AlgorithmIdentifier, decode_der_to_element};

use crate::error::{Error, Result};

/// Plaintext PKCS#8 key. Attributes and the v2 public key are skipped.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKeyInfo {
    pub version: u8,
    pub private_key_algorithm: AlgorithmIdentifier,
    pub private_key: Vec<u8>,
}

impl PrivateKeyInfo {
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        decode_der_to_element(bytes)?.decode()
    }

    /// The privateKey OCTET STRING parsed as one DER element.
    pub fn private_key_element(&self) -> Result<Element> {
        Ok(decode_der_to_element(&self.private_key)?)
    }
}

impl std::fmt::Debug for PrivateKeyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeyInfo")
            .field("version", &self.version)
            .field("private_key_algorithm", &self.private_key_algorithm)
            .finish_non_exhaustive()
    }
}

impl DecodableFrom<Element> for PrivateKeyInfo {}

impl Decoder<Element, PrivateKeyInfo> for Element {
    type Error = Error;

    fn decode(&self) -> Result<PrivateKeyInfo> {
        let Element::Sequence(elements) = self else {
            return Err(Error::structure("PrivateKeyInfo", "expected SEQUENCE"));
        };
        let [Element::Integer(version), algorithm, Element::OctetString(key), optional @ ..] =
            elements.as_slice()
        else {
            return Err(Error::structure(
                "PrivateKeyInfo",
                "expected version, privateKeyAlgorithm and privateKey",
            ));
        };
        let version = match version.to_u32() {
            Some(v @ (0 | 1)) => v as u8,
            _ => {
                return Err(Error::UnsupportedVersion {
                    context: "PrivateKeyInfo",
                    version: version.to_string(),
                });
            }
        };
        if optional
            .iter()
            .any(|element| !matches!(element, Element::ContextSpecific { slot: 0 | 1, .. }))
        {
            return Err(Error::structure(
                "PrivateKeyInfo",
                "unexpected element after privateKey",
            ));
        }
        Ok(PrivateKeyInfo {
            version,
            private_key_algorithm: algorithm.decode()?,
            private_key: key.as_bytes().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use kagi::decoder::Decoder;
    use kagi_pem::Category;
    use rstest::rstest;

    use super::*;

    fn first_block_der(text: &str) -> Vec<u8> {
        let block = kagi_pem::find_blocks(text, Category::PrivateKey)
            .unwrap()
            .next()
            .unwrap();
        block.decode().unwrap()
    }

    #[rstest]
    #[case::rsa(include_str!("../../../testdata/rsa_key.pem"), AlgorithmIdentifier::OID_RSA_ENCRYPTION)]
    #[case::ec(include_str!("../../../testdata/ec_key.pem"), AlgorithmIdentifier::OID_EC_PUBLIC_KEY)]
    #[case::dsa(include_str!("../../../testdata/dsa_key.pem"), AlgorithmIdentifier::OID_ID_DSA)]
    fn test_from_der(#[case] pem: &str, #[case] oid: &str) {
        let info = PrivateKeyInfo::from_der(&first_block_der(pem)).unwrap();

        assert_eq!(info.version, 0);
        assert!(info.private_key_algorithm.is(oid));
        assert!(info.private_key_element().is_ok());
    }

    #[test]
    fn test_encrypted_envelope_is_not_plaintext() {
        let der = first_block_der(include_str!("../../../testdata/rsa_key_encrypted.pem"));
        assert!(PrivateKeyInfo::from_der(&der).is_err());
    }

    #[test]
    fn test_pkcs1_is_not_pkcs8() {
        let der = first_block_der(include_str!("../../../testdata/rsa_key_pkcs1.pem"));
        assert!(PrivateKeyInfo::from_der(&der).is_err());
    }
}
