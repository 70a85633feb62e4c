//! ```asn1
//! EncryptedPrivateKeyInfo ::= SEQUENCE {
//!     encryptionAlgorithm  EncryptionAlgorithmIdentifier,
//!     encryptedData        EncryptedData
//! }
//!
//! EncryptedData ::= OCTET STRING
//! ```

use kagi::decoder::{DecodableFrom, Decoder};
use kagi_asn1::Element;
use kagi_pkix_types::{AlgorithmIdentifier, decode_der_to_element};
use zeroize::Zeroizing;

use super::pbes2::Pbes2Params;
use crate::Password;
use crate::error::{Error, Result};

/// Password-protected PKCS#8 envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPrivateKeyInfo {
    pub encryption_algorithm: AlgorithmIdentifier,
    pub encrypted_data: Vec<u8>,
}

impl EncryptedPrivateKeyInfo {
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        decode_der_to_element(bytes)?.decode()
    }

    /// Decrypts the envelope into plaintext PKCS#8 DER.
    pub fn decrypt(&self, password: &Password) -> Result<Zeroizing<Vec<u8>>> {
        let params = Pbes2Params::from_algorithm(&self.encryption_algorithm)?;
        params.decrypt(password, &self.encrypted_data)
    }
}

impl DecodableFrom<Element> for EncryptedPrivateKeyInfo {}

impl Decoder<Element, EncryptedPrivateKeyInfo> for Element {
    type Error = Error;

    fn decode(&self) -> Result<EncryptedPrivateKeyInfo> {
        let Element::Sequence(elements) = self else {
            return Err(Error::structure("EncryptedPrivateKeyInfo", "expected SEQUENCE"));
        };
        let [algorithm, Element::OctetString(data)] = elements.as_slice() else {
            return Err(Error::structure(
                "EncryptedPrivateKeyInfo",
                "expected encryptionAlgorithm and encryptedData OCTET STRING",
            ));
        };
        Ok(EncryptedPrivateKeyInfo {
            encryption_algorithm: algorithm.decode()?,
            encrypted_data: data.as_bytes().to_vec(),
        })
    }
}
