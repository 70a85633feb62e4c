//! PBES2 decryption, [RFC 8018 Section 6.2](https://datatracker.ietf.org/doc/html/rfc8018#section-6.2)
//!
//! ```asn1
//! PBES2-params ::= SEQUENCE {
//!     keyDerivationFunc AlgorithmIdentifier {{PBES2-KDFs}},
//!     encryptionScheme  AlgorithmIdentifier {{PBES2-Encs}}
//! }
//!
//! PBKDF2-params ::= SEQUENCE {
//!     salt CHOICE {
//!         specified       OCTET STRING,
//!         otherSource     AlgorithmIdentifier {{PBKDF2-SaltSources}}
//!     },
//!     iterationCount      INTEGER (1..MAX),
//!     keyLength           INTEGER (1..MAX) OPTIONAL,
//!     prf                 AlgorithmIdentifier {{PBKDF2-PRFs}} DEFAULT algid-hmacWithSHA1
//! }
//! ```
//!
//! Key derivation is PBKDF2 with an HMAC-SHA1/SHA2 PRF. The cipher is AES
//! or triple DES in CBC mode with PKCS#7 padding.

use std::fmt;

use cbc::cipher::{BlockDecryptMut, KeyIvInit, block_padding::Pkcs7};
use kagi::decoder::{DecodableFrom, Decoder};
use kagi_asn1::{Element, ObjectIdentifier};
use kagi_pkix_types::{AlgorithmIdentifier, AlgorithmParameters};
use log::debug;
use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

use crate::Password;
use crate::error::{Error, Result};

pub const OID_PBES2: &str = "1.2.840.113549.1.5.13";
pub const OID_PBKDF2: &str = "1.2.840.113549.1.5.12";

/// Largest accepted PBKDF2 iterationCount. Larger values are rejected with
/// `OutOfRange` before any key derivation runs.
pub const MAX_ITERATION_COUNT: u32 = 10_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prf {
    HmacWithSha1,
    HmacWithSha224,
    HmacWithSha256,
    HmacWithSha384,
    HmacWithSha512,
}

impl Prf {
    pub const OID_HMAC_WITH_SHA1: &'static str = "1.2.840.113549.2.7";
    pub const OID_HMAC_WITH_SHA224: &'static str = "1.2.840.113549.2.8";
    pub const OID_HMAC_WITH_SHA256: &'static str = "1.2.840.113549.2.9";
    pub const OID_HMAC_WITH_SHA384: &'static str = "1.2.840.113549.2.10";
    pub const OID_HMAC_WITH_SHA512: &'static str = "1.2.840.113549.2.11";

    fn from_oid(oid: &ObjectIdentifier) -> Result<Self> {
        let prf = match oid.to_string().as_str() {
            Self::OID_HMAC_WITH_SHA1 => Prf::HmacWithSha1,
            Self::OID_HMAC_WITH_SHA224 => Prf::HmacWithSha224,
            Self::OID_HMAC_WITH_SHA256 => Prf::HmacWithSha256,
            Self::OID_HMAC_WITH_SHA384 => Prf::HmacWithSha384,
            Self::OID_HMAC_WITH_SHA512 => Prf::HmacWithSha512,
            other => {
                return Err(Error::UnsupportedAlgorithm {
                    context: "PBKDF2 PRF",
                    oid: other.to_string(),
                });
            }
        };
        Ok(prf)
    }

    fn derive(&self, password: &[u8], salt: &[u8], rounds: u32, out: &mut [u8]) {
        match self {
            Prf::HmacWithSha1 => pbkdf2_hmac::<Sha1>(password, salt, rounds, out),
            Prf::HmacWithSha224 => pbkdf2_hmac::<Sha224>(password, salt, rounds, out),
            Prf::HmacWithSha256 => pbkdf2_hmac::<Sha256>(password, salt, rounds, out),
            Prf::HmacWithSha384 => pbkdf2_hmac::<Sha384>(password, salt, rounds, out),
            Prf::HmacWithSha512 => pbkdf2_hmac::<Sha512>(password, salt, rounds, out),
        }
    }
}

impl fmt::Display for Prf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Prf::HmacWithSha1 => "hmacWithSHA1",
            Prf::HmacWithSha224 => "hmacWithSHA224",
            Prf::HmacWithSha256 => "hmacWithSHA256",
            Prf::HmacWithSha384 => "hmacWithSHA384",
            Prf::HmacWithSha512 => "hmacWithSHA512",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionScheme {
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
    DesEde3Cbc,
}

impl EncryptionScheme {
    pub const OID_AES128_CBC: &'static str = "2.16.840.1.101.3.4.1.2";
    pub const OID_AES192_CBC: &'static str = "2.16.840.1.101.3.4.1.22";
    pub const OID_AES256_CBC: &'static str = "2.16.840.1.101.3.4.1.42";
    pub const OID_DES_EDE3_CBC: &'static str = "1.2.840.113549.3.7";

    fn from_oid(oid: &ObjectIdentifier) -> Result<Self> {
        let scheme = match oid.to_string().as_str() {
            Self::OID_AES128_CBC => EncryptionScheme::Aes128Cbc,
            Self::OID_AES192_CBC => EncryptionScheme::Aes192Cbc,
            Self::OID_AES256_CBC => EncryptionScheme::Aes256Cbc,
            Self::OID_DES_EDE3_CBC => EncryptionScheme::DesEde3Cbc,
            other => {
                return Err(Error::UnsupportedAlgorithm {
                    context: "PBES2 encryption scheme",
                    oid: other.to_string(),
                });
            }
        };
        Ok(scheme)
    }

    pub const fn key_len(&self) -> usize {
        match self {
            EncryptionScheme::Aes128Cbc => 16,
            EncryptionScheme::Aes192Cbc | EncryptionScheme::DesEde3Cbc => 24,
            EncryptionScheme::Aes256Cbc => 32,
        }
    }

    pub const fn iv_len(&self) -> usize {
        match self {
            EncryptionScheme::DesEde3Cbc => 8,
            _ => 16,
        }
    }

    fn decrypt(&self, key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        match self {
            EncryptionScheme::Aes128Cbc => decrypt_cbc::<cbc::Decryptor<aes::Aes128>>(key, iv, data),
            EncryptionScheme::Aes192Cbc => decrypt_cbc::<cbc::Decryptor<aes::Aes192>>(key, iv, data),
            EncryptionScheme::Aes256Cbc => decrypt_cbc::<cbc::Decryptor<aes::Aes256>>(key, iv, data),
            EncryptionScheme::DesEde3Cbc => {
                decrypt_cbc::<cbc::Decryptor<des::TdesEde3>>(key, iv, data)
            }
        }
    }
}

impl fmt::Display for EncryptionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EncryptionScheme::Aes128Cbc => "aes128-CBC",
            EncryptionScheme::Aes192Cbc => "aes192-CBC",
            EncryptionScheme::Aes256Cbc => "aes256-CBC",
            EncryptionScheme::DesEde3Cbc => "des-ede3-cbc",
        };
        f.write_str(name)
    }
}

fn decrypt_cbc<D>(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    D: KeyIvInit + BlockDecryptMut,
{
    let decryptor =
        D::new_from_slices(key, iv).map_err(|e| Error::Decryption(format!("cipher setup: {}", e)))?;
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(data)
        .map_err(|_| Error::Decryption("bad padding, wrong password or corrupted data".to_string()))
}

#[derive(Clone, PartialEq, Eq)]
pub struct Pbkdf2Params {
    pub salt: Vec<u8>,
    pub iteration_count: u32,
    pub key_length: Option<usize>,
    pub prf: Prf,
}

impl fmt::Debug for Pbkdf2Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pbkdf2Params")
            .field("iteration_count", &self.iteration_count)
            .field("key_length", &self.key_length)
            .field("prf", &self.prf)
            .finish_non_exhaustive()
    }
}

impl DecodableFrom<Element> for Pbkdf2Params {}

impl Decoder<Element, Pbkdf2Params> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Pbkdf2Params> {
        let Element::Sequence(elements) = self else {
            return Err(Error::structure("PBKDF2-params", "expected SEQUENCE"));
        };
        let (salt, iterations, rest) = match elements.as_slice() {
            [Element::OctetString(salt), Element::Integer(iterations), rest @ ..] => {
                (salt, iterations, rest)
            }
            [Element::Sequence(_), ..] => {
                return Err(Error::structure(
                    "PBKDF2-params",
                    "salt from otherSource is not supported",
                ));
            }
            _ => {
                return Err(Error::structure(
                    "PBKDF2-params",
                    "expected salt OCTET STRING and iterationCount INTEGER",
                ));
            }
        };
        let iteration_count = iterations
            .to_u32()
            .filter(|count| (1..=MAX_ITERATION_COUNT).contains(count))
            .ok_or_else(|| Error::OutOfRange {
                field: "iterationCount",
                reason: iterations.to_string(),
            })?;

        let (key_length, prf) = match rest {
            [] => (None, None),
            [Element::Integer(length)] => (Some(length), None),
            [Element::Sequence(_)] => (None, rest.first()),
            [Element::Integer(length), prf @ Element::Sequence(_)] => (Some(length), Some(prf)),
            _ => {
                return Err(Error::structure(
                    "PBKDF2-params",
                    "unexpected keyLength or prf",
                ));
            }
        };
        let key_length = key_length
            .map(|length| {
                length
                    .to_u32()
                    .filter(|len| *len >= 1)
                    .map(|len| len as usize)
                    .ok_or_else(|| Error::OutOfRange {
                        field: "keyLength",
                        reason: length.to_string(),
                    })
            })
            .transpose()?;
        let prf = match prf {
            Some(element) => {
                let algorithm: AlgorithmIdentifier = element.decode()?;
                Prf::from_oid(&algorithm.algorithm)?
            }
            None => Prf::HmacWithSha1,
        };

        Ok(Pbkdf2Params {
            salt: salt.as_bytes().to_vec(),
            iteration_count,
            key_length,
            prf,
        })
    }
}

/// Parsed PBES2 parameters, ready to decrypt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pbes2Params {
    pub kdf: Pbkdf2Params,
    pub scheme: EncryptionScheme,
    pub iv: Vec<u8>,
}

impl Pbes2Params {
    /// Reads the parameters of a PBES2 AlgorithmIdentifier.
    pub fn from_algorithm(algorithm: &AlgorithmIdentifier) -> Result<Self> {
        if !algorithm.is(OID_PBES2) {
            return Err(Error::UnsupportedAlgorithm {
                context: "key encryption",
                oid: algorithm.algorithm.to_string(),
            });
        }
        match &algorithm.parameters {
            Some(AlgorithmParameters::Other(raw)) => raw.element().decode(),
            _ => Err(Error::structure("PBES2-params", "missing parameters")),
        }
    }

    /// Derives the key from `password` and decrypts `data`, returning the
    /// unpadded plaintext.
    pub fn decrypt(&self, password: &Password, data: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let key_len = self.scheme.key_len();
        if let Some(length) = self.kdf.key_length {
            if length != key_len {
                return Err(Error::OutOfRange {
                    field: "keyLength",
                    reason: format!("{} does not match {} ({} octets)", length, self.scheme, key_len),
                });
            }
        }
        if self.iv.len() != self.scheme.iv_len() {
            return Err(Error::OutOfRange {
                field: "IV",
                reason: format!("{} octets, {} needs {}", self.iv.len(), self.scheme, self.scheme.iv_len()),
            });
        }
        debug!(
            "PBES2 decrypt: {} with PBKDF2/{} x{}",
            self.scheme, self.kdf.prf, self.kdf.iteration_count
        );

        let mut key = Zeroizing::new(vec![0u8; key_len]);
        self.kdf.prf.derive(
            password.as_bytes(),
            &self.kdf.salt,
            self.kdf.iteration_count,
            &mut key,
        );
        let plaintext = self.scheme.decrypt(&key, &self.iv, data)?;
        Ok(Zeroizing::new(plaintext))
    }
}

impl DecodableFrom<Element> for Pbes2Params {}

impl Decoder<Element, Pbes2Params> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Pbes2Params> {
        let Element::Sequence(elements) = self else {
            return Err(Error::structure("PBES2-params", "expected SEQUENCE"));
        };
        let [kdf, scheme] = elements.as_slice() else {
            return Err(Error::structure(
                "PBES2-params",
                format!("expected 2 elements, got {}", elements.len()),
            ));
        };

        let kdf: AlgorithmIdentifier = kdf.decode()?;
        if !kdf.is(OID_PBKDF2) {
            return Err(Error::UnsupportedAlgorithm {
                context: "PBES2 key derivation",
                oid: kdf.algorithm.to_string(),
            });
        }
        let kdf: Pbkdf2Params = match &kdf.parameters {
            Some(AlgorithmParameters::Other(raw)) => raw.element().decode()?,
            _ => return Err(Error::structure("PBKDF2-params", "missing parameters")),
        };

        let scheme: AlgorithmIdentifier = scheme.decode()?;
        let iv = match &scheme.parameters {
            Some(AlgorithmParameters::Other(raw)) => match raw.element() {
                Element::OctetString(iv) => iv.as_bytes().to_vec(),
                _ => return Err(Error::structure("PBES2 encryption scheme", "IV must be an OCTET STRING")),
            },
            _ => return Err(Error::structure("PBES2 encryption scheme", "missing IV")),
        };
        let scheme = EncryptionScheme::from_oid(&scheme.algorithm)?;

        Ok(Pbes2Params { kdf, scheme, iv })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use kagi_asn1::{Integer, OctetString};
    use rstest::rstest;

    use super::*;

    fn oid(s: &str) -> Element {
        Element::ObjectIdentifier(ObjectIdentifier::from_str(s).unwrap())
    }

    fn salt() -> Element {
        Element::OctetString(OctetString::from(vec![0xaa; 8]))
    }

    fn int(n: u64) -> Element {
        Element::Integer(Integer::from(n))
    }

    fn prf(s: &str) -> Element {
        Element::Sequence(vec![oid(s), Element::Null])
    }

    #[rstest]
    #[case::defaults(vec![salt(), int(2048)], None, Prf::HmacWithSha1)]
    #[case::key_length(vec![salt(), int(2048), int(32)], Some(32), Prf::HmacWithSha1)]
    #[case::prf_only(vec![salt(), int(1), prf(Prf::OID_HMAC_WITH_SHA256)], None, Prf::HmacWithSha256)]
    #[case::everything(vec![salt(), int(10), int(16), prf(Prf::OID_HMAC_WITH_SHA512)], Some(16), Prf::HmacWithSha512)]
    #[case::iteration_cap(vec![salt(), int(u64::from(MAX_ITERATION_COUNT))], None, Prf::HmacWithSha1)]
    fn test_decode_pbkdf2_params(
        #[case] elements: Vec<Element>,
        #[case] key_length: Option<usize>,
        #[case] expected_prf: Prf,
    ) {
        let params: Pbkdf2Params = Element::Sequence(elements).decode().unwrap();
        assert_eq!(key_length, params.key_length);
        assert_eq!(expected_prf, params.prf);
    }

    #[rstest]
    #[case::zero_iterations(vec![salt(), int(0)])]
    #[case::too_many_iterations(vec![salt(), int(u64::from(MAX_ITERATION_COUNT) + 1)])]
    #[case::u32_max_iterations(vec![salt(), int(u64::from(u32::MAX))])]
    #[case::unknown_prf(vec![salt(), int(1), prf("1.2.840.113549.2.5")])]
    #[case::salt_source(vec![Element::Sequence(vec![]), int(1)])]
    #[case::trailing_garbage(vec![salt(), int(1), int(16), prf(Prf::OID_HMAC_WITH_SHA1), Element::Null])]
    fn test_decode_pbkdf2_params_invalid(#[case] elements: Vec<Element>) {
        let result: Result<Pbkdf2Params> = Element::Sequence(elements).decode();
        assert!(result.is_err());
    }

    #[test]
    fn test_iteration_count_above_cap_is_out_of_range() {
        let count = u64::from(MAX_ITERATION_COUNT) + 1;
        let result: Result<Pbkdf2Params> = Element::Sequence(vec![salt(), int(count)]).decode();

        assert!(matches!(
            result,
            Err(Error::OutOfRange { field: "iterationCount", .. })
        ));
    }

    fn pbes2(kdf_params: Vec<Element>, cipher: &str, iv_len: usize) -> Element {
        Element::Sequence(vec![
            Element::Sequence(vec![oid(OID_PBKDF2), Element::Sequence(kdf_params)]),
            Element::Sequence(vec![
                oid(cipher),
                Element::OctetString(OctetString::from(vec![0x01; iv_len])),
            ]),
        ])
    }

    #[test]
    fn test_key_length_must_match_cipher() {
        let params: Pbes2Params = pbes2(
            vec![salt(), int(1), int(16)],
            EncryptionScheme::OID_AES256_CBC,
            16,
        )
        .decode()
        .unwrap();

        let result = params.decrypt(&Password::from("pw"), &[0u8; 16]);
        assert!(matches!(result, Err(Error::OutOfRange { field: "keyLength", .. })));
    }

    #[test]
    fn test_iv_length_must_match_cipher() {
        let params: Pbes2Params = pbes2(vec![salt(), int(1)], EncryptionScheme::OID_DES_EDE3_CBC, 16)
            .decode()
            .unwrap();

        let result = params.decrypt(&Password::from("pw"), &[0u8; 16]);
        assert!(matches!(result, Err(Error::OutOfRange { field: "IV", .. })));
    }

    #[test]
    fn test_unsupported_cipher() {
        // rc2CBC
        let result: Result<Pbes2Params> = pbes2(vec![salt(), int(1)], "1.2.840.113549.3.2", 8).decode();
        assert!(matches!(result, Err(Error::UnsupportedAlgorithm { .. })));
    }

    #[test]
    fn test_ciphertext_not_block_aligned() {
        let params: Pbes2Params = pbes2(vec![salt(), int(1)], EncryptionScheme::OID_AES128_CBC, 16)
            .decode()
            .unwrap();

        let result = params.decrypt(&Password::from("pw"), &[0u8; 15]);
        assert!(matches!(result, Err(Error::Decryption(_))));
    }
}
