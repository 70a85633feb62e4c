//! Resolves PKCS#8 and SubjectPublicKeyInfo bytes to a key family.
//!
//! The outer AlgorithmIdentifier names the algorithm, but producers do not
//! all agree on it (RSASSA-PSS keys, for one), so each family's constructor
//! is tried in a fixed order and the first one that builds a valid key
//! wins. Failed attempts are kept for diagnostics.

use std::fmt;

use kagi::decoder::Decoder;
use kagi_pkix_types::{
    AlgorithmIdentifier, AlgorithmParameters, DsaParameters, NamedCurve, OidName,
    SubjectPublicKeyInfo, decode_der_to_element,
};
use log::debug;
use zeroize::Zeroizing;

use crate::Password;
use crate::dsa::{DsaPrivateKey, DsaPublicKey};
use crate::error::{Attempt, Error, Result};
use crate::pkcs1::{RSAPrivateKey, RSAPublicKey};
use crate::pkcs8::{EncryptedPrivateKeyInfo, PrivateKeyInfo};
use crate::sec1::{ECPrivateKey, validate_point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyFamily {
    Rsa,
    Ec,
    Dsa,
}

impl KeyFamily {
    pub fn name(&self) -> &'static str {
        match self {
            KeyFamily::Rsa => "RSA",
            KeyFamily::Ec => "EC",
            KeyFamily::Dsa => "DSA",
        }
    }
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Size and curve of a key that one family accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KeyDetails {
    key_size: u32,
    curve: Option<NamedCurve>,
}

type Constructor = fn(&[u8]) -> Result<KeyDetails>;

const PRIVATE_KEY_CONSTRUCTORS: [(KeyFamily, Constructor); 3] = [
    (KeyFamily::Rsa, rsa_private_key),
    (KeyFamily::Ec, ec_private_key),
    (KeyFamily::Dsa, dsa_private_key),
];

const PUBLIC_KEY_CONSTRUCTORS: [(KeyFamily, Constructor); 3] = [
    (KeyFamily::Rsa, rsa_public_key),
    (KeyFamily::Ec, ec_public_key),
    (KeyFamily::Dsa, dsa_public_key),
];

/// A private key accepted by one family, with its plaintext PKCS#8 DER.
#[derive(Clone)]
pub struct ResolvedPrivateKey {
    family: KeyFamily,
    key_size: u32,
    curve: Option<NamedCurve>,
    der: Zeroizing<Vec<u8>>,
}

impl ResolvedPrivateKey {
    pub fn family(&self) -> KeyFamily {
        self.family
    }

    pub fn key_size(&self) -> u32 {
        self.key_size
    }

    pub fn curve(&self) -> Option<NamedCurve> {
        self.curve
    }

    /// Plaintext PKCS#8 PrivateKeyInfo.
    pub fn pkcs8_der(&self) -> &[u8] {
        &self.der
    }
}

impl fmt::Debug for ResolvedPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedPrivateKey")
            .field("family", &self.family)
            .field("key_size", &self.key_size)
            .field("curve", &self.curve)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPublicKey {
    family: KeyFamily,
    key_size: u32,
    curve: Option<NamedCurve>,
    der: Vec<u8>,
}

impl ResolvedPublicKey {
    pub fn family(&self) -> KeyFamily {
        self.family
    }

    pub fn key_size(&self) -> u32 {
        self.key_size
    }

    pub fn curve(&self) -> Option<NamedCurve> {
        self.curve
    }

    pub fn subject_public_key_info_der(&self) -> &[u8] {
        &self.der
    }
}

/// Builds a private key from PKCS#8 bytes, decrypting them first when a
/// non-empty password is given.
pub fn resolve_private_key(der: &[u8], password: Option<&Password>) -> Result<ResolvedPrivateKey> {
    let plaintext = match password.filter(|password| !password.is_empty()) {
        Some(password) => EncryptedPrivateKeyInfo::from_der(der)?.decrypt(password)?,
        None => Zeroizing::new(der.to_vec()),
    };
    let (family, details) = first_match(&PRIVATE_KEY_CONSTRUCTORS, &plaintext)?;
    Ok(ResolvedPrivateKey {
        family,
        key_size: details.key_size,
        curve: details.curve,
        der: plaintext,
    })
}

/// Builds a public key from SubjectPublicKeyInfo bytes.
pub fn resolve_public_key(der: &[u8]) -> Result<ResolvedPublicKey> {
    let (family, details) = first_match(&PUBLIC_KEY_CONSTRUCTORS, der)?;
    Ok(ResolvedPublicKey {
        family,
        key_size: details.key_size,
        curve: details.curve,
        der: der.to_vec(),
    })
}

fn first_match(constructors: &[(KeyFamily, Constructor)], der: &[u8]) -> Result<(KeyFamily, KeyDetails)> {
    let mut attempts = Vec::with_capacity(constructors.len());
    for (family, construct) in constructors {
        match construct(der) {
            Ok(details) => return Ok((*family, details)),
            Err(e) => {
                debug!("{} key attempt failed: {}", family, e);
                attempts.push(Attempt {
                    family: *family,
                    reason: e.to_string(),
                });
            }
        }
    }
    Err(Error::NoAlgorithmMatched(attempts))
}

fn expect_algorithm(algorithm: &AlgorithmIdentifier, expected: &'static str, oids: &[&str]) -> Result<()> {
    if oids.iter().any(|oid| algorithm.is(oid)) {
        Ok(())
    } else {
        Err(Error::AlgorithmMismatch {
            expected,
            found: algorithm
                .oid_name()
                .map(str::to_string)
                .unwrap_or_else(|| algorithm.algorithm.to_string()),
        })
    }
}

const RSA_OIDS: &[&str] = &[
    AlgorithmIdentifier::OID_RSA_ENCRYPTION,
    AlgorithmIdentifier::OID_RSASSA_PSS,
];

fn check_rsa_parameters(algorithm: &AlgorithmIdentifier) -> Result<()> {
    // rsaEncryption takes NULL; PSS may carry RSASSA-PSS-params.
    if algorithm.is(AlgorithmIdentifier::OID_RSA_ENCRYPTION)
        && matches!(algorithm.parameters, Some(AlgorithmParameters::Other(_)))
    {
        return Err(Error::structure("rsaEncryption", "parameters must be NULL"));
    }
    Ok(())
}

fn rsa_private_key(der: &[u8]) -> Result<KeyDetails> {
    let info = PrivateKeyInfo::from_der(der)?;
    expect_algorithm(&info.private_key_algorithm, "RSA", RSA_OIDS)?;
    check_rsa_parameters(&info.private_key_algorithm)?;
    let key: RSAPrivateKey = info.private_key_element()?.decode()?;
    Ok(KeyDetails {
        key_size: key.key_size(),
        curve: None,
    })
}

fn ec_private_key(der: &[u8]) -> Result<KeyDetails> {
    let info = PrivateKeyInfo::from_der(der)?;
    expect_algorithm(
        &info.private_key_algorithm,
        "EC",
        &[AlgorithmIdentifier::OID_EC_PUBLIC_KEY],
    )?;
    let curve: NamedCurve = info.private_key_algorithm.parameter()?;
    let key: ECPrivateKey = info.private_key_element()?.decode()?;
    key.validate(curve)?;
    Ok(KeyDetails {
        key_size: curve.order_bits(),
        curve: Some(curve),
    })
}

fn dsa_private_key(der: &[u8]) -> Result<KeyDetails> {
    let info = PrivateKeyInfo::from_der(der)?;
    expect_algorithm(
        &info.private_key_algorithm,
        "DSA",
        &[AlgorithmIdentifier::OID_ID_DSA],
    )?;
    let params: DsaParameters = info.private_key_algorithm.parameter()?;
    let key: DsaPrivateKey = info.private_key_element()?.decode()?;
    key.validate(&params)?;
    Ok(KeyDetails {
        key_size: params.p.bits() as u32,
        curve: None,
    })
}

fn subject_public_key_info(der: &[u8]) -> Result<SubjectPublicKeyInfo> {
    Ok(decode_der_to_element(der)?.decode()?)
}

fn rsa_public_key(der: &[u8]) -> Result<KeyDetails> {
    let spki = subject_public_key_info(der)?;
    expect_algorithm(spki.algorithm(), "RSA", RSA_OIDS)?;
    check_rsa_parameters(spki.algorithm())?;
    let key: RSAPublicKey = decode_der_to_element(spki.key_bytes()?)?.decode()?;
    Ok(KeyDetails {
        key_size: key.key_size(),
        curve: None,
    })
}

fn ec_public_key(der: &[u8]) -> Result<KeyDetails> {
    let spki = subject_public_key_info(der)?;
    expect_algorithm(spki.algorithm(), "EC", &[AlgorithmIdentifier::OID_EC_PUBLIC_KEY])?;
    let curve: NamedCurve = spki.algorithm().parameter()?;
    validate_point(curve, spki.key_bytes()?)?;
    Ok(KeyDetails {
        key_size: curve.order_bits(),
        curve: Some(curve),
    })
}

fn dsa_public_key(der: &[u8]) -> Result<KeyDetails> {
    let spki = subject_public_key_info(der)?;
    expect_algorithm(spki.algorithm(), "DSA", &[AlgorithmIdentifier::OID_ID_DSA])?;
    let params: DsaParameters = spki.algorithm().parameter()?;
    let key: DsaPublicKey = decode_der_to_element(spki.key_bytes()?)?.decode()?;
    key.validate(&params)?;
    Ok(KeyDetails {
        key_size: params.p.bits() as u32,
        curve: None,
    })
}

#[cfg(test)]
mod tests {
    use kagi_pem::Category;
    use rstest::rstest;

    use super::*;

    fn block_der(text: &str, category: Category) -> Vec<u8> {
        let block = kagi_pem::find_blocks(text, category).unwrap().next().unwrap();
        block.decode().unwrap()
    }

    const RSA_KEY: &str = include_str!("../../testdata/rsa_key.pem");
    const EC_KEY: &str = include_str!("../../testdata/ec_key.pem");
    const DSA_KEY: &str = include_str!("../../testdata/dsa_key.pem");

    #[rstest]
    #[case::rsa(RSA_KEY, KeyFamily::Rsa, 2048, None)]
    #[case::ec(EC_KEY, KeyFamily::Ec, 256, Some(NamedCurve::Secp256r1))]
    #[case::dsa(DSA_KEY, KeyFamily::Dsa, 2048, None)]
    fn test_resolve_private_key(
        #[case] text: &str,
        #[case] family: KeyFamily,
        #[case] key_size: u32,
        #[case] curve: Option<NamedCurve>,
    ) {
        let der = block_der(text, Category::PrivateKey);
        let key = resolve_private_key(&der, None).unwrap();

        assert_eq!(family, key.family());
        assert_eq!(key_size, key.key_size());
        assert_eq!(curve, key.curve());
        assert_eq!(der.as_slice(), key.pkcs8_der());
    }

    #[rstest]
    #[case::rsa(include_str!("../../testdata/rsa_pub.pem"), KeyFamily::Rsa, 2048)]
    #[case::ec(include_str!("../../testdata/ec_pub.pem"), KeyFamily::Ec, 256)]
    #[case::dsa(include_str!("../../testdata/dsa_pub.pem"), KeyFamily::Dsa, 2048)]
    fn test_resolve_public_key(#[case] text: &str, #[case] family: KeyFamily, #[case] key_size: u32) {
        let key = resolve_public_key(&block_der(text, Category::PublicKey)).unwrap();
        assert_eq!(family, key.family());
        assert_eq!(key_size, key.key_size());
    }

    #[rstest]
    #[case::aes256(include_str!("../../testdata/rsa_key_encrypted.pem"), KeyFamily::Rsa)]
    #[case::des3(include_str!("../../testdata/ec_key_encrypted.pem"), KeyFamily::Ec)]
    #[case::aes128(include_str!("../../testdata/ec_key_encrypted_aes128.pem"), KeyFamily::Ec)]
    fn test_resolve_encrypted(#[case] text: &str, #[case] family: KeyFamily) {
        let der = block_der(text, Category::PrivateKey);
        let key = resolve_private_key(&der, Some(&Password::from("changeit"))).unwrap();
        assert_eq!(family, key.family());
        assert_ne!(der.as_slice(), key.pkcs8_der());
    }

    #[test]
    fn test_wrong_password() {
        let der = block_der(include_str!("../../testdata/rsa_key_encrypted.pem"), Category::PrivateKey);
        assert!(resolve_private_key(&der, Some(&Password::from("not-it"))).is_err());
    }

    #[test]
    fn test_encrypted_without_password_tries_every_family() {
        let der = block_der(include_str!("../../testdata/rsa_key_encrypted.pem"), Category::PrivateKey);
        for password in [None, Some(Password::default())] {
            let err = resolve_private_key(&der, password.as_ref()).unwrap_err();
            assert_eq!(err.to_string(), "no algorithm matched key material");
            assert_eq!(err.attempts().len(), 3);
        }
    }

    #[test]
    fn test_password_on_plaintext_key() {
        let der = block_der(RSA_KEY, Category::PrivateKey);
        assert!(resolve_private_key(&der, Some(&Password::from("changeit"))).is_err());
    }

    #[test]
    fn test_dsa_tried_after_rsa_and_ec() {
        // Resolution succeeds, and RSA and EC reject the key on its algorithm.
        let der = block_der(DSA_KEY, Category::PrivateKey);
        assert!(rsa_private_key(&der).is_err());
        assert!(ec_private_key(&der).is_err());
        assert_eq!(resolve_private_key(&der, None).unwrap().family(), KeyFamily::Dsa);
    }

    #[test]
    fn test_pkcs1_key_lists_attempts_in_order() {
        let der = block_der(include_str!("../../testdata/rsa_key_pkcs1.pem"), Category::PrivateKey);
        let err = resolve_private_key(&der, None).unwrap_err();

        let families = err.attempts().iter().map(|a| a.family).collect::<Vec<_>>();
        assert_eq!(families, vec![KeyFamily::Rsa, KeyFamily::Ec, KeyFamily::Dsa]);
    }

    #[test]
    fn test_public_key_resolves_like_private_key() {
        let public = resolve_public_key(&block_der(
            include_str!("../../testdata/ec_pub.pem"),
            Category::PublicKey,
        ))
        .unwrap();
        let private = resolve_private_key(&block_der(EC_KEY, Category::PrivateKey), None).unwrap();
        assert_eq!(public.family(), private.family());
        assert_eq!(public.curve(), private.curve());
    }

    #[test]
    fn test_private_key_is_not_a_public_key() {
        let err = resolve_public_key(&block_der(RSA_KEY, Category::PrivateKey)).unwrap_err();
        assert!(matches!(err, Error::NoAlgorithmMatched(_)));
    }

    #[test]
    fn test_debug_hides_key_material() {
        let key = resolve_private_key(&block_der(EC_KEY, Category::PrivateKey), None).unwrap();
        let debug = format!("{:?}", key);
        assert!(debug.starts_with("ResolvedPrivateKey { family: Ec"));
        assert!(!debug.contains("der"));
    }
}
