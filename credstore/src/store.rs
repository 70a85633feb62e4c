//! Trust stores and key stores.
//!
//! A [`CredentialStore`] is an alias-keyed map. Trust stores hold one
//! [`Entry::TrustedCertificate`] per distinct subject, aliased by the
//! subject's RFC 2253 string. Key stores hold a single [`Entry::PrivateKey`]
//! under [`KEY_ALIAS`].

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::path::Path;

use kagi_pkcs::{Password, ResolvedPrivateKey};
use kagi_x509::{Certificate, CertificateChain};
use log::{debug, warn};

use crate::error::{CertificateError, Error, Result};
use crate::loader::{
    load_private_key, load_private_key_file, read_certificate_chain, read_certificate_chain_file,
};

/// Alias of the only entry in a key store.
pub const KEY_ALIAS: &str = "key";

#[derive(Debug, Clone)]
pub enum Entry {
    TrustedCertificate(Certificate),
    PrivateKey(KeyEntry),
}

/// A private key, the password it was protected with and the chain that
/// goes with it, end-entity first.
#[derive(Debug, Clone)]
pub struct KeyEntry {
    private_key: ResolvedPrivateKey,
    password: Option<Password>,
    chain: CertificateChain,
}

impl KeyEntry {
    pub fn private_key(&self) -> &ResolvedPrivateKey {
        &self.private_key
    }

    /// Kept so a consumer can protect the key again.
    pub fn password(&self) -> Option<&Password> {
        self.password.as_ref()
    }

    pub fn chain(&self) -> &CertificateChain {
        &self.chain
    }
}

#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    entries: BTreeMap<String, Entry>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry under `alias`, returning the old one.
    pub fn insert(&mut self, alias: impl Into<String>, entry: Entry) -> Option<Entry> {
        self.entries.insert(alias.into(), entry)
    }

    pub fn get(&self, alias: &str) -> Option<&Entry> {
        self.entries.get(alias)
    }

    pub fn trusted_certificates(&self) -> impl Iterator<Item = (&str, &Certificate)> {
        self.entries.iter().filter_map(|(alias, entry)| match entry {
            Entry::TrustedCertificate(certificate) => Some((alias.as_str(), certificate)),
            Entry::PrivateKey(_) => None,
        })
    }

    pub fn key_entry(&self, alias: &str) -> Option<&KeyEntry> {
        match self.entries.get(alias)? {
            Entry::PrivateKey(entry) => Some(entry),
            Entry::TrustedCertificate(_) => None,
        }
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a CredentialStore {
    type Item = (&'a String, &'a Entry);
    type IntoIter = btree_map::Iter<'a, String, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// One trusted entry per certificate, aliased by subject. A later
/// certificate with the same subject replaces the earlier one. An empty
/// chain gives an empty store.
pub fn build_trust_store(chain: &CertificateChain) -> CredentialStore {
    let mut store = CredentialStore::new();
    for certificate in chain {
        let alias = certificate.subject_rfc2253();
        debug!("trusting {alias}");
        if store
            .insert(alias.clone(), Entry::TrustedCertificate(certificate.clone()))
            .is_some()
        {
            warn!("duplicate subject {alias}, keeping the later certificate");
        }
    }
    store
}

/// Pairs `private_key` with `chain` under [`KEY_ALIAS`]. The chain must
/// hold at least the end-entity certificate.
pub fn build_key_store(
    chain: CertificateChain,
    private_key: ResolvedPrivateKey,
    password: Option<&Password>,
) -> Result<CredentialStore> {
    if chain.is_empty() {
        return Err(CertificateError::Empty { path: None }.into());
    }
    Ok(key_store(chain, private_key, password))
}

pub fn build_key_store_from_pem(
    chain_text: &str,
    key_text: &str,
    password: Option<&Password>,
) -> Result<CredentialStore> {
    let private_key = load_private_key(key_text, password)?;
    let chain = read_certificate_chain(chain_text)?;
    build_key_store(chain, private_key, password)
}

pub fn load_trust_store(path: impl AsRef<Path>) -> Result<CredentialStore> {
    let chain = read_certificate_chain_file(path)?;
    Ok(build_trust_store(&chain))
}

/// Loads the key first, then the chain, and fails on an empty chain with
/// the chain file in the message.
pub fn load_key_store(
    chain_path: impl AsRef<Path>,
    key_path: impl AsRef<Path>,
    password: Option<&Password>,
) -> Result<CredentialStore> {
    let private_key = load_private_key_file(key_path, password)?;
    let chain_path = chain_path.as_ref();
    let chain = read_certificate_chain_file(chain_path)?;
    if chain.is_empty() {
        return Err(Error::from(CertificateError::Empty {
            path: Some(chain_path.to_path_buf()),
        }));
    }
    Ok(key_store(chain, private_key, password))
}

fn key_store(chain: CertificateChain, private_key: ResolvedPrivateKey, password: Option<&Password>) -> CredentialStore {
    debug!(
        "key entry: {} {} bits, {} certificate(s)",
        private_key.family(),
        private_key.key_size(),
        chain.len()
    );
    let mut store = CredentialStore::new();
    store.insert(
        KEY_ALIAS,
        Entry::PrivateKey(KeyEntry {
            private_key,
            password: password.cloned(),
            chain,
        }),
    );
    store
}

#[cfg(test)]
mod tests {
    use kagi_pkcs::KeyFamily;
    use rstest::rstest;

    use super::*;
    use crate::error::ErrorKind;

    const CA: &str = include_str!("../../testdata/ca.pem");
    const LEAF: &str = include_str!("../../testdata/leaf.pem");
    const CHAIN: &str = include_str!("../../testdata/chain.pem");
    const RSA_KEY: &str = include_str!("../../testdata/rsa_key.pem");

    const CA_SUBJECT: &str = "CN=Kagi Test Root CA,O=Kagi Test,C=JP";
    const LEAF_SUBJECT: &str = "CN=localhost,OU=Platform,O=Example\\, Inc.,ST=Tokyo,C=JP";

    fn chain(text: &str) -> CertificateChain {
        read_certificate_chain(text).unwrap()
    }

    #[rstest]
    #[case::empty("", vec![])]
    #[case::single(CA, vec![CA_SUBJECT])]
    #[case::chain(CHAIN, vec![CA_SUBJECT, LEAF_SUBJECT])]
    #[case::duplicates(&[CA, LEAF, CA].concat(), vec![CA_SUBJECT, LEAF_SUBJECT])]
    fn test_build_trust_store(#[case] text: &str, #[case] expected: Vec<&str>) {
        let store = build_trust_store(&chain(text));

        assert_eq!(expected, store.aliases().collect::<Vec<_>>());
        assert_eq!(expected.len(), store.trusted_certificates().count());
        assert!(store.key_entry(KEY_ALIAS).is_none());
    }

    #[test]
    fn test_trust_store_last_write_wins() {
        let first = chain(CA).into_vec().remove(0);
        let mut store = CredentialStore::new();
        store.insert(CA_SUBJECT, Entry::TrustedCertificate(first));
        let leaf = chain(LEAF).into_vec().remove(0);
        let replaced = store.insert(CA_SUBJECT, Entry::TrustedCertificate(leaf.clone()));

        assert!(matches!(replaced, Some(Entry::TrustedCertificate(_))));
        let (_, kept) = store.trusted_certificates().next().unwrap();
        assert_eq!(&leaf, kept);
    }

    #[test]
    fn test_build_key_store_from_pem() {
        let store = build_key_store_from_pem(LEAF, RSA_KEY, None).unwrap();

        assert_eq!(vec![KEY_ALIAS], store.aliases().collect::<Vec<_>>());
        let entry = store.key_entry(KEY_ALIAS).unwrap();
        assert_eq!(KeyFamily::Rsa, entry.private_key().family());
        assert_eq!(1, entry.chain().len());
        assert!(entry.password().is_none());
        assert_eq!(0, store.trusted_certificates().count());
    }

    #[test]
    fn test_key_store_keeps_chain_order_and_password() {
        let password = Password::from("changeit");
        let store = build_key_store_from_pem(
            CHAIN,
            include_str!("../../testdata/rsa_key_encrypted.pem"),
            Some(&password),
        )
        .unwrap();
        let entry = store.key_entry(KEY_ALIAS).unwrap();

        let subjects = entry.chain().iter().map(Certificate::subject_rfc2253).collect::<Vec<_>>();
        assert_eq!(vec![LEAF_SUBJECT, CA_SUBJECT], subjects);
        assert_eq!(Some(&password), entry.password());
    }

    #[test]
    fn test_key_store_requires_certificate() {
        let error = build_key_store_from_pem("no certificates", RSA_KEY, None).unwrap_err();

        assert_eq!(ErrorKind::Certificate, error.kind());
        assert_eq!("Certificate file does not contain any certificates", error.to_string());
    }

    #[test]
    fn test_key_store_reports_missing_key_before_empty_chain() {
        let error = build_key_store_from_pem("", "", None).unwrap_err();
        assert_eq!(ErrorKind::Parse, error.kind());
    }
}
