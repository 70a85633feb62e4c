//! Text and file loaders for certificate chains and keys.
//!
//! Files are read in one call and interpreted as US-ASCII. Non-ASCII bytes
//! become U+FFFD, which no block boundary can contain.

use std::path::Path;

use kagi_pem::{Category, PemBlock};
use kagi_pkcs::{Password, ResolvedPrivateKey, ResolvedPublicKey};
use kagi_x509::CertificateChain;
use log::{debug, warn};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Reads every certificate in `text`, in order. No certificates is not an
/// error here.
pub fn read_certificate_chain(text: &str) -> Result<CertificateChain> {
    Ok(CertificateChain::from_pem(text)?)
}

pub fn read_certificate_chain_file(path: impl AsRef<Path>) -> Result<CertificateChain> {
    read_certificate_chain(&read_ascii(path)?)
}

/// Resolves the first PRIVATE KEY block of `text`.
///
/// With a non-empty `password` the block must hold an
/// EncryptedPrivateKeyInfo; without one it must be a plain PKCS#8
/// PrivateKeyInfo.
pub fn load_private_key(text: &str, password: Option<&Password>) -> Result<ResolvedPrivateKey> {
    let block = first_block(text, Category::PrivateKey)?
        .ok_or_else(|| Error::Parse("did not find a private key".to_string()))?;
    if block.is_encrypted() && password.is_none_or(Password::is_empty) {
        warn!("{} block given without a password", block.label());
    }
    let der = Zeroizing::new(kagi_pem::decode_base64(block.base64_payload())?);
    Ok(kagi_pkcs::resolve_private_key(&der, password)?)
}

pub fn load_private_key_file(path: impl AsRef<Path>, password: Option<&Password>) -> Result<ResolvedPrivateKey> {
    let text = Zeroizing::new(read_ascii(path)?);
    load_private_key(&text, password)
}

/// Resolves the first PUBLIC KEY block of `text`.
pub fn load_public_key(text: &str) -> Result<ResolvedPublicKey> {
    let block = first_block(text, Category::PublicKey)?
        .ok_or_else(|| Error::Parse("did not find a public key".to_string()))?;
    let der = kagi_pem::decode_base64(block.base64_payload())?;
    Ok(kagi_pkcs::resolve_public_key(&der)?)
}

pub fn load_public_key_file(path: impl AsRef<Path>) -> Result<ResolvedPublicKey> {
    load_public_key(&read_ascii(path)?)
}

fn first_block(text: &str, category: Category) -> Result<Option<PemBlock>> {
    let block = kagi_pem::find_blocks(text, category)?.next();
    if let Some(block) = &block {
        debug!("using {} block at {:?}", block.label(), block.source_range());
    }
    Ok(block)
}

pub(crate) fn read_ascii(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| Error::io(path, source))?;
    debug!("read {} bytes from {}", bytes.len(), path.display());
    Ok(decode_ascii(&bytes))
}

/// Reads `bytes` as US-ASCII. Any other byte becomes U+FFFD, which no block
/// boundary can contain.
pub fn decode_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { char::from(b) } else { char::REPLACEMENT_CHARACTER })
        .collect()
}
