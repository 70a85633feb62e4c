//! Conversions into the `rustls-pki-types` shapes a TLS config takes.

use rustls_pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};

use crate::store::{CredentialStore, KeyEntry};

impl CredentialStore {
    /// Trusted certificates, in alias order.
    pub fn root_certificates(&self) -> Vec<CertificateDer<'static>> {
        self.trusted_certificates()
            .map(|(_, certificate)| CertificateDer::from(certificate))
            .collect()
    }
}

impl KeyEntry {
    pub fn certificate_chain_der(&self) -> Vec<CertificateDer<'static>> {
        self.chain().iter().map(CertificateDer::from).collect()
    }

    pub fn private_key_der(&self) -> PrivateKeyDer<'static> {
        PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.private_key().pkcs8_der().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KEY_ALIAS, build_key_store_from_pem, build_trust_store};

    const CHAIN: &str = include_str!("../../testdata/chain.pem");

    #[test]
    fn test_root_certificates() {
        let chain = crate::read_certificate_chain(CHAIN).unwrap();
        let roots = build_trust_store(&chain).root_certificates();

        assert_eq!(2, roots.len());
        // "CN=Kagi Test Root CA..." sorts before "CN=localhost..."
        assert_eq!(chain.as_slice()[1].der(), roots[0].as_ref());
        assert_eq!(chain.as_slice()[0].der(), roots[1].as_ref());
    }

    #[test]
    fn test_key_entry_der() {
        let store = build_key_store_from_pem(CHAIN, include_str!("../../testdata/ec_key.pem"), None).unwrap();
        let entry = store.key_entry(KEY_ALIAS).unwrap();

        let chain = entry.certificate_chain_der();
        assert_eq!(2, chain.len());
        assert_eq!(entry.chain().as_slice()[0].der(), chain[0].as_ref());
        let PrivateKeyDer::Pkcs8(key) = entry.private_key_der() else {
            panic!("expected a PKCS#8 key");
        };
        assert_eq!(entry.private_key().pkcs8_der(), key.secret_pkcs8_der());
    }
}
