//! Trust stores and key stores assembled from PEM text.
//!
//! ```no_run
//! use kagi_credstore::{KEY_ALIAS, Password, load_key_store, load_trust_store};
//!
//! let roots = load_trust_store("ca.pem").unwrap();
//! for alias in roots.aliases() {
//!     println!("trusting {alias}");
//! }
//!
//! let password = Password::from("changeit");
//! let identity = load_key_store("chain.pem", "key.pem", Some(&password)).unwrap();
//! let entry = identity.key_entry(KEY_ALIAS).unwrap();
//! println!("{} key, {} certificate(s)", entry.private_key().family(), entry.chain().len());
//! ```
//!
//! With the default `rustls` feature, stores convert into
//! `rustls-pki-types` values.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
mod loader;
#[cfg(feature = "rustls")]
mod rustls;
mod store;

pub use config::StoreConfig;
pub use error::{CertificateError, Error, ErrorKind, Result};
pub use kagi_pkcs::{KeyFamily, Password, ResolvedPrivateKey, ResolvedPublicKey};
pub use kagi_x509::{Certificate, CertificateChain};
pub use loader::{
    decode_ascii, load_private_key, load_private_key_file, load_public_key, load_public_key_file, read_certificate_chain,
    read_certificate_chain_file,
};
pub use store::{
    CredentialStore, Entry, KEY_ALIAS, KeyEntry, build_key_store, build_key_store_from_pem, build_trust_store,
    load_key_store, load_trust_store,
};
