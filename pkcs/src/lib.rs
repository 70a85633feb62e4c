//! Private and public key containers and their resolution to a key family.
//!
//! - [`pkcs8`]: PrivateKeyInfo and the PBES2-encrypted envelope
//! - [`pkcs1`], [`sec1`], [`dsa`]: the per-family key structures carried
//!   inside PKCS#8 and SubjectPublicKeyInfo
//! - [`resolver`]: tries RSA, EC and DSA in order and reports which one
//!   accepted the key
//!
//! ```no_run
//! use kagi_pkcs::{Password, resolve_private_key};
//!
//! # let der: Vec<u8> = Vec::new();
//! let key = resolve_private_key(&der, Some(&Password::from("changeit"))).unwrap();
//! println!("{} {} bits", key.family(), key.key_size());
//! ```

#![forbid(unsafe_code)]

pub mod dsa;
pub mod error;
mod password;
pub mod pkcs1;
pub mod pkcs8;
pub mod resolver;
pub mod sec1;

pub use error::{Attempt, Error, Result};
pub use password::Password;
pub use resolver::{
    KeyFamily, ResolvedPrivateKey, ResolvedPublicKey, resolve_private_key, resolve_public_key,
};
