//! PKCS#8 private key containers
//!
//! - [`PrivateKeyInfo`]: [RFC 5208](https://datatracker.ietf.org/doc/html/rfc5208) /
//!   [RFC 5958](https://datatracker.ietf.org/doc/html/rfc5958) OneAsymmetricKey
//! - [`EncryptedPrivateKeyInfo`]: the password-protected envelope, decrypted
//!   with [PBES2](pbes2)

mod encrypted;
pub mod pbes2;
mod private_key_info;

pub use encrypted::EncryptedPrivateKeyInfo;
pub use private_key_info::PrivateKeyInfo;
