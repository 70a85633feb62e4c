//! TOML description of where a service's credentials live.
//!
//! ```toml
//! trust_store = "ca.pem"
//! certificate_chain = "server-chain.pem"
//! private_key = "server-key.pem"
//! private_key_password_env = "SERVER_KEY_PASSWORD"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use std::path::{Path, PathBuf};

use kagi_pkcs::Password;
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};
use crate::loader::read_ascii;
use crate::store::{CredentialStore, load_key_store, load_trust_store};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    pub trust_store: Option<PathBuf>,
    pub certificate_chain: Option<PathBuf>,
    pub private_key: Option<PathBuf>,
    #[serde(default, deserialize_with = "password")]
    pub private_key_password: Option<Password>,
    /// Environment variable holding the key password.
    pub private_key_password_env: Option<String>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

fn password<'de, D>(deserializer: D) -> std::result::Result<Option<Password>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(Password::from))
}

impl StoreConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = read_ascii(path)?;
        let mut config = Self::from_toml_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Parses a config whose relative paths are taken as they are.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// The literal password, or the value of the named environment
    /// variable. Setting both is rejected.
    pub fn password(&self) -> Result<Option<Password>> {
        match (&self.private_key_password, &self.private_key_password_env) {
            (Some(_), Some(_)) => Err(Error::Config(
                "set only one of private_key_password and private_key_password_env".to_string(),
            )),
            (Some(password), None) => Ok(Some(password.clone())),
            (None, Some(name)) => std::env::var(name)
                .map(|value| Some(Password::from(value)))
                .map_err(|e| Error::Config(format!("{name}: {e}"))),
            (None, None) => Ok(None),
        }
    }

    pub fn load_trust_store(&self) -> Result<CredentialStore> {
        load_trust_store(self.resolve("trust_store", &self.trust_store)?)
    }

    pub fn load_key_store(&self) -> Result<CredentialStore> {
        let chain = self.resolve("certificate_chain", &self.certificate_chain)?;
        let key = self.resolve("private_key", &self.private_key)?;
        let password = self.password()?;
        load_key_store(chain, key, password.as_ref())
    }

    fn resolve(&self, key: &str, path: &Option<PathBuf>) -> Result<PathBuf> {
        let path = path
            .as_deref()
            .ok_or_else(|| Error::Config(format!("{key} is not set")))?;
        Ok(match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        })
    }
}
