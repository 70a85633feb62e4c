use clap::Args;
use kagi_credstore::{KEY_ALIAS, build_trust_store, load_key_store, load_trust_store, read_certificate_chain};

use crate::error::{Error, Result};
use crate::output::{OutputFormat, print};
use crate::report::{KeyStoreReport, TrustStoreReport};
use crate::utils::{password, read_stdin};

#[derive(Args)]
pub(crate) struct TrustStoreConfig {
    /// PEM file with one or more certificates. If not specified, reads from stdin
    file: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,
}

pub(crate) fn trust_store(config: TrustStoreConfig) -> Result<()> {
    let store = match config.file.as_deref() {
        Some(path) => load_trust_store(path)?,
        None => build_trust_store(&read_certificate_chain(&read_stdin()?)?),
    };
    print(&TrustStoreReport::from(&store), config.output)
}

#[derive(Args)]
pub(crate) struct KeyStoreConfig {
    /// PEM certificate chain, end-entity certificate first
    #[arg(long)]
    cert: String,

    /// PEM private key (PKCS#8, optionally encrypted)
    #[arg(long)]
    key: String,

    #[command(flatten)]
    password: PasswordArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,
}

#[derive(Args)]
pub(crate) struct PasswordArgs {
    /// Password of an encrypted private key
    #[arg(long, conflicts_with = "password_env")]
    password: Option<String>,

    /// Environment variable holding the private key password
    #[arg(long)]
    password_env: Option<String>,
}

impl PasswordArgs {
    pub(crate) fn resolve(&self) -> Result<Option<kagi_credstore::Password>> {
        password(self.password.as_deref(), self.password_env.as_deref())
    }
}

pub(crate) fn key_store(config: KeyStoreConfig) -> Result<()> {
    let password = config.password.resolve()?;
    let store = load_key_store(&config.cert, &config.key, password.as_ref())?;
    let entry = store
        .key_entry(KEY_ALIAS)
        .ok_or_else(|| Error::InvalidInput(format!("no {KEY_ALIAS} entry")))?;
    print(&KeyStoreReport::new(KEY_ALIAS, entry), config.output)
}
