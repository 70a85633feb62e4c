use clap::Args;
use kagi_credstore::{load_private_key, load_private_key_file, load_public_key, load_public_key_file};

use crate::error::Result;
use crate::output::{OutputFormat, print};
use crate::report::KeyReport;
use crate::store::PasswordArgs;
use crate::utils::read_stdin;

#[derive(Args)]
pub(crate) struct PrivateKeyConfig {
    /// PEM private key file. If not specified, reads from stdin
    file: Option<String>,

    #[command(flatten)]
    password: PasswordArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,
}

pub(crate) fn private_key(config: PrivateKeyConfig) -> Result<()> {
    let password = config.password.resolve()?;
    let key = match config.file.as_deref() {
        Some(path) => load_private_key_file(path, password.as_ref())?,
        None => load_private_key(&read_stdin()?, password.as_ref())?,
    };
    print(&KeyReport::from(&key), config.output)
}

#[derive(Args)]
pub(crate) struct PublicKeyConfig {
    /// PEM public key file. If not specified, reads from stdin
    file: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,
}

pub(crate) fn public_key(config: PublicKeyConfig) -> Result<()> {
    let key = match config.file.as_deref() {
        Some(path) => load_public_key_file(path)?,
        None => load_public_key(&read_stdin()?)?,
    };
    print(&KeyReport::from(&key), config.output)
}
