use clap::Args;
use kagi_credstore::{KEY_ALIAS, StoreConfig};
use log::info;

use crate::error::Result;
use crate::output::{OutputFormat, print};
use crate::report::{ConfigReport, KeyStoreReport, TrustStoreReport};

#[derive(Args)]
pub(crate) struct LoadConfig {
    /// TOML file naming the trust store, certificate chain and private key
    file: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,
}

pub(crate) fn execute(config: LoadConfig) -> Result<()> {
    let store_config = StoreConfig::from_file(&config.file)?;

    let trust_store = if store_config.trust_store.is_some() {
        Some(TrustStoreReport::from(&store_config.load_trust_store()?))
    } else {
        info!("{}: no trust store", config.file);
        None
    };
    let key_store = if store_config.certificate_chain.is_some() || store_config.private_key.is_some() {
        let store = store_config.load_key_store()?;
        store.key_entry(KEY_ALIAS).map(|entry| KeyStoreReport::new(KEY_ALIAS, entry))
    } else {
        info!("{}: no key store", config.file);
        None
    };

    print(&ConfigReport { trust_store, key_store }, config.output)
}
