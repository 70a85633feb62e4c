use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod certs;
mod config;
mod error;
mod key;
mod output;
mod report;
mod store;
mod utils;

use error::Result;

#[derive(Parser)]
#[command(name = "kagi")]
#[command(about = "Load PEM trust stores, key stores and keys", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a trust store from a certificate file and list its entries
    TrustStore {
        #[command(flatten)]
        config: store::TrustStoreConfig,
    },
    /// Build a key store from a certificate chain and a private key
    KeyStore {
        #[command(flatten)]
        config: store::KeyStoreConfig,
    },
    /// Resolve a private key and show its algorithm and size
    PrivateKey {
        #[command(flatten)]
        config: key::PrivateKeyConfig,
    },
    /// Resolve a public key and show its algorithm and size
    PublicKey {
        #[command(flatten)]
        config: key::PublicKeyConfig,
    },
    /// List the certificates of a PEM file
    Certs {
        #[command(flatten)]
        config: certs::CertsConfig,
    },
    /// Load the stores described by a TOML config file
    Config {
        #[command(flatten)]
        config: config::LoadConfig,
    },
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::TrustStore { config } => store::trust_store(config),
        Commands::KeyStore { config } => store::key_store(config),
        Commands::PrivateKey { config } => key::private_key(config),
        Commands::PublicKey { config } => key::public_key(config),
        Commands::Certs { config } => certs::execute(config),
        Commands::Config { config } => config::execute(config),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
