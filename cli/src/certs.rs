use clap::Args;
use kagi_credstore::{read_certificate_chain, read_certificate_chain_file};

use crate::error::Result;
use crate::output::{OutputFormat, print};
use crate::report::CertificatesReport;
use crate::utils::read_stdin;

#[derive(Args)]
pub(crate) struct CertsConfig {
    /// PEM file with one or more certificates. If not specified, reads from stdin
    file: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,
}

pub(crate) fn execute(config: CertsConfig) -> Result<()> {
    let chain = match config.file.as_deref() {
        Some(path) => read_certificate_chain_file(path)?,
        None => read_certificate_chain(&read_stdin()?)?,
    };
    print(&chain.iter().collect::<CertificatesReport>(), config.output)
}
