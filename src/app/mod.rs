// Wires the adapters together for one command-line run.

use crate::adapters::fasta::read_fasta_file;
use crate::adapters::interpro::InterproClient;
use crate::adapters::ndjson::open_output;
use crate::config::Settings;
use crate::core::etl::{DispatchOptions, EtlEngine};
use crate::core::{ConfigProvider, RunSummary};
use crate::utils::error::Result;

/// Read the whole input, then query and write batch by batch.
///
/// The input is parsed completely first, so malformed FASTA fails before
/// any request leaves the machine.
pub async fn run(settings: &Settings) -> Result<RunSummary> {
    let records = read_fasta_file(&settings.input)?;

    let client = InterproClient::new(settings.endpoint(), settings.poll_settings()?)?
        .with_sequences(settings.include_sequence());
    let sink = open_output(settings.output.as_deref())?;

    let mut engine = EtlEngine::new(client, sink, DispatchOptions::from_config(settings)?);
    engine.run(records).await
}
