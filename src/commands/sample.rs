//! `sample` command.

use crate::cli::ConfigArgs;
use anyhow::Context;
use bulk_generator::{build_bulk_payload, DocumentAssembler, Producers};
use tokio_util::sync::CancellationToken;

/// Build one payload of `count` records and print it.
pub async fn run_sample(config: ConfigArgs, count: u32, index_no: Option<u32>) -> anyhow::Result<()> {
    let config = config.load().context("Failed to load configuration")?;
    let index_no = index_no.unwrap_or(config.index.starting_index);

    let cancel = CancellationToken::new();
    let producers = Producers::spawn(&config.producers, cancel.clone());
    let assembler = DocumentAssembler::new(&config, &producers);

    let payload = build_bulk_payload(&assembler, count, index_no).await;
    cancel.cancel();
    producers.join().await;

    let payload = payload.context("Failed to build sample payload")?;
    print!("{}", payload.to_string_lossy());
    Ok(())
}
