//! `mapping` command.

use crate::cli::ConfigArgs;
use anyhow::Context;
use bulk_dispatch::{apply_mappings, build_mapping, HttpTransport};

/// Print the string-field mapping, or PUT it to every target index.
pub async fn run_mapping(config: ConfigArgs, apply: bool) -> anyhow::Result<()> {
    let config = config.load().context("Failed to load configuration")?;

    if !apply {
        let mapping = build_mapping(&config.fields, config.index.doc_type.as_deref());
        println!("{}", serde_json::to_string_pretty(&mapping)?);
        return Ok(());
    }

    let http = HttpTransport::new(&config.target).context("Failed to build HTTP client")?;
    apply_mappings(&http, &config)
        .await
        .with_context(|| format!("Failed to apply mapping at {}", http.base_url()))?;
    Ok(())
}
