//! `run` command: the full generation workload.

use crate::cli::RunArgs;
use anyhow::Context;
use bulk_dispatch::{
    apply_mappings, DispatchCoordinator, HttpTransport, NoopTransport, RunState, StdoutTransport,
    Transport,
};
use bulk_generator::{DocumentAssembler, Producers};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Generate and dispatch every configured round, then report the summary.
pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = args
        .config
        .load()
        .context("Failed to load configuration")?;
    if args.no_refresh {
        config.target.refresh_after = false;
    }
    if args.create_mapping {
        config.target.create_mapping = true;
    }

    let cancel = CancellationToken::new();
    watch_interrupt(cancel.clone());

    let transport: Arc<dyn Transport> = if args.dry_run {
        tracing::info!("[DRY-RUN] Payloads will be built and discarded");
        Arc::new(NoopTransport::new())
    } else if args.print {
        Arc::new(StdoutTransport::new())
    } else {
        let http = HttpTransport::new(&config.target).context("Failed to build HTTP client")?;
        if config.target.create_mapping {
            // The store may already have the mapping; generation goes on regardless.
            if let Err(e) = apply_mappings(&http, &config).await {
                tracing::error!("Error in mapping of string fields: {}", e);
            }
        }
        Arc::new(http)
    };

    let producers = Producers::spawn(&config.producers, cancel.clone());
    let assembler = DocumentAssembler::new(&config, &producers);
    let mut coordinator = DispatchCoordinator::new(config, assembler, transport, cancel.clone());

    let summary = coordinator.run().await;

    cancel.cancel();
    producers.join().await;
    summary.log();

    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write summary to {path:?}"))?;
        tracing::info!("Summary written to {:?}", path);
    }

    match summary.state {
        RunState::Failed => anyhow::bail!(
            "Run failed: {}",
            summary.failure.as_deref().unwrap_or("unknown error")
        ),
        RunState::Cancelled => {
            tracing::warn!("Run cancelled before all batches completed");
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Cancel the run on ctrl-c. Requests still in flight are abandoned and
/// counted as cancelled; no further batch is started.
fn watch_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, abandoning in-flight requests");
            cancel.cancel();
        }
    });
}
