//! Dispatch coordinator.
//!
//! Drives the run: for every index number, `rounds_per_index` rounds; each
//! round launches `batch_size` concurrent tasks that build one bulk payload
//! and hand it to the transport. A round ends only when every one of its
//! tasks has finished, so at most `batch_size` requests are ever in flight.
//!
//! ```text
//! Idle ─► RoundRunning ─► RoundComplete ─┬─► RoundRunning ...
//!                                        └─► AllRoundsComplete ─► Refreshing ─► Done
//!
//! any round with a fatal task error ─► Failed
//! cancellation token fired          ─► Cancelled
//! ```

use crate::error::{DispatchError, TransportError};
use crate::summary::{RoundReport, RunState, RunSummary};
use crate::transport::{Transport, TransportStatus};
use bulk_core::{DeliveryPolicy, GenerationConfig};
use bulk_generator::{build_bulk_payload, BulkPayload, DocumentAssembler};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Counts a task as in flight from launch until it is dropped.
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Runs the configured rounds against a transport.
pub struct DispatchCoordinator {
    config: Arc<GenerationConfig>,
    assembler: DocumentAssembler,
    transport: Arc<dyn Transport>,
    cancel: CancellationToken,
    in_flight: Arc<AtomicUsize>,
    state: RunState,
}

impl DispatchCoordinator {
    /// Create a coordinator. `config` is expected to be validated already.
    pub fn new(
        config: GenerationConfig,
        assembler: DocumentAssembler,
        transport: Arc<dyn Transport>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config: Arc::new(config),
            assembler,
            transport,
            cancel,
            in_flight: Arc::new(AtomicUsize::new(0)),
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Build-and-dispatch tasks currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Run every round, then refresh the target indices if configured.
    pub async fn run(&mut self) -> RunSummary {
        let start = Instant::now();
        let bulk_size = self.config.run.bulk_size;
        let mut summary = RunSummary {
            documents_planned: self.config.total_documents(),
            ..Default::default()
        };

        info!(
            "Generating {} documents: {} index(es) x {} round(s) x {} request(s) x {} record(s) via {} transport",
            summary.documents_planned,
            self.config.index.count,
            self.config.run.rounds_per_index,
            self.config.run.batch_size,
            bulk_size,
            self.transport.name()
        );

        let mut round = 0u64;
        'indices: for index_no in self.config.index_numbers() {
            info!("Main processing index {}", index_no);

            for _ in 0..self.config.run.rounds_per_index {
                if self.cancel.is_cancelled() {
                    self.state = RunState::Cancelled;
                    break 'indices;
                }

                round += 1;
                let (report, fatal) = self.run_round(round, index_no).await;
                info!(
                    "Batch {} done, inserted into index {}. {:.2} % completed. Time Taken = {:?}",
                    report.round,
                    self.config.target_index(index_no),
                    report.percent_complete,
                    Duration::from_millis(report.duration_ms)
                );
                if report.failed > 0 {
                    warn!(
                        "Batch {}: {} of {} request(s) failed",
                        report.round, report.failed, report.requests
                    );
                }
                summary.record_round(report, bulk_size);

                if let Some(err) = fatal {
                    error!("Stopping after batch {}: {}", round, err);
                    summary.failure = Some(err.to_string());
                    self.state = RunState::Failed;
                    break 'indices;
                }
                if self.cancel.is_cancelled() {
                    self.state = RunState::Cancelled;
                    break 'indices;
                }
            }
        }

        if !self.state.is_terminal() {
            self.state = RunState::AllRoundsComplete;
            if self.config.target.refresh_after {
                self.refresh().await;
            }
            self.state = RunState::Done;
        }

        summary.state = self.state;
        summary.duration_ms = start.elapsed().as_millis() as u64;
        summary
    }

    /// Run one round of `batch_size` concurrent tasks against `index_no` and
    /// wait for all of them.
    ///
    /// Returns the round report and the first fatal task error, if any. A
    /// fatal error cancels the round's remaining tasks; the round still joins
    /// every task before returning.
    pub async fn run_round(
        &mut self,
        round: u64,
        index_no: u32,
    ) -> (RoundReport, Option<DispatchError>) {
        self.state = RunState::RoundRunning;
        let start = Instant::now();
        let batch_size = self.config.run.batch_size;
        let bulk_size = self.config.run.bulk_size;
        let policy = self.config.delivery;
        let round_cancel = self.cancel.child_token();

        let mut tasks = JoinSet::new();
        for request in 0..batch_size {
            debug!("Batch {} processing request {}", round, request + 1);

            let guard = InFlightGuard::acquire(&self.in_flight);
            let assembler = self.assembler.clone();
            let transport = Arc::clone(&self.transport);
            let cancel = round_cancel.clone();

            tasks.spawn(async move {
                let _guard = guard;
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(DispatchError::Cancelled),
                    result = dispatch_one(&assembler, transport.as_ref(), bulk_size, index_no, policy) => result,
                }
            });
        }

        let mut report = RoundReport {
            round,
            index_no,
            requests: batch_size,
            ..Default::default()
        };
        let mut fatal = None;

        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.unwrap_or_else(|e| Err(DispatchError::TaskFailed(e.to_string())));

            match outcome {
                Ok(status) => {
                    report.acknowledged += 1;
                    report.took_ms += status.took_ms.unwrap_or(0);
                    if status.item_errors {
                        report.item_errors += 1;
                    }
                }
                Err(DispatchError::Cancelled) => report.cancelled += 1,
                Err(e) if e.is_fatal() => {
                    report.failed += 1;
                    report.aborted = true;
                    round_cancel.cancel();
                    if fatal.is_none() {
                        fatal = Some(e);
                    }
                }
                Err(e) => {
                    warn!("Dropping bulk request for index {}: {}", index_no, e);
                    report.failed += 1;
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        report.percent_complete = self.config.percent_complete(round);
        self.state = RunState::RoundComplete;
        (report, fatal)
    }

    async fn refresh(&mut self) {
        self.state = RunState::Refreshing;
        let indices = self.config.target_indices();
        info!("Refreshing indices {:?}", indices);

        match self.transport.refresh(&indices).await {
            Ok(()) => info!("Refresh complete"),
            Err(e) => warn!("Failed to refresh indices: {}", e),
        }
    }
}

/// Build one payload and deliver it.
async fn dispatch_one(
    assembler: &DocumentAssembler,
    transport: &dyn Transport,
    bulk_size: u32,
    index_no: u32,
    policy: DeliveryPolicy,
) -> Result<TransportStatus, DispatchError> {
    let payload = build_bulk_payload(assembler, bulk_size, index_no).await?;
    Ok(deliver(transport, &payload, policy).await?)
}

/// Send `payload`, retrying according to `policy`.
pub async fn deliver(
    transport: &dyn Transport,
    payload: &BulkPayload,
    policy: DeliveryPolicy,
) -> Result<TransportStatus, TransportError> {
    let max_attempts = policy.max_attempts().max(1);
    let mut attempt = 1;

    loop {
        match transport.send(payload).await {
            Ok(status) => {
                if attempt > 1 {
                    info!("Bulk request delivered after {} attempts", attempt);
                }
                return Ok(status);
            }
            Err(e) if attempt < max_attempts => {
                warn!(
                    "Bulk request failed (attempt {}/{}): {}. Retrying...",
                    attempt, max_attempts, e
                );
                if let DeliveryPolicy::Retry { backoff_ms, .. } = policy {
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
