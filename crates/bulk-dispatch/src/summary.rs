//! Run state and progress reports.

use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// Lifecycle of a [`DispatchCoordinator`](crate::DispatchCoordinator) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    RoundRunning,
    RoundComplete,
    AllRoundsComplete,
    Refreshing,
    Done,
    /// A round hit a fatal error; no further rounds were started.
    Failed,
    /// The cancellation token fired.
    Cancelled,
}

impl RunState {
    /// Whether the run has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed | RunState::Cancelled)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::RoundRunning => "round running",
            RunState::RoundComplete => "round complete",
            RunState::AllRoundsComplete => "all rounds complete",
            RunState::Refreshing => "refreshing",
            RunState::Done => "done",
            RunState::Failed => "failed",
            RunState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Outcome of one round of concurrent bulk requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoundReport {
    /// 1-based round number across the whole run
    pub round: u64,
    /// Index number the round wrote to
    pub index_no: u32,
    /// Requests launched
    pub requests: u32,
    /// Requests the transport accepted
    pub acknowledged: u32,
    /// Requests dropped after delivery failed
    pub failed: u32,
    /// Accepted requests whose response flagged item errors
    pub item_errors: u32,
    /// Sum of server-reported processing time
    pub took_ms: u64,
    pub duration_ms: u64,
    /// Share of all requested documents covered once this round finished
    pub percent_complete: f64,
    /// A task hit a fatal error; the round finished degraded
    pub aborted: bool,
    /// Requests that did not finish because the run was cancelled
    pub cancelled: u32,
}

/// Result of a complete run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub state: RunState,
    /// Documents the configuration asked for
    pub documents_planned: u64,
    /// Documents in every request launched
    pub documents_requested: u64,
    /// Documents in requests the transport accepted
    pub documents_acknowledged: u64,
    pub requests_acknowledged: u64,
    pub requests_failed: u64,
    pub server_took_ms: u64,
    pub duration_ms: u64,
    /// Description of the fatal error that stopped the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    pub rounds: Vec<RoundReport>,
}

impl RunSummary {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Acknowledged documents per second.
    pub fn documents_per_second(&self) -> f64 {
        let secs = self.duration().as_secs_f64();
        if secs > 0.0 {
            self.documents_acknowledged as f64 / secs
        } else {
            0.0
        }
    }

    /// Fold one finished round into the totals.
    pub fn record_round(&mut self, report: RoundReport, bulk_size: u32) {
        let bulk_size = u64::from(bulk_size);
        self.documents_requested += u64::from(report.requests) * bulk_size;
        self.documents_acknowledged += u64::from(report.acknowledged) * bulk_size;
        self.requests_acknowledged += u64::from(report.acknowledged);
        self.requests_failed += u64::from(report.failed);
        self.server_took_ms += report.took_ms;
        self.rounds.push(report);
    }

    /// Emit the summary block.
    pub fn log(&self) {
        info!("****************** Summary ******************");
        info!("Run state: {}", self.state);
        info!("Documents planned: {}", self.documents_planned);
        info!("Documents requested: {}", self.documents_requested);
        info!("Documents acknowledged: {}", self.documents_acknowledged);
        info!("Requests failed: {}", self.requests_failed);
        if self.server_took_ms > 0 {
            info!("Server processing time: {} ms", self.server_took_ms);
        }
        info!(
            "Network and data generation time taken = {:?} ({:.2} docs/sec)",
            self.duration(),
            self.documents_per_second()
        );
        if let Some(failure) = &self.failure {
            info!("Failure: {}", failure);
        }
    }
}
