//! Round-based concurrent dispatch of bulk payloads.
//!
//! The [`DispatchCoordinator`] runs the configured rounds, each a wave of
//! concurrent build-and-send tasks gated by a completion barrier, and hands
//! every payload to a [`Transport`]:
//!
//! - [`HttpTransport`] - POSTs to the store's `_bulk` endpoint
//! - [`StdoutTransport`] - prints payloads instead of sending them
//! - [`NoopTransport`] - discards payloads (dry run)
//!
//! [`mapping`] builds and applies the string-field index mapping.

pub mod coordinator;
pub mod error;
pub mod http;
pub mod mapping;
pub mod summary;
pub mod transport;

pub use bulk_core::DeliveryPolicy;
pub use coordinator::{deliver, DispatchCoordinator};
pub use error::{DispatchError, TransportError};
pub use http::HttpTransport;
pub use mapping::{apply_mappings, build_mapping};
pub use summary::{RoundReport, RunState, RunSummary};
pub use transport::{NoopTransport, StdoutTransport, Transport, TransportStatus};
