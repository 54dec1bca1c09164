//! Synthetic bulk-indexing load generator.
//!
//! The binary wires the workspace crates together:
//!
//! - `bulk-core`: configuration and the field specification
//! - `bulk-generator`: value producers, document assembly and bulk payloads
//! - `bulk-dispatch`: transports and the round-based dispatch coordinator

pub mod cli;
pub mod commands;

pub use bulk_core::GenerationConfig;
pub use bulk_dispatch::{RunState, RunSummary};
