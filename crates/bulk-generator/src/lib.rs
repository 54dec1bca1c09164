//! Record generation for the bulk-loadgen pipeline.
//!
//! Two background producers publish random values into single-slot
//! conduits; the [`DocumentAssembler`] draws one value per declared field to
//! build a record, and [`build_bulk_payload`] packs records into a bulk
//! request body.
//!
//! # Architecture
//!
//! ```text
//!  produce_strings ──► ValueConduit (string) ─┐
//!                                             ├─► DocumentAssembler ─► build_bulk_payload ─► BulkPayload
//!  produce_floats  ──► ValueConduit (number) ─┘
//! ```
//!
//! Conduits are safe to share between any number of concurrent assemblers;
//! every produced value is consumed exactly once.
//!
//! # Example
//!
//! ```rust
//! # tokio_test::block_on(async {
//! use bulk_core::GenerationConfig;
//! use bulk_generator::{build_bulk_payload, DocumentAssembler, Producers};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = GenerationConfig::default();
//! let cancel = CancellationToken::new();
//! let producers = Producers::spawn(&config.producers, cancel.clone());
//! let assembler = DocumentAssembler::new(&config, &producers);
//!
//! let payload = build_bulk_payload(&assembler, 10, 0).await.unwrap();
//! assert_eq!(payload.records(), 10);
//! cancel.cancel();
//! # });
//! ```

pub mod assembler;
pub mod batcher;
pub mod error;
pub mod generators;
pub mod producers;

pub use assembler::DocumentAssembler;
pub use batcher::{build_bulk_payload, BulkPayload};
pub use error::GeneratorError;
pub use producers::{produce_floats, produce_strings, Producers, ValueConduit};
