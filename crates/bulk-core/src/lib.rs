//! Core types for the bulk-loadgen pipeline.
//!
//! This crate holds the immutable, run-scoped configuration shared by the
//! generator and dispatch crates:
//!
//! - [`FieldSpec`] - Ordered numeric and string fields of every record
//! - [`GenerationConfig`] - Run shape, index addressing, producers, target, delivery
//! - [`ConfigError`] - Startup validation failures
//!
//! # Architecture
//!
//! ```text
//! bulk-core (this crate)
//!    │
//!    ├─── bulk-generator  (producers, assembler, batcher)
//!    │
//!    └─── bulk-dispatch   (transport, coordinator)
//! ```
//!
//! # Example
//!
//! ```rust
//! use bulk_core::GenerationConfig;
//!
//! let config = GenerationConfig::from_yaml(r#"
//! index:
//!   name: cat
//!   count: 2
//! run:
//!   batch_size: 5
//!   bulk_size: 100
//! fields:
//!   numbers: [price]
//!   strings:
//!     - name: city
//!       prefix: Loc
//! "#).unwrap();
//!
//! assert_eq!(config.total_documents(), 1000);
//! ```

pub mod config;
pub mod error;
pub mod fields;

pub use config::{
    DeliveryPolicy, GenerationConfig, HeaderMode, IndexConfig, ProducerConfig, RunShape,
    TargetConfig, MAX_NUMBER_MAX,
};
pub use error::ConfigError;
pub use fields::{FieldSpec, GenericFields, StringField};
