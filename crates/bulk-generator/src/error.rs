//! Error types for record generation.

use thiserror::Error;

/// Errors that can occur while assembling records.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// A value conduit was closed while a record still needed values from it.
    #[error("Producer exhausted: the {conduit} conduit is closed")]
    ProducerExhausted { conduit: &'static str },

    /// JSON encoding error.
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
