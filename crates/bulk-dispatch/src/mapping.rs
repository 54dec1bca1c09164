//! Index mapping for the string fields of a run.
//!
//! Every string field is mapped as analyzed `text` with a `raw` keyword
//! sub-field, so it can be searched and aggregated on.

use crate::error::TransportError;
use crate::http::HttpTransport;
use bulk_core::{FieldSpec, GenerationConfig};
use serde_json::{json, Map, Value};
use tracing::info;

/// Build the mapping document for `fields`.
///
/// With a document type the properties are nested under it, as older
/// stores require; without one the typeless layout is used.
pub fn build_mapping(fields: &FieldSpec, doc_type: Option<&str>) -> Value {
    let properties: Map<String, Value> = fields
        .string_field_names()
        .map(|name| {
            (
                name.to_string(),
                json!({ "type": "text", "fields": { "raw": { "type": "keyword" } } }),
            )
        })
        .collect();

    let typed = json!({ "properties": properties });
    match doc_type {
        Some(doc_type) => json!({ "mappings": { doc_type: typed } }),
        None => json!({ "mappings": typed }),
    }
}

/// PUT the string-field mapping to every index the run writes to.
pub async fn apply_mappings(
    transport: &HttpTransport,
    config: &GenerationConfig,
) -> Result<(), TransportError> {
    let mapping = build_mapping(&config.fields, config.index.doc_type.as_deref());

    for index in config.target_indices() {
        info!("Starting mapping of string fields for index '{}'", index);
        transport.put_mapping(&index, &mapping).await?;
        info!("Completed mapping of string fields for index '{}'", index);
    }

    Ok(())
}
