//! Document assembler.
//!
//! Builds one bulk record: an index-action header line and a JSON body whose
//! keys follow the [`FieldSpec`] order (numeric fields first, then string
//! fields). Numeric values are written unquoted as produced; string values are
//! quoted, with the field's prefix and a space in front when one is set.
//! Index, type and field names are written unescaped; configuration
//! validation rejects any name that would need escaping.
//!
//! ```text
//! { "index" : { "_index" : "cat3","_type": "fact"} }
//! { "price":12.50,"city":"Loc X"}
//! ```

use crate::error::GeneratorError;
use crate::producers::{Producers, ValueConduit};
use bulk_core::{FieldSpec, GenerationConfig, HeaderMode, IndexConfig};
use std::sync::Arc;

/// Assembles records from the shared producer conduits.
///
/// Cheap to clone; clones share the conduits and the field layout.
#[derive(Clone, Debug)]
pub struct DocumentAssembler {
    index: Arc<IndexConfig>,
    fields: Arc<FieldSpec>,
    strings: ValueConduit,
    numbers: ValueConduit,
}

impl DocumentAssembler {
    pub fn new(config: &GenerationConfig, producers: &Producers) -> Self {
        Self::with_conduits(
            config.index.clone(),
            config.fields.clone(),
            producers.strings.clone(),
            producers.numbers.clone(),
        )
    }

    pub fn with_conduits(
        index: IndexConfig,
        fields: FieldSpec,
        strings: ValueConduit,
        numbers: ValueConduit,
    ) -> Self {
        Self {
            index: Arc::new(index),
            fields: Arc::new(fields),
            strings,
            numbers,
        }
    }

    pub fn fields(&self) -> &FieldSpec {
        &self.fields
    }

    /// Values consumed from the conduits per record.
    ///
    /// One per field, plus one string for the `_id` in id mode.
    pub fn draws_per_record(&self) -> usize {
        let id = usize::from(self.index.header_mode == HeaderMode::Id);
        self.fields.field_count() + id
    }

    /// Render the index-action header for a record in index `index_no`.
    pub fn build_header(&self, index_no: u32, id: Option<&str>) -> String {
        let mut header = String::with_capacity(80);
        header.push_str(r#"{ "index" : { "_index" : ""#);
        header.push_str(&self.index.name);
        if self.index.header_mode == HeaderMode::Suffix {
            header.push_str(&index_no.to_string());
        }
        header.push('"');
        if let Some(doc_type) = &self.index.doc_type {
            header.push_str(r#","_type": ""#);
            header.push_str(doc_type);
            header.push('"');
        }
        match id {
            Some(id) => {
                header.push_str(r#", "_id": ""#);
                header.push_str(id);
                header.push_str(r#"" } }"#);
            }
            None => header.push_str("} }"),
        }
        header
    }

    /// Draw one value per field and append the record body to `out`.
    pub async fn build_content(&self, out: &mut Vec<u8>) -> Result<(), GeneratorError> {
        out.extend_from_slice(b"{ ");
        let mut first = true;

        for name in self.fields.number_fields() {
            let value = self.numbers.recv().await?;
            push_key(out, name, &mut first);
            out.extend_from_slice(value.as_bytes());
        }

        for field in self.fields.string_fields() {
            let value = self.strings.recv().await?;
            push_key(out, &field.name, &mut first);
            match &field.prefix {
                Some(prefix) => serde_json::to_writer(&mut *out, &format!("{prefix} {value}"))?,
                None => serde_json::to_writer(&mut *out, &value)?,
            }
        }

        out.push(b'}');
        Ok(())
    }

    /// Append one full record (header line and body line) to `out`.
    pub async fn build_record(&self, index_no: u32, out: &mut Vec<u8>) -> Result<(), GeneratorError> {
        let id = match self.index.header_mode {
            HeaderMode::Id => Some(self.strings.recv().await?),
            HeaderMode::Suffix => None,
        };

        out.extend_from_slice(self.build_header(index_no, id.as_deref()).as_bytes());
        out.push(b'\n');
        self.build_content(out).await?;
        out.push(b'\n');
        Ok(())
    }
}

fn push_key(out: &mut Vec<u8>, name: &str, first: &mut bool) {
    if !*first {
        out.push(b',');
    }
    *first = false;
    out.push(b'"');
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(b"\":");
}
