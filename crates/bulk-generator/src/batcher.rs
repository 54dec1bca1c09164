//! Bulk batcher.
//!
//! Concatenates assembled records into one bulk-ingestion payload: for every
//! record a header line and a body line, each terminated by `\n`, with nothing
//! before the first record or after the last newline.

use crate::assembler::DocumentAssembler;
use crate::error::GeneratorError;
use std::borrow::Cow;

/// One ready-to-send bulk request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkPayload {
    bytes: Vec<u8>,
    records: usize,
    index_no: u32,
}

impl BulkPayload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of records in the payload.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Index number the records were addressed to.
    pub fn index_no(&self) -> u32 {
        self.index_no
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Build `bulk_size` records for index `index_no` into one payload.
///
/// Each record is fully assembled in a scratch buffer before it is appended,
/// so a failure never leaves a partial record behind.
pub async fn build_bulk_payload(
    assembler: &DocumentAssembler,
    bulk_size: u32,
    index_no: u32,
) -> Result<BulkPayload, GeneratorError> {
    let mut bytes = Vec::new();
    let mut record = Vec::new();

    for i in 0..bulk_size {
        record.clear();
        assembler.build_record(index_no, &mut record).await?;
        if i == 0 {
            bytes.reserve(record.len() * bulk_size as usize);
        }
        bytes.extend_from_slice(&record);
    }

    Ok(BulkPayload {
        bytes,
        records: bulk_size as usize,
        index_no,
    })
}
