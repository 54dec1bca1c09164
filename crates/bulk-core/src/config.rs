//! Run configuration loaded from YAML.
//!
//! Every section and every key is optional; missing values fall back to the
//! defaults below, which describe a single-request smoke run against a local
//! index store.

use crate::error::ConfigError;
use crate::fields::{check_json_name, FieldSpec};
use serde::Deserialize;
use std::fs;
use std::ops::Range;
use std::path::Path;

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_INDEX_NAME: &str = "category";
pub const DEFAULT_DOC_TYPE: &str = "fact";
pub const DEFAULT_TARGET_URL: &str = "http://localhost:9200";
pub const DEFAULT_STRING_LENGTH: usize = 10;
pub const DEFAULT_NUMBER_MAX: f64 = 100.0;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Largest accepted `producers.number_max`. Values are drawn as whole
/// hundredths in a `u64`, which must stay exact and far from saturation.
pub const MAX_NUMBER_MAX: f64 = 1e15;

fn default_index_name() -> String {
    DEFAULT_INDEX_NAME.to_string()
}

fn default_doc_type() -> Option<String> {
    Some(DEFAULT_DOC_TYPE.to_string())
}

fn default_one() -> u32 {
    1
}

fn default_string_length() -> usize {
    DEFAULT_STRING_LENGTH
}

fn default_number_max() -> f64 {
    DEFAULT_NUMBER_MAX
}

fn default_target_url() -> String {
    DEFAULT_TARGET_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

fn default_retry_backoff_ms() -> u64 {
    DEFAULT_RETRY_BACKOFF_MS
}

// ============================================================================
// Sections
// ============================================================================

/// How the index-action header addresses each record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// `_index` is the index name followed by the index number.
    #[default]
    Suffix,
    /// `_index` is the bare index name and every record carries an `_id`
    /// drawn from the string producer.
    Id,
}

impl std::fmt::Display for HeaderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderMode::Suffix => write!(f, "suffix"),
            HeaderMode::Id => write!(f, "id"),
        }
    }
}

/// Target index addressing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    /// Index name (prefix, in suffix mode)
    #[serde(default = "default_index_name")]
    pub name: String,

    /// Document type emitted as `_type`; `null` omits it
    #[serde(default = "default_doc_type")]
    pub doc_type: Option<String>,

    /// First index number
    #[serde(default)]
    pub starting_index: u32,

    /// Number of indices to fill
    #[serde(default = "default_one")]
    pub count: u32,

    #[serde(default)]
    pub header_mode: HeaderMode,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: default_index_name(),
            doc_type: default_doc_type(),
            starting_index: 0,
            count: 1,
            header_mode: HeaderMode::default(),
        }
    }
}

/// Shape of the workload per index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunShape {
    /// Rounds (batches) run against each index
    #[serde(default = "default_one")]
    pub rounds_per_index: u32,

    /// Concurrent bulk requests per round
    #[serde(default = "default_one")]
    pub batch_size: u32,

    /// Records per bulk request
    #[serde(default = "default_one")]
    pub bulk_size: u32,
}

impl Default for RunShape {
    fn default() -> Self {
        Self {
            rounds_per_index: 1,
            batch_size: 1,
            bulk_size: 1,
        }
    }
}

/// Value producer settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProducerConfig {
    /// Length of every random string value
    #[serde(default = "default_string_length")]
    pub string_length: usize,

    /// Exclusive upper bound of numeric values; the lower bound is 0
    #[serde(default = "default_number_max")]
    pub number_max: f64,

    /// Fixed RNG seed; when unset the producers seed from the clock
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            string_length: DEFAULT_STRING_LENGTH,
            number_max: DEFAULT_NUMBER_MAX,
            seed: None,
        }
    }
}

/// Index store endpoint and the administrative calls around a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Base URL of the index store
    #[serde(default = "default_target_url")]
    pub url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// PUT the string-field mapping before generation starts
    #[serde(default)]
    pub create_mapping: bool,

    /// Refresh the indices once every round is done
    #[serde(default = "default_true")]
    pub refresh_after: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: default_target_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            create_mapping: false,
            refresh_after: true,
        }
    }
}

/// What happens to a bulk payload the transport failed to deliver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase", deny_unknown_fields)]
pub enum DeliveryPolicy {
    /// Log the failure and discard the payload
    #[default]
    Drop,
    /// Resend up to `max_attempts` times in total, sleeping `backoff_ms` between tries
    Retry {
        max_attempts: u32,
        #[serde(default = "default_retry_backoff_ms")]
        backoff_ms: u64,
    },
}

impl DeliveryPolicy {
    /// Total number of send attempts per payload.
    pub fn max_attempts(&self) -> u32 {
        match self {
            DeliveryPolicy::Drop => 1,
            DeliveryPolicy::Retry { max_attempts, .. } => *max_attempts,
        }
    }
}

// ============================================================================
// GenerationConfig
// ============================================================================

/// Immutable configuration of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub run: RunShape,

    #[serde(default)]
    pub fields: FieldSpec,

    #[serde(default)]
    pub producers: ProducerConfig,

    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub delivery: DeliveryPolicy,
}

impl GenerationConfig {
    /// Load config from a YAML file.
    ///
    /// The result is not validated; call [`validate`](Self::validate) once
    /// any overrides have been applied.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reject configurations that cannot produce a well-formed run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.index.name;
        if name.is_empty() {
            return Err(ConfigError::invalid("index.name", "must not be empty"));
        }
        if name.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::invalid(
                "index.name",
                format!("'{name}' must be lowercase"),
            ));
        }
        check_json_name("index.name", name)?;
        if let Some(doc_type) = &self.index.doc_type {
            if doc_type.is_empty() {
                return Err(ConfigError::invalid(
                    "index.doc_type",
                    "must be null or a non-empty name",
                ));
            }
            check_json_name("index.doc_type", doc_type)?;
        }
        if self.index.count == 0 {
            return Err(ConfigError::invalid("index.count", "must be at least 1"));
        }
        if self
            .index
            .starting_index
            .checked_add(self.index.count)
            .is_none()
        {
            return Err(ConfigError::invalid(
                "index.starting_index",
                "starting_index + count overflows",
            ));
        }

        for (field, value) in [
            ("run.rounds_per_index", self.run.rounds_per_index),
            ("run.batch_size", self.run.batch_size),
            ("run.bulk_size", self.run.bulk_size),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be at least 1"));
            }
        }

        self.fields.validate()?;

        if self.producers.string_length == 0 {
            return Err(ConfigError::invalid(
                "producers.string_length",
                "must be at least 1",
            ));
        }
        if !(self.producers.number_max.is_finite() && self.producers.number_max > 0.0) {
            return Err(ConfigError::invalid(
                "producers.number_max",
                "must be a positive finite number",
            ));
        }
        if self.producers.number_max > MAX_NUMBER_MAX {
            return Err(ConfigError::invalid(
                "producers.number_max",
                format!("must not exceed {MAX_NUMBER_MAX:e}"),
            ));
        }

        if self.target.url.is_empty() {
            return Err(ConfigError::invalid("target.url", "must not be empty"));
        }
        if self.delivery.max_attempts() == 0 {
            return Err(ConfigError::invalid(
                "delivery.max_attempts",
                "must be at least 1",
            ));
        }

        Ok(())
    }

    /// Documents in one bulk request times concurrent requests in one round.
    pub fn documents_per_round(&self) -> u64 {
        u64::from(self.run.batch_size) * u64::from(self.run.bulk_size)
    }

    /// Total rounds across all indices.
    pub fn total_rounds(&self) -> u64 {
        u64::from(self.index.count) * u64::from(self.run.rounds_per_index)
    }

    /// `index count × rounds × batch size × bulk size`.
    pub fn total_documents(&self) -> u64 {
        self.total_rounds() * self.documents_per_round()
    }

    /// Share of all documents requested once `rounds_completed` rounds are done, in percent.
    pub fn percent_complete(&self, rounds_completed: u64) -> f64 {
        let total = self.total_documents();
        if total == 0 {
            return 0.0;
        }
        (rounds_completed * self.documents_per_round()) as f64 / total as f64 * 100.0
    }

    /// Index numbers visited by the run, in order.
    pub fn index_numbers(&self) -> Range<u32> {
        let start = self.index.starting_index;
        start..start.saturating_add(self.index.count)
    }

    /// Name written into the `_index` header field for records of `index_no`.
    pub fn target_index(&self, index_no: u32) -> String {
        match self.index.header_mode {
            HeaderMode::Suffix => format!("{}{}", self.index.name, index_no),
            HeaderMode::Id => self.index.name.clone(),
        }
    }

    /// Distinct index names the run writes to, in order.
    pub fn target_indices(&self) -> Vec<String> {
        match self.index.header_mode {
            HeaderMode::Suffix => self.index_numbers().map(|n| self.target_index(n)).collect(),
            HeaderMode::Id => vec![self.index.name.clone()],
        }
    }
}
