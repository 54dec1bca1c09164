//! CLI argument definitions.

use bulk_core::{ConfigError, GenerationConfig, HeaderMode};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bulk-loadgen")]
#[command(about = "Generate synthetic documents and bulk-load them into an index store")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate documents and send them to the index store
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Print the string-field index mapping, or apply it
    Mapping {
        #[command(flatten)]
        config: ConfigArgs,

        /// PUT the mapping to every target index instead of printing it
        #[arg(long)]
        apply: bool,
    },

    /// Print one bulk payload without sending it
    Sample {
        #[command(flatten)]
        config: ConfigArgs,

        /// Number of records in the payload
        #[arg(long, default_value = "1")]
        count: u32,

        /// Index number to address (default: the starting index)
        #[arg(long)]
        index_no: Option<u32>,
    },
}

/// Config file plus command-line overrides, shared by every command.
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigArgs {
    /// Path to config YAML file (built-in defaults when omitted)
    #[arg(long, short = 'c', env = "BULK_LOADGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Index store base URL
    #[arg(long, env = "BULK_LOADGEN_URL")]
    pub url: Option<String>,

    /// Index name (prefix, in suffix mode)
    #[arg(long)]
    pub index_name: Option<String>,

    /// First index number
    #[arg(long)]
    pub starting_index: Option<u32>,

    /// Number of indices to fill
    #[arg(long)]
    pub index_count: Option<u32>,

    /// Rounds per index
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Concurrent bulk requests per round
    #[arg(long)]
    pub batch_size: Option<u32>,

    /// Records per bulk request
    #[arg(long)]
    pub bulk_size: Option<u32>,

    /// Index-action header addressing
    #[arg(long, value_enum)]
    pub header_mode: Option<HeaderMode>,

    /// Fixed producer seed
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ConfigArgs {
    /// Load the config file (if any), apply overrides and validate.
    pub fn load(&self) -> Result<GenerationConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => GenerationConfig::from_file(path)?,
            None => GenerationConfig::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut GenerationConfig) {
        if let Some(url) = &self.url {
            config.target.url = url.clone();
        }
        if let Some(name) = &self.index_name {
            config.index.name = name.clone();
        }
        if let Some(starting_index) = self.starting_index {
            config.index.starting_index = starting_index;
        }
        if let Some(count) = self.index_count {
            config.index.count = count;
        }
        if let Some(rounds) = self.rounds {
            config.run.rounds_per_index = rounds;
        }
        if let Some(batch_size) = self.batch_size {
            config.run.batch_size = batch_size;
        }
        if let Some(bulk_size) = self.bulk_size {
            config.run.bulk_size = bulk_size;
        }
        if let Some(header_mode) = self.header_mode {
            config.index.header_mode = header_mode;
        }
        if let Some(seed) = self.seed {
            config.producers.seed = Some(seed);
        }
    }
}

/// Arguments of the `run` command.
#[derive(Args, Clone, Debug, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Build every payload but discard it instead of sending
    #[arg(long, conflicts_with = "print")]
    pub dry_run: bool,

    /// Print every payload to stdout instead of sending
    #[arg(long)]
    pub print: bool,

    /// Skip the index refresh after the last round
    #[arg(long)]
    pub no_refresh: bool,

    /// PUT the string-field mapping before generating
    #[arg(long)]
    pub create_mapping: bool,

    /// Write the run summary as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub summary_json: Option<PathBuf>,
}
