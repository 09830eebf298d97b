//! Command-line surface of the `pinesync` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pinesync_domain::{CloudProvider, MetricType};

#[derive(Debug, Parser)]
#[command(name = "pinesync", version, about = "Vector-database cache connector")]
pub struct Cli {
    /// Config file (TOML or JSON). Without it, the environment is tried
    /// first and the standard config locations second.
    #[arg(long, global = true, env = "PINESYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON on stderr.
    #[arg(long, global = true, env = "PINESYNC_LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read every enabled object kind and write cache updates.
    Sync {
        /// Vector namespace for this run.
        #[arg(long)]
        namespace: Option<String>,

        /// Vector listing page size for this run.
        #[arg(long)]
        page_limit: Option<u32>,

        /// Append cache updates to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Probe the vector endpoint with the configured credentials.
    TestConnection,

    /// Create a serverless index.
    CreateIndex {
        name: String,

        #[arg(long)]
        dimension: u32,

        #[arg(long, default_value_t = MetricType::Cosine)]
        metric: MetricType,

        #[arg(long, default_value_t = CloudProvider::Aws)]
        cloud: CloudProvider,

        #[arg(long, default_value = "us-east-1")]
        region: String,
    },

    /// Delete an index by name.
    DeleteIndex { name: String },

    /// Upsert one dense vector.
    UpsertVector {
        id: String,

        /// Comma-separated values, e.g. `0.1,0.2,0.3`.
        #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
        values: Vec<f32>,

        #[arg(long)]
        namespace: Option<String>,
    },

    /// Generate embeddings for one or more texts.
    Embed {
        #[arg(required = true)]
        texts: Vec<String>,

        /// Overrides the configured default model.
        #[arg(long)]
        model: Option<String>,
    },
}

impl Command {
    /// Stable identifier used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sync { .. } => "sync",
            Self::TestConnection => "test_connection",
            Self::CreateIndex { .. } => "create_index",
            Self::DeleteIndex { .. } => "delete_index",
            Self::UpsertVector { .. } => "upsert_vector",
            Self::Embed { .. } => "embed",
        }
    }

    /// True when stdout carries cache JSON lines, so the report must not.
    pub const fn report_to_stderr(&self) -> bool {
        matches!(self, Self::Sync { output: None, .. })
    }
}
