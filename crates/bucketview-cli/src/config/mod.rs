//! CLI configuration.
//!
//! ```text
//! Cli
//! ├── query: QueryCommand
//! │   ├── table: TableArgs       # Bucket and table name
//! │   ├── storage: StorageArgs   # Endpoint, credentials, retry
//! │   └── query: QueryArgs       # Filters, columns, limit, timeout
//! └── schema: SchemaCommand
//!     └── table: TableArgs
//! ```
//!
//! Every option can also be given as an environment variable; see `--help`.

mod query;
mod storage;
mod table;

use clap::{Args, Parser, Subcommand};
pub use query::QueryArgs;
pub use storage::StorageArgs;
pub use table::TableArgs;

use crate::TRACING_TARGET_CONFIG;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "bucketview")]
#[command(about = "Query an object-storage bucket as a table")]
#[command(version)]
pub struct Cli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Scans the bucket and prints matching rows as JSON lines.
    Query(QueryCommand),
    /// Prints the table schema as JSON.
    Schema(SchemaCommand),
}

/// Arguments of `bucketview query`.
#[derive(Debug, Clone, Args)]
pub struct QueryCommand {
    #[clap(flatten)]
    pub table: TableArgs,

    #[clap(flatten)]
    pub storage: StorageArgs,

    #[clap(flatten)]
    pub query: QueryArgs,
}

/// Arguments of `bucketview schema`.
#[derive(Debug, Clone, Args)]
pub struct SchemaCommand {
    #[clap(flatten)]
    pub table: TableArgs,
}

impl Cli {
    /// Loads a `.env` file when enabled, then parses arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Logs the configuration without secrets.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            version = env!("CARGO_PKG_VERSION"),
            features = ?Self::enabled_features(),
            "Build information"
        );

        match &self.command {
            Command::Query(cmd) => {
                cmd.table.log();
                cmd.storage.log();
                cmd.query.log();
            }
            Command::Schema(cmd) => cmd.table.log(),
        }
    }

    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
