//! CLI for the benchsink ingestion pipeline.
//!
//! `benchsink run` ingests a single local result document; `benchsink
//! batch` fetches and ingests a set of object-storage references, each
//! independently. Store configuration comes from flags or their
//! environment fallbacks and is read once at startup.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use benchsink_core::gateway::{FetchError, ObjectRef, StaticNodeInfo};
use benchsink_core::settings::{Settings, DEFAULT_REGION, DEFAULT_UTC_OFFSET};
use benchsink_ingest::{IngestError, Pipeline};
use benchsink_store::{DynamoStore, S3Fetcher};
use clap::{Args, Parser, Subcommand};

/// Benchmark-result ingestion CLI.
#[derive(Parser, Debug)]
#[command(name = "benchsink")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Store configuration, read once at startup.
#[derive(Args, Debug)]
pub struct StoreOpts {
    /// Table receiving canonical benchmark records.
    #[arg(long, env = "BENCHSINK_TABLE_NAME")]
    pub table_name: String,

    /// Region hosting the table and result buckets.
    #[arg(long, env = "BENCHSINK_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Fixed UTC offset for the human-readable datetime attribute.
    #[arg(long, env = "BENCHSINK_UTC_OFFSET", default_value = DEFAULT_UTC_OFFSET)]
    pub utc_offset: String,
}

impl StoreOpts {
    fn into_settings(self) -> anyhow::Result<Settings> {
        Settings::new(self.table_name, self.region, &self.utc_offset)
            .context("invalid store configuration")
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest a single benchmark result document from a local file.
    Run {
        /// Path of the JSON result document.
        file: PathBuf,

        /// Store configuration.
        #[command(flatten)]
        store: StoreOpts,
    },

    /// Fetch and ingest result objects from object storage.
    ///
    /// Each object is processed independently: a malformed document is
    /// reported without aborting the rest of the batch.
    Batch {
        /// Object URIs (s3://bucket/key), one per document.
        #[arg(required = true)]
        objects: Vec<String>,

        /// Store configuration.
        #[command(flatten)]
        store: StoreOpts,
    },
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

/// Run the CLI with the process arguments.
///
/// Returns `Ok(())` when every document was persisted; any decode,
/// normalize or persist failure surfaces as an error naming the failed
/// stage and field.
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { file, store } => {
            let settings = store.into_settings()?;
            let store = DynamoStore::connect(&settings).await;
            let nodes = StaticNodeInfo::new(settings.hardware.clone());
            let pipeline = Pipeline::new(&settings, &nodes, &store);

            let bytes = tokio::fs::read(&file).await.map_err(|source| {
                IngestError::Fetch(FetchError::File {
                    path: file.display().to_string(),
                    source,
                })
            })?;
            let record = pipeline.ingest_bytes(&bytes, None).await?;

            println!(
                "persisted {} record {} for model '{}' at {}",
                record.benchmark_type, record.workflow_id, record.model_name, record.datetime
            );
            Ok(())
        }
        Commands::Batch { objects, store } => {
            let settings = store.into_settings()?;
            let store = DynamoStore::connect(&settings).await;
            let fetcher = S3Fetcher::connect(&settings).await;
            let nodes = StaticNodeInfo::new(settings.hardware.clone());
            let pipeline = Pipeline::new(&settings, &nodes, &store);

            let refs = objects
                .iter()
                .map(|uri| ObjectRef::from_uri(uri))
                .collect::<Result<Vec<_>, _>>()?;

            let outcomes = pipeline.ingest_batch(&fetcher, &refs).await;
            let mut failed = 0usize;
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(record) => {
                        println!("{}: persisted record {}", outcome.object, record.workflow_id);
                    }
                    Err(err) => {
                        failed += 1;
                        eprintln!("{}: {} stage failed: {err}", outcome.object, err.stage());
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{failed} of {} documents failed", outcomes.len());
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_are_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_subcommand_parses_store_opts() {
        let cli = Cli::parse_from([
            "benchsink",
            "run",
            "results.json",
            "--table-name",
            "benchmark-result",
            "--utc-offset",
            "+00:00",
        ]);
        let Commands::Run { file, store } = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(file, PathBuf::from("results.json"));
        assert_eq!(store.table_name, "benchmark-result");
        assert_eq!(store.region, DEFAULT_REGION);
        assert_eq!(store.utc_offset, "+00:00");
    }
}
