mod config;
pub mod logging;

use std::io::{self, Write};

use anyhow::Context;
use inventory_engine::loader::{self, RunSummary};
use inventory_engine::{DbManager, EngineError};

pub use config::IngestConfig;

/// Entry point of the batch job: load every CSV file of the configured data
/// directory into the configured database.
///
/// Failures are reported on the console and in the run log; this never panics
/// and always returns normally.
pub fn run() {
    let config = match IngestConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err:#}");
            return;
        }
    };

    let _guard = match logging::init(&config) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("error: {err:#}");
            return;
        }
    };

    if let Err(err) = run_with_config(&config) {
        tracing::error!("Ingestion aborted: {err:#}");
        eprintln!("error: {err:#}");
    }
}

/// Run one ingestion pass, printing the console messages to stdout.
/// Returns `Ok(None)` when the data directory is missing, in which case the
/// database is never opened.
pub fn run_with_config(config: &IngestConfig) -> anyhow::Result<Option<RunSummary>> {
    run_with_output(config, &mut io::stdout().lock())
}

/// [`run_with_config`] with the console messages written to `out`.
pub fn run_with_output<W: Write>(
    config: &IngestConfig,
    out: &mut W,
) -> anyhow::Result<Option<RunSummary>> {
    if let Err(EngineError::Configuration { path }) = loader::check_source_dir(&config.data_dir) {
        writeln!(out, "Error: '{}' folder not found.", path.display())?;
        return Ok(None);
    }

    let mut db = DbManager::open(&config.database)
        .with_context(|| format!("failed to open database {}", config.database))?;

    match loader::run(&config.data_dir, &mut db) {
        Ok(summary) => {
            writeln!(out, "Ingestion Complete.")?;
            Ok(Some(summary))
        }
        Err(EngineError::Configuration { path }) => {
            writeln!(out, "Error: '{}' folder not found.", path.display())?;
            Ok(None)
        }
        Err(err) => Err(err).context("ingestion failed"),
    }
}
