use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "inventory_cli", about = "CSV to database ingestion helper", version)]
struct Cli {
    /// Target database connection string (overrides config)
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replace one table per CSV file in the data directory
    Ingest {
        /// Directory scanned for *.csv files
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Run log file, appended to
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// List the tables in the database
    Tables,
    /// Print the column schema of a table as JSON
    Schema { table: String },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = inventory_ingest_lib::IngestConfig::load()?;
    if let Some(database) = cli.database {
        config.database = database;
    }

    match cli.command {
        Command::Ingest { data_dir, log_file } => {
            if let Some(data_dir) = data_dir {
                config.data_dir = data_dir;
            }
            if let Some(log_file) = log_file {
                config.log_file = log_file;
            }
            commands::ingest::run(&config)
        }
        Command::Tables => commands::inspect::tables(&config.database),
        Command::Schema { table } => commands::inspect::schema(&config.database, &table),
    }
}
