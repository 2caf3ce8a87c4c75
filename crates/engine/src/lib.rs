mod db_manager;
mod error;
mod identifiers;
mod ingest;
pub mod loader;
mod schema;
mod table;

pub use db_manager::{DatabaseTarget, DbManager, DEFAULT_DATABASE};
pub use error::{EngineError, EngineResult};
pub use identifiers::{derive_table_name, quote_identifier, validate_table_name, CSV_EXTENSION};
pub use ingest::{ingest_table, write_table, IngestStats};
pub use loader::{FileOutcome, RunSummary, SourceFile, COMPLETION_MARKER};
pub use schema::{list_tables, row_count, table_schema, TableColumn};
pub use table::{read_csv, Column, ColumnType, Table};
