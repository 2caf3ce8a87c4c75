//! One pass over a data directory: every `*.csv` file replaces the table
//! named after it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use duckdb::Connection;
use tracing::{error, info, warn};

use crate::identifiers::derive_table_name;
use crate::ingest::{ingest_table, IngestStats};
use crate::table::read_csv;
use crate::{DbManager, EngineError, EngineResult};

pub const COMPLETION_MARKER: &str = "----------------Ingestion Complete----------------";

/// A CSV file found in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub file_name: String,
    pub path: PathBuf,
    pub table_name: String,
}

/// Result of ingesting one file.
#[derive(Debug)]
pub struct FileOutcome {
    pub file_name: String,
    pub table_name: String,
    pub result: EngineResult<IngestStats>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub outcomes: Vec<FileOutcome>,
    /// Tables written more than once in this run because two file names
    /// differ only in case.
    pub overwritten: Vec<String>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed.as_secs_f64() / 60.0
    }
}

/// Fails with [`EngineError::Configuration`] when `source_dir` is missing.
pub fn check_source_dir(source_dir: &Path) -> EngineResult<()> {
    if source_dir.is_dir() {
        return Ok(());
    }
    error!("Data folder not found: {}", source_dir.display());
    Err(EngineError::Configuration {
        path: source_dir.to_path_buf(),
    })
}

/// CSV files directly inside `source_dir`, sorted by file name.
pub fn discover_csv_files(source_dir: &Path) -> EngineResult<Vec<SourceFile>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(source_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            warn!("Skipping file with non UTF-8 name: {}", path.display());
            continue;
        };
        if let Some(table_name) = derive_table_name(&file_name) {
            files.push(SourceFile {
                file_name,
                path,
                table_name,
            });
        }
    }
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}

/// Load every CSV file in `source_dir` into `db`.
///
/// A file that fails to parse or write is logged and recorded in the summary;
/// the remaining files are still processed.
pub fn run(source_dir: &Path, db: &mut DbManager) -> EngineResult<RunSummary> {
    let start = Instant::now();
    check_source_dir(source_dir)?;

    let files = discover_csv_files(source_dir)?;
    let mut outcomes = Vec::with_capacity(files.len());
    let mut overwritten = Vec::new();
    // Identifier case is folded by the database, so `a.csv` and `A.csv`
    // land in the same table.
    let mut written: HashMap<String, String> = HashMap::new();

    for source in &files {
        let outcome = ingest_file(source, db.connection_mut());
        if outcome.is_success() {
            let key = source.table_name.to_ascii_lowercase();
            if let Some(previous) = written.insert(key, source.file_name.clone()) {
                warn!(
                    "Table {} from {} overwrites table ingested earlier in this run from {}",
                    source.table_name, source.file_name, previous
                );
                overwritten.push(source.table_name.clone());
            }
        }
        outcomes.push(outcome);
    }

    let summary = RunSummary {
        outcomes,
        overwritten,
        elapsed: start.elapsed(),
    };
    info!("{COMPLETION_MARKER}");
    info!("Total time taken: {:.2} minutes", summary.elapsed_minutes());
    Ok(summary)
}

fn ingest_file(source: &SourceFile, conn: &mut Connection) -> FileOutcome {
    let result = read_csv(&source.path)
        .and_then(|table| {
            info!("Processing file: {}", source.file_name);
            ingest_table(conn, &source.table_name, &table)
        })
        .map_err(|err| {
            error!("Failed to process {}: {err}", source.file_name);
            EngineError::FileProcessing {
                file: source.file_name.clone(),
                source: Box::new(err),
            }
        });

    FileOutcome {
        file_name: source.file_name.clone(),
        table_name: source.table_name.clone(),
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{list_tables, row_count, table_schema};
    use std::io;
    use std::sync::{Arc, Mutex};

    fn data_dir(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).expect("write fixture");
        }
        dir
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Everything logged at INFO and above while `f` runs.
    fn captured_logs(f: impl FnOnce()) -> String {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let bytes = capture.0.lock().expect("lock").clone();
        String::from_utf8(bytes).expect("utf8")
    }

    fn column_names(db: &DbManager, table: &str) -> Vec<String> {
        table_schema(db.connection(), table)
            .expect("schema")
            .into_iter()
            .map(|c| c.name)
            .collect()
    }

    #[test]
    fn each_csv_becomes_a_table_named_after_the_file() {
        let dir = data_dir(&[
            ("sales.csv", "store,brand,qty\n1,58,2\n1,60,1\n2,58,7\n"),
            ("vendor_invoice.csv", "vendor,dollars\nacme,10.5\n"),
        ]);
        let mut db = DbManager::open_in_memory().expect("db");

        let summary = run(dir.path(), &mut db).expect("run");
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 0);

        assert_eq!(
            list_tables(db.connection()).expect("tables"),
            vec!["sales", "vendor_invoice"]
        );
        assert_eq!(column_names(&db, "sales"), vec!["store", "brand", "qty"]);
        assert_eq!(row_count(db.connection(), "sales").expect("count"), 3);
        assert_eq!(row_count(db.connection(), "vendor_invoice").expect("count"), 1);
    }

    #[test]
    fn second_run_replaces_instead_of_appending() {
        let dir = data_dir(&[("purchases.csv", "id,amount\n1,5\n2,6\n")]);
        let mut db = DbManager::open_in_memory().expect("db");

        run(dir.path(), &mut db).expect("first run");
        run(dir.path(), &mut db).expect("second run");

        assert_eq!(row_count(db.connection(), "purchases").expect("count"), 2);
        assert_eq!(column_names(&db, "purchases"), vec!["id", "amount"]);
    }

    #[test]
    fn malformed_file_does_not_stop_the_run() {
        let dir = data_dir(&[
            ("a_good.csv", "x\n1\n"),
            ("b_bad.csv", "x,y\n1,2\n3,4,5\n"),
            ("c_good.csv", "y\n2\n"),
        ]);
        let mut db = DbManager::open_in_memory().expect("db");

        let summary = run(dir.path(), &mut db).expect("run");
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 1);

        let failure = summary.failures().next().expect("one failure");
        assert_eq!(failure.file_name, "b_bad.csv");
        let err = failure.result.as_ref().expect_err("failed outcome");
        assert!(matches!(err, EngineError::FileProcessing { .. }));
        assert!(err.to_string().contains("b_bad.csv"));
        assert!(err.to_string().contains("data row 2 has 3 fields, expected 2"));

        assert_eq!(
            list_tables(db.connection()).expect("tables"),
            vec!["a_good", "c_good"]
        );
    }

    #[test]
    fn files_with_short_rows_still_load() {
        let dir = data_dir(&[("short.csv", "a,b\n1,2\n3\n")]);
        let mut db = DbManager::open_in_memory().expect("db");

        let summary = run(dir.path(), &mut db).expect("run");
        assert_eq!(summary.failed(), 0);
        assert_eq!(row_count(db.connection(), "short").expect("count"), 2);

        let nulls: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM short WHERE b IS NULL", [], |row| {
                row.get(0)
            })
            .expect("query");
        assert_eq!(nulls, 1);
    }

    #[test]
    fn missing_directory_is_a_configuration_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("data");
        let mut db = DbManager::open_in_memory().expect("db");

        let mut result = None;
        let logs = captured_logs(|| result = Some(run(&missing, &mut db)));

        let err = result.expect("ran").expect_err("should fail");
        assert!(matches!(err, EngineError::Configuration { ref path } if path == &missing));
        assert!(list_tables(db.connection()).expect("tables").is_empty());
        assert!(logs.contains("ERROR"));
        assert!(logs.contains(&format!("Data folder not found: {}", missing.display())));
        assert!(!logs.contains(COMPLETION_MARKER));
    }

    #[test]
    fn empty_directory_writes_nothing() {
        let dir = data_dir(&[]);
        let mut db = DbManager::open_in_memory().expect("db");

        let mut summary = None;
        let logs = captured_logs(|| summary = Some(run(dir.path(), &mut db).expect("run")));

        assert!(summary.expect("ran").outcomes.is_empty());
        assert!(list_tables(db.connection()).expect("tables").is_empty());
        assert!(logs.contains(COMPLETION_MARKER));
        assert!(logs.contains("Total time taken: 0.00 minutes"));
    }

    #[test]
    fn non_csv_entries_are_ignored() {
        let dir = data_dir(&[
            ("readme.txt", "not data"),
            ("stock.CSV", "a\n1\n"),
            ("stock.csv", "a\n1\n"),
        ]);
        fs::create_dir(dir.path().join("nested.csv")).expect("mkdir");

        let files = discover_csv_files(dir.path()).expect("discover");
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["stock.csv"]);
        assert_eq!(files[0].table_name, "stock");
    }

    #[test]
    fn files_are_processed_in_name_order() {
        let dir = data_dir(&[("b.csv", "x\n1\n"), ("c.csv", "x\n1\n"), ("a.csv", "x\n1\n")]);
        let mut db = DbManager::open_in_memory().expect("db");

        let summary = run(dir.path(), &mut db).expect("run");
        let order: Vec<&str> = summary
            .outcomes
            .iter()
            .map(|o| o.file_name.as_str())
            .collect();
        assert_eq!(order, vec!["a.csv", "b.csv", "c.csv"]);
    }

    #[test]
    fn names_differing_only_in_case_share_a_table() {
        let dir = data_dir(&[("Stock.csv", "upper\n1\n"), ("stock.csv", "lower\n1\n2\n")]);
        let mut db = DbManager::open_in_memory().expect("db");

        let summary = run(dir.path(), &mut db).expect("run");
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.overwritten, vec!["stock"]);

        let tables = list_tables(db.connection()).expect("tables");
        assert_eq!(tables.len(), 1);
        assert_eq!(column_names(&db, "stock"), vec!["lower"]);
        assert_eq!(row_count(db.connection(), "stock").expect("count"), 2);
    }

    #[test]
    fn logs_per_file_steps_and_completion() {
        let dir = data_dir(&[("good.csv", "x\n1\n"), ("bad.csv", "")]);
        let mut db = DbManager::open_in_memory().expect("db");

        let logs = captured_logs(|| {
            run(dir.path(), &mut db).expect("run");
        });

        assert!(logs.contains("Failed to process bad.csv: CSV file has no header row"));
        assert!(logs.contains("Processing file: good.csv"));
        assert!(logs.contains("Ingesting good into database..."));
        assert!(logs.contains("Successfully ingested good"));
        assert!(logs.contains(COMPLETION_MARKER));
        assert!(logs.contains("Total time taken: 0.00 minutes"));
    }
}
