use duckdb::{Connection, ToSql};
use tracing::{debug, error, info};

use crate::identifiers::{quote_identifier, validate_table_name};
use crate::table::Table;
use crate::EngineResult;

/// Shape of a table after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub rows: usize,
    pub columns: usize,
}

/// Write `table` into the database and log the outcome.
///
/// The error is logged here and still returned to the caller.
pub fn ingest_table(
    conn: &mut Connection,
    table_name: &str,
    table: &Table,
) -> EngineResult<IngestStats> {
    info!("Ingesting {table_name} into database...");
    match write_table(conn, table_name, table) {
        Ok(stats) => {
            info!("Successfully ingested {table_name}");
            debug!(rows = stats.rows, columns = stats.columns, "wrote {table_name}");
            Ok(stats)
        }
        Err(err) => {
            error!("Error ingesting {table_name}: {err}");
            Err(err)
        }
    }
}

/// Replace `table_name` with the contents of `table`.
///
/// Drop, create and the bulk append share one transaction: on failure the
/// previous table is left as it was.
pub fn write_table(
    conn: &mut Connection,
    table_name: &str,
    table: &Table,
) -> EngineResult<IngestStats> {
    validate_table_name(table_name)?;
    let quoted = quote_identifier(table_name);

    let tx = conn.transaction()?;
    tx.execute_batch(&format!("DROP TABLE IF EXISTS {quoted}"))?;
    tx.execute_batch(&create_table_sql(&quoted, table))?;
    {
        // The appender takes the raw table name, not a SQL identifier.
        let mut appender = tx.appender(table_name)?;
        for row in table.typed_rows() {
            let params: Vec<&dyn ToSql> = row.iter().map(|v| v as &dyn ToSql).collect();
            appender.append_row(params.as_slice())?;
        }
        appender.flush()?;
    }
    tx.commit()?;

    Ok(IngestStats {
        rows: table.row_count(),
        columns: table.column_count(),
    })
}

fn create_table_sql(quoted_table: &str, table: &Table) -> String {
    let columns = table
        .columns()
        .iter()
        .map(|column| {
            format!(
                "{} {}",
                quote_identifier(&column.name),
                column.column_type.sql_name()
            )
        })
        .collect::<Vec<String>>()
        .join(", ");
    format!("CREATE TABLE {quoted_table} ({columns})")
}
