use duckdb::Connection;
use serde::{Deserialize, Serialize};

use crate::identifiers::{quote_identifier, quote_literal, validate_table_name};
use crate::EngineResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableColumn {
    pub cid: i64,
    pub name: String,
    pub data_type: String,
    pub notnull: bool,
    pub default_value: Option<String>,
    pub primary_key: bool,
}

pub fn table_schema(conn: &Connection, table_name: &str) -> EngineResult<Vec<TableColumn>> {
    validate_table_name(table_name)?;
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_literal(table_name)))?;
    let columns = stmt
        .query_map([], |row| {
            Ok(TableColumn {
                cid: row.get("cid")?,
                name: row.get("name")?,
                data_type: row.get("type")?,
                notnull: row.get("notnull")?,
                default_value: row.get("dflt_value")?,
                primary_key: row.get("pk")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Names of the base tables in the main schema, sorted.
pub fn list_tables(conn: &Connection) -> EngineResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT table_name FROM information_schema.tables
         WHERE table_schema = 'main' AND table_type = 'BASE TABLE'
         ORDER BY table_name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

pub fn row_count(conn: &Connection, table_name: &str) -> EngineResult<u64> {
    validate_table_name(table_name)?;
    let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table_name));
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count.max(0) as u64)
}
