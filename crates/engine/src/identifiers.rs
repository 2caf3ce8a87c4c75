use crate::{EngineError, EngineResult};

pub const CSV_EXTENSION: &str = ".csv";

/// Table name for a source file: the file name with its `.csv` suffix removed.
///
/// Returns `None` for files that are not CSV files or whose stem is empty.
pub fn derive_table_name(file_name: &str) -> Option<String> {
    let stem = file_name.strip_suffix(CSV_EXTENSION)?;
    if stem.is_empty() {
        return None;
    }
    Some(stem.to_string())
}

pub fn validate_table_name(table_name: &str) -> EngineResult<()> {
    if table_name.is_empty() {
        return Err(invalid(table_name, "table name is empty"));
    }
    if table_name.contains('\0') {
        return Err(invalid(table_name, "table name contains a NUL character"));
    }
    Ok(())
}

/// Quote an identifier for interpolation into SQL text.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a value as a SQL string literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn invalid(name: &str, reason: &'static str) -> EngineError {
    EngineError::InvalidTableName {
        name: name.to_string(),
        reason,
    }
}
