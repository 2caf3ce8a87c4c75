use std::collections::HashMap;
use std::path::Path;

use csv::ReaderBuilder;
use duckdb::types::Value;

use crate::{EngineError, EngineResult};

/// Storage type inferred for a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    BigInt,
    Double,
    Boolean,
    Varchar,
}

impl ColumnType {
    pub fn sql_name(self) -> &'static str {
        match self {
            ColumnType::BigInt => "BIGINT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Varchar => "VARCHAR",
        }
    }

    /// Narrowest type that holds every non-empty cell.
    fn infer<'a>(cells: impl Iterator<Item = &'a str> + Clone) -> Self {
        let mut present = cells.filter(|cell| !cell.is_empty()).peekable();
        if present.peek().is_none() {
            return ColumnType::Varchar;
        }
        [ColumnType::BigInt, ColumnType::Double, ColumnType::Boolean]
            .into_iter()
            .find(|candidate| present.clone().all(|cell| candidate.accepts(cell)))
            .unwrap_or(ColumnType::Varchar)
    }

    fn accepts(self, cell: &str) -> bool {
        let cell = cell.trim();
        match self {
            ColumnType::BigInt => cell.parse::<i64>().is_ok(),
            // `f64::from_str` also takes "inf" and "NaN"; require a digit so
            // words stay text.
            ColumnType::Double => {
                cell.bytes().any(|b| b.is_ascii_digit()) && cell.parse::<f64>().is_ok()
            }
            ColumnType::Boolean => parse_bool(cell).is_some(),
            ColumnType::Varchar => true,
        }
    }

    /// Database value for one cell. Empty cells are NULL; a cell the type
    /// does not accept is passed through as text.
    pub fn to_value(self, cell: &str) -> Value {
        if cell.is_empty() {
            return Value::Null;
        }
        let trimmed = cell.trim();
        let typed = match self {
            ColumnType::BigInt => trimmed.parse().ok().map(Value::BigInt),
            ColumnType::Double => trimmed.parse().ok().map(Value::Double),
            ColumnType::Boolean => parse_bool(trimmed).map(Value::Boolean),
            ColumnType::Varchar => None,
        };
        typed.unwrap_or_else(|| Value::Text(cell.to_string()))
    }
}

fn parse_bool(cell: &str) -> Option<bool> {
    if cell.eq_ignore_ascii_case("true") {
        Some(true)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

/// Rows of a parsed CSV file under named, typed columns.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from a header record and its data records.
    ///
    /// Short records are padded with empty cells (NULL); a record wider than
    /// the header is an error.
    pub fn from_records(headers: Vec<String>, mut rows: Vec<Vec<String>>) -> EngineResult<Self> {
        if headers.is_empty() {
            return Err(EngineError::EmptyHeader);
        }
        let width = headers.len();
        for (index, cells) in rows.iter_mut().enumerate() {
            if cells.len() > width {
                return Err(EngineError::RowWidth {
                    row: index + 1,
                    expected: width,
                    found: cells.len(),
                });
            }
            cells.resize(width, String::new());
        }
        let names = normalize_headers(headers);
        let columns = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| Column {
                name,
                column_type: ColumnType::infer(rows.iter().map(move |row| row[index].as_str())),
            })
            .collect();
        Ok(Self { columns, rows })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(columns: Vec<Column>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows converted to database values according to their column types.
    pub fn typed_rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        self.rows.iter().map(move |row| {
            self.columns
                .iter()
                .zip(row)
                .map(|(column, cell)| column.column_type.to_value(cell))
                .collect()
        })
    }
}

/// Blank headers become `Unnamed: <index>`; repeats get `.1`, `.2`, ... suffixes.
fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(headers.len());
    for (index, header) in headers.into_iter().enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {index}")
        } else {
            header
        };
        let key = base.to_ascii_lowercase();
        let mut name = base.clone();
        if let Some(&used) = seen.get(&key) {
            let mut suffix = used;
            loop {
                suffix += 1;
                name = format!("{base}.{suffix}");
                if !seen.contains_key(&name.to_ascii_lowercase()) {
                    break;
                }
            }
            seen.insert(key, suffix);
        }
        seen.insert(name.to_ascii_lowercase(), 0);
        names.push(name);
    }
    names
}

/// Parse a comma-delimited file with a header row.
///
/// Records may omit trailing fields; header names are kept verbatim.
pub fn read_csv(path: &Path) -> EngineResult<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Table::from_records(headers, rows)
}
