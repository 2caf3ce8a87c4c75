use std::path::{Path, PathBuf};

use duckdb::Connection;
use tracing::debug;

use crate::EngineResult;

pub const DEFAULT_DATABASE: &str = "inventory.db";

const IN_MEMORY: &str = ":memory:";
const URL_PREFIXES: [&str; 2] = ["sqlite:///", "duckdb:///"];

/// Where the target database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    InMemory,
    File(PathBuf),
}

impl DatabaseTarget {
    /// Accepts `:memory:`, a `sqlite:///path` or `duckdb:///path` URL, or a
    /// bare file path.
    pub fn parse(connection: &str) -> Self {
        let connection = connection.trim();
        let path = URL_PREFIXES
            .iter()
            .find_map(|prefix| connection.strip_prefix(prefix))
            .unwrap_or(connection);
        if path.is_empty() || path == IN_MEMORY {
            DatabaseTarget::InMemory
        } else {
            DatabaseTarget::File(PathBuf::from(path))
        }
    }
}

/// Owns the single connection used for a run. Dropping it closes the database.
pub struct DbManager {
    conn: Connection,
    target: DatabaseTarget,
}

impl DbManager {
    pub fn open(connection: &str) -> EngineResult<Self> {
        match DatabaseTarget::parse(connection) {
            DatabaseTarget::InMemory => Self::open_in_memory(),
            DatabaseTarget::File(path) => Self::open_file(path),
        }
    }

    pub fn open_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        debug!("opening database {}", path.display());
        let conn = Connection::open(path)?;
        Ok(Self {
            conn,
            target: DatabaseTarget::File(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> EngineResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn,
            target: DatabaseTarget::InMemory,
        })
    }

    pub fn target(&self) -> &DatabaseTarget {
        &self.target
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}
