//! SQLite connection provider backed by rusqlite

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::OpenFlags;
use tracing::debug;

use crate::error::{PagerError, PagerResult};
use crate::provider::{Connection, ConnectionProvider, RawValue, ResultColumn, ResultSet};

pub const SQLITE_PROVIDER: &str = "SQLite";

/// Extension appended to `DB_NAME`
const DB_EXTENSION: &str = "db";

/// Resolve a provider by name
pub fn open_provider(
    provider_name: &str,
    connection_string: &str,
) -> PagerResult<Box<dyn ConnectionProvider>> {
    if provider_name.eq_ignore_ascii_case(SQLITE_PROVIDER) {
        Ok(Box::new(SqliteProvider::from_connection_string(
            connection_string,
        )?))
    } else {
        Err(PagerError::UnsupportedProvider(provider_name.to_string()))
    }
}

/// Opens a new SQLite connection to the same database file for every call
#[derive(Debug, Clone)]
pub struct SqliteProvider {
    path: PathBuf,
}

impl SqliteProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Accepts `DB_DIR=<dir>;DB_NAME=<name>` (database file `<dir>/<name>.db`)
    /// or a bare file path.
    pub fn from_connection_string(connection_string: &str) -> PagerResult<Self> {
        let trimmed = connection_string.trim();
        if trimmed.is_empty() {
            return Err(PagerError::InvalidConnectionString(
                connection_string.to_string(),
            ));
        }
        if !trimmed.contains('=') {
            return Ok(Self::new(trimmed));
        }

        let mut dir = None;
        let mut name = None;
        for part in trimmed.split(';').filter(|p| !p.trim().is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                PagerError::InvalidConnectionString(connection_string.to_string())
            })?;
            match key.trim().to_ascii_uppercase().as_str() {
                "DB_DIR" => dir = Some(value.trim().to_string()),
                "DB_NAME" => name = Some(value.trim().to_string()),
                other => debug!(target: "provider", "Ignoring connection option {}", other),
            }
        }

        let name = name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| PagerError::InvalidConnectionString(connection_string.to_string()))?;
        let dir = dir.unwrap_or_else(|| ".".to_string());
        Ok(Self::new(
            Path::new(&dir).join(format!("{}.{}", name, DB_EXTENSION)),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a plain rusqlite connection, creating the file when missing
    pub fn open_raw(&self) -> PagerResult<rusqlite::Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        rusqlite::Connection::open_with_flags(&self.path, flags).map_err(|e| {
            PagerError::ConnectionOpen {
                provider: SQLITE_PROVIDER.to_string(),
                reason: format!("{}: {}", self.path.display(), e),
            }
        })
    }
}

impl ConnectionProvider for SqliteProvider {
    fn name(&self) -> &str {
        SQLITE_PROVIDER
    }

    fn open(&self) -> PagerResult<Box<dyn Connection>> {
        debug!(target: "provider", "Opening {}", self.path.display());
        let conn = self.open_raw()?;
        Ok(Box::new(SqliteConnection { conn }))
    }
}

pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl Connection for SqliteConnection {
    fn execute_select(&mut self, sql: &str) -> PagerResult<ResultSet> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| PagerError::query(sql, e))?;

        let columns: Vec<ResultColumn> = stmt
            .columns()
            .iter()
            .map(|c| ResultColumn::new(c.name(), c.decl_type().map(str::to_string)))
            .collect();
        let column_count = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([]).map_err(|e| PagerError::query(sql, e))?;
        while let Some(row) = cursor.next().map_err(|e| PagerError::query(sql, e))? {
            let mut values = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                let value = row.get_ref(idx).map_err(|e| PagerError::query(sql, e))?;
                values.push(raw_value(value));
            }
            rows.push(values);
        }

        Ok(ResultSet { columns, rows })
    }

    fn close(self: Box<Self>) -> PagerResult<()> {
        self.conn.close().map_err(|(_, e)| PagerError::Close {
            reason: e.to_string(),
        })
    }
}

fn raw_value(value: ValueRef<'_>) -> RawValue {
    match value {
        ValueRef::Null => RawValue::Null,
        ValueRef::Integer(i) => RawValue::Integer(i),
        ValueRef::Real(f) => RawValue::Real(f),
        ValueRef::Text(bytes) => RawValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => RawValue::Blob(bytes.to_vec()),
    }
}
