//! Connection provider seam
//!
//! The reader does not talk to a database library directly. It asks a
//! [`ConnectionProvider`] for a fresh [`Connection`] per operation, runs a
//! single SELECT on it and closes it again. Implementations decide how the
//! connection string is interpreted.

use std::fmt;

use tracing::warn;

use crate::error::PagerResult;

/// A raw cell value as returned by the data source
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl RawValue {
    /// Runtime type name of the value
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Integer(_) => "integer",
            RawValue::Real(_) => "real",
            RawValue::Text(_) => "text",
            RawValue::Blob(_) => "blob",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Textual form of the value, `None` for NULL
    pub fn to_text(&self) -> Option<String> {
        match self {
            RawValue::Null => None,
            RawValue::Integer(i) => Some(i.to_string()),
            RawValue::Real(f) => Some(f.to_string()),
            RawValue::Text(s) => Some(s.clone()),
            RawValue::Blob(bytes) => Some(
                bytes
                    .iter()
                    .map(|b| format!("{:02x}", b))
                    .collect::<String>(),
            ),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => write!(f, "{}", text),
            None => write!(f, "NULL"),
        }
    }
}

/// Result column metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultColumn {
    pub name: String,
    /// Declared type from the schema, when the source knows it
    pub declared_type: Option<String>,
}

impl ResultColumn {
    pub fn new(name: impl Into<String>, declared_type: Option<String>) -> Self {
        Self {
            name: name.into(),
            declared_type,
        }
    }
}

/// Columns and rows of an executed SELECT
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<ResultColumn>,
    pub rows: Vec<Vec<RawValue>>,
}

impl ResultSet {
    /// Value at (row, column), `None` when out of bounds
    pub fn value_at(&self, row: usize, column: usize) -> Option<&RawValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}

/// An open connection to the data source
pub trait Connection {
    /// Run a SELECT and return all of its rows
    fn execute_select(&mut self, sql: &str) -> PagerResult<ResultSet>;

    /// Close the connection and release it
    fn close(self: Box<Self>) -> PagerResult<()>;
}

/// Opens connections on demand
pub trait ConnectionProvider {
    /// Provider name used in log and error messages
    fn name(&self) -> &str;

    fn open(&self) -> PagerResult<Box<dyn Connection>>;
}

impl<P: ConnectionProvider + ?Sized> ConnectionProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn open(&self) -> PagerResult<Box<dyn Connection>> {
        (**self).open()
    }
}

/// A connection that is closed when the guard goes out of scope, on every
/// path including early returns.
pub struct ScopedConnection {
    inner: Option<Box<dyn Connection>>,
}

impl ScopedConnection {
    pub fn open<P: ConnectionProvider + ?Sized>(provider: &P) -> PagerResult<Self> {
        let inner = provider.open()?;
        Ok(Self { inner: Some(inner) })
    }

    pub fn execute_select(&mut self, sql: &str) -> PagerResult<ResultSet> {
        match self.inner.as_mut() {
            Some(conn) => conn.execute_select(sql),
            None => Err(crate::error::PagerError::query(sql, "connection already closed")),
        }
    }

    /// Close now and report any close failure
    pub fn close(mut self) -> PagerResult<()> {
        match self.inner.take() {
            Some(conn) => conn.close(),
            None => Ok(()),
        }
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.inner.take() {
            if let Err(e) = conn.close() {
                warn!(target: "provider", "{}", e);
            }
        }
    }
}
