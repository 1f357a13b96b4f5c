use thiserror::Error;

/// Failures surfaced by the data-access layer
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PagerError {
    #[error("failed to open {provider} connection: {reason}")]
    ConnectionOpen { provider: String, reason: String },

    #[error("query failed: {reason} (sql: {sql})")]
    QueryExecution { sql: String, reason: String },

    #[error("failed to close connection: {reason}")]
    Close { reason: String },

    #[error("unsupported provider '{0}'")]
    UnsupportedProvider(String),

    #[error("invalid connection string '{0}'")]
    InvalidConnectionString(String),

    #[error("failed to seed data: {reason}")]
    Seed { reason: String },
}

impl PagerError {
    pub fn query(sql: &str, reason: impl ToString) -> Self {
        PagerError::QueryExecution {
            sql: sql.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type PagerResult<T> = Result<T, PagerError>;
