//! Store-level error taxonomy
//!
//! Statement failures and malformed results surface as `StoreError`.
//! Recoverable workflow rejections (unknown mechanic, already closed, ...)
//! are not errors; they are modeled as outcome values in `ops`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed statement or constraint violation from SQLite
    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// Failed to create the directory holding the database file
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The scalar read back for an id allocation was not an integer
    #[error("cannot derive next id for {table}.{column}: {value:?} is not an integer")]
    Scalar {
        table: &'static str,
        column: &'static str,
        value: String,
    },

    /// The database reports a schema version this binary does not understand
    #[error("database schema version {found} is not supported (expected {supported})")]
    SchemaVersion { found: i32, supported: i32 },
}
