//! SQLite store gateway
//!
//! The gateway owns the single live connection for the process lifetime and
//! exposes the three operations the handlers are written against: a
//! parameterized write, a read returning textual rows, and the current value
//! of a named auto-increment sequence.

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Params};
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Wraps the one live database connection.
pub struct Store {
    path: PathBuf,
    conn: Connection,
}

impl Store {
    /// Opens the database at `path`, creating it and applying the schema on
    /// first use.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        let store = Self { path, conn };
        store.init_schema()?;

        tracing::debug!(path = %store.path.display(), "opened store");
        Ok(store)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<(), StoreError> {
        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        if current == 0 {
            self.conn.execute_batch(include_str!("schema.sql"))?;
        } else if current != SCHEMA_VERSION {
            return Err(StoreError::SchemaVersion {
                found: current,
                supported: SCHEMA_VERSION,
            });
        }

        Ok(())
    }

    /// Returns the path to the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs a parameterized write statement, returning the affected-row
    /// count. Constraint violations surface as [`StoreError::Sql`].
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize, StoreError> {
        self.conn.execute(sql, params).map_err(|e| {
            tracing::debug!(%sql, error = %e, "statement failed");
            StoreError::Sql(e)
        })
    }

    /// Runs a read statement and returns every row with each column coerced
    /// to text. NULL renders as the empty string; no rows is an empty vector.
    pub fn query_rows<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Vec<String>>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let column_count = stmt.column_count();

        let rows = stmt.query_map(params, |row| {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value = match row.get::<_, Value>(i)? {
                    Value::Null => String::new(),
                    Value::Integer(n) => n.to_string(),
                    Value::Real(f) => f.to_string(),
                    Value::Text(s) => s,
                    Value::Blob(_) => "<blob>".to_string(),
                };
                values.push(value);
            }
            Ok(values)
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::Sql)
    }

    /// Returns the last value produced by a named SQLite auto-increment
    /// sequence, or `None` when the sequence has produced nothing yet.
    ///
    /// The primary handlers allocate ids via [`crate::db::next_id`]; this is
    /// the sequence-based alternative kept on the gateway.
    pub fn current_sequence_value(&self, name: &str) -> Result<Option<i64>, StoreError> {
        let result = self
            .conn
            .query_row(
                "SELECT seq FROM sqlite_sequence WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional();

        match result {
            Ok(value) => Ok(value),
            // sqlite_sequence does not exist until an AUTOINCREMENT table
            // has inserted at least once
            Err(rusqlite::Error::SqliteFailure(_, Some(ref msg))) if msg.contains("no such table") => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Releases the connection. Called at most once; release errors are
    /// logged and swallowed.
    pub fn close(self) {
        let path = self.path;
        if let Err((_conn, e)) = self.conn.close() {
            tracing::warn!(path = %path.display(), error = %e, "error releasing connection");
        } else {
            tracing::debug!(path = %path.display(), "closed store");
        }
    }
}
