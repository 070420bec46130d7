//! Identifier allocation
//!
//! Record ids are derived from the current table contents rather than a
//! store-managed sequence: the next id is `MAX(id) + 1`, and an empty table
//! allocates 1. Every id column is a primary key, so a stale read fails the
//! subsequent insert instead of silently colliding.

use crate::db::Store;
use crate::error::StoreError;

/// Returns the next unused integer identifier for `table`.
///
/// `table` and `id_column` are compile-time constants supplied by the
/// operations layer, never user input.
pub fn next_id(
    store: &Store,
    table: &'static str,
    id_column: &'static str,
) -> Result<i64, StoreError> {
    let sql = format!("SELECT MAX({}) FROM {}", id_column, table);
    let rows = store.query_rows(&sql, [])?;

    // MAX() over an empty table yields a single NULL, which the gateway
    // renders as the empty string
    let scalar = rows
        .first()
        .and_then(|row| row.first())
        .map(String::as_str)
        .unwrap_or("");

    let max = if scalar.is_empty() {
        0
    } else {
        scalar.parse::<i64>().map_err(|_| StoreError::Scalar {
            table,
            column: id_column,
            value: scalar.to_string(),
        })?
    };

    Ok(max + 1)
}
