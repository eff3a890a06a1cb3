//! Display-ready projection of a read result.

use crate::db::{Row, Value};
use serde::Serialize;

/// Column headers plus row values in header order.
///
/// Headers come from the first row's labels. Every row is projected by label,
/// so a label missing from a later row shows as NULL and a label only present
/// in a later row is dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl DisplayTable {
    /// Builds a table from gateway rows. No rows gives no columns.
    pub fn from_rows(rows: &[Row]) -> Self {
        let columns: Vec<String> = rows
            .first()
            .map(|first| first.keys().map(String::from).collect())
            .unwrap_or_default();

        let rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| row.get(column).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as JSON objects keyed by column, for `--format json`.
    pub fn to_json(&self) -> serde_json::Value {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let object = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, value)| (column.clone(), value.to_json()))
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(object)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}
