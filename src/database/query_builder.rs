use serde_json::Value;
use sqlx::{self, postgres::PgArguments, FromRow};

use crate::database::manager::DatabaseError;

/// Static mapping from API field names to storage column names.
///
/// Fields that are not listed map to a column of the same name.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap<'a> {
    entries: &'a [(&'a str, &'a str)],
}

impl<'a> ColumnMap<'a> {
    pub const fn new(entries: &'a [(&'a str, &'a str)]) -> Self {
        Self { entries }
    }

    pub const fn empty() -> ColumnMap<'static> {
        ColumnMap { entries: &[] }
    }

    pub fn column_for<'f>(&self, field: &'f str) -> &'f str
    where
        'a: 'f,
    {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, column)| *column)
            .unwrap_or(field)
    }
}

/// SET clause and positional values for a single-row UPDATE
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    pub clause: String,
    pub values: Vec<Value>,
}

impl PartialUpdate {
    /// Position of the first placeholder after the SET values, e.g. for a WHERE key
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }
}

/// Build `"column"=$N` pairs for a partial update, numbered from 1 in payload order.
///
/// No allow-listing happens here: callers validate field names before calling.
pub fn build_partial_update<K: AsRef<str>>(
    payload: &[(K, Value)],
    columns: &ColumnMap<'_>,
) -> Result<PartialUpdate, DatabaseError> {
    if payload.is_empty() {
        return Err(DatabaseError::NoData);
    }

    let clause = payload
        .iter()
        .enumerate()
        .map(|(i, (field, _))| format!("\"{}\"=${}", columns.column_for(field.as_ref()), i + 1))
        .collect::<Vec<_>>()
        .join(", ");

    let values = payload.iter().map(|(_, value)| value.clone()).collect();

    Ok(PartialUpdate { clause, values })
}

/// Bind a mapped value to the next positional parameter of a typed query.
///
/// Updatable columns are all text, so strings bind as text and anything else as NULL.
pub fn bind_value<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    q.bind(v.as_str())
}
