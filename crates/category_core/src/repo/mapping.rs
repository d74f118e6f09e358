//! Row mapping contract used by the generic repository.
//!
//! # Responsibility
//! - Describe how a row type maps onto one table keyed by one column.
//!
//! # Invariants
//! - `COLUMNS` contains `PRIMARY_KEY`.
//! - `to_values` yields one value per entry of `COLUMNS`, in the same order.
//! - `TABLE` and `COLUMNS` are trusted identifiers; they are spliced into SQL.

use crate::repo::base_repo::RepoResult;
use rusqlite::types::Value;
use rusqlite::{Row, ToSql};
use std::fmt::Display;

/// A row type stored in a single table with a single-column primary key.
pub trait Mapped: Sized {
    /// Human-readable entity name used in errors and logs.
    const ENTITY: &'static str;
    const TABLE: &'static str;
    const PRIMARY_KEY: &'static str;
    const COLUMNS: &'static [&'static str];

    /// Borrowed form of the primary key (`str` for text keys).
    type Key: ToSql + Display + ?Sized;

    fn primary_key(&self) -> &Self::Key;

    fn to_values(&self) -> Vec<Value>;

    /// Builds a row from a result row selected with `COLUMNS`.
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;

    /// Checks the whole row before insert.
    fn validate(&self) -> RepoResult<()> {
        Ok(())
    }

    /// Checks one column value before update.
    fn validate_field(_column: &str, _value: &Value) -> RepoResult<()> {
        Ok(())
    }

    /// Whether `column` is a mapped column of this row type.
    fn has_column(column: &str) -> bool {
        Self::COLUMNS.iter().any(|known| *known == column)
    }
}
