//! Category row mapping and repository.
//!
//! # Invariants
//! - `categories.name` is the primary key and follows the category name rules.
//! - Stored names are read back verbatim; only a non-text value is rejected.

use crate::model::category::{validate_category_name, Category};
use crate::repo::base_repo::{RepoError, RepoResult, Repository};
use crate::repo::mapping::Mapped;
use rusqlite::types::{Value, ValueRef};
use rusqlite::Row;

/// Persistence row for the `categories` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRow {
    pub name: String,
}

impl CategoryRow {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Mapped for CategoryRow {
    const ENTITY: &'static str = "Category";
    const TABLE: &'static str = "categories";
    const PRIMARY_KEY: &'static str = "name";
    const COLUMNS: &'static [&'static str] = &["name"];

    type Key = str;

    fn primary_key(&self) -> &str {
        &self.name
    }

    fn to_values(&self) -> Vec<Value> {
        vec![Value::Text(self.name.clone())]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        match row.get_ref("name")? {
            ValueRef::Text(bytes) => {
                let name = std::str::from_utf8(bytes).map_err(|err| {
                    RepoError::InvalidData(format!("categories.name is not valid UTF-8: {err}"))
                })?;
                Ok(Self::new(name))
            }
            other => Err(RepoError::InvalidData(format!(
                "categories.name must be text, got {:?}",
                other.data_type()
            ))),
        }
    }

    fn validate(&self) -> RepoResult<()> {
        validate_category_name(&self.name).map_err(RepoError::validation::<Self, _>)
    }

    fn validate_field(column: &str, value: &Value) -> RepoResult<()> {
        match (column, value) {
            ("name", Value::Text(name)) => {
                validate_category_name(name).map_err(RepoError::validation::<Self, _>)
            }
            ("name", other) => Err(RepoError::InvalidData(format!(
                "categories.name must be text, got {:?}",
                other.data_type()
            ))),
            _ => Ok(()),
        }
    }
}

impl From<CategoryRow> for Category {
    fn from(value: CategoryRow) -> Self {
        // Names are validated before they are written.
        Self::from_validated(value.name)
    }
}

/// Repository over `categories`; the generic CRUD surface with no additions.
pub type CategoryRepository = Repository<CategoryRow>;
