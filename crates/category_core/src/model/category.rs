//! Category business object.
//!
//! # Responsibility
//! - Carry a category name out of the persistence layer as a detached value.
//! - Own the name validation rules shared by model and mapping.
//!
//! # Invariants
//! - `name` is non-empty. Any other string is a valid name and is kept verbatim.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failures for category names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    /// Name is the empty string.
    EmptyName,
}

impl Display for CategoryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "category name cannot be empty"),
        }
    }
}

impl Error for CategoryValidationError {}

/// Checks a candidate category name.
pub fn validate_category_name(name: &str) -> Result<(), CategoryValidationError> {
    if name.is_empty() {
        return Err(CategoryValidationError::EmptyName);
    }
    Ok(())
}

/// Detached category value returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CategoryWire")]
pub struct Category {
    name: String,
}

impl Category {
    /// Creates a validated category value.
    pub fn new(name: impl Into<String>) -> Result<Self, CategoryValidationError> {
        let name = name.into();
        validate_category_name(&name)?;
        Ok(Self { name })
    }

    pub(crate) fn from_validated(name: String) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_name(self) -> String {
        self.name
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Deserialize)]
struct CategoryWire {
    name: String,
}

impl TryFrom<CategoryWire> for Category {
    type Error = CategoryValidationError;

    fn try_from(value: CategoryWire) -> Result<Self, Self::Error> {
        Self::new(value.name)
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_category_name, CategoryValidationError};

    #[test]
    fn accepts_any_non_empty_name() {
        assert!(validate_category_name("Books").is_ok());
        assert!(validate_category_name("Küche & Haushalt").is_ok());
        assert!(validate_category_name(" ").is_ok());
        assert!(validate_category_name("Food\tDrink").is_ok());
        assert!(validate_category_name("Line\nBreak").is_ok());
    }

    #[test]
    fn rejects_empty_name() {
        assert_eq!(
            validate_category_name(""),
            Err(CategoryValidationError::EmptyName)
        );
    }
}
