//! Category use-case service.
//!
//! # Responsibility
//! - Run category use cases inside one unit-of-work scope each.
//! - Return detached `Category` values, never persistence rows.
//! - Translate repository failures into category-level errors.
//!
//! # Invariants
//! - Every call opens and finishes its own scope; nothing is held between calls.
//! - Names are validated before a scope is opened.
//! - Failures are converted, never swallowed.

use crate::db::SessionFactory;
use crate::model::category::{validate_category_name, Category, CategoryValidationError};
use crate::repo::base_repo::RepoError;
use crate::repo::category_repo::CategoryRow;
use crate::uow::unit_of_work::{UnitOfWork, UnitOfWorkError};
use log::info;
use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for category use-cases.
#[derive(Debug)]
pub enum CategoryServiceError {
    /// Name breaks the category name rules.
    InvalidName(CategoryValidationError),
    /// No category with this name exists.
    CategoryNotFound(String),
    /// A category with this name already exists.
    AlreadyExists(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl CategoryServiceError {
    /// Whether the failure is about the caller's input rather than the store.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }
}

impl Display for CategoryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(err) => write!(f, "invalid category name: {err}"),
            Self::CategoryNotFound(name) => write!(f, "category not found: `{name}`"),
            Self::AlreadyExists(name) => write!(f, "category already exists: `{name}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CategoryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidName(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::CategoryNotFound(_) | Self::AlreadyExists(_) => None,
        }
    }
}

impl From<CategoryValidationError> for CategoryServiceError {
    fn from(value: CategoryValidationError) -> Self {
        Self::InvalidName(value)
    }
}

impl From<RepoError> for CategoryServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { key, .. } => Self::CategoryNotFound(key),
            RepoError::Validation { entity, source } => {
                match source.downcast::<CategoryValidationError>() {
                    Ok(err) => Self::InvalidName(*err),
                    Err(source) => Self::Repo(RepoError::Validation { entity, source }),
                }
            }
            other => Self::Repo(other),
        }
    }
}

impl From<UnitOfWorkError> for CategoryServiceError {
    fn from(value: UnitOfWorkError) -> Self {
        RepoError::from(value).into()
    }
}

/// Category service facade over a unit of work.
pub struct CategoryService<F: SessionFactory> {
    unit_of_work: UnitOfWork<F>,
}

impl<F: SessionFactory> CategoryService<F> {
    pub fn new(unit_of_work: UnitOfWork<F>) -> Self {
        Self { unit_of_work }
    }

    /// Adds a category and returns a detached copy of it.
    ///
    /// # Errors
    /// - `InvalidName` when the name breaks the category name rules.
    /// - `AlreadyExists` when the name is taken.
    pub fn add_category(&self, name: &str) -> Result<Category, CategoryServiceError> {
        validate_category_name(name)?;

        let category = self
            .unit_of_work
            .run(|uow| -> Result<Category, RepoError> {
                let new_category = CategoryRow::new(name);
                uow.categories().add(&new_category)?;
                Ok(Category::from(new_category))
            })
            .map_err(|err| already_exists_or(err, name))?;

        info!("event=category_add module=service status=ok");
        Ok(category)
    }

    /// Fetches one category by name.
    ///
    /// # Errors
    /// - `CategoryNotFound` when no category has this name.
    pub fn get_category_by_name(&self, name: &str) -> Result<Category, CategoryServiceError> {
        self.unit_of_work.run(|uow| {
            let row = uow.categories().get_by_primary_key(name)?;
            Ok(Category::from(row))
        })
    }

    /// Lists every category. Order is not part of the contract.
    pub fn list_categories(&self) -> Result<Vec<Category>, CategoryServiceError> {
        self.unit_of_work.run(|uow| {
            let rows = uow.categories().list()?;
            Ok(rows.into_iter().map(Category::from).collect())
        })
    }

    /// Renames a category and returns the renamed copy.
    ///
    /// # Errors
    /// - `InvalidName` when `new_name` breaks the category name rules.
    /// - `CategoryNotFound` when `name` does not exist.
    /// - `AlreadyExists` when `new_name` is taken.
    pub fn rename_category(
        &self,
        name: &str,
        new_name: &str,
    ) -> Result<Category, CategoryServiceError> {
        validate_category_name(new_name)?;

        let renamed = self
            .unit_of_work
            .run(|uow| -> Result<Category, RepoError> {
                let categories = uow.categories();
                categories.update_by_primary_key(
                    name,
                    [("name", Value::Text(new_name.to_string()))],
                )?;
                let row = categories.get_by_primary_key(new_name)?;
                Ok(Category::from(row))
            })
            .map_err(|err| already_exists_or(err, new_name))?;

        info!("event=category_rename module=service status=ok");
        Ok(renamed)
    }

    /// Deletes a category by name.
    ///
    /// # Errors
    /// - `CategoryNotFound` when no category has this name.
    pub fn delete_category(&self, name: &str) -> Result<(), CategoryServiceError> {
        self.unit_of_work
            .run(|uow| uow.categories().delete_by_primary_key(name))?;

        info!("event=category_delete module=service status=ok");
        Ok(())
    }
}

fn already_exists_or(err: RepoError, name: &str) -> CategoryServiceError {
    if err.is_integrity_violation() {
        return CategoryServiceError::AlreadyExists(name.to_string());
    }
    err.into()
}
