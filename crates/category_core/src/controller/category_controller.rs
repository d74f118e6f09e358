//! Category controller and presenter port.
//!
//! # Invariants
//! - User-facing failures go to the presenter and the call yields `None`/`false`.
//! - Store failures are returned to the caller untouched.

use crate::db::SessionFactory;
use crate::model::category::Category;
use crate::service::category_service::{CategoryService, CategoryServiceError};
use log::warn;

/// Presentation hook for failures the user should see.
pub trait ErrorPresenter {
    fn present_error(&self, error: &CategoryServiceError);
}

/// Presenter that only records the failure in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter;

impl ErrorPresenter for LogPresenter {
    fn present_error(&self, error: &CategoryServiceError) {
        warn!(
            "event=category_error module=controller status=error error_code={}",
            error_code(error)
        );
    }
}

fn error_code(error: &CategoryServiceError) -> &'static str {
    match error {
        CategoryServiceError::InvalidName(_) => "invalid_name",
        CategoryServiceError::CategoryNotFound(_) => "category_not_found",
        CategoryServiceError::AlreadyExists(_) => "category_exists",
        CategoryServiceError::Repo(_) => "repo_error",
    }
}

/// Facade used by the UI layer.
pub struct CategoryController<F: SessionFactory, P: ErrorPresenter = LogPresenter> {
    category_service: CategoryService<F>,
    presenter: P,
}

impl<F: SessionFactory> CategoryController<F, LogPresenter> {
    pub fn new(category_service: CategoryService<F>) -> Self {
        Self::with_presenter(category_service, LogPresenter)
    }
}

impl<F: SessionFactory, P: ErrorPresenter> CategoryController<F, P> {
    pub fn with_presenter(category_service: CategoryService<F>, presenter: P) -> Self {
        Self {
            category_service,
            presenter,
        }
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn add_category(&self, name: &str) -> Result<Option<Category>, CategoryServiceError> {
        self.present(self.category_service.add_category(name))
    }

    pub fn get_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Category>, CategoryServiceError> {
        self.present(self.category_service.get_category_by_name(name))
    }

    pub fn list_categories(&self) -> Result<Vec<Category>, CategoryServiceError> {
        self.category_service.list_categories()
    }

    pub fn rename_category(
        &self,
        name: &str,
        new_name: &str,
    ) -> Result<Option<Category>, CategoryServiceError> {
        self.present(self.category_service.rename_category(name, new_name))
    }

    /// Returns `Ok(false)` when the failure was handed to the presenter.
    pub fn delete_category(&self, name: &str) -> Result<bool, CategoryServiceError> {
        Ok(self
            .present(self.category_service.delete_category(name))?
            .is_some())
    }

    fn present<T>(
        &self,
        result: Result<T, CategoryServiceError>,
    ) -> Result<Option<T>, CategoryServiceError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_user_facing() => {
                self.presenter.present_error(&err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
