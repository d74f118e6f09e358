//! Category store core: controller, service, repository and unit of work
//! over a single SQLite table.
//! This crate is the single source of truth for category invariants.

pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod uow;

pub use controller::category_controller::{CategoryController, ErrorPresenter, LogPresenter};
pub use db::{DbError, DbResult, Session, SessionFactory, SqliteSessionFactory};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{validate_category_name, Category, CategoryValidationError};
pub use repo::base_repo::{RepoError, RepoResult, Repository};
pub use repo::category_repo::{CategoryRepository, CategoryRow};
pub use repo::mapping::Mapped;
pub use service::category_service::{CategoryService, CategoryServiceError};
pub use uow::unit_of_work::{UnitOfWork, UnitOfWorkError, UnitOfWorkScope, UnitOfWorkState};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
