//! Unit of work and its per-scope repository cache.
//!
//! # Responsibility
//! - Open a session on scope entry and close it on scope exit.
//! - Lazily build repositories bound to the scope's session.
//!
//! # Invariants
//! - `Inactive -> Active` only through `begin`; `Active -> Inactive` only when
//!   the scope is consumed or dropped.
//! - A scope that is dropped without `commit` rolls back.
//! - Repositories never outlive the scope that built them.

use crate::db::{DbError, Session, SessionFactory};
use crate::repo::category_repo::CategoryRepository;
use log::{debug, error, info, warn};
use once_cell::unsync::OnceCell;
use std::cell::Cell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::time::Instant;
use uuid::Uuid;

/// Lifecycle state of a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOfWorkState {
    Inactive,
    Active { scope_id: Uuid },
}

/// Unit-of-work lifecycle error.
#[derive(Debug)]
pub enum UnitOfWorkError {
    /// `begin` was called while a previous scope is still open.
    ScopeAlreadyActive,
    /// Opening, committing or rolling back the session failed.
    Db(DbError),
}

impl Display for UnitOfWorkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScopeAlreadyActive => write!(f, "unit of work scope is already active"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UnitOfWorkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ScopeAlreadyActive => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for UnitOfWorkError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Transaction boundary that hands out session-bound repositories.
///
/// One instance can run many scopes, one after another.
pub struct UnitOfWork<F: SessionFactory> {
    session_factory: F,
    state: Cell<UnitOfWorkState>,
}

impl<F: SessionFactory> UnitOfWork<F> {
    pub fn new(session_factory: F) -> Self {
        Self {
            session_factory,
            state: Cell::new(UnitOfWorkState::Inactive),
        }
    }

    pub fn state(&self) -> UnitOfWorkState {
        self.state.get()
    }

    /// Opens a scope with a fresh session and an empty repository cache.
    ///
    /// # Errors
    /// - `ScopeAlreadyActive` when a previous scope has not finished.
    /// - `Db` when the session factory fails.
    pub fn begin(&self) -> Result<UnitOfWorkScope<'_>, UnitOfWorkError> {
        if let UnitOfWorkState::Active { scope_id } = self.state.get() {
            warn!(
                "event=uow_begin module=uow status=error scope_id={scope_id} error_code=scope_already_active"
            );
            return Err(UnitOfWorkError::ScopeAlreadyActive);
        }

        let session = self.session_factory.open_session()?;
        let scope_id = session.id();
        self.state.set(UnitOfWorkState::Active { scope_id });
        debug!("event=uow_begin module=uow status=ok scope_id={scope_id}");

        Ok(UnitOfWorkScope {
            state: &self.state,
            session: Rc::new(session),
            repositories: RepositoryCache::default(),
            started_at: Instant::now(),
            finished: false,
        })
    }

    /// Runs `work` inside a scope.
    ///
    /// Commits when `work` returns `Ok`; rolls back and returns the error
    /// unchanged when it returns `Err`. A failed commit is returned as an error.
    pub fn run<T, E, W>(&self, work: W) -> Result<T, E>
    where
        W: FnOnce(&UnitOfWorkScope<'_>) -> Result<T, E>,
        E: From<UnitOfWorkError>,
    {
        let scope = self.begin()?;

        match work(&scope) {
            Ok(value) => {
                scope.commit()?;
                Ok(value)
            }
            Err(err) => {
                let scope_id = scope.id();
                if let Err(rollback_err) = scope.rollback() {
                    error!(
                        "event=uow_rollback module=uow status=error scope_id={} error_code=rollback_failed error={}",
                        scope_id, rollback_err
                    );
                }
                Err(err)
            }
        }
    }
}

#[derive(Default)]
struct RepositoryCache {
    categories: OnceCell<CategoryRepository>,
}

impl RepositoryCache {
    fn clear(&mut self) {
        self.categories.take();
    }
}

/// Active unit-of-work scope.
///
/// Consume it with `commit` or `rollback`; dropping it unfinished rolls back.
pub struct UnitOfWorkScope<'uow> {
    state: &'uow Cell<UnitOfWorkState>,
    session: Rc<Session>,
    repositories: RepositoryCache,
    started_at: Instant,
    finished: bool,
}

impl UnitOfWorkScope<'_> {
    pub fn id(&self) -> Uuid {
        self.session.id()
    }

    /// Category repository bound to this scope's session.
    ///
    /// Built on first access and reused for the rest of the scope.
    pub fn categories(&self) -> &CategoryRepository {
        self.repositories.categories.get_or_init(|| {
            debug!(
                "event=uow_repository module=uow status=ok scope_id={} repository=categories",
                self.session.id()
            );
            CategoryRepository::new(Rc::clone(&self.session))
        })
    }

    pub fn commit(mut self) -> Result<(), UnitOfWorkError> {
        self.session.commit()?;
        self.finished = true;
        debug!(
            "event=uow_commit module=uow status=ok scope_id={} duration_ms={}",
            self.session.id(),
            self.started_at.elapsed().as_millis()
        );
        Ok(())
    }

    pub fn rollback(mut self) -> Result<(), UnitOfWorkError> {
        self.session.rollback()?;
        self.finished = true;
        info!(
            "event=uow_rollback module=uow status=ok scope_id={} duration_ms={}",
            self.session.id(),
            self.started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

impl Drop for UnitOfWorkScope<'_> {
    fn drop(&mut self) {
        if !self.finished {
            match self.session.rollback() {
                Ok(()) => warn!(
                    "event=uow_rollback module=uow status=ok scope_id={} reason=scope_dropped",
                    self.session.id()
                ),
                Err(err) => error!(
                    "event=uow_rollback module=uow status=error scope_id={} reason=scope_dropped error={}",
                    self.session.id(),
                    err
                ),
            }
        }
        self.repositories.clear();
        self.state.set(UnitOfWorkState::Inactive);
    }
}

#[cfg(test)]
mod tests {
    use super::{UnitOfWork, UnitOfWorkError, UnitOfWorkState};
    use crate::db::SqliteSessionFactory;

    #[test]
    fn scope_moves_state_between_inactive_and_active() {
        let uow = UnitOfWork::new(SqliteSessionFactory::in_memory().unwrap());
        assert_eq!(uow.state(), UnitOfWorkState::Inactive);

        let scope = uow.begin().unwrap();
        assert_eq!(
            uow.state(),
            UnitOfWorkState::Active {
                scope_id: scope.id()
            }
        );

        scope.commit().unwrap();
        assert_eq!(uow.state(), UnitOfWorkState::Inactive);
    }

    #[test]
    fn nested_begin_is_rejected() {
        let uow = UnitOfWork::new(SqliteSessionFactory::in_memory().unwrap());

        let _scope = uow.begin().unwrap();
        let err = uow.begin().err().unwrap();
        assert!(matches!(err, UnitOfWorkError::ScopeAlreadyActive));
    }

    #[test]
    fn repository_is_cached_within_scope() {
        let uow = UnitOfWork::new(SqliteSessionFactory::in_memory().unwrap());

        let scope = uow.begin().unwrap();
        let first = scope.categories();
        let second = scope.categories();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.session_id(), scope.id());
    }
}
