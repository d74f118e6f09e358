//! Generic primary-key repository over mapped rows.
//!
//! # Responsibility
//! - Provide add/get/list/update/delete for any `Mapped` row type.
//! - Run every statement inside the session it was built with.
//! - Translate SQLite failures into semantic repository errors.
//!
//! # Invariants
//! - Writes are never committed here; the owning unit of work decides.
//! - `update_by_primary_key` checks every field name before writing anything.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::{DbError, Session};
use crate::repo::mapping::Mapped;
use crate::uow::unit_of_work::UnitOfWorkError;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, ToSql};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::rc::Rc;
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every mapped entity.
#[derive(Debug)]
pub enum RepoError {
    /// No row matches the primary key.
    NotFound { entity: &'static str, key: String },
    /// Update referenced a field the entity does not have.
    InvalidAttribute {
        entity: &'static str,
        attribute: String,
    },
    /// Uniqueness or other constraint failure.
    Integrity {
        entity: &'static str,
        source: rusqlite::Error,
    },
    /// Row or field value breaks the mapping's own rules.
    Validation {
        entity: &'static str,
        source: Box<dyn Error + Send + Sync + 'static>,
    },
    InvalidData(String),
    /// The surrounding unit of work could not open its scope.
    UnitOfWork(UnitOfWorkError),
    Db(DbError),
}

impl RepoError {
    /// Wraps a mapping-specific validation failure for `T`.
    pub fn validation<T, E>(err: E) -> Self
    where
        T: Mapped,
        E: Error + Send + Sync + 'static,
    {
        Self::Validation {
            entity: T::ENTITY,
            source: Box::new(err),
        }
    }

    /// True for constraint failures, whether detected by a repository
    /// statement or surfaced later at commit.
    pub fn is_integrity_violation(&self) -> bool {
        match self {
            Self::Integrity { .. } => true,
            Self::Db(DbError::Sqlite(err)) => is_constraint_violation(err),
            _ => false,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, key } => {
                write!(f, "{entity} with primary key `{key}` not found")
            }
            Self::InvalidAttribute { entity, attribute } => {
                write!(f, "{entity} has no attribute `{attribute}`")
            }
            Self::Integrity { entity, source } => {
                write!(f, "{entity} integrity violation: {source}")
            }
            Self::Validation { entity, source } => write!(f, "invalid {entity}: {source}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UnitOfWork(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Integrity { source, .. } => Some(source),
            Self::Validation { source, .. } => Some(source.as_ref()),
            Self::UnitOfWork(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidAttribute { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<UnitOfWorkError> for RepoError {
    fn from(value: UnitOfWorkError) -> Self {
        match value {
            UnitOfWorkError::Db(err) => Self::Db(err),
            other => Self::UnitOfWork(other),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Primary-key CRUD over one mapped table, bound to one session.
pub struct Repository<T: Mapped> {
    session: Rc<Session>,
    _mapped: PhantomData<fn() -> T>,
}

impl<T: Mapped> Repository<T> {
    pub fn new(session: Rc<Session>) -> Self {
        Self {
            session,
            _mapped: PhantomData,
        }
    }

    /// Identifier of the session this repository writes through.
    pub fn session_id(&self) -> Uuid {
        self.session.id()
    }

    fn conn(&self) -> &Connection {
        self.session.connection()
    }

    /// Inserts `instance` in the session transaction.
    ///
    /// # Errors
    /// - `Validation`/`InvalidData` when the row breaks the mapping invariant.
    /// - `Integrity` when the primary key already exists.
    pub fn add(&self, instance: &T) -> RepoResult<()> {
        instance.validate()?;

        let placeholders = (1..=T::COLUMNS.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders});",
            T::TABLE,
            T::COLUMNS.join(", ")
        );

        self.conn()
            .execute(&sql, params_from_iter(instance.to_values()))
            .map_err(write_error::<T>)?;

        debug!(
            "event=repo_add module=repo status=ok entity={} session_id={}",
            T::ENTITY,
            self.session.id()
        );
        Ok(())
    }

    /// Loads one row by primary key, failing with `NotFound` when absent.
    pub fn get_by_primary_key(&self, key: &T::Key) -> RepoResult<T> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1;",
            T::COLUMNS.join(", "),
            T::TABLE,
            T::PRIMARY_KEY
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params![key])?;

        if let Some(row) = rows.next()? {
            return T::from_row(row);
        }

        Err(not_found::<T>(key))
    }

    /// Loads every row. Order is primary-key ascending but not part of the contract.
    pub fn list(&self) -> RepoResult<Vec<T>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {} ASC;",
            T::COLUMNS.join(", "),
            T::TABLE,
            T::PRIMARY_KEY
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(T::from_row(row)?);
        }

        Ok(items)
    }

    /// Updates named fields of one row in place.
    ///
    /// Updating the primary key column re-keys the row.
    ///
    /// # Errors
    /// - `NotFound` when no row matches `key`.
    /// - `InvalidAttribute` when any field is not a column; nothing is written.
    /// - `Validation`/`InvalidData` when a value breaks the mapping invariant.
    /// - `Integrity` when a new primary key collides with another row.
    pub fn update_by_primary_key<'f, I>(&self, key: &T::Key, fields: I) -> RepoResult<()>
    where
        I: IntoIterator<Item = (&'f str, Value)>,
    {
        let fields = fields.into_iter().collect::<Vec<_>>();

        if !self.exists(key)? {
            return Err(not_found::<T>(key));
        }

        for (column, value) in &fields {
            if !T::has_column(column) {
                return Err(RepoError::InvalidAttribute {
                    entity: T::ENTITY,
                    attribute: (*column).to_string(),
                });
            }
            T::validate_field(column, value)?;
        }

        if fields.is_empty() {
            return Ok(());
        }

        let assignments = fields
            .iter()
            .enumerate()
            .map(|(index, (column, _))| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE {} = ?{};",
            T::TABLE,
            T::PRIMARY_KEY,
            fields.len() + 1
        );

        let mut bind_values: Vec<&dyn ToSql> = fields
            .iter()
            .map(|(_, value)| value as &dyn ToSql)
            .collect();
        bind_values.push(&key);

        self.conn()
            .execute(&sql, bind_values.as_slice())
            .map_err(write_error::<T>)?;

        debug!(
            "event=repo_update module=repo status=ok entity={} fields={} session_id={}",
            T::ENTITY,
            fields.len(),
            self.session.id()
        );
        Ok(())
    }

    /// Deletes one row, failing with `NotFound` when absent.
    pub fn delete_by_primary_key(&self, key: &T::Key) -> RepoResult<()> {
        let sql = format!("DELETE FROM {} WHERE {} = ?1;", T::TABLE, T::PRIMARY_KEY);
        let changed = self.conn().execute(&sql, params![key])?;

        if changed == 0 {
            return Err(not_found::<T>(key));
        }

        debug!(
            "event=repo_delete module=repo status=ok entity={} session_id={}",
            T::ENTITY,
            self.session.id()
        );
        Ok(())
    }

    fn exists(&self, key: &T::Key) -> RepoResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1);",
            T::TABLE,
            T::PRIMARY_KEY
        );
        let exists = self
            .conn()
            .query_row(&sql, params![key], |row| row.get::<_, i64>(0))?;
        Ok(exists == 1)
    }
}

fn not_found<T: Mapped>(key: &T::Key) -> RepoError {
    RepoError::NotFound {
        entity: T::ENTITY,
        key: key.to_string(),
    }
}

fn write_error<T: Mapped>(err: rusqlite::Error) -> RepoError {
    if is_constraint_violation(&err) {
        return RepoError::Integrity {
            entity: T::ENTITY,
            source: err,
        };
    }
    err.into()
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}
