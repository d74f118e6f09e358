//! Transactional sessions and the factories that open them.
//!
//! # Responsibility
//! - Pair one SQLite connection with one open transaction.
//! - Let callers choose where sessions come from (file, shared memory, closure).
//!
//! # Invariants
//! - A session is inside a transaction from `begin` until `commit`/`rollback`.
//! - Dropping a session with an open transaction rolls it back.

use super::open::{open_db, open_db_uri};
use super::DbResult;
use log::{debug, warn};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One connection plus its open transaction.
pub struct Session {
    id: Uuid,
    conn: Connection,
}

impl Session {
    /// Starts a deferred transaction on `conn` and wraps it.
    pub fn begin(conn: Connection) -> DbResult<Self> {
        conn.execute_batch("BEGIN DEFERRED;")?;
        let session = Self {
            id: Uuid::new_v4(),
            conn,
        };
        debug!("event=session_begin module=db status=ok session_id={}", session.id);
        Ok(session)
    }

    /// Stable identifier used to correlate log events.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Underlying connection; statements run inside the open transaction.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Whether the transaction is still open.
    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    pub fn commit(&self) -> DbResult<()> {
        self.conn.execute_batch("COMMIT;")?;
        debug!("event=session_commit module=db status=ok session_id={}", self.id);
        Ok(())
    }

    pub fn rollback(&self) -> DbResult<()> {
        if self.in_transaction() {
            self.conn.execute_batch("ROLLBACK;")?;
        }
        debug!("event=session_rollback module=db status=ok session_id={}", self.id);
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.in_transaction() {
            return;
        }
        if let Err(err) = self.conn.execute_batch("ROLLBACK;") {
            warn!(
                "event=session_drop module=db status=error session_id={} error_code=rollback_failed error={}",
                self.id, err
            );
        }
    }
}

/// Source of fresh sessions for a unit of work.
pub trait SessionFactory {
    fn open_session(&self) -> DbResult<Session>;
}

/// Any closure returning a bootstrapped connection can act as a factory.
impl<F> SessionFactory for F
where
    F: Fn() -> DbResult<Connection>,
{
    fn open_session(&self) -> DbResult<Session> {
        Session::begin(self()?)
    }
}

enum StoreTarget {
    File(PathBuf),
    SharedMemory {
        uri: String,
        // Keeps the shared in-memory database alive between sessions.
        _anchor: Connection,
    },
}

/// SQLite-backed session factory.
///
/// Every session gets its own connection; all connections of one factory see
/// the same database.
pub struct SqliteSessionFactory {
    target: StoreTarget,
}

impl SqliteSessionFactory {
    /// Sessions against a database file. The schema is ensured eagerly.
    pub fn file(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        drop(open_db(&path)?);
        Ok(Self {
            target: StoreTarget::File(path),
        })
    }

    /// Sessions against a fresh shared-cache in-memory database.
    ///
    /// The database lives as long as the factory.
    pub fn in_memory() -> DbResult<Self> {
        let uri = format!(
            "file:category-core-{}?mode=memory&cache=shared",
            Uuid::new_v4().simple()
        );
        let anchor = open_db_uri(&uri)?;
        Ok(Self {
            target: StoreTarget::SharedMemory {
                uri,
                _anchor: anchor,
            },
        })
    }
}

impl SessionFactory for SqliteSessionFactory {
    fn open_session(&self) -> DbResult<Session> {
        let conn = match &self.target {
            StoreTarget::File(path) => open_db(path)?,
            StoreTarget::SharedMemory { uri, .. } => open_db_uri(uri)?,
        };
        Session::begin(conn)
    }
}
