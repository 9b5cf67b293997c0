use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bookshelf_kernel::settings::DatabaseSettings;
use rusqlite::{Connection, OpenFlags};

use crate::error::DbError;

const SQLITE_SCHEME: &str = "sqlite";

/// Handle to a SQLite database file.
///
/// Cheap to clone; holds no open connection.
#[derive(Debug, Clone)]
pub struct Database {
    path: Arc<PathBuf>,
    busy_timeout: Duration,
}

impl Database {
    /// Build a handle from the configured connection string.
    pub fn connect(settings: &DatabaseSettings) -> Result<Self, DbError> {
        let mut db = Self::open(&settings.url)?;
        db.busy_timeout = Duration::from_millis(settings.busy_timeout_ms);
        Ok(db)
    }

    /// Build a handle from a connection string: `sqlite://path`,
    /// `sqlite:path` or a bare file path.
    pub fn open(url: &str) -> Result<Self, DbError> {
        let path = parse_url(url)?;
        tracing::debug!(path = %path.display(), "database handle created");
        Ok(Self {
            path: Arc::new(path),
            busy_timeout: Duration::from_millis(5000),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire a session on the calling thread.
    ///
    /// Blocking; async code should use [`Database::with_session`].
    pub fn session(&self) -> Result<Session, DbError> {
        let conn = Connection::open_with_flags(
            self.path.as_path(),
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(self.busy_timeout)?;
        tracing::trace!(path = %self.path.display(), "session acquired");
        Ok(Session {
            conn,
            acquired_at: Instant::now(),
        })
    }

    /// Run `work` against a fresh session on the blocking pool.
    ///
    /// The session is released before this future resolves, whatever `work`
    /// returns.
    pub async fn with_session<T, E, F>(&self, work: F) -> Result<T, DbError>
    where
        F: FnOnce(&mut Connection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
        DbError: From<E>,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || {
            let mut session = db.session()?;
            work(&mut session).map_err(DbError::from)
        })
        .await?
    }

    /// Round-trip a trivial statement to prove the file is reachable.
    pub async fn ping(&self) -> Result<(), DbError> {
        self.with_session(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)))
            .await
            .map(|_| ())
    }
}

/// One open connection, closed on drop.
pub struct Session {
    conn: Connection,
    acquired_at: Instant,
}

impl Deref for Session {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::trace!(
            held_us = self.acquired_at.elapsed().as_micros() as u64,
            "session released"
        );
    }
}

fn parse_url(url: &str) -> Result<PathBuf, DbError> {
    let path = match url.split_once("://") {
        Some((SQLITE_SCHEME, rest)) => rest,
        Some(_) => return Err(DbError::invalid_url(url, "only sqlite urls are supported")),
        None => url.strip_prefix("sqlite:").unwrap_or(url),
    };
    // Connection options after `?` are not supported; keep the file part.
    let path = path.split('?').next().unwrap_or_default();

    if path.is_empty() {
        return Err(DbError::invalid_url(url, "missing database path"));
    }
    // Each session opens its own connection, so an in-memory database would
    // vanish between operations.
    if path == ":memory:" {
        return Err(DbError::invalid_url(
            url,
            "in-memory databases do not outlive a session",
        ));
    }

    Ok(PathBuf::from(path))
}
