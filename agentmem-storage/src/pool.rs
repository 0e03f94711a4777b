//! Connection pool: one writer connection plus a round-robin pool of reader
//! connections, all under WAL — single-writer/many-reader SQLite, readers
//! never blocked by the writer.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::Connection;

use agentmem_core::errors::{CoreError, CoreResult};

const DEFAULT_READ_POOL_SIZE: usize = 4;
const MAX_READ_POOL_SIZE: usize = 8;

fn storage_unavailable(context: &str, e: impl std::fmt::Display) -> CoreError {
    CoreError::Unavailable(format!("{context}: {e}"))
}

fn apply_pragmas(conn: &Connection) -> CoreResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(|e| storage_unavailable("apply_pragmas", e))
}

/// A pool of read-only connections, checked out round-robin.
pub struct ReadPool {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ReadPool {
    pub fn open(path: &Path, pool_size: usize) -> CoreResult<Self> {
        let size = pool_size.clamp(1, MAX_READ_POOL_SIZE);
        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open_with_flags(
                path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| storage_unavailable("open read connection", e))?;
            apply_pragmas(&conn)?;
            connections.push(Mutex::new(conn));
        }
        Ok(Self { connections, next: AtomicUsize::new(0) })
    }

    /// In-memory mode has no shared file to reopen read-only against, so the
    /// "read pool" degenerates to a single handle; callers route all reads
    /// through the writer instead (see `ConnectionPool::open_in_memory`).
    fn empty() -> Self {
        Self { connections: Vec::new(), next: AtomicUsize::new(0) }
    }

    pub fn with_conn<F, T>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&Connection) -> CoreResult<T>,
    {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        let guard = self.connections[idx]
            .lock()
            .map_err(|e| storage_unavailable("read pool lock poisoned", e))?;
        f(&guard)
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

/// The single write connection, serialized behind a mutex.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path) -> CoreResult<Self> {
        let conn = Connection::open(path).map_err(|e| storage_unavailable("open write connection", e))?;
        apply_pragmas(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> CoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| storage_unavailable("open in-memory connection", e))?;
        apply_pragmas(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn with_conn<F, T>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&Connection) -> CoreResult<T>,
    {
        let guard = self.conn.lock().map_err(|e| storage_unavailable("writer lock poisoned", e))?;
        f(&guard)
    }
}

/// Owns the writer and the read pool. File-backed engines route reads
/// through `readers`; in-memory engines route everything through `writer`
/// since separate in-memory connections are isolated databases.
pub struct ConnectionPool {
    pub writer: WriteConnection,
    pub readers: ReadPool,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    pub fn open(path: &Path, read_pool_size: usize) -> CoreResult<Self> {
        let writer = WriteConnection::open(path)?;
        let readers = ReadPool::open(path, read_pool_size)?;
        Ok(Self { writer, readers, db_path: Some(path.to_path_buf()) })
    }

    pub fn open_in_memory() -> CoreResult<Self> {
        let writer = WriteConnection::open_in_memory()?;
        Ok(Self { writer, readers: ReadPool::empty(), db_path: None })
    }

    pub fn default_read_pool_size() -> usize {
        DEFAULT_READ_POOL_SIZE
    }
}
