//! SQLite implementation of the SetCache trait.
//!
//! Uses rusqlite with bundled SQLite, wrapped in async via
//! `tokio::task::spawn_blocking`. A file-backed database can be opened by
//! several gateway processes on one host, which then share scratch space.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::error::{CacheError, Result};
use crate::migration;
use crate::traits::SetCache;

/// How long a connection waits on a lock held by another process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based set cache.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteSetCache {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSetCache {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(mut conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| CacheError::LockPoisoned)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| CacheError::Task(e.to_string()))?
    }

    /// Number of live keys.
    pub async fn key_count(&self) -> Result<usize> {
        self.blocking(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM set_keys WHERE expires_at > ?1",
                params![now_millis()],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
        .await
    }

    /// Delete every expired key and its members. Returns how many keys were removed.
    pub async fn purge_expired(&self) -> Result<usize> {
        self.blocking(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let removed = sweep(&tx, now_millis())?;
            tx.commit()?;
            Ok(removed)
        })
        .await
    }
}

/// Delete expired keys and their members, returning how many keys went.
fn sweep(conn: &Connection, now: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM set_members WHERE key IN
            (SELECT key FROM set_keys WHERE expires_at <= ?1)",
        params![now],
    )?;
    conn.execute("DELETE FROM set_keys WHERE expires_at <= ?1", params![now])
}

fn remove_key(conn: &Connection, key: &str) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM set_members WHERE key = ?1", params![key])?;
    conn.execute("DELETE FROM set_keys WHERE key = ?1", params![key])?;
    Ok(())
}

#[async_trait]
impl SetCache for SqliteSetCache {
    async fn save_set(&self, key: &str, members: &[String], ttl: Duration) -> Result<()> {
        let ttl_millis =
            i64::try_from(ttl.as_millis()).map_err(|_| CacheError::TtlOutOfRange(ttl))?;
        let key = key.to_owned();
        let members = members.to_vec();

        self.blocking(move |conn| {
            let now = now_millis();
            let expires_at = now.saturating_add(ttl_millis);
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT expires_at FROM set_keys WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;

            // An expired key is gone; never union into its stale members
            let live = match existing {
                Some(at) if at <= now => {
                    remove_key(&tx, &key)?;
                    false
                }
                Some(_) => true,
                None => false,
            };

            if members.is_empty() {
                if live {
                    tx.execute(
                        "UPDATE set_keys SET expires_at = ?2 WHERE key = ?1",
                        params![key, expires_at],
                    )?;
                }
                tx.commit()?;
                return Ok(());
            }

            {
                let mut insert = tx.prepare_cached(
                    "INSERT OR IGNORE INTO set_members (key, member) VALUES (?1, ?2)",
                )?;
                for member in &members {
                    insert.execute(params![key, member])?;
                }
            }

            tx.execute(
                "INSERT INTO set_keys (key, expires_at) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET expires_at = excluded.expires_at",
                params![key, expires_at],
            )?;

            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn intersect(&self, key_a: &str, key_b: &str) -> Result<Vec<String>> {
        let key_a = key_a.to_owned();
        let key_b = key_b.to_owned();

        self.blocking(move |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT a.member
                 FROM set_members a
                 JOIN set_members b ON b.key = ?2 AND b.member = a.member
                 JOIN set_keys ka ON ka.key = a.key AND ka.expires_at > ?3
                 JOIN set_keys kb ON kb.key = b.key AND kb.expires_at > ?3
                 WHERE a.key = ?1
                 ORDER BY a.member",
            )?;

            let members = stmt
                .query_map(params![key_a, key_b, now_millis()], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(members)
        })
        .await
    }

    async fn delete_keys(&self, keys: &[&str]) -> Result<()> {
        let keys: Vec<String> = keys.iter().map(|k| (*k).to_owned()).collect();

        self.blocking(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            for key in &keys {
                remove_key(&tx, key)?;
            }
            // Keys left by cancelled checks are never written again
            let swept = sweep(&tx, now_millis())?;
            tx.commit()?;
            if swept > 0 {
                tracing::debug!(swept, "swept expired scratch keys");
            }
            Ok(())
        })
        .await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let key = key.to_owned();

        self.blocking(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM set_keys WHERE key = ?1 AND expires_at > ?2",
                    params![key, now_millis()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }
}

/// Get current time in milliseconds.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
