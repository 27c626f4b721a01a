use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::data::{Location, SessionData};
use crate::config::SESSION_TTL;
use crate::error::{SnapError, SnapResult};

/// Key of the single session slot
const SESSION_KEY: &str = "current";

/// Raw access to the persisted session record.
///
/// Implementations report failures; the policy of swallowing them lives
/// in [`SessionStore`].
pub trait SessionBackend: Send + Sync + 'static {
    /// Replace the session record.
    fn write(&self, data: &SessionData) -> SnapResult<()>;
    /// Read the session record, if any.
    fn read(&self) -> SnapResult<Option<SessionData>>;
    /// Delete the session record.
    fn remove(&self) -> SnapResult<()>;
}

/// SQLite-backed session slot.
///
/// No connection is held between calls: every operation opens the
/// database, runs one statement and drops the connection on return.
pub struct SqliteBackend {
    db_path: PathBuf,
}

impl SqliteBackend {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Open the database and make sure the schema exists
    fn connect(&self) -> SnapResult<Connection> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SnapError::storage(format!("create {}: {e}", parent.display()))
            })?;
        }

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                key             TEXT PRIMARY KEY,
                locations_json  TEXT NOT NULL,
                saved_at        INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(conn)
    }
}

impl SessionBackend for SqliteBackend {
    fn write(&self, data: &SessionData) -> SnapResult<()> {
        let json = serde_json::to_string(&data.locations)?;
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO sessions (key, locations_json, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                locations_json = excluded.locations_json,
                saved_at = excluded.saved_at",
            rusqlite::params![SESSION_KEY, json, data.saved_at.timestamp_millis()],
        )?;
        Ok(())
    }

    fn read(&self) -> SnapResult<Option<SessionData>> {
        let conn = self.connect()?;
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT locations_json, saved_at FROM sessions WHERE key = ?1",
                [SESSION_KEY],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((json, saved_at_ms)) = row else {
            return Ok(None);
        };

        let saved_at = DateTime::from_timestamp_millis(saved_at_ms)
            .ok_or_else(|| SnapError::storage(format!("bad saved_at {saved_at_ms}")))?;
        let locations: Vec<Location> = serde_json::from_str(&json)?;
        Ok(Some(SessionData {
            locations,
            saved_at,
        }))
    }

    fn remove(&self) -> SnapResult<()> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM sessions WHERE key = ?1", [SESSION_KEY])?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// Process-local session slot, for tests and storage-less environments
#[derive(Debug, Default)]
pub struct MemoryBackend {
    record: Mutex<Option<SessionData>>,
    writes: Mutex<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `write` calls so far
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<SessionData>> {
        self.record.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionBackend for MemoryBackend {
    fn write(&self, data: &SessionData) -> SnapResult<()> {
        *self.slot() = Some(data.clone());
        *self.writes.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }

    fn read(&self) -> SnapResult<Option<SessionData>> {
        Ok(self.slot().clone())
    }

    fn remove(&self) -> SnapResult<()> {
        *self.slot() = None;
        Ok(())
    }
}

/// Best-effort, time-bounded mirror of the location list.
///
/// Storage failures are logged and never returned: `load` degrades to
/// "no session" and `save`/`clear` to no-ops.
pub struct SessionStore<B: SessionBackend> {
    backend: Arc<B>,
    ttl: Duration,
}

impl<B: SessionBackend> Clone for SessionStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            ttl: self.ttl,
        }
    }
}

impl<B: SessionBackend> SessionStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_ttl(backend, SESSION_TTL)
    }

    pub fn with_ttl(backend: B, ttl: Duration) -> Self {
        Self {
            backend: Arc::new(backend),
            ttl,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Replace the stored session with `locations`, stamped now.
    pub async fn save(&self, locations: Vec<Location>) {
        let count = locations.len();
        let data = SessionData {
            locations,
            saved_at: Utc::now(),
        };
        match self.blocking(move |backend| backend.write(&data)).await {
            Ok(()) => debug!(locations = count, "session saved"),
            Err(err) => warn!(error = %err, "session save failed"),
        }
    }

    /// Restore the stored locations unless absent or expired.
    ///
    /// An expired record is deleted before returning `None`.
    pub async fn load(&self) -> Option<Vec<Location>> {
        let ttl = self.ttl;
        let result = self
            .blocking(move |backend| {
                let Some(data) = backend.read()? else {
                    return Ok(None);
                };
                if is_expired(data.saved_at, Utc::now(), ttl) {
                    info!(saved_at = %data.saved_at, "session expired, purging");
                    backend.remove()?;
                    return Ok(None);
                }
                Ok(Some(data.locations))
            })
            .await;

        match result {
            Ok(locations) => locations,
            Err(err) => {
                warn!(error = %err, "session load failed");
                None
            }
        }
    }

    /// Delete the stored session unconditionally.
    pub async fn clear(&self) {
        if let Err(err) = self.blocking(|backend| backend.remove()).await {
            warn!(error = %err, "session clear failed");
        }
    }

    /// Run a backend operation on the blocking pool
    async fn blocking<T, F>(&self, op: F) -> SnapResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&B) -> SnapResult<T> + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || op(backend.as_ref()))
            .await
            .map_err(|e| SnapError::storage(format!("storage task failed: {e}")))?
    }
}

/// A record is expired once strictly more than `ttl` has elapsed
fn is_expired(saved_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    let age = now.signed_duration_since(saved_at);
    match chrono::Duration::from_std(ttl) {
        Ok(ttl) => age > ttl,
        Err(_) => false,
    }
}
