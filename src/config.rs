/// Runtime configuration
///
/// Paths follow the platform conventions from the `dirs` crate:
/// - Linux: ~/.local/share/snap-report/session.db
/// - macOS: ~/Library/Application Support/snap-report/session.db
/// - Windows: %APPDATA%\snap-report\session.db
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{SnapError, SnapResult};

/// Sessions older than this are expired and purged on the next read
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Quiet period after the last mutation before the session is written
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

const APP_DIR: &str = "snap-report";
const DB_FILE: &str = "session.db";

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite file holding the single session record
    pub db_path: PathBuf,
    /// Where finished reports are saved when sharing is unavailable
    pub download_dir: PathBuf,
    pub session_ttl: Duration,
    pub save_debounce: Duration,
}

impl Config {
    /// Build a configuration rooted in the user's platform directories.
    pub fn from_platform_dirs() -> SnapResult<Self> {
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| SnapError::storage("could not determine user data directory"))?;

        let download_dir = dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| data_dir.clone());

        Ok(Self::rooted_at(data_dir.join(APP_DIR), download_dir))
    }

    /// Build a configuration with the database inside `app_dir`.
    pub fn rooted_at(app_dir: PathBuf, download_dir: PathBuf) -> Self {
        Self {
            db_path: app_dir.join(DB_FILE),
            download_dir,
            session_ttl: SESSION_TTL,
            save_debounce: SAVE_DEBOUNCE,
        }
    }
}
