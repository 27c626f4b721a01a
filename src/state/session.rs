/// The live documentation session
///
/// Owns the in-memory workspace and keeps the session store in step with it:
/// every mutation schedules a debounced save of the whole location list.
/// The store is only read once, at restore.
use std::time::Duration;
use tracing::info;

use super::autosave::SaveScheduler;
use super::data::{Location, ShootMode};
use super::store::{SessionBackend, SessionStore, SqliteBackend};
use super::workspace::Workspace;
use crate::config::Config;
use crate::error::{SnapError, SnapResult};
use crate::photo::normalize::{normalize_batch, NormalizedBatch};
use crate::report::{generate_report, Delivered, Delivery};

pub struct Session<B: SessionBackend> {
    workspace: Workspace,
    autosave: SaveScheduler<B>,
}

impl Session<SqliteBackend> {
    /// Restore from the SQLite session slot described by `config`
    pub async fn open(config: &Config) -> (Self, bool) {
        let backend = SqliteBackend::new(config.db_path.clone());
        let store = SessionStore::with_ttl(backend, config.session_ttl);
        Self::restore(store, config.save_debounce).await
    }
}

impl<B: SessionBackend> Session<B> {
    /// Restore the last session (if any and not expired) and start mirroring.
    ///
    /// Returns the session and whether earlier locations were restored.
    pub async fn restore(store: SessionStore<B>, debounce: Duration) -> (Self, bool) {
        let restored = store.load().await.filter(|locations| !locations.is_empty());
        let was_restored = restored.is_some();
        if let Some(locations) = &restored {
            info!(locations = locations.len(), "restored previous session");
        }

        let mut autosave = SaveScheduler::new(store, debounce);
        autosave.arm();

        let session = Self {
            workspace: Workspace::from_locations(restored.unwrap_or_default()),
            autosave,
        };
        (session, was_restored)
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn locations(&self) -> &[Location] {
        self.workspace.locations()
    }

    pub fn add_location(&mut self, name: &str) -> SnapResult<String> {
        let id = self.workspace.add_location(name)?.id.clone();
        self.persist();
        Ok(id)
    }

    /// Normalize raw captured files and append the successes in input order.
    ///
    /// Files that fail to normalize are reported back and left out.
    pub async fn add_photos(
        &mut self,
        id: &str,
        mode: ShootMode,
        files: Vec<Vec<u8>>,
    ) -> SnapResult<NormalizedBatch> {
        if self.workspace.get(id).is_none() {
            return Err(SnapError::validation(format!("unknown location {id}")));
        }

        let mut batch = normalize_batch(files).await;
        if !batch.photos.is_empty() {
            let photos = std::mem::take(&mut batch.photos);
            let added = photos.len();
            self.workspace.add_photos(id, mode, photos)?;
            info!(location = id, ?mode, added, rejected = batch.rejected.len(), "photos added");
            self.persist();
        }
        Ok(batch)
    }

    pub fn remove_photo(&mut self, id: &str, mode: ShootMode, index: usize) -> SnapResult<()> {
        self.workspace.remove_photo(id, mode, index)?;
        self.persist();
        Ok(())
    }

    /// Delete a location and every photo it holds
    pub fn delete_location(&mut self, id: &str) -> SnapResult<()> {
        let removed = self.workspace.delete_location(id)?;
        info!(location = %removed.name, "location deleted");
        self.persist();
        Ok(())
    }

    /// Compose and deliver the report for one location
    pub async fn generate_report(
        &self,
        id: &str,
        delivery: &Delivery,
    ) -> SnapResult<Option<Delivered>> {
        let location = self
            .workspace
            .get(id)
            .ok_or_else(|| SnapError::validation(format!("unknown location {id}")))?;
        generate_report(location, delivery).await
    }

    /// Write any pending state immediately
    pub async fn flush(&mut self) {
        self.autosave.flush().await;
    }

    fn persist(&mut self) {
        self.autosave.schedule(self.workspace.locations().to_vec());
    }
}
