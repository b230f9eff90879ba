//! Shared database service wrapper used by the repository, account flows and
//! the reminder scan.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libsql::Connection;
use tokio::sync::Mutex;

use crate::db::{
    Database, LibSqlPlantLogStore, LibSqlPlantStore, LibSqlSessionStore, PlantLogStore,
    PlantStore, SessionStore,
};
use crate::models::{Plant, PlantId, PlantLog, Session};
use crate::Result;

/// Thread-safe service for DB and repository operations.
#[derive(Clone)]
pub struct DatabaseService {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
}

impl DatabaseService {
    /// Open a database service at the given filesystem path.
    ///
    /// A file that is not a database is moved aside and a fresh one is
    /// created in its place.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = match Database::open(&db_path).await {
            Ok(db) => db,
            Err(error) if Self::is_corrupted_db_error(&error) => {
                tracing::warn!(
                    "Local DB at {} is unreadable: {}. Moving it aside and starting fresh.",
                    db_path.display(),
                    error
                );
                Self::quarantine_corrupted_db_files(&db_path)?;
                Database::open(&db_path).await?
            }
            Err(error) => return Err(error),
        };

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: Some(db_path),
        })
    }

    /// Open an in-memory database service (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: None,
        })
    }

    /// Filesystem location, when the database is on disk
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn is_corrupted_db_error(error: &crate::Error) -> bool {
        let message = error.to_string().to_ascii_lowercase();
        message.contains("file is not a database")
            || message.contains("database disk image is malformed")
    }

    fn quarantine_corrupted_db_files(db_path: &Path) -> Result<()> {
        if db_path.exists() {
            let timestamp = chrono::Utc::now().timestamp_millis();
            let base_name = db_path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("waterme.db");
            let backup_path = db_path.with_file_name(format!("{base_name}.corrupt-{timestamp}"));

            std::fs::rename(db_path, &backup_path)?;
            tracing::warn!(
                "Moved corrupted local DB file from {} to {}",
                db_path.display(),
                backup_path.display()
            );
        }

        let Some(parent) = db_path.parent() else {
            return Ok(());
        };
        let Some(base_name) = db_path.file_name().and_then(|name| name.to_str()) else {
            return Ok(());
        };
        // -wal and -shm sidecars belong to the old file
        let sidecar_prefix = format!("{base_name}-");

        for entry in std::fs::read_dir(parent)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if file_name.starts_with(&sidecar_prefix) {
                let path = entry.path();
                std::fs::remove_file(&path)?;
                tracing::warn!("Removed stale local DB file {}", path.display());
            }
        }

        Ok(())
    }

    /// List a user's plants, soonest due first.
    pub async fn list_plants(&self, user_id: i64) -> Result<Vec<Plant>> {
        let db = self.db.lock().await;
        let store = LibSqlPlantStore::new(db.connection());
        store.list_for_user(user_id).await
    }

    /// Fetch a plant by id.
    pub async fn get_plant(&self, id: PlantId) -> Result<Option<Plant>> {
        let db = self.db.lock().await;
        let store = LibSqlPlantStore::new(db.connection());
        store.get(id).await
    }

    /// Insert or overwrite a plant row.
    pub async fn save_plant(&self, plant: &Plant) -> Result<()> {
        let db = self.db.lock().await;
        let store = LibSqlPlantStore::new(db.connection());
        store.upsert(plant).await
    }

    /// Overwrite an existing plant row.
    pub async fn update_plant(&self, plant: &Plant) -> Result<()> {
        let db = self.db.lock().await;
        let store = LibSqlPlantStore::new(db.connection());
        store.update(plant).await
    }

    /// Store a plant the backend has not seen under a fresh placeholder id.
    pub async fn insert_local_plant(&self, mut plant: Plant) -> Result<Plant> {
        let db = self.db.lock().await;
        let store = LibSqlPlantStore::new(db.connection());
        plant.id = store.next_local_id().await?;
        plant.synced = false;
        store.upsert(&plant).await?;
        Ok(plant)
    }

    /// Delete a plant and its logs. Returns whether it existed.
    pub async fn delete_plant(&self, id: PlantId) -> Result<bool> {
        let db = self.db.lock().await;
        let store = LibSqlPlantStore::new(db.connection());
        store.delete(id).await
    }

    /// Plants of any user that are due at `now_ms`.
    pub async fn plants_needing_water(&self, now_ms: i64) -> Result<Vec<Plant>> {
        let db = self.db.lock().await;
        let store = LibSqlPlantStore::new(db.connection());
        store.plants_needing_water(now_ms).await
    }

    pub async fn unsynced_plants(&self, user_id: i64) -> Result<Vec<Plant>> {
        let db = self.db.lock().await;
        let store = LibSqlPlantStore::new(db.connection());
        store.unsynced_for_user(user_id).await
    }

    pub async fn mark_plant_synced(&self, id: PlantId) -> Result<()> {
        let db = self.db.lock().await;
        let store = LibSqlPlantStore::new(db.connection());
        store.mark_synced(id).await
    }

    /// Move a placeholder plant to its server id and mark it synced.
    pub async fn adopt_server_id(&self, local_id: PlantId, server_id: PlantId) -> Result<()> {
        let db = self.db.lock().await;
        let conn = db.connection();
        conn.execute("BEGIN TRANSACTION", ()).await?;
        let result = async {
            let store = LibSqlPlantStore::new(conn);
            // A stale row may already hold the server id
            store.delete(server_id).await?;
            store.rekey(local_id, server_id).await?;
            store.mark_synced(server_id).await
        }
        .await;
        finish_transaction(conn, result).await
    }

    /// Write a watering: the rescheduled plant plus one log row.
    pub async fn record_watering(&self, plant: &Plant, watered_at: i64) -> Result<PlantLog> {
        let db = self.db.lock().await;
        let conn = db.connection();
        conn.execute("BEGIN TRANSACTION", ()).await?;
        let result = async {
            LibSqlPlantStore::new(conn).update(plant).await?;
            LibSqlPlantLogStore::new(conn)
                .append(plant.id, watered_at)
                .await
        }
        .await;
        finish_transaction(conn, result).await
    }

    /// A plant's watering history, newest first.
    pub async fn plant_logs(&self, id: PlantId) -> Result<Vec<PlantLog>> {
        let db = self.db.lock().await;
        let store = LibSqlPlantLogStore::new(db.connection());
        store.list_for_plant(id).await
    }

    /// Replace a user's synced rows with a merged remote listing.
    ///
    /// Merged rows are upserted, synced rows missing from the listing are
    /// deleted, unsynced rows are left alone. Returns the number of deleted
    /// rows.
    pub async fn apply_remote_snapshot(&self, user_id: i64, merged: &[Plant]) -> Result<usize> {
        let db = self.db.lock().await;
        let conn = db.connection();
        conn.execute("BEGIN TRANSACTION", ()).await?;
        let result = async {
            let store = LibSqlPlantStore::new(conn);
            for plant in merged {
                store.upsert(plant).await?;
            }

            let remote_ids: HashSet<PlantId> = merged.iter().map(|plant| plant.id).collect();
            let mut removed = 0;
            for id in store.synced_ids_for_user(user_id).await? {
                if !remote_ids.contains(&id) {
                    tracing::debug!("Plant {id} no longer exists remotely");
                    store.delete(id).await?;
                    removed += 1;
                }
            }
            Ok::<_, crate::Error>(removed)
        }
        .await;
        finish_transaction(conn, result).await
    }

    /// Remember a delete the backend still has to see.
    pub async fn queue_pending_delete(&self, id: PlantId, user_id: i64, now_ms: i64) -> Result<()> {
        let db = self.db.lock().await;
        let store = LibSqlPlantStore::new(db.connection());
        store.queue_pending_delete(id, user_id, now_ms).await
    }

    pub async fn pending_deletes(&self, user_id: i64) -> Result<Vec<PlantId>> {
        let db = self.db.lock().await;
        let store = LibSqlPlantStore::new(db.connection());
        store.pending_deletes(user_id).await
    }

    pub async fn clear_pending_delete(&self, id: PlantId) -> Result<()> {
        let db = self.db.lock().await;
        let store = LibSqlPlantStore::new(db.connection());
        store.clear_pending_delete(id).await
    }

    /// Whether the cache holds plants of someone other than `user_id`.
    pub async fn has_plants_of_other_users(&self, user_id: i64) -> Result<bool> {
        let db = self.db.lock().await;
        let store = LibSqlPlantStore::new(db.connection());
        store.has_plants_of_other_users(user_id).await
    }

    /// Drop every plant, log and pending delete.
    pub async fn clear_local_data(&self) -> Result<()> {
        let db = self.db.lock().await;
        let conn = db.connection();
        conn.execute("BEGIN TRANSACTION", ()).await?;
        let result = async {
            let logs = LibSqlPlantLogStore::new(conn).delete_all().await?;
            let store = LibSqlPlantStore::new(conn);
            let plants = store.delete_all().await?;
            store.clear_all_pending_deletes().await?;
            tracing::info!("Cleared local cache ({plants} plants, {logs} logs)");
            Ok::<_, crate::Error>(())
        }
        .await;
        finish_transaction(conn, result).await
    }

    /// Load the session.
    pub async fn load_session(&self) -> Result<Session> {
        let db = self.db.lock().await;
        let store = LibSqlSessionStore::new(db.connection());
        store.load().await
    }

    /// Remember a logged-in user.
    pub async fn save_user_session(&self, user_id: i64, user_name: &str) -> Result<()> {
        let db = self.db.lock().await;
        let store = LibSqlSessionStore::new(db.connection());
        store.save_login(user_id, user_name).await
    }

    /// Current user, when logged in.
    pub async fn user_id(&self) -> Result<Option<i64>> {
        Ok(self.load_session().await?.active_user_id())
    }

    pub async fn user_name(&self) -> Result<Option<String>> {
        let session = self.load_session().await?;
        Ok(session.logged_in.then_some(session.user_name).flatten())
    }

    pub async fn last_user_id(&self) -> Result<Option<i64>> {
        Ok(self.load_session().await?.last_user_id)
    }

    pub async fn is_logged_in(&self) -> Result<bool> {
        Ok(self.load_session().await?.logged_in)
    }

    /// Forget the current user; `last_user_id` is kept.
    pub async fn logout(&self) -> Result<()> {
        let db = self.db.lock().await;
        let store = LibSqlSessionStore::new(db.connection());
        store.clear().await
    }
}

async fn finish_transaction<T>(conn: &Connection, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            if let Err(error) = conn.execute("COMMIT", ()).await {
                conn.execute("ROLLBACK", ()).await.ok();
                return Err(error.into());
            }
            Ok(value)
        }
        Err(error) => {
            conn.execute("ROLLBACK", ()).await.ok();
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPlant;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn plant(id: i64, user_id: i64, name: &str, synced: bool) -> Plant {
        let mut plant = NewPlant::new(name, 3).into_plant(PlantId::new(id), user_id, 0);
        plant.synced = synced;
        plant
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn in_memory_save_and_list_roundtrip() {
        let service = DatabaseService::open_in_memory().await.unwrap();

        service.save_plant(&plant(1, 7, "Fern", true)).await.unwrap();
        let plants = service.list_plants(7).await.unwrap();
        assert_eq!(plants.len(), 1);
        assert_eq!(plants[0].name, "Fern");
        assert!(service.list_plants(8).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn insert_local_plant_allocates_negative_ids() {
        let service = DatabaseService::open_in_memory().await.unwrap();
        service.save_plant(&plant(3, 7, "Synced", true)).await.unwrap();

        let first = service
            .insert_local_plant(plant(0, 7, "Offline", true))
            .await
            .unwrap();
        let second = service
            .insert_local_plant(plant(0, 7, "Offline too", true))
            .await
            .unwrap();

        assert_eq!(first.id, PlantId::new(-1));
        assert_eq!(second.id, PlantId::new(-2));
        assert!(!first.synced);
        assert_eq!(service.unsynced_plants(7).await.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn adopt_server_id_keeps_logs_and_marks_synced() {
        let service = DatabaseService::open_in_memory().await.unwrap();
        let local = service
            .insert_local_plant(plant(0, 7, "Offline", false))
            .await
            .unwrap();
        service.record_watering(&local, 50).await.unwrap();

        service
            .adopt_server_id(local.id, PlantId::new(31))
            .await
            .unwrap();

        let adopted = service.get_plant(PlantId::new(31)).await.unwrap().unwrap();
        assert!(adopted.synced);
        assert_eq!(service.plant_logs(PlantId::new(31)).await.unwrap().len(), 1);
        assert!(service.get_plant(local.id).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn apply_remote_snapshot_keeps_unsynced_and_drops_stale_rows() {
        let service = DatabaseService::open_in_memory().await.unwrap();
        service.save_plant(&plant(1, 7, "Kept", true)).await.unwrap();
        service.save_plant(&plant(2, 7, "Gone remotely", true)).await.unwrap();
        service.save_plant(&plant(-1, 7, "Offline", false)).await.unwrap();
        service.save_plant(&plant(9, 8, "Someone else", true)).await.unwrap();

        let removed = service
            .apply_remote_snapshot(7, &[plant(1, 7, "Renamed", true), plant(4, 7, "New", true)])
            .await
            .unwrap();

        assert_eq!(removed, 1);
        let mut names: Vec<String> = service
            .list_plants(7)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["New", "Offline", "Renamed"]);
        assert_eq!(service.list_plants(8).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn record_watering_for_missing_plant_rolls_back() {
        let service = DatabaseService::open_in_memory().await.unwrap();

        let result = service.record_watering(&plant(5, 7, "Ghost", true), 10).await;
        assert!(matches!(result, Err(crate::Error::NotFound(_))));
        assert!(service.plant_logs(PlantId::new(5)).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn session_roundtrip_and_logout() {
        let service = DatabaseService::open_in_memory().await.unwrap();
        assert_eq!(service.user_id().await.unwrap(), None);

        service.save_user_session(7, "Ana").await.unwrap();
        assert_eq!(service.user_id().await.unwrap(), Some(7));
        assert_eq!(service.user_name().await.unwrap().as_deref(), Some("Ana"));
        assert!(service.is_logged_in().await.unwrap());

        service.logout().await.unwrap();
        assert_eq!(service.user_id().await.unwrap(), None);
        assert_eq!(service.user_name().await.unwrap(), None);
        assert_eq!(service.last_user_id().await.unwrap(), Some(7));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn clear_local_data_empties_every_table() {
        let service = DatabaseService::open_in_memory().await.unwrap();
        let fern = plant(1, 7, "Fern", true);
        service.save_plant(&fern).await.unwrap();
        service.record_watering(&fern, 10).await.unwrap();
        service.queue_pending_delete(PlantId::new(2), 7, 0).await.unwrap();

        service.clear_local_data().await.unwrap();

        assert!(service.list_plants(7).await.unwrap().is_empty());
        assert!(service.plant_logs(fern.id).await.unwrap().is_empty());
        assert!(service.pending_deletes(7).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn open_path_recovers_from_corrupted_file() {
        let tmp = tempdir().unwrap();
        let db_path = tmp.path().join("nested").join("waterme.db");
        std::fs::create_dir_all(db_path.parent().unwrap()).unwrap();
        std::fs::write(&db_path, vec![0x42; 4096]).unwrap();

        let service = DatabaseService::open_path(&db_path).await.unwrap();
        service.save_plant(&plant(1, 7, "Fern", true)).await.unwrap();
        assert_eq!(service.path(), Some(db_path.as_path()));
    }

    #[test]
    fn detects_corrupted_db_errors() {
        assert!(DatabaseService::is_corrupted_db_error(&crate::Error::Io(
            std::io::Error::other("SQLite failure: file is not a database")
        )));
        assert!(!DatabaseService::is_corrupted_db_error(
            &crate::Error::InvalidInput("name must not be empty".to_string())
        ));
    }

    #[test]
    fn quarantine_moves_db_and_removes_sidecars() {
        let tmp = tempdir().unwrap();
        let db_path = tmp.path().join("waterme.db");
        let wal_path = tmp.path().join("waterme.db-wal");
        let shm_path = tmp.path().join("waterme.db-shm");

        std::fs::write(&db_path, b"bad-db").unwrap();
        std::fs::write(&wal_path, b"wal").unwrap();
        std::fs::write(&shm_path, b"shm").unwrap();

        DatabaseService::quarantine_corrupted_db_files(&db_path).unwrap();

        assert!(!db_path.exists());
        assert!(!wal_path.exists());
        assert!(!shm_path.exists());

        let found_backup = std::fs::read_dir(tmp.path()).unwrap().any(|entry| {
            entry
                .unwrap()
                .file_name()
                .to_string_lossy()
                .starts_with("waterme.db.corrupt-")
        });
        assert!(found_backup);
    }
}
