//! Watering history storage

use crate::error::Result;
use crate::models::{PlantId, PlantLog};
use libsql::{params, Connection};

/// Trait for watering log storage operations (async)
#[allow(async_fn_in_trait)]
pub trait PlantLogStore {
    /// Record a watering
    async fn append(&self, plant_id: PlantId, watered_at: i64) -> Result<PlantLog>;

    /// A plant's history, newest first
    async fn list_for_plant(&self, plant_id: PlantId) -> Result<Vec<PlantLog>>;

    /// Remove every log row
    async fn delete_all(&self) -> Result<u64>;
}

/// libSQL implementation of `PlantLogStore`
pub struct LibSqlPlantLogStore<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlPlantLogStore<'a> {
    /// Create a new store with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl PlantLogStore for LibSqlPlantLogStore<'_> {
    async fn append(&self, plant_id: PlantId, watered_at: i64) -> Result<PlantLog> {
        self.conn
            .execute(
                "INSERT INTO plant_logs (plant_id, watered_at) VALUES (?, ?)",
                params![plant_id.get(), watered_at],
            )
            .await?;

        Ok(PlantLog {
            id: self.conn.last_insert_rowid(),
            plant_id,
            watered_at,
        })
    }

    async fn list_for_plant(&self, plant_id: PlantId) -> Result<Vec<PlantLog>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, plant_id, watered_at FROM plant_logs
                 WHERE plant_id = ?
                 ORDER BY watered_at DESC, id DESC",
                params![plant_id.get()],
            )
            .await?;

        let mut logs = Vec::new();
        while let Some(row) = rows.next().await? {
            logs.push(PlantLog {
                id: row.get(0)?,
                plant_id: PlantId::new(row.get(1)?),
                watered_at: row.get(2)?,
            });
        }
        Ok(logs)
    }

    async fn delete_all(&self) -> Result<u64> {
        Ok(self.conn.execute("DELETE FROM plant_logs", ()).await?)
    }
}
