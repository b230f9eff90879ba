//! Plant table access

#![allow(clippy::cast_possible_truncation)] // light_level is stored as REAL (f64)

use crate::error::{Error, Result};
use crate::models::{Plant, PlantId, DEFAULT_WATER_FREQUENCY_DAYS};
use libsql::{params, Connection};

const PLANT_COLUMNS: &str = "id, user_id, name, description, photo_uri, water_frequency_days, \
     last_watered_at, next_watering_at, light_level, synced";

/// Trait for local plant storage operations (async)
#[allow(async_fn_in_trait)]
pub trait PlantStore {
    /// Insert a plant, or overwrite the row with the same id
    async fn upsert(&self, plant: &Plant) -> Result<()>;

    /// Overwrite an existing plant; fails with `NotFound` when missing
    async fn update(&self, plant: &Plant) -> Result<()>;

    /// Get a plant by id
    async fn get(&self, id: PlantId) -> Result<Option<Plant>>;

    /// List a user's plants, soonest due first
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Plant>>;

    /// Delete one plant (its logs cascade). Returns whether a row was removed.
    async fn delete(&self, id: PlantId) -> Result<bool>;

    /// Delete every plant of every user
    async fn delete_all(&self) -> Result<u64>;

    /// All plants whose next watering is at or before `now_ms`
    async fn plants_needing_water(&self, now_ms: i64) -> Result<Vec<Plant>>;

    /// Allocate a placeholder id below every id in the table
    async fn next_local_id(&self) -> Result<PlantId>;

    /// Move a plant (and its logs) to a new id
    async fn rekey(&self, from: PlantId, to: PlantId) -> Result<()>;

    /// Flag a plant as matching the backend
    async fn mark_synced(&self, id: PlantId) -> Result<()>;

    /// A user's plants that still have to be pushed
    async fn unsynced_for_user(&self, user_id: i64) -> Result<Vec<Plant>>;
}

/// libSQL implementation of `PlantStore`
pub struct LibSqlPlantStore<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlPlantStore<'a> {
    /// Create a new store with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_plant(row: &libsql::Row) -> Result<Plant> {
        let frequency: i64 = row.get(5)?;
        Ok(Plant {
            id: PlantId::new(row.get(0)?),
            user_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            photo_uri: row.get(4)?,
            water_frequency_days: u32::try_from(frequency)
                .unwrap_or(DEFAULT_WATER_FREQUENCY_DAYS),
            last_watered_at: row.get(6)?,
            next_watering_at: row.get(7)?,
            light_level: row.get::<Option<f64>>(8)?.map(|level| level as f32),
            synced: row.get::<i32>(9)? != 0,
        })
    }

    async fn query_plants(&self, sql: &str, params: impl libsql::params::IntoParams) -> Result<Vec<Plant>> {
        let mut rows = self.conn.query(sql, params).await?;
        let mut plants = Vec::new();
        while let Some(row) = rows.next().await? {
            plants.push(Self::parse_plant(&row)?);
        }
        Ok(plants)
    }

    /// Ids of a user's plants that are in sync with the backend
    pub async fn synced_ids_for_user(&self, user_id: i64) -> Result<Vec<PlantId>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id FROM plants WHERE user_id = ? AND synced = 1",
                params![user_id],
            )
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(PlantId::new(row.get(0)?));
        }
        Ok(ids)
    }

    /// Whether any plant belongs to someone other than `user_id`
    pub async fn has_plants_of_other_users(&self, user_id: i64) -> Result<bool> {
        let mut rows = self
            .conn
            .query(
                "SELECT EXISTS(SELECT 1 FROM plants WHERE user_id != ?)",
                params![user_id],
            )
            .await?;
        Ok(match rows.next().await? {
            Some(row) => row.get::<i32>(0)? != 0,
            None => false,
        })
    }

    /// Record a delete the backend still has to see
    pub async fn queue_pending_delete(&self, id: PlantId, user_id: i64, now_ms: i64) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO pending_deletes (plant_id, user_id, queued_at) VALUES (?, ?, ?)
                 ON CONFLICT(plant_id) DO UPDATE SET queued_at = excluded.queued_at",
                params![id.get(), user_id, now_ms],
            )
            .await?;
        Ok(())
    }

    /// Deletes queued for a user, oldest first
    pub async fn pending_deletes(&self, user_id: i64) -> Result<Vec<PlantId>> {
        let mut rows = self
            .conn
            .query(
                "SELECT plant_id FROM pending_deletes WHERE user_id = ? ORDER BY queued_at ASC",
                params![user_id],
            )
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(PlantId::new(row.get(0)?));
        }
        Ok(ids)
    }

    pub async fn clear_pending_delete(&self, id: PlantId) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM pending_deletes WHERE plant_id = ?",
                params![id.get()],
            )
            .await?;
        Ok(())
    }

    pub async fn clear_all_pending_deletes(&self) -> Result<u64> {
        Ok(self.conn.execute("DELETE FROM pending_deletes", ()).await?)
    }
}

impl PlantStore for LibSqlPlantStore<'_> {
    async fn upsert(&self, plant: &Plant) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO plants (id, user_id, name, description, photo_uri, water_frequency_days,
                                     last_watered_at, next_watering_at, light_level, synced)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                     user_id = excluded.user_id,
                     name = excluded.name,
                     description = excluded.description,
                     photo_uri = excluded.photo_uri,
                     water_frequency_days = excluded.water_frequency_days,
                     last_watered_at = excluded.last_watered_at,
                     next_watering_at = excluded.next_watering_at,
                     light_level = excluded.light_level,
                     synced = excluded.synced",
                params![
                    plant.id.get(),
                    plant.user_id,
                    plant.name.clone(),
                    plant.description.clone(),
                    plant.photo_uri.clone(),
                    i64::from(plant.water_frequency_days),
                    plant.last_watered_at,
                    plant.next_watering_at,
                    plant.light_level.map(f64::from),
                    i32::from(plant.synced)
                ],
            )
            .await?;
        Ok(())
    }

    async fn update(&self, plant: &Plant) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "UPDATE plants SET user_id = ?, name = ?, description = ?, photo_uri = ?,
                     water_frequency_days = ?, last_watered_at = ?, next_watering_at = ?,
                     light_level = ?, synced = ?
                 WHERE id = ?",
                params![
                    plant.user_id,
                    plant.name.clone(),
                    plant.description.clone(),
                    plant.photo_uri.clone(),
                    i64::from(plant.water_frequency_days),
                    plant.last_watered_at,
                    plant.next_watering_at,
                    plant.light_level.map(f64::from),
                    i32::from(plant.synced),
                    plant.id.get()
                ],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(format!("plant {}", plant.id)));
        }
        Ok(())
    }

    async fn get(&self, id: PlantId) -> Result<Option<Plant>> {
        let sql = format!("SELECT {PLANT_COLUMNS} FROM plants WHERE id = ?");
        let mut rows = self.conn.query(&sql, params![id.get()]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_plant(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Plant>> {
        let sql = format!(
            "SELECT {PLANT_COLUMNS} FROM plants WHERE user_id = ?
             ORDER BY next_watering_at ASC, id ASC"
        );
        self.query_plants(&sql, params![user_id]).await
    }

    async fn delete(&self, id: PlantId) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM plants WHERE id = ?", params![id.get()])
            .await?;
        Ok(rows > 0)
    }

    async fn delete_all(&self) -> Result<u64> {
        Ok(self.conn.execute("DELETE FROM plants", ()).await?)
    }

    async fn plants_needing_water(&self, now_ms: i64) -> Result<Vec<Plant>> {
        let sql = format!(
            "SELECT {PLANT_COLUMNS} FROM plants WHERE next_watering_at <= ?
             ORDER BY next_watering_at ASC, id ASC"
        );
        self.query_plants(&sql, params![now_ms]).await
    }

    async fn next_local_id(&self) -> Result<PlantId> {
        let mut rows = self
            .conn
            .query("SELECT MIN(COALESCE(MIN(id), 0), 0) - 1 FROM plants", ())
            .await?;
        let id = match rows.next().await? {
            Some(row) => row.get::<i64>(0)?,
            None => -1,
        };
        Ok(PlantId::new(id))
    }

    async fn rekey(&self, from: PlantId, to: PlantId) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "UPDATE plants SET id = ? WHERE id = ?",
                params![to.get(), from.get()],
            )
            .await?;
        if rows == 0 {
            return Err(Error::NotFound(format!("plant {from}")));
        }
        Ok(())
    }

    async fn mark_synced(&self, id: PlantId) -> Result<()> {
        self.conn
            .execute("UPDATE plants SET synced = 1 WHERE id = ?", params![id.get()])
            .await?;
        Ok(())
    }

    async fn unsynced_for_user(&self, user_id: i64) -> Result<Vec<Plant>> {
        let sql = format!(
            "SELECT {PLANT_COLUMNS} FROM plants WHERE user_id = ? AND synced = 0 ORDER BY id ASC"
        );
        self.query_plants(&sql, params![user_id]).await
    }
}
