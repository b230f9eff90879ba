//! Plant repository: the local cache kept in step with the backend.
//!
//! Reads are always served from the local database. Writes land locally
//! first and are mirrored to the backend on a best-effort basis; anything
//! the backend missed is retried by the next [`PlantRepository::refresh`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::api::{parse_wire_date, PlantApi, PlantRequest, PlantResponse};
use crate::models::{
    NewPlant, Plant, PlantChanges, PlantId, PlantLog, DEFAULT_WATER_FREQUENCY_DAYS,
    MAX_LIGHT_LEVEL, MIN_LIGHT_LEVEL,
};
use crate::services::DatabaseService;
use crate::util::{normalize_text_option, unix_millis_now};
use crate::{Error, Result};

/// Source of "now" in Unix ms
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Result of a [`PlantRepository::refresh`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Nobody is logged in; nothing was touched
    NoSession,
    /// The backend could not be listed; the cache was left as it was
    Stale { reason: String },
    Refreshed {
        /// Plants received from the backend
        fetched: usize,
        /// Local changes the backend accepted during this refresh
        pushed: usize,
        /// Cached plants dropped because the backend no longer has them
        removed: usize,
    },
}

/// Single data-access surface for plants
pub struct PlantRepository<A> {
    db: DatabaseService,
    api: A,
    clock: Clock,
}

impl<A: PlantApi> PlantRepository<A> {
    pub fn new(db: DatabaseService, api: A) -> Self {
        Self {
            db,
            api,
            clock: Arc::new(unix_millis_now),
        }
    }

    /// Replace the wall clock (tests, replays)
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub const fn database(&self) -> &DatabaseService {
        &self.db
    }

    fn now(&self) -> i64 {
        (self.clock)()
    }

    async fn require_user(&self) -> Result<i64> {
        self.db.user_id().await?.ok_or(Error::NotAuthenticated)
    }

    /// Push pending local changes, then pull the user's plants from the
    /// backend and merge them into the cache.
    ///
    /// Remote failures never surface as errors; only local storage errors do.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let Some(user_id) = self.db.user_id().await? else {
            tracing::debug!("Skipping refresh: no user is logged in");
            return Ok(RefreshOutcome::NoSession);
        };

        let pushed = self.push_pending(user_id).await?;

        let remote = match self.api.list_plants(user_id).await {
            Ok(remote) => remote,
            Err(error) => {
                tracing::warn!("Could not fetch plants, keeping cached data: {error}");
                return Ok(RefreshOutcome::Stale {
                    reason: error.to_string(),
                });
            }
        };

        let tombstones: HashSet<PlantId> =
            self.db.pending_deletes(user_id).await?.into_iter().collect();
        let local: HashMap<PlantId, Plant> = self
            .db
            .list_plants(user_id)
            .await?
            .into_iter()
            .map(|plant| (plant.id, plant))
            .collect();

        let now = self.now();
        let fetched = remote.len();
        let mut merged = Vec::with_capacity(remote.len());
        for record in &remote {
            let id = PlantId::new(record.id);
            if id.is_local() {
                tracing::warn!("Ignoring remote plant with invalid id {id}");
                continue;
            }
            if tombstones.contains(&id) {
                tracing::debug!("Plant {id} is deleted locally, not restoring it");
                continue;
            }
            let cached = local.get(&id);
            if cached.is_some_and(|plant| !plant.synced) {
                // The push above failed; the local edit stays until it lands
                tracing::debug!("Plant {id} has unpushed changes, keeping local copy");
                continue;
            }
            merged.push(merge_remote_plant(record, cached, user_id, now));
        }

        let removed = self.db.apply_remote_snapshot(user_id, &merged).await?;
        tracing::info!(
            "Refreshed plants for user {user_id}: {fetched} fetched, {pushed} pushed, {removed} removed"
        );

        Ok(RefreshOutcome::Refreshed {
            fetched,
            pushed,
            removed,
        })
    }

    /// Replay tombstones and unsynced rows. Returns how many the backend took.
    async fn push_pending(&self, user_id: i64) -> Result<usize> {
        let mut pushed = 0;

        for id in self.db.pending_deletes(user_id).await? {
            match self.api.delete_plant(id.get()).await {
                Err(error) if error.status() != Some(404) => {
                    tracing::warn!("Delete of plant {id} still pending: {error}");
                }
                _ => {
                    self.db.clear_pending_delete(id).await?;
                    pushed += 1;
                }
            }
        }

        for plant in self.db.unsynced_plants(user_id).await? {
            if plant.id.is_local() {
                match self.api.create_plant(&PlantRequest::from(&plant)).await {
                    Ok(server_id) if server_id > 0 => {
                        let server_id = PlantId::new(server_id);
                        tracing::debug!("Plant {} is now {server_id}", plant.id);
                        self.db.adopt_server_id(plant.id, server_id).await?;
                        pushed += 1;
                    }
                    Ok(server_id) => {
                        tracing::warn!("Backend returned invalid id {server_id} for a new plant");
                    }
                    Err(error) => {
                        tracing::warn!("Plant {} is still offline-only: {error}", plant.id);
                    }
                }
            } else if self.push_update(&plant).await? {
                pushed += 1;
            }
        }

        Ok(pushed)
    }

    /// Mirror a local edit. Returns whether the backend accepted it.
    async fn push_update(&self, plant: &Plant) -> Result<bool> {
        if plant.id.is_local() {
            return Ok(false);
        }

        match self
            .api
            .update_plant(plant.id.get(), &PlantRequest::from(plant))
            .await
        {
            Ok(()) => {
                self.db.mark_plant_synced(plant.id).await?;
                Ok(true)
            }
            Err(error) => {
                tracing::warn!("Could not update plant {} remotely: {error}", plant.id);
                Ok(false)
            }
        }
    }

    /// Add a plant for the current user.
    ///
    /// The backend is asked first so the row can carry the server id; when
    /// it is unreachable the plant is kept under a placeholder id.
    pub async fn insert(&self, draft: NewPlant) -> Result<Plant> {
        let user_id = self.require_user().await?;
        let draft = draft.validate()?;
        let mut plant = draft.into_plant(PlantId::new(0), user_id, self.now());

        match self.api.create_plant(&PlantRequest::from(&plant)).await {
            Ok(server_id) if server_id > 0 => {
                plant.id = PlantId::new(server_id);
                plant.synced = true;
                self.db.save_plant(&plant).await?;
                tracing::debug!("Added plant {}", plant.id);
                Ok(plant)
            }
            outcome => {
                match outcome {
                    Err(error) => tracing::warn!("Saving plant offline: {error}"),
                    Ok(server_id) => {
                        tracing::warn!("Saving plant offline: backend returned id {server_id}");
                    }
                }
                self.db.insert_local_plant(plant).await
            }
        }
    }

    /// Edit a plant. Returns `None` when it does not exist.
    pub async fn update(&self, id: PlantId, changes: PlantChanges) -> Result<Option<Plant>> {
        let Some(mut plant) = self.db.get_plant(id).await? else {
            return Ok(None);
        };

        changes.apply(&mut plant, self.now())?;
        self.db.update_plant(&plant).await?;
        plant.synced = self.push_update(&plant).await?;
        Ok(Some(plant))
    }

    /// Delete a plant and its history. Returns whether it existed.
    pub async fn delete_by_id(&self, id: PlantId) -> Result<bool> {
        let Some(plant) = self.db.get_plant(id).await? else {
            return Ok(false);
        };

        self.db.delete_plant(id).await?;
        if id.is_local() {
            return Ok(true);
        }

        if let Err(error) = self.api.delete_plant(id.get()).await {
            tracing::warn!("Could not delete plant {id} remotely, will retry: {error}");
            self.db
                .queue_pending_delete(id, plant.user_id, self.now())
                .await?;
        }
        Ok(true)
    }

    /// Record a watering now. Returns `None` when the plant does not exist.
    pub async fn water_plant(&self, id: PlantId) -> Result<Option<Plant>> {
        let Some(mut plant) = self.db.get_plant(id).await? else {
            return Ok(None);
        };

        let now = self.now();
        plant.mark_watered(now);
        plant.synced = false;
        self.db.record_watering(&plant, now).await?;
        plant.synced = self.push_update(&plant).await?;
        tracing::debug!("Watered plant {id}, next due at {}", plant.next_watering_at);
        Ok(Some(plant))
    }

    /// The current user's plants, soonest due first.
    pub async fn plants(&self) -> Result<Vec<Plant>> {
        let user_id = self.require_user().await?;
        self.db.list_plants(user_id).await
    }

    pub async fn plant(&self, id: PlantId) -> Result<Option<Plant>> {
        self.db.get_plant(id).await
    }

    /// Watering history, newest first.
    pub async fn plant_logs(&self, id: PlantId) -> Result<Vec<PlantLog>> {
        self.db.plant_logs(id).await
    }
}

/// Combine a backend record with the cached row of the same id.
///
/// The backend wins for every field it carries, except the photo: a local
/// photo reference is never replaced because the backend never stores one.
/// Missing fields fall back to the cached value, then to defaults.
#[must_use]
pub fn merge_remote_plant(
    remote: &PlantResponse,
    local: Option<&Plant>,
    user_id: i64,
    now_ms: i64,
) -> Plant {
    let id = PlantId::new(remote.id);

    let name = normalize_text_option(remote.name.clone())
        .or_else(|| local.map(|plant| plant.name.clone()))
        .unwrap_or_else(|| format!("Plant #{id}"));

    let description = match &remote.description {
        Some(description) => normalize_text_option(Some(description.clone())),
        None => local.and_then(|plant| plant.description.clone()),
    };

    let photo_uri = local
        .filter(|plant| plant.has_photo())
        .and_then(|plant| plant.photo_uri.clone())
        .or_else(|| normalize_text_option(remote.photo_url.clone()));

    let water_frequency_days = remote
        .water_frequency
        .filter(|days| *days >= 1)
        .or_else(|| local.map(|plant| plant.water_frequency_days))
        .unwrap_or(DEFAULT_WATER_FREQUENCY_DAYS);

    let last_watered_at = match remote.last_watering.as_deref() {
        Some(raw) => Some(parse_wire_date(Some(raw), now_ms)),
        None => local.and_then(|plant| plant.last_watered_at),
    };

    let next_watering_at = match remote.next_watering.as_deref() {
        Some(raw) => parse_wire_date(Some(raw), now_ms),
        None => local.map_or(now_ms, |plant| plant.next_watering_at),
    };

    // The backend stores 0.0 when no reading was taken
    let light_level = remote
        .light_level
        .filter(|level| (MIN_LIGHT_LEVEL..=MAX_LIGHT_LEVEL).contains(level))
        .or_else(|| local.and_then(|plant| plant.light_level));

    Plant {
        id,
        user_id,
        name,
        description,
        photo_uri,
        water_frequency_days,
        last_watered_at,
        next_watering_at,
        light_level,
        synced: true,
    }
}
