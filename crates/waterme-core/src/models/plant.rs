//! Plant model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use super::light::validate_light_level;
use crate::error::{Error, Result};
use crate::util::{normalize_text_option, DAY_MILLIS};

/// Watering interval used when none is known
pub const DEFAULT_WATER_FREQUENCY_DAYS: u32 = 3;

/// Identifier of a plant.
///
/// Server-assigned ids are positive. Plants saved while the backend was
/// unreachable get a negative placeholder until they are pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlantId(i64);

impl PlantId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// True for placeholder ids that the backend has never seen
    #[must_use]
    pub const fn is_local(self) -> bool {
        self.0 <= 0
    }
}

impl fmt::Display for PlantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlantId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A plant owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub id: PlantId,
    /// Owning user
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Reference to a photo on this device; never provided by the backend
    pub photo_uri: Option<String>,
    /// Days between waterings
    pub water_frequency_days: u32,
    /// Last watering (Unix ms)
    pub last_watered_at: Option<i64>,
    /// Next due watering (Unix ms)
    pub next_watering_at: i64,
    /// Light reading on the 1-10 scale
    pub light_level: Option<f32>,
    /// Whether the backend holds the current version of this row
    pub synced: bool,
}

impl Plant {
    /// Due time for a plant watered (or scheduled) at `anchor_ms`.
    ///
    /// # Examples
    ///
    /// ```
    /// use waterme_core::models::Plant;
    ///
    /// assert_eq!(Plant::next_watering_from(0, 3), 259_200_000);
    /// ```
    #[must_use]
    pub fn next_watering_from(anchor_ms: i64, frequency_days: u32) -> i64 {
        anchor_ms.saturating_add(i64::from(frequency_days).saturating_mul(DAY_MILLIS))
    }

    /// Recompute the due time from the last watering, or from `now_ms` when
    /// the plant has never been watered.
    pub fn reschedule(&mut self, now_ms: i64) {
        let anchor = self.last_watered_at.unwrap_or(now_ms);
        self.next_watering_at = Self::next_watering_from(anchor, self.water_frequency_days);
    }

    /// Record a watering at `now_ms` and push the due time forward.
    pub fn mark_watered(&mut self, now_ms: i64) {
        self.last_watered_at = Some(now_ms);
        self.reschedule(now_ms);
    }

    #[must_use]
    pub const fn is_due_at(&self, now_ms: i64) -> bool {
        self.next_watering_at <= now_ms
    }

    #[must_use]
    pub fn has_photo(&self) -> bool {
        self.photo_uri
            .as_deref()
            .is_some_and(|uri| !uri.trim().is_empty())
    }
}

/// Data the user supplies when adding a plant.
///
/// The schedule is derived when the draft becomes a [`Plant`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlant {
    pub name: String,
    pub description: Option<String>,
    pub photo_uri: Option<String>,
    pub water_frequency_days: u32,
    pub light_level: Option<f32>,
}

impl NewPlant {
    #[must_use]
    pub fn new(name: impl Into<String>, water_frequency_days: u32) -> Self {
        Self {
            name: name.into(),
            description: None,
            photo_uri: None,
            water_frequency_days,
            light_level: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_photo_uri(mut self, photo_uri: impl Into<String>) -> Self {
        self.photo_uri = Some(photo_uri.into());
        self
    }

    #[must_use]
    pub const fn with_light_level(mut self, level: f32) -> Self {
        self.light_level = Some(level);
        self
    }

    /// Check required fields and normalize optional text.
    pub fn validate(mut self) -> Result<Self> {
        self.name = validate_name(&self.name)?;
        validate_frequency(self.water_frequency_days)?;
        if let Some(level) = self.light_level {
            validate_light_level(level)?;
        }
        self.description = normalize_text_option(self.description);
        self.photo_uri = normalize_text_option(self.photo_uri);
        Ok(self)
    }

    /// Build an unsynced plant scheduled from `now_ms`.
    #[must_use]
    pub fn into_plant(self, id: PlantId, user_id: i64, now_ms: i64) -> Plant {
        Plant {
            id,
            user_id,
            name: self.name,
            description: self.description,
            photo_uri: self.photo_uri,
            water_frequency_days: self.water_frequency_days,
            last_watered_at: None,
            next_watering_at: Plant::next_watering_from(now_ms, self.water_frequency_days),
            light_level: self.light_level,
            synced: false,
        }
    }
}

/// Partial edit of a plant. `None` leaves a field unchanged; an empty string
/// clears an optional text field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub photo_uri: Option<String>,
    pub water_frequency_days: Option<u32>,
    pub light_level: Option<f32>,
}

impl PlantChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.photo_uri.is_none()
            && self.water_frequency_days.is_none()
            && self.light_level.is_none()
    }

    /// Apply the edit and recompute the schedule at `now_ms`.
    pub fn apply(self, plant: &mut Plant, now_ms: i64) -> Result<()> {
        if let Some(name) = self.name {
            plant.name = validate_name(&name)?;
        }
        if let Some(days) = self.water_frequency_days {
            validate_frequency(days)?;
            plant.water_frequency_days = days;
        }
        if let Some(level) = self.light_level {
            plant.light_level = Some(validate_light_level(level)?);
        }
        if let Some(description) = self.description {
            plant.description = normalize_text_option(Some(description));
        }
        if let Some(photo_uri) = self.photo_uri {
            plant.photo_uri = normalize_text_option(Some(photo_uri));
        }
        plant.reschedule(now_ms);
        plant.synced = false;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String> {
    normalize_text_option(Some(name.to_string()))
        .ok_or_else(|| Error::InvalidInput("plant name is required".into()))
}

fn validate_frequency(days: u32) -> Result<()> {
    if days == 0 {
        return Err(Error::InvalidInput(
            "watering frequency must be at least one day".into(),
        ));
    }
    Ok(())
}
