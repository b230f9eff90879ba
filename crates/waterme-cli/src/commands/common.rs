use std::env;
use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone, Utc};
use serde::Serialize;
use waterme_core::models::{is_low_light, light_level_from_lux};
use waterme_core::{
    AccountService, ClientConfig, DatabaseService, HttpPlantApi, Plant, PlantId, PlantLog,
    PlantRepository,
};

use crate::cli::PlantDetailArgs;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

/// Environment override for the local database location
pub const DB_PATH_ENV: &str = "WATERME_DB_PATH";

/// Everything a command needs: the local store plus the resolved profile.
pub struct AppContext {
    pub db: DatabaseService,
    pub config: ClientConfig,
}

impl AppContext {
    pub async fn open(db_path: &Path, profile: Option<&str>) -> Result<Self, CliError> {
        let profiles = CliProfilesConfig::load().map_err(CliError::Config)?;
        let profile_name = profiles.resolve_profile_name(profile);
        let config = profiles.effective(&profile_name);
        config
            .validate()
            .map_err(|error| CliError::Config(error.to_string()))?;

        let db = DatabaseService::open_path(db_path).await?;
        tracing::debug!("Using profile '{profile_name}'");
        Ok(Self { db, config })
    }

    pub fn api(&self) -> Result<HttpPlantApi, CliError> {
        Ok(self.config.http_api()?)
    }

    pub fn repository(&self) -> Result<PlantRepository<HttpPlantApi>, CliError> {
        Ok(PlantRepository::new(self.db.clone(), self.api()?))
    }

    pub fn accounts(&self) -> Result<AccountService<HttpPlantApi>, CliError> {
        Ok(AccountService::new(self.db.clone(), self.api()?))
    }
}

#[derive(Debug, Serialize)]
pub struct PlantListItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub photo_uri: Option<String>,
    pub water_frequency_days: u32,
    pub last_watered_at: Option<i64>,
    pub next_watering_at: i64,
    pub due_label: String,
    pub needs_water: bool,
    pub light_level: Option<f32>,
    pub low_light: bool,
    pub synced: bool,
}

#[derive(Debug, Serialize)]
pub struct PlantLogItem {
    pub id: i64,
    pub plant_id: i64,
    pub watered_at: i64,
    pub watered_at_local: String,
}

pub fn plant_to_list_item(plant: &Plant, now_ms: i64) -> PlantListItem {
    PlantListItem {
        id: plant.id.get(),
        name: plant.name.clone(),
        description: plant.description.clone(),
        photo_uri: plant.photo_uri.clone(),
        water_frequency_days: plant.water_frequency_days,
        last_watered_at: plant.last_watered_at,
        next_watering_at: plant.next_watering_at,
        due_label: format_due(plant.next_watering_at, now_ms),
        needs_water: plant.is_due_at(now_ms),
        light_level: plant.light_level,
        low_light: plant.light_level.is_some_and(is_low_light),
        synced: plant.synced,
    }
}

pub fn log_to_item(log: &PlantLog) -> PlantLogItem {
    PlantLogItem {
        id: log.id,
        plant_id: log.plant_id.get(),
        watered_at: log.watered_at,
        watered_at_local: format_local_timestamp(log.watered_at),
    }
}

pub fn format_plant_lines(plants: &[Plant], now_ms: i64) -> Vec<String> {
    plants
        .iter()
        .map(|plant| {
            let name = truncate(&plant.name, 24);
            let due = format_due(plant.next_watering_at, now_ms);
            let mut line = format!(
                "{:>6}  {name:<24}  every {:>2}d  {due}",
                plant.id.get(),
                plant.water_frequency_days
            );
            if !plant.synced {
                line.push_str("  (not synced)");
            }
            line
        })
        .collect()
}

pub fn format_plant_details(plant: &Plant, now_ms: i64) -> Vec<String> {
    let mut lines = vec![
        format!("{} (#{})", plant.name, plant.id),
        format!("  Water every:   {} day(s)", plant.water_frequency_days),
        format!(
            "  Last watered:  {}",
            plant
                .last_watered_at
                .map_or_else(|| "never".to_string(), |at| format_relative_time(at, now_ms))
        ),
        format!(
            "  Next watering: {} ({})",
            format_local_timestamp(plant.next_watering_at),
            format_due(plant.next_watering_at, now_ms)
        ),
    ];
    if let Some(description) = &plant.description {
        lines.push(format!("  Description:   {description}"));
    }
    if let Some(level) = plant.light_level {
        let warning = if is_low_light(level) {
            "  (too dark for most plants)"
        } else {
            ""
        };
        lines.push(format!("  Light level:   {level}/10{warning}"));
    }
    if let Some(photo) = &plant.photo_uri {
        lines.push(format!("  Photo:         {photo}"));
    }
    if !plant.synced {
        lines.push("  Waiting to be synced with the backend".to_string());
    }
    lines
}

pub fn format_log_lines(logs: &[PlantLog], now_ms: i64) -> Vec<String> {
    logs.iter()
        .map(|log| {
            format!(
                "{}  {}",
                format_local_timestamp(log.watered_at),
                format_relative_time(log.watered_at, now_ms)
            )
        })
        .collect()
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    if diff < 60_000 {
        "just now".to_string()
    } else {
        format!("{} ago", format_span(diff))
    }
}

/// Human label for a due time: "due now", "overdue by 2d", "in 3d".
pub fn format_due(next_ms: i64, now_ms: i64) -> String {
    let diff = next_ms.saturating_sub(now_ms);
    if diff > 0 {
        format!("in {}", format_span(diff))
    } else if diff > -60_000 {
        "due now".to_string()
    } else {
        format!("overdue by {}", format_span(diff.saturating_neg()))
    }
}

fn format_span(span_ms: i64) -> String {
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;

    if span_ms < hour {
        format!("{}m", (span_ms / minute).max(1))
    } else if span_ms < day {
        format!("{}h", span_ms / hour)
    } else if span_ms < 2 * week {
        format!("{}d", span_ms / day)
    } else {
        format!("{}w", span_ms / week)
    }
}

pub fn format_local_timestamp(timestamp_ms: i64) -> String {
    Local.timestamp_millis_opt(timestamp_ms).single().map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M").to_string(),
    )
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let mut truncated = value
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn parse_plant_id(id: &str) -> Result<PlantId, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyPlantId);
    }
    trimmed
        .parse::<PlantId>()
        .map_err(|_| CliError::InvalidPlantId(trimmed.to_string()))
}

/// Light level from either flag; lux readings are converted to the 1-10 scale.
pub fn resolve_light_level(details: &PlantDetailArgs) -> Option<f32> {
    details
        .light
        .or_else(|| details.lux.map(light_level_from_lux))
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_db_path.or_else(|| env::var_os(DB_PATH_ENV).map(PathBuf::from)) {
        return Ok(path);
    }
    default_db_path()
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("waterme").join("waterme.db"))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI data directory".to_string()))
}

