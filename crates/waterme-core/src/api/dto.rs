//! Request and response bodies of the WaterMe REST API

use serde::{Deserialize, Serialize};

use super::dates::format_wire_date;
use crate::models::Plant;

/// Body of `POST /plants` and `PUT /plants/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantRequest {
    pub user_id: i64,
    pub name: String,
    pub description: String,
    /// Photos stay on the device; the backend only ever sees an empty URL
    pub photo_url: String,
    pub next_watering: String,
    pub last_watering: Option<String>,
    pub light_level: Option<f32>,
    pub water_frequency: u32,
}

impl From<&Plant> for PlantRequest {
    fn from(plant: &Plant) -> Self {
        Self {
            user_id: plant.user_id,
            name: plant.name.clone(),
            description: plant.description.clone().unwrap_or_default(),
            photo_url: String::new(),
            next_watering: format_wire_date(plant.next_watering_at),
            last_watering: plant.last_watered_at.map(format_wire_date),
            light_level: plant.light_level,
            water_frequency: plant.water_frequency_days,
        }
    }
}

/// One element of `GET /plants/{user_id}`
///
/// Every field but `id` may be missing or null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlantResponse {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub photo_url: Option<String>,
    pub next_watering: Option<String>,
    pub last_watering: Option<String>,
    pub light_level: Option<f32>,
    pub water_frequency: Option<u32>,
}

/// Reply to `POST /plants`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatePlantResponse {
    pub id: i64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterResponse {
    pub id: i64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ChangePasswordRequest {
    pub user_id: i64,
    pub old_password: String,
    pub new_password: String,
}

impl std::fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ChangePasswordRequest")
            .field("user_id", &self.user_id)
            .field("old_password", &"[REDACTED]")
            .field("new_password", &"[REDACTED]")
            .finish()
    }
}
