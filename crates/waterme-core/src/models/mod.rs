//! Data models for WaterMe

mod light;
mod plant;
mod plant_log;
mod session;

pub use light::{
    is_low_light, light_level_from_lux, validate_light_level, LOW_LIGHT_LEVEL, MAX_LIGHT_LEVEL,
    MIN_LIGHT_LEVEL,
};
pub use plant::{NewPlant, Plant, PlantChanges, PlantId, DEFAULT_WATER_FREQUENCY_DAYS};
pub use plant_log::PlantLog;
pub use session::Session;
