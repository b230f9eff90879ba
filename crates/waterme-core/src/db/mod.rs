//! Local database layer for WaterMe

mod connection;
mod migrations;
mod plant_log_repository;
mod plant_repository;
mod session_repository;

pub use connection::Database;
pub use plant_log_repository::{LibSqlPlantLogStore, PlantLogStore};
pub use plant_repository::{LibSqlPlantStore, PlantStore};
pub use session_repository::{LibSqlSessionStore, SessionStore};
