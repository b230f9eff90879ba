//! Services shared by every WaterMe client

mod database;

pub use database::DatabaseService;
