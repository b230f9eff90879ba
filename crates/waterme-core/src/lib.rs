//! waterme-core - Core library for WaterMe
//!
//! This crate contains the models, local database, backend client and
//! business logic used by WaterMe front ends (currently the CLI).

pub mod account;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod reminder;
pub mod services;
pub mod sync;
pub mod util;

pub use account::{AccountError, AccountService, LoggedInUser};
pub use api::{ApiError, HttpPlantApi, PlantApi};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use models::{NewPlant, Plant, PlantChanges, PlantId, PlantLog, Session};
pub use reminder::{Reminder, ReminderNotifier, ReminderScan};
pub use services::DatabaseService;
pub use sync::{merge_remote_plant, PlantRepository, RefreshOutcome};
