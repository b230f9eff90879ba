use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(waterme_core::Error),
    #[error(transparent)]
    Account(waterme_core::AccountError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Plant ID cannot be empty")]
    EmptyPlantId,
    #[error("Invalid plant ID: {0}")]
    InvalidPlantId(String),
    #[error("Plant not found: {0}")]
    PlantNotFound(String),
    #[error("Nothing to change. Pass at least one field to edit.")]
    NothingToEdit,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Not logged in. Run `waterme auth login --email <email> --password <password>`.")]
    NotLoggedIn,
}

impl From<waterme_core::Error> for CliError {
    fn from(error: waterme_core::Error) -> Self {
        match error {
            waterme_core::Error::NotAuthenticated => Self::NotLoggedIn,
            other => Self::Core(other),
        }
    }
}

impl From<waterme_core::AccountError> for CliError {
    fn from(error: waterme_core::AccountError) -> Self {
        match error {
            waterme_core::AccountError::NotAuthenticated
            | waterme_core::AccountError::Store(waterme_core::Error::NotAuthenticated) => {
                Self::NotLoggedIn
            }
            other => Self::Account(other),
        }
    }
}
