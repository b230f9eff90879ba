//! Client configuration shared by every WaterMe front end.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::{normalize_endpoint, HttpPlantApi};
use crate::reminder::{DEFAULT_REMINDER_PERIOD, MIN_REMINDER_PERIOD};
use crate::util::{compact_text, normalize_text_option};
use crate::{Error, Result};

/// Hosted WaterMe backend
pub const DEFAULT_API_BASE_URL: &str = "https://waterme-2l72.onrender.com";

/// The hosted backend sleeps when idle and can take a while to answer
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Endpoints and timings a client needs to talk to the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub reminder_interval_secs: Option<u64>,
}

impl ClientConfig {
    /// Backend URL, normalized, falling back to the hosted backend.
    pub fn api_base_url(&self) -> Result<String> {
        let raw = normalize_text_option(self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        normalize_endpoint(raw).map_err(|error| {
            Error::InvalidInput(format!("api_base_url: {}", compact_text(&error.to_string())))
        })
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Reminder scan period, never shorter than one minute.
    #[must_use]
    pub fn reminder_period(&self) -> Duration {
        self.reminder_interval_secs
            .map_or(DEFAULT_REMINDER_PERIOD, Duration::from_secs)
            .max(MIN_REMINDER_PERIOD)
    }

    /// Check every set value.
    pub fn validate(&self) -> Result<()> {
        self.api_base_url()?;
        if self.request_timeout_secs == Some(0) {
            return Err(Error::InvalidInput(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if let Some(secs) = self.reminder_interval_secs {
            if secs < MIN_REMINDER_PERIOD.as_secs() {
                return Err(Error::InvalidInput(format!(
                    "reminder_interval_secs must be at least {}",
                    MIN_REMINDER_PERIOD.as_secs()
                )));
            }
        }
        Ok(())
    }

    /// HTTP client for the configured backend.
    pub fn http_api(&self) -> Result<HttpPlantApi> {
        Ok(HttpPlantApi::new(self.api_base_url()?, self.request_timeout())?)
    }
}
