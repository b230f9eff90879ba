//! Light level scale
//!
//! Raw sensor readings (lux) are stored on a 1-10 scale, where 1000 lux and
//! above counts as full indoor brightness.

use crate::error::{Error, Result};

/// Lowest value on the light scale
pub const MIN_LIGHT_LEVEL: f32 = 1.0;

/// Highest value on the light scale
pub const MAX_LIGHT_LEVEL: f32 = 10.0;

/// Levels at or below this are considered too dark for most houseplants
pub const LOW_LIGHT_LEVEL: f32 = 2.0;

const LUX_PER_LEVEL: f32 = 100.0;

/// Convert a raw lux reading to the 1-10 scale.
///
/// # Examples
///
/// ```
/// use waterme_core::models::light_level_from_lux;
///
/// assert_eq!(light_level_from_lux(450.0), 4.0);
/// assert_eq!(light_level_from_lux(20_000.0), 10.0);
/// assert_eq!(light_level_from_lux(0.0), 1.0);
/// ```
#[must_use]
pub fn light_level_from_lux(lux: f32) -> f32 {
    if !lux.is_finite() || lux <= 0.0 {
        return MIN_LIGHT_LEVEL;
    }
    (lux / LUX_PER_LEVEL)
        .floor()
        .clamp(MIN_LIGHT_LEVEL, MAX_LIGHT_LEVEL)
}

/// Check whether a stored level means the spot is too dark.
#[must_use]
pub fn is_low_light(level: f32) -> bool {
    level <= LOW_LIGHT_LEVEL
}

/// Validate a level supplied directly on the 1-10 scale.
pub fn validate_light_level(level: f32) -> Result<f32> {
    if level.is_finite() && (MIN_LIGHT_LEVEL..=MAX_LIGHT_LEVEL).contains(&level) {
        Ok(level)
    } else {
        Err(Error::InvalidInput(format!(
            "light level must be between {MIN_LIGHT_LEVEL} and {MAX_LIGHT_LEVEL}, got {level}"
        )))
    }
}
