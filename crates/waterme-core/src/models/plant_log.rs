//! Watering history model

use serde::{Deserialize, Serialize};

use super::PlantId;

/// One watering of a plant. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantLog {
    /// Log row identifier
    pub id: i64,
    /// Plant that was watered
    pub plant_id: PlantId,
    /// Watering time (Unix ms)
    pub watered_at: i64,
}
