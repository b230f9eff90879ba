use waterme_core::{Plant, PlantApi, PlantRepository};

use crate::commands::common::{format_due, parse_plant_id};
use crate::error::CliError;

pub async fn run_water<A: PlantApi>(
    repo: &PlantRepository<A>,
    id: &str,
    now_ms: i64,
) -> Result<Plant, CliError> {
    let plant_id = parse_plant_id(id)?;
    let plant = repo
        .water_plant(plant_id)
        .await?
        .ok_or_else(|| CliError::PlantNotFound(plant_id.to_string()))?;

    println!(
        "Watered {}. Next watering {}.",
        plant.name,
        format_due(plant.next_watering_at, now_ms)
    );
    Ok(plant)
}
