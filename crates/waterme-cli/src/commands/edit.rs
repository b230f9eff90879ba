use waterme_core::{Plant, PlantApi, PlantChanges, PlantRepository};

use crate::cli::PlantDetailArgs;
use crate::commands::common::{parse_plant_id, resolve_light_level};
use crate::error::CliError;

pub fn plant_changes(
    name: Option<String>,
    interval_days: Option<u32>,
    details: PlantDetailArgs,
) -> Result<PlantChanges, CliError> {
    let light_level = resolve_light_level(&details);
    let changes = PlantChanges {
        name,
        description: details.description,
        photo_uri: details.photo,
        water_frequency_days: interval_days,
        light_level,
    };
    if changes.is_empty() {
        return Err(CliError::NothingToEdit);
    }
    Ok(changes)
}

pub async fn run_edit<A: PlantApi>(
    repo: &PlantRepository<A>,
    id: &str,
    changes: PlantChanges,
) -> Result<Plant, CliError> {
    let plant_id = parse_plant_id(id)?;
    let plant = repo
        .update(plant_id, changes)
        .await?
        .ok_or_else(|| CliError::PlantNotFound(plant_id.to_string()))?;

    println!("{}", plant.id);
    Ok(plant)
}
