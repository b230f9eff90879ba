use waterme_core::{PlantApi, PlantId, PlantRepository};

use crate::commands::common::parse_plant_id;
use crate::error::CliError;

pub async fn run_delete<A: PlantApi>(
    repo: &PlantRepository<A>,
    id: &str,
) -> Result<PlantId, CliError> {
    let plant_id = parse_plant_id(id)?;
    if !repo.delete_by_id(plant_id).await? {
        return Err(CliError::PlantNotFound(plant_id.to_string()));
    }

    println!("{plant_id}");
    Ok(plant_id)
}
