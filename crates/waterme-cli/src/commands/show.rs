use waterme_core::{Plant, PlantApi, PlantRepository};

use crate::commands::common::{format_plant_details, parse_plant_id, plant_to_list_item};
use crate::error::CliError;

pub async fn run_show<A: PlantApi>(
    repo: &PlantRepository<A>,
    id: &str,
    as_json: bool,
    now_ms: i64,
) -> Result<Plant, CliError> {
    let plant_id = parse_plant_id(id)?;
    let plant = repo
        .plant(plant_id)
        .await?
        .ok_or_else(|| CliError::PlantNotFound(plant_id.to_string()))?;

    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&plant_to_list_item(&plant, now_ms))?
        );
    } else {
        for line in format_plant_details(&plant, now_ms) {
            println!("{line}");
        }
    }
    Ok(plant)
}
