use waterme_core::{PlantApi, PlantRepository, RefreshOutcome};

use crate::commands::common::{format_plant_lines, plant_to_list_item, PlantListItem};
use crate::error::CliError;

pub async fn run_list<A: PlantApi>(
    repo: &PlantRepository<A>,
    refresh: bool,
    as_json: bool,
    now_ms: i64,
) -> Result<(), CliError> {
    if refresh {
        if let RefreshOutcome::Stale { reason } = repo.refresh().await? {
            eprintln!("Showing cached plants: {reason}");
        }
    }

    let plants = repo.plants().await?;

    if as_json {
        let json_items = plants
            .iter()
            .map(|plant| plant_to_list_item(plant, now_ms))
            .collect::<Vec<PlantListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if plants.is_empty() {
        println!("No plants yet. Add one with `waterme add <name>`.");
    } else {
        for line in format_plant_lines(&plants, now_ms) {
            println!("{line}");
        }
    }

    Ok(())
}
