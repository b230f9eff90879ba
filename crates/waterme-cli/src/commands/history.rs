use waterme_core::{PlantApi, PlantLog, PlantRepository};

use crate::commands::common::{format_log_lines, log_to_item, parse_plant_id, PlantLogItem};
use crate::error::CliError;

pub async fn run_history<A: PlantApi>(
    repo: &PlantRepository<A>,
    id: &str,
    as_json: bool,
    now_ms: i64,
) -> Result<Vec<PlantLog>, CliError> {
    let plant_id = parse_plant_id(id)?;
    let plant = repo
        .plant(plant_id)
        .await?
        .ok_or_else(|| CliError::PlantNotFound(plant_id.to_string()))?;
    let logs = repo.plant_logs(plant.id).await?;

    if as_json {
        let json_items = logs.iter().map(log_to_item).collect::<Vec<PlantLogItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if logs.is_empty() {
        println!("{} has not been watered yet.", plant.name);
    } else {
        for line in format_log_lines(&logs, now_ms) {
            println!("{line}");
        }
    }
    Ok(logs)
}
