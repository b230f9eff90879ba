use waterme_core::{NewPlant, Plant, PlantApi, PlantRepository};

use crate::cli::PlantDetailArgs;
use crate::commands::common::resolve_light_level;
use crate::error::CliError;

pub async fn run_add<A: PlantApi>(
    repo: &PlantRepository<A>,
    name: &str,
    interval_days: u32,
    details: &PlantDetailArgs,
) -> Result<Plant, CliError> {
    let mut draft = NewPlant::new(name, interval_days);
    if let Some(description) = &details.description {
        draft = draft.with_description(description.as_str());
    }
    if let Some(photo) = &details.photo {
        draft = draft.with_photo_uri(photo.as_str());
    }
    if let Some(level) = resolve_light_level(details) {
        draft = draft.with_light_level(level);
    }

    let plant = repo.insert(draft).await?;
    if plant.synced {
        println!("{}", plant.id);
    } else {
        println!(
            "{} (saved on this device, will sync on the next refresh)",
            plant.id
        );
    }
    Ok(plant)
}
