use waterme_core::{PlantApi, PlantRepository, RefreshOutcome};

use crate::error::CliError;

pub async fn run_sync<A: PlantApi>(repo: &PlantRepository<A>) -> Result<RefreshOutcome, CliError> {
    let outcome = repo.refresh().await?;
    match &outcome {
        RefreshOutcome::NoSession => return Err(CliError::NotLoggedIn),
        RefreshOutcome::Stale { reason } => {
            println!("Backend unreachable, local changes kept for the next sync: {reason}");
        }
        RefreshOutcome::Refreshed {
            fetched,
            pushed,
            removed,
        } => {
            println!("Sync completed: {fetched} fetched, {pushed} pushed, {removed} removed");
        }
    }
    Ok(outcome)
}
