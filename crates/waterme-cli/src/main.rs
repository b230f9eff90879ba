//! WaterMe CLI - keep your houseplants watered from the terminal
//!
//! Works offline against the local database and syncs with the WaterMe
//! backend whenever it is reachable.

mod cli;
mod commands;
mod config_profiles;
mod error;

#[cfg(test)]
mod tests;

use std::path::Path;

use clap::{CommandFactory, Parser};
use waterme_core::{HttpPlantApi, PlantRepository};

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::{now_ms, resolve_db_path, AppContext};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::{plant_changes, run_edit};
use crate::commands::history::run_history;
use crate::commands::list::run_list;
use crate::commands::remind::{run_remind, TerminalNotifier};
use crate::commands::show::run_show;
use crate::commands::sync::run_sync;
use crate::commands::water::run_water;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "waterme=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let db_path = resolve_db_path(cli.db_path)?;
    let profile = cli.profile.as_deref();

    match command {
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref()),
        Commands::Config { command } => run_config(command, profile, &db_path),
        Commands::Auth { command } => {
            let ctx = AppContext::open(&db_path, profile).await?;
            run_auth(command, &ctx.accounts()?, &ctx.repository()?).await
        }
        Commands::Remind {
            watch,
            interval_secs,
        } => {
            let ctx = AppContext::open(&db_path, profile).await?;
            let notifier = TerminalNotifier::new(now_ms);
            run_remind(ctx.db, &ctx.config, watch, interval_secs, &notifier).await
        }
        Commands::Add {
            name,
            interval,
            details,
        } => {
            let repo = open_repository(&db_path, profile).await?;
            run_add(&repo, &name, interval, &details).await.map(drop)
        }
        Commands::List { refresh, json } => {
            let repo = open_repository(&db_path, profile).await?;
            run_list(&repo, refresh, json, now_ms()).await
        }
        Commands::Show { id, json } => {
            let repo = open_repository(&db_path, profile).await?;
            run_show(&repo, &id, json, now_ms()).await.map(drop)
        }
        Commands::Edit {
            id,
            name,
            interval,
            details,
        } => {
            let changes = plant_changes(name, interval, details)?;
            let repo = open_repository(&db_path, profile).await?;
            run_edit(&repo, &id, changes).await.map(drop)
        }
        Commands::Water { id } => {
            let repo = open_repository(&db_path, profile).await?;
            run_water(&repo, &id, now_ms()).await.map(drop)
        }
        Commands::History { id, json } => {
            let repo = open_repository(&db_path, profile).await?;
            run_history(&repo, &id, json, now_ms()).await.map(drop)
        }
        Commands::Delete { id } => {
            let repo = open_repository(&db_path, profile).await?;
            run_delete(&repo, &id).await.map(drop)
        }
        Commands::Sync => {
            let repo = open_repository(&db_path, profile).await?;
            run_sync(&repo).await.map(drop)
        }
    }
}

async fn open_repository(
    db_path: &Path,
    profile: Option<&str>,
) -> Result<PlantRepository<HttpPlantApi>, CliError> {
    AppContext::open(db_path, profile).await?.repository()
}
