use waterme_core::{AccountService, PlantApi, PlantRepository, RefreshOutcome};

use crate::cli::AuthCommands;
use crate::error::CliError;

pub async fn run_auth<A: PlantApi>(
    command: AuthCommands,
    accounts: &AccountService<A>,
    repo: &PlantRepository<A>,
) -> Result<(), CliError> {
    match command {
        AuthCommands::Register {
            name,
            email,
            password,
        } => {
            let user_id = accounts.register(&name, &email, &password).await?;
            println!("Account created (user {user_id}). Log in with `waterme auth login`.");
            Ok(())
        }
        AuthCommands::Login { email, password } => {
            let user = accounts.login(&email, &password).await?;
            println!("Logged in as {} (user {})", user.name, user.user_id);
            if user.cache_cleared {
                println!("Cleared plants cached for the previous account.");
            }

            match repo.refresh().await? {
                RefreshOutcome::Refreshed { fetched, .. } => {
                    println!("Loaded {fetched} plant(s)");
                }
                RefreshOutcome::Stale { reason } => {
                    eprintln!("Could not load plants yet: {reason}");
                }
                RefreshOutcome::NoSession => {}
            }
            Ok(())
        }
        AuthCommands::Status => {
            let session = accounts.session().await?;
            match (session.active_user_id(), session.user_name) {
                (Some(user_id), Some(name)) => println!("Logged in as {name} (user {user_id})"),
                (Some(user_id), None) => println!("Logged in as user {user_id}"),
                (None, _) => println!("Not logged in."),
            }
            Ok(())
        }
        AuthCommands::ChangePassword {
            current,
            new,
            confirm,
        } => {
            accounts.change_password(&current, &new, &confirm).await?;
            println!("Password changed");
            Ok(())
        }
        AuthCommands::Logout => {
            accounts.logout().await?;
            println!("Logged out");
            Ok(())
        }
    }
}
