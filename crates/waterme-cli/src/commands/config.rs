use std::path::Path;

use serde::Serialize;

use crate::cli::ConfigCommands;
use crate::config_profiles::{default_config_path, normalize_text_option, CliProfilesConfig};
use crate::error::CliError;

/// Resolved settings as printed by `config show`
#[derive(Debug, Serialize)]
pub struct ConfigView {
    pub profile: String,
    pub config_path: Option<String>,
    pub db_path: String,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub reminder_interval_secs: u64,
}

pub fn run_config(
    command: ConfigCommands,
    global_profile: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            api_base_url,
            request_timeout_secs,
            reminder_interval_secs,
            no_activate,
        } => {
            let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
            let profile_name = init_profile(
                &mut config,
                global_profile,
                api_base_url,
                request_timeout_secs,
                reminder_interval_secs,
                no_activate,
            )?;
            let path = config.save().map_err(CliError::Config)?;
            println!(
                "Profile '{}' initialized at {}",
                profile_name,
                path.display()
            );
            Ok(())
        }
        ConfigCommands::Show => {
            let config = CliProfilesConfig::load().map_err(CliError::Config)?;
            let view = config_view(&config, global_profile, db_path)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(())
        }
    }
}

/// Merge the given values into a profile and validate the result.
/// Returns the resolved profile name.
pub fn init_profile(
    config: &mut CliProfilesConfig,
    profile_name: Option<&str>,
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    reminder_interval_secs: Option<u64>,
    no_activate: bool,
) -> Result<String, CliError> {
    let profile_name = config.resolve_profile_name(profile_name);
    let profile = config.profile_mut_or_default(&profile_name);

    if let Some(url) = normalize_text_option(api_base_url) {
        profile.api_base_url = Some(url);
    }
    if request_timeout_secs.is_some() {
        profile.request_timeout_secs = request_timeout_secs;
    }
    if reminder_interval_secs.is_some() {
        profile.reminder_interval_secs = reminder_interval_secs;
    }
    profile
        .validate()
        .map_err(|error| CliError::Config(error.to_string()))?;

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }
    Ok(profile_name)
}

pub fn config_view(
    config: &CliProfilesConfig,
    profile_name: Option<&str>,
    db_path: &Path,
) -> Result<ConfigView, CliError> {
    let profile = config.resolve_profile_name(profile_name);
    let effective = config.effective(&profile);
    let api_base_url = effective
        .api_base_url()
        .map_err(|error| CliError::Config(error.to_string()))?;

    Ok(ConfigView {
        config_path: default_config_path()
            .ok()
            .map(|path| path.display().to_string()),
        db_path: db_path.display().to_string(),
        api_base_url,
        request_timeout_secs: effective.request_timeout().as_secs(),
        reminder_interval_secs: effective.reminder_period().as_secs(),
        profile,
    })
}
