use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use pretty_assertions::assert_eq;
use waterme_core::util::DAY_MILLIS;
use waterme_core::{
    DatabaseService, HttpPlantApi, NewPlant, PlantId, PlantRepository, RefreshOutcome, Reminder,
};

use crate::cli::{CompletionShell, PlantDetailArgs};
use crate::commands::add::run_add;
use crate::commands::common::{
    format_due, format_plant_lines, format_relative_time, parse_plant_id, plant_to_list_item,
    resolve_light_level,
};
use crate::commands::completions::render_completions;
use crate::commands::config::{config_view, init_profile};
use crate::commands::delete::run_delete;
use crate::commands::edit::{plant_changes, run_edit};
use crate::commands::history::run_history;
use crate::commands::list::run_list;
use crate::commands::remind::{format_reminder_lines, reminder_period};
use crate::commands::show::run_show;
use crate::commands::sync::run_sync;
use crate::commands::water::run_water;
use crate::config_profiles::{CliProfilesConfig, API_URL_ENV};
use crate::error::CliError;

const NOW: i64 = 1_700_000_000_000;

/// Nothing listens on the discard port, so every remote call fails fast
fn unreachable_api() -> HttpPlantApi {
    HttpPlantApi::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap()
}

async fn offline_repo(db_path: &Path) -> PlantRepository<HttpPlantApi> {
    let db = DatabaseService::open_path(db_path.to_path_buf())
        .await
        .unwrap();
    db.save_user_session(7, "Ana").await.unwrap();
    PlantRepository::new(db, unreachable_api()).with_clock(|| NOW)
}

#[test]
fn parse_plant_id_trims_and_rejects_garbage() {
    assert_eq!(parse_plant_id(" 42 ").unwrap(), PlantId::new(42));
    assert_eq!(parse_plant_id("-3").unwrap(), PlantId::new(-3));
    assert!(matches!(parse_plant_id("  "), Err(CliError::EmptyPlantId)));
    assert!(matches!(
        parse_plant_id("monstera"),
        Err(CliError::InvalidPlantId(_))
    ));
}

#[test]
fn format_relative_time_units() {
    assert_eq!(format_relative_time(NOW - 30_000, NOW), "just now");
    assert_eq!(format_relative_time(NOW - 120_000, NOW), "2m ago");
    assert_eq!(format_relative_time(NOW - 2 * 60 * 60_000, NOW), "2h ago");
    assert_eq!(format_relative_time(NOW - 3 * DAY_MILLIS, NOW), "3d ago");
}

#[test]
fn format_due_labels() {
    assert_eq!(format_due(NOW + 3 * DAY_MILLIS, NOW), "in 3d");
    assert_eq!(format_due(NOW, NOW), "due now");
    assert_eq!(format_due(NOW - 5 * 60_000, NOW), "overdue by 5m");
    assert_eq!(format_due(NOW - 21 * DAY_MILLIS, NOW), "overdue by 3w");
}

#[test]
fn lux_flag_is_converted_to_scale() {
    let details = PlantDetailArgs {
        lux: Some(450.0),
        ..PlantDetailArgs::default()
    };
    assert_eq!(resolve_light_level(&details), Some(4.0));

    let details = PlantDetailArgs {
        light: Some(7.0),
        ..PlantDetailArgs::default()
    };
    assert_eq!(resolve_light_level(&details), Some(7.0));
}

#[test]
fn edit_without_fields_is_rejected() {
    assert!(matches!(
        plant_changes(None, None, PlantDetailArgs::default()),
        Err(CliError::NothingToEdit)
    ));

    let changes = plant_changes(Some("Fern".to_string()), Some(5), PlantDetailArgs::default())
        .unwrap();
    assert_eq!(changes.name.as_deref(), Some("Fern"));
    assert_eq!(changes.water_frequency_days, Some(5));
}

#[test]
fn plant_lines_flag_unsynced_rows() {
    let mut plant = NewPlant::new("Monstera", 3).into_plant(PlantId::new(5), 7, NOW);
    let lines = format_plant_lines(std::slice::from_ref(&plant), NOW);
    assert!(lines[0].contains("Monstera"));
    assert!(lines[0].contains("in 3d"));
    assert!(lines[0].contains("(not synced)"));

    plant.synced = true;
    plant.light_level = Some(2.0);
    let lines = format_plant_lines(std::slice::from_ref(&plant), NOW);
    assert!(!lines[0].contains("(not synced)"));

    let item = plant_to_list_item(&plant, NOW + 4 * DAY_MILLIS);
    assert!(item.needs_water);
    assert!(item.low_light);
}

#[test]
fn reminder_lines_list_every_due_plant() {
    let plants = vec![
        NewPlant::new("Fern", 1).into_plant(PlantId::new(1), 7, NOW - 2 * DAY_MILLIS),
        NewPlant::new("Cactus", 1).into_plant(PlantId::new(2), 7, NOW - DAY_MILLIS),
    ];
    let reminder = Reminder::for_plants(plants).unwrap();
    let lines = format_reminder_lines(&reminder, NOW);

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "The following plants need water: Fern, Cactus");
    assert!(lines[2].contains("overdue by 1d"));
    assert!(lines[3].contains("due now"));
}

#[test]
fn reminder_period_prefers_flag_with_floor() {
    let config = waterme_core::ClientConfig {
        reminder_interval_secs: Some(600),
        ..waterme_core::ClientConfig::default()
    };
    assert_eq!(reminder_period(None, &config), Duration::from_secs(600));
    assert_eq!(reminder_period(Some(120), &config), Duration::from_secs(120));
    assert_eq!(reminder_period(Some(5), &config), Duration::from_secs(60));
}

#[test]
fn completions_use_binary_name() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("waterme"));
    assert!(script.contains("history"));
}

#[test]
fn init_profile_validates_and_activates() {
    let mut config = CliProfilesConfig::default();

    let error = init_profile(
        &mut config,
        Some("home"),
        Some("plants.example.com".to_string()),
        None,
        None,
        false,
    )
    .unwrap_err();
    assert!(matches!(error, CliError::Config(_)));

    let mut config = CliProfilesConfig::default();
    let name = init_profile(
        &mut config,
        Some("home"),
        Some("https://plants.example.com".to_string()),
        Some(10),
        Some(300),
        false,
    )
    .unwrap();
    assert_eq!(name, "home");
    assert_eq!(config.active_profile.as_deref(), Some("home"));

    let name = init_profile(&mut config, Some("work"), None, None, None, true).unwrap();
    assert_eq!(name, "work");
    assert_eq!(config.active_profile.as_deref(), Some("home"));
}

#[test]
fn config_view_reports_effective_values() {
    if std::env::var_os(API_URL_ENV).is_some() {
        return;
    }
    let mut profiles = BTreeMap::new();
    profiles.insert(
        "home".to_string(),
        waterme_core::ClientConfig {
            api_base_url: Some("https://plants.example.com/".to_string()),
            request_timeout_secs: None,
            reminder_interval_secs: Some(120),
        },
    );
    let config = CliProfilesConfig {
        version: 1,
        active_profile: None,
        profiles,
    };

    let view = config_view(&config, Some("home"), Path::new("/tmp/waterme.db")).unwrap();
    assert_eq!(view.profile, "home");
    assert_eq!(view.api_base_url, "https://plants.example.com");
    assert_eq!(view.request_timeout_secs, 30);
    assert_eq!(view.reminder_interval_secs, 120);
}

#[tokio::test(flavor = "multi_thread")]
async fn plant_lifecycle_works_offline() {
    let dir = tempfile::tempdir().unwrap();
    let repo = offline_repo(&dir.path().join("data").join("waterme.db")).await;

    let details = PlantDetailArgs {
        description: Some("Living room".to_string()),
        photo: Some("file:///photos/monstera.png".to_string()),
        ..PlantDetailArgs::default()
    };
    let plant = run_add(&repo, "Monstera", 3, &details).await.unwrap();
    assert!(plant.id.is_local());
    assert!(!plant.synced);
    assert_eq!(plant.next_watering_at, NOW + 3 * DAY_MILLIS);

    let id = plant.id.to_string();
    let shown = run_show(&repo, &id, false, NOW).await.unwrap();
    assert_eq!(shown.description.as_deref(), Some("Living room"));

    let watered = run_water(&repo, &id, NOW).await.unwrap();
    assert_eq!(watered.last_watered_at, Some(NOW));
    assert_eq!(watered.next_watering_at, NOW + 3 * DAY_MILLIS);

    let logs = run_history(&repo, &id, true, NOW).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].watered_at, NOW);

    let changes = plant_changes(None, Some(7), PlantDetailArgs::default()).unwrap();
    let edited = run_edit(&repo, &id, changes).await.unwrap();
    assert_eq!(edited.next_watering_at, NOW + 7 * DAY_MILLIS);

    run_list(&repo, false, true, NOW).await.unwrap();

    assert_eq!(run_delete(&repo, &id).await.unwrap(), plant.id);
    assert!(matches!(
        run_delete(&repo, &id).await,
        Err(CliError::PlantNotFound(_))
    ));
    assert!(repo.plants().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_plant_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let repo = offline_repo(&dir.path().join("waterme.db")).await;

    assert!(matches!(
        run_water(&repo, "99", NOW).await,
        Err(CliError::PlantNotFound(id)) if id == "99"
    ));
    assert!(matches!(
        run_history(&repo, "99", false, NOW).await,
        Err(CliError::PlantNotFound(_))
    ));
    assert!(matches!(
        run_show(&repo, "99", false, NOW).await,
        Err(CliError::PlantNotFound(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_against_unreachable_backend_keeps_cache() {
    let dir = tempfile::tempdir().unwrap();
    let repo = offline_repo(&dir.path().join("waterme.db")).await;
    run_add(&repo, "Fern", 2, &PlantDetailArgs::default())
        .await
        .unwrap();

    let outcome = run_sync(&repo).await.unwrap();

    assert!(matches!(outcome, RefreshOutcome::Stale { .. }));
    assert_eq!(repo.plants().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn logged_out_commands_ask_for_login() {
    let dir = tempfile::tempdir().unwrap();
    let db = DatabaseService::open_path(dir.path().join("waterme.db"))
        .await
        .unwrap();
    let repo = PlantRepository::new(db, unreachable_api());

    let error = run_list(&repo, false, false, NOW).await.unwrap_err();
    assert!(matches!(error, CliError::NotLoggedIn));
    assert!(matches!(run_sync(&repo).await, Err(CliError::NotLoggedIn)));
    assert!(matches!(
        run_add(&repo, "Fern", 2, &PlantDetailArgs::default()).await,
        Err(CliError::NotLoggedIn)
    ));
}
