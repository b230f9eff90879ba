use std::time::Duration;

use waterme_core::reminder::MIN_REMINDER_PERIOD;
use waterme_core::{ClientConfig, DatabaseService, Reminder, ReminderNotifier, ReminderScan};

use crate::commands::common::format_due;
use crate::error::CliError;

/// Prints reminders to the terminal
pub struct TerminalNotifier {
    now_ms: fn() -> i64,
}

impl TerminalNotifier {
    pub const fn new(now_ms: fn() -> i64) -> Self {
        Self { now_ms }
    }
}

impl ReminderNotifier for TerminalNotifier {
    fn notify(&self, reminder: &Reminder) {
        tracing::debug!("Printing reminder for {} plant(s)", reminder.plants.len());
        for line in format_reminder_lines(reminder, (self.now_ms)()) {
            println!("{line}");
        }
    }
}

pub fn format_reminder_lines(reminder: &Reminder, now_ms: i64) -> Vec<String> {
    let mut lines = vec![reminder.title.clone(), reminder.body.clone()];
    lines.extend(reminder.plants.iter().map(|plant| {
        format!(
            "  {:>6}  {}  ({})",
            plant.id.get(),
            plant.name,
            format_due(plant.next_watering_at, now_ms)
        )
    }));
    lines
}

/// Watch-mode period: the flag wins over the profile, never below one minute.
pub fn reminder_period(interval_secs: Option<u64>, config: &ClientConfig) -> Duration {
    interval_secs
        .map_or_else(|| config.reminder_period(), Duration::from_secs)
        .max(MIN_REMINDER_PERIOD)
}

pub async fn run_remind(
    db: DatabaseService,
    config: &ClientConfig,
    watch: bool,
    interval_secs: Option<u64>,
    notifier: &TerminalNotifier,
) -> Result<(), CliError> {
    let scan = ReminderScan::new(db);

    if !watch {
        if !scan.check(notifier).await? {
            println!("All plants are watered.");
        }
        return Ok(());
    }

    let period = reminder_period(interval_secs, config);
    println!(
        "Checking every {}s for thirsty plants. Press Ctrl-C to stop.",
        period.as_secs()
    );
    tokio::select! {
        () = scan.run(period, notifier) => Ok(()),
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Stopping watering reminders");
            Ok(())
        }
    }
}
