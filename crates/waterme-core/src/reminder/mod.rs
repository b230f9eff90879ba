//! Periodic scan for plants that are due for watering.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};

use crate::models::Plant;
use crate::services::DatabaseService;
use crate::sync::Clock;
use crate::util::unix_millis_now;
use crate::Result;

/// Period between scans when none is configured
pub const DEFAULT_REMINDER_PERIOD: Duration = Duration::from_secs(15 * 60);

/// Shortest period a scan loop will run at
pub const MIN_REMINDER_PERIOD: Duration = Duration::from_secs(60);

const REMINDER_TITLE: &str = "Time to water! 💧";

/// One aggregate reminder covering every due plant
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub title: String,
    pub body: String,
    /// Due plants, most overdue first
    pub plants: Vec<Plant>,
}

impl Reminder {
    /// Build a reminder, or `None` when nothing is due
    #[must_use]
    pub fn for_plants(plants: Vec<Plant>) -> Option<Self> {
        if plants.is_empty() {
            return None;
        }

        let names = plants
            .iter()
            .map(|plant| plant.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Some(Self {
            title: REMINDER_TITLE.to_string(),
            body: format!("The following plants need water: {names}"),
            plants,
        })
    }
}

/// Delivers reminders to the user
pub trait ReminderNotifier {
    fn notify(&self, reminder: &Reminder);
}

/// Reads due plants straight from the local database
#[derive(Clone)]
pub struct ReminderScan {
    db: DatabaseService,
    clock: Clock,
}

impl ReminderScan {
    pub fn new(db: DatabaseService) -> Self {
        Self {
            db,
            clock: Arc::new(unix_millis_now),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Reminder for everything due at `now_ms`. Plants stay due until watered.
    pub async fn scan_at(&self, now_ms: i64) -> Result<Option<Reminder>> {
        let due = self.db.plants_needing_water(now_ms).await?;
        tracing::debug!("{} plant(s) due at {now_ms}", due.len());
        Ok(Reminder::for_plants(due))
    }

    /// Scan once with the scan's clock and hand any reminder to `notifier`.
    /// Returns whether a reminder was raised.
    pub async fn check<N: ReminderNotifier>(&self, notifier: &N) -> Result<bool> {
        match self.scan_at((self.clock)()).await? {
            Some(reminder) => {
                tracing::info!("Raising reminder for {} plant(s)", reminder.plants.len());
                notifier.notify(&reminder);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Scan every `period` (at least one minute), forever. The first scan
    /// runs immediately. Failed scans are logged and the loop continues.
    pub async fn run<N: ReminderNotifier>(&self, period: Duration, notifier: &N) {
        let period = period.max(MIN_REMINDER_PERIOD);
        tracing::info!(
            period_secs = period.as_secs(),
            "Starting watering reminder scan"
        );

        let mut tick = interval(period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tick.tick().await;
            if let Err(error) = self.check(notifier).await {
                tracing::error!(error = %error, "Watering reminder scan failed");
            }
        }
    }
}
