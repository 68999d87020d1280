use std::{sync::Arc, time::Duration};

use meditrack_models::reminder::ReminderId;
use tokio::{
    task::{self, JoinHandle},
    time::MissedTickBehavior,
};
use tokio_util::sync::CancellationToken;

use crate::{Clock, MedicineLookup, Notification, NotificationChannel, SharedScheduler};

/// Periodic due check. Ticks run one after another, a reminder whose minute passes
/// between two ticks is not retried.
pub struct ReminderPoller {
    scheduler: SharedScheduler,
    medicines: Arc<dyn MedicineLookup>,
    channel: Arc<dyn NotificationChannel>,
    clock: Arc<dyn Clock>,
    notifications_enabled: bool,
}

impl ReminderPoller {
    pub fn new(
        scheduler: SharedScheduler,
        medicines: Arc<dyn MedicineLookup>,
        channel: Arc<dyn NotificationChannel>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            scheduler,
            medicines,
            channel,
            clock,
            notifications_enabled: true,
        }
    }

    /// With notifications off, due reminders are still marked notified, just not delivered.
    pub fn with_notifications_enabled(mut self, enabled: bool) -> Self {
        self.notifications_enabled = enabled;
        self
    }

    /// Reloads the stored reminders, runs the daily reset and handles what is due now.
    /// The store stays locked for the whole tick. If it cannot be read the tick is skipped.
    pub async fn tick(&self) -> Vec<ReminderId> {
        let now = self.clock.now();
        let (_store_lock, due) = {
            let mut scheduler = self.scheduler.lock().await;
            let store_lock = match scheduler.refresh() {
                Ok(lock) => lock,
                Err(e) => {
                    log::error!("Skipping tick, could not read stored reminders. [error = {e}]");
                    return Vec::new();
                }
            };
            scheduler.reset_for_new_day(now.date());
            (store_lock, scheduler.due_reminders(now.time()))
        };

        let mut handled = Vec::with_capacity(due.len());
        for reminder in due {
            if self.notifications_enabled {
                let label = self.medicines.label(reminder.medicine_id).await;
                let notification = Notification::for_medicine(label.as_ref());
                self.channel
                    .notify(&notification.title, &notification.body)
                    .await;
                log::info!(
                    "[DELIVERED] Reminder fired. [reminder_id = {}, time = {}]",
                    reminder.id,
                    reminder.time
                );
            } else {
                log::info!(
                    "[MUTED] Notifications are disabled, skipping delivery. [reminder_id = {}]",
                    reminder.id
                );
            }

            self.scheduler.lock().await.mark_notified(reminder.id);
            handled.push(reminder.id);
        }

        handled
    }

    pub async fn run(&self, period: Duration, cancellation_token: CancellationToken) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        log::info!("Reminder poller started. [period = {period:?}]");

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    log::info!("Reminder poller shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    pub fn spawn(self, period: Duration, cancellation_token: CancellationToken) -> JoinHandle<()> {
        task::spawn(async move { self.run(period, cancellation_token).await })
    }
}
