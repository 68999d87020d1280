use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use meditrack_models::{
    medicine::MedicineId,
    reminder::{Reminder, ReminderId, ReminderRepeat, ReminderStatus, ReminderTime},
};
use meditrack_storage::{KeyValueStore, StorageError, StoreLock, keys, load_json, save_json};
use tokio::sync::Mutex;

pub type SharedScheduler = Arc<Mutex<ReminderScheduler>>;

/// Owns the reminder set and its per-day status.
///
/// Every mutation writes the whole set back to the store. Operations on unknown ids are
/// ignored, and a failed write is logged while the in-memory state is kept.
///
/// Several processes may share one store. Callers that mutate take [`Self::refresh`] first
/// so they work on the stored set and not on a stale copy.
pub struct ReminderScheduler {
    reminders: Vec<Reminder>,
    last_reset: Option<NaiveDate>,
    store: Arc<dyn KeyValueStore>,
}

impl ReminderScheduler {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let mut scheduler = Self {
            reminders: Vec::new(),
            last_reset: None,
            store,
        };
        scheduler.reload()?;

        log::info!(
            "Loaded reminders. [count = {}, last_reset = {:?}]",
            scheduler.reminders.len(),
            scheduler.last_reset
        );
        Ok(scheduler)
    }

    /// Replaces the in-memory set with the stored one. On error nothing changes.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        let reminders: Vec<Reminder> =
            load_json(self.store.as_ref(), keys::REMINDERS)?.unwrap_or_default();
        let last_reset = load_json(self.store.as_ref(), keys::LAST_RESET_DATE)?;

        self.reminders = reminders;
        self.last_reset = last_reset;
        Ok(())
    }

    /// Locks the store and reloads from it. Writes from other processes wait until the
    /// returned guard is dropped.
    pub fn refresh(&mut self) -> Result<StoreLock, StorageError> {
        let lock = self.store.lock()?;
        self.reload()?;
        Ok(lock)
    }

    pub fn into_shared(self) -> SharedScheduler {
        Arc::new(Mutex::new(self))
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn get(&self, id: ReminderId) -> Option<&Reminder> {
        self.reminders.iter().find(|reminder| reminder.id == id)
    }

    pub fn last_reset(&self) -> Option<NaiveDate> {
        self.last_reset
    }

    pub fn add_reminder(&mut self, medicine_id: MedicineId) -> Reminder {
        let reminder = Reminder::new(medicine_id);
        self.reminders.push(reminder.clone());
        self.persist();

        log::info!(
            "Added reminder. [reminder_id = {}, medicine_id = {}]",
            reminder.id,
            medicine_id
        );
        reminder
    }

    pub fn update_reminder(&mut self, id: ReminderId, time: ReminderTime, enabled: bool) {
        self.modify(id, |reminder| {
            reminder.time = time;
            reminder.enabled = enabled;
        });
    }

    pub fn set_repeat(&mut self, id: ReminderId, repeat: ReminderRepeat) {
        self.modify(id, |reminder| reminder.repeat = repeat);
    }

    pub fn delete_reminder(&mut self, id: ReminderId) {
        let before = self.reminders.len();
        self.reminders.retain(|reminder| reminder.id != id);

        if self.reminders.len() == before {
            log::warn!("Ignoring delete of unknown reminder. [reminder_id = {id}]");
            return;
        }
        self.persist();
    }

    /// Drops every reminder of a deleted medicine. Returns how many were removed.
    pub fn delete_reminders_for_medicine(&mut self, medicine_id: MedicineId) -> usize {
        let before = self.reminders.len();
        self.reminders
            .retain(|reminder| reminder.medicine_id != medicine_id);
        let removed = before - self.reminders.len();

        if removed > 0 {
            self.persist();
            log::info!("Removed reminders of medicine. [medicine_id = {medicine_id}, count = {removed}]");
        }
        removed
    }

    /// `completed` goes back to `pending`; `pending` and `notified` become `completed`.
    pub fn toggle_completion(&mut self, id: ReminderId) {
        self.modify(id, |reminder| {
            reminder.status = match reminder.status {
                ReminderStatus::Completed => ReminderStatus::Pending,
                ReminderStatus::Pending | ReminderStatus::Notified => ReminderStatus::Completed,
            };
        });
    }

    pub fn mark_notified(&mut self, id: ReminderId) {
        self.modify(id, |reminder| reminder.status = ReminderStatus::Notified);
    }

    /// Sets every status back to `pending` the first time it is called on a given day.
    pub fn reset_for_new_day(&mut self, today: NaiveDate) -> bool {
        if self.last_reset == Some(today) {
            return false;
        }

        for reminder in &mut self.reminders {
            reminder.status = ReminderStatus::Pending;
        }
        self.last_reset = Some(today);
        self.persist();
        if let Err(e) = save_json(self.store.as_ref(), keys::LAST_RESET_DATE, &today) {
            log::error!("Failed to persist reset date. [date = {today}, error = {e}]");
        }

        log::info!("Reset reminder statuses for a new day. [date = {today}]");
        true
    }

    /// Reminders to fire at `now`: active daily ones scheduled for this exact minute that
    /// were not delivered yet today.
    pub fn due_reminders(&self, now: NaiveTime) -> Vec<Reminder> {
        let now = ReminderTime::new(now);
        let mut due: Vec<Reminder> = self
            .reminders
            .iter()
            .filter(|reminder| {
                reminder.is_active_daily()
                    && reminder.time == now
                    && reminder.status != ReminderStatus::Notified
            })
            .cloned()
            .collect();
        due.sort_by_key(|reminder| reminder.time);
        due
    }

    /// Active daily reminders later than `now`, earliest first, at most `limit` of them.
    pub fn todays_upcoming(&self, now: NaiveTime, limit: usize) -> Vec<Reminder> {
        let now = ReminderTime::new(now);
        self.todays_schedule()
            .into_iter()
            .filter(|reminder| reminder.time > now)
            .take(limit)
            .collect()
    }

    /// Every active daily reminder, earliest first.
    pub fn todays_schedule(&self) -> Vec<Reminder> {
        let mut schedule: Vec<Reminder> = self
            .reminders
            .iter()
            .filter(|reminder| reminder.is_active_daily())
            .cloned()
            .collect();
        schedule.sort_by_key(|reminder| reminder.time);
        schedule
    }

    fn modify(&mut self, id: ReminderId, change: impl FnOnce(&mut Reminder)) {
        match self.reminders.iter_mut().find(|reminder| reminder.id == id) {
            Some(reminder) => {
                change(reminder);
                self.persist();
            }
            None => log::warn!("Ignoring change to unknown reminder. [reminder_id = {id}]"),
        }
    }

    fn persist(&self) {
        if let Err(e) = save_json(self.store.as_ref(), keys::REMINDERS, &self.reminders) {
            log::error!("Failed to persist reminders, storage is now stale. [error = {e}]");
        }
    }
}
