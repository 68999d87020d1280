use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use meditrack_inventory::{
    DEFAULT_MEMBER, ExpiryStatus, FamilyRegistry, InventorySummary, MedicineFilter,
    MedicineInventory,
    export::{BackupSettings, ExportKind, FullBackup, MedicineLog, ReminderLog},
};
use meditrack_models::{
    family::{FamilyMember, FamilyMemberId},
    medicine::{Medicine, MedicineId, MedicineUpdate, NewMedicine},
    reminder::{Reminder, ReminderId, ReminderRepeat, ReminderStatus, ReminderTime},
    settings::InventorySettings,
};
use meditrack_scheduler::{MedicineLabel, MedicineLookup, ReminderScheduler, SharedScheduler};
use meditrack_storage::{KeyValueStore, StorageError, StoreLock};
use tokio::sync::Mutex;

type SharedInventory = Arc<Mutex<MedicineInventory>>;

/// A reminder as shown on the today screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledDose {
    pub reminder: Reminder,
    pub medicine: Option<MedicineLabel>,
}

impl ScheduledDose {
    pub fn medicine_name(&self) -> &str {
        MedicineLabel::display_name(self.medicine.as_ref())
    }

    pub fn is_taken(&self) -> bool {
        self.reminder.status == ReminderStatus::Completed
    }
}

/// Fields of a reminder to change. `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderChange {
    pub time: Option<ReminderTime>,
    pub enabled: Option<bool>,
    pub repeat: Option<ReminderRepeat>,
}

/// Resolves reminder medicine ids against the stored inventory.
pub struct InventoryLookup {
    inventory: SharedInventory,
}

#[async_trait]
impl MedicineLookup for InventoryLookup {
    async fn label(&self, medicine_id: MedicineId) -> Option<MedicineLabel> {
        let mut inventory = self.inventory.lock().await;
        if let Err(e) = inventory.reload() {
            log::error!("Could not reload medicines, using the last known list. [error = {e}]");
        }
        inventory.get(medicine_id).map(label_of)
    }
}

fn label_of(medicine: &Medicine) -> MedicineLabel {
    MedicineLabel {
        name: medicine.name.clone(),
        dosage: medicine.dosage.clone(),
    }
}

/// Keeps medicines, family members and reminders consistent with each other.
///
/// Other processes may write the same store, so every operation locks it and reloads all
/// three collections before reading or changing anything.
pub struct MedicineCabinet {
    store: Arc<dyn KeyValueStore>,
    inventory: SharedInventory,
    family: Mutex<FamilyRegistry>,
    scheduler: SharedScheduler,
}

impl MedicineCabinet {
    pub fn open(
        store: Arc<dyn KeyValueStore>,
        settings: &InventorySettings,
    ) -> Result<Self, StorageError> {
        let inventory = MedicineInventory::load(Arc::clone(&store), settings)?;
        let family = FamilyRegistry::load(Arc::clone(&store))?;
        let scheduler = ReminderScheduler::load(Arc::clone(&store))?;

        Ok(Self {
            store,
            inventory: Arc::new(Mutex::new(inventory)),
            family: Mutex::new(family),
            scheduler: scheduler.into_shared(),
        })
    }

    pub fn scheduler(&self) -> SharedScheduler {
        Arc::clone(&self.scheduler)
    }

    pub fn lookup(&self) -> Arc<dyn MedicineLookup> {
        Arc::new(InventoryLookup {
            inventory: Arc::clone(&self.inventory),
        })
    }

    async fn sync(&self) -> Result<StoreLock, StorageError> {
        let lock = self.store.lock()?;
        self.inventory.lock().await.reload()?;
        self.scheduler.lock().await.reload()?;
        self.family.lock().await.reload()?;
        Ok(lock)
    }

    /// Runs the daily status reset for `today`. Returns whether anything was reset.
    pub async fn start_day(&self, today: NaiveDate) -> anyhow::Result<bool> {
        let _lock = self.sync().await?;
        Ok(self.scheduler.lock().await.reset_for_new_day(today))
    }

    pub async fn add_medicine(
        &self,
        new: NewMedicine,
        today: NaiveDate,
    ) -> anyhow::Result<Medicine> {
        let _lock = self.sync().await?;
        let medicine = self.inventory.lock().await.add(new, today)?;
        self.family.lock().await.ensure(&medicine.assigned_to)?;
        Ok(medicine)
    }

    pub async fn medicine(&self, id: MedicineId) -> anyhow::Result<Option<Medicine>> {
        let _lock = self.sync().await?;
        Ok(self.inventory.lock().await.get(id).cloned())
    }

    pub async fn update_medicine(
        &self,
        id: MedicineId,
        update: MedicineUpdate,
    ) -> anyhow::Result<Option<Medicine>> {
        let _lock = self.sync().await?;
        let updated = self.inventory.lock().await.update(id, update)?;
        if let Some(medicine) = &updated {
            self.family.lock().await.ensure(&medicine.assigned_to)?;
        }
        Ok(updated)
    }

    /// Removes the medicine together with every reminder pointing at it.
    pub async fn delete_medicine(&self, id: MedicineId) -> anyhow::Result<Option<Medicine>> {
        let _lock = self.sync().await?;
        let Some(removed) = self.inventory.lock().await.remove(id) else {
            return Ok(None);
        };
        let reminders = self
            .scheduler
            .lock()
            .await
            .delete_reminders_for_medicine(id);

        log::info!(
            "Deleted medicine with its reminders. [medicine_id = {id}, reminders = {reminders}]"
        );
        Ok(Some(removed))
    }

    pub async fn medicines(
        &self,
        filter: MedicineFilter,
        today: NaiveDate,
    ) -> anyhow::Result<Vec<(Medicine, ExpiryStatus)>> {
        let _lock = self.sync().await?;
        let inventory = self.inventory.lock().await;
        Ok(inventory
            .filter(filter, today)
            .into_iter()
            .map(|medicine| (medicine.clone(), inventory.status(medicine, today)))
            .collect())
    }

    pub async fn summary(&self, today: NaiveDate) -> anyhow::Result<InventorySummary> {
        let _lock = self.sync().await?;
        Ok(self.inventory.lock().await.summary(today))
    }

    pub async fn family_members(&self) -> anyhow::Result<Vec<FamilyMember>> {
        let _lock = self.sync().await?;
        Ok(self.family.lock().await.members().to_vec())
    }

    pub async fn add_family_member(&self, name: &str) -> anyhow::Result<FamilyMember> {
        let _lock = self.sync().await?;
        Ok(self.family.lock().await.add(name)?)
    }

    /// Medicines assigned to the removed member keep their assignee name.
    pub async fn remove_family_member(
        &self,
        id: FamilyMemberId,
    ) -> anyhow::Result<Option<FamilyMember>> {
        let _lock = self.sync().await?;
        let mut family = self.family.lock().await;
        let Some(member) = family.members().iter().find(|member| member.id == id) else {
            return Ok(None);
        };
        if member.is_named(DEFAULT_MEMBER) {
            bail!("{DEFAULT_MEMBER} cannot be removed");
        }

        Ok(family.remove(id))
    }

    pub async fn add_reminder(
        &self,
        medicine_id: MedicineId,
        time: Option<ReminderTime>,
    ) -> anyhow::Result<Reminder> {
        let _lock = self.sync().await?;
        if self.inventory.lock().await.get(medicine_id).is_none() {
            bail!("No medicine with id {medicine_id}");
        }

        let mut scheduler = self.scheduler.lock().await;
        let mut reminder = scheduler.add_reminder(medicine_id);
        if let Some(time) = time {
            scheduler.update_reminder(reminder.id, time, reminder.enabled);
            reminder.time = time;
        }
        Ok(reminder)
    }

    /// Applies `change` and returns the updated reminder, `None` for an unknown id.
    pub async fn update_reminder(
        &self,
        id: ReminderId,
        change: ReminderChange,
    ) -> anyhow::Result<Option<Reminder>> {
        let _lock = self.sync().await?;
        let mut scheduler = self.scheduler.lock().await;
        let Some(current) = scheduler.get(id).cloned() else {
            return Ok(None);
        };

        let time = change.time.unwrap_or(current.time);
        let enabled = change.enabled.unwrap_or(current.enabled);
        if (time, enabled) != (current.time, current.enabled) {
            scheduler.update_reminder(id, time, enabled);
        }
        if let Some(repeat) = change.repeat.filter(|repeat| *repeat != current.repeat) {
            scheduler.set_repeat(id, repeat);
        }

        Ok(scheduler.get(id).cloned())
    }

    pub async fn delete_reminder(&self, id: ReminderId) -> anyhow::Result<Option<Reminder>> {
        let _lock = self.sync().await?;
        let mut scheduler = self.scheduler.lock().await;
        let removed = scheduler.get(id).cloned();
        scheduler.delete_reminder(id);
        Ok(removed)
    }

    /// Toggles the dose after the daily reset for `now`, so a mark made before the first
    /// view of the day is not wiped by that view.
    pub async fn toggle_taken(
        &self,
        id: ReminderId,
        now: NaiveDateTime,
    ) -> anyhow::Result<Option<ReminderStatus>> {
        let _lock = self.sync().await?;
        let mut scheduler = self.scheduler.lock().await;
        scheduler.reset_for_new_day(now.date());
        scheduler.toggle_completion(id);
        Ok(scheduler.get(id).map(|reminder| reminder.status))
    }

    /// Today's active reminders in time order, after the daily reset for `now`.
    pub async fn today_view(&self, now: NaiveDateTime) -> anyhow::Result<Vec<ScheduledDose>> {
        let _lock = self.sync().await?;
        let schedule = {
            let mut scheduler = self.scheduler.lock().await;
            scheduler.reset_for_new_day(now.date());
            scheduler.todays_schedule()
        };
        Ok(self.label(schedule).await)
    }

    pub async fn upcoming(
        &self,
        now: NaiveDateTime,
        limit: usize,
    ) -> anyhow::Result<Vec<ScheduledDose>> {
        let _lock = self.sync().await?;
        let upcoming = {
            let mut scheduler = self.scheduler.lock().await;
            scheduler.reset_for_new_day(now.date());
            scheduler.todays_upcoming(now.time(), limit)
        };
        Ok(self.label(upcoming).await)
    }

    /// Serializes one export document. Expiry counters use `today`, the user's local date.
    pub async fn export(
        &self,
        kind: ExportKind,
        exported_at: DateTime<Utc>,
        today: NaiveDate,
        notifications_enabled: bool,
    ) -> anyhow::Result<String> {
        let _lock = self.sync().await?;
        let inventory = self.inventory.lock().await;
        let scheduler = self.scheduler.lock().await;

        let json = match kind {
            ExportKind::FullBackup => {
                let family = self.family.lock().await;
                serde_json::to_string_pretty(&FullBackup {
                    medicines: inventory.list(),
                    reminders: scheduler.reminders(),
                    family_members: family.members(),
                    export_date: exported_at,
                    settings: BackupSettings {
                        notifications_enabled,
                    },
                })
            }
            ExportKind::MedicineLogs => {
                serde_json::to_string_pretty(&MedicineLog::new(&inventory, exported_at, today))
            }
            ExportKind::Reminders => {
                serde_json::to_string_pretty(&ReminderLog::new(scheduler.reminders(), exported_at))
            }
        };
        Ok(json?)
    }

    async fn label(&self, reminders: Vec<Reminder>) -> Vec<ScheduledDose> {
        let inventory = self.inventory.lock().await;
        reminders
            .into_iter()
            .map(|reminder| ScheduledDose {
                medicine: inventory.get(reminder.medicine_id).map(label_of),
                reminder,
            })
            .collect()
    }
}
