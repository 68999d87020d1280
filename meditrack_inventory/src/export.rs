//! JSON export documents.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use meditrack_models::{family::FamilyMember, medicine::Medicine, reminder::Reminder};
use serde::Serialize;

use crate::{ExpiryStatus, MedicineInventory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    FullBackup,
    MedicineLogs,
    Reminders,
}

impl ExportKind {
    fn stem(&self) -> &'static str {
        match self {
            Self::FullBackup => "meditrack-full-backup",
            Self::MedicineLogs => "medicine-logs",
            Self::Reminders => "reminders",
        }
    }

    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("{}-{}.json", self.stem(), date.format("%Y-%m-%d"))
    }
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" | "backup" | "full-backup" => Ok(Self::FullBackup),
            "medicines" | "medicine-logs" => Ok(Self::MedicineLogs),
            "reminders" => Ok(Self::Reminders),
            other => Err(format!(
                "unknown export {other:?}, expected one of: full, medicines, reminders"
            )),
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSettings {
    pub notifications_enabled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullBackup<'a> {
    pub medicines: &'a [Medicine],
    pub reminders: &'a [Reminder],
    pub family_members: &'a [FamilyMember],
    pub export_date: DateTime<Utc>,
    pub settings: BackupSettings,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineLogSummary {
    pub total_medicines: usize,
    pub expiring_soon: usize,
    pub expired: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineLog<'a> {
    pub medicines: &'a [Medicine],
    pub export_date: DateTime<Utc>,
    pub summary: MedicineLogSummary,
}

impl<'a> MedicineLog<'a> {
    /// Expiry counters are taken against `today` on the user's clock, which can differ from
    /// the UTC date of `exported_at`.
    pub fn new(
        inventory: &'a MedicineInventory,
        exported_at: DateTime<Utc>,
        today: NaiveDate,
    ) -> Self {
        let medicines = inventory.list();
        let count = |wanted: fn(&ExpiryStatus) -> bool| {
            medicines
                .iter()
                .filter(|medicine| wanted(&inventory.status(medicine, today)))
                .count()
        };

        Self {
            medicines,
            export_date: exported_at,
            summary: MedicineLogSummary {
                total_medicines: medicines.len(),
                expiring_soon: count(|status| matches!(status, ExpiryStatus::ExpiringSoon { .. })),
                expired: count(|status| *status == ExpiryStatus::Expired),
            },
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderLogSummary {
    pub total_reminders: usize,
    pub active_reminders: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderLog<'a> {
    pub reminders: &'a [Reminder],
    pub export_date: DateTime<Utc>,
    pub summary: ReminderLogSummary,
}

impl<'a> ReminderLog<'a> {
    pub fn new(reminders: &'a [Reminder], exported_at: DateTime<Utc>) -> Self {
        Self {
            reminders,
            export_date: exported_at,
            summary: ReminderLogSummary {
                total_reminders: reminders.len(),
                active_reminders: reminders.iter().filter(|reminder| reminder.enabled).count(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Days, TimeZone};
    use meditrack_models::{medicine::NewMedicine, settings::InventorySettings};
    use meditrack_storage::InMemoryStore;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn exported_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 30, 0).unwrap()
    }

    fn medicine(name: &str, expiry_date: NaiveDate) -> NewMedicine {
        NewMedicine {
            name: name.to_string(),
            expiry_date,
            dosage: "5 ml".to_string(),
            quantity: 1,
            assigned_to: "Self".to_string(),
            verified: true,
        }
    }

    #[test]
    fn file_names_carry_the_export_date() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        assert_eq!(
            ExportKind::FullBackup.file_name(date),
            "meditrack-full-backup-2025-06-01.json"
        );
        assert_eq!(ExportKind::MedicineLogs.file_name(date), "medicine-logs-2025-06-01.json");
        assert_eq!("Reminders".parse(), Ok(ExportKind::Reminders));
    }

    #[test]
    fn medicine_log_counts_expiry_on_the_export_day() {
        let today = exported_at().date_naive();
        let mut inventory =
            MedicineInventory::load(Arc::new(InMemoryStore::new()), &InventorySettings::default())
                .unwrap();
        inventory.add(medicine("Syrup", today + Days::new(3)), today).unwrap();
        inventory.add(medicine("Drops", today - Days::new(3)), today).unwrap();
        inventory.add(medicine("Balm", today + Days::new(300)), today).unwrap();

        let log = MedicineLog::new(&inventory, exported_at(), today);

        assert_eq!(
            log.summary,
            MedicineLogSummary {
                total_medicines: 3,
                expiring_soon: 1,
                expired: 1,
            }
        );
        let value = serde_json::to_value(&log).unwrap();
        assert_eq!(value["exportDate"], json!("2025-06-01T10:30:00Z"));
        assert_eq!(value["summary"]["totalMedicines"], json!(3));
        assert_eq!(value["medicines"][0]["expiryDate"], json!("2025-06-04"));
    }

    #[test]
    fn medicine_log_uses_the_local_day_not_the_utc_day() {
        let local_today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let late_evening_utc = Utc.with_ymd_and_hms(2025, 6, 1, 22, 30, 0).unwrap();
        let mut inventory =
            MedicineInventory::load(Arc::new(InMemoryStore::new()), &InventorySettings::default())
                .unwrap();
        inventory
            .add(medicine("Drops", NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()), local_today)
            .unwrap();

        let log = MedicineLog::new(&inventory, late_evening_utc, local_today);

        assert_eq!(log.summary.expired, 1);
        assert_eq!(log.summary.expiring_soon, 0);
    }

    #[test]
    fn reminder_log_counts_enabled_reminders() {
        let mut disabled = Reminder::new(Uuid::new_v4());
        disabled.enabled = false;
        let reminders = vec![Reminder::new(Uuid::new_v4()), disabled];

        let log = ReminderLog::new(&reminders, exported_at());

        assert_eq!(
            log.summary,
            ReminderLogSummary {
                total_reminders: 2,
                active_reminders: 1,
            }
        );
    }

    #[test]
    fn full_backup_uses_backup_field_names() {
        let members = vec![FamilyMember::new("Self")];
        let backup = FullBackup {
            medicines: &[],
            reminders: &[],
            family_members: &members,
            export_date: exported_at(),
            settings: BackupSettings {
                notifications_enabled: false,
            },
        };

        let value = serde_json::to_value(&backup).unwrap();

        assert_eq!(value["familyMembers"][0]["name"], json!("Self"));
        assert_eq!(value["settings"]["notificationsEnabled"], json!(false));
        assert_eq!(value["medicines"], json!([]));
    }
}
