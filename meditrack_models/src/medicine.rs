use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type MedicineId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: MedicineId,
    pub name: String,
    pub expiry_date: NaiveDate,
    pub dosage: String,
    pub quantity: u32,
    pub assigned_to: String,
    /// False when the expiry date was only partially readable on the package.
    pub verified: bool,
    pub added_on: NaiveDate,
}

impl Medicine {
    /// Whole days from `today` until expiry; negative once expired.
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedicine {
    pub name: String,
    pub expiry_date: NaiveDate,
    pub dosage: String,
    pub quantity: u32,
    pub assigned_to: String,
    pub verified: bool,
}

/// Editable fields of an existing medicine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicineUpdate {
    pub name: String,
    pub expiry_date: NaiveDate,
    pub dosage: String,
    pub quantity: u32,
    pub assigned_to: String,
    pub verified: bool,
}
