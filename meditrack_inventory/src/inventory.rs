use std::sync::Arc;

use chrono::NaiveDate;
use meditrack_models::{
    medicine::{Medicine, MedicineId, MedicineUpdate, NewMedicine},
    settings::InventorySettings,
};
use meditrack_storage::{KeyValueStore, StorageError, keys, load_json, save_json};
use uuid::Uuid;

use crate::{DEFAULT_MEMBER, ExpiryPolicy, ExpiryStatus, InventoryError, InventorySummary, MedicineFilter};

/// The medicine cabinet contents, kept in insertion order and written back as a whole
/// after every change.
pub struct MedicineInventory {
    medicines: Vec<Medicine>,
    policy: ExpiryPolicy,
    low_stock_threshold: u32,
    store: Arc<dyn KeyValueStore>,
}

impl MedicineInventory {
    pub fn load(
        store: Arc<dyn KeyValueStore>,
        settings: &InventorySettings,
    ) -> Result<Self, StorageError> {
        let medicines: Vec<Medicine> =
            load_json(store.as_ref(), keys::MEDICINES)?.unwrap_or_default();
        log::info!("Loaded medicines. [count = {}]", medicines.len());

        Ok(Self {
            medicines,
            policy: ExpiryPolicy::from(settings),
            low_stock_threshold: settings.low_stock_threshold,
            store,
        })
    }

    /// Replaces the in-memory medicines with the stored ones. On error nothing changes.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        self.medicines = load_json(self.store.as_ref(), keys::MEDICINES)?.unwrap_or_default();
        Ok(())
    }

    pub fn policy(&self) -> ExpiryPolicy {
        self.policy
    }

    pub fn list(&self) -> &[Medicine] {
        &self.medicines
    }

    pub fn get(&self, id: MedicineId) -> Option<&Medicine> {
        self.medicines.iter().find(|medicine| medicine.id == id)
    }

    pub fn add(&mut self, new: NewMedicine, today: NaiveDate) -> Result<Medicine, InventoryError> {
        let fields = Fields::validate(
            new.name,
            new.dosage,
            new.quantity,
            new.assigned_to,
        )?;

        let medicine = Medicine {
            id: Uuid::new_v4(),
            name: fields.name,
            expiry_date: new.expiry_date,
            dosage: fields.dosage,
            quantity: new.quantity,
            assigned_to: fields.assigned_to,
            verified: new.verified,
            added_on: today,
        };
        self.medicines.push(medicine.clone());
        self.persist();

        log::info!(
            "Added medicine. [medicine_id = {}, name = {}, expiry = {}]",
            medicine.id,
            medicine.name,
            medicine.expiry_date
        );
        Ok(medicine)
    }

    /// Replaces the editable fields. `Ok(None)` when no medicine has this id.
    pub fn update(
        &mut self,
        id: MedicineId,
        update: MedicineUpdate,
    ) -> Result<Option<Medicine>, InventoryError> {
        let fields = Fields::validate(
            update.name,
            update.dosage,
            update.quantity,
            update.assigned_to,
        )?;

        let Some(medicine) = self.medicines.iter_mut().find(|medicine| medicine.id == id) else {
            log::warn!("Ignoring update of unknown medicine. [medicine_id = {id}]");
            return Ok(None);
        };

        medicine.name = fields.name;
        medicine.expiry_date = update.expiry_date;
        medicine.dosage = fields.dosage;
        medicine.quantity = update.quantity;
        medicine.assigned_to = fields.assigned_to;
        medicine.verified = update.verified;
        let updated = medicine.clone();
        self.persist();

        Ok(Some(updated))
    }

    pub fn remove(&mut self, id: MedicineId) -> Option<Medicine> {
        let Some(index) = self.medicines.iter().position(|medicine| medicine.id == id) else {
            log::warn!("Ignoring delete of unknown medicine. [medicine_id = {id}]");
            return None;
        };

        let removed = self.medicines.remove(index);
        self.persist();
        log::info!("Removed medicine. [medicine_id = {id}, name = {}]", removed.name);
        Some(removed)
    }

    pub fn status(&self, medicine: &Medicine, today: NaiveDate) -> ExpiryStatus {
        self.policy.status(medicine.expiry_date, today)
    }

    pub fn is_low_stock(&self, medicine: &Medicine) -> bool {
        medicine.quantity <= self.low_stock_threshold
    }

    pub fn filter(&self, filter: MedicineFilter, today: NaiveDate) -> Vec<&Medicine> {
        self.medicines
            .iter()
            .filter(|medicine| match filter {
                MedicineFilter::All => true,
                MedicineFilter::Expiring => matches!(
                    self.status(medicine, today),
                    ExpiryStatus::ExpiringSoon { .. }
                ),
                MedicineFilter::Expired => self.status(medicine, today) == ExpiryStatus::Expired,
                MedicineFilter::LowStock => self.is_low_stock(medicine),
                MedicineFilter::Unverified => !medicine.verified,
            })
            .collect()
    }

    pub fn summary(&self, today: NaiveDate) -> InventorySummary {
        let mut summary = InventorySummary {
            total: self.medicines.len(),
            ..Default::default()
        };

        for medicine in &self.medicines {
            match self.status(medicine, today) {
                ExpiryStatus::Expired => summary.expired += 1,
                ExpiryStatus::ExpiringSoon { .. } => summary.expiring_soon += 1,
                ExpiryStatus::Fresh => {}
            }
            if self.is_low_stock(medicine) {
                summary.low_stock += 1;
            }
            if !medicine.verified {
                summary.unverified += 1;
            }
        }

        summary
    }

    fn persist(&self) {
        if let Err(e) = save_json(self.store.as_ref(), keys::MEDICINES, &self.medicines) {
            log::error!("Failed to persist medicines, storage is now stale. [error = {e}]");
        }
    }
}

struct Fields {
    name: String,
    dosage: String,
    assigned_to: String,
}

impl Fields {
    fn validate(
        name: String,
        dosage: String,
        quantity: u32,
        assigned_to: String,
    ) -> Result<Self, InventoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InventoryError::BlankName);
        }

        let dosage = dosage.trim();
        if dosage.is_empty() {
            return Err(InventoryError::BlankDosage);
        }

        if quantity == 0 {
            return Err(InventoryError::ZeroQuantity);
        }

        let assigned_to = match assigned_to.trim() {
            "" => DEFAULT_MEMBER,
            assigned_to => assigned_to,
        };

        Ok(Self {
            name: name.to_string(),
            dosage: dosage.to_string(),
            assigned_to: assigned_to.to_string(),
        })
    }
}
