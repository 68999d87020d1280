mod error;
mod expiry;
pub mod export;
mod family;
mod inventory;

pub use error::{FamilyError, InventoryError};
pub use expiry::{ExpiryPolicy, ExpiryStatus, InventorySummary, MedicineFilter};
pub use family::{DEFAULT_MEMBER, FamilyRegistry};
pub use inventory::MedicineInventory;
