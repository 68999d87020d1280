use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use meditrack_models::settings::InventorySettings;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    Expired,
    ExpiringSoon { days_left: i64 },
    Fresh,
}

/// When a medicine counts as "expiring soon".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    /// Size of the warning window in days, inclusive.
    pub expiring_within_days: u32,
    /// Whether a medicine expiring today is still in the warning window. When false it
    /// is reported as fresh for the rest of the day.
    pub today_is_expiring: bool,
}

impl ExpiryPolicy {
    pub fn status(&self, expiry_date: NaiveDate, today: NaiveDate) -> ExpiryStatus {
        let days_left = (expiry_date - today).num_days();
        let first_warning_day = if self.today_is_expiring { 0 } else { 1 };

        if days_left < 0 {
            ExpiryStatus::Expired
        } else if (first_warning_day..=i64::from(self.expiring_within_days)).contains(&days_left) {
            ExpiryStatus::ExpiringSoon { days_left }
        } else {
            ExpiryStatus::Fresh
        }
    }
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self::from(&InventorySettings::default())
    }
}

impl From<&InventorySettings> for ExpiryPolicy {
    fn from(settings: &InventorySettings) -> Self {
        Self {
            expiring_within_days: settings.expiring_within_days,
            today_is_expiring: settings.today_is_expiring,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MedicineFilter {
    #[default]
    All,
    Expiring,
    Expired,
    LowStock,
    Unverified,
}

impl FromStr for MedicineFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "expiring" => Ok(Self::Expiring),
            "expired" => Ok(Self::Expired),
            "low" | "low-stock" => Ok(Self::LowStock),
            "unverified" => Ok(Self::Unverified),
            other => Err(format!(
                "unknown filter {other:?}, expected one of: all, expiring, expired, low, unverified"
            )),
        }
    }
}

impl fmt::Display for MedicineFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::All => "all",
            Self::Expiring => "expiring",
            Self::Expired => "expired",
            Self::LowStock => "low",
            Self::Unverified => "unverified",
        };
        f.write_str(name)
    }
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total: usize,
    pub expiring_soon: usize,
    pub expired: usize,
    pub low_stock: usize,
    pub unverified: usize,
}
