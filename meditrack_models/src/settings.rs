use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct TelegramSettings {
    pub token: String,
    pub chat_id: i64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ReminderSettings {
    pub poll_interval_secs: u64,
    /// Zone whose wall clock reminders are compared against.
    pub timezone: chrono_tz::Tz,
    pub upcoming_limit: usize,
    pub notifications_enabled: bool,
}

impl ReminderSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            timezone: chrono_tz::Tz::UTC,
            upcoming_limit: 3,
            notifications_enabled: true,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct InventorySettings {
    pub expiring_within_days: u32,
    pub today_is_expiring: bool,
    pub low_stock_threshold: u32,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            expiring_within_days: 7,
            today_is_expiring: true,
            low_stock_threshold: 10,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ScanSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl ScanSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub reminders: ReminderSettings,
    #[serde(default)]
    pub inventory: InventorySettings,
    #[serde(default)]
    pub scan: ScanSettings,
    #[serde(default)]
    pub telegram: Option<TelegramSettings>,
}
