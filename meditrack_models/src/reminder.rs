use std::{fmt, str::FromStr};

use chrono::{NaiveTime, ParseError, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use uuid::Uuid;

use crate::medicine::MedicineId;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    #[default]
    Pending,
    Notified,
    Completed,
}

impl FromStr for ReminderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "notified" => Ok(Self::Notified),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown reminder status {other:?}")),
        }
    }
}

/// Only `Daily` is expanded into occurrences; the other variants are kept as entered.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderRepeat {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl FromStr for ReminderRepeat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(format!("unknown repeat {other:?}, expected daily, weekly or monthly")),
        }
    }
}

/// Stored values this version does not know fall back to the default with a warning, so
/// one odd record does not make the whole reminder set unreadable.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = String> + Default + fmt::Debug,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.parse().unwrap_or_else(|e| {
        let fallback = T::default();
        log::warn!("Warning: {e}, defaulting to {fallback:?}");
        fallback
    }))
}

impl<'de> Deserialize<'de> for ReminderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient(deserializer)
    }
}

impl<'de> Deserialize<'de> for ReminderRepeat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient(deserializer)
    }
}

pub type ReminderId = Uuid;

/// Wall-clock time of day with minute precision, persisted as `HH:MM`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReminderTime(NaiveTime);

impl ReminderTime {
    pub const FORMAT: &'static str = "%H:%M";

    pub fn new(inner: NaiveTime) -> Self {
        let normalized_time = inner
            .with_second(0)
            .and_then(|time| time.with_nanosecond(0))
            .expect("Will never fail.");
        Self(normalized_time)
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn time(&self) -> &NaiveTime {
        &self.0
    }

    pub fn into_time(self) -> NaiveTime {
        self.0
    }
}

impl Default for ReminderTime {
    fn default() -> Self {
        Self::from_hm(9, 0).expect("09:00 is a valid time")
    }
}

impl From<NaiveTime> for ReminderTime {
    fn from(value: NaiveTime) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for ReminderTime {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), Self::FORMAT).map(Self::new)
    }
}

impl Serialize for ReminderTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReminderTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|e| de::Error::custom(format!("invalid reminder time {raw:?}: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: ReminderId,
    pub medicine_id: MedicineId,
    pub time: ReminderTime,
    pub enabled: bool,
    #[serde(default)]
    pub status: ReminderStatus,
    #[serde(default)]
    pub repeat: ReminderRepeat,
}

impl Reminder {
    pub fn new(medicine_id: MedicineId) -> Self {
        Self {
            id: Uuid::new_v4(),
            medicine_id,
            time: ReminderTime::default(),
            enabled: true,
            status: ReminderStatus::Pending,
            repeat: ReminderRepeat::Daily,
        }
    }

    /// Enabled and repeating daily, i.e. part of every day's schedule.
    pub fn is_active_daily(&self) -> bool {
        self.enabled && self.repeat == ReminderRepeat::Daily
    }
}
