use chrono::NaiveDate;

use crate::MedicineDetails;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Complete { name: String, expiry_date: NaiveDate },
    NameOnly(String),
    ExpiryOnly(NaiveDate),
    Nothing,
}

impl ScanOutcome {
    /// Feedback shown after a scan. `None` when both fields were found.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Complete { .. } => None,
            Self::NameOnly(_) => Some("Name found, but expiry date could not be detected."),
            Self::ExpiryOnly(_) => Some("Expiry date found, but name could not be detected."),
            Self::Nothing => Some("Could not automatically detect medicine details."),
        }
    }
}

impl From<MedicineDetails> for ScanOutcome {
    fn from(details: MedicineDetails) -> Self {
        match (details.name, details.expiry_date) {
            (Some(name), Some(expiry_date)) => Self::Complete { name, expiry_date },
            (Some(name), None) => Self::NameOnly(name),
            (None, Some(expiry_date)) => Self::ExpiryOnly(expiry_date),
            (None, None) => Self::Nothing,
        }
    }
}
