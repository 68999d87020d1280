//! Fixed keys every component reads and writes its whole collection under.

pub const REMINDERS: &str = "reminders";
pub const LAST_RESET_DATE: &str = "lastResetDate";
pub const MEDICINES: &str = "medicines";
pub const FAMILY_MEMBERS: &str = "familyMembers";
