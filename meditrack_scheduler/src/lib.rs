mod clock;
mod delivery;
mod poller;
mod scheduler;

pub use clock::{Clock, ManualClock, ZonedClock};
pub use delivery::{
    LogNotificationChannel, MedicineLabel, MedicineLookup, Notification, NotificationChannel,
    UNKNOWN_MEDICINE,
};
pub use poller::ReminderPoller;
pub use scheduler::{ReminderScheduler, SharedScheduler};
