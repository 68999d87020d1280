mod delivery_channel;

pub use delivery_channel::{TelegramDeliveryError, TelegramNotificationChannel};
