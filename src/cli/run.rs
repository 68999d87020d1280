use std::sync::Arc;

use meditrack_models::settings::Settings;
use meditrack_scheduler::{LogNotificationChannel, NotificationChannel, ReminderPoller, ZonedClock};
use meditrack_telegram::TelegramNotificationChannel;
use tokio_util::sync::CancellationToken;

use crate::cabinet::MedicineCabinet;

pub async fn run(
    cabinet: MedicineCabinet,
    clock: ZonedClock,
    settings: &Settings,
) -> anyhow::Result<()> {
    let channel: Arc<dyn NotificationChannel> = match &settings.telegram {
        Some(telegram) => {
            log::info!("Delivering notifications to Telegram. [chat_id = {}]", telegram.chat_id);
            Arc::new(TelegramNotificationChannel::from_settings(telegram))
        }
        None => {
            log::info!("No Telegram settings, notifications go to the log");
            Arc::new(LogNotificationChannel)
        }
    };

    let poller = ReminderPoller::new(
        cabinet.scheduler(),
        cabinet.lookup(),
        channel,
        Arc::new(clock),
    )
    .with_notifications_enabled(settings.reminders.notifications_enabled);

    let cancellation_token = CancellationToken::new();
    let handle = poller.spawn(settings.reminders.poll_interval(), cancellation_token.clone());

    tokio::signal::ctrl_c().await?;
    log::info!("Interrupted, stopping reminder poller");
    cancellation_token.cancel();
    handle.await?;

    Ok(())
}
