use async_trait::async_trait;
use meditrack_models::medicine::MedicineId;

pub const NOTIFICATION_TITLE: &str = "MediTrack+ Reminder";
pub const UNKNOWN_MEDICINE: &str = "Unknown medicine";

/// What a reminder shows about the medicine it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicineLabel {
    pub name: String,
    pub dosage: String,
}

impl MedicineLabel {
    pub fn display_name(label: Option<&MedicineLabel>) -> &str {
        label.map_or(UNKNOWN_MEDICINE, |label| label.name.as_str())
    }
}

#[async_trait]
pub trait MedicineLookup: Send + Sync + 'static {
    async fn label(&self, medicine_id: MedicineId) -> Option<MedicineLabel>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn for_medicine(label: Option<&MedicineLabel>) -> Self {
        let body = match label {
            Some(label) if !label.dosage.is_empty() => {
                format!("Time to take {} - {}", label.name, label.dosage)
            }
            other => format!("Time to take {}", MedicineLabel::display_name(other)),
        };

        Self {
            title: NOTIFICATION_TITLE.to_string(),
            body,
        }
    }
}

/// Fire-and-forget delivery; failures stay inside the channel.
#[async_trait]
pub trait NotificationChannel: Send + Sync + 'static {
    async fn notify(&self, title: &str, body: &str);
}

pub struct LogNotificationChannel;

#[async_trait]
impl NotificationChannel for LogNotificationChannel {
    async fn notify(&self, title: &str, body: &str) {
        log::info!("[NOTIFY] {title}: {body}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_names_medicine_and_dosage() {
        let label = MedicineLabel {
            name: "Amoxicillin".to_string(),
            dosage: "500mg".to_string(),
        };

        let notification = Notification::for_medicine(Some(&label));

        assert_eq!(notification.title, "MediTrack+ Reminder");
        assert_eq!(notification.body, "Time to take Amoxicillin - 500mg");
    }

    #[test]
    fn dangling_medicine_renders_as_unknown() {
        let notification = Notification::for_medicine(None);

        assert_eq!(notification.body, "Time to take Unknown medicine");
    }
}
