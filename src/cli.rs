use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use meditrack_inventory::{ExpiryStatus, MedicineFilter, export::ExportKind};
use meditrack_models::{
    family::FamilyMemberId,
    medicine::{Medicine, MedicineId, MedicineUpdate, NewMedicine},
    reminder::{ReminderId, ReminderRepeat, ReminderStatus, ReminderTime},
    settings::Settings,
};
use meditrack_scan::parse_date_text;
use meditrack_scheduler::{Clock, ZonedClock};
use meditrack_storage::JsonFileStore;

use crate::cabinet::{MedicineCabinet, ReminderChange, ScheduledDose};

mod run;
mod scan;

fn parse_expiry(text: &str) -> Result<NaiveDate, String> {
    parse_date_text(text)
        .map(NaiveDate::from)
        .map_err(|e| e.to_string())
}

#[derive(Debug, clap::Parser)]
#[command(version, about = "Medicine cabinet and dose reminders")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Watch reminders and send notifications until interrupted (default)
    Run,

    /// Show today's reminders
    Today,

    /// Show the next reminders due today
    Upcoming,

    /// Normalize a free-text date to YYYY-MM-DD
    ParseDate { text: String },

    /// Add a medicine to the cabinet
    AddMedicine(AddMedicine),

    /// Change fields of a medicine, keeping the others
    UpdateMedicine(UpdateMedicine),

    /// Delete a medicine and all of its reminders
    DeleteMedicine { id: MedicineId },

    /// Add a daily reminder for a medicine
    AddReminder {
        medicine_id: MedicineId,

        /// Time of day as HH:MM, 09:00 when omitted
        #[arg(long)]
        time: Option<ReminderTime>,
    },

    /// Change the time, on/off state or repeat of a reminder
    UpdateReminder {
        reminder_id: ReminderId,

        /// Time of day as HH:MM
        #[arg(long)]
        time: Option<ReminderTime>,

        /// true to turn the reminder on, false to turn it off
        #[arg(long)]
        enabled: Option<bool>,

        /// daily, weekly or monthly
        #[arg(long)]
        repeat: Option<ReminderRepeat>,
    },

    /// Delete a reminder
    DeleteReminder { reminder_id: ReminderId },

    /// Mark a reminder as taken, or back as not taken
    Taken { reminder_id: ReminderId },

    /// List medicines
    Inventory {
        /// all, expiring, expired, low or unverified
        #[arg(long, default_value_t = MedicineFilter::All)]
        filter: MedicineFilter,
    },

    /// List family members, or add and remove them
    Family {
        #[command(subcommand)]
        action: Option<FamilyAction>,
    },

    /// Write a JSON export: full, medicines or reminders
    Export {
        kind: ExportKind,

        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Read medicine name and expiry date from a package photo
    Scan { image: PathBuf },
}

#[derive(Debug, clap::Subcommand)]
pub enum FamilyAction {
    /// Add a family member medicines can be assigned to
    Add { name: String },

    /// Remove a family member
    Remove { id: FamilyMemberId },
}

#[derive(Debug, clap::Args)]
pub struct AddMedicine {
    name: String,

    /// Expiry date in any supported layout, e.g. 31/12/2026 or 2026-12-31
    #[arg(long, value_parser = parse_expiry)]
    expiry: NaiveDate,

    #[arg(long)]
    dosage: String,

    #[arg(long, default_value_t = 1)]
    quantity: u32,

    #[arg(long, default_value = "Self")]
    assigned_to: String,

    /// The expiry date was only partially readable
    #[arg(long)]
    unverified: bool,
}

#[derive(Debug, clap::Args)]
pub struct UpdateMedicine {
    id: MedicineId,

    #[arg(long)]
    name: Option<String>,

    #[arg(long, value_parser = parse_expiry)]
    expiry: Option<NaiveDate>,

    #[arg(long)]
    dosage: Option<String>,

    #[arg(long)]
    quantity: Option<u32>,

    #[arg(long)]
    assigned_to: Option<String>,

    #[arg(long)]
    verified: Option<bool>,
}

impl UpdateMedicine {
    fn apply(self, medicine: Medicine) -> MedicineUpdate {
        MedicineUpdate {
            name: self.name.unwrap_or(medicine.name),
            expiry_date: self.expiry.unwrap_or(medicine.expiry_date),
            dosage: self.dosage.unwrap_or(medicine.dosage),
            quantity: self.quantity.unwrap_or(medicine.quantity),
            assigned_to: self.assigned_to.unwrap_or(medicine.assigned_to),
            verified: self.verified.unwrap_or(medicine.verified),
        }
    }
}

impl Cli {
    pub async fn run(self, settings: Settings) -> anyhow::Result<()> {
        let command = self.command.unwrap_or(Command::Run);

        if let Command::ParseDate { text } = &command {
            println!("{}", parse_date_text(text)?);
            return Ok(());
        }
        if let Command::Scan { image } = &command {
            return scan::run(image, &settings.scan).await;
        }

        let store = JsonFileStore::open(&settings.storage.data_dir)?;
        let cabinet = MedicineCabinet::open(Arc::new(store), &settings.inventory)?;
        let clock = ZonedClock::new(settings.reminders.timezone);
        let now = clock.now();
        cabinet.start_day(now.date()).await?;

        match command {
            Command::Run => run::run(cabinet, clock, &settings).await?,
            Command::Today => print_doses(&cabinet.today_view(now).await?),
            Command::Upcoming => print_doses(
                &cabinet
                    .upcoming(now, settings.reminders.upcoming_limit)
                    .await?,
            ),
            Command::AddMedicine(args) => {
                let medicine = cabinet
                    .add_medicine(
                        NewMedicine {
                            name: args.name,
                            expiry_date: args.expiry,
                            dosage: args.dosage,
                            quantity: args.quantity,
                            assigned_to: args.assigned_to,
                            verified: !args.unverified,
                        },
                        now.date(),
                    )
                    .await?;
                println!("Added {} ({})", medicine.name, medicine.id);
            }
            Command::UpdateMedicine(args) => {
                let id = args.id;
                let Some(medicine) = cabinet.medicine(id).await? else {
                    bail!("No medicine with id {id}");
                };
                if let Some(updated) = cabinet.update_medicine(id, args.apply(medicine)).await? {
                    println!("Updated {} ({})", updated.name, updated.id);
                }
            }
            Command::DeleteMedicine { id } => match cabinet.delete_medicine(id).await? {
                Some(medicine) => println!("Deleted {}", medicine.name),
                None => println!("No medicine with id {id}"),
            },
            Command::AddReminder { medicine_id, time } => {
                let reminder = cabinet.add_reminder(medicine_id, time).await?;
                println!("Reminder {} set for {}", reminder.id, reminder.time);
            }
            Command::UpdateReminder {
                reminder_id,
                time,
                enabled,
                repeat,
            } => {
                let change = ReminderChange {
                    time,
                    enabled,
                    repeat,
                };
                match cabinet.update_reminder(reminder_id, change).await? {
                    Some(reminder) => println!(
                        "Reminder {} at {}, {}, repeats {:?}",
                        reminder.id,
                        reminder.time,
                        if reminder.enabled { "on" } else { "off" },
                        reminder.repeat
                    ),
                    None => println!("No reminder with id {reminder_id}"),
                }
            }
            Command::DeleteReminder { reminder_id } => {
                match cabinet.delete_reminder(reminder_id).await? {
                    Some(reminder) => println!("Deleted reminder at {}", reminder.time),
                    None => println!("No reminder with id {reminder_id}"),
                }
            }
            Command::Taken { reminder_id } => {
                match cabinet.toggle_taken(reminder_id, now).await? {
                    Some(ReminderStatus::Completed) => println!("Marked as taken"),
                    Some(_) => println!("Marked as not taken"),
                    None => println!("No reminder with id {reminder_id}"),
                }
            }
            Command::Inventory { filter } => print_inventory(&cabinet, filter, now).await?,
            Command::Family { action: None } => {
                for member in cabinet.family_members().await? {
                    println!("{}  {}", member.id, member.name);
                }
            }
            Command::Family {
                action: Some(FamilyAction::Add { name }),
            } => {
                let member = cabinet.add_family_member(&name).await?;
                println!("Added {} ({})", member.name, member.id);
            }
            Command::Family {
                action: Some(FamilyAction::Remove { id }),
            } => match cabinet.remove_family_member(id).await? {
                Some(member) => println!("Removed {}", member.name),
                None => println!("No family member with id {id}"),
            },
            Command::Export { kind, out } => {
                let json = cabinet
                    .export(
                        kind,
                        Utc::now(),
                        now.date(),
                        settings.reminders.notifications_enabled,
                    )
                    .await?;
                let path = out.join(kind.file_name(now.date()));
                tokio::fs::write(&path, json)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Exported {}", path.display());
            }
            Command::ParseDate { .. } | Command::Scan { .. } => {}
        }

        Ok(())
    }
}

fn print_doses(doses: &[ScheduledDose]) {
    if doses.is_empty() {
        println!("No reminders");
        return;
    }

    for dose in doses {
        let mark = if dose.is_taken() { "x" } else { " " };
        let dosage = dose
            .medicine
            .as_ref()
            .map(|label| format!(" - {}", label.dosage))
            .unwrap_or_default();
        println!(
            "[{mark}] {} {}{dosage}  ({})",
            dose.reminder.time,
            dose.medicine_name(),
            dose.reminder.id
        );
    }
}

async fn print_inventory(
    cabinet: &MedicineCabinet,
    filter: MedicineFilter,
    now: NaiveDateTime,
) -> anyhow::Result<()> {
    let today = now.date();
    let summary = cabinet.summary(today).await?;
    println!(
        "{} medicines, {} expiring soon, {} expired, {} low on stock, {} unverified",
        summary.total,
        summary.expiring_soon,
        summary.expired,
        summary.low_stock,
        summary.unverified
    );

    for (medicine, status) in cabinet.medicines(filter, today).await? {
        let status = match status {
            ExpiryStatus::Expired => "expired".to_string(),
            ExpiryStatus::ExpiringSoon { days_left: 0 } => "expires today".to_string(),
            ExpiryStatus::ExpiringSoon { days_left } => format!("expires in {days_left} days"),
            ExpiryStatus::Fresh => format!("expires {}", medicine.expiry_date),
        };
        println!(
            "{}  {} ({}), qty {}, for {}  [{status}]{}",
            medicine.id,
            medicine.name,
            medicine.dosage,
            medicine.quantity,
            medicine.assigned_to,
            if medicine.verified { "" } else { " unverified" }
        );
    }

    Ok(())
}
