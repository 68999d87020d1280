use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

/// What could be read off a medicine package. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineDetails {
    pub name: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

impl MedicineDetails {
    /// Reads a two-line model reply: the name, then the expiry date as `YYYY-MM-DD`.
    /// A line reading `null` in any case counts as missing, and so does a date in any
    /// other shape.
    pub fn from_reply(reply: &str) -> Self {
        let mut lines = reply.trim().lines().map(str::trim);
        let name = lines.next().and_then(present).map(str::to_string);
        let expiry_date = lines.next().and_then(present).and_then(strict_iso_date);

        Self { name, expiry_date }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.expiry_date.is_none()
    }
}

fn present(line: &str) -> Option<&str> {
    if line.is_empty() || line.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(line)
    }
}

fn strict_iso_date(line: &str) -> Option<NaiveDate> {
    let shaped = line.len() == 10
        && line.char_indices().all(|(index, c)| match index {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });

    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(line, "%Y-%m-%d").ok()
}

/// Image understanding backend. Never fails: any problem yields empty details.
#[async_trait]
pub trait MedicineDetailsExtractor: Send + Sync {
    async fn extract(&self, image: &[u8], mime_type: &str) -> MedicineDetails;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, month, day)
    }

    #[test]
    fn reads_name_and_date_lines() {
        let details = MedicineDetails::from_reply("  Amoxicillin 500mg \n 2026-08-31 \n");

        assert_eq!(details.name.as_deref(), Some("Amoxicillin 500mg"));
        assert_eq!(details.expiry_date, date(2026, 8, 31));
    }

    #[test]
    fn null_lines_are_missing() {
        let details = MedicineDetails::from_reply("NULL\nnull");

        assert!(details.is_empty());
    }

    #[test]
    fn loosely_formatted_dates_are_dropped() {
        assert_eq!(MedicineDetails::from_reply("Ibuprofen\n2026-8-31").expiry_date, None);
        assert_eq!(MedicineDetails::from_reply("Ibuprofen\n31/08/2026").expiry_date, None);
        assert_eq!(MedicineDetails::from_reply("Ibuprofen\n2026-02-30").expiry_date, None);
    }

    #[test]
    fn missing_second_line_keeps_the_name() {
        let details = MedicineDetails::from_reply("Cetirizine");

        assert_eq!(details.name.as_deref(), Some("Cetirizine"));
        assert_eq!(details.expiry_date, None);
    }

    #[test]
    fn empty_reply_is_empty() {
        assert_eq!(MedicineDetails::from_reply(""), MedicineDetails::default());
    }
}
