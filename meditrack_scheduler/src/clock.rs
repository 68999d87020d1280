use std::sync::{Arc, Mutex, PoisonError};

use chrono::{NaiveDateTime, TimeDelta, Utc};
use chrono_tz::Tz;

/// Source of local wall-clock time for due checks and the daily reset.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the system clock and converts it to the wall clock of a fixed zone.
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
    timezone: Tz,
}

impl ZonedClock {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }
}

impl Clock for ZonedClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.timezone).naive_local()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn manual_clock_moves_only_when_advanced() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        let clock = ManualClock::new(start);
        let shared = clock.clone();

        assert_eq!(clock.now(), start);

        shared.advance(TimeDelta::minutes(2));

        assert_eq!(
            clock.now(),
            NaiveDate::from_ymd_opt(2025, 6, 2)
                .unwrap()
                .and_hms_opt(0, 1, 0)
                .unwrap()
        );
    }

    #[test]
    fn zoned_clock_applies_the_zone_offset() {
        let utc = ZonedClock::new(Tz::UTC).now();
        let tokyo = ZonedClock::new(chrono_tz::Asia::Tokyo).now();

        let offset = (tokyo - utc).num_minutes();
        assert!((539..=541).contains(&offset), "offset was {offset} minutes");
    }
}
