use crate::error::CoreError;
use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Validate and resolve an IANA timezone name
pub fn validate_timezone(timezone: &str) -> Result<Tz, CoreError> {
    Tz::from_str(timezone)
        .map_err(|_| CoreError::InvalidTimezone(timezone.to_string()))
}

/// The calendar day the user is living in.
///
/// Everything that needs "today" (relative capture tags, the focus view,
/// progress streaks) receives one of these instead of reading the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Today {
    date: NaiveDate,
    timezone: Tz,
}

impl Today {
    /// Current date in the given timezone.
    pub fn now(timezone: Tz) -> Self {
        Self {
            date: Utc::now().with_timezone(&timezone).date_naive(),
            timezone,
        }
    }

    /// A pinned date, for tests and replays.
    pub fn fixed(date: NaiveDate, timezone: Tz) -> Self {
        Self { date, timezone }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn plus_days(&self, days: u64) -> NaiveDate {
        self.date
            .checked_add_days(Days::new(days))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn minus_days(&self, days: u64) -> NaiveDate {
        self.date
            .checked_sub_days(Days::new(days))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Calendar date of a UTC instant as seen from this timezone.
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.timezone).date_naive()
    }

    /// Half-open UTC range `[start, end)` covering this local day.
    pub fn day_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.start_of(self.date), self.start_of(self.plus_days(1)))
    }

    fn start_of(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        // Some zones skip midnight on DST days; the day then starts an hour later.
        self.timezone
            .from_local_datetime(&midnight)
            .earliest()
            .or_else(|| {
                self.timezone
                    .from_local_datetime(&(midnight + Duration::hours(1)))
                    .earliest()
            })
            .map(|local| local.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_timezone() {
        assert!(validate_timezone("UTC").is_ok());
        assert!(validate_timezone("America/New_York").is_ok());
        assert!(matches!(
            validate_timezone("Invalid/Timezone"),
            Err(CoreError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn local_date_follows_the_timezone() {
        let today = Today::fixed(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            chrono_tz::America::New_York,
        );
        // 02:00 UTC is still the previous evening in New York.
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap();
        assert_eq!(
            today.local_date(instant),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn day_bounds_are_local_midnights() {
        let today = Today::fixed(
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            chrono_tz::America::New_York,
        );
        let (start, end) = today.day_bounds();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 6, 10, 4, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 6, 11, 4, 0, 0).unwrap());
    }

    #[test]
    fn day_arithmetic() {
        let today = Today::fixed(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(), Tz::UTC);
        assert_eq!(today.plus_days(1), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(today.minus_days(7), NaiveDate::from_ymd_opt(2024, 12, 24).unwrap());
    }
}
