use anyhow::Result;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_english::{parse_date_string, Dialect};
use microtasker_core::timezone::Today;

/// Parses a calendar date: ISO `YYYY-MM-DD` first, then English phrases like
/// "tomorrow", "next friday" or "in 3 days", relative to `today`.
pub fn parse_date(date_str: &str, today: &Today) -> Result<NaiveDate> {
    let input = date_str.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }

    let tz = today.timezone();
    let noon = today.date().and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN));
    let now = tz
        .from_local_datetime(&noon)
        .earliest()
        .unwrap_or_else(|| Utc::now().with_timezone(&tz));

    parse_date_string(input, now, Dialect::Us)
        .map(|dt| dt.date_naive())
        .map_err(|e| anyhow::anyhow!("Failed to parse date '{}': {}", date_str, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;
    use rstest::rstest;

    fn today() -> Today {
        Today::fixed(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(), Tz::UTC)
    }

    #[rstest]
    #[case("2024-07-01", NaiveDate::from_ymd_opt(2024, 7, 1).unwrap())]
    #[case("today", NaiveDate::from_ymd_opt(2024, 6, 10).unwrap())]
    #[case("tomorrow", NaiveDate::from_ymd_opt(2024, 6, 11).unwrap())]
    fn parses_dates_relative_to_today(#[case] input: &str, #[case] expected: NaiveDate) {
        assert_eq!(parse_date(input, &today()).unwrap(), expected);
    }

    #[test]
    fn rejects_gibberish() {
        assert!(parse_date("whenever", &today()).is_err());
    }
}
