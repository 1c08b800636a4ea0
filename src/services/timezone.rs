use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::utils::errors::DomainError;

/// Interprets `(date, time)` as wall-clock time in the named IANA zone and
/// converts it to a UTC instant, resolving the zone's DST offset for that
/// date. A zone name that does not parse, or a local time skipped by a
/// forward DST transition, is an invalid specification. A time repeated by
/// a backward transition resolves to the earlier of the two instants.
pub fn build_utc_instant(
    date: NaiveDate,
    time: NaiveTime,
    zone: &str,
) -> Result<DateTime<Utc>, DomainError> {
    let tz: Tz = zone.parse().map_err(|_| {
        DomainError::InvalidTimeSpecification(format!("unrecognized timezone '{}'", zone))
    })?;

    match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(instant) => Ok(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _latest) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(DomainError::InvalidTimeSpecification(format!(
            "{} {} does not exist in {} (skipped by a DST transition)",
            date, time, zone
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn kolkata_offset_is_applied() {
        // IST is UTC+05:30 year-round.
        let instant = build_utc_instant(date(2025, 1, 10), time(10, 0), "Asia/Kolkata").unwrap();
        assert_eq!(instant.hour(), 4);
        assert_eq!(instant.minute(), 30);
        assert_eq!(instant.date_naive(), date(2025, 1, 10));
    }

    #[test]
    fn dst_offset_differs_between_winter_and_summer() {
        let winter = build_utc_instant(date(2025, 1, 15), time(9, 0), "America/New_York").unwrap();
        let summer = build_utc_instant(date(2025, 7, 15), time(9, 0), "America/New_York").unwrap();
        assert_eq!(winter.hour(), 14); // EST, UTC-5
        assert_eq!(summer.hour(), 13); // EDT, UTC-4
    }

    #[test]
    fn skipped_spring_forward_time_is_rejected() {
        // 2025-03-09 02:30 does not exist in America/New_York.
        let err = build_utc_instant(date(2025, 3, 9), time(2, 30), "America/New_York").unwrap_err();
        assert!(matches!(err, DomainError::InvalidTimeSpecification(_)));
    }

    #[test]
    fn ambiguous_fall_back_time_resolves_to_earlier_instant() {
        // 2025-11-02 01:30 occurs twice in America/New_York; the EDT reading wins.
        let instant =
            build_utc_instant(date(2025, 11, 2), time(1, 30), "America/New_York").unwrap();
        assert_eq!(instant.hour(), 5);
    }

    #[test]
    fn unknown_zone_is_rejected() {
        let err = build_utc_instant(date(2025, 1, 10), time(10, 0), "Mars/Olympus").unwrap_err();
        assert!(matches!(err, DomainError::InvalidTimeSpecification(_)));
    }

    #[test]
    fn conversion_is_deterministic() {
        let a = build_utc_instant(date(2025, 6, 1), time(15, 45), "Europe/Berlin").unwrap();
        let b = build_utc_instant(date(2025, 6, 1), time(15, 45), "Europe/Berlin").unwrap();
        assert_eq!(a, b);
    }
}
