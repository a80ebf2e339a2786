use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, TimeZone, Utc};

/// First instant of the current calendar month in the given offset,
/// expressed back in UTC. Falls back to the UTC month boundary if the
/// offset is out of range.
pub fn start_of_current_month(now: DateTime<Utc>, utc_offset_minutes: i32) -> DateTime<Utc> {
    let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
        .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));
    let local = now.with_timezone(&offset);
    let first = local
        .date_naive()
        .with_day0(0)
        .expect("day 1 exists in every month")
        .and_time(NaiveTime::MIN);
    match offset.from_local_datetime(&first).single() {
        Some(dt) => dt.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&first),
    }
}

pub fn trailing_days(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn month_start_in_utc() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap();
        let start = start_of_current_month(now, 0);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn month_start_respects_offset() {
        // 2024-03-01 01:00 UTC is still February in UTC-2.
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 1, 0, 0).unwrap();
        let start = start_of_current_month(now, -120);
        assert_eq!(start.with_timezone(&Utc).month(), 2);
        assert_eq!(
            start,
            Utc.with_ymd_and_hms(2024, 2, 1, 2, 0, 0).unwrap()
        );
    }

    #[test]
    fn trailing_window() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(
            trailing_days(now, 7),
            Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap()
        );
    }
}
