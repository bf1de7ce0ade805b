//! The one calendar a run uses to turn instants into local days and hours.
//!
//! Normalizer, planner and aggregator all receive the same `Calendar`, so a
//! record can never land in a different day or hour than the plan expects.

use anyhow::{Context, Result};
use chrono::{
    DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Calendar {
    /// The host's local time zone.
    #[default]
    Local,
    /// A fixed IANA zone (UTC included).
    Named(Tz),
}

impl Calendar {
    pub fn utc() -> Self {
        Calendar::Named(chrono_tz::UTC)
    }

    /// Parse `local`/`current`, `utc`, or an IANA zone name.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("local")
            || trimmed.eq_ignore_ascii_case("current")
        {
            return Ok(Calendar::Local);
        }
        if trimmed.eq_ignore_ascii_case("utc") {
            return Ok(Calendar::utc());
        }
        let tz: Tz = trimmed.parse().with_context(|| {
            format!("Invalid timezone '{trimmed}' (expected IANA name, e.g. America/New_York)")
        })?;
        Ok(Calendar::Named(tz))
    }

    pub fn label(&self) -> String {
        match self {
            Calendar::Local => "local".to_string(),
            Calendar::Named(tz) => tz.name().to_string(),
        }
    }

    pub fn local_datetime(&self, ts: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Calendar::Local => ts.with_timezone(&Local).naive_local(),
            Calendar::Named(tz) => ts.with_timezone(tz).naive_local(),
        }
    }

    pub fn date_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        self.local_datetime(ts).date()
    }

    /// Local calendar day and wall-clock hour (0-23) of `ts`.
    pub fn hour_of(&self, ts: DateTime<Utc>) -> (NaiveDate, u32) {
        let local = self.local_datetime(ts);
        (local.date(), local.hour())
    }

    /// Map a wall-clock time in this calendar back to an instant.
    ///
    /// Ambiguous times (DST fall-back) resolve to the earlier instant; times
    /// inside a DST gap are pushed forward by one hour.
    pub fn resolve_local(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Calendar::Local => earliest_instant(&Local, naive),
            Calendar::Named(tz) => earliest_instant(tz, naive),
        }
    }

    /// Local midnight of `date`, as an instant.
    pub fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        self.resolve_local(date.and_time(NaiveTime::MIN))
    }
}

fn earliest_instant<T: TimeZone>(tz: &T, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => match tz.from_local_datetime(&(naive + Duration::hours(1))) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                Some(dt.with_timezone(&Utc))
            }
            LocalResult::None => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ny() -> Calendar {
        Calendar::parse("America/New_York").unwrap()
    }

    #[test]
    fn parse_accepts_local_utc_and_iana_names() -> Result<()> {
        assert_eq!(Calendar::parse("local")?, Calendar::Local);
        assert_eq!(Calendar::parse("")?, Calendar::Local);
        assert_eq!(Calendar::parse("UTC")?, Calendar::utc());
        assert_eq!(ny().label(), "America/New_York");
        assert!(Calendar::parse("Mars/Olympus_Mons").is_err());
        Ok(())
    }

    #[test]
    fn hour_of_uses_zone_wall_clock() {
        // 2026-02-01T02:30Z is 21:30 on Jan 31 in New York.
        let ts = Utc.with_ymd_and_hms(2026, 2, 1, 2, 30, 0).unwrap();
        let (date, hour) = ny().hour_of(ts);
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());
        assert_eq!(hour, 21);
    }

    #[test]
    fn resolve_local_handles_dst_gap_and_overlap() {
        let cal = ny();
        // 2026-03-08 02:30 does not exist in New York; shifted to 03:30 EDT.
        let gap = NaiveDate::from_ymd_opt(2026, 3, 8)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert_eq!(
            cal.resolve_local(gap),
            Some(Utc.with_ymd_and_hms(2026, 3, 8, 7, 30, 0).unwrap())
        );

        // 2026-11-01 01:30 happens twice; the earlier (EDT) instant wins.
        let overlap = NaiveDate::from_ymd_opt(2026, 11, 1)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        assert_eq!(
            cal.resolve_local(overlap),
            Some(Utc.with_ymd_and_hms(2026, 11, 1, 5, 30, 0).unwrap())
        );
    }

    #[test]
    fn start_of_day_is_local_midnight() {
        let date = NaiveDate::from_ymd_opt(2026, 7, 4).unwrap();
        assert_eq!(
            ny().start_of_day(date),
            Some(Utc.with_ymd_and_hms(2026, 7, 4, 4, 0, 0).unwrap())
        );
    }
}
