//! Enumerate every bucket a period must show, including empty ones.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::calendar::Calendar;
use crate::models::{BucketKey, PeriodSelector};

/// The complete, ascending, duplicate-free list of buckets for `selector`.
///
/// Pure given `now`: the wall clock is never read here.
pub fn plan_buckets(
    selector: &PeriodSelector,
    now: DateTime<Utc>,
    calendar: &Calendar,
) -> Vec<BucketKey> {
    let today = calendar.date_of(now);
    match *selector {
        PeriodSelector::Today => (0..24).map(|hour| BucketKey::hour(today, hour)).collect(),
        PeriodSelector::LastDays { days } => {
            let days = i64::from(days);
            (0..days)
                .rev()
                .filter_map(|offset| today.checked_sub_signed(Duration::days(offset)))
                .map(BucketKey::day)
                .collect()
        }
        PeriodSelector::Monthly { year, month } => {
            let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
                return Vec::new();
            };
            if first > today {
                return Vec::new();
            }
            first
                .iter_days()
                .take_while(|d| d.month() == month && d.year() == year)
                .map(BucketKey::day)
                .collect()
        }
    }
}

/// The bucket `ts` falls into for `selector`, using the same calendar as the plan.
pub fn bucket_for(selector: &PeriodSelector, ts: DateTime<Utc>, calendar: &Calendar) -> BucketKey {
    match selector {
        PeriodSelector::Today => {
            let (date, hour) = calendar.hour_of(ts);
            BucketKey::hour(date, hour)
        }
        PeriodSelector::LastDays { .. } | PeriodSelector::Monthly { .. } => {
            BucketKey::day(calendar.date_of(ts))
        }
    }
}

/// Number of days in a calendar month, or `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    u32::try_from((first_next - first).num_days()).ok()
}
