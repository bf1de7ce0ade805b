use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One time slot of a planned series.
///
/// Hour keys are wall-clock hours of a local day, so a DST day still has
/// exactly 24 of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BucketKey {
    Hour { date: NaiveDate, hour: u32 },
    Day { date: NaiveDate },
}

impl BucketKey {
    pub fn hour(date: NaiveDate, hour: u32) -> Self {
        BucketKey::Hour { date, hour }
    }

    pub fn day(date: NaiveDate) -> Self {
        BucketKey::Day { date }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            BucketKey::Hour { date, .. } | BucketKey::Day { date } => *date,
        }
    }

    /// Caller-agnostic default label: `HH:00` for hours, `YYYY-MM-DD` for days.
    pub fn default_label(&self) -> String {
        match self {
            BucketKey::Hour { hour, .. } => format!("{hour:02}:00"),
            BucketKey::Day { date } => date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Hour { date, hour } => write!(f, "{}T{hour:02}", date.format("%Y-%m-%d")),
            BucketKey::Day { date } => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_order_by_date_then_hour() {
        let d1 = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 5, 2).unwrap();
        assert!(BucketKey::hour(d1, 23) < BucketKey::hour(d2, 0));
        assert!(BucketKey::hour(d1, 3) < BucketKey::hour(d1, 11));
        assert!(BucketKey::day(d1) < BucketKey::day(d2));
    }

    #[test]
    fn labels_and_display() {
        let d = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        assert_eq!(BucketKey::hour(d, 7).default_label(), "07:00");
        assert_eq!(BucketKey::hour(d, 7).to_string(), "2026-05-01T07");
        assert_eq!(BucketKey::day(d).default_label(), "2026-05-01");
        assert_eq!(BucketKey::day(d).to_string(), "2026-05-01");
    }
}
