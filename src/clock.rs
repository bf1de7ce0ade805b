use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::calendar::Calendar;

/// Abstraction over "current time" so bucket planning never reads the wall clock directly.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Wall-clock "now" as seen through `calendar`.
    fn now_in(&self, calendar: &Calendar) -> NaiveDateTime {
        calendar.local_datetime(self.now())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant, used by tests and by `--now` on the CLI.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn parse(value: &str) -> Result<Self> {
        let now = DateTime::parse_from_rfc3339(value.trim())
            .with_context(|| format!("Invalid RFC 3339 timestamp: {value}"))?;
        Ok(Self::new(now.with_timezone(&Utc)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
