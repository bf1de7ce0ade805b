use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Invalid period {0:?}. Use: today, <N>d (e.g. 7d), monthly")]
    UnknownPeriod(String),
    #[error("A last-N-days period needs at least one day")]
    ZeroDays,
    #[error("Invalid month {0}: expected 1-12")]
    InvalidMonth(u32),
}

/// The period a chart is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PeriodSelector {
    /// Hour-by-hour for the current local day.
    Today,
    /// One bucket per day for the last `n` days, today included.
    LastDays { days: u32 },
    /// One bucket per day of a calendar month (month is 1-12).
    Monthly { year: i32, month: u32 },
}

impl PeriodSelector {
    pub fn last_days(days: u32) -> Result<Self, SelectorError> {
        if days == 0 {
            return Err(SelectorError::ZeroDays);
        }
        Ok(PeriodSelector::LastDays { days })
    }

    pub fn monthly(year: i32, month: u32) -> Result<Self, SelectorError> {
        if !(1..=12).contains(&month) {
            return Err(SelectorError::InvalidMonth(month));
        }
        Ok(PeriodSelector::Monthly { year, month })
    }

    /// Parse the dashboard's period names.
    ///
    /// `monthly` takes `year`/`month`, defaulting to the month containing `today`.
    pub fn parse(
        period: &str,
        year: Option<i32>,
        month: Option<u32>,
        today: NaiveDate,
    ) -> Result<Self, SelectorError> {
        let p = period.trim().to_lowercase();
        match p.as_str() {
            "today" | "intraday" => Ok(PeriodSelector::Today),
            "week" | "weekly" => Self::last_days(7),
            "monthly" | "month" => Self::monthly(
                year.unwrap_or_else(|| today.year()),
                month.unwrap_or_else(|| today.month()),
            ),
            other => {
                let days = other
                    .strip_suffix('d')
                    .and_then(|n| n.parse::<u32>().ok())
                    .ok_or_else(|| SelectorError::UnknownPeriod(period.to_string()))?;
                Self::last_days(days)
            }
        }
    }

    pub fn is_intraday(&self) -> bool {
        matches!(self, PeriodSelector::Today)
    }

    /// The `period` query value the metrics endpoint expects.
    pub fn metrics_period(&self) -> String {
        match self {
            PeriodSelector::Today => "1d".to_string(),
            PeriodSelector::LastDays { days } => format!("{days}d"),
            PeriodSelector::Monthly { .. } => "monthly".to_string(),
        }
    }
}

impl fmt::Display for PeriodSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodSelector::Today => write!(f, "today"),
            PeriodSelector::LastDays { days } => write!(f, "{days}d"),
            PeriodSelector::Monthly { year, month } => write!(f, "monthly:{year:04}-{month:02}"),
        }
    }
}
