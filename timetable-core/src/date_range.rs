//! Inclusive calendar date range.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{TimetableError, TimetableResult};
use crate::time::{monday_of, parse_date};

/// Longest range the occurrence listings accept.
pub const MAX_RANGE_DAYS: u64 = 366;

/// Inclusive range of calendar dates. `from <= to` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = TimetableError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.from, raw.to)
    }
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> TimetableResult<Self> {
        if from > to {
            return Err(TimetableError::InvalidRange(format!(
                "Range start {from} is after range end {to}"
            )));
        }
        Ok(DateRange { from, to })
    }

    /// A single-day range.
    pub fn day(date: NaiveDate) -> Self {
        DateRange { from: date, to: date }
    }

    /// The Monday-to-Sunday week containing `date`. Fails at the edges of
    /// the representable calendar.
    pub fn week_of(date: NaiveDate) -> TimetableResult<Self> {
        let from = monday_of(date)?;
        let to = from
            .checked_add_days(Days::new(6))
            .ok_or_else(|| TimetableError::InvalidRange(format!("No full week starting {from}")))?;
        Ok(DateRange { from, to })
    }

    /// Fail with `InvalidRange` when the range spans more than `max_days`.
    pub fn limited_to(self, max_days: u64) -> TimetableResult<Self> {
        if self.len_days() > max_days {
            return Err(TimetableError::InvalidRange(format!(
                "Range {} to {} spans {} days, at most {max_days} allowed",
                self.from,
                self.to,
                self.len_days()
            )));
        }
        Ok(self)
    }

    /// Parse `YYYY-MM-DD` bounds. A missing bound falls back to `today`.
    pub fn from_args(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> TimetableResult<Self> {
        let from = from.map(parse_date).transpose()?.unwrap_or(today);
        let to = to.map(parse_date).transpose()?.unwrap_or(from);
        DateRange::new(from, to)
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Number of days in the range (at least 1).
    pub fn len_days(&self) -> u64 {
        (self.to - self.from).num_days() as u64 + 1
    }

    /// Every date in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        self.from.iter_days().take(self.len_days() as usize)
    }

    /// Clamp the start of the range to `floor`. `None` if nothing remains.
    pub fn starting_no_earlier_than(&self, floor: NaiveDate) -> Option<DateRange> {
        if floor > self.to {
            return None;
        }
        Some(DateRange {
            from: self.from.max(floor),
            to: self.to,
        })
    }
}
