//! Concrete, dated instances of time blocks.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::block::{BlockId, Repeat, TimeBlock, Window};
use crate::subject::Subject;
use crate::time::{MinuteOfDay, Weekday};

/// Identity of an occurrence: the block it came from and the date it falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceKey {
    pub block_id: BlockId,
    pub date: NaiveDate,
}

impl OccurrenceKey {
    pub fn new(block_id: BlockId, date: NaiveDate) -> Self {
        OccurrenceKey { block_id, date }
    }
}

impl fmt::Display for OccurrenceKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}@{}", self.block_id, self.date)
    }
}

/// A time block as it happens on one specific date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub source_block_id: BlockId,
    pub effective_date: NaiveDate,
    pub weekday: Weekday,
    pub repeat: Repeat,
    pub start_time: MinuteOfDay,
    pub end_time: MinuteOfDay,
    pub subject: Option<Subject>,
    pub note: Option<String>,
    pub done: bool,
}

impl Occurrence {
    /// Materialize `block` on `date`. `done` starts out false.
    pub fn of(block: &TimeBlock, date: NaiveDate, subject: Option<Subject>) -> Self {
        Occurrence {
            source_block_id: block.id,
            effective_date: date,
            weekday: Weekday::of(date),
            repeat: block.schedule.repeat(),
            start_time: block.start_time(),
            end_time: block.end_time(),
            subject,
            note: block.note.clone(),
            done: false,
        }
    }

    pub fn key(&self) -> OccurrenceKey {
        OccurrenceKey::new(self.source_block_id, self.effective_date)
    }

    /// The `[start, end)` window of this occurrence.
    pub fn window(&self) -> Window {
        Window {
            start: self.start_time,
            end: self.end_time,
        }
    }

    /// Subject name, or "No subject".
    pub fn title(&self) -> &str {
        self.subject.as_ref().map_or("No subject", |s| s.name.as_str())
    }
}
