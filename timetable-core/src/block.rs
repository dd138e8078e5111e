//! Time block definitions: weekly templates and one-off instances.
//!
//! On the wire a block is a flat record with `repeat`, `weekday` and `date`
//! fields, exactly one of `weekday`/`date` being set depending on `repeat`.
//! In memory that rule is carried by [`Schedule`], so an invalid combination
//! cannot be represented once a block has been deserialized.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TimetableError, TimetableResult};
use crate::subject::SubjectId;
use crate::time::{MinuteOfDay, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub Uuid);

impl BlockId {
    pub fn new() -> Self {
        BlockId(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for BlockId {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(BlockId)
            .map_err(|_| TimetableError::InvalidBlock(format!("Invalid block id '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Repeat {
    Weekly,
    None,
}

/// When a block happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Schedule {
    /// Every week on this day, unbounded into the future.
    Weekly(Weekday),
    /// Exactly once, on this date.
    Once(NaiveDate),
}

impl Schedule {
    /// Build a schedule from the flat wire fields.
    pub fn from_parts(
        repeat: Repeat,
        weekday: Option<Weekday>,
        date: Option<NaiveDate>,
    ) -> TimetableResult<Self> {
        match (repeat, weekday, date) {
            (Repeat::Weekly, Some(weekday), None) => Ok(Schedule::Weekly(weekday)),
            (Repeat::None, None, Some(date)) => Ok(Schedule::Once(date)),
            (Repeat::Weekly, None, _) => Err(TimetableError::InvalidBlock(
                "Weekly block requires a weekday".into(),
            )),
            (Repeat::Weekly, Some(_), Some(_)) => Err(TimetableError::InvalidBlock(
                "Weekly block must not have a date".into(),
            )),
            (Repeat::None, _, None) => Err(TimetableError::InvalidBlock(
                "One-off block requires a date".into(),
            )),
            (Repeat::None, Some(_), Some(_)) => Err(TimetableError::InvalidBlock(
                "One-off block must not have a weekday".into(),
            )),
        }
    }

    pub fn repeat(&self) -> Repeat {
        match self {
            Schedule::Weekly(_) => Repeat::Weekly,
            Schedule::Once(_) => Repeat::None,
        }
    }

    pub fn weekday(&self) -> Option<Weekday> {
        match self {
            Schedule::Weekly(weekday) => Some(*weekday),
            Schedule::Once(_) => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Schedule::Weekly(_) => None,
            Schedule::Once(date) => Some(*date),
        }
    }

    /// Whether both schedules can ever fall on the same calendar date.
    pub fn shares_a_date_with(&self, other: &Schedule) -> bool {
        match (self, other) {
            (Schedule::Weekly(a), Schedule::Weekly(b)) => a == b,
            (Schedule::Once(a), Schedule::Once(b)) => a == b,
            (Schedule::Weekly(w), Schedule::Once(d)) | (Schedule::Once(d), Schedule::Weekly(w)) => {
                Weekday::of(*d) == *w
            }
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Schedule::Weekly(weekday) => write!(f, "every {weekday}"),
            Schedule::Once(date) => write!(f, "on {date}"),
        }
    }
}

/// Half-open `[start, end)` window within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: MinuteOfDay,
    pub end: MinuteOfDay,
}

impl Window {
    pub fn new(start: MinuteOfDay, end: MinuteOfDay) -> TimetableResult<Self> {
        if start >= end {
            return Err(TimetableError::InvalidBlock(format!(
                "Start time {start} must be before end time {end}"
            )));
        }
        Ok(Window { start, end })
    }

    pub fn contains(&self, minute: MinuteOfDay) -> bool {
        self.start <= minute && minute < self.end
    }

    pub fn overlaps(&self, other: &Window) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A stored time block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TimeBlockRecord", into = "TimeBlockRecord")]
pub struct TimeBlock {
    pub id: BlockId,
    pub subject_id: Option<SubjectId>,
    pub window: Window,
    pub note: Option<String>,
    pub schedule: Schedule,
    /// Reference-timezone date the block was created on.
    pub created_on: NaiveDate,
}

impl TimeBlock {
    pub fn from_draft(draft: BlockDraft, created_on: NaiveDate) -> Self {
        TimeBlock {
            id: BlockId::new(),
            subject_id: draft.subject_id,
            window: draft.window,
            note: draft.note,
            schedule: draft.schedule,
            created_on,
        }
    }

    /// Replace the editable fields, keeping id and creation date.
    pub fn apply(&mut self, draft: BlockDraft) {
        self.subject_id = draft.subject_id;
        self.window = draft.window;
        self.note = draft.note;
        self.schedule = draft.schedule;
    }

    pub fn start_time(&self) -> MinuteOfDay {
        self.window.start
    }

    pub fn end_time(&self) -> MinuteOfDay {
        self.window.end
    }

    pub fn is_weekly(&self) -> bool {
        matches!(self.schedule, Schedule::Weekly(_))
    }

    /// Whether this block can collide with `other` on some date.
    pub fn overlaps(&self, other: &TimeBlock) -> bool {
        self.schedule.shares_a_date_with(&other.schedule) && self.window.overlaps(&other.window)
    }
}

/// The editable part of a block, as submitted by create and update calls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BlockDraftRecord")]
pub struct BlockDraft {
    pub subject_id: Option<SubjectId>,
    pub window: Window,
    pub note: Option<String>,
    pub schedule: Schedule,
}

impl BlockDraft {
    pub fn new(
        subject_id: Option<SubjectId>,
        start: &str,
        end: &str,
        schedule: Schedule,
        note: Option<String>,
    ) -> TimetableResult<Self> {
        let start: MinuteOfDay = start.parse()?;
        let end: MinuteOfDay = end.parse()?;
        Ok(BlockDraft {
            subject_id,
            window: Window::new(start, end)?,
            note: normalize_note(note),
            schedule,
        })
    }

    pub fn weekly(weekday: Weekday, start: &str, end: &str) -> TimetableResult<Self> {
        BlockDraft::new(None, start, end, Schedule::Weekly(weekday), None)
    }

    pub fn once(date: NaiveDate, start: &str, end: &str) -> TimetableResult<Self> {
        BlockDraft::new(None, start, end, Schedule::Once(date), None)
    }

    pub fn with_subject(mut self, subject_id: SubjectId) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = normalize_note(Some(note.to_string()));
        self
    }
}

impl From<&TimeBlock> for BlockDraft {
    fn from(block: &TimeBlock) -> Self {
        BlockDraft {
            subject_id: block.subject_id,
            window: block.window,
            note: block.note.clone(),
            schedule: block.schedule,
        }
    }
}

fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// Flat wire representation of a [`TimeBlock`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeBlockRecord {
    id: BlockId,
    #[serde(default)]
    subject_id: Option<SubjectId>,
    start_time: MinuteOfDay,
    end_time: MinuteOfDay,
    #[serde(default)]
    note: Option<String>,
    repeat: Repeat,
    #[serde(default)]
    weekday: Option<Weekday>,
    #[serde(default)]
    date: Option<NaiveDate>,
    created_on: NaiveDate,
}

impl TryFrom<TimeBlockRecord> for TimeBlock {
    type Error = TimetableError;

    fn try_from(record: TimeBlockRecord) -> Result<Self, Self::Error> {
        let schedule = Schedule::from_parts(record.repeat, record.weekday, record.date)
            .map_err(|e| TimetableError::InvalidBlock(format!("block {}: {e}", record.id)))?;
        let window = Window::new(record.start_time, record.end_time)
            .map_err(|e| TimetableError::InvalidBlock(format!("block {}: {e}", record.id)))?;

        Ok(TimeBlock {
            id: record.id,
            subject_id: record.subject_id,
            window,
            note: normalize_note(record.note),
            schedule,
            created_on: record.created_on,
        })
    }
}

impl From<TimeBlock> for TimeBlockRecord {
    fn from(block: TimeBlock) -> Self {
        TimeBlockRecord {
            id: block.id,
            subject_id: block.subject_id,
            start_time: block.window.start,
            end_time: block.window.end,
            note: block.note,
            repeat: block.schedule.repeat(),
            weekday: block.schedule.weekday(),
            date: block.schedule.date(),
            created_on: block.created_on,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockDraftRecord {
    #[serde(default)]
    subject_id: Option<SubjectId>,
    start_time: MinuteOfDay,
    end_time: MinuteOfDay,
    #[serde(default)]
    note: Option<String>,
    repeat: Repeat,
    #[serde(default)]
    weekday: Option<Weekday>,
    #[serde(default)]
    date: Option<NaiveDate>,
}

impl TryFrom<BlockDraftRecord> for BlockDraft {
    type Error = TimetableError;

    fn try_from(record: BlockDraftRecord) -> Result<Self, Self::Error> {
        Ok(BlockDraft {
            subject_id: record.subject_id,
            window: Window::new(record.start_time, record.end_time)?,
            note: normalize_note(record.note),
            schedule: Schedule::from_parts(record.repeat, record.weekday, record.date)?,
        })
    }
}
