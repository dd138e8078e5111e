//! Occurrence resolution.
//!
//! Expands weekly templates into dated occurrences within a requested range
//! and merges them with the one-off blocks of that range. Overlapping
//! occurrences are all returned; whether overlaps are allowed is decided on
//! the write path, not here.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::block::{Schedule, TimeBlock};
use crate::date_range::DateRange;
use crate::error::{TimetableError, TimetableResult};
use crate::occurrence::Occurrence;
use crate::store::{BlockSnapshot, BlockStore};
use crate::time::Weekday;

/// Earliest date a weekly block produces occurrences on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceFloor {
    /// Every matching date, including dates before the block was created.
    #[default]
    Unbounded,
    /// Only dates on or after the block's `created_on`.
    CreatedOn,
}

impl RecurrenceFloor {
    fn first_date(self, block: &TimeBlock) -> Option<NaiveDate> {
        match self {
            RecurrenceFloor::Unbounded => None,
            RecurrenceFloor::CreatedOn => Some(block.created_on),
        }
    }
}

/// Whether `block` has an occurrence on `date`.
pub fn occurs_on(block: &TimeBlock, date: NaiveDate, floor: RecurrenceFloor) -> bool {
    match block.schedule {
        Schedule::Once(d) => d == date,
        Schedule::Weekly(weekday) => {
            Weekday::of(date) == weekday && floor.first_date(block).is_none_or(|first| date >= first)
        }
    }
}

/// Dates in `range` a weekly block occurs on.
fn weekly_dates(
    block: &TimeBlock,
    weekday: Weekday,
    range: DateRange,
    floor: RecurrenceFloor,
) -> Vec<NaiveDate> {
    let range = match floor.first_date(block) {
        Some(first) => match range.starting_no_earlier_than(first) {
            Some(r) => r,
            None => return Vec::new(),
        },
        None => range,
    };

    let from_offset = Weekday::of(range.from()).days_from_monday();
    let offset = (weekday.days_from_monday() + 7 - from_offset) % 7;

    let mut dates = Vec::new();
    let mut next = range.from().checked_add_days(Days::new(offset));
    while let Some(date) = next.filter(|d| *d <= range.to()) {
        dates.push(date);
        next = date.checked_add_days(Days::new(7));
    }
    dates
}

/// Expand a snapshot into the occurrences of `range`, sorted by date, then
/// start time, then block id. `done` is left false.
pub fn expand(
    snapshot: &BlockSnapshot,
    range: DateRange,
    floor: RecurrenceFloor,
) -> TimetableResult<Vec<Occurrence>> {
    let mut occurrences = Vec::new();

    let subject_of = |block: &TimeBlock| match block.subject_id {
        None => Ok(None),
        Some(id) => snapshot.subjects.get(&id).cloned().map(Some).ok_or_else(|| {
            TimetableError::InvalidBlock(format!("block {} references missing subject {id}", block.id))
        }),
    };

    for block in &snapshot.weekly {
        let Schedule::Weekly(weekday) = block.schedule else {
            return Err(TimetableError::InvalidBlock(format!(
                "block {} is listed as weekly but has no weekday",
                block.id
            )));
        };
        let subject = subject_of(block)?;
        for date in weekly_dates(block, weekday, range, floor) {
            occurrences.push(Occurrence::of(block, date, subject.clone()));
        }
    }

    for block in &snapshot.one_off {
        let Schedule::Once(date) = block.schedule else {
            return Err(TimetableError::InvalidBlock(format!(
                "block {} is listed as one-off but has no date",
                block.id
            )));
        };
        if range.contains(date) {
            occurrences.push(Occurrence::of(block, date, subject_of(block)?));
        }
    }

    occurrences.sort_by(|a, b| {
        (a.effective_date, a.start_time, a.source_block_id).cmp(&(
            b.effective_date,
            b.start_time,
            b.source_block_id,
        ))
    });

    Ok(occurrences)
}

pub struct Resolver<'a> {
    store: &'a dyn BlockStore,
    floor: RecurrenceFloor,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a dyn BlockStore, floor: RecurrenceFloor) -> Self {
        Resolver { store, floor }
    }

    /// All occurrences in `range`, read from one store snapshot.
    pub fn resolve(&self, range: DateRange) -> TimetableResult<Vec<Occurrence>> {
        let snapshot = self.store.snapshot(range)?;
        let occurrences = expand(&snapshot, range, self.floor)?;

        tracing::debug!(
            from = %range.from(),
            to = %range.to(),
            weekly_blocks = snapshot.weekly.len(),
            one_off_blocks = snapshot.one_off.len(),
            occurrences = occurrences.len(),
            "resolved occurrences"
        );

        Ok(occurrences)
    }

    /// Like [`Resolver::resolve`], failing with `InvalidRange` when `from > to`.
    pub fn resolve_between(&self, from: NaiveDate, to: NaiveDate) -> TimetableResult<Vec<Occurrence>> {
        self.resolve(DateRange::new(from, to)?)
    }

    pub fn resolve_day(&self, date: NaiveDate) -> TimetableResult<Vec<Occurrence>> {
        self.resolve(DateRange::day(date))
    }

    /// The Monday-to-Sunday week containing `start`.
    pub fn resolve_week(&self, start: NaiveDate) -> TimetableResult<Vec<Occurrence>> {
        self.resolve(DateRange::week_of(start)?)
    }
}
