//! Block store: time block definitions, subjects and completion records.
//!
//! [`BlockStore`] is the collaborator surface the resolver and tracker consume.
//! It does no resolution of its own. The two bundled stores keep all data in a
//! [`Tables`] value and only differ in where that value lives; they implement
//! [`TableBackend`] and pick up [`BlockStore`] through the blanket impl below.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::block::{BlockDraft, BlockId, TimeBlock};
use crate::date_range::DateRange;
use crate::error::{TimetableError, TimetableResult};
use crate::occurrence::OccurrenceKey;
use crate::subject::{Subject, SubjectId};

/// Check run against the current tables right before a block is written.
pub type BlockCheck<'a> = dyn Fn(&TimeBlock, &Tables) -> TimetableResult<()> + 'a;

/// Check run against the stored block, if any, right before a completion
/// record for it is written.
pub type CompletionCheck<'a> = dyn Fn(Option<&TimeBlock>, NaiveDate) -> TimetableResult<()> + 'a;

/// A consistent read of everything needed to resolve one date range.
#[derive(Debug, Clone, Default)]
pub struct BlockSnapshot {
    pub weekly: Vec<TimeBlock>,
    /// One-off blocks whose date falls inside the requested range.
    pub one_off: Vec<TimeBlock>,
    pub subjects: HashMap<SubjectId, Subject>,
}

pub trait BlockStore: Send + Sync {
    fn list_weekly_blocks(&self) -> TimetableResult<Vec<TimeBlock>>;

    fn list_one_off_blocks(&self, range: DateRange) -> TimetableResult<Vec<TimeBlock>>;

    /// Weekly blocks, one-off blocks in `range` and subjects, all read from
    /// the same state.
    fn snapshot(&self, range: DateRange) -> TimetableResult<BlockSnapshot>;

    /// Completion flags for the given keys. Keys without a record are absent
    /// from the returned map.
    fn completion_records(
        &self,
        keys: &[OccurrenceKey],
    ) -> TimetableResult<HashMap<OccurrenceKey, bool>>;

    fn upsert_completion(&self, key: OccurrenceKey, done: bool) -> TimetableResult<()>;

    /// Like `upsert_completion`, but `check` sees the block under the same
    /// lock as the write and can veto it.
    fn upsert_completion_checked(
        &self,
        key: OccurrenceKey,
        done: bool,
        check: &CompletionCheck<'_>,
    ) -> TimetableResult<()>;

    fn list_blocks(&self) -> TimetableResult<Vec<TimeBlock>>;

    fn get_block(&self, id: BlockId) -> TimetableResult<Option<TimeBlock>>;

    /// Insert or replace `block` after `check` accepts it.
    fn save_block(&self, block: TimeBlock, check: &BlockCheck<'_>) -> TimetableResult<()>;

    /// Apply `draft` to the stored block `id` in one write: `check` must
    /// accept the result, and completion records whose date fails `keep`
    /// are dropped. Fails with `BlockNotFound` if the block is gone.
    /// Returns the updated block and the number of records dropped.
    fn update_block(
        &self,
        id: BlockId,
        draft: BlockDraft,
        check: &BlockCheck<'_>,
        keep: &dyn Fn(&TimeBlock, NaiveDate) -> bool,
    ) -> TimetableResult<(TimeBlock, usize)>;

    /// Delete a block together with its completion records.
    fn delete_block(&self, id: BlockId) -> TimetableResult<bool>;

    fn list_subjects(&self) -> TimetableResult<Vec<Subject>>;

    fn get_subject(&self, id: SubjectId) -> TimetableResult<Option<Subject>>;

    fn save_subject(&self, subject: Subject) -> TimetableResult<()>;

    /// Delete a subject. Blocks referencing it are kept with no subject.
    fn delete_subject(&self, id: SubjectId) -> TimetableResult<bool>;
}

/// The full data set of a store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tables {
    pub subjects: Vec<Subject>,
    pub blocks: Vec<TimeBlock>,
    pub completions: HashMap<OccurrenceKey, bool>,
}

impl Tables {
    pub fn block(&self, id: BlockId) -> Option<&TimeBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    fn snapshot(&self, range: DateRange) -> BlockSnapshot {
        let (weekly, once): (Vec<_>, Vec<_>) =
            self.blocks.iter().cloned().partition(TimeBlock::is_weekly);

        BlockSnapshot {
            weekly,
            one_off: once
                .into_iter()
                .filter(|b| b.schedule.date().is_some_and(|d| range.contains(d)))
                .collect(),
            subjects: self.subjects.iter().map(|s| (s.id, s.clone())).collect(),
        }
    }

    fn save_block(&mut self, block: TimeBlock) {
        match self.blocks.iter_mut().find(|b| b.id == block.id) {
            Some(existing) => *existing = block,
            None => self.blocks.push(block),
        }
    }

    fn delete_block(&mut self, id: BlockId) -> bool {
        let before = self.blocks.len();
        self.blocks.retain(|b| b.id != id);
        if self.blocks.len() == before {
            return false;
        }
        self.completions.retain(|key, _| key.block_id != id);
        true
    }

    fn save_subject(&mut self, subject: Subject) {
        match self.subjects.iter_mut().find(|s| s.id == subject.id) {
            Some(existing) => *existing = subject,
            None => self.subjects.push(subject),
        }
    }

    fn delete_subject(&mut self, id: SubjectId) -> bool {
        let before = self.subjects.len();
        self.subjects.retain(|s| s.id != id);
        if self.subjects.len() == before {
            return false;
        }
        for block in self.blocks.iter_mut().filter(|b| b.subject_id == Some(id)) {
            block.subject_id = None;
        }
        true
    }
}

/// Storage that can hand out its [`Tables`] for reading and writing.
///
/// `write` must apply the mutation atomically: either the closure's changes
/// are all persisted or none are.
pub trait TableBackend: Send + Sync {
    fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> TimetableResult<R>;

    fn write<R>(&self, f: impl FnOnce(&mut Tables) -> TimetableResult<R>) -> TimetableResult<R>;
}

impl<B: TableBackend> BlockStore for B {
    fn list_weekly_blocks(&self) -> TimetableResult<Vec<TimeBlock>> {
        self.read(|t| t.blocks.iter().filter(|b| b.is_weekly()).cloned().collect())
    }

    fn list_one_off_blocks(&self, range: DateRange) -> TimetableResult<Vec<TimeBlock>> {
        self.read(|t| t.snapshot(range).one_off)
    }

    fn snapshot(&self, range: DateRange) -> TimetableResult<BlockSnapshot> {
        self.read(|t| t.snapshot(range))
    }

    fn completion_records(
        &self,
        keys: &[OccurrenceKey],
    ) -> TimetableResult<HashMap<OccurrenceKey, bool>> {
        self.read(|t| {
            keys.iter()
                .filter_map(|key| t.completions.get(key).map(|done| (*key, *done)))
                .collect()
        })
    }

    fn upsert_completion(&self, key: OccurrenceKey, done: bool) -> TimetableResult<()> {
        self.write(|t| {
            t.completions.insert(key, done);
            Ok(())
        })
    }

    fn upsert_completion_checked(
        &self,
        key: OccurrenceKey,
        done: bool,
        check: &CompletionCheck<'_>,
    ) -> TimetableResult<()> {
        self.write(|t| {
            check(t.block(key.block_id), key.date)?;
            t.completions.insert(key, done);
            Ok(())
        })
    }

    fn list_blocks(&self) -> TimetableResult<Vec<TimeBlock>> {
        self.read(|t| t.blocks.clone())
    }

    fn get_block(&self, id: BlockId) -> TimetableResult<Option<TimeBlock>> {
        self.read(|t| t.block(id).cloned())
    }

    fn save_block(&self, block: TimeBlock, check: &BlockCheck<'_>) -> TimetableResult<()> {
        self.write(|t| {
            check(&block, t)?;
            t.save_block(block);
            Ok(())
        })
    }

    fn update_block(
        &self,
        id: BlockId,
        draft: BlockDraft,
        check: &BlockCheck<'_>,
        keep: &dyn Fn(&TimeBlock, NaiveDate) -> bool,
    ) -> TimetableResult<(TimeBlock, usize)> {
        self.write(|t| {
            let mut block = t.block(id).cloned().ok_or(TimetableError::BlockNotFound(id))?;
            block.apply(draft);
            check(&block, t)?;

            let before = t.completions.len();
            t.completions
                .retain(|key, _| key.block_id != id || keep(&block, key.date));
            let dropped = before - t.completions.len();

            t.save_block(block.clone());
            Ok((block, dropped))
        })
    }

    fn delete_block(&self, id: BlockId) -> TimetableResult<bool> {
        self.write(|t| Ok(t.delete_block(id)))
    }

    fn list_subjects(&self) -> TimetableResult<Vec<Subject>> {
        self.read(|t| {
            let mut subjects = t.subjects.clone();
            subjects.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            subjects
        })
    }

    fn get_subject(&self, id: SubjectId) -> TimetableResult<Option<Subject>> {
        self.read(|t| t.subject(id).cloned())
    }

    fn save_subject(&self, subject: Subject) -> TimetableResult<()> {
        self.write(|t| {
            t.save_subject(subject);
            Ok(())
        })
    }

    fn delete_subject(&self, id: SubjectId) -> TimetableResult<bool> {
        self.write(|t| Ok(t.delete_subject(id)))
    }
}

/// Map a poisoned lock into a store failure.
fn poisoned<T>(_: std::sync::PoisonError<T>) -> TimetableError {
    TimetableError::StoreUnavailable("store lock poisoned".into())
}
