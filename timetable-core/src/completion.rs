//! Per-occurrence completion tracking.
//!
//! Completion is keyed by `(block_id, date)` and stored sparsely: a missing
//! record means "not done". Templates are never touched, so marking one
//! Monday done leaves every other Monday alone.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::block::TimeBlock;
use crate::error::{TimetableError, TimetableResult};
use crate::occurrence::{Occurrence, OccurrenceKey};
use crate::resolver::{occurs_on, RecurrenceFloor};
use crate::store::BlockStore;

pub struct CompletionTracker<'a> {
    store: &'a dyn BlockStore,
    floor: RecurrenceFloor,
}

impl<'a> CompletionTracker<'a> {
    pub fn new(store: &'a dyn BlockStore, floor: RecurrenceFloor) -> Self {
        CompletionTracker { store, floor }
    }

    /// Record whether the occurrence `key` is done.
    ///
    /// Fails with `UnknownOccurrence` if the block is gone or has no
    /// occurrence on that date; no record is written in that case. The
    /// check and the write happen under one store lock.
    pub fn set_done(&self, key: OccurrenceKey, done: bool) -> TimetableResult<()> {
        let floor = self.floor;
        let written = self.store.upsert_completion_checked(
            key,
            done,
            &|block: Option<&TimeBlock>, date: NaiveDate| match block {
                Some(block) if occurs_on(block, date, floor) => Ok(()),
                _ => Err(TimetableError::UnknownOccurrence {
                    block_id: key.block_id,
                    date,
                }),
            },
        );

        match written {
            Ok(()) => {
                tracing::info!(%key, done, "completion updated");
                Ok(())
            }
            Err(err @ TimetableError::UnknownOccurrence { .. }) => {
                tracing::warn!(%key, "rejected completion toggle for unknown occurrence");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    pub fn is_done(&self, key: OccurrenceKey) -> TimetableResult<bool> {
        Ok(self
            .store
            .completion_records(&[key])?
            .get(&key)
            .copied()
            .unwrap_or(false))
    }

    /// Fill in `done` for every occurrence with a single store lookup.
    pub fn annotate(&self, mut occurrences: Vec<Occurrence>) -> TimetableResult<Vec<Occurrence>> {
        let keys: Vec<OccurrenceKey> = occurrences.iter().map(Occurrence::key).collect();
        let records: HashMap<OccurrenceKey, bool> = self.store.completion_records(&keys)?;

        for occurrence in &mut occurrences {
            occurrence.done = records.get(&occurrence.key()).copied().unwrap_or(false);
        }
        Ok(occurrences)
    }
}
