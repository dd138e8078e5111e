//! In-memory store.

use std::sync::RwLock;

use crate::error::TimetableResult;
use crate::store::{poisoned, TableBackend, Tables};

/// Keeps everything in one [`RwLock`]. Reads see either the state before or
/// after a write, never a mix.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(tables: Tables) -> Self {
        MemoryStore {
            tables: RwLock::new(tables),
        }
    }
}

impl TableBackend for MemoryStore {
    fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> TimetableResult<R> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(f(&tables))
    }

    fn write<R>(&self, f: impl FnOnce(&mut Tables) -> TimetableResult<R>) -> TimetableResult<R> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        let mut next = tables.clone();
        let result = f(&mut next)?;
        *tables = next;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockDraft, TimeBlock};
    use crate::date_range::DateRange;
    use crate::error::TimetableError;
    use crate::occurrence::OccurrenceKey;
    use crate::store::BlockStore;
    use crate::subject::{Color, Subject};
    use crate::time::Weekday;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn accept(_: &TimeBlock, _: &Tables) -> TimetableResult<()> {
        Ok(())
    }

    fn weekly(weekday: Weekday) -> TimeBlock {
        TimeBlock::from_draft(
            BlockDraft::weekly(weekday, "08:00", "09:00").unwrap(),
            date(2024, 1, 1),
        )
    }

    fn once(d: NaiveDate) -> TimeBlock {
        TimeBlock::from_draft(BlockDraft::once(d, "10:00", "11:00").unwrap(), date(2024, 1, 1))
    }

    #[test]
    fn lists_split_weekly_and_one_off() {
        let store = MemoryStore::new();
        store.save_block(weekly(Weekday::Monday), &accept).unwrap();
        store.save_block(once(date(2024, 1, 3)), &accept).unwrap();
        store.save_block(once(date(2024, 2, 3)), &accept).unwrap();

        assert_eq!(store.list_weekly_blocks().unwrap().len(), 1);

        let january = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        let one_off = store.list_one_off_blocks(january).unwrap();
        assert_eq!(one_off.len(), 1);
        assert_eq!(one_off[0].schedule.date(), Some(date(2024, 1, 3)));
    }

    #[test]
    fn rejected_check_leaves_store_untouched() {
        let store = MemoryStore::new();
        let block = weekly(Weekday::Monday);
        let reject = |_: &TimeBlock, _: &Tables| -> TimetableResult<()> {
            Err(TimetableError::InvalidBlock("no".into()))
        };
        assert!(store.save_block(block, &reject).is_err());
        assert!(store.list_blocks().unwrap().is_empty());
    }

    #[test]
    fn deleting_block_cascades_completions() {
        let store = MemoryStore::new();
        let keep = weekly(Weekday::Monday);
        let gone = weekly(Weekday::Tuesday);
        store.save_block(keep.clone(), &accept).unwrap();
        store.save_block(gone.clone(), &accept).unwrap();

        let kept_key = OccurrenceKey::new(keep.id, date(2024, 1, 1));
        let gone_key = OccurrenceKey::new(gone.id, date(2024, 1, 2));
        store.upsert_completion(kept_key, true).unwrap();
        store.upsert_completion(gone_key, true).unwrap();

        assert!(store.delete_block(gone.id).unwrap());
        assert!(!store.delete_block(gone.id).unwrap());

        let records = store.completion_records(&[kept_key, gone_key]).unwrap();
        assert_eq!(records.get(&kept_key), Some(&true));
        assert!(!records.contains_key(&gone_key));
    }

    #[test]
    fn deleting_subject_nulls_block_reference() {
        let store = MemoryStore::new();
        let subject = Subject::new("Math", Color::default()).unwrap();
        store.save_subject(subject.clone()).unwrap();

        let mut block = weekly(Weekday::Monday);
        block.subject_id = Some(subject.id);
        store.save_block(block.clone(), &accept).unwrap();

        assert!(store.delete_subject(subject.id).unwrap());
        let stored = store.get_block(block.id).unwrap().unwrap();
        assert_eq!(stored.subject_id, None);
        assert!(store.get_subject(subject.id).unwrap().is_none());
    }

    #[test]
    fn subjects_list_sorted_by_name() {
        let store = MemoryStore::new();
        for name in ["physics", "Chemistry", "biology"] {
            store.save_subject(Subject::new(name, Color::default()).unwrap()).unwrap();
        }
        let names: Vec<_> = store
            .list_subjects()
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["biology", "Chemistry", "physics"]);
    }

    #[test]
    fn update_drops_only_unkept_records_of_that_block() {
        let store = MemoryStore::new();
        let a = weekly(Weekday::Monday);
        let b = weekly(Weekday::Monday);
        store.save_block(a.clone(), &accept).unwrap();
        store.save_block(b.clone(), &accept).unwrap();
        let a1 = OccurrenceKey::new(a.id, date(2024, 1, 1));
        let a2 = OccurrenceKey::new(a.id, date(2024, 1, 8));
        let b1 = OccurrenceKey::new(b.id, date(2024, 1, 1));
        for key in [a1, a2, b1] {
            store.upsert_completion(key, true).unwrap();
        }

        let draft = BlockDraft::weekly(Weekday::Monday, "10:00", "11:00").unwrap();
        let (updated, dropped) = store
            .update_block(a.id, draft, &accept, &|_, d| d >= date(2024, 1, 8))
            .unwrap();
        assert_eq!(dropped, 1);
        assert_eq!(updated.id, a.id);
        assert_eq!(store.get_block(a.id).unwrap(), Some(updated));
        let records = store.completion_records(&[a1, a2, b1]).unwrap();
        assert_eq!(records.len(), 2);
        assert!(!records.contains_key(&a1));
    }

    #[test]
    fn update_of_missing_block_saves_nothing() {
        let store = MemoryStore::new();
        let ghost = weekly(Weekday::Monday);
        let draft = BlockDraft::from(&ghost);

        let err = store
            .update_block(ghost.id, draft, &accept, &|_, _| true)
            .unwrap_err();
        assert!(matches!(err, TimetableError::BlockNotFound(id) if id == ghost.id));
        assert!(store.list_blocks().unwrap().is_empty());
    }
}
