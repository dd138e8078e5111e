//! Top-level handle tying configuration, storage and the reference clock
//! together.

use chrono::NaiveDate;

use crate::block::{BlockDraft, BlockId, TimeBlock};
use crate::config::TimetableConfig;
use crate::date_range::DateRange;
use crate::error::{TimetableError, TimetableResult};
use crate::occurrence::Occurrence;
use crate::query::{QueryFacade, TodayView, WeekView};
use crate::resolver::{occurs_on, RecurrenceFloor};
use crate::store::{BlockStore, FileStore, Tables};
use crate::subject::{Color, Subject, SubjectId};
use crate::time::ReferenceClock;

pub struct Timetable {
    store: Box<dyn BlockStore>,
    clock: ReferenceClock,
    floor: RecurrenceFloor,
    reject_overlaps: bool,
}

impl Timetable {
    pub fn new(store: impl BlockStore + 'static, clock: ReferenceClock) -> Self {
        Timetable {
            store: Box::new(store),
            clock,
            floor: RecurrenceFloor::default(),
            reject_overlaps: false,
        }
    }

    pub fn with_floor(mut self, floor: RecurrenceFloor) -> Self {
        self.floor = floor;
        self
    }

    pub fn with_overlap_rejection(mut self, reject: bool) -> Self {
        self.reject_overlaps = reject;
        self
    }

    /// Open the file store described by `config`, reading the system clock.
    pub fn open(config: &TimetableConfig) -> TimetableResult<Self> {
        let store = FileStore::open(config.data_path())?;
        let clock = ReferenceClock::system(config.timezone()?);

        tracing::debug!(
            data_dir = %config.data_path().display(),
            timezone = %clock.timezone(),
            floor = ?config.recurrence_floor,
            "opened timetable"
        );

        Ok(Timetable::new(store, clock)
            .with_floor(config.recurrence_floor)
            .with_overlap_rejection(config.reject_overlaps))
    }

    /// Load the user's configuration and open the timetable it points at.
    pub fn load() -> TimetableResult<Self> {
        Self::open(&TimetableConfig::load()?)
    }

    pub fn clock(&self) -> &ReferenceClock {
        &self.clock
    }

    pub fn store(&self) -> &dyn BlockStore {
        self.store.as_ref()
    }

    fn query(&self) -> QueryFacade<'_> {
        QueryFacade::new(self.store.as_ref(), self.floor, &self.clock)
    }

    // READS:

    pub fn today(&self) -> TimetableResult<TodayView> {
        self.query().get_today()
    }

    pub fn week(&self, start: Option<NaiveDate>) -> TimetableResult<WeekView> {
        self.query().get_week(start)
    }

    pub fn occurrences(&self, range: DateRange) -> TimetableResult<Vec<Occurrence>> {
        self.query().occurrences(range)
    }

    // COMPLETION:

    /// Mark the occurrence of `block_id` on `date` (today when `None`).
    pub fn toggle_completion(
        &self,
        block_id: BlockId,
        date: Option<NaiveDate>,
        done: bool,
    ) -> TimetableResult<NaiveDate> {
        let date = date.unwrap_or_else(|| self.clock.today());
        self.query().toggle_completion(block_id, date, done)?;
        Ok(date)
    }

    // BLOCKS:

    pub fn list_blocks(&self) -> TimetableResult<Vec<TimeBlock>> {
        let mut blocks = self.store.list_blocks()?;
        blocks.sort_by_key(|b| (b.schedule.date(), b.schedule.weekday(), b.start_time(), b.id));
        Ok(blocks)
    }

    pub fn get_block(&self, id: BlockId) -> TimetableResult<TimeBlock> {
        self.store
            .get_block(id)?
            .ok_or(TimetableError::BlockNotFound(id))
    }

    pub fn create_block(&self, draft: BlockDraft) -> TimetableResult<TimeBlock> {
        let block = TimeBlock::from_draft(draft, self.clock.today());
        self.store
            .save_block(block.clone(), &|b: &TimeBlock, t: &Tables| self.check_block(b, t))?;

        tracing::info!(block = %block.id, schedule = %block.schedule, window = %block.window, "created time block");
        Ok(block)
    }

    /// Replace a block's editable fields. Completion records for dates the
    /// block no longer occurs on are dropped.
    pub fn update_block(&self, id: BlockId, draft: BlockDraft) -> TimetableResult<TimeBlock> {
        let floor = self.floor;
        let (block, dropped) = self.store.update_block(
            id,
            draft,
            &|b: &TimeBlock, t: &Tables| self.check_block(b, t),
            &|b: &TimeBlock, date: NaiveDate| occurs_on(b, date, floor),
        )?;

        tracing::info!(block = %id, dropped_completions = dropped, "updated time block");
        Ok(block)
    }

    pub fn delete_block(&self, id: BlockId) -> TimetableResult<()> {
        if !self.store.delete_block(id)? {
            return Err(TimetableError::BlockNotFound(id));
        }
        tracing::info!(block = %id, "deleted time block");
        Ok(())
    }

    /// Write-path validation: the subject must exist and, when enabled, the
    /// block must not overlap any other block.
    fn check_block(&self, block: &TimeBlock, tables: &Tables) -> TimetableResult<()> {
        if let Some(subject_id) = block.subject_id {
            if tables.subject(subject_id).is_none() {
                return Err(TimetableError::SubjectNotFound(subject_id));
            }
        }

        if !self.reject_overlaps {
            return Ok(());
        }

        let existing = tables
            .blocks
            .iter()
            .find(|other| other.id != block.id && other.overlaps(block));
        if let Some(existing) = existing {
            tracing::warn!(block = %block.id, existing = %existing.id, "rejected overlapping block");
            return Err(TimetableError::Overlap {
                existing: existing.id,
                window: format!("{} {}", existing.schedule, existing.window),
            });
        }

        Ok(())
    }

    // SUBJECTS:

    pub fn list_subjects(&self) -> TimetableResult<Vec<Subject>> {
        self.store.list_subjects()
    }

    pub fn create_subject(&self, name: &str, color: Color) -> TimetableResult<Subject> {
        let subject = Subject::new(name, color)?;
        self.store.save_subject(subject.clone())?;
        tracing::info!(subject = %subject.id, name = %subject.name, "created subject");
        Ok(subject)
    }

    pub fn update_subject(
        &self,
        id: SubjectId,
        name: Option<&str>,
        color: Option<Color>,
    ) -> TimetableResult<Subject> {
        let mut subject = self
            .store
            .get_subject(id)?
            .ok_or(TimetableError::SubjectNotFound(id))?;
        subject.apply(name, color)?;
        self.store.save_subject(subject.clone())?;
        Ok(subject)
    }

    pub fn delete_subject(&self, id: SubjectId) -> TimetableResult<()> {
        if !self.store.delete_subject(id)? {
            return Err(TimetableError::SubjectNotFound(id));
        }
        tracing::info!(subject = %id, "deleted subject");
        Ok(())
    }
}
