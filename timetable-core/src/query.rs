//! Read operations for callers: today's plan and a week's plan.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::block::BlockId;
use crate::completion::CompletionTracker;
use crate::date_range::DateRange;
use crate::error::TimetableResult;
use crate::occurrence::{Occurrence, OccurrenceKey};
use crate::resolver::{RecurrenceFloor, Resolver};
use crate::store::BlockStore;
use crate::time::{MinuteOfDay, ReferenceClock, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// `round(completed / total * 100)`, 0 when there is nothing scheduled.
    pub percent: u8,
}

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            // Half rounds up.
            ((200 * completed + total) / (2 * total)).min(100) as u8
        };
        Progress {
            completed,
            total,
            percent,
        }
    }

    pub fn of(occurrences: &[Occurrence]) -> Self {
        let completed = occurrences.iter().filter(|o| o.done).count();
        Progress::new(completed, occurrences.len())
    }
}

/// Where an occurrence sits on today's board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Ongoing,
    /// Not done and not running right now. Occurrences that already ended
    /// without being completed stay here.
    Upcoming,
    Done,
}

impl Bucket {
    pub fn classify(occurrence: &Occurrence, now: MinuteOfDay) -> Self {
        if occurrence.done {
            Bucket::Done
        } else if occurrence.window().contains(now) {
            Bucket::Ongoing
        } else {
            Bucket::Upcoming
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayView {
    pub date: NaiveDate,
    pub now: MinuteOfDay,
    pub occurrences: Vec<Occurrence>,
    pub ongoing: Vec<Occurrence>,
    pub upcoming: Vec<Occurrence>,
    pub done: Vec<Occurrence>,
    pub progress: Progress,
}

impl TodayView {
    fn build(date: NaiveDate, now: MinuteOfDay, occurrences: Vec<Occurrence>) -> Self {
        let mut ongoing = Vec::new();
        let mut upcoming = Vec::new();
        let mut done = Vec::new();

        for occurrence in &occurrences {
            match Bucket::classify(occurrence, now) {
                Bucket::Ongoing => ongoing.push(occurrence.clone()),
                Bucket::Upcoming => upcoming.push(occurrence.clone()),
                Bucket::Done => done.push(occurrence.clone()),
            }
        }

        TodayView {
            date,
            now,
            progress: Progress::of(&occurrences),
            occurrences,
            ongoing,
            upcoming,
            done,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub occurrences: Vec<Occurrence>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekView {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    /// Seven entries, Monday first.
    pub days: Vec<DayView>,
    pub progress: Progress,
}

impl WeekView {
    fn build(week_start: NaiveDate, occurrences: Vec<Occurrence>) -> Self {
        let progress = Progress::of(&occurrences);
        let mut days: Vec<DayView> = (0..7)
            .map(|offset| {
                let date = week_start + Days::new(offset);
                DayView {
                    date,
                    weekday: Weekday::of(date),
                    occurrences: Vec::new(),
                }
            })
            .collect();

        for occurrence in occurrences {
            let index = (occurrence.effective_date - week_start).num_days() as usize;
            if let Some(day) = days.get_mut(index) {
                day.occurrences.push(occurrence);
            }
        }

        WeekView {
            week_start,
            week_end: week_start + Days::new(6),
            days,
            progress,
        }
    }

    /// All occurrences of the week in date/start order.
    pub fn occurrences(&self) -> impl Iterator<Item = &Occurrence> {
        self.days.iter().flat_map(|d| d.occurrences.iter())
    }
}

/// Composes the resolver and the completion tracker for the caller-facing
/// reads and the completion toggle.
pub struct QueryFacade<'a> {
    resolver: Resolver<'a>,
    tracker: CompletionTracker<'a>,
    clock: &'a ReferenceClock,
}

impl<'a> QueryFacade<'a> {
    pub fn new(store: &'a dyn BlockStore, floor: RecurrenceFloor, clock: &'a ReferenceClock) -> Self {
        QueryFacade {
            resolver: Resolver::new(store, floor),
            tracker: CompletionTracker::new(store, floor),
            clock,
        }
    }

    /// Resolved and annotated occurrences of `range`.
    pub fn occurrences(&self, range: DateRange) -> TimetableResult<Vec<Occurrence>> {
        self.tracker.annotate(self.resolver.resolve(range)?)
    }

    pub fn get_today(&self) -> TimetableResult<TodayView> {
        let today = self.clock.today();
        let now = self.clock.current_minute_of_day();
        let occurrences = self.occurrences(DateRange::day(today))?;
        Ok(TodayView::build(today, now, occurrences))
    }

    /// The week containing `start`, or the current week when `None`.
    pub fn get_week(&self, start: Option<NaiveDate>) -> TimetableResult<WeekView> {
        let anchor = match start {
            Some(date) => date,
            None => self.clock.week_start()?,
        };
        let week = DateRange::week_of(anchor)?;
        let occurrences = self.occurrences(week)?;
        Ok(WeekView::build(week.from(), occurrences))
    }

    pub fn toggle_completion(&self, block_id: BlockId, date: NaiveDate, done: bool) -> TimetableResult<()> {
        self.tracker.set_done(OccurrenceKey::new(block_id, date), done)
    }

    pub fn is_done(&self, block_id: BlockId, date: NaiveDate) -> TimetableResult<bool> {
        self.tracker.is_done(OccurrenceKey::new(block_id, date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockDraft, TimeBlock};
    use crate::error::TimetableError;
    use crate::store::{MemoryStore, Tables};
    use crate::subject::{Color, Subject};
    use crate::time::DEFAULT_TIMEZONE;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Reference-timezone wall time on 2024-01-01 (a Monday).
    fn monday_at(hour: u32, minute: u32) -> ReferenceClock {
        let local = DEFAULT_TIMEZONE
            .with_ymd_and_hms(2024, 1, 1, hour, minute, 0)
            .unwrap();
        ReferenceClock::fixed(DEFAULT_TIMEZONE, local.with_timezone(&Utc))
    }

    fn math_store() -> (MemoryStore, TimeBlock) {
        let math = Subject::new("Math", "#4F46E5".parse::<Color>().unwrap()).unwrap();
        let block = TimeBlock::from_draft(
            BlockDraft::weekly(Weekday::Monday, "08:00", "09:30")
                .unwrap()
                .with_subject(math.id),
            date(2024, 1, 1),
        );
        let store = MemoryStore::with_tables(Tables {
            subjects: vec![math],
            blocks: vec![block.clone()],
            ..Tables::default()
        });
        (store, block)
    }

    #[test]
    fn percent_rounds() {
        assert_eq!(Progress::new(0, 0).percent, 0);
        assert_eq!(Progress::new(3, 4).percent, 75);
        assert_eq!(Progress::new(1, 3).percent, 33);
        assert_eq!(Progress::new(2, 3).percent, 67);
        assert_eq!(Progress::new(1, 8).percent, 13);
        assert_eq!(Progress::new(4, 4).percent, 100);
    }

    #[test]
    fn today_moves_ongoing_block_to_done_after_toggle() {
        let (store, block) = math_store();
        let clock = monday_at(8, 30);
        let facade = QueryFacade::new(&store, RecurrenceFloor::Unbounded, &clock);

        let before = facade.get_today().unwrap();
        assert_eq!(before.date, date(2024, 1, 1));
        assert_eq!(before.now.to_string(), "08:30");
        assert_eq!(before.ongoing.len(), 1);
        assert_eq!(before.ongoing[0].source_block_id, block.id);
        assert!(before.done.is_empty());
        assert_eq!(before.progress, Progress::new(0, 1));

        facade.toggle_completion(block.id, date(2024, 1, 1), true).unwrap();

        let after = facade.get_today().unwrap();
        assert!(after.ongoing.is_empty());
        assert_eq!(after.done.len(), 1);
        assert_eq!(after.progress.percent, 100);
    }

    #[test]
    fn past_unfinished_occurrence_is_upcoming() {
        let (store, _) = math_store();
        let clock = monday_at(10, 0);
        let facade = QueryFacade::new(&store, RecurrenceFloor::Unbounded, &clock);

        let today = facade.get_today().unwrap();
        assert!(today.ongoing.is_empty());
        assert_eq!(today.upcoming.len(), 1);
    }

    #[test]
    fn end_minute_is_exclusive_for_ongoing() {
        let (store, _) = math_store();
        let clock = monday_at(9, 30);
        let facade = QueryFacade::new(&store, RecurrenceFloor::Unbounded, &clock);
        assert!(facade.get_today().unwrap().ongoing.is_empty());
    }

    #[test]
    fn week_defaults_to_current_monday_and_has_seven_days() {
        let (store, block) = math_store();
        // Wednesday 2024-01-10 in the reference timezone.
        let local = DEFAULT_TIMEZONE.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let clock = ReferenceClock::fixed(DEFAULT_TIMEZONE, local.with_timezone(&Utc));
        let facade = QueryFacade::new(&store, RecurrenceFloor::Unbounded, &clock);

        let week = facade.get_week(None).unwrap();
        assert_eq!(week.week_start, date(2024, 1, 8));
        assert_eq!(week.week_end, date(2024, 1, 14));
        assert_eq!(week.days.len(), 7);
        assert_eq!(week.days[0].weekday, Weekday::Monday);
        assert_eq!(week.days[0].occurrences.len(), 1);
        assert!(week.days[1..].iter().all(|d| d.occurrences.is_empty()));
        assert_eq!(week.occurrences().next().unwrap().source_block_id, block.id);
    }

    #[test]
    fn week_anchor_is_normalized_and_completion_is_per_week() {
        let (store, block) = math_store();
        let clock = monday_at(7, 0);
        let facade = QueryFacade::new(&store, RecurrenceFloor::Unbounded, &clock);

        facade.toggle_completion(block.id, date(2024, 1, 1), true).unwrap();

        let first = facade.get_week(Some(date(2024, 1, 5))).unwrap();
        assert_eq!(first.week_start, date(2024, 1, 1));
        assert_eq!(first.progress, Progress::new(1, 1));

        let second = facade.get_week(Some(date(2024, 1, 8))).unwrap();
        assert_eq!(second.progress, Progress::new(0, 1));
        assert!(!facade.is_done(block.id, date(2024, 1, 8)).unwrap());
    }

    #[test]
    fn toggle_on_wrong_weekday_is_unknown_occurrence() {
        let (store, block) = math_store();
        let clock = monday_at(7, 0);
        let facade = QueryFacade::new(&store, RecurrenceFloor::Unbounded, &clock);
        let err = facade
            .toggle_completion(block.id, date(2024, 1, 2), true)
            .unwrap_err();
        assert!(matches!(err, TimetableError::UnknownOccurrence { .. }));
    }

    #[test]
    fn today_view_serializes_with_wire_names() {
        let (store, _) = math_store();
        let clock = monday_at(8, 30);
        let facade = QueryFacade::new(&store, RecurrenceFloor::Unbounded, &clock);

        let json = serde_json::to_value(facade.get_today().unwrap()).unwrap();
        assert_eq!(json["date"], "2024-01-01");
        assert_eq!(json["now"], "08:30");
        assert_eq!(json["progress"]["percent"], 0);
        let first = &json["ongoing"][0];
        assert_eq!(first["startTime"], "08:00");
        assert_eq!(first["endTime"], "09:30");
        assert_eq!(first["effectiveDate"], "2024-01-01");
        assert_eq!(first["subject"]["name"], "Math");
        assert_eq!(first["done"], false);
    }
}
