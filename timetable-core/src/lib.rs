//! Core of the study timetable.
//!
//! Users keep weekly time blocks (templates) and one-off dated blocks, each
//! optionally tied to a subject. This crate answers "what is on my schedule
//! for this date or week" and "what is completed":
//! - `resolver` expands templates into dated occurrences for a range
//! - `completion` tracks done/not-done per occurrence, not per template
//! - `query` composes both into today's and a week's view
//! - `timetable` wires config, storage and the reference clock together

pub mod block;
pub mod completion;
pub mod config;
pub mod date_range;
pub mod error;
pub mod occurrence;
pub mod query;
pub mod resolver;
pub mod store;
pub mod subject;
pub mod time;
pub mod timetable;

pub use block::{BlockDraft, BlockId, Repeat, Schedule, TimeBlock, Window};
pub use date_range::DateRange;
pub use error::{TimetableError, TimetableResult};
pub use occurrence::{Occurrence, OccurrenceKey};
pub use query::{Bucket, DayView, Progress, TodayView, WeekView};
pub use resolver::RecurrenceFloor;
pub use subject::{Color, Subject, SubjectId};
pub use time::{MinuteOfDay, ReferenceClock, Weekday};
pub use timetable::Timetable;
