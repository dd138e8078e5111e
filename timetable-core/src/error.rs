//! Error types for the timetable engine.

use chrono::NaiveDate;
use thiserror::Error;

use crate::block::BlockId;
use crate::subject::SubjectId;

/// Errors that can occur in timetable operations.
#[derive(Error, Debug)]
pub enum TimetableError {
    /// `from > to`, or a date/time string that could not be parsed.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid time block: {0}")]
    InvalidBlock(String),

    #[error("Invalid subject: {0}")]
    InvalidSubject(String),

    #[error("No occurrence of block {block_id} on {date}")]
    UnknownOccurrence { block_id: BlockId, date: NaiveDate },

    #[error("Time block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("Subject not found: {0}")]
    SubjectNotFound(SubjectId),

    #[error("Time block overlaps block {existing} ({window})")]
    Overlap { existing: BlockId, window: String },

    /// Collaborator I/O failure. Never retried here.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TimetableError {
    /// True for errors caused by caller input rather than by the store.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            TimetableError::InvalidRange(_)
                | TimetableError::InvalidBlock(_)
                | TimetableError::InvalidSubject(_)
        )
    }
}

/// Result type alias for timetable operations.
pub type TimetableResult<T> = Result<T, TimetableError>;
