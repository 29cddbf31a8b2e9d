use chrono::NaiveDateTime;
use thiserror::Error;

use crate::domain::{CourtId, GroupId, MatchId, TournamentId};

/// Errors raised by the standings engine, the scheduler and the service around them
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Invalid match ordering strategy: {0}")]
    InvalidStrategy(String),

    #[error("Invalid date range: start {start} is not before end {end}")]
    InvalidDateRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Failed to parse date/time: {0}")]
    InvalidDateTime(String),

    #[error("Invalid match {match_id}: {reason}")]
    InvalidMatch { match_id: MatchId, reason: String },

    #[error("Invalid court {court_id}: {reason}")]
    InvalidCourt { court_id: CourtId, reason: String },

    #[error("Invalid tournament data: {0}")]
    InvalidSnapshot(String),

    #[error(
        "Court {court_id} is already booked by match {conflicting_match_id} between {start} and {end}"
    )]
    ConstraintViolation {
        court_id: CourtId,
        conflicting_match_id: MatchId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Slot {start} - {end} is outside the availability window of court {court_id}")]
    OutsideCourtAvailability {
        court_id: CourtId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Tournament {0} not found")]
    TournamentNotFound(TournamentId),

    #[error("Group {0} not found")]
    GroupNotFound(GroupId),

    #[error("Match {0} not found")]
    MatchNotFound(MatchId),

    #[error("Court {0} not found")]
    CourtNotFound(CourtId),

    #[error("Tournament {tournament_id} was modified concurrently (expected version {expected}, found {found})")]
    VersionConflict {
        tournament_id: TournamentId,
        expected: u64,
        found: u64,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Coarse classification used to map errors onto transport status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TournamentError::InvalidStrategy(_)
            | TournamentError::InvalidDateRange { .. }
            | TournamentError::InvalidDateTime(_)
            | TournamentError::InvalidMatch { .. }
            | TournamentError::InvalidCourt { .. }
            | TournamentError::InvalidSnapshot(_) => ErrorKind::Validation,
            TournamentError::TournamentNotFound(_)
            | TournamentError::GroupNotFound(_)
            | TournamentError::MatchNotFound(_)
            | TournamentError::CourtNotFound(_) => ErrorKind::NotFound,
            TournamentError::ConstraintViolation { .. }
            | TournamentError::OutsideCourtAvailability { .. }
            | TournamentError::VersionConflict { .. } => ErrorKind::Conflict,
            TournamentError::Storage(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn invalid_match(match_id: MatchId, reason: impl Into<String>) -> Self {
        TournamentError::InvalidMatch {
            match_id,
            reason: reason.into(),
        }
    }
}

/// Result type for engine and service operations
pub type TournamentResult<T> = Result<T, TournamentError>;
