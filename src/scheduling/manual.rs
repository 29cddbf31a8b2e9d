use chrono::NaiveDateTime;
use log::info;

use super::types::SchedulerOptions;
use crate::domain::validation::find_court_conflict;
use crate::domain::{CourtId, Match, MatchId, TournamentSnapshot};
use crate::errors::{TournamentError, TournamentResult};

/// Organizer-chosen slot for a single match
#[derive(Debug, Clone)]
pub struct ManualSlot {
    pub court_id: CourtId,
    pub start: NaiveDateTime,
    /// Derived from the expected duration when absent
    pub end: Option<NaiveDateTime>,
    pub is_time_limited: Option<bool>,
    pub time_limit_minutes: Option<u32>,
}

/// Places `match_id` on the requested slot, or fails without touching anything
/// when the slot is malformed, outside the court window or double-books the court.
pub fn schedule_match(
    snapshot: &mut TournamentSnapshot,
    match_id: MatchId,
    slot: &ManualSlot,
    options: &SchedulerOptions,
) -> TournamentResult<Match> {
    let mut updated = snapshot.match_by_id(match_id)?.clone();
    let court = snapshot.court(slot.court_id)?;

    if let Some(limited) = slot.is_time_limited {
        updated.is_time_limited = limited;
    }
    if slot.time_limit_minutes.is_some() {
        updated.time_limit_minutes = slot.time_limit_minutes;
    }

    let end = match slot.end {
        Some(end) => end,
        None => slot.start + options.match_duration(&updated, snapshot.stage(updated.stage_id)),
    };

    if end <= slot.start {
        return Err(TournamentError::InvalidDateRange { start: slot.start, end });
    }

    if !court.covers(slot.start, end) {
        return Err(TournamentError::OutsideCourtAvailability {
            court_id: court.id,
            start: slot.start,
            end,
        });
    }

    if let Some(other) = find_court_conflict(&snapshot.matches, court.id, slot.start, end, Some(match_id)) {
        return Err(TournamentError::ConstraintViolation {
            court_id: court.id,
            conflicting_match_id: other.id,
            start: slot.start,
            end,
        });
    }

    updated.court_id = Some(court.id);
    updated.scheduled_start = Some(slot.start);
    updated.scheduled_end = Some(end);

    *snapshot.match_by_id_mut(match_id)? = updated.clone();
    info!("Match {} scheduled on court {} at {} - {}", match_id, slot.court_id, slot.start, end);
    Ok(updated)
}
