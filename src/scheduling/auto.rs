use std::collections::HashMap;

use log::info;

use super::ordering::{apply_ordering, plan};
use super::types::{AutoScheduleOutcome, OrderedMatch, PlanningWindow, SchedulerOptions};
use crate::domain::{MatchId, MatchOrderingStrategy, TournamentSnapshot};
use crate::errors::{TournamentError, TournamentResult};

/// Orders pending matches and assigns court and time to the unscheduled ones
/// inside `window`. Matches that fit in no court window stay unscheduled and
/// are listed in the outcome's `unresolved`.
pub fn auto_schedule_matches(
    snapshot: &TournamentSnapshot,
    strategy: MatchOrderingStrategy,
    window: PlanningWindow,
    options: &SchedulerOptions,
) -> TournamentResult<AutoScheduleOutcome> {
    if window.start >= window.end {
        return Err(TournamentError::InvalidDateRange {
            start: window.start,
            end: window.end,
        });
    }

    let ordering = plan(snapshot, strategy, options, Some(window));
    let scheduled: Vec<MatchId> = ordering
        .ordered
        .iter()
        .filter(|o| o.is_placed() && !o.pre_scheduled)
        .map(|o| o.match_id)
        .collect();

    info!(
        "Auto-schedule for tournament {}: {} matches placed, {} unresolved",
        snapshot.tournament_id,
        scheduled.len(),
        ordering.unresolved.len()
    );

    Ok(AutoScheduleOutcome { ordering, scheduled })
}

/// Writes ordering fields and the newly assigned slots onto the snapshot
pub fn apply_schedule(snapshot: &mut TournamentSnapshot, outcome: &AutoScheduleOutcome) {
    apply_ordering(snapshot, &outcome.ordering);

    let placed: HashMap<MatchId, &OrderedMatch> = outcome
        .ordering
        .ordered
        .iter()
        .filter(|o| outcome.scheduled.contains(&o.match_id))
        .map(|o| (o.match_id, o))
        .collect();

    for m in snapshot.matches.iter_mut() {
        if let Some(slot) = placed.get(&m.id) {
            m.court_id = slot.court_id;
            m.scheduled_start = slot.scheduled_start;
            m.scheduled_end = slot.scheduled_end;
        }
    }
}
