use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;

use super::models::*;
use crate::errors::{TournamentError, TournamentResult};

/// Half-open interval intersection: `[a_start, a_end)` against `[b_start, b_end)`
pub fn overlaps(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// First match other than `exclude` booked on `court_id` whose slot intersects `[start, end)`
pub fn find_court_conflict<'a>(
    matches: &'a [Match],
    court_id: CourtId,
    start: NaiveDateTime,
    end: NaiveDateTime,
    exclude: Option<MatchId>,
) -> Option<&'a Match> {
    matches.iter().find(|m| {
        if Some(m.id) == exclude {
            return false;
        }
        match m.slot() {
            Some((court, s, e)) => court == court_id && overlaps(start, end, s, e),
            None => false,
        }
    })
}

pub fn validate_couple(couple: &Couple) -> TournamentResult<()> {
    if couple.first_player_id == couple.second_player_id {
        return Err(TournamentError::InvalidSnapshot(format!(
            "couple {} lists player {} twice",
            couple.id, couple.first_player_id
        )));
    }
    Ok(())
}

pub fn validate_court(court: &Court) -> TournamentResult<()> {
    if court.availability_start >= court.availability_end {
        return Err(TournamentError::InvalidCourt {
            court_id: court.id,
            reason: "availability_start must be before availability_end".to_string(),
        });
    }
    Ok(())
}

pub fn validate_match(m: &Match) -> TournamentResult<()> {
    if m.couple1_id == m.couple2_id {
        return Err(TournamentError::invalid_match(m.id, "a couple cannot play itself"));
    }

    if let Some(winner) = m.winner_couple_id {
        if !m.involves(winner) {
            return Err(TournamentError::invalid_match(
                m.id,
                format!("winner {} is not one of the match couples", winner),
            ));
        }
    }

    if m.group_id.is_some() && m.bracket_id.is_some() {
        return Err(TournamentError::invalid_match(
            m.id,
            "a match belongs to a group or a bracket, not both",
        ));
    }

    if let (Some(start), Some(end)) = (m.scheduled_start, m.scheduled_end) {
        if end <= start {
            return Err(TournamentError::invalid_match(
                m.id,
                "scheduled_end must be after scheduled_start",
            ));
        }
    }

    validate_games(m)
}

fn validate_games(m: &Match) -> TournamentResult<()> {
    let mut numbers = HashSet::new();
    for game in &m.games {
        if game.game_number == 0 || !numbers.insert(game.game_number) {
            return Err(TournamentError::invalid_match(
                m.id,
                format!("game number {} is not a unique 1-based number", game.game_number),
            ));
        }
        if let Some(winner) = game.winner_id {
            if !m.involves(winner) {
                return Err(TournamentError::invalid_match(
                    m.id,
                    format!("game {} winner {} did not play the match", game.game_number, winner),
                ));
            }
        }
    }
    Ok(())
}

/// Checks every invariant of the domain model over a whole snapshot
pub fn validate_snapshot(snapshot: &TournamentSnapshot) -> TournamentResult<()> {
    let mut player_owner: HashMap<PlayerId, CoupleId> = HashMap::new();
    for couple in &snapshot.couples {
        validate_couple(couple)?;
        for player in [couple.first_player_id, couple.second_player_id] {
            if let Some(other) = player_owner.insert(player, couple.id) {
                return Err(TournamentError::InvalidSnapshot(format!(
                    "player {} belongs to couples {} and {}",
                    player, other, couple.id
                )));
            }
        }
    }

    for court in &snapshot.courts {
        validate_court(court)?;
    }

    for group in &snapshot.groups {
        let unique: HashSet<_> = group.couple_ids.iter().collect();
        if unique.len() != group.couple_ids.len() {
            return Err(TournamentError::InvalidSnapshot(format!(
                "group {} lists a couple more than once",
                group.id
            )));
        }
    }

    let mut seen = HashSet::new();
    for m in &snapshot.matches {
        if !seen.insert(m.id) {
            return Err(TournamentError::invalid_match(m.id, "duplicate match id"));
        }
        validate_match(m)?;
    }

    for m in &snapshot.matches {
        if let Some((court, start, end)) = m.slot() {
            if let Some(other) = find_court_conflict(&snapshot.matches, court, start, end, Some(m.id)) {
                return Err(TournamentError::ConstraintViolation {
                    court_id: court,
                    conflicting_match_id: other.id,
                    start,
                    end,
                });
            }
        }
    }

    Ok(())
}
