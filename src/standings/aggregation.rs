use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use crate::domain::{CoupleId, CoupleStats, Match, MatchResultStatus, ScoringSystem, Side};

/// Outcome of a finished match from one couple's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Won,
    Lost,
    Drawn,
}

/// Aggregates per-couple statistics from the supplied matches.
///
/// Every couple appearing in any match gets a row, even if none of its
/// matches are completed yet. Rows come back sorted by couple id with
/// `position` unassigned (0); see [`super::rank_standings`].
pub fn compute_standings(matches: &[Match], scoring: &ScoringSystem) -> Vec<CoupleStats> {
    aggregate(matches.iter(), scoring, &BTreeSet::new())
}

/// Same as [`compute_standings`] restricted to a group roster.
///
/// Matches involving a couple outside `roster` are excluded and reported as
/// data-integrity warnings. Roster couples without matches still get a zero row.
/// An empty roster disables the filter.
pub fn compute_roster_standings(
    matches: &[Match],
    scoring: &ScoringSystem,
    roster: &BTreeSet<CoupleId>,
) -> Vec<CoupleStats> {
    if roster.is_empty() {
        return compute_standings(matches, scoring);
    }

    let eligible = matches.iter().filter(|m| {
        let inside = roster.contains(&m.couple1_id) && roster.contains(&m.couple2_id);
        if !inside {
            warn!(
                "Match {} references couples {} / {} outside the group roster, excluded from standings",
                m.id, m.couple1_id, m.couple2_id
            );
        }
        inside
    });

    aggregate(eligible, scoring, roster)
}

fn aggregate<'a>(
    matches: impl Iterator<Item = &'a Match>,
    scoring: &ScoringSystem,
    roster: &BTreeSet<CoupleId>,
) -> Vec<CoupleStats> {
    let mut table: BTreeMap<CoupleId, CoupleStats> = roster
        .iter()
        .map(|&id| (id, CoupleStats::new(id)))
        .collect();

    for m in matches {
        for couple_id in m.couples() {
            table.entry(couple_id).or_insert_with(|| CoupleStats::new(couple_id));
        }

        if !counts_towards_standings(m) {
            continue;
        }

        for couple_id in m.couples() {
            if let Some(stats) = table.get_mut(&couple_id) {
                apply_match(stats, m, couple_id, scoring);
            }
        }
    }

    table.into_values().map(finalize).collect()
}

/// Completed matches count; a winner outside the match is an integrity problem and is skipped
fn counts_towards_standings(m: &Match) -> bool {
    if m.match_result_status != MatchResultStatus::Completed {
        return false;
    }

    match m.winner_couple_id {
        Some(winner) if !m.involves(winner) => {
            warn!(
                "Match {} names winner {} who did not play it, excluded from standings",
                m.id, winner
            );
            false
        }
        _ => true,
    }
}

fn outcome_for(m: &Match, couple_id: CoupleId) -> Outcome {
    match m.winner_couple_id {
        Some(winner) if winner == couple_id => Outcome::Won,
        Some(_) => Outcome::Lost,
        None => Outcome::Drawn,
    }
}

fn apply_match(stats: &mut CoupleStats, m: &Match, couple_id: CoupleId, scoring: &ScoringSystem) {
    let Some(side) = m.side_of(couple_id) else {
        return;
    };

    stats.matches_played += 1;
    let outcome = outcome_for(m, couple_id);
    match outcome {
        Outcome::Won => stats.matches_won += 1,
        Outcome::Lost => stats.matches_lost += 1,
        Outcome::Drawn => stats.matches_drawn += 1,
    }

    let (won, lost) = games_for_side(m, side);
    stats.games_won += won;
    stats.games_lost += lost;

    stats.total_points += match outcome {
        Outcome::Won => scoring.win,
        Outcome::Lost => scoring.loss,
        Outcome::Drawn => scoring.draw,
    };

    if scoring.counts_game_points() {
        stats.total_points +=
            i64::from(won) * scoring.game_win + i64::from(lost) * scoring.game_loss;
    }

    debug!(
        "Match {}: couple {} {:?}, games {}-{}",
        m.id, couple_id, outcome, won, lost
    );
}

fn games_for_side(m: &Match, side: Side) -> (u32, u32) {
    m.games.iter().fold((0, 0), |(won, lost), game| match side {
        Side::First => (won + game.couple1_score, lost + game.couple2_score),
        Side::Second => (won + game.couple2_score, lost + game.couple1_score),
    })
}

fn finalize(mut stats: CoupleStats) -> CoupleStats {
    stats.games_diff = i64::from(stats.games_won) - i64::from(stats.games_lost);
    stats.win_percentage = win_percentage(stats.matches_won, stats.matches_played);
    stats
}

fn win_percentage(won: u32, played: u32) -> f64 {
    if played == 0 {
        return 0.0;
    }
    let pct = f64::from(won) * 100.0 / f64::from(played);
    (pct * 100.0).round() / 100.0
}
