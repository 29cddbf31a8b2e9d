use std::collections::{BTreeSet, HashMap};

use crate::domain::{CoupleId, CoupleStats, Match, MatchResultStatus, TiebreakerMethod};

/// Orders `stats` and assigns positions 1..=N.
///
/// Primary key is `total_points` descending. Couples tied on points are
/// separated by `tiebreakers` in order; each method splits a tied block into
/// sub-blocks that the remaining methods resolve further. Whatever is still
/// tied once the chain is exhausted is ordered by couple id ascending, so
/// positions are always unique and contiguous.
///
/// `matches` is consulted only by [`TiebreakerMethod::HeadToHead`].
pub fn rank_standings(
    mut stats: Vec<CoupleStats>,
    tiebreakers: &[TiebreakerMethod],
    matches: &[Match],
) -> Vec<CoupleStats> {
    stats.sort_by_key(|s| s.couple_id);

    let mut ranked = Vec::with_capacity(stats.len());
    for block in split_by_key(stats, |s| s.total_points) {
        ranked.extend(break_ties(block, tiebreakers, matches));
    }

    for (idx, row) in ranked.iter_mut().enumerate() {
        row.position = idx as u32 + 1;
    }
    ranked
}

fn break_ties(
    block: Vec<CoupleStats>,
    tiebreakers: &[TiebreakerMethod],
    matches: &[Match],
) -> Vec<CoupleStats> {
    if block.len() <= 1 {
        return block;
    }

    let Some((method, rest)) = tiebreakers.split_first() else {
        let mut block = block;
        block.sort_by_key(|s| s.couple_id);
        return block;
    };

    let sub_blocks = match method {
        TiebreakerMethod::Points => split_by_key(block, |s| s.total_points),
        TiebreakerMethod::GamesDiff => split_by_key(block, |s| s.games_diff),
        TiebreakerMethod::GamesWon => split_by_key(block, |s| i64::from(s.games_won)),
        TiebreakerMethod::MatchesWon => split_by_key(block, |s| i64::from(s.matches_won)),
        TiebreakerMethod::HeadToHead => {
            let wins = head_to_head_wins(&block, matches);
            split_by_key(block, |s| wins.get(&s.couple_id).copied().unwrap_or(0))
        }
    };

    sub_blocks
        .into_iter()
        .flat_map(|sub| break_ties(sub, rest, matches))
        .collect()
}

/// Wins of each tied couple counting only completed matches between tied couples
fn head_to_head_wins(block: &[CoupleStats], matches: &[Match]) -> HashMap<CoupleId, i64> {
    let tied: BTreeSet<CoupleId> = block.iter().map(|s| s.couple_id).collect();
    let mut wins = HashMap::new();

    let decided = matches.iter().filter(|m| {
        m.match_result_status == MatchResultStatus::Completed
            && tied.contains(&m.couple1_id)
            && tied.contains(&m.couple2_id)
    });

    for m in decided {
        if let Some(winner) = m.winner_couple_id.filter(|w| m.involves(*w)) {
            *wins.entry(winner).or_insert(0) += 1;
        }
    }
    wins
}

/// Stable sort by `key` descending, then cut into runs of equal keys
fn split_by_key<F>(mut rows: Vec<CoupleStats>, key: F) -> Vec<Vec<CoupleStats>>
where
    F: Fn(&CoupleStats) -> i64,
{
    rows.sort_by(|a, b| key(b).cmp(&key(a)));

    let mut blocks: Vec<Vec<CoupleStats>> = Vec::new();
    for row in rows {
        match blocks.last_mut() {
            Some(current) if current.first().map(&key) == Some(key(&row)) => current.push(row),
            _ => blocks.push(vec![row]),
        }
    }
    blocks
}
