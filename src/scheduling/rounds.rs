use std::collections::{BTreeMap, HashMap, HashSet};

use crate::domain::{BracketId, CoupleId, GroupId, Match, MatchId};

/// Round placement of a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSlot {
    pub round_number: u32,
    pub bracket_position: Option<String>,
}

/// Round numbers (and bracket slots for elimination matches) for every match.
///
/// Explicit `round_number`/`bracket_position` values are kept. Missing group
/// rounds are filled greedily in match-id order; missing bracket rounds follow
/// single-elimination round sizes.
pub fn derive_rounds(matches: &[Match]) -> HashMap<MatchId, RoundSlot> {
    let mut by_group: BTreeMap<GroupId, Vec<&Match>> = BTreeMap::new();
    let mut by_bracket: BTreeMap<BracketId, Vec<&Match>> = BTreeMap::new();
    let mut loose = Vec::new();

    for m in matches {
        match (m.group_id, m.bracket_id) {
            (Some(group), _) => by_group.entry(group).or_default().push(m),
            (None, Some(bracket)) => by_bracket.entry(bracket).or_default().push(m),
            (None, None) => loose.push(m),
        }
    }

    let mut slots = HashMap::new();
    for mut group_matches in by_group.into_values() {
        group_matches.sort_by_key(|m| m.id);
        slots.extend(group_rounds(&group_matches));
    }
    for mut bracket_matches in by_bracket.into_values() {
        bracket_matches.sort_by_key(|m| m.id);
        slots.extend(bracket_rounds(&bracket_matches));
    }
    loose.sort_by_key(|m| m.id);
    slots.extend(group_rounds(&loose));

    slots
}

/// Each match without a round joins the first round where neither couple plays yet
fn group_rounds(matches: &[&Match]) -> Vec<(MatchId, RoundSlot)> {
    let mut occupied: BTreeMap<u32, HashSet<CoupleId>> = BTreeMap::new();
    let mut assigned: Vec<(MatchId, u32)> = Vec::new();

    for m in matches.iter().filter(|m| m.round_number.is_some()) {
        if let Some(round) = m.round_number {
            occupied.entry(round).or_default().extend(m.couples());
            assigned.push((m.id, round));
        }
    }

    for m in matches.iter().filter(|m| m.round_number.is_none()) {
        let mut round = 1;
        while occupied
            .get(&round)
            .is_some_and(|busy| m.couples().iter().any(|c| busy.contains(c)))
        {
            round += 1;
        }
        occupied.entry(round).or_default().extend(m.couples());
        assigned.push((m.id, round));
    }

    let existing: HashMap<MatchId, Option<String>> = matches
        .iter()
        .map(|m| (m.id, m.bracket_position.clone()))
        .collect();

    assigned
        .into_iter()
        .map(|(id, round_number)| {
            let bracket_position = existing.get(&id).cloned().flatten();
            (id, RoundSlot { round_number, bracket_position })
        })
        .collect()
}

/// Number of matches per round of a single-elimination bracket with `total` matches
pub fn elimination_round_sizes(total: usize) -> Vec<usize> {
    if total == 0 {
        return Vec::new();
    }

    let entrants = total + 1;
    let full = 1usize << (usize::BITS - 1 - entrants.leading_zeros());
    let first = if entrants == full { entrants / 2 } else { entrants - full };

    let mut sizes = vec![first];
    let mut remaining = total - first;
    while remaining > 0 {
        let next = remaining.div_ceil(2);
        sizes.push(next);
        remaining -= next;
    }
    sizes
}

fn bracket_rounds(matches: &[&Match]) -> Vec<(MatchId, RoundSlot)> {
    let sizes = elimination_round_sizes(matches.len());
    let mut implied = Vec::with_capacity(matches.len());
    for (idx, size) in sizes.iter().enumerate() {
        implied.extend(std::iter::repeat_n(idx as u32 + 1, *size));
    }

    let rounds: Vec<(&Match, u32)> = matches
        .iter()
        .zip(implied)
        .map(|(m, implied_round)| (*m, m.round_number.unwrap_or(implied_round)))
        .collect();

    let mut next_slot: BTreeMap<u32, u32> = BTreeMap::new();
    rounds
        .into_iter()
        .map(|(m, round_number)| {
            let slot = next_slot.entry(round_number).or_insert(0);
            *slot += 1;
            let bracket_position = m
                .bracket_position
                .clone()
                .unwrap_or_else(|| format!("R{}-{}", round_number, slot));
            (m.id, RoundSlot { round_number, bracket_position: Some(bracket_position) })
        })
        .collect()
}
