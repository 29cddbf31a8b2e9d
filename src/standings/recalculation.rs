use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use log::{info, warn};

use super::{compute_roster_standings, rank_standings};
use crate::config::StandingsSettings;
use crate::domain::{GroupId, GroupStandings, Group, Match, TournamentId, TournamentSnapshot};
use crate::errors::TournamentResult;

/// Freshly computed standings for one or all groups of a tournament
#[derive(Debug, Clone)]
pub struct Recalculation {
    pub tournament_id: TournamentId,
    pub groups: Vec<GroupStandings>,
    pub last_updated: NaiveDateTime,
}

/// Recomputes standings from the snapshot's completed matches.
///
/// With `group_id` only that group is recomputed; otherwise every group of
/// the tournament is. Nothing is written: the caller replaces the stored
/// standings with the returned ones in a single step.
pub fn recalculate(
    snapshot: &TournamentSnapshot,
    group_id: Option<GroupId>,
    settings: &StandingsSettings,
    now: NaiveDateTime,
) -> TournamentResult<Recalculation> {
    let groups: Vec<&Group> = match group_id {
        Some(id) => vec![snapshot.group(id)?],
        None => snapshot.groups.iter().collect(),
    };

    info!(
        "Recalculating standings for {} group(s) of tournament {}",
        groups.len(),
        snapshot.tournament_id
    );

    let standings = groups
        .into_iter()
        .map(|group| group_standings(snapshot, group, settings, now))
        .collect();

    Ok(Recalculation {
        tournament_id: snapshot.tournament_id,
        groups: standings,
        last_updated: now,
    })
}

/// Ranked standings of a single group
pub fn group_standings(
    snapshot: &TournamentSnapshot,
    group: &Group,
    settings: &StandingsSettings,
    now: NaiveDateTime,
) -> GroupStandings {
    let config = snapshot.stage_config_for_group(group);
    let matches = known_couple_matches(snapshot, snapshot.group_matches(group.id));
    let roster: BTreeSet<_> = group.couple_ids.iter().copied().collect();

    let stats = compute_roster_standings(&matches, &config.scoring_system, &roster);
    let tiebreakers = settings.tiebreakers_or_default(&config.advancement_rules.tiebreaker);
    let mut ranked = rank_standings(stats, tiebreakers, &matches);

    let names = snapshot.couple_names();
    for row in &mut ranked {
        if let Some(name) = names.get(&row.couple_id) {
            row.couple_name = name.clone();
        }
    }

    GroupStandings {
        group_id: group.id,
        group_name: group.name.clone(),
        standings: ranked,
        last_updated: now,
    }
}

/// Drops matches naming couples the tournament does not know about
fn known_couple_matches(snapshot: &TournamentSnapshot, matches: Vec<Match>) -> Vec<Match> {
    if snapshot.couples.is_empty() {
        return matches;
    }

    let known = snapshot.couple_ids();
    matches
        .into_iter()
        .filter(|m| {
            let ok = m.couples().iter().all(|c| known.contains(c));
            if !ok {
                warn!(
                    "Match {} references an unknown couple ({} / {}), skipped",
                    m.id, m.couple1_id, m.couple2_id
                );
            }
            ok
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Couple, Stage, StageConfig, StageType};
    use crate::errors::TournamentError;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(18, 0, 0).unwrap()
    }

    fn snapshot() -> TournamentSnapshot {
        let mut snapshot = TournamentSnapshot::new(1);
        snapshot.couples = (1..=3)
            .map(|id| Couple {
                id,
                tournament_id: 1,
                first_player_id: id * 10,
                second_player_id: id * 10 + 1,
                name: format!("Couple {}", id),
                seed: None,
            })
            .collect();
        snapshot.stages = vec![Stage {
            id: 1,
            tournament_id: 1,
            stage_type: StageType::Group,
            order: 1,
            config: StageConfig::default(),
        }];
        snapshot.groups = vec![Group {
            id: 5,
            stage_id: 1,
            name: "Group A".to_string(),
            couple_ids: vec![1, 2, 3],
        }];
        snapshot.matches = vec![
            serde_json::from_value(serde_json::json!({
                "id": 1, "tournament_id": 1, "stage_id": 1, "group_id": 5,
                "couple1_id": 1, "couple2_id": 2, "winner_couple_id": 2,
                "match_result_status": "completed",
                "games": [{"game_number": 1, "couple1_score": 3, "couple2_score": 6}]
            }))
            .unwrap(),
            serde_json::from_value(serde_json::json!({
                "id": 2, "tournament_id": 1, "stage_id": 1, "group_id": 5,
                "couple1_id": 3, "couple2_id": 77, "winner_couple_id": 3,
                "match_result_status": "completed"
            }))
            .unwrap(),
        ];
        snapshot
    }

    #[test]
    fn test_recalculate_all_groups() {
        let result = recalculate(&snapshot(), None, &StandingsSettings::default(), now()).unwrap();
        assert_eq!(result.groups.len(), 1);

        let group = &result.groups[0];
        assert_eq!(group.group_name, "Group A");
        assert_eq!(group.standings.len(), 3);
        assert_eq!(group.standings[0].couple_id, 2);
        assert_eq!(group.standings[0].couple_name, "Couple 2");
        assert_eq!(group.standings[0].position, 1);
        // match 2 involves unknown couple 77 and is skipped
        let third = group.standings.iter().find(|s| s.couple_id == 3).unwrap();
        assert_eq!(third.matches_played, 0);
        assert_eq!(result.last_updated, now());
    }

    #[test]
    fn test_recalculate_unknown_group() {
        let err = recalculate(&snapshot(), Some(42), &StandingsSettings::default(), now()).unwrap_err();
        assert!(matches!(err, TournamentError::GroupNotFound(42)));
    }
}
