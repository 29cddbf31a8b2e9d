/// Property-based tests for standings aggregation and ranking
use court_order::domain::{CoupleStats, Match, ScoringSystem, TiebreakerMethod};
use court_order::standings::{compute_standings, rank_standings};
use proptest::prelude::*;
use serde_json::json;

// (couple1, couple2, outcome, game scores); outcome 0 = couple1 wins, 1 = couple2 wins, 2 = draw
type MatchFixture = (i64, i64, u8, Vec<(u32, u32)>);

fn match_strategy(couples: i64) -> impl Strategy<Value = MatchFixture> {
    (
        1..=couples,
        1..=couples,
        0u8..=2,
        prop::collection::vec((0u32..=7, 0u32..=7), 0..=3),
    )
        .prop_filter("A couple cannot play itself", |(c1, c2, _, _)| c1 != c2)
}

fn matches_strategy() -> impl Strategy<Value = Vec<MatchFixture>> {
    prop::collection::vec(match_strategy(6), 0..=20)
}

fn build_match(id: i64, (c1, c2, outcome, scores): &MatchFixture) -> Match {
    let winner = match outcome {
        0 => json!(c1),
        1 => json!(c2),
        _ => json!(null),
    };
    let games: Vec<_> = scores
        .iter()
        .enumerate()
        .map(|(idx, (s1, s2))| json!({"game_number": idx + 1, "couple1_score": s1, "couple2_score": s2}))
        .collect();

    serde_json::from_value(json!({
        "id": id, "tournament_id": 1, "stage_id": 1, "group_id": 1,
        "couple1_id": c1, "couple2_id": c2,
        "winner_couple_id": winner,
        "match_result_status": "completed",
        "games": games
    }))
    .unwrap()
}

fn build_matches(fixtures: &[MatchFixture]) -> Vec<Match> {
    fixtures
        .iter()
        .enumerate()
        .map(|(idx, fixture)| build_match(idx as i64 + 1, fixture))
        .collect()
}

fn chain() -> Vec<TiebreakerMethod> {
    vec![
        TiebreakerMethod::HeadToHead,
        TiebreakerMethod::GamesDiff,
        TiebreakerMethod::GamesWon,
        TiebreakerMethod::MatchesWon,
    ]
}

proptest! {
    #[test]
    fn test_wins_balance_losses(fixtures in matches_strategy()) {
        let matches = build_matches(&fixtures);
        let stats = compute_standings(&matches, &ScoringSystem::default());

        let won: u32 = stats.iter().map(|s| s.matches_won).sum();
        let lost: u32 = stats.iter().map(|s| s.matches_lost).sum();
        let played: u32 = stats.iter().map(|s| s.matches_played).sum();
        let games_won: u32 = stats.iter().map(|s| s.games_won).sum();
        let games_lost: u32 = stats.iter().map(|s| s.games_lost).sum();

        prop_assert_eq!(won, lost);
        prop_assert_eq!(played as usize, 2 * matches.len());
        prop_assert_eq!(games_won, games_lost);
    }

    #[test]
    fn test_ranking_is_idempotent(fixtures in matches_strategy()) {
        let matches = build_matches(&fixtures);
        let stats = compute_standings(&matches, &ScoringSystem::default());

        let once = rank_standings(stats, &chain(), &matches);
        let twice = rank_standings(once.clone(), &chain(), &matches);

        let positions = |rows: &[CoupleStats]| rows.iter().map(|s| (s.couple_id, s.position)).collect::<Vec<_>>();
        prop_assert_eq!(positions(&once), positions(&twice));
    }

    #[test]
    fn test_positions_are_contiguous(fixtures in matches_strategy()) {
        let matches = build_matches(&fixtures);
        let ranked = rank_standings(compute_standings(&matches, &ScoringSystem::default()), &chain(), &matches);

        let mut positions: Vec<u32> = ranked.iter().map(|s| s.position).collect();
        positions.sort_unstable();
        let expected: Vec<u32> = (1..=ranked.len() as u32).collect();
        prop_assert_eq!(positions, expected);

        for pair in ranked.windows(2) {
            prop_assert!(pair[0].total_points >= pair[1].total_points);
        }
    }
}

#[test]
fn test_single_match_example() {
    let matches = vec![build_match(1, &(1, 2, 0, vec![(2, 0)]))];
    let scoring = ScoringSystem::default();
    let ranked = rank_standings(compute_standings(&matches, &scoring), &chain(), &matches);

    let a = ranked.iter().find(|s| s.couple_id == 1).unwrap();
    assert_eq!(
        (a.matches_played, a.matches_won, a.games_won, a.games_lost, a.total_points, a.position),
        (1, 1, 2, 0, 3, 1)
    );

    let b = ranked.iter().find(|s| s.couple_id == 2).unwrap();
    assert_eq!(
        (b.matches_played, b.matches_lost, b.games_won, b.games_lost, b.total_points, b.position),
        (1, 1, 0, 2, 0, 2)
    );
}

#[test]
fn test_empty_input() {
    let ranked = rank_standings(compute_standings(&[], &ScoringSystem::default()), &chain(), &[]);
    assert!(ranked.is_empty());
}
