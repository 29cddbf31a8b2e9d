/// Property-based tests for match ordering and auto-scheduling
use chrono::{Duration, NaiveDate, NaiveDateTime};
use court_order::domain::validation::overlaps;
use court_order::domain::{Court, Match, MatchOrderingStrategy, TournamentSnapshot};
use court_order::scheduling::{
    apply_schedule, auto_schedule_matches, calculate_match_order, OrderedMatch, PlanningWindow,
    SchedulerOptions,
};
use proptest::prelude::*;
use serde_json::json;

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn strategy_strategy() -> impl Strategy<Value = MatchOrderingStrategy> {
    prop::sample::select(MatchOrderingStrategy::ALL.to_vec())
}

// (opening hour offset, open hours) per court
fn courts_strategy() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((0i64..=4, 1i64..=10), 1..=3)
}

// (couple1, couple2, group, duration override)
fn matches_strategy() -> impl Strategy<Value = Vec<(i64, i64, i64, Option<u32>)>> {
    prop::collection::vec(
        (1i64..=8, 1i64..=8, 1i64..=2, prop::option::of(30u32..=90)),
        0..=16,
    )
    .prop_map(|specs| specs.into_iter().filter(|(c1, c2, _, _)| c1 != c2).collect())
}

fn build_snapshot(courts: &[(i64, i64)], specs: &[(i64, i64, i64, Option<u32>)]) -> TournamentSnapshot {
    let mut snapshot = TournamentSnapshot::new(1);
    snapshot.courts = courts
        .iter()
        .enumerate()
        .map(|(idx, (offset, hours))| Court {
            id: idx as i64 + 1,
            name: format!("Court {}", idx + 1),
            availability_start: base() + Duration::hours(*offset),
            availability_end: base() + Duration::hours(offset + hours),
        })
        .collect();
    snapshot.matches = specs
        .iter()
        .enumerate()
        .map(|(idx, (c1, c2, group, minutes))| {
            let m: Match = serde_json::from_value(json!({
                "id": idx as i64 + 1, "tournament_id": 1, "stage_id": 1, "group_id": group,
                "couple1_id": c1, "couple2_id": c2,
                "is_time_limited": minutes.is_some(),
                "time_limit_minutes": minutes
            }))
            .unwrap();
            m
        })
        .collect();
    snapshot
}

fn assert_safe(ordered: &[OrderedMatch]) -> Result<(), TestCaseError> {
    let placed: Vec<_> = ordered
        .iter()
        .filter_map(|o| Some((o.match_id, o.court_id?, o.scheduled_start?, o.scheduled_end?)))
        .collect();
    for (i, (id_a, court_a, start_a, end_a)) in placed.iter().enumerate() {
        for (id_b, court_b, start_b, end_b) in &placed[i + 1..] {
            if court_a == court_b {
                prop_assert!(
                    !overlaps(*start_a, *end_a, *start_b, *end_b),
                    "matches {} and {} overlap on court {}",
                    id_a,
                    id_b,
                    court_a
                );
            }
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn test_no_court_double_booking(
        courts in courts_strategy(),
        specs in matches_strategy(),
        strategy in strategy_strategy(),
    ) {
        let snapshot = build_snapshot(&courts, &specs);
        let outcome = calculate_match_order(&snapshot, strategy, &SchedulerOptions::default());

        prop_assert_eq!(outcome.ordered.len(), snapshot.matches.len());
        assert_safe(&outcome.ordered)?;

        for o in &outcome.ordered {
            prop_assert_eq!(o.is_placed(), !outcome.unresolved.contains(&o.match_id));
        }
        let display: Vec<u32> = outcome.ordered.iter().map(|o| o.display_order).collect();
        prop_assert_eq!(display, (1..=snapshot.matches.len() as u32).collect::<Vec<_>>());
    }

    #[test]
    fn test_ordering_is_deterministic(
        courts in courts_strategy(),
        specs in matches_strategy(),
        strategy in strategy_strategy(),
    ) {
        let snapshot = build_snapshot(&courts, &specs);
        let options = SchedulerOptions::default();

        let first = serde_json::to_string(&calculate_match_order(&snapshot, strategy, &options)).unwrap();
        let second = serde_json::to_string(&calculate_match_order(&snapshot, strategy, &options)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_auto_schedule_stays_in_window(
        courts in courts_strategy(),
        specs in matches_strategy(),
        strategy in strategy_strategy(),
        from in 0i64..=6,
        span in 1i64..=6,
    ) {
        let mut snapshot = build_snapshot(&courts, &specs);
        let window = PlanningWindow {
            start: base() + Duration::hours(from),
            end: base() + Duration::hours(from + span),
        };

        let outcome = auto_schedule_matches(&snapshot, strategy, window, &SchedulerOptions::default()).unwrap();
        assert_safe(&outcome.ordering.ordered)?;
        prop_assert_eq!(
            outcome.scheduled.len() + outcome.ordering.unresolved.len(),
            snapshot.matches.len()
        );

        apply_schedule(&mut snapshot, &outcome);
        for m in &snapshot.matches {
            if let Some((court_id, start, end)) = m.slot() {
                prop_assert!(start >= window.start && end <= window.end);
                let court = snapshot.court(court_id).unwrap();
                prop_assert!(court.covers(start, end));
                // a couple is never on two courts at once
                for other in snapshot.matches.iter().filter(|o| o.id != m.id) {
                    if let Some((_, other_start, other_end)) = other.slot() {
                        if other.couples().iter().any(|c| m.involves(*c)) {
                            prop_assert!(!overlaps(start, end, other_start, other_end));
                        }
                    }
                }
            }
        }
        prop_assert!(court_order::domain::validate_snapshot(&snapshot).is_ok());
    }
}
