use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::SchedulingSettings;
use crate::domain::time::format_datetime;
use crate::domain::{Match, StageId, TournamentSnapshot};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuickStats {
    pub matches_in_progress: usize,
    pub matches_waiting: usize,
    pub matches_remaining: usize,
    pub matches_completed: usize,
    pub estimated_completion: Option<String>,
}

/// Categorized view of a tournament's matches for the organizer dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOrderInfo {
    pub live_matches: Vec<Match>,
    pub next_matches: Vec<Match>,
    pub all_pending_matches: Vec<Match>,
    pub completed_matches_by_stage: BTreeMap<StageId, Vec<Match>>,
    pub quick_stats: QuickStats,
}

fn is_live(m: &Match, now: NaiveDateTime) -> bool {
    m.is_pending() && m.slot().is_some_and(|(_, start, end)| start <= now && now < end)
}

/// Display order first, unordered matches after by start time and id
fn pending_sort_key(m: &Match) -> (u32, Option<NaiveDateTime>, i64) {
    (m.display_order.unwrap_or(u32::MAX), m.scheduled_start, m.id)
}

pub fn match_order_info(
    snapshot: &TournamentSnapshot,
    settings: &SchedulingSettings,
    now: NaiveDateTime,
) -> MatchOrderInfo {
    let mut pending: Vec<Match> = snapshot.matches.iter().filter(|m| m.is_pending()).cloned().collect();
    pending.sort_by_key(pending_sort_key);

    let live_matches: Vec<Match> = pending.iter().filter(|m| is_live(m, now)).cloned().collect();
    let next_matches: Vec<Match> = pending
        .iter()
        .filter(|m| !is_live(m, now))
        .take(settings.next_matches_limit)
        .cloned()
        .collect();

    let mut completed_matches_by_stage: BTreeMap<StageId, Vec<Match>> = BTreeMap::new();
    for m in snapshot.matches.iter().filter(|m| !m.is_pending()) {
        completed_matches_by_stage.entry(m.stage_id).or_default().push(m.clone());
    }
    for matches in completed_matches_by_stage.values_mut() {
        matches.sort_by_key(|m| (m.scheduled_start, m.id));
    }

    let quick_stats = QuickStats {
        matches_in_progress: live_matches.len(),
        matches_waiting: pending.len() - live_matches.len(),
        matches_remaining: pending.len(),
        matches_completed: completed_matches_by_stage.values().map(Vec::len).sum(),
        estimated_completion: estimate_completion(snapshot, &pending, settings, now)
            .map(|at| format_datetime(&at)),
    };

    MatchOrderInfo {
        live_matches,
        next_matches,
        all_pending_matches: pending,
        completed_matches_by_stage,
        quick_stats,
    }
}

/// Latest scheduled end among pending matches, extended by the rounds still
/// needed to play the unscheduled ones on all courts in parallel
fn estimate_completion(
    snapshot: &TournamentSnapshot,
    pending: &[Match],
    settings: &SchedulingSettings,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    if pending.is_empty() {
        return None;
    }

    let scheduled_end = pending.iter().filter_map(|m| m.slot().map(|(_, _, end)| end)).max();
    let base = scheduled_end.map_or(now, |end| end.max(now));

    let unscheduled = pending.iter().filter(|m| m.slot().is_none()).count();
    let courts = snapshot.courts.len().max(1);
    let waves = unscheduled.div_ceil(courts) as i64;

    Some(base + Duration::minutes(waves * i64::from(settings.default_match_minutes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Court, MatchResultStatus};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn pending(id: i64, stage: i64, slot: Option<(u32, u32)>, order: Option<u32>) -> Match {
        let mut m: Match = serde_json::from_value(serde_json::json!({
            "id": id, "tournament_id": 1, "stage_id": stage,
            "couple1_id": id * 10, "couple2_id": id * 10 + 1
        }))
        .unwrap();
        if let Some((from, to)) = slot {
            m.court_id = Some(1);
            m.scheduled_start = Some(at(from, 0));
            m.scheduled_end = Some(at(to, 0));
        }
        m.display_order = order;
        m
    }

    fn snapshot() -> TournamentSnapshot {
        let mut snapshot = TournamentSnapshot::new(1);
        snapshot.courts = (1..=2)
            .map(|id| Court {
                id,
                name: format!("Court {}", id),
                availability_start: at(8, 0),
                availability_end: at(22, 0),
            })
            .collect();

        let mut done = pending(1, 1, Some((9, 10)), Some(1));
        done.match_result_status = MatchResultStatus::Completed;
        let mut expired = pending(2, 2, None, None);
        expired.match_result_status = MatchResultStatus::TimeExpired;

        snapshot.matches = vec![
            done,
            expired,
            pending(3, 1, Some((10, 11)), Some(2)),
            pending(4, 1, Some((11, 12)), Some(3)),
            pending(5, 1, None, Some(4)),
            pending(6, 1, None, None),
            pending(7, 1, None, Some(5)),
        ];
        snapshot
    }

    #[test]
    fn test_categories() {
        let settings = SchedulingSettings {
            next_matches_limit: 2,
            ..SchedulingSettings::default()
        };
        let info = match_order_info(&snapshot(), &settings, at(10, 30));

        let ids = |ms: &[Match]| ms.iter().map(|m| m.id).collect::<Vec<_>>();
        assert_eq!(ids(&info.live_matches), vec![3]);
        assert_eq!(ids(&info.next_matches), vec![4, 5]);
        assert_eq!(ids(&info.all_pending_matches), vec![3, 4, 5, 7, 6]);
        assert_eq!(ids(&info.completed_matches_by_stage[&1]), vec![1]);
        assert_eq!(ids(&info.completed_matches_by_stage[&2]), vec![2]);

        let stats = &info.quick_stats;
        assert_eq!(stats.matches_in_progress, 1);
        assert_eq!(stats.matches_waiting, 4);
        assert_eq!(stats.matches_remaining, 5);
        assert_eq!(stats.matches_completed, 2);
        // 12:00 plus two waves of one hour for the three unscheduled matches
        assert_eq!(stats.estimated_completion.as_deref(), Some("2024-05-01T14:00:00"));
    }

    #[test]
    fn test_no_pending_matches() {
        let mut snapshot = snapshot();
        snapshot.matches.retain(|m| !m.is_pending());
        let info = match_order_info(&snapshot, &SchedulingSettings::default(), at(10, 0));
        assert!(info.all_pending_matches.is_empty());
        assert_eq!(info.quick_stats.estimated_completion, None);
        assert_eq!(info.quick_stats.matches_completed, 2);
    }
}
