use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use log::{info, warn};

use crate::cache::SnapshotStore;
use crate::config::AppConfig;
use crate::domain::{
    validate_snapshot, GroupId, GroupStandings, Match, MatchId, MatchOrderingStrategy,
    OrderingRecord, TournamentId, TournamentSnapshot,
};
use crate::errors::{TournamentError, TournamentResult};
use crate::reporting::{match_order_info, CalculateMatchOrderResponse, MatchOrderInfo};
use crate::scheduling::{
    apply_ordering, apply_schedule, auto_schedule_matches, calculate_match_order, schedule_match,
    AutoScheduleOutcome, ManualSlot, PlanningWindow, SchedulerOptions,
};
use crate::standings::{group_standings, recalculate, Recalculation};

#[derive(Debug, Clone)]
struct Versioned {
    version: u64,
    snapshot: TournamentSnapshot,
}

type Slot = Arc<Mutex<Versioned>>;
type Registry = HashMap<TournamentId, Slot>;

/// Snapshot-in, result-out orchestration around the engines.
///
/// Every mutation reads a versioned copy, computes on it without holding a
/// lock, then commits only if nobody else committed in between. Disk writes
/// happen under the tournament's own slot lock, so tournaments persist
/// independently; the registry lock covers only the first store of a tournament.
pub struct TournamentService {
    config: AppConfig,
    store: Option<SnapshotStore>,
    tournaments: RwLock<Registry>,
}

impl TournamentService {
    /// Service backed by the snapshot directory from `config`
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = SnapshotStore::new(&config.storage.snapshot_dir)?;
        let tournaments = store
            .load_all()?
            .into_iter()
            .map(|snapshot| (snapshot.tournament_id, Self::new_slot(1, snapshot)))
            .collect();

        Ok(Self {
            config,
            store: Some(store),
            tournaments: RwLock::new(tournaments),
        })
    }

    /// Service without persistence
    pub fn in_memory(config: AppConfig) -> Self {
        Self {
            config,
            store: None,
            tournaments: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn scheduler_options(&self) -> SchedulerOptions {
        SchedulerOptions::from(&self.config.scheduling)
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn new_slot(version: u64, snapshot: TournamentSnapshot) -> Slot {
        Arc::new(Mutex::new(Versioned { version, snapshot }))
    }

    fn read_lock(&self) -> TournamentResult<RwLockReadGuard<'_, Registry>> {
        self.tournaments
            .read()
            .map_err(|_| TournamentError::Storage("tournament registry lock poisoned".to_string()))
    }

    fn write_lock(&self) -> TournamentResult<RwLockWriteGuard<'_, Registry>> {
        self.tournaments
            .write()
            .map_err(|_| TournamentError::Storage("tournament registry lock poisoned".to_string()))
    }

    fn lock_slot(slot: &Slot) -> TournamentResult<MutexGuard<'_, Versioned>> {
        slot.lock()
            .map_err(|_| TournamentError::Storage("tournament slot lock poisoned".to_string()))
    }

    fn slot(&self, tournament_id: TournamentId) -> TournamentResult<Slot> {
        self.read_lock()?
            .get(&tournament_id)
            .cloned()
            .ok_or(TournamentError::TournamentNotFound(tournament_id))
    }

    fn checkout(&self, tournament_id: TournamentId) -> TournamentResult<Versioned> {
        let slot = self.slot(tournament_id)?;
        let current = Self::lock_slot(&slot)?;
        Ok(current.clone())
    }

    fn persist(&self, snapshot: &TournamentSnapshot) -> TournamentResult<()> {
        match &self.store {
            Some(store) => store
                .save(snapshot)
                .map_err(|e| TournamentError::Storage(format!("{:#}", e))),
            None => Ok(()),
        }
    }

    /// Compare-and-swap write-back of a whole snapshot
    fn commit(&self, expected: u64, snapshot: TournamentSnapshot) -> TournamentResult<u64> {
        let tournament_id = snapshot.tournament_id;
        let slot = self.slot(tournament_id)?;
        let mut current = Self::lock_slot(&slot)?;

        let found = current.version;
        if found != expected {
            warn!(
                "Discarding stale write for tournament {} (version {} != {})",
                tournament_id, expected, found
            );
            return Err(TournamentError::VersionConflict {
                tournament_id,
                expected,
                found,
            });
        }

        self.persist(&snapshot)?;
        let version = expected + 1;
        *current = Versioned { version, snapshot };
        Ok(version)
    }

    /// Unconditional write-back bumping the slot's version
    fn replace(&self, slot: &Slot, snapshot: TournamentSnapshot) -> TournamentResult<u64> {
        let mut current = Self::lock_slot(slot)?;
        self.persist(&snapshot)?;
        let version = current.version + 1;
        *current = Versioned { version, snapshot };
        Ok(version)
    }

    fn tournament_of(&self, owns: impl Fn(&TournamentSnapshot) -> bool) -> TournamentResult<Option<Versioned>> {
        for slot in self.read_lock()?.values() {
            let current = Self::lock_slot(slot)?;
            if owns(&current.snapshot) {
                return Ok(Some(current.clone()));
            }
        }
        Ok(None)
    }

    /// Stores a validated snapshot, replacing any previous one
    pub fn put_snapshot(
        &self,
        tournament_id: TournamentId,
        snapshot: TournamentSnapshot,
    ) -> TournamentResult<TournamentSnapshot> {
        if snapshot.tournament_id != tournament_id {
            return Err(TournamentError::InvalidSnapshot(format!(
                "snapshot belongs to tournament {}, not {}",
                snapshot.tournament_id, tournament_id
            )));
        }
        validate_snapshot(&snapshot)?;

        let existing = self.read_lock()?.get(&tournament_id).cloned();
        let version = match existing {
            Some(slot) => self.replace(&slot, snapshot.clone())?,
            None => {
                let mut tournaments = self.write_lock()?;
                match tournaments.get(&tournament_id).cloned() {
                    Some(slot) => {
                        drop(tournaments);
                        self.replace(&slot, snapshot.clone())?
                    }
                    None => {
                        self.persist(&snapshot)?;
                        tournaments.insert(tournament_id, Self::new_slot(1, snapshot.clone()));
                        1
                    }
                }
            }
        };

        info!(
            "Stored snapshot of tournament {} ({} matches, version {})",
            tournament_id,
            snapshot.matches.len(),
            version
        );
        Ok(snapshot)
    }

    pub fn snapshot(&self, tournament_id: TournamentId) -> TournamentResult<TournamentSnapshot> {
        self.checkout(tournament_id).map(|v| v.snapshot)
    }

    /// Last recalculated standings of a group, or freshly computed ones when
    /// none were stored yet
    pub fn group_standings(&self, group_id: GroupId) -> TournamentResult<GroupStandings> {
        let Versioned { snapshot, .. } = self
            .tournament_of(|s| s.has_group(group_id))?
            .ok_or(TournamentError::GroupNotFound(group_id))?;

        if let Some(stored) = snapshot.standings.get(&group_id) {
            return Ok(stored.clone());
        }
        let group = snapshot.group(group_id)?;
        Ok(group_standings(&snapshot, group, &self.config.standings, Self::now()))
    }

    pub fn recalculate(
        &self,
        tournament_id: TournamentId,
        group_id: Option<GroupId>,
    ) -> TournamentResult<Recalculation> {
        let Versioned { version, mut snapshot } = self.checkout(tournament_id)?;
        let result = recalculate(&snapshot, group_id, &self.config.standings, Self::now())?;

        for standings in &result.groups {
            snapshot.standings.insert(standings.group_id, standings.clone());
        }
        self.commit(version, snapshot)?;
        Ok(result)
    }

    /// Orders pending matches unless an ordering is already stored and
    /// `force_recalculate` is off
    pub fn calculate_match_order(
        &self,
        tournament_id: TournamentId,
        strategy: MatchOrderingStrategy,
        force_recalculate: bool,
    ) -> TournamentResult<CalculateMatchOrderResponse> {
        let Versioned { version, mut snapshot } = self.checkout(tournament_id)?;

        if !force_recalculate && snapshot.has_ordering() {
            if let Some(last) = &snapshot.last_ordering {
                info!("Tournament {} already ordered with {}", tournament_id, last.strategy);
                return Ok(CalculateMatchOrderResponse::unchanged(
                    last.strategy,
                    last.total_matches_ordered,
                    last.unresolved_matches,
                ));
            }
        }

        let started = Instant::now();
        let outcome = calculate_match_order(&snapshot, strategy, &self.scheduler_options());
        let elapsed = started.elapsed().as_millis() as u64;

        apply_ordering(&mut snapshot, &outcome);
        snapshot.last_ordering = Some(OrderingRecord {
            strategy,
            total_matches_ordered: outcome.total_ordered(),
            unresolved_matches: outcome.unresolved.len(),
            calculated_at: Self::now(),
        });
        self.commit(version, snapshot)?;

        Ok(CalculateMatchOrderResponse::from_outcome(&outcome, elapsed))
    }

    /// Assigns slots inside `window`; without an explicit strategy the last
    /// used one applies, then the configured default
    pub fn auto_schedule(
        &self,
        tournament_id: TournamentId,
        strategy: Option<MatchOrderingStrategy>,
        window: PlanningWindow,
    ) -> TournamentResult<AutoScheduleOutcome> {
        let Versioned { version, mut snapshot } = self.checkout(tournament_id)?;
        let strategy = strategy
            .or_else(|| snapshot.last_ordering.as_ref().map(|o| o.strategy))
            .unwrap_or(self.config.scheduling.default_strategy);

        let outcome = auto_schedule_matches(&snapshot, strategy, window, &self.scheduler_options())?;
        apply_schedule(&mut snapshot, &outcome);
        snapshot.last_ordering = Some(OrderingRecord {
            strategy,
            total_matches_ordered: outcome.ordering.total_ordered(),
            unresolved_matches: outcome.ordering.unresolved.len(),
            calculated_at: Self::now(),
        });
        self.commit(version, snapshot)?;

        Ok(outcome)
    }

    pub fn schedule_match(&self, match_id: MatchId, slot: &ManualSlot) -> TournamentResult<Match> {
        let Versioned { version, mut snapshot } = self
            .tournament_of(|s| s.has_match(match_id))?
            .ok_or(TournamentError::MatchNotFound(match_id))?;

        let updated = schedule_match(&mut snapshot, match_id, slot, &self.scheduler_options())?;
        self.commit(version, snapshot)?;
        Ok(updated)
    }

    pub fn match_order_info(&self, tournament_id: TournamentId) -> TournamentResult<MatchOrderInfo> {
        let snapshot = self.snapshot(tournament_id)?;
        Ok(match_order_info(&snapshot, &self.config.scheduling, Self::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Court, Group, MatchResultStatus};
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn snapshot() -> TournamentSnapshot {
        let mut snapshot = TournamentSnapshot::new(1);
        snapshot.courts = vec![Court {
            id: 1,
            name: "Center".into(),
            availability_start: at(9),
            availability_end: at(18),
        }];
        snapshot.groups = vec![Group {
            id: 5,
            stage_id: 1,
            name: "Group A".into(),
            couple_ids: vec![1, 2],
        }];
        snapshot.matches = vec![
            serde_json::from_value(serde_json::json!({
                "id": 1, "tournament_id": 1, "stage_id": 1, "group_id": 5,
                "couple1_id": 1, "couple2_id": 2, "winner_couple_id": 1,
                "match_result_status": "completed",
                "games": [{"game_number": 1, "couple1_score": 6, "couple2_score": 2, "winner_id": 1}]
            }))
            .unwrap(),
            serde_json::from_value(serde_json::json!({
                "id": 2, "tournament_id": 1, "stage_id": 1, "group_id": 5,
                "couple1_id": 2, "couple2_id": 1
            }))
            .unwrap(),
        ];
        snapshot
    }

    fn service() -> TournamentService {
        let service = TournamentService::in_memory(AppConfig::new());
        service.put_snapshot(1, snapshot()).unwrap();
        service
    }

    #[test]
    fn test_put_rejects_mismatched_id() {
        let service = TournamentService::in_memory(AppConfig::new());
        let err = service.put_snapshot(2, snapshot()).unwrap_err();
        assert!(matches!(err, TournamentError::InvalidSnapshot(_)));
        assert!(matches!(service.snapshot(1), Err(TournamentError::TournamentNotFound(1))));
    }

    #[test]
    fn test_recalculate_stores_standings() {
        let service = service();
        let result = service.recalculate(1, None).unwrap();
        assert_eq!(result.groups.len(), 1);

        let standings = service.group_standings(5).unwrap();
        assert_eq!(standings.standings[0].couple_id, 1);
        assert_eq!(standings.standings[0].total_points, 3);
        assert!(service.snapshot(1).unwrap().standings.contains_key(&5));
    }

    #[test]
    fn test_group_standings_computed_on_demand() {
        let service = service();
        let standings = service.group_standings(5).unwrap();
        assert_eq!(standings.group_name, "Group A");
        assert_eq!(standings.standings.len(), 2);
        assert!(matches!(service.group_standings(6), Err(TournamentError::GroupNotFound(6))));
    }

    #[test]
    fn test_calculate_respects_force_flag() {
        let service = service();
        let first = service
            .calculate_match_order(1, MatchOrderingStrategy::TimeSequential, false)
            .unwrap();
        assert_eq!(first.total_matches_ordered, 1);
        assert_eq!(first.strategy_used, MatchOrderingStrategy::TimeSequential);

        let cached = service
            .calculate_match_order(1, MatchOrderingStrategy::BalancedLoad, false)
            .unwrap();
        assert_eq!(cached.strategy_used, MatchOrderingStrategy::TimeSequential);
        assert_eq!(cached.calculation_time_ms, 0);

        let forced = service
            .calculate_match_order(1, MatchOrderingStrategy::BalancedLoad, true)
            .unwrap();
        assert_eq!(forced.strategy_used, MatchOrderingStrategy::BalancedLoad);
    }

    #[test]
    fn test_auto_schedule_uses_last_strategy() {
        let service = service();
        service
            .calculate_match_order(1, MatchOrderingStrategy::CourtEfficient, true)
            .unwrap();
        let outcome = service
            .auto_schedule(1, None, PlanningWindow { start: at(10), end: at(12) })
            .unwrap();
        assert_eq!(outcome.ordering.strategy, MatchOrderingStrategy::CourtEfficient);
        assert_eq!(outcome.scheduled, vec![2]);

        let stored = service.snapshot(1).unwrap();
        let scheduled = stored.match_by_id(2).unwrap();
        assert_eq!(scheduled.slot(), Some((1, at(10), at(11))));
        assert_eq!(scheduled.match_result_status, MatchResultStatus::Pending);
    }

    #[test]
    fn test_schedule_match_finds_tournament() {
        let service = service();
        let slot = ManualSlot {
            court_id: 1,
            start: at(14),
            end: None,
            is_time_limited: None,
            time_limit_minutes: None,
        };
        let updated = service.schedule_match(2, &slot).unwrap();
        assert_eq!(updated.scheduled_end, Some(at(15)));
        assert!(matches!(service.schedule_match(99, &slot), Err(TournamentError::MatchNotFound(99))));
    }

    #[test]
    fn test_stale_commit_is_rejected() {
        let service = service();
        let Versioned { version, snapshot } = service.checkout(1).unwrap();
        service.commit(version, snapshot.clone()).unwrap();

        let err = service.commit(version, snapshot).unwrap_err();
        assert!(matches!(err, TournamentError::VersionConflict { expected, found, .. } if found == expected + 1));
    }

    #[test]
    fn test_tournaments_commit_independently() {
        let service = service();
        let mut second = snapshot();
        second.tournament_id = 2;
        for m in second.matches.iter_mut() {
            m.tournament_id = 2;
            m.id += 10;
            m.group_id = Some(6);
        }
        second.groups[0].id = 6;
        service.put_snapshot(2, second).unwrap();

        std::thread::scope(|scope| {
            for tournament_id in [1, 2] {
                let service = &service;
                scope.spawn(move || {
                    for _ in 0..10 {
                        service.recalculate(tournament_id, None).unwrap();
                    }
                });
            }
        });

        assert_eq!(service.checkout(1).unwrap().version, 11);
        assert_eq!(service.checkout(2).unwrap().version, 11);
        assert!(service.snapshot(2).unwrap().standings.contains_key(&6));
    }

    #[test]
    fn test_put_replaces_and_bumps_version() {
        let service = service();
        let mut updated = snapshot();
        updated.matches.pop();
        service.put_snapshot(1, updated).unwrap();

        let current = service.checkout(1).unwrap();
        assert_eq!(current.version, 2);
        assert_eq!(current.snapshot.matches.len(), 1);
    }
}
