use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDateTime};
use log::{debug, info};

use super::rounds::{derive_rounds, RoundSlot};
use super::timeline::{CoupleCalendar, CourtTimeline};
use super::types::{OrderedMatch, OrderingOutcome, PlanningWindow, SchedulerOptions};
use crate::domain::{
    BracketId, BracketType, CoupleId, CourtId, GroupId, Match, MatchId, MatchOrderingStrategy,
    StageId, TournamentSnapshot,
};

/// Orders every pending match of the snapshot with `strategy`.
///
/// Matches that already hold a court and time keep them. The others are
/// planned onto the courts' availability windows to decide the order; a
/// match that fits nowhere is still ordered but reported as unresolved.
pub fn calculate_match_order(
    snapshot: &TournamentSnapshot,
    strategy: MatchOrderingStrategy,
    options: &SchedulerOptions,
) -> OrderingOutcome {
    plan(snapshot, strategy, options, None)
}

/// Writes the ordering fields of `outcome` back onto the snapshot's matches
pub fn apply_ordering(snapshot: &mut TournamentSnapshot, outcome: &OrderingOutcome) {
    let by_id: HashMap<MatchId, &OrderedMatch> =
        outcome.ordered.iter().map(|o| (o.match_id, o)).collect();

    for m in snapshot.matches.iter_mut() {
        if let Some(ordered) = by_id.get(&m.id) {
            m.display_order = Some(ordered.display_order);
            m.order_in_stage = Some(ordered.order_in_stage);
            m.order_in_group = ordered.order_in_group;
            m.bracket_position = ordered.bracket_position.clone();
            m.round_number = Some(ordered.round_number);
            m.priority_score = Some(ordered.priority_score);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    court_id: CourtId,
    start: NaiveDateTime,
    end: NaiveDateTime,
    pre_scheduled: bool,
}

type SequenceKey = (i64, i64, i64, i64, i64, i64, u32, CoupleId, MatchId);

/// Static facts used to build sort keys
struct OrderingContext {
    stage_order: HashMap<StageId, i32>,
    bracket_rank: HashMap<BracketId, i64>,
    seeds: HashMap<CoupleId, u32>,
    rounds: HashMap<MatchId, RoundSlot>,
}

impl OrderingContext {
    fn new(snapshot: &TournamentSnapshot) -> Self {
        Self {
            stage_order: snapshot.stages.iter().map(|s| (s.id, s.order)).collect(),
            bracket_rank: snapshot
                .brackets
                .iter()
                .map(|b| (b.id, bracket_type_rank(b.bracket_type)))
                .collect(),
            seeds: snapshot
                .couples
                .iter()
                .filter_map(|c| c.seed.map(|seed| (c.id, seed)))
                .collect(),
            rounds: derive_rounds(&snapshot.matches),
        }
    }

    fn round(&self, m: &Match) -> u32 {
        self.rounds
            .get(&m.id)
            .map(|slot| slot.round_number)
            .or(m.round_number)
            .unwrap_or(1)
    }

    fn stage_rank(&self, m: &Match) -> (i64, i64) {
        let order = self.stage_order.get(&m.stage_id).copied().unwrap_or(i32::MAX);
        (i64::from(order), m.stage_id)
    }

    /// Groups first, then brackets by type, then matches outside both
    fn cluster_rank(&self, m: &Match) -> (i64, i64, i64) {
        match (m.group_id, m.bracket_id) {
            (Some(group), _) => (0, 0, group),
            (None, Some(bracket)) => {
                let rank = self.bracket_rank.get(&bracket).copied().unwrap_or(i64::MAX);
                (1, rank, bracket)
            }
            (None, None) => (2, 0, 0),
        }
    }

    /// Lowest seed among the two couples; unseeded couples sort after seeded ones
    fn seed_rank(&self, m: &Match) -> (u32, CoupleId) {
        m.couples()
            .into_iter()
            .map(|c| (self.seeds.get(&c).copied().unwrap_or(u32::MAX), c))
            .min()
            .unwrap_or((u32::MAX, m.couple1_id))
    }

    fn sequence_key(&self, m: &Match, strategy: MatchOrderingStrategy) -> SequenceKey {
        let round = i64::from(self.round(m));
        let (stage_order, stage_id) = self.stage_rank(m);
        let (kind, bracket_rank, cluster_id) = self.cluster_rank(m);
        let (seed, couple) = self.seed_rank(m);

        match strategy {
            MatchOrderingStrategy::GroupClustered => (
                stage_order, stage_id, kind, bracket_rank, cluster_id, round, seed, couple, m.id,
            ),
            MatchOrderingStrategy::TimeSequential
            | MatchOrderingStrategy::BalancedLoad
            | MatchOrderingStrategy::CourtEfficient => (
                round, stage_order, stage_id, kind, bracket_rank, cluster_id, seed, couple, m.id,
            ),
        }
    }
}

fn bracket_type_rank(bracket_type: BracketType) -> i64 {
    match bracket_type {
        BracketType::Main => 0,
        BracketType::Silver => 1,
        BracketType::Bronze => 2,
    }
}

/// Court and couple occupancy while matches are being placed
struct Planner<'a> {
    snapshot: &'a TournamentSnapshot,
    options: &'a SchedulerOptions,
    strategy: MatchOrderingStrategy,
    courts: Vec<CourtTimeline>,
    couples: CoupleCalendar,
    bracket_rounds: HashMap<BracketId, Vec<(u32, NaiveDateTime)>>,
    sequence_floor: Option<NaiveDateTime>,
}

impl<'a> Planner<'a> {
    fn new(
        snapshot: &'a TournamentSnapshot,
        options: &'a SchedulerOptions,
        strategy: MatchOrderingStrategy,
        window: Option<PlanningWindow>,
        context: &OrderingContext,
    ) -> Self {
        let mut courts: Vec<CourtTimeline> = snapshot
            .courts
            .iter()
            .map(|c| CourtTimeline::new(c, window.map(|w| (w.start, w.end))))
            .collect();
        courts.sort_by_key(|c| c.court_id);

        let mut planner = Self {
            snapshot,
            options,
            strategy,
            courts,
            couples: CoupleCalendar::default(),
            bracket_rounds: HashMap::new(),
            sequence_floor: None,
        };

        for m in &snapshot.matches {
            if let Some((court_id, start, end)) = m.slot() {
                planner.record(m, context.round(m), court_id, start, end);
            }
        }
        planner
    }

    fn record(&mut self, m: &Match, round: u32, court_id: CourtId, start: NaiveDateTime, end: NaiveDateTime) {
        if let Some(court) = self.courts.iter_mut().find(|c| c.court_id == court_id) {
            court.book(m.id, start, end);
        }
        self.couples.book(m.couples(), start, end);
        if let Some(bracket) = m.bracket_id {
            self.bracket_rounds.entry(bracket).or_default().push((round, end));
        }
    }

    /// Elimination rounds wait for every earlier round of the same bracket
    fn dependency_floor(&self, m: &Match, round: u32) -> Option<NaiveDateTime> {
        let bracket = m.bracket_id?;
        self.bracket_rounds
            .get(&bracket)?
            .iter()
            .filter(|(r, _)| *r < round)
            .map(|(_, end)| *end)
            .max()
    }

    fn find_slot(
        &self,
        court: &CourtTimeline,
        couples: [CoupleId; 2],
        duration: Duration,
        not_before: NaiveDateTime,
        changeover: Duration,
    ) -> Option<NaiveDateTime> {
        let mut from = not_before;
        loop {
            let start = court.earliest_fit(duration, from, changeover)?;
            let free = self.couples.earliest_free(couples, start, duration);
            if free == start {
                return Some(start);
            }
            from = free;
        }
    }

    fn place(&mut self, m: &Match, round: u32) -> Option<Placement> {
        let stage = self.snapshot.stage(m.stage_id);
        let duration = self.options.match_duration(m, stage);
        let changeover = self.options.changeover(stage);

        let not_before = [self.sequence_floor, self.dependency_floor(m, round)]
            .into_iter()
            .flatten()
            .max()
            .unwrap_or(NaiveDateTime::MIN);

        let candidates: Vec<(usize, NaiveDateTime)> = self
            .courts
            .iter()
            .enumerate()
            .filter_map(|(idx, court)| {
                self.find_slot(court, m.couples(), duration, not_before, changeover)
                    .map(|start| (idx, start))
            })
            .collect();

        let (idx, start) = self.choose(&candidates)?;
        let court_id = self.courts[idx].court_id;
        let end = start + duration;
        self.record(m, round, court_id, start, end);

        if matches!(
            self.strategy,
            MatchOrderingStrategy::TimeSequential | MatchOrderingStrategy::GroupClustered
        ) {
            self.sequence_floor = Some(self.sequence_floor.map_or(start, |f| f.max(start)));
        }

        debug!("Match {} planned on court {} at {}", m.id, court_id, start);
        Some(Placement { court_id, start, end, pre_scheduled: false })
    }

    fn choose(&self, candidates: &[(usize, NaiveDateTime)]) -> Option<(usize, NaiveDateTime)> {
        let court = |idx: usize| &self.courts[idx];
        let chosen = match self.strategy {
            MatchOrderingStrategy::BalancedLoad => candidates
                .iter()
                .min_by_key(|(idx, start)| (court(*idx).load(), *start, court(*idx).court_id)),
            MatchOrderingStrategy::CourtEfficient => candidates
                .iter()
                .min_by_key(|(idx, start)| (*start, court(*idx).finishes_at(), court(*idx).court_id)),
            MatchOrderingStrategy::TimeSequential | MatchOrderingStrategy::GroupClustered => candidates
                .iter()
                .min_by_key(|(idx, start)| (*start, court(*idx).court_id)),
        };
        chosen.copied()
    }
}

pub(crate) fn plan(
    snapshot: &TournamentSnapshot,
    strategy: MatchOrderingStrategy,
    options: &SchedulerOptions,
    window: Option<PlanningWindow>,
) -> OrderingOutcome {
    let context = OrderingContext::new(snapshot);

    // 1. Sequence pending matches by the strategy's precedence key
    let mut sequence: Vec<&Match> = snapshot.matches.iter().filter(|m| m.is_pending()).collect();
    sequence.sort_by_cached_key(|m| context.sequence_key(m, strategy));

    // 2. Place unscheduled matches onto courts
    let mut planner = Planner::new(snapshot, options, strategy, window, &context);
    let mut placements: HashMap<MatchId, Placement> = HashMap::new();
    let mut unresolved = Vec::new();

    for m in &sequence {
        if let Some((court_id, start, end)) = m.slot() {
            placements.insert(m.id, Placement { court_id, start, end, pre_scheduled: true });
            continue;
        }
        match planner.place(m, context.round(m)) {
            Some(placement) => {
                placements.insert(m.id, placement);
            }
            None => unresolved.push(m.id),
        }
    }

    // 3. Derive the display sequence
    let display = display_sequence(&sequence, &placements, strategy);

    // 4. Number everything
    let ordered = number_matches(&display, &placements, &context);

    info!(
        "Ordered {} matches of tournament {} using {} ({} unresolved)",
        ordered.len(),
        snapshot.tournament_id,
        strategy,
        unresolved.len()
    );

    OrderingOutcome {
        strategy,
        ordered,
        unresolved,
    }
}

/// Fixed-sequence strategies keep the precedence order; throughput strategies
/// show placed matches by start time and leave unresolved ones at the end.
fn display_sequence<'m>(
    sequence: &[&'m Match],
    placements: &HashMap<MatchId, Placement>,
    strategy: MatchOrderingStrategy,
) -> Vec<&'m Match> {
    match strategy {
        MatchOrderingStrategy::TimeSequential | MatchOrderingStrategy::GroupClustered => {
            sequence.to_vec()
        }
        MatchOrderingStrategy::BalancedLoad | MatchOrderingStrategy::CourtEfficient => {
            let mut indexed: Vec<(usize, &'m Match)> = sequence.iter().copied().enumerate().collect();
            indexed.sort_by_key(|(idx, m)| match placements.get(&m.id) {
                Some(p) => (0, Some(p.start), p.court_id, *idx),
                None => (1, None, 0, *idx),
            });
            indexed.into_iter().map(|(_, m)| m).collect()
        }
    }
}

fn number_matches(
    display: &[&Match],
    placements: &HashMap<MatchId, Placement>,
    context: &OrderingContext,
) -> Vec<OrderedMatch> {
    let total = display.len();
    let mut in_stage: BTreeMap<StageId, u32> = BTreeMap::new();
    let mut in_group: BTreeMap<GroupId, u32> = BTreeMap::new();

    display
        .iter()
        .enumerate()
        .map(|(idx, m)| {
            let stage_counter = in_stage.entry(m.stage_id).or_insert(0);
            *stage_counter += 1;
            let order_in_stage = *stage_counter;

            let order_in_group = m.group_id.map(|group| {
                let counter = in_group.entry(group).or_insert(0);
                *counter += 1;
                *counter
            });

            let slot = context.rounds.get(&m.id);
            let placement = placements.get(&m.id);

            OrderedMatch {
                match_id: m.id,
                stage_id: m.stage_id,
                group_id: m.group_id,
                bracket_id: m.bracket_id,
                display_order: idx as u32 + 1,
                order_in_stage,
                order_in_group,
                bracket_position: slot.and_then(|s| s.bracket_position.clone()),
                round_number: context.round(m),
                priority_score: priority_score(idx, total),
                court_id: placement.map(|p| p.court_id),
                scheduled_start: placement.map(|p| p.start),
                scheduled_end: placement.map(|p| p.end),
                pre_scheduled: placement.is_some_and(|p| p.pre_scheduled),
            }
        })
        .collect()
}

/// Higher for earlier display positions, in (0, 100]
fn priority_score(idx: usize, total: usize) -> f64 {
    let raw = (total - idx) as f64 * 100.0 / total as f64;
    (raw * 10_000.0).round() / 10_000.0
}
