use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::time::{iso, iso_option};
use crate::errors::TournamentError;

pub type TournamentId = i64;
pub type PlayerId = i64;
pub type CoupleId = i64;
pub type CourtId = i64;
pub type StageId = i64;
pub type GroupId = i64;
pub type BracketId = i64;
pub type MatchId = i64;

/// Doubles team, the unit that plays matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Couple {
    pub id: CoupleId,
    pub tournament_id: TournamentId,
    pub first_player_id: PlayerId,
    pub second_player_id: PlayerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub seed: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    pub name: String,
    #[serde(with = "iso")]
    pub availability_start: NaiveDateTime,
    #[serde(with = "iso")]
    pub availability_end: NaiveDateTime,
}

impl Court {
    /// Whether `[start, end)` fits inside the court's availability window
    pub fn covers(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start >= self.availability_start && end <= self.availability_end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageType {
    Group,
    Elimination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub tournament_id: TournamentId,
    pub stage_type: StageType,
    pub order: i32,
    #[serde(default)]
    pub config: StageConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub scoring_system: ScoringSystem,
    pub match_rules: MatchRules,
    pub advancement_rules: AdvancementRules,
    pub scheduling_options: SchedulingOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringType {
    Points,
    Games,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSystem {
    #[serde(rename = "type")]
    pub scoring_type: ScoringType,
    pub win: i64,
    pub draw: i64,
    pub loss: i64,
    pub game_win: i64,
    pub game_loss: i64,
}

impl Default for ScoringSystem {
    fn default() -> Self {
        Self {
            scoring_type: ScoringType::Points,
            win: 3,
            draw: 1,
            loss: 0,
            game_win: 0,
            game_loss: 0,
        }
    }
}

impl ScoringSystem {
    pub fn counts_game_points(&self) -> bool {
        matches!(self.scoring_type, ScoringType::Games | ScoringType::Both)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    /// Expected duration of an untimed match in this stage
    pub match_duration_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancementRules {
    pub top_n: u32,
    pub to_bracket: Option<BracketType>,
    pub tiebreaker: Vec<TiebreakerMethod>,
}

impl Default for AdvancementRules {
    fn default() -> Self {
        Self {
            top_n: 2,
            to_bracket: None,
            tiebreaker: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingOptions {
    /// Gap kept free on a court between two consecutive matches
    pub changeover_minutes: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiebreakerMethod {
    Points,
    HeadToHead,
    GamesDiff,
    GamesWon,
    MatchesWon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub stage_id: StageId,
    pub name: String,
    #[serde(default)]
    pub couple_ids: Vec<CoupleId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketType {
    Main,
    Silver,
    Bronze,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub id: BracketId,
    pub stage_id: StageId,
    pub bracket_type: BracketType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResultStatus {
    #[default]
    Pending,
    Completed,
    TimeExpired,
    Forfeited,
}

/// A single game (set) of a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub game_number: u32,
    pub couple1_score: u32,
    pub couple2_score: u32,
    #[serde(default)]
    pub winner_id: Option<CoupleId>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

/// Which side of a match a couple occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub stage_id: StageId,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub bracket_id: Option<BracketId>,
    pub couple1_id: CoupleId,
    pub couple2_id: CoupleId,
    #[serde(default)]
    pub winner_couple_id: Option<CoupleId>,
    #[serde(default)]
    pub games: Vec<Game>,
    #[serde(default)]
    pub court_id: Option<CourtId>,
    #[serde(default, with = "iso_option")]
    pub scheduled_start: Option<NaiveDateTime>,
    #[serde(default, with = "iso_option")]
    pub scheduled_end: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_time_limited: bool,
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
    #[serde(default)]
    pub match_result_status: MatchResultStatus,
    #[serde(default)]
    pub display_order: Option<u32>,
    #[serde(default)]
    pub order_in_stage: Option<u32>,
    #[serde(default)]
    pub order_in_group: Option<u32>,
    #[serde(default)]
    pub bracket_position: Option<String>,
    #[serde(default)]
    pub round_number: Option<u32>,
    #[serde(default)]
    pub priority_score: Option<f64>,
}

impl Match {
    pub fn side_of(&self, couple_id: CoupleId) -> Option<Side> {
        if couple_id == self.couple1_id {
            Some(Side::First)
        } else if couple_id == self.couple2_id {
            Some(Side::Second)
        } else {
            None
        }
    }

    pub fn involves(&self, couple_id: CoupleId) -> bool {
        self.side_of(couple_id).is_some()
    }

    pub fn couples(&self) -> [CoupleId; 2] {
        [self.couple1_id, self.couple2_id]
    }

    pub fn is_pending(&self) -> bool {
        self.match_result_status == MatchResultStatus::Pending
    }

    /// Court and both bounds are set
    pub fn slot(&self) -> Option<(CourtId, NaiveDateTime, NaiveDateTime)> {
        match (self.court_id, self.scheduled_start, self.scheduled_end) {
            (Some(court), Some(start), Some(end)) => Some((court, start, end)),
            _ => None,
        }
    }

    /// Expected playing time: the time limit for timed matches, otherwise `fallback`
    pub fn expected_duration(&self, fallback_minutes: u32) -> Duration {
        let minutes = match (self.is_time_limited, self.time_limit_minutes) {
            (true, Some(limit)) if limit > 0 => limit,
            _ => fallback_minutes,
        };
        Duration::minutes(i64::from(minutes))
    }

    pub fn clear_schedule(&mut self) {
        self.court_id = None;
        self.scheduled_start = None;
        self.scheduled_end = None;
    }
}

/// Derived per-couple statistics for one group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoupleStats {
    pub couple_id: CoupleId,
    #[serde(default)]
    pub couple_name: String,
    pub matches_played: u32,
    pub matches_won: u32,
    pub matches_lost: u32,
    pub matches_drawn: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub games_diff: i64,
    pub total_points: i64,
    pub win_percentage: f64,
    pub position: u32,
}

impl CoupleStats {
    pub fn new(couple_id: CoupleId) -> Self {
        Self {
            couple_id,
            ..Self::default()
        }
    }
}

/// Ranked standings of one group as of `last_updated`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStandings {
    pub group_id: GroupId,
    pub group_name: String,
    pub standings: Vec<CoupleStats>,
    #[serde(with = "iso")]
    pub last_updated: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOrderingStrategy {
    BalancedLoad,
    CourtEfficient,
    TimeSequential,
    GroupClustered,
}

impl MatchOrderingStrategy {
    pub const ALL: [MatchOrderingStrategy; 4] = [
        MatchOrderingStrategy::BalancedLoad,
        MatchOrderingStrategy::CourtEfficient,
        MatchOrderingStrategy::TimeSequential,
        MatchOrderingStrategy::GroupClustered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOrderingStrategy::BalancedLoad => "balanced_load",
            MatchOrderingStrategy::CourtEfficient => "court_efficient",
            MatchOrderingStrategy::TimeSequential => "time_sequential",
            MatchOrderingStrategy::GroupClustered => "group_clustered",
        }
    }
}

impl fmt::Display for MatchOrderingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchOrderingStrategy {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatchOrderingStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s.trim())
            .ok_or_else(|| TournamentError::InvalidStrategy(s.to_string()))
    }
}

/// Bookkeeping of the last match-order calculation applied to a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderingRecord {
    pub strategy: MatchOrderingStrategy,
    pub total_matches_ordered: usize,
    pub unresolved_matches: usize,
    #[serde(with = "iso")]
    pub calculated_at: NaiveDateTime,
}

/// Everything the engines need about one tournament, read and written as a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentSnapshot {
    pub tournament_id: TournamentId,
    #[serde(default)]
    pub couples: Vec<Couple>,
    #[serde(default)]
    pub courts: Vec<Court>,
    #[serde(default)]
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub brackets: Vec<Bracket>,
    #[serde(default)]
    pub matches: Vec<Match>,
    #[serde(default)]
    pub standings: BTreeMap<GroupId, GroupStandings>,
    #[serde(default)]
    pub last_ordering: Option<OrderingRecord>,
}
