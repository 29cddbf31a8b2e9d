use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::config::SchedulingSettings;
use crate::domain::{
    BracketId, CourtId, GroupId, Match, MatchId, MatchOrderingStrategy, Stage, StageId,
};

/// Timing knobs the planner needs, resolved from settings and stage config
#[derive(Debug, Clone, Copy)]
pub struct SchedulerOptions {
    pub default_match_minutes: u32,
    pub changeover_minutes: u32,
}

impl From<&SchedulingSettings> for SchedulerOptions {
    fn from(settings: &SchedulingSettings) -> Self {
        Self {
            default_match_minutes: settings.default_match_minutes,
            changeover_minutes: settings.changeover_minutes,
        }
    }
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        SchedulerOptions::from(&SchedulingSettings::default())
    }
}

impl SchedulerOptions {
    /// A stage duration of zero minutes counts as unset
    pub fn match_duration(&self, m: &Match, stage: Option<&Stage>) -> Duration {
        let fallback = stage
            .and_then(|s| s.config.match_rules.match_duration_minutes)
            .filter(|minutes| *minutes > 0)
            .unwrap_or(self.default_match_minutes);
        m.expected_duration(fallback)
    }

    pub fn changeover(&self, stage: Option<&Stage>) -> Duration {
        let minutes = stage
            .and_then(|s| s.config.scheduling_options.changeover_minutes)
            .unwrap_or(self.changeover_minutes);
        Duration::minutes(i64::from(minutes))
    }
}

/// Date range `[start, end)` restricting where new slots may be placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanningWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Ordering fields computed for one match, plus its planned slot if any
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderedMatch {
    pub match_id: MatchId,
    pub stage_id: StageId,
    pub group_id: Option<GroupId>,
    pub bracket_id: Option<BracketId>,
    pub display_order: u32,
    pub order_in_stage: u32,
    pub order_in_group: Option<u32>,
    pub bracket_position: Option<String>,
    pub round_number: u32,
    pub priority_score: f64,
    pub court_id: Option<CourtId>,
    pub scheduled_start: Option<NaiveDateTime>,
    pub scheduled_end: Option<NaiveDateTime>,
    /// Slot existed before planning and was kept untouched
    pub pre_scheduled: bool,
}

impl OrderedMatch {
    pub fn is_placed(&self) -> bool {
        self.court_id.is_some() && self.scheduled_start.is_some() && self.scheduled_end.is_some()
    }
}

/// Result of one `calculate_match_order` run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderingOutcome {
    pub strategy: MatchOrderingStrategy,
    pub ordered: Vec<OrderedMatch>,
    /// Matches no court could host without overlapping another booking
    pub unresolved: Vec<MatchId>,
}

impl OrderingOutcome {
    pub fn total_ordered(&self) -> usize {
        self.ordered.len()
    }
}

/// Result of an auto-schedule pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoScheduleOutcome {
    pub ordering: OrderingOutcome,
    /// Matches that received a new court and time
    pub scheduled: Vec<MatchId>,
}
