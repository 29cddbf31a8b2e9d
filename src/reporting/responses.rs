use serde::{Deserialize, Serialize};

use crate::domain::{CoupleStats, GroupId, GroupStandings, MatchId, MatchOrderingStrategy};
use crate::scheduling::{AutoScheduleOutcome, OrderingOutcome};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsResponse {
    pub group_id: GroupId,
    pub group_name: String,
    pub standings: Vec<CoupleStats>,
}

impl From<GroupStandings> for StandingsResponse {
    fn from(group: GroupStandings) -> Self {
        Self {
            group_id: group.group_id,
            group_name: group.group_name,
            standings: group.standings,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateMatchOrderResponse {
    pub success: bool,
    pub total_matches_ordered: usize,
    pub strategy_used: MatchOrderingStrategy,
    pub calculation_time_ms: u64,
    pub message: String,
    pub unresolved_matches: usize,
}

impl CalculateMatchOrderResponse {
    pub fn from_outcome(outcome: &OrderingOutcome, calculation_time_ms: u64) -> Self {
        let total = outcome.total_ordered();
        let unresolved = outcome.unresolved.len();
        let message = if unresolved == 0 {
            format!("Ordered {} matches using {}", total, outcome.strategy)
        } else {
            format!(
                "Ordered {} matches using {}; {} could not be placed on any court",
                total, outcome.strategy, unresolved
            )
        };

        Self {
            success: true,
            total_matches_ordered: total,
            strategy_used: outcome.strategy,
            calculation_time_ms,
            message,
            unresolved_matches: unresolved,
        }
    }

    /// Response for a request answered from the stored ordering
    pub fn unchanged(strategy: MatchOrderingStrategy, total: usize, unresolved: usize) -> Self {
        Self {
            success: true,
            total_matches_ordered: total,
            strategy_used: strategy,
            calculation_time_ms: 0,
            message: "Match order already calculated; pass force_recalculate to recompute".to_string(),
            unresolved_matches: unresolved,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoScheduleResponse {
    pub success: bool,
    pub scheduled_matches: usize,
    pub unresolved_matches: usize,
    pub unresolved_match_ids: Vec<MatchId>,
    pub strategy_used: MatchOrderingStrategy,
    pub message: String,
}

impl From<&AutoScheduleOutcome> for AutoScheduleResponse {
    fn from(outcome: &AutoScheduleOutcome) -> Self {
        let unresolved = outcome.ordering.unresolved.clone();
        Self {
            success: true,
            scheduled_matches: outcome.scheduled.len(),
            unresolved_matches: unresolved.len(),
            message: format!(
                "Scheduled {} matches, {} left unscheduled",
                outcome.scheduled.len(),
                unresolved.len()
            ),
            unresolved_match_ids: unresolved,
            strategy_used: outcome.ordering.strategy,
        }
    }
}
