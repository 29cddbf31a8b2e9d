use std::collections::{BTreeSet, HashMap};

use super::models::*;
use crate::errors::{TournamentError, TournamentResult};

impl TournamentSnapshot {
    pub fn new(tournament_id: TournamentId) -> Self {
        Self {
            tournament_id,
            couples: Vec::new(),
            courts: Vec::new(),
            stages: Vec::new(),
            groups: Vec::new(),
            brackets: Vec::new(),
            matches: Vec::new(),
            standings: Default::default(),
            last_ordering: None,
        }
    }

    pub fn stage(&self, stage_id: StageId) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    pub fn group(&self, group_id: GroupId) -> TournamentResult<&Group> {
        self.groups
            .iter()
            .find(|g| g.id == group_id)
            .ok_or(TournamentError::GroupNotFound(group_id))
    }

    pub fn court(&self, court_id: CourtId) -> TournamentResult<&Court> {
        self.courts
            .iter()
            .find(|c| c.id == court_id)
            .ok_or(TournamentError::CourtNotFound(court_id))
    }

    pub fn match_by_id(&self, match_id: MatchId) -> TournamentResult<&Match> {
        self.matches
            .iter()
            .find(|m| m.id == match_id)
            .ok_or(TournamentError::MatchNotFound(match_id))
    }

    pub fn match_by_id_mut(&mut self, match_id: MatchId) -> TournamentResult<&mut Match> {
        self.matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or(TournamentError::MatchNotFound(match_id))
    }

    pub fn has_group(&self, group_id: GroupId) -> bool {
        self.groups.iter().any(|g| g.id == group_id)
    }

    pub fn has_match(&self, match_id: MatchId) -> bool {
        self.matches.iter().any(|m| m.id == match_id)
    }

    pub fn couple_ids(&self) -> BTreeSet<CoupleId> {
        self.couples.iter().map(|c| c.id).collect()
    }

    pub fn couple_names(&self) -> HashMap<CoupleId, String> {
        self.couples.iter().map(|c| (c.id, c.name.clone())).collect()
    }

    /// Scoring, tiebreakers and timing configured on the stage owning `group`
    pub fn stage_config_for_group(&self, group: &Group) -> StageConfig {
        self.stage(group.stage_id)
            .map(|s| s.config.clone())
            .unwrap_or_default()
    }

    /// Matches recorded against `group_id`
    pub fn group_matches(&self, group_id: GroupId) -> Vec<Match> {
        self.matches
            .iter()
            .filter(|m| m.group_id == Some(group_id))
            .cloned()
            .collect()
    }

    /// Whether every pending match carries ordering data from a previous calculation
    pub fn has_ordering(&self) -> bool {
        let mut pending = self.matches.iter().filter(|m| m.is_pending()).peekable();
        pending.peek().is_some() && pending.all(|m| m.display_order.is_some())
    }
}
