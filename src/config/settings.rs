use std::path::PathBuf;

use crate::domain::{MatchOrderingStrategy, TiebreakerMethod};

#[derive(Debug, Clone)]
pub struct SchedulingSettings {
    pub default_match_minutes: u32,
    pub changeover_minutes: u32,
    pub next_matches_limit: usize,
    /// Used by the calling layer only; the scheduler itself always takes an explicit strategy
    pub default_strategy: MatchOrderingStrategy,
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            default_match_minutes: 60,
            changeover_minutes: 0,
            next_matches_limit: 5,
            default_strategy: MatchOrderingStrategy::TimeSequential,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StandingsSettings {
    pub default_tiebreakers: Vec<TiebreakerMethod>,
}

impl Default for StandingsSettings {
    fn default() -> Self {
        Self {
            default_tiebreakers: vec![
                TiebreakerMethod::HeadToHead,
                TiebreakerMethod::GamesDiff,
                TiebreakerMethod::GamesWon,
                TiebreakerMethod::MatchesWon,
            ],
        }
    }
}

impl StandingsSettings {
    /// Stage tiebreakers when configured, the default chain otherwise
    pub fn tiebreakers_or_default<'a>(&'a self, configured: &'a [TiebreakerMethod]) -> &'a [TiebreakerMethod] {
        if configured.is_empty() {
            &self.default_tiebreakers
        } else {
            configured
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub snapshot_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        let snapshot_dir = std::env::var("SNAPSHOT_DIR").unwrap_or_else(|_| "snapshots".to_string());
        Self {
            snapshot_dir: PathBuf::from(snapshot_dir),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub scheduling: SchedulingSettings,
    pub standings: StandingsSettings,
    pub storage: StorageSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage.snapshot_dir = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiebreakers_fall_back_to_default_chain() {
        let settings = StandingsSettings::default();
        assert_eq!(settings.tiebreakers_or_default(&[]).len(), 4);
        assert_eq!(
            settings.tiebreakers_or_default(&[TiebreakerMethod::GamesWon]),
            &[TiebreakerMethod::GamesWon]
        );
    }
}
