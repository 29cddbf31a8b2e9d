use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{TournamentId, TournamentSnapshot};

/// File-based store keeping one JSON document per tournament
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Create a new store rooted at `dir`
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).context("Failed to create snapshot directory")?;
        Ok(Self { dir })
    }

    /// Replace the stored snapshot in one step
    pub fn save(&self, snapshot: &TournamentSnapshot) -> Result<()> {
        let file_path = self.build_path(snapshot.tournament_id);
        self.write_json_atomic(&file_path, snapshot)?;
        info!("Saved snapshot: {}", file_path.display());
        Ok(())
    }

    pub fn load(&self, tournament_id: TournamentId) -> Result<Option<TournamentSnapshot>> {
        let file_path = self.build_path(tournament_id);
        self.read_json_opt(&file_path)
    }

    /// Ids of all stored tournaments, ascending
    pub fn list(&self) -> Result<Vec<TournamentId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir).context("Failed to read snapshot directory")? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()).map(str::parse::<TournamentId>) {
                Some(Ok(id)) => ids.push(id),
                _ => warn!("Skipping unexpected file in snapshot directory: {}", path.display()),
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Every stored snapshot; unreadable files are skipped with a warning
    pub fn load_all(&self) -> Result<Vec<TournamentSnapshot>> {
        let mut snapshots = Vec::new();
        for id in self.list()? {
            match self.load(id) {
                Ok(Some(snapshot)) => snapshots.push(snapshot),
                Ok(None) => {}
                Err(e) => warn!("Failed to load snapshot {}: {:?}", id, e),
            }
        }
        info!("Loaded {} snapshots from {}", snapshots.len(), self.dir.display());
        Ok(snapshots)
    }

    fn build_path(&self, tournament_id: TournamentId) -> PathBuf {
        self.dir.join(format!("{}.json", tournament_id))
    }

    fn write_json_atomic<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data).context("Failed to serialize snapshot")?;
        let temp_path = path.with_extension("json.tmp");

        if temp_path.exists() {
            fs::remove_file(&temp_path)?;
        }
        fs::write(&temp_path, json).context("Failed to write snapshot file")?;
        fs::rename(&temp_path, path).context("Failed to replace snapshot file")?;
        Ok(())
    }

    fn read_json_opt<T: for<'de> Deserialize<'de>>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(path)?;
        let data = serde_json::from_str(&json).with_context(|| {
            format!(
                "Failed to parse JSON from {:?}. First 200 chars: {}",
                path,
                json.chars().take(200).collect::<String>()
            )
        })?;
        Ok(Some(data))
    }
}
