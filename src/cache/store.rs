use anyhow::{Context, Result, bail};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{DivisionCollection, PlayerCollection, Team, TeamCollection};
use crate::errors::persist_context;

pub const TEAMS_FILE: &str = "teams";
pub const DIVISIONS_FILE: &str = "divisions";
pub const PLAYERS_FILE: &str = "players";

/// Directory holding the three JSON collections of a crawl
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_teams(&self, teams: &TeamCollection) -> Result<()> {
        self.save(TEAMS_FILE, teams.as_map())
            .with_context(|| persist_context("save", TEAMS_FILE))
    }

    pub fn save_divisions(&self, divisions: &DivisionCollection) -> Result<()> {
        self.save(DIVISIONS_FILE, divisions.as_map())
            .with_context(|| persist_context("save", DIVISIONS_FILE))
    }

    pub fn save_players(&self, players: &PlayerCollection) -> Result<()> {
        self.save(PLAYERS_FILE, players.as_map())
            .with_context(|| persist_context("save", PLAYERS_FILE))
    }

    /// Load the teams written by an earlier run; a missing file is an error
    pub fn load_teams(&self) -> Result<TeamCollection> {
        let path = self.path_for(TEAMS_FILE);
        let teams: Option<BTreeMap<String, Team>> = self
            .read_json_opt(&path)
            .with_context(|| persist_context("load", TEAMS_FILE))?;

        match teams {
            Some(teams) => {
                info!("Loaded {} teams from {}", teams.len(), path.display());
                Ok(TeamCollection::from_map(teams))
            }
            None => bail!("No teams file at {}, run a full crawl first", path.display()),
        }
    }

    fn save<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let path = self.path_for(key);
        self.write_json(&path, data)?;
        info!("Saved {}", path.display());
        Ok(())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data).context("Failed to serialize data")?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
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
