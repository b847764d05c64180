//! Configuration for a game table.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{TableError, TableResult};

/// The characters belonging to one room's campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    /// Character name to template path.
    #[serde(default)]
    pub characters: BTreeMap<String, String>,
}

/// Configuration for a game table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// User id of the game master.
    pub game_master: String,
    /// Room that receives messages relayed to the game master.
    pub gm_room: String,
    /// Base directory for character templates.
    pub template_dir: PathBuf,
    /// Campaigns by room.
    pub campaigns: BTreeMap<String, Campaign>,
    /// How many times a store operation is attempted (1-10).
    pub store_attempts: u32,
    /// RNG seed for reproducible rolls. Unset means OS entropy.
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            game_master: String::new(),
            gm_room: "main".to_string(),
            template_dir: PathBuf::from("characters"),
            campaigns: BTreeMap::new(),
            store_attempts: 3,
            seed: None,
        }
    }
}

impl TableConfig {
    /// Parse a YAML config.
    pub fn from_yaml(text: &str) -> TableResult<Self> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|e| TableError::Config(e.to_string()))?;
        let attempts = config.store_attempts;
        Ok(config.with_store_attempts(attempts))
    }

    /// Read a YAML config file. A relative `template_dir` is taken relative
    /// to the file.
    pub fn load(path: &Path) -> TableResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| TableError::Config(format!("{}: {e}", path.display())))?;
        let mut config = Self::from_yaml(&text)?;
        if let Some(dir) = path.parent().filter(|_| config.template_dir.is_relative()) {
            config.template_dir = dir.join(&config.template_dir);
        }
        tracing::debug!(path = %path.display(), campaigns = config.campaigns.len(), "loaded config");
        Ok(config)
    }

    /// Set the game master.
    pub fn with_game_master(mut self, user: impl Into<String>) -> Self {
        self.game_master = user.into();
        self
    }

    /// Set the room messages to the game master are relayed to.
    pub fn with_gm_room(mut self, room: impl Into<String>) -> Self {
        self.gm_room = room.into();
        self
    }

    /// Set the template directory.
    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = dir.into();
        self
    }

    /// Register a campaign character for a room.
    pub fn with_character(
        mut self,
        room: impl Into<String>,
        name: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.campaigns
            .entry(room.into())
            .or_default()
            .characters
            .insert(name.into(), template.into());
        self
    }

    /// Set the store attempt budget (clamped to 1-10).
    pub fn with_store_attempts(mut self, attempts: u32) -> Self {
        self.store_attempts = attempts.clamp(1, 10);
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Whether `user` is the game master.
    pub fn is_game_master(&self, user: &str) -> bool {
        !self.game_master.is_empty() && self.game_master == user
    }

    /// The template for a campaign character, matching the name without
    /// regard to case.
    pub fn template_for(&self, room: &str, name: &str) -> Option<&str> {
        let characters = &self.campaigns.get(room)?.characters;
        characters
            .get(name)
            .or_else(|| {
                characters
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }

    /// Whether `name` is one of the room's campaign characters.
    pub fn is_player(&self, room: &str, name: &str) -> bool {
        self.template_for(room, name).is_some()
    }
}
