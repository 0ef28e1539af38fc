//! Tunables for the arena, read from a RON file.
//!
//! Every field has a default, so a config file only needs the values it
//! changes and a missing file means "use the defaults".

use crate::errors::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the config file the binaries read.
pub const CONFIG_ENV_VAR: &str = "METRONOME_ARENA_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "arena.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub timings: Timings,
    pub rules: BattleRules,
    pub shop: ShopRules,
    /// Directory holding the progression record.
    pub storage_dir: PathBuf,
    /// Narration lines kept per battle; older lines are dropped first.
    pub log_capacity: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            timings: Timings::default(),
            rules: BattleRules::default(),
            shop: ShopRules::default(),
            storage_dir: PathBuf::from("save"),
            log_capacity: 100,
        }
    }
}

/// Presentation delays between battle phases, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub coin_toss_ms: u64,
    pub turn_start_ms: u64,
    pub animation_ms: u64,
    pub end_of_turn_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            coin_toss_ms: 2000,
            turn_start_ms: 1000,
            animation_ms: 1500,
            end_of_turn_ms: 1000,
        }
    }
}

impl Timings {
    pub fn coin_toss(&self) -> Duration {
        Duration::from_millis(self.coin_toss_ms)
    }

    pub fn turn_start(&self) -> Duration {
        Duration::from_millis(self.turn_start_ms)
    }

    pub fn animation(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }

    pub fn end_of_turn(&self) -> Duration {
        Duration::from_millis(self.end_of_turn_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleRules {
    pub player_max_hp: u32,
    /// End-of-turn damage per poisoned side.
    pub poison_damage: u32,
    /// Defense lost per DefenseDown hit.
    pub defense_drop: i32,
    /// Extra damage multiplier per upgrade level on the player's attacks.
    pub upgrade_damage_bonus: f64,
    /// Chance per upgrade level that a repeated protect still works.
    pub protect_chance_per_level: f64,
    /// Bonus HP per upgrade level when the player cures status.
    pub cure_heal_per_level: u32,
    /// Coins paid out when the CPU wins.
    pub cpu_win_reward: u32,
}

impl Default for BattleRules {
    fn default() -> Self {
        Self {
            player_max_hp: 200,
            poison_damage: 20,
            defense_drop: 10,
            upgrade_damage_bonus: 0.1,
            protect_chance_per_level: 0.1,
            cure_heal_per_level: 10,
            cpu_win_reward: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopRules {
    /// Coins per single draw; a ten-pull costs ten times this.
    pub pull_cost: u32,
}

impl Default for ShopRules {
    fn default() -> Self {
        Self { pull_cost: 30 }
    }
}

impl ArenaConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(source)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path`, falling back to defaults when it is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(%err, "config rejected, using defaults");
                Self::default()
            }
        }
    }

    /// The config path named by the environment, or the default path.
    pub fn path_from_env() -> PathBuf {
        std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}
