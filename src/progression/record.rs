use super::{DEFAULT_DECK, MAX_UPGRADE_LEVEL, STARTING_COINS};
use crate::move_data::catalog_position;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// The durable meta-progression of one player.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub coins: u32,
    /// Owned copies; duplicates are upgrade fuel.
    pub inventory: Vec<String>,
    pub deck: Vec<String>,
    /// Move name to level 1..=5. Level 0 moves are absent.
    pub upgrades: BTreeMap<String, u8>,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        let deck: Vec<String> = DEFAULT_DECK.iter().map(|name| name.to_string()).collect();
        Self {
            coins: STARTING_COINS,
            inventory: deck.clone(),
            deck,
            upgrades: BTreeMap::new(),
        }
    }
}

impl ProgressRecord {
    pub fn copies(&self, name: &str) -> usize {
        self.inventory.iter().filter(|owned| *owned == name).count()
    }

    pub fn upgrade_level(&self, name: &str) -> u8 {
        self.upgrades.get(name).copied().unwrap_or(0)
    }

    /// A move is owned when a copy is held or it has been upgraded.
    pub fn owns(&self, name: &str) -> bool {
        self.copies(name) > 0 || self.upgrade_level(name) > 0
    }

    /// Every owned move name once, catalog order first, unknown names after.
    pub fn owned_moves(&self) -> Vec<String> {
        let mut owned: Vec<String> = self
            .inventory
            .iter()
            .chain(self.upgrades.keys())
            .filter(|name| self.owns(name))
            .cloned()
            .collect();
        owned.sort_by(|a, b| {
            let rank = |name: &str| catalog_position(name).unwrap_or(usize::MAX);
            rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
        });
        owned.dedup();
        owned
    }

    /// Drops deck entries that are no longer owned and returns them.
    pub fn sanitize(&mut self) -> Vec<String> {
        let (kept, dropped): (Vec<String>, Vec<String>) = std::mem::take(&mut self.deck)
            .into_iter()
            .partition(|name| self.owns(name));
        self.deck = kept;
        dropped
    }

    /// Parses a stored blob field by field, falling back to the default for
    /// anything missing or malformed, then sanitizes the deck.
    pub fn from_stored(blob: &str) -> Self {
        let mut record = match serde_json::from_str::<Value>(blob) {
            Ok(Value::Object(fields)) => Self::from_fields(&fields),
            Ok(other) => {
                warn!(kind = json_kind(&other), "stored progress is not an object, using defaults");
                Self::default()
            }
            Err(err) => {
                warn!(%err, "stored progress is not valid JSON, using defaults");
                Self::default()
            }
        };

        let dropped = record.sanitize();
        if !dropped.is_empty() {
            warn!(?dropped, "removed deck moves that are no longer owned");
        }
        record
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        let defaults = Self::default();

        let coins = match fields.get("coins") {
            None => defaults.coins,
            Some(value) => match value.as_u64() {
                Some(coins) => u32::try_from(coins).unwrap_or(u32::MAX),
                None => {
                    warn!(%value, "invalid coins field, using default");
                    defaults.coins
                }
            },
        };

        let inventory = match fields.get("inventory") {
            None => defaults.inventory,
            Some(value) => string_list(value).unwrap_or_else(|| {
                warn!("invalid inventory field, using default");
                defaults.inventory
            }),
        };

        let deck = match fields.get("deck") {
            None => defaults.deck,
            Some(value) => string_list(value).unwrap_or_else(|| {
                warn!("invalid deck field, using default");
                defaults.deck
            }),
        };

        let upgrades = match fields.get("upgrades") {
            None => defaults.upgrades,
            Some(Value::Object(levels)) => levels
                .iter()
                .filter_map(|(name, level)| {
                    let level = level.as_u64()?;
                    let level = level.min(u64::from(MAX_UPGRADE_LEVEL)) as u8;
                    (level > 0).then(|| (name.clone(), level))
                })
                .collect(),
            Some(_) => {
                warn!("invalid upgrades field, using default");
                defaults.upgrades
            }
        };

        Self {
            coins,
            inventory,
            deck,
            upgrades,
        }
    }
}

/// The string elements of a JSON array; non-string elements are skipped.
fn string_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
    )
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
