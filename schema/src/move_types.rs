use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Cosmetic elemental tag. It never changes damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveType {
    Normal,
    Electric,
    Psychic,
    Water,
    Poison,
    Ghost,
}

impl fmt::Display for MoveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveType::Normal => write!(f, "노말"),
            MoveType::Electric => write!(f, "전기"),
            MoveType::Psychic => write!(f, "에스퍼"),
            MoveType::Water => write!(f, "물"),
            MoveType::Poison => write!(f, "독"),
            MoveType::Ghost => write!(f, "고스트"),
        }
    }
}

/// Non-damaging payloads. Every variant has exactly one handler in the battle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveEffect {
    DefenseDown,
    Toxic,
    Protect,
    CureStatus,
}

impl fmt::Display for MoveEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveEffect::DefenseDown => write!(f, "상대 방어 감소"),
            MoveEffect::Toxic => write!(f, "맹독"),
            MoveEffect::Protect => write!(f, "방어"),
            MoveEffect::CureStatus => write!(f, "상태 이상 회복"),
        }
    }
}

/// Move-specific rules layered on top of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveQuirk {
    /// The user skips its next turn, whether or not the attack connected.
    MustRecharge,
    /// The target is immune; the attack always deals zero.
    TargetImmune,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveData {
    pub name: String,
    pub move_type: MoveType,
    #[serde(default)]
    pub damage: Option<u16>,
    #[serde(default)]
    pub heal: Option<u16>,
    #[serde(default)]
    pub effect: Option<MoveEffect>,
    #[serde(default)]
    pub quirk: Option<MoveQuirk>,
    pub weight: OrderedFloat<f64>,
}

impl MoveData {
    /// A damage payload above zero.
    pub fn is_attack(&self) -> bool {
        matches!(self.damage, Some(damage) if damage > 0)
    }

    /// A declared damage payload of exactly zero.
    pub fn is_no_op_attack(&self) -> bool {
        self.damage == Some(0)
    }

    pub fn has_quirk(&self, quirk: MoveQuirk) -> bool {
        self.quirk == Some(quirk)
    }

    /// Checks the per-entry rules of the catalog.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("move name must not be empty".to_string());
        }
        if !self.weight.is_finite() || self.weight.0 <= 0.0 {
            return Err(format!("{}: weight must be positive, got {}", self.name, self.weight));
        }
        if self.heal == Some(0) {
            return Err(format!("{}: heal payload must be positive", self.name));
        }

        let payloads = [
            self.damage.is_some(),
            self.heal.is_some(),
            self.effect.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();
        if payloads > 1 {
            return Err(format!(
                "{}: a catalog entry carries at most one of damage, heal and effect",
                self.name
            ));
        }
        Ok(())
    }
}

/// Validates every entry plus name uniqueness across the whole catalog.
pub fn validate_catalog(moves: &[MoveData]) -> Result<(), String> {
    if moves.is_empty() {
        return Err("move catalog is empty".to_string());
    }
    let mut seen = HashSet::new();
    for move_data in moves {
        move_data.validate()?;
        if !seen.insert(move_data.name.as_str()) {
            return Err(format!("duplicate move name: {}", move_data.name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tackle() -> MoveData {
        MoveData {
            name: "몸통박치기".to_string(),
            move_type: MoveType::Normal,
            damage: Some(40),
            heal: None,
            effect: None,
            quirk: None,
            weight: OrderedFloat(40.0),
        }
    }

    #[test]
    fn zero_damage_is_not_an_attack() {
        let mut splash = tackle();
        splash.damage = Some(0);
        assert!(!splash.is_attack());
        assert!(splash.is_no_op_attack());
        assert!(tackle().is_attack());
    }

    #[test]
    fn rejects_two_payloads() {
        let mut broken = tackle();
        broken.effect = Some(MoveEffect::Toxic);
        assert!(broken.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_weight() {
        let mut broken = tackle();
        broken.weight = OrderedFloat(0.0);
        assert!(broken.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_names() {
        assert!(validate_catalog(&[tackle(), tackle()]).is_err());
        assert!(validate_catalog(&[tackle()]).is_ok());
    }
}
