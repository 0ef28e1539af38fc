use crate::battle::conditions::SideCondition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One of the two battle participants.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Player,
    Cpu,
}

impl Side {
    pub fn to_index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Cpu => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Cpu,
            Side::Cpu => Side::Player,
        }
    }

    /// Narration name of the side.
    pub fn label(self) -> &'static str {
        match self {
            Side::Player => "플레이어",
            Side::Cpu => "상대",
        }
    }

    /// Screen position (percent x, percent y) of the side's sprite, used to
    /// place floating annotations.
    pub fn anchor(self) -> (u8, u8) {
        match self {
            Side::Player => (30, 60),
            Side::Cpu => (70, 20),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Per-side battle state: hit points, the defense modifier and conditions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Combatant {
    pub hp: u32,
    pub max_hp: u32,
    /// Subtracted from incoming attack damage. Only ever lowered, with no floor.
    pub defense: i32,
    pub conditions: BTreeSet<SideCondition>,
    /// Name of the move this side resolved on its previous turn.
    pub last_move: Option<String>,
}

impl Combatant {
    pub fn new(max_hp: u32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            defense: 0,
            conditions: BTreeSet::new(),
            last_move: None,
        }
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    pub fn has_condition(&self, condition: SideCondition) -> bool {
        self.conditions.contains(&condition)
    }

    pub fn is_poisoned(&self) -> bool {
        self.has_condition(SideCondition::Poisoned)
    }

    pub fn is_shielded(&self) -> bool {
        self.has_condition(SideCondition::Shielded)
    }

    /// Lowers HP, stopping at zero. Returns the HP actually lost.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.hp);
        self.hp -= lost;
        lost
    }

    /// Raises HP, stopping at the maximum. Returns the HP actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let restored = amount.min(self.max_hp - self.hp);
        self.hp += restored;
        restored
    }
}
