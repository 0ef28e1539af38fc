use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary flags that can sit on a side during battle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SideCondition {
    /// Loses a fixed amount of HP at every end of turn until cured.
    Poisoned,
    /// Blocks the next attack. Expires when the owner's next turn starts.
    Shielded,
}

impl fmt::Display for SideCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideCondition::Poisoned => write!(f, "맹독"),
            SideCondition::Shielded => write!(f, "방어"),
        }
    }
}
