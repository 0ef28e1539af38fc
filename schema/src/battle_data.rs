use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, EnumString};

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Fixed numbers attached to each difficulty tier.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    pub max_opponent_hp: u32,
    /// Applied to damage dealt by the CPU only.
    pub damage_multiplier: f64,
    pub reward_on_win: u32,
    pub label: &'static str,
}

impl Difficulty {
    pub fn profile(self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                max_opponent_hp: 180,
                damage_multiplier: 1.0,
                reward_on_win: 100,
                label: "초급",
            },
            Difficulty::Medium => DifficultyProfile {
                max_opponent_hp: 300,
                damage_multiplier: 1.2,
                reward_on_win: 150,
                label: "중급",
            },
            Difficulty::Hard => DifficultyProfile {
                max_opponent_hp: 400,
                damage_multiplier: 1.5,
                reward_on_win: 200,
                label: "고급",
            },
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.profile().label)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum CoinSide {
    Heads,
    Tails,
}

impl fmt::Display for CoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            CoinSide::Heads => "앞면",
            CoinSide::Tails => "뒷면",
        };
        write!(f, "{}", display_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_tier_names_case_insensitively() {
        assert_eq!(Difficulty::from_str("easy"), Ok(Difficulty::Easy));
        assert_eq!(Difficulty::from_str("HARD"), Ok(Difficulty::Hard));
        assert!(Difficulty::from_str("nightmare").is_err());
        assert_eq!(CoinSide::from_str("tails"), Ok(CoinSide::Tails));
    }

    #[test]
    fn tiers_grow_harder() {
        let profiles: Vec<_> = Difficulty::iter().map(Difficulty::profile).collect();
        assert_eq!(profiles.len(), 3);
        for pair in profiles.windows(2) {
            assert!(pair[0].max_opponent_hp < pair[1].max_opponent_hp);
            assert!(pair[0].damage_multiplier < pair[1].damage_multiplier);
            assert!(pair[0].reward_on_win < pair[1].reward_on_win);
        }
    }
}
