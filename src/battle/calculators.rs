use crate::config::BattleRules;
use crate::player::Side;
use schema::Difficulty;

/// Damage an attack of `base_damage` deals before immunity and shields.
///
/// CPU attacks scale with the difficulty tier, player attacks with the
/// move's upgrade level. The scaled value is rounded, the target's defense
/// modifier is subtracted and the result never drops below 1.
pub fn calculate_attack_damage(
    base_damage: u16,
    attacker: Side,
    upgrade_level: u8,
    difficulty: Difficulty,
    target_defense: i32,
    rules: &BattleRules,
) -> u32 {
    let multiplier = match attacker {
        Side::Cpu => difficulty.profile().damage_multiplier,
        Side::Player => 1.0 + rules.upgrade_damage_bonus * f64::from(upgrade_level),
    };
    let scaled = (f64::from(base_damage) * multiplier).round() as i64;
    let reduced = scaled - i64::from(target_defense);
    reduced.max(1) as u32
}

/// Chance in `[0, 1]` that a repeated protect still works.
pub fn protect_reuse_chance(upgrade_level: u8, rules: &BattleRules) -> f64 {
    (rules.protect_chance_per_level * f64::from(upgrade_level)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::cpu_easy(120, Side::Cpu, 0, Difficulty::Easy, 0, 120)]
    #[case::cpu_medium(120, Side::Cpu, 0, Difficulty::Medium, 0, 144)]
    #[case::cpu_hard(70, Side::Cpu, 0, Difficulty::Hard, 0, 105)]
    #[case::cpu_ignores_upgrades(40, Side::Cpu, 5, Difficulty::Easy, 0, 40)]
    #[case::player_ignores_difficulty(70, Side::Player, 0, Difficulty::Hard, 0, 70)]
    #[case::player_upgraded(70, Side::Player, 3, Difficulty::Easy, 0, 91)]
    #[case::lowered_defense_adds(40, Side::Player, 0, Difficulty::Easy, -20, 60)]
    #[case::floored_at_one(40, Side::Player, 0, Difficulty::Easy, 100, 1)]
    fn attack_damage(
        #[case] base: u16,
        #[case] attacker: Side,
        #[case] level: u8,
        #[case] difficulty: Difficulty,
        #[case] defense: i32,
        #[case] expected: u32,
    ) {
        let rules = BattleRules::default();
        assert_eq!(
            calculate_attack_damage(base, attacker, level, difficulty, defense, &rules),
            expected
        );
    }

    #[test]
    fn reuse_chance_grows_per_level() {
        let rules = BattleRules::default();
        assert_eq!(protect_reuse_chance(0, &rules), 0.0);
        assert!((protect_reuse_chance(3, &rules) - 0.3).abs() < 1e-9);
    }
}
