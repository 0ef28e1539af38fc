// In: src/battle/move_effects/special_effects.rs

use super::EffectContext;
use crate::battle::calculators::protect_reuse_chance;
use crate::battle::commands::BattleCommand;
use crate::battle::conditions::SideCondition;
use crate::battle::state::{BattleEvent, BattleState};
use crate::config::BattleRules;
use crate::rng::GameRng;

/// Raises a shield on the user.
///
/// Using the same protect move two turns in a row only works with a chance
/// that grows with its upgrade level; at level 0 the repeat always fails.
pub(super) fn apply_protect_special(
    context: &EffectContext,
    state: &BattleState,
    rules: &BattleRules,
    rng: &mut GameRng,
) -> Vec<BattleCommand> {
    let side = context.attacker;
    let level = context.upgrade_level;
    let is_repeat = state.combatant(side).last_move.as_deref() == Some(context.move_data.name.as_str());

    if is_repeat {
        let chance = protect_reuse_chance(level, rules);
        let reused = chance > 0.0 && rng.next_unit("protect reuse") < chance;
        if !reused {
            let mut commands = vec![BattleCommand::EmitEvent(BattleEvent::ProtectFailed { side })];
            if level > 0 {
                commands.push(BattleCommand::EmitEvent(BattleEvent::ProtectReuseChance {
                    side,
                    percent: (chance * 100.0).round() as u8,
                }));
            }
            return commands;
        }
    }

    let mut commands = vec![
        BattleCommand::AddCondition {
            target: side,
            condition: SideCondition::Shielded,
        },
        BattleCommand::EmitEvent(BattleEvent::ProtectRaised { side }),
    ];
    if is_repeat {
        commands.push(BattleCommand::EmitEvent(BattleEvent::ProtectChained {
            side,
            upgrade_level: level,
        }));
    }
    commands
}
