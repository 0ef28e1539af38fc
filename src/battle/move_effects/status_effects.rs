// In: src/battle/move_effects/status_effects.rs

use super::EffectContext;
use crate::battle::commands::BattleCommand;
use crate::battle::conditions::SideCondition;
use crate::battle::state::{BattleEvent, BattleState, FloatingText};
use crate::config::BattleRules;
use crate::player::Side;

/// Poisons the defender unless it already is. Poison never stacks.
pub(super) fn apply_toxic_effect(context: &EffectContext, state: &BattleState) -> Vec<BattleCommand> {
    let target = context.defender;
    if state.combatant(target).is_poisoned() {
        return vec![BattleCommand::EmitEvent(BattleEvent::AlreadyPoisoned { target })];
    }
    vec![
        BattleCommand::AddCondition {
            target,
            condition: SideCondition::Poisoned,
        },
        BattleCommand::EmitEvent(BattleEvent::Poisoned { target }),
    ]
}

/// Clears the user's poison. An upgraded player version also heals.
pub(super) fn apply_cure_status_effect(
    context: &EffectContext,
    state: &BattleState,
    rules: &BattleRules,
) -> Vec<BattleCommand> {
    let mut commands = Vec::new();
    let side = context.attacker;

    if state.combatant(side).is_poisoned() {
        commands.push(BattleCommand::RemoveCondition {
            target: side,
            condition: SideCondition::Poisoned,
        });
        commands.push(BattleCommand::EmitEvent(BattleEvent::StatusCured { side }));
    }

    let bonus = match side {
        Side::Player => rules.cure_heal_per_level * u32::from(context.upgrade_level),
        Side::Cpu => 0,
    };
    if bonus > 0 {
        commands.push(BattleCommand::Heal {
            target: side,
            amount: bonus,
        });
        commands.push(BattleCommand::SetFloatingText(Some(FloatingText::heal(side, bonus))));
        commands.push(BattleCommand::EmitEvent(BattleEvent::RefreshHealed {
            side,
            amount: bonus,
        }));
    }

    if commands.is_empty() {
        commands.push(BattleCommand::EmitEvent(BattleEvent::NothingHappened));
    }
    commands
}
