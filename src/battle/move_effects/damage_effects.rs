// In: src/battle/move_effects/damage_effects.rs

use super::EffectContext;
use crate::battle::calculators::calculate_attack_damage;
use crate::battle::commands::BattleCommand;
use crate::battle::state::{BattleEvent, BattleState, FloatingText};
use crate::config::BattleRules;
use schema::MoveQuirk;

/// Attack with positive base damage against the defender.
pub(super) fn apply_attack_damage(
    base_damage: u16,
    context: &EffectContext,
    state: &BattleState,
    rules: &BattleRules,
) -> Vec<BattleCommand> {
    let mut commands = Vec::new();
    let target = context.defender;
    let defender = state.combatant(target);

    let mut damage = calculate_attack_damage(
        base_damage,
        context.attacker,
        context.upgrade_level,
        state.difficulty,
        defender.defense,
        rules,
    );

    if context.move_data.has_quirk(MoveQuirk::TargetImmune) {
        damage = 0;
        commands.push(BattleCommand::EmitEvent(BattleEvent::Immune { target }));
    }

    // Shields beat the damage floor.
    if defender.is_shielded() {
        damage = 0;
        commands.push(BattleCommand::EmitEvent(BattleEvent::AttackBlocked { target }));
    }

    // The user pays the recharge whether or not anything landed.
    if context.move_data.has_quirk(MoveQuirk::MustRecharge) {
        commands.push(BattleCommand::EmitEvent(BattleEvent::RechargeRequired {
            side: context.attacker,
        }));
        commands.push(BattleCommand::SetRecharge(Some(context.attacker)));
    }

    if damage > 0 {
        commands.push(BattleCommand::DealDamage {
            target,
            amount: damage,
        });
        commands.push(BattleCommand::AnnotateMoveLine(format!(" (-{})", damage)));
        commands.push(BattleCommand::SetFloatingText(Some(FloatingText::damage(
            target, damage,
        ))));
    }

    commands
}

/// Heals the user by the move's fixed amount.
pub(super) fn apply_heal(amount: u16, context: &EffectContext) -> Vec<BattleCommand> {
    let amount = u32::from(amount);
    vec![
        BattleCommand::Heal {
            target: context.attacker,
            amount,
        },
        BattleCommand::AnnotateMoveLine(format!(" (+{})", amount)),
        BattleCommand::SetFloatingText(Some(FloatingText::heal(context.attacker, amount))),
    ]
}
