// In: src/battle/move_effects/stat_effects.rs

use super::EffectContext;
use crate::battle::commands::BattleCommand;
use crate::battle::state::{BattleEvent, BattleState};
use crate::config::BattleRules;

/// Lowers the defender's defense. Repeats stack without limit.
pub(super) fn apply_defense_down_effect(
    context: &EffectContext,
    state: &BattleState,
    rules: &BattleRules,
) -> Vec<BattleCommand> {
    let target = context.defender;
    let delta = -rules.defense_drop;
    vec![
        BattleCommand::ChangeDefense { target, delta },
        BattleCommand::EmitEvent(BattleEvent::DefenseLowered {
            target,
            new_defense: state.combatant(target).defense + delta,
        }),
    ]
}
