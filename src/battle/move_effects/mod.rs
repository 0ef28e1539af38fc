// In: src/battle/move_effects/mod.rs

// --- 1. HELPER MODULES ---
mod damage_effects;
mod special_effects;
mod stat_effects;
mod status_effects;

// --- 2. IMPORTS ---
use crate::battle::commands::BattleCommand;
use crate::battle::state::{BattleEvent, BattleState};
use crate::config::BattleRules;
use crate::player::Side;
use crate::rng::GameRng;
use schema::{MoveData, MoveEffect};
use self::{damage_effects::*, special_effects::*, stat_effects::*, status_effects::*};

// --- 3. CONTEXT ---
/// Who is using which move, at what upgrade level.
#[derive(Debug, Clone)]
pub struct EffectContext {
    pub attacker: Side,
    pub defender: Side,
    pub move_data: &'static MoveData,
    /// The attacker's upgrade level for this move. Always 0 for the CPU.
    pub upgrade_level: u8,
}

impl EffectContext {
    pub fn new(attacker: Side, move_data: &'static MoveData, upgrade_level: u8) -> Self {
        Self {
            attacker,
            defender: attacker.opponent(),
            move_data,
            upgrade_level,
        }
    }
}

// --- 4. THE PUBLIC EXTENSION TRAIT ---
pub trait BattleMoveEffectExt {
    fn apply(
        &self,
        context: &EffectContext,
        state: &BattleState,
        rules: &BattleRules,
        rng: &mut GameRng,
    ) -> Vec<BattleCommand>;
}

impl BattleMoveEffectExt for MoveEffect {
    fn apply(
        &self,
        context: &EffectContext,
        state: &BattleState,
        rules: &BattleRules,
        rng: &mut GameRng,
    ) -> Vec<BattleCommand> {
        match self {
            Self::DefenseDown => apply_defense_down_effect(context, state, rules),
            Self::Toxic => apply_toxic_effect(context, state),
            Self::Protect => apply_protect_special(context, state, rules, rng),
            Self::CureStatus => apply_cure_status_effect(context, state, rules),
        }
    }
}

// --- 5. MOVE RESOLUTION ---
/// Commands for every payload the move carries, in a fixed order:
/// attack damage, the no-op attack, healing, then the effect.
pub fn resolve_move(
    context: &EffectContext,
    state: &BattleState,
    rules: &BattleRules,
    rng: &mut GameRng,
) -> Vec<BattleCommand> {
    let move_data = context.move_data;
    let mut commands = Vec::new();

    match move_data.damage {
        Some(base) if base > 0 => {
            commands.extend(apply_attack_damage(base, context, state, rules));
        }
        Some(_) => commands.push(BattleCommand::EmitEvent(BattleEvent::NoEffect)),
        None => {}
    }

    if let Some(amount) = move_data.heal {
        commands.extend(apply_heal(amount, context));
    }

    if let Some(effect) = move_data.effect {
        commands.extend(effect.apply(context, state, rules, rng));
    }

    commands
}
