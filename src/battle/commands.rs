use crate::battle::conditions::SideCondition;
use crate::battle::scheduler::TimerEvent;
use crate::battle::state::{BattleEvent, BattleState, EventBus, FloatingText, GameState};
use crate::player::{Combatant, Side};
use schema::{CoinSide, Difficulty};
use std::time::Duration;
use tracing::trace;

/// Atomic commands representing final state changes
#[derive(Debug, Clone, PartialEq)]
pub enum BattleCommand {
    // Direct state changes
    SetGameState(GameState),
    BeginBattle {
        difficulty: Difficulty,
        player_max_hp: u32,
    },
    SetCoinResult(CoinSide),
    SetTurn(Side),
    FlipTurn,
    IncrementTurnNumber,

    // Combatant modifications
    DealDamage {
        target: Side,
        amount: u32,
    },
    Heal {
        target: Side,
        amount: u32,
    },
    ChangeDefense {
        target: Side,
        delta: i32,
    },
    AddCondition {
        target: Side,
        condition: SideCondition,
    },
    RemoveCondition {
        target: Side,
        condition: SideCondition,
    },
    SetLastMove {
        target: Side,
        move_name: Option<String>,
    },

    // Session bookkeeping
    SetRecharge(Option<Side>),
    SetCurrentMove(Option<String>),
    SetFloatingText(Option<FloatingText>),
    /// Appends to the log line of the move being resolved.
    AnnotateMoveLine(String),

    // Battle flow
    EmitEvent(BattleEvent),
    ScheduleTimer {
        event: TimerEvent,
        delay: Duration,
    },
    AwardCoins(u32),
}

/// Work the executor cannot do on the state alone; the runner carries it out.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    Schedule { event: TimerEvent, delay: Duration },
    Award(u32),
}

/// Execute a single command against the battle state.
pub fn execute_command(
    command: BattleCommand,
    state: &mut BattleState,
    bus: &mut EventBus,
) -> Option<SessionEffect> {
    trace!(?command, "executing");
    match command {
        BattleCommand::SetGameState(game_state) => state.game_state = game_state,
        BattleCommand::BeginBattle {
            difficulty,
            player_max_hp,
        } => {
            state.difficulty = difficulty;
            state.combatants = [
                Combatant::new(player_max_hp),
                Combatant::new(difficulty.profile().max_opponent_hp),
            ];
            state.turn = Side::Player;
            state.turn_number = 0;
            state.recharge_pending = None;
            state.current_move = None;
            state.current_move_log = None;
            state.floating_text = None;
            state.coin_result = None;
        }
        BattleCommand::SetCoinResult(side) => state.coin_result = Some(side),
        BattleCommand::SetTurn(side) => state.turn = side,
        BattleCommand::FlipTurn => state.turn = state.turn.opponent(),
        BattleCommand::IncrementTurnNumber => state.turn_number += 1,

        BattleCommand::DealDamage { target, amount } => {
            let combatant = state.combatant_mut(target);
            let dealt = combatant.take_damage(amount);
            bus.push(BattleEvent::DamageDealt {
                target,
                amount: dealt,
                remaining_hp: combatant.hp,
            });
        }
        BattleCommand::Heal { target, amount } => {
            let combatant = state.combatant_mut(target);
            let restored = combatant.heal(amount);
            bus.push(BattleEvent::Healed {
                target,
                amount: restored,
                new_hp: combatant.hp,
            });
        }
        BattleCommand::ChangeDefense { target, delta } => {
            state.combatant_mut(target).defense += delta;
        }
        BattleCommand::AddCondition { target, condition } => {
            state.combatant_mut(target).conditions.insert(condition);
        }
        BattleCommand::RemoveCondition { target, condition } => {
            state.combatant_mut(target).conditions.remove(&condition);
        }
        BattleCommand::SetLastMove { target, move_name } => {
            state.combatant_mut(target).last_move = move_name;
        }

        BattleCommand::SetRecharge(side) => state.recharge_pending = side,
        BattleCommand::SetCurrentMove(move_name) => {
            if move_name.is_none() {
                state.current_move_log = None;
            }
            state.current_move = move_name;
        }
        BattleCommand::SetFloatingText(text) => state.floating_text = text,
        BattleCommand::AnnotateMoveLine(suffix) => {
            if let Some(id) = state.current_move_log {
                state.log.append_to(id, &suffix);
            }
        }

        BattleCommand::EmitEvent(event) => {
            if let Some(text) = event.format() {
                let id = state.log.push(text);
                if matches!(event, BattleEvent::MoveUsed { .. }) {
                    state.current_move_log = Some(id);
                }
            }
            bus.push(event);
        }
        BattleCommand::ScheduleTimer { event, delay } => {
            return Some(SessionEffect::Schedule { event, delay });
        }
        BattleCommand::AwardCoins(amount) => return Some(SessionEffect::Award(amount)),
    }
    None
}

/// Execute commands in order and collect the effects left for the runner.
pub fn execute_command_batch(
    commands: Vec<BattleCommand>,
    state: &mut BattleState,
    bus: &mut EventBus,
) -> Vec<SessionEffect> {
    commands
        .into_iter()
        .filter_map(|command| execute_command(command, state, bus))
        .collect()
}
