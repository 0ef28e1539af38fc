//! The battle state machine.
//!
//! [`transition`] looks at the current phase and one input and answers with
//! the commands that carry the session forward. It never mutates the state
//! itself; the command executor does that, and the runner takes care of the
//! timers and rewards the commands ask for.

use crate::battle::ai::Behavior;
use crate::battle::commands::BattleCommand;
use crate::battle::conditions::SideCondition;
use crate::battle::move_effects::{resolve_move, EffectContext};
use crate::battle::runner::ProgressionLink;
use crate::battle::scheduler::TimerEvent;
use crate::battle::state::{BattleEvent, BattleState, FloatingText, GameState};
use crate::config::{BattleRules, Timings};
use crate::errors::{BattleError, BattleResult};
use crate::move_data::{all_moves, moves_named, try_get_move_data};
use crate::player::Side;
use crate::progression::DECK_SIZE;
use crate::rng::GameRng;
use schema::{CoinSide, Difficulty, MoveData};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleInput {
    Start(Difficulty),
    CoinGuess(CoinSide),
    /// The player wags a finger.
    PlayerAction,
    /// Re-enters an instant phase.
    Advance,
    Timer(TimerEvent),
}

impl BattleInput {
    pub fn name(&self) -> &'static str {
        match self {
            BattleInput::Start(_) => "start",
            BattleInput::CoinGuess(_) => "coin guess",
            BattleInput::PlayerAction => "player action",
            BattleInput::Advance => "advance",
            BattleInput::Timer(TimerEvent::CoinTossSettled) => "coin toss timer",
            BattleInput::Timer(TimerEvent::RechargeSkip) => "recharge timer",
            BattleInput::Timer(TimerEvent::CpuAct) => "cpu timer",
            BattleInput::Timer(TimerEvent::ResolveMove) => "animation timer",
            BattleInput::Timer(TimerEvent::EndTurn) => "end of turn timer",
        }
    }
}

/// Everything outside the session state a transition may consult.
pub struct TransitionContext<'a> {
    pub rng: &'a mut GameRng,
    pub progression: &'a dyn ProgressionLink,
    pub rules: &'a BattleRules,
    pub timings: &'a Timings,
    pub cpu: &'a dyn Behavior,
    pub player: &'a dyn Behavior,
}

pub fn transition(
    state: &BattleState,
    input: BattleInput,
    ctx: &mut TransitionContext<'_>,
) -> BattleResult<Vec<BattleCommand>> {
    match (state.game_state, input) {
        (GameState::Init, BattleInput::Start(difficulty)) => start_battle(difficulty, ctx),
        (GameState::CoinToss, BattleInput::CoinGuess(guess)) => Ok(toss_coin(guess, ctx)),
        (GameState::CoinToss, BattleInput::Timer(TimerEvent::CoinTossSettled)) => {
            Ok(vec![BattleCommand::SetGameState(GameState::TurnStart)])
        }
        (GameState::TurnStart, BattleInput::Advance) => Ok(start_turn(state, ctx)),
        (GameState::TurnStart, BattleInput::Timer(TimerEvent::RechargeSkip)) => {
            Ok(skip_recharging_turn(state))
        }
        (GameState::TurnStart, BattleInput::Timer(TimerEvent::CpuAct)) => {
            let pool: Vec<&'static MoveData> = all_moves().iter().collect();
            let chosen = ctx.cpu.choose_move(Side::Cpu, state, &pool, ctx.rng)?;
            Ok(begin_move(Side::Cpu, chosen, 0, ctx.timings))
        }
        (GameState::ActionPending, BattleInput::PlayerAction) => {
            let deck = ctx.progression.deck();
            let pool = moves_named(&deck);
            let chosen = ctx.player.choose_move(Side::Player, state, &pool, ctx.rng)?;
            let level = ctx.progression.upgrade_level(&chosen.name);
            Ok(begin_move(Side::Player, chosen, level, ctx.timings))
        }
        (GameState::Animating, BattleInput::Timer(TimerEvent::ResolveMove)) => {
            resolve_current_move(state, ctx)
        }
        (GameState::CheckResult, BattleInput::Advance) => Ok(check_result(state, ctx)),
        (GameState::CheckResult, BattleInput::Timer(TimerEvent::EndTurn)) => {
            Ok(end_turn(state, ctx.rules))
        }
        (phase, input) => Err(BattleError::UnexpectedInput {
            phase,
            input: input.name(),
        }),
    }
}

fn start_battle(
    difficulty: Difficulty,
    ctx: &mut TransitionContext<'_>,
) -> BattleResult<Vec<BattleCommand>> {
    let deck = ctx.progression.deck();
    if deck.len() != DECK_SIZE {
        return Err(BattleError::DeckNotReady(deck.len()));
    }
    info!(%difficulty, "battle started");
    Ok(vec![
        BattleCommand::BeginBattle {
            difficulty,
            player_max_hp: ctx.rules.player_max_hp,
        },
        BattleCommand::EmitEvent(BattleEvent::BattleStarted { difficulty }),
        BattleCommand::SetGameState(GameState::CoinToss),
    ])
}

fn toss_coin(guess: CoinSide, ctx: &mut TransitionContext<'_>) -> Vec<BattleCommand> {
    let result = if ctx.rng.next_unit("coin toss") < 0.5 {
        CoinSide::Heads
    } else {
        CoinSide::Tails
    };
    let first = if guess == result { Side::Player } else { Side::Cpu };
    vec![
        BattleCommand::SetCoinResult(result),
        BattleCommand::EmitEvent(BattleEvent::CoinTossed { guess, result }),
        BattleCommand::EmitEvent(BattleEvent::FirstTurnDecided { first }),
        BattleCommand::SetTurn(first),
        BattleCommand::ScheduleTimer {
            event: TimerEvent::CoinTossSettled,
            delay: ctx.timings.coin_toss(),
        },
    ]
}

fn start_turn(state: &BattleState, ctx: &mut TransitionContext<'_>) -> Vec<BattleCommand> {
    let side = state.turn;
    let mut commands = vec![
        BattleCommand::IncrementTurnNumber,
        BattleCommand::EmitEvent(BattleEvent::TurnStarted {
            side,
            turn_number: state.turn_number + 1,
        }),
    ];

    if state.recharge_pending == Some(side) {
        commands.push(BattleCommand::ScheduleTimer {
            event: TimerEvent::RechargeSkip,
            delay: ctx.timings.turn_start(),
        });
        return commands;
    }

    // A shield only lasts until its owner acts again.
    if state.combatant(side).is_shielded() {
        commands.push(BattleCommand::RemoveCondition {
            target: side,
            condition: SideCondition::Shielded,
        });
    }

    match side {
        Side::Cpu => commands.push(BattleCommand::ScheduleTimer {
            event: TimerEvent::CpuAct,
            delay: ctx.timings.turn_start(),
        }),
        Side::Player => {
            commands.push(BattleCommand::SetGameState(GameState::ActionPending));
            commands.push(BattleCommand::EmitEvent(BattleEvent::PlayerPrompt));
        }
    }
    commands
}

fn skip_recharging_turn(state: &BattleState) -> Vec<BattleCommand> {
    vec![
        BattleCommand::SetRecharge(None),
        BattleCommand::EmitEvent(BattleEvent::RechargeSkipped { side: state.turn }),
        BattleCommand::SetCurrentMove(None),
        BattleCommand::SetGameState(GameState::CheckResult),
    ]
}

fn begin_move(
    side: Side,
    chosen: &'static MoveData,
    upgrade_level: u8,
    timings: &Timings,
) -> Vec<BattleCommand> {
    vec![
        BattleCommand::SetCurrentMove(Some(chosen.name.clone())),
        BattleCommand::EmitEvent(BattleEvent::MoveUsed {
            side,
            move_name: chosen.name.clone(),
            upgrade_level,
        }),
        BattleCommand::SetGameState(GameState::Animating),
        BattleCommand::ScheduleTimer {
            event: TimerEvent::ResolveMove,
            delay: timings.animation(),
        },
    ]
}

fn resolve_current_move(
    state: &BattleState,
    ctx: &mut TransitionContext<'_>,
) -> BattleResult<Vec<BattleCommand>> {
    let side = state.turn;
    let mut commands = match &state.current_move {
        Some(name) => {
            let move_data = try_get_move_data(name)?;
            let level = match side {
                Side::Player => ctx.progression.upgrade_level(name),
                Side::Cpu => 0,
            };
            let context = EffectContext::new(side, move_data, level);
            resolve_move(&context, state, ctx.rules, ctx.rng)
        }
        None => Vec::new(),
    };
    commands.push(BattleCommand::SetGameState(GameState::CheckResult));
    Ok(commands)
}

fn check_result(state: &BattleState, ctx: &mut TransitionContext<'_>) -> Vec<BattleCommand> {
    if let Some(winner) = lethal_winner(state) {
        return finish_battle(winner, false, state, ctx.rules);
    }

    let mut commands = Vec::new();
    let mut ticked = Vec::new();
    for side in [Side::Player, Side::Cpu] {
        let combatant = state.combatant(side);
        if !combatant.is_poisoned() {
            continue;
        }
        let amount = ctx.rules.poison_damage;
        commands.push(BattleCommand::DealDamage {
            target: side,
            amount,
        });
        commands.push(BattleCommand::EmitEvent(BattleEvent::PoisonDamage {
            target: side,
            amount,
            remaining_hp: combatant.hp.saturating_sub(amount),
        }));
        // One annotation slot; the player's tick wins it.
        if ticked.is_empty() {
            commands.push(BattleCommand::SetFloatingText(Some(FloatingText::poison(
                side, amount,
            ))));
        }
        ticked.push(side);
    }
    if !ticked.is_empty() {
        commands.push(BattleCommand::EmitEvent(BattleEvent::PoisonTicks {
            targets: ticked,
            amount: ctx.rules.poison_damage,
        }));
    }

    commands.push(BattleCommand::ScheduleTimer {
        event: TimerEvent::EndTurn,
        delay: ctx.timings.end_of_turn(),
    });
    commands
}

fn end_turn(state: &BattleState, rules: &BattleRules) -> Vec<BattleCommand> {
    if let Some(winner) = lethal_winner(state) {
        return finish_battle(winner, true, state, rules);
    }
    vec![
        BattleCommand::SetLastMove {
            target: state.turn,
            move_name: state.current_move.clone(),
        },
        BattleCommand::FlipTurn,
        BattleCommand::SetCurrentMove(None),
        BattleCommand::SetFloatingText(None),
        BattleCommand::SetGameState(GameState::TurnStart),
    ]
}

/// The player is checked first, so a double knock-out goes to the CPU.
fn lethal_winner(state: &BattleState) -> Option<Side> {
    if state.combatant(Side::Player).is_fainted() {
        Some(Side::Cpu)
    } else if state.combatant(Side::Cpu).is_fainted() {
        Some(Side::Player)
    } else {
        None
    }
}

fn finish_battle(
    winner: Side,
    by_poison: bool,
    state: &BattleState,
    rules: &BattleRules,
) -> Vec<BattleCommand> {
    let reward = match winner {
        Side::Player => state.difficulty.profile().reward_on_win,
        Side::Cpu => rules.cpu_win_reward,
    };
    info!(%winner, reward, by_poison, turns = state.turn_number, "battle over");
    vec![
        BattleCommand::SetGameState(GameState::GameOver { winner }),
        BattleCommand::AwardCoins(reward),
        BattleCommand::EmitEvent(BattleEvent::BattleEnded {
            winner,
            reward,
            by_poison,
        }),
    ]
}
