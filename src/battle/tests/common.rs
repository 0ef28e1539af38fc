use crate::battle::ai::Behavior;
use crate::battle::commands::{execute_command_batch, BattleCommand};
use crate::battle::runner::{BattleRunner, ProgressionLink};
use crate::battle::scheduler::ManualScheduler;
use crate::battle::state::{BattleEvent, BattleState, EventBus, GameState};
use crate::config::ArenaConfig;
use crate::errors::{BattleError, BattleResult};
use crate::move_data::get_move_data;
use crate::player::Side;
use crate::progression::DEFAULT_DECK;
use crate::rng::GameRng;
use schema::{CoinSide, Difficulty, MoveData};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Uses the listed moves in order, wrapping around, ignoring the pool.
pub struct ScriptedMoves {
    names: Vec<&'static str>,
    next: AtomicUsize,
}

impl ScriptedMoves {
    pub fn new(names: Vec<&'static str>) -> Self {
        Self {
            names,
            next: AtomicUsize::new(0),
        }
    }

    pub fn always(name: &'static str) -> Self {
        Self::new(vec![name])
    }
}

impl Behavior for ScriptedMoves {
    fn choose_move(
        &self,
        _side: Side,
        _battle_state: &BattleState,
        _pool: &[&'static MoveData],
        _rng: &mut GameRng,
    ) -> BattleResult<&'static MoveData> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.names.len();
        let name = self.names[index];
        Ok(get_move_data(name)
            .unwrap_or_else(|| panic!("scripted move {} is not in the catalog", name)))
    }
}

/// In-memory progression with a fixed deck and upgrade table.
pub struct FixedProgression {
    deck: Vec<String>,
    upgrades: HashMap<String, u8>,
    awarded: Mutex<Vec<u32>>,
}

impl FixedProgression {
    pub fn new() -> Self {
        Self {
            deck: DEFAULT_DECK.iter().map(|name| name.to_string()).collect(),
            upgrades: HashMap::new(),
            awarded: Mutex::new(Vec::new()),
        }
    }

    pub fn with_deck(mut self, deck: &[&str]) -> Self {
        self.deck = deck.iter().map(|name| name.to_string()).collect();
        self
    }

    pub fn with_upgrade(mut self, name: &str, level: u8) -> Self {
        self.upgrades.insert(name.to_string(), level);
        self
    }

    pub fn awarded(&self) -> Vec<u32> {
        self.awarded.lock().expect("award lock").clone()
    }
}

impl ProgressionLink for FixedProgression {
    fn deck(&self) -> Vec<String> {
        self.deck.clone()
    }

    fn upgrade_level(&self, move_name: &str) -> u8 {
        self.upgrades.get(move_name).copied().unwrap_or(0)
    }

    fn award_coins(&self, amount: u32) {
        self.awarded.lock().expect("award lock").push(amount);
    }
}

/// A runner wired to a manual scheduler and scripted move choice.
pub struct TestBattle {
    pub runner: BattleRunner,
    pub scheduler: ManualScheduler,
}

pub fn create_test_battle(
    progression: Arc<dyn ProgressionLink>,
    cpu_moves: ScriptedMoves,
    player_moves: ScriptedMoves,
    rng_outcomes: Vec<f64>,
) -> TestBattle {
    let scheduler = ManualScheduler::new();
    let runner = BattleRunner::with_behaviors(
        &ArenaConfig::default(),
        progression,
        Box::new(scheduler.clone()),
        GameRng::new_for_test(rng_outcomes),
        Box::new(cpu_moves),
        Box::new(player_moves),
    );
    TestBattle { runner, scheduler }
}

/// Coin script that lands heads, so guessing heads lets the player go first.
pub fn heads_rng() -> Vec<f64> {
    vec![0.1]
}

/// Performs the next thing the session waits on: a pending timer or, at the
/// player's prompt, a finger wag. Returns None when the session is waiting on
/// something else (coin guess, start) or is over.
pub fn step(runner: &mut BattleRunner) -> Option<BattleResult<EventBus>> {
    if runner.pending_timer().is_some() {
        return runner.fire_pending().transpose();
    }
    if runner.state().game_state == GameState::ActionPending {
        return Some(runner.trigger_player_action());
    }
    None
}

/// Steps until the session stops moving or `done` holds, collecting events.
pub fn play_until(
    runner: &mut BattleRunner,
    done: impl Fn(&BattleState) -> bool,
) -> Result<Vec<BattleEvent>, BattleError> {
    let mut events = Vec::new();
    for _ in 0..1000 {
        if done(runner.state()) {
            break;
        }
        match step(runner) {
            Some(outcome) => events.extend(outcome?.into_events()),
            None => break,
        }
    }
    Ok(events)
}

/// Steps until the battle is over.
pub fn play_out(runner: &mut BattleRunner) -> Result<Vec<BattleEvent>, BattleError> {
    play_until(runner, |state| matches!(state.game_state, GameState::GameOver { .. }))
}

/// Starts a session and guesses the coin; the coin-toss timer is left pending.
pub fn start_with_guess(battle: &mut TestBattle, difficulty: Difficulty, guess: CoinSide) {
    battle
        .runner
        .start_battle(difficulty)
        .expect("battle should start");
    battle
        .runner
        .submit_coin_guess(guess)
        .expect("coin guess should be accepted");
}

/// Fresh mid-battle state for resolving moves directly.
pub fn battle_state(difficulty: Difficulty) -> BattleState {
    let mut state = BattleState::new(200, difficulty, 100);
    state.game_state = GameState::Animating;
    state
}

/// Applies commands and returns the emitted events.
pub fn apply(commands: Vec<BattleCommand>, state: &mut BattleState) -> EventBus {
    let mut bus = EventBus::new();
    execute_command_batch(commands, state, &mut bus);
    bus
}
