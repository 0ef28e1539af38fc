use crate::battle::ai::{Behavior, UniformDraw, WeightedDraw};
use crate::battle::commands::{execute_command, execute_command_batch, BattleCommand, SessionEffect};
use crate::battle::engine::{transition, BattleInput, TransitionContext};
use crate::battle::scheduler::{Scheduler, TimerEvent, TimerTicket};
use crate::battle::state::{BattleEvent, BattleSnapshot, BattleState, EventBus, GameState};
use crate::config::{ArenaConfig, BattleRules, Timings};
use crate::errors::{BattleError, BattleResult};
use crate::rng::GameRng;
use schema::{CoinSide, Difficulty};
use std::sync::Arc;
use tracing::{debug, warn};

/// What a battle needs from the player's meta-progression.
pub trait ProgressionLink: Send + Sync {
    /// The saved deck, in saved order.
    fn deck(&self) -> Vec<String>;
    /// The player's upgrade level of a move; 0 when never upgraded.
    fn upgrade_level(&self, move_name: &str) -> u8;
    /// Pays out a battle reward. Called exactly once per finished battle.
    fn award_coins(&self, amount: u32);
}

/// The one timer a session may have outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub ticket: TimerTicket,
    pub event: TimerEvent,
}

/// Drives one battle session at a time.
///
/// The session only moves when an input arrives or the pending timer fires.
/// While a timer is pending every other input is refused, and only that
/// timer's ticket is accepted.
pub struct BattleRunner {
    state: BattleState,
    rules: BattleRules,
    timings: Timings,
    log_capacity: usize,
    progression: Arc<dyn ProgressionLink>,
    scheduler: Box<dyn Scheduler>,
    rng: GameRng,
    cpu: Box<dyn Behavior>,
    player: Box<dyn Behavior>,
    pending: Option<PendingTimer>,
    next_ticket: u64,
}

impl BattleRunner {
    pub fn new(
        config: &ArenaConfig,
        progression: Arc<dyn ProgressionLink>,
        scheduler: Box<dyn Scheduler>,
        rng: GameRng,
    ) -> Self {
        Self::with_behaviors(
            config,
            progression,
            scheduler,
            rng,
            Box::new(WeightedDraw),
            Box::new(UniformDraw),
        )
    }

    /// Like [`BattleRunner::new`] with custom move choice for each side.
    pub fn with_behaviors(
        config: &ArenaConfig,
        progression: Arc<dyn ProgressionLink>,
        scheduler: Box<dyn Scheduler>,
        rng: GameRng,
        cpu: Box<dyn Behavior>,
        player: Box<dyn Behavior>,
    ) -> Self {
        Self {
            state: BattleState::new(
                config.rules.player_max_hp,
                Difficulty::Easy,
                config.log_capacity,
            ),
            rules: config.rules.clone(),
            timings: config.timings.clone(),
            log_capacity: config.log_capacity,
            progression,
            scheduler,
            rng,
            cpu,
            player,
            pending: None,
            next_ticket: 0,
        }
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        self.state.snapshot()
    }

    pub fn pending_timer(&self) -> Option<PendingTimer> {
        self.pending
    }

    /// Begins a new battle, abandoning any session in progress.
    ///
    /// Nothing changes if the battle cannot start.
    pub fn start_battle(&mut self, difficulty: Difficulty) -> BattleResult<EventBus> {
        let fresh = BattleState::new(self.rules.player_max_hp, difficulty, self.log_capacity);
        let commands = self.transition_on(&fresh, BattleInput::Start(difficulty))?;

        self.cancel_pending();
        self.state = fresh;
        let mut bus = EventBus::new();
        self.apply(commands, &mut bus);
        self.run_instant_phases(&mut bus)?;
        Ok(bus)
    }

    pub fn submit_coin_guess(&mut self, guess: CoinSide) -> BattleResult<EventBus> {
        self.ensure_idle()?;
        self.dispatch(BattleInput::CoinGuess(guess))
    }

    /// The player wags a finger: draws a move from the deck and uses it.
    pub fn trigger_player_action(&mut self) -> BattleResult<EventBus> {
        self.ensure_idle()?;
        match self.dispatch(BattleInput::PlayerAction) {
            Err(BattleError::NoEligibleMove) => {
                warn!(deck = ?self.progression.deck(), "no eligible move in the player's deck");
                let mut bus = EventBus::new();
                execute_command(
                    BattleCommand::EmitEvent(BattleEvent::NoEligibleMove),
                    &mut self.state,
                    &mut bus,
                );
                Err(BattleError::NoEligibleMove)
            }
            outcome => outcome,
        }
    }

    /// Delivers a due timer. Returns `Ok(None)` for a ticket that is no
    /// longer the pending one.
    pub fn fire_timer(&mut self, ticket: TimerTicket) -> BattleResult<Option<EventBus>> {
        let pending = match self.pending {
            Some(pending) if pending.ticket == ticket => pending,
            _ => {
                debug!(ticket = ticket.0, "ignoring stale timer");
                return Ok(None);
            }
        };
        self.pending = None;
        self.dispatch(BattleInput::Timer(pending.event)).map(Some)
    }

    /// Fires whatever timer is pending right now, for manual stepping.
    pub fn fire_pending(&mut self) -> BattleResult<Option<EventBus>> {
        match self.pending {
            Some(pending) => self.fire_timer(pending.ticket),
            None => Ok(None),
        }
    }

    /// Abandons the session and returns to the idle state.
    pub fn leave(&mut self) {
        self.cancel_pending();
        self.state = BattleState::new(
            self.rules.player_max_hp,
            self.state.difficulty,
            self.log_capacity,
        );
        debug!("left the battle");
    }

    fn ensure_idle(&self) -> BattleResult<()> {
        match self.pending {
            Some(_) => Err(BattleError::TransitionPending),
            None => Ok(()),
        }
    }

    fn dispatch(&mut self, input: BattleInput) -> BattleResult<EventBus> {
        let commands = self.transition_on(&self.state.clone(), input)?;
        let mut bus = EventBus::new();
        self.apply(commands, &mut bus);
        self.run_instant_phases(&mut bus)?;
        Ok(bus)
    }

    /// Keeps re-entering instant phases until the session waits on something.
    fn run_instant_phases(&mut self, bus: &mut EventBus) -> BattleResult<()> {
        while self.pending.is_none() && self.state.game_state.is_instant() {
            let commands = self.transition_on(&self.state.clone(), BattleInput::Advance)?;
            self.apply(commands, bus);
        }
        Ok(())
    }

    fn transition_on(
        &mut self,
        state: &BattleState,
        input: BattleInput,
    ) -> BattleResult<Vec<BattleCommand>> {
        let phase = state.game_state;
        let mut ctx = TransitionContext {
            rng: &mut self.rng,
            progression: self.progression.as_ref(),
            rules: &self.rules,
            timings: &self.timings,
            cpu: self.cpu.as_ref(),
            player: self.player.as_ref(),
        };
        let commands = transition(state, input, &mut ctx)?;
        debug!(%phase, input = input.name(), commands = commands.len(), "transition");
        Ok(commands)
    }

    fn apply(&mut self, commands: Vec<BattleCommand>, bus: &mut EventBus) {
        for effect in execute_command_batch(commands, &mut self.state, bus) {
            match effect {
                SessionEffect::Schedule { event, delay } => self.schedule(event, delay),
                SessionEffect::Award(amount) => self.progression.award_coins(amount),
            }
        }
    }

    fn schedule(&mut self, event: TimerEvent, delay: std::time::Duration) {
        self.cancel_pending();
        self.next_ticket += 1;
        let ticket = TimerTicket(self.next_ticket);
        self.scheduler.schedule(ticket, delay);
        self.pending = Some(PendingTimer { ticket, event });
        debug!(ticket = ticket.0, ?event, ?delay, "timer scheduled");
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.scheduler.cancel(pending.ticket);
            debug!(ticket = pending.ticket.0, event = ?pending.event, "timer canceled");
        }
    }

    /// Whether the battle reached its end.
    pub fn is_over(&self) -> bool {
        matches!(self.state.game_state, GameState::GameOver { .. })
    }
}
