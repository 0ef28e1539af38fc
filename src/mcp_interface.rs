//! Text views of the arena shared by the terminal and MCP front-ends.
//!
//! [`Arena`] owns one battle session together with the player's progression
//! and the shop, and turns every operation into plain text. The front-ends
//! only parse input, forward timer tickets and print what comes back.

use crate::battle::runner::BattleRunner;
use crate::battle::scheduler::{Scheduler, TimerTicket, TokioScheduler};
use crate::battle::state::{BattleSnapshot, CombatantView, GameState};
use crate::config::ArenaConfig;
use crate::errors::ArenaError;
use crate::move_data::{describe_move, try_get_move_data};
use crate::player::Side;
use crate::progression::{
    AcquisitionService, FileStore, KeyValueRepository, ProgressionStore, PullResult,
    COPIES_PER_UPGRADE, MAX_UPGRADE_LEVEL,
};
use crate::rng::GameRng;
use ordered_float::OrderedFloat;
use schema::{CoinSide, Difficulty};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

pub struct Arena {
    runner: BattleRunner,
    progression: ProgressionStore,
    shop: AcquisitionService,
    shop_rng: GameRng,
    /// Id of the first log entry not yet handed to the front-end.
    next_unread: u64,
}

impl Arena {
    pub fn new(
        config: &ArenaConfig,
        progression: ProgressionStore,
        scheduler: Box<dyn Scheduler>,
        battle_rng: GameRng,
        shop_rng: GameRng,
    ) -> Self {
        let runner = BattleRunner::new(
            config,
            Arc::new(progression.clone()),
            scheduler,
            battle_rng,
        );
        Self {
            runner,
            shop: AcquisitionService::new(progression.clone(), &config.shop),
            progression,
            shop_rng,
            next_unread: 0,
        }
    }

    /// Opens the saved progression under `config.storage_dir` with real timers.
    ///
    /// Tickets of fired timers arrive on the returned receiver and must be
    /// passed back through [`Arena::fire`]. Must be called inside a tokio runtime.
    pub fn open(config: &ArenaConfig) -> Result<(Self, UnboundedReceiver<TimerTicket>), ArenaError> {
        let store = FileStore::new(&config.storage_dir)?;
        let progression = ProgressionStore::new(KeyValueRepository::new(store));
        let (scheduler, tickets) = TokioScheduler::new();
        info!(storage_dir = %config.storage_dir.display(), "arena opened");
        let arena = Self::new(
            config,
            progression,
            Box::new(scheduler),
            GameRng::new_random(),
            GameRng::new_random(),
        );
        Ok((arena, tickets))
    }

    pub fn runner(&self) -> &BattleRunner {
        &self.runner
    }

    pub fn progression(&self) -> &ProgressionStore {
        &self.progression
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        self.runner.snapshot()
    }

    /// True when nothing is scheduled, so the session waits on the player.
    pub fn is_settled(&self) -> bool {
        self.runner.pending_timer().is_none()
    }

    pub fn start_battle(&mut self, difficulty: Difficulty) -> Result<String, ArenaError> {
        self.runner.start_battle(difficulty)?;
        self.next_unread = 0;
        Ok(self.take_new_lines().join("\n"))
    }

    pub fn guess_coin(&mut self, guess: CoinSide) -> Result<String, ArenaError> {
        self.runner.submit_coin_guess(guess)?;
        Ok(self.take_new_lines().join("\n"))
    }

    /// Uses 손가락흔들기. A deck with nothing to draw narrates the failure
    /// in the log and comes back as an error.
    pub fn finger_wag(&mut self) -> Result<String, ArenaError> {
        self.runner.trigger_player_action()?;
        Ok(self.take_new_lines().join("\n"))
    }

    /// Forwards a fired timer. False when the ticket was stale.
    ///
    /// Lines it adds are picked up by the next [`Arena::take_new_lines`].
    pub fn fire(&mut self, ticket: TimerTicket) -> Result<bool, ArenaError> {
        Ok(self.runner.fire_timer(ticket)?.is_some())
    }

    pub fn leave_battle(&mut self) -> String {
        self.runner.leave();
        self.next_unread = 0;
        "배틀에서 나왔습니다.".to_string()
    }

    /// Log lines the front-end has not seen yet.
    ///
    /// While a move is animating its line still waits for the damage or heal
    /// annotation, so output stops just before it.
    pub fn take_new_lines(&mut self) -> Vec<String> {
        let state = self.runner.state();
        let held = match state.game_state {
            GameState::Animating => state.current_move_log,
            _ => None,
        };
        let mut lines = Vec::new();
        for entry in state.log.entries() {
            if entry.id < self.next_unread {
                continue;
            }
            if Some(entry.id) == held {
                break;
            }
            lines.push(entry.text.clone());
            self.next_unread = entry.id + 1;
        }
        lines
    }

    pub fn status(&self) -> String {
        display_battle_status(&self.runner.snapshot())
    }

    pub fn progress(&self) -> Result<String, ArenaError> {
        let record = self.progression.progress()?;
        let mut output = format!("--- 보유 코인: {} ---\n", record.coins);
        output.push_str(&format!("덱 ({}): {}\n", record.deck.len(), record.deck.join(", ")));
        output.push_str("보유 기술:\n");
        for name in record.owned_moves() {
            let level = record.upgrade_level(&name);
            let level_text = if level > 0 {
                format!(" v{}", level)
            } else {
                String::new()
            };
            let marker = if record.deck.contains(&name) { " *" } else { "" };
            output.push_str(&format!(
                "  {}{} x{}{}\n",
                name,
                level_text,
                record.copies(&name),
                marker
            ));
        }
        Ok(output)
    }

    pub fn pull_moves(&mut self, count: u32) -> Result<String, ArenaError> {
        let results = self.shop.pull(count, &mut self.shop_rng)?;
        let balance = self.progression.progress()?.coins;
        Ok(display_pull_results(&results, balance))
    }

    pub fn upgrade_move(&self, name: &str) -> Result<String, ArenaError> {
        let level = self.shop.upgrade(name)?;
        let mut output = format!("{}이(가) v{}로 강화되었습니다!", name, level);
        if level == MAX_UPGRADE_LEVEL {
            output.push_str(" (최대 레벨)");
        }
        Ok(output)
    }

    pub fn update_deck<S: AsRef<str>>(&self, names: &[S]) -> Result<String, ArenaError> {
        self.progression.update_deck(names)?;
        let names: Vec<&str> = names.iter().map(|name| name.as_ref()).collect();
        Ok(format!("덱이 저장되었습니다: {}", names.join(", ")))
    }

    pub fn move_odds(&self) -> String {
        display_odds(self.shop.odds(), self.shop.pull_cost())
    }
}

fn display_combatant(side: Side, view: &CombatantView) -> String {
    let mut line = format!(
        "{:<6} HP {:>3}/{:<3} 방어 {}",
        side.label(),
        view.hp,
        view.max_hp,
        view.defense
    );
    if view.poisoned {
        line.push_str(" [맹독]");
    }
    if view.shielded {
        line.push_str(" [방어태세]");
    }
    if let Some(last_move) = &view.last_move {
        line.push_str(&format!(" (직전: {})", last_move));
    }
    line
}

/// The snapshot as a short status block followed by the recent log.
pub fn display_battle_status(snapshot: &BattleSnapshot) -> String {
    if snapshot.phase == GameState::Init {
        return "진행 중인 배틀이 없습니다. start <easy|medium|hard>로 시작하세요.".to_string();
    }
    let mut output = format!(
        "=== 손가락흔들기 배틀 ({}) | 턴 {} | {} ===\n",
        snapshot.difficulty, snapshot.turn_number, snapshot.phase
    );
    output.push_str(&display_combatant(Side::Player, &snapshot.player));
    output.push('\n');
    output.push_str(&display_combatant(Side::Cpu, &snapshot.cpu));
    output.push('\n');

    match snapshot.phase {
        GameState::CoinToss if snapshot.coin_result.is_none() => {
            output.push_str("동전의 면을 맞춰보세요: heads 또는 tails\n");
        }
        GameState::ActionPending => output.push_str("당신의 차례입니다.\n"),
        GameState::GameOver { winner } => {
            output.push_str(&format!("승자: {}\n", winner));
        }
        _ => {
            if let Some(current) = &snapshot.current_move {
                output.push_str(&format!("{}의 {}...\n", snapshot.turn, current));
            }
        }
    }

    if !snapshot.log.is_empty() {
        output.push_str("--- 기록 ---\n");
        for line in &snapshot.log {
            output.push_str(line);
            output.push('\n');
        }
    }
    output
}

pub fn display_pull_results(results: &[PullResult], balance: u32) -> String {
    let mut output = String::from("--- 뽑기 결과 ---\n");
    for result in results {
        let marker = if result.is_new { " NEW!" } else { "" };
        output.push_str(&format!("  {}{}\n", result.name, marker));
    }
    output.push_str(&format!("남은 코인: {}", balance));
    output
}

/// Catalog odds, most likely first.
pub fn display_odds(mut odds: Vec<(&schema::MoveData, f64)>, pull_cost: u32) -> String {
    odds.sort_by_key(|(move_data, probability)| {
        (std::cmp::Reverse(OrderedFloat(*probability)), move_data.name.clone())
    });
    let mut output = format!(
        "--- 뽑기 확률 (1회 {}코인, {}장으로 강화) ---\n",
        pull_cost, COPIES_PER_UPGRADE
    );
    for (move_data, probability) in odds {
        output.push_str(&format!("  {:<8} {:>5.1}%\n", move_data.name, probability * 100.0));
    }
    output
}

pub fn handle_lookup_move_command(move_name: &str) -> Result<String, ArenaError> {
    let move_data = try_get_move_data(move_name.trim())?;
    Ok(describe_move(move_data))
}
