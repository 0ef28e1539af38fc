use crate::battle::conditions::SideCondition;
use crate::player::{Combatant, Side};
use schema::{CoinSide, Difficulty};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Init,
    CoinToss,
    TurnStart,
    ActionPending,
    Animating,
    CheckResult,
    GameOver { winner: Side },
}

impl GameState {
    /// Phases that do their work the moment they are entered.
    pub fn is_instant(self) -> bool {
        matches!(self, GameState::TurnStart | GameState::CheckResult)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameState::Init => write!(f, "INIT"),
            GameState::CoinToss => write!(f, "COIN_TOSS"),
            GameState::TurnStart => write!(f, "TURN_START"),
            GameState::ActionPending => write!(f, "ACTION_PENDING"),
            GameState::Animating => write!(f, "ANIMATING"),
            GameState::CheckResult => write!(f, "CHECK_RESULT"),
            GameState::GameOver { winner } => write!(f, "GAME_OVER ({})", winner),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Battle flow
    BattleStarted {
        difficulty: Difficulty,
    },
    CoinTossed {
        guess: CoinSide,
        result: CoinSide,
    },
    FirstTurnDecided {
        first: Side,
    },
    TurnStarted {
        side: Side,
        turn_number: u32,
    },
    PlayerPrompt,
    RechargeSkipped {
        side: Side,
    },
    NoEligibleMove,
    BattleEnded {
        winner: Side,
        reward: u32,
        by_poison: bool,
    },

    // Moves
    MoveUsed {
        side: Side,
        move_name: String,
        upgrade_level: u8,
    },
    DamageDealt {
        target: Side,
        amount: u32,
        remaining_hp: u32,
    },
    Healed {
        target: Side,
        amount: u32,
        new_hp: u32,
    },
    Immune {
        target: Side,
    },
    AttackBlocked {
        target: Side,
    },
    RechargeRequired {
        side: Side,
    },
    NoEffect,

    // Effects
    DefenseLowered {
        target: Side,
        new_defense: i32,
    },
    Poisoned {
        target: Side,
    },
    AlreadyPoisoned {
        target: Side,
    },
    ProtectRaised {
        side: Side,
    },
    ProtectChained {
        side: Side,
        upgrade_level: u8,
    },
    ProtectFailed {
        side: Side,
    },
    ProtectReuseChance {
        side: Side,
        percent: u8,
    },
    StatusCured {
        side: Side,
    },
    RefreshHealed {
        side: Side,
        amount: u32,
    },
    NothingHappened,
    PoisonDamage {
        target: Side,
        amount: u32,
        remaining_hp: u32,
    },
    /// Every poison tick of one turn end, narrated as a single line.
    PoisonTicks {
        targets: Vec<Side>,
        amount: u32,
    },
}

impl BattleEvent {
    /// The log line for this event, or None for events that only carry data.
    pub fn format(&self) -> Option<String> {
        match self {
            BattleEvent::BattleStarted { difficulty } => {
                Some(format!("난이도: {} - 배틀 시작!", difficulty))
            }
            BattleEvent::CoinTossed { guess, result } => {
                Some(format!("선택: {}, 결과: {}", guess, result))
            }
            BattleEvent::FirstTurnDecided { first } => Some(match first {
                Side::Player => "맞췄습니다! 플레이어 선공!".to_string(),
                Side::Cpu => "틀렸습니다... 상대 선공!".to_string(),
            }),
            BattleEvent::TurnStarted { .. } => None,
            BattleEvent::PlayerPrompt => {
                Some("당신의 차례입니다. 손가락흔들기를 사용하세요!".to_string())
            }
            BattleEvent::RechargeSkipped { side } => {
                Some(format!("{}는 움직일 수 없다! (반동)", side))
            }
            BattleEvent::NoEligibleMove => {
                Some("오류: 사용할 수 있는 기술이 없습니다! (덱을 확인해주세요)".to_string())
            }
            BattleEvent::BattleEnded {
                winner,
                reward,
                by_poison,
            } => Some(match (winner, by_poison) {
                (Side::Player, true) => "상대가 맹독으로 쓰러졌습니다!".to_string(),
                (Side::Cpu, true) => "플레이어가 맹독으로 쓰러졌습니다!".to_string(),
                (Side::Player, false) => format!("대전에서 이겼다!! 코인 {}개 획득!", reward),
                (Side::Cpu, false) => format!(
                    "대전에서 패배했다... 눈앞이 깜깜해졌다. (코인 {}개 획득.)",
                    reward
                ),
            }),

            BattleEvent::MoveUsed {
                side,
                move_name,
                upgrade_level,
            } => Some(format!(
                "{}의 {}{}!",
                side,
                move_name,
                Self::level_suffix(*upgrade_level)
            )),
            // Damage and healing show up as a suffix on the move line instead.
            BattleEvent::DamageDealt { .. } | BattleEvent::Healed { .. } => None,
            BattleEvent::Immune { .. } => {
                Some("효과가 없다... (토게피는 노말 타입이다!)".to_string())
            }
            BattleEvent::AttackBlocked { .. } => Some("공격을 막아냈습니다!".to_string()),
            BattleEvent::RechargeRequired { .. } => Some("효과가 굉장했다!".to_string()),
            BattleEvent::NoEffect => Some("효과가 전혀 없다...".to_string()),

            BattleEvent::DefenseLowered { target, .. } => {
                Some(format!("{}의 방어력이 떨어졌습니다!", target))
            }
            BattleEvent::Poisoned { target } => Some(match target {
                Side::Player => "플레이어가 맹독에 걸렸습니다!".to_string(),
                Side::Cpu => "상대에게 맹독을 걸었습니다!".to_string(),
            }),
            BattleEvent::AlreadyPoisoned { target } => {
                Some(format!("{}는 이미 맹독에 걸려있습니다!", target))
            }
            BattleEvent::ProtectRaised { side } => {
                Some(format!("{}는 방어태세를 갖췄다!", side))
            }
            BattleEvent::ProtectChained { upgrade_level, .. } => {
                Some(format!("연속 방어 성공! (v{})", upgrade_level))
            }
            BattleEvent::ProtectFailed { .. } => {
                Some("그러나 실패했다! (연속 사용 불가)".to_string())
            }
            BattleEvent::ProtectReuseChance { percent, .. } => {
                Some(format!("(연속 방어 실패: {}% 확률)", percent))
            }
            BattleEvent::StatusCured { side } => {
                Some(format!("{}의 상태 이상이 회복되었습니다!", side))
            }
            BattleEvent::RefreshHealed { amount, .. } => {
                Some(format!("리프레쉬 회복 효과! (+{})", amount))
            }
            BattleEvent::NothingHappened => {
                Some("그러나 아무 일도 일어나지 않았다...".to_string())
            }
            BattleEvent::PoisonDamage { .. } => None,
            BattleEvent::PoisonTicks { targets, amount } => Some(
                targets
                    .iter()
                    .map(|target| format!("{}는 맹독으로 고통받고 있다! (-{})", target, amount))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        }
    }

    fn level_suffix(level: u8) -> String {
        if level > 0 {
            format!(" v{}", level)
        } else {
            String::new()
        }
    }
}

/// Collects the events produced while handling one input.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<BattleEvent> {
        self.events
    }

    /// Print all events in debug format with indentation.
    pub fn print_debug(&self) {
        for event in &self.events {
            println!("  {:?}", event);
        }
    }

    /// Print all events in debug format with a custom prefix message.
    pub fn print_debug_with_message(&self, message: &str) {
        println!("{}", message);
        self.print_debug();
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl fmt::Display for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: u64,
    pub text: String,
}

/// Narration log that keeps only the most recent entries.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BattleLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_id: u64,
}

impl BattleLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            next_id: 0,
        }
    }

    /// Appends a line and returns its id. The oldest line is dropped when full.
    pub fn push(&mut self, text: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            id,
            text: text.into(),
        });
        id
    }

    /// Extends an existing line. Returns false if the line already scrolled out.
    pub fn append_to(&mut self, id: u64, suffix: &str) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.text.push_str(suffix);
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.text.clone()).collect()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatColor {
    Damage,
    Heal,
    Poison,
}

/// The single transient number shown over a sprite.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FloatingText {
    pub text: String,
    pub anchor: (u8, u8),
    pub color: FloatColor,
}

impl FloatingText {
    pub fn damage(target: Side, amount: u32) -> Self {
        Self {
            text: format!("-{}", amount),
            anchor: target.anchor(),
            color: FloatColor::Damage,
        }
    }

    pub fn heal(target: Side, amount: u32) -> Self {
        Self {
            text: format!("+{}", amount),
            anchor: target.anchor(),
            color: FloatColor::Heal,
        }
    }

    pub fn poison(target: Side, amount: u32) -> Self {
        Self {
            text: format!("-{}", amount),
            anchor: target.anchor(),
            color: FloatColor::Poison,
        }
    }
}

/// Everything about one battle session. Only the command executor mutates it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BattleState {
    pub difficulty: Difficulty,
    pub game_state: GameState,
    /// The side whose turn it is.
    pub turn: Side,
    pub turn_number: u32,
    pub combatants: [Combatant; 2],
    /// Side that must skip its next action.
    pub recharge_pending: Option<Side>,
    pub current_move: Option<String>,
    /// Log line of the move being resolved, for damage and heal suffixes.
    pub current_move_log: Option<u64>,
    pub floating_text: Option<FloatingText>,
    pub coin_result: Option<CoinSide>,
    pub log: BattleLog,
}

impl BattleState {
    pub fn new(player_max_hp: u32, difficulty: Difficulty, log_capacity: usize) -> Self {
        Self {
            difficulty,
            game_state: GameState::Init,
            turn: Side::Player,
            turn_number: 0,
            combatants: [
                Combatant::new(player_max_hp),
                Combatant::new(difficulty.profile().max_opponent_hp),
            ],
            recharge_pending: None,
            current_move: None,
            current_move_log: None,
            floating_text: None,
            coin_result: None,
            log: BattleLog::new(log_capacity),
        }
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        &self.combatants[side.to_index()]
    }

    pub fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        &mut self.combatants[side.to_index()]
    }

    pub fn winner(&self) -> Option<Side> {
        match self.game_state {
            GameState::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        let view = |side: Side| {
            let combatant = self.combatant(side);
            CombatantView {
                hp: combatant.hp,
                max_hp: combatant.max_hp,
                defense: combatant.defense,
                poisoned: combatant.has_condition(SideCondition::Poisoned),
                shielded: combatant.has_condition(SideCondition::Shielded),
                last_move: combatant.last_move.clone(),
            }
        };
        BattleSnapshot {
            phase: self.game_state,
            turn: self.turn,
            turn_number: self.turn_number,
            difficulty: self.difficulty,
            player: view(Side::Player),
            cpu: view(Side::Cpu),
            log: self.log.lines(),
            current_move: self.current_move.clone(),
            floating_text: self.floating_text.clone(),
            coin_result: self.coin_result,
            winner: self.winner(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CombatantView {
    pub hp: u32,
    pub max_hp: u32,
    pub defense: i32,
    pub poisoned: bool,
    pub shielded: bool,
    pub last_move: Option<String>,
}

/// Read-only view of a session for presentation layers.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BattleSnapshot {
    pub phase: GameState,
    pub turn: Side,
    pub turn_number: u32,
    pub difficulty: Difficulty,
    pub player: CombatantView,
    pub cpu: CombatantView,
    pub log: Vec<String>,
    pub current_move: Option<String>,
    pub floating_text: Option<FloatingText>,
    pub coin_result: Option<CoinSide>,
    pub winner: Option<Side>,
}
