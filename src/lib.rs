// In: src/lib.rs

//! Metronome Arena
//!
//! A turn-based finger-wag battle against a CPU Togepi: every action is a
//! weighted random draw from a deck of moves. Wins pay coins, coins buy
//! random move copies, and duplicate copies upgrade moves. The move catalog
//! is compiled into the binary at build time.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod config;
pub mod errors;
pub mod logging;
pub mod mcp_interface;
pub mod move_data;
pub mod player;
pub mod progression;
pub mod rng;
pub mod selector;

// --- PUBLIC API RE-EXPORTS ---

// Shared data definitions from the `schema` crate.
pub use schema::{
    CoinSide, Difficulty, DifficultyProfile, MoveData, MoveEffect, MoveQuirk, MoveType,
};

// Driving a battle session.
pub use battle::runner::{BattleRunner, ProgressionLink};
pub use battle::scheduler::{ManualScheduler, Scheduler, TimerTicket, TokioScheduler};
pub use battle::state::{BattleEvent, BattleSnapshot, BattleState, GameState};
pub use player::Side;

// Meta-progression and the shop.
pub use progression::{AcquisitionService, ProgressRecord, ProgressionStore, PullResult};

pub use config::ArenaConfig;
pub use move_data::{all_moves, get_move_data};
pub use rng::GameRng;

// Crate-specific error and result types.
pub use errors::{
    ArenaError, BattleError, BattleResult, CatalogError, ConfigError, ProgressError,
    ProgressResult, StorageError, ValidationFailure,
};
