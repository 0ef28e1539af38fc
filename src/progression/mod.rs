//! Meta-progression: coins, owned move copies, upgrade levels and the deck.

pub mod acquisition;
pub mod record;
pub mod repository;
pub mod store;

pub use acquisition::{AcquisitionService, PullResult};
pub use record::ProgressRecord;
pub use repository::{FileStore, KeyValueRepository, KeyValueStore, MemoryStore, ProgressRepository};
pub use store::ProgressionStore;

/// Fixed key of the single persisted record.
pub const STORAGE_KEY: &str = "metronome-arena-progress-v1";

pub const STARTING_COINS: u32 = 300;

/// Every saved deck must contain this move.
pub const MANDATORY_DECK_MOVE: &str = "튀어오르기";

pub const DECK_SIZE: usize = 6;

pub const MAX_UPGRADE_LEVEL: u8 = 5;

/// Copies consumed by one upgrade.
pub const COPIES_PER_UPGRADE: usize = 5;

/// Starting deck; the starting inventory holds one copy of each.
pub const DEFAULT_DECK: [&str; DECK_SIZE] = [
    "몸통박치기",
    "10만볼트",
    "파괴광선",
    "HP회복",
    "째려보기",
    "튀어오르기",
];
