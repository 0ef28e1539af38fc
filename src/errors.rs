use crate::battle::state::GameState;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for anything the arena can report.
#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("Battle error: {0}")]
    Battle(#[from] BattleError),
    #[error("Progression error: {0}")]
    Progress(#[from] ProgressError),
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors related to move catalog lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Move not found: {0}")]
    MoveNotFound(String),
}

/// A weighted draw was asked to pick from nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("no eligible move to draw from")]
    NoEligibleMove,
}

/// Errors raised while driving a battle session
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BattleError {
    /// The player's deck holds no move the catalog knows.
    #[error("사용할 수 있는 기술이 없습니다! (덱을 확인해주세요)")]
    NoEligibleMove,
    /// A timer is still running; only it may advance the session.
    #[error("a timed transition is still pending")]
    TransitionPending,
    #[error("{input} is not accepted while the battle is in {phase}")]
    UnexpectedInput {
        phase: GameState,
        input: &'static str,
    },
    #[error("the deck must hold exactly 6 moves to battle, found {0}")]
    DeckNotReady(usize),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<SelectorError> for BattleError {
    fn from(err: SelectorError) -> Self {
        match err {
            SelectorError::NoEligibleMove => BattleError::NoEligibleMove,
        }
    }
}

/// Failures of the key-value transport underneath the progression record.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage lock was poisoned")]
    Poisoned,
}

/// A progression operation was refused. The record is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("코인이 부족합니다! (보유 {balance}, 필요 {needed})")]
    InsufficientCoins { balance: u32, needed: u32 },
    #[error("{move_name}은(는) 이미 최대 레벨입니다")]
    MaxLevel { move_name: String },
    #[error("{move_name} 카드가 부족합니다 ({have}/{need})")]
    NotEnoughCopies {
        move_name: String,
        have: usize,
        need: usize,
    },
    #[error("덱은 최대 6개의 기술만 담을 수 있습니다 (현재 {0}개)")]
    DeckTooLarge(usize),
    #[error("튀어오르기는 덱에 반드시 포함되어야 합니다")]
    MissingMandatoryMove,
    #[error("덱에 같은 기술이 두 번 들어갈 수 없습니다: {0}")]
    DuplicateDeckMove(String),
    #[error("뽑기 횟수는 1 이상이어야 합니다")]
    InvalidPullCount,
}

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Draw(#[from] SelectorError),
}

impl ProgressError {
    /// The refusal reason, if this was a validation failure rather than a storage fault.
    pub fn validation(&self) -> Option<&ValidationFailure> {
        match self {
            ProgressError::Validation(failure) => Some(failure),
            ProgressError::Storage(_) | ProgressError::Draw(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Type alias for Results using BattleError
pub type BattleResult<T> = Result<T, BattleError>;

/// Type alias for Results using CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;

pub type ProgressResult<T> = Result<T, ProgressError>;

pub type StorageResult<T> = Result<T, StorageError>;

pub type ConfigResult<T> = Result<T, ConfigError>;
