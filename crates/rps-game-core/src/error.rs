//! Error types for game and registry operations.

use crate::protocol::{GamePhase, Party, SlotPhase};
use thiserror::Error;

/// Errors from a single game's state machine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid phase: expected {expected}, game is {actual}")]
    InvalidPhase {
        expected: GamePhase,
        actual: GamePhase,
    },

    #[error("Invalid phase: {party} slot is already {phase:?}")]
    InvalidSlotPhase { party: Party, phase: SlotPhase },

    #[error("Result not ready: game is still {0}")]
    NotReady(GamePhase),
}

impl GameError {
    /// Operation attempted out of order, at game or slot level
    pub fn is_invalid_phase(&self) -> bool {
        matches!(
            self,
            GameError::InvalidPhase { .. } | GameError::InvalidSlotPhase { .. }
        )
    }
}

/// Errors from the registry's input checks, plus anything the game rejects
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("Game not found")]
    GameNotFound,

    #[error("Invalid choice: {0} (expected 1, 2 or 3)")]
    InvalidChoice(i64),

    #[error(transparent)]
    Game(#[from] GameError),
}
