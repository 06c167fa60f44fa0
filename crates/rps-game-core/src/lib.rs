//! RPS Game Core Library
//!
//! Commit-reveal Rock-Paper-Scissors between two players:
//! - `crypto`: commitments over a choice and a secret
//! - `games`: choices and the adjudication rules
//! - `game`: the per-game state machine and the registry of games
//! - `protocol`: identities, phases, outcomes and wire messages

pub mod crypto;
pub mod error;
pub mod game;
pub mod games;
pub mod protocol;

pub use crypto::{Commitment, CommitmentError, Secret};
pub use error::{GameError, RegistryError};
pub use game::{GameHandle, GameInstance, GameRegistry, PlayerSlot};
pub use games::{Attempt, Choice, RpsGame, Verdict};
pub use protocol::{
    GameId, GameOutcome, GamePhase, GameResult, GameSnapshot, Party, PlayerId, RevealStatus,
    SlotPhase,
};
