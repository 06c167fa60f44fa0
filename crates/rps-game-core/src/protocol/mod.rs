//! Protocol types and messages.

mod messages;
mod types;

pub use messages::{CommitMessage, CreateGameMessage, GameSnapshot, RevealMessage, SlotSnapshot};
pub use types::{
    GameId, GameOutcome, GamePhase, GameResult, Party, PlayerId, RevealStatus, SlotPhase,
};
