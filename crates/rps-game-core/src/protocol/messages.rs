//! Protocol messages.

use crate::crypto::{Commitment, Secret};
use crate::protocol::{GameId, GameOutcome, GamePhase, PlayerId, SlotPhase};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Initiator opens a game against a responder, committing up front
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateGameMessage {
    pub initiator: PlayerId,
    pub responder: PlayerId,
    pub commitment: Commitment,
}

/// Responder's commitment
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommitMessage {
    pub caller: PlayerId,
    pub counterparty: PlayerId,
    pub commitment: Commitment,
}

/// Reveal of the raw choice and secret. `choice` is the raw wire value,
/// kept wide so any integer a client sends is range checked by the registry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RevealMessage {
    pub caller: PlayerId,
    pub counterparty: PlayerId,
    pub choice: i64,
    pub secret: Secret,
}

/// Public view of one seat
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    pub player: PlayerId,
    pub phase: SlotPhase,
    pub commitment: Option<Commitment>,
    /// Raw revealed choice, only published once the game is finished
    pub revealed_choice: Option<u8>,
}

/// Public view of one game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub phase: GamePhase,
    pub initiator: SlotSnapshot,
    pub responder: SlotSnapshot,
    pub outcome: Option<GameOutcome>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::Choice;

    #[test]
    fn test_message_serialization() {
        let commit_msg = CommitMessage {
            caller: PlayerId::new(),
            counterparty: PlayerId::new(),
            commitment: Commitment::new(Choice::Rock, &Secret::random()),
        };

        let json = serde_json::to_string(&commit_msg).unwrap();
        let deserialized: CommitMessage = serde_json::from_str(&json).unwrap();

        assert_eq!(commit_msg.caller, deserialized.caller);
        assert_eq!(commit_msg.commitment, deserialized.commitment);
    }

    #[test]
    fn test_reveal_message_wire_shape() {
        let caller = PlayerId::new();
        let counterparty = PlayerId::new();
        let json = serde_json::json!({
            "caller": caller.to_string(),
            "counterparty": counterparty.to_string(),
            "choice": 2,
            "secret": "s2",
        });

        let msg: RevealMessage = serde_json::from_value(json).unwrap();
        assert_eq!(msg.caller, caller);
        assert_eq!(msg.choice, 2);
        assert_eq!(msg.secret.as_str(), "s2");
    }

    #[test]
    fn test_commitment_rejects_short_hex() {
        let json = serde_json::json!({
            "initiator": PlayerId::new().to_string(),
            "responder": PlayerId::new().to_string(),
            "commitment": "abcd",
        });

        assert!(serde_json::from_value::<CreateGameMessage>(json).is_err());
    }
}
