//! Per-game state machine.
//!
//! ```text
//! Initiated --(responder commits)--> Responded --(second reveal)--> Win | Draw
//! ```
//!
//! A game never moves backwards and never skips a phase. Adjudication runs
//! inside the reveal call that completes the pair and runs at most once.

use crate::crypto::{Commitment, Secret};
use crate::error::GameError;
use crate::games::{Attempt, Choice, RpsGame};
use crate::protocol::{
    GameId, GameOutcome, GamePhase, GameResult, GameSnapshot, Party, PlayerId, RevealStatus,
    SlotPhase, SlotSnapshot,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// One participant's seat in a game
#[derive(Clone, Debug)]
pub struct PlayerSlot {
    player: PlayerId,
    phase: SlotPhase,
    commitment: Option<Commitment>,
    choice: Choice,
    secret: Option<Secret>,
}

impl PlayerSlot {
    fn pending(player: PlayerId) -> Self {
        Self {
            player,
            phase: SlotPhase::Pending,
            commitment: None,
            choice: Choice::None,
            secret: None,
        }
    }

    fn played(player: PlayerId, commitment: Commitment) -> Self {
        Self {
            player,
            phase: SlotPhase::Played,
            commitment: Some(commitment),
            choice: Choice::None,
            secret: None,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn phase(&self) -> SlotPhase {
        self.phase
    }

    pub fn commitment(&self) -> Option<&Commitment> {
        self.commitment.as_ref()
    }

    /// Revealed choice, `Choice::None` until the slot reveals
    pub fn choice(&self) -> Choice {
        self.choice
    }

    /// Check the stored reveal against the stored commitment
    fn attempt(&self) -> Attempt {
        match (&self.commitment, &self.secret) {
            (Some(commitment), Some(secret)) => Attempt::check(commitment, self.choice, secret),
            _ => Attempt {
                choice: self.choice,
                matches_commitment: false,
            },
        }
    }

    fn snapshot(&self, publish_choice: bool) -> SlotSnapshot {
        SlotSnapshot {
            player: self.player,
            phase: self.phase,
            commitment: self.commitment,
            revealed_choice: publish_choice.then(|| self.choice.as_raw()),
        }
    }
}

/// Full state of one game between an initiator and a responder
#[derive(Clone, Debug)]
pub struct GameInstance {
    id: GameId,
    initiator: PlayerSlot,
    responder: PlayerSlot,
    phase: GamePhase,
    winner: Option<PlayerId>,
    comment: String,
    created_at: DateTime<Utc>,
}

impl GameInstance {
    /// Open a game. The initiator commits up front, so its slot starts as
    /// `Played`. Identities are not checked here.
    pub fn create(
        initiator: PlayerId,
        responder: PlayerId,
        initiator_commitment: Commitment,
    ) -> Self {
        let game = Self {
            id: GameId::new(),
            initiator: PlayerSlot::played(initiator, initiator_commitment),
            responder: PlayerSlot::pending(responder),
            phase: GamePhase::Initiated,
            winner: None,
            comment: String::new(),
            created_at: Utc::now(),
        };
        debug!(game_id = %game.id, %initiator, %responder, "game created");
        game
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn initiator(&self) -> &PlayerSlot {
        &self.initiator
    }

    pub fn responder(&self) -> &PlayerSlot {
        &self.responder
    }

    pub fn slot(&self, party: Party) -> &PlayerSlot {
        match party {
            Party::Initiator => &self.initiator,
            Party::Responder => &self.responder,
        }
    }

    fn slot_mut(&mut self, party: Party) -> &mut PlayerSlot {
        match party {
            Party::Initiator => &mut self.initiator,
            Party::Responder => &mut self.responder,
        }
    }

    /// Seat held by `player` in this game
    pub fn party_of(&self, player: PlayerId) -> Option<Party> {
        if player == self.initiator.player {
            Some(Party::Initiator)
        } else if player == self.responder.player {
            Some(Party::Responder)
        } else {
            None
        }
    }

    fn require_phase(&self, expected: GamePhase) -> Result<(), GameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::InvalidPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    /// Record the responder's commitment. Only valid while `Initiated`.
    pub fn submit_responder_commitment(&mut self, commitment: Commitment) -> Result<(), GameError> {
        self.require_phase(GamePhase::Initiated)?;

        self.responder.commitment = Some(commitment);
        self.responder.phase = SlotPhase::Played;
        self.phase = GamePhase::Responded;

        debug!(game_id = %self.id, "responder committed");
        Ok(())
    }

    /// Record a reveal for `party`. The reveal is not checked against the
    /// commitment here; a mismatch only counts against the party when the
    /// game is adjudicated. Adjudicates when this reveal completes the pair.
    pub fn reveal_choice(
        &mut self,
        party: Party,
        choice: Choice,
        secret: Secret,
    ) -> Result<RevealStatus, GameError> {
        self.require_phase(GamePhase::Responded)?;

        let slot = self.slot_mut(party);
        if slot.phase != SlotPhase::Played {
            return Err(GameError::InvalidSlotPhase {
                party,
                phase: slot.phase,
            });
        }
        slot.choice = choice;
        slot.secret = Some(secret);
        slot.phase = SlotPhase::ChoiceStored;

        debug!(game_id = %self.id, %party, "choice stored");

        if self.slot(party.opponent()).phase == SlotPhase::ChoiceStored {
            Ok(RevealStatus::Adjudicated(self.adjudicate()))
        } else {
            Ok(RevealStatus::AwaitingOpponent)
        }
    }

    /// Decide the game and freeze it. Callers guarantee both slots hold a
    /// reveal and the game is still `Responded`.
    fn adjudicate(&mut self) -> GameOutcome {
        debug_assert_eq!(self.phase, GamePhase::Responded);

        let verdict = RpsGame::judge(&self.initiator.attempt(), &self.responder.attempt());

        self.phase = match verdict.result {
            GameResult::Draw => GamePhase::Draw,
            _ => GamePhase::Win,
        };
        self.winner = verdict
            .result
            .winner()
            .map(|party| self.slot(party).player);
        self.comment = verdict.comment;

        info!(
            game_id = %self.id,
            phase = %self.phase,
            result = %verdict.result,
            winner = ?self.winner,
            comment = %self.comment,
            "game adjudicated"
        );

        self.outcome()
    }

    fn outcome(&self) -> GameOutcome {
        GameOutcome {
            winner: self.winner,
            phase: self.phase,
            comment: self.comment.clone(),
        }
    }

    /// Final result. Fails with `NotReady` until the game is adjudicated.
    pub fn get_result(&self) -> Result<GameOutcome, GameError> {
        let revealed = self.initiator.phase == SlotPhase::ChoiceStored
            && self.responder.phase == SlotPhase::ChoiceStored;
        if self.phase.is_terminal() && revealed {
            Ok(self.outcome())
        } else {
            Err(GameError::NotReady(self.phase))
        }
    }

    /// Public view; revealed choices are withheld until the game is over
    pub fn snapshot(&self) -> GameSnapshot {
        let finished = self.phase.is_terminal();
        GameSnapshot {
            game_id: self.id,
            phase: self.phase,
            initiator: self.initiator.snapshot(finished),
            responder: self.responder.snapshot(finished),
            outcome: self.get_result().ok(),
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        alice: PlayerId,
        bob: PlayerId,
        game: GameInstance,
    }

    fn responded_game(initiator: Choice, responder: Choice) -> Fixture {
        let alice = PlayerId::new();
        let bob = PlayerId::new();
        let mut game = GameInstance::create(
            alice,
            bob,
            Commitment::new(initiator, &Secret::from("s1")),
        );
        game.submit_responder_commitment(Commitment::new(responder, &Secret::from("s2")))
            .unwrap();
        Fixture { alice, bob, game }
    }

    #[test]
    fn test_create_sets_initial_state() {
        let alice = PlayerId::new();
        let bob = PlayerId::new();
        let commitment = Commitment::new(Choice::Rock, &Secret::from("s1"));
        let game = GameInstance::create(alice, bob, commitment);

        assert_eq!(game.phase(), GamePhase::Initiated);
        assert_eq!(game.initiator().phase(), SlotPhase::Played);
        assert_eq!(game.initiator().commitment(), Some(&commitment));
        assert_eq!(game.responder().phase(), SlotPhase::Pending);
        assert_eq!(game.responder().commitment(), None);
        assert_eq!(game.party_of(bob), Some(Party::Responder));
        assert_eq!(game.party_of(PlayerId::new()), None);
    }

    #[test]
    fn test_responder_commitment_advances_phase_once() {
        let Fixture { mut game, .. } = responded_game(Choice::Rock, Choice::Paper);
        assert_eq!(game.phase(), GamePhase::Responded);
        assert_eq!(game.responder().phase(), SlotPhase::Played);

        let first = *game.responder().commitment().unwrap();
        let err = game
            .submit_responder_commitment(Commitment::new(Choice::Rock, &Secret::from("x")))
            .unwrap_err();
        assert_eq!(
            err,
            GameError::InvalidPhase {
                expected: GamePhase::Initiated,
                actual: GamePhase::Responded,
            }
        );
        assert_eq!(game.responder().commitment(), Some(&first));
    }

    #[test]
    fn test_reveal_before_responder_commit_is_invalid_phase() {
        let mut game = GameInstance::create(
            PlayerId::new(),
            PlayerId::new(),
            Commitment::new(Choice::Rock, &Secret::from("s1")),
        );

        let err = game
            .reveal_choice(Party::Initiator, Choice::Rock, Secret::from("s1"))
            .unwrap_err();
        assert!(err.is_invalid_phase());
        assert_eq!(game.initiator().phase(), SlotPhase::Played);
    }

    #[test]
    fn test_first_reveal_waits_second_adjudicates() {
        let Fixture {
            alice, mut game, ..
        } = responded_game(Choice::Rock, Choice::Scissors);

        let status = game
            .reveal_choice(Party::Initiator, Choice::Rock, Secret::from("s1"))
            .unwrap();
        assert_eq!(status, RevealStatus::AwaitingOpponent);
        assert_eq!(game.phase(), GamePhase::Responded);
        assert_eq!(game.get_result(), Err(GameError::NotReady(GamePhase::Responded)));

        let status = game
            .reveal_choice(Party::Responder, Choice::Scissors, Secret::from("s2"))
            .unwrap();
        let expected = GameOutcome {
            winner: Some(alice),
            phase: GamePhase::Win,
            comment: "Rock beats Scissors, initiator won".to_string(),
        };
        assert_eq!(status, RevealStatus::Adjudicated(expected.clone()));
        assert_eq!(game.get_result().unwrap(), expected);
    }

    #[test]
    fn test_responder_may_reveal_first() {
        let Fixture { bob, mut game, .. } = responded_game(Choice::Rock, Choice::Paper);

        assert_eq!(
            game.reveal_choice(Party::Responder, Choice::Paper, Secret::from("s2"))
                .unwrap(),
            RevealStatus::AwaitingOpponent
        );
        game.reveal_choice(Party::Initiator, Choice::Rock, Secret::from("s1"))
            .unwrap();

        let outcome = game.get_result().unwrap();
        assert_eq!(outcome.winner, Some(bob));
        assert_eq!(outcome.comment, "Paper beats Rock, responder won");
    }

    #[test]
    fn test_double_reveal_is_rejected_and_keeps_first_reveal() {
        let Fixture { mut game, .. } = responded_game(Choice::Rock, Choice::Paper);

        game.reveal_choice(Party::Initiator, Choice::Rock, Secret::from("s1"))
            .unwrap();
        let err = game
            .reveal_choice(Party::Initiator, Choice::Paper, Secret::from("other"))
            .unwrap_err();

        assert_eq!(
            err,
            GameError::InvalidSlotPhase {
                party: Party::Initiator,
                phase: SlotPhase::ChoiceStored,
            }
        );
        assert!(err.is_invalid_phase());
        assert_eq!(game.initiator().choice(), Choice::Rock);
    }

    #[test]
    fn test_mismatched_reveal_loses() {
        let Fixture { bob, mut game, .. } = responded_game(Choice::Rock, Choice::Paper);

        game.reveal_choice(Party::Initiator, Choice::Rock, Secret::from("wrong"))
            .unwrap();
        game.reveal_choice(Party::Responder, Choice::Paper, Secret::from("s2"))
            .unwrap();

        let outcome = game.get_result().unwrap();
        assert_eq!(outcome.phase, GamePhase::Win);
        assert_eq!(outcome.winner, Some(bob));
        assert_eq!(outcome.comment, "initiator attempt invalid");
    }

    #[test]
    fn test_changed_choice_after_commit_loses() {
        let Fixture { alice, mut game, .. } = responded_game(Choice::Rock, Choice::Scissors);

        game.reveal_choice(Party::Initiator, Choice::Rock, Secret::from("s1"))
            .unwrap();
        // Committed to Scissors, reveals Rock
        game.reveal_choice(Party::Responder, Choice::Rock, Secret::from("s2"))
            .unwrap();

        let outcome = game.get_result().unwrap();
        assert_eq!(outcome.winner, Some(alice));
        assert_eq!(outcome.comment, "responder attempt invalid");
    }

    #[test]
    fn test_both_invalid_is_draw_without_winner() {
        let Fixture { mut game, .. } = responded_game(Choice::Rock, Choice::Paper);

        game.reveal_choice(Party::Initiator, Choice::Rock, Secret::from("x"))
            .unwrap();
        game.reveal_choice(Party::Responder, Choice::Paper, Secret::from("y"))
            .unwrap();

        let outcome = game.get_result().unwrap();
        assert_eq!(outcome.phase, GamePhase::Draw);
        assert_eq!(outcome.winner, None);
        assert_eq!(outcome.comment, "both attempts invalid");
    }

    #[test]
    fn test_finished_game_is_frozen() {
        let Fixture { mut game, .. } = responded_game(Choice::Paper, Choice::Paper);

        game.reveal_choice(Party::Initiator, Choice::Paper, Secret::from("s1"))
            .unwrap();
        game.reveal_choice(Party::Responder, Choice::Paper, Secret::from("s2"))
            .unwrap();
        let first = game.get_result().unwrap();
        assert_eq!(first.comment, "both choices are same");

        assert!(game
            .reveal_choice(Party::Responder, Choice::Rock, Secret::from("s2"))
            .unwrap_err()
            .is_invalid_phase());
        assert!(game
            .submit_responder_commitment(Commitment::new(Choice::Rock, &Secret::from("s")))
            .is_err());

        for _ in 0..3 {
            assert_eq!(game.get_result().unwrap(), first);
        }
    }

    #[test]
    fn test_snapshot_hides_choices_until_finished() {
        let Fixture { mut game, .. } = responded_game(Choice::Rock, Choice::Paper);

        game.reveal_choice(Party::Initiator, Choice::Rock, Secret::from("s1"))
            .unwrap();
        let snapshot = game.snapshot();
        assert_eq!(snapshot.initiator.phase, SlotPhase::ChoiceStored);
        assert_eq!(snapshot.initiator.revealed_choice, None);
        assert_eq!(snapshot.outcome, None);

        game.reveal_choice(Party::Responder, Choice::Paper, Secret::from("s2"))
            .unwrap();
        let snapshot = game.snapshot();
        assert_eq!(snapshot.initiator.revealed_choice, Some(1));
        assert_eq!(snapshot.responder.revealed_choice, Some(2));
        assert_eq!(snapshot.outcome, game.get_result().ok());
    }
}
