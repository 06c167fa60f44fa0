//! Registry of live games, keyed by the pair of participants.

use super::instance::GameInstance;
use crate::crypto::{Commitment, Secret};
use crate::error::{GameError, RegistryError};
use crate::games::Choice;
use crate::protocol::{GameOutcome, GameSnapshot, Party, PlayerId, RevealStatus};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Shared reference to one game
///
/// Every call takes the game's lock for its whole duration, so calls on one
/// game are applied one at a time. A clone stays usable after the registry
/// replaces the game with a newer one for the same pair.
#[derive(Clone, Debug)]
pub struct GameHandle(Arc<Mutex<GameInstance>>);

impl GameHandle {
    fn new(game: GameInstance) -> Self {
        Self(Arc::new(Mutex::new(game)))
    }

    fn lock(&self) -> MutexGuard<'_, GameInstance> {
        // Transitions never panic part-way, so a poisoned game is still consistent
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the game
    pub fn with<R>(&self, f: impl FnOnce(&mut GameInstance) -> R) -> R {
        f(&mut *self.lock())
    }

    pub fn submit_responder_commitment(&self, commitment: Commitment) -> Result<(), GameError> {
        self.lock().submit_responder_commitment(commitment)
    }

    pub fn reveal_choice(
        &self,
        party: Party,
        choice: Choice,
        secret: Secret,
    ) -> Result<RevealStatus, GameError> {
        self.lock().reveal_choice(party, choice, secret)
    }

    pub fn get_result(&self) -> Result<GameOutcome, GameError> {
        self.lock().get_result()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.lock().snapshot()
    }
}

/// Order-independent key for a pair of participants
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct PairKey(PlayerId, PlayerId);

impl PairKey {
    fn new(a: PlayerId, b: PlayerId) -> Result<Self, RegistryError> {
        if a.is_nil() || b.is_nil() {
            return Err(RegistryError::InvalidIdentity(
                "zero identity is not a player".to_string(),
            ));
        }
        if a == b {
            return Err(RegistryError::InvalidIdentity(
                "a player cannot play against themselves".to_string(),
            ));
        }
        Ok(if a < b { Self(a, b) } else { Self(b, a) })
    }

    fn contains(&self, player: PlayerId) -> bool {
        self.0 == player || self.1 == player
    }
}

/// Keyed store of games, one per pair of participants
///
/// Either participant can address the game by passing itself as `caller`
/// and the other as `counterparty`.
#[derive(Debug, Default)]
pub struct GameRegistry {
    games: RwLock<HashMap<PairKey, GameHandle>>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pairs with a game
    pub fn len(&self) -> usize {
        self.games.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Open a game and make it the pair's current game, replacing any
    /// earlier one.
    pub fn create_game(
        &self,
        initiator: PlayerId,
        responder: PlayerId,
        initiator_commitment: Commitment,
    ) -> Result<GameHandle, RegistryError> {
        let key = PairKey::new(initiator, responder)?;
        let game = GameInstance::create(initiator, responder, initiator_commitment);
        let game_id = game.id();
        let handle = GameHandle::new(game);

        let replaced = self
            .games
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, handle.clone());

        if let Some(old) = replaced {
            let (old_id, old_phase) = old.with(|g| (g.id(), g.phase()));
            if !old_phase.is_terminal() {
                warn!(%old_id, phase = %old_phase, "replacing unfinished game");
            }
        }

        info!(%game_id, %initiator, %responder, "game created");
        Ok(handle)
    }

    /// Current game between `caller` and `counterparty`
    pub fn game(
        &self,
        caller: PlayerId,
        counterparty: PlayerId,
    ) -> Result<GameHandle, RegistryError> {
        let key = PairKey::new(caller, counterparty)?;
        self.games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
            .ok_or_else(|| {
                debug!(%caller, %counterparty, "no game for pair");
                RegistryError::GameNotFound
            })
    }

    /// Record the responder's commitment. `caller` must be the responder.
    pub fn submit_responder_commitment(
        &self,
        caller: PlayerId,
        counterparty: PlayerId,
        commitment: Commitment,
    ) -> Result<(), RegistryError> {
        self.game(caller, counterparty)?.with(|game| -> Result<(), RegistryError> {
            if game.party_of(caller) != Some(Party::Responder) {
                return Err(RegistryError::InvalidIdentity(
                    "only the responder can submit a commitment".to_string(),
                ));
            }
            game.submit_responder_commitment(commitment)?;
            Ok(())
        })
    }

    /// Reveal `caller`'s choice. `raw_choice` must be 1, 2 or 3.
    pub fn reveal_choice(
        &self,
        caller: PlayerId,
        counterparty: PlayerId,
        raw_choice: i64,
        secret: Secret,
    ) -> Result<RevealStatus, RegistryError> {
        let choice = u8::try_from(raw_choice)
            .ok()
            .and_then(Choice::from_raw)
            .ok_or(RegistryError::InvalidChoice(raw_choice))?;

        self.game(caller, counterparty)?.with(|game| -> Result<RevealStatus, RegistryError> {
            let party = game.party_of(caller).ok_or_else(|| {
                RegistryError::InvalidIdentity("caller is not in this game".to_string())
            })?;
            Ok(game.reveal_choice(party, choice, secret)?)
        })
    }

    pub fn get_result(
        &self,
        caller: PlayerId,
        counterparty: PlayerId,
    ) -> Result<GameOutcome, RegistryError> {
        Ok(self.game(caller, counterparty)?.get_result()?)
    }

    pub fn snapshot(
        &self,
        caller: PlayerId,
        counterparty: PlayerId,
    ) -> Result<GameSnapshot, RegistryError> {
        Ok(self.game(caller, counterparty)?.snapshot())
    }

    /// Snapshots of every current game `player` takes part in, oldest first
    pub fn games_for(&self, player: PlayerId) -> Vec<GameSnapshot> {
        let handles: Vec<GameHandle> = self
            .games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(key, _)| key.contains(player))
            .map(|(_, handle)| handle.clone())
            .collect();

        let mut snapshots: Vec<GameSnapshot> = handles.iter().map(GameHandle::snapshot).collect();
        snapshots.sort_by_key(|s| s.created_at);
        snapshots
    }
}
