//! Rock-Paper-Scissors choices and adjudication.

use crate::crypto::{Commitment, Secret};
use crate::protocol::GameResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rock-Paper-Scissors choice
///
/// `None` is a sentinel for "nothing decoded"; no player can legitimately
/// commit to it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Choice {
    #[default]
    None = 0,
    Rock = 1,
    Paper = 2,
    Scissors = 3,
}

impl Choice {
    /// Decode a raw wire value. Only 1..=3 map to a playable choice.
    pub fn from_raw(raw: u8) -> Option<Choice> {
        match raw {
            1 => Some(Choice::Rock),
            2 => Some(Choice::Paper),
            3 => Some(Choice::Scissors),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> u8 {
        *self as u8
    }

    /// Name hashed into commitments
    pub fn name(&self) -> &'static str {
        match self {
            Choice::None => "None",
            Choice::Rock => "Rock",
            Choice::Paper => "Paper",
            Choice::Scissors => "Scissors",
        }
    }

    /// Check if this choice beats the other
    pub fn beats(&self, other: &Choice) -> bool {
        matches!(
            (self, other),
            (Choice::Rock, Choice::Scissors)
                | (Choice::Scissors, Choice::Paper)
                | (Choice::Paper, Choice::Rock)
        )
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A revealed choice, checked against the commitment made for it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attempt {
    pub choice: Choice,
    /// Whether `choice` and the revealed secret reproduce the commitment
    pub matches_commitment: bool,
}

impl Attempt {
    /// Check a reveal against its commitment
    pub fn check(commitment: &Commitment, choice: Choice, secret: &Secret) -> Self {
        Self {
            choice,
            matches_commitment: commitment.verify(choice, secret),
        }
    }
}

/// Outcome of judging two attempts, with the human readable reason
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub result: GameResult,
    pub comment: String,
}

impl Verdict {
    fn new(result: GameResult, comment: impl Into<String>) -> Self {
        Self {
            result,
            comment: comment.into(),
        }
    }
}

/// Rock-Paper-Scissors judge
pub struct RpsGame;

impl RpsGame {
    /// Decide the game from both attempts. First matching rule wins.
    pub fn judge(initiator: &Attempt, responder: &Attempt) -> Verdict {
        let (ci, cr) = (initiator.choice, responder.choice);

        if (!initiator.matches_commitment && !responder.matches_commitment)
            || (ci == Choice::None && cr == Choice::None)
        {
            Verdict::new(GameResult::Draw, "both attempts invalid")
        } else if !initiator.matches_commitment || ci == Choice::None {
            Verdict::new(GameResult::ResponderWins, "initiator attempt invalid")
        } else if !responder.matches_commitment || cr == Choice::None {
            Verdict::new(GameResult::InitiatorWins, "responder attempt invalid")
        } else if ci == cr {
            Verdict::new(GameResult::Draw, "both choices are same")
        } else if ci.beats(&cr) {
            Verdict::new(
                GameResult::InitiatorWins,
                format!("{} beats {}, initiator won", ci, cr),
            )
        } else {
            Verdict::new(
                GameResult::ResponderWins,
                format!("{} beats {}, responder won", cr, ci),
            )
        }
    }
}
