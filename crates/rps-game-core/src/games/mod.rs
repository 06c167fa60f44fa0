//! Game definitions and logic.

mod rps;

pub use rps::{Attempt, Choice, RpsGame, Verdict};
