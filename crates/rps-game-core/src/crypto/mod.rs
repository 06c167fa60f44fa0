//! Cryptographic primitives for the commit-reveal protocol.
//!
//! This module provides:
//! - Commitment, the SHA-256 digest a player submits before revealing
//! - Secret, the text mixed into a commitment

mod commitment;

pub use commitment::{Commitment, CommitmentError, Secret, SEPARATOR};
