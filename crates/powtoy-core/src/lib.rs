//! Core logic for the powtoy hashing and proof-of-work playground.
//!
//! This crate provides pure Rust implementations of:
//! - SHA256 hashing with hex and Base64 renderings
//! - Canonical, order-stable encoding of block candidates
//! - Block hashing over that encoding
//! - A cancellable nonce search against a Base64 leading-zero difficulty
//! - Lenient parsing of raw form input

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod block;
pub mod difficulty;
pub mod encoding;
pub mod hash;
pub mod input;
pub mod miner;
#[cfg(feature = "std")]
pub mod worker;

pub use block::{block_hash, compute_block_hash};
pub use difficulty::{Difficulty, DifficultyError, MAX_DIFFICULTY};
pub use encoding::{
    encode_block, Amount, BlockCandidate, NonceOverflow, TooManyTransactions, Transaction,
    MAX_TRANSACTIONS,
};
pub use hash::{hash_text, sha256, Digest, TextHash};
pub use miner::{
    mine_with, CancelSignal, Clock, MineError, MinerConfig, MiningRequest, MiningResult,
    MiningSearch, NeverCancel, Progress,
};
#[cfg(feature = "std")]
pub use miner::{mine, SystemClock};
#[cfg(feature = "std")]
pub use worker::{MiningHandle, MiningSession, MiningWorker};
