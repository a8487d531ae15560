//! Sequential proof-of-work search over nonces.
//!
//! A candidate is `message` immediately followed by the decimal nonce. The
//! search starts at nonce 0 and stops at the first candidate whose Base64
//! digest starts with `difficulty` zeros, so the returned nonce is always the
//! smallest winning one.

use alloc::string::String;
use core::fmt::{self, Write as _};
use core::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::hash::sha256;

/// Errors that end a search without a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MineError {
    #[error("mining was cancelled")]
    Cancelled,
    #[error("nonce space exhausted without meeting the difficulty")]
    NonceOverflow,
    #[error("elapsed time does not fit in 64 bits of milliseconds")]
    ElapsedOverflow,
}

/// What to mine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningRequest {
    pub message: String,
    pub difficulty: Difficulty,
}

impl MiningRequest {
    pub fn new(message: impl Into<String>, difficulty: Difficulty) -> Self {
        MiningRequest {
            message: message.into(),
            difficulty,
        }
    }
}

/// Outcome of a finished search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningResult {
    /// Smallest nonce meeting the difficulty.
    pub nonce: u64,
    /// Wall-clock duration of the search.
    pub elapsed_millis: u64,
}

impl fmt::Display for MiningResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Finished! nonce = {} ({} ms)", self.nonce, self.elapsed_millis)
    }
}

/// Snapshot of a running search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Next nonce to be tried.
    pub nonce: u64,
    /// Hashes computed so far.
    pub hashes: u64,
    pub elapsed_millis: u64,
}

/// Tuning for batched searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Nonces tried between two cancellation checks.
    pub batch_size: u64,
    /// Batches between two progress reports. Zero disables reporting.
    pub progress_every: u64,
}

impl Default for MinerConfig {
    fn default() -> Self {
        MinerConfig {
            batch_size: 4_096,
            progress_every: 64,
        }
    }
}

/// Source of monotonic milliseconds.
pub trait Clock {
    fn now_millis(&self) -> u128;
}

/// Wall clock backed by `std::time::Instant`.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now_millis(&self) -> u128 {
        self.origin.elapsed().as_millis()
    }
}

/// Cooperative cancellation, polled between batches.
pub trait CancelSignal {
    fn is_cancelled(&self) -> bool;
}

impl CancelSignal for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: CancelSignal + ?Sized> CancelSignal for &T {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

#[cfg(feature = "std")]
impl<T: CancelSignal + ?Sized> CancelSignal for std::sync::Arc<T> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// A signal that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelSignal for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Resumable search state.
///
/// Each [`step`](MiningSearch::step) tries a bounded number of nonces, which
/// lets the caller interleave cancellation checks, progress output or (in a
/// browser) yielding back to the event loop.
#[derive(Debug, Clone)]
pub struct MiningSearch {
    difficulty: Difficulty,
    /// Message bytes followed by the current nonce digits.
    candidate: String,
    prefix_len: usize,
    next_nonce: u64,
    hashes: u64,
    found: Option<u64>,
    exhausted: bool,
}

impl MiningSearch {
    pub fn new(request: &MiningRequest) -> Self {
        let mut candidate = String::with_capacity(request.message.len() + 20);
        candidate.push_str(&request.message);
        MiningSearch {
            difficulty: request.difficulty,
            prefix_len: request.message.len(),
            candidate,
            next_nonce: 0,
            hashes: 0,
            found: None,
            exhausted: false,
        }
    }

    pub fn next_nonce(&self) -> u64 {
        self.next_nonce
    }

    pub fn hashes(&self) -> u64 {
        self.hashes
    }

    pub fn found(&self) -> Option<u64> {
        self.found
    }

    /// Try up to `batch_size` nonces.
    ///
    /// Returns `Ok(Some(nonce))` once a winner is found (and on every later
    /// call), `Ok(None)` if this batch had no winner.
    pub fn step(&mut self, batch_size: u64) -> Result<Option<u64>, MineError> {
        if let Some(nonce) = self.found {
            return Ok(Some(nonce));
        }
        if self.exhausted {
            return Err(MineError::NonceOverflow);
        }

        for _ in 0..batch_size.max(1) {
            let nonce = self.next_nonce;
            if self.check(nonce) {
                tracing::trace!(nonce, hashes = self.hashes, "difficulty met");
                self.found = Some(nonce);
                return Ok(Some(nonce));
            }
            match nonce.checked_add(1) {
                Some(next) => self.next_nonce = next,
                None => {
                    self.exhausted = true;
                    return Err(MineError::NonceOverflow);
                }
            }
        }

        tracing::trace!(next_nonce = self.next_nonce, hashes = self.hashes, "batch exhausted");
        Ok(None)
    }

    fn check(&mut self, nonce: u64) -> bool {
        self.candidate.truncate(self.prefix_len);
        // Writing into a String never fails.
        let _ = write!(self.candidate, "{}", nonce);
        self.hashes = self.hashes.saturating_add(1);
        let digest = sha256(self.candidate.as_bytes()).to_base64();
        self.difficulty.is_met_by(&digest)
    }
}

fn elapsed_since<C: Clock + ?Sized>(clock: &C, start: u128) -> Result<u64, MineError> {
    // A clock stepping backwards counts as no time passed.
    let elapsed = clock.now_millis().saturating_sub(start);
    u64::try_from(elapsed).map_err(|_| MineError::ElapsedOverflow)
}

/// Run a search to completion, checking `cancel` between batches.
///
/// `on_progress` is called every `config.progress_every` batches. A
/// cancelled search returns [`MineError::Cancelled`] and nothing else.
pub fn mine_with<C, K, F>(
    request: &MiningRequest,
    config: &MinerConfig,
    clock: &C,
    cancel: &K,
    mut on_progress: F,
) -> Result<MiningResult, MineError>
where
    C: Clock + ?Sized,
    K: CancelSignal + ?Sized,
    F: FnMut(Progress),
{
    tracing::debug!(
        message_len = request.message.len(),
        difficulty = request.difficulty.zeros(),
        batch_size = config.batch_size,
        "mining started"
    );

    let start = clock.now_millis();
    let mut search = MiningSearch::new(request);
    let mut batches: u64 = 0;

    loop {
        if cancel.is_cancelled() {
            tracing::debug!(next_nonce = search.next_nonce(), "mining cancelled");
            return Err(MineError::Cancelled);
        }

        if let Some(nonce) = search.step(config.batch_size)? {
            let elapsed_millis = elapsed_since(clock, start)?;
            tracing::debug!(nonce, elapsed_millis, hashes = search.hashes(), "mining finished");
            return Ok(MiningResult {
                nonce,
                elapsed_millis,
            });
        }

        batches += 1;
        if config.progress_every > 0 && batches % config.progress_every == 0 {
            on_progress(Progress {
                nonce: search.next_nonce(),
                hashes: search.hashes(),
                elapsed_millis: elapsed_since(clock, start)?,
            });
        }
    }
}

/// Mine on the calling thread until the difficulty is met.
///
/// Blocks for as long as the search takes; use
/// [`MiningWorker`](crate::worker::MiningWorker) to keep the caller free.
#[cfg(feature = "std")]
pub fn mine(request: &MiningRequest) -> Result<MiningResult, MineError> {
    mine_with(request, &MinerConfig::default(), &SystemClock::new(), &NeverCancel, |_| {})
}
