//! Mining controller for the WASM playground.
//!
//! JavaScript drives the search in batches (from a worker or between animation
//! frames), so the page stays responsive and can stop a run at any time.

use powtoy_core::{Clock, Difficulty, MineError, MiningRequest, MiningResult, MiningSearch};
use wasm_bindgen::prelude::*;

use crate::state::{to_js, BatchInfo, MiningStats};

/// Milliseconds from `Date.now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsClock;

impl Clock for JsClock {
    fn now_millis(&self) -> u128 {
        js_sys::Date::now().max(0.0) as u128
    }
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// The main mining controller.
#[wasm_bindgen]
pub struct Miner {
    /// What is being mined.
    request: MiningRequest,
    /// Search position.
    search: MiningSearch,
    /// Mining statistics.
    stats: MiningStats,
    /// Start time of mining.
    start_time: u128,
    /// Whether mining is active.
    is_mining: bool,
    /// Final result, once found.
    result: Option<MiningResult>,
}

#[wasm_bindgen]
impl Miner {
    /// Create a new miner instance.
    ///
    /// # Arguments
    /// * `message` - The text to find a nonce for
    /// * `difficulty` - Required leading `0` characters of the Base64 digest
    #[wasm_bindgen(constructor)]
    pub fn new(message: &str, difficulty: i32) -> Result<Miner, JsValue> {
        let difficulty = Difficulty::coerce(i64::from(difficulty)).map_err(js_error)?;
        let request = MiningRequest::new(message, difficulty);
        Ok(Miner::from_request(request))
    }

    /// Mine a batch of nonces.
    ///
    /// # Arguments
    /// * `batch_size` - Number of nonces to try in this batch
    ///
    /// # Returns
    /// Batch result with found status; throws once the run has been stopped.
    #[wasm_bindgen]
    pub fn mine_batch(&mut self, batch_size: u32) -> Result<JsValue, JsValue> {
        if let Some(result) = self.result {
            return to_js(&BatchInfo::finished(&result, 0));
        }
        if !self.is_mining {
            return Err(js_error(MineError::Cancelled));
        }

        let hashes_before = self.search.hashes();
        let found = self.search.step(u64::from(batch_size)).map_err(js_error)?;
        let hashes_computed = self.search.hashes() - hashes_before;

        let elapsed_ms = self.elapsed_ms().map_err(js_error)?;
        self.stats.total_hashes = self.search.hashes();
        self.stats.current_nonce = self.search.next_nonce();
        self.stats.elapsed_ms = elapsed_ms;
        self.stats.update_hash_rate();

        let info = match found {
            Some(nonce) => {
                let result = MiningResult {
                    nonce,
                    elapsed_millis: elapsed_ms,
                };
                self.result = Some(result);
                self.stats.winning_nonce = Some(nonce);
                self.is_mining = false;
                console_log(&result.to_string());
                BatchInfo::finished(&result, hashes_computed)
            }
            None => BatchInfo::pending(elapsed_ms, hashes_computed),
        };

        to_js(&info)
    }

    /// Start mining.
    #[wasm_bindgen]
    pub fn start_mining(&mut self) {
        self.is_mining = true;
        self.start_time = JsClock.now_millis();
    }

    /// Stop mining. Later batches are refused.
    #[wasm_bindgen]
    pub fn stop_mining(&mut self) {
        self.is_mining = false;
    }

    /// Check if mining is active.
    #[wasm_bindgen(getter)]
    pub fn is_mining(&self) -> bool {
        self.is_mining
    }

    /// Get current mining statistics.
    #[wasm_bindgen]
    pub fn get_stats(&self) -> Result<JsValue, JsValue> {
        to_js(&self.stats)
    }

    /// Get the formatted hash rate.
    #[wasm_bindgen]
    pub fn get_hash_rate_display(&self) -> String {
        self.stats.format_hash_rate()
    }

    /// Status line for the finished run, if any.
    #[wasm_bindgen]
    pub fn status(&self) -> Option<String> {
        self.result.map(|r| r.to_string())
    }

    /// Reset the miner to nonce 0 for the same message and difficulty.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        *self = Miner::from_request(self.request.clone());
    }

    /// The message being mined.
    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.request.message.clone()
    }

    /// The target prefix every winning digest starts with.
    #[wasm_bindgen(getter)]
    pub fn target(&self) -> String {
        self.request.difficulty.target_prefix()
    }
}

impl Miner {
    fn from_request(request: MiningRequest) -> Miner {
        let difficulty = request.difficulty;
        let expected = difficulty.expected_attempts();
        let stats = MiningStats {
            difficulty: difficulty.zeros(),
            expected_display: powtoy_core::difficulty::format_attempts(expected),
            ..MiningStats::new()
        };
        Miner {
            search: MiningSearch::new(&request),
            request,
            stats,
            start_time: 0,
            is_mining: false,
            result: None,
        }
    }

    fn elapsed_ms(&self) -> Result<u64, MineError> {
        let elapsed = JsClock.now_millis().saturating_sub(self.start_time);
        u64::try_from(elapsed).map_err(|_| MineError::ElapsedOverflow)
    }
}

/// Log to the browser console.
#[wasm_bindgen]
pub fn console_log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}
