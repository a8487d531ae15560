//! Serializable view state handed back to JavaScript.

use powtoy_core::MiningResult;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Convert any serializable value to a JS value.
pub fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {:?}", e)))
}

/// Mining statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningStats {
    /// Total hashes computed.
    pub total_hashes: u64,
    /// Current hash rate (hashes per second).
    pub hash_rate: f64,
    /// Next nonce to try.
    pub current_nonce: u64,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Required leading zeros.
    pub difficulty: u32,
    /// Average hashes needed at this difficulty, formatted.
    pub expected_display: String,
    /// Winning nonce, once found.
    pub winning_nonce: Option<u64>,
}

impl MiningStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update hash rate based on elapsed time.
    pub fn update_hash_rate(&mut self) {
        if self.elapsed_ms > 0 {
            self.hash_rate = (self.total_hashes as f64) / (self.elapsed_ms as f64 / 1000.0);
        }
    }

    /// Format hash rate for display.
    pub fn format_hash_rate(&self) -> String {
        if self.hash_rate >= 1_000_000_000.0 {
            format!("{:.2} GH/s", self.hash_rate / 1_000_000_000.0)
        } else if self.hash_rate >= 1_000_000.0 {
            format!("{:.2} MH/s", self.hash_rate / 1_000_000.0)
        } else if self.hash_rate >= 1_000.0 {
            format!("{:.2} KH/s", self.hash_rate / 1_000.0)
        } else {
            format!("{:.2} H/s", self.hash_rate)
        }
    }
}

/// Result of one `mine_batch` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInfo {
    /// Whether the difficulty was met.
    pub found: bool,
    /// The winning nonce (if found).
    pub nonce: Option<u64>,
    /// Elapsed time since mining started, in milliseconds.
    pub elapsed_ms: u64,
    /// Hashes computed in this batch.
    pub hashes_computed: u64,
    /// Status line for display (set once found).
    pub message: Option<String>,
}

impl BatchInfo {
    pub fn finished(result: &MiningResult, hashes_computed: u64) -> Self {
        BatchInfo {
            found: true,
            nonce: Some(result.nonce),
            elapsed_ms: result.elapsed_millis,
            hashes_computed,
            message: Some(result.to_string()),
        }
    }

    pub fn pending(elapsed_ms: u64, hashes_computed: u64) -> Self {
        BatchInfo {
            elapsed_ms,
            hashes_computed,
            ..BatchInfo::default()
        }
    }
}

/// Outcome of a blocking `mine` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MineOutcome {
    pub nonce: u64,
    pub elapsed_millis: u64,
    pub message: String,
}

impl From<MiningResult> for MineOutcome {
    fn from(result: MiningResult) -> Self {
        MineOutcome {
            nonce: result.nonce,
            elapsed_millis: result.elapsed_millis,
            message: result.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_rate() {
        let mut stats = MiningStats::new();
        stats.total_hashes = 5_000;
        stats.elapsed_ms = 2_000;
        stats.update_hash_rate();
        assert_eq!(stats.hash_rate, 2_500.0);
        assert_eq!(stats.format_hash_rate(), "2.50 KH/s");
    }

    #[test]
    fn test_hash_rate_without_elapsed_time() {
        let mut stats = MiningStats::new();
        stats.total_hashes = 10;
        stats.update_hash_rate();
        assert_eq!(stats.format_hash_rate(), "0.00 H/s");
    }

    #[test]
    fn test_batch_info() {
        let result = MiningResult {
            nonce: 481,
            elapsed_millis: 12,
        };
        let info = BatchInfo::finished(&result, 100);
        assert!(info.found);
        assert_eq!(info.message.as_deref(), Some("Finished! nonce = 481 (12 ms)"));

        let pending = BatchInfo::pending(5, 64);
        assert!(!pending.found);
        assert_eq!(pending.nonce, None);
    }

    #[test]
    fn test_outcome_from_result() {
        let outcome = MineOutcome::from(MiningResult {
            nonce: 0,
            elapsed_millis: 0,
        });
        assert_eq!(outcome.message, "Finished! nonce = 0 (0 ms)");
    }

    #[test]
    fn test_js_objects_use_camel_case_keys() {
        let stats = serde_json::to_value(MiningStats::new()).unwrap();
        for key in [
            "totalHashes",
            "hashRate",
            "currentNonce",
            "elapsedMs",
            "expectedDisplay",
            "winningNonce",
        ] {
            assert!(stats.get(key).is_some(), "missing {}", key);
        }

        let batch = serde_json::to_value(BatchInfo::pending(5, 64)).unwrap();
        assert_eq!(batch["elapsedMs"], 5);
        assert_eq!(batch["hashesComputed"], 64);

        let outcome = serde_json::to_value(MineOutcome::from(MiningResult {
            nonce: 1,
            elapsed_millis: 2,
        }))
        .unwrap();
        assert_eq!(outcome["elapsedMillis"], 2);
    }
}
