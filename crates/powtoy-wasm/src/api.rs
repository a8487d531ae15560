//! Stateless functions called by the page on every input change.

use powtoy_core::{input, BlockCandidate, Difficulty, MiningRequest, Transaction};
use wasm_bindgen::prelude::*;

use crate::miner::JsClock;
use crate::state::{to_js, MineOutcome};

/// Hash free text. Returns `{ hex, base64 }`.
#[wasm_bindgen(js_name = hashText)]
pub fn hash_text(message: &str) -> Result<JsValue, JsValue> {
    to_js(&powtoy_core::hash_text(message))
}

/// Hash a block given `transactions` as an array of `[from, to, amount]`.
#[wasm_bindgen(js_name = computeBlockHash)]
pub fn compute_block_hash(
    previous_block_hash: &str,
    transactions: JsValue,
    nonce: f64,
) -> Result<String, JsValue> {
    let transactions: Vec<Transaction> = serde_wasm_bindgen::from_value(transactions)
        .map_err(|e| JsValue::from_str(&format!("Invalid transactions: {}", e)))?;

    let candidate = BlockCandidate::new(previous_block_hash, transactions, coerce_nonce(nonce));
    Ok(powtoy_core::compute_block_hash(&candidate))
}

/// Hash a block straight from raw form text.
///
/// `rows` is an array of `[from, to, amount]` strings; unparsable amounts and
/// nonces count as 0.
#[wasm_bindgen(js_name = computeBlockHashFromFields)]
pub fn compute_block_hash_from_fields(
    previous_block_hash: &str,
    rows: JsValue,
    nonce: &str,
) -> Result<String, JsValue> {
    let rows: Vec<(String, String, String)> = serde_wasm_bindgen::from_value(rows)
        .map_err(|e| JsValue::from_str(&format!("Invalid transaction fields: {}", e)))?;

    let transactions = rows
        .iter()
        .map(|(from, to, amount)| Transaction::from_fields(from, to, amount))
        .collect();

    let nonce = input::parse_nonce(nonce);
    let candidate = BlockCandidate::new(previous_block_hash, transactions, nonce);
    Ok(powtoy_core::compute_block_hash(&candidate))
}

/// Mine on the calling thread. Blocks the page until a nonce is found.
///
/// Returns `{ nonce, elapsedMillis, message }`. Prefer [`Miner`](crate::Miner)
/// for anything above a trivial difficulty.
#[wasm_bindgen]
pub fn mine(message: &str, difficulty: i32) -> Result<JsValue, JsValue> {
    let difficulty = Difficulty::coerce(i64::from(difficulty))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let request = MiningRequest::new(message, difficulty);

    let result = powtoy_core::mine_with(
        &request,
        &powtoy_core::MinerConfig::default(),
        &JsClock,
        &powtoy_core::NeverCancel,
        |_| {},
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;

    to_js(&MineOutcome::from(result))
}

/// JS numbers to nonces: NaN and negatives are 0, fractions truncate.
pub(crate) fn coerce_nonce(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        // Saturating float-to-int cast.
        value as u64
    }
}
