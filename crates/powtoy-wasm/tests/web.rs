//! Browser-side checks of the JS boundary. Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use powtoy_wasm::api::{compute_block_hash, compute_block_hash_from_fields, hash_text, mine};
use powtoy_wasm::Miner;
use serde::Deserialize;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[derive(Deserialize)]
struct TextHash {
    hex: String,
    base64: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Outcome {
    nonce: u64,
}

#[derive(Deserialize)]
struct Batch {
    found: bool,
    nonce: Option<u64>,
}

#[wasm_bindgen_test]
fn hash_text_empty() {
    let hashed: TextHash = serde_wasm_bindgen::from_value(hash_text("").unwrap()).unwrap();
    assert_eq!(
        hashed.hex,
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(hashed.base64, "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=");
}

#[wasm_bindgen_test]
fn block_hash_from_tuples() {
    let txs = serde_wasm_bindgen::to_value(&vec![("alice", "bob", 10.0)]).unwrap();
    assert_eq!(
        compute_block_hash("abc", txs, 0.0).unwrap(),
        "e9LpGVen4DRKB7iX33eyVdBmKD8KAQxX9Kn+aailkXc="
    );
}

#[wasm_bindgen_test]
fn block_hash_from_fields() {
    let rows = serde_wasm_bindgen::to_value(&vec![("alice", "bob", "10")]).unwrap();
    assert_eq!(
        compute_block_hash_from_fields("abc", rows, "").unwrap(),
        "e9LpGVen4DRKB7iX33eyVdBmKD8KAQxX9Kn+aailkXc="
    );
}

#[wasm_bindgen_test]
fn block_hash_missing_amount_is_zero() {
    let short = serde_wasm_bindgen::to_value(&vec![("a", "b")]).unwrap();
    let zero = serde_wasm_bindgen::to_value(&vec![("a", "b", 0.0)]).unwrap();
    assert_eq!(
        compute_block_hash("p", short, 0.0).unwrap(),
        compute_block_hash("p", zero, 0.0).unwrap()
    );
}

#[wasm_bindgen_test]
fn block_hash_rejects_bad_shape() {
    assert!(compute_block_hash("abc", JsValue::from_str("nope"), 0.0).is_err());
}

#[wasm_bindgen_test]
fn blocking_mine() {
    let outcome: Outcome = serde_wasm_bindgen::from_value(mine("hello", 1).unwrap()).unwrap();
    assert_eq!(outcome.nonce, 21);

    let outcome: Outcome = serde_wasm_bindgen::from_value(mine("hello", -4).unwrap()).unwrap();
    assert_eq!(outcome.nonce, 0);
}

#[wasm_bindgen_test]
fn batched_miner() {
    let mut miner = Miner::new("hello", 2).unwrap();
    assert!(miner.mine_batch(100).is_err(), "batches before start are refused");

    miner.start_mining();
    let mut winner = None;
    for _ in 0..10 {
        let batch: Batch = serde_wasm_bindgen::from_value(miner.mine_batch(100).unwrap()).unwrap();
        if batch.found {
            winner = batch.nonce;
            break;
        }
    }
    assert_eq!(winner, Some(481));
    assert!(!miner.is_mining());
    let status = miner.status().unwrap_or_default();
    assert!(status.starts_with("Finished! nonce = 481"), "{}", status);
}
