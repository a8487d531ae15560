//! Block hashing: canonical encoding piped into SHA256.

use alloc::string::String;
use alloc::vec::Vec;

use crate::encoding::{encode_block, BlockCandidate, Transaction};
use crate::hash::sha256;

/// Base64 SHA256 digest of the candidate's canonical encoding.
///
/// Pure and cheap; callers recompute it on every edit of the previous hash,
/// the transactions or the nonce.
pub fn compute_block_hash(candidate: &BlockCandidate) -> String {
    sha256(encode_block(candidate).as_bytes()).to_base64()
}

/// Hash a block given its parts.
pub fn block_hash(previous_block_hash: &str, transactions: &[Transaction], nonce: u64) -> String {
    let candidate = BlockCandidate {
        previous_block_hash: String::from(previous_block_hash),
        transactions: Vec::from(transactions),
        nonce,
    };
    compute_block_hash(&candidate)
}
