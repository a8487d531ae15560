//! Canonical text encoding of block candidates.
//!
//! The encoding is fixed to
//!
//! ```text
//! {"prevBlock":"<previous hash>","txs":[[<from>,<to>,<amount>],...],"nonce":<nonce>}
//! ```
//!
//! Transactions are always written as positional arrays. Keyed objects are
//! never used for the hashed form, so two equal transactions produce the same
//! bytes no matter how the caller built them. Amounts are written the way
//! JavaScript prints numbers (`0.000001`, `10000000000000000`, `1e+21`).

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Write as _};

use serde::de::{SeqAccess, Visitor};
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Deserializer, Serialize};

/// Upper bound for [`BlockCandidate::with_transaction_count`].
pub const MAX_TRANSACTIONS: usize = 10_000;

/// A transaction amount.
///
/// `Display` prints the ECMAScript `Number.prototype.toString` form, which is
/// also the token used in the canonical encoding.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(from = "f64")]
pub struct Amount(f64);

impl Amount {
    pub const ZERO: Amount = Amount(0.0);

    /// Non-finite values collapse to zero, and so does `-0`.
    pub fn new(value: f64) -> Self {
        if value.is_finite() && value != 0.0 {
            Amount(value)
        } else {
            Amount::ZERO
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount::new(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::new(value as f64)
    }
}

impl From<i32> for Amount {
    fn from(value: i32) -> Self {
        Amount::new(f64::from(value))
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Amount::new(f64::from(value))
    }
}

// Plain number for interop; the canonical form goes through `Display`.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = ryu_js::Buffer::new();
        f.write_str(buffer.format(self.0))
    }
}

/// A transfer of `amount` from `from` to `to`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    pub amount: Amount,
}

impl Transaction {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> Self {
        Transaction {
            from: from.into(),
            to: to.into(),
            amount: amount.into(),
        }
    }
}

// Positional: [from, to, amount].
impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.from)?;
        tuple.serialize_element(&self.to)?;
        tuple.serialize_element(&self.amount)?;
        tuple.end()
    }
}

struct TransactionVisitor;

impl<'de> Visitor<'de> for TransactionVisitor {
    type Value = Transaction;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array [from, to, amount]")
    }

    // Missing or null fields read as "" and 0.
    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Transaction, A::Error> {
        let from = seq.next_element::<Option<String>>()?.flatten().unwrap_or_default();
        let to = seq.next_element::<Option<String>>()?.flatten().unwrap_or_default();
        let amount = seq.next_element::<Option<f64>>()?.flatten().unwrap_or(0.0);
        Ok(Transaction::new(from, to, amount))
    }
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(TransactionVisitor)
    }
}

/// Returned when a nonce cannot be incremented any further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("nonce overflow: {0} is the largest representable nonce")]
pub struct NonceOverflow(pub u64);

/// Returned when more transaction rows are requested than a block may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{requested} transactions requested, at most {max} are allowed")]
pub struct TooManyTransactions {
    pub requested: usize,
    pub max: usize,
}

/// The block-like structure whose hash is displayed.
///
/// Built fresh from the current inputs for every hash computation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockCandidate {
    pub previous_block_hash: String,
    pub transactions: Vec<Transaction>,
    pub nonce: u64,
}

impl BlockCandidate {
    pub fn new(
        previous_block_hash: impl Into<String>,
        transactions: Vec<Transaction>,
        nonce: u64,
    ) -> Self {
        BlockCandidate {
            previous_block_hash: previous_block_hash.into(),
            transactions,
            nonce,
        }
    }

    /// Replace the transaction list with `count` empty transactions.
    ///
    /// Changing the transaction count resets every row to `("", "", 0)`.
    /// At most [`MAX_TRANSACTIONS`] rows are allowed.
    pub fn with_transaction_count(mut self, count: usize) -> Result<Self, TooManyTransactions> {
        if count > MAX_TRANSACTIONS {
            return Err(TooManyTransactions {
                requested: count,
                max: MAX_TRANSACTIONS,
            });
        }
        self.transactions = alloc::vec![Transaction::default(); count];
        Ok(self)
    }

    /// The same candidate with the nonce bumped by one.
    pub fn next_nonce(&self) -> Result<Self, NonceOverflow> {
        let nonce = self.nonce.checked_add(1).ok_or(NonceOverflow(self.nonce))?;
        Ok(BlockCandidate {
            nonce,
            ..self.clone()
        })
    }
}

/// Append `s` as a JSON string literal.
fn push_json_string(out: &mut String, s: &str) {
    // Serializing a str cannot fail.
    out.push_str(&serde_json::to_string(s).unwrap_or_default());
}

/// Encode a candidate into its canonical text form.
pub fn encode_block(candidate: &BlockCandidate) -> String {
    let mut out = String::with_capacity(48 + candidate.transactions.len() * 24);
    out.push_str("{\"prevBlock\":");
    push_json_string(&mut out, &candidate.previous_block_hash);
    out.push_str(",\"txs\":[");
    for (i, tx) in candidate.transactions.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('[');
        push_json_string(&mut out, &tx.from);
        out.push(',');
        push_json_string(&mut out, &tx.to);
        // Writing into a String never fails.
        let _ = write!(out, ",{}]", tx.amount);
    }
    let _ = write!(out, "],\"nonce\":{}}}", candidate.nonce);
    out
}
