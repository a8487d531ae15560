//! powtoy CLI
//!
//! Command-line front end for the hashing and proof-of-work playground.
//!
//! # Commands
//!
//! - `hash` - SHA256 of a text, in hex and Base64
//! - `block` - Canonical encoding and hash of a block candidate
//! - `mine` - Search for a nonce meeting a difficulty (background thread, optional timeout)

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, Level};

use powtoy_core::{
    compute_block_hash, encode_block, hash_text, input, BlockCandidate, MineError, MinerConfig,
    MiningRequest, MiningWorker, TooManyTransactions, Transaction,
};

#[derive(Parser)]
#[command(name = "powtoy")]
#[command(version)]
#[command(about = "Play with SHA256 hashing and proof-of-work mining")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

impl Cli {
    fn get_log_level(&self) -> Level {
        match self.log_level.to_ascii_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a text
    Hash {
        /// The text to hash (may be empty)
        #[arg(default_value = "")]
        text: String,
    },

    /// Hash a block candidate
    Block {
        /// Previous block hash
        #[arg(long, default_value = "")]
        prev: String,

        /// Transaction as "from,to,amount" (repeatable, order matters)
        #[arg(long = "tx")]
        txs: Vec<String>,

        /// Number of empty transactions to use when no --tx is given
        #[arg(long, default_value = "0")]
        num_txs: String,

        /// Nonce (unparsable values count as 0)
        #[arg(long, default_value = "0")]
        nonce: String,
    },

    /// Find a nonce whose Base64 digest starts with enough zeros
    Mine {
        /// The message to mine
        #[arg(default_value = "")]
        text: String,

        /// Required leading '0' characters (unparsable values count as 0)
        #[arg(short, long, default_value = "0")]
        difficulty: String,

        /// Nonces tried between cancellation checks
        #[arg(long)]
        batch_size: Option<u64>,

        /// Give up after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.get_log_level())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Hash { text } => cmd_hash(text, cli.json),
        Commands::Block {
            prev,
            txs,
            num_txs,
            nonce,
        } => cmd_block(prev, txs, num_txs, nonce, cli.json),
        Commands::Mine {
            text,
            difficulty,
            batch_size,
            timeout_ms,
        } => cmd_mine(text, difficulty, *batch_size, *timeout_ms, cli.json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_hash(text: &str, json: bool) -> anyhow::Result<()> {
    let hashed = hash_text(text);
    if json {
        println!("{}", serde_json::to_string_pretty(&hashed)?);
    } else {
        println!("Base 16: {}", hashed.hex);
        println!("Base 64: {}", hashed.base64);
    }
    Ok(())
}

/// Split a "from,to,amount" argument into a transaction. Missing fields are empty.
fn parse_tx_arg(raw: &str) -> Transaction {
    let mut fields = raw.splitn(3, ',');
    let from = fields.next().unwrap_or("");
    let to = fields.next().unwrap_or("");
    let amount = fields.next().unwrap_or("");
    Transaction::from_fields(from, to, amount)
}

fn build_candidate(
    prev: &str,
    txs: &[String],
    num_txs: &str,
    nonce: &str,
) -> Result<BlockCandidate, TooManyTransactions> {
    let candidate = BlockCandidate::new(prev, Vec::new(), input::parse_nonce(nonce));
    if txs.is_empty() {
        candidate.with_transaction_count(input::parse_count(num_txs))
    } else {
        Ok(BlockCandidate {
            transactions: txs.iter().map(|t| parse_tx_arg(t)).collect(),
            ..candidate
        })
    }
}

fn cmd_block(
    prev: &str,
    txs: &[String],
    num_txs: &str,
    nonce: &str,
    json: bool,
) -> anyhow::Result<()> {
    let candidate = build_candidate(prev, txs, num_txs, nonce)?;
    let encoded = encode_block(&candidate);
    let hash = compute_block_hash(&candidate);

    if json {
        let out = serde_json::json!({ "encoded": encoded, "hash": hash });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Encoded:    {}", encoded);
        println!("Block Hash: {}", hash);
    }
    Ok(())
}

fn cmd_mine(
    text: &str,
    difficulty: &str,
    batch_size: Option<u64>,
    timeout_ms: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let difficulty = input::parse_difficulty(difficulty)?;
    let mut config = MinerConfig::default();
    if let Some(size) = batch_size {
        config.batch_size = size;
    }

    info!(
        difficulty = difficulty.zeros(),
        target = %difficulty.target_prefix(),
        expected = %powtoy_core::difficulty::format_attempts(difficulty.expected_attempts()),
        "mining"
    );

    let handle = MiningWorker::spawn(MiningRequest::new(text, difficulty), config);
    let deadline = timeout_ms.map(Duration::from_millis);

    let result = match deadline {
        Some(timeout) => handle.join_timeout(timeout),
        None => {
            while !handle.is_finished() {
                std::thread::sleep(Duration::from_millis(250));
                if let Some(p) = handle.try_progress() {
                    info!(nonce = p.nonce, elapsed_ms = p.elapsed_millis, "still mining");
                }
            }
            handle.join()
        }
    };

    let result = match result {
        Ok(result) => result,
        Err(MineError::Cancelled) => {
            anyhow::bail!("no nonce found within {} ms", timeout_ms.unwrap_or_default())
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tx_arg() {
        assert_eq!(parse_tx_arg("alice,bob,10"), Transaction::new("alice", "bob", 10));
        assert_eq!(parse_tx_arg("alice"), Transaction::new("alice", "", 0));
        assert_eq!(parse_tx_arg("a,b,not a number"), Transaction::new("a", "b", 0));
    }

    #[test]
    fn test_build_candidate_rows() {
        let candidate = build_candidate("abc", &["alice,bob,10".to_string()], "5", "0").unwrap();
        assert_eq!(candidate.transactions.len(), 1);
        assert_eq!(
            compute_block_hash(&candidate),
            "e9LpGVen4DRKB7iX33eyVdBmKD8KAQxX9Kn+aailkXc="
        );
    }

    #[test]
    fn test_build_candidate_default_rows() {
        let candidate = build_candidate("", &[], "2", "x").unwrap();
        assert_eq!(candidate.nonce, 0);
        assert_eq!(candidate.transactions, vec![Transaction::default(); 2]);
    }

    #[test]
    fn test_build_candidate_rejects_huge_row_count() {
        let err = build_candidate("", &[], "99999999999999999999", "0").unwrap_err();
        assert_eq!(err.max, powtoy_core::MAX_TRANSACTIONS);

        let err = cmd_block("", &[], "99999999999999999999", "0", false).unwrap_err();
        assert!(err.to_string().contains("transactions"));
    }

    #[test]
    fn test_cli_parses() {
        let args = ["powtoy", "--log-level", "debug", "mine", "hello", "-d", "2"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.get_log_level(), Level::DEBUG);
        match cli.command {
            Commands::Mine {
                text, difficulty, ..
            } => {
                assert_eq!(text, "hello");
                assert_eq!(difficulty, "2");
            }
            _ => panic!("expected mine"),
        }
    }
}
