//! Difficulty as a count of leading `'0'` characters in the Base64 digest.
//!
//! This is a character-prefix match on the Base64 text, not a count of
//! leading zero bits in the raw digest. Each required character multiplies
//! the expected work by 64.

use alloc::string::String;
use core::fmt;

use serde::{Deserialize, Serialize};

/// A 32-byte digest has 43 significant Base64 characters; the 44th is always `=`.
pub const MAX_DIFFICULTY: u32 = 43;

/// Difficulty that can never be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DifficultyError {
    #[error("difficulty {requested} is unreachable (maximum is {max})")]
    Unreachable { requested: u32, max: u32 },
}

/// Number of leading `'0'` characters a Base64 digest must start with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Difficulty(u32);

impl Difficulty {
    pub const ZERO: Difficulty = Difficulty(0);

    pub fn new(zeros: u32) -> Result<Self, DifficultyError> {
        if zeros > MAX_DIFFICULTY {
            return Err(DifficultyError::Unreachable {
                requested: zeros,
                max: MAX_DIFFICULTY,
            });
        }
        Ok(Difficulty(zeros))
    }

    /// Negative values mean "no work required".
    pub fn coerce(value: i64) -> Result<Self, DifficultyError> {
        if value <= 0 {
            return Ok(Difficulty::ZERO);
        }
        let zeros = u32::try_from(value).unwrap_or(u32::MAX);
        Difficulty::new(zeros)
    }

    pub fn zeros(&self) -> u32 {
        self.0
    }

    /// The string every winning digest must start with.
    pub fn target_prefix(&self) -> String {
        "0".repeat(self.0 as usize)
    }

    /// Check whether a Base64 digest starts with enough zeros.
    ///
    /// Zero difficulty is met by every digest.
    #[inline]
    pub fn is_met_by(&self, base64: &str) -> bool {
        let n = self.0 as usize;
        base64.len() >= n && base64.as_bytes()[..n].iter().all(|&c| c == b'0')
    }

    /// Average number of hashes needed to meet this difficulty.
    pub fn expected_attempts(&self) -> f64 {
        let mut attempts = 1.0f64;
        for _ in 0..self.0 {
            attempts *= 64.0;
        }
        attempts
    }
}

impl TryFrom<u32> for Difficulty {
    type Error = DifficultyError;

    fn try_from(zeros: u32) -> Result<Self, Self::Error> {
        Difficulty::new(zeros)
    }
}

impl From<Difficulty> for u32 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.0
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Format an attempt count for display (e.g., "16.78M").
pub fn format_attempts(attempts: f64) -> String {
    if attempts >= 1e15 {
        alloc::format!("{:.2}P", attempts / 1e15)
    } else if attempts >= 1e12 {
        alloc::format!("{:.2}T", attempts / 1e12)
    } else if attempts >= 1e9 {
        alloc::format!("{:.2}G", attempts / 1e9)
    } else if attempts >= 1e6 {
        alloc::format!("{:.2}M", attempts / 1e6)
    } else if attempts >= 1e3 {
        alloc::format!("{:.2}K", attempts / 1e3)
    } else {
        alloc::format!("{:.0}", attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_difficulty_matches_everything() {
        let d = Difficulty::ZERO;
        assert!(d.is_met_by("47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="));
        assert!(d.is_met_by(""));
        assert_eq!(d.target_prefix(), "");
    }

    #[test]
    fn test_prefix_match() {
        let d = Difficulty::new(2).unwrap();
        assert_eq!(d.target_prefix(), "00");
        assert!(d.is_met_by("00R/psacdJPs3/xYaUPxpxjakxJ8aLulR6ox9mopLgw="));
        assert!(!d.is_met_by("0N5qP42kWAme989MH4jfBcjYZ43ThiX94eknE70WadI="));
        assert!(!d.is_met_by("0"));
    }

    #[test]
    fn test_difficulty_bounds() {
        assert!(Difficulty::new(MAX_DIFFICULTY).is_ok());
        assert_eq!(
            Difficulty::new(44),
            Err(DifficultyError::Unreachable {
                requested: 44,
                max: 43,
            })
        );
    }

    #[test]
    fn test_coerce() {
        assert_eq!(Difficulty::coerce(-5), Ok(Difficulty::ZERO));
        assert_eq!(Difficulty::coerce(0), Ok(Difficulty::ZERO));
        assert_eq!(Difficulty::coerce(3).unwrap().zeros(), 3);
        assert!(Difficulty::coerce(i64::MAX).is_err());
    }

    #[test]
    fn test_expected_attempts() {
        assert_eq!(Difficulty::ZERO.expected_attempts(), 1.0);
        assert_eq!(Difficulty::new(1).unwrap().expected_attempts(), 64.0);
        assert_eq!(Difficulty::new(4).unwrap().expected_attempts(), 16_777_216.0);
        assert_eq!(format_attempts(16_777_216.0), "16.78M");
        assert_eq!(format_attempts(64.0), "64");
    }

    #[test]
    fn test_serde_rejects_unreachable() {
        let ok: Difficulty = serde_json::from_str("3").unwrap();
        assert_eq!(ok.zeros(), 3);
        assert!(serde_json::from_str::<Difficulty>("50").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "3");
    }
}
