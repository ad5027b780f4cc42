//! Account number generation and Luhn validation.

use rand::Rng;
use thiserror::Error;
use tracing::{debug, error};

use crate::model::AccountNumber;

/// Shortest account number that can carry a payload digit and a check digit.
pub const MIN_LENGTH: usize = 2;

/// Default length of generated account numbers.
pub const DEFAULT_LENGTH: usize = 9;

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid argument: account length must be at least {MIN_LENGTH}, got {0}")]
    InvalidLength(usize),

    #[error("generated account number {0} failed checksum validation")]
    ChecksumDrift(String),
}

/// Character set used when generating account numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alphabet {
    /// Decimal digits with a trailing Luhn check digit.
    #[default]
    Numeric,
    /// Upper-case letters and digits. Carries no check digit and is never validated.
    Alphanumeric,
}

/// Generate an account number using the thread-local rng.
pub fn generate(length: usize, alphabet: Alphabet) -> Result<AccountNumber, CodecError> {
    generate_with(&mut rand::thread_rng(), length, alphabet)
}

/// Generate an account number drawing randomness from `rng`.
pub fn generate_with<R: Rng + ?Sized>(
    rng: &mut R,
    length: usize,
    alphabet: Alphabet,
) -> Result<AccountNumber, CodecError> {
    if length < MIN_LENGTH {
        return Err(CodecError::InvalidLength(length));
    }

    let value = match alphabet {
        Alphabet::Numeric => {
            let mut digits: Vec<u8> = (0..length - 1).map(|_| rng.gen_range(0..10)).collect();
            digits.push(check_digit(&digits));
            let value: String = digits.iter().map(|d| char::from(b'0' + d)).collect();

            // the check digit is computed, so this only trips if the two sides disagree
            if !is_valid(&value) {
                error!(account = %value, "generated account number failed validation");
                return Err(CodecError::ChecksumDrift(value));
            }
            value
        }
        Alphabet::Alphanumeric => (0..length)
            .map(|_| char::from(ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())]))
            .collect(),
    };

    debug!(length, ?alphabet, "generated account number");
    Ok(AccountNumber::new_unchecked(value))
}

/// Luhn check: doubling every second digit from the right must sum to 0 mod 10.
///
/// Anything shorter than [`MIN_LENGTH`] or containing a non-digit is invalid.
pub fn is_valid(account: &str) -> bool {
    if account.len() < MIN_LENGTH || !account.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let digits = account.bytes().rev().map(|b| b - b'0');
    luhn_sum(digits, false) % 10 == 0
}

/// Check digit that makes `payload` followed by it pass [`is_valid`].
fn check_digit(payload: &[u8]) -> u8 {
    // the check digit will sit in the undoubled rightmost slot, so the payload's
    // own rightmost digit is the first one doubled
    let sum = luhn_sum(payload.iter().rev().copied(), true);
    ((10 - sum % 10) % 10) as u8
}

/// Sum digits given from least to most significant, doubling alternate positions.
fn luhn_sum(digits: impl Iterator<Item = u8>, double_first: bool) -> u32 {
    digits
        .enumerate()
        .map(|(idx, d)| {
            let d = u32::from(d);
            if (idx % 2 == 0) == double_first {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum()
}

/// Source of fresh account numbers for the allocator.
pub trait AccountSource: Send + Sync {
    fn next_account(&self) -> Result<AccountNumber, CodecError>;
}

/// [`AccountSource`] backed by [`generate`].
#[derive(Debug, Clone, Copy)]
pub struct RandomAccounts {
    pub length: usize,
    pub alphabet: Alphabet,
}

impl Default for RandomAccounts {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            alphabet: Alphabet::Numeric,
        }
    }
}

impl AccountSource for RandomAccounts {
    fn next_account(&self) -> Result<AccountNumber, CodecError> {
        generate(self.length, self.alphabet)
    }
}
