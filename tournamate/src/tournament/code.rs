//! Registration code allocation.
//!
//! Codes look like `GOLF-4821QK`: a prefix of up to four letters taken from
//! the tournament's game, four digits and two letters. When every candidate is
//! taken the allocator hands out a time-based `TOUR-XXXXXXXX` code instead.

use chrono::Utc;
use rand::Rng;
use std::time::Duration;

use crate::db::{StoreResult, TournamentRepository};

/// Prefix used when the seed yields no letters
pub const DEFAULT_PREFIX: &str = "TOUR";

/// Default number of candidates tried before falling back
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

const PREFIX_LEN: usize = 4;
const SUFFIX_LETTERS: usize = 2;
const FALLBACK_MODULUS: i64 = 100_000_000;

/// Retry bounds shared by the allocator and the creation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Candidates tried before the fallback code is used
    pub max_attempts: u32,
    /// Linear backoff step between attempts; zero disables sleeping
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::ZERO,
        }
    }
}

/// Derive the code prefix from a seed such as the game name.
///
/// Takes the first four characters, upper-cases them and keeps only `A-Z`.
pub fn derive_prefix(seed: &str) -> String {
    let head: String = seed.chars().take(PREFIX_LEN).collect();
    let prefix: String = head
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase())
        .take(PREFIX_LEN)
        .collect();

    if prefix.is_empty() {
        DEFAULT_PREFIX.to_string()
    } else {
        prefix
    }
}

/// Build one random candidate for `prefix`
pub fn generate_candidate<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
    let number: u16 = rng.random_range(1000..=9999);
    let letters: String = (0..SUFFIX_LETTERS)
        .map(|_| char::from(rng.random_range(b'A'..=b'Z')))
        .collect();
    format!("{prefix}-{number}{letters}")
}

/// Time-based code used once random candidates are exhausted
pub fn fallback_code(now_ms: i64) -> String {
    format!("{DEFAULT_PREFIX}-{:08}", now_ms.rem_euclid(FALLBACK_MODULUS))
}

/// Canonical form of a user-supplied code
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Whether `code` has the shape of a generated or fallback code
pub fn is_well_formed_code(code: &str) -> bool {
    let Some((prefix, rest)) = code.split_once('-') else {
        return false;
    };
    if prefix.is_empty()
        || prefix.len() > PREFIX_LEN
        || !prefix.bytes().all(|b| b.is_ascii_uppercase())
    {
        return false;
    }

    let bytes = rest.as_bytes();
    let generated = bytes.len() == 6
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4..].iter().all(u8::is_ascii_uppercase);
    let fallback =
        prefix == DEFAULT_PREFIX && bytes.len() == 8 && bytes.iter().all(u8::is_ascii_digit);

    generated || fallback
}

/// Allocates registration codes that are free in a registry
#[derive(Debug, Clone, Default)]
pub struct CodeAllocator {
    policy: RetryPolicy,
}

impl CodeAllocator {
    /// Create an allocator with the given retry policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Retry policy in use
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Allocate a code that is not in `registry` at the time of the check.
    ///
    /// Collisions are retried up to `max_attempts` times, after which the
    /// fallback code is returned unchecked. Only storage failures are errors.
    pub async fn allocate(
        &self,
        registry: &dyn TournamentRepository,
        seed: &str,
    ) -> StoreResult<String> {
        let prefix = derive_prefix(seed);

        for attempt in 1..=self.policy.max_attempts {
            let candidate = generate_candidate(&prefix, &mut rand::rng());
            if !registry.code_exists(&candidate).await? {
                return Ok(candidate);
            }

            log::debug!(
                "Registration code {} taken (attempt {}/{})",
                candidate,
                attempt,
                self.policy.max_attempts
            );

            let delay = self.policy.delay_for(attempt);
            if !delay.is_zero() && attempt < self.policy.max_attempts {
                tokio::time::sleep(delay).await;
            }
        }

        let code = fallback_code(Utc::now().timestamp_millis());
        log::warn!(
            "No free code for prefix {} after {} attempts, using fallback {}",
            prefix,
            self.policy.max_attempts,
            code
        );
        Ok(code)
    }
}
