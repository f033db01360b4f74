//! SHA-256 hash engine — the sole entropy source of the sampler.
//!
//! RULE: Nothing in the sampler may call any platform RNG.
//! Every pseudorandom digit is derived from SHA-256 over the stable
//! string form of (seed, id, previous ticket number). This means:
//!   - The same inputs give the same digits on every machine, forever.
//!   - An id's ticket trajectory never depends on any other id.

use sha2::{Digest, Sha256};

/// Raw SHA-256 output.
pub type DigestBytes = [u8; 32];

/// SHA-256 of `input`.
pub fn digest(input: &[u8]) -> DigestBytes {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hasher.finalize().into()
}

/// SHA-256 of the UTF-8 bytes of `input`, as 64 lowercase hex characters.
pub fn hex_digest(input: &str) -> String {
    hex::encode(digest(input.as_bytes()))
}

/// Hex digest of a seed, computed once per invocation and shared by every id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedHash(String);

impl SeedHash {
    pub fn new(seed: &impl std::fmt::Display) -> Self {
        Self(hex_digest(&seed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// SHA-256 in counter mode: yields `digest(key ++ ":" ++ n)` for n = 1, 2, 3, ...
///
/// Unbounded. Callers stop pulling once they have enough digits.
#[derive(Debug, Clone)]
pub struct CounterStream {
    key: String,
    counter: u64,
}

impl CounterStream {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), counter: 0 }
    }

    /// Counter value used for the most recent block (0 before the first pull).
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// The exact string hashed for block `n`.
    pub fn block_input(&self, n: u64) -> String {
        format!("{}:{n}", self.key)
    }

    /// Advance the counter and hash the new block.
    pub fn next_block(&mut self) -> DigestBytes {
        self.counter += 1;
        digest(self.block_input(self.counter).as_bytes())
    }
}

impl Iterator for CounterStream {
    type Item = DigestBytes;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_block())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
