//! Pseudorandom fractions in (0, 1) derived from the hash engine.
//!
//! The first fraction of an id is a pure function of (seed, id). Each later
//! fraction is a pure function of the previous one, chosen uniformly from
//! the interval between it and 1.

use crate::config::{FractionConfig, Radix};
use crate::error::{SamplerError, SamplerResult};
use crate::hash::{digest, CounterStream, DigestBytes, SeedHash};
use crate::ticket::{Ticket, TicketNumber};
use crate::types::SampleId;

/// 256-bit digests always render to at least this many decimal digits.
const MIN_DECIMAL_DIGITS: usize = 64;
const LIMB_DIVISOR: u64 = 10_000_000_000_000_000_000;
const DIGITS_PER_LIMB: usize = 19;

#[derive(Debug, Clone, Default)]
pub struct FractionGenerator {
    config: FractionConfig,
}

impl FractionGenerator {
    pub fn new(config: FractionConfig) -> Self {
        Self { config }
    }

    pub fn radix(&self) -> Radix {
        self.config.radix
    }

    /// Hash `input` and read the digest as a fraction.
    pub fn digest_fraction(&self, input: &str) -> TicketNumber {
        TicketNumber::from_canonical(format!("0.{}", self.render(&digest(input.as_bytes()))))
    }

    /// Generation-1 fraction for `id`.
    pub fn first_fraction(&self, id: &impl SampleId, seed_hash: &SeedHash) -> TicketNumber {
        self.digest_fraction(&format!("{}{id}", seed_hash.as_str()))
    }

    /// Uniform successor of `x` in (x, 1).
    ///
    /// The leading run of maximum digits is kept, since any larger number
    /// must share it. Everything after it is replaced by fresh digest digits
    /// until the candidate exceeds `x`; there is no attempt limit.
    ///
    /// Fails if `x` has digits outside this generator's radix, since no
    /// candidate could ever exceed it.
    pub fn next_fraction(&self, x: &TicketNumber) -> SamplerResult<TicketNumber> {
        self.check_radix(x)?;
        Ok(self.successor(x))
    }

    pub fn first_ticket<Id: SampleId>(&self, id: Id, seed_hash: &SeedHash) -> Ticket<Id> {
        let number = self.first_fraction(&id, seed_hash);
        Ticket::new(number, id, 1)
    }

    /// Same id, larger number, generation + 1.
    pub fn next_ticket<Id: SampleId>(&self, ticket: &Ticket<Id>) -> SamplerResult<Ticket<Id>> {
        self.check_radix(&ticket.ticket_number)?;
        Ok(self.replacement(ticket))
    }

    /// [`FractionGenerator::next_ticket`] for tickets this generator made.
    pub(crate) fn replacement<Id: SampleId>(&self, ticket: &Ticket<Id>) -> Ticket<Id> {
        Ticket::new(
            self.successor(&ticket.ticket_number),
            ticket.id.clone(),
            ticket.generation + 1,
        )
    }

    /// Display-only truncation; see [`trim`].
    pub fn trim(&self, x: &TicketNumber, sigfigs: usize) -> String {
        trim(x.as_str(), sigfigs, self.radix())
    }

    /// Requires `x` to be in this generator's radix.
    fn successor(&self, x: &TicketNumber) -> TicketNumber {
        let max_digit = self.radix().max_digit();
        let run = max_digit_run(x.digits(), max_digit);
        let kept = &x.as_str()[..2 + run];

        let mut blocks = CounterStream::new(x.as_str());
        loop {
            let block = blocks.next_block();
            let candidate = TicketNumber::from_canonical(format!("{kept}{}", self.render(&block)));
            if candidate > *x {
                return candidate;
            }
            log::trace!("next_fraction: attempt {} did not exceed {x}, retrying", blocks.counter());
        }
    }

    fn check_radix(&self, x: &TicketNumber) -> SamplerResult<()> {
        if x.in_radix(self.radix()) {
            Ok(())
        } else {
            Err(SamplerError::RadixMismatch { number: x.to_string(), radix: self.radix() })
        }
    }

    fn render(&self, block: &DigestBytes) -> String {
        match self.config.radix {
            Radix::Decimal     => reversed_decimal(block),
            Radix::Hexadecimal => hex::encode(block),
        }
    }
}

/// Keep `0.`, the leading run of maximum digits, and `sigfigs` more characters.
///
/// Truncates, never rounds. The result is lossy and is never compared or
/// stored as a ticket number.
pub fn trim(x: &str, sigfigs: usize, radix: Radix) -> String {
    let digits = x.get(2..).unwrap_or("");
    let end = 2 + max_digit_run(digits, radix.max_digit()) + sigfigs;
    x.chars().take(end).collect()
}

fn max_digit_run(digits: &str, max_digit: u8) -> usize {
    digits.bytes().take_while(|&c| c == max_digit).count()
}

/// Decimal digits of the big-endian 256-bit `block`, least significant first,
/// padded with zeros to at least 64 digits.
///
/// Decimal conversion of a fixed-width binary value biases the high-order
/// digits, so they go last.
fn reversed_decimal(block: &DigestBytes) -> String {
    let mut limbs = [0u64; 4];
    for (limb, chunk) in limbs.iter_mut().zip(block.chunks_exact(8)) {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(chunk);
        *limb = u64::from_be_bytes(bytes);
    }

    let mut out = String::with_capacity(80);
    while limbs.iter().any(|&l| l != 0) {
        let mut rem = divide_in_place(&mut limbs, LIMB_DIVISOR);
        for _ in 0..DIGITS_PER_LIMB {
            out.push(char::from(b'0' + (rem % 10) as u8));
            rem /= 10;
        }
    }

    // Zeros past the most significant digit are leading zeros of the number.
    let significant = out.trim_end_matches('0').len();
    out.truncate(significant);
    while out.len() < MIN_DECIMAL_DIGITS {
        out.push('0');
    }
    out
}

/// Divide big-endian limbs by `divisor`, returning the remainder.
fn divide_in_place(limbs: &mut [u64; 4], divisor: u64) -> u64 {
    let mut rem: u128 = 0;
    for limb in limbs.iter_mut() {
        let acc = (rem << 64) | u128::from(*limb);
        *limb = (acc / u128::from(divisor)) as u64;
        rem = acc % u128::from(divisor);
    }
    rem as u64
}
