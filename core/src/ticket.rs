//! Ticket numbers and tickets.
//!
//! A ticket number is an arbitrary-precision fraction in (0, 1) kept as
//! its canonical string `0.<digits>`. Successors keep the leading run of
//! maximum digits and append a full digest, so numbers grow without bound
//! as a chain approaches 1.

use crate::config::Radix;
use crate::error::{SamplerError, SamplerResult};
use crate::types::Generation;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

const PREFIX: &str = "0.";

/// Pseudorandom real strictly between 0 and 1.
///
/// Ordering is numeric: `0.5 == 0.50` and `0.5 < 0.51`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketNumber(String);

impl TicketNumber {
    /// Validate and lower-case a `0.<digits>` string.
    ///
    /// Accepts any hex digit. Use [`TicketNumber::parse_with`] when the
    /// number will be fed back to a generator of a known radix.
    pub fn parse(s: &str) -> SamplerResult<Self> {
        let normalized = s.to_ascii_lowercase();
        let valid = normalized
            .strip_prefix(PREFIX)
            .map(|digits| {
                !digits.is_empty()
                    && digits.bytes().all(|c| c.is_ascii_hexdigit())
                    && digits.bytes().any(|c| c != b'0')
            })
            .unwrap_or(false);
        if !valid {
            return Err(SamplerError::InvalidTicketNumber(s.to_string()));
        }
        Ok(Self(normalized))
    }

    /// Like [`TicketNumber::parse`], but every digit must belong to `radix`.
    pub fn parse_with(s: &str, radix: Radix) -> SamplerResult<Self> {
        let number = Self::parse(s)?;
        if !number.in_radix(radix) {
            return Err(SamplerError::RadixMismatch { number: number.0, radix });
        }
        Ok(number)
    }

    /// Whether every digit belongs to `radix`.
    ///
    /// Numbers from different radixes do not compare meaningfully.
    pub fn in_radix(&self, radix: Radix) -> bool {
        self.digits().bytes().all(|c| radix.is_digit(c))
    }

    /// Caller guarantees the string is canonical and non-zero.
    pub(crate) fn from_canonical(s: String) -> Self {
        debug_assert!(Self::parse(&s).is_ok(), "non-canonical ticket number {s}");
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits after `0.`.
    pub fn digits(&self) -> &str {
        &self.0[PREFIX.len()..]
    }

    /// Digits with insignificant trailing zeros removed.
    fn significant(&self) -> &str {
        self.digits().trim_end_matches('0')
    }
}

impl PartialEq for TicketNumber {
    fn eq(&self, other: &Self) -> bool {
        self.significant() == other.significant()
    }
}

impl Eq for TicketNumber {}

impl Ord for TicketNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        // Same-radix digits sort by byte value, and with trailing zeros gone
        // a proper prefix is always the smaller number.
        self.significant().cmp(other.significant())
    }
}

impl PartialOrd for TicketNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TicketNumber {
    type Error = SamplerError;

    fn try_from(s: String) -> SamplerResult<Self> {
        Self::parse(&s)
    }
}

impl From<TicketNumber> for String {
    fn from(n: TicketNumber) -> Self {
        n.0
    }
}

/// One draw-eligible instance of an id.
///
/// Field order is the sort order: ticket number, then id, then generation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ticket<Id> {
    pub ticket_number: TicketNumber,
    pub id: Id,
    pub generation: Generation,
}

impl<Id> Ticket<Id> {
    pub fn new(ticket_number: TicketNumber, id: Id, generation: Generation) -> Self {
        Self { ticket_number, id, generation }
    }
}
