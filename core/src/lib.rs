//! Consistent sampling: reproducible pseudorandom samples of a finite id
//! collection, with or without replacement.
//!
//! Every id gets a chain of ticket numbers in (0, 1) derived from SHA-256
//! over (seed, id). Sampling pops tickets in increasing order, so filtering a
//! sample of a superset down to a subset gives exactly the sample of the
//! subset. Samples over disjoint collections can be merged by ticket order.

pub mod config;
pub mod error;
pub mod fraction;
pub mod hash;
pub mod heap;
pub mod sampler;
pub mod ticket;
pub mod types;

pub use config::{FractionConfig, OutputMode, Radix, SampleOptions};
pub use error::{SamplerError, SamplerResult};
pub use fraction::{trim, FractionGenerator};
pub use heap::{duplicates, TicketHeap};
pub use sampler::{merge, sample, DrawnTicket, Merge, Sample, SampleItem, TicketStream};
pub use ticket::{Ticket, TicketNumber};
pub use types::{Generation, SampleId};
