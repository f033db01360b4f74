//! Shared primitive types used across the sampler.

use std::fmt::Display;
use std::hash::Hash;

/// How many times an id has been drawn, counting the current draw. Starts at 1.
pub type Generation = u64;

/// Number of heap pops performed by one sampler invocation.
pub type DrawCount = u64;

/// Anything that can be sampled.
///
/// `Ord` and `Hash` cover duplicate detection and tie-breaking; the `Display`
/// rendering is the stable serialization fed to the hash, so two ids that
/// print the same will receive the same tickets.
pub trait SampleId: Clone + Ord + Hash + Display {}

impl<T: Clone + Ord + Hash + Display> SampleId for T {}
