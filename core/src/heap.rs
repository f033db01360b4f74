//! Min-heap of live tickets for one sampler invocation.

use crate::error::{SamplerError, SamplerResult};
use crate::fraction::FractionGenerator;
use crate::hash::SeedHash;
use crate::ticket::Ticket;
use crate::types::SampleId;
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashSet};

/// Sorted list of the ids that occur more than once in `ids`.
pub fn duplicates<Id: SampleId>(ids: &[Id]) -> Vec<Id> {
    let mut seen = HashSet::with_capacity(ids.len());
    let mut dupes = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            dupes.insert(id.clone());
        }
    }
    dupes.into_iter().collect()
}

/// Sole owner of every live ticket. The smallest ticket is on top.
#[derive(Debug, Clone)]
pub struct TicketHeap<Id: SampleId> {
    heap: BinaryHeap<Reverse<Ticket<Id>>>,
}

impl<Id: SampleId> TicketHeap<Id> {
    pub fn new() -> Self {
        Self { heap: BinaryHeap::new() }
    }

    /// One generation-1 ticket per id.
    ///
    /// Fails before generating any ticket if an id repeats.
    pub fn build(
        ids: impl IntoIterator<Item = Id>,
        seed_hash: &SeedHash,
        generator: &FractionGenerator,
    ) -> SamplerResult<Self> {
        let ids: Vec<Id> = ids.into_iter().collect();
        let dupes = duplicates(&ids);
        if !dupes.is_empty() {
            return Err(SamplerError::DuplicateIds {
                ids: dupes.iter().map(ToString::to_string).collect(),
            });
        }

        let heap: BinaryHeap<_> = ids
            .into_iter()
            .map(|id| Reverse(generator.first_ticket(id, seed_hash)))
            .collect();
        log::debug!("ticket heap built with {} tickets", heap.len());
        Ok(Self { heap })
    }

    pub fn push(&mut self, ticket: Ticket<Id>) {
        self.heap.push(Reverse(ticket));
    }

    pub fn pop_min(&mut self) -> Option<Ticket<Id>> {
        self.heap.pop().map(|Reverse(t)| t)
    }

    pub fn peek_min(&self) -> Option<&Ticket<Id>> {
        self.heap.peek().map(|Reverse(t)| t)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<Id: SampleId> Default for TicketHeap<Id> {
    fn default() -> Self {
        Self::new()
    }
}
