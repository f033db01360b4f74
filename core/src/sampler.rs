//! The streaming draw loop.
//!
//! DRAW ORDER (fixed):
//!   1. Pop the smallest ticket from the heap.
//!   2. With replacement, push the id's next-generation ticket.
//!   3. Count the draw; emit it only inside the drop/take window.
//!
//! RULES:
//!   - Every draw is computed, whether or not it is emitted.
//!   - An id's tickets depend on (seed, id) only, never on the other ids.
//!   - Each invocation builds its own heap; nothing is cached or shared.

use crate::config::{OutputMode, SampleOptions};
use crate::error::SamplerResult;
use crate::fraction::FractionGenerator;
use crate::hash::SeedHash;
use crate::heap::TicketHeap;
use crate::ticket::Ticket;
use crate::types::{DrawCount, Generation, SampleId};
use serde::Serialize;
use std::fmt;
use std::iter::{FusedIterator, Peekable};

/// Unwindowed stream of full-precision tickets in increasing order.
///
/// Finite without replacement, unbounded with it.
#[derive(Debug, Clone)]
pub struct TicketStream<Id: SampleId> {
    heap: TicketHeap<Id>,
    generator: FractionGenerator,
    with_replacement: bool,
    draws: DrawCount,
}

impl<Id: SampleId> TicketStream<Id> {
    pub fn new(
        ids: impl IntoIterator<Item = Id>,
        seed: &impl std::fmt::Display,
        generator: FractionGenerator,
        with_replacement: bool,
    ) -> SamplerResult<Self> {
        let heap = TicketHeap::build(ids, &SeedHash::new(seed), &generator)?;
        Ok(Self { heap, generator, with_replacement, draws: 0 })
    }

    /// Pop the next ticket, replacing it first if sampling with replacement.
    pub fn draw(&mut self) -> Option<Ticket<Id>> {
        let ticket = self.heap.pop_min()?;
        if self.with_replacement {
            self.heap.push(self.generator.replacement(&ticket));
        }
        self.draws += 1;
        log::trace!(
            "draw {}: id={} generation={} ticket={}",
            self.draws,
            ticket.id,
            ticket.generation,
            ticket.ticket_number
        );
        Some(ticket)
    }

    pub fn draws(&self) -> DrawCount {
        self.draws
    }

    /// Tickets still in the heap.
    pub fn live(&self) -> usize {
        self.heap.len()
    }

    pub fn with_replacement(&self) -> bool {
        self.with_replacement
    }

    pub fn generator(&self) -> &FractionGenerator {
        &self.generator
    }
}

impl<Id: SampleId> Iterator for TicketStream<Id> {
    type Item = Ticket<Id>;

    fn next(&mut self) -> Option<Self::Item> {
        self.draw()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match (self.with_replacement, self.heap.len()) {
            (_, 0)     => (0, Some(0)),
            (true, _)  => (usize::MAX, None),
            (false, n) => (n, Some(n)),
        }
    }
}

impl<Id: SampleId> FusedIterator for TicketStream<Id> {}

/// A drawn ticket with its number trimmed for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawnTicket<Id> {
    pub ticket_number: String,
    pub id: Id,
    pub generation: Generation,
}

/// One emitted element, shaped by [`OutputMode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SampleItem<Id> {
    Id(Id),
    Tuple((String, Id, Generation)),
    Ticket(DrawnTicket<Id>),
}

impl<Id> SampleItem<Id> {
    pub fn id(&self) -> &Id {
        match self {
            Self::Id(id)             => id,
            Self::Tuple((_, id, _))  => id,
            Self::Ticket(t)          => &t.id,
        }
    }

    pub fn into_id(self) -> Id {
        match self {
            Self::Id(id)             => id,
            Self::Tuple((_, id, _))  => id,
            Self::Ticket(t)          => t.id,
        }
    }

    /// `None` in id mode.
    pub fn generation(&self) -> Option<Generation> {
        match self {
            Self::Id(_)              => None,
            Self::Tuple((_, _, g))   => Some(*g),
            Self::Ticket(t)          => Some(t.generation),
        }
    }

    /// Trimmed ticket number; `None` in id mode.
    pub fn ticket_number(&self) -> Option<&str> {
        match self {
            Self::Id(_)              => None,
            Self::Tuple((n, _, _))   => Some(n),
            Self::Ticket(t)          => Some(&t.ticket_number),
        }
    }
}

/// Lazy, windowed sample cursor. Dropping it cancels the sample.
#[derive(Debug, Clone)]
pub struct Sample<Id: SampleId> {
    stream: TicketStream<Id>,
    drop: DrawCount,
    take: Option<u64>,
    output: OutputMode,
    digits: usize,
    done: bool,
}

impl<Id: SampleId> Sample<Id> {
    pub fn new(
        ids: impl IntoIterator<Item = Id>,
        seed: &impl std::fmt::Display,
        options: &SampleOptions,
    ) -> SamplerResult<Self> {
        options.validate()?;
        let generator = FractionGenerator::new(options.fraction.clone());
        let stream = TicketStream::new(ids, seed, generator, options.with_replacement)?;
        Ok(Self {
            stream,
            drop: options.drop,
            take: options.take,
            output: options.output,
            digits: options.digits,
            done: false,
        })
    }

    /// Draw until the next in-window element, or report end of stream.
    pub fn try_advance(&mut self) -> Option<SampleItem<Id>> {
        if self.done {
            return None;
        }
        loop {
            if self.window_end().is_some_and(|end| self.stream.draws() >= end) {
                return self.finish();
            }
            let Some(ticket) = self.stream.draw() else {
                return self.finish();
            };
            if self.stream.draws() > self.drop {
                return Some(self.shape(ticket));
            }
        }
    }

    /// Draws performed so far, emitted or not.
    pub fn draws(&self) -> DrawCount {
        self.stream.draws()
    }

    pub fn output(&self) -> OutputMode {
        self.output
    }

    /// Shortcut for id-only consumers, whatever the output mode.
    pub fn ids(self) -> impl Iterator<Item = Id> {
        self.map(SampleItem::into_id)
    }

    fn window_end(&self) -> Option<DrawCount> {
        self.take.map(|take| self.drop.saturating_add(take))
    }

    /// Elements still to be emitted, if bounded.
    fn remaining(&self) -> Option<u64> {
        if self.done {
            return Some(0);
        }
        let draws = self.stream.draws();
        let window_left = self
            .window_end()
            .map(|end| end.saturating_sub(draws.max(self.drop)));
        let available = (!self.stream.with_replacement() || self.stream.live() == 0).then(|| {
            let skip = self.drop.saturating_sub(draws);
            (self.stream.live() as u64).saturating_sub(skip)
        });
        match (window_left, available) {
            (Some(w), Some(a)) => Some(w.min(a)),
            (w, a)             => w.or(a),
        }
    }

    fn finish(&mut self) -> Option<SampleItem<Id>> {
        if !self.done {
            self.done = true;
            log::debug!(
                "sample finished after {} draws ({} tickets left)",
                self.stream.draws(),
                self.stream.live()
            );
        }
        None
    }

    fn shape(&self, ticket: Ticket<Id>) -> SampleItem<Id> {
        match self.output {
            OutputMode::Id => SampleItem::Id(ticket.id),
            OutputMode::Tuple => SampleItem::Tuple((
                self.stream.generator().trim(&ticket.ticket_number, self.digits),
                ticket.id,
                ticket.generation,
            )),
            OutputMode::Ticket => SampleItem::Ticket(DrawnTicket {
                ticket_number: self.stream.generator().trim(&ticket.ticket_number, self.digits),
                id: ticket.id,
                generation: ticket.generation,
            }),
        }
    }
}

impl<Id: SampleId> Iterator for Sample<Id> {
    type Item = SampleItem<Id>;

    fn next(&mut self) -> Option<Self::Item> {
        self.try_advance()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining() {
            Some(n) => {
                let n = usize::try_from(n).unwrap_or(usize::MAX);
                (n, Some(n))
            }
            None => (usize::MAX, None),
        }
    }
}

impl<Id: SampleId> FusedIterator for Sample<Id> {}

/// Sample `ids` in the pseudorandom order fixed by `seed`.
///
/// Validation happens here, before any ticket is generated; the returned
/// cursor does no work until it is pulled.
pub fn sample<Id: SampleId>(
    ids: impl IntoIterator<Item = Id>,
    seed: &impl std::fmt::Display,
    options: &SampleOptions,
) -> SamplerResult<Sample<Id>> {
    Sample::new(ids, seed, options)
}

/// Two ticket streams interleaved in increasing ticket order.
///
/// For streams over disjoint id sets built with the same seed, the result
/// equals the stream of their union.
pub struct Merge<A: Iterator, B: Iterator<Item = A::Item>> {
    left: Peekable<A>,
    right: Peekable<B>,
}

pub fn merge<Id, A, B>(left: A, right: B) -> Merge<A::IntoIter, B::IntoIter>
where
    Id: SampleId,
    A: IntoIterator<Item = Ticket<Id>>,
    B: IntoIterator<Item = Ticket<Id>>,
{
    Merge {
        left: left.into_iter().peekable(),
        right: right.into_iter().peekable(),
    }
}

impl<Id, A, B> Iterator for Merge<A, B>
where
    Id: SampleId,
    A: Iterator<Item = Ticket<Id>>,
    B: Iterator<Item = Ticket<Id>>,
{
    type Item = Ticket<Id>;

    fn next(&mut self) -> Option<Self::Item> {
        match (self.left.peek(), self.right.peek()) {
            (Some(l), Some(r)) if r < l => self.right.next(),
            (Some(_), _)                => self.left.next(),
            (None, _)                   => self.right.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (l_lo, l_hi) = self.left.size_hint();
        let (r_lo, r_hi) = self.right.size_hint();
        let hi = l_hi.zip(r_hi).and_then(|(l, r)| l.checked_add(r));
        (l_lo.saturating_add(r_lo), hi)
    }
}

impl<Id, A, B> FusedIterator for Merge<A, B>
where
    Id: SampleId,
    A: FusedIterator<Item = Ticket<Id>>,
    B: FusedIterator<Item = Ticket<Id>>,
{
}

impl<A, B> fmt::Debug for Merge<A, B>
where
    A: Iterator + fmt::Debug,
    B: Iterator<Item = A::Item> + fmt::Debug,
    A::Item: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Merge")
            .field("left", &self.left)
            .field("right", &self.right)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIX: [&str; 6] = ["A-1", "A-2", "A-3", "B-1", "B-2", "B-3"];

    fn ids_of(opts: &SampleOptions, ids: &[&'static str]) -> Vec<&'static str> {
        sample(ids.iter().copied(), &314159, opts).unwrap().ids().collect()
    }

    #[test]
    fn shuffles_without_replacement() {
        let opts = SampleOptions::default();
        assert_eq!(ids_of(&opts, &SIX), vec!["B-2", "B-3", "A-3", "A-2", "B-1", "A-1"]);
    }

    #[test]
    fn tuple_output_is_trimmed() {
        let got: Vec<_> = sample(SIX, &314159, &SampleOptions::default()).unwrap().collect();
        let expected = [
            ("0.410310858", "B-2"),
            ("0.470960291", "B-3"),
            ("0.471438751", "A-3"),
            ("0.567089805", "A-2"),
            ("0.9781715679", "B-1"),
            ("0.9828515724", "A-1"),
        ];
        assert_eq!(got.len(), expected.len());
        for (item, (number, id)) in got.iter().zip(expected) {
            assert_eq!(*item, SampleItem::Tuple((number.to_string(), id, 1)));
        }
    }

    #[test]
    fn ticket_output_carries_fields() {
        let opts = SampleOptions::default().output(OutputMode::Ticket).take(1);
        let got: Vec<_> = sample(SIX, &314159, &opts).unwrap().collect();
        assert_eq!(
            got,
            vec![SampleItem::Ticket(DrawnTicket {
                ticket_number: "0.410310858".into(),
                id: "B-2",
                generation: 1,
            })]
        );
    }

    #[test]
    fn window_stops_drawing_once_filled() {
        let opts = SampleOptions::default().drop(2).take(3).output(OutputMode::Id);
        let mut s = sample(SIX, &314159, &opts).unwrap();
        assert_eq!(s.size_hint(), (3, Some(3)));
        let got: Vec<_> = s.by_ref().map(SampleItem::into_id).collect();
        assert_eq!(got, vec!["A-3", "A-2", "B-1"]);
        assert_eq!(s.draws(), 5);
        assert_eq!(s.next(), None);
        assert_eq!(s.draws(), 5);
    }

    #[test]
    fn take_zero_draws_nothing() {
        let opts = SampleOptions::default().take(0);
        let mut s = sample(SIX, &314159, &opts).unwrap();
        assert_eq!(s.next(), None);
        assert_eq!(s.draws(), 0);
    }

    #[test]
    fn drop_past_end_yields_nothing() {
        let opts = SampleOptions::default().drop(10);
        let mut s = sample(SIX, &314159, &opts).unwrap();
        assert_eq!(s.size_hint(), (0, Some(0)));
        assert_eq!(s.next(), None);
        assert_eq!(s.draws(), 6);
    }

    #[test]
    fn with_replacement_known_sequence() {
        let opts = SampleOptions::default().with_replacement(true).take(8);
        let got = sample(["A#2", "B#7", "C#1", "D#4"], &314159, &opts)
            .unwrap()
            .ids()
            .collect::<Vec<_>>();
        assert_eq!(got, vec!["D#4", "C#1", "C#1", "B#7", "A#2", "C#1", "D#4", "B#7"]);
    }

    #[test]
    fn unbounded_replacement_has_open_size_hint() {
        let opts = SampleOptions::default().with_replacement(true);
        let s = sample(["a", "b"], &1, &opts).unwrap();
        assert_eq!(s.size_hint(), (usize::MAX, None));
        assert_eq!(s.take(50).count(), 50);
    }

    #[test]
    fn empty_input_ends_immediately() {
        let mut s = sample(Vec::<String>::new(), &"seed", &SampleOptions::default()).unwrap();
        assert_eq!(s.next(), None);
        let opts = SampleOptions::default().with_replacement(true);
        let mut s = sample(Vec::<String>::new(), &"seed", &opts).unwrap();
        assert_eq!(s.size_hint(), (0, Some(0)));
        assert_eq!(s.next(), None);
    }

    #[test]
    fn item_accessors() {
        let item = SampleItem::Tuple(("0.1".to_string(), "x", 2));
        assert_eq!(item.id(), &"x");
        assert_eq!(item.generation(), Some(2));
        assert_eq!(item.ticket_number(), Some("0.1"));
        let item = SampleItem::Id("y");
        assert_eq!(item.generation(), None);
        assert_eq!(item.into_id(), "y");
    }

    #[test]
    fn merge_of_disjoint_streams_equals_union() {
        let gen = FractionGenerator::default();
        let a = TicketStream::new(["A-1", "A-2", "A-3"], &314159, gen.clone(), false).unwrap();
        let b = TicketStream::new(["B-1", "B-2", "B-3"], &314159, gen.clone(), false).unwrap();
        let union = TicketStream::new(SIX, &314159, gen, false).unwrap();
        let merged: Vec<_> = merge(a, b).collect();
        assert_eq!(merged, union.collect::<Vec<_>>());
    }

    #[test]
    fn merge_with_replacement_bounded_by_take() {
        let gen = FractionGenerator::default();
        let a = TicketStream::new(["A-1", "A-2", "A-3"], &314159, gen.clone(), true).unwrap();
        let b = TicketStream::new(["B-1", "B-2", "B-3"], &314159, gen.clone(), true).unwrap();
        let union = TicketStream::new(SIX, &314159, gen, true).unwrap();
        let merged: Vec<_> = merge(a, b).take(20).collect();
        assert_eq!(merged, union.take(20).collect::<Vec<_>>());
    }

    #[test]
    fn merge_stays_exhausted_and_reports_bounds() {
        fn assert_fused<I: FusedIterator>(_: &I) {}

        let gen = FractionGenerator::default();
        let a = TicketStream::new(["A-1", "A-2"], &314159, gen.clone(), false).unwrap();
        let b = TicketStream::new(["B-1"], &314159, gen, false).unwrap();
        let mut merged = merge(a, b);
        assert_fused(&merged);
        assert_eq!(merged.size_hint(), (3, Some(3)));
        assert!(format!("{merged:?}").starts_with("Merge"));

        assert_eq!(merged.by_ref().count(), 3);
        assert_eq!(merged.next(), None);
        assert_eq!(merged.next(), None);
    }
}
