//! The uniform event-sink interface (§4.4): every consumer of RDF events — a `Model` inserter, a
//! `Writer`, a filter, a tee, a canonicalizer — implements [`Sink`], so pipeline stages compose by
//! wrapping rather than by a bespoke interface per consumer.

use rdf_core::{Event, Status};

/// A consumer of the [`Event`] stream produced by a `Reader` or replayed from a `Model`.
///
/// `handle` is called once per event, in source order; a non-[`Status::Success`] return
/// propagates immediately to whatever drove the sink (the reader aborts, a `Tee` stops at the
/// first failing branch's status). [`Sink::finish`] is called once after the last event, so a
/// sink that must see the whole stream before it can act (the [`crate::pipeline::Canonicalizer`])
/// has a place to flush.
pub trait Sink {
    fn handle(&mut self, event: Event) -> Status;

    /// Called once after the last event of a document or range. The default no-op is correct for
    /// every sink that acts immediately on each event.
    fn finish(&mut self) -> Status {
        Status::Success
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn handle(&mut self, event: Event) -> Status {
        (**self).handle(event)
    }

    fn finish(&mut self) -> Status {
        (**self).finish()
    }
}
