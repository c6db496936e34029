//! The public `Writer` (§4.2): a [`Sink`] that serializes the events it receives back out as one
//! of the four concrete syntaxes, wrapping `rdf_turtle`'s `TurtleWriter`/`LineWriter`.

use std::io::Write as IoWrite;

use rdf_core::{Environment, Event, Status};
use rdf_turtle::{LineWriter, TurtleWriter, WriterOptions as LowLevelWriterOptions};

use crate::format::Syntax;
use crate::sink::Sink;

/// Construction-time flags recognized by the Writer (§4.2), mirrored one-to-one onto
/// `rdf_turtle::WriterOptions` — kept as this crate's own type so a caller configures a `Writer`
/// the same way it configures a `Reader`, without reaching into `rdf-turtle`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WriterOptions {
    /// Escape every non-ASCII character instead of writing it raw.
    pub ascii: bool,
    /// Never abbreviate: no `[ ... ]`, no `( ... )`, no `;`/`,` grouping.
    pub verbatim: bool,
    /// Expand CURIEs and prefix-compactable URIs into full `<...>` form.
    pub expanded: bool,
    /// Omit newlines and indentation.
    pub terse: bool,
    /// Replace un-encodable text with U+FFFD instead of failing.
    pub lax: bool,
    /// Suppress `@base`/`@prefix` output even when base/prefix events arrive.
    pub contextual: bool,
}

impl From<WriterOptions> for LowLevelWriterOptions {
    fn from(options: WriterOptions) -> Self {
        Self {
            ascii: options.ascii,
            verbatim: options.verbatim,
            expanded: options.expanded,
            terse: options.terse,
            lax: options.lax,
            contextual: options.contextual,
        }
    }
}

enum Inner<W: IoWrite> {
    Turtle(TurtleWriter<W>),
    Line(LineWriter<W>),
}

/// Serializes an event stream as one of the four concrete syntaxes. Implements [`Sink`] so it
/// composes with the same pipeline stages (`Filter`, `Tee`, `Canonicalizer`) a model-filling
/// `Inserter` does.
pub struct Writer<W: IoWrite> {
    inner: Inner<W>,
}

impl<W: IoWrite> Writer<W> {
    pub fn new(dest: W, syntax: Syntax, options: WriterOptions) -> Self {
        let with_graph_name = syntax.with_graph_name();
        let inner = if syntax.is_line_based() {
            Inner::Line(LineWriter::new(dest, with_graph_name, options.ascii))
        } else {
            Inner::Turtle(TurtleWriter::new(
                dest,
                Environment::new(),
                options.into(),
                with_graph_name,
            ))
        };
        Self { inner }
    }
}

impl<W: IoWrite> Sink for Writer<W> {
    fn handle(&mut self, event: Event) -> Status {
        let result = match &mut self.inner {
            Inner::Turtle(writer) => writer.write_event(event),
            Inner::Line(writer) => writer.write_event(event),
        };
        result.as_ref().map_or_else(Status::from, |_| Status::Success)
    }

    fn finish(&mut self) -> Status {
        let result = match &mut self.inner {
            Inner::Turtle(writer) => writer.finish(),
            Inner::Line(writer) => writer.finish(),
        };
        result.as_ref().map_or_else(Status::from, |_| Status::Success)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    use super::*;
    use rdf_core::{Node, Statement, StatementFlags};

    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl IoWrite for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn turtle_writer_abbreviates_a_shared_subject() {
        let buffer = SharedBuffer::default();
        let mut writer = Writer::new(buffer.clone(), Syntax::Turtle, WriterOptions::default());
        let s = Node::uri("http://example.org/s");
        let p = Node::uri("http://example.org/p");
        writer.handle(Event::Statement(
            StatementFlags::default(),
            Statement::new(s.clone(), p.clone(), Node::plain_literal("a")),
        ));
        writer.handle(Event::Statement(
            StatementFlags::default(),
            Statement::new(s, p, Node::plain_literal("b")),
        ));
        assert_eq!(writer.finish(), Status::Success);
        let text = String::from_utf8(buffer.0.borrow().clone()).unwrap();
        assert!(text.contains("\"a\" , \"b\""));
    }

    #[test]
    fn line_writer_emits_one_statement_per_line() {
        let buffer = SharedBuffer::default();
        let mut writer = Writer::new(buffer.clone(), Syntax::NTriples, WriterOptions::default());
        writer.handle(Event::Statement(
            StatementFlags::default(),
            Statement::new(
                Node::uri("http://example.org/s"),
                Node::uri("http://example.org/p"),
                Node::uri("http://example.org/o"),
            ),
        ));
        assert_eq!(writer.finish(), Status::Success);
        let text = String::from_utf8(buffer.0.borrow().clone()).unwrap();
        assert_eq!(
            text,
            "<http://example.org/s> <http://example.org/p> <http://example.org/o> .\n"
        );
    }
}
