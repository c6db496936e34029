use crate::node::Node;
use crate::statement::Statement;

/// Abbreviation hints attached to a [`Event::Statement`], carried from the reader that produced
/// it (to preserve the document's own anonymous-node/collection nesting on round-trip) or set
/// directly by a caller building statements programmatically to request a particular abbreviated
/// rendering.
///
/// Exactly one of `start_anon_*`/`start_list_*` is set on the first statement of a freshly opened
/// `[ ... ]` or `( ... )`; later statements about the same subject or object (reached via `;` or
/// `,`) carry no flags. The matching [`Event::End`] closes the context once its last statement has
/// been emitted.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StatementFlags {
    /// The subject is an anonymous node with no predicate-object list of its own (`[] .` used
    /// standalone, asserting nothing).
    pub empty_subject: bool,
    /// This statement's subject is the first mentioned for a freshly opened `[ ... ]`.
    pub start_anon_subject: bool,
    /// This statement's object is a freshly opened `[ ... ]`.
    pub start_anon_object: bool,
    /// This statement's subject is the head of a freshly opened `( ... )`.
    pub start_list_subject: bool,
    /// This statement's object is the head of a freshly opened `( ... )`.
    pub start_list_object: bool,
    /// Request that the writer keep the subject on the same line as the previous statement even
    /// if it would otherwise break to a new line.
    pub terse_subject: bool,
    /// Request that the writer keep the object on the same line even in pretty-printed output.
    pub terse_object: bool,
}

/// The uniform event protocol between a reader, a writer, a model and any sink in between.
///
/// Events on one sink are totally ordered and causally follow the order they were produced in,
/// whether that is source-document order (from a [`Reader`](crate::model::Model)) or an
/// iteration order chosen by a model range.
#[derive(Clone, Debug)]
pub enum Event {
    /// The effective base URI changed (an `@base`/`BASE` directive was read, or a caller set one
    /// explicitly before writing).
    Base(String),
    /// A prefix was bound to a namespace URI (an `@prefix`/`PREFIX` directive, or a caller-set
    /// binding).
    Prefix(String, String),
    /// A single statement, with abbreviation hints for the writer.
    Statement(StatementFlags, Statement),
    /// The end of an anonymous-node or collection context opened by a statement whose flags had
    /// `start_anon_*`/`start_list_*` set; `Node` identifies which one (by node identity) so a
    /// writer tracking several nested contexts at once knows which frame to pop.
    End(Node),
}
