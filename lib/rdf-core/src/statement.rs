use std::sync::Arc;

use crate::node::Node;

/// The location in a source document where a [`Statement`] was parsed from.
///
/// Carried only when a reader's `store_origins` option is enabled; dropped on model insertion
/// otherwise, since most consumers never need it and it would otherwise be dead weight on every
/// statement in a large model.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cursor {
    pub document: Arc<str>,
    pub line: u64,
    pub column: u64,
}

/// A single RDF statement: `(subject, predicate, object)`, optionally named by a graph, and
/// optionally tagged with the [`Cursor`] it was parsed from.
///
/// Nodes are referenced, not owned: a `Statement` borrows interned [`Node`]s from whichever
/// [`NodeSet`](crate::NodeSet) produced them. Equality compares the four nodes only; `origin` is
/// metadata and never participates in equality, hashing or ordering, so that a statement read
/// twice from different positions in the same or different documents is still recognized as a
/// duplicate by the [`Model`](crate::model::Model).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Statement {
    pub subject: Node,
    pub predicate: Node,
    pub object: Node,
    pub graph: Option<Node>,
    pub origin: Option<Cursor>,
}

impl Statement {
    pub fn new(subject: Node, predicate: Node, object: Node) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph: None,
            origin: None,
        }
    }

    pub fn with_graph(mut self, graph: Node) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn with_origin(mut self, origin: Cursor) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Whether `pattern` matches this statement (every bound field of `pattern` equals the
    /// corresponding field here; unbound fields are wildcards).
    pub fn matches(&self, pattern: &Pattern) -> bool {
        if let Some(s) = &pattern.subject {
            if s != &self.subject {
                return false;
            }
        }
        if let Some(p) = &pattern.predicate {
            if p != &self.predicate {
                return false;
            }
        }
        if let Some(o) = &pattern.object {
            if o != &self.object {
                return false;
            }
        }
        if let Some(g) = &pattern.graph {
            if g.as_ref() != self.graph.as_ref() {
                return false;
            }
        }
        true
    }
}

impl PartialEq for Statement {
    fn eq(&self, other: &Self) -> bool {
        self.subject == other.subject
            && self.predicate == other.predicate
            && self.object == other.object
            && self.graph == other.graph
    }
}
impl Eq for Statement {}

/// A statement with some fields left as wildcards, used to query a [`Model`](crate::model::Model).
///
/// `graph` has three states, not two: `None` means "any graph, including the default graph"
/// (matches are deduplicated across graphs per the model's default-graph semantics); `Some(None)`
/// means "the default graph only"; `Some(Some(g))` means "exactly graph `g`".
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pattern {
    pub subject: Option<Node>,
    pub predicate: Option<Node>,
    pub object: Option<Node>,
    pub graph: Option<Option<Node>>,
}

impl Pattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject(mut self, s: Node) -> Self {
        self.subject = Some(s);
        self
    }

    pub fn with_predicate(mut self, p: Node) -> Self {
        self.predicate = Some(p);
        self
    }

    pub fn with_object(mut self, o: Node) -> Self {
        self.object = Some(o);
        self
    }

    pub fn with_graph(mut self, g: Option<Node>) -> Self {
        self.graph = Some(g);
        self
    }

    /// How many of the four fields are bound (non-wildcard). Used by the model to choose which
    /// index best covers the pattern.
    pub fn bound_count(&self) -> u8 {
        self.subject.is_some() as u8
            + self.predicate.is_some() as u8
            + self.object.is_some() as u8
            + self.graph.is_some() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_does_not_affect_equality() {
        let a = Statement::new(Node::uri("s"), Node::uri("p"), Node::uri("o")).with_origin(
            Cursor {
                document: Arc::from("a.ttl"),
                line: 1,
                column: 1,
            },
        );
        let b = Statement::new(Node::uri("s"), Node::uri("p"), Node::uri("o"));
        assert_eq!(a, b);
    }

    #[test]
    fn pattern_wildcards_match_anything_in_that_slot() {
        let stmt = Statement::new(Node::uri("s"), Node::uri("p"), Node::uri("o"));
        let pattern = Pattern::new().with_subject(Node::uri("s"));
        assert!(stmt.matches(&pattern));
        let pattern = Pattern::new().with_subject(Node::uri("other"));
        assert!(!stmt.matches(&pattern));
    }

    #[test]
    fn graph_wildcard_distinguishes_default_from_any() {
        let stmt = Statement::new(Node::uri("s"), Node::uri("p"), Node::uri("o"));
        assert!(stmt.matches(&Pattern::new()));
        assert!(stmt.matches(&Pattern::new().with_graph(None)));
        assert!(!stmt.matches(&Pattern::new().with_graph(Some(Node::uri("g")))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn statement_with_origin_round_trips_through_json() {
        let stmt = Statement::new(Node::uri("s"), Node::uri("p"), Node::uri("o"))
            .with_graph(Node::uri("g"))
            .with_origin(Cursor {
                document: Arc::from("a.ttl"),
                line: 3,
                column: 7,
            });
        let json = serde_json::to_string(&stmt).unwrap();
        let back: Statement = serde_json::from_str(&json).unwrap();
        assert_eq!(stmt, back);
        assert_eq!(back.origin.unwrap().line, 3);
    }
}
