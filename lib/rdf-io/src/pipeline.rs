//! The composable sink pipeline (§4.4): an `Inserter` that fills a `Model`, a `Filter` that
//! passes statements through a pattern, a `Tee` that broadcasts to several sinks, and a
//! `Canonicalizer` that normalizes literal lexical forms and relabels blank nodes deterministically.

use std::collections::{HashMap, HashSet};

use rdf_core::vocab::xsd;
use rdf_core::{Environment, Event, Node, Pattern, Statement, StatementFlags, Status};
use sha2::{Digest, Sha256};

use crate::sink::Sink;

/// A sink that inserts every statement it sees into a [`rdf_core::model::Model`], forwarding
/// `Base`/`Prefix` events to an attached [`Environment`] if one was given.
pub struct Inserter<'m> {
    model: &'m mut rdf_core::model::Model,
    env: Option<&'m mut Environment>,
}

impl<'m> Inserter<'m> {
    pub fn new(model: &'m mut rdf_core::model::Model) -> Self {
        Self { model, env: None }
    }

    pub fn with_env(model: &'m mut rdf_core::model::Model, env: &'m mut Environment) -> Self {
        Self {
            model,
            env: Some(env),
        }
    }
}

impl Sink for Inserter<'_> {
    fn handle(&mut self, event: Event) -> Status {
        match event {
            Event::Base(uri) => {
                if let Some(env) = self.env.as_deref_mut() {
                    env.set_base(uri);
                }
                Status::Success
            }
            Event::Prefix(name, uri) => {
                if let Some(env) = self.env.as_deref_mut() {
                    env.set_prefix(name, uri);
                }
                Status::Success
            }
            Event::Statement(_flags, statement) => self.model.insert(statement),
            Event::End(_) => Status::Success,
        }
    }
}

/// Whether a [`Filter`] passes statements matching its pattern through, or everything else.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FilterMode {
    /// Only statements matching the pattern reach the inner sink.
    Inclusive,
    /// Every statement except those matching the pattern reaches the inner sink.
    Exclusive,
}

/// A sink that passes `Statement` events through a pattern before forwarding them to an inner
/// sink; every other event is always forwarded.
pub struct Filter<S> {
    inner: S,
    pattern: Pattern,
    mode: FilterMode,
}

impl<S: Sink> Filter<S> {
    pub fn new(inner: S, pattern: Pattern, mode: FilterMode) -> Self {
        Self {
            inner,
            pattern,
            mode,
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Sink> Sink for Filter<S> {
    fn handle(&mut self, event: Event) -> Status {
        match &event {
            Event::Statement(_, statement) => {
                let matches = statement.matches(&self.pattern);
                let passes = match self.mode {
                    FilterMode::Inclusive => matches,
                    FilterMode::Exclusive => !matches,
                };
                if passes {
                    self.inner.handle(event)
                } else {
                    Status::Success
                }
            }
            _ => self.inner.handle(event),
        }
    }

    fn finish(&mut self) -> Status {
        self.inner.finish()
    }
}

/// A sink that broadcasts every event to a set of inner sinks, in registration order.
///
/// Every inner sink sees every event regardless of an earlier branch's status (a tee that gave up
/// on the first non-`Success` branch would silently stop feeding the others); the status `Tee`
/// itself reports is the first non-`Success` one encountered, per §4.4.
pub struct Tee<'a> {
    inner: Vec<Box<dyn Sink + 'a>>,
}

impl<'a> Default for Tee<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Tee<'a> {
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }

    pub fn add(&mut self, sink: Box<dyn Sink + 'a>) {
        self.inner.push(sink);
    }
}

impl Sink for Tee<'_> {
    fn handle(&mut self, event: Event) -> Status {
        let mut first_failure = None;
        for sink in &mut self.inner {
            let status = sink.handle(event.clone());
            if status != Status::Success && first_failure.is_none() {
                first_failure = Some(status);
            }
        }
        first_failure.unwrap_or(Status::Success)
    }

    fn finish(&mut self) -> Status {
        let mut first_failure = None;
        for sink in &mut self.inner {
            let status = sink.finish();
            if status != Status::Success && first_failure.is_none() {
                first_failure = Some(status);
            }
        }
        first_failure.unwrap_or(Status::Success)
    }
}

fn peer_key(node: &Node) -> String {
    match node.as_blank() {
        Some(_) => "_".to_owned(),
        None => node.to_string(),
    }
}

fn push_signature(map: &mut HashMap<String, Vec<String>>, node: &Node, descriptor: String) {
    if let Some(label) = node.as_blank() {
        map.entry(label.to_owned()).or_default().push(descriptor);
    }
}

/// Canonicalizes `lexical`'s value under `datatype` through `rdf-datatypes`, returning `None`
/// when the datatype is not one of the XSD types the canonicalizer normalizes (`xsd:base64Binary`
/// is intentionally left untouched: base64 decoding is one of §1's named out-of-scope helpers) or
/// when the lexical form does not parse.
fn canonicalize_lexical(datatype: &str, lexical: &str) -> Option<String> {
    match datatype {
        xsd::BOOLEAN => lexical
            .parse::<rdf_datatypes::Boolean>()
            .ok()
            .map(|v| v.to_string()),
        xsd::INTEGER => lexical
            .parse::<rdf_datatypes::Integer>()
            .ok()
            .map(|v| v.to_string()),
        xsd::DECIMAL => lexical
            .parse::<rdf_datatypes::Decimal>()
            .ok()
            .map(|v| v.to_string()),
        xsd::DOUBLE => lexical
            .parse::<rdf_datatypes::Double>()
            .ok()
            .map(|v| v.to_string()),
        xsd::FLOAT => lexical
            .parse::<rdf_datatypes::Float>()
            .ok()
            .map(|v| v.to_string()),
        _ => None,
    }
}

fn canonicalize_literal(node: Node) -> Node {
    let (lexical, datatype) = match &node {
        Node::Literal(lit) => match lit.datatype() {
            Some(dt) => (lit.lexical().to_owned(), dt.to_owned()),
            None => return node,
        },
        _ => return node,
    };
    match canonicalize_lexical(&datatype, &lexical) {
        Some(canonical) if canonical != lexical => Node::typed_literal(canonical, datatype),
        _ => node,
    }
}

/// Computes a deterministic relabeling of every blank node mentioned in `statements`.
///
/// This is the "one non-trivial piece" §4.4 calls out: a first-degree neighborhood hash per
/// blank node (the multiset of `(role, predicate, peer)` triples it appears in, with every other
/// blank peer blinded to `"_"` so the hash does not depend on labels assigned elsewhere), with
/// ties (two blanks with an identical neighborhood, as in a symmetric graph) broken by original
/// label rather than resolved with the full recursive n-degree hashing and permutation search a
/// complete RDFC-1.0 implementation would use — see `DESIGN.md` for that tradeoff.
fn canonical_blank_labels(statements: &[Statement]) -> HashMap<String, String> {
    let mut blanks: HashSet<String> = HashSet::new();
    for s in statements {
        if let Some(b) = s.subject.as_blank() {
            blanks.insert(b.to_owned());
        }
        if let Some(b) = s.object.as_blank() {
            blanks.insert(b.to_owned());
        }
        if let Some(g) = &s.graph {
            if let Some(b) = g.as_blank() {
                blanks.insert(b.to_owned());
            }
        }
    }
    if blanks.is_empty() {
        return HashMap::new();
    }

    let mut signatures: HashMap<String, Vec<String>> = HashMap::new();
    for s in statements {
        let predicate = s.predicate.to_string();
        push_signature(
            &mut signatures,
            &s.subject,
            format!("S|{predicate}|{}", peer_key(&s.object)),
        );
        push_signature(
            &mut signatures,
            &s.object,
            format!("O|{predicate}|{}", peer_key(&s.subject)),
        );
        if let Some(g) = &s.graph {
            push_signature(
                &mut signatures,
                g,
                format!(
                    "G|{predicate}|{}|{}",
                    peer_key(&s.subject),
                    peer_key(&s.object)
                ),
            );
        }
    }

    let mut hashed: Vec<(String, String)> = blanks
        .into_iter()
        .map(|label| {
            let mut descriptors = signatures.remove(&label).unwrap_or_default();
            descriptors.sort();
            let mut hasher = Sha256::new();
            hasher.update(descriptors.join("\u{1}").as_bytes());
            (hex::encode(hasher.finalize()), label)
        })
        .collect();
    // Tuple order sorts by hash first; equal hashes (a symmetric neighborhood) tie-break by the
    // original label, giving a stable order without needing the full permutation search.
    hashed.sort();

    hashed
        .into_iter()
        .enumerate()
        .map(|(i, (_, original))| (original, format!("c{}", i + 1)))
        .collect()
}

fn remap_blank(node: Node, relabel: &HashMap<String, String>) -> Node {
    match node.as_blank() {
        Some(label) => match relabel.get(label) {
            Some(canonical) => Node::blank(canonical.clone()),
            None => node,
        },
        None => node,
    }
}

/// A sink that buffers every statement it sees, then on [`Sink::finish`] normalizes XSD literal
/// lexical forms and relabels every blank node deterministically before forwarding the result to
/// an inner sink. `Base`/`Prefix` events pass straight through.
///
/// Buffering the whole document is unavoidable: a blank node's canonical label can only be
/// computed once its complete neighborhood is known, so nothing can be forwarded statement by
/// statement the way every other pipeline sink here does.
pub struct Canonicalizer<S> {
    inner: S,
    buffered: Vec<Statement>,
}

impl<S: Sink> Canonicalizer<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffered: Vec::new(),
        }
    }
}

impl<S: Sink> Sink for Canonicalizer<S> {
    fn handle(&mut self, event: Event) -> Status {
        match event {
            Event::Base(uri) => self.inner.handle(Event::Base(uri)),
            Event::Prefix(name, uri) => self.inner.handle(Event::Prefix(name, uri)),
            Event::Statement(_flags, statement) => {
                let object = canonicalize_literal(statement.object);
                self.buffered.push(Statement {
                    object,
                    ..statement
                });
                Status::Success
            }
            // Abbreviation bookkeeping (anonymous/collection nesting) has no meaning once the
            // graph has been fully flattened and relabeled.
            Event::End(_) => Status::Success,
        }
    }

    fn finish(&mut self) -> Status {
        let relabel = canonical_blank_labels(&self.buffered);
        for statement in self.buffered.drain(..) {
            let subject = remap_blank(statement.subject, &relabel);
            let object = remap_blank(statement.object, &relabel);
            let graph = statement.graph.map(|g| remap_blank(g, &relabel));
            let mut canonical = Statement::new(subject, statement.predicate, object);
            if let Some(g) = graph {
                canonical = canonical.with_graph(g);
            }
            let status = self
                .inner
                .handle(Event::Statement(StatementFlags::default(), canonical));
            if status != Status::Success {
                return status;
            }
        }
        self.inner.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_core::model::{Model, ModelOptions};

    fn stmt(s: &str, p: &str, o: &str) -> Statement {
        Statement::new(Node::uri(s), Node::uri(p), Node::uri(o))
    }

    #[test]
    fn inserter_adds_statements_to_the_model() {
        let mut model = Model::new(ModelOptions::default());
        let mut inserter = Inserter::new(&mut model);
        let status = inserter.handle(Event::Statement(
            StatementFlags::default(),
            stmt("http://example.org/s", "http://example.org/p", "http://example.org/o"),
        ));
        assert_eq!(status, Status::Success);
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn filter_inclusive_only_passes_matching_statements() {
        let mut model = Model::new(ModelOptions::default());
        let pattern = Pattern::new().with_predicate(Node::uri("http://example.org/p"));
        {
            let inserter = Inserter::new(&mut model);
            let mut filter = Filter::new(inserter, pattern, FilterMode::Inclusive);
            filter.handle(Event::Statement(
                StatementFlags::default(),
                stmt("http://example.org/s", "http://example.org/p", "http://example.org/o"),
            ));
            filter.handle(Event::Statement(
                StatementFlags::default(),
                stmt("http://example.org/s", "http://example.org/q", "http://example.org/o"),
            ));
        }
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn tee_broadcasts_to_every_branch() {
        let mut a = Model::new(ModelOptions::default());
        let mut b = Model::new(ModelOptions::default());
        {
            let mut tee = Tee::new();
            tee.add(Box::new(Inserter::new(&mut a)));
            tee.add(Box::new(Inserter::new(&mut b)));
            tee.handle(Event::Statement(
                StatementFlags::default(),
                stmt("http://example.org/s", "http://example.org/p", "http://example.org/o"),
            ));
        }
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn canonicalizer_normalizes_integer_lexical_forms() {
        let mut model = Model::new(ModelOptions::default());
        {
            let inserter = Inserter::new(&mut model);
            let mut canon = Canonicalizer::new(inserter);
            let literal = Node::typed_literal("007", xsd::INTEGER);
            canon.handle(Event::Statement(
                StatementFlags::default(),
                Statement::new(Node::uri("http://example.org/s"), Node::uri("http://example.org/p"), literal),
            ));
            canon.finish();
        }
        let pattern = Pattern::new().with_object(Node::typed_literal("7", xsd::INTEGER));
        assert!(model.ask(&pattern));
    }

    #[test]
    fn canonicalizer_assigns_stable_labels_regardless_of_input_order() {
        let forward = vec![
            Statement::new(Node::uri("http://example.org/s"), Node::uri("http://example.org/p"), Node::blank("x")),
            Statement::new(Node::blank("x"), Node::uri("http://example.org/q"), Node::uri("http://example.org/o")),
        ];
        let backward = vec![forward[1].clone(), forward[0].clone()];
        let relabel_forward = canonical_blank_labels(&forward);
        let relabel_backward = canonical_blank_labels(&backward);
        assert_eq!(relabel_forward.get("x"), relabel_backward.get("x"));
    }
}
