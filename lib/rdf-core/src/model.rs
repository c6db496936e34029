//! An indexed statement store with multiple key orders, grounded in the six-`BTreeSet`
//! `gspo`/`gpos`/`gosp`/`spog`/`posg`/`ospg` design used by this workspace's in-memory dataset
//! type, generalized to the [`Node`]/[`Statement`] shapes defined in this crate.

use std::collections::{BTreeSet, HashSet};

use crate::node::Node;
use crate::statement::{Pattern, Statement};
use crate::status::Status;

type StatementId = usize;

/// A graph name, with the default graph ordered before every named graph.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
enum GraphKey {
    Default,
    Named(Node),
}

impl GraphKey {
    fn of(graph: Option<&Node>) -> Self {
        match graph {
            None => Self::Default,
            Some(g) => Self::Named(g.clone()),
        }
    }
}

/// A bounded value for one index column: either an actual node/graph, or one of the two
/// sentinels used to build a range that covers "every value in this column", without requiring an
/// artificial minimum or maximum [`Node`] to exist.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
enum Bound<T: Ord> {
    NegInf,
    Value(T),
    PosInf,
}

macro_rules! index_key {
    ($name:ident, $($field:ident: $ty:ty),+) => {
        #[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
        struct $name {
            $($field: Bound<$ty>,)+
            id: StatementId,
        }
    };
}

index_key!(Gspo, graph: GraphKey, s: Node, p: Node, o: Node);
index_key!(Gpos, graph: GraphKey, p: Node, o: Node, s: Node);
index_key!(Gosp, graph: GraphKey, o: Node, s: Node, p: Node);
index_key!(Spog, s: Node, p: Node, o: Node, graph: GraphKey);
index_key!(Posg, p: Node, o: Node, s: Node, graph: GraphKey);
index_key!(Ospg, o: Node, s: Node, p: Node, graph: GraphKey);

/// Which of the six key orders best covers a query's bound fields.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Order {
    Gspo,
    Gpos,
    Gosp,
    Spog,
    Posg,
    Ospg,
}

/// Construction-time flags for a [`Model`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ModelOptions {
    /// Keep a fourth (graph) component per statement and deduplicate across graphs on wildcard
    /// graph queries.
    pub store_graphs: bool,
    /// Keep each statement's parse [`Cursor`](crate::statement::Cursor), if it has one.
    pub store_origins: bool,
}

/// An indexed, queryable set of [`Statement`]s.
///
/// Every insert and erase keeps all six internal indexes in lockstep, so `find` gives the same
/// results regardless of which index it happened to choose — the index-equivalence invariant.
pub struct Model {
    options: ModelOptions,
    arena: Vec<Option<Statement>>,
    keys: HashSet<(Node, Node, Node, GraphKey)>,
    gspo: BTreeSet<Gspo>,
    gpos: BTreeSet<Gpos>,
    gosp: BTreeSet<Gosp>,
    spog: BTreeSet<Spog>,
    posg: BTreeSet<Posg>,
    ospg: BTreeSet<Ospg>,
    version: u64,
}

/// A lazily-advancing handle into the results of [`Model::find`].
///
/// A `Cursor` snapshots the list of matching statement ids at the time of the call, plus the
/// model's version counter at that time. Dereferencing through [`Model::current`] after the model
/// has been mutated by anything other than this same cursor's own [`Model::erase`] call returns
/// `None`: the cursor is invalidated by mutation, per the model's iteration semantics.
pub struct Cursor {
    ids: Vec<StatementId>,
    pos: usize,
    captured_version: u64,
}

impl Cursor {
    /// Whether there are no more statements to visit (irrespective of invalidation).
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.ids.len()
    }

    /// Advances to the next matching statement.
    pub fn advance(&mut self) {
        if self.pos < self.ids.len() {
            self.pos += 1;
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(ModelOptions::default())
    }
}

impl Model {
    pub fn new(options: ModelOptions) -> Self {
        Self {
            options,
            arena: Vec::new(),
            keys: HashSet::new(),
            gspo: BTreeSet::new(),
            gpos: BTreeSet::new(),
            gosp: BTreeSet::new(),
            spog: BTreeSet::new(),
            posg: BTreeSet::new(),
            ospg: BTreeSet::new(),
            version: 0,
        }
    }

    pub fn options(&self) -> ModelOptions {
        self.options
    }

    /// The model's version counter, bumped on every successful insert or erase. Used by
    /// [`Cursor`] to detect invalidation.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Inserts `(s, p, o, g)` if it is not already present. Returns `Status::Success` if a new
    /// statement was added, `Status::Failure` if it was already present (this is the model's
    /// idempotent-insert behavior, not an error).
    pub fn add(&mut self, s: Node, p: Node, o: Node, g: Option<Node>) -> Status {
        let mut stmt = Statement::new(s, p, o);
        if let Some(g) = g {
            stmt = stmt.with_graph(g);
        }
        self.insert(stmt)
    }

    /// Inserts a fully-formed [`Statement`]. Same duplicate semantics as [`Self::add`]; if
    /// `store_origins` is not enabled, the statement's `origin` is dropped before storage.
    pub fn insert(&mut self, mut stmt: Statement) -> Status {
        if !self.options.store_origins {
            stmt.origin = None;
        }
        let graph = GraphKey::of(stmt.graph.as_ref());
        let key = (
            stmt.subject.clone(),
            stmt.predicate.clone(),
            stmt.object.clone(),
            graph.clone(),
        );
        if self.keys.contains(&key) {
            return Status::Failure;
        }
        let id = self.arena.len();
        let (s, p, o) = (stmt.subject.clone(), stmt.predicate.clone(), stmt.object.clone());
        self.arena.push(Some(stmt));
        self.keys.insert(key);
        self.gspo.insert(Gspo {
            graph: Bound::Value(graph.clone()),
            s: Bound::Value(s.clone()),
            p: Bound::Value(p.clone()),
            o: Bound::Value(o.clone()),
            id,
        });
        self.gpos.insert(Gpos {
            graph: Bound::Value(graph.clone()),
            p: Bound::Value(p.clone()),
            o: Bound::Value(o.clone()),
            s: Bound::Value(s.clone()),
            id,
        });
        self.gosp.insert(Gosp {
            graph: Bound::Value(graph.clone()),
            o: Bound::Value(o.clone()),
            s: Bound::Value(s.clone()),
            p: Bound::Value(p.clone()),
            id,
        });
        self.spog.insert(Spog {
            s: Bound::Value(s.clone()),
            p: Bound::Value(p.clone()),
            o: Bound::Value(o.clone()),
            graph: Bound::Value(graph.clone()),
            id,
        });
        self.posg.insert(Posg {
            p: Bound::Value(p.clone()),
            o: Bound::Value(o.clone()),
            s: Bound::Value(s.clone()),
            graph: Bound::Value(graph.clone()),
            id,
        });
        self.ospg.insert(Ospg {
            o: Bound::Value(o),
            s: Bound::Value(s),
            p: Bound::Value(p),
            graph: Bound::Value(graph),
            id,
        });
        self.version += 1;
        Status::Success
    }

    /// Removes the statement `cursor` currently points at, advances `cursor` to the next match,
    /// and invalidates every other live cursor into this model (their next [`Self::current`] call
    /// returns `None`).
    pub fn erase(&mut self, cursor: &mut Cursor) -> Status {
        if cursor.captured_version != self.version || cursor.is_exhausted() {
            return Status::Failure;
        }
        let id = cursor.ids[cursor.pos];
        let Some(stmt) = self.arena[id].take() else {
            return Status::NotFound;
        };
        let graph = GraphKey::of(stmt.graph.as_ref());
        let key = (
            stmt.subject.clone(),
            stmt.predicate.clone(),
            stmt.object.clone(),
            graph.clone(),
        );
        self.keys.remove(&key);
        self.gspo.retain(|e| e.id != id);
        self.gpos.retain(|e| e.id != id);
        self.gosp.retain(|e| e.id != id);
        self.spog.retain(|e| e.id != id);
        self.posg.retain(|e| e.id != id);
        self.ospg.retain(|e| e.id != id);
        self.version += 1;
        cursor.captured_version = self.version;
        cursor.ids.remove(cursor.pos);
        Status::Success
    }

    /// The statement a cursor currently points at, or `None` if the cursor is exhausted or has
    /// been invalidated by an intervening mutation of this model.
    pub fn current<'a>(&'a self, cursor: &Cursor) -> Option<&'a Statement> {
        if cursor.captured_version != self.version || cursor.is_exhausted() {
            return None;
        }
        self.arena[cursor.ids[cursor.pos]].as_ref()
    }

    fn choose_order(pattern: &Pattern) -> Order {
        let graph_bound = pattern.graph.as_ref().is_some_and(Option::is_some);
        let (s, p, o) = (
            pattern.subject.is_some(),
            pattern.predicate.is_some(),
            pattern.object.is_some(),
        );
        match (graph_bound, s, p, o) {
            (true, true, _, _) => Order::Gspo,
            (true, false, true, _) => Order::Gpos,
            (true, false, false, true) => Order::Gosp,
            (true, false, false, false) => Order::Gspo,
            (false, true, _, _) => Order::Spog,
            (false, false, true, _) => Order::Posg,
            (false, false, false, true) => Order::Ospg,
            (false, false, false, false) => Order::Spog,
        }
    }

    fn candidate_ids(&self, pattern: &Pattern) -> Vec<StatementId> {
        let g = pattern
            .graph
            .as_ref()
            .map(|g| GraphKey::of(g.as_ref()));
        let gb = || g.clone().map_or(Bound::NegInf, Bound::Value);
        let ge = || g.clone().map_or(Bound::PosInf, Bound::Value);
        let sb = |n: &Option<Node>| n.clone().map_or(Bound::NegInf, Bound::Value);
        let se = |n: &Option<Node>| n.clone().map_or(Bound::PosInf, Bound::Value);

        match Self::choose_order(pattern) {
            Order::Gspo => self
                .gspo
                .range(
                    Gspo { graph: gb(), s: sb(&pattern.subject), p: Bound::NegInf, o: Bound::NegInf, id: usize::MIN }
                        ..=Gspo { graph: ge(), s: se(&pattern.subject), p: Bound::PosInf, o: Bound::PosInf, id: usize::MAX },
                )
                .map(|e| e.id)
                .collect(),
            Order::Gpos => self
                .gpos
                .range(
                    Gpos { graph: gb(), p: sb(&pattern.predicate), o: Bound::NegInf, s: Bound::NegInf, id: usize::MIN }
                        ..=Gpos { graph: ge(), p: se(&pattern.predicate), o: Bound::PosInf, s: Bound::PosInf, id: usize::MAX },
                )
                .map(|e| e.id)
                .collect(),
            Order::Gosp => self
                .gosp
                .range(
                    Gosp { graph: gb(), o: sb(&pattern.object), s: Bound::NegInf, p: Bound::NegInf, id: usize::MIN }
                        ..=Gosp { graph: ge(), o: se(&pattern.object), s: Bound::PosInf, p: Bound::PosInf, id: usize::MAX },
                )
                .map(|e| e.id)
                .collect(),
            Order::Spog => self
                .spog
                .range(
                    Spog { s: sb(&pattern.subject), p: Bound::NegInf, o: Bound::NegInf, graph: Bound::NegInf, id: usize::MIN }
                        ..=Spog { s: se(&pattern.subject), p: Bound::PosInf, o: Bound::PosInf, graph: Bound::PosInf, id: usize::MAX },
                )
                .map(|e| e.id)
                .collect(),
            Order::Posg => self
                .posg
                .range(
                    Posg { p: sb(&pattern.predicate), o: Bound::NegInf, s: Bound::NegInf, graph: Bound::NegInf, id: usize::MIN }
                        ..=Posg { p: se(&pattern.predicate), o: Bound::PosInf, s: Bound::PosInf, graph: Bound::PosInf, id: usize::MAX },
                )
                .map(|e| e.id)
                .collect(),
            Order::Ospg => self
                .ospg
                .range(
                    Ospg { o: sb(&pattern.object), s: Bound::NegInf, p: Bound::NegInf, graph: Bound::NegInf, id: usize::MIN }
                        ..=Ospg { o: se(&pattern.object), s: Bound::PosInf, p: Bound::PosInf, graph: Bound::PosInf, id: usize::MAX },
                )
                .map(|e| e.id)
                .collect(),
        }
    }

    /// Returns a cursor over every statement matching `pattern`.
    ///
    /// When `pattern.graph` is the "any graph" wildcard (`None`) and `store_graphs` is enabled,
    /// statements that exist under multiple graphs are yielded once, per the model's
    /// default-graph deduplication rule.
    pub fn find(&self, pattern: &Pattern) -> Cursor {
        let dedup_across_graphs = self.options.store_graphs && pattern.graph.is_none();
        let mut seen = HashSet::new();
        let ids = self
            .candidate_ids(pattern)
            .into_iter()
            .filter(|&id| {
                let Some(stmt) = self.arena[id].as_ref() else {
                    return false;
                };
                if !stmt.matches(pattern) {
                    return false;
                }
                if dedup_across_graphs {
                    let key = (stmt.subject.clone(), stmt.predicate.clone(), stmt.object.clone());
                    if !seen.insert(key) {
                        return false;
                    }
                }
                true
            })
            .collect();
        Cursor {
            ids,
            pos: 0,
            captured_version: self.version,
        }
    }

    /// The number of statements matching `pattern`. Linear in the number of matches, as the
    /// number of matches themselves must be counted.
    pub fn count(&self, pattern: &Pattern) -> usize {
        let mut cursor = self.find(pattern);
        let mut n = 0;
        while self.current(&cursor).is_some() {
            n += 1;
            cursor.advance();
        }
        n
    }

    /// Whether any statement matches `pattern`. Checked against the chosen index directly rather
    /// than materializing the full match list.
    pub fn ask(&self, pattern: &Pattern) -> bool {
        self.candidate_ids(pattern)
            .into_iter()
            .filter_map(|id| self.arena[id].as_ref())
            .any(|stmt| stmt.matches(pattern))
    }

    /// The first statement matching `pattern`, if any.
    pub fn get_statement(&self, pattern: &Pattern) -> Option<&Statement> {
        self.candidate_ids(pattern)
            .into_iter()
            .filter_map(|id| self.arena[id].as_ref())
            .find(|stmt| stmt.matches(pattern))
    }

    /// The first matching statement's distinguished field: the one field `pattern` left as a
    /// wildcard, when exactly one is. Returns `None` if `pattern` binds every field (there is no
    /// field left to distinguish) or leaves more than one as a wildcard (which one to return
    /// would be ambiguous), if nothing matches, or if the single unbound field is the graph and
    /// the matching statement is itself in the default graph (which has no node to return).
    pub fn get(&self, pattern: &Pattern) -> Option<&Node> {
        let unbound = [
            pattern.subject.is_none(),
            pattern.predicate.is_none(),
            pattern.object.is_none(),
            pattern.graph.is_none(),
        ];
        if unbound.iter().filter(|&&b| b).count() != 1 {
            return None;
        }
        let stmt = self.get_statement(pattern)?;
        if unbound[0] {
            Some(&stmt.subject)
        } else if unbound[1] {
            Some(&stmt.predicate)
        } else if unbound[2] {
            Some(&stmt.object)
        } else {
            stmt.graph.as_ref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Pattern;

    fn uri(s: &str) -> Node {
        Node::uri(s)
    }

    #[test]
    fn idempotent_insert_returns_failure_on_repeat() {
        let mut model = Model::default();
        assert_eq!(model.add(uri("s"), uri("p"), uri("o"), None), Status::Success);
        assert_eq!(model.add(uri("s"), uri("p"), uri("o"), None), Status::Failure);
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn pattern_query_scenario_from_the_spec() {
        let mut model = Model::default();
        model.add(uri("s"), uri("p"), uri("o"), None);
        model.add(uri("s"), uri("p"), uri("o2"), None);

        let ask_pattern = Pattern::new().with_subject(uri("s")).with_predicate(uri("p"));
        assert!(model.ask(&ask_pattern));
        assert_eq!(model.count(&ask_pattern), 2);

        let empty_pattern = Pattern::new().with_object(uri("o3"));
        assert_eq!(model.count(&empty_pattern), 0);
    }

    #[test]
    fn find_is_index_independent() {
        let mut model = Model::default();
        model.add(uri("a"), uri("p"), uri("o"), None);
        model.add(uri("b"), uri("p"), uri("o"), None);
        let by_subject = model.count(&Pattern::new().with_subject(uri("a")));
        let by_predicate_object = model.count(&Pattern::new().with_predicate(uri("p")).with_object(uri("o")));
        assert_eq!(by_subject, 1);
        assert_eq!(by_predicate_object, 2);
    }

    #[test]
    fn erase_through_cursor_advances_and_invalidates_others() {
        let mut model = Model::default();
        model.add(uri("a"), uri("p"), uri("o"), None);
        model.add(uri("b"), uri("p"), uri("o"), None);
        let mut c1 = model.find(&Pattern::new().with_predicate(uri("p")));
        let c2 = model.find(&Pattern::new().with_predicate(uri("p")));
        assert!(model.current(&c1).is_some());
        model.erase(&mut c1);
        assert_eq!(model.len(), 1);
        // c1 remains valid (it performed the mutation itself).
        assert!(model.current(&c1).is_some() || c1.is_exhausted());
        // c2 was invalidated by a mutation it did not perform.
        assert!(model.current(&c2).is_none());
    }

    #[test]
    fn get_returns_the_single_unbound_fields_value() {
        let mut model = Model::default();
        model.add(uri("s"), uri("p"), uri("o"), None);
        let pattern = Pattern::new().with_subject(uri("s")).with_predicate(uri("p"));
        assert_eq!(model.get(&pattern), Some(&uri("o")));
    }

    #[test]
    fn get_returns_none_when_no_field_or_more_than_one_field_is_unbound() {
        let mut model = Model::default();
        model.add(uri("s"), uri("p"), uri("o"), None);
        let fully_bound = Pattern::new()
            .with_subject(uri("s"))
            .with_predicate(uri("p"))
            .with_object(uri("o"))
            .with_graph(None);
        assert_eq!(model.get(&fully_bound), None);

        let two_unbound = Pattern::new().with_subject(uri("s"));
        assert_eq!(model.get(&two_unbound), None);
    }

    #[test]
    fn default_graph_dedup_across_named_graphs() {
        let options = ModelOptions {
            store_graphs: true,
            store_origins: false,
        };
        let mut model = Model::new(options);
        model.add(uri("s"), uri("p"), uri("o"), Some(uri("g1")));
        model.add(uri("s"), uri("p"), uri("o"), Some(uri("g2")));
        assert_eq!(model.count(&Pattern::new().with_subject(uri("s"))), 1);
    }
}
