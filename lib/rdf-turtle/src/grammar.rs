//! The Turtle/TriG grammar: a recursive-descent recognizer driven by an explicit, heap-allocated
//! state stack rather than native recursion, so documents with arbitrarily deep blank-node
//! property lists or collections never grow the call stack.
//!
//! Grounded on the production structure of the reference workspace's `TriGRecognizer`
//! (`cur_subject`/`cur_predicate`/`cur_graph` threaded through an explicit state stack), rewritten
//! against this crate's [`RuleRecognizer`](crate::toolkit::RuleRecognizer) trait, which has no
//! separate `Context` type: everything a state needs travels as a field on that state's variant or
//! as a field of the recognizer itself.
//!
//! Blank-node property lists and collections are expanded eagerly into flat
//! [`rdf_core::Statement`]s (`rdf:first`/`rdf:rest`/`rdf:nil` chains for collections), the way the
//! reference recognizer does; the original nesting is not lost, though, since every statement that
//! opens one of these constructs carries a [`StatementFlags`] hint and the construct's close is
//! reported as a dedicated [`Event::End`], letting a writer reconstruct the abbreviated form on a
//! faithful round trip.

use std::sync::Arc;

use oxiri::Iri;
use rdf_core::{Environment, Event, Node, Statement, StatementFlags, Status};

use crate::token::{LexerOptions, Token, TurtleLexer};
use crate::toolkit::{RuleRecognizer, RuleRecognizerError};

const RDF_TYPE: &str = rdf_core::vocab::rdf::TYPE;
const RDF_FIRST: &str = rdf_core::vocab::rdf::FIRST;
const RDF_REST: &str = rdf_core::vocab::rdf::REST;
const RDF_NIL: &str = rdf_core::vocab::rdf::NIL;
const XSD_BOOLEAN: &str = rdf_core::vocab::xsd::BOOLEAN;
const XSD_INTEGER: &str = rdf_core::vocab::xsd::INTEGER;
const XSD_DECIMAL: &str = rdf_core::vocab::xsd::DECIMAL;
const XSD_DOUBLE: &str = rdf_core::vocab::xsd::DOUBLE;

/// Options threaded through a single parse, set once from the reader that owns this recognizer.
#[derive(Clone)]
pub struct GrammarOptions {
    /// TriG named-graph syntax (`GRAPH <g> { ... }`, bare `{ ... }`) instead of plain Turtle.
    pub with_graph_name: bool,
    /// Accept recoverable syntax errors (bad escapes, undefined prefixes) by skipping the
    /// offending statement instead of failing the whole parse.
    pub lenient: bool,
    /// Accept the SPARQL-style `?name` shorthand, read as a distinguished blank node.
    pub variables: bool,
    /// Preserve `prefix:local` CURIEs verbatim in the output instead of expanding them against
    /// the prefix table.
    pub prefixed: bool,
    /// Preserve user-written `_:label` blank node labels verbatim instead of scoping them to this
    /// document.
    pub global: bool,
    /// Preserve relative URI references verbatim instead of resolving them against the current
    /// base at parse time.
    pub relative: bool,
    /// Give reader-generated blank labels (anonymous nodes, collection cells) a prefix distinct
    /// from user-written ones, so the two can never collide even when `global` is set.
    pub generated_distinct: bool,
    /// The per-document prefix prepended to user blank labels when `global` is not set.
    pub doc_blank_prefix: Arc<str>,
    /// The initial base URI, if any.
    pub base: Option<String>,
    /// The deepest the explicit state stack may grow (one frame per nested `[ ... ]` or
    /// `( ... )`) before a [`RuleRecognizerError`] is raised instead of pushing further, the
    /// grammar half of the Reader's `stack_bytes` budget. `None` means unbounded.
    pub max_stack_depth: Option<usize>,
}

impl Default for GrammarOptions {
    fn default() -> Self {
        Self {
            with_graph_name: false,
            lenient: false,
            variables: false,
            prefixed: false,
            global: false,
            relative: false,
            generated_distinct: false,
            doc_blank_prefix: Arc::from(""),
            base: None,
            max_stack_depth: None,
        }
    }
}

/// What to do with a term once it has been fully read; threaded through `ExpectTerm` and the
/// nested-construct states so a `[ ... ]` or `( ... )` that appears several productions deep can
/// still report its result to whichever production asked for it.
#[derive(Clone)]
enum Continuation {
    /// The term becomes the subject of a (possibly TriG-graph-named) statement block.
    Subject {
        graph: Option<Node>,
        allow_graph_label: bool,
    },
    /// The term becomes the object of `(subject, predicate, _, graph)`. `subject_origin` flags
    /// the emitted statement's subject as a freshly opened anonymous node or collection the first
    /// time (and only the first time) a statement is emitted for that subject.
    Object {
        subject: Node,
        predicate: Node,
        graph: Option<Node>,
        ctx: SubjectContext,
        subject_origin: TermOrigin,
    },
    /// The term becomes the next `rdf:first` value of an in-progress collection.
    CollectionItem {
        cons: Node,
        head: Node,
        graph: Option<Node>,
        outer: Box<Continuation>,
    },
}

impl Continuation {
    fn graph(&self) -> Option<Node> {
        match self {
            Self::Subject { graph, .. }
            | Self::Object { graph, .. }
            | Self::CollectionItem { graph, .. } => graph.clone(),
        }
    }

    fn allows_literal(&self) -> bool {
        !matches!(self, Self::Subject { .. })
    }
}

/// What terminates the predicate-object list currently being read, and what to do once it does.
#[derive(Clone)]
enum SubjectContext {
    /// Top level (or inside a graph block): terminated by `.`; nothing further happens.
    TopLevel,
    /// Inside a `[ ... ]`: terminated by `]`; once closed, `blank` is fed to `continuation`.
    BlankPropertyList {
        blank: Node,
        continuation: Box<Continuation>,
    },
}

enum State {
    /// Top-level document, or the inside of a graph block if `graph` is not "TopLevel"-flavoured
    /// (distinguished by `allow_graph_label`/`in_graph_body`).
    Doc,
    GraphBody {
        graph: Option<Node>,
    },
    ExpectBaseIri {
        requires_dot: bool,
    },
    ExpectPrefixName {
        requires_dot: bool,
    },
    ExpectPrefixIri {
        requires_dot: bool,
        name: String,
    },
    ExpectDot,
    ExpectGraphName,
    ExpectOpenBrace {
        graph: Option<Node>,
    },
    AfterSubjectTerm {
        subject: Node,
        graph: Option<Node>,
        allow_graph_label: bool,
    },
    PredicateObjectList {
        subject: Node,
        graph: Option<Node>,
        ctx: SubjectContext,
        subject_origin: TermOrigin,
    },
    AfterObject {
        subject: Node,
        predicate: Node,
        graph: Option<Node>,
        ctx: SubjectContext,
    },
    ExpectTerm(Continuation),
    /// Just consumed `[`; `blank` is minted but we don't yet know if it has properties.
    BlankStart {
        blank: Node,
        continuation: Continuation,
    },
    CollectionBody {
        head: Option<Node>,
        last_cons: Option<Node>,
        graph: Option<Node>,
        continuation: Continuation,
    },
    LiteralAfterString {
        lexical: String,
        continuation: Continuation,
    },
    LiteralExpectDatatype {
        lexical: String,
        continuation: Continuation,
    },
}

/// Whether a subject or object term was just read verbatim from a single token, or was produced
/// by a `[ ... ]`/`( ... )` construct that should be flagged for the writer.
#[derive(Clone, Copy)]
pub(crate) enum TermOrigin {
    Plain,
    FreshAnon,
    FreshList,
}

/// The Turtle/TriG rule recognizer. Produces [`Event`]s directly: directive events for
/// `@base`/`@prefix`, a flagged [`Event::Statement`] per triple (flattening blank-node property
/// lists and collections as they are read), and an [`Event::End`] for every nested construct once
/// its last triple has been emitted.
pub struct TurtleRecognizer {
    stack: Vec<State>,
    env: Environment,
    lexer_options: LexerOptions,
    options: GrammarOptions,
    blank_counter: u64,
}

impl TurtleRecognizer {
    pub fn new(options: GrammarOptions) -> Self {
        let mut env = Environment::new();
        let mut lexer_options = LexerOptions {
            preserve_relative: options.relative,
            ..LexerOptions::default()
        };
        if let Some(base) = &options.base {
            env.set_base(base.clone());
            if let Ok(iri) = Iri::parse(base.clone()) {
                lexer_options.base_iri = Some(iri);
            }
        }
        Self {
            stack: vec![State::Doc],
            env,
            lexer_options,
            options,
            blank_counter: 0,
        }
    }

    fn fresh_blank(&mut self) -> Node {
        self.blank_counter += 1;
        let label = if self.options.generated_distinct {
            format!("g{}", self.blank_counter)
        } else {
            format!("b{}", self.blank_counter)
        };
        Node::blank(label)
    }

    fn scoped_user_label(&self, label: &str) -> Node {
        if self.options.global {
            Node::blank(label.to_owned())
        } else {
            Node::blank(format!("{}{label}", self.options.doc_blank_prefix))
        }
    }

    fn resolve_prefixed_name(
        &self,
        prefix: &str,
        local: &str,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Option<Node> {
        if self.options.prefixed {
            return Some(Node::curie(format!("{prefix}:{local}")));
        }
        match self.env.resolve_curie(prefix, local) {
            Ok(node) => Some(node),
            Err(Status::BadCurie) => {
                errors.push(format!("Undefined prefix '{prefix}:'").into());
                None
            }
            Err(_) => {
                errors.push("Invalid prefixed name".into());
                None
            }
        }
    }

    fn push_statement(
        &self,
        results: &mut Vec<Event>,
        flags: StatementFlags,
        subject: Node,
        predicate: Node,
        object: Node,
        graph: Option<Node>,
    ) {
        let mut statement = Statement::new(subject, predicate, object);
        if let Some(graph) = graph {
            statement = statement.with_graph(graph);
        }
        results.push(Event::Statement(flags, statement));
    }

    /// A term has been fully read; route it to whatever asked for it.
    fn apply_continuation(
        mut self,
        continuation: Continuation,
        term: Node,
        origin: TermOrigin,
        results: &mut Vec<Event>,
    ) -> Self {
        match continuation {
            Continuation::Subject {
                graph,
                allow_graph_label,
            } => {
                self.stack.push(State::AfterSubjectTerm {
                    subject: term,
                    graph,
                    allow_graph_label,
                });
            }
            Continuation::Object {
                subject,
                predicate,
                graph,
                ctx,
                subject_origin,
            } => {
                let mut flags = StatementFlags::default();
                match origin {
                    TermOrigin::Plain => {}
                    TermOrigin::FreshAnon => flags.start_anon_object = true,
                    TermOrigin::FreshList => flags.start_list_object = true,
                }
                match subject_origin {
                    TermOrigin::Plain => {}
                    TermOrigin::FreshAnon => flags.start_anon_subject = true,
                    TermOrigin::FreshList => flags.start_list_subject = true,
                }
                self.push_statement(
                    results,
                    flags,
                    subject.clone(),
                    predicate.clone(),
                    term,
                    graph.clone(),
                );
                self.stack.push(State::AfterObject {
                    subject,
                    predicate,
                    graph,
                    ctx,
                });
            }
            Continuation::CollectionItem {
                cons,
                head,
                graph,
                outer,
            } => {
                let flags = match origin {
                    TermOrigin::Plain => StatementFlags::default(),
                    TermOrigin::FreshAnon => StatementFlags {
                        start_anon_object: true,
                        ..StatementFlags::default()
                    },
                    TermOrigin::FreshList => StatementFlags {
                        start_list_object: true,
                        ..StatementFlags::default()
                    },
                };
                self.push_statement(
                    results,
                    flags,
                    cons.clone(),
                    Node::uri(RDF_FIRST),
                    term,
                    graph.clone(),
                );
                self.stack.push(State::CollectionBody {
                    head: Some(head),
                    last_cons: Some(cons),
                    graph,
                    continuation: *outer,
                });
            }
        }
        self
    }

    fn start_subject_predicate_object_list(
        mut self,
        subject: Node,
        graph: Option<Node>,
        ctx: SubjectContext,
        subject_origin: TermOrigin,
        token: Token<'_>,
        results: &mut Vec<Event>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        self.stack.push(State::PredicateObjectList {
            subject,
            graph,
            ctx,
            subject_origin,
        });
        self.recognize_next(token, results, errors)
    }

    /// Closes a predicate-object list's subject context, emitting `Event::End` for an anonymous
    /// or collection subject and handing control back to whatever opened it.
    fn close_subject_context(mut self, ctx: SubjectContext, results: &mut Vec<Event>) -> Self {
        match ctx {
            SubjectContext::TopLevel => self,
            SubjectContext::BlankPropertyList {
                blank,
                continuation,
            } => {
                results.push(Event::End(blank.clone()));
                self = self.apply_continuation(*continuation, blank, TermOrigin::Plain, results);
                self
            }
        }
    }
}

impl RuleRecognizer for TurtleRecognizer {
    type TokenRecognizer = TurtleLexer;
    type Output = Event;

    fn error_recovery_state(mut self) -> Self {
        self.stack.clear();
        self.stack.push(State::Doc);
        self
    }

    fn lexer_options(&self) -> &LexerOptions {
        &self.lexer_options
    }

    fn recognize_end(mut self, _results: &mut Vec<Event>, errors: &mut Vec<RuleRecognizerError>) {
        match self.stack.pop() {
            None | Some(State::Doc) => {}
            Some(_) => errors.push("Unexpected end of file".into()),
        }
    }

    fn recognize_next(
        mut self,
        token: Token<'_>,
        results: &mut Vec<Event>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        if let Some(max_depth) = self.options.max_stack_depth {
            if self.stack.len() > max_depth {
                errors.push(crate::STACK_OVERFLOW_MESSAGE.into());
                return self.error_recovery_state();
            }
        }
        // In lenient mode a recognizer-level error (e.g. an undefined CURIE prefix, a
        // malformed predicate) is dropped at statement granularity rather than left to
        // surface as a hard parse failure: reset to `State::Doc` and resume at the next
        // top-level production, the grammar's half of §7's "drop the offending production
        // and continue at the next statement boundary" lax-mode policy.
        if self.options.lenient {
            let errors_before = errors.len();
            let next = self.recognize_next_checked(token, results, errors);
            return if errors.len() > errors_before {
                next.error_recovery_state()
            } else {
                next
            };
        }
        self.recognize_next_checked(token, results, errors)
    }
}

impl TurtleRecognizer {
    fn recognize_next_checked(
        mut self,
        token: Token<'_>,
        results: &mut Vec<Event>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        let Some(state) = self.stack.pop() else {
            errors.push("Unexpected extra content after the end of the document".into());
            self.stack.push(State::Doc);
            return self;
        };
        match state {
            State::Doc => self.recognize_doc(token, results, errors),
            State::GraphBody { graph } => self.recognize_graph_body(graph, token, results, errors),
            State::ExpectBaseIri { requires_dot } => {
                self.recognize_base_iri(requires_dot, token, results, errors)
            }
            State::ExpectPrefixName { requires_dot } => {
                self.recognize_prefix_name(requires_dot, token, errors)
            }
            State::ExpectPrefixIri { requires_dot, name } => {
                self.recognize_prefix_iri(requires_dot, name, token, results, errors)
            }
            State::ExpectDot => {
                if !matches!(token, Token::Punctuation(".")) {
                    errors.push("Expected '.' to end the directive".into());
                }
                self
            }
            State::ExpectGraphName => self.recognize_graph_name(token, errors),
            State::ExpectOpenBrace { graph } => {
                if matches!(token, Token::Punctuation("{")) {
                    self.stack.push(State::GraphBody { graph });
                } else {
                    errors.push("Expected '{' to open a graph block".into());
                }
                self
            }
            State::AfterSubjectTerm {
                subject,
                graph,
                allow_graph_label,
            } => self.recognize_after_subject_term(
                subject,
                graph,
                allow_graph_label,
                token,
                results,
                errors,
            ),
            State::PredicateObjectList {
                subject,
                graph,
                ctx,
                subject_origin,
            } => self.recognize_predicate_object_list(
                subject,
                graph,
                ctx,
                subject_origin,
                token,
                results,
                errors,
            ),
            State::AfterObject {
                subject,
                predicate,
                graph,
                ctx,
            } => self.recognize_after_object(subject, predicate, graph, ctx, token, results, errors),
            State::ExpectTerm(continuation) => {
                self.recognize_term(continuation, token, results, errors)
            }
            State::BlankStart {
                blank,
                continuation,
            } => self.recognize_blank_start(blank, continuation, token, results, errors),
            State::CollectionBody {
                head,
                last_cons,
                graph,
                continuation,
            } => self.recognize_collection_body(
                head,
                last_cons,
                graph,
                continuation,
                token,
                results,
                errors,
            ),
            State::LiteralAfterString {
                lexical,
                continuation,
            } => self.recognize_literal_after_string(lexical, continuation, token, results, errors),
            State::LiteralExpectDatatype {
                lexical,
                continuation,
            } => self.recognize_literal_datatype(lexical, continuation, token, results, errors),
        }
    }
}

fn is_keyword(token: &Token<'_>, word: &str) -> bool {
    matches!(token, Token::PlainKeyword(k) if k.eq_ignore_ascii_case(word))
}

impl TurtleRecognizer {
    fn recognize_doc(
        mut self,
        token: Token<'_>,
        results: &mut Vec<Event>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        match token {
            Token::LangTag("prefix") => {
                self.stack.push(State::ExpectPrefixName { requires_dot: true });
                self
            }
            Token::LangTag("base") => {
                self.stack.push(State::ExpectBaseIri { requires_dot: true });
                self
            }
            _ if is_keyword(&token, "prefix") => {
                self.stack
                    .push(State::ExpectPrefixName { requires_dot: false });
                self
            }
            _ if is_keyword(&token, "base") => {
                self.stack
                    .push(State::ExpectBaseIri { requires_dot: false });
                self
            }
            _ if self.options.with_graph_name && is_keyword(&token, "graph") => {
                self.stack.push(State::ExpectGraphName);
                self
            }
            Token::Punctuation("{") if self.options.with_graph_name => {
                self.stack.push(State::GraphBody { graph: None });
                self
            }
            _ => {
                self.stack.push(State::Doc);
                self.stack.push(State::ExpectTerm(Continuation::Subject {
                    graph: None,
                    allow_graph_label: true,
                }));
                self.recognize_next(token, results, errors)
            }
        }
    }

    fn recognize_graph_body(
        mut self,
        graph: Option<Node>,
        token: Token<'_>,
        results: &mut Vec<Event>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        if matches!(token, Token::Punctuation("}")) {
            return self;
        }
        self.stack.push(State::GraphBody { graph: graph.clone() });
        self.stack.push(State::ExpectTerm(Continuation::Subject {
            graph,
            allow_graph_label: false,
        }));
        self.recognize_next(token, results, errors)
    }

    fn recognize_base_iri(
        mut self,
        requires_dot: bool,
        token: Token<'_>,
        results: &mut Vec<Event>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        let Token::IriRef(iri) = token else {
            errors.push("Expected an IRI after BASE".into());
            return self;
        };
        self.env.set_base(iri.clone());
        self.lexer_options.base_iri = Iri::parse(iri.clone()).ok();
        results.push(Event::Base(iri));
        if requires_dot {
            self.stack.push(State::ExpectDot);
        }
        self
    }

    fn recognize_prefix_name(
        mut self,
        requires_dot: bool,
        token: Token<'_>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        match token {
            Token::PrefixedName { prefix, local, .. } if local.is_empty() => {
                self.stack.push(State::ExpectPrefixIri {
                    requires_dot,
                    name: prefix.to_owned(),
                });
            }
            _ => errors.push("Expected a prefix name ending with ':'".into()),
        }
        self
    }

    fn recognize_prefix_iri(
        mut self,
        requires_dot: bool,
        name: String,
        token: Token<'_>,
        results: &mut Vec<Event>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        let Token::IriRef(iri) = token else {
            errors.push("Expected an IRI for the prefix namespace".into());
            return self;
        };
        self.env.set_prefix(name.clone(), iri.clone());
        results.push(Event::Prefix(name, iri));
        if requires_dot {
            self.stack.push(State::ExpectDot);
        }
        self
    }

    fn recognize_graph_name(
        mut self,
        token: Token<'_>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        let node = match token {
            Token::IriRef(iri) => Some(Node::uri(iri)),
            Token::PrefixedName { prefix, local, .. } => {
                self.resolve_prefixed_name(prefix, &local, errors)
            }
            Token::BlankNodeLabel(label) => Some(self.scoped_user_label(label)),
            _ => {
                errors.push("Expected a graph name".into());
                None
            }
        };
        if let Some(node) = node {
            self.stack.push(State::ExpectOpenBrace { graph: Some(node) });
        }
        self
    }

    fn recognize_after_subject_term(
        mut self,
        subject: Node,
        graph: Option<Node>,
        allow_graph_label: bool,
        token: Token<'_>,
        results: &mut Vec<Event>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        if allow_graph_label && self.options.with_graph_name && matches!(token, Token::Punctuation("{"))
        {
            self.stack.push(State::GraphBody { graph: Some(subject) });
            return self;
        }
        self.start_subject_predicate_object_list(
            subject,
            graph,
            SubjectContext::TopLevel,
            TermOrigin::Plain,
            token,
            results,
            errors,
        )
    }

    fn recognize_predicate_object_list(
        mut self,
        subject: Node,
        graph: Option<Node>,
        ctx: SubjectContext,
        subject_origin: TermOrigin,
        token: Token<'_>,
        results: &mut Vec<Event>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        if is_end_of_predicate_object_list(&ctx, &token) {
            return self.close_subject_context(ctx, results);
        }
        let predicate = match &token {
            Token::PlainKeyword("a") => Some(Node::uri(RDF_TYPE)),
            Token::IriRef(iri) => Some(Node::uri(iri.clone())),
            Token::PrefixedName { prefix, local, .. } => {
                self.resolve_prefixed_name(prefix, local, errors)
            }
            _ => {
                errors.push("Expected a predicate".into());
                None
            }
        };
        let Some(predicate) = predicate else {
            return self;
        };
        self.stack.push(State::ExpectTerm(Continuation::Object {
            subject,
            predicate,
            graph,
            ctx,
            subject_origin,
        }));
        self
    }

    fn recognize_after_object(
        mut self,
        subject: Node,
        predicate: Node,
        graph: Option<Node>,
        ctx: SubjectContext,
        token: Token<'_>,
        results: &mut Vec<Event>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        match token {
            Token::Punctuation(",") => {
                self.stack.push(State::ExpectTerm(Continuation::Object {
                    subject,
                    predicate,
                    graph,
                    ctx,
                    subject_origin: TermOrigin::Plain,
                }));
                self
            }
            Token::Punctuation(";") => {
                self.stack.push(State::PredicateObjectList {
                    subject,
                    graph,
                    ctx,
                    subject_origin: TermOrigin::Plain,
                });
                self
            }
            _ if is_end_of_predicate_object_list(&ctx, &token) => {
                self.close_subject_context(ctx, results)
            }
            _ => {
                errors.push("Expected ',', ';' or the end of the statement".into());
                self
            }
        }
    }

    fn recognize_term(
        mut self,
        continuation: Continuation,
        token: Token<'_>,
        results: &mut Vec<Event>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        let allow_literal = continuation.allows_literal();
        match token {
            Token::IriRef(iri) => {
                self.apply_continuation(continuation, Node::uri(iri), TermOrigin::Plain, results)
            }
            Token::PrefixedName { prefix, local, .. } => {
                match self.resolve_prefixed_name(prefix, &local, errors) {
                    Some(node) => {
                        self.apply_continuation(continuation, node, TermOrigin::Plain, results)
                    }
                    None => self,
                }
            }
            Token::BlankNodeLabel(label) => {
                let node = self.scoped_user_label(label);
                self.apply_continuation(continuation, node, TermOrigin::Plain, results)
            }
            Token::Variable(name) if self.options.variables => {
                let node = self.scoped_user_label(&format!("var-{name}"));
                self.apply_continuation(continuation, node, TermOrigin::Plain, results)
            }
            Token::Punctuation("[") => {
                let blank = self.fresh_blank();
                self.stack.push(State::BlankStart {
                    blank,
                    continuation,
                });
                self
            }
            Token::Punctuation("(") => {
                let graph = continuation.graph();
                self.stack.push(State::CollectionBody {
                    head: None,
                    last_cons: None,
                    graph,
                    continuation,
                });
                self
            }
            Token::String(s) | Token::LongString(s) if allow_literal => {
                self.stack.push(State::LiteralAfterString {
                    lexical: s,
                    continuation,
                });
                self
            }
            Token::Integer(s) if allow_literal => self.apply_continuation(
                continuation,
                Node::typed_literal(s, XSD_INTEGER),
                TermOrigin::Plain,
                results,
            ),
            Token::Decimal(s) if allow_literal => self.apply_continuation(
                continuation,
                Node::typed_literal(s, XSD_DECIMAL),
                TermOrigin::Plain,
                results,
            ),
            Token::Double(s) if allow_literal => self.apply_continuation(
                continuation,
                Node::typed_literal(s, XSD_DOUBLE),
                TermOrigin::Plain,
                results,
            ),
            Token::PlainKeyword(k @ ("true" | "false")) if allow_literal => self
                .apply_continuation(
                    continuation,
                    Node::typed_literal(k, XSD_BOOLEAN),
                    TermOrigin::Plain,
                    results,
                ),
            _ => {
                errors.push("Expected a subject, predicate, object or collection item".into());
                self
            }
        }
    }

    fn recognize_blank_start(
        mut self,
        blank: Node,
        continuation: Continuation,
        token: Token<'_>,
        results: &mut Vec<Event>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        if matches!(token, Token::Punctuation("]")) {
            return self.apply_continuation(continuation, blank, TermOrigin::FreshAnon, results);
        }
        let graph = continuation.graph();
        self.stack.push(State::PredicateObjectList {
            subject: blank.clone(),
            graph,
            ctx: SubjectContext::BlankPropertyList {
                blank,
                continuation: Box::new(continuation),
            },
            subject_origin: TermOrigin::FreshAnon,
        });
        self.recognize_next(token, results, errors)
    }

    fn recognize_collection_body(
        mut self,
        head: Option<Node>,
        last_cons: Option<Node>,
        graph: Option<Node>,
        continuation: Continuation,
        token: Token<'_>,
        results: &mut Vec<Event>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        if matches!(token, Token::Punctuation(")")) {
            let result = match (head, last_cons) {
                (Some(head), Some(last_cons)) => {
                    self.push_statement(
                        results,
                        StatementFlags::default(),
                        last_cons,
                        Node::uri(RDF_REST),
                        Node::uri(RDF_NIL),
                        graph,
                    );
                    (head, TermOrigin::FreshList)
                }
                _ => (Node::uri(RDF_NIL), TermOrigin::Plain),
            };
            return self.apply_continuation(continuation, result.0, result.1, results);
        }
        let cons = self.fresh_blank();
        if let Some(prev) = &last_cons {
            self.push_statement(
                results,
                StatementFlags::default(),
                prev.clone(),
                Node::uri(RDF_REST),
                cons.clone(),
                graph.clone(),
            );
        }
        let head = head.unwrap_or_else(|| cons.clone());
        self.stack.push(State::ExpectTerm(Continuation::CollectionItem {
            cons,
            head,
            graph,
            outer: Box::new(continuation),
        }));
        self.recognize_next(token, results, errors)
    }

    fn recognize_literal_after_string(
        mut self,
        lexical: String,
        continuation: Continuation,
        token: Token<'_>,
        results: &mut Vec<Event>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        match token {
            Token::Punctuation("^^") => {
                self.stack.push(State::LiteralExpectDatatype {
                    lexical,
                    continuation,
                });
                self
            }
            Token::LangTag(tag) => match Node::lang_literal(lexical, tag) {
                Ok(node) => self.apply_continuation(continuation, node, TermOrigin::Plain, results),
                Err(e) => {
                    errors.push(e.to_string().into());
                    self
                }
            },
            _ => {
                let node = Node::plain_literal(lexical);
                self = self.apply_continuation(continuation, node, TermOrigin::Plain, results);
                self.recognize_next(token, results, errors)
            }
        }
    }

    fn recognize_literal_datatype(
        mut self,
        lexical: String,
        continuation: Continuation,
        token: Token<'_>,
        results: &mut Vec<Event>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        let datatype = match token {
            Token::IriRef(iri) => Some(iri),
            Token::PrefixedName { prefix, local, .. } => self
                .resolve_prefixed_name(prefix, &local, errors)
                .and_then(|n| n.as_uri().map(str::to_owned)),
            _ => {
                errors.push("Expected a datatype IRI after '^^'".into());
                None
            }
        };
        match datatype {
            Some(datatype) => {
                let node = Node::typed_literal(lexical, datatype);
                self.apply_continuation(continuation, node, TermOrigin::Plain, results)
            }
            None => self,
        }
    }
}

fn is_end_of_predicate_object_list(ctx: &SubjectContext, token: &Token<'_>) -> bool {
    match ctx {
        SubjectContext::TopLevel => matches!(token, Token::Punctuation(".")),
        SubjectContext::BlankPropertyList { .. } => matches!(token, Token::Punctuation("]")),
    }
}
