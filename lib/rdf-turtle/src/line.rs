//! The N-Triples/N-Quads grammar: one statement per `subject predicate object [graph] .` line,
//! with no prefixes, base URI, property lists or collections.
//!
//! Grounded on the reference workspace's shared `NQuadsRecognizer` (one state machine serving
//! both syntaxes, gated by `with_graph_name`), simplified because this crate's [`Token`] has
//! already dropped the N3/RDF-1.2 productions (`LongString`, quoted triples, directional language
//! tags) the reference lexer still emits in its `NTriples` mode.

use rdf_core::{Event, Node, Statement, StatementFlags};

use crate::token::{LexerOptions, Token, TurtleLexer};
use crate::toolkit::{RuleRecognizer, RuleRecognizerError};

/// Options threaded through a single N-Triples/N-Quads parse.
#[derive(Clone, Copy, Default)]
pub struct LineOptions {
    /// N-Quads: a fourth term may follow the object, naming the statement's graph.
    pub with_graph_name: bool,
    /// Accept recoverable syntax errors by skipping the offending line instead of failing the
    /// whole parse.
    pub lenient: bool,
}

enum State {
    ExpectSubject,
    ExpectPredicate {
        subject: Node,
    },
    ExpectObject {
        subject: Node,
        predicate: Node,
    },
    ExpectLiteralAnnotationOrGraphOrDot {
        subject: Node,
        predicate: Node,
        lexical: String,
    },
    ExpectLiteralDatatype {
        subject: Node,
        predicate: Node,
        lexical: String,
    },
    ExpectGraphOrDot {
        subject: Node,
        predicate: Node,
        object: Node,
    },
    ExpectDot,
}

/// The N-Triples/N-Quads rule recognizer. Produces one flagged [`Event::Statement`] per line;
/// there is never anything to abbreviate, so every [`StatementFlags`] is the default.
pub struct LineRecognizer {
    stack: Vec<State>,
    options: LineOptions,
    lexer_options: LexerOptions,
}

impl LineRecognizer {
    pub fn new(options: LineOptions) -> Self {
        Self {
            stack: vec![State::ExpectSubject],
            options,
            lexer_options: LexerOptions::default(),
        }
    }

    fn emit(
        &self,
        results: &mut Vec<Event>,
        subject: Node,
        predicate: Node,
        object: Node,
        graph: Option<Node>,
    ) {
        let mut statement = Statement::new(subject, predicate, object);
        if let Some(graph) = graph {
            statement = statement.with_graph(graph);
        }
        results.push(Event::Statement(StatementFlags::default(), statement));
    }
}

impl RuleRecognizer for LineRecognizer {
    type TokenRecognizer = TurtleLexer;
    type Output = Event;

    fn error_recovery_state(mut self) -> Self {
        self.stack.clear();
        self.stack.push(State::ExpectSubject);
        self
    }

    fn recognize_next(
        mut self,
        token: Token<'_>,
        results: &mut Vec<Event>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self {
        match self.stack.pop().unwrap_or(State::ExpectSubject) {
            State::ExpectSubject => match token {
                Token::IriRef(s) => {
                    self.stack.push(State::ExpectPredicate {
                        subject: Node::uri(s),
                    });
                    self
                }
                Token::BlankNodeLabel(s) => {
                    self.stack.push(State::ExpectPredicate {
                        subject: Node::blank(s.to_owned()),
                    });
                    self
                }
                _ => {
                    errors.push("The subject of a triple must be an IRI or a blank node".into());
                    self.error_recovery_state()
                }
            },
            State::ExpectPredicate { subject } => match token {
                Token::IriRef(p) => {
                    self.stack.push(State::ExpectObject {
                        subject,
                        predicate: Node::uri(p),
                    });
                    self
                }
                _ => {
                    errors.push("The predicate of a triple must be an IRI".into());
                    self.error_recovery_state()
                }
            },
            State::ExpectObject { subject, predicate } => match token {
                Token::IriRef(o) => {
                    self.stack.push(State::ExpectGraphOrDot {
                        subject,
                        predicate,
                        object: Node::uri(o),
                    });
                    self
                }
                Token::BlankNodeLabel(o) => {
                    self.stack.push(State::ExpectGraphOrDot {
                        subject,
                        predicate,
                        object: Node::blank(o.to_owned()),
                    });
                    self
                }
                Token::String(lexical) => {
                    self.stack.push(State::ExpectLiteralAnnotationOrGraphOrDot {
                        subject,
                        predicate,
                        lexical,
                    });
                    self
                }
                _ => {
                    errors.push(
                        "The object of a triple must be an IRI, a blank node or a literal".into(),
                    );
                    self.error_recovery_state()
                }
            },
            State::ExpectLiteralAnnotationOrGraphOrDot {
                subject,
                predicate,
                lexical,
            } => match token {
                Token::Punctuation("^^") => {
                    self.stack.push(State::ExpectLiteralDatatype {
                        subject,
                        predicate,
                        lexical,
                    });
                    self
                }
                Token::LangTag(tag) => match Node::lang_literal(lexical, tag) {
                    Ok(object) => {
                        self.stack.push(State::ExpectGraphOrDot {
                            subject,
                            predicate,
                            object,
                        });
                        self
                    }
                    Err(e) => {
                        errors.push(e.to_string().into());
                        self.error_recovery_state()
                    }
                },
                _ => {
                    let object = Node::plain_literal(lexical);
                    self.stack.push(State::ExpectGraphOrDot {
                        subject,
                        predicate,
                        object,
                    });
                    self.recognize_next(token, results, errors)
                }
            },
            State::ExpectLiteralDatatype {
                subject,
                predicate,
                lexical,
            } => match token {
                Token::IriRef(d) => {
                    let object = Node::typed_literal(lexical, d);
                    self.stack.push(State::ExpectGraphOrDot {
                        subject,
                        predicate,
                        object,
                    });
                    self
                }
                _ => {
                    errors.push("A literal datatype must be an IRI".into());
                    self.error_recovery_state()
                }
            },
            State::ExpectGraphOrDot {
                subject,
                predicate,
                object,
            } => {
                if self.options.with_graph_name {
                    match token {
                        Token::IriRef(g) => {
                            self.emit(results, subject, predicate, object, Some(Node::uri(g)));
                            self.stack.push(State::ExpectDot);
                            return self;
                        }
                        Token::BlankNodeLabel(g) => {
                            self.emit(
                                results,
                                subject,
                                predicate,
                                object,
                                Some(Node::blank(g.to_owned())),
                            );
                            self.stack.push(State::ExpectDot);
                            return self;
                        }
                        _ => {}
                    }
                }
                self.emit(results, subject, predicate, object, None);
                self.stack.push(State::ExpectDot);
                self.recognize_next(token, results, errors)
            }
            State::ExpectDot => {
                if let Token::Punctuation(".") = token {
                    self.stack.push(State::ExpectSubject);
                    self
                } else {
                    errors.push("Expected a '.' at the end of the line".into());
                    self.error_recovery_state()
                }
            }
        }
    }

    fn recognize_end(self, _results: &mut Vec<Event>, errors: &mut Vec<RuleRecognizerError>) {
        if !matches!(&*self.stack, [State::ExpectSubject] | []) {
            errors.push("Unexpected end of file, a triple or quad is incomplete".into());
        }
    }

    fn lexer_options(&self) -> &LexerOptions {
        &self.lexer_options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::{Lexer, Parser};
    use crate::token::LexerMode;

    fn try_parse(input: &str, with_graph_name: bool) -> Result<Vec<Event>, String> {
        let lexer = Lexer::new(
            TurtleLexer::new(LexerMode::NTriples, false),
            input.as_bytes().to_vec(),
            true,
            1024,
            1024 * 1024,
            Some(b"#"),
        );
        let recognizer = LineRecognizer::new(LineOptions {
            with_graph_name,
            lenient: false,
        });
        let mut parser = Parser::new(lexer, recognizer);
        let mut events = Vec::new();
        while !parser.is_end() {
            match parser.read_next() {
                Some(Ok(event)) => events.push(event),
                Some(Err(e)) => return Err(e.to_string()),
                None => break,
            }
        }
        Ok(events)
    }

    fn parse(input: &str, with_graph_name: bool) -> Vec<Event> {
        try_parse(input, with_graph_name).expect("unexpected syntax error")
    }

    #[test]
    fn parses_a_simple_triple() {
        let events = parse(
            "<http://example.com/s> <http://example.com/p> \"o\" .\n",
            false,
        );
        assert_eq!(events.len(), 1);
        let Event::Statement(flags, statement) = &events[0] else {
            panic!("expected a statement event")
        };
        assert_eq!(*flags, StatementFlags::default());
        assert_eq!(statement.object.as_literal().unwrap().lexical(), "o");
        assert!(statement.graph.is_none());
    }

    #[test]
    fn parses_a_quad_with_a_named_graph() {
        let events = parse(
            "<http://example.com/s> <http://example.com/p> <http://example.com/o> <http://example.com/g> .\n",
            true,
        );
        assert_eq!(events.len(), 1);
        let Event::Statement(_, statement) = &events[0] else {
            panic!("expected a statement event")
        };
        assert_eq!(
            statement.graph.as_ref().and_then(Node::as_uri),
            Some("http://example.com/g")
        );
    }

    #[test]
    fn parses_a_typed_literal() {
        let events = parse(
            "<http://example.com/s> <http://example.com/p> \"1\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n",
            false,
        );
        let Event::Statement(_, statement) = &events[0] else {
            panic!("expected a statement event")
        };
        let literal = statement.object.as_literal().unwrap();
        assert_eq!(
            literal.datatype(),
            Some("http://www.w3.org/2001/XMLSchema#integer")
        );
    }

    #[test]
    fn rejects_a_missing_dot() {
        let result = try_parse("<http://example.com/s> <http://example.com/p> \"o\"\n", false);
        assert!(result.is_err());
    }
}
