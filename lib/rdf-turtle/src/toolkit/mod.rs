//! Reusable chunked lexer and rule-driven parser scaffolding shared by every Turtle-family
//! syntax (Turtle, TriG, N-Triples, N-Quads): this module provides the mechanics (buffering,
//! line/column tracking, error formatting), while [`crate::token`], [`crate::grammar`] and
//! [`crate::line`] supply the RDF-specific recognizer and state machine.

mod error;
mod lexer;
mod parser;

pub use self::error::{TextPosition, TurtleParseError, TurtleSyntaxError};
pub use self::lexer::{Lexer, TokenOrLineJump, TokenRecognizer, TokenRecognizerError};
pub use self::parser::{FromReadIterator, Parser, RuleRecognizer, RuleRecognizerError};
