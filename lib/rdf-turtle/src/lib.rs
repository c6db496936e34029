#![doc = include_str!("../README.md")]
#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused_qualifications
)]

//! The Turtle/TriG grammar and the N-Triples/N-Quads subset, plus the abbreviating writer that
//! serializes [`rdf_core::Event`]s back out. [`toolkit`] is the reusable chunked-lexer/rule-driven
//! parser scaffolding the other modules are built on.

mod grammar;
mod line;
pub mod toolkit;
mod token;
mod writer;

pub use crate::grammar::{GrammarOptions, TurtleRecognizer};
pub use crate::line::{LineOptions, LineRecognizer};
pub use crate::token::{LexerMode, LexerOptions, Token, TurtleLexer};
pub use crate::toolkit::{
    FromReadIterator, Parser, RuleRecognizer, RuleRecognizerError, TextPosition, TurtleParseError,
    TurtleSyntaxError,
};
pub use crate::writer::{LineWriter, TurtleWriter, WriterError, WriterOptions};

pub(crate) const MIN_BUFFER_SIZE: usize = 4096;
pub(crate) const MAX_BUFFER_SIZE: usize = 4096 * 4096;

/// The [`TurtleSyntaxError::message`] text raised when [`GrammarOptions::max_stack_depth`] is
/// exceeded, so a caller (rdf-io's `Reader`) can distinguish a stack-budget overflow from an
/// ordinary grammar error without the grammar needing its own parallel error type.
pub const STACK_OVERFLOW_MESSAGE: &str = "parser stack exceeded its configured depth budget";

/// Builds a [`Parser`] for the Turtle/TriG grammar, ready to be fed bytes incrementally via
/// [`Parser::extend_from_slice`]/[`Lexer::extend_from_reader`](crate::toolkit::Lexer).
///
/// `block_size` seeds the lexer's growable buffer (clamped between this crate's internal
/// `MIN_BUFFER_SIZE`/`MAX_BUFFER_SIZE`), matching how a caller-chosen chunk size from
/// `Reader::start` (rdf-io) trades memory for fewer read syscalls.
pub fn new_turtle_parser(options: GrammarOptions, block_size: usize) -> Parser<TurtleRecognizer> {
    let lenient = options.lenient;
    let buffer_size = block_size.clamp(MIN_BUFFER_SIZE, MAX_BUFFER_SIZE);
    let lexer = toolkit::Lexer::new(
        TurtleLexer::new(LexerMode::Turtle, lenient),
        Vec::new(),
        false,
        buffer_size,
        MAX_BUFFER_SIZE,
        Some(b"#"),
    );
    Parser::new(lexer, TurtleRecognizer::new(options))
}

/// Builds a [`Parser`] for the flat N-Triples/N-Quads grammar. See [`new_turtle_parser`].
pub fn new_line_parser(options: LineOptions, block_size: usize) -> Parser<LineRecognizer> {
    let lenient = options.lenient;
    let buffer_size = block_size.clamp(MIN_BUFFER_SIZE, MAX_BUFFER_SIZE);
    let lexer = toolkit::Lexer::new(
        TurtleLexer::new(LexerMode::NTriples, lenient),
        Vec::new(),
        false,
        buffer_size,
        MAX_BUFFER_SIZE,
        Some(b"#"),
    );
    Parser::new(lexer, LineRecognizer::new(options))
}
