use crate::toolkit::error::{TextPosition, TurtleParseError, TurtleSyntaxError};
use crate::toolkit::lexer::{Lexer, TokenOrLineJump, TokenRecognizer};
use std::io::{self, Read};

/// The state machine driven by a [`Parser`]: given the next token, it decides what to do with it
/// (push results, push errors, transition to a new state).
pub trait RuleRecognizer: Sized {
    type TokenRecognizer: TokenRecognizer;
    type Output;

    fn error_recovery_state(self) -> Self;

    fn recognize_next(
        self,
        token: <Self::TokenRecognizer as TokenRecognizer>::Token<'_>,
        results: &mut Vec<Self::Output>,
        errors: &mut Vec<RuleRecognizerError>,
    ) -> Self;

    fn recognize_end(self, results: &mut Vec<Self::Output>, errors: &mut Vec<RuleRecognizerError>);

    fn lexer_options(&self) -> &<Self::TokenRecognizer as TokenRecognizer>::Options;
}

pub struct RuleRecognizerError {
    pub message: String,
}

impl<S: Into<String>> From<S> for RuleRecognizerError {
    fn from(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Drives a [`RuleRecognizer`] state machine off a chunked byte source, turning lexer tokens into
/// output values one `read_next` call at a time.
pub struct Parser<RR: RuleRecognizer> {
    lexer: Lexer<Vec<u8>, RR::TokenRecognizer>,
    state: Option<RR>,
    results: Vec<RR::Output>,
    errors: Vec<RuleRecognizerError>,
    default_lexer_options: <RR::TokenRecognizer as TokenRecognizer>::Options,
}

impl<RR: RuleRecognizer> Parser<RR> {
    pub fn new(lexer: Lexer<Vec<u8>, RR::TokenRecognizer>, recognizer: RR) -> Self {
        Self {
            lexer,
            state: Some(recognizer),
            results: vec![],
            errors: vec![],
            default_lexer_options: <RR::TokenRecognizer as TokenRecognizer>::Options::default(),
        }
    }

    pub fn extend_from_slice(&mut self, other: &[u8]) {
        self.lexer.extend_from_slice(other);
    }

    #[inline]
    pub fn end(&mut self) {
        self.lexer.end();
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.state.is_none() && self.results.is_empty() && self.errors.is_empty()
    }

    pub fn read_next(&mut self) -> Option<Result<RR::Output, TurtleSyntaxError>> {
        loop {
            // FIFO: a single token can make a recognizer push more than one result (closing a
            // collection also completes the statement that contains it), and callers depend on
            // seeing them in the order they were produced.
            if !self.errors.is_empty() {
                let error = self.errors.remove(0);
                return Some(Err(TurtleSyntaxError::new(
                    self.lexer.last_token_location(),
                    error.message.replace("TOKEN", &self.lexer.last_token_source()),
                )));
            }
            if !self.results.is_empty() {
                return Some(Ok(self.results.remove(0)));
            }
            let options = self
                .state
                .as_ref()
                .map_or(&self.default_lexer_options, RuleRecognizer::lexer_options);
            match self.lexer.parse_next(options) {
                Some(Ok(TokenOrLineJump::Token(token))) => {
                    self.state = self.state.take().map(|state| {
                        state.recognize_next(token, &mut self.results, &mut self.errors)
                    });
                    continue;
                }
                Some(Ok(TokenOrLineJump::LineJump)) => continue,
                Some(Err(e)) => {
                    self.state = self.state.take().map(RuleRecognizer::error_recovery_state);
                    return Some(Err(e));
                }
                None => {
                    if self.lexer.is_end() {
                        if let Some(state) = self.state.take() {
                            state.recognize_end(&mut self.results, &mut self.errors);
                            continue;
                        }
                        return None;
                    }
                    return None;
                }
            }
        }
    }

    pub fn parse_read<R: Read>(self, read: R) -> FromReadIterator<R, RR> {
        FromReadIterator { read, parser: self }
    }

    /// The location of the most recently lexed token, for a caller (rdf-io's `Reader`) that wants
    /// to stamp an emitted statement with the [`Cursor`](rdf_core::Cursor) it was parsed from.
    pub fn last_token_location(&self) -> std::ops::Range<TextPosition> {
        self.lexer.last_token_location()
    }

    pub fn extend_from_reader<R: Read>(&mut self, reader: &mut R) -> io::Result<()> {
        self.lexer.extend_from_reader(reader)
    }
}

pub struct FromReadIterator<R: Read, RR: RuleRecognizer> {
    read: R,
    parser: Parser<RR>,
}

impl<R: Read, RR: RuleRecognizer> Iterator for FromReadIterator<R, RR> {
    type Item = Result<RR::Output, TurtleParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.parser.is_end() {
            if let Some(result) = self.parser.read_next() {
                return Some(result.map_err(TurtleParseError::Syntax));
            }
            if let Err(e) = self.parser.lexer.extend_from_reader(&mut self.read) {
                return Some(Err(e.into()));
            }
        }
        None
    }
}
