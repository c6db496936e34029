//! Error types bridging this crate's `Result`-based surface to the cross-cutting [`Status`]
//! taxonomy the World/Reader/Writer API returns, per §7's propagation policy.

use std::io;

use rdf_core::Status;
use rdf_turtle::{TurtleParseError, TurtleSyntaxError, WriterError};

/// An error raised while driving a [`crate::reader::Reader`].
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The byte source returned an I/O error.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A grammatical violation in the input.
    #[error(transparent)]
    Syntax(#[from] TurtleSyntaxError),
    /// The parser's explicit state stack would have grown past its configured byte budget.
    #[error("parser stack exceeded its {limit}-byte budget at depth {depth}")]
    StackOverflow {
        /// The configured budget, in bytes.
        limit: usize,
        /// The nesting depth reached when the budget was exceeded.
        depth: usize,
    },
}

impl From<TurtleParseError> for ReadError {
    fn from(error: TurtleParseError) -> Self {
        match error {
            TurtleParseError::Io(e) => Self::Io(e),
            TurtleParseError::Syntax(e) => Self::Syntax(e),
        }
    }
}

impl From<&ReadError> for Status {
    fn from(error: &ReadError) -> Self {
        match error {
            // A blocking byte source only returns an I/O error for a genuine failure, never for
            // a clean "no more bytes yet" suspension (that case reads 0 bytes and is handled
            // before an error ever reaches here).
            ReadError::Io(_) => Self::NoData,
            ReadError::Syntax(_) => Self::BadSyntax,
            ReadError::StackOverflow { .. } => Self::Overflow,
        }
    }
}

impl From<ReadError> for Status {
    fn from(error: ReadError) -> Self {
        Self::from(&error)
    }
}

impl From<&WriterError> for Status {
    fn from(error: &WriterError) -> Self {
        match error {
            WriterError::Write(_) => Self::BadWrite,
            WriterError::BadText(_) => Self::BadText,
        }
    }
}
