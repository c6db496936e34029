#![doc = include_str!("../README.md")]
#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused_qualifications
)]

//! The glue crate: a per-thread [`World`], the [`Sink`] trait and its composable pipeline stages
//! ([`Inserter`], [`Filter`], [`Tee`], [`Canonicalizer`]), format detection ([`Syntax::guess`]),
//! and the public [`Reader`]/[`Writer`] wrappers that drive `rdf-turtle`'s lexer/grammar/writer
//! off a byte source or sink.

mod error;
mod format;
mod pipeline;
mod reader;
mod sink;
mod world;
mod writer;

pub use crate::error::ReadError;
pub use crate::format::{guess_syntax, Syntax};
pub use crate::pipeline::{Canonicalizer, Filter, FilterMode, Inserter, Tee};
pub use crate::reader::{Reader, ReaderOptions};
pub use crate::sink::Sink;
pub use crate::world::{LogLevel, LogRecord, World, WorldLimits};
pub use crate::writer::{Writer, WriterOptions};
