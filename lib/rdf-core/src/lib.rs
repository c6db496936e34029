#![doc = include_str!("../README.md")]
#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused_qualifications
)]

//! Core RDF data structures shared by the rest of the workspace: the [`Node`] tagged union,
//! the [`Environment`] (base IRI + prefix table), the [`Statement`]/[`Pattern`] pair, the
//! refcounted [`NodeSet`] interner, the [`Status`] taxonomy, and the indexed [`model::Model`].
//!
//! Parsing and serialization live in the sibling `rdf-turtle` crate; this crate only holds the
//! shapes they operate on.

mod env;
mod event;
mod interner;
pub mod model;
mod node;
mod statement;
mod status;
pub mod vocab;

pub use crate::env::Environment;
pub use crate::event::{Event, StatementFlags};
pub use crate::interner::NodeSet;
pub use crate::node::{Literal, Node, NodeError, NodeFlags};
pub use crate::statement::{Cursor, Pattern, Statement};
pub use crate::status::Status;
pub use oxilangtag::LanguageTagParseError;
pub use oxiri::IriParseError;
