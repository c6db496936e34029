use std::sync::Arc;

use oxiri::{Iri, IriParseError};

use crate::node::Node;
use crate::status::Status;

/// A base URI plus an ordered `prefix -> namespace` table.
///
/// Setting a prefix that is already bound replaces the prior mapping, matching the semantics of
/// a Turtle document re-declaring `@prefix` partway through. Prefix order is preserved (last
/// write wins in place, not by appending a shadowing entry) so a writer re-emitting the table
/// produces a stable, deterministic order.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Environment {
    base: Option<Arc<str>>,
    // Small by construction (a handful of prefixes per document); a `Vec` with linear lookup
    // keeps insertion order without pulling in an ordered-map dependency.
    prefixes: Vec<(Arc<str>, Arc<str>)>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: impl Into<Arc<str>>) -> Self {
        Self {
            base: Some(base.into()),
            prefixes: Vec::new(),
        }
    }

    #[inline]
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    pub fn set_base(&mut self, base: impl Into<Arc<str>>) {
        self.base = Some(base.into());
    }

    pub fn clear_base(&mut self) {
        self.base = None;
    }

    /// Binds `name` to `namespace`, replacing any prior binding of `name`.
    pub fn set_prefix(&mut self, name: impl Into<Arc<str>>, namespace: impl Into<Arc<str>>) {
        let name = name.into();
        let namespace = namespace.into();
        if let Some(slot) = self.prefixes.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = namespace;
        } else {
            self.prefixes.push((name, namespace));
        }
    }

    pub fn prefix(&self, name: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, ns)| ns.as_ref())
    }

    /// Iterates bound prefixes in declaration order (accounting for redefinition in place).
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(n, ns)| (n.as_ref(), ns.as_ref()))
    }

    /// Expands a `prefix:local` CURIE into a `Uri` node.
    ///
    /// Returns `Status::BadCurie` if `prefix` has no binding; this is the caller's cue to either
    /// fail (strict mode) or log a warning and drop the statement (lax mode), per the reader's
    /// propagation policy.
    pub fn resolve_curie(&self, prefix: &str, local: &str) -> Result<Node, Status> {
        let namespace = self.prefix(prefix).ok_or(Status::BadCurie)?;
        Ok(Node::uri(format!("{namespace}{local}")))
    }

    /// Resolves a possibly-relative IRI reference against the current base, as required at parse
    /// time by a reader that does not have the `relative` flag set.
    pub fn resolve_iri(&self, iri_ref: &str) -> Result<String, IriParseError> {
        match self.base.as_deref() {
            Some(base) => {
                let base = Iri::parse(base)?;
                Ok(base.resolve(iri_ref)?.into_inner())
            }
            None => {
                // No base: the reference must already be absolute.
                Iri::parse(iri_ref.to_string())?;
                Ok(iri_ref.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redefining_a_prefix_replaces_it_in_place() {
        let mut env = Environment::new();
        env.set_prefix("eg", "http://example.org/");
        env.set_prefix("other", "http://other.example/");
        env.set_prefix("eg", "http://example.net/");
        let names: Vec<_> = env.prefixes().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["eg", "other"]);
        assert_eq!(env.prefix("eg"), Some("http://example.net/"));
    }

    #[test]
    fn curie_expansion_uses_the_bound_namespace() {
        let mut env = Environment::new();
        env.set_prefix("eg", "http://example.org/");
        let node = env.resolve_curie("eg", "s").unwrap();
        assert_eq!(node.as_uri(), Some("http://example.org/s"));
    }

    #[test]
    fn undefined_prefix_is_bad_curie() {
        let env = Environment::new();
        assert_eq!(env.resolve_curie("eg", "s"), Err(Status::BadCurie));
    }

    #[test]
    fn relative_iri_resolves_against_base() {
        let env = Environment::with_base("http://example.org/a/b");
        assert_eq!(
            env.resolve_iri("../c").unwrap(),
            "http://example.org/c"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn environment_round_trips_through_json_preserving_prefix_order() {
        let mut env = Environment::with_base("http://example.org/");
        env.set_prefix("eg", "http://example.org/");
        env.set_prefix("other", "http://other.example/");
        let json = serde_json::to_string(&env).unwrap();
        let back: Environment = serde_json::from_str(&json).unwrap();
        assert_eq!(back.base(), Some("http://example.org/"));
        let names: Vec<_> = back.prefixes().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["eg", "other"]);
    }
}
