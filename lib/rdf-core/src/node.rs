use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use oxilangtag::{LanguageTag, LanguageTagParseError};

use crate::vocab::rdf;

/// Cached properties of a node's textual content, computed once at construction time.
///
/// The writer consults these instead of re-scanning a node's lexical form on every statement it
/// serializes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct NodeFlags {
    /// The node's primary text contains a `'\n'`.
    pub has_newline: bool,
    /// The node's primary text contains a `'"'`.
    pub has_quote: bool,
    /// The node is a literal with an explicit datatype.
    pub has_datatype: bool,
    /// The node is a literal with a language tag.
    pub has_language: bool,
}

impl NodeFlags {
    fn of_text(text: &str, has_datatype: bool, has_language: bool) -> Self {
        Self {
            has_newline: text.contains('\n'),
            has_quote: text.contains('"'),
            has_datatype,
            has_language,
        }
    }
}

/// A single immutable RDF term: a URI, a CURIE, a blank node, or a literal.
///
/// `Node` is a tagged union rather than a family of related types: every consumer in this crate
/// (the parser, the writer, the model) matches on the same four variants instead of working
/// through trait objects or a lattice of `From`/`TryFrom` conversions. Once constructed a `Node`
/// never changes; equality and ordering compare variant, then lexical content, datatype and
/// language.
#[derive(Clone, Debug)]
pub enum Node {
    /// An absolute or relative URI reference.
    Uri(NodeText),
    /// A `prefix:local` shortcut, resolvable against an [`Environment`](crate::Environment).
    Curie(NodeText),
    /// A blank-node label, unique within a document.
    Blank(NodeText),
    /// A literal value, with an optional datatype and an optional language tag.
    Literal(Literal),
}

/// The text content shared by the `Uri`, `Curie` and `Blank` variants, with its flags cached.
#[derive(Clone, Debug)]
pub struct NodeText {
    value: Arc<str>,
    flags: NodeFlags,
}

impl NodeText {
    fn new(value: impl Into<Arc<str>>) -> Self {
        let value = value.into();
        let flags = NodeFlags::of_text(&value, false, false);
        Self { value, flags }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    #[inline]
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }
}

impl PartialEq for NodeText {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
impl Eq for NodeText {}
impl Hash for NodeText {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}
impl PartialOrd for NodeText {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for NodeText {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

/// A literal value: a lexical form plus an optional datatype and an optional language tag.
///
/// A language tag and a datatype are mutually exclusive, except that a language-tagged literal's
/// implicit datatype is always `rdf:langString`; an explicit datatype is only ever stored when it
/// differs from that default or no language is present.
#[derive(Clone, Debug)]
pub struct Literal {
    lexical: Arc<str>,
    datatype: Option<Arc<str>>,
    language: Option<Arc<str>>,
    flags: NodeFlags,
}

impl Literal {
    #[inline]
    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    #[inline]
    pub fn datatype(&self) -> Option<&str> {
        self.datatype.as_deref()
    }

    #[inline]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    #[inline]
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        self.lexical == other.lexical
            && self.datatype == other.datatype
            && self.language == other.language
    }
}
impl Eq for Literal {}
impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lexical.hash(state);
        self.datatype.hash(state);
        self.language.hash(state);
    }
}
impl PartialOrd for Literal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Literal {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.lexical, &self.datatype, &self.language).cmp(&(
            &other.lexical,
            &other.datatype,
            &other.language,
        ))
    }
}

/// An error constructing a [`Node`].
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// A literal was given both a datatype other than `rdf:langString` and a language tag.
    #[error("a literal cannot have both a language tag and an explicit datatype other than rdf:langString")]
    DatatypeAndLanguage,
    /// A language tag failed to validate.
    #[error(transparent)]
    Language(#[from] LanguageTagParseError),
}

impl Node {
    /// Builds a URI node. The value is stored verbatim; callers that need IRI validation should
    /// consult `oxiri` directly (URI parsing beyond what a statement's serialization needs is
    /// outside this crate's job).
    pub fn uri(value: impl Into<Arc<str>>) -> Self {
        Self::Uri(NodeText::new(value))
    }

    /// Builds a CURIE node (`prefix:local`), resolved lazily against an [`Environment`](crate::Environment).
    pub fn curie(value: impl Into<Arc<str>>) -> Self {
        Self::Curie(NodeText::new(value))
    }

    /// Builds a blank-node node from a document-local label (without the `_:` prefix).
    pub fn blank(label: impl Into<Arc<str>>) -> Self {
        Self::Blank(NodeText::new(label))
    }

    /// Builds a plain (untyped, unlocalized) string literal.
    pub fn plain_literal(lexical: impl Into<Arc<str>>) -> Self {
        let lexical: Arc<str> = lexical.into();
        let flags = NodeFlags::of_text(&lexical, false, false);
        Self::Literal(Literal {
            lexical,
            datatype: None,
            language: None,
            flags,
        })
    }

    /// Builds a typed literal with an explicit datatype URI.
    pub fn typed_literal(lexical: impl Into<Arc<str>>, datatype: impl Into<Arc<str>>) -> Self {
        let lexical: Arc<str> = lexical.into();
        let datatype: Arc<str> = datatype.into();
        let flags = NodeFlags::of_text(&lexical, true, false);
        Self::Literal(Literal {
            lexical,
            datatype: Some(datatype),
            language: None,
            flags,
        })
    }

    /// Builds a language-tagged literal (implicit datatype `rdf:langString`).
    pub fn lang_literal(
        lexical: impl Into<Arc<str>>,
        language: impl Into<Arc<str>>,
    ) -> Result<Self, NodeError> {
        let lexical: Arc<str> = lexical.into();
        let language: Arc<str> = language.into();
        LanguageTag::parse(language.as_ref())?;
        let flags = NodeFlags::of_text(&lexical, false, true);
        Ok(Self::Literal(Literal {
            lexical,
            datatype: None,
            language: Some(language),
            flags,
        }))
    }

    /// Builds a literal from its three raw parts, as a parser would after reading a `^^` or `@`
    /// suffix. `datatype` and `language` must not both be set unless `datatype` names
    /// `rdf:langString`, in which case the datatype is dropped (it is implied).
    pub fn literal(
        lexical: impl Into<Arc<str>>,
        datatype: Option<impl Into<Arc<str>>>,
        language: Option<impl Into<Arc<str>>>,
    ) -> Result<Self, NodeError> {
        let lexical: Arc<str> = lexical.into();
        let datatype = datatype.map(Into::into);
        let language = language.map(Into::into);
        match (&datatype, &language) {
            (Some(dt), Some(_)) if dt.as_ref() != rdf::LANG_STRING => {
                return Err(NodeError::DatatypeAndLanguage);
            }
            (_, Some(lang)) => {
                LanguageTag::parse(lang.as_ref())?;
            }
            _ => {}
        }
        let datatype = if language.is_some() { None } else { datatype };
        let flags = NodeFlags::of_text(&lexical, datatype.is_some(), language.is_some());
        Ok(Self::Literal(Literal {
            lexical,
            datatype,
            language,
            flags,
        }))
    }

    /// The node's cached flags.
    pub fn flags(&self) -> NodeFlags {
        match self {
            Self::Uri(t) | Self::Curie(t) | Self::Blank(t) => t.flags(),
            Self::Literal(l) => l.flags(),
        }
    }

    #[inline]
    pub fn is_uri(&self) -> bool {
        matches!(self, Self::Uri(_))
    }

    #[inline]
    pub fn is_curie(&self) -> bool {
        matches!(self, Self::Curie(_))
    }

    #[inline]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank(_))
    }

    #[inline]
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// The URI string, if this is a `Uri` node.
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Self::Uri(t) => Some(t.as_str()),
            _ => None,
        }
    }

    /// The `prefix:local` string, if this is a `Curie` node.
    pub fn as_curie(&self) -> Option<&str> {
        match self {
            Self::Curie(t) => Some(t.as_str()),
            _ => None,
        }
    }

    /// The blank-node label, if this is a `Blank` node.
    pub fn as_blank(&self) -> Option<&str> {
        match self {
            Self::Blank(t) => Some(t.as_str()),
            _ => None,
        }
    }

    /// The literal payload, if this is a `Literal` node.
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(l) => Some(l),
            _ => None,
        }
    }

}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Uri(a), Self::Uri(b))
            | (Self::Curie(a), Self::Curie(b))
            | (Self::Blank(a), Self::Blank(b)) => a == b,
            (Self::Literal(a), Self::Literal(b)) => a == b,
            _ => false,
        }
    }
}
impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Self::Uri(t) | Self::Curie(t) | Self::Blank(t) => t.hash(state),
            Self::Literal(l) => l.hash(state),
        }
    }
}

fn variant_rank(node: &Node) -> u8 {
    match node {
        Node::Uri(_) => 0,
        Node::Curie(_) => 1,
        Node::Blank(_) => 2,
        Node::Literal(_) => 3,
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Uri(a), Self::Uri(b))
            | (Self::Curie(a), Self::Curie(b))
            | (Self::Blank(a), Self::Blank(b)) => a.cmp(b),
            (Self::Literal(a), Self::Literal(b)) => a.cmp(b),
            _ => variant_rank(self).cmp(&variant_rank(other)),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri(t) => write!(f, "<{}>", t.as_str()),
            Self::Curie(t) => write!(f, "{}", t.as_str()),
            Self::Blank(t) => write!(f, "_:{}", t.as_str()),
            Self::Literal(l) => {
                write!(f, "\"{}\"", l.lexical())?;
                if let Some(lang) = l.language() {
                    write!(f, "@{lang}")
                } else if let Some(dt) = l.datatype() {
                    write!(f, "^^<{dt}>")
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

    use super::Node;

    /// The wire representation of a [`Node`]: a tagged variant carrying only its semantic
    /// content, never the cached [`super::NodeFlags`].
    #[derive(Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "lowercase")]
    enum NodeRepr {
        Uri { value: String },
        Curie { value: String },
        Blank { value: String },
        Literal {
            value: String,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            datatype: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            language: Option<String>,
        },
    }

    impl Serialize for Node {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let repr = match self {
                Node::Uri(t) => NodeRepr::Uri {
                    value: t.as_str().to_owned(),
                },
                Node::Curie(t) => NodeRepr::Curie {
                    value: t.as_str().to_owned(),
                },
                Node::Blank(t) => NodeRepr::Blank {
                    value: t.as_str().to_owned(),
                },
                Node::Literal(l) => NodeRepr::Literal {
                    value: l.lexical().to_owned(),
                    datatype: l.datatype().map(str::to_owned),
                    language: l.language().map(str::to_owned),
                },
            };
            repr.serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for Node {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            match NodeRepr::deserialize(deserializer)? {
                NodeRepr::Uri { value } => Ok(Node::uri(value)),
                NodeRepr::Curie { value } => Ok(Node::curie(value)),
                NodeRepr::Blank { value } => Ok(Node::blank(value)),
                NodeRepr::Literal {
                    value,
                    datatype,
                    language,
                } => Node::literal(value, datatype, language).map_err(de::Error::custom),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::super::*;

        #[test]
        fn uri_round_trips_through_json() {
            let node = Node::uri("http://example.org/s");
            let json = serde_json::to_string(&node).unwrap();
            let back: Node = serde_json::from_str(&json).unwrap();
            assert_eq!(node, back);
        }

        #[test]
        fn literal_round_trips_with_datatype() {
            let node = Node::typed_literal("42", "http://www.w3.org/2001/XMLSchema#integer");
            let json = serde_json::to_string(&node).unwrap();
            let back: Node = serde_json::from_str(&json).unwrap();
            assert_eq!(node, back);
        }

        #[test]
        fn literal_round_trips_with_language() {
            let node = Node::lang_literal("hi", "en").unwrap();
            let json = serde_json::to_string(&node).unwrap();
            let back: Node = serde_json::from_str(&json).unwrap();
            assert_eq!(node, back);
        }

        #[test]
        fn serialized_literal_never_leaks_cached_flags() {
            let node = Node::plain_literal("line\nbreak");
            let json = serde_json::to_value(&node).unwrap();
            assert!(json.get("has_newline").is_none());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_equality_is_pointer_independent() {
        let a = Node::uri("http://example.org/s");
        let b = Node::uri("http://example.org/s".to_string());
        assert_eq!(a, b);
    }

    #[test]
    fn literal_flags_are_cached() {
        let lit = Node::literal("line\nbreak", None::<&str>, None::<&str>).unwrap();
        assert!(lit.flags().has_newline);
        assert!(!lit.flags().has_datatype);
        assert!(!lit.flags().has_language);
    }

    #[test]
    fn lang_string_cannot_also_carry_an_explicit_other_datatype() {
        let err = Node::literal(
            "hi",
            Some("http://www.w3.org/2001/XMLSchema#string"),
            Some("en"),
        )
        .unwrap_err();
        assert!(matches!(err, NodeError::DatatypeAndLanguage));
    }

    #[test]
    fn lang_string_datatype_is_implied_and_dropped() {
        let lit = Node::literal("hi", Some(rdf::LANG_STRING), Some("en")).unwrap();
        let Node::Literal(l) = lit else { unreachable!() };
        assert_eq!(l.datatype(), None);
        assert_eq!(l.language(), Some("en"));
    }

    #[test]
    fn invalid_language_tag_is_rejected() {
        assert!(Node::lang_literal("hi", "not a tag").is_err());
    }

    #[test]
    fn node_ordering_is_total_and_variant_first() {
        let uri = Node::uri("http://example.org/a");
        let blank = Node::blank("b1");
        assert!(uri < blank);
    }
}
