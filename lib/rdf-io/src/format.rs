//! The four fixed concrete syntaxes (§1's Non-goals rule out arbitrary-syntax extensibility) and
//! the `guess_syntax` extension-sniffing helper (§6).

use std::fmt;

/// One of the four Turtle-family syntaxes this crate reads and writes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Syntax {
    /// `.ttl` — prefixes, base, abbreviations, default graph only.
    Turtle,
    /// `.trig` — Turtle plus named graphs.
    TriG,
    /// `.nt` — one flat triple per line, no prefixes or abbreviations.
    NTriples,
    /// `.nq` — N-Triples plus an optional fourth graph term per line.
    NQuads,
}

impl Syntax {
    /// Guesses a syntax from a file name's extension (case-insensitive), per §6.
    pub fn guess(file_name: &str) -> Option<Self> {
        let extension = file_name.rsplit('.').next()?;
        match extension.to_ascii_lowercase().as_str() {
            "ttl" => Some(Self::Turtle),
            "trig" => Some(Self::TriG),
            "nt" => Some(Self::NTriples),
            "nq" => Some(Self::NQuads),
            _ => None,
        }
    }

    /// Whether this syntax carries a fourth graph term (TriG's `GRAPH` blocks / bare braces,
    /// N-Quads' trailing graph term).
    #[inline]
    pub fn with_graph_name(self) -> bool {
        matches!(self, Self::TriG | Self::NQuads)
    }

    /// Whether this syntax is the flat, one-statement-per-line N-Triples/N-Quads grammar rather
    /// than the abbreviating Turtle/TriG grammar.
    #[inline]
    pub fn is_line_based(self) -> bool {
        matches!(self, Self::NTriples | Self::NQuads)
    }

    /// The canonical file extension, without a leading dot.
    #[inline]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Turtle => "ttl",
            Self::TriG => "trig",
            Self::NTriples => "nt",
            Self::NQuads => "nq",
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Turtle => "Turtle",
            Self::TriG => "TriG",
            Self::NTriples => "N-Triples",
            Self::NQuads => "N-Quads",
        })
    }
}

/// Guesses a syntax from a file name's extension. A free function alongside [`Syntax::guess`] for
/// callers that import the function rather than the type, matching §6's naming.
#[inline]
pub fn guess_syntax(file_name: &str) -> Option<Syntax> {
    Syntax::guess(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_from_extension_case_insensitively() {
        assert_eq!(guess_syntax("data.TTL"), Some(Syntax::Turtle));
        assert_eq!(guess_syntax("data.trig"), Some(Syntax::TriG));
        assert_eq!(guess_syntax("data.Nt"), Some(Syntax::NTriples));
        assert_eq!(guess_syntax("data.nq"), Some(Syntax::NQuads));
        assert_eq!(guess_syntax("data.json"), None);
        assert_eq!(guess_syntax("no-extension"), None);
    }
}
