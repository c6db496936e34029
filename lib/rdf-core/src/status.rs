use std::fmt;

/// The cross-cutting status code returned by the World/Model/Writer surface.
///
/// This mirrors the status taxonomy of the C RDF libraries this crate's API is modeled on:
/// operations return a `Status` rather than throwing, so that a caller driving a `Reader` in a
/// loop can match on recoverable conditions (`Failure`, `BadCurie` in lax mode) without unwinding.
/// Higher-level, `Result`-based APIs in this crate convert their error types to and from `Status`
/// at the boundary; `Status` itself is not a general-purpose `Error`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Status {
    /// The operation completed normally.
    Success,
    /// A clean, non-error negative result: end of input, or no match.
    Failure,
    /// An error that does not fit any more specific variant.
    UnknownError,
    /// A grammatical violation in the input syntax.
    BadSyntax,
    /// An invalid argument was passed to an API call.
    BadArg,
    /// A lookup found no matching entry.
    NotFound,
    /// Two identifiers that were expected to be distinct collided.
    IdClash,
    /// A CURIE referenced an undefined prefix.
    BadCurie,
    /// An invariant internal to the library was violated.
    Internal,
    /// A configured limit (stack depth, nesting depth, counter) was exceeded.
    Overflow,
    /// The input ended in the middle of a production.
    NoData,
    /// The input contained invalid text (e.g. invalid UTF-8) where valid text was required.
    BadText,
    /// A byte sink reported a short or failed write.
    BadWrite,
}

impl Status {
    /// Whether this status represents a successful or merely non-fatal-clean outcome.
    #[inline]
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    /// A human-readable description, playing the role of `strerror(status)`.
    pub fn message(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "no match or clean end of input",
            Self::UnknownError => "unknown error",
            Self::BadSyntax => "bad syntax",
            Self::BadArg => "bad argument",
            Self::NotFound => "not found",
            Self::IdClash => "identifier clash",
            Self::BadCurie => "bad CURIE",
            Self::Internal => "internal error",
            Self::Overflow => "limit exceeded",
            Self::NoData => "premature end of input",
            Self::BadText => "bad text encoding",
            Self::BadWrite => "write error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for Status {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_and_failure_are_ok_everything_else_is_not() {
        assert!(Status::Success.is_ok());
        assert!(Status::Failure.is_ok());
        assert!(!Status::BadSyntax.is_ok());
    }
}
