//! Backtracking Pattern Compiler and Matcher
//!
//! This library compiles pattern text into a tree of matching tokens and runs a
//! backtracking matcher over that tree. The set of active operators is chosen by
//! a [`Syntax`] flag set, so the same compiler understands POSIX basic and
//! extended expressions, the `grep`/`awk`/`sed` dialects and Perl 4/5 style
//! patterns.
//!
//! The matcher supports:
//! - Bounded and unbounded repetition, greedy or stingy
//! - Capturing and non-capturing groups, backreferences
//! - Positive and negative lookahead
//! - Line, string and word anchors
//!
//! ```
//! use backtrack_compiler::{compile, ExecFlags, Matcher, Syntax};
//!
//! let program = compile(r"(a+)\1", Syntax::PERL5).unwrap();
//! let input: Vec<char> = "aaaa".chars().collect();
//! let found = Matcher::new(&program)
//!     .search(&input, 0, ExecFlags::empty())
//!     .unwrap()
//!     .unwrap();
//! assert_eq!((found.start(), found.end()), (0, 4));
//! ```

#[macro_use]
mod macros;

pub mod compiler;
pub mod cursor;
pub mod input;
pub mod matcher;
pub mod syntax;
pub mod token;

pub use compiler::{compile, compile_with, Compiler};
pub use cursor::Span;
pub use input::{CharIndexed, CharVec};
pub use matcher::{Config, MatchResult, Matcher};
pub use syntax::{escape, CompileOptions, ExecFlags, Syntax};
pub use token::{Boundary, PosixClass, Program, Repeat, Token};

/// The result of compiling a pattern into a [`Program`]
pub type CompileResult<T> = Result<T, Error>;

/// The kinds of errors that can occur while compiling a pattern
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A `[` without its closing `]`
    UnmatchedBracket,
    /// A `[:` inside a bracket expression without its closing `:]`
    UnterminatedClass,
    /// A `)` without an opening paren
    UnmatchedParen,
    /// An opening paren without its closing paren
    UnclosedGroup,
    /// An interval whose minimum is larger than its maximum
    IntervalOrder,
    /// An interval without its closing brace
    UnterminatedInterval,
    /// An interval with malformed or oversized bounds
    InvalidInterval,
    /// A repetition operator with nothing before it
    RepeatNoToken,
    /// A repetition operator applied to another repetition
    RepeatChained,
    /// A repetition operator applied to a zero-width assertion
    RepeatAssertion,
    /// An unbounded repetition of something that can match empty
    RepeatEmptyToken,
    /// A reversed range rejected by the syntax
    InvalidRange,
    /// An unknown POSIX class name
    UnknownClass,
    /// A backslash at the very end of the pattern
    TrailingBackslash,
    /// A backreference to a group the pattern never defines
    InvalidBackReference,
    /// Groups nested deeper than the configured nesting limit
    NestLimitExceeded,
}

impl ErrorKind {
    /// The POSIX `regcomp` error code this kind corresponds to.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnmatchedBracket => "REG_EBRACK",
            ErrorKind::UnterminatedClass => "REG_EBRACK",
            ErrorKind::UnmatchedParen => "REG_EPAREN",
            ErrorKind::UnclosedGroup => "REG_EPAREN",
            ErrorKind::IntervalOrder => "REG_BADBR",
            ErrorKind::InvalidInterval => "REG_BADBR",
            ErrorKind::UnterminatedInterval => "REG_EBRACE",
            ErrorKind::RepeatNoToken => "REG_BADRPT",
            ErrorKind::RepeatChained => "REG_BADRPT",
            ErrorKind::RepeatAssertion => "REG_BADRPT",
            ErrorKind::RepeatEmptyToken => "REG_BADRPT",
            ErrorKind::InvalidRange => "REG_ERANGE",
            ErrorKind::UnknownClass => "REG_ECTYPE",
            ErrorKind::TrailingBackslash => "REG_EESCAPE",
            ErrorKind::InvalidBackReference => "REG_ESUBREG",
            ErrorKind::NestLimitExceeded => "REG_ESPACE",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            ErrorKind::UnmatchedBracket => "unmatched bracket",
            ErrorKind::UnterminatedClass => "unterminated character class",
            ErrorKind::UnmatchedParen => "unmatched parenthesis",
            ErrorKind::UnclosedGroup => "unclosed group",
            ErrorKind::IntervalOrder => "interval minimum is greater than maximum",
            ErrorKind::UnterminatedInterval => "unterminated interval",
            ErrorKind::InvalidInterval => "invalid interval",
            ErrorKind::RepeatNoToken => "repeat operator without a preceding token",
            ErrorKind::RepeatChained => "repeat operator applied to a repeat",
            ErrorKind::RepeatAssertion => "repeat operator applied to an assertion",
            ErrorKind::RepeatEmptyToken => "unbounded repeat of an empty-matching token",
            ErrorKind::InvalidRange => "invalid character range",
            ErrorKind::UnknownClass => "unknown character class",
            ErrorKind::TrailingBackslash => "trailing backslash",
            ErrorKind::InvalidBackReference => "backreference to an undefined group",
            ErrorKind::NestLimitExceeded => "groups nested too deeply",
        };
        write!(f, "{} ({})", msg, self.code())
    }
}

/// A compile error: what went wrong and the char offset in the pattern where it
/// was detected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at offset {offset}")]
pub struct Error {
    kind: ErrorKind,
    offset: usize,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, offset: usize) -> Self {
        Error { kind, offset }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Errors that can occur while running a compiled program
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum MatchError {
    /// The search took more steps than its configured budget
    #[error("match exceeded the step limit of {limit}")]
    StepLimitExceeded { limit: u64 },
    /// Internal consistency error
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_offset_and_code() {
        let err = Error::new(ErrorKind::RepeatChained, 2);
        assert_eq!(err.kind(), ErrorKind::RepeatChained);
        assert_eq!(err.offset(), 2);
        assert_eq!(
            err.to_string(),
            "repeat operator applied to a repeat (REG_BADRPT) at offset 2"
        );
    }

    #[test]
    fn test_posix_codes() {
        assert_eq!(ErrorKind::UnmatchedBracket.code(), "REG_EBRACK");
        assert_eq!(ErrorKind::UnclosedGroup.code(), "REG_EPAREN");
        assert_eq!(ErrorKind::IntervalOrder.code(), "REG_BADBR");
        assert_eq!(ErrorKind::UnterminatedInterval.code(), "REG_EBRACE");
        assert_eq!(ErrorKind::InvalidRange.code(), "REG_ERANGE");
        assert_eq!(ErrorKind::UnknownClass.code(), "REG_ECTYPE");
        assert_eq!(ErrorKind::TrailingBackslash.code(), "REG_EESCAPE");
        assert_eq!(ErrorKind::InvalidBackReference.code(), "REG_ESUBREG");
        assert_eq!(ErrorKind::NestLimitExceeded.code(), "REG_ESPACE");
    }

    #[test]
    fn test_match_error_display() {
        let err = MatchError::StepLimitExceeded { limit: 10 };
        assert_eq!(err.to_string(), "match exceeded the step limit of 10");
    }
}
