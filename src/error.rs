use backtrack_compiler::{ErrorKind, MatchError};

/// An error that occurred while compiling or running a regex.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The pattern could not be compiled.
    #[error(transparent)]
    Compile(#[from] backtrack_compiler::Error),
    /// A search gave up, either because it ran out of its step budget or
    /// because the matcher found itself in an inconsistent state.
    #[error(transparent)]
    Match(#[from] MatchError),
}

impl Error {
    /// The kind of compile error, if this is one.
    pub fn compile_kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Compile(err) => Some(err.kind()),
            Error::Match(_) => None,
        }
    }

    /// The char offset in the pattern of a compile error.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Compile(err) => Some(err.offset()),
            Error::Match(_) => None,
        }
    }
}

/// A `Result` alias where the `Err` case is `retrack::Error`.
pub type Result<T> = std::result::Result<T, Error>;
