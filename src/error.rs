/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while applying declarations
///
/// File and serialization failures are reported through `anyhow` by the
/// scanner, parser and serializer; these variants cover declarations that are
/// well-formed but cannot be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A declaration combines fields that contradict each other
    InvalidDeclaration(String),
    /// A body kind other than object, array, string, number or `#/Name`
    UnknownBodyKind(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::InvalidDeclaration(msg) => write!(f, "invalid declaration: {}", msg),
            Error::UnknownBodyKind(kind) => write!(f, "unknown body kind '{}'", kind),
        }
    }
}

impl std::error::Error for Error {}
