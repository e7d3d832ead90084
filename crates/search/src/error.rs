//! Error types for the search pipeline.
//!
//! Errors are layered the same way the pipeline is: lexing and parsing
//! failures describe a bad filter string, backend errors describe transport
//! problems, and [`SearchError`] is what callers of the engine see.

use std::fmt;

use thiserror::Error;

/// Why the lexer rejected its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    /// A `'` opened a string literal that never closed.
    UnterminatedString,
    /// A character that cannot start any token.
    UnexpectedCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexErrorKind::UnterminatedString => write!(f, "unterminated string literal"),
            LexErrorKind::UnexpectedCharacter(c) => write!(f, "unexpected character '{}'", c),
        }
    }
}

/// A tokenization failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("filter lex error at offset {offset}: {reason}")]
pub struct LexError {
    /// Byte offset into the filter string.
    pub offset: usize,
    pub reason: LexErrorKind,
}

/// A grammar violation found by the parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("filter parse error at offset {offset}: expected {expected}, found {found}")]
pub struct ParseError {
    /// Byte offset of the offending token (the input length for end of input).
    pub offset: usize,
    /// Description of the token kinds the grammar allowed here.
    pub expected: String,
    /// Description of the token actually found.
    pub found: String,
}

/// Either stage of turning a filter string into an AST failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl FilterError {
    /// Byte offset of the failure, whichever stage produced it.
    pub fn offset(&self) -> usize {
        match self {
            FilterError::Lex(e) => e.offset,
            FilterError::Parse(e) => e.offset,
        }
    }
}

/// Errors originating from the search backend or its transport.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is currently unavailable.
    #[error("backend unavailable: {backend_name}: {message}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// The backend answered with a non-success status.
    #[error("{backend_name} returned status {status}: {message}")]
    Status {
        backend_name: String,
        status: u16,
        message: String,
    },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Errors returned by the search engine.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The filter string failed to tokenize or parse. Raised before any
    /// backend call is made.
    #[error("invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),

    /// Transport or backend failure while executing the request.
    #[error("search backend unavailable: {0}")]
    BackendUnavailable(#[from] BackendError),

    /// The compiler cannot translate this node or operand combination.
    #[error("unsupported operator '{operator}': {message}")]
    UnsupportedOperator { operator: String, message: String },

    /// The backend answered, but not with a search response we understand.
    #[error("malformed search response: {message}")]
    MalformedResponse { message: String },
}

impl From<LexError> for SearchError {
    fn from(err: LexError) -> Self {
        SearchError::InvalidFilter(err.into())
    }
}

impl From<ParseError> for SearchError {
    fn from(err: ParseError) -> Self {
        SearchError::InvalidFilter(err.into())
    }
}

/// Result type alias for search operations.
pub type SearchResult<T> = Result<T, SearchError>;
