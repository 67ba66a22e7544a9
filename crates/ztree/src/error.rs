//! Error types for ztree

use std::fmt;
use thiserror::Error;

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A source of a shape that cannot be turned into an element
    InvalidType { found: String },
    /// A record missing its name or carrying ill-typed fields
    MalformedRecord,
    /// The markup tokenizer rejected the input
    ParseFailure { offset: u64 },
    InvalidUtf8,
    Io,
    /// A locator that is neither a file path nor handled by the fetcher
    UnsupportedLocator,
    MaxDepthExceeded { max: u16 },
    MaxSizeExceeded { max: usize },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidType { found } => write!(f, "invalid element type: {found}"),
            Self::MalformedRecord => write!(f, "malformed element record"),
            Self::ParseFailure { offset } => write!(f, "malformed markup at byte {offset}"),
            Self::InvalidUtf8 => write!(f, "input is not valid utf-8"),
            Self::Io => write!(f, "i/o failure"),
            Self::UnsupportedLocator => write!(f, "unsupported locator"),
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
        }
    }
}

/// Main error type for ztree
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        let message = kind.to_string();
        Self { kind, message }
    }

    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn invalid_type(found: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidType {
            found: found.into(),
        })
    }

    pub fn malformed_record(message: impl fmt::Display) -> Self {
        Self::with_message(
            ErrorKind::MalformedRecord,
            format!("malformed element record: {message}"),
        )
    }

    /// Create a parse failure at a byte offset
    pub fn parse_at(offset: u64, message: impl fmt::Display) -> Self {
        Self::with_message(
            ErrorKind::ParseFailure { offset },
            format!("malformed markup at byte {offset}: {message}"),
        )
    }

    pub fn is_parse_failure(&self) -> bool {
        matches!(self.kind, ErrorKind::ParseFailure { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::with_message(ErrorKind::Io, format!("i/o failure: {err}"))
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::with_message(ErrorKind::InvalidUtf8, format!("input is not valid utf-8: {err}"))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::from(err.utf8_error())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        match err {
            quick_xml::Error::Io(io) => {
                Self::with_message(ErrorKind::Io, format!("i/o failure: {io}"))
            }
            other => Self::with_message(
                ErrorKind::ParseFailure { offset: 0 },
                format!("malformed markup: {other}"),
            ),
        }
    }
}

impl From<quick_xml::encoding::EncodingError> for Error {
    fn from(err: quick_xml::encoding::EncodingError) -> Self {
        Self::with_message(ErrorKind::InvalidUtf8, format!("input is not valid utf-8: {err}"))
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::with_message(
            ErrorKind::ParseFailure { offset: 0 },
            format!("malformed attribute: {err}"),
        )
    }
}

/// Result type alias for ztree
pub type Result<T> = std::result::Result<T, Error>;
