//! Defines error and its location
use std::fmt;

use saphyr_parser::{ScanError, Span};

use crate::budget::BudgetBreach;

/// Row/column location within the source YAML document (1-indexed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    /// 1-indexed line number in the input stream.
    pub(crate) line: u32,
    /// 1-indexed column number in the input stream.
    pub(crate) column: u32,
}

impl Location {
    /// Sentinel value meaning "location unknown".
    ///
    /// Used when a precise position is not yet available at error creation time.
    pub const UNKNOWN: Self = Self { line: 0, column: 0 };

    /// Create a new location record.
    ///
    /// Arguments:
    /// - `line`: 1-indexed line.
    /// - `column`: 1-indexed column.
    pub const fn new(line: usize, column: usize) -> Self {
        // 4 Gb is larger than any YAML document we expect, and this is
        // diagnostics only.
        Self {
            line: line as u32,
            column: column as u32,
        }
    }

    /// Line of the node, 1-indexed.
    #[inline]
    pub fn line(&self) -> u64 {
        self.line as u64
    }

    /// Column of the node, 1-indexed.
    #[inline]
    pub fn column(&self) -> u64 {
        self.column as u64
    }

    #[inline]
    pub(crate) fn is_known(&self) -> bool {
        self != &Location::UNKNOWN
    }
}

/// Convert a `saphyr_parser::Span` to a 1-indexed [`Location`].
///
/// Called by:
/// - The node reader for each raw parser event.
pub(crate) fn location_from_span(span: &Span) -> Location {
    let start = &span.start;
    Location::new(start.line(), start.col() + 1)
}

/// Everything that can go wrong while decoding YAML or maintaining a keyed [`crate::Map`].
#[derive(Debug)]
pub enum Error {
    /// Free-form error with optional source location.
    Message { msg: String, location: Location },
    /// The YAML text could not be tokenized or structured by the parser.
    Scan { msg: String, location: Location },
    /// Unexpected end of input inside a document.
    Eof { location: Location },
    /// Alias references an anchor that is not defined (earlier) in the same document.
    UnknownAnchor { id: usize, location: Location },
    /// Two entries of one mapping have structurally equal keys.
    DuplicateKey { key: String, location: Location },
    /// The value of a merge key (`<<`) is neither a mapping nor a sequence of mappings.
    MalformedMerge {
        found: &'static str,
        location: Location,
    },
    /// The node tree violates its own shape contract (odd mapping content, a document
    /// without exactly one root, unbalanced container events).
    Malformed {
        msg: &'static str,
        location: Location,
    },
    /// A scalar carries a type tag (`!!int`, `!!bool`, ...) its text does not satisfy.
    InvalidScalar { msg: String, location: Location },
    /// Rendering a composite key to its canonical text failed.
    KeySerialization { msg: String },
    /// The document root was expected to be a mapping.
    NotAMap {
        found: &'static str,
        location: Location,
    },
    /// A single-document entry point met a second document.
    MultipleDocuments { location: Location },
    /// A YAML budget limit was exceeded.
    Budget {
        breach: BudgetBreach,
        location: Location,
    },
    /// Alias expansion exceeded [`crate::options::AliasLimits`].
    AliasLimit { msg: String, location: Location },
    /// Unexpected I/O error. This may happen only when decoding from a reader.
    IOError { cause: std::io::Error },
}

impl Error {
    /// Construct a `Message` error with no known location.
    pub(crate) fn msg<S: Into<String>>(s: S) -> Self {
        Error::Message {
            msg: s.into(),
            location: Location::UNKNOWN,
        }
    }

    /// Construct an unexpected end-of-input error with unknown location.
    pub(crate) fn eof() -> Self {
        Error::Eof {
            location: Location::UNKNOWN,
        }
    }

    /// Construct a structural contract violation with unknown location.
    pub(crate) fn malformed(msg: &'static str) -> Self {
        Error::Malformed {
            msg,
            location: Location::UNKNOWN,
        }
    }

    pub(crate) fn invalid_scalar<S: Into<String>>(s: S) -> Self {
        Error::InvalidScalar {
            msg: s.into(),
            location: Location::UNKNOWN,
        }
    }

    pub(crate) fn alias_limit<S: Into<String>>(s: S) -> Self {
        Error::AliasLimit {
            msg: s.into(),
            location: Location::UNKNOWN,
        }
    }

    /// Attach/override a concrete location to this error and return it.
    ///
    /// Errors that never carry a position (`KeySerialization`, `IOError`) are returned unchanged.
    pub(crate) fn with_location(mut self, set_location: Location) -> Self {
        match &mut self {
            Error::Message { location, .. }
            | Error::Scan { location, .. }
            | Error::Eof { location }
            | Error::UnknownAnchor { location, .. }
            | Error::DuplicateKey { location, .. }
            | Error::MalformedMerge { location, .. }
            | Error::Malformed { location, .. }
            | Error::InvalidScalar { location, .. }
            | Error::NotAMap { location, .. }
            | Error::MultipleDocuments { location }
            | Error::Budget { location, .. }
            | Error::AliasLimit { location, .. } => {
                *location = set_location;
            }
            Error::KeySerialization { .. } | Error::IOError { .. } => {}
        }
        self
    }

    /// If the error has a known location, return it.
    ///
    /// Returns:
    /// - `Some(Location)` when coordinates are known; `None` otherwise.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Message { location, .. }
            | Error::Scan { location, .. }
            | Error::Eof { location }
            | Error::UnknownAnchor { location, .. }
            | Error::DuplicateKey { location, .. }
            | Error::MalformedMerge { location, .. }
            | Error::Malformed { location, .. }
            | Error::InvalidScalar { location, .. }
            | Error::NotAMap { location, .. }
            | Error::MultipleDocuments { location }
            | Error::Budget { location, .. }
            | Error::AliasLimit { location, .. } => {
                if location.is_known() {
                    Some(*location)
                } else {
                    None
                }
            }
            Error::KeySerialization { .. } | Error::IOError { .. } => None,
        }
    }

    /// True if this error reports two structurally equal keys in one mapping.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Error::DuplicateKey { .. })
    }

    /// Map a `saphyr_parser::ScanError` into our error type with location.
    pub(crate) fn from_scan_error(err: ScanError) -> Self {
        let mark = err.marker();
        Error::Scan {
            msg: err.info().to_owned(),
            location: Location::new(mark.line(), mark.col() + 1),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Message { msg, location } => fmt_with_location(f, msg, location),
            Error::Scan { msg, location } => {
                fmt_with_location(f, &format!("malformed YAML: {msg}"), location)
            }
            Error::Eof { location } => fmt_with_location(f, "unexpected end of input", location),
            Error::UnknownAnchor { id, location } => {
                fmt_with_location(f, &format!("alias references unknown anchor id {id}"), location)
            }
            Error::DuplicateKey { key, location } => {
                fmt_with_location(f, &format!("duplicate map key: {key}"), location)
            }
            Error::MalformedMerge { found, location } => fmt_with_location(
                f,
                &format!("merge value must be a mapping or a sequence of mappings, found {found}"),
                location,
            ),
            Error::Malformed { msg, location } => {
                fmt_with_location(f, &format!("malformed node tree: {msg}"), location)
            }
            Error::InvalidScalar { msg, location } => fmt_with_location(f, msg, location),
            Error::KeySerialization { msg } => write!(f, "cannot render composite key: {msg}"),
            Error::NotAMap { found, location } => {
                fmt_with_location(f, &format!("document root is not a map: {found}"), location)
            }
            Error::MultipleDocuments { location } => fmt_with_location(
                f,
                "multiple YAML documents detected; use from_multiple or Documents",
                location,
            ),
            Error::Budget { breach, location } => {
                fmt_with_location(f, &format!("YAML budget breached: {breach:?}"), location)
            }
            Error::AliasLimit { msg, location } => fmt_with_location(f, msg, location),
            Error::IOError { cause } => write!(f, "IO error: {cause}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IOError { cause } => Some(cause),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(cause: std::io::Error) -> Self {
        Error::IOError { cause }
    }
}

/// Print a message optionally suffixed with "at line X, column Y".
fn fmt_with_location(f: &mut fmt::Formatter<'_>, msg: &str, location: &Location) -> fmt::Result {
    if location.is_known() {
        write!(
            f,
            "{msg} at line {}, column {}",
            location.line, location.column
        )
    } else {
        write!(f, "{msg}")
    }
}

/// Convert a budget breach into a user-facing error.
pub(crate) fn budget_error(breach: BudgetBreach) -> Error {
    Error::Budget {
        breach,
        location: Location::UNKNOWN,
    }
}
