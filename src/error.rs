//! The error channel (spec §4.10, §6, §7).
//!
//! A parse never panics. The first failure halts construction and is
//! reported as an [`Error`] carrying a stable numeric code, a human
//! message, and the `(row, col)` at which scanning stopped.

use std::fmt;

use crate::cursor::TextPos;

/// Stable numeric error codes (spec §6 taxonomy).
///
/// Names are indicative, not wire identifiers: the numeric value is the part
/// that is part of the contract.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum ErrorId {
    /// 0 — no error.
    None = 0,
    /// 1 — generic parse failure.
    Generic = 1,
    /// 2 — failed to open a file (collaborator-only; see [`crate::io`]).
    OpeningFile = 2,
    /// 3 — element malformed.
    ParsingElement = 3,
    /// 4 — element name missing.
    FailedToReadElementName = 4,
    /// 5 — element text-value malformed.
    ReadingElementValue = 5,
    /// 6 — attribute malformed.
    ReadingAttributes = 6,
    /// 7 — empty tag.
    ParsingEmpty = 7,
    /// 8 — end-tag mismatch or missing.
    ReadingEndTag = 8,
    /// 9 — unknown construct malformed.
    ParsingUnknown = 9,
    /// 10 — comment unterminated.
    ParsingComment = 10,
    /// 11 — declaration malformed.
    ParsingDeclaration = 11,
    /// 12 — document empty / no root element.
    DocumentEmpty = 12,
    /// 13 — unexpected NUL or EOF.
    EmbeddedNull = 13,
    /// 14 — CDATA unterminated.
    ParsingCdata = 14,
    /// 15 — document node placed non-root.
    DocumentTopOnly = 15,
}

impl ErrorId {
    fn description(self) -> &'static str {
        match self {
            ErrorId::None => "no error",
            ErrorId::Generic => "error",
            ErrorId::OpeningFile => "failed to open file",
            ErrorId::ParsingElement => "error parsing element",
            ErrorId::FailedToReadElementName => "failed to read element name",
            ErrorId::ReadingElementValue => "error reading element value",
            ErrorId::ReadingAttributes => "error reading attributes",
            ErrorId::ParsingEmpty => "empty tag",
            ErrorId::ReadingEndTag => "error reading end tag",
            ErrorId::ParsingUnknown => "error parsing unknown construct",
            ErrorId::ParsingComment => "error parsing comment",
            ErrorId::ParsingDeclaration => "error parsing declaration",
            ErrorId::DocumentEmpty => "document is empty",
            ErrorId::EmbeddedNull => "unexpected NUL or end of input",
            ErrorId::ParsingCdata => "error parsing CDATA",
            ErrorId::DocumentTopOnly => "a document node may only appear at the root",
        }
    }
}

/// A parse error: a code, a message, and the position it was raised at.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Error {
    id: ErrorId,
    message: String,
    pos: TextPos,
}

impl Error {
    pub(crate) fn new(id: ErrorId, pos: TextPos) -> Self {
        Error { id, message: id.description().to_string(), pos }
    }

    pub(crate) fn with_message(id: ErrorId, pos: TextPos, message: impl Into<String>) -> Self {
        Error { id, message: message.into(), pos }
    }

    /// The stable numeric error code.
    pub fn id(&self) -> ErrorId {
        self.id
    }

    /// The human-readable error description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 1-based row at which the error was detected.
    pub fn row(&self) -> u32 {
        self.pos.row
    }

    /// 1-based column at which the error was detected.
    pub fn col(&self) -> u32 {
        self.pos.col
    }

    /// The full source position at which the error was detected.
    pub fn pos(&self) -> TextPos {
        self.pos
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.pos)
    }
}

impl std::error::Error for Error {}
