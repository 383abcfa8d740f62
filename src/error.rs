//! Error types surfaced by parsing and by building texts from wire data.

use std::fmt;

use thiserror::Error;

use crate::entity::EntityKind;

/// Markup dialect a parse error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Html,
    Markdown,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Html => "HTML",
            Self::Markdown => "Markdown",
        })
    }
}

/// What went wrong at the reported position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("reserved character `{0}` must be escaped")]
    ReservedCharacter(char),
    #[error("malformed character reference")]
    MalformedReference,
    #[error("unsupported tag <{0}>")]
    UnknownTag(String),
    #[error("closing tag </{found}> does not match open <{expected}>")]
    MismatchedTag { expected: String, found: String },
    #[error("closing tag </{0}> has no matching open tag")]
    UnopenedTag(String),
    #[error("tag <{0}> is never closed")]
    UnterminatedTag(String),
    #[error("<a> tag needs an href attribute")]
    MissingHref,
    #[error("markup is not allowed inside <{0}>")]
    MarkupInsideCode(String),
    #[error("`{0}` is never closed")]
    UnterminatedSigil(&'static str),
    #[error("`{found}` closes while `{expected}` is still open")]
    MismatchedSigil {
        expected: &'static str,
        found: &'static str,
    },
    #[error("link text must be followed by a non-empty `(url)`")]
    MissingLinkTarget,
    #[error("backslash at end of input escapes nothing")]
    DanglingEscape,
}

/// Markup that cannot be turned into a [`Text`](crate::Text).
///
/// Carries the whole offending input so callers can render their own
/// diagnostics; [`MarkupSyntaxError::snippet`] gives the neighbourhood of the
/// failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {dialect} at byte {position}: {kind}")]
pub struct MarkupSyntaxError {
    pub dialect: Dialect,
    /// Byte offset into `input`.
    pub position: usize,
    pub input: String,
    pub kind: SyntaxErrorKind,
}

impl MarkupSyntaxError {
    pub(crate) fn new(dialect: Dialect, input: &str, position: usize, kind: SyntaxErrorKind) -> Self {
        Self {
            dialect,
            position,
            input: input.to_string(),
            kind,
        }
    }

    /// Up to 16 characters either side of the failing position.
    #[must_use]
    pub fn snippet(&self) -> &str {
        const RADIUS: usize = 16;
        let pos = self.position.min(self.input.len());
        let start = self.input[..pos]
            .char_indices()
            .rev()
            .nth(RADIUS - 1)
            .map_or(0, |(i, _)| i);
        let end = self.input[pos..]
            .char_indices()
            .nth(RADIUS)
            .map_or(self.input.len(), |(i, _)| pos + i);
        &self.input[start..end]
    }
}

/// An entity list that does not fit its string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("{kind} entity at {offset}+{length} exceeds text length {text_length}")]
    OutOfBounds {
        kind: EntityKind,
        offset: usize,
        length: usize,
        text_length: usize,
    },
    #[error("{kind} entity at {offset}+{length} splits a surrogate pair")]
    SplitsSurrogate {
        kind: EntityKind,
        offset: usize,
        length: usize,
    },
}

/// A wire entity whose payload does not match its type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("text_link entity at {offset} has no url")]
    MissingUrl { offset: usize },
    #[error("text_mention entity at {offset} has no user")]
    MissingUser { offset: usize },
}
