//! Immutable formatted text.
//!
//! A [`Text`] pairs a string with the [`Entity`] list that formats it. Every
//! transformation returns a new value and keeps entity ranges consistent
//! with the new string: slicing clips entities to the window and drops those
//! outside it, concatenation shifts the right-hand entities.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    builder::TextBuilder,
    entity::{Entity, EntityKind},
    error::{MarkupSyntaxError, TextError},
    peer::{MessageRef, User},
    utf16,
};

/// A link and the text it is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    pub text: String,
    pub url: String,
}

/// A text mention and the user it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mention {
    pub text: String,
    pub user: User,
}

/// A string annotated with formatting entities.
///
/// Offsets and lengths are UTF-16 code units. Every entity lies within the
/// string and on character boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "WireText")]
pub struct Text {
    #[serde(rename = "text")]
    raw: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    entities: Vec<Entity>,
    #[serde(skip)]
    len: usize,
}

impl Text {
    /// The empty text.
    pub const EMPTY: Text = Text {
        raw: String::new(),
        entities: Vec::new(),
        len: 0,
    };

    /// Build a text from a string and entities received from elsewhere.
    ///
    /// # Errors
    /// Returns [`TextError`] when an entity runs past the end of `raw` or
    /// starts or ends inside a surrogate pair.
    pub fn new(raw: impl Into<String>, entities: Vec<Entity>) -> Result<Self, TextError> {
        let raw = raw.into();
        let len = utf16::len(&raw);
        let mut edges = Vec::with_capacity(entities.len() * 2);
        for entity in &entities {
            match entity.checked_end() {
                Some(end) if end <= len => edges.extend([entity.offset(), end]),
                _ => {
                    return Err(TextError::OutOfBounds {
                        kind: entity.kind().clone(),
                        offset: entity.offset(),
                        length: entity.length(),
                        text_length: len,
                    });
                }
            }
        }
        edges.sort_unstable();
        edges.dedup();
        if let Some(unit) = utf16::first_non_boundary(&raw, &edges)
            && let Some(entity) = entities.iter().find(|e| e.offset() == unit || e.end() == unit)
        {
            return Err(TextError::SplitsSurrogate {
                kind: entity.kind().clone(),
                offset: entity.offset(),
                length: entity.length(),
            });
        }
        Ok(Self { raw, entities, len })
    }

    /// Text without any formatting.
    #[must_use]
    pub fn plain(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let len = utf16::len(&raw);
        Self {
            raw,
            entities: Vec::new(),
            len,
        }
    }

    /// Callers guarantee the entity invariant.
    pub(crate) fn from_parts(raw: String, entities: Vec<Entity>, len: usize) -> Self {
        debug_assert_eq!(len, utf16::len(&raw));
        Self { raw, entities, len }
    }

    /// Parse the HTML subset. See [`crate::html`].
    ///
    /// # Errors
    /// Returns [`MarkupSyntaxError`] on malformed markup.
    pub fn parse_html(input: &str) -> Result<Self, MarkupSyntaxError> { crate::html::parse_html(input) }

    /// Parse the Markdown dialect. See [`crate::markdown`].
    ///
    /// # Errors
    /// Returns [`MarkupSyntaxError`] on malformed markup.
    pub fn parse_markdown(input: &str) -> Result<Self, MarkupSyntaxError> {
        crate::markdown::parse_markdown(input)
    }

    #[must_use]
    pub fn to_html_string(&self) -> String { crate::html::to_html(self) }

    #[must_use]
    pub fn to_markdown_string(&self) -> String { crate::markdown::to_markdown(self) }

    #[must_use]
    pub fn bold(text: &str) -> Self { Self::styled(text, EntityKind::Bold) }

    #[must_use]
    pub fn italic(text: &str) -> Self { Self::styled(text, EntityKind::Italic) }

    #[must_use]
    pub fn underline(text: &str) -> Self { Self::styled(text, EntityKind::Underline) }

    #[must_use]
    pub fn strikethrough(text: &str) -> Self { Self::styled(text, EntityKind::Strikethrough) }

    #[must_use]
    pub fn code(text: &str) -> Self { Self::styled(text, EntityKind::Code) }

    #[must_use]
    pub fn code_block(text: &str) -> Self { Self::styled(text, EntityKind::CodeBlock) }

    #[must_use]
    pub fn link(text: &str, url: &str) -> Self {
        let mut builder = TextBuilder::new();
        builder.append_link(text, url);
        builder.build()
    }

    /// Link to `message` with `text` as its label.
    #[must_use]
    pub fn message_link(text: &str, message: &MessageRef) -> Self {
        let mut builder = TextBuilder::new();
        builder.append_message_link(text, message);
        builder.build()
    }

    #[must_use]
    pub fn url(url: &str) -> Self { Self::styled(url, EntityKind::Url) }

    /// Bare permalink of `message`.
    #[must_use]
    pub fn message_url(message: &MessageRef) -> Self {
        let mut builder = TextBuilder::new();
        builder.append_message_url(message);
        builder.build()
    }

    #[must_use]
    pub fn email(email: &str) -> Self { Self::styled(email, EntityKind::Email) }

    /// `#hashtag`; the sigil is added when missing.
    #[must_use]
    pub fn hashtag(hashtag: &str) -> Self {
        let mut builder = TextBuilder::new();
        builder.append_hashtag(hashtag);
        builder.build()
    }

    /// `@username`; the sigil is added when missing.
    #[must_use]
    pub fn mention(username: &str) -> Self {
        let mut builder = TextBuilder::new();
        builder.append_mention(username);
        builder.build()
    }

    /// Mention of `user` by username, or a text mention when it has none.
    #[must_use]
    pub fn user_mention(user: &User) -> Self {
        let mut builder = TextBuilder::new();
        builder.append_user_mention(user);
        builder.build()
    }

    #[must_use]
    pub fn text_mention(text: &str, user: &User) -> Self {
        let mut builder = TextBuilder::new();
        builder.append_text_mention(text, user);
        builder.build()
    }

    /// Text mention labelled with the user's full name.
    #[must_use]
    pub fn user_text_mention(user: &User) -> Self {
        let mut builder = TextBuilder::new();
        builder.append_user_text_mention(user);
        builder.build()
    }

    /// `/command`; the sigil is added when missing.
    #[must_use]
    pub fn bot_command(command: &str) -> Self {
        let mut builder = TextBuilder::new();
        builder.append_bot_command(command);
        builder.build()
    }

    #[must_use]
    pub fn phone_number(number: &str) -> Self { Self::styled(number, EntityKind::PhoneNumber) }

    /// `$CASHTAG`; the sigil is added when missing.
    #[must_use]
    pub fn cashtag(cashtag: &str) -> Self {
        let mut builder = TextBuilder::new();
        builder.append_cashtag(cashtag);
        builder.build()
    }

    fn styled(text: &str, kind: EntityKind) -> Self {
        let mut builder = TextBuilder::new();
        builder.append_styled(text, kind);
        builder.build()
    }

    /// The unformatted string.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.raw }

    #[must_use]
    pub fn entities(&self) -> &[Entity] { &self.entities }

    #[must_use]
    pub fn into_parts(self) -> (String, Vec<Entity>) { (self.raw, self.entities) }

    /// Length in UTF-16 code units.
    #[must_use]
    pub fn len(&self) -> usize { self.len }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.raw.is_empty() }

    /// Append `other`, shifting its entities past the end of `self`.
    #[must_use]
    pub fn concat(&self, other: &Text) -> Text {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut builder = TextBuilder::new();
        builder.append_text(self).append_text(other);
        builder.build()
    }

    /// Sub-range `[start, end)` in UTF-16 units.
    ///
    /// Entities entirely outside the window are dropped; entities that
    /// overlap it are clipped to it and keep their kind. All entities are
    /// examined, so the result does not depend on their order.
    ///
    /// # Panics
    /// Panics if `start > end`, `end > self.len()`, or either bound falls
    /// inside a surrogate pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use tgtext::{Entity, EntityKind, Text};
    ///
    /// let text = Text::new("hello world", vec![Entity::new(EntityKind::Bold, 0, 5)]).unwrap();
    /// let sub = text.sub_sequence(3, 8);
    /// assert_eq!(sub.as_str(), "lo wo");
    /// assert_eq!(sub.entities(), [Entity::new(EntityKind::Bold, 0, 2)]);
    /// ```
    #[must_use]
    pub fn sub_sequence(&self, start: usize, end: usize) -> Text {
        assert!(
            start <= end && end <= self.len,
            "range {start}..{end} out of bounds for text of length {}",
            self.len
        );
        if start == 0 && end == self.len {
            return self.clone();
        }
        if start == end {
            assert!(
                utf16::is_boundary(&self.raw, start),
                "offset {start} splits a surrogate pair"
            );
            return Text::EMPTY;
        }
        let raw = utf16::slice(&self.raw, start, end)
            .unwrap_or_else(|| panic!("range {start}..{end} splits a surrogate pair"))
            .to_string();
        let entities = self
            .entities
            .iter()
            .filter(|e| e.offset() < end && e.end() > start)
            .map(|e| {
                let from = e.offset().max(start);
                let to = e.end().min(end);
                e.moved(from - start, to - from)
            })
            .collect();
        Text::from_parts(raw, entities, end - start)
    }

    /// Suffix starting at `start`.
    ///
    /// # Panics
    /// As for [`Text::sub_sequence`].
    #[must_use]
    pub fn sub_sequence_from(&self, start: usize) -> Text { self.sub_sequence(start, self.len) }

    /// Strip leading and trailing U+0020 spaces, clipping entities.
    ///
    /// Other whitespace is kept.
    #[must_use]
    pub fn trim(&self) -> Text {
        // Spaces are single-byte and single-unit, so byte counts are unit counts.
        let leading = self.raw.len() - self.raw.trim_start_matches(' ').len();
        if leading == self.raw.len() {
            return Text::EMPTY;
        }
        let trailing = self.raw.len() - self.raw.trim_end_matches(' ').len();
        self.sub_sequence(leading, self.len - trailing)
    }

    #[must_use]
    pub fn bold_text(&self) -> Vec<&str> { self.covered(|k| matches!(k, EntityKind::Bold)) }

    #[must_use]
    pub fn italic_text(&self) -> Vec<&str> { self.covered(|k| matches!(k, EntityKind::Italic)) }

    #[must_use]
    pub fn underline_text(&self) -> Vec<&str> { self.covered(|k| matches!(k, EntityKind::Underline)) }

    #[must_use]
    pub fn strikethrough_text(&self) -> Vec<&str> {
        self.covered(|k| matches!(k, EntityKind::Strikethrough))
    }

    #[must_use]
    pub fn code_text(&self) -> Vec<&str> { self.covered(|k| matches!(k, EntityKind::Code)) }

    #[must_use]
    pub fn code_blocks(&self) -> Vec<&str> { self.covered(|k| matches!(k, EntityKind::CodeBlock)) }

    #[must_use]
    pub fn urls(&self) -> Vec<&str> { self.covered(|k| matches!(k, EntityKind::Url)) }

    #[must_use]
    pub fn emails(&self) -> Vec<&str> { self.covered(|k| matches!(k, EntityKind::Email)) }

    #[must_use]
    pub fn phone_numbers(&self) -> Vec<&str> { self.covered(|k| matches!(k, EntityKind::PhoneNumber)) }

    /// Hashtags without the leading `#`.
    #[must_use]
    pub fn hashtags(&self) -> Vec<&str> { self.sigil_free(|k| matches!(k, EntityKind::Hashtag)) }

    /// Usernames without the leading `@`.
    #[must_use]
    pub fn mentions(&self) -> Vec<&str> { self.sigil_free(|k| matches!(k, EntityKind::Mention)) }

    /// Commands without the leading `/`.
    #[must_use]
    pub fn bot_commands(&self) -> Vec<&str> { self.sigil_free(|k| matches!(k, EntityKind::BotCommand)) }

    /// Cashtags without the leading `$`.
    #[must_use]
    pub fn cashtags(&self) -> Vec<&str> { self.sigil_free(|k| matches!(k, EntityKind::Cashtag)) }

    #[must_use]
    pub fn links(&self) -> Vec<Link> {
        self.entities
            .iter()
            .filter_map(|e| match e.kind() {
                EntityKind::Link { url } => Some(Link {
                    text: self.entity_str(e).to_string(),
                    url: url.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn text_mentions(&self) -> Vec<Mention> {
        self.entities
            .iter()
            .filter_map(|e| match e.kind() {
                EntityKind::TextMention { user } => Some(Mention {
                    text: self.entity_str(e).to_string(),
                    user: user.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Substring covered by `entity`, which must belong to this text.
    pub(crate) fn entity_str(&self, entity: &Entity) -> &str {
        utf16::slice(&self.raw, entity.offset(), entity.end()).unwrap_or_default()
    }

    fn covered(&self, pred: impl Fn(&EntityKind) -> bool) -> Vec<&str> {
        self.entities
            .iter()
            .filter(|e| pred(e.kind()))
            .map(|e| self.entity_str(e))
            .collect()
    }

    fn sigil_free(&self, pred: impl Fn(&EntityKind) -> bool) -> Vec<&str> {
        self.covered(pred)
            .into_iter()
            .map(|s| {
                let mut chars = s.chars();
                chars.next();
                chars.as_str()
            })
            .collect()
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.raw) }
}

impl From<&str> for Text {
    fn from(raw: &str) -> Self { Self::plain(raw) }
}

impl From<String> for Text {
    fn from(raw: String) -> Self { Self::plain(raw) }
}

/// Wire record: `{"text": ..., "entities": [...]}`.
#[derive(Deserialize)]
struct WireText {
    text: String,
    #[serde(default)]
    entities: Vec<Entity>,
}

impl TryFrom<WireText> for Text {
    type Error = TextError;

    fn try_from(wire: WireText) -> Result<Self, Self::Error> { Text::new(wire.text, wire.entities) }
}
