//! Formatting entities.
//!
//! An [`Entity`] marks a half-open range of a string, counted in UTF-16 code
//! units, with one [`EntityKind`]. Payloads are part of the kind, so a link
//! always has a URL and a text mention always has a user.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::WireError,
    peer::{self, User},
};

/// Formatting applied by an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    CodeBlock,
    Link { url: String },
    Url,
    Email,
    Hashtag,
    Mention,
    TextMention { user: User },
    BotCommand,
    PhoneNumber,
    Cashtag,
}

impl EntityKind {
    /// Kind for a link to `url`: a text mention for `tg://user?id=` links,
    /// a plain link otherwise.
    #[must_use]
    pub fn for_url(url: String) -> Self {
        match peer::parse_user_link(&url) {
            Some(id) => Self::TextMention {
                user: User::with_id(id),
            },
            None => Self::Link { url },
        }
    }

    /// Name used for the `type` field on the wire.
    #[must_use]
    pub fn wire_name(&self) -> &'static str { WireKind::from(self).name() }

    /// Leading character of tokens of this kind, for kinds that have one.
    #[must_use]
    pub fn sigil(&self) -> Option<char> {
        match self {
            Self::Hashtag => Some('#'),
            Self::Mention => Some('@'),
            Self::BotCommand => Some('/'),
            Self::Cashtag => Some('$'),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.wire_name()) }
}

/// One formatting span over a text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WireEntity", into = "WireEntity")]
pub struct Entity {
    kind: EntityKind,
    offset: usize,
    length: usize,
}

impl Entity {
    #[must_use]
    pub fn new(kind: EntityKind, offset: usize, length: usize) -> Self {
        Self {
            kind,
            offset,
            length,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &EntityKind { &self.kind }

    #[must_use]
    pub fn offset(&self) -> usize { self.offset }

    #[must_use]
    pub fn length(&self) -> usize { self.length }

    /// Exclusive end of the range.
    ///
    /// Saturates for ranges that overflow `usize`; such entities are
    /// rejected by [`crate::Text::new`].
    #[must_use]
    pub fn end(&self) -> usize { self.offset.saturating_add(self.length) }

    /// Exclusive end of the range, or `None` when it overflows `usize`.
    #[must_use]
    pub fn checked_end(&self) -> Option<usize> { self.offset.checked_add(self.length) }

    /// Destination of a [`EntityKind::Link`].
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            EntityKind::Link { url } => Some(url),
            _ => None,
        }
    }

    /// User of a [`EntityKind::TextMention`].
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match &self.kind {
            EntityKind::TextMention { user } => Some(user),
            _ => None,
        }
    }

    /// Same kind and payload over a different range.
    #[must_use]
    pub fn moved(&self, offset: usize, length: usize) -> Self {
        Self::new(self.kind.clone(), offset, length)
    }

    /// Same kind and length, offset shifted right by `by`.
    #[must_use]
    pub fn shifted(&self, by: usize) -> Self { self.moved(self.offset + by, self.length) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum WireKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    Pre,
    TextLink,
    Url,
    Email,
    Hashtag,
    Mention,
    TextMention,
    BotCommand,
    PhoneNumber,
    Cashtag,
}

impl WireKind {
    fn name(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::Strikethrough => "strikethrough",
            Self::Code => "code",
            Self::Pre => "pre",
            Self::TextLink => "text_link",
            Self::Url => "url",
            Self::Email => "email",
            Self::Hashtag => "hashtag",
            Self::Mention => "mention",
            Self::TextMention => "text_mention",
            Self::BotCommand => "bot_command",
            Self::PhoneNumber => "phone_number",
            Self::Cashtag => "cashtag",
        }
    }
}

impl From<&EntityKind> for WireKind {
    fn from(kind: &EntityKind) -> Self {
        match kind {
            EntityKind::Bold => Self::Bold,
            EntityKind::Italic => Self::Italic,
            EntityKind::Underline => Self::Underline,
            EntityKind::Strikethrough => Self::Strikethrough,
            EntityKind::Code => Self::Code,
            EntityKind::CodeBlock => Self::Pre,
            EntityKind::Link { .. } => Self::TextLink,
            EntityKind::Url => Self::Url,
            EntityKind::Email => Self::Email,
            EntityKind::Hashtag => Self::Hashtag,
            EntityKind::Mention => Self::Mention,
            EntityKind::TextMention { .. } => Self::TextMention,
            EntityKind::BotCommand => Self::BotCommand,
            EntityKind::PhoneNumber => Self::PhoneNumber,
            EntityKind::Cashtag => Self::Cashtag,
        }
    }
}

/// Flat record as sent by the Bot API.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireEntity {
    #[serde(rename = "type")]
    kind: WireKind,
    offset: usize,
    length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<User>,
}

impl TryFrom<WireEntity> for Entity {
    type Error = WireError;

    fn try_from(wire: WireEntity) -> Result<Self, Self::Error> {
        let WireEntity {
            kind,
            offset,
            length,
            url,
            user,
        } = wire;
        let kind = match kind {
            WireKind::Bold => EntityKind::Bold,
            WireKind::Italic => EntityKind::Italic,
            WireKind::Underline => EntityKind::Underline,
            WireKind::Strikethrough => EntityKind::Strikethrough,
            WireKind::Code => EntityKind::Code,
            WireKind::Pre => EntityKind::CodeBlock,
            WireKind::TextLink => EntityKind::Link {
                url: url.ok_or(WireError::MissingUrl { offset })?,
            },
            WireKind::Url => EntityKind::Url,
            WireKind::Email => EntityKind::Email,
            WireKind::Hashtag => EntityKind::Hashtag,
            WireKind::Mention => EntityKind::Mention,
            WireKind::TextMention => EntityKind::TextMention {
                user: user.ok_or(WireError::MissingUser { offset })?,
            },
            WireKind::BotCommand => EntityKind::BotCommand,
            WireKind::PhoneNumber => EntityKind::PhoneNumber,
            WireKind::Cashtag => EntityKind::Cashtag,
        };
        Ok(Self::new(kind, offset, length))
    }
}

impl From<Entity> for WireEntity {
    fn from(entity: Entity) -> Self {
        let kind = WireKind::from(&entity.kind);
        let (url, user) = match entity.kind {
            EntityKind::Link { url } => (Some(url), None),
            EntityKind::TextMention { user } => (None, Some(user)),
            _ => (None, None),
        };
        Self {
            kind,
            offset: entity.offset,
            length: entity.length,
            url,
            user,
        }
    }
}
