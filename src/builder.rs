//! Incremental construction of a [`Text`].
//!
//! The builder owns one string buffer and one entity list and tracks the
//! buffer length in UTF-16 units, so every appended entity starts at the
//! current end of the buffer. [`TextBuilder::build`] consumes the builder
//! and moves both buffers into the resulting [`Text`].

use tracing::trace;

use crate::{
    entity::{Entity, EntityKind},
    peer::{MessageRef, User},
    text::Text,
    utf16,
};

#[derive(Debug, Default)]
pub struct TextBuilder {
    text: String,
    len: usize,
    entities: Vec<Entity>,
}

impl TextBuilder {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Current length in UTF-16 units.
    #[must_use]
    pub fn len(&self) -> usize { self.len }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.text.is_empty() }

    /// Append literal text with no formatting.
    pub fn append_str(&mut self, s: &str) -> &mut Self {
        self.text.push_str(s);
        self.len += utf16::len(s);
        self
    }

    pub(crate) fn push_char(&mut self, ch: char) -> &mut Self {
        self.text.push(ch);
        self.len += ch.len_utf16();
        self
    }

    /// Append `s` enclosed by one entity of `kind`.
    ///
    /// Empty strings append nothing.
    pub fn append_styled(&mut self, s: &str, kind: EntityKind) -> &mut Self {
        if s.is_empty() {
            return self;
        }
        let offset = self.len;
        self.append_str(s);
        self.entities.push(Entity::new(kind, offset, self.len - offset));
        self
    }

    /// Append another text, shifting its entities to the current end.
    pub fn append_text(&mut self, text: &Text) -> &mut Self {
        let offset = self.len;
        self.entities
            .extend(text.entities().iter().map(|e| e.shifted(offset)));
        self.append_str(text.as_str())
    }

    fn push_entity(&mut self, kind: EntityKind, offset: usize) {
        self.entities.push(Entity::new(kind, offset, self.len - offset));
    }

    /// Start an entity at the current end. The parsers learn a span's extent
    /// only when it closes; opening it here keeps the entity list in opening
    /// order, outer spans before the spans nested in them.
    pub(crate) fn open_entity(&mut self, kind: EntityKind) -> usize {
        self.entities.push(Entity::new(kind, self.len, 0));
        self.entities.len() - 1
    }

    /// Close the entity opened at `index`, extending it to the current end.
    ///
    /// An empty span is discarded. Everything opened after it is nested in
    /// it, and therefore already closed and discarded too, so removal leaves
    /// the indices of still-open entities unchanged.
    pub(crate) fn close_entity(&mut self, index: usize) -> bool {
        let kind = self.entities[index].kind().clone();
        self.close_entity_as(index, kind)
    }

    /// Like [`TextBuilder::close_entity`], replacing the kind chosen at open
    /// time.
    pub(crate) fn close_entity_as(&mut self, index: usize, kind: EntityKind) -> bool {
        let offset = self.entities[index].offset();
        if offset == self.len {
            trace!(%kind, offset, "dropping empty span");
            self.entities.remove(index);
            return false;
        }
        self.entities[index] = Entity::new(kind, offset, self.len - offset);
        true
    }

    pub fn append_bold(&mut self, s: &str) -> &mut Self { self.append_styled(s, EntityKind::Bold) }

    pub fn append_italic(&mut self, s: &str) -> &mut Self { self.append_styled(s, EntityKind::Italic) }

    pub fn append_underline(&mut self, s: &str) -> &mut Self {
        self.append_styled(s, EntityKind::Underline)
    }

    pub fn append_strikethrough(&mut self, s: &str) -> &mut Self {
        self.append_styled(s, EntityKind::Strikethrough)
    }

    pub fn append_code(&mut self, s: &str) -> &mut Self { self.append_styled(s, EntityKind::Code) }

    pub fn append_code_block(&mut self, s: &str) -> &mut Self {
        self.append_styled(s, EntityKind::CodeBlock)
    }

    pub fn append_link(&mut self, s: &str, url: &str) -> &mut Self {
        self.append_styled(s, EntityKind::Link { url: url.to_string() })
    }

    pub fn append_message_link(&mut self, s: &str, message: &MessageRef) -> &mut Self {
        self.append_link(s, &message.link())
    }

    pub fn append_url(&mut self, url: &str) -> &mut Self { self.append_styled(url, EntityKind::Url) }

    pub fn append_message_url(&mut self, message: &MessageRef) -> &mut Self {
        self.append_url(&message.link())
    }

    pub fn append_email(&mut self, email: &str) -> &mut Self {
        self.append_styled(email, EntityKind::Email)
    }

    pub fn append_hashtag(&mut self, hashtag: &str) -> &mut Self {
        self.append_sigil_token(hashtag, EntityKind::Hashtag)
    }

    pub fn append_mention(&mut self, username: &str) -> &mut Self {
        self.append_sigil_token(username, EntityKind::Mention)
    }

    /// `@username` when the user has one, otherwise a text mention over the
    /// user's full name.
    pub fn append_user_mention(&mut self, user: &User) -> &mut Self {
        match &user.username {
            Some(username) => self.append_mention(username),
            None => self.append_user_text_mention(user),
        }
    }

    pub fn append_text_mention(&mut self, s: &str, user: &User) -> &mut Self {
        self.append_styled(s, EntityKind::TextMention { user: user.clone() })
    }

    pub fn append_user_text_mention(&mut self, user: &User) -> &mut Self {
        self.append_text_mention(&user.full_name(), user)
    }

    pub fn append_bot_command(&mut self, command: &str) -> &mut Self {
        self.append_sigil_token(command, EntityKind::BotCommand)
    }

    pub fn append_phone_number(&mut self, number: &str) -> &mut Self {
        self.append_styled(number, EntityKind::PhoneNumber)
    }

    pub fn append_cashtag(&mut self, cashtag: &str) -> &mut Self {
        self.append_sigil_token(cashtag, EntityKind::Cashtag)
    }

    fn append_sigil_token(&mut self, token: &str, kind: EntityKind) -> &mut Self {
        let Some(sigil) = kind.sigil() else {
            return self.append_styled(token, kind);
        };
        if token.is_empty() || token.starts_with(sigil) {
            return self.append_styled(token, kind);
        }
        let offset = self.len;
        self.push_char(sigil).append_str(token);
        self.push_entity(kind, offset);
        self
    }

    /// Finish construction.
    #[must_use]
    pub fn build(self) -> Text { Text::from_parts(self.text, self.entities, self.len) }
}
