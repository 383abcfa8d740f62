//! Collaborator records referenced by entity payloads.
//!
//! Only the fields needed to build deep links are modelled here; the rest of
//! the chat and message domain lives outside this crate.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Scheme and path prefix of a user deep link.
pub const USER_LINK_PREFIX: &str = "tg://user?id=";

static USER_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^tg://user\?id=(\d+)$").expect("user link pattern should compile")
});

/// User id named by a `tg://user?id=<digits>` link.
///
/// # Examples
///
/// ```
/// assert_eq!(tgtext::peer::parse_user_link("tg://user?id=42"), Some(42));
/// assert_eq!(tgtext::peer::parse_user_link("https://t.me/x"), None);
/// ```
#[must_use]
pub fn parse_user_link(url: &str) -> Option<i64> {
    USER_LINK_RE
        .captures(url)
        .and_then(|caps| caps[1].parse().ok())
}

/// A Telegram user as it appears in a `text_mention` payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl User {
    /// Placeholder user known only by its identifier, as resolved from a
    /// `tg://user?id=` link.
    #[must_use]
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            is_bot: false,
            first_name: String::new(),
            last_name: None,
            username: None,
        }
    }

    /// First and last name joined by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !self.first_name.is_empty() => format!("{} {last}", self.first_name),
            Some(last) => last.clone(),
            None => self.first_name.clone(),
        }
    }

    /// `tg://user?id=<id>` link that mentions this user.
    #[must_use]
    pub fn deep_link(&self) -> String { format!("{USER_LINK_PREFIX}{}", self.id) }
}

/// The parts of a message needed to build its permalink.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i64,
    pub chat_username: Option<String>,
}

impl MessageRef {
    #[must_use]
    pub fn new(chat_id: i64, message_id: i64) -> Self {
        Self {
            chat_id,
            message_id,
            chat_username: None,
        }
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.chat_username = Some(username.into());
        self
    }

    /// Public `t.me` permalink of the message.
    ///
    /// Chats with a username link through it. Otherwise the private
    /// `t.me/c/` form is used, with the `-100` supergroup prefix stripped
    /// from the chat id.
    ///
    /// # Examples
    ///
    /// ```
    /// use tgtext::MessageRef;
    ///
    /// assert_eq!(
    ///     MessageRef::new(-1_001_234_567_890, 42).link(),
    ///     "https://t.me/c/1234567890/42"
    /// );
    /// assert_eq!(
    ///     MessageRef::new(-100, 7).with_username("rustlang").link(),
    ///     "https://t.me/rustlang/7"
    /// );
    /// ```
    #[must_use]
    pub fn link(&self) -> String {
        if let Some(username) = &self.chat_username {
            let username = username.trim_start_matches('@');
            return format!("https://t.me/{username}/{}", self.message_id);
        }
        let id = self.chat_id.to_string();
        let internal = id
            .strip_prefix("-100")
            .filter(|rest| !rest.is_empty())
            .map_or_else(|| self.chat_id.unsigned_abs().to_string(), str::to_string);
        format!("https://t.me/c/{internal}/{}", self.message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_parts() {
        let mut user = User::with_id(1);
        user.first_name = "Ada".into();
        assert_eq!(user.full_name(), "Ada");
        user.last_name = Some("Lovelace".into());
        assert_eq!(user.full_name(), "Ada Lovelace");
    }

    #[test]
    fn deep_link_uses_id() {
        assert_eq!(User::with_id(123_456_789).deep_link(), "tg://user?id=123456789");
    }

    #[test]
    fn user_link_requires_exact_shape() {
        assert_eq!(parse_user_link("tg://user?id=007"), Some(7));
        assert_eq!(parse_user_link("tg://user?id="), None);
        assert_eq!(parse_user_link("tg://user?id=12&x=1"), None);
        assert_eq!(parse_user_link("tg://user?id=99999999999999999999"), None);
    }

    #[test]
    fn message_link_without_supergroup_prefix() {
        assert_eq!(MessageRef::new(-4242, 3).link(), "https://t.me/c/4242/3");
    }

    #[test]
    fn message_link_strips_at_sign() {
        let msg = MessageRef::new(1, 9).with_username("@chan");
        assert_eq!(msg.link(), "https://t.me/chan/9");
    }

    #[test]
    fn user_roundtrips_wire_fields() {
        let json = r#"{"id":7,"is_bot":false,"first_name":"Bob","username":"bob"}"#;
        let user: User = serde_json::from_str(json).expect("valid user json");
        assert_eq!(user.username.as_deref(), Some("bob"));
        assert_eq!(serde_json::to_string(&user).expect("serialize user"), json);
    }
}
