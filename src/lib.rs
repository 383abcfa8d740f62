//! Telegram-style formatted text.
//!
//! A [`Text`] is a string plus a list of [`Entity`] ranges measured in
//! UTF-16 code units. Texts are parsed from an HTML subset or a Markdown
//! dialect, rendered back to either, and sliced or concatenated with the
//! entities kept consistent.
//!
//! ```
//! use tgtext::{Text, parse_html};
//!
//! let text = parse_html("<b>hi</b> there").unwrap();
//! assert_eq!(text.to_markdown_string(), "*hi* there");
//! assert_eq!(text.sub_sequence(1, 4), Text::bold("i").concat(&Text::plain(" t")));
//! ```

pub mod builder;
pub mod convert;
pub mod entity;
pub mod error;
pub mod escape;
pub mod html;
pub mod io;
pub mod logging;
pub mod markdown;
pub mod peer;
mod render;
pub mod text;
pub mod utf16;

pub use builder::TextBuilder;
pub use convert::{ConvertError, Format, convert};
pub use entity::{Entity, EntityKind};
pub use error::{Dialect, MarkupSyntaxError, SyntaxErrorKind, TextError, WireError};
pub use html::{parse_html, parse_html_opt, to_html};
pub use io::{RewriteError, rewrite};
pub use markdown::{parse_markdown, parse_markdown_opt, to_markdown};
pub use peer::{MessageRef, User};
pub use text::{Link, Mention, Text};
