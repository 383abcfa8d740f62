//! The HTML subset: parsing into [`Text`] and rendering back.
//!
//! Recognised tags are `<b>`/`<strong>`, `<i>`/`<em>`, `<u>`/`<ins>`,
//! `<s>`/`<strike>`/`<del>`, `<a href="...">`, `<code>` and `<pre>`. Tag
//! names are case-insensitive. Outside tags, `<`, `>` and `&` may only
//! appear as character references (`&lt;`, `&gt;`, `&amp;`, `&quot;` or a
//! numeric reference). Anything else is a [`MarkupSyntaxError`]; nothing is
//! silently repaired.

use tracing::debug;

use crate::{
    builder::TextBuilder,
    entity::{Entity, EntityKind},
    error::{Dialect, MarkupSyntaxError, SyntaxErrorKind},
    escape::{decode_reference, escape_html, escape_html_attribute, unescape_html},
    render::{MarkupWriter, render},
    text::Text,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Anchor,
    Code,
    Pre,
}

impl Tag {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "b" | "strong" => Self::Bold,
            "i" | "em" => Self::Italic,
            "u" | "ins" => Self::Underline,
            "s" | "strike" | "del" => Self::Strikethrough,
            "a" => Self::Anchor,
            "code" => Self::Code,
            "pre" => Self::Pre,
            _ => return None,
        })
    }

    fn is_verbatim(self) -> bool { matches!(self, Self::Code | Self::Pre) }
}

#[derive(Debug)]
struct OpenTag {
    tag: Tag,
    name: String,
    position: usize,
    entity: usize,
}

struct HtmlParser<'a> {
    input: &'a str,
    pos: usize,
    out: TextBuilder,
    stack: Vec<OpenTag>,
}

impl<'a> HtmlParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            out: TextBuilder::new(),
            stack: Vec::new(),
        }
    }

    fn error(&self, position: usize, kind: SyntaxErrorKind) -> MarkupSyntaxError {
        MarkupSyntaxError::new(Dialect::Html, self.input, position, kind)
    }

    fn run(mut self) -> Result<Text, MarkupSyntaxError> {
        let input = self.input;
        while let Some(ch) = input[self.pos..].chars().next() {
            match ch {
                '<' => self.tag()?,
                '&' => self.reference()?,
                '>' => return Err(self.error(self.pos, SyntaxErrorKind::ReservedCharacter('>'))),
                _ => {
                    let rest = &input[self.pos..];
                    let run = rest.find(['<', '>', '&']).unwrap_or(rest.len());
                    self.out.append_str(&rest[..run]);
                    self.pos += run;
                }
            }
        }
        if let Some(open) = self.stack.last() {
            return Err(self.error(
                open.position,
                SyntaxErrorKind::UnterminatedTag(open.name.clone()),
            ));
        }
        Ok(self.out.build())
    }

    fn reference(&mut self) -> Result<(), MarkupSyntaxError> {
        let (ch, used) = decode_reference(&self.input[self.pos..])
            .ok_or_else(|| self.error(self.pos, SyntaxErrorKind::MalformedReference))?;
        self.out.push_char(ch);
        self.pos += used;
        Ok(())
    }

    fn tag(&mut self) -> Result<(), MarkupSyntaxError> {
        let input = self.input;
        let start = self.pos;
        let body_start = start + 1;
        let rest = &input[body_start..];
        let bare_lt = || self.error(start, SyntaxErrorKind::ReservedCharacter('<'));
        let close = rest.find('>').ok_or_else(bare_lt)?;
        let body = &rest[..close];
        if body.contains('<') {
            return Err(bare_lt());
        }
        self.pos = body_start + close + 1;
        match body.strip_prefix('/') {
            Some(name) => self.close_tag(name.trim_end(), start),
            None => self.open_tag(body, body_start, start),
        }
    }

    fn open_tag(&mut self, body: &str, body_start: usize, start: usize) -> Result<(), MarkupSyntaxError> {
        let name_end = body.find(|c: char| c.is_ascii_whitespace()).unwrap_or(body.len());
        let name = &body[..name_end];
        if name.is_empty() {
            return Err(self.error(start, SyntaxErrorKind::ReservedCharacter('<')));
        }
        if let Some(top) = self.stack.last()
            && top.tag.is_verbatim()
        {
            return Err(self.error(start, SyntaxErrorKind::MarkupInsideCode(top.name.clone())));
        }
        let name = name.to_ascii_lowercase();
        let tag = Tag::from_name(&name)
            .ok_or_else(|| self.error(start, SyntaxErrorKind::UnknownTag(name.clone())))?;
        let kind = match tag {
            Tag::Bold => EntityKind::Bold,
            Tag::Italic => EntityKind::Italic,
            Tag::Underline => EntityKind::Underline,
            Tag::Strikethrough => EntityKind::Strikethrough,
            Tag::Code => EntityKind::Code,
            Tag::Pre => EntityKind::CodeBlock,
            Tag::Anchor => {
                let attrs = &body[name_end..];
                let (value_at, value) = attribute(attrs, "href")
                    .ok_or_else(|| self.error(start, SyntaxErrorKind::MissingHref))?;
                let href = unescape_html(value).map_err(|e| {
                    self.error(body_start + name_end + value_at + e.position, e.kind)
                })?;
                if href.is_empty() {
                    return Err(self.error(start, SyntaxErrorKind::MissingHref));
                }
                EntityKind::for_url(href)
            }
        };
        let entity = self.out.open_entity(kind);
        self.stack.push(OpenTag {
            tag,
            name,
            position: start,
            entity,
        });
        Ok(())
    }

    fn close_tag(&mut self, name: &str, start: usize) -> Result<(), MarkupSyntaxError> {
        let name = name.to_ascii_lowercase();
        let Some(top) = self.stack.pop() else {
            return Err(self.error(start, SyntaxErrorKind::UnopenedTag(name)));
        };
        if top.name != name {
            return Err(self.error(
                start,
                SyntaxErrorKind::MismatchedTag {
                    expected: top.name,
                    found: name,
                },
            ));
        }
        self.out.close_entity(top.entity);
        Ok(())
    }
}

/// Find attribute `name` in `attrs` and return the byte offset of its value
/// within `attrs` together with the raw (still escaped) value.
fn attribute<'a>(attrs: &'a str, name: &str) -> Option<(usize, &'a str)> {
    let mut idx = 0;
    loop {
        idx += attrs[idx..].len() - attrs[idx..].trim_start().len();
        if idx >= attrs.len() {
            return None;
        }
        let key_len = attrs[idx..]
            .find(|c: char| c == '=' || c.is_ascii_whitespace())
            .unwrap_or(attrs.len() - idx);
        let key = &attrs[idx..idx + key_len];
        idx += key_len;
        idx += attrs[idx..].len() - attrs[idx..].trim_start().len();
        let (value_at, value) = if attrs[idx..].starts_with('=') {
            idx += 1;
            idx += attrs[idx..].len() - attrs[idx..].trim_start().len();
            let rest = &attrs[idx..];
            match rest.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let len = rest[1..].find(quote)?;
                    let at = idx + 1;
                    idx = at + len + 1;
                    (at, &attrs[at..at + len])
                }
                _ => {
                    let len = rest.find(|c: char| c.is_ascii_whitespace()).unwrap_or(rest.len());
                    let at = idx;
                    idx += len;
                    (at, &attrs[at..at + len])
                }
            }
        } else {
            (idx, "")
        };
        if key.eq_ignore_ascii_case(name) {
            return Some((value_at, value));
        }
        if key.is_empty() {
            return None;
        }
    }
}

/// Parse the HTML subset into a [`Text`].
///
/// # Errors
/// Returns [`MarkupSyntaxError`] for unknown, mismatched or unterminated
/// tags, `<a>` without `href`, tags inside `<code>`/`<pre>`, and bare or
/// malformed reserved characters.
///
/// # Examples
///
/// ```
/// use tgtext::{Entity, EntityKind, html::parse_html};
///
/// let text = parse_html("<b>hi</b> there").unwrap();
/// assert_eq!(text.as_str(), "hi there");
/// assert_eq!(text.entities(), [Entity::new(EntityKind::Bold, 0, 2)]);
/// ```
pub fn parse_html(input: &str) -> Result<Text, MarkupSyntaxError> {
    let text = HtmlParser::new(input).run()?;
    debug!(
        bytes = input.len(),
        entities = text.entities().len(),
        "parsed html"
    );
    Ok(text)
}

/// [`parse_html`] that passes `None` through.
///
/// # Errors
/// As for [`parse_html`].
pub fn parse_html_opt(input: Option<&str>) -> Result<Option<Text>, MarkupSyntaxError> {
    input.map(parse_html).transpose()
}

struct HtmlWriter {
    out: String,
}

impl HtmlWriter {
    fn tag_name(entity: &Entity) -> Option<&'static str> {
        match entity.kind() {
            EntityKind::Bold => Some("b"),
            EntityKind::Italic => Some("i"),
            EntityKind::Underline => Some("u"),
            EntityKind::Strikethrough => Some("s"),
            EntityKind::Code => Some("code"),
            EntityKind::CodeBlock => Some("pre"),
            EntityKind::Link { .. } | EntityKind::TextMention { .. } => Some("a"),
            _ => None,
        }
    }
}

impl MarkupWriter for HtmlWriter {
    fn literal(&mut self, s: &str) { self.out.push_str(&escape_html(s)); }

    fn open(&mut self, entity: &Entity) {
        match entity.kind() {
            EntityKind::Link { url } => {
                self.out.push_str("<a href=\"");
                self.out.push_str(&escape_html_attribute(url));
                self.out.push_str("\">");
            }
            EntityKind::TextMention { user } => {
                self.out.push_str("<a href=\"");
                self.out.push_str(&user.deep_link());
                self.out.push_str("\">");
            }
            _ => {
                if let Some(name) = Self::tag_name(entity) {
                    self.out.push('<');
                    self.out.push_str(name);
                    self.out.push('>');
                }
            }
        }
    }

    fn close(&mut self, entity: &Entity) {
        if let Some(name) = Self::tag_name(entity) {
            self.out.push_str("</");
            self.out.push_str(name);
            self.out.push('>');
        }
    }
}

/// Render `text` in the HTML subset.
///
/// Auto-detected entities (urls, hashtags, mentions, ...) render as plain
/// text.
///
/// # Examples
///
/// ```
/// use tgtext::Text;
///
/// let text = Text::bold("a<b").concat(&Text::plain(" & c"));
/// assert_eq!(tgtext::html::to_html(&text), "<b>a&lt;b</b> &amp; c");
/// ```
#[must_use]
pub fn to_html(text: &Text) -> String {
    let mut writer = HtmlWriter {
        out: String::with_capacity(text.as_str().len() + 16 * text.entities().len()),
    };
    render(text, &mut writer);
    debug!(entities = text.entities().len(), "rendered html");
    writer.out
}
