//! The Markdown dialect: parsing into [`Text`] and rendering back.
//!
//! Syntax:
//!
//! - `*bold*` and `_italic_`, which may nest in each other and in link text;
//! - `` `code` `` and ```` ```code block``` ````, whose content is literal;
//! - `[text](url)`, or `[text](tg://user?id=123)` for a text mention;
//! - `\x` for a literal `x`, anywhere, including inside code and urls.
//!
//! `]`, `(` and `)` are literal outside link syntax. An unclosed or
//! misnested sigil is a [`MarkupSyntaxError`].

use tracing::debug;

use crate::{
    builder::TextBuilder,
    entity::{Entity, EntityKind},
    error::{Dialect, MarkupSyntaxError, SyntaxErrorKind},
    escape::{MARKDOWN_SPECIAL, escape_markdown, escape_markdown_url},
    render::{MarkupWriter, render},
    text::Text,
};

const FENCE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Span {
    Bold,
    Italic,
    Link,
}

impl Span {
    fn sigil(self) -> &'static str {
        match self {
            Self::Bold => "*",
            Self::Italic => "_",
            Self::Link => "[",
        }
    }
}

#[derive(Debug)]
struct OpenSpan {
    span: Span,
    position: usize,
    entity: usize,
}

struct MarkdownParser<'a> {
    input: &'a str,
    pos: usize,
    out: TextBuilder,
    stack: Vec<OpenSpan>,
}

impl<'a> MarkdownParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            out: TextBuilder::new(),
            stack: Vec::new(),
        }
    }

    fn error(&self, position: usize, kind: SyntaxErrorKind) -> MarkupSyntaxError {
        MarkupSyntaxError::new(Dialect::Markdown, self.input, position, kind)
    }

    fn run(mut self) -> Result<Text, MarkupSyntaxError> {
        let input = self.input;
        while let Some(ch) = input[self.pos..].chars().next() {
            match ch {
                '\\' => {
                    let escaped = self.escaped(self.pos)?;
                    self.out.push_char(escaped);
                    self.pos += 1 + escaped.len_utf8();
                }
                '*' => self.toggle(Span::Bold)?,
                '_' => self.toggle(Span::Italic)?,
                '`' => self.code()?,
                '[' => self.open(Span::Link),
                ']' if self.stack.iter().any(|s| s.span == Span::Link) => self.close_link()?,
                _ => {
                    let rest = &input[self.pos..];
                    let first = ch.len_utf8();
                    let run = rest[first..]
                        .find(MARKDOWN_SPECIAL)
                        .map_or(rest.len(), |i| first + i);
                    self.out.append_str(&rest[..run]);
                    self.pos += run;
                }
            }
        }
        if let Some(open) = self.stack.last() {
            return Err(self.error(
                open.position,
                SyntaxErrorKind::UnterminatedSigil(open.span.sigil()),
            ));
        }
        Ok(self.out.build())
    }

    /// Character escaped by the backslash at `at`.
    fn escaped(&self, at: usize) -> Result<char, MarkupSyntaxError> {
        self.input[at + 1..]
            .chars()
            .next()
            .ok_or_else(|| self.error(at, SyntaxErrorKind::DanglingEscape))
    }

    fn open(&mut self, span: Span) {
        let kind = match span {
            Span::Bold => EntityKind::Bold,
            Span::Italic => EntityKind::Italic,
            Span::Link => EntityKind::Link { url: String::new() },
        };
        let entity = self.out.open_entity(kind);
        self.stack.push(OpenSpan {
            span,
            position: self.pos,
            entity,
        });
        self.pos += 1;
    }

    /// Close `span` if it is innermost, open it if it is not open at all.
    fn toggle(&mut self, span: Span) -> Result<(), MarkupSyntaxError> {
        match self.stack.last() {
            Some(top) if top.span == span => {
                let entity = top.entity;
                self.stack.pop();
                self.out.close_entity(entity);
                self.pos += 1;
                Ok(())
            }
            Some(top) if self.stack.iter().any(|s| s.span == span) => Err(self.error(
                self.pos,
                SyntaxErrorKind::MismatchedSigil {
                    expected: top.span.sigil(),
                    found: span.sigil(),
                },
            )),
            _ => {
                self.open(span);
                Ok(())
            }
        }
    }

    /// `](url)` closing the innermost open link.
    fn close_link(&mut self) -> Result<(), MarkupSyntaxError> {
        let input = self.input;
        let bracket = self.pos;
        if let Some(top) = self.stack.last()
            && top.span != Span::Link
        {
            return Err(self.error(
                bracket,
                SyntaxErrorKind::MismatchedSigil {
                    expected: top.span.sigil(),
                    found: "]",
                },
            ));
        }
        let paren = bracket + 1;
        if !input[paren..].starts_with('(') {
            return Err(self.error(bracket, SyntaxErrorKind::MissingLinkTarget));
        }
        let mut url = String::new();
        let mut idx = paren + 1;
        loop {
            let Some(ch) = input[idx..].chars().next() else {
                return Err(self.error(paren, SyntaxErrorKind::UnterminatedSigil("(")));
            };
            match ch {
                ')' => break,
                '\\' => {
                    let escaped = self.escaped(idx)?;
                    url.push(escaped);
                    idx += 1 + escaped.len_utf8();
                }
                _ => {
                    url.push(ch);
                    idx += ch.len_utf8();
                }
            }
        }
        if url.is_empty() {
            return Err(self.error(bracket, SyntaxErrorKind::MissingLinkTarget));
        }
        if let Some(top) = self.stack.pop() {
            self.out.close_entity_as(top.entity, EntityKind::for_url(url));
        }
        self.pos = idx + 1;
        Ok(())
    }

    /// Inline code or a fenced code block starting at the current backtick.
    fn code(&mut self) -> Result<(), MarkupSyntaxError> {
        let input = self.input;
        let start = self.pos;
        let (fence, kind) = if input[start..].starts_with(FENCE) {
            (FENCE, EntityKind::CodeBlock)
        } else {
            ("`", EntityKind::Code)
        };
        let mut content = String::new();
        let mut idx = start + fence.len();
        loop {
            let rest = &input[idx..];
            if rest.starts_with(fence) {
                break;
            }
            let Some(ch) = rest.chars().next() else {
                return Err(self.error(start, SyntaxErrorKind::UnterminatedSigil(fence)));
            };
            if ch == '\\' {
                let escaped = self.escaped(idx)?;
                content.push(escaped);
                idx += 1 + escaped.len_utf8();
            } else {
                content.push(ch);
                idx += ch.len_utf8();
            }
        }
        self.out.append_styled(&content, kind);
        self.pos = idx + fence.len();
        Ok(())
    }
}

/// Parse the Markdown dialect into a [`Text`].
///
/// # Errors
/// Returns [`MarkupSyntaxError`] for unclosed or misnested sigils, link
/// text not followed by a non-empty `(url)`, and a trailing lone backslash.
///
/// # Examples
///
/// ```
/// use tgtext::{Entity, EntityKind, markdown::parse_markdown};
///
/// let text = parse_markdown("*bold* _ital_").unwrap();
/// assert_eq!(text.as_str(), "bold ital");
/// assert_eq!(
///     text.entities(),
///     [Entity::new(EntityKind::Bold, 0, 4), Entity::new(EntityKind::Italic, 5, 4)]
/// );
/// ```
pub fn parse_markdown(input: &str) -> Result<Text, MarkupSyntaxError> {
    let text = MarkdownParser::new(input).run()?;
    debug!(
        bytes = input.len(),
        entities = text.entities().len(),
        "parsed markdown"
    );
    Ok(text)
}

/// [`parse_markdown`] that passes `None` through.
///
/// # Errors
/// As for [`parse_markdown`].
pub fn parse_markdown_opt(input: Option<&str>) -> Result<Option<Text>, MarkupSyntaxError> {
    input.map(parse_markdown).transpose()
}

struct MarkdownWriter {
    out: String,
}

impl MarkupWriter for MarkdownWriter {
    fn literal(&mut self, s: &str) { self.out.push_str(&escape_markdown(s)); }

    fn open(&mut self, entity: &Entity) {
        match entity.kind() {
            EntityKind::Bold => self.out.push('*'),
            EntityKind::Italic => self.out.push('_'),
            EntityKind::Code => self.out.push('`'),
            EntityKind::CodeBlock => self.out.push_str(FENCE),
            EntityKind::Link { .. } | EntityKind::TextMention { .. } => self.out.push('['),
            _ => {}
        }
    }

    fn close(&mut self, entity: &Entity) {
        match entity.kind() {
            EntityKind::Bold => self.out.push('*'),
            EntityKind::Italic => self.out.push('_'),
            EntityKind::Code => self.out.push('`'),
            EntityKind::CodeBlock => self.out.push_str(FENCE),
            EntityKind::Link { url } => {
                self.out.push_str("](");
                self.out.push_str(&escape_markdown_url(url));
                self.out.push(')');
            }
            EntityKind::TextMention { user } => {
                self.out.push_str("](");
                self.out.push_str(&user.deep_link());
                self.out.push(')');
            }
            _ => {}
        }
    }
}

/// Render `text` in the Markdown dialect.
///
/// Underline, strikethrough and auto-detected entities have no Markdown
/// syntax and render as plain text.
///
/// # Examples
///
/// ```
/// use tgtext::Text;
///
/// let text = Text::bold("2*3").concat(&Text::link("docs", "https://docs.rs"));
/// assert_eq!(tgtext::markdown::to_markdown(&text), r"*2\*3*[docs](https://docs.rs)");
/// ```
#[must_use]
pub fn to_markdown(text: &Text) -> String {
    let mut writer = MarkdownWriter {
        out: String::with_capacity(text.as_str().len() + 4 * text.entities().len()),
    };
    render(text, &mut writer);
    debug!(entities = text.entities().len(), "rendered markdown");
    writer.out
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use rstest::rstest;

    use super::*;
    use crate::peer::User;

    fn entity(kind: EntityKind, offset: usize, length: usize) -> Entity {
        Entity::new(kind, offset, length)
    }

    #[test]
    fn parses_bold_and_italic() {
        let text = parse_markdown("*bold* _ital_").expect("valid markdown");
        assert_eq!(text.as_str(), "bold ital");
        assert_eq!(
            text.entities(),
            [entity(EntityKind::Bold, 0, 4), entity(EntityKind::Italic, 5, 4)]
        );
    }

    #[test]
    fn parses_nested_spans() {
        let text = parse_markdown("*a _b_ c*").expect("valid markdown");
        assert_eq!(text.as_str(), "a b c");
        assert_eq!(
            text.entities(),
            [entity(EntityKind::Bold, 0, 5), entity(EntityKind::Italic, 2, 1)]
        );
    }

    #[test]
    fn parses_code_literally() {
        let text = parse_markdown(r"`a*b_c` ```x [y]\`z```").expect("valid markdown");
        assert_eq!(text.as_str(), "a*b_c x [y]`z");
        assert_eq!(
            text.entities(),
            [entity(EntityKind::Code, 0, 5), entity(EntityKind::CodeBlock, 6, 7)]
        );
    }

    #[test]
    fn parses_links() {
        let text = parse_markdown(r"[*docs*](https://x.y/a\)b) [me](tg://user?id=5)").expect("valid markdown");
        assert_eq!(text.as_str(), "docs me");
        assert_eq!(
            text.entities(),
            [
                entity(
                    EntityKind::Link {
                        url: "https://x.y/a)b".into()
                    },
                    0,
                    4
                ),
                entity(EntityKind::Bold, 0, 4),
                entity(
                    EntityKind::TextMention {
                        user: User::with_id(5)
                    },
                    5,
                    2
                ),
            ]
        );
    }

    #[test]
    fn escapes_take_next_character_literally() {
        let text = parse_markdown(r"2\*3 = 6 \_ \\ \[x] (y)").expect("valid markdown");
        assert_eq!(text.as_str(), r"2*3 = 6 _ \ [x] (y)");
        assert!(text.entities().is_empty());
    }

    #[test]
    fn astral_characters_count_twice() {
        let text = parse_markdown("😀 *😀*").expect("valid markdown");
        assert_eq!(text.entities(), [entity(EntityKind::Bold, 3, 2)]);
    }

    #[rstest]
    #[case::bold("*open", 0, SyntaxErrorKind::UnterminatedSigil("*"))]
    #[case::italic("a _b", 2, SyntaxErrorKind::UnterminatedSigil("_"))]
    #[case::code("x `y", 2, SyntaxErrorKind::UnterminatedSigil("`"))]
    #[case::block("```y`", 0, SyntaxErrorKind::UnterminatedSigil("```"))]
    #[case::link("[a", 0, SyntaxErrorKind::UnterminatedSigil("["))]
    #[case::url("[a](b", 3, SyntaxErrorKind::UnterminatedSigil("("))]
    #[case::no_target("[a] b", 2, SyntaxErrorKind::MissingLinkTarget)]
    #[case::empty_target("[a]()", 2, SyntaxErrorKind::MissingLinkTarget)]
    #[case::misnested(
        "*a _b* c_",
        5,
        SyntaxErrorKind::MismatchedSigil { expected: "_", found: "*" }
    )]
    #[case::bold_across_link(
        "[*a](u)*",
        3,
        SyntaxErrorKind::MismatchedSigil { expected: "*", found: "]" }
    )]
    #[case::dangling("a\\", 1, SyntaxErrorKind::DanglingEscape)]
    fn rejects_malformed(#[case] input: &str, #[case] position: usize, #[case] kind: SyntaxErrorKind) {
        let err = parse_markdown(input).expect_err("must fail");
        assert_eq!(err.kind, kind);
        assert_eq!(err.position, position);
    }

    #[test]
    fn optional_input_passes_through() {
        assert_eq!(parse_markdown_opt(None), Ok(None));
        assert!(parse_markdown_opt(Some("*")).is_err());
    }

    #[test]
    fn renders_escaped_sigils() {
        let text = Text::plain(r"a*b_c`d[e]f\g").concat(&Text::code("x*y"));
        assert_snapshot!(to_markdown(&text), @r"a\*b\_c\`d\[e\]f\\g`x\*y`");
    }

    #[test]
    fn renders_links_mentions_and_blocks() {
        let text = Text::link("l", "https://x.y/(1)")
            .concat(&Text::plain(" "))
            .concat(&Text::text_mention("u", &User::with_id(3)))
            .concat(&Text::code_block("fn main() {}"))
            .concat(&Text::underline("plain"));
        assert_snapshot!(
            to_markdown(&text),
            @r"[l](https://x.y/(1\)) [u](tg://user?id=3)```fn main() {}```plain"
        );
    }
}
