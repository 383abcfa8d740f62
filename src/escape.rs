//! Escaping of literal characters that collide with markup syntax.

use std::borrow::Cow;

use crate::error::{Dialect, MarkupSyntaxError, SyntaxErrorKind};

/// Characters that start Markdown syntax and must be backslash-escaped in
/// literal text.
pub const MARKDOWN_SPECIAL: &[char] = &['*', '_', '`', '[', ']', '\\'];

/// Characters that end or escape a Markdown link destination.
const MARKDOWN_URL_SPECIAL: &[char] = &[')', '\\'];

fn escape_with(s: &str, special: impl Fn(char) -> Option<&'static str>) -> Cow<'_, str> {
    if !s.chars().any(|c| special(c).is_some()) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match special(ch) {
            Some(rep) => out.push_str(rep),
            None => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Replace `<`, `>` and `&` with named references.
///
/// # Examples
///
/// ```
/// assert_eq!(tgtext::escape::escape_html("a < b && c"), "a &lt; b &amp;&amp; c");
/// ```
#[must_use]
pub fn escape_html(s: &str) -> Cow<'_, str> {
    escape_with(s, |c| match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        _ => None,
    })
}

/// Like [`escape_html`], also escaping `"` for use inside a quoted
/// attribute value.
#[must_use]
pub fn escape_html_attribute(s: &str) -> Cow<'_, str> {
    escape_with(s, |c| match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        _ => None,
    })
}

/// Decode the character reference at the start of `s`.
///
/// `s` must begin with `&`. Returns the character and the number of bytes
/// consumed, including the terminating `;`. Named references are limited to
/// `lt`, `gt`, `amp` and `quot`; decimal and hexadecimal numeric references
/// are accepted for any scalar value.
#[must_use]
pub fn decode_reference(s: &str) -> Option<(char, usize)> {
    let body = s.strip_prefix('&')?;
    let end = body.find(';')?;
    let name = &body[..end];
    let ch = match name {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) if !hex.is_empty() && hex.len() <= 6 => u32::from_str_radix(hex, 16).ok()?,
                Some(_) => return None,
                None if !digits.is_empty() && digits.len() <= 7 => digits.parse().ok()?,
                None => return None,
            };
            char::from_u32(code)?
        }
    };
    Some((ch, end + 2))
}

/// Decode every reference in `s`, rejecting bare `<`, `>` and malformed
/// `&` sequences.
///
/// # Errors
/// Returns [`MarkupSyntaxError`] at the first reserved character that is
/// not part of a valid reference.
pub fn unescape_html(s: &str) -> Result<String, MarkupSyntaxError> {
    let mut out = String::with_capacity(s.len());
    let mut idx = 0;
    while let Some(ch) = s[idx..].chars().next() {
        match ch {
            '&' => {
                let (decoded, used) = decode_reference(&s[idx..]).ok_or_else(|| {
                    MarkupSyntaxError::new(Dialect::Html, s, idx, SyntaxErrorKind::MalformedReference)
                })?;
                out.push(decoded);
                idx += used;
            }
            '<' | '>' => {
                return Err(MarkupSyntaxError::new(
                    Dialect::Html,
                    s,
                    idx,
                    SyntaxErrorKind::ReservedCharacter(ch),
                ));
            }
            _ => {
                out.push(ch);
                idx += ch.len_utf8();
            }
        }
    }
    Ok(out)
}

/// Backslash-escape Markdown sigils in literal text.
///
/// # Examples
///
/// ```
/// assert_eq!(tgtext::escape::escape_markdown("2*3_4"), r"2\*3\_4");
/// ```
#[must_use]
pub fn escape_markdown(s: &str) -> Cow<'_, str> { backslash_escape(s, MARKDOWN_SPECIAL) }

/// Backslash-escape characters that would end a link destination.
#[must_use]
pub fn escape_markdown_url(s: &str) -> Cow<'_, str> { backslash_escape(s, MARKDOWN_URL_SPECIAL) }

fn backslash_escape<'a>(s: &'a str, special: &[char]) -> Cow<'a, str> {
    if !s.contains(special) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        if special.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    Cow::Owned(out)
}

/// Remove backslash escapes: `\x` becomes `x` for any character `x`.
///
/// # Errors
/// Returns [`MarkupSyntaxError`] when `s` ends with a lone backslash.
pub fn unescape_markdown(s: &str) -> Result<String, MarkupSyntaxError> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.char_indices();
    while let Some((idx, ch)) = chars.next() {
        if ch == '\\' {
            let (_, next) = chars.next().ok_or_else(|| {
                MarkupSyntaxError::new(Dialect::Markdown, s, idx, SyntaxErrorKind::DanglingEscape)
            })?;
            out.push(next);
        } else {
            out.push(ch);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn escape_borrows_when_clean() {
        assert!(matches!(escape_html("plain"), Cow::Borrowed("plain")));
        assert!(matches!(escape_markdown("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn attribute_escapes_quotes() {
        assert_eq!(escape_html_attribute(r#"a"b&c"#), "a&quot;b&amp;c");
    }

    #[rstest]
    #[case::lt("&lt;", Some(('<', 4)))]
    #[case::gt("&gt;rest", Some(('>', 4)))]
    #[case::amp("&amp;", Some(('&', 5)))]
    #[case::quot("&quot;", Some(('"', 6)))]
    #[case::decimal("&#65;", Some(('A', 5)))]
    #[case::hex("&#x1F600;", Some(('😀', 9)))]
    #[case::unknown("&nbsp;", None)]
    #[case::unterminated("&lt", None)]
    #[case::empty_hex("&#x;", None)]
    #[case::surrogate("&#xD800;", None)]
    #[case::bare("& b", None)]
    fn decodes_references(#[case] input: &str, #[case] expected: Option<(char, usize)>) {
        assert_eq!(decode_reference(input), expected);
    }

    #[test]
    fn unescape_html_decodes_all() {
        assert_eq!(unescape_html("1 &lt; 2 &amp;&amp; 3 &gt; 2").expect("valid"), "1 < 2 && 3 > 2");
    }

    #[rstest]
    #[case::bare_lt("a < b", 2)]
    #[case::bare_gt("a > b", 2)]
    #[case::bad_amp("fish & chips", 5)]
    fn unescape_html_rejects(#[case] input: &str, #[case] position: usize) {
        let err = unescape_html(input).expect_err("must fail");
        assert_eq!(err.position, position);
    }

    #[test]
    fn markdown_escape_roundtrip() {
        let raw = r"a*b_c`d[e]f\g";
        let escaped = escape_markdown(raw);
        assert_eq!(escaped, r"a\*b\_c\`d\[e\]f\\g");
        assert_eq!(unescape_markdown(&escaped).expect("valid"), raw);
    }

    #[test]
    fn markdown_url_escape() {
        assert_eq!(escape_markdown_url("https://x.y/(a)"), r"https://x.y/(a\)");
    }

    #[test]
    fn dangling_escape_is_error() {
        let err = unescape_markdown("oops\\").expect_err("must fail");
        assert_eq!(err.kind, SyntaxErrorKind::DanglingEscape);
        assert_eq!(err.position, 4);
    }
}
