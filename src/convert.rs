//! Conversion between markup dialects and the wire payload.

use std::{fmt, str::FromStr};

use thiserror::Error;
use tracing::debug;

use crate::{error::MarkupSyntaxError, html, markdown, text::Text};

/// Representation a [`Text`] is read from or written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Format {
    /// The HTML subset.
    Html,
    /// The Markdown dialect.
    Markdown,
    /// Wire payload: `{"text": ..., "entities": [...]}`.
    Json,
    /// The bare string; formatting is lost on output and absent on input.
    Plain,
}

impl Format {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "markdown",
            Self::Json => "json",
            Self::Plain => "plain",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Format {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "plain" | "text" => Ok(Self::Plain),
            _ => Err(ConvertError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Markup(#[from] MarkupSyntaxError),
    #[error("invalid wire payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown format `{0}`")]
    UnknownFormat(String),
}

/// Read `input` as `format`.
///
/// # Errors
/// Returns [`ConvertError`] when `input` is not valid in `format`.
pub fn parse(input: &str, format: Format) -> Result<Text, ConvertError> {
    Ok(match format {
        Format::Html => html::parse_html(input)?,
        Format::Markdown => markdown::parse_markdown(input)?,
        Format::Json => serde_json::from_str(input)?,
        Format::Plain => Text::plain(input),
    })
}

/// Write `text` as `format`.
///
/// # Errors
/// Returns [`ConvertError::Json`] if the wire payload cannot be serialized.
pub fn render(text: &Text, format: Format) -> Result<String, ConvertError> {
    Ok(match format {
        Format::Html => html::to_html(text),
        Format::Markdown => markdown::to_markdown(text),
        Format::Json => serde_json::to_string(text)?,
        Format::Plain => text.as_str().to_string(),
    })
}

/// Parse `input` as `from` and render it as `to`, optionally trimming
/// surrounding spaces in between.
///
/// # Errors
/// Returns [`ConvertError`] if parsing or rendering fails.
///
/// # Examples
///
/// ```
/// use tgtext::convert::{Format, convert};
///
/// let out = convert("<b>hi</b> &amp; bye ", Format::Html, Format::Markdown, true).unwrap();
/// assert_eq!(out, "*hi* & bye");
/// ```
pub fn convert(input: &str, from: Format, to: Format, trim: bool) -> Result<String, ConvertError> {
    let mut text = parse(input, from)?;
    if trim {
        text = text.trim();
    }
    debug!(%from, %to, units = text.len(), "converting");
    render(&text, to)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::error::SyntaxErrorKind;

    #[rstest]
    #[case::html_to_md(Format::Html, Format::Markdown, "<i>a</i>_b", r"_a_\_b")]
    #[case::md_to_html(Format::Markdown, Format::Html, "[x](https://a.b?c&d)", r#"<a href="https://a.b?c&amp;d">x</a>"#)]
    #[case::html_to_json(
        Format::Html,
        Format::Json,
        "<b>hi</b> there",
        r#"{"text":"hi there","entities":[{"type":"bold","offset":0,"length":2}]}"#
    )]
    #[case::json_to_html(Format::Json, Format::Html, r#"{"text":"a<b"}"#, "a&lt;b")]
    #[case::plain_to_md(Format::Plain, Format::Markdown, "*", r"\*")]
    #[case::html_to_plain(Format::Html, Format::Plain, "<code>x</code>", "x")]
    fn converts(#[case] from: Format, #[case] to: Format, #[case] input: &str, #[case] expected: &str) {
        assert_eq!(convert(input, from, to, false).expect("valid input"), expected);
    }

    #[test]
    fn trims_after_parsing() {
        let out = convert("  <b> x </b>  ", Format::Html, Format::Json, true).expect("valid input");
        assert_eq!(
            out,
            r#"{"text":"x","entities":[{"type":"bold","offset":0,"length":1}]}"#
        );
    }

    #[test]
    fn reports_markup_errors() {
        let err = convert("<b>no close", Format::Html, Format::Plain, false).expect_err("must fail");
        match err {
            ConvertError::Markup(e) => assert_eq!(e.kind, SyntaxErrorKind::UnterminatedTag("b".into())),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reports_wire_errors() {
        let err = parse(r#"{"text":"ab","entities":[{"type":"bold","offset":1,"length":5}]}"#, Format::Json)
            .expect_err("entity past the end");
        assert!(matches!(err, ConvertError::Json(_)));
    }

    #[rstest]
    #[case("HTML", Format::Html)]
    #[case("md", Format::Markdown)]
    #[case("text", Format::Plain)]
    fn parses_format_names(#[case] name: &str, #[case] format: Format) {
        assert_eq!(name.parse::<Format>().expect("known format"), format);
    }
}
