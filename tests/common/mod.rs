//! Utility helpers shared across integration tests.

use std::{fs, path::PathBuf};

use tempfile::TempDir;
use tgtext::{Entity, EntityKind, Text};

/// Build a `Vec<Entity>` from `kind, offset, length` triples.
///
/// Kinds without a payload can be named bare; others take any expression.
macro_rules! entities {
    ($($kind:expr, $offset:expr, $length:expr);* $(;)?) => {
        vec![$(tgtext::Entity::new($kind, $offset, $length)),*]
    };
}

/// Write `files` into a fresh temporary directory and return their paths in
/// the same order.
pub fn write_files(files: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().expect("failed to create temporary directory");
    let paths = files
        .iter()
        .map(|(name, content)| {
            let path = dir.path().join(name);
            fs::write(&path, content).expect("failed to write temporary file");
            path
        })
        .collect();
    (dir, paths)
}

/// Assert that `text` carries exactly `expected`, with a readable diff of
/// the covered substrings on failure.
pub fn assert_entities(text: &Text, expected: &[Entity]) {
    let describe = |entities: &[Entity]| -> Vec<String> {
        entities
            .iter()
            .map(|e| {
                let covered = tgtext::utf16::slice(text.as_str(), e.offset(), e.end()).unwrap_or("<out of range>");
                format!("{}({}, {}) {covered:?}", e.kind(), e.offset(), e.length())
            })
            .collect()
    };
    assert_eq!(
        text.entities(),
        expected,
        "\n actual: {:?}\n expected: {:?}",
        describe(text.entities()),
        describe(expected)
    );
}

/// Every entity of `text` lies within it and on character boundaries.
pub fn assert_well_formed(text: &Text) {
    assert_eq!(text.len(), tgtext::utf16::len(text.as_str()));
    for e in text.entities() {
        assert!(e.end() <= text.len(), "{e:?} past the end of {text:?}");
        assert!(tgtext::utf16::is_boundary(text.as_str(), e.offset()), "{e:?} starts inside a pair");
        assert!(tgtext::utf16::is_boundary(text.as_str(), e.end()), "{e:?} ends inside a pair");
    }
}

/// A text mixing nested, adjacent and astral-plane formatting.
pub fn mixed_text() -> Text {
    Text::new(
        "😀 bold italic 𝄞 code",
        entities![
            EntityKind::Bold, 3, 11;
            EntityKind::Italic, 8, 6;
            EntityKind::Code, 18, 4;
        ],
    )
    .expect("valid text")
}
