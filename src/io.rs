//! File helpers for converting documents in place.

use std::{fs, path::Path};

use thiserror::Error;

use crate::convert::{ConvertError, Format, convert};

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// Convert a file from `from` to `to` and write the result back.
///
/// The file is left untouched when conversion fails.
///
/// # Errors
/// Returns an error if reading, converting or writing the file fails.
pub fn rewrite(path: &Path, from: Format, to: Format, trim: bool) -> Result<(), RewriteError> {
    let input = fs::read_to_string(path)?;
    let output = convert(&input, from, to, trim)?;
    fs::write(path, output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn rewrite_converts_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("message.html");
        fs::write(&file, "<b>hi</b> <i>there</i>").unwrap();
        rewrite(&file, Format::Html, Format::Markdown, false).unwrap();
        let out = fs::read_to_string(&file).unwrap();
        assert_eq!(out, "*hi* _there_");
    }

    #[test]
    fn rewrite_keeps_file_on_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("broken.md");
        fs::write(&file, "*open").unwrap();
        let err = rewrite(&file, Format::Markdown, Format::Html, false).unwrap_err();
        assert!(matches!(err, RewriteError::Convert(ConvertError::Markup(_))));
        assert_eq!(fs::read_to_string(&file).unwrap(), "*open");
    }

    #[test]
    fn rewrite_missing_file() {
        let dir = tempdir().unwrap();
        let err = rewrite(&dir.path().join("absent"), Format::Html, Format::Plain, false).unwrap_err();
        assert!(matches!(err, RewriteError::Io(_)));
    }
}
