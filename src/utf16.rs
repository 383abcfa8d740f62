//! UTF-16 addressing helpers.
//!
//! Entity offsets are counted in UTF-16 code units, so a character outside
//! the Basic Multilingual Plane occupies two units while Rust strings index
//! by byte. These helpers translate between the two without materialising a
//! UTF-16 buffer.

/// Number of UTF-16 code units needed to encode `s`.
///
/// # Examples
///
/// ```
/// assert_eq!(tgtext::utf16::len("abc"), 3);
/// assert_eq!(tgtext::utf16::len("a😀"), 3);
/// ```
#[must_use]
pub fn len(s: &str) -> usize { s.chars().map(char::len_utf16).sum() }

/// Convert a UTF-16 unit offset into a byte offset within `s`.
///
/// Returns `None` when `unit` lies past the end of `s` or falls between the
/// two halves of a surrogate pair.
#[must_use]
pub fn byte_offset(s: &str, unit: usize) -> Option<usize> {
    let mut units = 0;
    for (idx, ch) in s.char_indices() {
        if units == unit {
            return Some(idx);
        }
        if units > unit {
            return None;
        }
        units += ch.len_utf16();
    }
    (units == unit).then_some(s.len())
}

/// Borrow the substring covering the UTF-16 range `[start, end)`.
///
/// Returns `None` when the range is inverted, out of bounds, or splits a
/// surrogate pair.
#[must_use]
pub fn slice(s: &str, start: usize, end: usize) -> Option<&str> {
    if start > end {
        return None;
    }
    let from = byte_offset(s, start)?;
    let rest = &s[from..];
    let to = byte_offset(rest, end - start)?;
    Some(&rest[..to])
}

/// Returns `true` when `unit` is a valid boundary in `s`.
#[must_use]
pub fn is_boundary(s: &str, unit: usize) -> bool { byte_offset(s, unit).is_some() }

/// First of `units` that is not a boundary in `s`, found in one pass.
///
/// `units` must be sorted ascending and no greater than `len(s)`.
#[must_use]
pub fn first_non_boundary(s: &str, units: &[usize]) -> Option<usize> {
    let mut chars = s.chars();
    let mut at = 0;
    for &unit in units {
        while at < unit {
            match chars.next() {
                Some(ch) => at += ch.len_utf16(),
                None => return Some(unit),
            }
        }
        if at != unit {
            return Some(unit);
        }
    }
    None
}
