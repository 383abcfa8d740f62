//! Entity-boundary walk shared by the HTML and Markdown serializers.
//!
//! The text is cut at every entity start and end. At each cut the walk
//! closes the entities ending there, innermost first, then opens the ones
//! starting there, longest first. Properly nested entities therefore come
//! out properly nested; overlapping ones come out interleaved.

use std::collections::BTreeMap;

use tracing::{trace, warn};

use crate::{entity::Entity, text::Text};

/// Receives the pieces of a text in output order.
pub(crate) trait MarkupWriter {
    fn literal(&mut self, s: &str);
    fn open(&mut self, entity: &Entity);
    fn close(&mut self, entity: &Entity);
}

/// Feed `text` to `writer`.
pub(crate) fn render(text: &Text, writer: &mut impl MarkupWriter) {
    let raw = text.as_str();
    let entities: Vec<&Entity> = text
        .entities()
        .iter()
        .filter(|e| {
            if e.length() == 0 {
                trace!(kind = %e.kind(), offset = e.offset(), "skipping empty entity");
            }
            e.length() > 0
        })
        .collect();

    // Entities starting at each cut, longest first. Ends get an empty bucket
    // so the walk still stops there to close.
    let mut starts: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, e) in entities.iter().enumerate() {
        starts.entry(e.offset()).or_default().push(i);
        starts.entry(e.end()).or_default();
    }
    starts.entry(text.len()).or_default();
    for bucket in starts.values_mut() {
        bucket.sort_by(|&a, &b| entities[b].end().cmp(&entities[a].end()).then(a.cmp(&b)));
    }

    let mut open: Vec<usize> = Vec::new();
    let mut cursor = Cursor::default();
    for (cut, starting) in starts {
        let from = cursor.byte;
        cursor.advance(raw, cut);
        if cursor.byte > from {
            writer.literal(&raw[from..cursor.byte]);
        }

        let mut idx = open.len();
        while idx > 0 {
            idx -= 1;
            let entity = entities[open[idx]];
            if entity.end() == cut {
                if idx + 1 != open.len() {
                    warn!(
                        kind = %entity.kind(),
                        offset = entity.offset(),
                        "overlapping entities cannot nest; output tags interleave"
                    );
                }
                writer.close(entity);
                open.remove(idx);
            }
        }

        for i in starting {
            writer.open(entities[i]);
            open.push(i);
        }
    }
}

/// Position in a string tracked both in UTF-16 units and bytes.
#[derive(Default)]
struct Cursor {
    unit: usize,
    byte: usize,
}

impl Cursor {
    /// Move forward to the UTF-16 offset `target`, which must be a character
    /// boundary at or after the current position.
    fn advance(&mut self, s: &str, target: usize) {
        for ch in s[self.byte..].chars() {
            if self.unit >= target {
                break;
            }
            self.unit += ch.len_utf16();
            self.byte += ch.len_utf8();
        }
    }
}
