//! Seeding engine: add a correction field to entries that lack one.
//!
//! Unlike [`crate::merge`], seeding edits every block of a document in
//! place and keeps entries in their original position.

use crate::codec::{self, TagPair};
use crate::types::TagSchema;

/// Seeded document and per-block counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seeding {
    pub text: String,
    /// Blocks that received a correction.
    pub seeded: usize,
    /// Blocks left alone: already corrected, no baseline, or no closing tag.
    pub skipped: usize,
}

/// Insert `<correction>baseline</correction>` as the last field of every
/// block that has a baseline but no correction.
///
/// The new field takes the indentation of the baseline's line (a single tab
/// when the baseline does not start a line).
pub fn seed(text: &str, tags: &TagSchema) -> Seeding {
    let entry = TagPair::new(&tags.entry);
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut seeded = 0;
    let mut skipped = 0;
    for span in entry.spans(text) {
        out.push_str(&text[cursor..span.start]);
        let block = &text[span.clone()];
        match seed_block(block, &entry, tags) {
            Some(updated) => {
                out.push_str(&updated);
                seeded += 1;
            }
            None => {
                out.push_str(block);
                skipped += 1;
            }
        }
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    Seeding {
        text: out,
        seeded,
        skipped,
    }
}

fn seed_block(block: &str, entry: &TagPair, tags: &TagSchema) -> Option<String> {
    if codec::field(block, &tags.correction).is_some() {
        return None;
    }
    let baseline = codec::field(block, &tags.baseline)?;
    let body = block.strip_suffix(&entry.close)?;
    let tail = body.trim_end().len();

    let indent = codec::line_indent(block, &tags.baseline).unwrap_or("\t");
    let tag = &tags.correction;
    let line_break = codec::leading_line_break(&body[tail..]);
    Some(format!(
        "{}{line_break}{indent}<{tag}>{baseline}</{tag}>{}",
        &block[..tail],
        &block[tail..]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> TagSchema {
        TagSchema::default()
    }

    #[test]
    fn inserts_correction_after_last_field() {
        let text = "<L>\n\t<Entry>\n\t\t<zType>A</zType>\n\t\t<ja>x <b>y</b></ja>\n\t</Entry>\n</L>\n";
        let seeding = seed(text, &tags());
        assert_eq!(seeding.seeded, 1);
        assert_eq!(
            seeding.text,
            "<L>\n\t<Entry>\n\t\t<zType>A</zType>\n\t\t<ja>x <b>y</b></ja>\n\t\t<fixja>x <b>y</b></fixja>\n\t</Entry>\n</L>\n"
        );
    }

    #[test]
    fn existing_corrections_and_missing_baselines_are_skipped() {
        let text = "<L>\n\t<Entry>\n\t\t<zType>A</zType>\n\t\t<ja>x</ja>\n\t\t<fixja>z</fixja>\n\t</Entry>\n\t<Entry>\n\t\t<zType>B</zType>\n\t</Entry>\n</L>";
        let seeding = seed(text, &tags());
        assert_eq!(seeding.seeded, 0);
        assert_eq!(seeding.skipped, 2);
        assert_eq!(seeding.text, text);
    }

    #[test]
    fn single_line_block_gets_default_indent() {
        let text = "<L><Entry><zType>A</zType><ja>x</ja></Entry></L>";
        let seeding = seed(text, &tags());
        assert_eq!(
            seeding.text,
            "<L><Entry><zType>A</zType><ja>x</ja>\t<fixja>x</fixja></Entry></L>"
        );
    }

    #[test]
    fn crlf_document_keeps_its_line_breaks() {
        let text = "<L>\r\n\t<Entry>\r\n\t\t<zType>A</zType>\r\n\t\t<ja>x</ja>\r\n\t</Entry>\r\n</L>\r\n";
        let seeding = seed(text, &tags());
        assert_eq!(seeding.seeded, 1);
        assert_eq!(
            seeding.text,
            "<L>\r\n\t<Entry>\r\n\t\t<zType>A</zType>\r\n\t\t<ja>x</ja>\r\n\t\t<fixja>x</fixja>\r\n\t</Entry>\r\n</L>\r\n"
        );
    }

    #[test]
    fn reseeding_is_a_no_op() {
        let text = "<L>\n\t<Entry>\n\t\t<zType>A</zType>\n\t\t<ja>x</ja>\n\t</Entry>\n</L>";
        let once = seed(text, &tags());
        let twice = seed(&once.text, &tags());
        assert_eq!(twice.text, once.text);
        assert_eq!(twice.seeded, 0);
    }
}
