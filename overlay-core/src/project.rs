//! Projection engine: a correction-free view of a source document.

use crate::codec;
use crate::dataset::Dataset;
use crate::types::TagSchema;

/// Projected document and the number of entries it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub text: String,
    pub entries: usize,
    /// `true` when the source had no Entry blocks and was passed through.
    pub copied: bool,
}

/// Project `source` down to key, source text and baseline translation.
///
/// A correction field is never emitted, even if the source carries one.
pub fn project(source: &str, tags: &TagSchema) -> Projection {
    let dataset = Dataset::parse(source, tags);
    if dataset.is_record_free() {
        return Projection {
            text: source.to_string(),
            entries: 0,
            copied: true,
        };
    }

    let blocks: Vec<String> = dataset
        .entries
        .iter()
        .map(|entry| codec::encode_block(&entry.fields.without_correction(), tags))
        .collect();
    Projection {
        text: codec::frame(dataset.header, &blocks, dataset.footer),
        entries: blocks.len(),
        copied: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_everything_but_key_source_and_baseline() {
        let source = "<L>\n\t<Entry>\n\t\t<zType>A</zType>\n\t\t<en-US>Apple</en-US>\n\t\t<note>ignore</note>\n\t\t<ja>x</ja>\n\t\t<fixja>leak</fixja>\n\t</Entry>\n</L>\n";
        let projection = project(source, &TagSchema::default());
        assert_eq!(
            projection.text,
            "<L>\n\t<Entry>\n\t\t<zType>A</zType>\n\t\t<en-US>Apple</en-US>\n\t\t<ja>x</ja>\n\t</Entry>\n</L>\n"
        );
        assert_eq!(projection.entries, 1);
        assert!(!projection.copied);
    }

    #[test]
    fn keyless_entries_are_dropped() {
        let source = "<L>\n\t<Entry><ja>x</ja></Entry>\n\t<Entry><zType>B</zType></Entry>\n</L>";
        let projection = project(source, &TagSchema::default());
        assert_eq!(
            projection.text,
            "<L>\n\t<Entry>\n\t\t<zType>B</zType>\n\t</Entry>\n</L>"
        );
    }

    #[test]
    fn record_free_source_is_passed_through() {
        let source = "<L>\n  <!-- nothing here -->\n</L>\n";
        let projection = project(source, &TagSchema::default());
        assert!(projection.copied);
        assert_eq!(projection.text, source);
    }

    #[test]
    fn all_keyless_source_keeps_frame() {
        let source = "<L>\n\t<Entry><ja>x</ja></Entry>\n</L>";
        let projection = project(source, &TagSchema::default());
        assert_eq!(projection.text, "<L>\n</L>");
        assert_eq!(projection.entries, 0);
    }
}
