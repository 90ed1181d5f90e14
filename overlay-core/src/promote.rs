//! Promotion engine: fold accepted corrections into a patch document.

use crate::codec::{self, TagPair};
use crate::dataset::Dataset;
use crate::types::{EntryKey, TagSchema};

/// Patch produced from one overlay document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    /// Patch document, or `None` when no entry carries a differing correction.
    pub text: Option<String>,
    /// Keys whose correction was promoted, in document order.
    pub promoted: Vec<EntryKey>,
}

/// Build the patch for `overlay`.
///
/// Only entries whose correction differs from the baseline (ignoring
/// surrounding whitespace) are kept. In each kept block the baseline content
/// is replaced by the correction and the correction field is removed; every
/// other byte of the block is preserved.
pub fn promote(overlay: &str, tags: &TagSchema) -> Promotion {
    let dataset = Dataset::parse(overlay, tags);
    let mut blocks = Vec::new();
    let mut promoted = Vec::new();
    for entry in &dataset.entries {
        if !entry.fields.has_pending_correction() {
            continue;
        }
        let Some(correction) = entry.fields.correction else {
            continue;
        };
        let Some(block) = rewrite_block(entry.raw, correction, tags) else {
            continue;
        };
        blocks.push(format!("\t{block}"));
        promoted.push(EntryKey::from(entry.key()));
    }

    let text = (!blocks.is_empty()).then(|| codec::frame(dataset.header, &blocks, dataset.footer));
    Promotion { text, promoted }
}

/// Strip every correction field from `block` and put `correction` in place
/// of every baseline field.
fn rewrite_block(block: &str, correction: &str, tags: &TagSchema) -> Option<String> {
    let mut out = block.to_string();
    while let Some(span) = codec::field_span(&out, &tags.correction) {
        let start = codec::leading_trivia_start(&out, span.outer.start);
        out.replace_range(start..span.outer.end, "");
    }
    let baseline = TagPair::new(&tags.baseline);
    let mut from = 0;
    let mut replaced = false;
    while let Some(span) = baseline.find_from(&out, from) {
        let inner = baseline.inner(&span);
        from = inner.start + correction.len() + baseline.close.len();
        out.replace_range(inner, correction);
        replaced = true;
    }
    replaced.then_some(out)
}
