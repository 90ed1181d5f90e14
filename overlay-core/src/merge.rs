//! Synchronization engine: reconcile an overlay document with its source.
//!
//! The overlay is never regenerated once it exists. Its text is edited in
//! three phases:
//!
//! 1. locate every Entry block (with the indentation and line break that
//!    lead into it);
//! 2. classify blocks as retained or removed against the source key set, and
//!    source entries as added when the pruned overlay lacks their key;
//! 3. concatenate the retained text and splice the added blocks in front of
//!    the document's final closing tag.
//!
//! Retained blocks are copied byte-for-byte, so manual corrections survive.

use std::collections::HashSet;
use std::ops::Range;

use crate::codec;
use crate::dataset::Dataset;
use crate::types::{EntryKey, TagSchema};

/// What reconciling one document produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// No overlay existed; a complete document was generated.
    Created(String),
    /// The overlay was edited.
    Updated(String),
    /// The source holds no Entry blocks and is carried over verbatim.
    Copied(String),
    /// The overlay already matches the source key set.
    Unchanged,
}

/// Outcome of [`reconcile`], with counts for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub change: Change,
    /// Keys appended to the overlay, in source order.
    pub added: Vec<EntryKey>,
    /// Keys deleted from the overlay because the source no longer has them.
    pub removed: Vec<EntryKey>,
    /// Keyless blocks: dropped from the source, deleted from the overlay.
    pub malformed: usize,
    /// Repeated keys: dropped from the source, deleted from the overlay.
    pub duplicates: usize,
}

impl MergeResult {
    /// The document to write, if anything needs writing.
    pub fn text(&self) -> Option<&str> {
        match &self.change {
            Change::Created(text) | Change::Updated(text) | Change::Copied(text) => Some(text),
            Change::Unchanged => None,
        }
    }
}

/// Reconcile `source` text against the current overlay text (`None` when no
/// overlay exists yet).
///
/// An overlay that is empty or whitespace-only is treated as absent.
pub fn reconcile(source: &str, overlay: Option<&str>, tags: &TagSchema) -> MergeResult {
    let source = Dataset::parse(source, tags);
    let mut result = MergeResult {
        change: Change::Unchanged,
        added: Vec::new(),
        removed: Vec::new(),
        malformed: source.malformed,
        duplicates: source.duplicates,
    };

    if source.is_record_free() {
        result.change = Change::Copied(source.text.to_string());
        return result;
    }

    match overlay.filter(|text| !text.trim().is_empty()) {
        None => {
            result.change = Change::Created(initialize(&source, tags));
            result.added = source.keys().map(EntryKey::from).collect();
        }
        Some(overlay) => update(&source, overlay, tags, &mut result),
    }
    result
}

/// Build a fresh overlay: every source entry with a seeded correction.
pub fn initialize(source: &Dataset<'_>, tags: &TagSchema) -> String {
    let blocks: Vec<String> = source
        .entries
        .iter()
        .map(|entry| codec::encode_block(&entry.fields.seeded(), tags))
        .collect();
    codec::frame(source.header, &blocks, source.footer)
}

fn update(source: &Dataset<'_>, overlay: &str, tags: &TagSchema, result: &mut MergeResult) {
    // Removal pass.
    let mut retained: HashSet<&str> = HashSet::new();
    let mut cuts: Vec<Range<usize>> = Vec::new();
    for span in codec::entry_spans(overlay, tags) {
        let cut = codec::leading_trivia_start(overlay, span.start)..span.end;
        match codec::decode_fields(&overlay[span], tags) {
            Some(fields) if source.contains_key(fields.key) => {
                if !retained.insert(fields.key) {
                    result.duplicates += 1;
                    cuts.push(cut);
                }
            }
            Some(fields) => {
                result.removed.push(EntryKey::from(fields.key));
                cuts.push(cut);
            }
            None => {
                result.malformed += 1;
                cuts.push(cut);
            }
        }
    }
    let pruned = splice_out(overlay, &cuts);

    // Addition pass, against the keys that survived pruning.
    let present = Dataset::parse(&pruned, tags);
    let additions: Vec<String> = source
        .entries
        .iter()
        .filter(|entry| !present.contains_key(entry.key()))
        .map(|entry| {
            result.added.push(EntryKey::from(entry.key()));
            codec::encode_block(&entry.fields.seeded(), tags)
        })
        .collect();

    if cuts.is_empty() && additions.is_empty() {
        return;
    }

    let at = insertion_point(&pruned, tags);
    let eol = codec::line_ending(&pruned);
    let added_len: usize = additions.iter().map(|block| block.len() + eol.len()).sum();
    let mut text = String::with_capacity(pruned.len() + added_len);
    text.push_str(&pruned[..at]);
    for block in &additions {
        text.push_str(eol);
        if eol == "\n" {
            text.push_str(block);
        } else {
            text.push_str(&block.replace("\r\n", "\n").replace('\n', eol));
        }
    }
    text.push_str(&pruned[at..]);
    result.change = Change::Updated(text);
}

/// Concatenate `text` without the (sorted, disjoint) `cuts`.
fn splice_out(text: &str, cuts: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for cut in cuts {
        out.push_str(&text[cursor..cut.start]);
        cursor = cut.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Where appended blocks go: just before the whitespace that precedes the
/// last closing tag following the final Entry block. Without such a tag,
/// before the document's trailing whitespace.
pub fn insertion_point(text: &str, tags: &TagSchema) -> usize {
    let after_entries = codec::entry_spans(text, tags)
        .last()
        .map(|span| span.end)
        .unwrap_or(0);
    match text[after_entries..].rfind("</") {
        Some(offset) => {
            let close = after_entries + offset;
            text[..close].trim_end().len().max(after_entries)
        }
        None => text.trim_end().len().max(after_entries),
    }
}
