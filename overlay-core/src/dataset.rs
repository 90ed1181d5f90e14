//! Dataset loader: header, keyed entries and footer of one document.

use std::collections::HashMap;
use std::ops::Range;

use crate::codec;
use crate::types::{EntryFields, TagSchema};

/// One keyed Entry and where its raw block sits in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<'a> {
    pub fields: EntryFields<'a>,
    /// Raw block text, `<Entry>` through `</Entry>`.
    pub raw: &'a str,
    pub span: Range<usize>,
}

impl<'a> Entry<'a> {
    pub fn key(&self) -> &'a str {
        self.fields.key
    }
}

/// A document split into header, entries and footer.
///
/// The header is everything before the first Entry block and the footer is
/// everything after the end of the last one. A document without blocks has
/// the whole text as header and an empty footer.
#[derive(Debug, Clone)]
pub struct Dataset<'a> {
    pub text: &'a str,
    pub header: &'a str,
    pub footer: &'a str,
    pub entries: Vec<Entry<'a>>,
    /// Number of Entry blocks found, keyed or not.
    pub block_count: usize,
    /// Blocks dropped for lacking a key.
    pub malformed: usize,
    /// Blocks dropped because an earlier block already used their key.
    pub duplicates: usize,
    index: HashMap<&'a str, usize>,
}

impl<'a> Dataset<'a> {
    /// Scan `text` with the given tag names.
    pub fn parse(text: &'a str, tags: &TagSchema) -> Self {
        let spans = codec::entry_spans(text, tags);
        let (header, footer) = match (spans.first(), spans.last()) {
            (Some(first), Some(last)) => (&text[..first.start], &text[last.end..]),
            _ => (text, ""),
        };

        let mut entries = Vec::with_capacity(spans.len());
        let mut index = HashMap::with_capacity(spans.len());
        let mut malformed = 0;
        let mut duplicates = 0;
        for span in &spans {
            let raw = &text[span.clone()];
            let Some(fields) = codec::decode_fields(raw, tags) else {
                malformed += 1;
                continue;
            };
            if index.contains_key(fields.key) {
                duplicates += 1;
                continue;
            }
            index.insert(fields.key, entries.len());
            entries.push(Entry {
                fields,
                raw,
                span: span.clone(),
            });
        }

        Self {
            text,
            header,
            footer,
            entries,
            block_count: spans.len(),
            malformed,
            duplicates,
            index,
        }
    }

    /// `true` when the document holds no Entry blocks at all.
    pub fn is_record_free(&self) -> bool {
        self.block_count == 0
    }

    pub fn get(&self, key: &str) -> Option<&Entry<'a>> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().map(Entry::key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
