//! Record codec — a flat, non-recursive tag-span scanner.
//!
//! Documents are scanned, never parsed: an Entry is `<Entry>` followed by
//! the first `</Entry>` after it, and a field is `<tag>` followed by the
//! first `</tag>` after it. Matches never overlap and never nest. Field
//! content is captured as an opaque span, so a value that itself contains
//! the field's closing sequence is cut short at that point.

use std::ops::Range;

use crate::types::{EntryFields, Field, TagSchema};

/// Opening and closing literal for one tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPair {
    pub open: String,
    pub close: String,
}

impl TagPair {
    pub fn new(name: &str) -> Self {
        Self {
            open: format!("<{name}>"),
            close: format!("</{name}>"),
        }
    }

    /// Every non-overlapping span from an opening tag through the first
    /// closing tag after it, in document order.
    pub fn spans(&self, text: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        let mut cursor = 0;
        while let Some(span) = self.find_from(text, cursor) {
            cursor = span.end;
            spans.push(span);
        }
        spans
    }

    /// First span starting at or after `from`.
    pub fn find_from(&self, text: &str, from: usize) -> Option<Range<usize>> {
        let start = from + text.get(from..)?.find(&self.open)?;
        let body = start + self.open.len();
        let end = body + text[body..].find(&self.close)? + self.close.len();
        Some(start..end)
    }

    /// The content between the tags of `span`.
    pub fn inner(&self, span: &Range<usize>) -> Range<usize> {
        span.start + self.open.len()..span.end - self.close.len()
    }
}

/// Byte spans of every Entry block in `text`.
pub fn entry_spans(text: &str, tags: &TagSchema) -> Vec<Range<usize>> {
    TagPair::new(&tags.entry).spans(text)
}

/// Location of a field inside a block: `outer` covers the tags, `inner` the
/// content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpan {
    pub outer: Range<usize>,
    pub inner: Range<usize>,
}

/// First occurrence of the `tag` field in `block`.
pub fn field_span(block: &str, tag: &str) -> Option<FieldSpan> {
    let pair = TagPair::new(tag);
    let outer = pair.find_from(block, 0)?;
    let inner = pair.inner(&outer);
    Some(FieldSpan { outer, inner })
}

/// Content of the `tag` field in `block`, or `None` when the field is absent.
pub fn field<'a>(block: &'a str, tag: &str) -> Option<&'a str> {
    field_span(block, tag).map(|span| &block[span.inner])
}

/// Extract every known field of a block. Returns `None` when the key is
/// absent or empty.
pub fn decode_fields<'a>(block: &'a str, tags: &TagSchema) -> Option<EntryFields<'a>> {
    let key = field(block, &tags.key).filter(|k| !k.is_empty())?;
    Some(EntryFields {
        key,
        source_text: field(block, &tags.source_text),
        baseline: field(block, &tags.baseline),
        correction: field(block, &tags.correction),
    })
}

/// Serialize an entry as a tab-indented block. Absent fields are omitted;
/// the block carries no trailing newline.
pub fn encode_block(fields: &EntryFields<'_>, tags: &TagSchema) -> String {
    let mut lines = Vec::with_capacity(6);
    lines.push(format!("\t<{}>", tags.entry));
    for field in Field::ALL {
        if let Some(value) = fields.get(field) {
            let tag = tags.tag(field);
            lines.push(format!("\t\t<{tag}>{value}</{tag}>"));
        }
    }
    lines.push(format!("\t</{}>", tags.entry));
    lines.join("\n")
}

/// Join regenerated blocks between a header and footer.
///
/// Trailing whitespace of the header and leading newlines of the footer are
/// dropped so the splice points carry exactly one newline each.
pub fn frame(header: &str, blocks: &[String], footer: &str) -> String {
    let header = header.trim_end();
    let footer = footer.trim_start_matches('\n');
    if blocks.is_empty() {
        format!("{header}\n{footer}")
    } else {
        format!("{header}\n{}\n{footer}", blocks.join("\n"))
    }
}

/// Start of the indentation run (plus at most one preceding line break)
/// that leads into `pos`. Deleting from here to the end of a span leaves no
/// blank line behind.
pub fn leading_trivia_start(text: &str, pos: usize) -> usize {
    let bytes = text.as_bytes();
    let mut start = pos;
    while start > 0 && matches!(bytes[start - 1], b' ' | b'\t') {
        start -= 1;
    }
    if start > 0 && bytes[start - 1] == b'\n' {
        start -= 1;
        if start > 0 && bytes[start - 1] == b'\r' {
            start -= 1;
        }
    }
    start
}

/// The line break `text` opens with: `"\r\n"`, `"\n"` or nothing.
pub fn leading_line_break(text: &str) -> &'static str {
    if text.starts_with("\r\n") {
        "\r\n"
    } else if text.starts_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// `"\r\n"` when `text` uses CRLF line endings, `"\n"` otherwise.
pub fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Indentation of the first line that begins with the opening `tag`, if any.
pub fn line_indent<'a>(block: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let bytes = block.as_bytes();
    block.match_indices(&open).find_map(|(pos, _)| {
        let mut start = pos;
        while start > 0 && matches!(bytes[start - 1], b' ' | b'\t') {
            start -= 1;
        }
        (start == 0 || bytes[start - 1] == b'\n').then(|| &block[start..pos])
    })
}
