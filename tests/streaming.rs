//! Cross-call streaming invariants: rechunking equivalence, exactly-once
//! emission, source-order emission, and CRLF straddling a chunk boundary.

use incremark::{Block, MarkdownParser};

fn parse_whole(input: &str) -> Vec<Block> {
    let mut parser = MarkdownParser::new();
    parser.parse(input, false)
}

fn parse_chunked(chunks: &[&str]) -> Vec<Block> {
    let mut parser = MarkdownParser::new();
    let mut out = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let is_last = i + 1 == chunks.len();
        out.extend(parser.parse(chunk, !is_last));
    }
    out
}

const DOCUMENT: &str = "\
# Title

Some *emphasized* text with a [link](/url) and a line break
continued here.

> a quote
> spanning two lines

- item one
- item two
  - nested

| a | b |
| - | - |
| 1 | 2 |

```rust
fn main() {}
```
";

#[test]
fn rechunking_is_equivalent_byte_by_byte() {
    let whole = parse_whole(DOCUMENT);
    for split_at in (0..DOCUMENT.len()).step_by(7) {
        let (a, b) = DOCUMENT.split_at(split_at);
        let chunked = parse_chunked(&[a, b]);
        assert_eq!(chunked, whole, "split at byte {split_at}");
    }
}

#[test]
fn rechunking_byte_at_a_time_is_equivalent() {
    let whole = parse_whole(DOCUMENT);
    let chunks: Vec<&str> = DOCUMENT
        .char_indices()
        .map(|(i, c)| &DOCUMENT[i..i + c.len_utf8()])
        .collect();
    let chunked = parse_chunked(&chunks);
    assert_eq!(chunked, whole);
}

#[test]
fn streaming_emits_each_block_exactly_once_and_in_order() {
    let mut parser = MarkdownParser::new();
    let mut seen = Vec::new();
    for chunk in ["# One\n\nTwo", " three\n\n- a\n- b\n\nFour", "\n"] {
        seen.extend(parser.parse(chunk, true));
    }
    seen.extend(parser.parse("", false));

    let whole = parse_whole("# One\n\nTwo three\n\n- a\n- b\n\nFour\n");
    assert_eq!(seen, whole);
}

#[test]
fn open_paragraph_is_held_back_until_closed() {
    let mut parser = MarkdownParser::new();
    let first = parser.parse("# Heading\nOpen paragraph", true);
    assert_eq!(first.len(), 1);
    assert!(matches!(&first[0], Block::Heading { .. }));

    let second = parser.parse(" continues\n\nNext paragraph", true);
    assert_eq!(second.len(), 1);

    let third = parser.parse("\n", false);
    assert_eq!(third.len(), 1);
}

#[test]
fn crlf_split_exactly_on_the_boundary() {
    let mut parser = MarkdownParser::new();
    let first = parser.parse("foo\r", true);
    assert!(first.is_empty());
    let second = parser.parse("\nbar\n", false);
    assert_eq!(second.len(), 1);
    match &second[0] {
        Block::Paragraph { .. } => {}
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn forced_flush_closes_every_remaining_open_block() {
    let mut parser = MarkdownParser::new();
    let partial = parser.parse("> still open", true);
    assert!(partial.is_empty());
    let flushed = parser.parse("", false);
    assert_eq!(flushed.len(), 1);
    assert!(matches!(&flushed[0], Block::Blockquote { .. }));
}
