//! CommonMark/GFM-table examples asserted against the returned AST shape
//! HTML rendering lives outside this crate, so these tests check the AST
//! directly rather than routing through a renderer.

use incremark::{Block, Inline, MarkdownParser};
use test_case::test_case;

fn parse(input: &str) -> Vec<Block> {
    let mut parser = MarkdownParser::new();
    parser.parse(input, false)
}

#[test_case("# Hello", 1 ; "atx level 1")]
#[test_case("###### Hello", 6 ; "atx level 6")]
fn atx_heading_levels(input: &str, expected_level: u8) {
    let blocks = parse(input);
    assert_eq!(blocks.len(), 1);
    match &blocks[0] {
        Block::Heading { level, .. } => assert_eq!(*level, expected_level),
        other => panic!("expected heading, got {other:?}"),
    }
}

#[test]
fn atx_heading_with_trailing_hashes_and_extra_hashes_is_a_paragraph() {
    let blocks = parse("####### foo");
    assert!(matches!(&blocks[0], Block::Paragraph { .. }));
}

#[test]
fn setext_heading_levels() {
    let blocks = parse("Foo\n===\n\nBar\n---\n");
    assert_eq!(blocks.len(), 2);
    assert!(matches!(&blocks[0], Block::Heading { level: 1, .. }));
    assert!(matches!(&blocks[1], Block::Heading { level: 2, .. }));
}

#[test_case("```\ncode\n```", "code\n" ; "backtick fence")]
#[test_case("~~~\ncode\n~~~", "code\n" ; "tilde fence")]
fn fenced_code_blocks(input: &str, expected_content: &str) {
    let blocks = parse(input);
    match &blocks[0] {
        Block::CodeBlock { content, .. } => assert_eq!(content, expected_content),
        other => panic!("expected code block, got {other:?}"),
    }
}

#[test]
fn fenced_code_with_info_string() {
    let blocks = parse("```rust\nfn main() {}\n```\n");
    match &blocks[0] {
        Block::CodeBlock { info, .. } => assert_eq!(info.as_deref(), Some("rust")),
        other => panic!("expected code block, got {other:?}"),
    }
}

#[test]
fn indented_code_block_trims_blank_lines() {
    let blocks = parse("    foo\n    bar\n");
    match &blocks[0] {
        Block::CodeBlock { content, info } => {
            assert_eq!(content, "foo\nbar\n");
            assert_eq!(*info, None);
        }
        other => panic!("expected code block, got {other:?}"),
    }
}

#[test]
fn thematic_breaks_require_three_markers() {
    assert!(matches!(&parse("---")[0], Block::ThematicBreak));
    assert!(matches!(&parse("***")[0], Block::ThematicBreak));
    assert!(matches!(&parse("___")[0], Block::ThematicBreak));
    assert!(matches!(&parse("--")[0], Block::Paragraph { .. }));
}

#[test]
fn nested_blockquote() {
    let blocks = parse("> foo\n>> bar\n");
    match &blocks[0] {
        Block::Blockquote { children } => match &children[0] {
            Block::Paragraph { .. } => {}
            Block::Blockquote { .. } => panic!("lazy quote marker should attach to outer paragraph, not nest"),
            other => panic!("unexpected child {other:?}"),
        },
        other => panic!("expected blockquote, got {other:?}"),
    }
}

#[test]
fn tight_vs_loose_list() {
    let tight = parse("- a\n- b\n");
    match &tight[0] {
        Block::List { tight, .. } => assert!(*tight),
        other => panic!("expected list, got {other:?}"),
    }

    let loose = parse("- a\n\n- b\n");
    match &loose[0] {
        Block::List { tight, .. } => assert!(!*tight),
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn ordered_list_start_value() {
    let blocks = parse("3. foo\n4. bar\n");
    match &blocks[0] {
        Block::List { kind: incremark::ListKind::Ordered { start, delimiter }, items, .. } => {
            assert_eq!(*start, 3);
            assert_eq!(*delimiter, '.');
            assert_eq!(items.len(), 2);
        }
        other => panic!("expected ordered list, got {other:?}"),
    }
}

#[test]
fn gfm_pipe_table_with_alignment() {
    let blocks = parse("| a | b | c |\n| :-- | :-: | --: |\n| 1 | 2 | 3 |\n");
    match &blocks[0] {
        Block::Table(table) => {
            assert_eq!(table.head.cells.len(), 3);
            assert_eq!(table.head.cells[0].align, incremark::Alignment::Left);
            assert_eq!(table.head.cells[1].align, incremark::Alignment::Center);
            assert_eq!(table.head.cells[2].align, incremark::Alignment::Right);
            assert_eq!(table.body.len(), 1);
        }
        other => panic!("expected table, got {other:?}"),
    }
}

#[test]
fn table_row_short_of_header_width_is_padded() {
    let blocks = parse("| a | b |\n| - | - |\n| 1 |\n");
    match &blocks[0] {
        Block::Table(table) => {
            assert_eq!(table.body[0].cells.len(), 2);
            assert!(table.body[0].cells[1].children.is_empty());
        }
        other => panic!("expected table, got {other:?}"),
    }
}

#[test]
fn emphasis_and_strong() {
    let blocks = parse("*a* **b** ***c***\n");
    match &blocks[0] {
        Block::Paragraph { children } => {
            assert!(matches!(&children[0], Inline::Emphasis { .. }));
            assert!(matches!(&children[2], Inline::Strong { .. }));
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn inline_code_span() {
    let blocks = parse("`code`\n");
    match &blocks[0] {
        Block::Paragraph { children } => {
            assert!(matches!(&children[0], Inline::CodeSpan { text } if text == "code"));
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn inline_link_and_image() {
    let blocks = parse("[text](/url \"title\") and ![alt](/img.png)\n");
    match &blocks[0] {
        Block::Paragraph { children } => {
            assert!(matches!(&children[0], Inline::Link { href, title, .. }
                if href == "/url" && title.as_deref() == Some("title")));
            assert!(children.iter().any(|c| matches!(c, Inline::Image { href, .. } if href == "/img.png")));
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn reference_link_resolves() {
    let blocks = parse("[foo][bar]\n\n[bar]: /url \"t\"\n");
    match &blocks[0] {
        Block::Paragraph { children } => {
            assert!(matches!(&children[0], Inline::Link { href, .. } if href == "/url"));
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn unresolved_reference_link_is_literal_text() {
    let blocks = parse("[foo][nope]\n");
    match &blocks[0] {
        Block::Paragraph { children } => {
            assert!(children.iter().all(|c| !matches!(c, Inline::Link { .. })));
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn autolinks() {
    let blocks = parse("<https://example.com> and <user@example.com>\n");
    match &blocks[0] {
        Block::Paragraph { children } => {
            assert!(children.iter().any(|c| matches!(c, Inline::Link { href, .. } if href == "https://example.com")));
            assert!(children.iter().any(|c| matches!(c, Inline::Link { href, .. } if href == "mailto:user@example.com")));
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn hard_line_break_from_trailing_spaces() {
    let blocks = parse("foo  \nbar\n");
    match &blocks[0] {
        Block::Paragraph { children } => {
            assert!(children.iter().any(|c| matches!(c, Inline::HardBreak)));
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn html_block_raw_tag_consumes_until_end_tag() {
    let blocks = parse("<div>\n*not emphasis*\n</div>\n");
    assert_eq!(blocks.len(), 1);
    match &blocks[0] {
        Block::HtmlBlock { content } => assert!(content.contains("*not emphasis*")),
        other => panic!("expected html block, got {other:?}"),
    }
}

#[test]
fn lazy_continuation_line_joins_blockquote_paragraph() {
    let blocks = parse("> foo\nbar\n\n> baz\n");
    match &blocks[0] {
        Block::Blockquote { children } => match &children[0] {
            Block::Paragraph { children } => assert_eq!(children.len(), 3),
            other => panic!("expected paragraph, got {other:?}"),
        },
        other => panic!("expected blockquote, got {other:?}"),
    }
}
