//! An incremental block-and-inline CommonMark/GFM-table parser designed for
//! streaming input.
//!
//! The public surface is deliberately small: construct a [`MarkdownParser`],
//! feed it chunks of text through [`MarkdownParser::parse`] (set `stream` to
//! `false` only on the last chunk, or always if you have the whole document
//! up front), and collect the [`ast::Block`] values it yields back.

mod ast;
mod block;
mod byte_lookup;
mod config;
mod html_entities;
mod inline;
mod lines;
mod refdef;
mod tree;

pub use ast::{Alignment, Block, Inline, ListItem, ListKind, Table, TableCell, TableRow};
pub use config::ParserOptions;

use block::BlockParser;

/// An incremental Markdown parser. State persists across calls to
/// [`parse`](MarkdownParser::parse): the open-block tree, the
/// reference-definition store, and the line splitter's carry-over buffer all
/// live here rather than being rebuilt per chunk.
pub struct MarkdownParser {
    inner: BlockParser,
}

impl MarkdownParser {
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self { inner: BlockParser::new(options) }
    }

    /// Feed `chunk` through the parser. When `stream` is `true`, blocks that
    /// are still open at the end of `chunk` (e.g. a paragraph that might gain
    /// more lines, or a list item waiting on its next line) are held back
    /// until a later call closes them; set `stream` to `false` to force
    /// every remaining open block closed and returned.
    ///
    /// Each call returns only the newly-closed prefix of top-level blocks,
    /// in source order, exactly once.
    pub fn parse(&mut self, chunk: &str, stream: bool) -> Vec<Block> {
        self.inner.parse(chunk, stream)
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_simple_document() {
        let mut parser = MarkdownParser::new();
        let blocks = parser.parse("# Title\n\nSome *emphasized* text.\n", false);
        assert_eq!(blocks.len(), 2);
        assert!(matches!(&blocks[0], Block::Heading { level: 1, .. }));
        assert!(matches!(&blocks[1], Block::Paragraph { .. }));
    }

    #[test]
    fn streaming_across_multiple_chunks_matches_one_shot() {
        let whole = {
            let mut p = MarkdownParser::new();
            p.parse("# Hi\n\nfoo *bar* baz\n\n- a\n- b\n", false)
        };

        let mut streamed = Vec::new();
        let mut p = MarkdownParser::new();
        for chunk in ["# Hi\n\nfoo ", "*bar* baz\n\n- a\n", "- b\n"] {
            streamed.extend(p.parse(chunk, true));
        }
        streamed.extend(p.parse("", false));

        assert_eq!(whole, streamed);
    }

    #[test]
    fn link_reference_definition_resolves() {
        let mut parser = MarkdownParser::new();
        let blocks = parser.parse("[foo]: /url \"t\"\n\n[foo]\n", false);
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            Block::Paragraph { children } => {
                assert!(matches!(&children[0], Inline::Link { href, .. } if href == "/url"));
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn disabling_tables_falls_back_to_paragraph() {
        let mut parser = MarkdownParser::with_options(ParserOptions { enable_tables: false });
        let blocks = parser.parse("| a | b |\n| - | - |\n", false);
        assert!(blocks.iter().all(|b| !matches!(b, Block::Table(_))));
    }
}
