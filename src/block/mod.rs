//! The block parser: open-block tree, per-line dispatch, opening/closing
//! discipline.

mod indent;
pub(crate) mod html_block;
mod list;
pub(crate) mod recognizers;
mod table;
pub(crate) mod finalize;

use arcstr::ArcStr;
use log::trace;

use crate::ast;
use crate::config::ParserOptions;
use crate::lines::LineSplitter;
use crate::refdef::{self, RefDefStore};
use crate::tree::{BlockKind, ListDelimiter, NodeId, Tree, ROOT};

/// Owns the whole incremental parsing state across `parse` calls: the
/// open-block tree, the reference-definition store, and the line splitter's
/// carry-over buffer.
pub(crate) struct BlockParser {
    tree: Tree,
    refs: RefDefStore,
    splitter: LineSplitter,
    next_node_index: usize,
    next_line_index: usize,
    options: ParserOptions,
}

impl BlockParser {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            tree: Tree::new(),
            refs: RefDefStore::new(),
            splitter: LineSplitter::new(),
            next_node_index: 0,
            next_line_index: 0,
            options,
        }
    }

    /// Feed one chunk of text through the line splitter and block parser,
    /// returning the newly-closed prefix of root children in source order.
    pub fn parse(&mut self, chunk: &str, stream: bool) -> Vec<ast::Block> {
        let lines = self.splitter.split(chunk, stream);
        for line in lines {
            let sanitized = line.replace('\0', "\u{FFFD}");
            self.process_line(&sanitized);
        }
        if !stream {
            self.tree.close_rightmost_path_from(ROOT);
        }
        refdef::sweep(&mut self.tree, &mut self.refs, ROOT);
        self.harvest()
    }

    fn harvest(&mut self) -> Vec<ast::Block> {
        let mut out = Vec::new();
        loop {
            let children = self.tree.get(ROOT).children.clone();
            let Some(&id) = children.get(self.next_node_index) else {
                break;
            };
            if self.tree.is_open(id) {
                break;
            }
            out.push(self.convert_block(id));
            self.next_node_index += 1;
        }
        out
    }

    fn deepest_open_node(&self) -> NodeId {
        let mut cur = ROOT;
        while let Some(child) = self.tree.last_open_child(cur) {
            cur = child;
        }
        cur
    }

    fn process_line(&mut self, raw_line: &str) {
        let line_index = self.next_line_index;
        self.next_line_index += 1;
        let mut cur = ROOT;
        let mut line = raw_line.to_string();

        loop {
            let Some(child_id) = self.tree.last_open_child(cur) else {
                break;
            };
            let summary = summarize(&self.tree.get(child_id).kind);
            match summary {
                ChildSummary::Blockquote => {
                    if let Some(rest) = recognizers::consume_blockquote_marker(&line) {
                        line = rest;
                        self.tree.touch(child_id, line_index);
                        cur = child_id;
                        continue;
                    }
                    break;
                }
                ChildSummary::List { child_indent } => {
                    let Some(item_id) = self.tree.last_child(child_id) else { break };
                    if !self.tree.is_open(item_id) {
                        break;
                    }
                    let is_blank = line.trim().is_empty();
                    let item_has_children = !self.tree.get(item_id).children.is_empty();
                    if is_blank {
                        if !item_has_children {
                            self.tree.close_rightmost_path_from(ROOT);
                            return;
                        }
                        self.tree.touch(child_id, line_index);
                        self.tree.touch(item_id, line_index);
                        cur = item_id;
                        continue;
                    }
                    let (col, _) = indent::leading_indent(&line);
                    if col >= child_indent {
                        line = indent::slice_leading_indent(&line, child_indent);
                        self.tree.touch(child_id, line_index);
                        self.tree.touch(item_id, line_index);
                        cur = item_id;
                        continue;
                    }
                    break;
                }
                ChildSummary::FencedCode { marker, marker_count, indent } => {
                    if recognizers::closes_fence(&line, marker, marker_count) {
                        finalize::finalize_node(&mut self.tree, child_id);
                        self.tree.touch(child_id, line_index);
                    } else {
                        let (avail_col, _) = indent::leading_indent(&line);
                        let content = indent::slice_leading_indent(&line, indent.min(avail_col));
                        if let BlockKind::FencedCode { lines, .. } = &mut self.tree.get_mut(child_id).kind {
                            lines.push(ArcStr::from(content.as_str()));
                        }
                        self.tree.touch(child_id, line_index);
                    }
                    return;
                }
                ChildSummary::IndentedCode => {
                    let (col, _) = indent::leading_indent(&line);
                    if col >= 4 {
                        let content = indent::slice_leading_indent(&line, 4);
                        if let BlockKind::IndentedCode { lines } = &mut self.tree.get_mut(child_id).kind {
                            lines.push(ArcStr::from(content.as_str()));
                        }
                        self.tree.touch(child_id, line_index);
                        return;
                    } else if line.trim().is_empty() {
                        if let BlockKind::IndentedCode { lines } = &mut self.tree.get_mut(child_id).kind {
                            lines.push(ArcStr::new());
                        }
                        self.tree.touch(child_id, line_index);
                        return;
                    } else {
                        finalize::finalize_node(&mut self.tree, child_id);
                        break;
                    }
                }
                ChildSummary::HtmlBlock { end_pattern, can_be_interrupted_by_blank_line } => {
                    if can_be_interrupted_by_blank_line.contains(html_block::HtmlBlockFlags::CAN_BE_INTERRUPTED_BY_BLANK_LINE)
                        && line.trim().is_empty()
                    {
                        finalize::finalize_node(&mut self.tree, child_id);
                        self.tree.touch(child_id, line_index);
                        return;
                    }
                    if let BlockKind::HtmlBlock { lines, .. } = &mut self.tree.get_mut(child_id).kind {
                        lines.push(ArcStr::from(line.as_str()));
                    }
                    self.tree.touch(child_id, line_index);
                    if let Some(pattern) = &end_pattern {
                        if html_block::line_matches_end_pattern(line.trim_end(), pattern) {
                            finalize::finalize_node(&mut self.tree, child_id);
                        }
                    }
                    return;
                }
                ChildSummary::ParagraphOrTable => {
                    if line.trim().is_empty() {
                        finalize::finalize_node(&mut self.tree, child_id);
                        self.tree.touch(child_id, line_index);
                        return;
                    }
                    break;
                }
                ChildSummary::Other => break,
            }
        }

        self.phase2(cur, line, line_index);
    }

    fn phase2(&mut self, mut cur: NodeId, mut line: String, line_index: usize) {
        loop {
            // 1. Blockquote.
            if let Some(rest) = recognizers::consume_blockquote_marker(&line) {
                trace!("opening blockquote");
                self.tree.close_rightmost_path_from(cur);
                let id = self.tree.push_child(cur, BlockKind::Blockquote, line_index);
                self.tree.touch(id, line_index);
                if rest.is_empty() {
                    return;
                }
                cur = id;
                line = rest;
                continue;
            }

            // 2. ATX heading.
            if let Some(h) = recognizers::recognize_atx_heading(&line) {
                trace!("opening atx heading level {}", h.level);
                self.tree.close_rightmost_path_from(cur);
                let id = self.tree.push_child(
                    cur,
                    BlockKind::Heading { level: h.level, content: h.content },
                    line_index,
                );
                self.tree.touch(id, line_index);
                self.tree.close(id);
                return;
            }

            // 3. Fenced code start.
            if let Some(f) = recognizers::recognize_fence_open(&line) {
                trace!("opening fenced code block");
                self.tree.close_rightmost_path_from(cur);
                let id = self.tree.push_child(
                    cur,
                    BlockKind::FencedCode {
                        indent: f.indent,
                        marker: f.marker,
                        marker_count: f.count,
                        info: f.info,
                        lines: Vec::new(),
                    },
                    line_index,
                );
                self.tree.touch(id, line_index);
                return;
            }

            // 4. HTML block start.
            if let Some(start) = html_block::recognize_html_block_start(&line) {
                let cur_last_is_paragraph = self
                    .tree
                    .last_open_child(cur)
                    .is_some_and(|id| matches!(self.tree.get(id).kind, BlockKind::Paragraph { .. }));
                let can_interrupt = start.flags.contains(html_block::HtmlBlockFlags::CAN_INTERRUPT_PARAGRAPH);
                if !(cur_last_is_paragraph && !can_interrupt) {
                    trace!("opening html block");
                    self.tree.close_rightmost_path_from(cur);
                    let end_pattern = start.end_pattern.clone();
                    let id = self.tree.push_child(
                        cur,
                        BlockKind::HtmlBlock {
                            lines: vec![ArcStr::from(line.as_str())],
                            end_pattern: end_pattern.clone(),
                            flags: start.flags,
                        },
                        line_index,
                    );
                    self.tree.touch(id, line_index);
                    if let Some(pattern) = &end_pattern {
                        if html_block::line_matches_end_pattern(line.trim_end(), pattern) {
                            finalize::finalize_node(&mut self.tree, id);
                        }
                    }
                    return;
                }
            }

            // 5. Table start (requires cur's own last open child to be a paragraph).
            if self.options.enable_tables {
                if let Some(result) = self.try_open_table(cur, &line, line_index) {
                    let _ = result;
                    return;
                }
            }

            // 6. Setext heading (same shallow-paragraph requirement as tables).
            if let Some(level) = recognizers::recognize_setext_underline(&line) {
                if self.try_setext_heading(cur, level, line_index) {
                    return;
                }
            }

            // 7. Thematic break.
            if recognizers::recognize_thematic_break(&line) {
                trace!("opening thematic break");
                self.tree.close_rightmost_path_from(cur);
                let id = self.tree.push_child(cur, BlockKind::ThematicBreak, line_index);
                self.tree.touch(id, line_index);
                self.tree.close(id);
                return;
            }

            // 8. List item.
            if let Some(opener) = list::recognize_list_item(&line) {
                let cur_last_is_paragraph = self
                    .tree
                    .last_open_child(cur)
                    .is_some_and(|id| matches!(self.tree.get(id).kind, BlockKind::Paragraph { .. }));
                let suppressed = cur_last_is_paragraph && list::suppressed_as_paragraph_interrupter(&opener);
                if !suppressed {
                    let (next_cur, next_line) = self.open_or_continue_list(cur, &opener, line_index);
                    cur = next_cur;
                    if next_line.is_empty() {
                        return;
                    }
                    line = next_line;
                    continue;
                }
            }

            // 9. Indented code (only when not lazily continuing a paragraph).
            let deepest = self.deepest_open_node();
            let deepest_is_paragraph = matches!(self.tree.get(deepest).kind, BlockKind::Paragraph { .. });
            if !deepest_is_paragraph {
                let (col, _) = indent::leading_indent(&line);
                if col >= 4 {
                    trace!("opening indented code block");
                    self.tree.close_rightmost_path_from(cur);
                    let content = indent::slice_leading_indent(&line, 4);
                    let id = self.tree.push_child(
                        cur,
                        BlockKind::IndentedCode { lines: vec![ArcStr::from(content.as_str())] },
                        line_index,
                    );
                    self.tree.touch(id, line_index);
                    return;
                }
            }

            // 10. Blank line.
            if line.trim().is_empty() {
                self.tree.close_rightmost_path_from(ROOT);
                return;
            }

            // 11. Table row continuation.
            if self.options.enable_tables && matches!(self.tree.get(deepest).kind, BlockKind::Table { .. }) {
                let cells = table::split_row(&line);
                let width = if let BlockKind::Table { head, .. } = &self.tree.get(deepest).kind {
                    head.len()
                } else {
                    0
                };
                if let BlockKind::Table { rows, .. } = &mut self.tree.get_mut(deepest).kind {
                    rows.push(table::normalize_row_width(cells, width));
                }
                self.tree.touch(deepest, line_index);
                return;
            }

            // 12. Lazy continuation.
            if deepest_is_paragraph {
                if let BlockKind::Paragraph { lines } = &mut self.tree.get_mut(deepest).kind {
                    lines.push(ArcStr::from(line.as_str()));
                }
                self.tree.touch(deepest, line_index);
                return;
            }

            // 13. Fallback: new paragraph.
            self.tree.close_rightmost_path_from(cur);
            let id = self.tree.push_child(cur, BlockKind::Paragraph { lines: vec![ArcStr::from(line.as_str())] }, line_index);
            self.tree.touch(id, line_index);
            return;
        }
    }

    /// Tries rule 5 (table start). Returns `Some(())` and has already
    /// returned control to the caller's line-handling (i.e. the line is
    /// fully consumed) iff a table was opened or extended in place.
    fn try_open_table(&mut self, cur: NodeId, line: &str, line_index: usize) -> Option<()> {
        let para_id = self.tree.last_open_child(cur)?;
        if !matches!(self.tree.get(para_id).kind, BlockKind::Paragraph { .. }) {
            return None;
        }
        let header_line = match &self.tree.get(para_id).kind {
            BlockKind::Paragraph { lines } => lines.last()?.to_string(),
            _ => return None,
        };
        let alignments = table::recognize_table_start(&header_line, line)?;
        trace!("opening gfm table");
        let head_cells = table::split_row(&header_line);

        let remaining_empty = match &mut self.tree.get_mut(para_id).kind {
            BlockKind::Paragraph { lines } => {
                lines.pop();
                lines.is_empty()
            }
            _ => unreachable!(),
        };

        if remaining_empty {
            self.tree.get_mut(para_id).kind = BlockKind::Table { alignments, head: head_cells, rows: Vec::new() };
            self.tree.touch(para_id, line_index);
        } else {
            finalize::finalize_node(&mut self.tree, para_id);
            let id = self.tree.push_child(cur, BlockKind::Table { alignments, head: head_cells, rows: Vec::new() }, line_index);
            self.tree.touch(id, line_index);
        }
        Some(())
    }

    /// Tries rule 6 (setext heading). Returns `true` iff the line was fully
    /// consumed by either converting the preceding paragraph into a heading
    /// or re-absorbing the underline text as paragraph content.
    fn try_setext_heading(&mut self, cur: NodeId, level: u8, line_index: usize) -> bool {
        let Some(para_id) = self.tree.last_open_child(cur) else { return false };
        if !matches!(self.tree.get(para_id).kind, BlockKind::Paragraph { .. }) {
            return false;
        }
        refdef::extract_leading_definitions(&mut self.tree, &mut self.refs, para_id);
        let lines_empty = match &self.tree.get(para_id).kind {
            BlockKind::Paragraph { lines } => lines.is_empty(),
            _ => return false,
        };
        if lines_empty {
            // The reference-definition sweep consumed everything; the
            // would-be underline becomes ordinary paragraph content.
            return false;
        }
        trace!("converting paragraph to setext heading level {level}");
        let content = match &self.tree.get(para_id).kind {
            BlockKind::Paragraph { lines } => lines.iter().map(|l| l.as_str()).collect::<Vec<_>>().join("\n"),
            _ => unreachable!(),
        };
        self.tree.get_mut(para_id).kind = BlockKind::Heading { level, content: content.trim().to_string() };
        self.tree.touch(para_id, line_index);
        self.tree.close(para_id);
        true
    }

    /// Rule 8's non-terminal list-item handling: either joins `cur`'s
    /// existing open list (if the marker matches its kind) or opens a new
    /// one. Returns the new `cur` (the freshly opened item) and the
    /// remainder of the line to reprocess from step 1.
    fn open_or_continue_list(&mut self, cur: NodeId, opener: &list::ListItemOpener, line_index: usize) -> (NodeId, String) {
        let existing_list = self
            .tree
            .last_open_child(cur)
            .filter(|&id| matches!(self.tree.get(id).kind, BlockKind::List { .. }));

        if let Some(list_id) = existing_list {
            let existing_delim = match &self.tree.get(list_id).kind {
                BlockKind::List { delimiter, .. } => *delimiter,
                _ => unreachable!(),
            };
            if list::same_list_kind(existing_delim, opener.delimiter) {
                trace!("continuing list with new item");
                self.tree.close_rightmost_path_from(list_id);
                if let BlockKind::List { child_indent, .. } = &mut self.tree.get_mut(list_id).kind {
                    *child_indent = opener.child_indent;
                }
                self.tree.touch(list_id, line_index);
                let item_id = self.tree.push_child(list_id, BlockKind::ListItem, line_index);
                self.tree.touch(item_id, line_index);
                return (item_id, opener.content.clone());
            }
        }

        trace!("opening new list");
        self.tree.close_rightmost_path_from(cur);
        let list_id = self.tree.push_child(
            cur,
            BlockKind::List {
                start: opener.start,
                delimiter: opener.delimiter,
                child_indent: opener.child_indent,
                tight: true,
            },
            line_index,
        );
        self.tree.touch(list_id, line_index);
        let item_id = self.tree.push_child(list_id, BlockKind::ListItem, line_index);
        self.tree.touch(item_id, line_index);
        (item_id, opener.content.clone())
    }

    fn convert_block(&mut self, node_id: NodeId) -> ast::Block {
        let kind = self.tree.get(node_id).kind.clone();
        match kind {
            BlockKind::Paragraph { lines } => {
                let text = lines.iter().map(|l| l.as_str()).collect::<Vec<_>>().join("\n");
                let text = text.trim();
                ast::Block::Paragraph { children: crate::inline::parse_inline(text, &self.refs) }
            }
            BlockKind::Heading { level, content } => {
                ast::Block::Heading { level, children: crate::inline::parse_inline(&content, &self.refs) }
            }
            BlockKind::FencedCode { info, lines, .. } => {
                let content = if lines.is_empty() {
                    String::new()
                } else {
                    let mut s = lines.iter().map(|l| l.as_str()).collect::<Vec<_>>().join("\n");
                    s.push('\n');
                    s
                };
                ast::Block::CodeBlock { content, info }
            }
            BlockKind::IndentedCode { mut lines } => {
                while lines.first().is_some_and(|l| l.trim().is_empty()) {
                    lines.remove(0);
                }
                while lines.last().is_some_and(|l| l.trim().is_empty()) {
                    lines.pop();
                }
                let mut content = lines.iter().map(|l| l.as_str()).collect::<Vec<_>>().join("\n");
                if !content.is_empty() {
                    content.push('\n');
                }
                ast::Block::CodeBlock { content, info: None }
            }
            BlockKind::ThematicBreak => ast::Block::ThematicBreak,
            BlockKind::HtmlBlock { lines, .. } => {
                let content = lines.iter().map(|l| l.as_str()).collect::<Vec<_>>().join("\n");
                ast::Block::HtmlBlock { content }
            }
            BlockKind::Blockquote => {
                let children = self.tree.get(node_id).children.clone();
                ast::Block::Blockquote { children: children.into_iter().map(|id| self.convert_block(id)).collect() }
            }
            BlockKind::List { start, delimiter, tight, .. } => {
                let kind = match delimiter {
                    ListDelimiter::Ordered { delimiter } => ast::ListKind::Ordered { start, delimiter },
                    ListDelimiter::Unordered { marker } => ast::ListKind::Unordered { marker },
                };
                let item_ids = self.tree.get(node_id).children.clone();
                let items = item_ids
                    .into_iter()
                    .map(|item_id| {
                        let child_ids = self.tree.get(item_id).children.clone();
                        ast::ListItem { children: child_ids.into_iter().map(|id| self.convert_block(id)).collect() }
                    })
                    .collect();
                ast::Block::List { kind, tight, items }
            }
            BlockKind::Table { alignments, head, rows } => {
                let head_row = ast::TableRow {
                    cells: head
                        .into_iter()
                        .zip(alignments.iter().copied().chain(std::iter::repeat(ast::Alignment::None)))
                        .map(|(text, align)| ast::TableCell { align, children: crate::inline::parse_inline(&text, &self.refs) })
                        .collect(),
                };
                let body = rows
                    .into_iter()
                    .map(|row| ast::TableRow {
                        cells: row
                            .into_iter()
                            .zip(alignments.iter().copied().chain(std::iter::repeat(ast::Alignment::None)))
                            .map(|(text, align)| ast::TableCell { align, children: crate::inline::parse_inline(&text, &self.refs) })
                            .collect(),
                    })
                    .collect();
                ast::Block::Table(ast::Table { head: head_row, body })
            }
            BlockKind::Root | BlockKind::ListItem => unreachable!("root/list-item are never converted directly"),
        }
    }
}

enum ChildSummary {
    Blockquote,
    List { child_indent: usize },
    FencedCode { marker: u8, marker_count: usize, indent: usize },
    IndentedCode,
    HtmlBlock { end_pattern: Option<crate::tree::HtmlEndPattern>, can_be_interrupted_by_blank_line: html_block::HtmlBlockFlags },
    ParagraphOrTable,
    Other,
}

fn summarize(kind: &BlockKind) -> ChildSummary {
    match kind {
        BlockKind::Blockquote => ChildSummary::Blockquote,
        BlockKind::List { child_indent, .. } => ChildSummary::List { child_indent: *child_indent },
        BlockKind::FencedCode { marker, marker_count, indent, .. } => {
            ChildSummary::FencedCode { marker: *marker, marker_count: *marker_count, indent: *indent }
        }
        BlockKind::IndentedCode { .. } => ChildSummary::IndentedCode,
        BlockKind::HtmlBlock { end_pattern, flags, .. } => ChildSummary::HtmlBlock {
            end_pattern: end_pattern.clone(),
            can_be_interrupted_by_blank_line: *flags,
        },
        BlockKind::Paragraph { .. } | BlockKind::Table { .. } => ChildSummary::ParagraphOrTable,
        BlockKind::Root | BlockKind::Heading { .. } | BlockKind::ThematicBreak | BlockKind::ListItem => ChildSummary::Other,
    }
}
