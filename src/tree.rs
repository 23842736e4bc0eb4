//! The arena-allocated open-block tree.
//!
//! The internal block tree is mutated across many
//! `parse` calls, so parent/child links are plain arena indices (`NodeId`)
//! rather than owning references -- there is nothing here that would need a
//! cycle collector. Only the rightmost root-to-leaf path may ever contain
//! open nodes; every other invariant in the data model follows from that one.

use crate::ast::Alignment;
use crate::block::html_block::HtmlBlockFlags;
use crate::lines::Line;

pub(crate) type NodeId = usize;
pub(crate) const ROOT: NodeId = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ListDelimiter {
    Ordered { delimiter: char },
    Unordered { marker: char },
}

#[derive(Clone, Debug)]
pub(crate) struct HtmlEndPattern {
    pub needle: &'static str,
}

#[derive(Clone, Debug)]
pub(crate) enum BlockKind {
    Root,
    Paragraph {
        lines: Vec<Line>,
    },
    Heading {
        level: u8,
        content: String,
    },
    FencedCode {
        indent: usize,
        marker: u8,
        marker_count: usize,
        info: Option<String>,
        lines: Vec<Line>,
    },
    IndentedCode {
        lines: Vec<Line>,
    },
    ThematicBreak,
    HtmlBlock {
        lines: Vec<Line>,
        end_pattern: Option<HtmlEndPattern>,
        flags: HtmlBlockFlags,
    },
    Blockquote,
    List {
        start: u64,
        delimiter: ListDelimiter,
        /// Required column of indentation for child content (`numOfColumns`).
        child_indent: usize,
        tight: bool,
    },
    ListItem,
    Table {
        alignments: Vec<Alignment>,
        head: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl BlockKind {
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            BlockKind::Root | BlockKind::Blockquote | BlockKind::List { .. } | BlockKind::ListItem
        )
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    pub kind: BlockKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub open: bool,
    pub start_line_index: usize,
    pub end_line_index: usize,
}

impl Node {
    fn new(kind: BlockKind, parent: Option<NodeId>, start_line_index: usize) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            open: true,
            start_line_index,
            end_line_index: start_line_index,
        }
    }
}

/// The mutable open-block tree, rooted at [`ROOT`].
#[derive(Debug)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        let root = Node::new(BlockKind::Root, None, 0);
        Self { nodes: vec![root] }
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Append a new, open node as the last child of `parent`.
    pub fn push_child(&mut self, parent: NodeId, kind: BlockKind, current_line: usize) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(kind, Some(parent), current_line));
        self.nodes[parent].children.push(id);
        id
    }

    pub fn last_child(&self, parent: NodeId) -> Option<NodeId> {
        self.nodes[parent].children.last().copied()
    }

    pub fn last_open_child(&self, parent: NodeId) -> Option<NodeId> {
        self.last_child(parent).filter(|&id| self.nodes[id].open)
    }

    pub fn is_open(&self, id: NodeId) -> bool {
        self.nodes[id].open
    }

    pub fn close(&mut self, id: NodeId) {
        self.nodes[id].open = false;
    }

    pub fn touch(&mut self, id: NodeId, line_index: usize) {
        self.nodes[id].end_line_index = line_index;
    }

    /// Close every open descendant reachable by following "last child" links
    /// from `from`, deepest first. This is the rightmost-path seal that runs
    /// before any new sibling is inserted, and at end-of-input when
    /// `stream == false`.
    pub fn close_rightmost_path_from(&mut self, from: NodeId) {
        let mut stack = Vec::new();
        let mut cur = from;
        loop {
            match self.last_open_child(cur) {
                Some(child) => {
                    stack.push(child);
                    cur = child;
                }
                None => break,
            }
        }
        // Close deepest-first so list tightness (computed on close, looking
        // at children) always sees already-finalized descendants.
        for id in stack.into_iter().rev() {
            crate::block::finalize::finalize_node(self, id);
        }
    }
}
