//! Link reference definition store and the sweep that extracts definitions
//! from closed paragraphs.

use std::collections::HashMap;

use crate::inline::entity::decode_entities_and_escapes;
use crate::inline::link::{percent_encode_destination, scan_link_destination, scan_link_title};
use crate::tree::{BlockKind, Node, NodeId, Tree};

#[derive(Clone, Debug)]
pub(crate) struct RefDef {
    pub href: String,
    pub title: Option<String>,
}

/// First-writer-wins map from normalized label to its definition.
#[derive(Debug, Default)]
pub(crate) struct RefDefStore {
    map: HashMap<String, RefDef>,
}

impl RefDefStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, label: &str) -> Option<&RefDef> {
        self.map.get(&normalize_label(label))
    }

    fn insert_if_absent(&mut self, label: &str, def: RefDef) {
        self.map.entry(normalize_label(label)).or_insert(def);
    }
}

/// Trim, collapse internal whitespace runs to a single space, then
/// case-fold. The source normalizes with `.toLowerCase().toUpperCase()`
/// This crate mirrors that exact double
/// transform (rather than a single-pass case fold) so labels differing only
/// by characters whose lower/upper round-trip isn't a fixed point -- e.g.
/// German `ß`/`ẞ` -- normalize identically to the source.
pub(crate) fn normalize_label(label: &str) -> String {
    let collapsed: String = label.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase().to_uppercase()
}

/// Walk closed blocks in `tree` starting at `from`, extracting leading
/// `[label]: dest "title"?` lines from every closed paragraph into `refs`.
/// Recurses into closed blockquotes and list items; stops descending at the
/// first open child in any container's child list.
pub(crate) fn sweep(tree: &mut Tree, refs: &mut RefDefStore, from: NodeId) {
    let children = tree.get(from).children.clone();
    for child_id in children {
        if tree.is_open(child_id) {
            break;
        }
        let is_container = tree.get(child_id).kind.is_container();
        if is_container {
            sweep(tree, refs, child_id);
            continue;
        }
        if matches!(tree.get(child_id).kind, BlockKind::Paragraph { .. }) {
            extract_from_paragraph(tree, refs, child_id);
        }
    }
}

/// Extract leading `[label]: dest "title"?` lines from an open paragraph,
/// e.g. just before it is considered for conversion into a setext heading.
/// Shares the same extraction logic the closed-block sweep uses.
pub(crate) fn extract_leading_definitions(tree: &mut Tree, refs: &mut RefDefStore, node_id: NodeId) {
    extract_from_paragraph(tree, refs, node_id)
}

fn extract_from_paragraph(tree: &mut Tree, refs: &mut RefDefStore, node_id: NodeId) {
    loop {
        let Node { kind: BlockKind::Paragraph { lines }, .. } = tree.get(node_id) else {
            return;
        };
        if lines.is_empty() {
            return;
        }
        let joined = lines.iter().map(|l| l.as_str()).collect::<Vec<_>>().join("\n");
        let Some(ParsedDef { label, href, title, consumed_lines }) = try_parse_one_definition(&joined) else {
            return;
        };
        refs.insert_if_absent(&label, RefDef { href, title });

        let BlockKind::Paragraph { lines } = &mut tree.get_mut(node_id).kind else {
            unreachable!()
        };
        lines.drain(0..consumed_lines.min(lines.len()));
        if lines.is_empty() {
            remove_node(tree, node_id);
            return;
        }
    }
}

fn remove_node(tree: &mut Tree, node_id: NodeId) {
    if let Some(parent) = tree.get(node_id).parent {
        tree.get_mut(parent).children.retain(|&id| id != node_id);
    }
}

struct ParsedDef {
    label: String,
    href: String,
    title: Option<String>,
    consumed_lines: usize,
}

/// Try to parse one `[label]: destination ("title")?` definition from the
/// start of `text` (lines already joined with `\n`). Label may itself span
/// multiple lines.
fn try_parse_one_definition(text: &str) -> Option<ParsedDef> {
    let text = text.trim_start_matches([' ', '\t']);
    if !text.starts_with('[') {
        return None;
    }
    let (label_raw, label_len) = crate::inline::link::scan_link_label(text)?;
    let rest = &text[label_len..];
    let rest = rest.strip_prefix(':')?;
    let rest = skip_optional_ws_and_one_newline(rest);

    let dest = scan_link_destination(rest)?;
    let mut after = &rest[dest.consumed..];

    let mut title = None;
    let before_title = after;
    let after_ws = skip_optional_ws_and_one_newline(after);
    if let Some((raw_title, consumed)) = scan_link_title(after_ws) {
        let rest_after_title = &after_ws[consumed..];
        let trailing = rest_after_title.split('\n').next().unwrap_or("");
        if trailing.trim().is_empty() {
            title = Some(decode_entities_and_escapes(&raw_title));
            after = rest_after_title;
        } else {
            after = before_title;
        }
    }

    // The definition must end the line (nothing else on it).
    let trailing = after.split('\n').next().unwrap_or("");
    if !trailing.trim().is_empty() {
        return None;
    }

    let consumed_through = text.len() - after.len();
    let consumed_prefix = &text[..consumed_through];
    let consumed_lines = consumed_prefix.matches('\n').count() + 1;

    Some(ParsedDef {
        label: label_raw,
        href: percent_encode_destination(&decode_entities_and_escapes(&dest.raw)),
        title,
        consumed_lines,
    })
}

fn skip_optional_ws_and_one_newline(s: &str) -> &str {
    let s = s.trim_start_matches([' ', '\t']);
    if let Some(after_nl) = s.strip_prefix('\n') {
        after_nl.trim_start_matches([' ', '\t'])
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_whitespace_and_case() {
        assert_eq!(normalize_label("  Foo\n Bar "), normalize_label("foo bar"));
    }

    #[test]
    fn parses_simple_definition() {
        let parsed = try_parse_one_definition("[ref]: /url \"title\"").unwrap();
        assert_eq!(parsed.label, "ref");
        assert_eq!(parsed.href, "/url");
        assert_eq!(parsed.title.as_deref(), Some("title"));
        assert_eq!(parsed.consumed_lines, 1);
    }

    #[test]
    fn parses_definition_without_title() {
        let parsed = try_parse_one_definition("[ref]: /url").unwrap();
        assert_eq!(parsed.title, None);
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(try_parse_one_definition("[ref]: /url garbage here").is_none());
    }

    #[test]
    fn title_on_next_line() {
        let parsed = try_parse_one_definition("[ref]: /url\n\"title\"").unwrap();
        assert_eq!(parsed.title.as_deref(), Some("title"));
        assert_eq!(parsed.consumed_lines, 2);
    }
}
