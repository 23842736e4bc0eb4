//! Per-block-kind line classifiers used by block-parser phase 2
//! ATX headings, fenced-code openers, thematic breaks, and setext underlines.

use crate::block::indent::leading_indent;

/// Try to consume a blockquote marker (`>` plus one optional following
/// space, tab-expanded) at the start of `line`. Returns the remainder of the
/// line with the marker and its indent stripped.
pub(crate) fn consume_blockquote_marker(line: &str) -> Option<String> {
    let (indent_col, indent_bytes) = leading_indent(line);
    if indent_col > 3 {
        return None;
    }
    let rest = &line[indent_bytes..];
    let rest = rest.strip_prefix('>')?;
    // One optional space (or a tab, expanded to its first stop) after `>`.
    if let Some(r) = rest.strip_prefix(' ') {
        Some(r.to_string())
    } else if let Some(r) = rest.strip_prefix('\t') {
        // A tab consumes one column as the separator; 4 - 1 = 3 columns
        // remain as literal spaces (column after `>` is indent_col + 1).
        let column_after_gt = indent_col + 1;
        let width = 4 - (column_after_gt % 4);
        Some(format!("{}{}", " ".repeat(width.saturating_sub(1)), r))
    } else {
        Some(rest.to_string())
    }
}

pub(crate) struct AtxHeading {
    pub level: u8,
    pub content: String,
}

/// ATX heading: 1-6 `#`, then end-of-line or whitespace, optional trailing
/// `#` run, content trimmed from between.
pub(crate) fn recognize_atx_heading(line: &str) -> Option<AtxHeading> {
    let (indent_col, indent_bytes) = leading_indent(line);
    if indent_col > 3 {
        return None;
    }
    let rest = &line[indent_bytes..];
    let hashes = rest.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let after_hashes = &rest[hashes..];
    if !after_hashes.is_empty() && !after_hashes.starts_with([' ', '\t']) {
        return None;
    }
    let mut content = after_hashes.trim_start_matches([' ', '\t']);
    // Strip a trailing run of `#` that is itself preceded by whitespace (or
    // is the entire remainder), and any whitespace before it.
    let trimmed_end = content.trim_end();
    let hash_run_len = trimmed_end.bytes().rev().take_while(|&b| b == b'#').count();
    if hash_run_len > 0 {
        let before_hashes = &trimmed_end[..trimmed_end.len() - hash_run_len];
        if before_hashes.is_empty() || before_hashes.ends_with([' ', '\t']) {
            content = before_hashes.trim_end();
        } else {
            content = trimmed_end;
        }
    } else {
        content = trimmed_end;
    }
    Some(AtxHeading {
        level: hashes as u8,
        content: content.to_string(),
    })
}

pub(crate) struct FenceOpener {
    pub indent: usize,
    pub marker: u8,
    pub count: usize,
    pub info: Option<String>,
}

/// Fenced code start: indent <=3, >=3 identical backticks or tildes, then an
/// info string (backtick fences forbid further backticks in the info
/// string).
pub(crate) fn recognize_fence_open(line: &str) -> Option<FenceOpener> {
    let (indent_col, indent_bytes) = leading_indent(line);
    if indent_col > 3 {
        return None;
    }
    let rest = &line[indent_bytes..];
    let marker = rest.bytes().next()?;
    if marker != b'`' && marker != b'~' {
        return None;
    }
    let count = rest.bytes().take_while(|&b| b == marker).count();
    if count < 3 {
        return None;
    }
    let info_raw = rest[count..].trim();
    if marker == b'`' && info_raw.contains('`') {
        return None;
    }
    let info = if info_raw.is_empty() {
        None
    } else {
        Some(unescape_entities_and_backslashes(info_raw))
    };
    Some(FenceOpener {
        indent: indent_col,
        marker,
        count,
        info,
    })
}

fn unescape_entities_and_backslashes(s: &str) -> String {
    crate::inline::entity::decode_entities_and_escapes(s)
}

/// Does `line` (at the indent of the fence opener) close a fence opened with
/// `marker`/`opener_count`? i.e. is it, after trimming, a run of at least
/// `opener_count` of the same marker and nothing else, at indent <=3.
pub(crate) fn closes_fence(line: &str, marker: u8, opener_count: usize) -> bool {
    let (indent_col, indent_bytes) = leading_indent(line);
    if indent_col > 3 {
        return false;
    }
    let rest = line[indent_bytes..].trim_end();
    if rest.is_empty() {
        return false;
    }
    let count = rest.bytes().take_while(|&b| b == marker).count();
    count >= opener_count && count == rest.len()
}

/// Thematic break: `-`, `_`, or `*`, at least three, any number of spaces or
/// tabs interleaved, indent <=3, nothing else on the line.
pub(crate) fn recognize_thematic_break(line: &str) -> bool {
    let (indent_col, indent_bytes) = leading_indent(line);
    if indent_col > 3 {
        return false;
    }
    let rest = line[indent_bytes..].trim_end();
    if rest.is_empty() {
        return false;
    }
    let marker = match rest.bytes().next() {
        Some(b @ (b'-' | b'_' | b'*')) => b,
        _ => return false,
    };
    let mut count = 0;
    for b in rest.bytes() {
        match b {
            b' ' | b'\t' => continue,
            b if b == marker => count += 1,
            _ => return false,
        }
    }
    count >= 3
}

/// Setext underline: a line of only `=` (level 1) or only `-` (level 2),
/// indent <=3.
pub(crate) fn recognize_setext_underline(line: &str) -> Option<u8> {
    let (indent_col, indent_bytes) = leading_indent(line);
    if indent_col > 3 {
        return None;
    }
    let rest = line[indent_bytes..].trim_end();
    if rest.is_empty() {
        return None;
    }
    if rest.bytes().all(|b| b == b'=') {
        Some(1)
    } else if rest.bytes().all(|b| b == b'-') {
        Some(2)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atx_heading_basic() {
        let h = recognize_atx_heading("# Hello").unwrap();
        assert_eq!(h.level, 1);
        assert_eq!(h.content, "Hello");
    }

    #[test]
    fn atx_heading_empty() {
        let h = recognize_atx_heading("###").unwrap();
        assert_eq!(h.level, 3);
        assert_eq!(h.content, "");
    }

    #[test]
    fn atx_heading_seven_hashes_is_not_a_heading() {
        assert!(recognize_atx_heading("####### x").is_none());
    }

    #[test]
    fn atx_heading_strips_trailing_hashes() {
        let h = recognize_atx_heading("## foo ##").unwrap();
        assert_eq!(h.content, "foo");
    }

    #[test]
    fn fence_open_basic() {
        let f = recognize_fence_open("```rust").unwrap();
        assert_eq!(f.marker, b'`');
        assert_eq!(f.count, 3);
        assert_eq!(f.info.as_deref(), Some("rust"));
    }

    #[test]
    fn fence_open_empty_body_allowed() {
        let f = recognize_fence_open("```").unwrap();
        assert_eq!(f.info, None);
    }

    #[test]
    fn thematic_break_with_spaces() {
        assert!(recognize_thematic_break("- - -"));
        assert!(recognize_thematic_break("***"));
        assert!(!recognize_thematic_break("--"));
    }

    #[test]
    fn blockquote_marker_consumption() {
        assert_eq!(consume_blockquote_marker("> foo").as_deref(), Some("foo"));
        assert_eq!(consume_blockquote_marker(">foo").as_deref(), Some("foo"));
        assert_eq!(consume_blockquote_marker("foo"), None);
    }
}
