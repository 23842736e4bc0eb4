//! List item marker recognition and child-indentation calculation
//! List item marker recognition.

use crate::block::indent::{leading_indent, leading_whitespace_columns_from};
use crate::tree::ListDelimiter;

pub(crate) struct ListItemOpener {
    pub delimiter: ListDelimiter,
    /// Starting value for ordered lists; unused (left at 0) for unordered.
    pub start: u64,
    /// Column of the marker itself, always `<= 3`.
    pub marker_indent: usize,
    /// Required column of indentation for this item's child content
    /// (`numOfColumns`).
    pub child_indent: usize,
    /// Text following the marker and its separating whitespace, with any
    /// "wide content" leftover whitespace re-inserted as literal spaces.
    pub content: String,
}

/// Recognize a list item marker at the start of `line` (already stripped of
/// any enclosing container's own indent).
pub(crate) fn recognize_list_item(line: &str) -> Option<ListItemOpener> {
    let (indent_col, indent_bytes) = leading_indent(line);
    if indent_col > 3 {
        return None;
    }
    let rest = &line[indent_bytes..];

    let (delimiter, marker_byte_len, start) = recognize_marker(rest)?;

    let after_marker = &rest[marker_byte_len..];
    match after_marker.chars().next() {
        None | Some(' ') | Some('\t') => {}
        _ => return None,
    }

    let marker_columns = rest[..marker_byte_len].chars().count();
    let column_after_marker = indent_col + marker_columns;
    let (ws_columns, ws_bytes) = leading_whitespace_columns_from(after_marker, column_after_marker);
    let after_ws = &after_marker[ws_bytes..];

    let (child_indent, content) = if after_ws.is_empty() {
        (column_after_marker + 1, String::new())
    } else if (1..=4).contains(&ws_columns) {
        (column_after_marker + ws_columns, after_ws.to_string())
    } else {
        let leftover = ws_columns.saturating_sub(1);
        let mut content = " ".repeat(leftover);
        content.push_str(after_ws);
        (column_after_marker + 1, content)
    };

    Some(ListItemOpener {
        delimiter,
        start,
        marker_indent: indent_col,
        child_indent,
        content,
    })
}

fn recognize_marker(rest: &str) -> Option<(ListDelimiter, usize, u64)> {
    let mut chars = rest.char_indices();
    match chars.next() {
        Some((_, c)) if matches!(c, '-' | '+' | '*') => {
            Some((ListDelimiter::Unordered { marker: c }, c.len_utf8(), 0))
        }
        Some((_, c)) if c.is_ascii_digit() => {
            let mut end = c.len_utf8();
            let mut digit_count = 1;
            for (i, d) in chars.by_ref() {
                if d.is_ascii_digit() && digit_count < 9 {
                    end = i + d.len_utf8();
                    digit_count += 1;
                } else {
                    break;
                }
            }
            let digits = &rest[..end];
            let start: u64 = digits.parse().ok()?;
            match rest[end..].chars().next() {
                Some(delim @ ('.' | ')')) => Some((
                    ListDelimiter::Ordered { delimiter: delim },
                    end + delim.len_utf8(),
                    start,
                )),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Does this freshly-opened list item match the kind (and marker/delimiter
/// character) of the list it would be joining?
pub(crate) fn same_list_kind(existing: ListDelimiter, opened: ListDelimiter) -> bool {
    match (existing, opened) {
        (ListDelimiter::Unordered { marker: a }, ListDelimiter::Unordered { marker: b }) => a == b,
        (
            ListDelimiter::Ordered { delimiter: a },
            ListDelimiter::Ordered { delimiter: b },
        ) => a == b,
        _ => false,
    }
}

/// The paragraph non-interruption rule: a list item opener is
/// suppressed (taken as paragraph continuation text instead) when it would
/// interrupt an open paragraph and either its content is empty, or it is an
/// ordered item whose start value isn't 1.
pub(crate) fn suppressed_as_paragraph_interrupter(opener: &ListItemOpener) -> bool {
    if opener.content.is_empty() {
        return true;
    }
    matches!(opener.delimiter, ListDelimiter::Ordered { .. }) && opener.start != 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unordered_marker() {
        let o = recognize_list_item("- foo").unwrap();
        assert_eq!(o.delimiter, ListDelimiter::Unordered { marker: '-' });
        assert_eq!(o.content, "foo");
        assert_eq!(o.child_indent, 2);
    }

    #[test]
    fn ordered_marker_with_start() {
        let o = recognize_list_item("12. foo").unwrap();
        assert_eq!(o.start, 12);
        assert_eq!(o.child_indent, 4);
        assert_eq!(o.content, "foo");
    }

    #[test]
    fn empty_content_uses_baseline_indent() {
        let o = recognize_list_item("-").unwrap();
        assert_eq!(o.content, "");
        assert_eq!(o.child_indent, 2);
    }

    #[test]
    fn wide_content_over_four_columns_falls_back_to_baseline() {
        let o = recognize_list_item("-     foo").unwrap();
        // 5 spaces after marker -> baseline (marker+1), 4 literal spaces kept.
        assert_eq!(o.child_indent, 2);
        assert_eq!(o.content, "    foo");
    }

    #[test]
    fn marker_without_trailing_space_is_rejected() {
        assert!(recognize_list_item("-foo").is_none());
    }

    #[test]
    fn nine_plus_digits_is_not_a_marker() {
        assert!(recognize_list_item("1234567890. foo").is_none());
    }
}
