//! HTML block start/end pattern recognition (CommonMark 4.6).

use bitflags::bitflags;

use crate::block::indent::leading_indent;
use crate::tree::HtmlEndPattern;

bitflags! {
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct HtmlBlockFlags: u8 {
        const CAN_INTERRUPT_PARAGRAPH = 1;
        const CAN_BE_INTERRUPTED_BY_BLANK_LINE = 1 << 1;
    }
}

/// The CommonMark HTML-block tag set used by start condition 6.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "section", "summary",
    "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

const RAW_TAGS: &[&str] = &["script", "pre", "textarea", "style"];

pub(crate) struct HtmlBlockStart {
    pub end_pattern: Option<HtmlEndPattern>,
    pub flags: HtmlBlockFlags,
}

fn eq_ignore_ascii_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Returns the tag name starting at the beginning of `s`, if `s` starts with
/// an ASCII-letter-led run of letters/digits/`-`.
fn take_tag_name(s: &str) -> Option<(&str, &str)> {
    let mut end = 0;
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() => end = c.len_utf8(),
        _ => return None,
    }
    for (i, c) in chars {
        if c.is_ascii_alphanumeric() || c == '-' {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    Some((&s[..end], &s[end..]))
}

fn is_tag_name_terminator(c: Option<char>) -> bool {
    matches!(c, None | Some(' ') | Some('\t') | Some('>')) || c == Some('/')
}

/// Try to match `<tagname ...attrs.../?>` or `</tagname ...>` starting at the
/// beginning of `s` (the `<` must already be consumed by the caller). Returns
/// the byte length of the whole match, plus whether it was a closing tag.
/// Also used by `crate::inline` for inline-HTML tag recognition.
pub(crate) fn take_open_or_close_tag(s: &str) -> Option<(usize, bool)> {
    let (is_close, rest) = match s.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (name, mut rest2) = take_tag_name(rest)?;
    if !is_tag_name_terminator(rest2.chars().next()) {
        return None;
    }
    let _ = name;

    if is_close {
        rest2 = skip_ws(rest2);
        let rest2 = rest2.strip_prefix('>')?;
        return Some((s.len() - rest2.len(), true));
    }

    // Open tag: zero or more attributes, then optional whitespace, optional
    // `/`, then `>`. Attribute lookahead must happen on the untrimmed tail so
    // `take_attribute` can enforce the whitespace it requires before a name.
    loop {
        let trimmed = skip_ws(rest2);
        if let Some(r) = trimmed.strip_prefix('/') {
            let r = skip_ws(r).strip_prefix('>')?;
            return Some((s.len() - r.len(), false));
        }
        if let Some(r) = trimmed.strip_prefix('>') {
            return Some((s.len() - r.len(), false));
        }
        match take_attribute(rest2) {
            Some(next) => rest2 = next,
            None => return None,
        }
    }
}

fn skip_ws(s: &str) -> &str {
    s.trim_start_matches(|c: char| c == ' ' || c == '\t' || c == '\n')
}

fn take_attribute(s: &str) -> Option<&str> {
    let s = skip_ws_at_least_one(s)?;
    let mut chars = s.char_indices();
    let mut end = match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' || c == ':' => c.len_utf8(),
        _ => return None,
    };
    for (i, c) in chars {
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '-') {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    let rest = &s[end..];
    let after_name = skip_ws(rest);
    let Some(after_eq) = after_name.strip_prefix('=') else {
        return Some(rest);
    };
    let after_eq = skip_ws(after_eq);
    let mut chars = after_eq.char_indices();
    match chars.next() {
        Some((_, '"')) => {
            let close = after_eq[1..].find('"')? + 1;
            Some(&after_eq[close + 1..])
        }
        Some((_, '\'')) => {
            let close = after_eq[1..].find('\'')? + 1;
            Some(&after_eq[close + 1..])
        }
        Some((_, c)) if !c.is_whitespace() && !matches!(c, '"' | '\'' | '=' | '<' | '>' | '`') => {
            let mut end = c.len_utf8();
            for (i, c) in chars {
                if c.is_whitespace() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '`') {
                    break;
                }
                end = i + c.len_utf8();
            }
            Some(&after_eq[end..])
        }
        _ => None,
    }
}

fn skip_ws_at_least_one(s: &str) -> Option<&str> {
    let trimmed = skip_ws(s);
    if trimmed.len() == s.len() {
        None
    } else {
        Some(trimmed)
    }
}

/// Recognize an HTML block start at the beginning of `content` (the
/// container indent up to the open container's own content column has
/// already been stripped by the caller; this function performs the `<=3`
/// space indent check for the HTML block opener itself, same as every
/// other block opener in `recognizers.rs`).
pub(crate) fn recognize_html_block_start(content: &str) -> Option<HtmlBlockStart> {
    let (indent_col, indent_bytes) = leading_indent(content);
    if indent_col > 3 {
        return None;
    }
    let rest = content[indent_bytes..].strip_prefix('<')?;

    // Condition 1: script/pre/textarea/style.
    for tag in RAW_TAGS {
        if let Some(after) = strip_prefix_ci(rest, tag) {
            if after.is_empty() || after.starts_with(|c: char| c == ' ' || c == '\t' || c == '>') {
                return Some(HtmlBlockStart {
                    end_pattern: Some(HtmlEndPattern { needle: closing_needle(tag) }),
                    flags: HtmlBlockFlags::CAN_INTERRUPT_PARAGRAPH,
                });
            }
        }
    }

    // Condition 2: comment.
    if rest.starts_with("!--") {
        return Some(HtmlBlockStart {
            end_pattern: Some(HtmlEndPattern { needle: "-->" }),
            flags: HtmlBlockFlags::CAN_INTERRUPT_PARAGRAPH,
        });
    }

    // Condition 3: processing instruction.
    if rest.starts_with('?') {
        return Some(HtmlBlockStart {
            end_pattern: Some(HtmlEndPattern { needle: "?>" }),
            flags: HtmlBlockFlags::CAN_INTERRUPT_PARAGRAPH,
        });
    }

    // Condition 5: CDATA (checked before condition 4, which would otherwise
    // also match the leading `<![`).
    if rest.starts_with("![CDATA[") {
        return Some(HtmlBlockStart {
            end_pattern: Some(HtmlEndPattern { needle: "]]>" }),
            flags: HtmlBlockFlags::CAN_INTERRUPT_PARAGRAPH,
        });
    }

    // Condition 4: declaration.
    if let Some(after) = rest.strip_prefix('!') {
        if after.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Some(HtmlBlockStart {
                end_pattern: Some(HtmlEndPattern { needle: ">" }),
                flags: HtmlBlockFlags::CAN_INTERRUPT_PARAGRAPH,
            });
        }
    }

    // Condition 6: known block tag.
    let (tag_rest, is_close) = match rest.strip_prefix('/') {
        Some(r) => (r, true),
        None => (rest, false),
    };
    if let Some((name, after)) = take_tag_name(tag_rest) {
        if BLOCK_TAGS.iter().any(|t| eq_ignore_ascii_case(t, name)) {
            let ok = after.is_empty()
                || after.starts_with(|c: char| c == ' ' || c == '\t' || c == '>')
                || (!is_close && after.starts_with("/>"));
            if ok {
                return Some(HtmlBlockStart {
                    end_pattern: None,
                    flags: HtmlBlockFlags::CAN_INTERRUPT_PARAGRAPH
                        | HtmlBlockFlags::CAN_BE_INTERRUPTED_BY_BLANK_LINE,
                });
            }
        }
    }

    // Condition 7: any complete open or closing tag, followed by nothing but
    // whitespace to end of line.
    if let Some((len, _is_close)) = take_open_or_close_tag(rest) {
        let after = rest[len..].trim_end();
        if after.chars().all(|c| c == ' ' || c == '\t') {
            return Some(HtmlBlockStart {
                end_pattern: None,
                flags: HtmlBlockFlags::CAN_BE_INTERRUPTED_BY_BLANK_LINE,
            });
        }
    }

    None
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes()) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

fn closing_needle(tag: &str) -> &'static str {
    match tag {
        "script" => "</script>",
        "pre" => "</pre>",
        "textarea" => "</textarea>",
        "style" => "</style>",
        _ => unreachable!(),
    }
}

/// Returns true if `line` contains the end pattern (case-insensitive, as all
/// of the fixed needles are either all-lowercase tag syntax or symbol-only).
pub(crate) fn line_matches_end_pattern(line: &str, pattern: &HtmlEndPattern) -> bool {
    let needle = pattern.needle;
    if needle.len() <= 2 {
        return line.contains(needle);
    }
    let lower_line = line.to_ascii_lowercase();
    lower_line.contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_script_block() {
        let start = recognize_html_block_start("<script>").unwrap();
        assert!(start.flags.contains(HtmlBlockFlags::CAN_INTERRUPT_PARAGRAPH));
        assert!(!start.flags.contains(HtmlBlockFlags::CAN_BE_INTERRUPTED_BY_BLANK_LINE));
    }

    #[test]
    fn recognizes_comment() {
        assert!(recognize_html_block_start("<!-- hi -->").is_some());
    }

    #[test]
    fn recognizes_known_block_tag() {
        let start = recognize_html_block_start("<div class=\"x\">").unwrap();
        assert!(start.flags.contains(HtmlBlockFlags::CAN_BE_INTERRUPTED_BY_BLANK_LINE));
        assert!(start.end_pattern.is_none());
    }

    #[test]
    fn recognizes_condition_seven_closing_tag() {
        let start = recognize_html_block_start("</foo>").unwrap();
        assert!(!start.flags.contains(HtmlBlockFlags::CAN_INTERRUPT_PARAGRAPH));
    }

    #[test]
    fn rejects_bogus_tag() {
        assert!(recognize_html_block_start("<not a tag").is_none());
    }
}
