//! The inline lexer and link/image/emphasis resolution.
//!
//! Tokenization, bracket resolution, and emphasis resolution all operate
//! over one flat growable `Vec<emphasis::Tok>` mutated in place, converted
//! to the public [`Inline`] AST only at the very end.

pub(crate) mod autolink;
pub(crate) mod code_span;
pub(crate) mod emphasis;
pub(crate) mod entity;
pub(crate) mod link;
pub(crate) mod unicode;

use crate::ast::Inline;
use crate::byte_lookup::is_significant_inline_byte;
use crate::refdef::RefDefStore;
use autolink::{recognize_autolink, Autolink};
use emphasis::{merge_adjacent_text, process_emphasis, toks_to_inlines, Tok};
use unicode::{is_unicode_punctuation, is_unicode_whitespace};

struct BracketFrame {
    tok_index: usize,
    text_start: usize,
    is_image: bool,
    active: bool,
}

/// Tokenize and resolve `text` into a flat sequence of inline AST nodes.
pub(crate) fn parse_inline(text: &str, refs: &RefDefStore) -> Vec<Inline> {
    let mut toks = tokenize(text, refs);
    let len = toks.len();
    process_emphasis(&mut toks, 0..len);
    let toks = merge_adjacent_text(toks);
    toks_to_inlines(toks)
}

fn tokenize(text: &str, refs: &RefDefStore) -> Vec<Tok> {
    let mut toks: Vec<Tok> = Vec::new();
    let mut brackets: Vec<BracketFrame> = Vec::new();
    let bytes = text.as_bytes();
    let mut pos = 0usize;

    while pos < bytes.len() {
        let b = bytes[pos];
        if !b.is_ascii() || !is_significant_inline_byte(b) {
            let run_start = pos;
            while pos < bytes.len() && (!bytes[pos].is_ascii() || !is_significant_inline_byte(bytes[pos])) {
                pos += text[pos..].chars().next().map(|c| c.len_utf8()).unwrap_or(1);
            }
            push_text(&mut toks, &text[run_start..pos]);
            continue;
        }

        match b {
            b'\n' => {
                pos += 1;
                handle_newline(&mut toks, text, &mut pos);
            }
            b'\\' => {
                if handle_backslash(&mut toks, text, &mut pos) {
                    continue;
                }
                push_text(&mut toks, "\\");
                pos += 1;
            }
            b'`' => {
                let run_len = count_run(bytes, pos, b'`');
                let rest = &text[pos + run_len..];
                if let Some((content, consumed)) = code_span::find_closing_run(rest, run_len) {
                    toks.push(Tok::Code(content));
                    pos += run_len + consumed;
                } else {
                    push_text(&mut toks, &"`".repeat(run_len));
                    pos += run_len;
                }
            }
            b'<' => {
                if let Some((autolink, consumed)) = recognize_autolink(&text[pos..]) {
                    match autolink {
                        Autolink::Uri(uri) => toks.push(Tok::Link {
                            href: link::percent_encode_destination(&uri),
                            title: None,
                            children: vec![Tok::Text(uri.clone())],
                        }),
                        Autolink::Email(email) => toks.push(Tok::Link {
                            href: format!("mailto:{email}"),
                            title: None,
                            children: vec![Tok::Text(email.clone())],
                        }),
                    }
                    pos += consumed;
                } else if let Some(consumed) = recognize_inline_html(&text[pos..]) {
                    toks.push(Tok::Html(text[pos..pos + consumed].to_string()));
                    pos += consumed;
                } else {
                    push_text(&mut toks, "<");
                    pos += 1;
                }
            }
            b'&' => {
                let decoded = entity::decode_entities_and_escapes(&text[pos..pos + 1.max(entity_len(&text[pos..]))]);
                let consumed = entity_len(&text[pos..]).max(1);
                push_text(&mut toks, &decoded);
                pos += consumed;
            }
            b'*' | b'_' => {
                let ch = b as char;
                let run_start = pos;
                let run_len = count_run(bytes, pos, b);
                let (can_open, can_close) = classify_delim_run(text, run_start, run_start + run_len, ch);
                toks.push(Tok::Delim { ch, count: run_len, can_open, can_close });
                pos += run_len;
            }
            b'[' => {
                toks.push(Tok::Text("[".to_string()));
                brackets.push(BracketFrame { tok_index: toks.len() - 1, text_start: pos + 1, is_image: false, active: true });
                pos += 1;
            }
            b'!' => {
                if bytes.get(pos + 1) == Some(&b'[') {
                    toks.push(Tok::Text("![".to_string()));
                    brackets.push(BracketFrame { tok_index: toks.len() - 1, text_start: pos + 2, is_image: true, active: true });
                    pos += 2;
                } else {
                    push_text(&mut toks, "!");
                    pos += 1;
                }
            }
            b']' => {
                pos += 1;
                handle_close_bracket(&mut toks, &mut brackets, text, &mut pos, refs);
            }
            _ => {
                push_text(&mut toks, &(b as char).to_string());
                pos += 1;
            }
        }
    }

    toks
}

fn entity_len(s: &str) -> usize {
    // Re-derive the consumed length of a `&...;` entity the same way
    // `entity::decode_entities_and_escapes` would, without re-decoding: find
    // the first `;` within a bounded lookahead and check it parses.
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'&') {
        return 0;
    }
    let mut i = 1;
    if bytes.get(i) == Some(&b'#') {
        i += 1;
        if matches!(bytes.get(i), Some(b'x') | Some(b'X')) {
            i += 1;
        }
        let digits_start = i;
        while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
            i += 1;
        }
        if i == digits_start {
            return 0;
        }
        if bytes.get(i) == Some(&b';') {
            return i + 1;
        }
        return 0;
    }
    let name_start = i;
    while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
        i += 1;
    }
    if i == name_start {
        return 0;
    }
    if bytes.get(i) == Some(&b';') {
        i + 1
    } else {
        0
    }
}

fn push_text(toks: &mut Vec<Tok>, s: &str) {
    if s.is_empty() {
        return;
    }
    toks.push(Tok::Text(s.to_string()));
}

fn count_run(bytes: &[u8], start: usize, b: u8) -> usize {
    let mut i = start;
    while i < bytes.len() && bytes[i] == b {
        i += 1;
    }
    i - start
}

/// A soft break, or a hard break if the text just pushed ended with `\` or
/// >=2 trailing spaces (which are stripped). Leading whitespace on the next
/// line is then skipped.
fn handle_newline(toks: &mut Vec<Tok>, text: &str, pos: &mut usize) {
    let mut hard = false;
    if let Some(Tok::Text(last)) = toks.last_mut() {
        if last.ends_with('\\') {
            last.pop();
            hard = true;
        } else {
            let trimmed = last.trim_end_matches(' ');
            let trailing_spaces = last.len() - trimmed.len();
            if trailing_spaces >= 2 {
                hard = true;
            }
            last.truncate(trimmed.len());
        }
    }
    toks.push(if hard { Tok::HardBreak } else { Tok::SoftBreak });
    while *pos < text.len() && matches!(text.as_bytes()[*pos], b' ' | b'\t') {
        *pos += 1;
    }
}

/// Returns true if a backslash escape was consumed (pushing its literal
/// punctuation or a hard break), leaving `pos` advanced past it.
fn handle_backslash(toks: &mut Vec<Tok>, text: &str, pos: &mut usize) -> bool {
    let rest = &text[*pos + 1..];
    match rest.chars().next() {
        Some('\n') => {
            *pos += 2;
            handle_hard_break_after_escape(toks, text, pos);
            true
        }
        Some(c) if c.is_ascii() && crate::byte_lookup::is_ascii_punctuation(c as u8) => {
            push_text(toks, &c.to_string());
            *pos += 1 + c.len_utf8();
            true
        }
        _ => false,
    }
}

fn handle_hard_break_after_escape(toks: &mut Vec<Tok>, text: &str, pos: &mut usize) {
    toks.push(Tok::HardBreak);
    while *pos < text.len() && matches!(text.as_bytes()[*pos], b' ' | b'\t') {
        *pos += 1;
    }
}

fn classify_delim_run(text: &str, run_start: usize, run_end: usize, ch: char) -> (bool, bool) {
    let before = text[..run_start].chars().next_back();
    let after = text[run_end..].chars().next();
    let before_ws = before.map(is_unicode_whitespace).unwrap_or(true);
    let after_ws = after.map(is_unicode_whitespace).unwrap_or(true);
    let before_punct = before.map(is_unicode_punctuation).unwrap_or(false);
    let after_punct = after.map(is_unicode_punctuation).unwrap_or(false);

    let left_flanking = !after_ws && (!after_punct || before_ws || before_punct);
    let right_flanking = !before_ws && (!before_punct || after_ws || after_punct);

    if ch == '_' {
        (
            left_flanking && (!right_flanking || before_punct),
            right_flanking && (!left_flanking || after_punct),
        )
    } else {
        (left_flanking, right_flanking)
    }
}

fn recognize_inline_html(s: &str) -> Option<usize> {
    let rest = s.strip_prefix('<')?;
    if let Some(after) = rest.strip_prefix("!--") {
        let close = after.find("-->")?;
        return Some(1 + 3 + close + 3);
    }
    if let Some(after) = rest.strip_prefix('?') {
        let close = after.find("?>")?;
        return Some(1 + 1 + close + 2);
    }
    if let Some(after) = rest.strip_prefix("![CDATA[") {
        let close = after.find("]]>")?;
        return Some(1 + 8 + close + 3);
    }
    if let Some(after) = rest.strip_prefix('!') {
        if after.starts_with(|c: char| c.is_ascii_alphabetic()) {
            let close = after.find('>')?;
            return Some(1 + 1 + close + 1);
        }
        return None;
    }
    crate::block::html_block::take_open_or_close_tag(rest).map(|(len, _)| 1 + len)
}

fn handle_close_bracket(
    toks: &mut Vec<Tok>,
    brackets: &mut Vec<BracketFrame>,
    text: &str,
    pos: &mut usize,
    refs: &RefDefStore,
) {
    let Some(frame) = brackets.pop() else {
        push_text(toks, "]");
        return;
    };
    if !frame.active {
        push_text(toks, "]");
        return;
    }

    let close_start = *pos - 1;
    let inner_raw = &text[frame.text_start..close_start];
    let rest = &text[*pos..];

    if let Some((href, title, consumed)) = try_inline_link_tail(rest) {
        finalize_bracket(toks, brackets, &frame, href, title);
        *pos += consumed;
        return;
    }
    if let Some(def) = try_reference_tail(rest, inner_raw, refs) {
        finalize_bracket(toks, brackets, &frame, def.0, def.1);
        *pos += def.2;
        return;
    }

    // Total failure: the opener placeholder text (already in `toks`)
    // remains, and so does this literal `]`.
    push_text(toks, "]");
}

fn finalize_bracket(toks: &mut Vec<Tok>, brackets: &mut [BracketFrame], frame: &BracketFrame, href: String, title: Option<String>) {
    let inner: Vec<Tok> = toks.drain(frame.tok_index + 1..).collect();
    let mut inner_toks = inner;
    let len = inner_toks.len();
    process_emphasis(&mut inner_toks, 0..len);
    toks.truncate(frame.tok_index);
    let node = if frame.is_image {
        Tok::Image { href, title, children: inner_toks }
    } else {
        Tok::Link { href, title, children: inner_toks }
    };
    toks.push(node);
    if !frame.is_image {
        for earlier in brackets.iter_mut() {
            earlier.active = false;
        }
    }
}

/// `(dest [title])` immediately following `]`.
fn try_inline_link_tail(rest: &str) -> Option<(String, Option<String>, usize)> {
    let after_paren = rest.strip_prefix('(')?;
    let after_ws = skip_inline_ws(after_paren);
    if let Some(after_close) = after_ws.strip_prefix(')') {
        let consumed = rest.len() - after_close.len();
        return Some((String::new(), None, consumed));
    }
    let dest = link::scan_link_destination(after_ws)?;
    let href = link::percent_encode_destination(&entity::decode_entities_and_escapes(&dest.raw));
    let after_dest = &after_ws[dest.consumed..];

    let after_ws2 = skip_inline_ws(after_dest);
    if let Some(after_close) = after_ws2.strip_prefix(')') {
        let consumed = rest.len() - after_close.len();
        return Some((href, None, consumed));
    }

    let (title_raw, title_consumed) = link::scan_link_title(after_ws2)?;
    let title = entity::decode_entities_and_escapes(&title_raw);
    let after_title = &after_ws2[title_consumed..];
    let after_ws3 = skip_inline_ws(after_title);
    let after_close = after_ws3.strip_prefix(')')?;
    let consumed = rest.len() - after_close.len();
    Some((href, Some(title), consumed))
}

fn skip_inline_ws(s: &str) -> &str {
    s.trim_start_matches([' ', '\t', '\n'])
}

/// Full `[label]`, collapsed `[]`, or shortcut (bracket's own text) reference
/// form following `]`.
fn try_reference_tail(rest: &str, inner_raw: &str, refs: &RefDefStore) -> Option<(String, Option<String>, usize)> {
    if let Some((label, consumed)) = link::scan_link_label(rest) {
        if let Some(def) = refs.get(&label) {
            return Some((def.href.clone(), def.title.clone(), consumed));
        }
        return None;
    }
    if rest.starts_with("[]") {
        let def = refs.get(inner_raw)?;
        return Some((def.href.clone(), def.title.clone(), 2));
    }
    let def = refs.get(inner_raw)?;
    Some((def.href.clone(), def.title.clone(), 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<Inline> {
        let refs = RefDefStore::new();
        parse_inline(text, &refs)
    }

    #[test]
    fn plain_text() {
        assert_eq!(parse("hello"), vec![Inline::Text { text: "hello".into() }]);
    }

    #[test]
    fn code_span() {
        assert_eq!(parse("`foo`"), vec![Inline::CodeSpan { text: "foo".into() }]);
    }

    #[test]
    fn simple_emphasis() {
        let result = parse("*em*");
        assert_eq!(result.len(), 1);
        assert!(matches!(&result[0], Inline::Emphasis { children } if children == &vec![Inline::Text{text: "em".into()}]));
    }

    #[test]
    fn triple_emphasis_nests() {
        let result = parse("***em***");
        assert_eq!(result.len(), 1);
        assert!(matches!(&result[0], Inline::Strong { .. } | Inline::Emphasis { .. }));
    }

    #[test]
    fn autolink_uri() {
        let result = parse("<http://example.com>");
        assert!(matches!(&result[0], Inline::Link { href, .. } if href == "http://example.com"));
    }

    #[test]
    fn backslash_escape() {
        assert_eq!(parse(r"\*foo\*"), vec![Inline::Text { text: "*foo*".into() }]);
    }

    #[test]
    fn unresolved_reference_is_literal() {
        let result = parse("[nope]");
        assert_eq!(result, vec![Inline::Text { text: "[nope]".into() }]);
    }

    #[test]
    fn hard_break_from_trailing_spaces() {
        let result = parse("foo  \nbar");
        assert!(result.iter().any(|i| matches!(i, Inline::HardBreak)));
    }

    #[test]
    fn soft_break_default() {
        let result = parse("foo\nbar");
        assert!(result.iter().any(|i| matches!(i, Inline::SoftBreak)));
    }
}
