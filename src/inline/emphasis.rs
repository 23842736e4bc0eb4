//! Inline token representation and the CommonMark "process emphasis"
//! algorithm.
//!
//! Delimiter runs are stored as ordinary entries in the same flat `Vec<Tok>`
//! as everything else: a growable vector of tokens with in-place mutation,
//! rather than a linked list, for backward-scan speed.
//! `process_emphasis` mutates a sub-range of that vector in place.

use crate::ast::Inline;

#[derive(Clone, Debug)]
pub(crate) enum Tok {
    Text(String),
    Code(String),
    SoftBreak,
    HardBreak,
    Html(String),
    Link { href: String, title: Option<String>, children: Vec<Tok> },
    Image { href: String, title: Option<String>, children: Vec<Tok> },
    Emphasis { children: Vec<Tok> },
    Strong { children: Vec<Tok> },
    /// An unresolved `*`/`_` run; `count` may shrink as emphasis pairs
    /// consume 1 or 2 of it at a time.
    Delim { ch: char, count: usize, can_open: bool, can_close: bool },
}

#[derive(Clone, Copy)]
struct DelimFrame {
    tok_index: usize,
    ch: char,
    count: usize,
    can_open: bool,
    can_close: bool,
    active: bool,
}

fn can_open_and_close(f: &DelimFrame) -> bool {
    f.can_open && f.can_close
}

fn blocked_by_rule_of_three(opener: &DelimFrame, closer: &DelimFrame) -> bool {
    can_open_and_close(opener)
        && can_open_and_close(closer)
        && (opener.count + closer.count) % 3 == 0
        && !(opener.count % 3 == 0 && closer.count % 3 == 0)
}

/// Resolve emphasis within `tokens[range]` in place, converting matched
/// delimiter-run pairs into `Emphasis`/`Strong` nodes and collapsing any
/// delimiters left unmatched at the end back into literal text.
pub(crate) fn process_emphasis(tokens: &mut Vec<Tok>, range: std::ops::Range<usize>) {
    let start = range.start;
    let mut end = range.end;

    let mut frames: Vec<DelimFrame> = Vec::new();
    for i in start..end {
        if let Tok::Delim { ch, count, can_open, can_close } = &tokens[i] {
            frames.push(DelimFrame {
                tok_index: i,
                ch: *ch,
                count: *count,
                can_open: *can_open,
                can_close: *can_close,
                active: true,
            });
        }
    }

    let mut closer_pos = 0usize;
    while closer_pos < frames.len() {
        if !frames[closer_pos].active || !frames[closer_pos].can_close {
            closer_pos += 1;
            continue;
        }

        let mut opener_pos = None;
        let mut search = closer_pos;
        while search > 0 {
            search -= 1;
            let o = frames[search];
            if o.active && o.can_open && o.ch == frames[closer_pos].ch && !blocked_by_rule_of_three(&o, &frames[closer_pos]) {
                opener_pos = Some(search);
                break;
            }
        }
        let Some(opener_pos) = opener_pos else {
            closer_pos += 1;
            continue;
        };

        // Anything strictly between opener and closer that is still an
        // active delimiter never found its own match; collapse it to text.
        for fi in (opener_pos + 1)..closer_pos {
            if frames[fi].active {
                let idx = frames[fi].tok_index;
                if let Tok::Delim { ch, count, .. } = &tokens[idx] {
                    tokens[idx] = Tok::Text(ch.to_string().repeat(*count));
                }
                frames[fi].active = false;
            }
        }

        let strength = frames[opener_pos].count.min(frames[closer_pos].count).min(2);
        let opener_tok_index = frames[opener_pos].tok_index;
        let closer_tok_index = frames[closer_pos].tok_index;

        let inner: Vec<Tok> = tokens[opener_tok_index + 1..closer_tok_index].to_vec();
        let wrapped = if strength == 2 {
            Tok::Strong { children: inner }
        } else {
            Tok::Emphasis { children: inner }
        };

        frames[opener_pos].count -= strength;
        frames[closer_pos].count -= strength;
        let opener_leftover = frames[opener_pos].count > 0;
        let closer_leftover = frames[closer_pos].count > 0;

        let mut replacement = Vec::with_capacity(3);
        if opener_leftover {
            replacement.push(Tok::Delim {
                ch: frames[opener_pos].ch,
                count: frames[opener_pos].count,
                can_open: frames[opener_pos].can_open,
                can_close: frames[opener_pos].can_close,
            });
        }
        replacement.push(wrapped);
        if closer_leftover {
            replacement.push(Tok::Delim {
                ch: frames[closer_pos].ch,
                count: frames[closer_pos].count,
                can_open: frames[closer_pos].can_open,
                can_close: frames[closer_pos].can_close,
            });
        }

        let old_len = closer_tok_index + 1 - opener_tok_index;
        let new_len = replacement.len();
        let delta = new_len as isize - old_len as isize;
        tokens.splice(opener_tok_index..closer_tok_index + 1, replacement);
        end = (end as isize + delta) as usize;

        let mut cursor = opener_tok_index;
        if opener_leftover {
            frames[opener_pos].tok_index = cursor;
            cursor += 1;
        } else {
            frames[opener_pos].active = false;
        }
        cursor += 1; // the wrapped node itself
        if closer_leftover {
            frames[closer_pos].tok_index = cursor;
        } else {
            frames[closer_pos].active = false;
        }

        for (fi, frame) in frames.iter_mut().enumerate() {
            if fi == opener_pos || fi == closer_pos {
                continue;
            }
            if frame.tok_index > closer_tok_index {
                frame.tok_index = (frame.tok_index as isize + delta) as usize;
            }
        }

        if frames[closer_pos].active {
            // Leftover closer count might still match an earlier opener.
            continue;
        }
        closer_pos += 1;
    }

    for i in start..end {
        if let Tok::Delim { ch, count, .. } = &tokens[i] {
            tokens[i] = Tok::Text(ch.to_string().repeat(*count));
        }
    }
}

/// Merge adjacent `Text` tokens, recursing into every container variant's
/// children.
pub(crate) fn merge_adjacent_text(tokens: Vec<Tok>) -> Vec<Tok> {
    let mut out: Vec<Tok> = Vec::with_capacity(tokens.len());
    for tok in tokens {
        let tok = match tok {
            Tok::Link { href, title, children } => Tok::Link { href, title, children: merge_adjacent_text(children) },
            Tok::Image { href, title, children } => Tok::Image { href, title, children: merge_adjacent_text(children) },
            Tok::Emphasis { children } => Tok::Emphasis { children: merge_adjacent_text(children) },
            Tok::Strong { children } => Tok::Strong { children: merge_adjacent_text(children) },
            other => other,
        };
        match (out.last_mut(), &tok) {
            (Some(Tok::Text(prev)), Tok::Text(next)) => prev.push_str(next),
            _ => out.push(tok),
        }
    }
    out
}

pub(crate) fn toks_to_inlines(toks: Vec<Tok>) -> Vec<Inline> {
    toks.into_iter()
        .map(|t| match t {
            Tok::Text(text) => Inline::Text { text },
            Tok::Code(text) => Inline::CodeSpan { text },
            Tok::SoftBreak => Inline::SoftBreak,
            Tok::HardBreak => Inline::HardBreak,
            Tok::Html(content) => Inline::Html { content },
            Tok::Link { href, title, children } => Inline::Link { href, title, children: toks_to_inlines(children) },
            Tok::Image { href, title, children } => Inline::Image { href, title, children: toks_to_inlines(children) },
            Tok::Emphasis { children } => Inline::Emphasis { children: toks_to_inlines(children) },
            Tok::Strong { children } => Inline::Strong { children: toks_to_inlines(children) },
            Tok::Delim { ch, count, .. } => Inline::Text { text: ch.to_string().repeat(count) },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delim(ch: char, count: usize, can_open: bool, can_close: bool) -> Tok {
        Tok::Delim { ch, count, can_open, can_close }
    }

    #[test]
    fn simple_emphasis_pair() {
        let mut toks = vec![delim('*', 1, true, false), Tok::Text("a".into()), delim('*', 1, false, true)];
        let len = toks.len();
        process_emphasis(&mut toks, 0..len);
        assert_eq!(toks.len(), 1);
        match &toks[0] {
            Tok::Emphasis { children } => assert!(matches!(children[0], Tok::Text(ref s) if s == "a")),
            other => panic!("expected emphasis, got {other:?}"),
        }
    }

    #[test]
    fn strong_from_double_run() {
        let mut toks = vec![delim('*', 2, true, false), Tok::Text("a".into()), delim('*', 2, false, true)];
        let len = toks.len();
        process_emphasis(&mut toks, 0..len);
        assert!(matches!(toks[0], Tok::Strong { .. }));
    }

    #[test]
    fn triple_run_nests_strong_in_emphasis() {
        // "***a***" -> strong(emphasis(a))? CommonMark actually nests
        // emphasis(strong) or strong(emphasis) depending on consumption
        // order; verify it collapses to a single wrapped node either way.
        let mut toks = vec![delim('*', 3, true, false), Tok::Text("a".into()), delim('*', 3, false, true)];
        let len = toks.len();
        process_emphasis(&mut toks, 0..len);
        assert_eq!(toks.len(), 1);
    }

    #[test]
    fn unmatched_delimiter_becomes_text() {
        let mut toks = vec![delim('*', 1, true, false), Tok::Text("a".into())];
        let len = toks.len();
        process_emphasis(&mut toks, 0..len);
        let merged = merge_adjacent_text(toks);
        assert_eq!(merged.len(), 1);
        assert!(matches!(&merged[0], Tok::Text(s) if s == "*a"));
    }

    #[test]
    fn merges_adjacent_text() {
        let toks = vec![Tok::Text("a".into()), Tok::Text("b".into()), Tok::Code("x".into())];
        let merged = merge_adjacent_text(toks);
        assert_eq!(merged.len(), 2);
        assert!(matches!(&merged[0], Tok::Text(s) if s == "ab"));
    }
}
