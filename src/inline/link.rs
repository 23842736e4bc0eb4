//! Link destination/title/label sub-grammars and percent-encoding. Shared
//! between inline link/image resolution and the reference-definition sweep
//! (`crate::refdef`).

/// The destination safe set that passes through percent-encoding unchanged,
/// beyond ASCII alphanumerics, kept as a static byte table alongside the
/// other lookup tables in `byte_lookup`.
pub(crate) const DESTINATION_SAFE_BYTES: &[u8] = b";/?:@&=+$,-_.!~*'()#";

pub(crate) struct ScannedDestination {
    /// Raw text between the delimiters (or up to the stop character for a
    /// bare destination), with backslash escapes still present.
    pub raw: String,
    /// Bytes of the input consumed, including any enclosing `<`/`>`.
    pub consumed: usize,
}

/// Scan a link destination at the start of `s`: either `<...>`-wrapped or
/// bare.
pub(crate) fn scan_link_destination(s: &str) -> Option<ScannedDestination> {
    if s.starts_with('<') {
        scan_bracketed_destination(s)
    } else {
        scan_bare_destination(s)
    }
}

fn scan_bracketed_destination(s: &str) -> Option<ScannedDestination> {
    let mut raw = String::new();
    let mut chars = s.char_indices().skip(1);
    loop {
        match chars.next() {
            None => return None,
            Some((i, '>')) => {
                return Some(ScannedDestination { raw, consumed: i + 1 });
            }
            Some((_, '\n')) => return None,
            Some((_, '<')) => return None,
            Some((_, '\\')) => {
                let Some((_, next)) = chars.next() else {
                    raw.push('\\');
                    continue;
                };
                raw.push('\\');
                raw.push(next);
            }
            Some((_, c)) => raw.push(c),
        }
    }
}

fn scan_bare_destination(s: &str) -> Option<ScannedDestination> {
    let mut raw = String::new();
    let mut depth: i32 = 0;
    let mut consumed = 0usize;
    let mut chars = s.char_indices().peekable();
    while let Some(&(i, c)) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => break,
            c if c.is_ascii() && crate::byte_lookup::is_ascii_control(c as u8) => break,
            '(' => {
                depth += 1;
                if depth > 32 {
                    return None;
                }
                raw.push(c);
                consumed = i + 1;
                chars.next();
            }
            ')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                raw.push(c);
                consumed = i + 1;
                chars.next();
            }
            '\\' => {
                chars.next();
                match chars.peek() {
                    Some(&(j, next)) if next == ' ' => {
                        consumed = j;
                        break;
                    }
                    Some(&(j, next)) => {
                        raw.push('\\');
                        raw.push(next);
                        consumed = j + next.len_utf8();
                        chars.next();
                    }
                    None => {
                        raw.push('\\');
                        consumed = i + 1;
                    }
                }
            }
            c => {
                raw.push(c);
                consumed = i + c.len_utf8();
                chars.next();
            }
        }
    }
    if depth != 0 {
        return None;
    }
    Some(ScannedDestination { raw, consumed })
}

/// Scan a link title at the start of `s`: `"..."`, `'...'`, or `(...)`.
pub(crate) fn scan_link_title(s: &str) -> Option<(String, usize)> {
    let mut chars = s.char_indices();
    let close = match chars.next() {
        Some((_, '"')) => '"',
        Some((_, '\'')) => '\'',
        Some((_, '(')) => ')',
        _ => return None,
    };
    let paren_form = close == ')';
    let mut raw = String::new();
    loop {
        match chars.next() {
            None => return None,
            Some((i, c)) if c == close => return Some((raw, i + 1)),
            Some((_, '\\')) => match chars.next() {
                Some((_, next)) => {
                    raw.push('\\');
                    raw.push(next);
                }
                None => return None,
            },
            Some((_, '(')) if paren_form => return None,
            Some((_, c)) => raw.push(c),
        }
    }
}

/// Scan a reference label `[...]` at the start of `s`, returning its raw
/// inner text (escapes intact) and the total consumed byte length including
/// both brackets.
pub(crate) fn scan_link_label(s: &str) -> Option<(String, usize)> {
    if !s.starts_with('[') {
        return None;
    }
    let mut raw = String::new();
    let mut has_nonws = false;
    let mut chars = s.char_indices().skip(1);
    loop {
        match chars.next() {
            None => return None,
            Some((i, ']')) => {
                if !has_nonws {
                    return None;
                }
                return Some((raw, i + 1));
            }
            Some((_, '[')) => return None,
            Some((_, '\\')) => match chars.next() {
                Some((_, next)) => {
                    raw.push('\\');
                    raw.push(next);
                    if !next.is_whitespace() {
                        has_nonws = true;
                    }
                }
                None => return None,
            },
            Some((_, c)) => {
                if !c.is_whitespace() {
                    has_nonws = true;
                }
                raw.push(c);
            }
        }
        if raw.chars().count() > 999 {
            return None;
        }
    }
}

fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

/// Percent-encode `input` (already backslash/entity-decoded) for use as a
/// link `href`: ASCII alphanumerics and
/// [`DESTINATION_SAFE_BYTES`] pass through; other ASCII is percent-encoded;
/// existing well-formed `%HH` sequences are preserved; non-ASCII characters
/// are percent-encoded byte-by-byte over their UTF-8 representation.
///
/// A lone UTF-16 surrogate can never occur here: `input` is a Rust `&str`,
/// which is always valid UTF-8, so there is no equivalent of the source's
/// "replace lone surrogates with U+FFFD" step to perform.
pub(crate) fn percent_encode_destination(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0usize;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'%' && i + 2 < bytes.len() && is_hex_digit(bytes[i + 1]) && is_hex_digit(bytes[i + 2]) {
            out.push('%');
            out.push(bytes[i + 1] as char);
            out.push(bytes[i + 2] as char);
            i += 3;
            continue;
        }
        if b.is_ascii_alphanumeric() || DESTINATION_SAFE_BYTES.contains(&b) {
            out.push(b as char);
            i += 1;
            continue;
        }
        if b.is_ascii() {
            out.push_str(&format!("%{:02X}", b));
            i += 1;
            continue;
        }
        let ch_len = input[i..].chars().next().map(|c| c.len_utf8()).unwrap_or(1);
        for &byte in &bytes[i..i + ch_len] {
            out.push_str(&format!("%{:02X}", byte));
        }
        i += ch_len;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_destination_stops_at_space() {
        let d = scan_link_destination("/url title").unwrap();
        assert_eq!(d.raw, "/url");
        assert_eq!(d.consumed, 4);
    }

    #[test]
    fn bracketed_destination_allows_spaces() {
        let d = scan_link_destination("<my url>").unwrap();
        assert_eq!(d.raw, "my url");
        assert_eq!(d.consumed, 8);
    }

    #[test]
    fn bare_destination_balances_parens() {
        let d = scan_link_destination("/url(a(b)c)").unwrap();
        assert_eq!(d.raw, "/url(a(b)c)");
    }

    #[test]
    fn bare_destination_stops_at_unbalanced_paren() {
        let d = scan_link_destination("/url)rest").unwrap();
        assert_eq!(d.raw, "/url");
        assert_eq!(d.consumed, 4);
    }

    #[test]
    fn title_double_quoted() {
        let (t, consumed) = scan_link_title("\"hi\" rest").unwrap();
        assert_eq!(t, "hi");
        assert_eq!(consumed, 4);
    }

    #[test]
    fn title_paren_disallows_unescaped_paren() {
        assert!(scan_link_title("(a(b)").is_none());
    }

    #[test]
    fn label_requires_nonwhitespace() {
        assert!(scan_link_label("[   ]").is_none());
        let (label, consumed) = scan_link_label("[foo]").unwrap();
        assert_eq!(label, "foo");
        assert_eq!(consumed, 5);
    }

    #[test]
    fn percent_encoding_preserves_safe_set_and_escapes_rest() {
        assert_eq!(percent_encode_destination("/foo bar"), "/foo%20bar");
        assert_eq!(percent_encode_destination("100% done"), "100%25%20done");
    }

    #[test]
    fn percent_encoding_preserves_existing_percent_escapes() {
        assert_eq!(percent_encode_destination("/%20"), "/%20");
    }
}
