//! Backslash-escape and entity decoding. Shared by fence info-string
//! unescaping and the inline lexer.

use std::borrow::Cow;

use crate::byte_lookup::is_ascii_punctuation;
use crate::html_entities::{decode_numeric, lookup_named_entity};

/// Decode `\`-escapes of ASCII punctuation and HTML entities in `s`,
/// returning a new owned string. Invalid entities and non-punctuation
/// backslash sequences are left as literal text.
pub(crate) fn decode_entities_and_escapes(s: &str) -> String {
    unescape_backslashes(&decode_entities(s)).into_owned()
}

fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '&' => {
                if let Some((consumed, replacement)) = try_decode_entity(&s[i..]) {
                    out.push_str(&replacement);
                    for _ in 1..entity_char_count(&s[i..i + consumed]) {
                        chars.next();
                    }
                    continue;
                }
                out.push('&');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Unescapes `\`-escaped ASCII punctuation, leaving other backslash
/// sequences untouched. Most strings have no backslash at all, so a quick
/// `memchr` scan skips the escape machinery in the common case.
fn unescape_backslashes(s: &str) -> Cow<str> {
    if memchr::memchr(b'\\', s.as_bytes()).is_none() {
        return Cow::Borrowed(s);
    }
    match unescape_zero_copy::unescape(backslash_escape_handler, s) {
        Ok(result) => result,
        Err(_) => Cow::Borrowed(s),
    }
}

fn backslash_escape_handler(s: &str) -> Result<(Option<char>, &str), unescape_zero_copy::Error> {
    let mut chars = s.chars();
    let next = chars.next().ok_or(unescape_zero_copy::Error::IncompleteSequence)?;
    match next {
        c if c.is_ascii() && is_ascii_punctuation(c as u8) => Ok((Some(c), chars.as_str())),
        _ => Ok((Some('\\'), s)),
    }
}

fn entity_char_count(s: &str) -> usize {
    s.chars().count()
}

/// Try to decode an entity starting at `s[0] == '&'`. Returns the byte
/// length consumed (including `&` and the trailing `;`) and the replacement
/// text.
fn try_decode_entity(s: &str) -> Option<(usize, String)> {
    let rest = &s[1..];
    if let Some(digits_start) = rest.strip_prefix('#') {
        let (is_hex, digits_start) = match digits_start.strip_prefix(['x', 'X']) {
            Some(r) => (true, r),
            None => (false, digits_start),
        };
        let digit_len = digits_start
            .bytes()
            .take_while(|b| if is_hex { b.is_ascii_hexdigit() } else { b.is_ascii_digit() })
            .count();
        if digit_len == 0 || digit_len > 8 {
            return None;
        }
        let digits = &digits_start[..digit_len];
        let after_digits = &digits_start[digit_len..];
        if !after_digits.starts_with(';') {
            return None;
        }
        let radix = if is_hex { 16 } else { 10 };
        let code_point = u32::from_str_radix(digits, radix).ok()?;
        let consumed = 1 + 1 + (if is_hex { 1 } else { 0 }) + digit_len + 1;
        return Some((consumed, decode_numeric(code_point).to_string()));
    }

    let name_len = rest.bytes().take_while(|b| b.is_ascii_alphanumeric()).count();
    if name_len == 0 {
        return None;
    }
    let name = &rest[..name_len];
    if rest.as_bytes().get(name_len) != Some(&b';') {
        return None;
    }
    let replacement = lookup_named_entity(name)?;
    Some((1 + name_len + 1, replacement.to_string()))
}
