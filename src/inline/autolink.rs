//! Autolink recognition: `<scheme:...>` and `<email>`, matched at the start
//! of `s` (the `<` must still be present).

pub(crate) enum Autolink {
    Uri(String),
    Email(String),
}

pub(crate) fn recognize_autolink(s: &str) -> Option<(Autolink, usize)> {
    let rest = s.strip_prefix('<')?;
    if let Some((uri, len)) = recognize_uri(rest) {
        return Some((Autolink::Uri(uri), len + 1));
    }
    if let Some((email, len)) = recognize_email(rest) {
        return Some((Autolink::Email(email), len + 1));
    }
    None
}

/// `[A-Za-z][A-Za-z0-9.+-]{1,31}:` followed by any run of non-space,
/// non-control, non-`<`/`>` characters up to the closing `>`.
fn recognize_uri(rest: &str) -> Option<(String, usize)> {
    let bytes = rest.as_bytes();
    let mut i = 0usize;
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() => i += 1,
        _ => return None,
    }
    let scheme_start = 0;
    while i < bytes.len()
        && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'.' | b'+' | b'-'))
    {
        i += 1;
    }
    let scheme_len = i - scheme_start;
    if !(2..=32).contains(&scheme_len) {
        return None;
    }
    if bytes.get(i) != Some(&b':') {
        return None;
    }
    i += 1;
    while i < bytes.len() {
        match bytes[i] {
            b'>' => {
                let uri = &rest[..i];
                return Some((uri.to_string(), i + 1));
            }
            b if b < 0x20 || b == 0x7F || b == b'<' || b == b' ' => return None,
            _ => i += 1,
        }
    }
    None
}

fn recognize_email(rest: &str) -> Option<(String, usize)> {
    let bytes = rest.as_bytes();
    let close = memchr::memchr(b'>', bytes)?;
    let candidate = &rest[..close];
    if is_valid_email(candidate) {
        Some((candidate.to_string(), close + 1))
    } else {
        None
    }
}

/// A reasonable approximation of CommonMark's email autolink regex:
/// `local@domain(.domain)*`, local is `[A-Za-z0-9.!#$%&'*+/=?^_\x60{|}~-]+`,
/// each domain label is alphanumeric/hyphen, not starting/ending with `-`.
fn is_valid_email(s: &str) -> bool {
    let Some(at) = s.find('@') else { return false };
    let (local, domain) = (&s[..at], &s[at + 1..]);
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if !local.chars().all(is_local_char) {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    for label in &labels {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return false;
        }
        if label.starts_with('-') || label.ends_with('-') {
            return false;
        }
    }
    true
}

fn is_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '/' | '=' | '?' | '^' | '_' | '`' | '{' | '|' | '}' | '~' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_autolink() {
        let (link, consumed) = recognize_autolink("<http://example.com>").unwrap();
        match link {
            Autolink::Uri(u) => assert_eq!(u, "http://example.com"),
            _ => panic!("expected uri"),
        }
        assert_eq!(consumed, "<http://example.com>".len());
    }

    #[test]
    fn email_autolink() {
        let (link, _) = recognize_autolink("<foo@bar.com>").unwrap();
        match link {
            Autolink::Email(e) => assert_eq!(e, "foo@bar.com"),
            _ => panic!("expected email"),
        }
    }

    #[test]
    fn rejects_space_in_uri() {
        assert!(recognize_autolink("<http://example.com/a b>").is_none());
    }

    #[test]
    fn rejects_bad_domain_label() {
        assert!(recognize_autolink("<foo@-bar.com>").is_none());
    }
}
