//! Character class tables used by the emphasis flanking rules.

use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

/// CommonMark's Unicode whitespace set, spelled out explicitly rather than
/// relying on `char::is_whitespace` (which differs slightly, e.g. it
/// excludes U+0085 NEL).
pub(crate) fn is_unicode_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r' | ' ' | '\u{A0}' | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

/// Unicode punctuation = general categories P (Punctuation) union S (Symbol).
pub(crate) fn is_unicode_punctuation(c: char) -> bool {
    matches!(
        c.general_category_group(),
        GeneralCategoryGroup::Punctuation | GeneralCategoryGroup::Symbol
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_punctuation_is_punctuation() {
        assert!(is_unicode_punctuation('*'));
        assert!(is_unicode_punctuation('.'));
        assert!(!is_unicode_punctuation('a'));
    }

    #[test]
    fn whitespace_set() {
        assert!(is_unicode_whitespace(' '));
        assert!(is_unicode_whitespace('\u{00A0}'));
        assert!(!is_unicode_whitespace('a'));
    }
}
