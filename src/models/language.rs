//! Script-based language detection for user queries.
//!
//! Kana decides Japanese before Han is considered, since Japanese text
//! mixes kanji with kana while Chinese text has no kana at all.

use super::enums::Language;

/// Detect the response language from the characters of a query.
///
/// Priority: kana → Japanese, hangul → Korean, any Han ideograph → Chinese,
/// otherwise English.
pub fn detect_language(text: &str) -> Language {
    if text.chars().any(is_kana) {
        return Language::Ja;
    }
    if text.chars().any(is_hangul) {
        return Language::Ko;
    }
    if text.chars().any(is_han) {
        return Language::Zh;
    }
    Language::En
}

fn is_kana(ch: char) -> bool {
    matches!(ch, '\u{3040}'..='\u{30FF}')
}

fn is_hangul(ch: char) -> bool {
    matches!(ch, '\u{AC00}'..='\u{D7AF}')
}

fn is_han(ch: char) -> bool {
    matches!(
        ch,
        '\u{3400}'..='\u{4DBF}'
            | '\u{4E00}'..='\u{9FFF}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{20000}'..='\u{2FA1F}'
    )
}
