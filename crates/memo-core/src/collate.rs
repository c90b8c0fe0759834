//! Title collation
//!
//! Plain `str` ordering compares code points, which splits katakana and
//! hiragana spellings of the same word into different regions of a list and
//! puts full-width Latin letters after every kana. Titles are compared on a
//! folded primary key instead:
//!
//! - katakana folds onto hiragana (`ア` sorts with `あ`)
//! - full-width ASCII folds onto ASCII (`Ｒｕｓｔ` sorts with `rust`)
//! - case is folded
//!
//! Ties on the primary key fall back to a tertiary comparison where
//! lowercase precedes uppercase and hiragana precedes katakana, so the
//! ordering is total and deterministic.

use std::cmp::Ordering;

const KATAKANA_START: u32 = 0x30A1;
const KATAKANA_END: u32 = 0x30F6;
const KANA_OFFSET: u32 = 0x60;
const FULLWIDTH_START: u32 = 0xFF01;
const FULLWIDTH_END: u32 = 0xFF5E;
const FULLWIDTH_OFFSET: u32 = 0xFEE0;
const IDEOGRAPHIC_SPACE: char = '\u{3000}';

/// Compare two titles for display ordering
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(primary_key(b))
        .then_with(|| tertiary_key(a).cmp(tertiary_key(b)))
}

/// Folded characters used for the primary comparison
fn primary_key(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().map(fold_width).map(fold_kana).flat_map(char::to_lowercase)
}

fn tertiary_key(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().map(swap_ascii_case)
}

/// Map a katakana code point onto its hiragana counterpart
fn fold_kana(c: char) -> char {
    let cp = c as u32;
    match cp {
        KATAKANA_START..=KATAKANA_END => char::from_u32(cp - KANA_OFFSET).unwrap_or(c),
        // Katakana iteration marks ヽ ヾ
        0x30FD | 0x30FE => char::from_u32(cp - KANA_OFFSET).unwrap_or(c),
        _ => c,
    }
}

/// Map full-width ASCII variants (and the ideographic space) onto ASCII
fn fold_width(c: char) -> char {
    if c == IDEOGRAPHIC_SPACE {
        return ' ';
    }
    let cp = c as u32;
    match cp {
        FULLWIDTH_START..=FULLWIDTH_END => char::from_u32(cp - FULLWIDTH_OFFSET).unwrap_or(c),
        _ => c,
    }
}

fn swap_ascii_case(c: char) -> char {
    if c.is_ascii_lowercase() {
        c.to_ascii_uppercase()
    } else if c.is_ascii_uppercase() {
        c.to_ascii_lowercase()
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut titles: Vec<&str>) -> Vec<&str> {
        titles.sort_by(|a, b| compare_titles(a, b));
        titles
    }

    #[test]
    fn test_ascii_is_case_insensitive() {
        assert_eq!(sorted(vec!["banana", "Apple", "cherry"]), vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn test_lowercase_before_uppercase_on_tie() {
        assert_eq!(compare_titles("apple", "Apple"), Ordering::Less);
        assert_eq!(compare_titles("Apple", "apple"), Ordering::Greater);
        assert_eq!(compare_titles("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_katakana_sorts_with_hiragana() {
        // Code point order would put every katakana title after "う".
        let titles = sorted(vec!["うどん", "カレー", "あめ", "イカ"]);
        assert_eq!(titles, vec!["あめ", "イカ", "うどん", "カレー"]);
    }

    #[test]
    fn test_hiragana_precedes_katakana_on_tie() {
        assert_eq!(compare_titles("かめ", "カメ"), Ordering::Less);
    }

    #[test]
    fn test_voiced_kana_follow_unvoiced() {
        let titles = sorted(vec!["き", "が", "か"]);
        assert_eq!(titles, vec!["か", "が", "き"]);
    }

    #[test]
    fn test_fullwidth_latin_folds_to_ascii() {
        let titles = sorted(vec!["zebra", "Ｒｕｓｔ", "python"]);
        assert_eq!(titles, vec!["python", "Ｒｕｓｔ", "zebra"]);
    }

    #[test]
    fn test_latin_before_kana_before_kanji() {
        let titles = sorted(vec!["漢字", "かな", "latin"]);
        assert_eq!(titles, vec!["latin", "かな", "漢字"]);
    }
}
