//! Character-level Unicode classification for corpus filtering.

/// Check the headword range that attracts the hiragana cost penalty:
/// ぁ (U+3041) up to but not including ん (U+3093). The upper bound is
/// exclusive so ん itself is never penalized; this matches the observed
/// behavior of the reference corpora and is kept as-is.
pub fn is_penalized_hiragana(c: char) -> bool {
    ('\u{3041}'..'\u{3093}').contains(&c)
}

/// Characters that disqualify a headword from the output corpus:
/// ASCII Latin letters, full-width Latin letters (ａ-ｚ, Ａ-Ｚ), and the
/// katakana block through ヾ (U+30A1..=U+30FE).
pub fn is_excluded_script(c: char) -> bool {
    c.is_ascii_alphabetic()
        || ('\u{FF41}'..='\u{FF5A}').contains(&c)
        || ('\u{FF21}'..='\u{FF3A}').contains(&c)
        || ('\u{30A1}'..='\u{30FE}').contains(&c)
}

/// True if any character of `s` falls in an excluded script.
pub fn has_excluded_script(s: &str) -> bool {
    s.chars().any(is_excluded_script)
}
