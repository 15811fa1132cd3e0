//! Kana-to-Latin transliteration engine.
//!
//! Each kana character maps 1:1 onto a fixed syllable table; the raw
//! concatenation is then normalized by an ordered list of
//! context-correction rewrite rules. The rules are order-dependent:
//! earlier passes collapse the `x` elision marker after specific
//! consonant groups, later passes handle the generic contraction and
//! the geminate (small-tsu) marker, which relies on the earlier passes
//! having already consumed their `x` markers.
//!
//! Characters outside the kana ranges map to `*`, the long-vowel mark
//! ー maps to `-`, and an `x` that no rule consumed stays in place.
//! Callers detect those markers and reject the result; this module
//! never attempts a best-effort approximation.

use std::sync::OnceLock;

use regex::Regex;

/// Romanizations for the 86 contiguous code points of each kana range,
/// in code-point order (ぁ..ゖ / ァ..ヶ). `x` prefixes mark the small
/// (elision) variants resolved later by the rewrite rules.
const SYLLABLES: [&str; 86] = [
    "xa", "a", "xi", "i", "xu", "u", "xe", "e", "xo", "o", // ぁ..お
    "ka", "ga", "ki", "gi", "ku", "gu", "ke", "ge", "ko", "go", // か..ご
    "sa", "za", "shi", "ji", "su", "zu", "se", "ze", "so", "zo", // さ..ぞ
    "ta", "da", "chi", "ji", "xtsu", "tsu", "zu", "te", "de", "to", "do", // た..ど
    "na", "ni", "nu", "ne", "no", // な..の
    "ha", "ba", "pa", "hi", "bi", "pi", "fu", "bu", "pu", // は..ぷ
    "he", "be", "pe", "ho", "bo", "po", // へ..ぽ
    "ma", "mi", "mu", "me", "mo", // ま..も
    "xya", "ya", "xyu", "yu", "xyo", "yo", // ゃ..よ
    "ra", "ri", "ru", "re", "ro", // ら..ろ
    "xwa", "wa", "wi", "we", "wo", "n", "vu", "xka", "xke", // ゎ..ゖ
];

const HIRAGANA_BASE: u32 = 0x3041; // ぁ
const HIRAGANA_LAST: u32 = 0x3096; // ゖ
const KATAKANA_BASE: u32 = 0x30A1; // ァ
const KATAKANA_LAST: u32 = 0x30F6; // ヶ
const LONG_VOWEL_MARK: char = 'ー';

/// The ordered context-correction passes. Applied strictly in sequence;
/// do not reorder.
const RULES: [(&str, &str); 10] = [
    // Palatalized digraph after sibilants: しゃ/ちゃ/じゃ groups
    (r"([sc]h|j)ixy([aueo])", "${1}${2}"),
    (r"([sc]h|j)ix(e)", "${1}${2}"),
    // Palatalized digraph after plain consonants: きゃ, りょ, ...
    (r"([kgnhbpmr])ix(y[aueo]|e)", "${1}${2}"),
    // Small vowel after ふ/ヴ/つ: ふぁ → fa, つぃ → tsi
    (r"([fv]|ts)ux([aieo])", "${1}${2}"),
    // Historical orthography: てぃ/でぃ and とぅ/どぅ
    (r"([td])ex(i)", "${1}h${2}"),
    (r"([td])ox(u)", "${1}w${2}"),
    // Generic contraction: うぃ → wi
    (r"ux([aieo])", "w${1}"),
    // Geminate marker: っち → tch, っk → kk, trailing っ → t
    (r"xtsuch", "tch"),
    (r"xtsu([kgsztdnhbpfmurwv])", "${1}${1}"),
    (r"xtsu$", "t"),
];

fn rules() -> &'static [(Regex, &'static str)] {
    static COMPILED: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        RULES
            .iter()
            .map(|&(pattern, replacement)| {
                let re = Regex::new(pattern).expect("rewrite pattern must compile");
                (re, replacement)
            })
            .collect()
    })
}

/// Per-character table lookup, before any correction pass.
fn raw_romanize(reading: &str) -> String {
    let mut out = String::new();
    for ch in reading.chars() {
        let c = ch as u32;
        let index = if (KATAKANA_BASE..=KATAKANA_LAST).contains(&c) {
            c - KATAKANA_BASE
        } else if (HIRAGANA_BASE..=HIRAGANA_LAST).contains(&c) {
            c - HIRAGANA_BASE
        } else if ch == LONG_VOWEL_MARK {
            out.push('-');
            continue;
        } else {
            out.push('*');
            continue;
        };
        out.push_str(SYLLABLES[index as usize]);
    }
    out
}

/// Transliterate a kana reading to its Latin approximation.
///
/// The result may still contain `*`, `-`, or an unconsumed `x`; use
/// [`is_fully_romanized`] to decide whether it is usable.
pub fn romanize(reading: &str) -> String {
    let mut s = raw_romanize(reading);
    for (re, replacement) in rules() {
        if let std::borrow::Cow::Owned(rewritten) = re.replace_all(&s, *replacement) {
            s = rewritten;
        }
    }
    s
}

/// True if `s` is non-empty and free of the `*`, `-`, and `x` markers
/// that signal an unrepresentable or incomplete transliteration.
pub fn is_fully_romanized(s: &str) -> bool {
    !s.is_empty() && !s.contains(['*', '-', 'x'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_syllables() {
        assert_eq!(romanize("ねこ"), "neko");
        assert_eq!(romanize("ネコ"), "neko");
        assert_eq!(romanize("あい"), "ai");
        assert_eq!(romanize("ん"), "n");
    }

    #[test]
    fn test_script_invariance() {
        // Hiragana and katakana encode the same syllable inventory.
        for (hira, kata) in [
            ("がっこう", "ガッコウ"),
            ("しゃしん", "シャシン"),
            ("ねこ", "ネコ"),
            ("ちょうちょ", "チョウチョ"),
        ] {
            assert_eq!(romanize(hira), romanize(kata), "{hira} vs {kata}");
        }
    }

    #[test]
    fn test_rule_sibilant_palatal() {
        assert_eq!(romanize("しゃ"), "sha");
        assert_eq!(romanize("しゅ"), "shu");
        assert_eq!(romanize("ちょ"), "cho");
        assert_eq!(romanize("じゃ"), "ja");
    }

    #[test]
    fn test_rule_sibilant_small_e() {
        assert_eq!(romanize("しぇ"), "she");
        assert_eq!(romanize("ちぇ"), "che");
        assert_eq!(romanize("じぇ"), "je");
    }

    #[test]
    fn test_rule_consonant_palatal() {
        assert_eq!(romanize("きゃ"), "kya");
        assert_eq!(romanize("りょ"), "ryo");
        assert_eq!(romanize("ぎゅ"), "gyu");
        assert_eq!(romanize("にぇ"), "ne");
    }

    #[test]
    fn test_rule_labial_small_vowel() {
        assert_eq!(romanize("ふぁ"), "fa");
        assert_eq!(romanize("ふぃ"), "fi");
        assert_eq!(romanize("ヴぉ"), "vo");
        assert_eq!(romanize("つぁ"), "tsa");
    }

    #[test]
    fn test_rule_historical_ti_di() {
        assert_eq!(romanize("てぃ"), "thi");
        assert_eq!(romanize("でぃ"), "dhi");
    }

    #[test]
    fn test_rule_historical_tu_du() {
        assert_eq!(romanize("とぅ"), "twu");
        assert_eq!(romanize("どぅ"), "dwu");
    }

    #[test]
    fn test_rule_generic_contraction() {
        assert_eq!(romanize("うぃ"), "wi");
        assert_eq!(romanize("うぇ"), "we");
        assert_eq!(romanize("うぉ"), "wo");
    }

    #[test]
    fn test_rule_geminate_tch() {
        assert_eq!(romanize("まっちゃ"), "matcha");
        assert_eq!(romanize("こっち"), "kotchi");
    }

    #[test]
    fn test_rule_geminate_doubling() {
        assert_eq!(romanize("がっこう"), "gakkou");
        assert_eq!(romanize("きって"), "kitte");
        assert_eq!(romanize("ざっし"), "zasshi");
        assert_eq!(romanize("いっぱい"), "ippai");
    }

    #[test]
    fn test_rule_trailing_geminate() {
        assert_eq!(romanize("あっ"), "at");
    }

    #[test]
    fn test_long_vowel_marker_preserved() {
        assert_eq!(romanize("ラーメン"), "ra-men");
        assert!(!is_fully_romanized(&romanize("ラーメン")));
    }

    #[test]
    fn test_out_of_range_becomes_star() {
        assert_eq!(romanize("猫"), "*");
        assert_eq!(romanize("ね漢こ"), "ne*ko");
        assert!(!is_fully_romanized(&romanize("猫")));
    }

    #[test]
    fn test_unconsumed_marker_left_in_place() {
        // A bare small ゃ has no preceding consonant context; the marker
        // survives and the caller must reject the result.
        assert_eq!(romanize("ゃ"), "xya");
        assert!(!is_fully_romanized("xya"));
        // Geminate before a vowel is never doubled
        assert_eq!(romanize("っあ"), "xtsua");
    }

    #[test]
    fn test_small_ka_ke() {
        assert_eq!(romanize("ゕ"), "xka");
        assert_eq!(romanize("ヶ"), "xke");
    }

    #[test]
    fn test_is_fully_romanized() {
        assert!(is_fully_romanized("neko"));
        assert!(!is_fully_romanized(""));
        assert!(!is_fully_romanized("ne-ko"));
        assert!(!is_fully_romanized("ne*ko"));
        assert!(!is_fully_romanized("nexko"));
    }

    #[test]
    fn test_rules_are_pure_and_repeatable() {
        let first = romanize("がっこう");
        let second = romanize("がっこう");
        assert_eq!(first, second);
    }
}
