//! Kokoro phonemization: a fixed 114-symbol vocabulary with sparse ids,
//! a table-driven Mandarin pinyin-to-IPA G2P with tone arrows, and the
//! espeak path for English runs.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::Result;
use crate::text::chars::{number_to_chinese, to_ascii_punct};

use super::ipa::{gruut_us, text_to_ipa};
use super::{hanzi_to_pinyin, split_script_runs, ScriptClass};

/// Maximum token sequence length, including the two pad sentinels.
pub const MAX_TOKENS: usize = 512;

/// Pad id; also the start and end sentinel.
pub const PAD_ID: i64 = 0;

/// The model's symbol inventory. Ids are sparse in 0..=177; `$` is id 0
/// and doubles as PAD and the start/end sentinel.
const VOCAB_ENTRIES: &[(char, i64)] = &[
    ('$', 0),
    (';', 1),
    (':', 2),
    (',', 3),
    ('.', 4),
    ('!', 5),
    ('?', 6),
    ('—', 9),
    ('…', 10),
    ('"', 11),
    ('(', 12),
    (')', 13),
    ('\u{201c}', 14),
    ('\u{201d}', 15),
    (' ', 16),
    ('\u{0303}', 17),
    ('ʣ', 18),
    ('ʥ', 19),
    ('ʦ', 20),
    ('ʨ', 21),
    ('ᵝ', 22),
    ('A', 24),
    ('I', 25),
    ('O', 31),
    ('Q', 33),
    ('S', 35),
    ('T', 36),
    ('W', 39),
    ('Y', 41),
    ('ᵊ', 42),
    ('a', 43),
    ('b', 44),
    ('c', 45),
    ('d', 46),
    ('e', 47),
    ('f', 48),
    ('h', 50),
    ('i', 51),
    ('j', 52),
    ('k', 53),
    ('l', 54),
    ('m', 55),
    ('n', 56),
    ('o', 57),
    ('p', 58),
    ('q', 59),
    ('r', 60),
    ('s', 61),
    ('t', 62),
    ('u', 63),
    ('v', 64),
    ('w', 65),
    ('x', 66),
    ('y', 67),
    ('z', 68),
    ('ɑ', 69),
    ('ɐ', 70),
    ('ɒ', 71),
    ('æ', 72),
    ('β', 75),
    ('ɔ', 76),
    ('ɕ', 77),
    ('ç', 78),
    ('ɖ', 80),
    ('ð', 81),
    ('ʤ', 82),
    ('ə', 83),
    ('ɚ', 85),
    ('ɛ', 86),
    ('ɜ', 87),
    ('ɟ', 90),
    ('ɡ', 92),
    ('ɥ', 99),
    ('ɨ', 101),
    ('ɪ', 102),
    ('ʝ', 103),
    ('ɯ', 110),
    ('ɰ', 111),
    ('ŋ', 112),
    ('ɳ', 113),
    ('ɲ', 114),
    ('ɴ', 115),
    ('ø', 116),
    ('ɸ', 118),
    ('θ', 119),
    ('œ', 120),
    ('ɹ', 123),
    ('ɾ', 125),
    ('ɻ', 126),
    ('ʁ', 128),
    ('ɽ', 129),
    ('ʂ', 130),
    ('ʃ', 131),
    ('ʈ', 132),
    ('ʧ', 133),
    ('ʊ', 135),
    ('ʋ', 136),
    ('ʌ', 138),
    ('ɣ', 139),
    ('ɤ', 140),
    ('χ', 142),
    ('ʎ', 143),
    ('ʒ', 147),
    ('ʔ', 148),
    ('ˈ', 156),
    ('ˌ', 157),
    ('ː', 158),
    ('ʰ', 162),
    ('ʲ', 164),
    ('↓', 169),
    ('→', 171),
    ('↗', 172),
    ('↘', 173),
    ('ᵻ', 177),
];

static VOCAB: Lazy<HashMap<char, i64>> =
    Lazy::new(|| VOCAB_ENTRIES.iter().copied().collect());

/// Pinyin initials, longest first so `zh` wins over `z`.
const INITIALS: &[(&str, &str)] = &[
    ("zh", "ʈʂ"),
    ("ch", "ʈʂʰ"),
    ("sh", "ʂ"),
    ("b", "p"),
    ("p", "pʰ"),
    ("m", "m"),
    ("f", "f"),
    ("d", "t"),
    ("t", "tʰ"),
    ("n", "n"),
    ("l", "l"),
    ("g", "k"),
    ("k", "kʰ"),
    ("h", "x"),
    ("j", "tɕ"),
    ("q", "tɕʰ"),
    ("x", "ɕ"),
    ("r", "ɻ"),
    ("z", "ts"),
    ("c", "tsʰ"),
    ("s", "s"),
    ("y", "j"),
    ("w", "w"),
];

/// Pinyin finals after the ü substitution (`v` spells ü).
const FINALS: &[(&str, &str)] = &[
    ("iang", "jaŋ"),
    ("iong", "jʊŋ"),
    ("uang", "waŋ"),
    ("ueng", "wəŋ"),
    ("ang", "aŋ"),
    ("eng", "əŋ"),
    ("ong", "ʊŋ"),
    ("iao", "jaʊ"),
    ("ian", "jɛn"),
    ("ing", "iŋ"),
    ("uai", "waɪ"),
    ("uan", "wan"),
    ("van", "ɥɛn"),
    ("ai", "aɪ"),
    ("ei", "eɪ"),
    ("ao", "aʊ"),
    ("ou", "oʊ"),
    ("an", "an"),
    ("en", "ən"),
    ("er", "ɚ"),
    ("ia", "ja"),
    ("ie", "je"),
    ("iu", "joʊ"),
    ("in", "in"),
    ("ua", "wa"),
    ("uo", "wo"),
    ("ui", "weɪ"),
    ("un", "wən"),
    ("ue", "ɥe"),
    ("ve", "ɥe"),
    ("vn", "yn"),
    ("a", "a"),
    ("o", "o"),
    ("e", "ɤ"),
    ("i", "i"),
    ("u", "u"),
    ("v", "y"),
];

/// Tone number to the arrow glyph appended after the syllable. The
/// neutral tone appends nothing.
fn tone_arrow(tone: u8) -> Option<char> {
    match tone {
        1 => Some('→'),
        2 => Some('↗'),
        3 => Some('↓'),
        4 => Some('↘'),
        _ => None,
    }
}

/// Convert one numbered pinyin syllable (`zhong1`) to Kokoro IPA.
///
/// Unknown spellings come back empty rather than guessing.
pub fn pinyin_to_ipa(syllable: &str) -> String {
    let (body, tone) = match syllable.chars().last().and_then(|c| c.to_digit(10)) {
        Some(t @ 1..=5) => (&syllable[..syllable.len() - 1], t as u8),
        _ => (syllable, 5),
    };
    if body.is_empty() {
        return String::new();
    }

    let (initial, final_spelling) = match INITIALS
        .iter()
        .find(|&&(spelling, _)| body.starts_with(spelling))
    {
        Some(&(spelling, ipa)) => (Some((spelling, ipa)), &body[spelling.len()..]),
        None => (None, body),
    };

    let mut out = String::new();
    let mut final_spelling = final_spelling.to_string();
    if let Some((spelling, ipa)) = initial {
        out.push_str(ipa);
        // Syllabic specials: zhi/chi/shi/ri and zi/ci/si have no vowel.
        if final_spelling == "i" {
            if matches!(spelling, "zh" | "ch" | "sh" | "r") {
                out.push('ɻ');
                if let Some(arrow) = tone_arrow(tone) {
                    out.push(arrow);
                }
                return out;
            }
            if matches!(spelling, "z" | "c" | "s") {
                out.push('ɹ');
                if let Some(arrow) = tone_arrow(tone) {
                    out.push(arrow);
                }
                return out;
            }
        }
        // After j/q/x a written u is really ü.
        if matches!(spelling, "j" | "q" | "x") && final_spelling.starts_with('u') {
            final_spelling.replace_range(0..1, "v");
        }
    }

    match FINALS
        .iter()
        .find(|&&(spelling, _)| final_spelling == spelling)
    {
        Some(&(_, ipa)) => out.push_str(ipa),
        None => {
            log::warn!("pinyin final {final_spelling:?} has no IPA mapping");
            return String::new();
        }
    }
    if let Some(arrow) = tone_arrow(tone) {
        out.push(arrow);
    }
    out
}

/// Tokenize an IPA string one Unicode scalar at a time.
///
/// Unknown scalars are silently skipped. The content is truncated so the
/// padded sequence never exceeds [`MAX_TOKENS`], and the result is wrapped
/// in the pad sentinel: `[0, ..., 0]`.
pub fn tokenize(ipa: &str) -> Vec<i64> {
    let mut ids: Vec<i64> = ipa.chars().filter_map(|c| VOCAB.get(&c).copied()).collect();
    ids.truncate(MAX_TOKENS - 2);
    let mut wrapped = Vec::with_capacity(ids.len() + 2);
    wrapped.push(PAD_ID);
    wrapped.extend(ids);
    wrapped.push(PAD_ID);
    wrapped
}

/// Full text-to-ids pipeline for the Kokoro backend.
pub struct KokoroPhonemizer;

impl KokoroPhonemizer {
    pub fn new() -> Self {
        Self
    }

    /// Build the IPA string for mixed Chinese/English text.
    pub fn text_to_ipa(&self, text: &str) -> Result<String> {
        let mut ipa = String::new();
        for (class, run) in split_script_runs(text) {
            match class {
                ScriptClass::Cjk => {
                    for syllable in hanzi_to_pinyin(&run) {
                        ipa.push_str(&pinyin_to_ipa(&syllable));
                    }
                }
                ScriptClass::Latin => {
                    ipa.push_str(&gruut_us(&text_to_ipa(&run)?));
                }
                ScriptClass::Digit => {
                    // Digits read in Chinese, then down the pinyin path.
                    let reading = digit_run_to_chinese(&run);
                    for syllable in hanzi_to_pinyin(&reading) {
                        ipa.push_str(&pinyin_to_ipa(&syllable));
                    }
                }
                ScriptClass::Space => ipa.push(' '),
                ScriptClass::Other => {
                    for c in run.chars() {
                        let ascii = to_ascii_punct(c).unwrap_or(c);
                        if VOCAB.contains_key(&ascii) {
                            ipa.push(ascii);
                        }
                    }
                }
            }
        }
        Ok(ipa)
    }

    pub fn text_to_token_ids(&self, text: &str) -> Result<Vec<i64>> {
        Ok(tokenize(&self.text_to_ipa(text)?))
    }
}

impl Default for KokoroPhonemizer {
    fn default() -> Self {
        Self::new()
    }
}

fn digit_run_to_chinese(run: &str) -> String {
    match run.split_once('.') {
        Some((int, frac)) => {
            let digits: String = frac
                .chars()
                .filter_map(|c| c.to_digit(10))
                .map(|d| {
                    ["零", "一", "二", "三", "四", "五", "六", "七", "八", "九"][d as usize]
                })
                .collect();
            format!("{}点{}", number_to_chinese(int.parse().unwrap_or(0)), digits)
        }
        None => number_to_chinese(run.parse().unwrap_or(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_has_pad_and_sparse_ids() {
        assert_eq!(VOCAB.get(&'$'), Some(&0));
        assert_eq!(VOCAB.get(&'ᵻ'), Some(&177));
        assert_eq!(VOCAB.len(), VOCAB_ENTRIES.len(), "no duplicate glyphs");
    }

    #[test]
    fn retroflex_and_dental_syllabics() {
        assert_eq!(pinyin_to_ipa("zhi4"), "ʈʂɻ↘");
        assert_eq!(pinyin_to_ipa("shi4"), "ʂɻ↘");
        assert_eq!(pinyin_to_ipa("ri4"), "ɻɻ↘");
        assert_eq!(pinyin_to_ipa("si1"), "sɹ→");
        assert_eq!(pinyin_to_ipa("ci2"), "tsʰɹ↗");
    }

    #[test]
    fn jqx_u_becomes_yu() {
        assert_eq!(pinyin_to_ipa("ju2"), "tɕy↗");
        assert_eq!(pinyin_to_ipa("xu1"), "ɕy→");
        assert_eq!(pinyin_to_ipa("quan2"), "tɕʰɥɛn↗");
    }

    #[test]
    fn tone_arrows() {
        assert_eq!(pinyin_to_ipa("ma1"), "ma→");
        assert_eq!(pinyin_to_ipa("ma2"), "ma↗");
        assert_eq!(pinyin_to_ipa("ma3"), "ma↓");
        assert_eq!(pinyin_to_ipa("ma4"), "ma↘");
        assert_eq!(pinyin_to_ipa("ma5"), "ma", "neutral tone has no arrow");
    }

    #[test]
    fn zero_initial_syllables() {
        assert_eq!(pinyin_to_ipa("an4"), "an↘");
        assert_eq!(pinyin_to_ipa("er2"), "ɚ↗");
    }

    #[test]
    fn tokenize_wraps_and_bounds() {
        let ids = tokenize("ma→");
        assert_eq!(ids.first(), Some(&PAD_ID));
        assert_eq!(ids.last(), Some(&PAD_ID));
        assert_eq!(ids, vec![0, 55, 43, 171, 0]);

        let long: String = "a".repeat(4000);
        let ids = tokenize(&long);
        assert_eq!(ids.len(), MAX_TOKENS);
        assert_eq!(ids.first(), Some(&PAD_ID));
        assert_eq!(ids.last(), Some(&PAD_ID));
    }

    #[test]
    fn unknown_scalars_are_skipped() {
        assert_eq!(tokenize("m№a"), vec![0, 55, 43, 0]);
    }

    #[test]
    fn chinese_text_to_tokens() {
        let phonemizer = KokoroPhonemizer::new();
        let ids = phonemizer.text_to_token_ids("你好").unwrap();
        assert!(ids.len() > 2);
        assert_eq!(ids.first(), Some(&0));
        assert_eq!(ids.last(), Some(&0));
    }

    #[test]
    fn digits_go_through_the_pinyin_path() {
        let phonemizer = KokoroPhonemizer::new();
        // 25 -> 二十五 -> er4 shi2 wu3; the retroflex special yields ʂɻ for shi.
        let ipa = phonemizer.text_to_ipa("25").unwrap();
        assert!(ipa.contains('ɚ'), "er4 maps to ɚ: {ipa}");
        assert!(ipa.contains('ʂ'), "shi2 keeps the retroflex: {ipa}");
    }
}
