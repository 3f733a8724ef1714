//! Language-aware phonemization: text to model token ids.
//!
//! Four pipelines share this module: Chinese lexicon lookup, English IPA,
//! the bilingual code-switching walker, and the table-driven Kokoro G2P.

pub mod ipa;
pub mod kokoro;
pub mod zh;
pub mod zh_en;

mod en;

pub use en::en_text_to_token_ids;
pub use kokoro::KokoroPhonemizer;
pub use zh::ZhPhonemizer;
pub use zh_en::zh_en_text_to_token_ids;

use crate::text::chars::is_cjk;

/// Script class of one scalar, used by the run-segmenting walkers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptClass {
    Cjk,
    Latin,
    Digit,
    Space,
    Other,
}

pub fn script_class(c: char) -> ScriptClass {
    if is_cjk(c) {
        ScriptClass::Cjk
    } else if c.is_ascii_alphabetic() {
        ScriptClass::Latin
    } else if c.is_ascii_digit() || c == '.' {
        // The walker decides whether '.' is a decimal point from context.
        ScriptClass::Digit
    } else if c.is_whitespace() {
        ScriptClass::Space
    } else {
        ScriptClass::Other
    }
}

/// Split text into maximal runs of one script class.
///
/// A '.' only belongs to a digit run when digits surround it; elsewhere it
/// is punctuation.
pub fn split_script_runs(text: &str) -> Vec<(ScriptClass, String)> {
    let chars: Vec<char> = text.chars().collect();
    let mut runs: Vec<(ScriptClass, String)> = Vec::new();
    for (i, &c) in chars.iter().enumerate() {
        let mut class = script_class(c);
        if c == '.' {
            let prev_digit = i > 0 && chars[i - 1].is_ascii_digit();
            let next_digit = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
            if !(prev_digit && next_digit) {
                class = ScriptClass::Other;
            }
        }
        match runs.last_mut() {
            Some((last, run)) if *last == class => run.push(c),
            _ => runs.push((class, c.to_string())),
        }
    }
    runs
}

/// Hanzi to numbered pinyin (TONE3 style), one syllable per ideograph.
/// Neutral-tone syllables get an explicit 5. Characters without a reading
/// are skipped.
pub fn hanzi_to_pinyin(text: &str) -> Vec<String> {
    use pinyin::ToPinyin;
    text.to_pinyin()
        .flatten()
        .map(|p| {
            let syllable = p.with_tone_num_end();
            if syllable.ends_with(|c: char| c.is_ascii_digit()) {
                syllable.to_string()
            } else {
                format!("{syllable}5")
            }
        })
        .collect()
}
