//! Bilingual (code-switched) phonemization for the Matcha zh-en model.
//!
//! The vocabulary mixes numbered pinyin syllables with IPA glyphs, so the
//! walker routes each script run down its own path. This model takes no
//! blank tokens.

use crate::error::Result;
use crate::text::chars::{number_to_chinese, roman_to_int, to_ascii_punct};
use crate::text::TokenMap;

use super::ipa::{gruut_us, text_to_ipa};
use super::{hanzi_to_pinyin, split_script_runs, ScriptClass};

/// Id every unknown token collapses to.
const UNKNOWN_ID: i64 = 1;

/// Convert mixed Chinese/English text to bilingual token ids.
pub fn zh_en_text_to_token_ids(text: &str, tokens: &TokenMap) -> Result<Vec<i64>> {
    let mut ids = Vec::new();
    for (class, run) in split_script_runs(text) {
        match class {
            ScriptClass::Cjk => push_hanzi(&run, tokens, &mut ids),
            ScriptClass::Latin => {
                if let Some(value) = roman_to_int(&run) {
                    // Roman numerals inside an English run read as numbers.
                    push_number_reading(value, tokens, &mut ids);
                } else {
                    push_english(&run, tokens, &mut ids)?;
                }
            }
            ScriptClass::Digit => push_digits(&run, tokens, &mut ids),
            ScriptClass::Space => {
                if let Some(id) = tokens.get(" ") {
                    ids.push(id);
                }
            }
            ScriptClass::Other => {
                for c in run.chars() {
                    let ascii = to_ascii_punct(c).unwrap_or(c);
                    let mut buf = [0u8; 4];
                    let id = tokens
                        .get(ascii.encode_utf8(&mut buf))
                        .unwrap_or(UNKNOWN_ID);
                    ids.push(id);
                }
            }
        }
    }
    Ok(ids)
}

/// Hanzi run: pinyin syllables with numbered tones.
fn push_hanzi(run: &str, tokens: &TokenMap, ids: &mut Vec<i64>) {
    for syllable in hanzi_to_pinyin(run) {
        let id = tokens
            .get(&syllable)
            .or_else(|| tokens.get(&syllable.to_lowercase()))
            .unwrap_or_else(|| {
                log::warn!("pinyin syllable {syllable:?} not in bilingual vocabulary");
                UNKNOWN_ID
            });
        ids.push(id);
    }
}

/// English run: espeak IPA with the Gruut-US rewrite, one id per glyph.
fn push_english(run: &str, tokens: &TokenMap, ids: &mut Vec<i64>) -> Result<()> {
    let ipa = gruut_us(&text_to_ipa(run)?);
    let mut buf = [0u8; 4];
    for c in ipa.chars() {
        let id = tokens.get(c.encode_utf8(&mut buf)).unwrap_or(UNKNOWN_ID);
        ids.push(id);
    }
    Ok(())
}

/// Digit run: Chinese reading (with 点 for decimals), then the pinyin path.
fn push_digits(run: &str, tokens: &TokenMap, ids: &mut Vec<i64>) {
    let reading = match run.split_once('.') {
        Some((int, frac)) => {
            let int: i64 = int.parse().unwrap_or(0);
            let frac_reading: String = frac
                .chars()
                .filter_map(|c| c.to_digit(10))
                .map(|d| {
                    ["零", "一", "二", "三", "四", "五", "六", "七", "八", "九"][d as usize]
                })
                .collect();
            format!("{}点{}", number_to_chinese(int), frac_reading)
        }
        None => number_to_chinese(run.parse().unwrap_or(0)),
    };
    push_hanzi(&reading, tokens, ids);
}

/// Roman numeral value via the numeric-reading path.
fn push_number_reading(value: i64, tokens: &TokenMap, ids: &mut Vec<i64>) {
    push_hanzi(&number_to_chinese(value), tokens, ids);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vocab() -> TokenMap {
        // 1-indexed bilingual format with a space-token line.
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            "_\n \njin1\ntian1\nxue2\nsan1\ndian3\nyi1\nwu3\ner4\np\nɪ\nθ\nɑ\nn\n,\n"
                .as_bytes(),
        )
        .unwrap();
        TokenMap::from_lines_file(file.path(), 1).unwrap()
    }

    #[test]
    fn hanzi_run_maps_to_pinyin_ids() {
        let vocab = vocab();
        let ids = zh_en_text_to_token_ids("今天", &vocab).unwrap();
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn digits_read_in_chinese_with_dian() {
        let vocab = vocab();
        // 3.15 -> 三点一五 -> san1 dian3 yi1 wu3
        let ids = zh_en_text_to_token_ids("3.15", &vocab).unwrap();
        assert_eq!(ids, vec![6, 7, 8, 9]);
    }

    #[test]
    fn roman_numerals_take_the_numeric_path() {
        let vocab = vocab();
        // III -> 3 -> 三
        let ids = zh_en_text_to_token_ids("III", &vocab).unwrap();
        assert_eq!(ids, vec![6]);
    }

    #[test]
    fn punctuation_maps_to_ascii_then_vocab() {
        let vocab = vocab();
        let ids = zh_en_text_to_token_ids("，", &vocab).unwrap();
        assert_eq!(ids, vec![16]);
    }

    #[test]
    fn unknown_symbols_collapse_to_one() {
        let vocab = vocab();
        let ids = zh_en_text_to_token_ids("№", &vocab).unwrap();
        assert_eq!(ids, vec![UNKNOWN_ID]);
    }
}
