//! English phonemization for the Matcha acoustic model: espeak IPA,
//! Gruut-US rewrite, and `^`/`$` sentence markers.

use crate::error::Result;
use crate::text::chars::contains_cjk;
use crate::text::TokenMap;

use super::ipa::{gruut_us, text_to_ipa};

/// Convert English text to Matcha token ids.
///
/// Chinese input silently yields an empty sequence: this model cannot say
/// it, and an empty sequence downstream is a successful empty utterance.
/// The result is wrapped with the `^` start and `$` end markers; glyphs
/// missing from the vocabulary are skipped with a warning.
pub fn en_text_to_token_ids(text: &str, tokens: &TokenMap) -> Result<Vec<i64>> {
    if contains_cjk(text) {
        log::warn!("English phonemizer got CJK input, returning empty sequence");
        return Ok(Vec::new());
    }

    let ipa = gruut_us(&text_to_ipa(text)?);
    if ipa.is_empty() {
        return Ok(Vec::new());
    }

    let mut ids = Vec::with_capacity(ipa.chars().count() + 2);
    if let Some(id) = tokens.get("^") {
        ids.push(id);
    }
    let mut buf = [0u8; 4];
    for c in ipa.chars() {
        match tokens.get(c.encode_utf8(&mut buf)) {
            Some(id) => ids.push(id),
            None => log::warn!("skipping IPA glyph {c:?} not in vocabulary"),
        }
    }
    if let Some(id) = tokens.get("$") {
        ids.push(id);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vocab() -> TokenMap {
        // Line-indexed monolingual format, 0-based.
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all("^\n$\nh\nə\nl\nO\nw\nɜ\nɹ\nd\n \n".as_bytes())
            .unwrap();
        TokenMap::from_lines_file(file.path(), 0).unwrap()
    }

    #[test]
    fn cjk_input_yields_empty() {
        let ids = en_text_to_token_ids("你好", &vocab()).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn wraps_with_sentence_markers_if_espeak_present() {
        if !super::super::ipa::espeak_available() {
            return;
        }
        let vocab = vocab();
        let ids = en_text_to_token_ids("hello", &vocab).unwrap();
        assert!(ids.len() >= 2);
        assert_eq!(ids.first(), Some(&0), "starts with ^");
        assert_eq!(ids.last(), Some(&1), "ends with $");
    }
}
