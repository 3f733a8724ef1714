//! Chinese phonemization for the Matcha zh-baker model: jieba word
//! segmentation, lexicon lookup, and tone-aware fallbacks.

use jieba_rs::Jieba;

use crate::text::chars::{is_punctuation, to_ascii_punct};
use crate::text::{Lexicon, TokenMap};

/// Phoneme spellings the lexicon emits but some vocabularies lack.
const PHONEME_FALLBACKS: &[(&str, &str)] = &[("shei2", "she2"), ("hm", "hm1")];

/// Generic pause tokens tried for punctuation, most specific first.
const PAUSE_TOKENS: &[&str] = &["sil", "sp", "<eps>"];

/// Chinese text to Matcha token ids.
///
/// Owns the segmenter and lexicon; the token map stays with the backend
/// because the vocabulary belongs to the acoustic model.
pub struct ZhPhonemizer {
    jieba: Jieba,
    lexicon: Lexicon,
}

impl ZhPhonemizer {
    /// Build the segmenter. Lexicon words are added to the jieba
    /// dictionary so segmentation prefers words the lexicon can spell.
    pub fn new(lexicon: Lexicon) -> Self {
        let mut jieba = Jieba::new();
        for word in lexicon.words() {
            jieba.add_word(word, None, None);
        }
        Self { jieba, lexicon }
    }

    pub fn text_to_token_ids(&self, text: &str, tokens: &TokenMap) -> Vec<i64> {
        let text = normalize_punctuation(text);
        let words = self.segment(&text);

        let mut ids = Vec::new();
        for word in words {
            self.word_to_ids(&word, tokens, &mut ids, 0);
        }
        ids
    }

    /// Segment, then collapse whitespace runs and punctuation runs.
    fn segment(&self, text: &str) -> Vec<String> {
        let raw = self.jieba.cut(text, false);
        let mut words: Vec<String> = Vec::with_capacity(raw.len());
        for word in raw {
            let trimmed = word.trim();
            if trimmed.is_empty() {
                continue;
            }
            let is_punct_run = trimmed.chars().all(is_punctuation);
            if is_punct_run {
                // Keep one mark per run of punctuation.
                let first = trimmed.chars().next().unwrap().to_string();
                if words.last().is_some_and(|w: &String| w.chars().all(is_punctuation)) {
                    continue;
                }
                words.push(first);
            } else {
                words.push(trimmed.to_string());
            }
        }
        words
    }

    fn word_to_ids(&self, word: &str, tokens: &TokenMap, ids: &mut Vec<i64>, depth: usize) {
        // Lexicon first: words map to phoneme sequences.
        if let Some(phonemes) = self.lexicon.lookup(word) {
            for phoneme in phonemes {
                if let Some(id) = map_phoneme(phoneme, tokens) {
                    ids.push(id);
                } else {
                    log::warn!("phoneme {phoneme:?} for word {word:?} not in vocabulary");
                }
            }
            return;
        }
        // Direct vocabulary hit (covers markers the model was trained with).
        if let Some(id) = tokens.get(word) {
            ids.push(id);
            return;
        }
        // Punctuation: its ASCII twin, then the generic pause tokens.
        if word.chars().all(is_punctuation) {
            let c = word.chars().next().unwrap();
            let mapped = to_ascii_punct(c).map(String::from);
            if let Some(id) = mapped.as_deref().and_then(|m| tokens.get(m)) {
                ids.push(id);
                return;
            }
            if let Some(id) = PAUSE_TOKENS.iter().find_map(|t| tokens.get(t)) {
                ids.push(id);
            }
            return;
        }
        // Multi-character word the lexicon does not know: per character.
        if depth == 0 && word.chars().count() > 1 {
            for c in word.chars() {
                self.word_to_ids(&c.to_string(), tokens, ids, 1);
            }
            return;
        }
        log::warn!("no tokens for {word:?}, skipping");
    }
}

/// Map a lexicon phoneme to a vocabulary id, trying the static fallback
/// table and then the tone heuristics: strip the tone digit, or append
/// tone 1 when the spelling has none.
fn map_phoneme(phoneme: &str, tokens: &TokenMap) -> Option<i64> {
    if let Some(id) = tokens.get(phoneme) {
        return Some(id);
    }
    if let Some(&(_, repl)) = PHONEME_FALLBACKS.iter().find(|&&(p, _)| p == phoneme) {
        if let Some(id) = tokens.get(repl) {
            return Some(id);
        }
    }
    if phoneme.ends_with(|c: char| c.is_ascii_digit()) {
        let stripped = &phoneme[..phoneme.len() - 1];
        if let Some(id) = tokens.get(stripped) {
            return Some(id);
        }
    } else {
        let toned = format!("{phoneme}1");
        if let Some(id) = tokens.get(&toned) {
            return Some(id);
        }
    }
    None
}

/// Normalize half-width and ASCII punctuation into the full-width marks
/// the zh model expects: every pause-class mark becomes 「，」, terminals
/// map to their full-width forms.
fn normalize_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ':' | '：' | '、' | '；' | ';' | ',' => '，',
            '.' => '。',
            '?' => '？',
            '!' => '！',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture() -> (ZhPhonemizer, TokenMap) {
        let mut lex = tempfile::NamedTempFile::new().unwrap();
        lex.write_all(
            "你好 n i3 h ao3\n世界 sh i4 j ie4\n谁 shei2\n嗯 hm\n".as_bytes(),
        )
        .unwrap();
        let lexicon = Lexicon::from_file(lex.path()).unwrap();

        let mut tok = tempfile::NamedTempFile::new().unwrap();
        tok.write_all(
            "<eps> 0\nsil 1\nsp 2\nn 3\ni3 4\nh 5\nao3 6\nsh 7\ni4 8\nj 9\nie4 10\nshe2 11\nhm1 12\nma 13\n, 14\n"
                .as_bytes(),
        )
        .unwrap();
        let tokens = TokenMap::from_pairs_file(tok.path()).unwrap();
        (ZhPhonemizer::new(lexicon), tokens)
    }

    #[test]
    fn lexicon_words_map_to_phoneme_ids() {
        let (phonemizer, tokens) = fixture();
        let ids = phonemizer.text_to_token_ids("你好世界", &tokens);
        assert_eq!(ids, vec![3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn fallback_table_rescues_missing_phonemes() {
        let (phonemizer, tokens) = fixture();
        // 谁 -> shei2, not in the vocabulary; the table maps it to she2.
        let ids = phonemizer.text_to_token_ids("谁", &tokens);
        assert_eq!(ids, vec![11]);
        // 嗯 -> hm, toneless; the table appends tone 1.
        let ids = phonemizer.text_to_token_ids("嗯", &tokens);
        assert_eq!(ids, vec![12]);
    }

    #[test]
    fn tone_heuristics() {
        let (_, tokens) = fixture();
        // ma2 is unknown; stripping the tone finds the toneless entry.
        assert_eq!(map_phoneme("ma2", &tokens), Some(13));
        assert_eq!(map_phoneme("zzz", &tokens), None);
    }

    #[test]
    fn punctuation_becomes_pause() {
        let (phonemizer, tokens) = fixture();
        let ids = phonemizer.text_to_token_ids("你好。", &tokens);
        // 。 has no vocabulary entry and maps through '.' to a pause token.
        assert_eq!(ids.last(), Some(&1));
    }

    #[test]
    fn punctuation_runs_collapse() {
        let (phonemizer, tokens) = fixture();
        let with_run = phonemizer.text_to_token_ids("你好！！！", &tokens);
        let with_one = phonemizer.text_to_token_ids("你好！", &tokens);
        assert_eq!(with_run, with_one);
    }

    #[test]
    fn normalizes_ascii_punctuation() {
        assert_eq!(normalize_punctuation("好:好;好."), "好，好，好。");
        assert_eq!(normalize_punctuation("好?好!"), "好？好！");
    }
}
