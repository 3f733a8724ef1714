//! Readers for the model-side token vocabulary and lexicon files.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, TtsError};

/// Mapping from phoneme/grapheme token string to integer id.
///
/// Loaded once at backend init, read-only after.
#[derive(Debug, Default)]
pub struct TokenMap {
    map: HashMap<String, i64>,
}

impl TokenMap {
    /// Read the whitespace-separated `token id` format.
    ///
    /// The token may itself be a space; the id is the last field and the
    /// token is everything before it with outer padding removed (a fully
    /// blank token column means the space token).
    pub fn from_pairs_file(path: &Path) -> Result<Self> {
        let content = read_vocab(path)?;
        let mut map = HashMap::new();
        for (line_no, line) in content.lines().enumerate() {
            let trimmed_end = line.trim_end_matches(['\r', '\n']);
            if trimmed_end.trim().is_empty() {
                continue;
            }
            let Some(split_at) = trimmed_end.rfind(char::is_whitespace) else {
                return Err(TtsError::Internal(format!(
                    "{}:{}: expected `token id` pair",
                    path.display(),
                    line_no + 1
                )));
            };
            let id: i64 = trimmed_end[split_at + 1..].parse().map_err(|_| {
                TtsError::Internal(format!(
                    "{}:{}: token id is not an integer",
                    path.display(),
                    line_no + 1
                ))
            })?;
            let token = trimmed_end[..split_at].trim_matches(|c: char| c == '\t');
            let token = if token.trim().is_empty() { " " } else { token.trim() };
            map.insert(token.to_string(), id);
        }
        log::debug!("loaded {} tokens from {}", map.len(), path.display());
        Ok(Self { map })
    }

    /// Read the one-token-per-line format, assigning `base + line_index`.
    ///
    /// `base` is 0 for the monolingual Matcha vocabulary and 1 for the
    /// bilingual one. Lines are not trimmed, so a line holding a single
    /// space yields the space token.
    pub fn from_lines_file(path: &Path, base: i64) -> Result<Self> {
        let content = read_vocab(path)?;
        let mut map = HashMap::new();
        for (index, line) in content.lines().enumerate() {
            let token = line.trim_end_matches(['\r', '\n']);
            if token.is_empty() {
                continue;
            }
            map.insert(token.to_string(), base + index as i64);
        }
        log::debug!(
            "loaded {} line tokens (base {}) from {}",
            map.len(),
            base,
            path.display()
        );
        Ok(Self { map })
    }

    /// Sniff the file format: lines whose last field parses as an integer
    /// and that have at least two fields are `token id` pairs, anything
    /// else is the line-indexed format.
    pub fn from_file_auto(path: &Path, line_base: i64) -> Result<Self> {
        let content = read_vocab(path)?;
        let looks_paired = content.lines().filter(|l| !l.trim().is_empty()).all(|l| {
            let mut fields = l.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some(_), Some(last)) => fields.last().unwrap_or(last).parse::<i64>().is_ok(),
                _ => false,
            }
        });
        if looks_paired {
            Self::from_pairs_file(path)
        } else {
            Self::from_lines_file(path, line_base)
        }
    }

    pub fn get(&self, token: &str) -> Option<i64> {
        self.map.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.map.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Word to whitespace-separated phoneme sequence. Chinese backend only.
#[derive(Debug, Default)]
pub struct Lexicon {
    map: HashMap<String, Vec<String>>,
}

impl Lexicon {
    /// Read `word ph1 ph2 ...` lines. Keys are lowercased.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = read_vocab(path)?;
        let mut map = HashMap::new();
        for line in content.lines() {
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else { continue };
            let phonemes: Vec<String> = fields.map(str::to_string).collect();
            if phonemes.is_empty() {
                continue;
            }
            map.insert(word.to_lowercase(), phonemes);
        }
        log::info!("loaded lexicon with {} entries from {}", map.len(), path.display());
        Ok(Self { map })
    }

    pub fn lookup(&self, word: &str) -> Option<&[String]> {
        self.map.get(&word.to_lowercase()).map(Vec::as_slice)
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn read_vocab(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| TtsError::ModelNotFound(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_token_id_pairs() {
        let file = write_temp("<eps> 0\nsil 1\na1 2\nzh 3\n");
        let map = TokenMap::from_pairs_file(file.path()).unwrap();
        assert_eq!(map.get("<eps>"), Some(0));
        assert_eq!(map.get("zh"), Some(3));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn reads_line_tokens_zero_based() {
        let file = write_temp("^\n$\na\nb\n");
        let map = TokenMap::from_lines_file(file.path(), 0).unwrap();
        assert_eq!(map.get("^"), Some(0));
        assert_eq!(map.get("b"), Some(3));
    }

    #[test]
    fn reads_line_tokens_one_based_with_space_token() {
        let file = write_temp("_\n \nni3\nhao3\n");
        let map = TokenMap::from_lines_file(file.path(), 1).unwrap();
        assert_eq!(map.get("_"), Some(1));
        assert_eq!(map.get(" "), Some(2), "single-space line is the space token");
        assert_eq!(map.get("hao3"), Some(4));
    }

    #[test]
    fn auto_detects_both_formats() {
        let pairs = write_temp("sil 0\nsp 1\n");
        let map = TokenMap::from_file_auto(pairs.path(), 0).unwrap();
        assert_eq!(map.get("sp"), Some(1));

        let lines = write_temp("_\nai\nan\n");
        let map = TokenMap::from_file_auto(lines.path(), 1).unwrap();
        assert_eq!(map.get("an"), Some(3));
    }

    #[test]
    fn reads_lexicon() {
        let file = write_temp("你好 n i3 h ao3\nHELLO HH AH L OW\n");
        let lex = Lexicon::from_file(file.path()).unwrap();
        assert_eq!(
            lex.lookup("你好").unwrap(),
            &["n", "i3", "h", "ao3"]
        );
        assert!(lex.lookup("hello").is_some(), "keys are lowercased");
        assert!(lex.lookup("HELLO").is_some());
        assert!(lex.lookup("missing").is_none());
    }

    #[test]
    fn missing_file_is_model_not_found() {
        let err = TokenMap::from_pairs_file(Path::new("/nonexistent/tokens.txt")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ModelNotFound);
    }
}
