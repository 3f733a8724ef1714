//! English IPA via the external espeak-ng utility, plus the Gruut-US
//! rewrite that matches the symbol inventory the acoustic models were
//! trained on.

use std::borrow::Cow;
use std::io::Write;
use std::process::{Command, Stdio};

use once_cell::sync::Lazy;

use crate::error::{Result, TtsError};

/// Fixed invocation: quiet, IPA mode 3, American English, line input.
const ESPEAK_ARGS: [&str; 4] = ["-q", "--ipa=3", "-v", "en-us"];

/// Probe result, computed once per process. The probe pipes a no-op input
/// through the utility; a spawn failure means it is not installed.
static ESPEAK_AVAILABLE: Lazy<bool> = Lazy::new(|| match run_espeak("") {
    Ok(_) => true,
    Err(e) => {
        log::warn!("espeak-ng probe failed: {e}");
        false
    }
});

/// Whether the external phonemizer is usable. English and bilingual
/// backends refuse to initialize when it is not.
pub fn espeak_available() -> bool {
    *ESPEAK_AVAILABLE
}

/// Convert English text to a cleaned IPA string.
pub fn text_to_ipa(text: &str) -> Result<String> {
    let raw = run_espeak(text)?;
    Ok(clean_ipa(&raw))
}

fn run_espeak(input: &str) -> Result<String> {
    let mut child = Command::new("espeak-ng")
        .args(ESPEAK_ARGS)
        .arg("--stdin")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TtsError::EspeakNotFound
            } else {
                TtsError::Io(e)
            }
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        // espeak-ng treats stdin as line-oriented input; without a final
        // line terminator the last token can be under-processed.
        let payload = terminated(input);
        stdin.write_all(payload.as_bytes()).map_err(TtsError::Io)?;
    }

    let output = child.wait_with_output().map_err(TtsError::Io)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TtsError::SynthesisFailed(format!(
            "espeak-ng exited with code {:?}: {stderr}",
            output.status.code()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn terminated(input: &str) -> Cow<'_, str> {
    if input.ends_with('\n') {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("{input}\n"))
    }
}

/// Strip zero-width joiners and newlines, collapse space runs.
fn clean_ipa(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_space = false;
    for c in raw.chars() {
        let c = match c {
            '\u{200d}' => continue,
            '\n' | '\r' | '\t' => ' ',
            c => c,
        };
        if c == ' ' {
            if !last_space && !out.is_empty() {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(c);
            last_space = false;
        }
    }
    out.trim_end().to_string()
}

/// Pair rewrites applied before the single-scalar pass.
const GRUUT_PAIRS: &[(&str, &str)] = &[
    ("ɝ", "ɜɹ"),
    ("ɚ", "əɹ"),
    ("eɪ", "A"),
    ("aɪ", "I"),
    ("ɔɪ", "Y"),
    ("oʊ", "O"),
    ("aʊ", "W"),
    ("tʃ", "ʧ"),
    ("dʒ", "ʤ"),
];

/// Rewrite raw espeak IPA into the Gruut-US flavor: r-colored vowels are
/// expanded, diphthongs and affricates collapse to single symbols, and the
/// ASCII lookalikes g/r become their IPA code points.
pub fn gruut_us(ipa: &str) -> String {
    let mut out = ipa.replace('\u{200d}', "");
    for &(from, to) in GRUUT_PAIRS {
        out = out.replace(from, to);
    }
    out.chars()
        .map(|c| match c {
            'g' => 'ɡ', // U+0261
            'r' => 'ɹ', // U+0279
            c => c,
        })
        .collect()
}
