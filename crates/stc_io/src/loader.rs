use crate::scenario::parse_number;
use anyhow::{Context, Result, bail};
use stc_core::{MAX_SAMPLES, SampleBuf};
use std::fs;
use std::path::Path;

/// Parses whitespace-separated sample words. `#` comments run to end of line.
pub fn parse_words(text: &str) -> Result<Vec<u32>> {
    let mut words = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("");
        for token in line.split_whitespace() {
            let word = parse_number(token).with_context(|| format!("line {}", index + 1))?;
            words.push(word);
        }
    }
    Ok(words)
}

/// Loads a stimulus file into a sample buffer.
pub fn load_stimulus<P: AsRef<Path>>(path: P) -> Result<SampleBuf> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to open stimulus file {}", path.display()))?;
    let words = parse_words(&text)
        .with_context(|| format!("Failed to parse stimulus file {}", path.display()))?;

    if words.is_empty() {
        bail!("stimulus file {} holds no samples", path.display());
    }
    match SampleBuf::from_slice(&words) {
        Some(buf) => Ok(buf),
        None => bail!(
            "stimulus file {} holds {} samples, at most {} fit in a run",
            path.display(),
            words.len(),
            MAX_SAMPLES
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_radix_words_with_comments() {
        let words = parse_words("1 0x10 0b11 # header\n\n  42\t7\n").unwrap();
        assert_eq!(words, vec![1, 16, 3, 42, 7]);
    }

    #[test]
    fn bad_token_reports_its_line() {
        let err = parse_words("1 2\n3 zz\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }
}
