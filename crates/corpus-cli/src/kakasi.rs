//! External transliterator adapter.
//!
//! Wraps the `kakasi` transliteration process: word candidates are
//! numbered and fed to its stdin from a dedicated thread while this
//! thread drains stdout, so neither side can fill its pipe and
//! deadlock. Requests and responses both carry the sequence number, so
//! reconciliation never depends on arrival order.
//!
//! Unlike the internal pipeline there is no cost signal here: the
//! first-submitted word to produce a romanization owns it, and later
//! duplicates become collision diagnostics.

use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::thread;

use regex::Regex;

use corpus_core::compile::FORMAT_MARKER;

#[derive(Debug, thiserror::Error)]
pub enum KakasiError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to spawn {0:?}: {1}")]
    Spawn(String, io::Error),
}

/// `word [native]`: a Latin word annotated with bracketed native text.
fn annotated_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([a-z']+) +\[([^ -~]+)\]$").expect("annotated-line pattern must compile")
    })
}

/// `seq romanized`: one response line from the external process.
fn response_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+) ([a-z']+)$").expect("response pattern must compile"))
}

/// Collect the words with a plausible native reading from the body:
/// the bracketed part of annotated lines, or any wholly-non-ASCII word
/// of a plain line. Blank and comment lines are skipped.
fn collect_words(body: &str) -> Vec<String> {
    let mut words = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(caps) = annotated_line_re().captures(line) {
            words.push(caps[2].to_string());
        } else {
            for word in line.split(' ') {
                if !word.is_empty() && word.chars().all(|c| !(' '..='~').contains(&c)) {
                    words.push(word.to_string());
                }
            }
        }
    }
    words
}

/// Parse a response line into its sequence number and romanization,
/// with apostrophes removed. `None` for anything malformed.
fn parse_response(line: &str) -> Option<(usize, String)> {
    let caps = response_re().captures(line)?;
    let n: usize = caps[1].parse().ok()?;
    Some((n, caps[2].replace('\'', "")))
}

/// Handle to the external transliteration process.
pub struct ExternalTransliterator {
    program: String,
    args: Vec<String>,
}

impl Default for ExternalTransliterator {
    fn default() -> Self {
        Self::with_command(
            "kakasi",
            ["-iutf8", "-outf8", "-rh", "-Ja", "-Ha"].map(String::from),
        )
    }
}

impl ExternalTransliterator {
    pub fn with_command(program: impl Into<String>, args: impl IntoIterator<Item = String>) -> Self {
        ExternalTransliterator {
            program: program.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Convert the body word list through the external process, writing
    /// the framed corpus to `out`.
    pub fn convert<W: Write>(
        &self,
        body: &str,
        preamble: &str,
        out: &mut W,
    ) -> Result<(), KakasiError> {
        let words = collect_words(body);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| KakasiError::Spawn(self.program.clone(), e))?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("child stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("child stdout not captured"))?;

        // Feed requests from a separate thread; dropping stdin at the
        // end closes the pipe so the child terminates its output.
        let requests: String = words
            .iter()
            .enumerate()
            .map(|(n, word)| format!("{n} {word}\n"))
            .collect();
        let feeder = thread::Builder::new()
            .name("kakasi-feed".into())
            .spawn(move || {
                let _ = stdin.write_all(requests.as_bytes());
            })?;

        writeln!(out, "{FORMAT_MARKER}")?;
        out.write_all(preamble.as_bytes())?;
        writeln!(out)?;

        let mut owners: HashMap<String, &str> = HashMap::new();
        for line in BufReader::new(stdout).lines() {
            let line = line?;
            let line = line.trim();
            let resolved = parse_response(line)
                .and_then(|(n, romanized)| words.get(n).map(|w| (w.as_str(), romanized)));
            let Some((word, romanized)) = resolved else {
                writeln!(out, "###  {line}")?;
                continue;
            };
            match owners.get(romanized.as_str()) {
                None => {
                    writeln!(out, "{romanized}\t{word}")?;
                    owners.insert(romanized, word);
                }
                Some(owner) => {
                    writeln!(out, "## {romanized}\t{word}\t{owner}")?;
                }
            }
        }

        let _ = feeder.join();
        child.wait()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_words_plain_lines() {
        let body = "猫 犬 cat\nとり\n";
        assert_eq!(collect_words(body), vec!["猫", "犬", "とり"]);
    }

    #[test]
    fn test_collect_words_annotated_line() {
        let body = "neko [猫]\nso'u [草]\n";
        assert_eq!(collect_words(body), vec!["猫", "草"]);
    }

    #[test]
    fn test_collect_words_skips_blank_and_comments() {
        let body = "\n# comment\n猫\n";
        assert_eq!(collect_words(body), vec!["猫"]);
    }

    #[test]
    fn test_collect_words_mixed_word_dropped() {
        // A word mixing ASCII and native characters has no clean reading
        assert!(collect_words("猫cat\n").is_empty());
    }

    #[test]
    fn test_parse_response() {
        assert_eq!(parse_response("12 neko"), Some((12, "neko".to_string())));
        // Apostrophes are a kana-boundary artifact; removed
        assert_eq!(parse_response("0 kan'i"), Some((0, "kani".to_string())));
        assert_eq!(parse_response("neko"), None);
        assert_eq!(parse_response("x neko"), None);
        assert_eq!(parse_response("1 ネコ"), None);
        assert_eq!(parse_response(""), None);
    }

    #[test]
    fn test_external_process_first_wins() {
        // Fake transliterator that romanizes everything identically.
        let fake = ExternalTransliterator::with_command(
            "sh",
            ["-c", r#"while read n w; do echo "$n neko"; done"#].map(String::from),
        );
        let mut out = Vec::new();
        fake.convert("猫 犬\n", "### test\n", &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();
        assert!(output.starts_with("#format hinted\n### test\n\n"));
        assert!(output.contains("neko\t猫\n"));
        assert!(output.contains("## neko\t犬\t猫\n"));
    }

    #[test]
    fn test_external_process_malformed_response() {
        let fake = ExternalTransliterator::with_command(
            "sh",
            ["-c", r#"while read n w; do echo "junk $n"; done"#].map(String::from),
        );
        let mut out = Vec::new();
        fake.convert("猫\n", "", &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("###  junk 0\n"));
        assert!(!output.contains("\t"));
    }

    #[test]
    fn test_spawn_failure() {
        let missing = ExternalTransliterator::with_command("corpus-no-such-binary", []);
        let mut out = Vec::new();
        assert!(matches!(
            missing.convert("猫\n", "", &mut out),
            Err(KakasiError::Spawn(_, _))
        ));
    }
}
