//! Configuration header parsing for corpus source files.
//!
//! A source file starts with a block of `#` lines: `#processor name`
//! selects the pipeline, `# key value` sets an attribute, and `##...`
//! lines are free comments. The block ends at the first line that is
//! blank or does not start with `#`; everything after it is the body.
//! All `#` and `##` lines are preserved verbatim so they can be echoed
//! into the generated file's boilerplate.
//!
//! The whole header is validated up front: an unrecognized processor,
//! a malformed header line, or a missing required attribute is fatal
//! before any entry is processed.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use corpus_core::compile::CompileOptions;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown header line {0:?}")]
    UnknownHeader(String),
    #[error("no #processor line in header")]
    MissingProcessor,
    #[error("unknown processor {0:?}")]
    UnknownProcessor(String),
    #[error("missing required key {0:?}")]
    MissingKey(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Pipeline selection, with the attributes that pipeline requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessorConfig {
    /// Morphological-dictionary compilation via the internal
    /// transliteration engine. Paths are relative to the source file.
    Chasen {
        input: String,
        copyright: String,
        copyright_section: String,
    },
    /// Plain word-list conversion through the external transliterator;
    /// the body of the source file is the word list itself.
    Kakasi,
}

/// One validated run configuration; immutable after parsing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Header lines, verbatim, for the output boilerplate.
    pub header: String,
    pub options: CompileOptions,
    pub processor: ProcessorConfig,
}

/// Parse and validate the leading header of `source`, returning the
/// configuration and the remaining body text.
pub fn parse(source: &str) -> Result<(Config, &str), ConfigError> {
    let mut header = String::new();
    let mut attrs: HashMap<&str, &str> = HashMap::new();
    let mut processor: Option<&str> = None;

    let mut rest = source;
    while !rest.is_empty() {
        let line_end = rest.find('\n').map(|i| i + 1).unwrap_or(rest.len());
        let line = rest[..line_end].trim();
        if line.is_empty() || !line.starts_with('#') {
            break;
        }

        let (tag, value) = line.split_once(' ').unwrap_or((line, ""));
        if tag == "#" || tag.starts_with("##") {
            header.push_str(&rest[..line_end]);
            if tag == "#" && !value.is_empty() {
                let (key, v) = value.split_once(' ').unwrap_or((value, ""));
                attrs.insert(key, v.trim());
            }
        } else if tag == "#processor" {
            processor = Some(value.trim());
        } else {
            return Err(ConfigError::UnknownHeader(line.to_string()));
        }
        rest = &rest[line_end..];
    }

    let options = CompileOptions {
        includes: tag_set(attrs.get("includes").copied()),
        excludes: tag_set(attrs.get("excludes").copied()),
        hiragana_penalty: match attrs.get("hiragana-penalty") {
            None => 0,
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "hiragana-penalty",
                value: v.to_string(),
            })?,
        },
    };

    let name = processor.ok_or(ConfigError::MissingProcessor)?;
    let processor = match name {
        "chasen" => ProcessorConfig::Chasen {
            input: required(&attrs, "input")?,
            copyright: required(&attrs, "copyright")?,
            copyright_section: required(&attrs, "copyright_section")?,
        },
        "kakasi" => ProcessorConfig::Kakasi,
        other => return Err(ConfigError::UnknownProcessor(other.to_string())),
    };

    Ok((
        Config {
            header,
            options,
            processor,
        },
        rest,
    ))
}

fn required(attrs: &HashMap<&str, &str>, key: &'static str) -> Result<String, ConfigError> {
    attrs
        .get(key)
        .map(|v| v.to_string())
        .ok_or(ConfigError::MissingKey(key))
}

fn tag_set(value: Option<&str>) -> HashSet<String> {
    value
        .unwrap_or("")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Resolve `fname` against the directory containing `base`. Absolute
/// paths and the empty string (meaning `base` itself) pass through.
pub fn resolve_relative(base: &Path, fname: &str) -> PathBuf {
    if fname.is_empty() {
        return base.to_path_buf();
    }
    let path = Path::new(fname);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match base.parent() {
        Some(dir) => dir.join(path),
        None => path.to_path_buf(),
    }
}
