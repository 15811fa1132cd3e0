//! Dictionary-compilation pipeline.
//!
//! Takes raw morphological-dictionary entry lines, validates and filters
//! them, computes a ranking cost, transliterates the reading, and emits
//! a deduplicated `romanized<TAB>headword` corpus. Per-line problems
//! become diagnostic lines in the output stream; they never abort the
//! pass.

use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

use tracing::debug;

use crate::romanize;
use crate::sexp::{self, ParseError, Value};
use crate::unicode;

/// First line of every generated corpus file.
pub const FORMAT_MARKER: &str = "#format hinted";

/// Comment block prepended to every generated corpus file.
pub const BOILERPLATE: &str = "### Generated file. DO NOT EDIT.\n";

/// Ranking cost for entries that carry no explicit cost override.
pub const DEFAULT_COST: i64 = 999_999;

const HEADWORD_KEY: &str = "見出し語";
const READING_KEY: &str = "読み";
const POS_KEY: &str = "品詞";

/// Tag filtering and cost-adjustment knobs for one compile pass.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Accept only entries carrying at least one of these tags.
    /// Empty means accept all.
    pub includes: HashSet<String>,
    /// Reject entries carrying any of these tags.
    pub excludes: HashSet<String>,
    /// Cost penalty applied in proportion to the hiragana share of the
    /// headword.
    pub hiragana_penalty: i64,
}

/// Why a single record line was rejected. Recovered per line and
/// reported as a diagnostic; never escapes the compile loop.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("expected 2 top-level elements, got {0}")]
    TopShape(usize),
    #[error("attribute is not a (name value) pair")]
    BadPair,
    #[error("missing field {0}")]
    MissingField(&'static str),
    #[error("field {0} has an unusable value")]
    BadField(&'static str),
    #[error("headword list has {0} elements, expected 2")]
    HeadwordShape(usize),
    #[error("unparsable cost override {0:?}")]
    BadCost(String),
    #[error("empty headword")]
    EmptyHeadword,
}

/// Counters for one compile pass, reported by the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileStats {
    pub lines: u64,
    /// Entries that survived validation and filtering.
    pub candidates: u64,
    pub emitted: u64,
    pub collisions: u64,
    /// Lines rejected with a diagnostic.
    pub errors: u64,
    /// Entries silently rejected by the include/exclude tag filter.
    pub filtered: u64,
    /// Candidates dropped at emission for an excluded-script headword
    /// or an unrepresentable transliteration.
    pub dropped: u64,
}

/// One validated record, before cost adjustment.
struct Entry {
    headword: String,
    reading: String,
    tags: Vec<String>,
    cost: i64,
}

/// Parse and validate one record line (wrapped in an implicit list).
fn extract_entry(line: &str) -> Result<Entry, EntryError> {
    let value = sexp::parse(&format!("({line})"))?;
    let Value::List(items) = value else {
        return Err(EntryError::TopShape(1));
    };
    if items.len() != 2 {
        return Err(EntryError::TopShape(items.len()));
    }
    let attrs = items[1].as_list().ok_or(EntryError::BadPair)?;

    // The first element is itself a (name value) pair; fold it together
    // with the attribute list, later duplicates overwriting earlier ones.
    let mut fields: HashMap<String, &Value> = HashMap::new();
    for pair in std::iter::once(&items[0]).chain(attrs.iter()) {
        let kv = pair.as_list().ok_or(EntryError::BadPair)?;
        if kv.len() != 2 {
            return Err(EntryError::BadPair);
        }
        let name = kv[0].as_text().ok_or(EntryError::BadPair)?;
        fields.insert(name, &kv[1]);
    }

    let headword_value = *fields
        .get(HEADWORD_KEY)
        .ok_or(EntryError::MissingField(HEADWORD_KEY))?;
    let (headword, cost) = match headword_value {
        Value::List(kv) if kv.len() == 2 => {
            let head = kv[0].as_text().ok_or(EntryError::BadField(HEADWORD_KEY))?;
            let cost = match &kv[1] {
                Value::Int(n) => *n,
                Value::Atom(s) => s.parse().map_err(|_| EntryError::BadCost(s.clone()))?,
                Value::List(_) => return Err(EntryError::BadField(HEADWORD_KEY)),
            };
            (head, cost)
        }
        Value::List(kv) => return Err(EntryError::HeadwordShape(kv.len())),
        other => (
            other.as_text().ok_or(EntryError::BadField(HEADWORD_KEY))?,
            DEFAULT_COST,
        ),
    };
    if headword.is_empty() {
        return Err(EntryError::EmptyHeadword);
    }

    let reading_value = *fields
        .get(READING_KEY)
        .ok_or(EntryError::MissingField(READING_KEY))?;
    let mut reading = reading_value
        .as_text()
        .ok_or(EntryError::BadField(READING_KEY))?;
    // Alternate-reading notation: `{ヨミ/ヨミ2}` keeps the first variant.
    if let Some(stripped) = reading.strip_prefix('{') {
        let first = stripped.split('/').next().unwrap_or("").to_string();
        reading = first;
    }

    let pos_value = *fields.get(POS_KEY).ok_or(EntryError::MissingField(POS_KEY))?;
    let tags = match pos_value {
        Value::List(items) => items.iter().filter_map(Value::as_text).collect(),
        other => vec![other.as_text().ok_or(EntryError::BadField(POS_KEY))?],
    };

    Ok(Entry {
        headword,
        reading,
        tags,
        cost,
    })
}

/// Tag filter: at least one included tag (or no include list), and no
/// excluded tag.
fn accepts(opts: &CompileOptions, tags: &[String]) -> bool {
    let included = opts.includes.is_empty() || tags.iter().any(|t| opts.includes.contains(t));
    let excluded = !opts.excludes.is_empty() && tags.iter().any(|t| opts.excludes.contains(t));
    included && !excluded
}

/// Penalize headwords by their hiragana share. Floor division, exactly
/// as observed in the reference corpora; do not change to truncation.
fn adjusted_cost(entry: &Entry, hiragana_penalty: i64) -> i64 {
    let len = entry.headword.chars().count() as i64;
    let nh = entry
        .headword
        .chars()
        .filter(|&c| unicode::is_penalized_hiragana(c))
        .count() as i64;
    entry.cost + (nh * hiragana_penalty).div_euclid(len)
}

/// Compile `lines` into a corpus written to `out`.
///
/// Output framing: per-line diagnostics from the scan, the format
/// marker, `preamble` (boilerplate plus echoed header lines),
/// `copyright`, then canonical entries in ascending
/// `(cost, headword, romanized)` order with collision diagnostics
/// inline. The first candidate to claim a romanized key in sorted order
/// owns it permanently.
pub fn compile<W: Write>(
    opts: &CompileOptions,
    lines: impl IntoIterator<Item = impl AsRef<str>>,
    preamble: &str,
    copyright: &str,
    out: &mut W,
) -> io::Result<CompileStats> {
    let mut stats = CompileStats::default();
    let mut candidates: Vec<(i64, String, String)> = Vec::new();

    for (index, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        let lno = index + 1;
        stats.lines += 1;
        if line.trim().is_empty() {
            continue;
        }
        match extract_entry(line) {
            Ok(entry) => {
                if !accepts(opts, &entry.tags) {
                    stats.filtered += 1;
                    debug!(lno, headword = %entry.headword, "rejected by tag filter");
                    continue;
                }
                let cost = adjusted_cost(&entry, opts.hiragana_penalty);
                let romanized = romanize::romanize(&entry.reading);
                candidates.push((cost, entry.headword, romanized));
                stats.candidates += 1;
            }
            Err(err) => {
                stats.errors += 1;
                debug!(lno, %err, "skipping malformed entry");
                writeln!(out, "### {}", line.trim())?;
                writeln!(out, "#### {lno}: {err}")?;
            }
        }
    }

    writeln!(out, "{FORMAT_MARKER}")?;
    out.write_all(preamble.as_bytes())?;
    writeln!(out)?;
    out.write_all(copyright.as_bytes())?;
    writeln!(out)?;

    candidates.sort();

    let mut owners: HashMap<String, String> = HashMap::new();
    for (_cost, headword, romanized) in &candidates {
        if unicode::has_excluded_script(headword) || !romanize::is_fully_romanized(romanized) {
            stats.dropped += 1;
            continue;
        }
        match owners.get(romanized.as_str()) {
            None => {
                writeln!(out, "{romanized}\t{headword}")?;
                owners.insert(romanized.clone(), headword.clone());
                stats.emitted += 1;
            }
            Some(owner) => {
                writeln!(out, "# {romanized}\t{headword}\t<- {owner}")?;
                stats.collisions += 1;
            }
        }
    }

    Ok(stats)
}
