use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process;
use std::{fs, io};

use corpus_core::compile::{self, CompileStats};

use crate::config::{self, ConfigError, ProcessorConfig};
use crate::copyright::{self, CopyrightError};
use crate::kakasi::{ExternalTransliterator, KakasiError};

/// Fatal conversion failure. Per-entry problems never surface here;
/// they are diagnostics inside the output file.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Copyright(#[from] CopyrightError),
    #[error("{0}")]
    Kakasi(#[from] KakasiError),
}

/// Convert `source` into a corpus file at `dest`. Stats are returned
/// for the internal pipeline; the external pipeline has none.
pub fn run_convert(source: &Path, dest: &Path) -> Result<Option<CompileStats>, ConvertError> {
    let text = fs::read_to_string(source)?;
    let (cfg, body) = config::parse(&text)?;
    let preamble = format!("{}{}", compile::BOILERPLATE, cfg.header);
    let mut out = BufWriter::new(File::create(dest)?);

    let stats = match &cfg.processor {
        ProcessorConfig::Chasen {
            input,
            copyright: copyright_file,
            copyright_section,
        } => {
            let copyright_path = config::resolve_relative(source, copyright_file);
            let copyright_text = fs::read_to_string(&copyright_path)?;
            let copyright = copyright::extract_copyright(&copyright_text, copyright_section)?;

            let dic_path = config::resolve_relative(source, input);
            eprintln!("Reading {}...", dic_path.display());
            let dic = fs::read_to_string(&dic_path)?;

            let stats = compile::compile(&cfg.options, dic.lines(), &preamble, &copyright, &mut out)?;
            Some(stats)
        }
        ProcessorConfig::Kakasi => {
            ExternalTransliterator::default().convert(body, &preamble, &mut out)?;
            None
        }
    };
    out.flush()?;
    Ok(stats)
}

/// CLI entry point: convert or die with a non-zero exit status.
pub fn convert_cmd(source: &str, dest: &str) {
    match run_convert(Path::new(source), Path::new(dest)) {
        Ok(Some(stats)) => {
            eprintln!(
                "  (skipped {} of {} lines)",
                stats.errors + stats.filtered,
                stats.lines
            );
            eprintln!(
                "Wrote {} entries ({} collisions, {} unrepresentable)",
                stats.emitted, stats.collisions, stats.dropped
            );
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
