//! Copyright-block extraction from license/control files.
//!
//! The source is blank-line-separated sections; the first line of each
//! section is its label. The section whose label starts with the
//! requested string is returned with every line prefixed for use as
//! output comments. Continuation lines lose one leading space and then
//! one leading `.` (deb-control style).

/// Prefix applied to every extracted line.
const QUOTE: &str = "# ";

#[derive(Debug, thiserror::Error)]
#[error("no section with label starting {section:?}")]
pub struct CopyrightError {
    pub section: String,
}

/// Extract the copyright section labeled `section` from `text`.
pub fn extract_copyright(text: &str, section: &str) -> Result<String, CopyrightError> {
    let mut section_start = true;
    let mut active = false;
    let mut out = String::new();

    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            section_start = true;
            active = false;
            continue;
        }
        if section_start {
            section_start = false;
            active = line.starts_with(section);
            continue;
        }
        if active {
            let line = line.strip_prefix(' ').unwrap_or(line);
            let line = line.strip_prefix('.').unwrap_or(line);
            out.push_str(format!("{QUOTE}{line}").trim());
            out.push('\n');
        }
    }

    if out.is_empty() {
        return Err(CopyrightError {
            section: section.to_string(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LICENSE: &str = "\
Preamble text that is not a section body.

NAIST Japanese Dictionary
 Copyright 2000 Nara Institute of Science and Technology.
 .
 Redistribution permitted under the following conditions.

Other Section
 Unrelated text.
";

    #[test]
    fn test_extract_section() {
        let out = extract_copyright(LICENSE, "NAIST").unwrap();
        assert_eq!(
            out,
            "# Copyright 2000 Nara Institute of Science and Technology.\n\
             #\n\
             # Redistribution permitted under the following conditions.\n"
        );
    }

    #[test]
    fn test_label_line_itself_not_emitted() {
        let out = extract_copyright(LICENSE, "Other").unwrap();
        assert_eq!(out, "# Unrelated text.\n");
    }

    #[test]
    fn test_label_prefix_match() {
        // The configured label only needs to be a prefix of the line
        assert!(extract_copyright(LICENSE, "NAIST Japanese").is_ok());
    }

    #[test]
    fn test_section_ends_at_blank_line() {
        let out = extract_copyright(LICENSE, "NAIST").unwrap();
        assert!(!out.contains("Unrelated"));
    }

    #[test]
    fn test_missing_section_is_error() {
        let err = extract_copyright(LICENSE, "IPADIC").unwrap_err();
        assert_eq!(err.section, "IPADIC");
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(extract_copyright("", "NAIST").is_err());
    }
}
