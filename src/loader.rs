//! Corpus loading and per-format text extraction.
//!
//! Walks the corpus directory and produces [`Document`]s: one per PDF page,
//! one per plain-text or markdown file, one per CSV data row. A file that
//! fails to parse is reported on stderr and skipped; the walk keeps going.
//! A missing directory, or a walk that produces zero documents, is a fatal
//! configuration error — an empty corpus makes the index meaningless.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use walkdir::WalkDir;

use crate::config::CorpusConfig;
use crate::error::PipelineError;
use crate::models::Document;

pub fn load_corpus(config: &CorpusConfig) -> Result<Vec<Document>, PipelineError> {
    let root = &config.dir;
    if !root.is_dir() {
        return Err(PipelineError::Configuration(format!(
            "corpus directory does not exist: {}",
            root.display()
        )));
    }

    let include_set = build_globset(&config.include_globs)?;

    let mut default_excludes = vec!["**/.git/**".to_string(), "**/.*".to_string()];
    default_excludes.extend(config.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut documents = Vec::new();
    let mut skipped = 0usize;

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                eprintln!("Warning: skipping unreadable entry: {}", e);
                skipped += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }

        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| rel_str.clone());

        match load_file(path, &source) {
            Ok(mut docs) => documents.append(&mut docs),
            Err(e) => {
                eprintln!("Warning: {}", e);
                skipped += 1;
            }
        }
    }

    if documents.is_empty() {
        return Err(PipelineError::Configuration(format!(
            "corpus at {} produced no documents ({} file(s) skipped); nothing to index",
            root.display(),
            skipped
        )));
    }

    // Deterministic build input ordering.
    documents.sort_by(|a, b| a.source.cmp(&b.source).then(a.page.cmp(&b.page)));

    Ok(documents)
}

fn load_file(path: &Path, source: &str) -> Result<Vec<Document>, PipelineError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => load_pdf(path, source),
        "csv" => load_csv(path, source),
        _ => load_text(path, source),
    }
}

/// One [`Document`] per PDF page, 1-based page numbers. Pages whose
/// extracted text is blank (image-only pages) are dropped, keeping the
/// numbering of the remaining pages intact.
fn load_pdf(path: &Path, source: &str) -> Result<Vec<Document>, PipelineError> {
    let pages = pdf_extract::extract_text_by_pages(path).map_err(|e| {
        PipelineError::PartialLoad {
            file: source.to_string(),
            reason: e.to_string(),
        }
    })?;

    Ok(pages
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| Document {
            text,
            source: source.to_string(),
            page: Some(i as u32 + 1),
        })
        .collect())
}

/// Whole file as one [`Document`]. Blank files produce nothing.
fn load_text(path: &Path, source: &str) -> Result<Vec<Document>, PipelineError> {
    let text = std::fs::read_to_string(path).map_err(|e| PipelineError::PartialLoad {
        file: source.to_string(),
        reason: e.to_string(),
    })?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(vec![Document {
        text,
        source: source.to_string(),
        page: None,
    }])
}

/// One [`Document`] per CSV data row, rendered as `header: value` lines.
fn load_csv(path: &Path, source: &str) -> Result<Vec<Document>, PipelineError> {
    let content = std::fs::read_to_string(path).map_err(|e| PipelineError::PartialLoad {
        file: source.to_string(),
        reason: e.to_string(),
    })?;

    let mut rows = parse_csv(&content).into_iter();
    let header = match rows.next() {
        Some(h) => h,
        None => return Ok(Vec::new()),
    };

    let mut docs = Vec::new();
    for row in rows {
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let lines: Vec<String> = header
            .iter()
            .zip(row.iter())
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect();
        docs.push(Document {
            text: lines.join("\n"),
            source: source.to_string(),
            page: None,
        });
    }
    Ok(docs)
}

/// Minimal CSV parsing: comma-separated, double-quoted fields may contain
/// commas and newlines, `""` inside quotes is a literal quote.
fn parse_csv(content: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                row.push(std::mem::take(&mut field));
            }
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                row.push(std::mem::take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, PipelineError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            PipelineError::Configuration(format!("invalid glob pattern '{}': {}", pattern, e))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| PipelineError::Configuration(format!("invalid glob set: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_csv_handles_quoted_commas() {
        let rows = parse_csv("crop,notes\nmaize,\"tall, thirsty\"\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["crop", "notes"]);
        assert_eq!(rows[1], vec!["maize", "tall, thirsty"]);
    }

    #[test]
    fn parse_csv_handles_escaped_quotes_and_crlf() {
        let rows = parse_csv("a,b\r\n\"say \"\"hi\"\"\",2\r\n");
        assert_eq!(rows[1], vec!["say \"hi\"", "2"]);
    }

    #[test]
    fn parse_csv_skips_blank_lines() {
        let rows = parse_csv("a,b\n\n1,2\n");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn csv_rows_become_header_value_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crops.csv");
        std::fs::write(&path, "crop,season\nmaize,spring\nwheat,fall\n").unwrap();

        let docs = load_csv(&path, "crops.csv").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text, "crop: maize\nseason: spring");
        assert_eq!(docs[0].source, "crops.csv");
        assert_eq!(docs[0].page, None);
    }

    #[test]
    fn missing_directory_is_a_configuration_error() {
        let config = CorpusConfig {
            dir: "/nonexistent/corpus/dir".into(),
            include_globs: vec!["**/*.txt".to_string()],
            exclude_globs: Vec::new(),
        };
        assert!(matches!(
            load_corpus(&config),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn empty_directory_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = CorpusConfig {
            dir: dir.path().to_path_buf(),
            include_globs: vec!["**/*.txt".to_string()],
            exclude_globs: Vec::new(),
        };
        assert!(matches!(
            load_corpus(&config),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn corrupt_file_is_skipped_but_good_files_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.txt"), "Healthy soil needs organic matter.").unwrap();
        std::fs::write(dir.path().join("bad.pdf"), b"not a pdf at all").unwrap();

        let config = CorpusConfig {
            dir: dir.path().to_path_buf(),
            include_globs: vec!["**/*.txt".to_string(), "**/*.pdf".to_string()],
            exclude_globs: Vec::new(),
        };
        let docs = load_corpus(&config).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "good.txt");
    }

    #[test]
    fn source_is_the_bare_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("guides");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("soil.txt"), "Compost improves structure.").unwrap();

        let config = CorpusConfig {
            dir: dir.path().to_path_buf(),
            include_globs: vec!["**/*.txt".to_string()],
            exclude_globs: Vec::new(),
        };
        let docs = load_corpus(&config).unwrap();
        assert_eq!(docs[0].source, "soil.txt");
    }
}
