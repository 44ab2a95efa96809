//! Overlapping character-window chunker.
//!
//! Splits document text into windows of at most `chunk_size` characters in
//! which consecutive windows from the same document share exactly
//! `chunk_overlap` characters. The cut point for a non-final window prefers
//! the latest paragraph break (`\n\n`) inside the window, then a line
//! break, then a space, then a hard character cut at the window edge.
//! Chunking identical input with identical parameters yields identical
//! boundaries every run.

use crate::error::PipelineError;
use crate::models::{Chunk, Document};

/// Split every document into chunks, copying metadata onto each chunk.
/// Chunk indices are contiguous from 0 within each document.
///
/// `chunk_overlap` must be strictly smaller than `chunk_size`; anything
/// else cannot make forward progress and is rejected.
pub fn split_documents(
    documents: &[Document],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<Chunk>, PipelineError> {
    if chunk_size == 0 {
        return Err(PipelineError::Configuration(
            "chunk_size must be > 0".to_string(),
        ));
    }
    if chunk_overlap >= chunk_size {
        return Err(PipelineError::Configuration(format!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            chunk_overlap, chunk_size
        )));
    }

    let mut chunks = Vec::new();
    for doc in documents {
        for (i, piece) in split_text(&doc.text, chunk_size, chunk_overlap)
            .into_iter()
            .enumerate()
        {
            chunks.push(Chunk::new(doc, i as i64, &piece));
        }
    }
    Ok(chunks)
}

/// Split one text into overlapping windows. Text at most `chunk_size`
/// characters long comes back as a single piece.
pub fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    let mut start = 0usize;
    loop {
        let window_end = (start + chunk_size).min(chars.len());
        if window_end == chars.len() {
            pieces.push(chars[start..].iter().collect());
            break;
        }
        let end = cut_point(&chars, start, window_end, chunk_overlap);
        pieces.push(chars[start..end].iter().collect());
        start = end - chunk_overlap;
    }
    pieces
}

/// Pick the cut for a non-final window. A candidate cut must leave the next
/// window strictly past the current start (cut > start + overlap), so the
/// coarser separators fall through when their last occurrence sits too
/// early in the window.
fn cut_point(chars: &[char], start: usize, window_end: usize, overlap: usize) -> usize {
    const PARAGRAPH: [char; 2] = ['\n', '\n'];
    const LINE: [char; 1] = ['\n'];
    const WORD: [char; 1] = [' '];

    let min_cut = start + overlap + 1;
    let separators: [&[char]; 3] = [&PARAGRAPH, &LINE, &WORD];
    for sep in separators {
        if let Some(cut) = last_separator_cut(chars, start, window_end, sep) {
            if cut >= min_cut {
                return cut;
            }
        }
    }
    window_end
}

/// Rightmost occurrence of `sep` fully inside `[start, window_end)`,
/// returned as the position just past the separator.
fn last_separator_cut(
    chars: &[char],
    start: usize,
    window_end: usize,
    sep: &[char],
) -> Option<usize> {
    if window_end < start + sep.len() {
        return None;
    }
    let mut j = window_end - sep.len();
    loop {
        if chars[j..j + sep.len()] == *sep {
            return Some(j + sep.len());
        }
        if j == start {
            return None;
        }
        j -= 1;
    }
}
