//! Overlap-aware recursive chunking of cleaned page text.
//!
//! Splitting prefers semantic boundaries in priority order: paragraph break,
//! line break, sentence-ending punctuation, comma, space, and finally an
//! arbitrary character boundary. Segments are merged back up to the target
//! size, and adjacent chunks share a configured character overlap so no
//! semantic unit is lost purely from being split across a boundary.

/// Separator tiers tried from highest to lowest priority.
const SEPARATORS: [&str; 7] = ["\n\n", "\n", ".", "!", "?", ",", " "];

/// Split one page's cleaned text into overlapping passages.
///
/// - `target` bounds every returned passage, measured in characters.
/// - `overlap` characters from the tail of each passage seed the next one,
///   shrinking only when the next segment would not otherwise fit.
/// - Passages whose trimmed length falls below `min_chars` are dropped after
///   splitting; they are fragments with no standalone value.
pub fn chunk_page(text: &str, target: usize, overlap: usize, min_chars: usize) -> Vec<String> {
    if target == 0 || text.trim().is_empty() {
        return Vec::new();
    }
    let overlap = overlap.min(target.saturating_sub(1));

    let mut segments = Vec::new();
    split_recursive(text, target, &SEPARATORS, &mut segments);
    merge_segments(&segments, target, overlap)
        .into_iter()
        .filter(|chunk| chunk.trim().chars().count() >= min_chars)
        .collect()
}

/// Recursively split `text` into segments no longer than `target` characters,
/// descending one separator tier whenever a piece is still too large.
fn split_recursive<'a>(
    text: &'a str,
    target: usize,
    tiers: &[&str],
    segments: &mut Vec<&'a str>,
) {
    if char_len(text) <= target {
        segments.push(text);
        return;
    }

    let Some((separator, rest)) = tiers.split_first() else {
        hard_split(text, target, segments);
        return;
    };

    let pieces = split_keeping(text, separator);
    if pieces.len() == 1 {
        split_recursive(text, target, rest, segments);
        return;
    }

    for piece in pieces {
        if char_len(piece) <= target {
            segments.push(piece);
        } else {
            split_recursive(piece, target, rest, segments);
        }
    }
}

/// Split on `separator`, keeping the separator attached to the preceding piece.
fn split_keeping<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (index, matched) in text.match_indices(separator) {
        let end = index + matched.len();
        pieces.push(&text[start..end]);
        start = end;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Last-resort split at character boundaries into windows of `target` chars.
fn hard_split<'a>(text: &'a str, target: usize, segments: &mut Vec<&'a str>) {
    let mut remaining = text;
    while char_len(remaining) > target {
        let cut = remaining
            .char_indices()
            .nth(target)
            .map(|(index, _)| index)
            .unwrap_or(remaining.len());
        segments.push(&remaining[..cut]);
        remaining = &remaining[cut..];
    }
    if !remaining.is_empty() {
        segments.push(remaining);
    }
}

/// Greedily merge segments into chunks bounded by `target`, seeding each new
/// chunk with the previous chunk's tail.
fn merge_segments(segments: &[&str], target: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for segment in segments {
        let segment_len = char_len(segment);
        if !current.trim().is_empty() && char_len(&current) + segment_len > target {
            chunks.push(current.clone());
            // The next segment must still fit under the target, so the carried
            // tail shrinks when a large segment follows.
            let tail_budget = overlap.min(target.saturating_sub(segment_len));
            current = char_tail(&current, tail_budget).to_string();
        }
        current.push_str(segment);
    }
    if !current.trim().is_empty() {
        chunks.push(current);
    }
    chunks
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Last `n` characters of `text`, snapped to a character boundary.
fn char_tail(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    let total = char_len(text);
    if total <= n {
        return text;
    }
    let start = text
        .char_indices()
        .nth(total - n)
        .map(|(index, _)| index)
        .unwrap_or(0);
    &text[start..]
}
