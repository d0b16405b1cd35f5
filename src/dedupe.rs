//! Near-duplicate suppression for a document's chunk stream.
//!
//! Chunks arrive in (page, chunk-index) order, which doubles as a primacy
//! order: the first occurrence of near-duplicate content is always the one
//! kept. Similarity is whitespace token-set Jaccard overlap, a cheap signal
//! that is robust to small wording shuffles. The naive pairwise comparison is
//! O(n²) but n is bounded by a single document's chunk count.

use crate::ingest::Chunk;
use std::collections::HashSet;

/// Filter a document's chunks, dropping each candidate whose Jaccard
/// similarity against any already-accepted chunk exceeds `threshold`.
///
/// Returns the surviving chunks in their original order plus the number of
/// near-duplicates that were dropped.
pub fn dedupe_chunks(chunks: Vec<Chunk>, threshold: f64) -> (Vec<Chunk>, usize) {
    let mut accepted: Vec<Chunk> = Vec::new();
    let mut accepted_tokens: Vec<HashSet<String>> = Vec::new();
    let mut skipped = 0;

    for chunk in chunks {
        let tokens = token_set(&chunk.text);
        let duplicate = accepted_tokens
            .iter()
            .any(|prior| jaccard(&tokens, prior) > threshold);
        if duplicate {
            tracing::trace!(
                page = chunk.page_number,
                index = chunk.chunk_index,
                "Dropping near-duplicate chunk"
            );
            skipped += 1;
        } else {
            accepted_tokens.push(tokens);
            accepted.push(chunk);
        }
    }

    (accepted, skipped)
}

/// Jaccard similarity of two token sets: intersection size over union size.
///
/// Empty sets never register as similar; that guards the division even though
/// the chunk floor should prevent empty chunks from reaching this point.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

fn token_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_string).collect()
}
