//! Noise filtering for extracted page text.
//!
//! Two passes run per document: structural detection of lines repeated across
//! most pages (running headers and footers), then line-level cleaning of
//! page-number artifacts, stray symbols, and whitespace. Detecting repetition
//! by frequency across pages works on unknown document templates without any
//! per-source configuration.

use crate::config::IngestOptions;
use crate::extract::PageRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Documents with fewer pages carry too little signal for repeated-pattern
/// detection and skip the heuristic entirely.
pub const MIN_PAGES_FOR_PATTERN_DETECTION: usize = 3;

static RE_NUMERIC_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid regex"));
static RE_SYMBOL_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\w\s]+$").expect("valid regex"));

/// Run the full noise filter over a document's pages.
///
/// Detects and strips repeated headers/footers, cleans each page line by
/// line, and drops pages whose remaining text falls below the usable floor.
/// Dropped pages are informational, not extraction failures.
pub fn clean_pages(pages: Vec<PageRecord>, options: &IngestOptions) -> Vec<PageRecord> {
    let patterns = detect_repeated_lines(
        &pages,
        options.header_distinct_ratio,
        options.header_page_ratio,
    );
    if !patterns.is_empty() {
        tracing::debug!(patterns = patterns.len(), "Detected repeated header/footer lines");
    }

    pages
        .into_iter()
        .filter_map(|mut page| {
            let stripped = strip_repeated_lines(&page.text, &patterns);
            let cleaned = clean_page_text(&stripped, options.min_line_chars);
            if cleaned.len() < options.min_page_chars {
                tracing::debug!(
                    page = page.number,
                    remaining = cleaned.len(),
                    "Dropping page below usable length after cleaning"
                );
                return None;
            }
            page.text = cleaned;
            Some(page)
        })
        .collect()
}

/// Detect line values repeated across most pages.
///
/// Examines the first and last non-empty line of every page. A value
/// qualifies when the distinct-value count collapses below `distinct_ratio`
/// of the lines observed and the most common value appears on at least
/// `page_ratio` of the document's pages.
pub fn detect_repeated_lines(
    pages: &[PageRecord],
    distinct_ratio: f64,
    page_ratio: f64,
) -> Vec<String> {
    if pages.len() < MIN_PAGES_FOR_PATTERN_DETECTION {
        return Vec::new();
    }

    let mut first_lines = Vec::new();
    let mut last_lines = Vec::new();
    for page in pages {
        let lines: Vec<&str> = page
            .text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if let Some(first) = lines.first() {
            first_lines.push(first.to_string());
        }
        if lines.len() > 1
            && let Some(last) = lines.last()
        {
            last_lines.push(last.to_string());
        }
    }

    let mut patterns = Vec::new();
    if let Some(header) = repeated_candidate(&first_lines, pages.len(), distinct_ratio, page_ratio)
    {
        patterns.push(header);
    }
    if let Some(footer) = repeated_candidate(&last_lines, pages.len(), distinct_ratio, page_ratio)
        && !patterns.contains(&footer)
    {
        patterns.push(footer);
    }
    patterns
}

fn repeated_candidate(
    lines: &[String],
    total_pages: usize,
    distinct_ratio: f64,
    page_ratio: f64,
) -> Option<String> {
    if lines.is_empty() {
        return None;
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for line in lines {
        *counts.entry(line.as_str()).or_default() += 1;
    }
    if counts.len() as f64 >= lines.len() as f64 * distinct_ratio {
        return None;
    }

    let (line, count) = counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))?;
    if count as f64 >= total_pages as f64 * page_ratio {
        Some(line.to_string())
    } else {
        None
    }
}

/// Remove lines that exactly match a detected repeated pattern.
pub fn strip_repeated_lines(text: &str, patterns: &[String]) -> String {
    if patterns.is_empty() {
        return text.to_string();
    }

    text.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !patterns.iter().any(|pattern| pattern.trim() == trimmed)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Clean a single page's text line by line.
///
/// Discards lines that are empty after trimming, purely numeric (page-number
/// artifacts), shorter than `min_line_chars`, or composed entirely of
/// non-word/non-space characters. Whitespace runs inside a line collapse to
/// single spaces and runs of blank lines collapse to a single paragraph
/// break, so paragraph structure stays visible to the chunker.
pub fn clean_page_text(text: &str, min_line_chars: usize) -> String {
    let mut paragraphs: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
            continue;
        }
        if RE_NUMERIC_LINE.is_match(&line) {
            continue;
        }
        if line.chars().count() < min_line_chars {
            continue;
        }
        if RE_SYMBOL_LINE.is_match(&line) {
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
        .into_iter()
        .map(|lines| lines.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}
