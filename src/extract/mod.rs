//! Multi-strategy PDF text extraction.
//!
//! Two interchangeable engines are tried in fixed priority order: a
//! layout-aware extractor and a simpler fallback. Extraction failures are
//! signaled by empty results rather than errors, so the orchestrator can
//! treat "no extractable text" uniformly regardless of cause.

mod engines;

pub use engines::{LopdfEngine, PdfExtractEngine};

use std::collections::HashMap;

/// Which extraction engine produced a page's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionStrategy {
    /// Layout-aware extraction via the `pdf-extract` crate.
    PdfExtract,
    /// Raw content-stream extraction via `lopdf`.
    Lopdf,
}

impl ExtractionStrategy {
    /// Stable string form used in chunk metadata.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PdfExtract => "pdf-extract",
            Self::Lopdf => "lopdf",
        }
    }
}

impl std::fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page of raw engine output. Page numbers are 1-indexed.
#[derive(Debug, Clone)]
pub struct PageText {
    /// 1-indexed page number within the source document.
    pub number: u32,
    /// Raw text pulled from the page; empty when the page failed to extract.
    pub text: String,
}

/// One page's extracted text plus provenance, as handed to the noise filter.
#[derive(Debug, Clone)]
pub struct PageRecord {
    /// 1-indexed page number within the source document.
    pub number: u32,
    /// Engine that produced the text.
    pub strategy: ExtractionStrategy,
    /// Page text; raw at extraction time, replaced by the cleaned form later.
    pub text: String,
}

/// A single PDF text-extraction engine.
///
/// Engines never raise past this boundary: an unreadable document is an empty
/// vector, and a page that individually fails comes back with empty text so
/// its position is still known.
pub trait PdfEngine: Send + Sync {
    /// Provenance label recorded on pages this engine produces.
    fn strategy(&self) -> ExtractionStrategy;
    /// Extract every page of the document, in page order.
    fn extract_pages(&self, bytes: &[u8]) -> Vec<PageText>;
}

/// Orchestrates the preferred engine with automatic fallback.
pub struct TextExtractor {
    preferred: Box<dyn PdfEngine>,
    fallback: Box<dyn PdfEngine>,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor {
    /// Build the production extractor: `pdf-extract` first, `lopdf` fallback.
    pub fn new() -> Self {
        Self {
            preferred: Box::new(PdfExtractEngine),
            fallback: Box::new(LopdfEngine),
        }
    }

    /// Build an extractor from explicit engines.
    pub fn with_engines(preferred: Box<dyn PdfEngine>, fallback: Box<dyn PdfEngine>) -> Self {
        Self {
            preferred,
            fallback,
        }
    }

    /// Extract an ordered sequence of pages with non-empty text.
    ///
    /// Policy: run the preferred engine; if it yields zero pages with usable
    /// text, use the fallback output wholesale. When the preferred engine
    /// reads the document but leaves individual pages empty, only those pages
    /// are filled from the fallback, tagged with fallback provenance. Pages
    /// neither engine can read are skipped; an unreadable document yields an
    /// empty sequence.
    pub fn extract(&self, bytes: &[u8]) -> Vec<PageRecord> {
        let primary = self.preferred.extract_pages(bytes);
        let usable = primary
            .iter()
            .filter(|page| !page.text.trim().is_empty())
            .count();

        if usable == 0 {
            tracing::debug!(
                preferred = %self.preferred.strategy(),
                fallback = %self.fallback.strategy(),
                "Preferred engine yielded no text; switching to fallback"
            );
            return collect_pages(self.fallback.extract_pages(bytes), self.fallback.strategy());
        }

        let mut fill: HashMap<u32, String> = HashMap::new();
        if usable < primary.len() {
            for page in self.fallback.extract_pages(bytes) {
                if !page.text.trim().is_empty() {
                    fill.insert(page.number, page.text);
                }
            }
        }

        let mut records = Vec::with_capacity(primary.len());
        for page in primary {
            if !page.text.trim().is_empty() {
                records.push(PageRecord {
                    number: page.number,
                    strategy: self.preferred.strategy(),
                    text: page.text,
                });
            } else if let Some(text) = fill.remove(&page.number) {
                tracing::debug!(page = page.number, "Filled page from fallback engine");
                records.push(PageRecord {
                    number: page.number,
                    strategy: self.fallback.strategy(),
                    text,
                });
            } else {
                tracing::debug!(page = page.number, "Skipping page with no extractable text");
            }
        }
        records
    }
}

fn collect_pages(pages: Vec<PageText>, strategy: ExtractionStrategy) -> Vec<PageRecord> {
    pages
        .into_iter()
        .filter(|page| !page.text.trim().is_empty())
        .map(|page| PageRecord {
            number: page.number,
            strategy,
            text: page.text,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubEngine {
        strategy: ExtractionStrategy,
        pages: Vec<(u32, &'static str)>,
    }

    impl PdfEngine for StubEngine {
        fn strategy(&self) -> ExtractionStrategy {
            self.strategy
        }

        fn extract_pages(&self, _bytes: &[u8]) -> Vec<PageText> {
            self.pages
                .iter()
                .map(|&(number, text)| PageText {
                    number,
                    text: text.to_string(),
                })
                .collect()
        }
    }

    fn extractor(
        primary: Vec<(u32, &'static str)>,
        fallback: Vec<(u32, &'static str)>,
    ) -> TextExtractor {
        TextExtractor::with_engines(
            Box::new(StubEngine {
                strategy: ExtractionStrategy::PdfExtract,
                pages: primary,
            }),
            Box::new(StubEngine {
                strategy: ExtractionStrategy::Lopdf,
                pages: fallback,
            }),
        )
    }

    #[test]
    fn uses_preferred_engine_when_it_yields_text() {
        let extractor = extractor(vec![(1, "alpha"), (2, "beta")], vec![(1, "x"), (2, "y")]);
        let pages = extractor.extract(b"pdf");
        assert_eq!(pages.len(), 2);
        assert!(
            pages
                .iter()
                .all(|page| page.strategy == ExtractionStrategy::PdfExtract)
        );
    }

    #[test]
    fn falls_back_wholesale_when_preferred_is_empty() {
        let extractor = extractor(vec![], vec![(1, "alpha"), (2, "beta")]);
        let pages = extractor.extract(b"pdf");
        assert_eq!(pages.len(), 2);
        assert!(
            pages
                .iter()
                .all(|page| page.strategy == ExtractionStrategy::Lopdf)
        );
    }

    #[test]
    fn falls_back_when_preferred_pages_are_all_whitespace() {
        let extractor = extractor(vec![(1, "  \n"), (2, "")], vec![(1, "alpha"), (2, "beta")]);
        let pages = extractor.extract(b"pdf");
        assert_eq!(pages.len(), 2);
        assert!(
            pages
                .iter()
                .all(|page| page.strategy == ExtractionStrategy::Lopdf)
        );
    }

    #[test]
    fn fills_only_missing_pages_from_fallback() {
        let extractor = extractor(
            vec![(1, "alpha"), (2, ""), (3, "gamma")],
            vec![(1, "ALPHA"), (2, "beta"), (3, "GAMMA")],
        );
        let pages = extractor.extract(b"pdf");
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].strategy, ExtractionStrategy::PdfExtract);
        assert_eq!(pages[1].strategy, ExtractionStrategy::Lopdf);
        assert_eq!(pages[1].text, "beta");
        assert_eq!(pages[2].strategy, ExtractionStrategy::PdfExtract);
        assert_eq!(pages[2].text, "gamma");
    }

    #[test]
    fn skips_pages_neither_engine_can_read() {
        let extractor = extractor(vec![(1, "alpha"), (2, ""), (3, "gamma")], vec![(2, "")]);
        let pages = extractor.extract(b"pdf");
        let numbers: Vec<u32> = pages.iter().map(|page| page.number).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn unreadable_document_yields_empty_sequence() {
        let extractor = extractor(vec![], vec![]);
        assert!(extractor.extract(b"not a pdf").is_empty());
    }
}
