//! Production extraction engines.

use super::{ExtractionStrategy, PageText, PdfEngine};

/// Layout-aware extraction backed by the `pdf-extract` crate.
///
/// Reconstructs reading order from glyph positions, which generally gives the
/// highest-fidelity text, so it runs first.
pub struct PdfExtractEngine;

impl PdfEngine for PdfExtractEngine {
    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::PdfExtract
    }

    fn extract_pages(&self, bytes: &[u8]) -> Vec<PageText> {
        // pdf-extract panics on some malformed documents; contain that so an
        // unreadable source degrades to an empty result like any other.
        let outcome =
            std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes));
        match outcome {
            Ok(Ok(pages)) => pages
                .into_iter()
                .enumerate()
                .map(|(index, text)| PageText {
                    number: index as u32 + 1,
                    text,
                })
                .collect(),
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "pdf-extract could not read document");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!("pdf-extract panicked on document; treating as unreadable");
                Vec::new()
            }
        }
    }
}

/// Fallback extraction backed by `lopdf`'s content-stream text decoding.
///
/// Lower fidelity than the layout-aware engine but tolerant of documents that
/// engine rejects. Pages that individually fail come back empty so their
/// positions are preserved.
pub struct LopdfEngine;

impl PdfEngine for LopdfEngine {
    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::Lopdf
    }

    fn extract_pages(&self, bytes: &[u8]) -> Vec<PageText> {
        let document = match lopdf::Document::load_mem(bytes) {
            Ok(document) => document,
            Err(err) => {
                tracing::debug!(error = %err, "lopdf could not read document");
                return Vec::new();
            }
        };

        document
            .get_pages()
            .keys()
            .map(|&number| {
                let text = document.extract_text(&[number]).unwrap_or_else(|err| {
                    tracing::debug!(page = number, error = %err, "lopdf page extraction failed");
                    String::new()
                });
                PageText { number, text }
            })
            .collect()
    }
}
