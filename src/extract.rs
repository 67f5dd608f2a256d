//! Text extraction from uploaded statement files.

use crate::classify;
use crate::Result;
use anyhow::Context;
use std::path::Path;
use tracing::debug;

/// Turns the raw bytes of an uploaded file into text.
pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// Extracts the text layer of a PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfText;

impl TextExtractor for PdfText {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(bytes).context("Failed to extract text from PDF")
    }
}

/// Reads the bytes as UTF-8 text, for statements that were already converted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl TextExtractor for PlainText {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec()).context("The statement is not valid UTF-8 text")
    }
}

/// Picks the extractor for `path` by its extension: `.pdf` (any case) gets [`PdfText`], anything
/// else [`PlainText`].
pub fn for_path(path: &Path) -> Box<dyn TextExtractor> {
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        Box::new(PdfText)
    } else {
        Box::new(PlainText)
    }
}

/// Extracts the text of a statement and keeps only the dated lines.
pub fn statement_lines(extractor: &dyn TextExtractor, bytes: &[u8]) -> Result<Vec<String>> {
    let text = extractor.extract(bytes)?;
    let lines = classify::dated_lines(text.lines());
    debug!("Kept {} dated lines out of {}", lines.len(), text.lines().count());
    Ok(lines)
}
