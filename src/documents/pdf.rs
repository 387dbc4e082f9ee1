//! PDF loader backed by `pdf-extract`

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use super::{DocumentLoader, Segment};
use crate::{Error, Result};

/// Loads a PDF as one segment per page
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<Vec<Segment>> {
        // pdf-extract panics on some malformed files instead of returning an error
        let pages = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_by_pages(path)
        }))
        .map_err(|_| Error::Pdf(format!("parser aborted on {}", path.display())))?
        .map_err(|e| Error::Pdf(e.to_string()))?;

        let source = path.display().to_string();

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| Segment::new(text, source.clone()).with_page(i + 1))
            .collect())
    }
}
