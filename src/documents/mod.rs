//! Document extraction for uploaded files
//!
//! An upload is any byte source. It is spooled into a scoped temporary file
//! carrying the format suffix, handed to a format loader by path, and the
//! loader's segments are returned untouched. The temporary file is owned by a
//! [`tempfile::NamedTempFile`] guard, so it is removed on every exit path.

mod docx;
mod pdf;

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub use docx::DocxLoader;
pub use pdf::PdfLoader;

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Portable Document Format
    Pdf,
    /// Office Open XML word processing document
    Docx,
}

impl Format {
    /// File suffix (including the dot) loaders expect for this format
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Docx => ".docx",
        }
    }

    /// Derive the format from a file name's extension
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedFormat` for any extension other than
    /// `pdf` or `docx`
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("pdf") => Ok(Self::Pdf),
            Some("docx") => Ok(Self::Docx),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Where a segment came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentMetadata {
    /// Path or name of the source document
    pub source: String,

    /// 1-based page number, when the format has pages
    pub page: Option<usize>,
}

/// One unit of extracted text (a page or a whole document body)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Extracted text
    pub page_content: String,

    /// Provenance
    pub metadata: SegmentMetadata,
}

impl Segment {
    /// Create a segment with the given text and source
    #[must_use]
    pub fn new(page_content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: SegmentMetadata {
                source: source.into(),
                page: None,
            },
        }
    }

    /// Set the page number
    #[must_use]
    pub const fn with_page(mut self, page: usize) -> Self {
        self.metadata.page = Some(page);
        self
    }

    /// Replace the source, e.g. with the original upload name instead of
    /// the temporary path
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.source = source.into();
        self
    }
}

/// A format parser that reads a document from the filesystem
pub trait DocumentLoader {
    /// Load the document at `path` as an ordered list of segments
    ///
    /// # Errors
    ///
    /// Returns error if the document cannot be read or parsed
    fn load(&self, path: &Path) -> Result<Vec<Segment>>;
}

/// Extract segments from an uploaded document using the built-in loader for
/// `format`
///
/// # Errors
///
/// Returns error if spooling the upload fails or the parser rejects it
pub fn extract_text<R: Read + ?Sized>(file: &mut R, format: Format) -> Result<Vec<Segment>> {
    match format {
        Format::Pdf => extract_text_with(file, format, &PdfLoader),
        Format::Docx => extract_text_with(file, format, &DocxLoader),
    }
}

/// Extract segments from an uploaded PDF
///
/// # Errors
///
/// Returns error if spooling the upload fails or the PDF cannot be parsed
pub fn extract_text_from_pdf<R: Read + ?Sized>(file: &mut R) -> Result<Vec<Segment>> {
    extract_text(file, Format::Pdf)
}

/// Extract segments from an uploaded Word document
///
/// # Errors
///
/// Returns error if spooling the upload fails or the DOCX cannot be parsed
pub fn extract_text_from_docx<R: Read + ?Sized>(file: &mut R) -> Result<Vec<Segment>> {
    extract_text(file, Format::Docx)
}

/// Extract segments with a caller-supplied loader
///
/// The loader sees a temporary path ending in `format.suffix()`. Its output
/// is returned in order and unmodified.
///
/// # Errors
///
/// Returns error if the temporary file cannot be created or written, or if
/// the loader fails
pub fn extract_text_with<R, L>(file: &mut R, format: Format, loader: &L) -> Result<Vec<Segment>>
where
    R: Read + ?Sized,
    L: DocumentLoader + ?Sized,
{
    let mut tmp = tempfile::Builder::new()
        .prefix("docqa-upload-")
        .suffix(format.suffix())
        .tempfile()?;

    let written = std::io::copy(file, &mut tmp)?;
    tmp.flush()?;

    tracing::debug!(
        path = %tmp.path().display(),
        bytes = written,
        ?format,
        "spooled upload to temporary file"
    );

    let segments = loader.load(tmp.path())?;

    tracing::debug!(segments = segments.len(), ?format, "extracted document");

    Ok(segments)
}
