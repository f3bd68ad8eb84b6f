//! Plain-text extraction from CV documents.
//!
//! Two binary formats are supported: PDF (page oriented) and DOCX
//! (paragraph oriented). The format is chosen from the file extension and
//! each format exposes the same [`TextExtractor`] capability. Extracted text
//! is passed through unchanged; no whitespace or encoding normalization.

use crate::error::{EvaluatorError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Something that can turn a document on disk into plain text.
pub trait TextExtractor {
    /// Extract the full text of the document at `path`.
    fn extract_text(&self, path: &Path) -> Result<String>;
}

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Page-oriented; text is the concatenation of every page in order.
    Pdf,
    /// Paragraph-oriented; text is every paragraph joined by `\n`.
    Docx,
}

impl DocumentFormat {
    /// Determine format from file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("pdf") => Ok(DocumentFormat::Pdf),
            Some("docx") => Ok(DocumentFormat::Docx),
            _ => Err(EvaluatorError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// The dotted extension, as shown in error messages.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => ".pdf",
            DocumentFormat::Docx => ".docx",
        }
    }

    /// The extractor that handles this format.
    pub fn extractor(&self) -> &'static dyn TextExtractor {
        match self {
            DocumentFormat::Pdf => &PdfExtractor,
            DocumentFormat::Docx => &DocxExtractor,
        }
    }
}

/// Extract text from a PDF or DOCX file.
///
/// Fails with [`EvaluatorError::UnsupportedFormat`] for any other extension
/// and with [`EvaluatorError::Extraction`] when the file cannot be parsed.
pub fn extract_text(path: &Path) -> Result<String> {
    let format = DocumentFormat::from_path(path)?;
    debug!(path = %path.display(), format = format.extension(), "Extracting document text");

    let text = format.extractor().extract_text(path)?;
    info!(
        "Extracted {} characters from {}",
        text.chars().count(),
        path.display()
    );
    Ok(text)
}

/// PDF extractor backed by `lopdf`.
pub struct PdfExtractor;

impl PdfExtractor {
    /// Extract text from an in-memory PDF.
    pub fn extract_from_bytes(&self, data: &[u8]) -> std::result::Result<String, lopdf::Error> {
        let doc = lopdf::Document::load_mem(data)?;
        Self::pages_text(&doc)
    }

    fn pages_text(doc: &lopdf::Document) -> std::result::Result<String, lopdf::Error> {
        // get_pages is a BTreeMap keyed by page number, so iteration is in page order.
        let mut text = String::new();
        for page_num in doc.get_pages().keys() {
            text.push_str(&doc.extract_text(&[*page_num])?);
        }
        Ok(text)
    }
}

impl TextExtractor for PdfExtractor {
    fn extract_text(&self, path: &Path) -> Result<String> {
        let extension = DocumentFormat::Pdf.extension();
        let doc = lopdf::Document::load(path)
            .map_err(|e| EvaluatorError::extraction(path, extension, e))?;
        Self::pages_text(&doc).map_err(|e| EvaluatorError::extraction(path, extension, e))
    }
}

/// DOCX extractor backed by `docx-rs`.
pub struct DocxExtractor;

impl DocxExtractor {
    /// Extract text from an in-memory DOCX package.
    pub fn extract_from_bytes(
        &self,
        data: &[u8],
    ) -> std::result::Result<String, docx_rs::ReaderError> {
        let docx = docx_rs::read_docx(data)?;

        let paragraphs: Vec<String> = docx
            .document
            .children
            .into_iter()
            .filter_map(|child| match child {
                docx_rs::DocumentChild::Paragraph(p) => Some(Self::paragraph_text(&p)),
                _ => None,
            })
            .collect();

        Ok(paragraphs.join("\n"))
    }

    fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
        let mut text = String::new();
        for child in &paragraph.children {
            if let docx_rs::ParagraphChild::Run(run) = child {
                for run_child in &run.children {
                    match run_child {
                        docx_rs::RunChild::Text(t) => text.push_str(&t.text),
                        docx_rs::RunChild::Tab(_) => text.push('\t'),
                        docx_rs::RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
        }
        text
    }
}

impl TextExtractor for DocxExtractor {
    fn extract_text(&self, path: &Path) -> Result<String> {
        let extension = DocumentFormat::Docx.extension();
        let data = std::fs::read(path).map_err(|e| EvaluatorError::extraction(path, extension, e))?;
        self.extract_from_bytes(&data)
            .map_err(|e| EvaluatorError::extraction(path, extension, e))
    }
}

/// Where the candidate text comes from.
#[derive(Debug, Clone)]
pub enum CandidateSource {
    /// A PDF or DOCX document on disk.
    File(PathBuf),
    /// Text supplied directly by the caller.
    Inline(String),
}

impl CandidateSource {
    /// Resolve the source into plain candidate text.
    pub fn into_text(self) -> Result<String> {
        match self {
            CandidateSource::File(path) => extract_text(&path),
            CandidateSource::Inline(text) => Ok(text),
        }
    }
}
