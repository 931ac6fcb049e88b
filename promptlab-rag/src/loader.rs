//! Document loading.
//!
//! A [`PageExtractor`] turns a file into per-page text; [`DocumentLoader`]
//! checks the path, tolerates pages that fail to extract, and joins the rest
//! into a [`Document`].

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::document::Document;
use crate::error::{RagError, Result};

/// Per-page text extraction for one document format.
///
/// The outer `Result` fails when the document cannot be opened at all; each
/// inner `Result` reports a single page so that one corrupt page does not
/// hide the rest of the document.
pub trait PageExtractor: Send + Sync {
    /// A short name for logs.
    fn name(&self) -> &str;

    /// Extract the text of every page, in page order.
    fn extract_pages(&self, path: &Path) -> Result<Vec<Result<String>>>;
}

/// Reads UTF-8 text files. Form feeds (`\x0c`) separate pages.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PageExtractor for PlainTextExtractor {
    fn name(&self) -> &str {
        "text"
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<Result<String>>> {
        let bytes = std::fs::read(path).map_err(|e| RagError::Extraction {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(text.split('\u{c}').map(|page| Ok(page.to_string())).collect())
    }
}

/// Extracts text from PDF files page by page.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

#[cfg(feature = "pdf")]
impl PageExtractor for PdfExtractor {
    fn name(&self) -> &str {
        "pdf"
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<Result<String>>> {
        let pdf = lopdf::Document::load(path).map_err(|e| RagError::Extraction {
            path: path.to_path_buf(),
            message: format!("PDF parsing failed: {e}"),
        })?;

        let pages = pdf
            .get_pages()
            .into_keys()
            .map(|number| {
                pdf.extract_text(&[number]).map_err(|e| RagError::Extraction {
                    path: path.to_path_buf(),
                    message: format!("page {number}: {e}"),
                })
            })
            .collect();
        Ok(pages)
    }
}

/// Loads a document from disk into plain text.
///
/// # Example
///
/// ```rust,ignore
/// use promptlab_rag::DocumentLoader;
///
/// let loader = DocumentLoader::for_path("manual.pdf".as_ref())?;
/// let document = loader.load("manual.pdf".as_ref())?;
/// ```
#[derive(Clone)]
pub struct DocumentLoader {
    extractor: Arc<dyn PageExtractor>,
}

impl DocumentLoader {
    /// Create a loader around a custom extractor.
    pub fn new(extractor: Arc<dyn PageExtractor>) -> Self {
        Self { extractor }
    }

    /// A loader for plain text files.
    pub fn plain_text() -> Self {
        Self::new(Arc::new(PlainTextExtractor))
    }

    /// A loader for PDF files.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DependencyMissing`] when the crate was built
    /// without the `pdf` feature.
    pub fn pdf() -> Result<Self> {
        #[cfg(feature = "pdf")]
        {
            Ok(Self::new(Arc::new(PdfExtractor)))
        }
        #[cfg(not(feature = "pdf"))]
        {
            Err(RagError::DependencyMissing {
                capability: "PDF extraction".to_string(),
                hint: "rebuild promptlab-rag with `--features pdf`".to_string(),
            })
        }
    }

    /// Pick a loader from the file extension: `.pdf` files use
    /// [`DocumentLoader::pdf`], everything else is read as plain text.
    pub fn for_path(path: &Path) -> Result<Self> {
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf { Self::pdf() } else { Ok(Self::plain_text()) }
    }

    /// Load the document at `path`.
    ///
    /// Pages that fail to extract or contain only whitespace are skipped;
    /// the remaining pages are joined with newlines in page order. The
    /// returned text is empty when no page yielded any.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotFound`] if `path` is not an existing file and
    /// [`RagError::Extraction`] if the document cannot be opened.
    pub fn load(&self, path: &Path) -> Result<Document> {
        if !path.is_file() {
            return Err(RagError::NotFound { path: path.to_path_buf() });
        }

        let pages = self.extractor.extract_pages(path)?;
        let page_count = pages.len();

        let mut texts = Vec::with_capacity(page_count);
        for (number, page) in pages.into_iter().enumerate() {
            match page {
                Ok(text) if !text.trim().is_empty() => texts.push(text),
                Ok(_) => {}
                Err(e) => {
                    warn!(path = %path.display(), page = number + 1, error = %e, "skipping page that failed to extract");
                }
            }
        }

        let text = texts.join("\n");
        info!(
            path = %path.display(),
            extractor = self.extractor.name(),
            page_count,
            pages_with_text = texts.len(),
            char_count = text.chars().count(),
            "loaded document"
        );

        Ok(Document { text, page_count, source: Some(path.to_path_buf()) })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    struct FlakyExtractor;

    impl PageExtractor for FlakyExtractor {
        fn name(&self) -> &str {
            "flaky"
        }

        fn extract_pages(&self, path: &Path) -> Result<Vec<Result<String>>> {
            Ok(vec![
                Ok("first page".to_string()),
                Err(RagError::Extraction { path: path.to_path_buf(), message: "bad font".into() }),
                Ok("   ".to_string()),
                Ok("third page".to_string()),
            ])
        }
    }

    fn temp_file(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    #[test]
    fn failed_pages_do_not_abort_the_document() {
        let file = temp_file(b"ignored");
        let document = DocumentLoader::new(Arc::new(FlakyExtractor)).load(file.path()).unwrap();
        assert_eq!(document.text, "first page\nthird page");
        assert_eq!(document.page_count, 4);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = DocumentLoader::plain_text().load(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, RagError::NotFound { .. }));
    }

    #[test]
    fn directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = DocumentLoader::plain_text().load(dir.path()).unwrap_err();
        assert!(matches!(err, RagError::NotFound { .. }));
    }

    #[test]
    fn form_feeds_split_text_pages() {
        let file = temp_file(b"page one\x0cpage two\x0c");
        let document = DocumentLoader::plain_text().load(file.path()).unwrap();
        assert_eq!(document.page_count, 3);
        assert_eq!(document.text, "page one\npage two");
    }

    #[test]
    fn empty_file_loads_as_blank() {
        let file = temp_file(b"");
        let document = DocumentLoader::plain_text().load(file.path()).unwrap();
        assert!(document.is_blank());
    }

    #[test]
    fn extension_selects_extractor() {
        assert!(DocumentLoader::for_path(Path::new("notes.txt")).is_ok());
        let pdf = DocumentLoader::for_path(Path::new("REPORT.PDF"));
        if cfg!(feature = "pdf") {
            assert!(pdf.is_ok());
        } else {
            assert!(matches!(pdf, Err(RagError::DependencyMissing { .. })));
        }
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn unreadable_pdf_is_an_extraction_error() {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        std::fs::write(file.path(), b"this is not a pdf").unwrap();
        let err = DocumentLoader::pdf().unwrap().load(file.path()).unwrap_err();
        assert!(matches!(err, RagError::Extraction { .. }));
    }
}
