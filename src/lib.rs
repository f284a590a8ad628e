//! Hadith dataset verification and PDF cross-checking
//!
//! This crate provides:
//! - Loading of the hadith JSON dataset and structural validation of its records
//! - Page text extraction from the source PDF using lopdf
//! - Segmentation of the extracted text into candidate hadith sections
//! - Comparison helpers used by the command-line tools

pub mod compare;
pub mod extractor;
pub mod records;
pub mod sections;
pub mod tounicode;
pub mod validator;

pub use compare::{preview, Comparison, RecordPreview};
pub use extractor::{extract_pages, extract_pages_mem, render_pages, ExtractConfig, PageText};
pub use records::{load_records, LoadError, Record, RecordLabel, DEFAULT_RECORDS_PATH};
pub use sections::{find_sections, Section};
pub use validator::{
    check_count, check_numbering, validate, verify, CountClass, NumberingReport,
    ValidationConfig, ValidationIssue, ValidationReport,
};

use std::path::Path;

/// Source PDF location relative to the repository root
pub const DEFAULT_PDF_PATH: &str = "./Imam-Nawawis-40-Hadith-Text.pdf";

/// Full text dump written by `full-pdf-extract`
pub const FULL_TEXT_DUMP_PATH: &str = "./pdf_full_text.txt";

/// Section dump written by `full-pdf-extract`
pub const SECTIONS_DUMP_PATH: &str = "./pdf_hadith_sections.txt";

/// Opening words of the first hadith, in Arabic and in translation
pub const FIRST_HADITH_MARKERS: [&str; 2] = ["إِنَّمَا الْأَعْمَالُ", "Actions are judged"];

/// Pages scanned when sampling the start of the PDF
pub const SAMPLE_MAX_PAGES: u32 = 10;

/// Pages and characters kept by the plain-extraction fallback of the sample
pub const FALLBACK_MAX_PAGES: u32 = 3;
pub const FALLBACK_CHAR_LIMIT: usize = 2000;

/// Extract the start of the PDF up to and including the page where the first
/// hadith appears
///
/// Pages whose content stream cannot be decoded already fall back to plain
/// extraction one at a time. When the sampled pages decode but yield no text
/// at all, the first few pages are re-read with lopdf's plain extraction,
/// truncated. Load failures and documents without pages are errors.
pub fn extract_sample<P: AsRef<Path>>(path: P) -> Result<String, PdfError> {
    let doc = lopdf::Document::load(path)?;
    extract_sample_from_doc(&doc)
}

/// Sample mode over a PDF held in memory
pub fn extract_sample_mem(buffer: &[u8]) -> Result<String, PdfError> {
    let doc = lopdf::Document::load_mem(buffer)?;
    extract_sample_from_doc(&doc)
}

fn extract_sample_from_doc(doc: &lopdf::Document) -> Result<String, PdfError> {
    let config = ExtractConfig::default()
        .with_max_pages(SAMPLE_MAX_PAGES)
        .with_stop_markers(FIRST_HADITH_MARKERS);

    let text = render_pages(&extractor::extract_pages_from_doc(doc, &config)?);
    if !text.trim().is_empty() {
        return Ok(text);
    }

    log::warn!("positioned extraction found no text; trying plain extraction");
    let fallback = ExtractConfig::default()
        .with_max_pages(FALLBACK_MAX_PAGES)
        .with_char_limit(FALLBACK_CHAR_LIMIT);
    extractor::extract_plain(doc, &fallback)
}

/// Result of extracting the whole PDF
#[derive(Debug, Clone)]
pub struct FullExtraction {
    pub page_count: u32,
    pub pages: Vec<PageText>,
    /// Pages that look like they carry hadith content
    pub hadith_pages: Vec<u32>,
}

impl FullExtraction {
    /// All pages rendered with page banners
    pub fn text(&self) -> String {
        render_pages(&self.pages)
    }
}

/// A page mentioning "Hadith" together with Arabic text or an "Arabic" label
pub fn looks_like_hadith_page(text: &str) -> bool {
    text.contains("Hadith") && (text.contains("إِنَّمَا") || text.contains("Arabic"))
}

/// Extract every page of the PDF
pub fn extract_full<P: AsRef<Path>>(path: P) -> Result<FullExtraction, PdfError> {
    let doc = lopdf::Document::load(path)?;
    extract_full_from_doc(&doc)
}

/// Extract every page of a PDF held in memory
pub fn extract_full_mem(buffer: &[u8]) -> Result<FullExtraction, PdfError> {
    let doc = lopdf::Document::load_mem(buffer)?;
    extract_full_from_doc(&doc)
}

fn extract_full_from_doc(doc: &lopdf::Document) -> Result<FullExtraction, PdfError> {
    let page_count = doc.get_pages().len() as u32;
    let pages = extractor::extract_pages_from_doc(doc, &ExtractConfig::all_pages())?;

    let hadith_pages: Vec<u32> = pages
        .iter()
        .filter(|p| looks_like_hadith_page(&p.text))
        .map(|p| p.number)
        .collect();
    for page in &hadith_pages {
        log::info!("Found hadith content on page {}", page);
    }

    Ok(FullExtraction {
        page_count,
        pages,
        hadith_pages,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("PDF has no pages")]
    InvalidStructure,
}

impl From<lopdf::Error> for PdfError {
    fn from(e: lopdf::Error) -> Self {
        PdfError::Parse(e.to_string())
    }
}

/// Any failure of the command-line tools
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error("could not write {path}: {source}")]
    Dump {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
