//! Page text extraction using lopdf
//!
//! Text runs are collected with their positions, grouped into lines and
//! joined per page. Lines that are mostly Arabic are read right-to-left.

use crate::tounicode::{font_decoders, FontDecoder};
use crate::PdfError;
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::path::Path;

/// A text run with position information
#[derive(Debug, Clone)]
pub struct TextItem {
    pub text: String,
    /// X position on page
    pub x: f32,
    /// Y position on page (PDF coordinates, origin at bottom-left)
    pub y: f32,
    /// Page number (1-indexed)
    pub page: u32,
}

/// A line of text (grouped text items)
#[derive(Debug, Clone)]
pub struct TextLine {
    pub items: Vec<TextItem>,
    pub y: f32,
    pub page: u32,
}

impl TextLine {
    pub fn text(&self) -> String {
        self.items
            .iter()
            .map(|i| i.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// More Arabic letters than Latin ones
    pub fn is_rtl(&self) -> bool {
        let (arabic, latin) = self
            .items
            .iter()
            .flat_map(|i| i.text.chars())
            .fold((0usize, 0usize), |(a, l), c| {
                if is_arabic_char(c) {
                    (a + 1, l)
                } else if c.is_ascii_alphabetic() {
                    (a, l + 1)
                } else {
                    (a, l)
                }
            });
        arabic > latin
    }
}

/// Arabic block, supplement and both presentation-form blocks
pub fn is_arabic_char(c: char) -> bool {
    matches!(c,
        '\u{0600}'..='\u{06FF}'
        | '\u{0750}'..='\u{077F}'
        | '\u{FB50}'..='\u{FDFF}'
        | '\u{FE70}'..='\u{FEFF}')
}

/// Plain text of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Page number (1-indexed)
    pub number: u32,
    pub text: String,
}

/// Configuration for page extraction
#[derive(Debug, Clone, Default)]
pub struct ExtractConfig {
    /// Stop after this many pages
    pub max_pages: Option<u32>,
    /// Stop after the first page containing any of these strings
    pub stop_markers: Vec<String>,
    /// Truncate plain-extracted text to this many characters
    pub char_limit: Option<usize>,
}

impl ExtractConfig {
    /// Every page, no markers, no truncation
    pub fn all_pages() -> Self {
        Self::default()
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn with_stop_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_char_limit(mut self, char_limit: usize) -> Self {
        self.char_limit = Some(char_limit);
        self
    }
}

/// Extract per-page text from a PDF file
pub fn extract_pages<P: AsRef<Path>>(
    path: P,
    config: &ExtractConfig,
) -> Result<Vec<PageText>, PdfError> {
    let doc = Document::load(path)?;
    extract_pages_from_doc(&doc, config)
}

/// Extract per-page text from a PDF memory buffer
pub fn extract_pages_mem(buffer: &[u8], config: &ExtractConfig) -> Result<Vec<PageText>, PdfError> {
    let doc = Document::load_mem(buffer)?;
    extract_pages_from_doc(&doc, config)
}

/// Plain lopdf extraction without positions
pub(crate) fn extract_plain(
    doc: &Document,
    config: &ExtractConfig,
) -> Result<String, PdfError> {
    let page_nums: Vec<u32> = doc
        .get_pages()
        .keys()
        .copied()
        .filter(|&n| config.max_pages.map_or(true, |max| n <= max))
        .collect();

    let text = doc
        .extract_text(&page_nums)
        .map_err(|e| PdfError::Parse(e.to_string()))?;
    Ok(truncate_chars(text, config.char_limit))
}

pub(crate) fn extract_pages_from_doc(
    doc: &Document,
    config: &ExtractConfig,
) -> Result<Vec<PageText>, PdfError> {
    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(PdfError::InvalidStructure);
    }

    let mut out = Vec::new();

    for (&page_num, &page_id) in pages.iter() {
        if config.max_pages.is_some_and(|max| page_num > max) {
            break;
        }

        let text = match extract_page_text_items(doc, page_id, page_num) {
            Ok(items) => lines_to_text(&group_into_lines(items)),
            Err(e) => {
                log::warn!("page {}: {}; falling back to plain extraction", page_num, e);
                doc.extract_text(&[page_num]).unwrap_or_else(|e| {
                    log::warn!("page {}: plain extraction failed: {}", page_num, e);
                    String::new()
                })
            }
        };
        log::debug!("page {}: {} chars", page_num, text.chars().count());

        let marker = config
            .stop_markers
            .iter()
            .find(|m| text.contains(m.as_str()))
            .cloned();

        out.push(PageText {
            number: page_num,
            text,
        });

        if let Some(marker) = marker {
            log::info!("Found {:?} on page {}", marker, page_num);
            break;
        }
    }

    Ok(out)
}

/// Concatenate pages, each preceded by a `--- Page N ---` banner
pub fn render_pages(pages: &[PageText]) -> String {
    let mut out = String::new();
    for page in pages.iter().filter(|p| !p.text.is_empty()) {
        let _ = write!(out, "\n--- Page {} ---\n{}\n", page.number, page.text);
    }
    out
}

fn truncate_chars(text: String, limit: Option<usize>) -> String {
    match limit {
        Some(limit) => match text.char_indices().nth(limit) {
            Some((idx, _)) => text[..idx].to_string(),
            None => text,
        },
        None => text,
    }
}

/// Multiply two 2D transformation matrices
/// Matrix format: [a, b, c, d, e, f] representing:
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
fn multiply_matrices(m1: &[f32; 6], m2: &[f32; 6]) -> [f32; 6] {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// TJ adjustments below this (thousandths of an em) read as a word gap
const TJ_SPACE_THRESHOLD: f32 = -250.0;

/// Font resources of one page and how to decode them
struct PageFonts<'a> {
    doc: &'a Document,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    decoders: HashMap<Vec<u8>, FontDecoder>,
}

impl PageFonts<'_> {
    fn decode(&self, obj: &Object, current_font: &[u8]) -> Option<String> {
        let Object::String(bytes, _) = obj else {
            return None;
        };

        if let Some(decoder) = self.decoders.get(current_font) {
            return Some(decoder.decode(bytes));
        }

        if let Some(font_dict) = self.fonts.get(current_font) {
            if let Ok(encoding) = font_dict.get_font_encoding(self.doc) {
                if let Ok(text) = Document::decode_text(&encoding, bytes) {
                    return Some(text);
                }
            }
        }

        // UTF-16BE with BOM
        if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
            let utf16: Vec<u16> = bytes[2..]
                .chunks_exact(2)
                .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
                .collect();
            return Some(String::from_utf16_lossy(&utf16));
        }

        // Latin-1
        Some(bytes.iter().map(|&b| b as char).collect())
    }
}

/// Extract text runs from a single page
pub fn extract_page_text_items(
    doc: &Document,
    page_id: ObjectId,
    page_num: u32,
) -> Result<Vec<TextItem>, PdfError> {
    let fonts = doc.get_page_fonts(page_id).unwrap_or_default();
    let decoders = font_decoders(doc, &fonts);
    let page_fonts = PageFonts {
        doc,
        fonts,
        decoders,
    };

    let content_data = doc
        .get_page_content(page_id)
        .map_err(|e| PdfError::Parse(e.to_string()))?;
    let content = Content::decode(&content_data).map_err(|e| PdfError::Parse(e.to_string()))?;

    let mut items = Vec::new();

    let mut ctm = IDENTITY;
    let mut ctm_stack: Vec<[f32; 6]> = Vec::new();

    let mut current_font: Vec<u8> = Vec::new();
    let mut current_font_size: f32 = 12.0;
    let mut leading: f32 = 0.0;
    let mut text_matrix = IDENTITY;
    let mut line_matrix = IDENTITY;
    let mut in_text_block = false;

    for op in &content.operations {
        let operands = &op.operands;
        let mut shown: Option<String> = None;

        match op.operator.as_str() {
            "q" => ctm_stack.push(ctm),
            "Q" => {
                if let Some(saved) = ctm_stack.pop() {
                    ctm = saved;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operands(operands) {
                    ctm = multiply_matrices(&m, &ctm);
                }
            }
            "BT" => {
                in_text_block = true;
                text_matrix = IDENTITY;
                line_matrix = IDENTITY;
            }
            "ET" => in_text_block = false,
            "Tf" => {
                if operands.len() >= 2 {
                    if let Ok(name) = operands[0].as_name() {
                        current_font = name.to_vec();
                    }
                    if let Some(size) = get_number(&operands[1]) {
                        current_font_size = size;
                    }
                }
            }
            "TL" => {
                if let Some(l) = operands.first().and_then(get_number) {
                    leading = l;
                }
            }
            "Td" | "TD" => {
                if operands.len() >= 2 {
                    let tx = get_number(&operands[0]).unwrap_or(0.0);
                    let ty = get_number(&operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        leading = -ty;
                    }
                    line_matrix = multiply_matrices(&[1.0, 0.0, 0.0, 1.0, tx, ty], &line_matrix);
                    text_matrix = line_matrix;
                }
            }
            "Tm" => {
                if let Some(m) = matrix_operands(operands) {
                    text_matrix = m;
                    line_matrix = m;
                }
            }
            "T*" => {
                line_matrix = next_line(&line_matrix, leading, current_font_size);
                text_matrix = line_matrix;
            }
            "Tj" if in_text_block => {
                shown = operands
                    .first()
                    .and_then(|o| page_fonts.decode(o, &current_font));
            }
            "TJ" if in_text_block => {
                if let Some(Ok(array)) = operands.first().map(Object::as_array) {
                    let mut combined = String::new();
                    for element in array {
                        match get_number(element) {
                            Some(adjust) if adjust < TJ_SPACE_THRESHOLD => {
                                if !combined.ends_with(' ') {
                                    combined.push(' ');
                                }
                            }
                            Some(_) => {}
                            None => {
                                if let Some(text) = page_fonts.decode(element, &current_font) {
                                    combined.push_str(&text);
                                }
                            }
                        }
                    }
                    shown = Some(combined);
                }
            }
            "'" | "\"" if in_text_block => {
                line_matrix = next_line(&line_matrix, leading, current_font_size);
                text_matrix = line_matrix;
                // `"` carries word and char spacing before the string
                shown = operands
                    .last()
                    .and_then(|o| page_fonts.decode(o, &current_font));
            }
            _ => {}
        }

        if let Some(text) = shown.filter(|t| !t.trim().is_empty()) {
            let combined = multiply_matrices(&text_matrix, &ctm);
            items.push(TextItem {
                text: text.trim().to_string(),
                x: combined[4],
                y: combined[5],
                page: page_num,
            });
        }
    }

    Ok(items)
}

fn next_line(line_matrix: &[f32; 6], leading: f32, font_size: f32) -> [f32; 6] {
    let leading = if leading != 0.0 {
        leading
    } else {
        font_size * 1.2
    };
    multiply_matrices(&[1.0, 0.0, 0.0, 1.0, 0.0, -leading], line_matrix)
}

fn matrix_operands(operands: &[Object]) -> Option<[f32; 6]> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = IDENTITY;
    for (i, operand) in operands.iter().take(6).enumerate() {
        m[i] = get_number(operand)?;
    }
    Some(m)
}

/// Helper to get f32 from Object
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Group text items into lines, page by page
///
/// PDF stream order is kept (it is usually reading order); only consecutive
/// items sharing a baseline are merged. Items within a line are ordered left
/// to right, or right to left for Arabic lines.
pub fn group_into_lines(items: Vec<TextItem>) -> Vec<TextLine> {
    let mut lines: Vec<TextLine> = Vec::new();
    let y_tolerance = 3.0;

    for item in items {
        match lines.last_mut() {
            Some(last) if last.page == item.page && (last.y - item.y).abs() < y_tolerance => {
                last.items.push(item);
            }
            _ => {
                let (y, page) = (item.y, item.page);
                lines.push(TextLine {
                    items: vec![item],
                    y,
                    page,
                });
            }
        }
    }

    for line in &mut lines {
        line.items
            .sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        if line.is_rtl() {
            line.items.reverse();
        }
    }

    lines
}

fn lines_to_text(lines: &[TextLine]) -> String {
    lines
        .iter()
        .map(TextLine::text)
        .collect::<Vec<_>>()
        .join("\n")
}
