//! Side-by-side reporting of PDF extraction and dataset contents

use crate::records::{Record, RecordLabel, FIELD_NARRATOR, FIELD_NUMBER};
use std::fmt;
use std::fs;
use std::path::Path;

/// Characters of Arabic/English text shown in a record preview
pub const RECORD_PREVIEW_CHARS: usize = 100;

/// Characters of the first PDF section shown in the comparison
pub const SECTION_PREVIEW_CHARS: usize = 300;

/// Truncate to `max_chars` characters, appending `...` only when cut
pub fn preview(text: &str, max_chars: usize) -> String {
    let head = take_chars(text, max_chars);
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Short summary of one dataset record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPreview {
    pub number: Option<RecordLabel>,
    pub arabic: String,
    pub english: String,
    pub narrator: Option<String>,
}

impl RecordPreview {
    pub fn from_record(record: &Record) -> Self {
        Self {
            number: record.get(FIELD_NUMBER).map(|_| record.label(1)),
            arabic: format!("{}...", take_chars(record.arabic_text(), RECORD_PREVIEW_CHARS)),
            english: format!(
                "{}...",
                take_chars(record.english_translation(), RECORD_PREVIEW_CHARS)
            ),
            narrator: record
                .get(FIELD_NARRATOR)
                .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string)),
        }
    }
}

impl fmt::Display for RecordPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let none = "None".to_string();
        writeln!(
            f,
            "Number: {}",
            self.number.as_ref().map_or(none.clone(), ToString::to_string)
        )?;
        writeln!(f, "Arabic: {}", self.arabic)?;
        writeln!(f, "English: {}", self.english)?;
        write!(f, "Narrator: {}", self.narrator.as_ref().unwrap_or(&none))
    }
}

fn take_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Counts of PDF sections and dataset records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    pub pdf_sections: usize,
    pub json_records: usize,
}

impl Comparison {
    pub fn new(pdf_sections: usize, json_records: usize) -> Self {
        Self {
            pdf_sections,
            json_records,
        }
    }

    pub fn matches(&self) -> bool {
        self.pdf_sections == self.json_records
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Comparison:")?;
        writeln!(f, "PDF sections found: {}", self.pdf_sections)?;
        write!(f, "JSON hadiths: {}", self.json_records)
    }
}

/// Write a text dump, replacing any existing file
pub fn write_text_dump<P: AsRef<Path>>(path: P, text: &str) -> std::io::Result<()> {
    fs::write(path, text)
}
