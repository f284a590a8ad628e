//! Segmentation of extracted PDF text into candidate hadith sections
//!
//! A section starts at any line that looks like a hadith heading or carries
//! one of the honorifics that open most narrations. This is a heuristic; it
//! over-segments on numbered lists and honorifics inside a narration.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

static HADITH_HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Hadith\s+(\d+)").unwrap());

static NUMBERED_HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\.\s+").unwrap());

/// "may Allah be pleased with him"
static RADIYALLAHU_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"رضي الله عنه").unwrap());

/// "peace and blessings be upon him"
static SALLALLAHU_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"صلى الله عليه وسلم").unwrap());

/// Number of sections written to the sections dump by default
pub const DEFAULT_DUMP_LIMIT: usize = 10;

/// A candidate hadith section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// 0-indexed line in the source text where the section starts
    pub start_line: usize,
    /// Number from a `Hadith N` or `N.` heading on the first line
    pub heading: Option<u32>,
    pub text: String,
}

/// Whether a line opens a new section
pub fn is_section_start(line: &str) -> bool {
    HADITH_HEADING_RE.is_match(line)
        || NUMBERED_HEADING_RE.is_match(line)
        || RADIYALLAHU_RE.is_match(line)
        || SALLALLAHU_RE.is_match(line)
}

/// Number carried by a heading line, `Hadith N` taking precedence over `N.`
pub fn heading_number(line: &str) -> Option<u32> {
    HADITH_HEADING_RE
        .captures(line)
        .or_else(|| NUMBERED_HEADING_RE.captures(line))
        .and_then(|caps| caps[1].parse().ok())
}

/// Split text into sections; lines before the first section start are dropped
pub fn find_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<(usize, Vec<&str>)> = None;

    for (i, line) in text.split('\n').enumerate() {
        if is_section_start(line) {
            if let Some((start, lines)) = current.take() {
                sections.push(build_section(start, lines));
            }
            current = Some((i, vec![line]));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }

    if let Some((start, lines)) = current {
        sections.push(build_section(start, lines));
    }

    log::debug!("found {} candidate sections", sections.len());
    sections
}

fn build_section(start_line: usize, lines: Vec<&str>) -> Section {
    Section {
        start_line,
        heading: lines.first().and_then(|l| heading_number(l)),
        text: lines.join("\n"),
    }
}

/// Render the first `limit` sections with `--- Section i ---` banners
pub fn render_sections(sections: &[Section], limit: usize) -> String {
    let mut out = String::new();
    for (i, section) in sections.iter().take(limit).enumerate() {
        let _ = write!(out, "\n--- Section {} ---\n{}\n\n", i + 1, section.text);
    }
    out
}

/// Write the first `limit` sections to a file
pub fn write_sections_dump<P: AsRef<Path>>(
    path: P,
    sections: &[Section],
    limit: usize,
) -> std::io::Result<()> {
    fs::write(path, render_sections(sections, limit))
}
