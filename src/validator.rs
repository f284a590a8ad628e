//! Structural validation of a hadith collection
//!
//! Every check accumulates findings; nothing here fails or mutates records.

use crate::records::{
    Record, RecordLabel, FIELD_ARABIC_TEXT, FIELD_ENGLISH_TRANSLATION, FIELD_NUMBER,
    REQUIRED_FIELDS,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::RangeInclusive;

/// Configuration for record validation
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Fields that must be present and non-empty
    pub required_fields: Vec<&'static str>,
    /// Minimum length in characters for the Arabic text and the translation
    pub min_text_chars: usize,
    /// Code points that count as Arabic script
    pub arabic_range: RangeInclusive<char>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            required_fields: REQUIRED_FIELDS.to_vec(),
            min_text_chars: 10,
            arabic_range: '\u{0600}'..='\u{06FF}',
        }
    }
}

/// What is wrong with a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// Field absent or empty
    MissingField(&'static str),
    /// Text field present but not a JSON string
    NotAString(&'static str),
    /// Arabic text has no character in the Arabic block
    NoArabicScript,
    ArabicTooShort { chars: usize },
    TranslationTooShort { chars: usize },
}

/// A single record-level defect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub record: RecordLabel,
    pub kind: IssueKind,
}

impl ValidationIssue {
    /// Name of the field the issue concerns
    pub fn field(&self) -> &'static str {
        match self.kind {
            IssueKind::MissingField(f) | IssueKind::NotAString(f) => f,
            IssueKind::NoArabicScript | IssueKind::ArabicTooShort { .. } => FIELD_ARABIC_TEXT,
            IssueKind::TranslationTooShort { .. } => FIELD_ENGLISH_TRANSLATION,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hadith {}: ", self.record)?;
        match &self.kind {
            IssueKind::MissingField(field) => write!(f, "Missing or empty {}", field),
            IssueKind::NotAString(field) => write!(f, "{} is not a string", field),
            IssueKind::NoArabicScript => {
                write!(f, "Arabic text appears to not contain Arabic characters")
            }
            IssueKind::ArabicTooShort { chars } => {
                write!(f, "Arabic text seems too short ({} chars)", chars)
            }
            IssueKind::TranslationTooShort { chars } => {
                write!(f, "English translation seems too short ({} chars)", chars)
            }
        }
    }
}

/// Check every record with the default configuration
pub fn validate(records: &[Record]) -> Vec<ValidationIssue> {
    validate_with_config(records, &ValidationConfig::default())
}

/// Check every record, accumulating all issues in input order
pub fn validate_with_config(records: &[Record], config: &ValidationConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let label = record.label(i + 1);
        let mut push = |kind| {
            issues.push(ValidationIssue {
                record: label.clone(),
                kind,
            })
        };

        for &field in &config.required_fields {
            if record.is_blank(field) {
                push(IssueKind::MissingField(field));
            } else if field != FIELD_NUMBER && !record.get(field).is_some_and(|v| v.is_string()) {
                push(IssueKind::NotAString(field));
            }
        }

        let arabic = record.arabic_text();
        if !arabic.is_empty() && !arabic.chars().any(|c| config.arabic_range.contains(&c)) {
            push(IssueKind::NoArabicScript);
        }

        let arabic_chars = arabic.chars().count();
        if arabic_chars < config.min_text_chars {
            push(IssueKind::ArabicTooShort {
                chars: arabic_chars,
            });
        }

        let english_chars = record.english_translation().chars().count();
        if english_chars < config.min_text_chars {
            push(IssueKind::TranslationTooShort {
                chars: english_chars,
            });
        }
    }

    issues
}

/// Classification of the collection size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "count")]
pub enum CountClass {
    /// 40 main hadiths plus the 2 commonly appended ones
    Expected42,
    /// The 40 main hadiths only
    Expected40,
    Unexpected(usize),
}

impl fmt::Display for CountClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountClass::Expected42 => write!(f, "expected 42 (40 main + 2 additional)"),
            CountClass::Expected40 => write!(f, "expected 40 (2 commonly appended missing)"),
            CountClass::Unexpected(n) => write!(f, "unexpected {} (expected 40 or 42)", n),
        }
    }
}

pub fn check_count(records: &[Record]) -> CountClass {
    match records.len() {
        42 => CountClass::Expected42,
        40 => CountClass::Expected40,
        n => CountClass::Unexpected(n),
    }
}

/// Outcome of comparing `number` values with the ideal range `1..=N`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NumberingReport {
    /// In the ideal range but absent from the data
    pub missing: BTreeSet<i64>,
    /// Integers present in the data but outside the ideal range
    pub unexpected: BTreeSet<i64>,
    /// 1-indexed positions of records whose `number` is absent or not a whole number
    pub non_integer: Vec<usize>,
    /// In-range values that occur more than once
    pub repeated: BTreeSet<i64>,
    /// Values appear exactly as `1, 2, .., N`
    pub sequential: bool,
}

impl NumberingReport {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty()
            && self.unexpected.is_empty()
            && self.non_integer.is_empty()
            && self.repeated.is_empty()
    }
}

/// Compare the `number` values with `1..=N`
///
/// Whole floats such as `1.0` count as their integer; any other non-integer
/// value lands in `non_integer`.
pub fn check_numbering(records: &[Record]) -> NumberingReport {
    let ideal = 1..=records.len() as i64;
    let mut report = NumberingReport::default();
    let mut seen: BTreeMap<i64, usize> = BTreeMap::new();

    for (i, record) in records.iter().enumerate() {
        match record.number() {
            Some(n) if ideal.contains(&n) => *seen.entry(n).or_default() += 1,
            Some(n) => {
                report.unexpected.insert(n);
            }
            None => report.non_integer.push(i + 1),
        }
    }

    report.missing = ideal.filter(|n| !seen.contains_key(n)).collect();
    report.repeated = seen
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(&n, _)| n)
        .collect();
    report.sequential = records
        .iter()
        .enumerate()
        .all(|(i, r)| r.number() == Some(i as i64 + 1));

    report
}

/// All findings for one collection
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub record_count: usize,
    pub issues: Vec<ValidationIssue>,
    pub count: CountClass,
    pub numbering: NumberingReport,
}

impl ValidationReport {
    /// No record-level issues; count and numbering findings are advisory
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }

    /// Serializable summary for machine-readable output
    pub fn summary(&self) -> ReportSummary<'_> {
        ReportSummary {
            record_count: self.record_count,
            passed: self.passed(),
            issues: self.issues.iter().map(IssueSummary::from).collect(),
            count: self.count,
            numbering: &self.numbering,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IssueSummary {
    pub record: String,
    pub field: &'static str,
    pub message: String,
}

impl From<&ValidationIssue> for IssueSummary {
    fn from(issue: &ValidationIssue) -> Self {
        Self {
            record: issue.record.to_string(),
            field: issue.field(),
            message: issue.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    pub record_count: usize,
    pub passed: bool,
    pub issues: Vec<IssueSummary>,
    pub count: CountClass,
    pub numbering: &'a NumberingReport,
}

/// Run every check over the collection
pub fn verify(records: &[Record]) -> ValidationReport {
    verify_with_config(records, &ValidationConfig::default())
}

pub fn verify_with_config(records: &[Record], config: &ValidationConfig) -> ValidationReport {
    ValidationReport {
        record_count: records.len(),
        issues: validate_with_config(records, config),
        count: check_count(records),
        numbering: check_numbering(records),
    }
}
