//! Hadith dataset loading
//!
//! Records are kept as loose JSON objects so that a missing or wrongly typed
//! field surfaces as a validation finding instead of aborting the load.

use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Dataset location relative to the repository root
pub const DEFAULT_RECORDS_PATH: &str = "./Nawawi/Resources/hadiths.json";

pub const FIELD_NUMBER: &str = "number";
pub const FIELD_ARABIC_TEXT: &str = "arabicText";
pub const FIELD_ENGLISH_TRANSLATION: &str = "englishTranslation";
pub const FIELD_NARRATOR: &str = "narrator";

/// Fields every record must carry, in reporting order
pub const REQUIRED_FIELDS: [&str; 4] = [
    FIELD_NUMBER,
    FIELD_ARABIC_TEXT,
    FIELD_ENGLISH_TRANSLATION,
    FIELD_NARRATOR,
];

/// One hadith entry as found in the dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Raw field lookup
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The `number` field when it holds a whole number; `1.0` reads as `1`
    pub fn number(&self) -> Option<i64> {
        let Some(Value::Number(n)) = self.get(FIELD_NUMBER) else {
            return None;
        };
        n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        })
    }

    /// String content of a text field; anything that is not a string reads as `""`
    pub fn text(&self, field: &str) -> &str {
        self.get(field).and_then(Value::as_str).unwrap_or("")
    }

    pub fn arabic_text(&self) -> &str {
        self.text(FIELD_ARABIC_TEXT)
    }

    pub fn english_translation(&self) -> &str {
        self.text(FIELD_ENGLISH_TRANSLATION)
    }

    pub fn narrator(&self) -> &str {
        self.text(FIELD_NARRATOR)
    }

    /// True when the field is absent or holds an empty value (`null`, `""`,
    /// `0`, `false`, `[]`, `{}`)
    pub fn is_blank(&self, field: &str) -> bool {
        match self.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::Bool(b)) => !b,
            Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f == 0.0),
            Some(Value::String(s)) => s.is_empty(),
            Some(Value::Array(a)) => a.is_empty(),
            Some(Value::Object(o)) => o.is_empty(),
        }
    }

    /// Label used in reports: the `number` value if present, else the
    /// 1-indexed position in the collection
    pub fn label(&self, position: usize) -> RecordLabel {
        match self.get(FIELD_NUMBER) {
            None => RecordLabel::Position(position),
            Some(Value::Number(n)) => match self.number() {
                Some(i) => RecordLabel::Number(i),
                None => RecordLabel::Raw(n.to_string()),
            },
            Some(other) => RecordLabel::Raw(other.to_string()),
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// How a record is referred to in an issue line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordLabel {
    /// Integer `number` field
    Number(i64),
    /// `number` present but not an integer, rendered as JSON
    Raw(String),
    /// No `number` field; 1-indexed position
    Position(usize),
}

impl fmt::Display for RecordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordLabel::Number(n) => write!(f, "{}", n),
            RecordLabel::Raw(s) => write!(f, "{}", s),
            RecordLabel::Position(p) => write!(f, "{}", p),
        }
    }
}

/// Failure to obtain a record collection from disk
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not find {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("expected a JSON array of records, found {0}")]
    NotAnArray(&'static str),
    #[error("record at position {0} is not a JSON object")]
    NotAnObject(usize),
}

/// Load the dataset from a JSON file
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<Record>, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let payload: Value = serde_json::from_str(&raw).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let records = records_from_value(payload)?;
    log::debug!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Load the dataset from an in-memory JSON string
pub fn parse_records(json: &str) -> Result<Vec<Record>, LoadError> {
    let payload: Value = serde_json::from_str(json).map_err(|source| LoadError::Json {
        path: PathBuf::from("<memory>"),
        source,
    })?;
    records_from_value(payload)
}

fn records_from_value(payload: Value) -> Result<Vec<Record>, LoadError> {
    let entries = match payload {
        Value::Array(entries) => entries,
        other => return Err(LoadError::NotAnArray(json_kind(&other))),
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| match entry {
            Value::Object(fields) => Ok(Record::new(fields)),
            _ => Err(LoadError::NotAnObject(i + 1)),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => Record::new(map),
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_blank_follows_json_truthiness() {
        let r = record(json!({
            "number": 0,
            "arabicText": "",
            "englishTranslation": null,
            "narrator": "Umar",
            "flags": []
        }));
        assert!(r.is_blank("number"));
        assert!(r.is_blank("arabicText"));
        assert!(r.is_blank("englishTranslation"));
        assert!(r.is_blank("flags"));
        assert!(r.is_blank("absent"));
        assert!(!r.is_blank("narrator"));
    }

    #[test]
    fn test_label_prefers_number() {
        assert_eq!(record(json!({"number": 7})).label(3), RecordLabel::Number(7));
        assert_eq!(record(json!({})).label(3), RecordLabel::Position(3));
        assert_eq!(
            record(json!({"number": "7"})).label(3).to_string(),
            "\"7\""
        );
        assert_eq!(record(json!({"number": 2.5})).label(1).to_string(), "2.5");
        assert_eq!(record(json!({"number": 4.0})).label(1), RecordLabel::Number(4));
    }

    #[test]
    fn test_number_accepts_whole_floats_only() {
        assert_eq!(record(json!({"number": 1})).number(), Some(1));
        assert_eq!(record(json!({"number": 1.0})).number(), Some(1));
        assert_eq!(record(json!({"number": 1.5})).number(), None);
        assert_eq!(record(json!({"number": "1"})).number(), None);
        assert_eq!(record(json!({"number": 1e300})).number(), None);
    }

    #[test]
    fn test_text_of_non_string_is_empty() {
        let r = record(json!({"arabicText": 12}));
        assert_eq!(r.arabic_text(), "");
        assert_eq!(r.narrator(), "");
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_records(r#"{"number": 1}"#).unwrap_err();
        assert!(matches!(err, LoadError::NotAnArray("an object")));

        let err = parse_records(r#"[{"number": 1}, 2]"#).unwrap_err();
        assert!(matches!(err, LoadError::NotAnObject(2)));
    }

    #[test]
    fn test_parse_keeps_extra_fields() {
        let records =
            parse_records(r#"[{"number": 1, "globalId": 9001, "uzbekTranslation": "x"}]"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].number(), Some(1));
        assert_eq!(records[0].get("globalId"), Some(&json!(9001)));
    }
}
