//! Open-schema article records produced by scrapers.
//!
//! An [`ArticleRecord`] is a mapping from field name to JSON value with no
//! fixed schema beyond the fields the pipeline itself consumes: `date` is
//! required whenever date-range filtering is active, `provenance` is stamped
//! by postprocessing, and `metastring` holds free-form metadata. Everything
//! else is up to the concrete scraper.
//!
//! Field presence follows the "falsy is absent" rule: `null`, empty strings,
//! empty arrays/objects, `false` and `0` all count as unset, so defaults can
//! overwrite them and required-field checks reject them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name for the free-form metadata mapping.
pub const METADATA_FIELD: &str = "metastring";

/// Field name for the provenance identifier stamped during postprocessing.
pub const PROVENANCE_FIELD: &str = "provenance";

/// Field name for the publication date consumed by date-range filtering.
pub const DATE_FIELD: &str = "date";

/// A normalized article record: an open mapping from field name to value.
///
/// Records are mutable until handed to the persistence adapter; the pipeline
/// owns them exclusively for the duration of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleRecord {
    fields: Map<String, Value>,
}

impl ArticleRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw value of a field, set or not.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Sets a field, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns true if the field is present with a non-falsy value.
    ///
    /// Falsy values are `null`, `""`, `[]`, `{}`, `false` and `0`.
    #[must_use]
    pub fn is_set(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(|value| !is_falsy(value))
    }

    /// Returns true if the record has no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if the field is set either top-level or inside the
    /// `metastring` metadata mapping.
    #[must_use]
    pub fn has_property(&self, field: &str) -> bool {
        if self.is_set(field) {
            return true;
        }
        match self.fields.get(METADATA_FIELD) {
            Some(Value::Object(meta)) => meta.get(field).is_some_and(|value| !is_falsy(value)),
            _ => false,
        }
    }

    /// Parses the `date` field as a UTC datetime.
    ///
    /// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS` and
    /// bare `YYYY-MM-DD` (interpreted as midnight). Naive datetimes are
    /// treated as UTC. Returns `None` when the field is unset or unparsable.
    #[must_use]
    pub fn date(&self) -> Option<DateTime<Utc>> {
        match self.fields.get(DATE_FIELD)? {
            Value::String(raw) => parse_datetime(raw),
            _ => None,
        }
    }

    /// Borrows the underlying field map.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consumes the record, returning the underlying field map.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

impl From<Map<String, Value>> for ArticleRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl FromIterator<(String, Value)> for ArticleRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Parses a datetime string in the formats scrapers commonly emit.
#[must_use]
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(parsed.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}
