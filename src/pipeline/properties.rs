//! Property declarations and pre-persistence validation.
//!
//! Each concrete scraper declares a [`PropertySpec`]: default values filled
//! into records that lack them, fields required on *every* record, and
//! fields expected on *at least one* record. Validation runs as the final
//! postprocess wrapper, after defaults are applied - so a default can
//! satisfy a required-field check.

use serde_json::{Map, Value, json};
use tracing::debug;

use super::Annotator;
use super::error::PipelineError;
use crate::record::{ArticleRecord, METADATA_FIELD};

/// Declared field contract of a concrete scraper.
///
/// Read-only once constructed; supplied by the scraper at registration.
#[derive(Debug, Clone, Default)]
pub struct PropertySpec {
    defaults: Map<String, Value>,
    required: Vec<String>,
    expected: Vec<String>,
}

impl PropertySpec {
    /// Creates an empty spec (no defaults, nothing required or expected).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a default value applied to every record lacking the field.
    #[must_use]
    pub fn with_default(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(field.into(), value.into());
        self
    }

    /// Marks a field as required on every record.
    #[must_use]
    pub fn with_required(mut self, field: impl Into<String>) -> Self {
        self.required.push(field.into());
        self
    }

    /// Marks a field as expected on at least one record per batch.
    #[must_use]
    pub fn with_expected(mut self, field: impl Into<String>) -> Self {
        self.expected.push(field.into());
        self
    }

    /// Declared defaults.
    #[must_use]
    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }

    /// Fields required on every record.
    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Fields expected on at least one record.
    #[must_use]
    pub fn expected(&self) -> &[String] {
        &self.expected
    }
}

/// Final postprocess wrapper: fills defaults, then enforces the spec.
///
/// The project identifier and an empty metadata mapping are always injected
/// as implicit defaults before the declared ones are considered.
pub struct PropertyAnnotator {
    inner: Box<dyn Annotator>,
    spec: PropertySpec,
    project: u64,
}

impl PropertyAnnotator {
    /// Wraps `inner` with default-filling and property validation.
    #[must_use]
    pub fn new(inner: Box<dyn Annotator>, spec: PropertySpec, project: u64) -> Self {
        Self {
            inner,
            spec,
            project,
        }
    }

    fn fill_defaults(&self, records: &mut [ArticleRecord]) {
        debug!(count = records.len(), "filling in defaults");

        let mut defaults = self.spec.defaults.clone();
        defaults.insert("project".to_string(), json!(self.project));
        defaults.insert(METADATA_FIELD.to_string(), json!({}));

        for (field, default) in &defaults {
            for record in records.iter_mut() {
                if !record.is_set(field) {
                    record.set(field.clone(), default.clone());
                }
            }
        }
    }

    fn check_properties(&self, records: &[ArticleRecord]) -> Result<(), PipelineError> {
        debug!(count = records.len(), "checking properties");

        for field in &self.spec.required {
            if !records.iter().all(|record| record.has_property(field)) {
                return Err(PipelineError::MissingRequired {
                    field: field.clone(),
                });
            }
        }

        // Expected fields are only meaningful against a non-empty batch.
        if !records.is_empty() {
            for field in &self.spec.expected {
                if !records.iter().any(|record| record.has_property(field)) {
                    return Err(PipelineError::MissingExpected {
                        field: field.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl Annotator for PropertyAnnotator {
    fn annotate(&self, records: Vec<ArticleRecord>) -> Result<Vec<ArticleRecord>, PipelineError> {
        let mut records = self.inner.annotate(records)?;
        self.fill_defaults(&mut records);
        self.check_properties(&records)?;
        Ok(records)
    }
}
