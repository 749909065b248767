//! Inclusive date windows and the date-range contract check.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::debug;

use super::Annotator;
use super::error::PipelineError;
use crate::record::{ArticleRecord, PROVENANCE_FIELD};

/// An inclusive `[min, max]` datetime window.
///
/// Besides bounding the postprocess contract check, the range exposes the
/// enumerable calendar dates it spans so per-day scrapers can derive one
/// work unit per date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    min: DateTime<Utc>,
    max: DateTime<Utc>,
}

impl DateRange {
    /// Creates a range from inclusive bounds.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] when `min > max`.
    pub fn new(min: DateTime<Utc>, max: DateTime<Utc>) -> Result<Self, PipelineError> {
        if min > max {
            return Err(PipelineError::config(format!(
                "min_datetime {min} is after max_datetime {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Lower inclusive bound.
    #[must_use]
    pub fn min(&self) -> DateTime<Utc> {
        self.min
    }

    /// Upper inclusive bound.
    #[must_use]
    pub fn max(&self) -> DateTime<Utc> {
        self.max
    }

    /// Returns true when `instant` lies within the window, bounds included.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.min <= instant && instant <= self.max
    }

    /// Enumerates the calendar dates covered by the window, ascending.
    ///
    /// The sequence has `(max - min).days + 1` entries and steps by exactly
    /// one day, mirroring how per-day scrapers walk archive listings.
    #[must_use]
    pub fn days(&self) -> Vec<NaiveDate> {
        let span = (self.max - self.min).num_days();
        let start = self.min.date_naive();
        (0..=span)
            .filter_map(|offset| start.checked_add_signed(Duration::days(offset)))
            .collect()
    }
}

/// Postprocess wrapper asserting every record's date lies in the window.
///
/// This is a contract check, not a graceful filter: concrete scrapers are
/// responsible for pre-filtering, and a surviving out-of-window record is a
/// fatal programming error.
pub struct DateRangeAnnotator {
    inner: Box<dyn Annotator>,
    range: DateRange,
}

impl DateRangeAnnotator {
    /// Wraps `inner` with the date-window contract check.
    #[must_use]
    pub fn new(inner: Box<dyn Annotator>, range: DateRange) -> Self {
        Self { inner, range }
    }
}

impl Annotator for DateRangeAnnotator {
    fn annotate(&self, records: Vec<ArticleRecord>) -> Result<Vec<ArticleRecord>, PipelineError> {
        let records = self.inner.annotate(records)?;
        debug!(
            count = records.len(),
            min = %self.range.min(),
            max = %self.range.max(),
            "checking record dates against window"
        );

        for record in &records {
            let Some(date) = record.date() else {
                return Err(PipelineError::MissingDate {
                    provenance: record
                        .get(PROVENANCE_FIELD)
                        .and_then(|value| value.as_str())
                        .unwrap_or("unknown")
                        .to_string(),
                });
            };
            if !self.range.contains(date) {
                return Err(PipelineError::DateOutOfRange {
                    date,
                    min: self.range.min(),
                    max: self.range.max(),
                });
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PassthroughAnnotator;
    use crate::record::DATE_FIELD;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_reversed_bounds_are_a_config_error() {
        let result = DateRange::new(at(2024, 3, 5), at(2024, 3, 1));
        assert!(matches!(result, Err(PipelineError::Config { .. })));
    }

    #[test]
    fn test_days_length_and_ascending_step() {
        let range = DateRange::new(at(2024, 2, 27), at(2024, 3, 2)).unwrap();
        let days = range.days();

        // 2024 is a leap year, so the window spans Feb 29.
        assert_eq!(days.len(), 5);
        for pair in days.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(1));
        }
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2024, 2, 27).unwrap());
        assert_eq!(days[4], NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn test_single_day_range_enumerates_one_date() {
        let range = DateRange::new(at(2024, 3, 1), at(2024, 3, 1)).unwrap();
        assert_eq!(range.days().len(), 1);
    }

    #[test]
    fn test_contains_is_inclusive_on_both_bounds() {
        let range = DateRange::new(at(2024, 3, 1), at(2024, 3, 5)).unwrap();
        assert!(range.contains(at(2024, 3, 1)));
        assert!(range.contains(at(2024, 3, 5)));
        assert!(!range.contains(at(2024, 2, 29)));
        assert!(!range.contains(at(2024, 3, 6)));
    }

    fn dated_record(date: &str) -> ArticleRecord {
        let mut record = ArticleRecord::new();
        record.set(DATE_FIELD, date);
        record
    }

    fn annotator(min: DateTime<Utc>, max: DateTime<Utc>) -> DateRangeAnnotator {
        DateRangeAnnotator::new(
            Box::new(PassthroughAnnotator),
            DateRange::new(min, max).unwrap(),
        )
    }

    #[test]
    fn test_annotate_passes_in_window_batch_unchanged() {
        let stage = annotator(at(2024, 3, 1), at(2024, 3, 5));
        let batch = vec![dated_record("2024-03-01"), dated_record("2024-03-05")];

        let result = stage.annotate(batch.clone()).unwrap();
        assert_eq!(result, batch);
    }

    #[test]
    fn test_annotate_rejects_out_of_window_record() {
        let stage = annotator(at(2024, 3, 1), at(2024, 3, 5));
        let batch = vec![dated_record("2024-03-02"), dated_record("2024-03-09")];

        let error = stage.annotate(batch).unwrap_err();
        assert!(matches!(error, PipelineError::DateOutOfRange { .. }));
    }

    #[test]
    fn test_annotate_rejects_record_without_date() {
        let stage = annotator(at(2024, 3, 1), at(2024, 3, 5));
        let mut record = ArticleRecord::new();
        record.set(PROVENANCE_FIELD, "daily-example");

        let error = stage.annotate(vec![record]).unwrap_err();
        match error {
            PipelineError::MissingDate { provenance } => {
                assert_eq!(provenance, "daily-example");
            }
            other => panic!("expected MissingDate, got {other:?}"),
        }
    }
}
