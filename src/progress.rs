//! Operator-facing progress stream.
//!
//! The pipeline reports one marker per processed unit: `.` for a unit that
//! was scraped (or deliberately yielded nothing), `x` for an isolated
//! per-unit failure in terse mode. This is separate from structured log
//! output - it is the incremental heartbeat an operator watches during a
//! long run.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Sink for per-unit progress markers.
pub trait ProgressSink: Send + Sync {
    /// One unit processed.
    fn tick(&self);

    /// One unit failed (terse marker, no diagnostics).
    fn failure(&self);

    /// The scraping phase is over; terminate the marker line.
    fn finish(&self);
}

/// Writes `.`/`x` markers to stdout, flushing after each.
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl ConsoleProgress {
    fn write(marker: &str) {
        let mut stdout = std::io::stdout();
        // A broken pipe on the marker stream is not worth failing a run over.
        let _ = write!(stdout, "{marker}");
        let _ = stdout.flush();
    }
}

impl ProgressSink for ConsoleProgress {
    fn tick(&self) {
        Self::write(".");
    }

    fn failure(&self) {
        Self::write("x");
    }

    fn finish(&self) {
        Self::write("\n");
    }
}

/// Discards all markers. For dry runs driven from code and for tests.
#[derive(Debug, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn tick(&self) {}
    fn failure(&self) {}
    fn finish(&self) {}
}

/// Counts markers instead of printing them. Used by tests asserting the
/// one-marker-per-unit contract.
#[derive(Debug, Default)]
pub struct CountingProgress {
    ticks: AtomicUsize,
    failures: AtomicUsize,
}

impl CountingProgress {
    /// Creates a sink with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `tick` markers seen.
    #[must_use]
    pub fn ticks(&self) -> usize {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Number of `failure` markers seen.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }
}

impl ProgressSink for CountingProgress {
    fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    fn failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    fn finish(&self) {}
}
