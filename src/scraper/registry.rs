//! Named collection of registered site scrapers.

use tracing::debug;

use super::SiteScraper;

/// A name-keyed collection of scrapers the CLI selects from.
///
/// Lookup is by exact name; registration order is preserved for listing.
#[derive(Default)]
pub struct ScraperRegistry {
    scrapers: Vec<Box<dyn SiteScraper>>,
}

impl ScraperRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a scraper.
    pub fn register(&mut self, scraper: Box<dyn SiteScraper>) {
        debug!(
            name = scraper.name(),
            provenance = scraper.provenance(),
            "registering scraper"
        );
        self.scrapers.push(scraper);
    }

    /// Looks a scraper up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn SiteScraper> {
        self.scrapers
            .iter()
            .find(|scraper| scraper.name() == name)
            .map(AsRef::as_ref)
    }

    /// Removes and returns the named scraper, handing ownership to the
    /// caller (the orchestrator owns its scraper for the run's duration).
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn SiteScraper>> {
        let index = self
            .scrapers
            .iter()
            .position(|scraper| scraper.name() == name)?;
        Some(self.scrapers.remove(index))
    }

    /// Returns the registered scraper names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.scrapers.iter().map(|scraper| scraper.name()).collect()
    }

    /// Returns the number of registered scrapers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scrapers.len()
    }

    /// Returns true if no scrapers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scrapers.is_empty()
    }
}
