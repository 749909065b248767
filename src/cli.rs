//! CLI argument definitions using clap derive macros.

use clap::Parser;

use harvester_core::record::parse_datetime;
use harvester_core::{PipelineError, RunOptions};

/// Run a registered scraper and persist its articles.
///
/// Harvester drives a site scraper through fetch, postprocess and save,
/// with per-unit failure isolation and pre-persistence validation.
#[derive(Parser, Debug)]
#[command(name = "harvester")]
#[command(author, version, about)]
pub struct Args {
    /// Name of the registered scraper to run
    #[arg(long, default_value = "json-listing")]
    pub scraper: String,

    /// Listing URL for the built-in json-listing scraper
    #[arg(long)]
    pub listing_url: Option<String>,

    /// Provenance identifier stamped onto records of the built-in scraper
    #[arg(long, default_value = "harvester.json_listing")]
    pub provenance: String,

    /// Target project identifier at the store
    #[arg(long)]
    pub project: u64,

    /// Target articleset identifier at the store
    #[arg(long)]
    pub articleset: u64,

    /// Store API host, e.g. https://amcat.example.org
    #[arg(long)]
    pub api_host: String,

    /// Store API user
    #[arg(long)]
    pub api_user: String,

    /// Store API password
    #[arg(long)]
    pub api_password: String,

    /// Log per-unit scrape failures with full detail instead of 'x' markers
    #[arg(long)]
    pub log_errors: bool,

    /// Postprocess but do not persist; print the batch as JSON
    #[arg(long)]
    pub dry_run: bool,

    /// Lower inclusive date bound (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub min_date: Option<String>,

    /// Upper inclusive date bound (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub max_date: Option<String>,

    /// Site login username (activates the authentication gate)
    #[arg(long)]
    pub username: Option<String>,

    /// Site login password
    #[arg(long)]
    pub password: Option<String>,

    /// Fixed delay before every request, in milliseconds
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub pace_ms: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Builds the validated run configuration from the parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] for unparsable date bounds or
    /// inconsistent option combinations.
    pub fn run_options(&self) -> Result<RunOptions, PipelineError> {
        let min_datetime = self.parse_bound(self.min_date.as_deref(), "min-date")?;
        let max_datetime = self.parse_bound(self.max_date.as_deref(), "max-date")?;

        let options = RunOptions {
            project: self.project,
            articleset: self.articleset,
            api_host: self.api_host.clone(),
            api_user: self.api_user.clone(),
            api_password: self.api_password.clone(),
            log_errors: self.log_errors,
            dry_run: self.dry_run,
            min_datetime,
            max_datetime,
            username: self.username.clone(),
            password: self.password.clone(),
        };
        options.validate()?;
        Ok(options)
    }

    fn parse_bound(
        &self,
        raw: Option<&str>,
        flag: &str,
    ) -> Result<Option<chrono::DateTime<chrono::Utc>>, PipelineError> {
        match raw {
            None => Ok(None),
            Some(raw) => parse_datetime(raw).map(Some).ok_or_else(|| {
                PipelineError::config(format!("--{flag} '{raw}' is not a recognized date"))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: [&str; 9] = [
        "harvester",
        "--project",
        "1",
        "--articleset",
        "2",
        "--api-host",
        "https://amcat.example.org",
        "--api-user",
        "api",
    ];

    fn parse(extra: &[&str]) -> Args {
        let mut argv: Vec<&str> = BASE.to_vec();
        argv.extend_from_slice(&["--api-password", "secret"]);
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_minimal_args_build_valid_options() {
        let args = parse(&[]);
        let options = args.run_options().unwrap();
        assert_eq!(options.project, 1);
        assert_eq!(options.articleset, 2);
        assert!(!options.dry_run);
        assert!(options.date_range().unwrap().is_none());
        assert!(options.credentials().is_none());
    }

    #[test]
    fn test_cli_missing_required_flag_is_a_parse_error() {
        let result = Args::try_parse_from(["harvester", "--project", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_date_bounds_are_parsed() {
        let args = parse(&["--min-date", "2024-03-01", "--max-date", "2024-03-05"]);
        let options = args.run_options().unwrap();
        let range = options.date_range().unwrap().unwrap();
        assert_eq!(range.days().len(), 5);
    }

    #[test]
    fn test_cli_bad_date_is_a_config_error() {
        let args = parse(&["--min-date", "soonish", "--max-date", "2024-03-05"]);
        let error = args.run_options().unwrap_err();
        assert!(matches!(error, PipelineError::Config { .. }));
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = parse(&["-vv"]);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let result = Args::try_parse_from(["harvester", "--help"]);
        let error = result.unwrap_err();
        assert_eq!(error.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
