use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use jiff::civil::Date;

pub use error::Error;
pub use fetcher::{Fetcher, Summary};
pub use service::{HttpRateSource, RateData, RateRequest, RateSource};
pub use store::{ErrorLog, Store};

pub mod dates;
mod error;
mod fetcher;
pub mod service;
mod store;
pub mod validate;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_API_KEY: &str = "EXAMPLE_API_KEY";

/// Fetch exchange rates from the currency service and save each answer as a JSON file.
///
/// Looks up a single date with `--date`, or a batch of evenly spaced dates with
/// `--start-date`, `--end-date` and `--num-dates`. Failures are appended to the error log.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// Currency to convert from (e.g. USD)
    #[arg(long = "from", value_name = "CODE")]
    pub from: String,
    /// Currency to convert to (e.g. EUR)
    #[arg(long = "to", value_name = "CODE")]
    pub to: String,
    /// Date of the rate (format: YYYY-MM-DD); the latest rate when omitted
    #[arg(long, value_name = "DATE")]
    pub date: Option<String>,

    /// First date of a batch (format: YYYY-MM-DD)
    #[arg(long, value_name = "DATE", conflicts_with = "date", requires_all = ["end_date", "num_dates"])]
    pub start_date: Option<String>,
    /// Last date of a batch (format: YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "start_date")]
    pub end_date: Option<String>,
    /// Number of evenly spaced dates in a batch (at least 5)
    #[arg(long, value_name = "N", requires = "start_date")]
    pub num_dates: Option<usize>,

    /// Base URL of the exchange rate service
    #[arg(long, env = "API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
    /// Shared key sent with every request
    #[arg(long, env = "API_KEY", default_value = DEFAULT_API_KEY, hide_env_values = true)]
    pub api_key: String,
    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 15)]
    pub timeout: u64,

    /// Directory for the saved JSON files
    #[arg(long, value_name = "DIR", default_value = "data")]
    pub data_dir: PathBuf,
    /// File failures are appended to
    #[arg(long, value_name = "FILE", default_value = "error.log")]
    pub error_log: PathBuf,

    /// Warn when a date is outside the service's known period (2025-01-01..2025-09-15)
    #[clap(short, long)]
    pub warn_outside_range: bool,
}

/// Everything a run needs besides the query itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub data_dir: PathBuf,
    pub error_log: PathBuf,
    pub warn_outside_range: bool,
}

/// A validated lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub from: String,
    pub to: String,
    pub mode: Mode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Single(Option<Date>),
    Batch { start: Date, end: Date, count: usize },
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.timeout),
            data_dir: self.data_dir.clone(),
            error_log: self.error_log.clone(),
            warn_outside_range: self.warn_outside_range,
        }
    }

    /// Validate the currencies and dates given on the command line.
    pub fn query(&self) -> Result<Query, Error> {
        let from = validate::validate_currency(&self.from, "from")?;
        let to = validate::validate_currency(&self.to, "to")?;

        let mode = match (&self.start_date, &self.end_date, self.num_dates) {
            (Some(start), Some(end), Some(count)) => {
                let start = validate::parse_date(start, "start-date")?;
                let end = validate::parse_date(end, "end-date")?;
                validate::check_batch(start, end, count)?;
                Mode::Batch { start, end, count }
            }
            (None, None, None) => Mode::Single(
                self.date
                    .as_deref()
                    .map(|d| validate::parse_date(d, "date"))
                    .transpose()?,
            ),
            // clap's `requires` rules keep parsed input out of here; a hand-built Cli is not
            _ => {
                return Err(Error::InvalidRange(
                    "batch mode needs --start-date, --end-date and --num-dates".to_string(),
                ));
            }
        };

        Ok(Query { from, to, mode })
    }

    /// What the run is about, for log lines written before validation succeeds.
    fn subject(&self) -> String {
        let when = match (&self.start_date, &self.end_date) {
            (Some(start), Some(end)) => format!("{start}..{end}"),
            _ => self.date.clone().unwrap_or_else(|| "latest".to_string()),
        };
        format!("{}/{} {when}", self.from, self.to)
    }
}

/// Run the lookup described by `cli` against the HTTP service.
pub fn run(cli: &Cli) -> ExitCode {
    let config = cli.config();
    let source = HttpRateSource::new(&config.base_url, &config.api_key, config.timeout);
    if run_with(cli, &config, source).is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Run the lookup described by `cli` against any rate source.
///
/// Invalid input counts as one failure and is logged like a failed request.
pub fn run_with<S: RateSource>(cli: &Cli, config: &Config, source: S) -> Summary {
    let fetcher = Fetcher::new(
        source,
        Store::new(&config.data_dir),
        ErrorLog::new(&config.error_log),
        config.warn_outside_range,
    );
    let failed = Summary {
        succeeded: 0,
        failed: 1,
    };

    let query = match cli.query() {
        Ok(query) => query,
        Err(e) => {
            fetcher.log().record(cli.subject(), &e);
            return failed;
        }
    };

    match query.mode {
        Mode::Single(date) => {
            let request = RateRequest {
                from: query.from,
                to: query.to,
                date,
            };
            match fetcher.fetch_one(&request) {
                Ok(_) => Summary {
                    succeeded: 1,
                    failed: 0,
                },
                Err(_) => failed,
            }
        }
        Mode::Batch { start, end, count } => {
            match fetcher.fetch_batch(&query.from, &query.to, start, end, count) {
                Ok(summary) => summary,
                Err(e) => {
                    fetcher.log().record(cli.subject(), &e);
                    failed
                }
            }
        }
    }
}
