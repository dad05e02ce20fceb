use std::path::PathBuf;

use jiff::civil::Date;

use crate::service::{RateRequest, RateSource};
use crate::store::{ErrorLog, Store};
use crate::validate::{SERVICE_PERIOD_END, SERVICE_PERIOD_START, is_within_service_period};
use crate::{Error, dates};

/// Outcome counts of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
}

impl Summary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs lookups one at a time: fetch, then save or log.
pub struct Fetcher<S> {
    source: S,
    store: Store,
    log: ErrorLog,
    warn_outside_range: bool,
}

impl<S: RateSource> Fetcher<S> {
    pub fn new(source: S, store: Store, log: ErrorLog, warn_outside_range: bool) -> Self {
        Self {
            source,
            store,
            log,
            warn_outside_range,
        }
    }

    #[cfg(test)]
    fn source(&self) -> &S {
        &self.source
    }

    pub fn log(&self) -> &ErrorLog {
        &self.log
    }

    /// Fetch and persist a single rate. Failures are logged before being returned.
    pub fn fetch_one(&self, request: &RateRequest) -> Result<PathBuf, Error> {
        if let Some(date) = request.date {
            self.warn_if_outside_period(date);
        }

        let result = self
            .source
            .fetch(request)
            .and_then(|data| self.store.save(request, &data));

        match result {
            Ok(path) => {
                println!("Saved {}", path.display());
                Ok(path)
            }
            Err(e) => {
                self.log.record(request, &e);
                Err(e)
            }
        }
    }

    /// Fetch `count` evenly spaced dates in `start..=end`, continuing past failures.
    pub fn fetch_batch(
        &self,
        from: &str,
        to: &str,
        start: Date,
        end: Date,
        count: usize,
    ) -> Result<Summary, Error> {
        let dates = dates::evenly_spaced_dates(start, end, count)?;
        println!("Batch: {from}/{to} {start}..{end} in {} steps", dates.len());

        let mut summary = Summary::default();
        for date in dates {
            let request = RateRequest {
                from: from.to_string(),
                to: to.to_string(),
                date: Some(date),
            };
            match self.fetch_one(&request) {
                Ok(_) => summary.succeeded += 1,
                Err(_) => summary.failed += 1,
            }
        }

        println!(
            "Batch finished: {} succeeded, {} failed",
            summary.succeeded, summary.failed
        );
        Ok(summary)
    }

    /// Returns whether a warning was emitted.
    fn warn_if_outside_period(&self, date: Date) -> bool {
        let outside = self.warn_outside_range && !is_within_service_period(date);
        if outside {
            tracing::warn!(
                "{date} is outside the service period {SERVICE_PERIOD_START}..{SERVICE_PERIOD_END}"
            );
        }
        outside
    }
}
