use jiff::civil::{Date, date};

use crate::Error;
use crate::dates::MAX_DATES;

/// First date the service is known to have rates for.
pub const SERVICE_PERIOD_START: Date = date(2025, 1, 1);
/// Last date the service is known to have rates for.
pub const SERVICE_PERIOD_END: Date = date(2025, 9, 15);

/// Smallest number of dates accepted in batch mode.
pub const MIN_BATCH_DATES: usize = 5;

/// Accept a currency code made of exactly three uppercase ASCII letters.
pub fn validate_currency(code: &str, field: &'static str) -> Result<String, Error> {
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(code.to_string())
    } else {
        Err(Error::InvalidCurrency {
            field,
            value: code.to_string(),
        })
    }
}

/// Parse a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str, field: &'static str) -> Result<Date, Error> {
    let invalid = || Error::InvalidDate {
        field,
        value: value.to_string(),
    };

    // jiff also accepts compact and datetime forms, so check the shape first
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(invalid());
    }

    value.parse::<Date>().map_err(|_| invalid())
}

/// Check the batch parameters before any dates are generated.
pub fn check_batch(start: Date, end: Date, num_dates: usize) -> Result<(), Error> {
    if !(MIN_BATCH_DATES..=MAX_DATES).contains(&num_dates) {
        return Err(Error::InvalidRange(format!(
            "num-dates must be between {MIN_BATCH_DATES} and {MAX_DATES} (got {num_dates})"
        )));
    }
    if start > end {
        return Err(Error::InvalidRange(format!(
            "end date {end} is before start date {start}"
        )));
    }
    Ok(())
}

pub fn is_within_service_period(d: Date) -> bool {
    (SERVICE_PERIOD_START..=SERVICE_PERIOD_END).contains(&d)
}
