use jiff::ToSpan;
use jiff::civil::Date;

use crate::Error;

/// Largest number of dates a single range may be split into.
pub const MAX_DATES: usize = 10_000;

/// Spread `count` dates evenly over `start..=end`.
///
/// Intermediate points are rounded to the nearest whole day (ties away from zero). The first
/// and last entries are always exactly `start` and `end`. Short ranges can yield repeated
/// dates; they are kept so the result always holds `count` entries.
pub fn evenly_spaced_dates(start: Date, end: Date, count: usize) -> Result<Vec<Date>, Error> {
    if !(2..=MAX_DATES).contains(&count) {
        return Err(Error::InvalidRange(format!(
            "a range is split into 2 to {MAX_DATES} dates (got {count})"
        )));
    }
    if start > end {
        return Err(Error::InvalidRange(format!(
            "end date {end} is before start date {start}"
        )));
    }

    let total_days = i64::from((end - start).get_days());
    let count = i64::try_from(count)
        .map_err(|_| Error::InvalidRange(format!("too many dates requested ({count})")))?;
    let steps = count - 1;

    Ok((0..count)
        .map(|i| match i {
            0 => start,
            i if i == steps => end,
            // round(i * total / steps) without going through floats
            i => start + ((2 * i * total_days + steps) / (2 * steps)).days(),
        })
        .collect())
}
