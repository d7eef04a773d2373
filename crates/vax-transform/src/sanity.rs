//! Cycle-fatal sanity checks over the enriched table.
//!
//! Negative cumulative counts, negative daily rates, or an implausibly
//! large smoothed rate indicate upstream corruption severe enough to halt
//! publication rather than silently propagate.

use vax_model::{EnrichedRow, Result, VaxError};

/// Hard ceiling on the smoothed daily rate per million people.
pub const MAX_DAILY_PER_MILLION: f64 = 120_000.0;

/// Reject the whole run if any enriched row is out of bounds.
pub fn check_sanity(rows: &[EnrichedRow]) -> Result<()> {
    for row in rows {
        if let Some(total) = row.total_vaccinations
            && total < 0
        {
            return Err(VaxError::SanityCeiling(format!(
                "{} has negative total_vaccinations ({total}) on {}",
                row.location, row.date
            )));
        }
        if let Some(daily) = row.daily_vaccinations
            && daily < 0
        {
            return Err(VaxError::SanityCeiling(format!(
                "{} has negative daily_vaccinations ({daily}) on {}",
                row.location, row.date
            )));
        }
        if let Some(rate) = row.daily_vaccinations_per_million
            && rate > MAX_DAILY_PER_MILLION
        {
            return Err(VaxError::SanityCeiling(format!(
                "{} has daily_vaccinations_per_million {rate} on {}, above the {MAX_DAILY_PER_MILLION} ceiling",
                row.location, row.date
            )));
        }
    }
    Ok(())
}
