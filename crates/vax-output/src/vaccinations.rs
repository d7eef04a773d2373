//! Long-format vaccinations table: one row per (location, date).

use std::io::Write;

use vax_model::{EnrichedRow, Result};

/// Write the enriched rows as CSV.
///
/// Integer-typed columns serialize from `Option<i64>`, so nulls are empty
/// fields and present values never carry float artifacts like `3.0`.
pub fn write_vaccinations_csv<W: Write>(rows: &[EnrichedRow], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
