use chrono::NaiveDate;

/// One row of the enriched long-format table the cycle publishes: core
/// metrics plus derived daily rates and per-capita variants.
///
/// Integer-typed columns stay `Option<i64>` end to end so exports never
/// carry float artifacts like `3.0`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnrichedRow {
    pub location: String,
    pub iso_code: Option<String>,
    pub date: NaiveDate,
    pub total_vaccinations: Option<i64>,
    pub people_vaccinated: Option<i64>,
    pub people_fully_vaccinated: Option<i64>,
    pub total_boosters: Option<i64>,
    /// Raw day-over-day difference; null across reporting gaps wider than
    /// one day.
    pub daily_vaccinations_raw: Option<i64>,
    /// 7-day trailing mean of the interpolated daily rate.
    pub daily_vaccinations: Option<i64>,
    pub total_vaccinations_per_hundred: Option<f64>,
    pub people_vaccinated_per_hundred: Option<f64>,
    pub people_fully_vaccinated_per_hundred: Option<f64>,
    pub total_boosters_per_hundred: Option<f64>,
    pub daily_vaccinations_per_million: Option<f64>,
}
