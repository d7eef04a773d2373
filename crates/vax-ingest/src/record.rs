//! Adapter input contract: coercing a raw JSON record into a typed
//! [`Observation`].
//!
//! Adapters emit one JSON object per observation. A record with a non-string
//! `location`/`vaccine`/`source_url`, a malformed date, or a non-numeric
//! metric fails the whole call; nothing is partially accepted.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use vax_model::{Observation, Result, VaxError};

/// Keys an adapter record is allowed to carry.
const KNOWN_FIELDS: [&str; 8] = [
    "location",
    "date",
    "vaccine",
    "source_url",
    "total_vaccinations",
    "people_vaccinated",
    "people_fully_vaccinated",
    "total_boosters",
];

/// Parse one adapter record into a typed observation.
pub fn parse_record(value: &Value) -> Result<Observation> {
    let object = value
        .as_object()
        .ok_or_else(|| VaxError::Schema("record must be a JSON object".to_string()))?;

    let location = required_str(object, "location")?;
    let date = parse_date(&required_str(object, "date")?)?;
    let vaccine = split_vaccines(&required_str(object, "vaccine")?);
    if vaccine.is_empty() {
        return Err(VaxError::Schema(
            "field `vaccine` must name at least one vaccine".to_string(),
        ));
    }
    let source_url = required_str(object, "source_url")?;

    Ok(Observation {
        location,
        date,
        vaccine,
        source_url,
        total_vaccinations: optional_count(object, "total_vaccinations")?,
        people_vaccinated: optional_count(object, "people_vaccinated")?,
        people_fully_vaccinated: optional_count(object, "people_fully_vaccinated")?,
        total_boosters: optional_count(object, "total_boosters")?,
    })
}

/// Keys present on the record but not part of the input contract.
///
/// Extra fields are tolerated; strict callers surface them as issues.
pub fn unknown_fields(value: &Value) -> Vec<String> {
    let Some(object) = value.as_object() else {
        return Vec::new();
    };
    object
        .keys()
        .filter(|key| !KNOWN_FIELDS.contains(&key.as_str()))
        .cloned()
        .collect()
}

/// Parse an ISO-8601 calendar date.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| VaxError::Schema(format!("invalid date `{text}` (expected YYYY-MM-DD)")))
}

/// Split a comma-joined vaccine string into deduplicated, sorted names.
pub fn split_vaccines(joined: &str) -> Vec<String> {
    let names: BTreeSet<String> = joined
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect();
    names.into_iter().collect()
}

fn required_str(object: &Map<String, Value>, key: &str) -> Result<String> {
    match object.get(key) {
        None | Some(Value::Null) => Err(VaxError::Schema(format!(
            "missing required field `{key}`"
        ))),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(VaxError::Schema(format!(
            "field `{key}` must be a string, got {other}"
        ))),
    }
}

fn optional_count(object: &Map<String, Value>, key: &str) -> Result<Option<i64>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => {
            let value = number.as_i64().ok_or_else(|| {
                VaxError::Schema(format!("field `{key}` must be an integer, got {number}"))
            })?;
            if value < 0 {
                return Err(VaxError::Schema(format!(
                    "field `{key}` must be non-negative, got {value}"
                )));
            }
            Ok(Some(value))
        }
        Some(other) => Err(VaxError::Schema(format!(
            "field `{key}` must be a number or null, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_complete_record() {
        let record = json!({
            "location": "Testland",
            "date": "2021-01-02",
            "vaccine": "Pfizer/BioNTech, Moderna, Pfizer/BioNTech",
            "source_url": "https://health.test/daily",
            "total_vaccinations": 150,
            "people_vaccinated": 120,
            "people_fully_vaccinated": null,
        });
        let obs = parse_record(&record).unwrap();
        assert_eq!(obs.location, "Testland");
        assert_eq!(obs.vaccine, vec!["Moderna", "Pfizer/BioNTech"]);
        assert_eq!(obs.total_vaccinations, Some(150));
        assert_eq!(obs.people_fully_vaccinated, None);
        assert_eq!(obs.total_boosters, None);
    }

    #[test]
    fn rejects_non_string_location() {
        let record = json!({
            "location": 42,
            "date": "2021-01-02",
            "vaccine": "Moderna",
            "source_url": "https://health.test"
        });
        assert!(parse_record(&record).is_err());
    }

    #[test]
    fn rejects_non_numeric_metric() {
        let record = json!({
            "location": "Testland",
            "date": "2021-01-02",
            "vaccine": "Moderna",
            "source_url": "https://health.test",
            "total_vaccinations": "many"
        });
        assert!(parse_record(&record).is_err());
    }

    #[test]
    fn rejects_negative_metric() {
        let record = json!({
            "location": "Testland",
            "date": "2021-01-02",
            "vaccine": "Moderna",
            "source_url": "https://health.test",
            "total_vaccinations": -5
        });
        assert!(parse_record(&record).is_err());
    }

    #[test]
    fn rejects_malformed_date() {
        assert!(parse_date("02/01/2021").is_err());
        assert!(parse_date("2021-13-40").is_err());
        assert_eq!(
            parse_date("2021-01-02").unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 2).unwrap()
        );
    }

    #[test]
    fn flags_unknown_fields() {
        let record = json!({
            "location": "Testland",
            "date": "2021-01-02",
            "vaccine": "Moderna",
            "source_url": "https://health.test",
            "scraped_at": "2021-01-02T10:00:00Z"
        });
        assert_eq!(unknown_fields(&record), vec!["scraped_at"]);
    }
}
