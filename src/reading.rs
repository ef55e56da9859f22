use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::Locale;

/// The locale the meter exports are written in
const INPUT_LOCALE: Locale = Locale::FINNISH;

/// One time-stamped measurement taken by an energy meter
///
/// Rows are decoded by position:
/// `timestamp;consumption;production;temperature`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MeterReading {
    #[serde(deserialize_with = "deserialize_timestamp")]
    timestamp: NaiveDateTime,
    /// kWh
    #[serde(deserialize_with = "deserialize_decimal")]
    consumption: f64,
    /// kWh
    #[serde(deserialize_with = "deserialize_decimal")]
    production: f64,
    /// °C
    #[serde(deserialize_with = "deserialize_decimal")]
    temperature: f64,
}

impl MeterReading {
    pub fn new(timestamp: NaiveDateTime, consumption: f64, production: f64, temperature: f64) -> Self {
        Self {
            timestamp,
            consumption,
            production,
            temperature,
        }
    }

    /// The moment the reading was taken, in the meter's wall clock time
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// The calendar day the reading belongs to
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn consumption(&self) -> f64 {
        self.consumption
    }

    pub fn production(&self) -> f64 {
        self.production
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}

/// Parses the ISO-8601 timestamps found in meter exports
///
/// Offsets are accepted but dropped; the reading keeps its local wall time.
/// A bare date is read as midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.naive_local());
    }
    if let Ok(timestamp) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(timestamp.naive_local());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where D: serde::Deserializer<'de>
{
    let value = String::deserialize(deserializer)?;
    parse_timestamp(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{value}'")))
}

fn deserialize_decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where D: serde::Deserializer<'de>
{
    let value = String::deserialize(deserializer)?;
    INPUT_LOCALE
        .parse_number(&value)
        .map_err(|e| serde::de::Error::custom(format!("invalid decimal '{value}': {e}")))
}
