use chrono::{Datelike, NaiveDate};

use crate::MeterReading;

/// Describes which readings a report covers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportRequest {
    /// Every reading from `start` to `end`, both days included
    ///
    /// A range with `start` after `end` matches nothing.
    DateRange { start: NaiveDate, end: NaiveDate },
    /// Every reading of the given month, in any year
    ///
    /// Months outside `1..=12` match nothing.
    Month(u32),
    /// Every reading in the dataset
    ///
    /// The dataset is assumed to span a single year, so no year is checked.
    FullYear,
}

impl ReportRequest {
    /// Whether `reading` is covered by this request
    pub fn matches(&self, reading: &MeterReading) -> bool {
        match *self {
            ReportRequest::DateRange { start, end } => (start..=end).contains(&reading.date()),
            ReportRequest::Month(month) => reading.date().month() == month,
            ReportRequest::FullYear => true,
        }
    }
}

/// Summed and averaged metrics over a set of readings
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aggregate {
    /// kWh
    pub total_consumption: f64,
    /// kWh
    pub total_production: f64,
    /// °C, `0.0` when no reading matched
    pub average_temperature: f64,
    /// The number of readings that went into the aggregate
    pub count: usize,
}

impl Aggregate {
    /// Aggregates every reading yielded by `readings`, in order
    pub fn from_readings<'a, I>(readings: I) -> Self
        where I: IntoIterator<Item = &'a MeterReading>
    {
        let (total_consumption, total_production, temperature_sum, count) = readings
            .into_iter()
            .fold((0.0, 0.0, 0.0, 0), |(consumption, production, temperature, count), reading| {
                (
                    consumption + reading.consumption(),
                    production + reading.production(),
                    temperature + reading.temperature(),
                    count + 1,
                )
            });

        let average_temperature = match count {
            0 => 0.0,
            count => temperature_sum / count as f64,
        };

        Self {
            total_consumption,
            total_production,
            average_temperature,
            count,
        }
    }
}

/// Aggregates all readings matched by `request`
///
/// An empty selection is not an error, it yields zero totals.
pub fn aggregate(readings: &[MeterReading], request: &ReportRequest) -> Aggregate {
    let aggregate = Aggregate::from_readings(readings.iter().filter(|reading| request.matches(reading)));
    tracing::debug!(?request, matched = aggregate.count, total = readings.len(), "readings aggregated");
    aggregate
}
