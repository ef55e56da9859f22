use std::{io, path::Path};

use crate::MeterReading;

/// The number of columns every data row must have
const FIELD_COUNT: usize = 4;

/// Possible errors to occur while loading meter readings
///
/// Loading stops at the first malformed row, so no partial
/// dataset is ever handed out.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Could not open the input file: {0}")]
    Io(#[from] io::Error),
    #[error("Line {line}: the input could not be read: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },
    #[error("Line {line}: expected 4 fields, found {found}")]
    FieldCount { line: u64, found: usize },
    #[error("Line {line}: {message}")]
    Field { line: u64, message: String },
}

impl ParseError {
    /// The 1-based line of the offending row, if the error belongs to one
    pub fn line(&self) -> Option<u64> {
        match self {
            ParseError::Io(_) => None,
            ParseError::Csv { line, .. }
            | ParseError::FieldCount { line, .. }
            | ParseError::Field { line, .. } => Some(*line),
        }
    }
}

/// Loads all readings from a delimited source with one header row
pub fn load_readings<R: io::Read>(source: R, delimiter: u8) -> Result<Vec<MeterReading>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(source);

    let mut readings = Vec::new();
    let mut record = csv::StringRecord::new();
    loop {
        let more = reader.read_record(&mut record).map_err(|source| ParseError::Csv {
            line: source.position().map_or(0, csv::Position::line),
            source,
        })?;
        if !more {
            break;
        }

        let line = record.position().map_or(0, csv::Position::line);
        if record.len() != FIELD_COUNT {
            return Err(ParseError::FieldCount { line, found: record.len() });
        }

        // records are mapped by position, the header names are free-form
        let reading = record
            .deserialize::<MeterReading>(None)
            .map_err(|e| ParseError::Field { line, message: field_message(&e) })?;
        readings.push(reading);
    }

    tracing::info!(
        rows = readings.len(),
        first = ?readings.first().map(MeterReading::timestamp),
        last = ?readings.last().map(MeterReading::timestamp),
        "meter readings loaded",
    );
    Ok(readings)
}

/// Loads all readings from the file at `path`
pub fn load_readings_from_path<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Vec<MeterReading>, ParseError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening meter readings");
    let file = std::fs::File::open(path)?;
    load_readings(io::BufReader::new(file), delimiter)
}

fn field_message(error: &csv::Error) -> String {
    match error.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
        _ => error.to_string(),
    }
}
