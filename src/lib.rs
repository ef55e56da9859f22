pub use self::{
    aggregate::{aggregate, Aggregate, ReportRequest},
    loader::{load_readings, load_readings_from_path, ParseError},
    locale::{DateStyle, Locale},
    reading::{parse_timestamp, MeterReading},
    report::{format as format_report, title as report_title, FileSink, PersistError, Report, ReportSink},
    session::{Effect, InputError, ReportSettings, Session, State},
};

mod aggregate;
mod loader;
mod locale;
mod reading;
mod report;
mod session;
