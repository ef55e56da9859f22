use std::{fmt, fs, io::Write, path::{Path, PathBuf}};

use crate::{Aggregate, Locale, ReportRequest};

const SEPARATOR: &str = "-----------------------------------------------------";

/// A rendered report
///
/// A report is a fixed block of five lines: a separator rule, the title,
/// and one line per metric. The same block is printed and persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    lines: Vec<String>,
}

impl Report {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Renders an aggregate under the given title
pub fn format(aggregate: &Aggregate, title: &str, locale: &Locale) -> Report {
    let lines = vec![
        SEPARATOR.to_owned(),
        title.to_owned(),
        format!("- Total consumption: {} kWh", locale.format_number(aggregate.total_consumption)),
        format!("- Total production: {} kWh", locale.format_number(aggregate.total_production)),
        format!("- Average temperature: {} °C", locale.format_number(aggregate.average_temperature)),
    ];

    Report { lines }
}

/// The title line of the report answering `request`
///
/// `year_label` names the year a full year report is presented as.
pub fn title(request: &ReportRequest, locale: &Locale, year_label: i32) -> String {
    match *request {
        ReportRequest::DateRange { start, end } => format!(
            "Report for the period {}–{}",
            locale.format_date(start),
            locale.format_date(end),
        ),
        ReportRequest::Month(month) => {
            let name = u8::try_from(month)
                .ok()
                .and_then(|month| chrono::Month::try_from(month).ok())
                .map(|month| month.name().to_owned())
                .unwrap_or_else(|| month.to_string());
            format!("Report for the month: {name}")
        }
        ReportRequest::FullYear => format!("Report for the year: {year_label}"),
    }
}

/// Possible errors to occur while persisting a report
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Could not create a temporary file next to {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write the report: {0}")]
    Write(#[source] std::io::Error),
    #[error("Could not replace {path}: {source}")]
    Replace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A destination reports can be persisted to
///
/// Every call replaces what an earlier call persisted.
pub trait ReportSink: fmt::Display {
    fn persist(&mut self, report: &Report) -> Result<(), PersistError>;
}

/// Persists reports into a single text file
///
/// The report is written to a temporary file in the same directory which is
/// then renamed over the destination, so the destination either holds the
/// previous report or the new one in full. An existing destination keeps its
/// permissions, and a symlinked destination is written through.
#[derive(Clone, Debug)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// The file the report ends up in, following a symlinked destination
    fn target(&self) -> PathBuf {
        match fs::symlink_metadata(&self.path) {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone())
            }
            _ => self.path.clone(),
        }
    }
}

/// The permissions a freshly written report should carry
fn report_permissions(target: &Path) -> Option<fs::Permissions> {
    match fs::metadata(target) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => new_file_permissions(),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;

    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

impl fmt::Display for FileSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl ReportSink for FileSink {
    fn persist(&mut self, report: &Report) -> Result<(), PersistError> {
        let target = self.target();
        let directory = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = tempfile::NamedTempFile::new_in(directory).map_err(|source| PersistError::Create {
            path: target.clone(),
            source,
        })?;
        if let Some(permissions) = report_permissions(&target) {
            file.as_file().set_permissions(permissions).map_err(PersistError::Write)?;
        }
        write!(file, "{report}").map_err(PersistError::Write)?;
        file.as_file().sync_all().map_err(PersistError::Write)?;
        file.persist(&target).map_err(|e| PersistError::Replace {
            path: target.clone(),
            source: e.error,
        })?;

        tracing::info!(path = %target.display(), "report persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::DateStyle;

    fn aggregate(total_consumption: f64, total_production: f64, average_temperature: f64) -> Aggregate {
        Aggregate {
            total_consumption,
            total_production,
            average_temperature,
            count: 1,
        }
    }

    #[test]
    fn five_line_block() {
        let report = format(&aggregate(3.0, 1.5, 15.0), "Report for the year: 2025", &Locale::FINNISH);
        assert_eq!(
            report.lines(),
            [
                SEPARATOR,
                "Report for the year: 2025",
                "- Total consumption: 3,00 kWh",
                "- Total production: 1,50 kWh",
                "- Average temperature: 15,00 °C",
            ],
        );
    }

    #[test]
    fn format_is_deterministic() {
        let aggregate = aggregate(1234.5, 0.005, -2.345);
        let first = format(&aggregate, "title", &Locale::FINNISH);
        let second = format(&aggregate, "title", &Locale::FINNISH);
        assert_eq!(first, second);

        for line in &first.lines()[2..] {
            let number = line
                .split_whitespace()
                .find(|word| word.contains(','))
                .unwrap();
            let (_, fraction) = number.split_once(',').unwrap();
            assert_eq!(fraction.len(), 2, "{line}");
            assert!(!number.contains('.'), "{line}");
        }
    }

    #[test]
    fn display_terminates_every_line() {
        let report = format(&Aggregate::default(), "title", &Locale::FINNISH);
        let text = report.to_string();
        assert_eq!(text.lines().count(), 5);
        assert!(text.ends_with("°C\n"));
    }

    #[test]
    fn titles() {
        let locale = Locale::FINNISH;
        let range = ReportRequest::DateRange {
            start: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 12, 24).unwrap(),
        };
        assert_eq!(title(&range, &locale, 2025), "Report for the period 5.3.2025–24.12.2025");
        assert_eq!(
            title(&range, &locale.with_date_style(DateStyle::ZeroPadded), 2025),
            "Report for the period 05.03.2025–24.12.2025",
        );
        assert_eq!(title(&ReportRequest::Month(1), &locale, 2025), "Report for the month: January");
        assert_eq!(title(&ReportRequest::Month(12), &locale, 2025), "Report for the month: December");
        assert_eq!(title(&ReportRequest::Month(13), &locale, 2025), "Report for the month: 13");
        assert_eq!(title(&ReportRequest::FullYear, &locale, 2024), "Report for the year: 2024");
    }

    #[test]
    fn persisting_twice_keeps_only_the_latest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        let mut sink = FileSink::new(&path);

        let first = format(&aggregate(1.0, 2.0, 3.0), "Report for the month: January", &Locale::FINNISH);
        let second = format(&aggregate(4.0, 5.0, 6.0), "Report for the year: 2025", &Locale::FINNISH);
        sink.persist(&first).unwrap();
        sink.persist(&second).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, second.to_string());
        assert!(!written.contains("January"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn persisting_keeps_the_destination_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        std::fs::write(&path, "old report\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        let mut sink = FileSink::new(&path);
        sink.persist(&format(&aggregate(1.0, 2.0, 3.0), "title", &Locale::FINNISH)).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
        assert!(std::fs::read_to_string(&path).unwrap().contains("title"));
    }

    #[cfg(unix)]
    #[test]
    fn new_reports_are_not_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        let mut sink = FileSink::new(&path);
        sink.persist(&format(&Aggregate::default(), "title", &Locale::FINNISH)).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_destination_is_written_through() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("reports").join("latest.txt");
        std::fs::create_dir(target.parent().unwrap()).unwrap();
        std::fs::write(&target, "old report\n").unwrap();
        let link = dir.path().join("report.txt");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let report = format(&aggregate(4.0, 5.0, 6.0), "Report for the year: 2025", &Locale::FINNISH);
        FileSink::new(&link).persist(&report).unwrap();

        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), report.to_string());
    }

    #[test]
    fn persist_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.txt");
        let mut sink = FileSink::new(&path);

        let err = sink.persist(&format(&Aggregate::default(), "title", &Locale::FINNISH)).unwrap_err();
        assert!(matches!(err, PersistError::Create { .. }));
        assert!(!path.exists());
        assert_eq!(sink.to_string(), path.display().to_string());
    }
}
