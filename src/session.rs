use std::{fmt, io};

use chrono::NaiveDate;

use crate::{aggregate, report, Locale, MeterReading, Report, ReportRequest, ReportSink};

/// Possible errors in user input while building a report
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid choice. Try again.")]
    Choice,
    #[error("Invalid date '{0}', expected dd.mm.yyyy. Try again.")]
    Date(String),
    #[error("Invalid month '{0}', expected a number. Try again.")]
    Month(String),
}

/// How reports are presented
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportSettings {
    pub locale: Locale,
    /// The year full year reports are labelled with
    pub year_label: i32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            locale: Locale::FINNISH,
            year_label: 2025,
        }
    }
}

/// The states of an interactive report session
#[derive(Clone, Debug, PartialEq)]
pub enum State {
    /// Waiting for a report type, or exit
    MainMenu,
    /// Waiting for the first day of a daily report
    StartDate,
    /// Waiting for the last day of a daily report
    EndDate { start: NaiveDate },
    /// Waiting for the month of a monthly report
    Month,
    /// A report was shown and can be persisted, replaced or left
    PostMenu { report: Report },
    /// The session is over
    Exit,
}

impl State {
    /// The text asking the user for the input this state waits for
    pub fn prompt(&self, settings: &ReportSettings, sink: &dyn fmt::Display) -> String {
        match self {
            State::MainMenu => format!(
                "\nChoose a report type:\n\
                 1) Daily summary for a date range\n\
                 2) Monthly summary\n\
                 3) Full year {} summary\n\
                 4) Exit\n\
                 Enter choice: ",
                settings.year_label,
            ),
            State::StartDate => "Enter start date (dd.mm.yyyy): ".to_owned(),
            State::EndDate { .. } => "Enter end date (dd.mm.yyyy): ".to_owned(),
            State::Month => "Enter month number (1–12): ".to_owned(),
            State::PostMenu { .. } => format!(
                "\nWhat would you like to do next?\n\
                 1) Write report to {sink}\n\
                 2) Create a new report\n\
                 3) Exit\n\
                 Enter choice: ",
            ),
            State::Exit => String::new(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            State::MainMenu => "main-menu",
            State::StartDate => "start-date",
            State::EndDate { .. } => "end-date",
            State::Month => "month",
            State::PostMenu { .. } => "post-menu",
            State::Exit => "exit",
        }
    }
}

/// What the driver of a session has to do after a transition
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    None,
    /// Tell the user something, typically why the input was rejected
    Notice(String),
    /// Show a freshly built report
    Display(Report),
    /// Hand the report to the persistence sink
    Persist(Report),
    /// Say goodbye
    Exit,
}

/// An interactive report session over a loaded dataset
///
/// The dataset is read-only for the lifetime of the session.
#[derive(Debug)]
pub struct Session {
    readings: Vec<MeterReading>,
    settings: ReportSettings,
}

impl Session {
    pub fn new(readings: Vec<MeterReading>, settings: ReportSettings) -> Self {
        Self { readings, settings }
    }

    pub fn readings(&self) -> &[MeterReading] {
        &self.readings
    }

    /// Advances the session by one line of user input
    ///
    /// This does no I/O, the returned [`Effect`] tells the caller what to do.
    pub fn step(&self, state: State, input: &str) -> (State, Effect) {
        let input = input.trim();
        match state {
            State::MainMenu => match input {
                "1" => (State::StartDate, Effect::None),
                "2" => (State::Month, Effect::None),
                "3" => self.build(ReportRequest::FullYear),
                "4" => (State::Exit, Effect::Exit),
                _ => (State::MainMenu, rejected(InputError::Choice)),
            },
            State::StartDate => match self.parse_date(input) {
                Ok(start) => (State::EndDate { start }, Effect::None),
                Err(e) => (State::StartDate, rejected(e)),
            },
            State::EndDate { start } => match self.parse_date(input) {
                Ok(end) => self.build(ReportRequest::DateRange { start, end }),
                Err(e) => (State::EndDate { start }, rejected(e)),
            },
            State::Month => match parse_month(input) {
                Ok(month) => self.build(ReportRequest::Month(month)),
                Err(e) => (State::Month, rejected(e)),
            },
            State::PostMenu { report } => match input {
                "1" => (State::PostMenu { report: report.clone() }, Effect::Persist(report)),
                "2" => (State::MainMenu, Effect::None),
                "3" => (State::Exit, Effect::Exit),
                _ => (State::PostMenu { report }, rejected(InputError::Choice)),
            },
            State::Exit => (State::Exit, Effect::None),
        }
    }

    /// Runs the session on a console until the user exits or the input ends
    pub fn run<R, W, S>(&self, mut input: R, mut output: W, sink: &mut S) -> io::Result<()>
        where R: io::BufRead, W: io::Write, S: ReportSink
    {
        let mut state = State::MainMenu;
        let mut line = String::new();

        while state != State::Exit {
            write!(output, "{}", state.prompt(&self.settings, &*sink))?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                tracing::info!(state = state.name(), "console input closed");
                writeln!(output)?;
                writeln!(output, "Program ended.")?;
                return Ok(());
            }

            let (next, effect) = self.step(state, &line);
            tracing::debug!(state = next.name(), "session transition");
            state = next;

            match effect {
                Effect::None => {}
                Effect::Notice(notice) => {
                    tracing::warn!(input = line.trim(), "input rejected");
                    writeln!(output, "{notice}")?;
                }
                Effect::Display(report) => write!(output, "{report}")?,
                Effect::Persist(report) => match sink.persist(&report) {
                    Ok(()) => writeln!(output, "Report written to {sink}")?,
                    Err(e) => {
                        tracing::warn!(error = %e, "report could not be persisted");
                        writeln!(output, "{e}")?;
                    }
                },
                Effect::Exit => writeln!(output, "Program ended.")?,
            }
        }

        Ok(())
    }

    fn build(&self, request: ReportRequest) -> (State, Effect) {
        let locale = &self.settings.locale;
        let aggregate = aggregate(&self.readings, &request);
        let title = report::title(&request, locale, self.settings.year_label);
        let report = report::format(&aggregate, &title, locale);

        (State::PostMenu { report: report.clone() }, Effect::Display(report))
    }

    fn parse_date(&self, input: &str) -> Result<NaiveDate, InputError> {
        self.settings
            .locale
            .parse_date(input)
            .map_err(|_| InputError::Date(input.to_owned()))
    }
}

/// Months are not range checked, unknown months simply match no reading
fn parse_month(input: &str) -> Result<u32, InputError> {
    input.parse().map_err(|_| InputError::Month(input.to_owned()))
}

fn rejected(error: InputError) -> Effect {
    Effect::Notice(error.to_string())
}
