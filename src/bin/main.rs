use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use energy_report::{DateStyle, FileSink, Locale, ReportSettings, Session};

/// An interactive report generator for energy meter readings
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// The path to the semicolon separated meter readings
    #[clap(default_value = "2025.csv")]
    input: std::path::PathBuf,
    /// Where reports are written to when persisted
    #[clap(short, long, default_value = "report.txt")]
    output: std::path::PathBuf,
    /// The field separator of the input file
    #[clap(short, long, default_value_t = ';')]
    delimiter: char,
    /// The year full year reports are labelled with
    #[clap(long, default_value_t = 2025)]
    year: i32,
    /// Render report dates as dd.mm.yyyy instead of d.m.yyyy
    #[clap(long)]
    zero_padded_dates: bool,
    /// The log level used when RUST_LOG is not set
    #[clap(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let delimiter = u8::try_from(args.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .context("the delimiter has to be a single ASCII character")?;
    let readings = energy_report::load_readings_from_path(&args.input, delimiter)
        .with_context(|| format!("failed to load meter readings from {}", args.input.display()))?;
    println!("CSV file '{}' loaded. {} rows processed.", args.input.display(), readings.len());

    let date_style = match args.zero_padded_dates {
        true => DateStyle::ZeroPadded,
        false => DateStyle::Unpadded,
    };
    let settings = ReportSettings {
        locale: Locale::FINNISH.with_date_style(date_style),
        year_label: args.year,
    };
    let mut sink = FileSink::new(args.output);

    let session = Session::new(readings, settings);
    session.run(std::io::stdin().lock(), std::io::stdout(), &mut sink)?;

    Ok(())
}

/// Logs go to stderr, stdout belongs to the reports
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
