use chrono::{Datelike, NaiveDate};

/// How calendar dates are rendered in reports
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateStyle {
    /// `5.3.2025`
    Unpadded,
    /// `05.03.2025`
    ZeroPadded,
}

/// The numeric and date conventions used for user facing text
///
/// Both the input file and the console speak the same convention: a comma as
/// decimal separator and dates in `day.month.year` order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Locale {
    decimal_separator: char,
    date_style: DateStyle,
}

impl Locale {
    /// Comma decimals, unpadded `day.month.year` dates
    pub const FINNISH: Locale = Locale::new(',', DateStyle::Unpadded);

    pub const fn new(decimal_separator: char, date_style: DateStyle) -> Self {
        Self { decimal_separator, date_style }
    }

    /// The same locale, rendering dates in the given style
    pub const fn with_date_style(self, date_style: DateStyle) -> Self {
        Self { date_style, ..self }
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    /// Renders a number rounded to two decimals, without thousands grouping
    ///
    /// ```
    /// use energy_report::Locale;
    ///
    /// assert_eq!(Locale::FINNISH.format_number(1234.5), "1234,50");
    /// ```
    pub fn format_number(&self, value: f64) -> String {
        let rendered = format!("{value:.2}");
        match self.decimal_separator {
            '.' => rendered,
            separator => rendered.replace('.', &separator.to_string()),
        }
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        match self.date_style {
            DateStyle::Unpadded => format!("{}.{}.{}", date.day(), date.month(), date.year()),
            DateStyle::ZeroPadded => date.format("%d.%m.%Y").to_string(),
        }
    }

    /// Parses a decimal written with this locale's separator
    ///
    /// Values already written with a period are accepted as well.
    pub fn parse_number(&self, value: &str) -> Result<f64, std::num::ParseFloatError> {
        value
            .trim()
            .replace(self.decimal_separator, ".")
            .parse()
    }

    /// Parses a `day.month.year` date, with or without zero padding
    pub fn parse_date(&self, value: &str) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(value.trim(), "%d.%m.%Y")
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::FINNISH
    }
}
