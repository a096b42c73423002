//! Cell text rendering shared by every sheet source.

use ace_standards::is_date_variable;
use chrono::{NaiveDate, TimeDelta};

/// Output format for date columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest serial day number Excel can represent (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Converts an Excel serial day number (1900 date system) to a calendar date.
///
/// Serial 1 is 1900-01-01. Excel counts a non-existent 1900-02-29 as serial
/// 60, so serials above 60 are offset by one day.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let days = serial.floor() as i64;
    let epoch = if days > 60 {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    };
    epoch.checked_add_signed(TimeDelta::try_days(days)?)
}

/// Renders a number without a trailing `.0` for whole values.
pub fn format_number(value: f64) -> String {
    value.to_string()
}

/// The `YYYY-MM-DD` prefix of an ISO date or date-time string.
pub fn iso_date_part(text: &str) -> Option<&str> {
    let head = text.get(..10)?;
    NaiveDate::parse_from_str(head, DATE_FORMAT).ok()?;
    Some(head)
}

/// Renders a serial date, falling back to the plain number when out of range.
pub fn render_serial(serial: f64) -> String {
    match excel_serial_to_date(serial) {
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None => format_number(serial),
    }
}

/// Renders a text cell for `variable`: trimmed, and normalised to
/// `YYYY-MM-DD` when the column holds dates.
pub fn render_text(text: &str, variable: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() || !is_date_variable(variable) {
        return trimmed.to_string();
    }
    if let Ok(serial) = trimmed.parse::<f64>() {
        return render_serial(serial);
    }
    match iso_date_part(trimmed) {
        Some(date) => date.to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_excel_serials() {
        let date = |serial| excel_serial_to_date(serial).map(|d| d.to_string());
        assert_eq!(date(1.0).as_deref(), Some("1900-01-01"));
        assert_eq!(date(61.0).as_deref(), Some("1900-03-01"));
        assert_eq!(date(36950.0).as_deref(), Some("2001-02-28"));
        assert_eq!(date(44197.75).as_deref(), Some("2021-01-01"));
        assert_eq!(date(0.0), None);
        assert_eq!(date(f64::NAN), None);
    }

    #[test]
    fn renders_dates_only_in_date_columns() {
        assert_eq!(render_text(" 43831 ", "pdate"), "2020-01-01");
        assert_eq!(render_text("2020-01-01T08:30:00", "w_date"), "2020-01-01");
        assert_eq!(render_text("43831", "plpop"), "43831");
        assert_eq!(render_text("unknown", "hadat"), "unknown");
        assert_eq!(render_text("  ", "pdate"), "");
    }

    #[test]
    fn whole_numbers_have_no_fraction() {
        assert_eq!(format_number(5000.0), "5000");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-0.25), "-0.25");
    }
}
