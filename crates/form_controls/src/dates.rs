//! Calendar-day helpers shared by the date-range controls.
//!
//! Dates live as [`NaiveDate`]: a day with no time or zone, so converting
//! between the display form (`dd/mm/yyyy`) and the API form (`yyyy-mm-dd`)
//! can never drift by a day. Malformed strings parse to `None`.

use chrono::{Datelike, Days, Local, NaiveDate, NaiveDateTime};

pub use shared::protocol::API_DATE_FORMAT;

pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parses a `dd/mm/yyyy` string. Only the exact zero-padded shape is
/// accepted, so every accepted string formats back to itself.
pub fn parse_display(text: &str) -> Option<NaiveDate> {
    if !has_shape(text, &[2, 5], b'/') {
        return None;
    }
    NaiveDate::parse_from_str(text, DISPLAY_DATE_FORMAT).ok()
}

/// Parses a `yyyy-mm-dd` string with the same strictness as
/// [`parse_display`].
pub fn parse_api(text: &str) -> Option<NaiveDate> {
    if !has_shape(text, &[4, 7], b'-') {
        return None;
    }
    NaiveDate::parse_from_str(text, API_DATE_FORMAT).ok()
}

pub fn format_display(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

pub fn format_api(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}

pub fn display_to_api(text: &str) -> Option<String> {
    parse_display(text).map(format_api)
}

pub fn api_to_display(text: &str) -> Option<String> {
    parse_api(text).map(format_display)
}

/// Drops the time of day; the calendar day is kept as picked.
pub fn start_of_day(moment: NaiveDateTime) -> NaiveDate {
    moment.date()
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first
        .checked_add_months(chrono::Months::new(1))
        .unwrap_or(first)
}

fn has_shape(text: &str, separators: &[usize], separator: u8) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| {
            if separators.contains(&i) {
                *b == separator
            } else {
                b.is_ascii_digit()
            }
        })
}

/// Source of "today" for presets and the selectable-day floor.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Named shortcut resolved against today at selection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Next7Days,
    Next14Days,
    Next30Days,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Self::Next7Days, Self::Next14Days, Self::Next30Days];

    pub fn name(self) -> &'static str {
        match self {
            Self::Next7Days => "next-7-days",
            Self::Next14Days => "next-14-days",
            Self::Next30Days => "next-30-days",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Next7Days => "Next 7 days",
            Self::Next14Days => "Next 14 days",
            Self::Next30Days => "Next 30 days",
        }
    }

    /// Accepts the stable name or the human label, case-insensitively.
    pub fn from_name(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(raw) || p.label().eq_ignore_ascii_case(raw))
    }

    pub fn span_days(self) -> u64 {
        match self {
            Self::Next7Days => 7,
            Self::Next14Days => 14,
            Self::Next30Days => 30,
        }
    }

    /// `[today, today + span - 1]`, both ends inclusive.
    pub fn resolve(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let end = today
            .checked_add_days(Days::new(self.span_days() - 1))
            .unwrap_or(today);
        (today, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn display_round_trips_for_well_formed_dates() {
        for text in ["16/08/2025", "01/01/2000", "29/02/2024", "31/12/1999"] {
            let api = display_to_api(text).expect("parses");
            assert_eq!(api_to_display(&api).as_deref(), Some(text));
        }
    }

    #[test]
    fn api_round_trips_through_date() {
        let parsed = parse_api("2025-09-05").expect("parses");
        assert_eq!(parsed, date(2025, 9, 5));
        assert_eq!(format_api(parsed), "2025-09-05");
    }

    #[test]
    fn malformed_display_strings_are_absent() {
        for text in [
            "",
            "1/8/2025",
            "16/8/2025",
            "16-08-2025",
            "2025-08-16",
            "31/02/2025",
            "32/01/2025",
            "16/13/2025",
            "16/08/25",
            "ab/cd/efgh",
            " 16/08/2025",
        ] {
            assert_eq!(parse_display(text), None, "{text:?} should not parse");
        }
    }

    #[test]
    fn start_of_day_keeps_calendar_day() {
        let late = date(2025, 8, 16).and_hms_opt(23, 59, 59).expect("time");
        assert_eq!(start_of_day(late), date(2025, 8, 16));
    }

    #[test]
    fn month_helpers_cross_year_boundary() {
        assert_eq!(first_of_month(date(2025, 12, 19)), date(2025, 12, 1));
        assert_eq!(first_of_next_month(date(2025, 12, 19)), date(2026, 1, 1));
    }

    #[test]
    fn presets_span_inclusive_days() {
        let today = date(2025, 8, 28);
        assert_eq!(
            Preset::Next7Days.resolve(today),
            (today, date(2025, 9, 3))
        );
        assert_eq!(
            Preset::Next14Days.resolve(today),
            (today, date(2025, 9, 10))
        );
    }

    #[test]
    fn preset_names_parse_both_forms() {
        assert_eq!(Preset::from_name("next-14-days"), Some(Preset::Next14Days));
        assert_eq!(Preset::from_name("Next 7 days"), Some(Preset::Next7Days));
        assert_eq!(Preset::from_name("last week"), None);
    }
}
