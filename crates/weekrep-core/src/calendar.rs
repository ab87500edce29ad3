//! Week-code calendar
//!
//! Maps calendar weeks to compact week codes (`Y25W07`) and back.
//!
//! Weeks start on Monday and follow the first four-day week rule: week 1 is
//! the week holding the year's first Thursday. Week-of-year numbering never
//! rolls forward into the next year, so the last days of December always
//! count as week 52 or 53 of their own year, even when that week is also
//! week 1 of the following year. As a result `weeks_in_year(2025)` is 53 and
//! `Y25W53` covers 29/12/2025 – 04/01/2026, the same days as `Y26W01`.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use weekrep_core::calendar::{format_week_code, parse_week_code};
//!
//! let code = parse_week_code("Y25W1").unwrap();
//! let range = code.range().unwrap();
//!
//! assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 12, 30).unwrap());
//! assert_eq!(range.end, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
//! assert_eq!(format_week_code(2025, 1), "Y25W01");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Weekday numbering used by every step below: Monday = 0 .. Sunday = 6.
pub const WEEKDAY_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A week needs this many days inside January to be week 1.
const MIN_DAYS_IN_FIRST_WEEK: i64 = 4;

/// Display format for dates in labels and exports.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

// ============================================================================
// Errors
// ============================================================================

/// Week code parsing error
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Malformed week code: {0:?}")]
    Malformed(String),
}

// ============================================================================
// Types
// ============================================================================

/// A parsed week code (`Y25W07` → year 2025, week 7)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekCode {
    pub year: i32,
    pub week: i32,
}

impl WeekCode {
    pub const fn new(year: i32, week: i32) -> Self {
        Self { year, week }
    }

    /// The week holding `date`.
    ///
    /// Early-January days that precede week 1 resolve to the last week of
    /// the previous year.
    pub fn containing(date: NaiveDate) -> Self {
        let week = week_of_year(date) as i32;
        let year = if date.month() == 1 && week >= 52 {
            date.year() - 1
        } else {
            date.year()
        };
        Self { year, week }
    }

    /// Monday–Sunday range of this week
    pub fn range(&self) -> Option<WeekRange> {
        week_range(self.year, self.week)
    }

    /// Form stored on reports: `Y<yy>W<ww>` for 2000–2099, the full year
    /// otherwise so the code still parses back to the same week.
    pub fn canonical(&self) -> String {
        if (2000..=2099).contains(&self.year) {
            format_week_code(self.year, self.week)
        } else {
            format!("Y{:04}W{:02}", self.year, self.week)
        }
    }

    /// Whether `1 <= week <= weeks_in_year(year)`.
    ///
    /// Resolution itself never checks this; callers that want strict input
    /// validation check it first.
    pub fn is_in_year_domain(&self) -> bool {
        self.week >= 1 && self.week as u32 <= weeks_in_year(self.year)
    }
}

impl fmt::Display for WeekCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_week_code(self.year, self.week))
    }
}

impl FromStr for WeekCode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_week_code(s)
    }
}

/// A Monday-to-Sunday date range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekRange {
    /// Range of the week starting on `start`, `None` past the calendar's end.
    pub fn starting(start: NaiveDate) -> Option<Self> {
        let end = start.checked_add_days(Days::new(6))?;
        Some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// `dd/mm/yyyy{sep}dd/mm/yyyy`
    pub fn display(&self, sep: &str) -> String {
        format!("{}{}{}", format_date(self.start), sep, format_date(self.end))
    }
}

/// One selectable week: code, display label and resolved range
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekOption {
    pub code: String,
    pub label: String,
    pub range: WeekRange,
}

// ============================================================================
// Week arithmetic
// ============================================================================

/// Position of `day` in [`WEEKDAY_ORDER`].
pub fn weekday_index(day: Weekday) -> i64 {
    WEEKDAY_ORDER
        .iter()
        .position(|d| *d == day)
        .map_or(0, |i| i as i64)
}

/// Sunday = 0 .. Saturday = 6, the numbering the first-Thursday lookup uses
fn sunday_zero_index(day: Weekday) -> i64 {
    (weekday_index(day) + 1) % 7
}

fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

/// Week-of-year index of `date` (first four-day week, Monday start).
///
/// Never rolls forward: December 29–31 stay in week 52/53 of their year.
/// Days before week 1 get the index of December 31 of the previous year.
/// Returns 0 only when that previous year is outside the calendar range.
pub fn week_of_year(date: NaiveDate) -> u32 {
    let day_of_year = i64::from(date.ordinal0());
    let jan1 = (weekday_index(date.weekday()) - day_of_year % 7).rem_euclid(7);

    // Days from Jan 1 up to the first Monday; a long enough stub is week 1.
    let mut offset = (-jan1).rem_euclid(7);
    if offset != 0 && offset >= MIN_DAYS_IN_FIRST_WEEK {
        offset -= 7;
    }

    let day = day_of_year - offset;
    if day >= 0 {
        return (day / 7 + 1) as u32;
    }
    shift_days(date, -(day_of_year + 1)).map_or(0, week_of_year)
}

/// Number of week buckets in `year`: the week-of-year index of December 31.
pub fn weeks_in_year(year: i32) -> u32 {
    NaiveDate::from_ymd_opt(year, 12, 31).map_or(0, week_of_year)
}

/// Monday that begins `week` of `year`.
///
/// `week` is not range-checked: 0, negative or too-large values extrapolate
/// to Mondays outside the year. `None` only if the result would fall outside
/// the representable calendar.
pub fn week_start_date(year: i32, week: i32) -> Option<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let first_thursday = shift_days(jan1, 4 - sunday_zero_index(jan1.weekday()))?;

    // When the first Thursday is still in December it already counts as
    // week 1, so no week is subtracted.
    let first_week = week_of_year(first_thursday);
    let delta = i64::from(week) - i64::from(first_week <= 1);

    let candidate = shift_days(first_thursday, delta * 7 - 3)?;
    shift_days(candidate, -weekday_index(candidate.weekday()))
}

/// Sunday that ends `week` of `year`
pub fn week_end_date(year: i32, week: i32) -> Option<NaiveDate> {
    week_range(year, week).map(|range| range.end)
}

/// Full range of `week` of `year`; every resolution goes through here.
pub fn week_range(year: i32, week: i32) -> Option<WeekRange> {
    week_start_date(year, week).and_then(WeekRange::starting)
}

// ============================================================================
// Codes
// ============================================================================

/// `Y<yy>W<ww>`, both parts zero-padded to two digits.
pub fn format_week_code(year: i32, week: i32) -> String {
    format!("Y{:02}W{:02}", year.rem_euclid(100), week)
}

fn week_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Y(?P<year>[0-9]{2,4})W(?P<week>[0-9]{1,2})").expect("week code pattern is valid")
    })
}

/// Parse a week code such as `Y25W07`, `Y25W7` or `Y2025W07`.
///
/// The pattern is searched anywhere in `code`. Two-digit years are offset
/// from 2000.
pub fn parse_week_code(code: &str) -> Result<WeekCode, ParseError> {
    let malformed = || ParseError::Malformed(code.to_string());
    let caps = week_code_pattern().captures(code).ok_or_else(malformed)?;

    let year_digits = &caps["year"];
    let mut year: i32 = year_digits.parse().map_err(|_| malformed())?;
    if year_digits.len() == 2 {
        year += 2000;
    }
    let week: i32 = caps["week"].parse().map_err(|_| malformed())?;

    Ok(WeekCode { year, week })
}

/// Whether two stored codes name the same week (`Y25W7` and `Y25W07` do).
///
/// Codes that do not parse only match themselves.
pub fn same_week(a: &str, b: &str) -> bool {
    match (parse_week_code(a), parse_week_code(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Chronological order of stored codes; unparseable codes sort last.
pub fn compare_week_codes(a: &str, b: &str) -> Ordering {
    match (parse_week_code(a), parse_week_code(b)) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Range for a stored week code, `None` when it does not parse.
pub fn resolve_week_code(code: &str) -> Option<WeekRange> {
    parse_week_code(code).ok()?.range()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn week_option(year: i32, week: i32) -> Option<WeekOption> {
    let range = week_range(year, week)?;
    let code = format_week_code(year, week);
    let label = format!("{} ({})", code, range.display(" – "));
    Some(WeekOption { code, label, range })
}

/// Every week of every year in `start_year..=end_year`, ascending.
pub fn enumerate_week_codes(start_year: i32, end_year: i32) -> impl Iterator<Item = WeekOption> {
    (start_year..=end_year).flat_map(|year| {
        (1..=weeks_in_year(year) as i32).filter_map(move |week| week_option(year, week))
    })
}

// ============================================================================
// Tests
// ============================================================================
