//! Free-text date normalization to `MM/DD`.
//!
//! The parser is fuzzy: it picks date material (month names, numbers, numeric
//! groups such as `01/03/2024`) out of surrounding prose and ignores the rest.
//! Fields the text leaves out are filled in from a reference date.

use chrono::{Datelike, Local, NaiveDate};
use tracing::debug;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// A bare number found in the text, with the number of digits it was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Num {
    value: u32,
    digits: usize,
}

impl Num {
    /// Can only be a year: too large for a day, or written with 3+ digits.
    fn is_yearish(self) -> bool {
        self.value > 31 || self.digits >= 3
    }
}

/// Raw date material pulled out of the text.
#[derive(Debug, Default)]
struct Fields {
    month_name: Option<u32>,
    numbers: Vec<Num>,
}

/// What the text specified; `None` fields get filled from the reference date.
#[derive(Debug, Default, PartialEq, Eq)]
struct Resolved {
    year: Option<Num>,
    month: Option<u32>,
    day: Option<u32>,
}

/// Normalize `text` to `MM/DD`, filling missing fields from today's local date.
pub fn normalize_date(text: &str) -> Option<String> {
    normalize_date_on(text, Local::now().date_naive())
}

/// Normalize `text` to `MM/DD`, filling missing fields from `today`.
///
/// Returns `None` when the text holds no month or day, when the month falls
/// outside 1..=12, or when the resulting calendar date does not exist.
pub fn normalize_date_on(text: &str, today: NaiveDate) -> Option<String> {
    let fields = scan_fields(text)?;
    let resolved = resolve(&fields)?;

    if resolved.month.is_none() && resolved.day.is_none() {
        debug!(text, "No month or day in date text");
        return None;
    }

    let year = resolved
        .year
        .map(|y| expand_year(y, today.year()))
        .unwrap_or_else(|| today.year());
    let month = resolved.month.unwrap_or_else(|| today.month());
    if !(1..=12).contains(&month) {
        debug!(text, month, "Month out of range");
        return None;
    }
    let day = match resolved.day {
        Some(day) => day,
        None => today.day().min(days_in_month(year, month)),
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.format("%m/%d").to_string())
}

/// Collect month names and numbers from `text`, skipping everything else.
///
/// Returns `None` if the material is contradictory (two month names) or there
/// is more of it than a single date can hold.
fn scan_fields(text: &str) -> Option<Fields> {
    let mut fields = Fields::default();

    let tokens = text
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '(' | ')' | '[' | ']'))
        .filter(|t| !t.is_empty());

    for token in tokens {
        for sub in strip_time_suffix(token).split(['/', '-', '.']) {
            let sub = sub.trim_matches(':');
            if sub.is_empty() || !sub.chars().all(|c| c.is_ascii_alphanumeric()) {
                continue;
            }

            if let Some(num) = parse_number(sub) {
                fields.numbers.push(num);
            } else if let Some(month) = month_from_name(sub) {
                if fields.month_name.is_some() {
                    return None;
                }
                fields.month_name = Some(month);
            }
        }
    }

    let field_count = fields.numbers.len() + usize::from(fields.month_name.is_some());
    if field_count > 3 {
        return None;
    }
    Some(fields)
}

/// `2024-01-03T10:00:00Z` → `2024-01-03`.
fn strip_time_suffix(token: &str) -> &str {
    match token.split_once('T') {
        Some((date, _)) if date.ends_with(|c: char| c.is_ascii_digit()) => date,
        _ => token,
    }
}

/// Digits, optionally with an ordinal suffix (`3rd`). Longer runs (order
/// numbers, phone numbers) are not date material.
fn parse_number(token: &str) -> Option<Num> {
    let lower = token.to_ascii_lowercase();
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| lower.strip_suffix(suffix))
        .unwrap_or(&lower);

    if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(Num {
        value: digits.parse().ok()?,
        digits: digits.len(),
    })
}

/// Full month name, three-letter abbreviation, or "sept".
fn month_from_name(token: &str) -> Option<u32> {
    let lower = token.to_ascii_lowercase();
    if lower == "sept" {
        return Some(9);
    }
    MONTHS
        .iter()
        .position(|m| *m == lower || (lower.len() == 3 && m.starts_with(&lower)))
        .map(|i| i as u32 + 1)
}

/// Assign numbers to year/month/day, month-first.
fn resolve(fields: &Fields) -> Option<Resolved> {
    let nums = &fields.numbers;
    let mut r = Resolved::default();

    if let Some(month) = fields.month_name {
        r.month = Some(month);
        match nums.as_slice() {
            [] => {}
            [n] if n.is_yearish() => r.year = Some(*n),
            [n] => r.day = Some(n.value),
            [a, b] if a.is_yearish() => {
                r.year = Some(*a);
                r.day = Some(b.value);
            }
            [a, b] => {
                r.day = Some(a.value);
                r.year = Some(*b);
            }
            _ => return None,
        }
        return Some(r);
    }

    match nums.as_slice() {
        [] => {}
        [n] if n.is_yearish() => r.year = Some(*n),
        [n] => r.day = Some(n.value),
        [a, b] if a.is_yearish() => {
            r.year = Some(*a);
            r.month = Some(b.value);
        }
        [a, b] if b.is_yearish() => {
            r.month = Some(a.value);
            r.year = Some(*b);
        }
        [a, b] if a.value > 12 => {
            r.day = Some(a.value);
            r.month = Some(b.value);
        }
        [a, b] => {
            r.month = Some(a.value);
            r.day = Some(b.value);
        }
        [a, b, c] if a.is_yearish() => {
            r.year = Some(*a);
            if b.value > 12 {
                r.day = Some(b.value);
                r.month = Some(c.value);
            } else {
                r.month = Some(b.value);
                r.day = Some(c.value);
            }
        }
        [a, b, c] if a.value > 12 => {
            r.day = Some(a.value);
            r.month = Some(b.value);
            r.year = Some(*c);
        }
        [a, b, c] => {
            r.month = Some(a.value);
            r.day = Some(b.value);
            r.year = Some(*c);
        }
        _ => return None,
    }
    Some(r)
}

/// Two-digit years land within 50 years of the current year.
fn expand_year(year: Num, current: i32) -> i32 {
    let value = year.value as i32;
    if year.digits > 2 || value >= 100 {
        return value;
    }
    let mut full = current - current.rem_euclid(100) + value;
    if full >= current + 50 {
        full -= 100;
    } else if full < current - 50 {
        full += 100;
    }
    full
}

fn days_in_month(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|d| NaiveDate::from_ymd_opt(year, month, *d).is_some())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn norm(text: &str) -> Option<String> {
        normalize_date_on(text, today())
    }

    #[test]
    fn test_month_name_day_year() {
        assert_eq!(norm("March 5, 2024").as_deref(), Some("03/05"));
        assert_eq!(norm("5 March 2024").as_deref(), Some("03/05"));
    }

    #[test]
    fn test_normalize_date_against_today() {
        // fully specified dates do not depend on the current date
        assert_eq!(normalize_date("12/25/2023").as_deref(), Some("12/25"));
        assert_eq!(normalize_date("Jan 3rd, 2024").as_deref(), Some("01/03"));
        assert_eq!(normalize_date("no date here"), None);
        assert_eq!(normalize_date("13/13/2024"), None);
    }

    #[test]
    fn test_not_a_date() {
        assert_eq!(norm("not a date"), None);
        assert_eq!(norm(""), None);
    }

    #[test]
    fn test_unknown_month_word_with_year_only_number() {
        // "Februar" is not an English month; 35 can only be a year.
        assert_eq!(norm("Februar 35"), None);
    }

    #[test]
    fn test_month_out_of_range_is_rejected() {
        assert_eq!(norm("13/14/2024"), None);
        assert_eq!(norm("14/13"), None);
    }

    #[test]
    fn test_day_first_when_first_number_exceeds_twelve() {
        assert_eq!(norm("13/05/2024").as_deref(), Some("05/13"));
    }

    #[test]
    fn test_fuzzy_prose_is_ignored() {
        assert_eq!(
            norm("placed on Sunday, 3rd of March 2024 at 10:30 AM").as_deref(),
            Some("03/03")
        );
        assert_eq!(norm("Jan 3").as_deref(), Some("01/03"));
        assert_eq!(norm("Sept. 9").as_deref(), Some("09/09"));
    }

    #[test]
    fn test_numeric_forms() {
        assert_eq!(norm("01/03/24").as_deref(), Some("01/03"));
        assert_eq!(norm("2024-01-03").as_deref(), Some("01/03"));
        assert_eq!(norm("2024-01-03T10:00:00Z").as_deref(), Some("01/03"));
        assert_eq!(norm("16-JUL-2025 03:01:03").as_deref(), Some("07/16"));
        assert_eq!(norm("12/25").as_deref(), Some("12/25"));
    }

    #[test]
    fn test_missing_fields_come_from_reference_date() {
        assert_eq!(norm("June 2024").as_deref(), Some("06/15"));
        assert_eq!(norm("the 3rd").as_deref(), Some("06/03"));
        let jan_31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            normalize_date_on("February", jan_31).as_deref(),
            Some("02/29")
        );
    }

    #[test]
    fn test_impossible_day_is_rejected() {
        assert_eq!(norm("February 30, 2024"), None);
        assert_eq!(norm("Feb 29 2023"), None);
        assert_eq!(norm("Feb 29").as_deref(), Some("02/29"));
    }

    #[test]
    fn test_contradictory_or_overfull_text() {
        assert_eq!(norm("Jan 3 - Feb 4"), None);
        assert_eq!(norm("1 2 3 4"), None);
    }

    #[test]
    fn test_long_numbers_and_amounts_are_not_dates() {
        assert_eq!(norm("#1234567"), None);
        assert_eq!(norm("Order 112-3344556 Jan 3").as_deref(), Some("01/03"));
    }

    #[test]
    fn test_expand_two_digit_year() {
        let two = |v| Num { value: v, digits: 2 };
        assert_eq!(expand_year(two(24), 2024), 2024);
        assert_eq!(expand_year(two(99), 2024), 1999);
        assert_eq!(expand_year(two(70), 2024), 2070);
        assert_eq!(expand_year(two(75), 2024), 1975);
    }
}
