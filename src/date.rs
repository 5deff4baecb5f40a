//! Cookie date parsing and formatting.
//!
//! The parser implements the algorithm of RFC 6265 S5.1.1 literally:
//! tokenize on the delimiter class, then claim each token as a time,
//! day-of-month, month, or year in that fixed order, first match wins.
//! It accepts the full zoo of legacy `Expires` spellings and never
//! panics; malformed input simply yields `None`.
//!
//! The formatter emits RFC 1123 (`Thu, 01 Jan 1970 00:00:00 GMT`), the
//! only form a server should ever send.

use time::{Date, Month, OffsetDateTime, Time};

/// Largest expiry instant a cookie can carry: 2^31 - 1 seconds past the
/// epoch (2038-01-19T03:14:07Z). Unbounded expiries clamp here.
pub const MAX_DATE: OffsetDateTime = time::macros::datetime!(2038-01-19 03:14:07 UTC);

// delimiter = %x09 / %x20-2F / %x3B-40 / %x5B-60 / %x7B-7E
fn is_delimiter(c: char) -> bool {
    matches!(c, '\t' | '\x20'..='\x2F' | '\x3B'..='\x40' | '\x5B'..='\x60' | '\x7B'..='\x7E')
}

/// Parse `min..=max` leading digits. With `trailing_ok`, arbitrary
/// non-digit trailing content is permitted; otherwise the digits must
/// span the whole token.
fn parse_digits(token: &str, min: usize, max: usize, trailing_ok: bool) -> Option<u32> {
    let count = token.bytes().take_while(u8::is_ascii_digit).count();
    if count < min || count > max {
        return None;
    }
    if !trailing_ok && count != token.len() {
        return None;
    }
    token[..count].parse().ok()
}

// time = 1*2DIGIT ":" 1*2DIGIT ":" 1*2DIGIT, trailing junk after seconds
fn parse_time(token: &str) -> Option<(u32, u32, u32)> {
    let mut parts = token.splitn(3, ':');
    let hour = parse_digits(parts.next()?, 1, 2, false)?;
    let minute = parse_digits(parts.next()?, 1, 2, false)?;
    let second = parse_digits(parts.next()?, 1, 2, true)?;
    Some((hour, minute, second))
}

fn parse_month(token: &str) -> Option<Month> {
    if token.len() < 3 || !token.is_char_boundary(3) {
        return None;
    }
    match token[..3].to_ascii_lowercase().as_str() {
        "jan" => Some(Month::January),
        "feb" => Some(Month::February),
        "mar" => Some(Month::March),
        "apr" => Some(Month::April),
        "may" => Some(Month::May),
        "jun" => Some(Month::June),
        "jul" => Some(Month::July),
        "aug" => Some(Month::August),
        "sep" => Some(Month::September),
        "oct" => Some(Month::October),
        "nov" => Some(Month::November),
        "dec" => Some(Month::December),
        _ => None,
    }
}

/// Parse a cookie date per RFC 6265 S5.1.1. Returns the UTC instant, or
/// `None` when the input does not denote a representable date.
pub fn parse_date(input: &str) -> Option<OffsetDateTime> {
    let mut time: Option<(u32, u32, u32)> = None;
    let mut day_of_month: Option<u32> = None;
    let mut month: Option<Month> = None;
    let mut year: Option<u32> = None;

    for token in input.split(is_delimiter).filter(|t| !t.is_empty()) {
        if time.is_none() {
            if let Some((h, m, s)) = parse_time(token) {
                if h > 23 || m > 59 || s > 59 {
                    return None;
                }
                time = Some((h, m, s));
                continue;
            }
        }
        if day_of_month.is_none() {
            if let Some(day) = parse_digits(token, 1, 2, true) {
                if (1..=31).contains(&day) {
                    day_of_month = Some(day);
                    continue;
                }
            }
        }
        if month.is_none() {
            if let Some(m) = parse_month(token) {
                month = Some(m);
                continue;
            }
        }
        if year.is_none() {
            if let Some(mut y) = parse_digits(token, 2, 4, true) {
                if (70..=99).contains(&y) {
                    y += 1900;
                } else if y <= 69 {
                    y += 2000;
                }
                year = Some(y);
                continue;
            }
        }
    }

    let (hour, minute, second) = time?;
    let day = day_of_month?;
    let month = month?;
    let year = year?;
    if year < 1601 {
        return None;
    }

    let date = Date::from_calendar_date(year as i32, month, day as u8).ok()?;
    let time = Time::from_hms(hour as u8, minute as u8, second as u8).ok()?;
    Some(OffsetDateTime::new_utc(date, time))
}

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Format an instant as an RFC 1123 date, e.g.
/// `Thu, 01 Jan 1970 00:00:00 GMT`.
pub fn format_date(instant: OffsetDateTime) -> String {
    let utc = instant.to_offset(time::UtcOffset::UTC);
    format!(
        "{}, {:02} {} {:04} {:02}:{:02}:{:02} GMT",
        WEEKDAYS[utc.weekday().number_days_from_monday() as usize],
        utc.day(),
        MONTHS[utc.month() as usize - 1],
        utc.year(),
        utc.hour(),
        utc.minute(),
        utc.second(),
    )
}
