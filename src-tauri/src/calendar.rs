//! Solar Hijri (Jalali) issue dates.
//!
//! New invoices are stamped with today's Jalali date written `YYYY/MM/DD`
//! in Latin digits; the projector transliterates it for display.

use std::fmt;

use chrono::{Datelike, Local, NaiveDate};

const MAX_DATE_DIGITS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JalaliDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl fmt::Display for JalaliDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

/// Gregorian to Jalali using the 33-year cycle arithmetic.
pub fn jalali_date(date: NaiveDate) -> JalaliDate {
    const MONTH_OFFSETS: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

    let gy = date.year() as i64;
    let gm = date.month() as usize;
    let gd = date.day() as i64;

    let gy2 = if gm > 2 { gy + 1 } else { gy };
    let mut days = 355_666 + 365 * gy + (gy2 + 3) / 4 - (gy2 + 99) / 100 + (gy2 + 399) / 400
        + gd
        + MONTH_OFFSETS[gm - 1];

    let mut jy = -1595 + 33 * (days / 12_053);
    days %= 12_053;
    jy += 4 * (days / 1461);
    days %= 1461;
    if days > 365 {
        jy += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    let (jm, jd) = if days < 186 {
        (1 + days / 31, 1 + days % 31)
    } else {
        (7 + (days - 186) / 30, 1 + (days - 186) % 30)
    };

    JalaliDate {
        year: jy as i32,
        month: jm as u32,
        day: jd as u32,
    }
}

pub fn today_jalali() -> String {
    jalali_date(Local::now().date_naive()).to_string()
}

/// Keeps ASCII digits only (at most eight) and re-inserts the slashes, so
/// `14040516` and `1404-05-16` both become `1404/05/16`.
pub fn normalize_date_input(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(MAX_DATE_DIGITS)
        .collect();

    match digits.len() {
        0..=4 => digits,
        5..=6 => format!("{}/{}", &digits[..4], &digits[4..]),
        _ => format!("{}/{}/{}", &digits[..4], &digits[4..6], &digits[6..]),
    }
}
