//! Birth month/year primitives shared by the eligibility, age, and segmentation rules.
//!
//! Only the month and year of birth are collected, so every derived date is pinned to the
//! first day of a month.

use std::fmt;

use chrono::{Datelike, Months, NaiveDate};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Calendar months in quiz order. Serialized as the English month name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BirthMonth {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl BirthMonth {
    pub const ALL: [BirthMonth; 12] = [
        BirthMonth::January,
        BirthMonth::February,
        BirthMonth::March,
        BirthMonth::April,
        BirthMonth::May,
        BirthMonth::June,
        BirthMonth::July,
        BirthMonth::August,
        BirthMonth::September,
        BirthMonth::October,
        BirthMonth::November,
        BirthMonth::December,
    ];

    /// Exact, case-sensitive lookup against the month list.
    pub fn parse(raw: &str) -> Result<Self, CalendarError> {
        Self::ALL
            .iter()
            .copied()
            .find(|month| month.name() == raw)
            .ok_or_else(|| CalendarError::UnknownMonth(raw.to_string()))
    }

    pub const fn name(self) -> &'static str {
        match self {
            BirthMonth::January => "January",
            BirthMonth::February => "February",
            BirthMonth::March => "March",
            BirthMonth::April => "April",
            BirthMonth::May => "May",
            BirthMonth::June => "June",
            BirthMonth::July => "July",
            BirthMonth::August => "August",
            BirthMonth::September => "September",
            BirthMonth::October => "October",
            BirthMonth::November => "November",
            BirthMonth::December => "December",
        }
    }

    /// 1-based month number, as used by chrono.
    pub const fn number(self) -> u32 {
        self as u32 + 1
    }
}

impl fmt::Display for BirthMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while interpreting self-reported birth data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("unknown birth month '{0}'")]
    UnknownMonth(String),
    #[error("birth year '{0}' must be a 4-digit year")]
    InvalidYear(String),
    #[error("date arithmetic out of range for birth year {0}")]
    OutOfRange(i32),
}

pub const MIN_BIRTH_YEAR: i32 = 1000;
pub const MAX_BIRTH_YEAR: i32 = 9999;

/// Parse a self-reported birth year string.
pub fn parse_birth_year(raw: &str) -> Result<i32, CalendarError> {
    let trimmed = raw.trim();
    if trimmed.len() != 4 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(CalendarError::InvalidYear(raw.to_string()));
    }
    trimmed
        .parse::<i32>()
        .map_err(|_| CalendarError::InvalidYear(raw.to_string()))
        .and_then(check_birth_year)
}

/// Range check for years that arrive already numeric (JSON bodies, CLI flags).
pub fn check_birth_year(year: i32) -> Result<i32, CalendarError> {
    if (MIN_BIRTH_YEAR..=MAX_BIRTH_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(CalendarError::InvalidYear(year.to_string()))
    }
}

/// `deserialize_with` helper for optional numeric birth years.
pub(crate) fn deserialize_birth_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<i64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    i32::try_from(raw)
        .map_err(|_| CalendarError::InvalidYear(raw.to_string()))
        .and_then(check_birth_year)
        .map(Some)
        .map_err(D::Error::custom)
}

/// A validated month + year of birth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthDate {
    pub month: BirthMonth,
    pub year: i32,
}

impl BirthDate {
    pub fn new(month: BirthMonth, year: i32) -> Self {
        Self { month, year }
    }

    pub fn parse(month: &str, year: &str) -> Result<Self, CalendarError> {
        Ok(Self::new(BirthMonth::parse(month)?, parse_birth_year(year)?))
    }

    /// First day of the birth month in the year the person turns 65.
    pub fn sixty_fifth_birthday(&self) -> Result<NaiveDate, CalendarError> {
        self.year
            .checked_add(65)
            .and_then(|year| NaiveDate::from_ymd_opt(year, self.month.number(), 1))
            .ok_or(CalendarError::OutOfRange(self.year))
    }
}

pub(crate) fn shift_months(
    anchor: NaiveDate,
    months: i32,
    birth_year: i32,
) -> Result<NaiveDate, CalendarError> {
    let magnitude = Months::new(months.unsigned_abs());
    let shifted = if months >= 0 {
        anchor.checked_add_months(magnitude)
    } else {
        anchor.checked_sub_months(magnitude)
    };
    shifted
        .map(|date| date.with_day(1).unwrap_or(date))
        .ok_or(CalendarError::OutOfRange(birth_year))
}
