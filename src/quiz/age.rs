use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::calendar::{BirthDate, CalendarError};

/// Demographic bands attached to lead and analytics payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "under_60")]
    Under60,
    #[serde(rename = "60-63")]
    From60To63,
    #[serde(rename = "64")]
    SixtyFour,
    #[serde(rename = "65")]
    SixtyFive,
    #[serde(rename = "66-70")]
    From66To70,
    #[serde(rename = "over_70")]
    Over70,
    #[serde(rename = "unknown")]
    Unknown,
}

impl AgeGroup {
    pub const fn label(self) -> &'static str {
        match self {
            AgeGroup::Under60 => "under_60",
            AgeGroup::From60To63 => "60-63",
            AgeGroup::SixtyFour => "64",
            AgeGroup::SixtyFive => "65",
            AgeGroup::From66To70 => "66-70",
            AgeGroup::Over70 => "over_70",
            AgeGroup::Unknown => "unknown",
        }
    }
}

/// Whole years since birth; the birthday counts as reached on the first of the birth month.
pub fn calculate_age(birth: BirthDate, today: NaiveDate) -> Result<i32, CalendarError> {
    let years = today.year().checked_sub(birth.year);
    let age = if today.month() < birth.month.number() {
        years.and_then(|years| years.checked_sub(1))
    } else {
        years
    };
    age.ok_or(CalendarError::OutOfRange(birth.year))
}

pub fn age_group(age: i32) -> AgeGroup {
    match age {
        i32::MIN..=59 => AgeGroup::Under60,
        60..=63 => AgeGroup::From60To63,
        64 => AgeGroup::SixtyFour,
        65 => AgeGroup::SixtyFive,
        66..=70 => AgeGroup::From66To70,
        71..=i32::MAX => AgeGroup::Over70,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::calendar::BirthMonth;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn age_ignores_day_of_month() {
        let birth = BirthDate::new(BirthMonth::June, 1959);
        assert_eq!(calculate_age(birth, date(2024, 5, 15)), Ok(64));
        assert_eq!(calculate_age(birth, date(2024, 6, 1)), Ok(65));
        assert_eq!(calculate_age(birth, date(2024, 7, 1)), Ok(65));
        assert_eq!(calculate_age(birth, date(2024, 12, 31)), Ok(65));
    }

    #[test]
    fn extreme_birth_years_are_out_of_range() {
        let birth = BirthDate::new(BirthMonth::June, i32::MIN);
        assert_eq!(
            calculate_age(birth, date(2024, 5, 15)),
            Err(CalendarError::OutOfRange(i32::MIN))
        );
    }

    #[test]
    fn bands_cover_every_boundary() {
        let cases = [
            (59, AgeGroup::Under60),
            (60, AgeGroup::From60To63),
            (63, AgeGroup::From60To63),
            (64, AgeGroup::SixtyFour),
            (65, AgeGroup::SixtyFive),
            (66, AgeGroup::From66To70),
            (70, AgeGroup::From66To70),
            (71, AgeGroup::Over70),
            (-3, AgeGroup::Under60),
        ];
        for (age, expected) in cases {
            assert_eq!(age_group(age), expected, "age {age}");
        }
        assert_eq!(age_group(64).label(), "64");
    }

    #[test]
    fn labels_match_serialized_form() {
        let json = serde_json::to_string(&AgeGroup::From60To63).expect("serializes");
        assert_eq!(json, "\"60-63\"");
        assert_eq!(AgeGroup::Over70.label(), "over_70");
    }
}
