use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::answers::QuizAnswers;
use super::calendar::{shift_months, BirthDate, CalendarError};

/// Months on either side of the 65th-birthday month covered by the Initial Enrollment Period.
pub const IEP_MONTHS_EACH_SIDE: i32 = 3;

/// Inclusive window around the 65th birthday, both ends on the first of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl EnrollmentWindow {
    pub fn contains(&self, today: NaiveDate) -> bool {
        self.start <= today && today <= self.end
    }

    /// `YYYY-MM-DD to YYYY-MM-DD`, the shape passed through on result page views.
    pub fn label(&self) -> String {
        format!("{} to {}", self.start, self.end)
    }
}

pub fn enrollment_window(birth: BirthDate) -> Result<EnrollmentWindow, CalendarError> {
    let anchor = birth.sixty_fifth_birthday()?;
    Ok(EnrollmentWindow {
        start: shift_months(anchor, -IEP_MONTHS_EACH_SIDE, birth.year)?,
        end: shift_months(anchor, IEP_MONTHS_EACH_SIDE, birth.year)?,
    })
}

pub fn is_in_initial_enrollment_period(
    birth: BirthDate,
    today: NaiveDate,
) -> Result<bool, CalendarError> {
    Ok(enrollment_window(birth)?.contains(today))
}

/// String entry point used right after the birth date question is answered.
pub fn calculate_is_in_iep(
    birth_month: &str,
    birth_year: &str,
    today: NaiveDate,
) -> Result<bool, CalendarError> {
    let birth = BirthDate::parse(birth_month, birth_year)?;
    is_in_initial_enrollment_period(birth, today)
}

/// Window label for analytics pass-through, `None` until the birth date is known.
pub fn iep_window_label(answers: &QuizAnswers) -> Option<String> {
    let birth = answers.birth_date()?;
    enrollment_window(birth).ok().map(|window| window.label())
}
