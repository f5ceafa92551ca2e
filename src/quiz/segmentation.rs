//! New-to-Medicare labelling for analytics segmentation.
//!
//! Independent of the result classifier: nothing here feeds back into [`super::classifier`].

use chrono::NaiveDate;
use serde::Serialize;

use super::answers::{CurrentCoverage, QuizAnswers};
use super::calendar::{shift_months, BirthMonth, CalendarError};

/// How far ahead of the 65th birthday someone without Parts A and B still counts as new.
pub const NEW_TO_MEDICARE_LEAD_MONTHS: i32 = 6;

/// Whether enough has been answered to evaluate [`is_new_to_medicare`].
pub fn has_sufficient_data(answers: &QuizAnswers) -> bool {
    if answers.birth_date().is_none() {
        return false;
    }

    match answers.has_part_ab {
        None => false,
        Some(true) => answers.current_coverage.is_some(),
        Some(false) => true,
    }
}

/// `Ok(None)` while the answers are insufficient; callers must treat that as unknown.
/// Birth data whose derived dates fall outside the calendar is an error, not unknown.
pub fn is_new_to_medicare(
    answers: &QuizAnswers,
    today: NaiveDate,
) -> Result<Option<bool>, CalendarError> {
    if !has_sufficient_data(answers) {
        return Ok(None);
    }
    let (Some(birth), Some(has_part_ab)) = (answers.birth_date(), answers.has_part_ab) else {
        return Ok(None);
    };

    if has_part_ab {
        let has_additional_coverage = answers
            .current_coverage
            .map(CurrentCoverage::is_additional)
            .unwrap_or(false);
        return Ok(Some(!has_additional_coverage));
    }

    let birthday = birth.sixty_fifth_birthday()?;
    let cutoff = shift_months(birthday, -NEW_TO_MEDICARE_LEAD_MONTHS, birth.year)?;
    Ok(Some(today <= cutoff))
}

/// Payload for the `is_new_to_medicare` analytics event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewToMedicareSignal {
    pub medicare_parts_ab: bool,
    pub has_additional_coverage: bool,
    pub current_date: NaiveDate,
    pub birthday_65th_date: NaiveDate,
    pub birth_month: BirthMonth,
    pub birth_year: i32,
    pub current_coverage: Option<CurrentCoverage>,
}

impl NewToMedicareSignal {
    /// Built only when the predicate holds.
    pub fn evaluate(answers: &QuizAnswers, today: NaiveDate) -> Option<Self> {
        if is_new_to_medicare(answers, today) != Ok(Some(true)) {
            return None;
        }

        let birth = answers.birth_date()?;
        Some(Self {
            medicare_parts_ab: answers.has_part_ab == Some(true),
            has_additional_coverage: answers
                .current_coverage
                .map(CurrentCoverage::is_additional)
                .unwrap_or(false),
            current_date: today,
            birthday_65th_date: birth.sixty_fifth_birthday().ok()?,
            birth_month: birth.month,
            birth_year: birth.year,
            current_coverage: answers.current_coverage,
        })
    }
}
