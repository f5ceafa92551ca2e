use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::{deserialize_birth_year, BirthDate, BirthMonth, CalendarError};
use super::eligibility::is_in_initial_enrollment_period;

/// Sentinel VA preference tag, mutually exclusive with every other tag.
pub const NONE_APPLY: &str = "none_apply";

/// Supplemental coverage reported by people already enrolled in Parts A and B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentCoverage {
    PartsAbOnly,
    MedicareAdvantage,
    Medigap,
}

impl CurrentCoverage {
    pub const fn label(self) -> &'static str {
        match self {
            CurrentCoverage::PartsAbOnly => "parts_ab_only",
            CurrentCoverage::MedicareAdvantage => "medicare_advantage",
            CurrentCoverage::Medigap => "medigap",
        }
    }

    /// Medicare Advantage and Medigap count as coverage beyond base Medicare.
    pub const fn is_additional(self) -> bool {
        matches!(
            self,
            CurrentCoverage::MedicareAdvantage | CurrentCoverage::Medigap
        )
    }
}

/// Final cost/flexibility tradeoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetChoice {
    Flexible,
    LowerCost,
}

impl BudgetChoice {
    pub const fn label(self) -> &'static str {
        match self {
            BudgetChoice::Flexible => "flexible",
            BudgetChoice::LowerCost => "lower_cost",
        }
    }
}

/// Answers accumulated across the quiz. `None` means the question has not been reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizAnswers {
    pub birth_month: Option<BirthMonth>,
    #[serde(deserialize_with = "deserialize_birth_year")]
    pub birth_year: Option<i32>,
    pub is_in_iep: bool,
    pub has_part_ab: Option<bool>,
    pub current_coverage: Option<CurrentCoverage>,
    pub is_veteran: Option<bool>,
    pub uses_va: Option<bool>,
    pub va_preferences: BTreeSet<String>,
    pub has_medicaid: Option<bool>,
    pub budget_choice: Option<BudgetChoice>,
}

/// A single answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "question", content = "value", rename_all = "snake_case")]
pub enum QuizAnswer {
    BirthDate { month: String, year: String },
    MedicareParts(bool),
    CurrentCoverage(CurrentCoverage),
    Veteran(bool),
    UsesVa(bool),
    ToggleVaPreference(String),
    Medicaid(bool),
    Budget(BudgetChoice),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnswerError {
    #[error(transparent)]
    BirthDate(#[from] CalendarError),
    #[error("VA preference tag must not be empty")]
    EmptyPreference,
}

impl QuizAnswers {
    pub fn birth_date(&self) -> Option<BirthDate> {
        match (self.birth_month, self.birth_year) {
            (Some(month), Some(year)) => Some(BirthDate::new(month, year)),
            _ => None,
        }
    }

    /// Produce the record that results from answering one more question.
    pub fn apply(self, answer: QuizAnswer, today: NaiveDate) -> Result<Self, AnswerError> {
        let mut next = self;
        match answer {
            QuizAnswer::BirthDate { month, year } => {
                let birth = BirthDate::parse(&month, &year)?;
                next.birth_month = Some(birth.month);
                next.birth_year = Some(birth.year);
                next.is_in_iep = is_in_initial_enrollment_period(birth, today)?;
            }
            QuizAnswer::MedicareParts(value) => next.has_part_ab = Some(value),
            QuizAnswer::CurrentCoverage(value) => next.current_coverage = Some(value),
            QuizAnswer::Veteran(value) => next.is_veteran = Some(value),
            QuizAnswer::UsesVa(value) => next.uses_va = Some(value),
            QuizAnswer::ToggleVaPreference(tag) => {
                let tag = tag.trim();
                if tag.is_empty() {
                    return Err(AnswerError::EmptyPreference);
                }
                next.va_preferences = toggle_preference(&next.va_preferences, tag);
            }
            QuizAnswer::Medicaid(value) => next.has_medicaid = Some(value),
            QuizAnswer::Budget(value) => next.budget_choice = Some(value),
        }
        Ok(next)
    }

    /// Number of questions answered so far, counting the conditional ones that were reached.
    pub fn answered_steps(&self) -> usize {
        [
            self.birth_date().is_some(),
            self.has_part_ab.is_some(),
            self.current_coverage.is_some(),
            self.is_veteran.is_some(),
            self.uses_va.is_some(),
            !self.va_preferences.is_empty(),
            self.has_medicaid.is_some(),
            self.budget_choice.is_some(),
        ]
        .iter()
        .filter(|answered| **answered)
        .count()
    }

    pub fn va_preferences_csv(&self) -> String {
        self.va_preferences
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn toggle_preference(current: &BTreeSet<String>, tag: &str) -> BTreeSet<String> {
    if tag == NONE_APPLY {
        if current.contains(NONE_APPLY) {
            return BTreeSet::new();
        }
        return BTreeSet::from([NONE_APPLY.to_string()]);
    }

    let mut next: BTreeSet<String> = current
        .iter()
        .filter(|existing| existing.as_str() != NONE_APPLY)
        .cloned()
        .collect();
    if !next.remove(tag) {
        next.insert(tag.to_string());
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).expect("valid date")
    }

    fn toggle(answers: QuizAnswers, tag: &str) -> QuizAnswers {
        answers
            .apply(QuizAnswer::ToggleVaPreference(tag.to_string()), today())
            .expect("toggle applies")
    }

    #[test]
    fn fresh_record_is_entirely_unset() {
        let answers = QuizAnswers::default();
        assert_eq!(answers.birth_date(), None);
        assert_eq!(answers.has_part_ab, None);
        assert_eq!(answers.budget_choice, None);
        assert!(answers.va_preferences.is_empty());
        assert_eq!(answers.answered_steps(), 0);
    }

    #[test]
    fn birth_date_answer_derives_iep_flag() {
        let answers = QuizAnswers::default()
            .apply(
                QuizAnswer::BirthDate {
                    month: "June".to_string(),
                    year: "1959".to_string(),
                },
                today(),
            )
            .expect("valid birth date");

        assert_eq!(answers.birth_month, Some(BirthMonth::June));
        assert_eq!(answers.birth_year, Some(1959));
        assert!(answers.is_in_iep);
    }

    #[test]
    fn invalid_birth_month_leaves_record_untouched() {
        let original = QuizAnswers::default();
        let result = original.clone().apply(
            QuizAnswer::BirthDate {
                month: "june".to_string(),
                year: "1959".to_string(),
            },
            today(),
        );

        assert!(matches!(
            result,
            Err(AnswerError::BirthDate(CalendarError::UnknownMonth(_)))
        ));
        assert_eq!(original, QuizAnswers::default());
    }

    #[test]
    fn none_apply_clears_other_tags_and_vice_versa() {
        let answers = toggle(QuizAnswers::default(), "primary_care_at_va");
        let answers = toggle(answers, "travel_often");
        assert_eq!(answers.va_preferences.len(), 2);

        let answers = toggle(answers, NONE_APPLY);
        assert_eq!(
            answers.va_preferences,
            BTreeSet::from([NONE_APPLY.to_string()])
        );

        let answers = toggle(answers, "travel_often");
        assert_eq!(
            answers.va_preferences,
            BTreeSet::from(["travel_often".to_string()])
        );
    }

    #[test]
    fn toggling_twice_removes_the_tag() {
        let answers = toggle(QuizAnswers::default(), NONE_APPLY);
        let answers = toggle(answers, NONE_APPLY);
        assert!(answers.va_preferences.is_empty());

        let answers = toggle(answers, "specialists");
        let answers = toggle(answers, "specialists");
        assert!(answers.va_preferences.is_empty());
    }

    #[test]
    fn blank_preference_tags_are_rejected() {
        let result =
            QuizAnswers::default().apply(QuizAnswer::ToggleVaPreference("  ".to_string()), today());
        assert_eq!(result, Err(AnswerError::EmptyPreference));
    }

    #[test]
    fn answered_steps_counts_conditional_questions() {
        let answers = QuizAnswers {
            birth_month: Some(BirthMonth::March),
            birth_year: Some(1960),
            has_part_ab: Some(true),
            current_coverage: Some(CurrentCoverage::PartsAbOnly),
            is_veteran: Some(false),
            has_medicaid: Some(false),
            budget_choice: Some(BudgetChoice::Flexible),
            ..QuizAnswers::default()
        };
        assert_eq!(answers.answered_steps(), 6);
    }

    #[test]
    fn deserializes_partial_payloads() {
        let answers: QuizAnswers = serde_json::from_str(
            r#"{"birth_month":"June","birth_year":1959,"current_coverage":"medigap","budget_choice":"lower_cost"}"#,
        )
        .expect("partial payload parses");
        assert_eq!(answers.current_coverage, Some(CurrentCoverage::Medigap));
        assert_eq!(answers.budget_choice, Some(BudgetChoice::LowerCost));
        assert_eq!(answers.has_medicaid, None);
    }

    #[test]
    fn out_of_range_birth_years_fail_to_deserialize() {
        for payload in [
            r#"{"birth_month":"June","birth_year":2147483647}"#,
            r#"{"birth_month":"June","birth_year":-2147483648}"#,
            r#"{"birth_year":59}"#,
            r#"{"birth_year":99999999999}"#,
        ] {
            let parsed: Result<QuizAnswers, _> = serde_json::from_str(payload);
            let err = parsed.expect_err("year outside 1000..=9999 is rejected");
            assert!(err.to_string().contains("4-digit year"), "{payload}: {err}");
        }

        let answers: QuizAnswers =
            serde_json::from_str(r#"{"birth_year":null}"#).expect("null year parses");
        assert_eq!(answers.birth_year, None);
    }
}
