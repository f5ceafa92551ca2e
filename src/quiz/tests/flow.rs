use super::common::*;
use crate::quiz::answers::{AnswerError, BudgetChoice, CurrentCoverage, QuizAnswer, QuizAnswers};
use crate::quiz::calendar::{BirthMonth, CalendarError};
use crate::quiz::classifier::ClassificationError;
use crate::quiz::flow::{next_step, FlowError, QuizSession, QuizStep, TOTAL_PROGRESS_STEPS};
use crate::quiz::result::ResultCategory;

fn birth(month: &str, year: &str) -> QuizAnswer {
    QuizAnswer::BirthDate {
        month: month.to_string(),
        year: year.to_string(),
    }
}

fn session_past_birth_date(on: chrono::NaiveDate) -> QuizSession {
    let mut session = QuizSession::new();
    session.advance().expect("start screen advances");
    session
        .record(birth("June", "1959"), on)
        .expect("birth date accepted");
    session
}

#[test]
fn veteran_walk_reaches_va_advantage_result() {
    let mut session = session_past_birth_date(today());
    assert_eq!(session.step(), QuizStep::InitialEnrollment);
    assert!(session.answers().is_in_iep);

    assert_eq!(session.advance(), Ok(QuizStep::MedicareParts));
    assert_eq!(
        session.record(QuizAnswer::MedicareParts(true), today()),
        Ok(QuizStep::CurrentCoverage)
    );
    assert_eq!(
        session.record(
            QuizAnswer::CurrentCoverage(CurrentCoverage::PartsAbOnly),
            today()
        ),
        Ok(QuizStep::VeteranStatus)
    );
    assert_eq!(
        session.record(QuizAnswer::Veteran(true), today()),
        Ok(QuizStep::UsesVa)
    );
    assert_eq!(
        session.record(QuizAnswer::UsesVa(true), today()),
        Ok(QuizStep::VaPreferences)
    );
    assert_eq!(
        session.record(
            QuizAnswer::ToggleVaPreference("primary_care_at_va".to_string()),
            today()
        ),
        Ok(QuizStep::VaPreferences)
    );
    assert_eq!(session.advance(), Ok(QuizStep::Medicaid));
    assert_eq!(
        session.record(QuizAnswer::Medicaid(false), today()),
        Ok(QuizStep::BudgetIntro)
    );
    assert_eq!(session.advance(), Ok(QuizStep::BudgetStorySam));
    assert_eq!(session.advance(), Ok(QuizStep::BudgetStoryAlex));
    assert_eq!(session.advance(), Ok(QuizStep::BudgetChoice));
    assert_eq!(
        session.record(QuizAnswer::Budget(BudgetChoice::LowerCost), today()),
        Ok(QuizStep::Result(ResultCategory::R04))
    );

    assert_eq!(session.result(), Some(ResultCategory::R04));
    assert_eq!(session.answers().answered_steps(), 8);
    assert_eq!(
        session.record(QuizAnswer::Medicaid(true), today()),
        Err(FlowError::Finished(ResultCategory::R04))
    );
}

#[test]
fn outside_iep_skips_the_information_screen() {
    let session = session_past_birth_date(date(2023, 1, 1));
    assert!(!session.answers().is_in_iep);
    assert_eq!(session.step(), QuizStep::MedicareParts);
}

#[test]
fn existing_coverage_ends_the_quiz_immediately() {
    let mut session = session_past_birth_date(date(2023, 1, 1));
    session
        .record(QuizAnswer::MedicareParts(true), today())
        .expect("parts answered");

    let step = session
        .record(QuizAnswer::CurrentCoverage(CurrentCoverage::Medigap), today())
        .expect("coverage answered");

    assert_eq!(step, QuizStep::Result(ResultCategory::R09));
    assert!(step.is_terminal());
    assert!(ResultCategory::R09.is_early_exit());
}

#[test]
fn medicaid_yes_short_circuits_to_dual_eligible() {
    let answers = QuizAnswers {
        has_part_ab: Some(false),
        is_veteran: Some(false),
        has_medicaid: Some(true),
        ..QuizAnswers::default()
    };
    assert_eq!(
        next_step(QuizStep::Medicaid, &answers),
        Ok(QuizStep::Result(ResultCategory::R03))
    );
}

#[test]
fn routing_without_parts_goes_straight_to_veteran_question() {
    let answers = QuizAnswers {
        has_part_ab: Some(false),
        ..QuizAnswers::default()
    };
    assert_eq!(
        next_step(QuizStep::MedicareParts, &answers),
        Ok(QuizStep::VeteranStatus)
    );

    let non_veteran = QuizAnswers {
        is_veteran: Some(false),
        ..answers
    };
    assert_eq!(
        next_step(QuizStep::VeteranStatus, &non_veteran),
        Ok(QuizStep::Medicaid)
    );
}

#[test]
fn unanswered_steps_cannot_be_left() {
    let empty = QuizAnswers::default();
    for step in [
        QuizStep::BirthDate,
        QuizStep::MedicareParts,
        QuizStep::CurrentCoverage,
        QuizStep::VeteranStatus,
        QuizStep::UsesVa,
        QuizStep::VaPreferences,
        QuizStep::Medicaid,
        QuizStep::BudgetChoice,
    ] {
        assert_eq!(next_step(step, &empty), Err(FlowError::Unanswered(step)));
    }
}

#[test]
fn veteran_budget_choice_without_va_answer_is_a_classification_error() {
    let answers = QuizAnswers {
        is_veteran: Some(true),
        budget_choice: Some(BudgetChoice::Flexible),
        ..QuizAnswers::default()
    };
    assert_eq!(
        next_step(QuizStep::BudgetChoice, &answers),
        Err(FlowError::Classification(ClassificationError::MissingVaUsage))
    );
}

#[test]
fn answers_for_other_screens_are_rejected() {
    let mut session = QuizSession::new();
    session.advance().expect("start advances");

    let err = session
        .record(QuizAnswer::Veteran(true), today())
        .expect_err("veteran answer out of order");
    assert_eq!(
        err,
        FlowError::UnexpectedAnswer {
            current: QuizStep::BirthDate,
            answered: QuizStep::VeteranStatus,
        }
    );
    assert_eq!(session.answers(), &QuizAnswers::default());
}

#[test]
fn malformed_birth_month_keeps_the_session_on_the_birth_date_screen() {
    let mut session = QuizSession::new();
    session.advance().expect("start advances");

    let err = session
        .record(birth("Juneuary", "1959"), today())
        .expect_err("unknown month");
    assert_eq!(
        err,
        FlowError::Answer(AnswerError::BirthDate(CalendarError::UnknownMonth(
            "Juneuary".to_string()
        )))
    );
    assert_eq!(session.step(), QuizStep::BirthDate);
    assert_eq!(session.answers().birth_month, None);
}

#[test]
fn progress_header_counts_to_ten() {
    assert_eq!(QuizStep::Start.progress(), 0);
    assert_eq!(QuizStep::BirthDate.progress(), 1);
    assert_eq!(QuizStep::InitialEnrollment.progress(), 1);
    assert_eq!(QuizStep::Medicaid.progress(), 6);
    assert_eq!(QuizStep::BudgetChoice.progress(), TOTAL_PROGRESS_STEPS);
    assert_eq!(
        QuizStep::Result(ResultCategory::R01).progress(),
        TOTAL_PROGRESS_STEPS
    );
    assert_eq!(QuizStep::BirthDate.view_event(), "View_ntm_quiz_birthMonth");
}

#[test]
fn view_guard_fires_once_per_screen() {
    let mut session = QuizSession::new();
    assert!(session.mark_view(QuizStep::Start));
    assert!(!session.mark_view(QuizStep::Start));
    assert!(session.mark_view(QuizStep::BirthDate));
}

#[test]
fn new_to_medicare_signal_is_handed_out_once_until_restart() {
    let mut session = session_past_birth_date(date(2023, 1, 1));
    assert!(session.take_new_to_medicare_signal(date(2023, 1, 1)).is_none());

    session
        .record(QuizAnswer::MedicareParts(false), date(2023, 1, 1))
        .expect("parts answered");

    let signal = session
        .take_new_to_medicare_signal(date(2023, 1, 1))
        .expect("unenrolled and more than six months out");
    assert_eq!(signal.birth_month, BirthMonth::June);
    assert!(session.new_to_medicare_reported());
    assert!(session.take_new_to_medicare_signal(date(2023, 1, 1)).is_none());

    session.mark_view(QuizStep::Start);
    session.restart();
    assert!(!session.new_to_medicare_reported());
    assert_eq!(session.step(), QuizStep::Start);
    assert_eq!(session.answers(), &QuizAnswers::default());
    assert!(session.mark_view(QuizStep::Start));
}
