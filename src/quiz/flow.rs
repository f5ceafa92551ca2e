//! Question routing and per-session bookkeeping.
//!
//! Every answer produces a fresh [`QuizAnswers`] record; the session only swaps the record it
//! holds. Fire-once analytics guards live on the session rather than in ambient storage.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::answers::{AnswerError, CurrentCoverage, QuizAnswer, QuizAnswers};
use super::classifier::{classify, ClassificationError};
use super::result::ResultCategory;
use super::segmentation::NewToMedicareSignal;

/// Total number of positions shown in the quiz progress header.
pub const TOTAL_PROGRESS_STEPS: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStep {
    Start,
    BirthDate,
    InitialEnrollment,
    MedicareParts,
    CurrentCoverage,
    VeteranStatus,
    UsesVa,
    VaPreferences,
    Medicaid,
    BudgetIntro,
    BudgetStorySam,
    BudgetStoryAlex,
    BudgetChoice,
    Result(ResultCategory),
}

impl QuizStep {
    /// Position in the progress header.
    pub const fn progress(self) -> u8 {
        match self {
            QuizStep::Start => 0,
            QuizStep::BirthDate | QuizStep::InitialEnrollment => 1,
            QuizStep::MedicareParts | QuizStep::CurrentCoverage => 2,
            QuizStep::VeteranStatus => 3,
            QuizStep::UsesVa => 4,
            QuizStep::VaPreferences => 5,
            QuizStep::Medicaid => 6,
            QuizStep::BudgetIntro => 7,
            QuizStep::BudgetStorySam => 8,
            QuizStep::BudgetStoryAlex => 9,
            QuizStep::BudgetChoice | QuizStep::Result(_) => TOTAL_PROGRESS_STEPS,
        }
    }

    pub const fn analytics_name(self) -> &'static str {
        match self {
            QuizStep::Start => "splash",
            QuizStep::BirthDate => "birthday",
            QuizStep::InitialEnrollment => "in_iep",
            QuizStep::MedicareParts => "medicare_part_ab",
            QuizStep::CurrentCoverage => "current_coverage",
            QuizStep::VeteranStatus => "veteran_status",
            QuizStep::UsesVa => "uses_va",
            QuizStep::VaPreferences => "va_preferences",
            QuizStep::Medicaid => "medicaid",
            QuizStep::BudgetIntro => "tradeoffs_intro",
            QuizStep::BudgetStorySam => "tradeoffs_story_1",
            QuizStep::BudgetStoryAlex => "tradeoffs_story_2",
            QuizStep::BudgetChoice => "budget_choice",
            QuizStep::Result(_) => "result",
        }
    }

    pub const fn view_event(self) -> &'static str {
        match self {
            QuizStep::Start => "View_ntm_quiz_start",
            QuizStep::BirthDate => "View_ntm_quiz_birthMonth",
            QuizStep::InitialEnrollment => "View_ntm_quiz_inIEP",
            QuizStep::MedicareParts => "View_ntm_quiz_medicare_ab",
            QuizStep::CurrentCoverage => "View_ntm_quiz_current_coverage",
            QuizStep::VeteranStatus => "View_ntm_quiz_is_veteran",
            QuizStep::UsesVa => "View_ntm_quiz_uses_va",
            QuizStep::VaPreferences => "View_ntm_quiz_va_preference",
            QuizStep::Medicaid => "View_ntm_quiz_has_medicaid",
            QuizStep::BudgetIntro => "View_ntm_quiz_budget_choice_start",
            QuizStep::BudgetStorySam => "View_ntm_quiz_budget_choice_sam",
            QuizStep::BudgetStoryAlex => "View_ntm_quiz_budget_choice_alex",
            QuizStep::BudgetChoice => "View_ntm_quiz_budget_choice_decide",
            QuizStep::Result(result) => result.view_event(),
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, QuizStep::Result(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("step {0:?} has not been answered yet")]
    Unanswered(QuizStep),
    #[error("the quiz already finished with result {0}")]
    Finished(ResultCategory),
    #[error("answer for {answered:?} does not belong to step {current:?}")]
    UnexpectedAnswer { current: QuizStep, answered: QuizStep },
    #[error(transparent)]
    Answer(#[from] AnswerError),
    #[error(transparent)]
    Classification(#[from] ClassificationError),
}

/// Step the answer belongs to.
pub fn step_for(answer: &QuizAnswer) -> QuizStep {
    match answer {
        QuizAnswer::BirthDate { .. } => QuizStep::BirthDate,
        QuizAnswer::MedicareParts(_) => QuizStep::MedicareParts,
        QuizAnswer::CurrentCoverage(_) => QuizStep::CurrentCoverage,
        QuizAnswer::Veteran(_) => QuizStep::VeteranStatus,
        QuizAnswer::UsesVa(_) => QuizStep::UsesVa,
        QuizAnswer::ToggleVaPreference(_) => QuizStep::VaPreferences,
        QuizAnswer::Medicaid(_) => QuizStep::Medicaid,
        QuizAnswer::Budget(_) => QuizStep::BudgetChoice,
    }
}

/// Screen that follows `step` given the answers collected so far.
pub fn next_step(step: QuizStep, answers: &QuizAnswers) -> Result<QuizStep, FlowError> {
    let unanswered = move || FlowError::Unanswered(step);

    let next = match step {
        QuizStep::Start => QuizStep::BirthDate,
        QuizStep::BirthDate => {
            answers.birth_date().ok_or_else(unanswered)?;
            if answers.is_in_iep {
                QuizStep::InitialEnrollment
            } else {
                QuizStep::MedicareParts
            }
        }
        QuizStep::InitialEnrollment => QuizStep::MedicareParts,
        QuizStep::MedicareParts => match answers.has_part_ab.ok_or_else(unanswered)? {
            true => QuizStep::CurrentCoverage,
            false => QuizStep::VeteranStatus,
        },
        QuizStep::CurrentCoverage => match answers.current_coverage.ok_or_else(unanswered)? {
            CurrentCoverage::PartsAbOnly => QuizStep::VeteranStatus,
            CurrentCoverage::MedicareAdvantage | CurrentCoverage::Medigap => {
                QuizStep::Result(classify(answers)?.result)
            }
        },
        QuizStep::VeteranStatus => match answers.is_veteran.ok_or_else(unanswered)? {
            true => QuizStep::UsesVa,
            false => QuizStep::Medicaid,
        },
        QuizStep::UsesVa => match answers.uses_va.ok_or_else(unanswered)? {
            true => QuizStep::VaPreferences,
            false => QuizStep::Medicaid,
        },
        QuizStep::VaPreferences => {
            if answers.va_preferences.is_empty() {
                return Err(unanswered());
            }
            QuizStep::Medicaid
        }
        QuizStep::Medicaid => match answers.has_medicaid.ok_or_else(unanswered)? {
            true => QuizStep::Result(classify(answers)?.result),
            false => QuizStep::BudgetIntro,
        },
        QuizStep::BudgetIntro => QuizStep::BudgetStorySam,
        QuizStep::BudgetStorySam => QuizStep::BudgetStoryAlex,
        QuizStep::BudgetStoryAlex => QuizStep::BudgetChoice,
        QuizStep::BudgetChoice => {
            answers.budget_choice.ok_or_else(unanswered)?;
            QuizStep::Result(classify(answers)?.result)
        }
        QuizStep::Result(result) => return Err(FlowError::Finished(result)),
    };

    Ok(next)
}

/// One respondent's pass through the quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    answers: QuizAnswers,
    step: QuizStep,
    emitted_views: BTreeSet<&'static str>,
    new_to_medicare_reported: bool,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            answers: QuizAnswers::default(),
            step: QuizStep::Start,
            emitted_views: BTreeSet::new(),
            new_to_medicare_reported: false,
        }
    }

    pub fn answers(&self) -> &QuizAnswers {
        &self.answers
    }

    pub fn step(&self) -> QuizStep {
        self.step
    }

    pub fn result(&self) -> Option<ResultCategory> {
        match self.step {
            QuizStep::Result(result) => Some(result),
            _ => None,
        }
    }

    /// Apply an answer for the current step. Single-choice answers advance the session;
    /// VA preference toggles stay on the multi-select screen until [`Self::advance`].
    pub fn record(&mut self, answer: QuizAnswer, today: NaiveDate) -> Result<QuizStep, FlowError> {
        if let QuizStep::Result(result) = self.step {
            return Err(FlowError::Finished(result));
        }

        let answered = step_for(&answer);
        if answered != self.step {
            return Err(FlowError::UnexpectedAnswer {
                current: self.step,
                answered,
            });
        }

        let stays_on_screen = matches!(answer, QuizAnswer::ToggleVaPreference(_));
        self.answers = self.answers.clone().apply(answer, today)?;

        if stays_on_screen {
            Ok(self.step)
        } else {
            self.advance()
        }
    }

    /// Move past the current screen (informational screens, multi-select confirmation).
    pub fn advance(&mut self) -> Result<QuizStep, FlowError> {
        let next = next_step(self.step, &self.answers)?;
        debug!(from = ?self.step, to = ?next, "quiz advanced");
        self.step = next;
        Ok(next)
    }

    /// `true` the first time a given view event is seen this session.
    pub fn mark_view(&mut self, step: QuizStep) -> bool {
        self.emitted_views.insert(step.view_event())
    }

    /// The `is_new_to_medicare` signal, handed out at most once per session.
    pub fn take_new_to_medicare_signal(&mut self, today: NaiveDate) -> Option<NewToMedicareSignal> {
        if self.new_to_medicare_reported {
            return None;
        }
        let signal = NewToMedicareSignal::evaluate(&self.answers, today)?;
        self.new_to_medicare_reported = true;
        Some(signal)
    }

    pub fn new_to_medicare_reported(&self) -> bool {
        self.new_to_medicare_reported
    }

    /// Start over with unset answers and cleared guards.
    pub fn restart(&mut self) {
        *self = Self::new();
    }
}
