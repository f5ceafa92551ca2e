//! Priority-ordered rule list mapping a finished answer set to a [`ResultCategory`].
//!
//! Rules are evaluated top to bottom and the first match wins:
//!
//! 1. Medicaid eligibility always routes to the dual-eligible result.
//! 2. Existing Medicare Advantage or Medigap coverage exits early.
//! 3. Veterans receiving VA care split on the budget answer.
//! 4. Veterans outside the VA split on the budget answer.
//! 5. Everyone else splits on the budget answer.
//!
//! The question flow guarantees the discriminating answers are present before asking for a
//! result. A terminal branch that finds one missing is a caller bug and is reported, never
//! defaulted.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::answers::{BudgetChoice, CurrentCoverage, QuizAnswers};
use super::result::ResultCategory;

/// Rule that produced a classification, kept for audit trails and analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationRule {
    MedicaidOverride,
    AlreadyEnrolled,
    VeteranUsingVa,
    VeteranWithoutVa,
    NonVeteran,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub result: ResultCategory,
    pub rule: ClassificationRule,
}

/// Contract violations: the classifier was invoked before the flow collected what it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    #[error("budget choice must be answered before the {0:?} branch can produce a result")]
    MissingBudgetChoice(ClassificationRule),
    #[error("veterans must answer whether they use VA care before a result is produced")]
    MissingVaUsage,
}

pub fn classify(answers: &QuizAnswers) -> Result<Classification, ClassificationError> {
    let classification = classify_unlogged(answers)?;
    debug!(
        result = classification.result.code(),
        rule = ?classification.rule,
        "quiz answers classified"
    );
    Ok(classification)
}

fn classify_unlogged(answers: &QuizAnswers) -> Result<Classification, ClassificationError> {
    if answers.has_medicaid == Some(true) {
        return Ok(Classification {
            result: ResultCategory::R03,
            rule: ClassificationRule::MedicaidOverride,
        });
    }

    match answers.current_coverage {
        Some(CurrentCoverage::MedicareAdvantage) => {
            return Ok(Classification {
                result: ResultCategory::R08,
                rule: ClassificationRule::AlreadyEnrolled,
            })
        }
        Some(CurrentCoverage::Medigap) => {
            return Ok(Classification {
                result: ResultCategory::R09,
                rule: ClassificationRule::AlreadyEnrolled,
            })
        }
        Some(CurrentCoverage::PartsAbOnly) | None => {}
    }

    let (rule, flexible, lower_cost) = match (answers.is_veteran, answers.uses_va) {
        (Some(true), Some(true)) => (
            ClassificationRule::VeteranUsingVa,
            ResultCategory::R05,
            ResultCategory::R04,
        ),
        (Some(true), Some(false)) => (
            ClassificationRule::VeteranWithoutVa,
            ResultCategory::R07,
            ResultCategory::R06,
        ),
        (Some(true), None) => return Err(ClassificationError::MissingVaUsage),
        (Some(false) | None, _) => (
            ClassificationRule::NonVeteran,
            ResultCategory::R02,
            ResultCategory::R01,
        ),
    };

    let result = match answers.budget_choice {
        Some(BudgetChoice::Flexible) => flexible,
        Some(BudgetChoice::LowerCost) => lower_cost,
        None => return Err(ClassificationError::MissingBudgetChoice(rule)),
    };

    Ok(Classification { result, rule })
}

/// Result category for a finished quiz.
///
/// # Panics
///
/// Panics when a terminal branch is reached without the answers it discriminates on
/// (an unset budget choice, or a veteran without a VA usage answer). Use [`classify`] to
/// receive the violation as an error instead.
pub fn determine_result(answers: &QuizAnswers) -> ResultCategory {
    match classify(answers) {
        Ok(classification) => classification.result,
        Err(violation) => panic!("determine_result called too early: {violation}"),
    }
}
