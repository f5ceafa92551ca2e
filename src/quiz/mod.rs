//! Medicare plan-fit quiz: birth-date eligibility math, the result classifier, question
//! routing, and the seams that carry finished quizzes to lead storage, the CRM, and analytics.
//!
//! Everything below [`service`] is pure and takes the evaluation date as an argument; only the
//! HTTP layer reads the clock.

pub mod age;
pub mod answers;
pub mod calendar;
pub mod classifier;
pub mod contact;
pub mod delivery;
pub mod eligibility;
pub mod flow;
pub mod result;
pub mod router;
pub mod segmentation;
pub mod service;

#[cfg(test)]
mod tests;

pub use age::{age_group, calculate_age, AgeGroup};
pub use answers::{AnswerError, BudgetChoice, CurrentCoverage, QuizAnswer, QuizAnswers, NONE_APPLY};
pub use calendar::{check_birth_year, parse_birth_year, BirthDate, BirthMonth, CalendarError};
pub use classifier::{
    classify, determine_result, Classification, ClassificationError, ClassificationRule,
};
pub use contact::{ContactInfo, ContactViolation};
pub use delivery::{
    AnalyticsEvent, AnalyticsSink, CrmContact, CrmSync, DeliveryError, LeadId, LeadRecord,
    LeadStore,
};
pub use eligibility::{
    calculate_is_in_iep, enrollment_window, is_in_initial_enrollment_period, EnrollmentWindow,
};
pub use flow::{next_step, FlowError, QuizSession, QuizStep};
pub use result::{ResultCategory, ResultSummary};
pub use router::quiz_router;
pub use segmentation::{has_sufficient_data, is_new_to_medicare, NewToMedicareSignal};
pub use service::{LeadService, LeadServiceError, LeadSubmission};
