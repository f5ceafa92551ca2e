//! Seams to the collaborators that receive quiz output: lead storage, the CRM, and the
//! analytics sink. Implementations live with the binary; tests use in-memory fakes.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::age::AgeGroup;
use super::answers::{BudgetChoice, CurrentCoverage, QuizAnswers};
use super::calendar::BirthMonth;
use super::contact::ContactInfo;
use super::result::ResultCategory;
use super::segmentation::NewToMedicareSignal;

/// Identifier wrapper for stored leads.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LeadId(pub String);

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the lead-storage endpoint receives for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub lead_id: LeadId,
    pub quiz_session_id: String,
    pub result: ResultCategory,
    pub recommended_plan: String,
    pub medicare_ab: bool,
    pub answers: QuizAnswers,
    pub contact: ContactInfo,
    pub age: Option<i32>,
    pub age_group: Option<AgeGroup>,
    pub url_slug: String,
    pub utm: BTreeMap<String, String>,
    pub submitted_on: NaiveDate,
}

/// CRM contact payload; plan name comes from the fixed category table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmContact {
    pub firstname: String,
    pub email: String,
    pub phone: Option<String>,
    pub zipcode: String,
    pub medicare_ab: bool,
    pub recommended_plan: String,
    pub submit_location: String,
    pub url_slug: String,
    pub birth_month: Option<BirthMonth>,
    pub birth_year: Option<i32>,
    pub age: Option<i32>,
    pub utm_source: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_creative: Option<String>,
}

impl CrmContact {
    pub fn from_record(record: &LeadRecord, submit_location: &str) -> Self {
        Self {
            firstname: record.contact.first_name.clone(),
            email: record.contact.email.clone(),
            phone: record.contact.formatted_phone(),
            zipcode: record.contact.zipcode.clone(),
            medicare_ab: record.medicare_ab,
            recommended_plan: record.recommended_plan.clone(),
            submit_location: submit_location.to_string(),
            url_slug: record.url_slug.clone(),
            birth_month: record.answers.birth_month,
            birth_year: record.answers.birth_year,
            age: record.age,
            utm_source: record.utm.get("utm_source").cloned(),
            utm_campaign: record.utm.get("utm_campaign").cloned(),
            utm_creative: record.utm.get("utm_creative").cloned(),
        }
    }
}

/// Funnel snapshot sent when a result is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizCompletedEvent {
    pub result_id: ResultCategory,
    pub result_name: String,
    pub birth_month: Option<BirthMonth>,
    pub birth_year: Option<i32>,
    pub is_in_iep: bool,
    pub has_part_ab: Option<bool>,
    pub current_coverage: Option<CurrentCoverage>,
    pub is_veteran: Option<bool>,
    pub uses_va: Option<bool>,
    pub va_preferences: String,
    pub has_medicaid: Option<bool>,
    pub budget_choice: Option<BudgetChoice>,
    pub is_early_exit: bool,
    pub total_steps_completed: usize,
}

impl QuizCompletedEvent {
    pub fn new(result: ResultCategory, answers: &QuizAnswers) -> Self {
        Self {
            result_id: result,
            result_name: result.analytics_name().to_string(),
            birth_month: answers.birth_month,
            birth_year: answers.birth_year,
            is_in_iep: answers.is_in_iep,
            has_part_ab: answers.has_part_ab,
            current_coverage: answers.current_coverage,
            is_veteran: answers.is_veteran,
            uses_va: answers.uses_va,
            va_preferences: answers.va_preferences_csv(),
            has_medicaid: answers.has_medicaid,
            budget_choice: answers.budget_choice,
            is_early_exit: result.is_early_exit(),
            total_steps_completed: answers.answered_steps(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAgeEvent {
    pub session_id: Option<String>,
    pub birth_month: BirthMonth,
    pub birth_year: i32,
    pub user_age: i32,
    pub age_group: AgeGroup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageViewEvent {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iep_window: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medicare_ab_status: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSubmittedEvent {
    pub recommended_plan: String,
    pub medicare_ab: bool,
}

/// Events accepted by the analytics sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum AnalyticsEvent {
    #[serde(rename = "page_view")]
    PageView(PageViewEvent),
    #[serde(rename = "quiz_completed")]
    QuizCompleted(QuizCompletedEvent),
    #[serde(rename = "user_age_captured")]
    UserAgeCaptured(UserAgeEvent),
    #[serde(rename = "is_new_to_medicare")]
    NewToMedicare(NewToMedicareSignal),
    #[serde(rename = "ntm_quiz_lead")]
    LeadSubmitted(LeadSubmittedEvent),
}

impl AnalyticsEvent {
    pub fn name(&self) -> &str {
        match self {
            AnalyticsEvent::PageView(view) => &view.name,
            AnalyticsEvent::QuizCompleted(_) => "quiz_completed",
            AnalyticsEvent::UserAgeCaptured(_) => "user_age_captured",
            AnalyticsEvent::NewToMedicare(_) => "is_new_to_medicare",
            AnalyticsEvent::LeadSubmitted(_) => "ntm_quiz_lead",
        }
    }
}

/// Error enumeration for collaborator failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("record already exists")]
    Conflict,
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    #[error("collaborator rejected payload: {0}")]
    Rejected(String),
}

/// Lead storage endpoint.
pub trait LeadStore: Send + Sync {
    fn insert(&self, record: LeadRecord) -> Result<LeadRecord, DeliveryError>;
    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, DeliveryError>;
}

/// CRM sync endpoint.
pub trait CrmSync: Send + Sync {
    fn push(&self, contact: CrmContact) -> Result<(), DeliveryError>;
}

/// Analytics sink (tag manager, product analytics).
pub trait AnalyticsSink: Send + Sync {
    fn emit(&self, event: AnalyticsEvent) -> Result<(), DeliveryError>;
}

/// Lower-case keys and drop empty values from landing-page query parameters.
pub fn normalize_utm(params: BTreeMap<String, String>) -> BTreeMap<String, String> {
    params
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| (key.to_ascii_lowercase(), value))
        .collect()
}
