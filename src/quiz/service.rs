use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::QuizConfig;

use super::age::{age_group, calculate_age, AgeGroup};
use super::answers::QuizAnswers;
use super::calendar::CalendarError;
use super::classifier::{classify, Classification, ClassificationError};
use super::contact::{ContactInfo, ContactViolation};
use super::delivery::{
    normalize_utm, AnalyticsEvent, AnalyticsSink, CrmContact, CrmSync, DeliveryError,
    LeadId, LeadRecord, LeadStore, LeadSubmittedEvent, PageViewEvent, QuizCompletedEvent,
    UserAgeEvent,
};
use super::eligibility::iep_window_label;
use super::flow::{QuizSession, QuizStep};
use super::result::ResultCategory;

/// Lead form submission: the finished answer set plus contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSubmission {
    pub answers: QuizAnswers,
    pub contact: ContactInfo,
    #[serde(default)]
    pub quiz_session_id: Option<String>,
    #[serde(default)]
    pub utm: BTreeMap<String, String>,
}

/// Service composing the classifier with the lead, CRM, and analytics collaborators.
pub struct LeadService<S, C, A> {
    store: Arc<S>,
    crm: Arc<C>,
    analytics: Arc<A>,
    config: QuizConfig,
}

static LEAD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_lead_id() -> LeadId {
    let id = LEAD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LeadId(format!("lead-{id:06}"))
}

impl<S, C, A> LeadService<S, C, A>
where
    S: LeadStore + 'static,
    C: CrmSync + 'static,
    A: AnalyticsSink + 'static,
{
    pub fn new(store: Arc<S>, crm: Arc<C>, analytics: Arc<A>, config: QuizConfig) -> Self {
        Self {
            store,
            crm,
            analytics,
            config,
        }
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    /// Validate, classify, and store a lead. CRM and analytics delivery are best effort.
    pub fn submit_lead(
        &self,
        submission: LeadSubmission,
        today: NaiveDate,
    ) -> Result<LeadRecord, LeadServiceError> {
        let LeadSubmission {
            answers,
            contact,
            quiz_session_id,
            utm,
        } = submission;

        let contact = contact.validate()?;
        let Classification { result, .. } = classify(&answers)?;
        let recommended_plan = result
            .plan_name()
            .ok_or(LeadServiceError::NotStorable(result))?;

        let age = answers
            .birth_date()
            .map(|birth| calculate_age(birth, today))
            .transpose()?;
        let record = LeadRecord {
            lead_id: next_lead_id(),
            quiz_session_id: quiz_session_id.unwrap_or_else(|| "unknown".to_string()),
            result,
            recommended_plan: recommended_plan.to_string(),
            medicare_ab: answers.has_part_ab.unwrap_or(false),
            age_group: age.map(age_group),
            age,
            answers,
            contact,
            url_slug: self.config.url_slug.clone(),
            utm: normalize_utm(utm),
            submitted_on: today,
        };

        let stored = self.store.insert(record)?;
        info!(
            lead_id = %stored.lead_id.0,
            result = stored.result.code(),
            plan = %stored.recommended_plan,
            "lead stored"
        );

        let contact = CrmContact::from_record(&stored, &self.config.submit_location);
        if let Err(err) = self.crm.push(contact) {
            warn!(lead_id = %stored.lead_id.0, error = %err, "crm sync failed");
        }

        self.emit(AnalyticsEvent::LeadSubmitted(LeadSubmittedEvent {
            recommended_plan: stored.recommended_plan.clone(),
            medicare_ab: stored.medicare_ab,
        }));

        Ok(stored)
    }

    /// Classify a finished quiz and report the funnel snapshot.
    pub fn complete_quiz(
        &self,
        answers: &QuizAnswers,
    ) -> Result<Classification, LeadServiceError> {
        let classification = classify(answers)?;
        self.emit(AnalyticsEvent::QuizCompleted(QuizCompletedEvent::new(
            classification.result,
            answers,
        )));
        Ok(classification)
    }

    /// Report the respondent's age band once the birth date is known.
    pub fn capture_birth_date(
        &self,
        answers: &QuizAnswers,
        session_id: Option<String>,
        today: NaiveDate,
    ) -> Option<(i32, AgeGroup)> {
        let birth = answers.birth_date()?;
        let age = calculate_age(birth, today).ok()?;
        let group = age_group(age);
        self.emit(AnalyticsEvent::UserAgeCaptured(UserAgeEvent {
            session_id,
            birth_month: birth.month,
            birth_year: birth.year,
            user_age: age,
            age_group: group,
        }));
        Some((age, group))
    }

    /// Emit `is_new_to_medicare` when it holds, at most once per session.
    pub fn report_new_to_medicare(&self, session: &mut QuizSession, today: NaiveDate) -> bool {
        match session.take_new_to_medicare_signal(today) {
            Some(signal) => {
                self.emit(AnalyticsEvent::NewToMedicare(signal));
                true
            }
            None => false,
        }
    }

    /// Emit the page view for the session's current screen, once per session.
    pub fn track_view(&self, session: &mut QuizSession) -> bool {
        let step = session.step();
        if !session.mark_view(step) {
            return false;
        }

        let (iep_window, medicare_ab_status) = match step {
            QuizStep::Result(_) => (
                iep_window_label(session.answers()),
                Some(session.answers().has_part_ab.unwrap_or(false)),
            ),
            _ => (None, None),
        };

        self.emit(AnalyticsEvent::PageView(PageViewEvent {
            name: step.view_event().to_string(),
            iep_window,
            medicare_ab_status,
        }));
        true
    }

    pub fn get(&self, lead_id: &LeadId) -> Result<LeadRecord, LeadServiceError> {
        self.store
            .fetch(lead_id)?
            .ok_or_else(|| LeadServiceError::NotFound(lead_id.clone()))
    }

    fn emit(&self, event: AnalyticsEvent) {
        let name = event.name().to_string();
        if let Err(err) = self.analytics.emit(event) {
            warn!(event = %name, error = %err, "analytics delivery failed");
        }
    }
}

/// Error raised by the lead service.
#[derive(Debug, thiserror::Error)]
pub enum LeadServiceError {
    #[error(transparent)]
    Contact(#[from] ContactViolation),
    #[error(transparent)]
    Classification(#[from] ClassificationError),
    #[error(transparent)]
    BirthDate(#[from] CalendarError),
    #[error("result {0} does not produce a storable lead")]
    NotStorable(ResultCategory),
    #[error("lead {0} not found")]
    NotFound(LeadId),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}
