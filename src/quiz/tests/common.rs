use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::config::QuizConfig;
use crate::quiz::answers::{BudgetChoice, CurrentCoverage, QuizAnswers};
use crate::quiz::calendar::BirthMonth;
use crate::quiz::contact::ContactInfo;
use crate::quiz::delivery::{
    AnalyticsEvent, AnalyticsSink, CrmContact, CrmSync, DeliveryError, LeadId, LeadRecord,
    LeadStore,
};
use crate::quiz::service::{LeadService, LeadSubmission};
use crate::quiz::quiz_router;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 15).expect("valid date")
}

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn quiz_config() -> QuizConfig {
    QuizConfig {
        url_slug: "ntm-quiz-test".to_string(),
        submit_location: "ntm_quiz_test".to_string(),
    }
}

/// Non-veteran on Parts A and B only, no Medicaid, flexible budget: lands on R02.
pub(super) fn finished_answers() -> QuizAnswers {
    QuizAnswers {
        birth_month: Some(BirthMonth::June),
        birth_year: Some(1959),
        is_in_iep: true,
        has_part_ab: Some(true),
        current_coverage: Some(CurrentCoverage::PartsAbOnly),
        is_veteran: Some(false),
        has_medicaid: Some(false),
        budget_choice: Some(BudgetChoice::Flexible),
        ..QuizAnswers::default()
    }
}

pub(super) fn contact() -> ContactInfo {
    ContactInfo {
        first_name: "Dana".to_string(),
        zipcode: "50309".to_string(),
        email: "dana@example.com".to_string(),
        phone: Some("515-555-0143".to_string()),
    }
}

pub(super) fn submission() -> LeadSubmission {
    LeadSubmission {
        answers: finished_answers(),
        contact: contact(),
        quiz_session_id: Some("session-42".to_string()),
        utm: BTreeMap::from([
            ("UTM_Source".to_string(), "facebook".to_string()),
            ("utm_campaign".to_string(), "fall-aep".to_string()),
            ("utm_creative".to_string(), String::new()),
        ]),
    }
}

pub(super) fn early_exit_submission() -> LeadSubmission {
    LeadSubmission {
        answers: QuizAnswers {
            current_coverage: Some(CurrentCoverage::MedicareAdvantage),
            ..finished_answers()
        },
        ..submission()
    }
}

pub(super) fn build_service() -> (
    LeadService<MemoryLeadStore, MemoryCrm, MemoryAnalytics>,
    Arc<MemoryLeadStore>,
    Arc<MemoryCrm>,
    Arc<MemoryAnalytics>,
) {
    let store = Arc::new(MemoryLeadStore::default());
    let crm = Arc::new(MemoryCrm::default());
    let analytics = Arc::new(MemoryAnalytics::default());
    let service = LeadService::new(store.clone(), crm.clone(), analytics.clone(), quiz_config());
    (service, store, crm, analytics)
}

#[derive(Default, Clone)]
pub(super) struct MemoryLeadStore {
    pub(super) records: Arc<Mutex<HashMap<LeadId, LeadRecord>>>,
}

impl MemoryLeadStore {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("lead store mutex poisoned").len()
    }
}

impl LeadStore for MemoryLeadStore {
    fn insert(&self, record: LeadRecord) -> Result<LeadRecord, DeliveryError> {
        let mut guard = self.records.lock().expect("lead store mutex poisoned");
        if guard.contains_key(&record.lead_id) {
            return Err(DeliveryError::Conflict);
        }
        guard.insert(record.lead_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, DeliveryError> {
        let guard = self.records.lock().expect("lead store mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryCrm {
    contacts: Arc<Mutex<Vec<CrmContact>>>,
}

impl MemoryCrm {
    pub(super) fn contacts(&self) -> Vec<CrmContact> {
        self.contacts.lock().expect("crm mutex poisoned").clone()
    }
}

impl CrmSync for MemoryCrm {
    fn push(&self, contact: CrmContact) -> Result<(), DeliveryError> {
        self.contacts.lock().expect("crm mutex poisoned").push(contact);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAnalytics {
    events: Arc<Mutex<Vec<AnalyticsEvent>>>,
}

impl MemoryAnalytics {
    pub(super) fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().expect("analytics mutex poisoned").clone()
    }

    pub(super) fn names(&self) -> Vec<String> {
        self.events()
            .iter()
            .map(|event| event.name().to_string())
            .collect()
    }
}

impl AnalyticsSink for MemoryAnalytics {
    fn emit(&self, event: AnalyticsEvent) -> Result<(), DeliveryError> {
        self.events
            .lock()
            .expect("analytics mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(super) struct OfflineCrm;

impl CrmSync for OfflineCrm {
    fn push(&self, _contact: CrmContact) -> Result<(), DeliveryError> {
        Err(DeliveryError::Unavailable("crm offline".to_string()))
    }
}

pub(super) struct RejectingAnalytics;

impl AnalyticsSink for RejectingAnalytics {
    fn emit(&self, _event: AnalyticsEvent) -> Result<(), DeliveryError> {
        Err(DeliveryError::Rejected("sink closed".to_string()))
    }
}

pub(super) struct UnavailableLeadStore;

impl LeadStore for UnavailableLeadStore {
    fn insert(&self, _record: LeadRecord) -> Result<LeadRecord, DeliveryError> {
        Err(DeliveryError::Unavailable("lead store offline".to_string()))
    }

    fn fetch(&self, _id: &LeadId) -> Result<Option<LeadRecord>, DeliveryError> {
        Err(DeliveryError::Unavailable("lead store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn quiz_router_with_service(
    service: LeadService<MemoryLeadStore, MemoryCrm, MemoryAnalytics>,
) -> axum::Router {
    quiz_router(Arc::new(service))
}
