use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use medicare_quiz::config::QuizConfig;
use medicare_quiz::quiz::{
    AnalyticsEvent, AnalyticsSink, ContactInfo, CrmContact, CrmSync, DeliveryError, LeadId,
    LeadRecord, LeadService, LeadServiceError, LeadStore, LeadSubmission, QuizAnswer,
    QuizSession, QuizStep, ResultCategory,
};

#[derive(Default)]
struct Store {
    records: Mutex<HashMap<LeadId, LeadRecord>>,
}

impl LeadStore for Store {
    fn insert(&self, record: LeadRecord) -> Result<LeadRecord, DeliveryError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.insert(record.lead_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, DeliveryError> {
        Ok(self.records.lock().expect("store mutex poisoned").get(id).cloned())
    }
}

#[derive(Default)]
struct Crm {
    contacts: Mutex<Vec<CrmContact>>,
}

impl CrmSync for Crm {
    fn push(&self, contact: CrmContact) -> Result<(), DeliveryError> {
        self.contacts.lock().expect("crm mutex poisoned").push(contact);
        Ok(())
    }
}

#[derive(Default)]
struct Analytics {
    events: Mutex<Vec<String>>,
}

impl AnalyticsSink for Analytics {
    fn emit(&self, event: AnalyticsEvent) -> Result<(), DeliveryError> {
        self.events
            .lock()
            .expect("analytics mutex poisoned")
            .push(event.name().to_string());
        Ok(())
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 1).expect("valid date")
}

fn contact() -> ContactInfo {
    ContactInfo {
        first_name: "Alex".to_string(),
        zipcode: "52240".to_string(),
        email: "alex@example.com".to_string(),
        phone: None,
    }
}

fn walk(session: &mut QuizSession, answers: Vec<QuizAnswer>) -> QuizStep {
    session.advance().expect("start advances");
    for answer in answers {
        let mut step = session.record(answer, today()).expect("answer accepted");
        while matches!(
            step,
            QuizStep::InitialEnrollment
                | QuizStep::BudgetIntro
                | QuizStep::BudgetStorySam
                | QuizStep::BudgetStoryAlex
        ) {
            step = session.advance().expect("information screen advances");
        }
    }
    session.step()
}

#[test]
fn quiz_session_feeds_a_stored_lead() {
    let store = Arc::new(Store::default());
    let crm = Arc::new(Crm::default());
    let analytics = Arc::new(Analytics::default());
    let service = LeadService::new(
        store.clone(),
        crm.clone(),
        analytics.clone(),
        QuizConfig::default(),
    );

    let mut session = QuizSession::new();
    let step = walk(
        &mut session,
        vec![
            QuizAnswer::BirthDate {
                month: "June".to_string(),
                year: "1959".to_string(),
            },
            QuizAnswer::MedicareParts(false),
            QuizAnswer::Veteran(false),
            QuizAnswer::Medicaid(false),
            QuizAnswer::Budget(medicare_quiz::quiz::BudgetChoice::LowerCost),
        ],
    );
    assert_eq!(step, QuizStep::Result(ResultCategory::R01));

    let record = service
        .submit_lead(
            LeadSubmission {
                answers: session.answers().clone(),
                contact: contact(),
                quiz_session_id: None,
                utm: BTreeMap::new(),
            },
            today(),
        )
        .expect("lead stored");

    assert_eq!(record.recommended_plan, "Advantage");
    assert_eq!(record.age, Some(65));
    assert_eq!(record.quiz_session_id, "unknown");
    assert_eq!(service.get(&record.lead_id).expect("lead found"), record);

    let contacts = crm.contacts.lock().expect("crm mutex poisoned");
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].submit_location, QuizConfig::DEFAULT_SUBMIT_LOCATION);
    assert_eq!(contacts[0].phone, None);
}

#[test]
fn already_enrolled_respondents_never_become_leads() {
    let store = Arc::new(Store::default());
    let service = LeadService::new(
        store.clone(),
        Arc::new(Crm::default()),
        Arc::new(Analytics::default()),
        QuizConfig::default(),
    );

    let mut session = QuizSession::new();
    let step = walk(
        &mut session,
        vec![
            QuizAnswer::BirthDate {
                month: "June".to_string(),
                year: "1950".to_string(),
            },
            QuizAnswer::MedicareParts(true),
            QuizAnswer::CurrentCoverage(medicare_quiz::quiz::CurrentCoverage::Medigap),
        ],
    );
    assert_eq!(step, QuizStep::Result(ResultCategory::R09));

    let outcome = service.submit_lead(
        LeadSubmission {
            answers: session.answers().clone(),
            contact: contact(),
            quiz_session_id: Some("s-1".to_string()),
            utm: BTreeMap::new(),
        },
        today(),
    );
    assert!(matches!(
        outcome,
        Err(LeadServiceError::NotStorable(ResultCategory::R09))
    ));
    assert!(store.records.lock().expect("store mutex poisoned").is_empty());
}
