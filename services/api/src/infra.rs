use chrono::NaiveDate;
use medicare_quiz::quiz::{
    parse_birth_year, AnalyticsEvent, AnalyticsSink, BudgetChoice, CrmContact, CrmSync,
    CurrentCoverage, DeliveryError, LeadId, LeadRecord, LeadStore,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLeadStore {
    records: Arc<Mutex<HashMap<LeadId, LeadRecord>>>,
}

impl LeadStore for InMemoryLeadStore {
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

impl InMemoryLeadStore {
    pub(crate) fn len(&self) -> usize {
        self.records.lock().expect("lead store mutex poisoned").len()
    }
}

/// Stands in for the CRM form endpoint; contacts are kept so the demo can print them.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCrm {
    contacts: Arc<Mutex<Vec<CrmContact>>>,
}

impl CrmSync for InMemoryCrm {
    fn push(&self, contact: CrmContact) -> Result<(), DeliveryError> {
        info!(
            plan = %contact.recommended_plan,
            submit_location = %contact.submit_location,
            "crm contact queued"
        );
        let mut guard = self.contacts.lock().expect("crm mutex poisoned");
        guard.push(contact);
        Ok(())
    }
}

impl InMemoryCrm {
    pub(crate) fn contacts(&self) -> Vec<CrmContact> {
        self.contacts.lock().expect("crm mutex poisoned").clone()
    }
}

/// Analytics sink that writes each event to the trace log and keeps a copy.
#[derive(Default, Clone)]
pub(crate) struct TracingAnalyticsSink {
    events: Arc<Mutex<Vec<AnalyticsEvent>>>,
}

impl AnalyticsSink for TracingAnalyticsSink {
    fn emit(&self, event: AnalyticsEvent) -> Result<(), DeliveryError> {
        let payload = serde_json::to_string(&event)
            .map_err(|err| DeliveryError::Rejected(err.to_string()))?;
        debug!(event = event.name(), %payload, "analytics event");
        let mut guard = self.events.lock().expect("analytics mutex poisoned");
        guard.push(event);
        Ok(())
    }
}

impl TracingAnalyticsSink {
    pub(crate) fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().expect("analytics mutex poisoned").clone()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_year(raw: &str) -> Result<i32, String> {
    parse_birth_year(raw).map_err(|err| err.to_string())
}

pub(crate) fn parse_coverage(raw: &str) -> Result<CurrentCoverage, String> {
    [
        CurrentCoverage::PartsAbOnly,
        CurrentCoverage::MedicareAdvantage,
        CurrentCoverage::Medigap,
    ]
    .into_iter()
    .find(|coverage| coverage.label() == raw.trim().replace('-', "_"))
    .ok_or_else(|| {
        format!("unknown coverage '{raw}' (expected parts_ab_only, medicare_advantage, or medigap)")
    })
}

pub(crate) fn parse_budget(raw: &str) -> Result<BudgetChoice, String> {
    [BudgetChoice::Flexible, BudgetChoice::LowerCost]
        .into_iter()
        .find(|budget| budget.label() == raw.trim().replace('-', "_"))
        .ok_or_else(|| format!("unknown budget choice '{raw}' (expected flexible or lower_cost)"))
}
