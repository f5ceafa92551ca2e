use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;

use super::age::{age_group, calculate_age, AgeGroup};
use super::answers::QuizAnswers;
use super::calendar::BirthDate;
use super::classifier::ClassificationRule;
use super::delivery::{AnalyticsSink, CrmSync, LeadId, LeadRecord, LeadStore};
use super::eligibility::enrollment_window;
use super::flow::{next_step, QuizStep, TOTAL_PROGRESS_STEPS};
use super::result::{ResultCategory, ResultSummary};
use super::segmentation::{has_sufficient_data, is_new_to_medicare};
use super::service::{LeadService, LeadServiceError, LeadSubmission};

/// Router builder exposing the quiz engine and lead intake over HTTP.
pub fn quiz_router<S, C, A>(service: Arc<LeadService<S, C, A>>) -> Router
where
    S: LeadStore + 'static,
    C: CrmSync + 'static,
    A: AnalyticsSink + 'static,
{
    Router::new()
        .route("/api/v1/quiz/result", post(result_handler::<S, C, A>))
        .route("/api/v1/quiz/eligibility", post(eligibility_handler::<S, C, A>))
        .route("/api/v1/quiz/segment", post(segment_handler))
        .route("/api/v1/quiz/next", post(next_handler))
        .route("/api/v1/quiz/leads", post(lead_handler::<S, C, A>))
        .route("/api/v1/quiz/leads/:lead_id", get(lead_status_handler::<S, C, A>))
        .route("/api/v1/quiz/results/:code", get(category_handler))
        .with_state(service)
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultResponse {
    #[serde(flatten)]
    pub summary: ResultSummary,
    pub rule: ClassificationRule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityRequest {
    pub birth_month: String,
    pub birth_year: String,
    #[serde(default)]
    pub today: Option<String>,
    #[serde(default)]
    pub quiz_session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityResponse {
    pub is_in_iep: bool,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub age: i32,
    pub age_group: AgeGroup,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRequest {
    #[serde(default)]
    pub answers: QuizAnswers,
    #[serde(default)]
    pub today: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentResponse {
    pub sufficient: bool,
    pub is_new_to_medicare: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextRequest {
    pub step: QuizStep,
    #[serde(default)]
    pub answers: QuizAnswers,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextResponse {
    pub step: QuizStep,
    pub progress: u8,
    pub total_steps: u8,
    pub view_event: String,
    pub is_terminal: bool,
}

impl From<QuizStep> for NextResponse {
    fn from(step: QuizStep) -> Self {
        Self {
            step,
            progress: step.progress(),
            total_steps: TOTAL_PROGRESS_STEPS,
            view_event: step.view_event().to_string(),
            is_terminal: step.is_terminal(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadRequest {
    #[serde(flatten)]
    pub submission: LeadSubmission,
    #[serde(default)]
    pub today: Option<String>,
}

/// What the caller gets back after a lead is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadReceipt {
    pub lead_id: LeadId,
    pub result: ResultCategory,
    pub recommended_plan: String,
    pub medicare_ab: bool,
    pub age: Option<i32>,
    pub age_group: Option<AgeGroup>,
    pub submitted_on: NaiveDate,
}

impl From<&LeadRecord> for LeadReceipt {
    fn from(record: &LeadRecord) -> Self {
        Self {
            lead_id: record.lead_id.clone(),
            result: record.result,
            recommended_plan: record.recommended_plan.clone(),
            medicare_ab: record.medicare_ab,
            age: record.age,
            age_group: record.age_group,
            submitted_on: record.submitted_on,
        }
    }
}

pub(crate) async fn result_handler<S, C, A>(
    State(service): State<Arc<LeadService<S, C, A>>>,
    axum::Json(answers): axum::Json<QuizAnswers>,
) -> Response
where
    S: LeadStore + 'static,
    C: CrmSync + 'static,
    A: AnalyticsSink + 'static,
{
    match service.complete_quiz(&answers) {
        Ok(classification) => {
            let payload = ResultResponse {
                summary: ResultSummary::from(classification.result),
                rule: classification.rule,
            };
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => lead_error_response(err),
    }
}

pub(crate) async fn eligibility_handler<S, C, A>(
    State(service): State<Arc<LeadService<S, C, A>>>,
    axum::Json(request): axum::Json<EligibilityRequest>,
) -> Response
where
    S: LeadStore + 'static,
    C: CrmSync + 'static,
    A: AnalyticsSink + 'static,
{
    let today = match resolve_today(request.today.as_deref()) {
        Ok(today) => today,
        Err(response) => return response,
    };

    let evaluated = BirthDate::parse(&request.birth_month, &request.birth_year)
        .and_then(|birth| enrollment_window(birth).map(|window| (birth, window)));
    let (birth, window) = match evaluated {
        Ok(evaluated) => evaluated,
        Err(err) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
    };

    let answers = QuizAnswers {
        birth_month: Some(birth.month),
        birth_year: Some(birth.year),
        ..QuizAnswers::default()
    };
    service.capture_birth_date(&answers, request.quiz_session_id, today);

    let age = match calculate_age(birth, today) {
        Ok(age) => age,
        Err(err) => return AppError::from(err).into_response(),
    };
    let payload = EligibilityResponse {
        is_in_iep: window.contains(today),
        window_start: window.start,
        window_end: window.end,
        age,
        age_group: age_group(age),
    };
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn segment_handler(axum::Json(request): axum::Json<SegmentRequest>) -> Response {
    let today = match resolve_today(request.today.as_deref()) {
        Ok(today) => today,
        Err(response) => return response,
    };

    let label = match is_new_to_medicare(&request.answers, today) {
        Ok(label) => label,
        Err(err) => return AppError::from(err).into_response(),
    };
    let payload = SegmentResponse {
        sufficient: has_sufficient_data(&request.answers),
        is_new_to_medicare: label,
    };
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn next_handler(axum::Json(request): axum::Json<NextRequest>) -> Response {
    match next_step(request.step, &request.answers) {
        Ok(step) => (StatusCode::OK, axum::Json(NextResponse::from(step))).into_response(),
        Err(err) => error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
    }
}

pub(crate) async fn lead_handler<S, C, A>(
    State(service): State<Arc<LeadService<S, C, A>>>,
    axum::Json(request): axum::Json<LeadRequest>,
) -> Response
where
    S: LeadStore + 'static,
    C: CrmSync + 'static,
    A: AnalyticsSink + 'static,
{
    let today = match resolve_today(request.today.as_deref()) {
        Ok(today) => today,
        Err(response) => return response,
    };

    match service.submit_lead(request.submission, today) {
        Ok(record) => {
            (StatusCode::ACCEPTED, axum::Json(LeadReceipt::from(&record))).into_response()
        }
        Err(err) => lead_error_response(err),
    }
}

pub(crate) async fn lead_status_handler<S, C, A>(
    State(service): State<Arc<LeadService<S, C, A>>>,
    Path(lead_id): Path<String>,
) -> Response
where
    S: LeadStore + 'static,
    C: CrmSync + 'static,
    A: AnalyticsSink + 'static,
{
    match service.get(&LeadId(lead_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(LeadReceipt::from(&record))).into_response(),
        Err(err) => lead_error_response(err),
    }
}

pub(crate) async fn category_handler(Path(code): Path<String>) -> Response {
    match ResultCategory::parse(&code) {
        Some(category) => {
            (StatusCode::OK, axum::Json(ResultSummary::from(category))).into_response()
        }
        None => {
            let payload = json!({
                "error": "unknown result category",
                "code": code,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

/// `YYYY-MM-DD` override, or the server's local date when absent.
fn resolve_today(raw: Option<&str>) -> Result<NaiveDate, Response> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Local::now().date_naive()),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("today '{raw}' must be formatted as YYYY-MM-DD"),
            )
        }),
    }
}

fn lead_error_response(err: LeadServiceError) -> Response {
    AppError::from(err).into_response()
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}
