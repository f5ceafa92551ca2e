use crate::infra::{parse_budget, parse_coverage, parse_year, InMemoryCrm, InMemoryLeadStore, TracingAnalyticsSink};
use chrono::{Local, NaiveDate};
use clap::Args;
use medicare_quiz::config::QuizConfig;
use medicare_quiz::error::AppError;
use medicare_quiz::quiz::{
    age_group, calculate_age, classify, enrollment_window, BirthDate, BirthMonth, BudgetChoice,
    ContactInfo, CurrentCoverage, FlowError, LeadService, LeadSubmission, QuizAnswer,
    QuizAnswers, QuizSession, QuizStep, ResultCategory, ResultSummary,
};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ClassifyArgs {
    /// Birth month name (e.g. June)
    #[arg(long, value_parser = parse_month)]
    pub(crate) birth_month: Option<BirthMonth>,
    /// Four-digit birth year
    #[arg(long, value_parser = parse_year, allow_hyphen_values = true)]
    pub(crate) birth_year: Option<i32>,
    /// Whether Medicare Parts A and B are already in place
    #[arg(long)]
    pub(crate) has_part_ab: Option<bool>,
    /// Existing coverage: parts_ab_only, medicare_advantage, or medigap
    #[arg(long, value_parser = parse_coverage)]
    pub(crate) current_coverage: Option<CurrentCoverage>,
    /// Whether the respondent served in the armed forces
    #[arg(long)]
    pub(crate) veteran: Option<bool>,
    /// Whether the respondent receives care through the VA
    #[arg(long)]
    pub(crate) uses_va: Option<bool>,
    /// VA preference tags (repeatable)
    #[arg(long = "va-preference")]
    pub(crate) va_preferences: Vec<String>,
    /// Whether the respondent qualifies for Medicaid
    #[arg(long)]
    pub(crate) medicaid: Option<bool>,
    /// Budget tradeoff: flexible or lower_cost
    #[arg(long, value_parser = parse_budget)]
    pub(crate) budget: Option<BudgetChoice>,
    /// Print the result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl ClassifyArgs {
    fn answers(&self) -> QuizAnswers {
        QuizAnswers {
            birth_month: self.birth_month,
            birth_year: self.birth_year,
            has_part_ab: self.has_part_ab,
            current_coverage: self.current_coverage,
            is_veteran: self.veteran,
            uses_va: self.uses_va,
            va_preferences: self.va_preferences.iter().cloned().collect(),
            has_medicaid: self.medicaid,
            budget_choice: self.budget,
            ..QuizAnswers::default()
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct EligibilityArgs {
    /// Birth month name (e.g. June)
    #[arg(long)]
    pub(crate) birth_month: String,
    /// Four-digit birth year
    #[arg(long)]
    pub(crate) birth_year: String,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date for every persona (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Stop at the result screen without submitting leads
    #[arg(long)]
    pub(crate) skip_leads: bool,
}

fn parse_month(raw: &str) -> Result<BirthMonth, String> {
    BirthMonth::parse(raw.trim()).map_err(|err| err.to_string())
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let answers = args.answers();
    let classification = classify(&answers)?;
    let summary = ResultSummary::from(classification.result);

    if args.json {
        let payload = serde_json::json!({
            "result": summary.result,
            "rule": classification.rule,
            "analytics_name": summary.analytics_name,
            "plan_name": summary.plan_name,
            "plan_type": summary.plan_type,
            "is_early_exit": summary.is_early_exit,
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Result payload unavailable: {err}"),
        }
        return Ok(());
    }

    println!(
        "Result {} ({}) via {:?}",
        summary.result, summary.analytics_name, classification.rule
    );
    match summary.plan_name {
        Some(plan) => println!("- CRM plan: {plan} | plan type {}", summary.plan_type),
        None => println!("- Early exit: respondent already has {}", summary.plan_type),
    }
    Ok(())
}

pub(crate) fn run_eligibility(args: EligibilityArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let birth = BirthDate::parse(&args.birth_month, &args.birth_year)?;
    let window = enrollment_window(birth)?;
    let age = calculate_age(birth, today)?;

    println!("Eligibility for {} {} as of {today}", birth.month, birth.year);
    println!("- 65th birthday: {}", birth.sixty_fifth_birthday()?);
    println!(
        "- Initial Enrollment Period: {} ({})",
        window.label(),
        if window.contains(today) {
            "open now"
        } else {
            "not open"
        }
    );
    println!("- Age {age} | age group {}", age_group(age).label());
    Ok(())
}

/// Scripted respondent used by the demo walkthrough.
pub(crate) struct Persona {
    pub(crate) name: &'static str,
    pub(crate) birth_month: &'static str,
    pub(crate) birth_year: &'static str,
    pub(crate) has_part_ab: bool,
    pub(crate) current_coverage: Option<CurrentCoverage>,
    pub(crate) veteran: bool,
    pub(crate) uses_va: bool,
    pub(crate) va_preferences: &'static [&'static str],
    pub(crate) medicaid: bool,
    pub(crate) budget: BudgetChoice,
    pub(crate) email: &'static str,
}

impl Persona {
    fn answer_for(&self, step: QuizStep) -> Option<QuizAnswer> {
        let answer = match step {
            QuizStep::BirthDate => QuizAnswer::BirthDate {
                month: self.birth_month.to_string(),
                year: self.birth_year.to_string(),
            },
            QuizStep::MedicareParts => QuizAnswer::MedicareParts(self.has_part_ab),
            QuizStep::CurrentCoverage => {
                QuizAnswer::CurrentCoverage(self.current_coverage.unwrap_or(CurrentCoverage::PartsAbOnly))
            }
            QuizStep::VeteranStatus => QuizAnswer::Veteran(self.veteran),
            QuizStep::UsesVa => QuizAnswer::UsesVa(self.uses_va),
            QuizStep::Medicaid => QuizAnswer::Medicaid(self.medicaid),
            QuizStep::BudgetChoice => QuizAnswer::Budget(self.budget),
            _ => return None,
        };
        Some(answer)
    }

    fn contact(&self) -> ContactInfo {
        ContactInfo {
            first_name: self.name.to_string(),
            zipcode: "50309".to_string(),
            email: self.email.to_string(),
            phone: Some("515-555-0100".to_string()),
        }
    }
}

pub(crate) fn personas() -> Vec<Persona> {
    vec![
        Persona {
            name: "Pat",
            birth_month: "March",
            birth_year: "1961",
            has_part_ab: false,
            current_coverage: None,
            veteran: false,
            uses_va: false,
            va_preferences: &[],
            medicaid: false,
            budget: BudgetChoice::LowerCost,
            email: "pat@example.com",
        },
        Persona {
            name: "Jordan",
            birth_month: "October",
            birth_year: "1959",
            has_part_ab: true,
            current_coverage: Some(CurrentCoverage::PartsAbOnly),
            veteran: true,
            uses_va: true,
            va_preferences: &["primary_care_at_va", "travel_often"],
            medicaid: false,
            budget: BudgetChoice::Flexible,
            email: "jordan@example.com",
        },
        Persona {
            name: "Casey",
            birth_month: "January",
            birth_year: "1957",
            has_part_ab: true,
            current_coverage: Some(CurrentCoverage::MedicareAdvantage),
            veteran: false,
            uses_va: false,
            va_preferences: &[],
            medicaid: false,
            budget: BudgetChoice::Flexible,
            email: "casey@example.com",
        },
        Persona {
            name: "Riley",
            birth_month: "August",
            birth_year: "1960",
            has_part_ab: false,
            current_coverage: None,
            veteran: true,
            uses_va: false,
            va_preferences: &[],
            medicaid: true,
            budget: BudgetChoice::LowerCost,
            email: "riley@example.com",
        },
    ]
}

type DemoService = LeadService<InMemoryLeadStore, InMemoryCrm, TracingAnalyticsSink>;

/// Drive one persona from the splash screen to a result, emitting analytics along the way.
pub(crate) fn walk_persona(
    service: &DemoService,
    persona: &Persona,
    today: NaiveDate,
) -> Result<QuizSession, FlowError> {
    let mut session = QuizSession::new();

    while !session.step().is_terminal() {
        service.track_view(&mut session);
        let step = session.step();

        if step == QuizStep::VaPreferences {
            for tag in persona.va_preferences {
                session.record(QuizAnswer::ToggleVaPreference(tag.to_string()), today)?;
            }
            session.advance()?;
            continue;
        }

        match persona.answer_for(step) {
            Some(answer) => {
                session.record(answer, today)?;
            }
            None => {
                session.advance()?;
            }
        }

        if step == QuizStep::BirthDate {
            service.capture_birth_date(session.answers(), Some(persona.name.to_string()), today);
        }
        service.report_new_to_medicare(&mut session, today);
    }

    service.track_view(&mut session);
    Ok(session)
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, skip_leads } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let store = Arc::new(InMemoryLeadStore::default());
    let crm = Arc::new(InMemoryCrm::default());
    let analytics = Arc::new(TracingAnalyticsSink::default());
    let service = LeadService::new(
        store.clone(),
        crm.clone(),
        analytics.clone(),
        QuizConfig::default(),
    );

    println!("Medicare plan quiz demo ({today})");
    for persona in personas() {
        let session = match walk_persona(&service, &persona, today) {
            Ok(session) => session,
            Err(err) => {
                println!("- {}: quiz stopped early: {}", persona.name, err);
                continue;
            }
        };

        let answers = session.answers();
        let result = match service.complete_quiz(answers) {
            Ok(classification) => classification.result,
            Err(err) => {
                println!("- {}: no result: {}", persona.name, err);
                continue;
            }
        };
        print_outcome(&persona, answers, result, today);

        if skip_leads {
            continue;
        }

        let submission = LeadSubmission {
            answers: answers.clone(),
            contact: persona.contact(),
            quiz_session_id: Some(format!("demo-{}", persona.name.to_lowercase())),
            utm: BTreeMap::from([("utm_source".to_string(), "cli_demo".to_string())]),
        };
        match service.submit_lead(submission, today) {
            Ok(record) => println!(
                "  Lead {} stored -> CRM plan {}",
                record.lead_id, record.recommended_plan
            ),
            Err(err) => println!("  Lead not stored: {}", err),
        }
    }

    println!("\nDelivery summary");
    println!("- {} leads stored", store.len());
    println!("- {} CRM contacts queued", crm.contacts().len());
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for event in analytics.events() {
        *counts.entry(event.name().to_string()).or_default() += 1;
    }
    println!("- {} analytics events", counts.values().sum::<usize>());
    for (name, count) in counts {
        println!("  - {name}: {count}");
    }

    Ok(())
}

fn print_outcome(persona: &Persona, answers: &QuizAnswers, result: ResultCategory, today: NaiveDate) {
    let age = answers
        .birth_date()
        .and_then(|birth| calculate_age(birth, today).ok());
    println!(
        "- {} (age {}, {} steps answered) -> {} {}",
        persona.name,
        age.map(|age| age.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        answers.answered_steps(),
        result,
        result.analytics_name()
    );
    if answers.is_in_iep {
        println!("  Inside the Initial Enrollment Period");
    }
    if result.is_early_exit() {
        println!("  Already covered by {}; no lead collected", result.plan_type());
    }
}
