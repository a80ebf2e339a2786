#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use talentflow_backend::dto::application_dto::CreateApplicationPayload;
use talentflow_backend::dto::offer_dto::CreateOfferPayload;
use talentflow_backend::models::application::{Application, ApplicationStatus};
use talentflow_backend::models::job::{Job, JobStatus, JobType, NewJob, SalaryPeriod};
use talentflow_backend::models::offer::WorkLocation;
use talentflow_backend::models::user::{NewUser, User, UserRole};
use talentflow_backend::services::application_service::ApplicationService;
use talentflow_backend::services::interview_service::InterviewService;
use talentflow_backend::services::offer_service::OfferService;
use talentflow_backend::services::stats_service::StatsService;
use talentflow_backend::store::{EntityStore, MemoryStore};

pub const OFFER_TOKEN_SECRET: &str = "test-offer-token-secret";

pub struct TestEnv {
    pub store: Arc<dyn EntityStore>,
    pub applications: ApplicationService,
    pub offers: OfferService,
    pub interviews: InterviewService,
    pub stats: StatsService,
}

impl TestEnv {
    pub fn new() -> Self {
        let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
        let applications = ApplicationService::new(store.clone());
        let offers = OfferService::new(
            store.clone(),
            applications.clone(),
            OFFER_TOKEN_SECRET.to_string(),
        );
        let interviews = InterviewService::new(store.clone());
        let stats = StatsService::new(store.clone(), 0);
        Self {
            store,
            applications,
            offers,
            interviews,
            stats,
        }
    }
}

pub async fn seed_user(store: &Arc<dyn EntityStore>, role: UserRole) -> User {
    store
        .insert_user(NewUser {
            email: format!("{}@example.com", Uuid::new_v4()),
            password_hash: "not-a-real-hash".to_string(),
            display_name: match role {
                UserRole::Recruiter => "Recruiter".to_string(),
                UserRole::Candidate => "Candidate".to_string(),
                UserRole::Admin => "Admin".to_string(),
            },
            role,
            company: None,
            position: None,
        })
        .await
        .expect("seed user")
}

pub async fn seed_job(store: &Arc<dyn EntityStore>, owner: Uuid, status: JobStatus) -> Job {
    store
        .insert_job(NewJob {
            title: "Backend Engineer".to_string(),
            description: "Build and run the hiring platform backend".to_string(),
            job_type: JobType::FullTime,
            location: Some("Berlin".to_string()),
            is_remote: true,
            salary_min: Some(Decimal::new(70_000, 0)),
            salary_max: Some(Decimal::new(95_000, 0)),
            salary_currency: "EUR".to_string(),
            salary_period: SalaryPeriod::Yearly,
            requirements: vec!["5 years experience".to_string()],
            skills: vec!["rust".to_string(), "postgres".to_string()],
            keywords: vec![],
            department: Some("Engineering".to_string()),
            status,
            application_deadline: None,
            max_applications: None,
            created_by: owner,
        })
        .await
        .expect("seed job")
}

pub fn apply_payload(job_id: Uuid) -> CreateApplicationPayload {
    CreateApplicationPayload {
        job_id,
        candidate_info: None,
        cover_letter: Some("I would like to apply.".to_string()),
        resume_url: Some("https://files.example.com/cv.pdf".to_string()),
        resume_original_name: Some("cv.pdf".to_string()),
        source: None,
    }
}

pub fn offer_payload(application_id: Uuid) -> CreateOfferPayload {
    CreateOfferPayload {
        application_id,
        position: "Backend Engineer".to_string(),
        department: Some("Engineering".to_string()),
        salary: Decimal::new(90_000, 0),
        currency: "EUR".to_string(),
        start_date: None,
        employment_type: JobType::FullTime,
        work_location: WorkLocation::Hybrid,
        benefits: Some(vec!["30 days vacation".to_string()]),
        offer_valid_until: Utc::now() + Duration::days(14),
    }
}

/// Walk an application through a sequence of statuses as `actor`.
pub async fn drive(
    applications: &ApplicationService,
    actor: &User,
    application_id: Uuid,
    path: &[ApplicationStatus],
) -> Application {
    let mut last = None;
    for status in path {
        last = Some(
            applications
                .transition(application_id, *status, actor, None)
                .await
                .unwrap_or_else(|e| panic!("transition to {} failed: {:?}", status, e)),
        );
    }
    last.expect("at least one transition")
}
