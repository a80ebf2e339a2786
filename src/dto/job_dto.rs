use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::job::{Job, JobPatch, JobStatus, JobType, SalaryPeriod};
use crate::services::job_service::JobList;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateJobPayload {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub job_type: Option<JobType>,
    pub location: Option<String>,
    pub is_remote: Option<bool>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub salary_currency: Option<String>,
    pub salary_period: Option<SalaryPeriod>,
    pub requirements: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub department: Option<String>,
    pub status: Option<JobStatus>,
    pub application_deadline: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub max_applications: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateJobPayload {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub job_type: Option<JobType>,
    pub location: Option<String>,
    pub is_remote: Option<bool>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub salary_currency: Option<String>,
    pub salary_period: Option<SalaryPeriod>,
    pub requirements: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub department: Option<String>,
    pub status: Option<JobStatus>,
    pub is_active: Option<bool>,
    pub application_deadline: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub max_applications: Option<i32>,
}

impl UpdateJobPayload {
    pub fn into_patch(self) -> JobPatch {
        JobPatch {
            title: self.title,
            description: self.description,
            job_type: self.job_type,
            location: self.location,
            is_remote: self.is_remote,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            salary_currency: self.salary_currency,
            salary_period: self.salary_period,
            requirements: self.requirements,
            skills: self.skills,
            keywords: self.keywords,
            department: self.department,
            status: self.status,
            is_active: self.is_active,
            application_deadline: self.application_deadline,
            max_applications: self.max_applications,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobResponse {
    pub id: uuid::Uuid,
    pub title: String,
    pub description: String,
    pub job_type: JobType,
    pub location: Option<String>,
    pub is_remote: bool,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub salary_currency: String,
    pub salary_period: SalaryPeriod,
    pub requirements: Vec<String>,
    pub skills: Vec<String>,
    pub keywords: Vec<String>,
    pub department: Option<String>,
    pub status: JobStatus,
    pub is_active: bool,
    pub application_deadline: Option<DateTime<Utc>>,
    pub max_applications: Option<i32>,
    pub created_by: uuid::Uuid,
    pub views: i64,
    pub application_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            job_type: job.job_type,
            location: job.location,
            is_remote: job.is_remote,
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            salary_currency: job.salary_currency,
            salary_period: job.salary_period,
            requirements: job.requirements,
            skills: job.skills,
            keywords: job.keywords,
            department: job.department,
            status: job.status,
            is_active: job.is_active,
            application_deadline: job.application_deadline,
            max_applications: job.max_applications,
            created_by: job.created_by,
            views: job.views,
            application_count: job.application_count,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobListResponse {
    pub items: Vec<JobResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl From<JobList> for JobListResponse {
    fn from(list: JobList) -> Self {
        Self {
            items: list.items.into_iter().map(Into::into).collect(),
            total: list.total,
            page: list.page,
            per_page: list.per_page,
            total_pages: list.total_pages,
        }
    }
}
