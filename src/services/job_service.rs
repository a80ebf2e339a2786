use std::sync::Arc;

use uuid::Uuid;

use crate::dto::job_dto::{CreateJobPayload, JobListQuery, UpdateJobPayload};
use crate::error::{Error, Result};
use crate::models::job::{Job, JobStatus, NewJob};
use crate::models::user::{User, UserRole};
use crate::services::authorization::{authorize, Action, Target};
use crate::store::{EntityStore, JobFilter, Pagination};

#[derive(Clone)]
pub struct JobService {
    store: Arc<dyn EntityStore>,
}

pub struct JobList {
    pub items: Vec<Job>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl JobService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, actor: &User, payload: CreateJobPayload) -> Result<Job> {
        // Posting jobs is a recruiter capability; candidates go through the
        // application flow instead.
        if !matches!(actor.role, UserRole::Recruiter | UserRole::Admin) {
            return Err(Error::AccessDenied);
        }

        let job = self
            .store
            .insert_job(NewJob {
                title: payload.title,
                description: payload.description,
                job_type: payload.job_type.unwrap_or(crate::models::job::JobType::FullTime),
                location: payload.location,
                is_remote: payload.is_remote.unwrap_or(false),
                salary_min: payload.salary_min,
                salary_max: payload.salary_max,
                salary_currency: payload.salary_currency.unwrap_or_else(|| "USD".to_string()),
                salary_period: payload
                    .salary_period
                    .unwrap_or(crate::models::job::SalaryPeriod::Yearly),
                requirements: payload.requirements.unwrap_or_default(),
                skills: payload.skills.unwrap_or_default(),
                keywords: payload.keywords.unwrap_or_default(),
                department: payload.department,
                status: payload.status.unwrap_or(JobStatus::Draft),
                application_deadline: payload.application_deadline,
                max_applications: payload.max_applications,
                created_by: actor.id,
            })
            .await?;

        tracing::info!(job_id = %job.id, status = %job.status, "job created");
        Ok(job)
    }

    pub async fn update(&self, id: Uuid, actor: &User, payload: UpdateJobPayload) -> Result<Job> {
        let job = self.require(id).await?;
        authorize(Some(actor), Action::UpdateJob, &Target::job(&job))?;
        self.store.update_job(id, payload.into_patch()).await
    }

    pub async fn delete(&self, id: Uuid, actor: &User) -> Result<()> {
        let job = self.require(id).await?;
        authorize(Some(actor), Action::DeleteJob, &Target::job(&job))?;
        self.store.delete_job(id).await
    }

    /// Public read. Published jobs are visible to anyone and count a view;
    /// anything else requires ownership.
    pub async fn get(&self, id: Uuid, actor: Option<&User>) -> Result<Job> {
        let job = self.require(id).await?;
        authorize(actor, Action::ReadJob, &Target::job(&job))?;

        if job.status == JobStatus::Published {
            self.store.increment_job_views(id).await?;
        }
        Ok(job)
    }

    pub async fn list_published(&self, query: JobListQuery) -> Result<JobList> {
        let page = Pagination {
            page: query.page.unwrap_or(1),
            per_page: query.per_page.unwrap_or(20),
        }
        .clamped();

        let (items, total) = self
            .store
            .list_jobs(
                JobFilter {
                    status: Some(JobStatus::Published),
                    created_by: None,
                    only_active: true,
                    search: query.search,
                },
                page,
            )
            .await?;

        let total_pages = ((total as f64) / (page.per_page as f64)).ceil() as i64;
        Ok(JobList {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
            total_pages,
        })
    }

    pub async fn list_for_owner(&self, owner: Uuid, actor: &User) -> Result<Vec<Job>> {
        if actor.id != owner && !actor.is_admin() {
            return Err(Error::AccessDenied);
        }
        self.store.jobs_by_owner(owner).await
    }

    async fn require(&self, id: Uuid) -> Result<Job> {
        self.store
            .job_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))
    }
}
