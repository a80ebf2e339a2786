//! Application lifecycle engine.
//!
//! Creation enforces the job's acceptance preconditions and the one
//! application per (job, candidate) invariant; transitions run through the
//! closed status graph and land as compare-and-swap writes, so racing
//! mutations of the same application cannot both win.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::dto::application_dto::{CreateApplicationPayload, RatingPayload};
use crate::error::{Error, Result};
use crate::models::application::{
    Application, ApplicationStatus, CandidateInfo, NewApplication, Rating, ResumeMeta,
    StatusChange,
};
use crate::models::job::Job;
use crate::models::user::User;
use crate::services::authorization::{authorize, Action, Target};
use crate::store::EntityStore;

#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn EntityStore>,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, actor: &User, payload: CreateApplicationPayload) -> Result<Application> {
        let job = self
            .store
            .job_by_id(payload.job_id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;

        authorize(
            Some(actor),
            Action::CreateApplication,
            &Target::new_application(&job, actor.id),
        )?;

        self.check_job_accepts_applications(&job)?;

        let candidate_info = payload.candidate_info.unwrap_or_else(|| CandidateInfo {
            name: actor.display_name.clone(),
            email: actor.email.clone(),
            phone: None,
            location: None,
        });

        let resume = payload.resume_url.map(|url| ResumeMeta {
            url,
            original_name: payload.resume_original_name,
            uploaded_at: Utc::now(),
        });

        let application = self
            .store
            .insert_application(NewApplication {
                job_id: job.id,
                candidate_id: actor.id,
                candidate_info,
                resume,
                cover_letter: payload.cover_letter,
                source: payload.source.unwrap_or_default(),
            })
            .await?;

        tracing::info!(
            application_id = %application.id,
            job_id = %job.id,
            candidate_id = %actor.id,
            "application created"
        );

        Ok(application)
    }

    /// Move an application to `new_status` on behalf of `actor`.
    ///
    /// The write is conditioned on the status the actor observed; a losing
    /// racer gets `ConcurrentModification` and must re-read before retrying.
    pub async fn transition(
        &self,
        application_id: Uuid,
        new_status: ApplicationStatus,
        actor: &User,
        reason: Option<String>,
    ) -> Result<Application> {
        let application = self.require(application_id).await?;
        let job = self.require_job(application.job_id).await?;

        authorize(
            Some(actor),
            Action::TransitionApplication,
            &Target::application(&job, &application),
        )?;

        self.apply_transition(&application, new_status, actor.id, reason)
            .await
    }

    /// Graph-validated status write without an authorization check. Used by
    /// the offer flow, where the capability token already established the
    /// caller's right to act.
    pub(crate) async fn apply_transition(
        &self,
        application: &Application,
        new_status: ApplicationStatus,
        changed_by: Uuid,
        reason: Option<String>,
    ) -> Result<Application> {
        if !application.status.can_transition_to(new_status) {
            return Err(Error::invalid_transition(application.status, new_status));
        }

        let change = StatusChange {
            status: new_status,
            changed_by,
            changed_at: Utc::now(),
            reason,
        };

        let updated = self
            .store
            .update_application_status(application.id, application.status, change)
            .await?;

        tracing::info!(
            application_id = %updated.id,
            from = %application.status,
            to = %new_status,
            "application status changed"
        );

        Ok(updated)
    }

    pub async fn rate(
        &self,
        application_id: Uuid,
        actor: &User,
        payload: RatingPayload,
    ) -> Result<Application> {
        let application = self.require(application_id).await?;
        let job = self.require_job(application.job_id).await?;

        authorize(
            Some(actor),
            Action::RateApplication,
            &Target::application(&job, &application),
        )?;

        self.store
            .update_application_rating(
                application.id,
                Rating {
                    overall: payload.overall,
                    technical: payload.technical,
                    communication: payload.communication,
                    cultural: payload.cultural,
                },
            )
            .await
    }

    pub async fn get(&self, application_id: Uuid, actor: &User) -> Result<Application> {
        let application = self.require(application_id).await?;
        let job = self.require_job(application.job_id).await?;
        authorize(
            Some(actor),
            Action::ReadApplication,
            &Target::application(&job, &application),
        )?;
        Ok(application)
    }

    pub async fn list_for_job(&self, job_id: Uuid, actor: &User) -> Result<Vec<Application>> {
        let job = self.require_job(job_id).await?;
        authorize(Some(actor), Action::ReadApplication, &Target::job(&job))?;
        self.store.applications_by_job(job_id).await
    }

    pub async fn list_for_candidate(
        &self,
        candidate_id: Uuid,
        actor: &User,
    ) -> Result<Vec<Application>> {
        authorize(
            Some(actor),
            Action::ReadApplication,
            &Target::candidate(candidate_id),
        )?;
        self.store.applications_by_candidate(candidate_id).await
    }

    fn check_job_accepts_applications(&self, job: &Job) -> Result<()> {
        if !job.is_open() {
            return Err(Error::BadRequest(
                "This job is not accepting applications".to_string(),
            ));
        }
        if let Some(deadline) = job.application_deadline {
            if Utc::now() > deadline {
                return Err(Error::BadRequest(
                    "The application deadline for this job has passed".to_string(),
                ));
            }
        }
        if let Some(max) = job.max_applications {
            if job.application_count >= max as i64 {
                return Err(Error::BadRequest(
                    "This job has reached its application limit".to_string(),
                ));
            }
        }
        Ok(())
    }

    async fn require(&self, id: Uuid) -> Result<Application> {
        self.store
            .application_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))
    }

    async fn require_job(&self, id: Uuid) -> Result<Job> {
        self.store
            .job_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))
    }
}
