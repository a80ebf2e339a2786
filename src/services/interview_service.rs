use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::dto::interview_dto::{
    InterviewFeedbackPayload, ReschedulePayload, ScheduleInterviewPayload,
};
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus};
use crate::models::interview::{
    Interview, InterviewFeedback, InterviewStatus, Interviewers, NewInterview, RescheduleEntry,
};
use crate::models::job::Job;
use crate::models::user::User;
use crate::services::authorization::{authorize, Action, Target};
use crate::store::EntityStore;

#[derive(Clone)]
pub struct InterviewService {
    store: Arc<dyn EntityStore>,
}

impl InterviewService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn schedule(
        &self,
        actor: &User,
        payload: ScheduleInterviewPayload,
    ) -> Result<Interview> {
        let application = self.require_application(payload.application_id).await?;
        let job = self.require_job(application.job_id).await?;

        authorize(
            Some(actor),
            Action::ScheduleInterview,
            &Target::application(&job, &application),
        )?;

        if !matches!(
            application.status,
            ApplicationStatus::Shortlisted
                | ApplicationStatus::Interviewing
                | ApplicationStatus::Interviewed
        ) {
            return Err(Error::BadRequest(format!(
                "Cannot schedule an interview while the application is '{}'",
                application.status
            )));
        }

        if payload.scheduled_date <= Utc::now() {
            return Err(Error::BadRequest(
                "Interview must be scheduled in the future".to_string(),
            ));
        }

        let interview = self
            .store
            .insert_interview(NewInterview {
                application_id: application.id,
                job_id: job.id,
                candidate_id: application.candidate_id,
                title: payload.title,
                interview_type: payload.interview_type,
                scheduled_date: payload.scheduled_date,
                duration_minutes: payload.duration_minutes.unwrap_or(60),
                timezone: payload.timezone.unwrap_or_else(|| "UTC".to_string()),
                meeting_link: payload.meeting_link,
                location: payload.location,
                interviewer: Interviewers {
                    primary: payload.primary_interviewer.unwrap_or(actor.id),
                    additional: payload.additional_interviewers.unwrap_or_default(),
                },
            })
            .await?;

        tracing::info!(
            interview_id = %interview.id,
            application_id = %application.id,
            scheduled = %interview.scheduled_date,
            "interview scheduled"
        );
        Ok(interview)
    }

    pub async fn update_status(
        &self,
        interview_id: Uuid,
        actor: &User,
        status: InterviewStatus,
    ) -> Result<Interview> {
        let interview = self.require(interview_id).await?;
        let job = self.require_job(interview.job_id).await?;
        authorize(
            Some(actor),
            Action::UpdateInterview,
            &Target::interview(&job, &interview),
        )?;

        if interview.status.is_terminal() {
            return Err(Error::BadRequest(format!(
                "Interview is already '{}' and cannot change status",
                interview.status
            )));
        }

        self.store.update_interview_status(interview.id, status).await
    }

    /// Records per-dimension feedback and closes the interview.
    pub async fn record_feedback(
        &self,
        interview_id: Uuid,
        actor: &User,
        payload: InterviewFeedbackPayload,
    ) -> Result<Interview> {
        let interview = self.require(interview_id).await?;
        let job = self.require_job(interview.job_id).await?;
        authorize(
            Some(actor),
            Action::UpdateInterview,
            &Target::interview(&job, &interview),
        )?;

        if matches!(
            interview.status,
            InterviewStatus::Cancelled | InterviewStatus::NoShow
        ) {
            return Err(Error::BadRequest(
                "Cannot record feedback for a cancelled or missed interview".to_string(),
            ));
        }

        let feedback = InterviewFeedback {
            technical: payload.technical.map(Into::into),
            communication: payload.communication.map(Into::into),
            cultural: payload.cultural.map(Into::into),
            overall: payload.overall.map(Into::into),
            recommendation: payload.recommendation,
        };

        self.store
            .record_interview_feedback(interview.id, feedback, InterviewStatus::Completed)
            .await
    }

    pub async fn reschedule(
        &self,
        interview_id: Uuid,
        actor: &User,
        payload: ReschedulePayload,
    ) -> Result<Interview> {
        let interview = self.require(interview_id).await?;
        let job = self.require_job(interview.job_id).await?;
        authorize(
            Some(actor),
            Action::UpdateInterview,
            &Target::interview(&job, &interview),
        )?;

        if interview.status.is_terminal() {
            return Err(Error::BadRequest(format!(
                "Interview is already '{}' and cannot be rescheduled",
                interview.status
            )));
        }
        if payload.new_date <= Utc::now() {
            return Err(Error::BadRequest(
                "Interview must be rescheduled to a future date".to_string(),
            ));
        }

        let entry = RescheduleEntry {
            previous_date: interview.scheduled_date,
            new_date: payload.new_date,
            reason: payload.reason,
            rescheduled_by: actor.id,
            rescheduled_at: Utc::now(),
        };

        self.store
            .reschedule_interview(interview.id, payload.new_date, entry)
            .await
    }

    pub async fn list_for_application(
        &self,
        application_id: Uuid,
        actor: &User,
    ) -> Result<Vec<Interview>> {
        let application = self.require_application(application_id).await?;
        let job = self.require_job(application.job_id).await?;
        authorize(
            Some(actor),
            Action::ReadInterview,
            &Target::application(&job, &application),
        )?;
        self.store.interviews_by_application(application_id).await
    }

    async fn require(&self, id: Uuid) -> Result<Interview> {
        self.store
            .interview_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Interview not found".to_string()))
    }

    async fn require_application(&self, id: Uuid) -> Result<Application> {
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
