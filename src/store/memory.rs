//! In-memory [`EntityStore`] backend.
//!
//! Backs the test suite and local development without a database. Every
//! mutation runs inside a single write-lock critical section, which gives
//! the same atomicity the Postgres backend gets from conditional updates
//! and transactions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::{
    Application, ApplicationStatus, NewApplication, Rating, StatusChange,
};
use crate::models::interview::{
    Interview, InterviewFeedback, InterviewStatus, NewInterview, RescheduleEntry,
};
use crate::models::job::{Job, JobPatch, JobStatus, NewJob};
use crate::models::message::{Message, MessageStatus, NewMessage};
use crate::models::offer::{NegotiationEntry, NewOffer, Offer, OfferStatus};
use crate::models::user::{NewUser, User};

use super::{ApplicationCountFilter, DateRange, EntityStore, JobFilter, Pagination};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    jobs: HashMap<Uuid, Job>,
    applications: HashMap<Uuid, Application>,
    interviews: HashMap<Uuid, Interview>,
    offers: HashMap<Uuid, Offer>,
    messages: Vec<Message>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut inner = self.inner.write().await;
        let email = user.email.to_lowercase();
        if inner.users.values().any(|u| u.email == email) {
            return Err(Error::BadRequest(
                "A user with this email address already exists.".to_string(),
            ));
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            email,
            password_hash: user.password_hash,
            display_name: user.display_name,
            role: user.role,
            company: user.company,
            position: user.position,
            is_active: true,
            is_email_verified: false,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.to_lowercase();
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.get_mut(&id) {
            user.last_login = Some(at);
            user.updated_at = at;
        }
        Ok(())
    }

    async fn insert_job(&self, job: NewJob) -> Result<Job> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let created = Job {
            id: Uuid::new_v4(),
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
            is_active: true,
            application_deadline: job.application_deadline,
            max_applications: job.max_applications,
            created_by: job.created_by,
            views: 0,
            application_count: 0,
            created_at: now,
            updated_at: now,
        };
        inner.jobs.insert(created.id, created.clone());
        Ok(created)
    }

    async fn job_by_id(&self, id: Uuid) -> Result<Option<Job>> {
        Ok(self.inner.read().await.jobs.get(&id).cloned())
    }

    async fn update_job(&self, id: Uuid, patch: JobPatch) -> Result<Job> {
        let mut inner = self.inner.write().await;
        let job = inner
            .jobs
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;

        if let Some(title) = patch.title {
            job.title = title;
        }
        if let Some(description) = patch.description {
            job.description = description;
        }
        if let Some(job_type) = patch.job_type {
            job.job_type = job_type;
        }
        if let Some(location) = patch.location {
            job.location = Some(location);
        }
        if let Some(is_remote) = patch.is_remote {
            job.is_remote = is_remote;
        }
        if let Some(salary_min) = patch.salary_min {
            job.salary_min = Some(salary_min);
        }
        if let Some(salary_max) = patch.salary_max {
            job.salary_max = Some(salary_max);
        }
        if let Some(currency) = patch.salary_currency {
            job.salary_currency = currency;
        }
        if let Some(period) = patch.salary_period {
            job.salary_period = period;
        }
        if let Some(requirements) = patch.requirements {
            job.requirements = requirements;
        }
        if let Some(skills) = patch.skills {
            job.skills = skills;
        }
        if let Some(keywords) = patch.keywords {
            job.keywords = keywords;
        }
        if let Some(department) = patch.department {
            job.department = Some(department);
        }
        if let Some(status) = patch.status {
            job.status = status;
        }
        if let Some(is_active) = patch.is_active {
            job.is_active = is_active;
        }
        if let Some(deadline) = patch.application_deadline {
            job.application_deadline = Some(deadline);
        }
        if let Some(max) = patch.max_applications {
            job.max_applications = Some(max);
        }
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    async fn delete_job(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .jobs
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))
    }

    async fn list_jobs(&self, filter: JobFilter, page: Pagination) -> Result<(Vec<Job>, i64)> {
        let page = page.clamped();
        let inner = self.inner.read().await;
        let search = filter.search.map(|s| s.to_lowercase());
        let mut items: Vec<Job> = inner
            .jobs
            .values()
            .filter(|job| {
                filter.status.map_or(true, |s| job.status == s)
                    && filter.created_by.map_or(true, |owner| job.created_by == owner)
                    && (!filter.only_active || job.is_active)
                    && search.as_ref().map_or(true, |needle| {
                        job.title.to_lowercase().contains(needle)
                            || job.description.to_lowercase().contains(needle)
                    })
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = items.len() as i64;
        let items = items
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .collect();
        Ok((items, total))
    }

    async fn jobs_by_owner(&self, owner: Uuid) -> Result<Vec<Job>> {
        let inner = self.inner.read().await;
        let mut jobs: Vec<Job> = inner
            .jobs
            .values()
            .filter(|job| job.created_by == owner)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn job_ids_by_owner(&self, owner: Uuid) -> Result<Vec<Uuid>> {
        Ok(self
            .inner
            .read()
            .await
            .jobs
            .values()
            .filter(|job| job.created_by == owner)
            .map(|job| job.id)
            .collect())
    }

    async fn increment_job_views(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(job) = inner.jobs.get_mut(&id) {
            job.views += 1;
        }
        Ok(())
    }

    async fn count_open_jobs(&self, owner: Option<Uuid>) -> Result<i64> {
        Ok(self
            .inner
            .read()
            .await
            .jobs
            .values()
            .filter(|job| {
                job.status == JobStatus::Published
                    && job.is_active
                    && owner.map_or(true, |o| job.created_by == o)
            })
            .count() as i64)
    }

    async fn insert_application(&self, app: NewApplication) -> Result<Application> {
        let mut inner = self.inner.write().await;
        let duplicate = inner
            .applications
            .values()
            .any(|a| a.job_id == app.job_id && a.candidate_id == app.candidate_id);
        if duplicate {
            return Err(Error::DuplicateApplication);
        }
        let now = Utc::now();
        let created = Application {
            id: Uuid::new_v4(),
            job_id: app.job_id,
            candidate_id: app.candidate_id,
            candidate_info: app.candidate_info,
            resume: app.resume,
            cover_letter: app.cover_letter,
            source: app.source,
            status: ApplicationStatus::New,
            status_history: Vec::new(),
            rating: None,
            created_at: now,
            updated_at: now,
        };
        inner.applications.insert(created.id, created.clone());
        if let Some(job) = inner.jobs.get_mut(&app.job_id) {
            job.application_count += 1;
        }
        Ok(created)
    }

    async fn application_by_id(&self, id: Uuid) -> Result<Option<Application>> {
        Ok(self.inner.read().await.applications.get(&id).cloned())
    }

    async fn applications_by_job(&self, job_id: Uuid) -> Result<Vec<Application>> {
        let inner = self.inner.read().await;
        let mut apps: Vec<Application> = inner
            .applications
            .values()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect();
        apps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(apps)
    }

    async fn applications_by_candidate(&self, candidate_id: Uuid) -> Result<Vec<Application>> {
        let inner = self.inner.read().await;
        let mut apps: Vec<Application> = inner
            .applications
            .values()
            .filter(|a| a.candidate_id == candidate_id)
            .cloned()
            .collect();
        apps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(apps)
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        change: StatusChange,
    ) -> Result<Application> {
        let mut inner = self.inner.write().await;
        let app = inner
            .applications
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
        if app.status != expected {
            return Err(Error::ConcurrentModification);
        }
        app.status = change.status;
        app.updated_at = change.changed_at;
        app.status_history.push(change);
        Ok(app.clone())
    }

    async fn update_application_rating(&self, id: Uuid, rating: Rating) -> Result<Application> {
        let mut inner = self.inner.write().await;
        let app = inner
            .applications
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
        app.rating = Some(rating);
        app.updated_at = Utc::now();
        Ok(app.clone())
    }

    async fn count_applications(&self, filter: ApplicationCountFilter) -> Result<i64> {
        Ok(self
            .inner
            .read()
            .await
            .applications
            .values()
            .filter(|a| {
                filter
                    .job_ids
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&a.job_id))
                    && filter.status.map_or(true, |s| a.status == s)
                    && filter.created_after.map_or(true, |at| a.created_at >= at)
                    && filter.updated_after.map_or(true, |at| a.updated_at >= at)
            })
            .count() as i64)
    }

    async fn applications_in_scope(
        &self,
        job_ids: Option<&[Uuid]>,
        range: DateRange,
    ) -> Result<Vec<Application>> {
        Ok(self
            .inner
            .read()
            .await
            .applications
            .values()
            .filter(|a| {
                job_ids.map_or(true, |ids| ids.contains(&a.job_id))
                    && range.contains(a.created_at)
            })
            .cloned()
            .collect())
    }

    async fn recent_applications(&self, job_ids: &[Uuid], limit: i64) -> Result<Vec<Application>> {
        let inner = self.inner.read().await;
        let mut apps: Vec<Application> = inner
            .applications
            .values()
            .filter(|a| job_ids.contains(&a.job_id))
            .cloned()
            .collect();
        apps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        apps.truncate(limit.max(0) as usize);
        Ok(apps)
    }

    async fn insert_interview(&self, interview: NewInterview) -> Result<Interview> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let created = Interview {
            id: Uuid::new_v4(),
            application_id: interview.application_id,
            job_id: interview.job_id,
            candidate_id: interview.candidate_id,
            title: interview.title,
            interview_type: interview.interview_type,
            scheduled_date: interview.scheduled_date,
            duration_minutes: interview.duration_minutes,
            timezone: interview.timezone,
            meeting_link: interview.meeting_link,
            location: interview.location,
            interviewer: interview.interviewer,
            status: InterviewStatus::Scheduled,
            feedback: None,
            reschedule_history: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        inner.interviews.insert(created.id, created.clone());
        Ok(created)
    }

    async fn interview_by_id(&self, id: Uuid) -> Result<Option<Interview>> {
        Ok(self.inner.read().await.interviews.get(&id).cloned())
    }

    async fn interviews_by_application(&self, application_id: Uuid) -> Result<Vec<Interview>> {
        let inner = self.inner.read().await;
        let mut interviews: Vec<Interview> = inner
            .interviews
            .values()
            .filter(|i| i.application_id == application_id)
            .cloned()
            .collect();
        interviews.sort_by(|a, b| a.scheduled_date.cmp(&b.scheduled_date));
        Ok(interviews)
    }

    async fn update_interview_status(
        &self,
        id: Uuid,
        status: InterviewStatus,
    ) -> Result<Interview> {
        let mut inner = self.inner.write().await;
        let interview = inner
            .interviews
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Interview not found".to_string()))?;
        interview.status = status;
        interview.updated_at = Utc::now();
        Ok(interview.clone())
    }

    async fn record_interview_feedback(
        &self,
        id: Uuid,
        feedback: InterviewFeedback,
        status: InterviewStatus,
    ) -> Result<Interview> {
        let mut inner = self.inner.write().await;
        let interview = inner
            .interviews
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Interview not found".to_string()))?;
        interview.feedback = Some(feedback);
        interview.status = status;
        interview.updated_at = Utc::now();
        Ok(interview.clone())
    }

    async fn reschedule_interview(
        &self,
        id: Uuid,
        new_date: DateTime<Utc>,
        entry: RescheduleEntry,
    ) -> Result<Interview> {
        let mut inner = self.inner.write().await;
        let interview = inner
            .interviews
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Interview not found".to_string()))?;
        interview.scheduled_date = new_date;
        interview.status = InterviewStatus::Rescheduled;
        interview.reschedule_history.push(entry);
        interview.updated_at = Utc::now();
        Ok(interview.clone())
    }

    async fn count_scheduled_interviews(
        &self,
        interviewer: Uuid,
        from: DateTime<Utc>,
    ) -> Result<i64> {
        Ok(self
            .inner
            .read()
            .await
            .interviews
            .values()
            .filter(|i| {
                i.interviewer.primary == interviewer
                    && i.status == InterviewStatus::Scheduled
                    && i.scheduled_date >= from
            })
            .count() as i64)
    }

    async fn upcoming_interviews(
        &self,
        interviewer: Uuid,
        from: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Interview>> {
        let inner = self.inner.read().await;
        let mut interviews: Vec<Interview> = inner
            .interviews
            .values()
            .filter(|i| {
                i.interviewer.primary == interviewer
                    && matches!(
                        i.status,
                        InterviewStatus::Scheduled | InterviewStatus::Confirmed
                    )
                    && i.scheduled_date >= from
            })
            .cloned()
            .collect();
        interviews.sort_by(|a, b| a.scheduled_date.cmp(&b.scheduled_date));
        interviews.truncate(limit.max(0) as usize);
        Ok(interviews)
    }

    async fn insert_offer(&self, offer: NewOffer) -> Result<Offer> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let created = Offer {
            id: Uuid::new_v4(),
            application_id: offer.application_id,
            job_id: offer.job_id,
            candidate_id: offer.candidate_id,
            position: offer.position,
            department: offer.department,
            salary: offer.salary,
            currency: offer.currency,
            start_date: offer.start_date,
            employment_type: offer.employment_type,
            work_location: offer.work_location,
            benefits: offer.benefits,
            status: OfferStatus::Draft,
            offer_valid_until: offer.offer_valid_until,
            response_token_hash: None,
            negotiation_rounds: 0,
            negotiation_history: Vec::new(),
            responded_at: None,
            created_at: now,
            updated_at: now,
        };
        inner.offers.insert(created.id, created.clone());
        Ok(created)
    }

    async fn offer_by_id(&self, id: Uuid) -> Result<Option<Offer>> {
        Ok(self.inner.read().await.offers.get(&id).cloned())
    }

    async fn offer_by_application(&self, application_id: Uuid) -> Result<Option<Offer>> {
        Ok(self
            .inner
            .read()
            .await
            .offers
            .values()
            .find(|o| o.application_id == application_id)
            .cloned())
    }

    async fn update_offer_status(
        &self,
        id: Uuid,
        expected: OfferStatus,
        next: OfferStatus,
        responded_at: Option<DateTime<Utc>>,
    ) -> Result<Offer> {
        let mut inner = self.inner.write().await;
        let offer = inner
            .offers
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Offer not found".to_string()))?;
        if offer.status != expected {
            return Err(Error::ConcurrentModification);
        }
        offer.status = next;
        if responded_at.is_some() {
            offer.responded_at = responded_at;
        }
        offer.updated_at = Utc::now();
        Ok(offer.clone())
    }

    async fn mark_offer_sent(
        &self,
        id: Uuid,
        token_hash: &str,
        valid_until: DateTime<Utc>,
    ) -> Result<Offer> {
        let mut inner = self.inner.write().await;
        let offer = inner
            .offers
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Offer not found".to_string()))?;
        if offer.status != OfferStatus::Draft {
            return Err(Error::ConcurrentModification);
        }
        offer.status = OfferStatus::Sent;
        offer.response_token_hash = Some(token_hash.to_string());
        offer.offer_valid_until = valid_until;
        offer.updated_at = Utc::now();
        Ok(offer.clone())
    }

    async fn extend_offer_validity(
        &self,
        id: Uuid,
        valid_until: DateTime<Utc>,
    ) -> Result<Offer> {
        let mut inner = self.inner.write().await;
        let offer = inner
            .offers
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Offer not found".to_string()))?;
        if !matches!(offer.status, OfferStatus::Draft | OfferStatus::Sent) {
            return Err(Error::NotFound(
                "Offer not found or no longer open".to_string(),
            ));
        }
        offer.offer_valid_until = valid_until;
        offer.updated_at = Utc::now();
        Ok(offer.clone())
    }

    async fn append_negotiation(
        &self,
        id: Uuid,
        expected_round: i32,
        entry: NegotiationEntry,
    ) -> Result<Offer> {
        let mut inner = self.inner.write().await;
        let offer = inner
            .offers
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Offer not found".to_string()))?;
        if offer.status != OfferStatus::Sent || offer.negotiation_rounds != expected_round {
            return Err(Error::ConcurrentModification);
        }
        offer.negotiation_rounds += 1;
        offer.negotiation_history.push(entry);
        offer.updated_at = Utc::now();
        Ok(offer.clone())
    }

    async fn expire_overdue_offers(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let mut swept = 0;
        for offer in inner.offers.values_mut() {
            if offer.status == OfferStatus::Sent && offer.offer_valid_until <= now {
                offer.status = OfferStatus::Expired;
                offer.updated_at = now;
                swept += 1;
            }
        }
        Ok(swept)
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message> {
        let mut inner = self.inner.write().await;
        let created = Message {
            id: Uuid::new_v4(),
            thread_id: message.thread_id,
            sender_id: message.sender_id,
            sender_role: message.sender_role,
            recipient_id: message.recipient_id,
            content: message.content,
            status: MessageStatus::Sent,
            related_job: message.related_job,
            related_application: message.related_application,
            created_at: Utc::now(),
            read_at: None,
        };
        inner.messages.push(created.clone());
        Ok(created)
    }

    async fn thread_between(&self, a: Uuid, b: Uuid) -> Result<Option<Uuid>> {
        Ok(self
            .inner
            .read()
            .await
            .messages
            .iter()
            .find(|m| {
                (m.sender_id == a && m.recipient_id == b)
                    || (m.sender_id == b && m.recipient_id == a)
            })
            .map(|m| m.thread_id))
    }

    async fn messages_by_thread(&self, thread_id: Uuid) -> Result<Vec<Message>> {
        let inner = self.inner.read().await;
        let mut messages: Vec<Message> = inner
            .messages
            .iter()
            .filter(|m| m.thread_id == thread_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }

    async fn mark_thread_read(
        &self,
        thread_id: Uuid,
        reader: Uuid,
        at: DateTime<Utc>,
    ) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let mut marked = 0;
        for message in inner.messages.iter_mut() {
            if message.thread_id == thread_id
                && message.recipient_id == reader
                && message.read_at.is_none()
            {
                message.status = MessageStatus::Read;
                message.read_at = Some(at);
                marked += 1;
            }
        }
        Ok(marked)
    }

    async fn unread_count(&self, recipient: Uuid) -> Result<i64> {
        Ok(self
            .inner
            .read()
            .await
            .messages
            .iter()
            .filter(|m| m.recipient_id == recipient && m.read_at.is_none())
            .count() as i64)
    }
}
