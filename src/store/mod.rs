//! Persistence abstraction for the hiring lifecycle.
//!
//! All store operations are async. The trait carries the concurrency
//! contract the engines rely on: status writes are compare-and-swap on the
//! previously observed status, and application inserts bump the owning job's
//! counter in the same atomic step.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::application::{
    Application, ApplicationStatus, NewApplication, Rating, StatusChange,
};
use crate::models::interview::{
    Interview, InterviewFeedback, InterviewStatus, NewInterview, RescheduleEntry,
};
use crate::models::job::{Job, JobPatch, JobStatus, NewJob};
use crate::models::message::{Message, NewMessage};
use crate::models::offer::{NegotiationEntry, NewOffer, Offer, OfferStatus};
use crate::models::user::{NewUser, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

impl Pagination {
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub created_by: Option<Uuid>,
    pub only_active: bool,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationCountFilter {
    /// `None` means all jobs; `Some` restricts to the given job ids.
    pub job_ids: Option<Vec<Uuid>>,
    pub status: Option<ApplicationStatus>,
    pub created_after: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at <= to)
    }
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    // --- users ---

    /// Emails are stored lowercase; a duplicate insert fails with a
    /// `BadRequest`.
    async fn insert_user(&self, user: NewUser) -> Result<User>;
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<()>;

    // --- jobs ---

    async fn insert_job(&self, job: NewJob) -> Result<Job>;
    async fn job_by_id(&self, id: Uuid) -> Result<Option<Job>>;
    async fn update_job(&self, id: Uuid, patch: JobPatch) -> Result<Job>;
    async fn delete_job(&self, id: Uuid) -> Result<()>;
    async fn list_jobs(&self, filter: JobFilter, page: Pagination) -> Result<(Vec<Job>, i64)>;
    async fn jobs_by_owner(&self, owner: Uuid) -> Result<Vec<Job>>;
    async fn job_ids_by_owner(&self, owner: Uuid) -> Result<Vec<Uuid>>;
    /// Atomic increment; concurrent reads must not lose updates.
    async fn increment_job_views(&self, id: Uuid) -> Result<()>;
    async fn count_open_jobs(&self, owner: Option<Uuid>) -> Result<i64>;

    // --- applications ---

    /// Inserts the application and increments the job's lifetime
    /// `application_count` in one atomic step. A second application for the
    /// same (job, candidate) pair fails with `DuplicateApplication` and
    /// leaves the counter untouched.
    async fn insert_application(&self, app: NewApplication) -> Result<Application>;
    async fn application_by_id(&self, id: Uuid) -> Result<Option<Application>>;
    async fn applications_by_job(&self, job_id: Uuid) -> Result<Vec<Application>>;
    async fn applications_by_candidate(&self, candidate_id: Uuid) -> Result<Vec<Application>>;
    /// Compare-and-swap: appends `change` to the history and sets the
    /// status to `change.status`, but only while the stored status still
    /// equals `expected`. A lost race fails with `ConcurrentModification`.
    async fn update_application_status(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        change: StatusChange,
    ) -> Result<Application>;
    async fn update_application_rating(&self, id: Uuid, rating: Rating) -> Result<Application>;
    async fn count_applications(&self, filter: ApplicationCountFilter) -> Result<i64>;
    /// Applications for funnel computation: optionally restricted to a job
    /// set and a creation date range.
    async fn applications_in_scope(
        &self,
        job_ids: Option<&[Uuid]>,
        range: DateRange,
    ) -> Result<Vec<Application>>;
    async fn recent_applications(&self, job_ids: &[Uuid], limit: i64) -> Result<Vec<Application>>;

    // --- interviews ---

    async fn insert_interview(&self, interview: NewInterview) -> Result<Interview>;
    async fn interview_by_id(&self, id: Uuid) -> Result<Option<Interview>>;
    async fn interviews_by_application(&self, application_id: Uuid) -> Result<Vec<Interview>>;
    async fn update_interview_status(
        &self,
        id: Uuid,
        status: InterviewStatus,
    ) -> Result<Interview>;
    async fn record_interview_feedback(
        &self,
        id: Uuid,
        feedback: InterviewFeedback,
        status: InterviewStatus,
    ) -> Result<Interview>;
    async fn reschedule_interview(
        &self,
        id: Uuid,
        new_date: DateTime<Utc>,
        entry: RescheduleEntry,
    ) -> Result<Interview>;
    async fn count_scheduled_interviews(
        &self,
        interviewer: Uuid,
        from: DateTime<Utc>,
    ) -> Result<i64>;
    async fn upcoming_interviews(
        &self,
        interviewer: Uuid,
        from: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Interview>>;

    // --- offers ---

    async fn insert_offer(&self, offer: NewOffer) -> Result<Offer>;
    async fn offer_by_id(&self, id: Uuid) -> Result<Option<Offer>>;
    async fn offer_by_application(&self, application_id: Uuid) -> Result<Option<Offer>>;
    /// Compare-and-swap on the offer status, same contract as
    /// [`EntityStore::update_application_status`].
    async fn update_offer_status(
        &self,
        id: Uuid,
        expected: OfferStatus,
        next: OfferStatus,
        responded_at: Option<DateTime<Utc>>,
    ) -> Result<Offer>;
    /// draft -> sent, recording the capability token digest.
    async fn mark_offer_sent(
        &self,
        id: Uuid,
        token_hash: &str,
        valid_until: DateTime<Utc>,
    ) -> Result<Offer>;
    async fn extend_offer_validity(
        &self,
        id: Uuid,
        valid_until: DateTime<Utc>,
    ) -> Result<Offer>;
    /// Appends a negotiation round while the stored round counter still
    /// equals `expected_round` and the offer is still `sent`.
    async fn append_negotiation(
        &self,
        id: Uuid,
        expected_round: i32,
        entry: NegotiationEntry,
    ) -> Result<Offer>;
    /// Moves every `sent` offer past its validity date to `expired`.
    /// Returns the number of offers swept.
    async fn expire_overdue_offers(&self, now: DateTime<Utc>) -> Result<u64>;

    // --- messages ---

    async fn insert_message(&self, message: NewMessage) -> Result<Message>;
    async fn thread_between(&self, a: Uuid, b: Uuid) -> Result<Option<Uuid>>;
    async fn messages_by_thread(&self, thread_id: Uuid) -> Result<Vec<Message>>;
    async fn mark_thread_read(
        &self,
        thread_id: Uuid,
        reader: Uuid,
        at: DateTime<Utc>,
    ) -> Result<u64>;
    async fn unread_count(&self, recipient: Uuid) -> Result<i64>;
}
