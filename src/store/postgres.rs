//! PostgreSQL backend for [`EntityStore`].
//!
//! Status writes are conditional updates: the `WHERE status = $expected`
//! clause is the compare-and-swap that serializes racing transitions on a
//! single row. Counter maintenance happens inside the same transaction as
//! the insert it belongs to.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::{
    Application, ApplicationStatus, NewApplication, Rating, StatusChange,
};
use crate::models::interview::{
    Interview, InterviewFeedback, InterviewStatus, NewInterview, RescheduleEntry,
};
use crate::models::job::{Job, JobPatch, NewJob};
use crate::models::message::{Message, MessageStatus, NewMessage};
use crate::models::offer::{NegotiationEntry, NewOffer, Offer, OfferStatus};
use crate::models::user::{NewUser, User};

use super::{ApplicationCountFilter, DateRange, EntityStore, JobFilter, Pagination};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let email = user.email.to_lowercase();
        let exists: Option<(Uuid,)> =
            sqlx::query_as(r#"SELECT id FROM users WHERE email = $1"#)
                .bind(&email)
                .fetch_optional(&self.pool)
                .await?;
        if exists.is_some() {
            return Err(Error::BadRequest(
                "A user with this email address already exists.".to_string(),
            ));
        }

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, display_name, role, company, position)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.role.as_str())
        .bind(&user.company)
        .bind(&user.position)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE email = $1"#)
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(r#"UPDATE users SET last_login = $2, updated_at = NOW() WHERE id = $1"#)
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_job(&self, job: NewJob) -> Result<Job> {
        let created = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                title, description, job_type, location, is_remote,
                salary_min, salary_max, salary_currency, salary_period,
                requirements, skills, keywords, department,
                status, application_deadline, max_applications, created_by
            ) VALUES (
                $1, $2, $3, $4, $5,
                $6, $7, $8, $9,
                $10, $11, $12, $13,
                $14, $15, $16, $17
            )
            RETURNING *
            "#,
        )
        .bind(&job.title)
        .bind(&job.description)
        .bind(job.job_type.as_str())
        .bind(&job.location)
        .bind(job.is_remote)
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(&job.salary_currency)
        .bind(job.salary_period.as_str())
        .bind(&job.requirements)
        .bind(&job.skills)
        .bind(&job.keywords)
        .bind(&job.department)
        .bind(job.status.as_str())
        .bind(job.application_deadline)
        .bind(job.max_applications)
        .bind(job.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn job_by_id(&self, id: Uuid) -> Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(r#"SELECT * FROM jobs WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    async fn update_job(&self, id: Uuid, patch: JobPatch) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                job_type = COALESCE($4, job_type),
                location = COALESCE($5, location),
                is_remote = COALESCE($6, is_remote),
                salary_min = COALESCE($7, salary_min),
                salary_max = COALESCE($8, salary_max),
                salary_currency = COALESCE($9, salary_currency),
                salary_period = COALESCE($10, salary_period),
                requirements = COALESCE($11, requirements),
                skills = COALESCE($12, skills),
                keywords = COALESCE($13, keywords),
                department = COALESCE($14, department),
                status = COALESCE($15, status),
                is_active = COALESCE($16, is_active),
                application_deadline = COALESCE($17, application_deadline),
                max_applications = COALESCE($18, max_applications),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.job_type.map(|t| t.as_str()))
        .bind(patch.location)
        .bind(patch.is_remote)
        .bind(patch.salary_min)
        .bind(patch.salary_max)
        .bind(patch.salary_currency)
        .bind(patch.salary_period.map(|p| p.as_str()))
        .bind(patch.requirements)
        .bind(patch.skills)
        .bind(patch.keywords)
        .bind(patch.department)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.is_active)
        .bind(patch.application_deadline)
        .bind(patch.max_applications)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;

        Ok(job)
    }

    async fn delete_job(&self, id: Uuid) -> Result<()> {
        let res = sqlx::query(r#"DELETE FROM jobs WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Job not found".to_string()));
        }
        Ok(())
    }

    async fn list_jobs(&self, filter: JobFilter, page: Pagination) -> Result<(Vec<Job>, i64)> {
        let page = page.clamped();

        let mut filters = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(status) = filter.status {
            filters.push(format!("status = ${}", args.len() + 1));
            args.push(status.as_str().to_string());
        }
        if let Some(owner) = filter.created_by {
            filters.push(format!("created_by = ${}::uuid", args.len() + 1));
            args.push(owner.to_string());
        }
        if filter.only_active {
            filters.push("is_active = TRUE".to_string());
        }
        if let Some(search) = filter.search {
            let first = args.len() + 1;
            let second = first + 1;
            filters.push(format!(
                "(title ILIKE ${} OR description ILIKE ${})",
                first, second
            ));
            args.push(format!("%{}%", search.clone()));
            args.push(format!("%{}%", search));
        }

        let where_clause = if filters.is_empty() {
            "".to_string()
        } else {
            format!("WHERE {}", filters.join(" AND "))
        };

        let items_query = format!(
            "SELECT * FROM jobs {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            where_clause,
            args.len() + 1,
            args.len() + 2
        );
        let total_query = format!("SELECT COUNT(*) FROM jobs {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, Job>(&items_query);
        for value in &args {
            items_statement = items_statement.bind(value);
        }
        items_statement = items_statement.bind(page.per_page).bind(page.offset());
        let items = items_statement.fetch_all(&self.pool).await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in &args {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        Ok((items, total))
    }

    async fn jobs_by_owner(&self, owner: Uuid) -> Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"SELECT * FROM jobs WHERE created_by = $1 ORDER BY created_at DESC"#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    async fn job_ids_by_owner(&self, owner: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<(Uuid,)> =
            sqlx::query_as(r#"SELECT id FROM jobs WHERE created_by = $1"#)
                .bind(owner)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn increment_job_views(&self, id: Uuid) -> Result<()> {
        sqlx::query(r#"UPDATE jobs SET views = views + 1 WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_open_jobs(&self, owner: Option<Uuid>) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM jobs
            WHERE status = 'published' AND is_active = TRUE
              AND ($1::uuid IS NULL OR created_by = $1)
            "#,
        )
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn insert_application(&self, app: NewApplication) -> Result<Application> {
        let mut tx = self.pool.begin().await?;

        // The unique (job_id, candidate_id) index backs the duplicate check;
        // ON CONFLICT keeps the insert and the verdict in one statement.
        let inserted = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (
                job_id, candidate_id, candidate_info, resume, cover_letter, source
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (job_id, candidate_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(app.job_id)
        .bind(app.candidate_id)
        .bind(Json(&app.candidate_info))
        .bind(Json(&app.resume))
        .bind(&app.cover_letter)
        .bind(app.source.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(application) = inserted else {
            return Err(Error::DuplicateApplication);
        };

        sqlx::query(
            r#"UPDATE jobs SET application_count = application_count + 1 WHERE id = $1"#,
        )
        .bind(app.job_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(application)
    }

    async fn application_by_id(&self, id: Uuid) -> Result<Option<Application>> {
        let app = sqlx::query_as::<_, Application>(r#"SELECT * FROM applications WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(app)
    }

    async fn applications_by_job(&self, job_id: Uuid) -> Result<Vec<Application>> {
        let apps = sqlx::query_as::<_, Application>(
            r#"SELECT * FROM applications WHERE job_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(apps)
    }

    async fn applications_by_candidate(&self, candidate_id: Uuid) -> Result<Vec<Application>> {
        let apps = sqlx::query_as::<_, Application>(
            r#"SELECT * FROM applications WHERE candidate_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(apps)
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        change: StatusChange,
    ) -> Result<Application> {
        let updated = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = $2,
                status_history = status_history || $3::jsonb,
                updated_at = $4
            WHERE id = $1 AND status = $5
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(change.status.as_str())
        .bind(Json(&change))
        .bind(change.changed_at)
        .bind(expected.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(app) => Ok(app),
            None => {
                let exists =
                    sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM applications WHERE id = $1"#)
                        .bind(id)
                        .fetch_one(&self.pool)
                        .await?;
                if exists == 0 {
                    Err(Error::NotFound("Application not found".to_string()))
                } else {
                    Err(Error::ConcurrentModification)
                }
            }
        }
    }

    async fn update_application_rating(&self, id: Uuid, rating: Rating) -> Result<Application> {
        let app = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET rating = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(&rating))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
        Ok(app)
    }

    async fn count_applications(&self, filter: ApplicationCountFilter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM applications
            WHERE ($1::uuid[] IS NULL OR job_id = ANY($1))
              AND ($2::text IS NULL OR status = $2)
              AND ($3::timestamptz IS NULL OR created_at >= $3)
              AND ($4::timestamptz IS NULL OR updated_at >= $4)
            "#,
        )
        .bind(filter.job_ids)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.created_after)
        .bind(filter.updated_after)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn applications_in_scope(
        &self,
        job_ids: Option<&[Uuid]>,
        range: DateRange,
    ) -> Result<Vec<Application>> {
        let apps = sqlx::query_as::<_, Application>(
            r#"
            SELECT * FROM applications
            WHERE ($1::uuid[] IS NULL OR job_id = ANY($1))
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at <= $3)
            "#,
        )
        .bind(job_ids.map(|ids| ids.to_vec()))
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&self.pool)
        .await?;
        Ok(apps)
    }

    async fn recent_applications(&self, job_ids: &[Uuid], limit: i64) -> Result<Vec<Application>> {
        let apps = sqlx::query_as::<_, Application>(
            r#"
            SELECT * FROM applications
            WHERE job_id = ANY($1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(job_ids.to_vec())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(apps)
    }

    async fn insert_interview(&self, interview: NewInterview) -> Result<Interview> {
        let created = sqlx::query_as::<_, Interview>(
            r#"
            INSERT INTO interviews (
                application_id, job_id, candidate_id, title, interview_type,
                scheduled_date, duration_minutes, timezone, meeting_link, location,
                interviewer
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(interview.application_id)
        .bind(interview.job_id)
        .bind(interview.candidate_id)
        .bind(&interview.title)
        .bind(interview.interview_type.as_str())
        .bind(interview.scheduled_date)
        .bind(interview.duration_minutes)
        .bind(&interview.timezone)
        .bind(&interview.meeting_link)
        .bind(&interview.location)
        .bind(Json(&interview.interviewer))
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn interview_by_id(&self, id: Uuid) -> Result<Option<Interview>> {
        let interview =
            sqlx::query_as::<_, Interview>(r#"SELECT * FROM interviews WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(interview)
    }

    async fn interviews_by_application(&self, application_id: Uuid) -> Result<Vec<Interview>> {
        let interviews = sqlx::query_as::<_, Interview>(
            r#"SELECT * FROM interviews WHERE application_id = $1 ORDER BY scheduled_date ASC"#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(interviews)
    }

    async fn update_interview_status(
        &self,
        id: Uuid,
        status: InterviewStatus,
    ) -> Result<Interview> {
        let interview = sqlx::query_as::<_, Interview>(
            r#"
            UPDATE interviews
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Interview not found".to_string()))?;
        Ok(interview)
    }

    async fn record_interview_feedback(
        &self,
        id: Uuid,
        feedback: InterviewFeedback,
        status: InterviewStatus,
    ) -> Result<Interview> {
        let interview = sqlx::query_as::<_, Interview>(
            r#"
            UPDATE interviews
            SET feedback = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(&feedback))
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Interview not found".to_string()))?;
        Ok(interview)
    }

    async fn reschedule_interview(
        &self,
        id: Uuid,
        new_date: DateTime<Utc>,
        entry: RescheduleEntry,
    ) -> Result<Interview> {
        let interview = sqlx::query_as::<_, Interview>(
            r#"
            UPDATE interviews
            SET scheduled_date = $2,
                status = 'rescheduled',
                reschedule_history = reschedule_history || $3::jsonb,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new_date)
        .bind(Json(&entry))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Interview not found".to_string()))?;
        Ok(interview)
    }

    async fn count_scheduled_interviews(
        &self,
        interviewer: Uuid,
        from: DateTime<Utc>,
    ) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM interviews
            WHERE interviewer->>'primary' = $1
              AND status = 'scheduled'
              AND scheduled_date >= $2
            "#,
        )
        .bind(interviewer.to_string())
        .bind(from)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn upcoming_interviews(
        &self,
        interviewer: Uuid,
        from: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Interview>> {
        let interviews = sqlx::query_as::<_, Interview>(
            r#"
            SELECT * FROM interviews
            WHERE interviewer->>'primary' = $1
              AND status IN ('scheduled', 'confirmed')
              AND scheduled_date >= $2
            ORDER BY scheduled_date ASC
            LIMIT $3
            "#,
        )
        .bind(interviewer.to_string())
        .bind(from)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(interviews)
    }

    async fn insert_offer(&self, offer: NewOffer) -> Result<Offer> {
        let created = sqlx::query_as::<_, Offer>(
            r#"
            INSERT INTO offers (
                application_id, job_id, candidate_id, position, department,
                salary, currency, start_date, employment_type, work_location,
                benefits, offer_valid_until
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(offer.application_id)
        .bind(offer.job_id)
        .bind(offer.candidate_id)
        .bind(&offer.position)
        .bind(&offer.department)
        .bind(offer.salary)
        .bind(&offer.currency)
        .bind(offer.start_date)
        .bind(offer.employment_type.as_str())
        .bind(offer.work_location.as_str())
        .bind(&offer.benefits)
        .bind(offer.offer_valid_until)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn offer_by_id(&self, id: Uuid) -> Result<Option<Offer>> {
        let offer = sqlx::query_as::<_, Offer>(r#"SELECT * FROM offers WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(offer)
    }

    async fn offer_by_application(&self, application_id: Uuid) -> Result<Option<Offer>> {
        let offer =
            sqlx::query_as::<_, Offer>(r#"SELECT * FROM offers WHERE application_id = $1"#)
                .bind(application_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(offer)
    }

    async fn update_offer_status(
        &self,
        id: Uuid,
        expected: OfferStatus,
        next: OfferStatus,
        responded_at: Option<DateTime<Utc>>,
    ) -> Result<Offer> {
        let updated = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers
            SET status = $2,
                responded_at = COALESCE($3, responded_at),
                updated_at = NOW()
            WHERE id = $1 AND status = $4
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(next.as_str())
        .bind(responded_at)
        .bind(expected.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(offer) => Ok(offer),
            None => {
                let exists = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM offers WHERE id = $1"#)
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?;
                if exists == 0 {
                    Err(Error::NotFound("Offer not found".to_string()))
                } else {
                    Err(Error::ConcurrentModification)
                }
            }
        }
    }

    async fn mark_offer_sent(
        &self,
        id: Uuid,
        token_hash: &str,
        valid_until: DateTime<Utc>,
    ) -> Result<Offer> {
        let updated = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers
            SET status = 'sent',
                response_token_hash = $2,
                offer_valid_until = $3,
                updated_at = NOW()
            WHERE id = $1 AND status = 'draft'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(valid_until)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(offer) => Ok(offer),
            None => {
                let exists = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM offers WHERE id = $1"#)
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?;
                if exists == 0 {
                    Err(Error::NotFound("Offer not found".to_string()))
                } else {
                    Err(Error::ConcurrentModification)
                }
            }
        }
    }

    async fn extend_offer_validity(
        &self,
        id: Uuid,
        valid_until: DateTime<Utc>,
    ) -> Result<Offer> {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers
            SET offer_valid_until = $2, updated_at = NOW()
            WHERE id = $1 AND status IN ('draft', 'sent')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(valid_until)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Offer not found or no longer open".to_string()))?;
        Ok(offer)
    }

    async fn append_negotiation(
        &self,
        id: Uuid,
        expected_round: i32,
        entry: NegotiationEntry,
    ) -> Result<Offer> {
        let updated = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers
            SET negotiation_rounds = negotiation_rounds + 1,
                negotiation_history = negotiation_history || $2::jsonb,
                updated_at = NOW()
            WHERE id = $1 AND negotiation_rounds = $3 AND status = 'sent'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(&entry))
        .bind(expected_round)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(offer) => Ok(offer),
            None => {
                let exists = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM offers WHERE id = $1"#)
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?;
                if exists == 0 {
                    Err(Error::NotFound("Offer not found".to_string()))
                } else {
                    Err(Error::ConcurrentModification)
                }
            }
        }
    }

    async fn expire_overdue_offers(&self, now: DateTime<Utc>) -> Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE offers
            SET status = 'expired', updated_at = $1
            WHERE status = 'sent' AND offer_valid_until <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message> {
        let created = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (
                thread_id, sender_id, sender_role, recipient_id, content,
                status, related_job, related_application
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(message.thread_id)
        .bind(message.sender_id)
        .bind(message.sender_role.as_str())
        .bind(message.recipient_id)
        .bind(&message.content)
        .bind(MessageStatus::Sent.as_str())
        .bind(message.related_job)
        .bind(message.related_application)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn thread_between(&self, a: Uuid, b: Uuid) -> Result<Option<Uuid>> {
        let thread: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT thread_id FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            LIMIT 1
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await?;
        Ok(thread.map(|(id,)| id))
    }

    async fn messages_by_thread(&self, thread_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"SELECT * FROM messages WHERE thread_id = $1 ORDER BY created_at ASC"#,
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    async fn mark_thread_read(
        &self,
        thread_id: Uuid,
        reader: Uuid,
        at: DateTime<Utc>,
    ) -> Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE messages
            SET status = 'read', read_at = $3
            WHERE thread_id = $1 AND recipient_id = $2 AND read_at IS NULL
            "#,
        )
        .bind(thread_id)
        .bind(reader)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    async fn unread_count(&self, recipient: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND read_at IS NULL"#,
        )
        .bind(recipient)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
