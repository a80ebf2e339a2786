//! Ownership and role based access decisions.
//!
//! `authorize` is a pure decision function: rules are evaluated in order and
//! the first match wins. Denial is a value (`Error::AccessDenied`), not a
//! panic; handlers surface it as 403.

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::Application;
use crate::models::interview::Interview;
use crate::models::job::{Job, JobStatus};
use crate::models::offer::Offer;
use crate::models::user::User;
use crate::utils::crypto::{digests_match, token_digest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ReadJob,
    UpdateJob,
    DeleteJob,
    CreateApplication,
    ReadApplication,
    TransitionApplication,
    RateApplication,
    ScheduleInterview,
    ReadInterview,
    UpdateInterview,
    CreateOffer,
    ReadOffer,
    ManageOffer,
}

/// Ownership facts about the entity being acted on. Assembled by the caller
/// so the decision itself never touches the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct Target {
    pub job_owner: Option<Uuid>,
    pub job_status: Option<JobStatus>,
    pub candidate_id: Option<Uuid>,
}

impl Target {
    pub fn job(job: &Job) -> Self {
        Self {
            job_owner: Some(job.created_by),
            job_status: Some(job.status),
            candidate_id: None,
        }
    }

    pub fn application(job: &Job, application: &Application) -> Self {
        Self {
            job_owner: Some(job.created_by),
            job_status: Some(job.status),
            candidate_id: Some(application.candidate_id),
        }
    }

    /// Creation target: the application does not exist yet, so the candidate
    /// is the would-be applicant.
    pub fn new_application(job: &Job, candidate_id: Uuid) -> Self {
        Self {
            job_owner: Some(job.created_by),
            job_status: Some(job.status),
            candidate_id: Some(candidate_id),
        }
    }

    pub fn interview(job: &Job, interview: &Interview) -> Self {
        Self {
            job_owner: Some(job.created_by),
            job_status: Some(job.status),
            candidate_id: Some(interview.candidate_id),
        }
    }

    pub fn offer(job: &Job, offer: &Offer) -> Self {
        Self {
            job_owner: Some(job.created_by),
            job_status: Some(job.status),
            candidate_id: Some(offer.candidate_id),
        }
    }

    pub fn candidate(candidate_id: Uuid) -> Self {
        Self {
            job_owner: None,
            job_status: None,
            candidate_id: Some(candidate_id),
        }
    }
}

pub fn authorize(actor: Option<&User>, action: Action, target: &Target) -> Result<()> {
    // 1. Admins may do anything.
    if actor.map_or(false, |a| a.is_admin()) {
        return Ok(());
    }

    // 2. Published jobs are readable by anyone, including anonymous callers.
    if action == Action::ReadJob && target.job_status == Some(JobStatus::Published) {
        return Ok(());
    }

    // 3. The recruiter owning the job owns every downstream entity.
    if let (Some(actor), Some(owner)) = (actor, target.job_owner) {
        if actor.id == owner {
            return Ok(());
        }
    }

    // 4. Candidates read and create their own applications; they do not
    //    mutate status.
    if matches!(action, Action::ReadApplication | Action::CreateApplication) {
        if let (Some(actor), Some(candidate)) = (actor, target.candidate_id) {
            if actor.id == candidate {
                return Ok(());
            }
        }
    }

    Err(Error::AccessDenied)
}

/// Rule 5: the capability token minted at offer send time stands in for a
/// login session. Compared in constant time against the stored digest.
pub fn verify_offer_token(offer: &Offer, token: &str, secret: &str) -> Result<()> {
    let Some(stored) = offer.response_token_hash.as_deref() else {
        return Err(Error::AccessDenied);
    };
    let supplied = token_digest(secret, token);
    if digests_match(stored, &supplied) {
        Ok(())
    } else {
        Err(Error::AccessDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;
    use chrono::Utc;

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", Uuid::new_v4()),
            password_hash: "x".into(),
            display_name: "Test".into(),
            role,
            company: None,
            position: None,
            is_active: true,
            is_email_verified: true,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admin_wins_before_everything() {
        let admin = user(UserRole::Admin);
        let target = Target::default();
        for action in [
            Action::DeleteJob,
            Action::TransitionApplication,
            Action::ManageOffer,
        ] {
            assert!(authorize(Some(&admin), action, &target).is_ok());
        }
    }

    #[test]
    fn anonymous_reads_published_jobs_only() {
        let published = Target {
            job_owner: Some(Uuid::new_v4()),
            job_status: Some(JobStatus::Published),
            candidate_id: None,
        };
        let draft = Target {
            job_status: Some(JobStatus::Draft),
            ..published
        };
        assert!(authorize(None, Action::ReadJob, &published).is_ok());
        assert!(authorize(None, Action::ReadJob, &draft).is_err());
        assert!(authorize(None, Action::UpdateJob, &published).is_err());
    }

    #[test]
    fn owner_mutates_downstream_entities() {
        let owner = user(UserRole::Recruiter);
        let target = Target {
            job_owner: Some(owner.id),
            job_status: Some(JobStatus::Published),
            candidate_id: Some(Uuid::new_v4()),
        };
        assert!(authorize(Some(&owner), Action::TransitionApplication, &target).is_ok());
        assert!(authorize(Some(&owner), Action::ScheduleInterview, &target).is_ok());

        let stranger = user(UserRole::Recruiter);
        assert!(authorize(Some(&stranger), Action::TransitionApplication, &target).is_err());
    }

    #[test]
    fn candidate_reads_but_does_not_mutate_own_application() {
        let candidate = user(UserRole::Candidate);
        let target = Target {
            job_owner: Some(Uuid::new_v4()),
            job_status: Some(JobStatus::Published),
            candidate_id: Some(candidate.id),
        };
        assert!(authorize(Some(&candidate), Action::ReadApplication, &target).is_ok());
        assert!(authorize(Some(&candidate), Action::CreateApplication, &target).is_ok());
        assert!(authorize(Some(&candidate), Action::TransitionApplication, &target).is_err());
    }
}
