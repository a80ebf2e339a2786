//! Read-only dashboard aggregation.
//!
//! Every query is computed per request against the store; the only
//! denormalized counter in the system is `Job.application_count`, which is
//! maintained at write time, not here. Funnel counts are cumulative: an
//! application counts toward every stage it ever reached, which requires a
//! history scan rather than a current-status filter.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::Application;
use crate::models::application::ApplicationStatus;
use crate::models::interview::Interview;
use crate::models::user::User;
use crate::services::authorization::{authorize, Action, Target};
use crate::store::{ApplicationCountFilter, DateRange, EntityStore};
use crate::utils::time::{start_of_current_month, trailing_days};

const NEW_APPLICATIONS_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub open_positions: i64,
    pub new_applications: i64,
    pub scheduled_interviews: i64,
    pub hired_this_month: i64,
}

#[derive(Debug, Serialize)]
pub struct Funnel {
    pub applications: i64,
    pub reviewed: i64,
    pub interviewed: i64,
    pub offered: i64,
    pub hired: i64,
}

#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn EntityStore>,
    utc_offset_minutes: i32,
}

impl StatsService {
    pub fn new(store: Arc<dyn EntityStore>, utc_offset_minutes: i32) -> Self {
        Self {
            store,
            utc_offset_minutes,
        }
    }

    /// Headline numbers for the recruiter dashboard, scoped to the jobs the
    /// actor owns. Admins may widen the scope to all jobs by passing no
    /// owner filter.
    pub async fn dashboard(&self, actor: &User, owner_filter: Option<Uuid>) -> Result<DashboardStats> {
        let owner = if actor.is_admin() {
            owner_filter
        } else {
            Some(actor.id)
        };

        let now = Utc::now();
        let job_ids = match owner {
            Some(owner) => Some(self.store.job_ids_by_owner(owner).await?),
            None => None,
        };

        let open_positions = self.store.count_open_jobs(owner).await?;

        let new_applications = self
            .store
            .count_applications(ApplicationCountFilter {
                job_ids: job_ids.clone(),
                status: None,
                created_after: Some(trailing_days(now, NEW_APPLICATIONS_WINDOW_DAYS)),
                updated_after: None,
            })
            .await?;

        let scheduled_interviews = self
            .store
            .count_scheduled_interviews(actor.id, now)
            .await?;

        let hired_this_month = self
            .store
            .count_applications(ApplicationCountFilter {
                job_ids,
                status: Some(ApplicationStatus::Hired),
                created_after: None,
                updated_after: Some(start_of_current_month(now, self.utc_offset_minutes)),
            })
            .await?;

        Ok(DashboardStats {
            open_positions,
            new_applications,
            scheduled_interviews,
            hired_this_month,
        })
    }

    /// Cumulative funnel for one job or for the whole of the actor's scope.
    pub async fn funnel(
        &self,
        actor: &User,
        job_id: Option<Uuid>,
        range: DateRange,
    ) -> Result<Funnel> {
        let scope: Option<Vec<Uuid>> = match job_id {
            Some(job_id) => {
                let job = self
                    .store
                    .job_by_id(job_id)
                    .await?
                    .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;
                authorize(Some(actor), Action::ReadApplication, &Target::job(&job))?;
                Some(vec![job.id])
            }
            None if actor.is_admin() => None,
            None => Some(self.store.job_ids_by_owner(actor.id).await?),
        };

        let applications = self
            .store
            .applications_in_scope(scope.as_deref(), range)
            .await?;

        Ok(compute_funnel(&applications))
    }

    pub async fn recent_applications(
        &self,
        actor: &User,
        limit: i64,
    ) -> Result<Vec<Application>> {
        let job_ids = self.store.job_ids_by_owner(actor.id).await?;
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.store.recent_applications(&job_ids, limit).await
    }

    pub async fn upcoming_interviews(&self, actor: &User, limit: i64) -> Result<Vec<Interview>> {
        self.store
            .upcoming_interviews(actor.id, Utc::now(), limit)
            .await
    }
}

/// Stage thresholds on [`ApplicationStatus::funnel_rank`]: an application
/// that ever reached the rank counts, whatever its current status.
fn compute_funnel(applications: &[Application]) -> Funnel {
    let mut funnel = Funnel {
        applications: applications.len() as i64,
        reviewed: 0,
        interviewed: 0,
        offered: 0,
        hired: 0,
    };

    for application in applications {
        let stage = application.max_stage_reached();
        if stage >= 1 {
            funnel.reviewed += 1;
        }
        if stage >= 4 {
            funnel.interviewed += 1;
        }
        if stage >= 5 {
            funnel.offered += 1;
        }
        if stage >= 6 {
            funnel.hired += 1;
        }
    }

    funnel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::{ApplicationSource, CandidateInfo, StatusChange};

    fn app_with_history(statuses: &[ApplicationStatus]) -> Application {
        let current = *statuses.last().unwrap_or(&ApplicationStatus::New);
        Application {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            candidate_info: CandidateInfo {
                name: "C".into(),
                email: "c@example.com".into(),
                phone: None,
                location: None,
            },
            resume: None,
            cover_letter: None,
            source: ApplicationSource::Direct,
            status: current,
            status_history: statuses
                .iter()
                .map(|s| StatusChange {
                    status: *s,
                    changed_by: Uuid::new_v4(),
                    changed_at: Utc::now(),
                    reason: None,
                })
                .collect(),
            rating: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn funnel_counts_are_monotonically_non_increasing() {
        use ApplicationStatus::*;
        let apps = vec![
            app_with_history(&[]),
            app_with_history(&[Reviewing]),
            app_with_history(&[Reviewing, Shortlisted, Rejected]),
            app_with_history(&[Reviewing, Shortlisted, Interviewing, Interviewed]),
            app_with_history(&[Reviewing, Shortlisted, Interviewing, Interviewed, Offer, Hired]),
        ];
        let funnel = compute_funnel(&apps);
        assert!(funnel.applications >= funnel.reviewed);
        assert!(funnel.reviewed >= funnel.interviewed);
        assert!(funnel.interviewed >= funnel.offered);
        assert!(funnel.offered >= funnel.hired);
        assert_eq!(funnel.applications, 5);
        assert_eq!(funnel.reviewed, 4);
        assert_eq!(funnel.interviewed, 2);
        assert_eq!(funnel.offered, 1);
        assert_eq!(funnel.hired, 1);
    }

    #[test]
    fn hired_application_still_counts_toward_interviewed() {
        use ApplicationStatus::*;
        let apps = vec![app_with_history(&[
            Reviewing,
            Shortlisted,
            Interviewing,
            Interviewed,
            Offer,
            Hired,
        ])];
        let funnel = compute_funnel(&apps);
        assert_eq!(funnel.interviewed, 1);
        assert_eq!(funnel.hired, 1);
    }
}
