mod common;

use chrono::{Duration, Utc};
use validator::Validate;

use common::{apply_payload, drive, seed_job, seed_user, TestEnv};
use talentflow_backend::dto::application_dto::RatingPayload;
use talentflow_backend::error::Error;
use talentflow_backend::models::application::ApplicationStatus;
use talentflow_backend::models::job::{JobPatch, JobStatus};
use talentflow_backend::models::user::UserRole;
use talentflow_backend::store::EntityStore;

#[tokio::test]
async fn create_then_duplicate_application() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let candidate = seed_user(&env.store, UserRole::Candidate).await;
    let job = seed_job(&env.store, recruiter.id, JobStatus::Published).await;

    let application = env
        .applications
        .create(&candidate, apply_payload(job.id))
        .await
        .expect("first application");
    assert_eq!(application.status, ApplicationStatus::New);
    assert!(application.status_history.is_empty());

    let job = env.store.job_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job.application_count, 1);

    let err = env
        .applications
        .create(&candidate, apply_payload(job.id))
        .await
        .expect_err("duplicate application");
    assert!(matches!(err, Error::DuplicateApplication));

    let job = env.store.job_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job.application_count, 1);
}

#[tokio::test]
async fn status_always_tracks_last_history_entry() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let candidate = seed_user(&env.store, UserRole::Candidate).await;
    let job = seed_job(&env.store, recruiter.id, JobStatus::Published).await;

    let application = env
        .applications
        .create(&candidate, apply_payload(job.id))
        .await
        .unwrap();

    let updated = drive(
        &env.applications,
        &recruiter,
        application.id,
        &[ApplicationStatus::Reviewing, ApplicationStatus::Shortlisted],
    )
    .await;

    assert_eq!(updated.status, ApplicationStatus::Shortlisted);
    assert_eq!(updated.status_history.len(), 2);
    assert_eq!(
        updated.status_history.last().unwrap().status,
        updated.status
    );
    assert_eq!(
        updated.status_history.last().unwrap().changed_by,
        recruiter.id
    );
}

#[tokio::test]
async fn stages_cannot_be_skipped() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let candidate = seed_user(&env.store, UserRole::Candidate).await;
    let job = seed_job(&env.store, recruiter.id, JobStatus::Published).await;

    let application = env
        .applications
        .create(&candidate, apply_payload(job.id))
        .await
        .unwrap();
    drive(
        &env.applications,
        &recruiter,
        application.id,
        &[ApplicationStatus::Reviewing, ApplicationStatus::Shortlisted],
    )
    .await;

    // Straight to hired skips interviewing/interviewed/offer.
    let err = env
        .applications
        .transition(application.id, ApplicationStatus::Hired, &recruiter, None)
        .await
        .expect_err("skipping stages");
    assert!(matches!(err, Error::InvalidTransition { .. }));

    // The rejected attempt left no trace in the history.
    let application = env
        .store
        .application_by_id(application.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::Shortlisted);
    assert_eq!(application.status_history.len(), 2);
}

#[tokio::test]
async fn terminal_statuses_reject_all_transitions() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let candidate = seed_user(&env.store, UserRole::Candidate).await;
    let job = seed_job(&env.store, recruiter.id, JobStatus::Published).await;

    let application = env
        .applications
        .create(&candidate, apply_payload(job.id))
        .await
        .unwrap();
    env.applications
        .transition(
            application.id,
            ApplicationStatus::Rejected,
            &recruiter,
            Some("not a fit".to_string()),
        )
        .await
        .unwrap();

    for next in [
        ApplicationStatus::New,
        ApplicationStatus::Reviewing,
        ApplicationStatus::Hired,
        ApplicationStatus::Withdrawn,
    ] {
        let err = env
            .applications
            .transition(application.id, next, &recruiter, None)
            .await
            .expect_err("terminal status");
        assert!(matches!(err, Error::InvalidTransition { .. }));
    }
}

#[tokio::test]
async fn self_transition_is_rejected_without_a_write() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let candidate = seed_user(&env.store, UserRole::Candidate).await;
    let job = seed_job(&env.store, recruiter.id, JobStatus::Published).await;

    let application = env
        .applications
        .create(&candidate, apply_payload(job.id))
        .await
        .unwrap();
    env.applications
        .transition(application.id, ApplicationStatus::Reviewing, &recruiter, None)
        .await
        .unwrap();

    let err = env
        .applications
        .transition(application.id, ApplicationStatus::Reviewing, &recruiter, None)
        .await
        .expect_err("idempotent no-op is still rejected");
    assert!(matches!(err, Error::InvalidTransition { .. }));

    let application = env
        .store
        .application_by_id(application.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status_history.len(), 1);
}

#[tokio::test]
async fn foreign_actor_cannot_transition() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let candidate = seed_user(&env.store, UserRole::Candidate).await;
    let outsider = seed_user(&env.store, UserRole::Recruiter).await;
    let job = seed_job(&env.store, recruiter.id, JobStatus::Published).await;

    let application = env
        .applications
        .create(&candidate, apply_payload(job.id))
        .await
        .unwrap();

    let err = env
        .applications
        .transition(application.id, ApplicationStatus::Reviewing, &outsider, None)
        .await
        .expect_err("outsider");
    assert!(matches!(err, Error::AccessDenied));

    // The candidate owns the application but status changes stay with the
    // job owner.
    let err = env
        .applications
        .transition(application.id, ApplicationStatus::Withdrawn, &candidate, None)
        .await
        .expect_err("candidate mutation");
    assert!(matches!(err, Error::AccessDenied));

    // Admins pass everywhere.
    let admin = seed_user(&env.store, UserRole::Admin).await;
    env.applications
        .transition(application.id, ApplicationStatus::Reviewing, &admin, None)
        .await
        .expect("admin transition");
}

#[tokio::test]
async fn closed_jobs_reject_applications() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let candidate = seed_user(&env.store, UserRole::Candidate).await;

    let draft = seed_job(&env.store, recruiter.id, JobStatus::Draft).await;
    let err = env
        .applications
        .create(&candidate, apply_payload(draft.id))
        .await
        .expect_err("draft job");
    assert!(matches!(err, Error::BadRequest(_)));

    let expired = seed_job(&env.store, recruiter.id, JobStatus::Published).await;
    env.store
        .update_job(
            expired.id,
            JobPatch {
                application_deadline: Some(Utc::now() - Duration::days(1)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let err = env
        .applications
        .create(&candidate, apply_payload(expired.id))
        .await
        .expect_err("past deadline");
    assert!(matches!(err, Error::BadRequest(_)));

    let full = seed_job(&env.store, recruiter.id, JobStatus::Published).await;
    env.store
        .update_job(
            full.id,
            JobPatch {
                max_applications: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let first = seed_user(&env.store, UserRole::Candidate).await;
    env.applications
        .create(&first, apply_payload(full.id))
        .await
        .expect("fills the single slot");
    let err = env
        .applications
        .create(&candidate, apply_payload(full.id))
        .await
        .expect_err("job at capacity");
    assert!(matches!(err, Error::BadRequest(_)));

    let job = env.store.job_by_id(full.id).await.unwrap().unwrap();
    assert_eq!(job.application_count, 1);
}

#[tokio::test]
async fn rating_scores_are_range_checked() {
    let out_of_range = RatingPayload {
        overall: Some(9),
        technical: None,
        communication: None,
        cultural: None,
    };
    assert!(out_of_range.validate().is_err());

    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let candidate = seed_user(&env.store, UserRole::Candidate).await;
    let job = seed_job(&env.store, recruiter.id, JobStatus::Published).await;
    let application = env
        .applications
        .create(&candidate, apply_payload(job.id))
        .await
        .unwrap();

    let rated = env
        .applications
        .rate(
            application.id,
            &recruiter,
            RatingPayload {
                overall: Some(4),
                technical: Some(5),
                communication: Some(3),
                cultural: None,
            },
        )
        .await
        .expect("valid rating");
    assert_eq!(rated.rating.as_ref().unwrap().overall, Some(4));
}
