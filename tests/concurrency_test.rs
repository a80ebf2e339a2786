mod common;

use chrono::Utc;
use uuid::Uuid;

use common::{apply_payload, drive, seed_job, seed_user, TestEnv};
use talentflow_backend::error::Error;
use talentflow_backend::models::application::{ApplicationStatus, StatusChange};
use talentflow_backend::models::job::JobStatus;
use talentflow_backend::models::user::UserRole;
use talentflow_backend::store::EntityStore;

const TO_OFFER: &[ApplicationStatus] = &[
    ApplicationStatus::Reviewing,
    ApplicationStatus::Shortlisted,
    ApplicationStatus::Interviewing,
    ApplicationStatus::Interviewed,
    ApplicationStatus::Offer,
];

/// A stale writer loses against the compare-and-swap even when the graph
/// would allow its transition from the status it observed.
#[tokio::test]
async fn stale_status_write_is_refused() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let candidate = seed_user(&env.store, UserRole::Candidate).await;
    let job = seed_job(&env.store, recruiter.id, JobStatus::Published).await;
    let application = env
        .applications
        .create(&candidate, apply_payload(job.id))
        .await
        .unwrap();
    drive(&env.applications, &recruiter, application.id, TO_OFFER).await;

    // Another writer moves the application first.
    env.applications
        .transition(application.id, ApplicationStatus::Hired, &recruiter, None)
        .await
        .unwrap();

    // This write still believes the application is at 'offer'.
    let err = env
        .store
        .update_application_status(
            application.id,
            ApplicationStatus::Offer,
            StatusChange {
                status: ApplicationStatus::Rejected,
                changed_by: recruiter.id,
                changed_at: Utc::now(),
                reason: None,
            },
        )
        .await
        .expect_err("stale write");
    assert!(matches!(err, Error::ConcurrentModification));

    let application = env
        .store
        .application_by_id(application.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::Hired);
}

/// Two racing transitions out of the same state: exactly one wins; the
/// loser sees either the CAS failure or, after a re-read, an invalid
/// transition. Never two winners.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_transitions_have_exactly_one_winner() {
    for _ in 0..25 {
        let env = TestEnv::new();
        let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
        let candidate = seed_user(&env.store, UserRole::Candidate).await;
        let job = seed_job(&env.store, recruiter.id, JobStatus::Published).await;
        let application = env
            .applications
            .create(&candidate, apply_payload(job.id))
            .await
            .unwrap();
        drive(&env.applications, &recruiter, application.id, TO_OFFER).await;

        let hire = {
            let applications = env.applications.clone();
            let recruiter = recruiter.clone();
            let id = application.id;
            tokio::spawn(async move {
                applications
                    .transition(id, ApplicationStatus::Hired, &recruiter, None)
                    .await
            })
        };
        let reject = {
            let applications = env.applications.clone();
            let recruiter = recruiter.clone();
            let id = application.id;
            tokio::spawn(async move {
                applications
                    .transition(id, ApplicationStatus::Rejected, &recruiter, None)
                    .await
            })
        };

        let results = [hire.await.unwrap(), reject.await.unwrap()];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1, "exactly one racer must win");

        for result in &results {
            if let Err(err) = result {
                assert!(
                    matches!(
                        err,
                        Error::ConcurrentModification | Error::InvalidTransition { .. }
                    ),
                    "loser failed with unexpected error: {:?}",
                    err
                );
            }
        }

        // The stored history gained exactly one terminal entry.
        let application = env
            .store
            .application_by_id(application.id)
            .await
            .unwrap()
            .unwrap();
        assert!(application.status.is_terminal());
        assert_eq!(application.status_history.len(), TO_OFFER.len() + 1);
    }
}

/// Concurrent creations never lose a counter increment.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn application_count_survives_concurrent_creates() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let job = seed_job(&env.store, recruiter.id, JobStatus::Published).await;

    let mut candidates = Vec::new();
    for _ in 0..10 {
        candidates.push(seed_user(&env.store, UserRole::Candidate).await);
    }

    let mut handles = Vec::new();
    for candidate in candidates {
        let applications = env.applications.clone();
        let job_id = job.id;
        handles.push(tokio::spawn(async move {
            applications.create(&candidate, apply_payload(job_id)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().expect("create application");
    }

    let job = env.store.job_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job.application_count, 10);

    // And a duplicate race from one candidate yields one row, one count.
    let job2 = seed_job(&env.store, recruiter.id, JobStatus::Published).await;
    let racer = seed_user(&env.store, UserRole::Candidate).await;
    let mut handles = Vec::new();
    for _ in 0..4 {
        let applications = env.applications.clone();
        let racer = racer.clone();
        let job_id = job2.id;
        handles.push(tokio::spawn(async move {
            applications.create(&racer, apply_payload(job_id)).await
        }));
    }
    let mut ok = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(Error::DuplicateApplication) => duplicates += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(duplicates, 3);

    let job2 = env.store.job_by_id(job2.id).await.unwrap().unwrap();
    assert_eq!(job2.application_count, 1);
}

/// Store ids are useful to assert uniqueness of the winning application.
#[tokio::test]
async fn duplicate_check_is_per_job_not_global() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let candidate = seed_user(&env.store, UserRole::Candidate).await;
    let job_a = seed_job(&env.store, recruiter.id, JobStatus::Published).await;
    let job_b = seed_job(&env.store, recruiter.id, JobStatus::Published).await;

    let a = env
        .applications
        .create(&candidate, apply_payload(job_a.id))
        .await
        .expect("first job");
    let b = env
        .applications
        .create(&candidate, apply_payload(job_b.id))
        .await
        .expect("second job");
    assert_ne!(a.id, b.id);
    assert_ne!(Uuid::nil(), a.id);
}
