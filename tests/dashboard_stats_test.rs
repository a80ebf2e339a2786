mod common;

use chrono::{Duration, Utc};

use common::{apply_payload, drive, seed_job, seed_user, TestEnv};
use talentflow_backend::dto::interview_dto::ScheduleInterviewPayload;
use talentflow_backend::models::application::ApplicationStatus;
use talentflow_backend::models::interview::InterviewType;
use talentflow_backend::models::job::JobStatus;
use talentflow_backend::models::user::UserRole;
use talentflow_backend::store::DateRange;

const TO_HIRED: &[ApplicationStatus] = &[
    ApplicationStatus::Reviewing,
    ApplicationStatus::Shortlisted,
    ApplicationStatus::Interviewing,
    ApplicationStatus::Interviewed,
    ApplicationStatus::Offer,
    ApplicationStatus::Hired,
];

#[tokio::test]
async fn dashboard_stats_are_scoped_to_the_actor() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let other = seed_user(&env.store, UserRole::Recruiter).await;

    let job = seed_job(&env.store, recruiter.id, JobStatus::Published).await;
    seed_job(&env.store, recruiter.id, JobStatus::Draft).await;
    let foreign_job = seed_job(&env.store, other.id, JobStatus::Published).await;

    // Two applications to the recruiter's job, one of them hired; one
    // application to someone else's job that must not leak into the stats.
    let c1 = seed_user(&env.store, UserRole::Candidate).await;
    let c2 = seed_user(&env.store, UserRole::Candidate).await;
    let c3 = seed_user(&env.store, UserRole::Candidate).await;
    let hired_app = env
        .applications
        .create(&c1, apply_payload(job.id))
        .await
        .unwrap();
    env.applications
        .create(&c2, apply_payload(job.id))
        .await
        .unwrap();
    env.applications
        .create(&c3, apply_payload(foreign_job.id))
        .await
        .unwrap();
    drive(&env.applications, &recruiter, hired_app.id, TO_HIRED).await;

    // One upcoming interview with the recruiter as primary interviewer.
    let interviewing = env
        .applications
        .create(&seed_user(&env.store, UserRole::Candidate).await, apply_payload(job.id))
        .await
        .unwrap();
    drive(
        &env.applications,
        &recruiter,
        interviewing.id,
        &[ApplicationStatus::Reviewing, ApplicationStatus::Shortlisted],
    )
    .await;
    env.interviews
        .schedule(
            &recruiter,
            ScheduleInterviewPayload {
                application_id: interviewing.id,
                title: "Technical interview".to_string(),
                interview_type: InterviewType::Technical,
                scheduled_date: Utc::now() + Duration::days(2),
                duration_minutes: Some(60),
                timezone: None,
                meeting_link: None,
                location: None,
                primary_interviewer: None,
                additional_interviewers: None,
            },
        )
        .await
        .expect("schedule interview");

    let stats = env
        .stats
        .dashboard(&recruiter, None)
        .await
        .expect("dashboard");
    // The draft job does not count as open; the foreign job does not count
    // at all.
    assert_eq!(stats.open_positions, 1);
    assert_eq!(stats.new_applications, 3);
    assert_eq!(stats.scheduled_interviews, 1);
    assert_eq!(stats.hired_this_month, 1);

    let other_stats = env.stats.dashboard(&other, None).await.expect("dashboard");
    assert_eq!(other_stats.open_positions, 1);
    assert_eq!(other_stats.new_applications, 1);
    assert_eq!(other_stats.scheduled_interviews, 0);
    assert_eq!(other_stats.hired_this_month, 0);
}

#[tokio::test]
async fn funnel_counts_stages_ever_reached() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let job = seed_job(&env.store, recruiter.id, JobStatus::Published).await;

    // hired: passed every stage
    let hired = env
        .applications
        .create(&seed_user(&env.store, UserRole::Candidate).await, apply_payload(job.id))
        .await
        .unwrap();
    drive(&env.applications, &recruiter, hired.id, TO_HIRED).await;

    // rejected after interviewing: counts as reviewed, not interviewed
    let dropped = env
        .applications
        .create(&seed_user(&env.store, UserRole::Candidate).await, apply_payload(job.id))
        .await
        .unwrap();
    drive(
        &env.applications,
        &recruiter,
        dropped.id,
        &[
            ApplicationStatus::Reviewing,
            ApplicationStatus::Shortlisted,
            ApplicationStatus::Interviewing,
            ApplicationStatus::Rejected,
        ],
    )
    .await;

    // untouched: only counts as an application
    env.applications
        .create(&seed_user(&env.store, UserRole::Candidate).await, apply_payload(job.id))
        .await
        .unwrap();

    let funnel = env
        .stats
        .funnel(&recruiter, Some(job.id), DateRange::default())
        .await
        .expect("funnel");

    assert_eq!(funnel.applications, 3);
    assert_eq!(funnel.reviewed, 2);
    // The hired application still counts toward 'interviewed' even though
    // its current status is long past that stage.
    assert_eq!(funnel.interviewed, 1);
    assert_eq!(funnel.offered, 1);
    assert_eq!(funnel.hired, 1);

    // Monotonically non-increasing left to right.
    assert!(funnel.applications >= funnel.reviewed);
    assert!(funnel.reviewed >= funnel.interviewed);
    assert!(funnel.interviewed >= funnel.offered);
    assert!(funnel.offered >= funnel.hired);
}

#[tokio::test]
async fn funnel_without_job_filter_covers_the_actors_jobs_only() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let other = seed_user(&env.store, UserRole::Recruiter).await;
    let mine = seed_job(&env.store, recruiter.id, JobStatus::Published).await;
    let theirs = seed_job(&env.store, other.id, JobStatus::Published).await;

    env.applications
        .create(&seed_user(&env.store, UserRole::Candidate).await, apply_payload(mine.id))
        .await
        .unwrap();
    env.applications
        .create(&seed_user(&env.store, UserRole::Candidate).await, apply_payload(theirs.id))
        .await
        .unwrap();

    let funnel = env
        .stats
        .funnel(&recruiter, None, DateRange::default())
        .await
        .unwrap();
    assert_eq!(funnel.applications, 1);

    // A recruiter cannot pull another recruiter's per-job funnel.
    let err = env
        .stats
        .funnel(&recruiter, Some(theirs.id), DateRange::default())
        .await
        .expect_err("foreign job funnel");
    assert!(matches!(err, talentflow_backend::error::Error::AccessDenied));

    // Admins see everything when no filter is given.
    let admin = seed_user(&env.store, UserRole::Admin).await;
    let funnel = env
        .stats
        .funnel(&admin, None, DateRange::default())
        .await
        .unwrap();
    assert_eq!(funnel.applications, 2);
}

#[tokio::test]
async fn dashboard_widgets_list_recent_and_upcoming() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let job = seed_job(&env.store, recruiter.id, JobStatus::Published).await;

    for _ in 0..3 {
        env.applications
            .create(&seed_user(&env.store, UserRole::Candidate).await, apply_payload(job.id))
            .await
            .unwrap();
    }

    let recent = env
        .stats
        .recent_applications(&recruiter, 2)
        .await
        .expect("recent applications");
    assert_eq!(recent.len(), 2);

    let upcoming = env
        .stats
        .upcoming_interviews(&recruiter, 5)
        .await
        .expect("upcoming interviews");
    assert!(upcoming.is_empty());
}
