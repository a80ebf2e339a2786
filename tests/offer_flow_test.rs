mod common;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use common::{apply_payload, drive, offer_payload, seed_job, seed_user, TestEnv, OFFER_TOKEN_SECRET};
use talentflow_backend::dto::offer_dto::{
    OfferResponseAction, OfferResponsePayload, SendOfferPayload,
};
use talentflow_backend::error::Error;
use talentflow_backend::models::application::ApplicationStatus;
use talentflow_backend::models::job::JobStatus;
use talentflow_backend::models::offer::OfferStatus;
use talentflow_backend::models::user::{User, UserRole};
use talentflow_backend::store::EntityStore;
use talentflow_backend::utils::crypto::token_digest;

const FULL_PATH: &[ApplicationStatus] = &[
    ApplicationStatus::Reviewing,
    ApplicationStatus::Shortlisted,
    ApplicationStatus::Interviewing,
    ApplicationStatus::Interviewed,
    ApplicationStatus::Offer,
];

async fn application_at_offer(env: &TestEnv, recruiter: &User) -> Uuid {
    let candidate = seed_user(&env.store, UserRole::Candidate).await;
    let job = seed_job(&env.store, recruiter.id, JobStatus::Published).await;
    let application = env
        .applications
        .create(&candidate, apply_payload(job.id))
        .await
        .unwrap();
    drive(&env.applications, recruiter, application.id, FULL_PATH).await;
    application.id
}

fn respond(action: OfferResponseAction, token: &str) -> OfferResponsePayload {
    OfferResponsePayload {
        action,
        token: token.to_string(),
        counter_offer: None,
        requested_changes: None,
        comments: None,
    }
}

#[tokio::test]
async fn offer_creation_requires_the_hiring_decision() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let candidate = seed_user(&env.store, UserRole::Candidate).await;
    let job = seed_job(&env.store, recruiter.id, JobStatus::Published).await;
    let application = env
        .applications
        .create(&candidate, apply_payload(job.id))
        .await
        .unwrap();

    let err = env
        .offers
        .create(&recruiter, offer_payload(application.id))
        .await
        .expect_err("application still 'new'");
    assert!(matches!(err, Error::BadRequest(_)));

    // Admin override skips the stage precondition.
    let admin = seed_user(&env.store, UserRole::Admin).await;
    let offer = env
        .offers
        .create(&admin, offer_payload(application.id))
        .await
        .expect("admin override");
    assert_eq!(offer.status, OfferStatus::Draft);
}

#[tokio::test]
async fn accept_flow_cascades_application_to_hired() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let application_id = application_at_offer(&env, &recruiter).await;

    let offer = env
        .offers
        .create(&recruiter, offer_payload(application_id))
        .await
        .unwrap();
    let sent = env
        .offers
        .send(offer.id, &recruiter, SendOfferPayload { offer_valid_until: None })
        .await
        .expect("send offer");
    assert_eq!(sent.offer.status, OfferStatus::Sent);
    assert!(!sent.response_token.is_empty());

    let accepted = env
        .offers
        .respond(offer.id, respond(OfferResponseAction::Accept, &sent.response_token))
        .await
        .expect("accept offer");
    assert_eq!(accepted.status, OfferStatus::Accepted);
    assert!(accepted.responded_at.is_some());

    let application = env
        .store
        .application_by_id(application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::Hired);
    assert_eq!(
        application.status_history.last().unwrap().status,
        ApplicationStatus::Hired
    );
}

#[tokio::test]
async fn wrong_token_is_denied_and_reuse_is_rejected() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let application_id = application_at_offer(&env, &recruiter).await;

    let offer = env
        .offers
        .create(&recruiter, offer_payload(application_id))
        .await
        .unwrap();
    let sent = env
        .offers
        .send(offer.id, &recruiter, SendOfferPayload { offer_valid_until: None })
        .await
        .unwrap();

    let err = env
        .offers
        .respond(offer.id, respond(OfferResponseAction::Accept, "forged-token"))
        .await
        .expect_err("forged token");
    assert!(matches!(err, Error::AccessDenied));

    env.offers
        .respond(offer.id, respond(OfferResponseAction::Accept, &sent.response_token))
        .await
        .expect("legitimate accept");

    // The token is single-use: once the offer left 'sent', replaying it
    // cannot succeed.
    let err = env
        .offers
        .respond(offer.id, respond(OfferResponseAction::Accept, &sent.response_token))
        .await
        .expect_err("token replay");
    assert!(matches!(err, Error::InvalidTransition { .. }));
}

#[tokio::test]
async fn expired_offer_rejects_response_and_flips_status() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let application_id = application_at_offer(&env, &recruiter).await;

    let offer = env
        .offers
        .create(&recruiter, offer_payload(application_id))
        .await
        .unwrap();

    // Put the offer into 'sent' with a validity date already in the past;
    // the service-level send refuses past dates, so seed through the store.
    let token = "expired-offer-token";
    env.store
        .mark_offer_sent(
            offer.id,
            &token_digest(OFFER_TOKEN_SECRET, token),
            Utc::now() - Duration::days(1),
        )
        .await
        .unwrap();

    let err = env
        .offers
        .respond(offer.id, respond(OfferResponseAction::Accept, token))
        .await
        .expect_err("expired offer");
    assert!(matches!(err, Error::OfferExpired));

    let offer = env.store.offer_by_id(offer.id).await.unwrap().unwrap();
    assert_eq!(offer.status, OfferStatus::Expired);

    // The application did not move.
    let application = env
        .store
        .application_by_id(application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::Offer);
}

#[tokio::test]
async fn rejection_leaves_the_application_at_offer() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let application_id = application_at_offer(&env, &recruiter).await;

    let offer = env
        .offers
        .create(&recruiter, offer_payload(application_id))
        .await
        .unwrap();
    let sent = env
        .offers
        .send(offer.id, &recruiter, SendOfferPayload { offer_valid_until: None })
        .await
        .unwrap();

    let rejected = env
        .offers
        .respond(offer.id, respond(OfferResponseAction::Reject, &sent.response_token))
        .await
        .expect("reject offer");
    assert_eq!(rejected.status, OfferStatus::Rejected);

    let application = env
        .store
        .application_by_id(application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::Offer);
}

#[tokio::test]
async fn negotiation_is_capped_at_five_rounds() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let application_id = application_at_offer(&env, &recruiter).await;

    let offer = env
        .offers
        .create(&recruiter, offer_payload(application_id))
        .await
        .unwrap();
    let sent = env
        .offers
        .send(offer.id, &recruiter, SendOfferPayload { offer_valid_until: None })
        .await
        .unwrap();

    for round in 1..=5 {
        let payload = OfferResponsePayload {
            action: OfferResponseAction::Negotiate,
            token: sent.response_token.clone(),
            counter_offer: Some(Decimal::new(90_000 + round * 1_000, 0)),
            requested_changes: None,
            comments: Some(format!("round {}", round)),
        };
        let updated = env.offers.respond(offer.id, payload).await.expect("negotiate");
        assert_eq!(updated.status, OfferStatus::Sent);
        assert_eq!(updated.negotiation_rounds, round as i32);
    }

    let err = env
        .offers
        .respond(
            offer.id,
            respond(OfferResponseAction::Negotiate, &sent.response_token),
        )
        .await
        .expect_err("sixth round");
    assert!(matches!(err, Error::NegotiationLimitExceeded));

    let offer = env.store.offer_by_id(offer.id).await.unwrap().unwrap();
    assert_eq!(offer.negotiation_rounds, 5);
    assert_eq!(offer.negotiation_history.len(), 5);
}

#[tokio::test]
async fn sweeper_expires_overdue_sent_offers() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let application_id = application_at_offer(&env, &recruiter).await;

    let offer = env
        .offers
        .create(&recruiter, offer_payload(application_id))
        .await
        .unwrap();
    env.store
        .mark_offer_sent(
            offer.id,
            &token_digest(OFFER_TOKEN_SECRET, "any"),
            Utc::now() - Duration::hours(1),
        )
        .await
        .unwrap();

    let swept = env.offers.expire_overdue().await.expect("sweep");
    assert_eq!(swept, 1);

    let offer = env.store.offer_by_id(offer.id).await.unwrap().unwrap();
    assert_eq!(offer.status, OfferStatus::Expired);

    // Draft offers are untouched by the sweep.
    let swept_again = env.offers.expire_overdue().await.expect("second sweep");
    assert_eq!(swept_again, 0);
}

#[tokio::test]
async fn withdraw_and_foreign_access() {
    let env = TestEnv::new();
    let recruiter = seed_user(&env.store, UserRole::Recruiter).await;
    let outsider = seed_user(&env.store, UserRole::Recruiter).await;
    let application_id = application_at_offer(&env, &recruiter).await;

    let offer = env
        .offers
        .create(&recruiter, offer_payload(application_id))
        .await
        .unwrap();

    let err = env
        .offers
        .withdraw(offer.id, &outsider)
        .await
        .expect_err("outsider withdraw");
    assert!(matches!(err, Error::AccessDenied));

    let withdrawn = env
        .offers
        .withdraw(offer.id, &recruiter)
        .await
        .expect("owner withdraw");
    assert_eq!(withdrawn.status, OfferStatus::Withdrawn);

    // Terminal: cannot withdraw twice.
    let err = env
        .offers
        .withdraw(offer.id, &recruiter)
        .await
        .expect_err("double withdraw");
    assert!(matches!(err, Error::InvalidTransition { .. }));
}
