//! Offer lifecycle and the token-gated candidate response flow.
//!
//! An offer is created once the owning application has reached `offer`,
//! sent with a freshly minted capability token, and answered by the
//! candidate without a login session. Accepting cascades the application to
//! `hired` through the lifecycle engine's transition validator.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::dto::offer_dto::{
    CreateOfferPayload, ExtendValidityPayload, OfferResponseAction, OfferResponsePayload,
    SendOfferPayload, SentOffer,
};
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::Job;
use crate::models::offer::{
    NegotiationEntry, NewOffer, Offer, OfferStatus, MAX_NEGOTIATION_ROUNDS,
};
use crate::models::user::User;
use crate::services::application_service::ApplicationService;
use crate::services::authorization::{authorize, verify_offer_token, Action, Target};
use crate::store::EntityStore;
use crate::utils::token::generate_response_token;
use crate::utils::crypto::token_digest;

const RESPONSE_TOKEN_LENGTH: usize = 48;

#[derive(Clone)]
pub struct OfferService {
    store: Arc<dyn EntityStore>,
    applications: ApplicationService,
    token_secret: String,
}

impl OfferService {
    pub fn new(
        store: Arc<dyn EntityStore>,
        applications: ApplicationService,
        token_secret: String,
    ) -> Self {
        Self {
            store,
            applications,
            token_secret,
        }
    }

    pub async fn create(&self, actor: &User, payload: CreateOfferPayload) -> Result<Offer> {
        let application = self.require_application(payload.application_id).await?;
        let job = self.require_job(application.job_id).await?;

        authorize(
            Some(actor),
            Action::CreateOffer,
            &Target::application(&job, &application),
        )?;

        // The hiring decision must already be on record, unless an admin
        // overrides.
        if application.status != ApplicationStatus::Offer && !actor.is_admin() {
            return Err(Error::BadRequest(format!(
                "Cannot create an offer while the application is '{}'",
                application.status
            )));
        }

        if self
            .store
            .offer_by_application(application.id)
            .await?
            .is_some()
        {
            return Err(Error::BadRequest(
                "An offer already exists for this application".to_string(),
            ));
        }

        let offer = self
            .store
            .insert_offer(NewOffer {
                application_id: application.id,
                job_id: job.id,
                candidate_id: application.candidate_id,
                position: payload.position,
                department: payload.department,
                salary: payload.salary,
                currency: payload.currency,
                start_date: payload.start_date,
                employment_type: payload.employment_type,
                work_location: payload.work_location,
                benefits: payload.benefits.unwrap_or_default(),
                offer_valid_until: payload.offer_valid_until,
            })
            .await?;

        tracing::info!(offer_id = %offer.id, application_id = %application.id, "offer created");
        Ok(offer)
    }

    /// draft -> sent. Mints the single-purpose response token; the plaintext
    /// is returned to the caller once and only its digest is stored.
    pub async fn send(
        &self,
        offer_id: Uuid,
        actor: &User,
        payload: SendOfferPayload,
    ) -> Result<SentOffer> {
        let offer = self.require(offer_id).await?;
        let job = self.require_job(offer.job_id).await?;
        authorize(Some(actor), Action::ManageOffer, &Target::offer(&job, &offer))?;

        if offer.status != OfferStatus::Draft {
            return Err(Error::InvalidTransition {
                from: offer.status.to_string(),
                to: OfferStatus::Sent.to_string(),
            });
        }

        let valid_until = payload.offer_valid_until.unwrap_or(offer.offer_valid_until);
        if valid_until <= Utc::now() {
            return Err(Error::BadRequest(
                "Offer validity date must be in the future".to_string(),
            ));
        }

        let token = generate_response_token(RESPONSE_TOKEN_LENGTH);
        let digest = token_digest(&self.token_secret, &token);

        let offer = self
            .store
            .mark_offer_sent(offer.id, &digest, valid_until)
            .await?;

        tracing::info!(offer_id = %offer.id, "offer sent");
        Ok(SentOffer {
            offer,
            response_token: token,
        })
    }

    /// Candidate response via capability token: accept, reject or negotiate.
    pub async fn respond(
        &self,
        offer_id: Uuid,
        payload: OfferResponsePayload,
    ) -> Result<Offer> {
        let offer = self.require(offer_id).await?;

        verify_offer_token(&offer, &payload.token, &self.token_secret)?;

        if offer.status != OfferStatus::Sent {
            return Err(Error::InvalidTransition {
                from: offer.status.to_string(),
                to: payload.action.to_string(),
            });
        }

        let now = Utc::now();
        if now > offer.offer_valid_until {
            // Expiry is recorded as a side effect; losing the race to the
            // sweeper means the offer is already expired, which is fine.
            match self
                .store
                .update_offer_status(offer.id, OfferStatus::Sent, OfferStatus::Expired, None)
                .await
            {
                Ok(_) | Err(Error::ConcurrentModification) => {}
                Err(other) => return Err(other),
            }
            return Err(Error::OfferExpired);
        }

        match payload.action {
            OfferResponseAction::Accept => self.accept(&offer, now).await,
            OfferResponseAction::Reject => {
                let updated = self
                    .store
                    .update_offer_status(offer.id, OfferStatus::Sent, OfferStatus::Rejected, Some(now))
                    .await?;
                tracing::info!(offer_id = %updated.id, "offer rejected by candidate");
                Ok(updated)
            }
            OfferResponseAction::Negotiate => self.negotiate(&offer, payload, now).await,
        }
    }

    async fn accept(&self, offer: &Offer, now: DateTime<Utc>) -> Result<Offer> {
        let application = self.require_application(offer.application_id).await?;

        // Validate the cascade before claiming the offer so an application
        // that already left `offer` rejects the whole response.
        if !application
            .status
            .can_transition_to(ApplicationStatus::Hired)
        {
            return Err(Error::invalid_transition(
                application.status,
                ApplicationStatus::Hired,
            ));
        }

        let updated = self
            .store
            .update_offer_status(offer.id, OfferStatus::Sent, OfferStatus::Accepted, Some(now))
            .await?;

        // Cross-entity transition goes through the lifecycle engine, not a
        // raw status write.
        self.applications
            .apply_transition(
                &application,
                ApplicationStatus::Hired,
                offer.candidate_id,
                Some("Offer accepted".to_string()),
            )
            .await?;

        tracing::info!(offer_id = %updated.id, "offer accepted, application hired");
        Ok(updated)
    }

    async fn negotiate(
        &self,
        offer: &Offer,
        payload: OfferResponsePayload,
        now: DateTime<Utc>,
    ) -> Result<Offer> {
        if offer.negotiation_rounds >= MAX_NEGOTIATION_ROUNDS {
            return Err(Error::NegotiationLimitExceeded);
        }

        let entry = NegotiationEntry {
            counter_offer: payload.counter_offer,
            requested_changes: payload.requested_changes.unwrap_or_default(),
            comments: payload.comments,
            at: now,
        };

        let updated = self
            .store
            .append_negotiation(offer.id, offer.negotiation_rounds, entry)
            .await?;

        tracing::info!(
            offer_id = %updated.id,
            round = updated.negotiation_rounds,
            "negotiation round recorded"
        );
        Ok(updated)
    }

    pub async fn withdraw(&self, offer_id: Uuid, actor: &User) -> Result<Offer> {
        let offer = self.require(offer_id).await?;
        let job = self.require_job(offer.job_id).await?;
        authorize(Some(actor), Action::ManageOffer, &Target::offer(&job, &offer))?;

        if !offer.status.can_transition_to(OfferStatus::Withdrawn) {
            return Err(Error::InvalidTransition {
                from: offer.status.to_string(),
                to: OfferStatus::Withdrawn.to_string(),
            });
        }

        self.store
            .update_offer_status(offer.id, offer.status, OfferStatus::Withdrawn, None)
            .await
    }

    pub async fn extend_validity(
        &self,
        offer_id: Uuid,
        actor: &User,
        payload: ExtendValidityPayload,
    ) -> Result<Offer> {
        let offer = self.require(offer_id).await?;
        let job = self.require_job(offer.job_id).await?;
        authorize(Some(actor), Action::ManageOffer, &Target::offer(&job, &offer))?;

        if payload.new_expiry_date <= Utc::now() {
            return Err(Error::BadRequest(
                "New expiry date must be in the future".to_string(),
            ));
        }

        self.store
            .extend_offer_validity(offer.id, payload.new_expiry_date)
            .await
    }

    pub async fn get(&self, offer_id: Uuid, actor: &User) -> Result<Offer> {
        let offer = self.require(offer_id).await?;
        let job = self.require_job(offer.job_id).await?;
        authorize(Some(actor), Action::ReadOffer, &Target::offer(&job, &offer))?;
        Ok(offer)
    }

    /// Periodic sweep moving overdue `sent` offers to `expired`.
    pub async fn expire_overdue(&self) -> Result<u64> {
        let swept = self.store.expire_overdue_offers(Utc::now()).await?;
        if swept > 0 {
            tracing::info!(swept, "expired overdue offers");
        }
        Ok(swept)
    }

    async fn require(&self, id: Uuid) -> Result<Offer> {
        self.store
            .offer_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Offer not found".to_string()))
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
