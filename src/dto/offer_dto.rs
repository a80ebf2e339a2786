use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::job::JobType;
use crate::models::offer::{Offer, WorkLocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OfferResponseAction {
    Accept,
    Reject,
    Negotiate,
}

impl std::fmt::Display for OfferResponseAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OfferResponseAction::Accept => "accept",
            OfferResponseAction::Reject => "reject",
            OfferResponseAction::Negotiate => "negotiate",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOfferPayload {
    pub application_id: uuid::Uuid,
    #[validate(length(min = 1))]
    pub position: String,
    pub department: Option<String>,
    pub salary: Decimal,
    #[validate(length(min = 3, max = 3))]
    pub currency: String,
    pub start_date: Option<DateTime<Utc>>,
    pub employment_type: JobType,
    pub work_location: WorkLocation,
    pub benefits: Option<Vec<String>>,
    pub offer_valid_until: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendOfferPayload {
    /// Overrides the validity date recorded at creation.
    pub offer_valid_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OfferResponsePayload {
    pub action: OfferResponseAction,
    #[validate(length(min = 1))]
    pub token: String,
    pub counter_offer: Option<Decimal>,
    pub requested_changes: Option<Vec<String>>,
    #[validate(length(max = 2000))]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExtendValidityPayload {
    pub new_expiry_date: DateTime<Utc>,
}

/// Result of sending an offer: the stored record plus the one-time
/// plaintext response token.
#[derive(Debug, Clone, Serialize)]
pub struct SentOffer {
    pub offer: Offer,
    pub response_token: String,
}
