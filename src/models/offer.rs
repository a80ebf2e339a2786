use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::job::JobType;

pub const MAX_NEGOTIATION_ROUNDS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OfferStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Withdrawn,
    Expired,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Draft => "draft",
            OfferStatus::Sent => "sent",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
            OfferStatus::Withdrawn => "withdrawn",
            OfferStatus::Expired => "expired",
        }
    }

    pub fn allowed_transitions(&self) -> &'static [OfferStatus] {
        use OfferStatus::*;
        match self {
            Draft => &[Sent, Withdrawn],
            Sent => &[Accepted, Rejected, Withdrawn, Expired],
            Accepted | Rejected | Withdrawn | Expired => &[],
        }
    }

    pub fn can_transition_to(&self, next: OfferStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OfferStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(OfferStatus::Draft),
            "sent" => Ok(OfferStatus::Sent),
            "accepted" => Ok(OfferStatus::Accepted),
            "rejected" => Ok(OfferStatus::Rejected),
            "withdrawn" => Ok(OfferStatus::Withdrawn),
            "expired" => Ok(OfferStatus::Expired),
            other => Err(format!("unknown offer status: {}", other)),
        }
    }
}

impl TryFrom<String> for OfferStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkLocation {
    Remote,
    OnSite,
    Hybrid,
}

impl WorkLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkLocation::Remote => "remote",
            WorkLocation::OnSite => "on-site",
            WorkLocation::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for WorkLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remote" => Ok(WorkLocation::Remote),
            "on-site" => Ok(WorkLocation::OnSite),
            "hybrid" => Ok(WorkLocation::Hybrid),
            other => Err(format!("unknown work location: {}", other)),
        }
    }
}

impl TryFrom<String> for WorkLocation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegotiationEntry {
    pub counter_offer: Option<Decimal>,
    pub requested_changes: Vec<String>,
    pub comments: Option<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Offer {
    pub id: Uuid,
    pub application_id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub position: String,
    pub department: Option<String>,
    pub salary: Decimal,
    pub currency: String,
    pub start_date: Option<DateTime<Utc>>,
    #[sqlx(try_from = "String")]
    pub employment_type: JobType,
    #[sqlx(try_from = "String")]
    pub work_location: WorkLocation,
    pub benefits: Vec<String>,
    #[sqlx(try_from = "String")]
    pub status: OfferStatus,
    pub offer_valid_until: DateTime<Utc>,
    /// Hex HMAC digest of the capability token minted at send time. The
    /// plaintext is returned once and never stored.
    #[serde(skip_serializing)]
    pub response_token_hash: Option<String>,
    pub negotiation_rounds: i32,
    #[sqlx(json)]
    pub negotiation_history: Vec<NegotiationEntry>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOffer {
    pub application_id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub position: String,
    pub department: Option<String>,
    pub salary: Decimal,
    pub currency: String,
    pub start_date: Option<DateTime<Utc>>,
    pub employment_type: JobType,
    pub work_location: WorkLocation,
    pub benefits: Vec<String>,
    pub offer_valid_until: DateTime<Utc>,
}
