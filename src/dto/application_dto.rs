use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{ApplicationSource, ApplicationStatus, CandidateInfo};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateApplicationPayload {
    pub job_id: Uuid,
    /// Contact snapshot; defaults to the applicant's profile when omitted.
    pub candidate_info: Option<CandidateInfo>,
    #[validate(length(max = 2000))]
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub resume_original_name: Option<String>,
    pub source: Option<ApplicationSource>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TransitionPayload {
    pub status: ApplicationStatus,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RatingPayload {
    #[validate(range(min = 1, max = 5))]
    pub overall: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub technical: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub communication: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub cultural: Option<i32>,
}
