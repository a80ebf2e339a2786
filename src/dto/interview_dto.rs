use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::interview::{
    FeedbackScore, InterviewStatus, InterviewType, Recommendation,
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScheduleInterviewPayload {
    pub application_id: Uuid,
    #[validate(length(min = 1))]
    pub title: String,
    pub interview_type: InterviewType,
    pub scheduled_date: DateTime<Utc>,
    #[validate(range(min = 15, max = 480))]
    pub duration_minutes: Option<i32>,
    pub timezone: Option<String>,
    pub meeting_link: Option<String>,
    pub location: Option<String>,
    /// Defaults to the scheduling recruiter.
    pub primary_interviewer: Option<Uuid>,
    pub additional_interviewers: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateInterviewStatusPayload {
    pub status: InterviewStatus,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FeedbackScorePayload {
    #[validate(range(min = 1, max = 5))]
    pub score: i32,
    pub notes: Option<String>,
}

impl From<FeedbackScorePayload> for FeedbackScore {
    fn from(payload: FeedbackScorePayload) -> Self {
        Self {
            score: payload.score,
            notes: payload.notes,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InterviewFeedbackPayload {
    #[validate(nested)]
    pub technical: Option<FeedbackScorePayload>,
    #[validate(nested)]
    pub communication: Option<FeedbackScorePayload>,
    #[validate(nested)]
    pub cultural: Option<FeedbackScorePayload>,
    #[validate(nested)]
    pub overall: Option<FeedbackScorePayload>,
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReschedulePayload {
    pub new_date: DateTime<Utc>,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}
