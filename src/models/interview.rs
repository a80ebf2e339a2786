use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterviewStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
    Rescheduled,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::Confirmed => "confirmed",
            InterviewStatus::InProgress => "in-progress",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Cancelled => "cancelled",
            InterviewStatus::NoShow => "no-show",
            InterviewStatus::Rescheduled => "rescheduled",
        }
    }

    /// Completed, cancelled and no-show interviews are frozen.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InterviewStatus::Completed | InterviewStatus::Cancelled | InterviewStatus::NoShow
        )
    }
}

impl std::fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InterviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(InterviewStatus::Scheduled),
            "confirmed" => Ok(InterviewStatus::Confirmed),
            "in-progress" => Ok(InterviewStatus::InProgress),
            "completed" => Ok(InterviewStatus::Completed),
            "cancelled" => Ok(InterviewStatus::Cancelled),
            "no-show" => Ok(InterviewStatus::NoShow),
            "rescheduled" => Ok(InterviewStatus::Rescheduled),
            other => Err(format!("unknown interview status: {}", other)),
        }
    }
}

impl TryFrom<String> for InterviewStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterviewType {
    PhoneScreening,
    VideoCall,
    InPerson,
    Technical,
    Behavioral,
    FinalRound,
    Panel,
}

impl InterviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::PhoneScreening => "phone-screening",
            InterviewType::VideoCall => "video-call",
            InterviewType::InPerson => "in-person",
            InterviewType::Technical => "technical",
            InterviewType::Behavioral => "behavioral",
            InterviewType::FinalRound => "final-round",
            InterviewType::Panel => "panel",
        }
    }
}

impl std::fmt::Display for InterviewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InterviewType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "phone-screening" => Ok(InterviewType::PhoneScreening),
            "video-call" => Ok(InterviewType::VideoCall),
            "in-person" => Ok(InterviewType::InPerson),
            "technical" => Ok(InterviewType::Technical),
            "behavioral" => Ok(InterviewType::Behavioral),
            "final-round" => Ok(InterviewType::FinalRound),
            "panel" => Ok(InterviewType::Panel),
            other => Err(format!("unknown interview type: {}", other)),
        }
    }
}

impl TryFrom<String> for InterviewType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    StrongHire,
    Hire,
    NoHire,
    StrongNoHire,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackScore {
    /// 1..=5
    pub score: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewFeedback {
    pub technical: Option<FeedbackScore>,
    pub communication: Option<FeedbackScore>,
    pub cultural: Option<FeedbackScore>,
    pub overall: Option<FeedbackScore>,
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleEntry {
    pub previous_date: DateTime<Utc>,
    pub new_date: DateTime<Utc>,
    pub reason: Option<String>,
    pub rescheduled_by: Uuid,
    pub rescheduled_at: DateTime<Utc>,
}

/// Primary interviewer plus any additional panel members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interviewers {
    pub primary: Uuid,
    pub additional: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interview {
    pub id: Uuid,
    pub application_id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub title: String,
    #[sqlx(try_from = "String")]
    pub interview_type: InterviewType,
    pub scheduled_date: DateTime<Utc>,
    pub duration_minutes: i32,
    pub timezone: String,
    pub meeting_link: Option<String>,
    pub location: Option<String>,
    #[sqlx(json)]
    pub interviewer: Interviewers,
    #[sqlx(try_from = "String")]
    pub status: InterviewStatus,
    #[sqlx(json)]
    pub feedback: Option<InterviewFeedback>,
    #[sqlx(json)]
    pub reschedule_history: Vec<RescheduleEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInterview {
    pub application_id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub title: String,
    pub interview_type: InterviewType,
    pub scheduled_date: DateTime<Utc>,
    pub duration_minutes: i32,
    pub timezone: String,
    pub meeting_link: Option<String>,
    pub location: Option<String>,
    pub interviewer: Interviewers,
}
