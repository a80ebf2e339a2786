use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Application lifecycle states. The transition graph is closed: anything
/// not listed in [`ApplicationStatus::allowed_transitions`] is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    New,
    Reviewing,
    Shortlisted,
    Interviewing,
    Interviewed,
    Offer,
    Hired,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::New => "new",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interviewing => "interviewing",
            ApplicationStatus::Interviewed => "interviewed",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn allowed_transitions(&self) -> &'static [ApplicationStatus] {
        use ApplicationStatus::*;
        match self {
            New => &[Reviewing, Withdrawn, Rejected],
            Reviewing => &[Shortlisted, Rejected, Withdrawn],
            Shortlisted => &[Interviewing, Rejected, Withdrawn],
            Interviewing => &[Interviewed, Rejected, Withdrawn],
            Interviewed => &[Offer, Rejected, Withdrawn],
            Offer => &[Hired, Rejected, Withdrawn],
            Hired | Rejected | Withdrawn => &[],
        }
    }

    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Position of this status on the hiring funnel. Terminal exits
    /// (rejected/withdrawn) carry no rank: an application's funnel stage is
    /// the furthest ranked status it ever held.
    pub fn funnel_rank(&self) -> Option<u8> {
        use ApplicationStatus::*;
        match self {
            New => Some(0),
            Reviewing => Some(1),
            Shortlisted => Some(2),
            Interviewing => Some(3),
            Interviewed => Some(4),
            Offer => Some(5),
            Hired => Some(6),
            Rejected | Withdrawn => None,
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(ApplicationStatus::New),
            "reviewing" => Ok(ApplicationStatus::Reviewing),
            "shortlisted" => Ok(ApplicationStatus::Shortlisted),
            "interviewing" => Ok(ApplicationStatus::Interviewing),
            "interviewed" => Ok(ApplicationStatus::Interviewed),
            "offer" => Ok(ApplicationStatus::Offer),
            "hired" => Ok(ApplicationStatus::Hired),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "withdrawn" => Ok(ApplicationStatus::Withdrawn),
            other => Err(format!("unknown application status: {}", other)),
        }
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationSource {
    #[default]
    Direct,
    Linkedin,
    Referral,
    JobBoard,
    CompanyWebsite,
}

impl ApplicationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationSource::Direct => "direct",
            ApplicationSource::Linkedin => "linkedin",
            ApplicationSource::Referral => "referral",
            ApplicationSource::JobBoard => "job-board",
            ApplicationSource::CompanyWebsite => "company-website",
        }
    }
}

impl std::fmt::Display for ApplicationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(ApplicationSource::Direct),
            "linkedin" => Ok(ApplicationSource::Linkedin),
            "referral" => Ok(ApplicationSource::Referral),
            "job-board" => Ok(ApplicationSource::JobBoard),
            "company-website" => Ok(ApplicationSource::CompanyWebsite),
            other => Err(format!("unknown application source: {}", other)),
        }
    }
}

impl TryFrom<String> for ApplicationSource {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Snapshot of the candidate's contact details at application time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeMeta {
    pub url: String,
    pub original_name: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// One append-only entry in an application's status history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: ApplicationStatus,
    pub changed_by: Uuid,
    pub changed_at: DateTime<Utc>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub overall: Option<i32>,
    pub technical: Option<i32>,
    pub communication: Option<i32>,
    pub cultural: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    #[sqlx(json)]
    pub candidate_info: CandidateInfo,
    #[sqlx(json)]
    pub resume: Option<ResumeMeta>,
    pub cover_letter: Option<String>,
    #[sqlx(try_from = "String")]
    pub source: ApplicationSource,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    /// Append-only. The current `status` always equals the last entry's
    /// status, or `new` while the history is empty.
    #[sqlx(json)]
    pub status_history: Vec<StatusChange>,
    #[sqlx(json)]
    pub rating: Option<Rating>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// The furthest funnel stage this application ever reached, scanning the
    /// history rather than the current status so that terminal exits still
    /// count toward the stages they passed through.
    pub fn max_stage_reached(&self) -> u8 {
        let mut max = self.status.funnel_rank().unwrap_or(0);
        for entry in &self.status_history {
            if let Some(rank) = entry.status.funnel_rank() {
                max = max.max(rank);
            }
        }
        max
    }
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub candidate_info: CandidateInfo,
    pub resume: Option<ResumeMeta>,
    pub cover_letter: Option<String>,
    pub source: ApplicationSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_chain_is_allowed() {
        use ApplicationStatus::*;
        let chain = [New, Reviewing, Shortlisted, Interviewing, Interviewed, Offer, Hired];
        for pair in chain.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn terminal_statuses_have_no_exits() {
        use ApplicationStatus::*;
        for status in [Hired, Rejected, Withdrawn] {
            assert!(status.is_terminal());
            assert!(status.allowed_transitions().is_empty());
        }
    }

    #[test]
    fn self_transition_is_not_allowed() {
        use ApplicationStatus::*;
        for status in [New, Reviewing, Shortlisted, Interviewing, Interviewed, Offer] {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn skipping_stages_is_not_allowed() {
        use ApplicationStatus::*;
        assert!(!Shortlisted.can_transition_to(Hired));
        assert!(!New.can_transition_to(Offer));
        assert!(!Reviewing.can_transition_to(Interviewed));
    }

    #[test]
    fn funnel_rank_is_monotonic_along_the_chain() {
        use ApplicationStatus::*;
        let chain = [New, Reviewing, Shortlisted, Interviewing, Interviewed, Offer, Hired];
        let ranks: Vec<u8> = chain.iter().map(|s| s.funnel_rank().unwrap()).collect();
        assert!(ranks.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(Rejected.funnel_rank(), None);
        assert_eq!(Withdrawn.funnel_rank(), None);
    }

    #[test]
    fn max_stage_reached_uses_history_not_current_status() {
        let app = Application {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            candidate_info: CandidateInfo {
                name: "A".into(),
                email: "a@example.com".into(),
                phone: None,
                location: None,
            },
            resume: None,
            cover_letter: None,
            source: ApplicationSource::Direct,
            status: ApplicationStatus::Rejected,
            status_history: vec![
                StatusChange {
                    status: ApplicationStatus::Reviewing,
                    changed_by: Uuid::new_v4(),
                    changed_at: Utc::now(),
                    reason: None,
                },
                StatusChange {
                    status: ApplicationStatus::Interviewed,
                    changed_by: Uuid::new_v4(),
                    changed_at: Utc::now(),
                    reason: None,
                },
                StatusChange {
                    status: ApplicationStatus::Rejected,
                    changed_by: Uuid::new_v4(),
                    changed_at: Utc::now(),
                    reason: Some("position filled".into()),
                },
            ],
            rating: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(app.max_stage_reached(), 4);
    }
}
