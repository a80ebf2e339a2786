use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Draft,
    Published,
    Paused,
    Closed,
    Archived,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Published => "published",
            JobStatus::Paused => "paused",
            JobStatus::Closed => "closed",
            JobStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(JobStatus::Draft),
            "published" => Ok(JobStatus::Published),
            "paused" => Ok(JobStatus::Paused),
            "closed" => Ok(JobStatus::Closed),
            "archived" => Ok(JobStatus::Archived),
            other => Err(format!("unknown job status: {}", other)),
        }
    }
}

impl TryFrom<String> for JobStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Freelance,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Contract => "contract",
            JobType::Internship => "internship",
            JobType::Freelance => "freelance",
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full-time" => Ok(JobType::FullTime),
            "part-time" => Ok(JobType::PartTime),
            "contract" => Ok(JobType::Contract),
            "internship" => Ok(JobType::Internship),
            "freelance" => Ok(JobType::Freelance),
            other => Err(format!("unknown job type: {}", other)),
        }
    }
}

impl TryFrom<String> for JobType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SalaryPeriod {
    Hourly,
    Monthly,
    Yearly,
}

impl SalaryPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalaryPeriod::Hourly => "hourly",
            SalaryPeriod::Monthly => "monthly",
            SalaryPeriod::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for SalaryPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SalaryPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(SalaryPeriod::Hourly),
            "monthly" => Ok(SalaryPeriod::Monthly),
            "yearly" => Ok(SalaryPeriod::Yearly),
            other => Err(format!("unknown salary period: {}", other)),
        }
    }
}

impl TryFrom<String> for SalaryPeriod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub job_type: JobType,
    pub location: Option<String>,
    pub is_remote: bool,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub salary_currency: String,
    #[sqlx(try_from = "String")]
    pub salary_period: SalaryPeriod,
    pub requirements: Vec<String>,
    pub skills: Vec<String>,
    pub keywords: Vec<String>,
    pub department: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: JobStatus,
    pub is_active: bool,
    pub application_deadline: Option<DateTime<Utc>>,
    pub max_applications: Option<i32>,
    pub created_by: Uuid,
    pub views: i64,
    /// Lifetime applications received. Maintained by the store on
    /// application insert, never decremented.
    pub application_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Whether the job currently accepts new applications (state only;
    /// deadline and capacity are checked at application time).
    pub fn is_open(&self) -> bool {
        self.status == JobStatus::Published && self.is_active
    }
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub job_type: JobType,
    pub location: Option<String>,
    pub is_remote: bool,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub salary_currency: String,
    pub salary_period: SalaryPeriod,
    pub requirements: Vec<String>,
    pub skills: Vec<String>,
    pub keywords: Vec<String>,
    pub department: Option<String>,
    pub status: JobStatus,
    pub application_deadline: Option<DateTime<Utc>>,
    pub max_applications: Option<i32>,
    pub created_by: Uuid,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub job_type: Option<JobType>,
    pub location: Option<String>,
    pub is_remote: Option<bool>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub salary_currency: Option<String>,
    pub salary_period: Option<SalaryPeriod>,
    pub requirements: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub department: Option<String>,
    pub status: Option<JobStatus>,
    pub is_active: Option<bool>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub max_applications: Option<i32>,
}
