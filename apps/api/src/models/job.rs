use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JobType {
    #[default]
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Internship,
}

#[derive(Debug, Error)]
#[error("unknown job type '{0}' (expected Full-time, Part-time, Contract or Internship)")]
pub struct UnknownJobType(pub String);

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Internship => "Internship",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive: `type=internship` is not `Internship`.
impl FromStr for JobType {
    type Err = UnknownJobType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Full-time" => Ok(JobType::FullTime),
            "Part-time" => Ok(JobType::PartTime),
            "Contract" => Ok(JobType::Contract),
            "Internship" => Ok(JobType::Internship),
            other => Err(UnknownJobType(other.to_string())),
        }
    }
}

impl TryFrom<String> for JobType {
    type Error = UnknownJobType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Salary {
    #[sqlx(rename = "salary_min")]
    pub min: Option<i64>,
    #[sqlx(rename = "salary_max")]
    pub max: Option<i64>,
    #[sqlx(rename = "salary_currency")]
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for Salary {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            currency: default_currency(),
        }
    }
}

impl Salary {
    pub fn check_range(&self) -> Result<(), String> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(format!("salary min ({min}) exceeds salary max ({max})"));
            }
        }
        if self.min.is_some_and(|v| v < 0) || self.max.is_some_and(|v| v < 0) {
            return Err("salary cannot be negative".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub skills: Vec<String>,
    #[sqlx(flatten)]
    pub salary: Salary,
    #[sqlx(try_from = "String")]
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub posted_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a job posting.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub skills: Vec<String>,
    pub salary: Salary,
    pub job_type: JobType,
    pub posted_by: Uuid,
}

impl Job {
    pub fn new(new: NewJob) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: new.title,
            company: new.company,
            location: new.location,
            description: new.description,
            requirements: new.requirements,
            skills: new.skills,
            salary: new.salary,
            job_type: new.job_type,
            posted_by: new.posted_by,
            created_at: now,
            updated_at: now,
        }
    }
}
