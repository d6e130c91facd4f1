//! Job search filter: an implicit AND of independently optional predicates.
//!
//! `search`   case-insensitive substring over title OR company OR description
//! `location` case-insensitive substring
//! `type`     exact job type
//! `skills`   comma-separated list, any-of intersection with the job's skills
//!
//! An absent or blank parameter omits its predicate entirely.

use serde::Deserialize;

use crate::errors::AppError;
use crate::jobs::matching::normalize_skills;
use crate::models::job::JobType;

pub const SEARCH_LIMIT: i64 = 50;

/// Raw query string of `GET /api/jobs`.
#[derive(Debug, Default, Deserialize)]
pub struct JobSearchParams {
    pub search: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub skills: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    /// Empty means "no skills predicate", never "match nothing".
    pub skills: Vec<String>,
}

impl JobFilter {
    pub fn from_params(params: JobSearchParams) -> Result<Self, AppError> {
        let job_type = non_blank(params.job_type)
            .map(|t| t.parse::<JobType>())
            .transpose()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(Self {
            search: non_blank(params.search),
            location: non_blank(params.location),
            job_type,
            skills: params
                .skills
                .as_deref()
                .map(parse_skill_list)
                .unwrap_or_default(),
        })
    }

    /// Filter with a single predicate: the job shares at least one skill.
    pub fn any_skill(skills: &[String]) -> Self {
        Self {
            skills: skills.to_vec(),
            ..Self::default()
        }
    }
}

/// Splits `"Rust, SQL,,Go "` into `["Rust", "SQL", "Go"]`.
pub fn parse_skill_list(raw: &str) -> Vec<String> {
    normalize_skills(raw.split(',').map(String::from).collect())
}

/// Wraps a user-supplied needle for `ILIKE`, escaping LIKE metacharacters so
/// the needle is matched literally.
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
