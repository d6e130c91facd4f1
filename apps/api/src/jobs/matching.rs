//! Skill-based job matching.
//!
//! A job matches a user when their skill sets intersect. Comparison is exact
//! string equality, so `"Python"` and `"python"` are different skills. Results
//! are ordered by recency only; there is no relevance scoring.

use serde::Serialize;

use crate::errors::AppError;
use crate::jobs::search::JobFilter;
use crate::models::job::Job;
use crate::models::user::User;
use crate::store::Store;

pub const MATCH_LIMIT: i64 = 20;

pub const NO_SKILLS_MESSAGE: &str = "Please add skills to your profile to get matched jobs";

#[derive(Debug, Serialize)]
pub struct MatchedJobs {
    pub count: usize,
    pub jobs: Vec<Job>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Builds the store query for a user's matches, or `None` when the user has
/// no skills and therefore can never match anything.
pub fn match_filter(user: &User) -> Option<JobFilter> {
    if user.skills.is_empty() {
        None
    } else {
        Some(JobFilter::any_skill(&user.skills))
    }
}

/// Trims entries, drops blanks and removes duplicates, keeping first-seen order.
pub fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let skill = skill.trim();
        if skill.is_empty() || out.iter().any(|s| s == skill) {
            continue;
        }
        out.push(skill.to_string());
    }
    out
}

/// Newest jobs sharing any skill with `user`, at most `MATCH_LIMIT`.
pub async fn matched_jobs(store: &dyn Store, user: &User) -> Result<MatchedJobs, AppError> {
    let Some(filter) = match_filter(user) else {
        return Ok(MatchedJobs {
            count: 0,
            jobs: Vec::new(),
            message: Some(NO_SKILLS_MESSAGE.to_string()),
        });
    };

    let jobs = store.search_jobs(&filter, MATCH_LIMIT).await?;
    Ok(MatchedJobs {
        count: jobs.len(),
        jobs,
        message: None,
    })
}
