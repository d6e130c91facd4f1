//! Axum route handlers for job postings.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::applications::lifecycle;
use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::jobs::matching::{matched_jobs, normalize_skills, MatchedJobs};
use crate::jobs::search::{JobFilter, JobSearchParams, SEARCH_LIMIT};
use crate::models::application::ApplicationWithApplicant;
use crate::models::job::{Job, JobType, NewJob, Salary};
use crate::ownership::ensure_owner;
use crate::state::AppState;
use crate::validation::not_blank;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobRequest {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub company: String,
    #[validate(custom(function = "not_blank"))]
    pub location: String,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub salary: Salary,
    #[serde(rename = "type", default)]
    pub job_type: JobType,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateJobRequest {
    #[validate(custom(function = "not_blank"))]
    pub title: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub company: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub location: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub salary: Option<Salary>,
    #[serde(rename = "type")]
    pub job_type: Option<JobType>,
}

#[derive(Debug, Serialize)]
pub struct JobList {
    pub count: usize,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Serialize)]
pub struct JobApplications {
    pub count: usize,
    pub applications: Vec<ApplicationWithApplicant>,
}

/// GET /api/jobs?search=&location=&type=&skills=
pub async fn handle_list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<JobSearchParams>,
) -> Result<Json<JobList>, AppError> {
    let filter = JobFilter::from_params(params)?;
    let jobs = state.store.search_jobs(&filter, SEARCH_LIMIT).await?;
    Ok(Json(JobList {
        count: jobs.len(),
        jobs,
    }))
}

/// GET /api/jobs/matched
pub async fn handle_matched(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<MatchedJobs>, AppError> {
    Ok(Json(matched_jobs(state.store.as_ref(), &user).await?))
}

/// GET /api/jobs/:id
pub async fn handle_get(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Job>, AppError> {
    Ok(Json(find_job(&state, id).await?))
}

/// POST /api/jobs
pub async fn handle_create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(req): AppJson<CreateJobRequest>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    req.validate()?;
    req.salary.check_range().map_err(AppError::Validation)?;

    let job = state
        .store
        .create_job(NewJob {
            title: req.title.trim().to_string(),
            company: req.company.trim().to_string(),
            location: req.location.trim().to_string(),
            description: req.description.trim().to_string(),
            requirements: normalize_lines(req.requirements),
            skills: normalize_skills(req.skills),
            salary: req.salary,
            job_type: req.job_type,
            posted_by: user.id,
        })
        .await?;
    info!("User {} posted job {}", user.id, job.id);

    Ok((StatusCode::CREATED, Json(job)))
}

/// PUT /api/jobs/:id
///
/// Supplied fields replace stored ones. The owner never changes.
pub async fn handle_update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateJobRequest>,
) -> Result<Json<Job>, AppError> {
    req.validate()?;
    let mut job = find_job(&state, id).await?;
    ensure_owner(user.id, &job, "Not authorized to update this job")?;

    apply_update(&mut job, req)?;
    Ok(Json(state.store.update_job(&job).await?))
}

/// DELETE /api/jobs/:id
///
/// Applications to the job go with it.
pub async fn handle_delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let job = find_job(&state, id).await?;
    ensure_owner(user.id, &job, "Not authorized to delete this job")?;

    state.store.delete_job(job.id).await?;
    info!("User {} removed job {}", user.id, job.id);
    Ok(Json(json!({ "message": "Job removed" })))
}

/// GET /api/jobs/:id/applications
pub async fn handle_job_applications(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<JobApplications>, AppError> {
    let applications = lifecycle::list_for_job(state.store.as_ref(), &user, id).await?;
    Ok(Json(JobApplications {
        count: applications.len(),
        applications,
    }))
}

async fn find_job(state: &AppState, id: Uuid) -> Result<Job, AppError> {
    state
        .store
        .find_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
}

fn apply_update(job: &mut Job, req: UpdateJobRequest) -> Result<(), AppError> {
    if let Some(title) = req.title {
        job.title = title.trim().to_string();
    }
    if let Some(company) = req.company {
        job.company = company.trim().to_string();
    }
    if let Some(location) = req.location {
        job.location = location.trim().to_string();
    }
    if let Some(description) = req.description {
        job.description = description.trim().to_string();
    }
    if let Some(requirements) = req.requirements {
        job.requirements = normalize_lines(requirements);
    }
    if let Some(skills) = req.skills {
        job.skills = normalize_skills(skills);
    }
    if let Some(salary) = req.salary {
        salary.check_range().map_err(AppError::Validation)?;
        job.salary = salary;
    }
    if let Some(job_type) = req.job_type {
        job.job_type = job_type;
    }
    Ok(())
}

fn normalize_lines(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}
