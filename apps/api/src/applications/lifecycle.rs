//! Application lifecycle: creation preconditions, the status state machine,
//! and who may move an application through it.
//!
//! | from      | allowed targets                      |
//! |-----------|--------------------------------------|
//! | pending   | reviewing, accepted, rejected        |
//! | reviewing | pending, accepted, rejected          |
//! | accepted  | (terminal)                           |
//! | rejected  | (terminal)                           |
//!
//! `accepted` and `rejected` are terminal. Re-setting the current status is a
//! no-op. Only the job's owner drives transitions; only the applicant may
//! withdraw, and an accepted application cannot be withdrawn.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::application::{
    Application, ApplicationDetail, ApplicationStatus, ApplicationWithApplicant,
    ApplicationWithJob, NewApplication,
};
use crate::models::job::Job;
use crate::models::user::{ApplicantProfile, User};
use crate::ownership::{ensure_owner, is_owner};
use crate::store::Store;
use crate::validation::trimmed_non_empty;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub job_id: Option<Uuid>,
    #[validate(length(max = 5000, message = "Cover letter is too long"))]
    pub cover_letter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<ApplicationStatus>,
}

/// Whether the owner may move an application from `from` to `to`.
/// Any open status can move to any other; terminal ones stay put.
pub fn transition_allowed(from: ApplicationStatus, to: ApplicationStatus) -> bool {
    from == to || !is_terminal(from)
}

pub fn is_terminal(status: ApplicationStatus) -> bool {
    matches!(status, ApplicationStatus::Accepted | ApplicationStatus::Rejected)
}

/// Preconditions for applying, in order: the job exists, the applicant has a
/// resume on file, and no application for the pair exists yet.
pub fn check_apply_preconditions<'a>(
    job: Option<&'a Job>,
    applicant: &User,
    existing: Option<&Application>,
) -> Result<&'a Job, AppError> {
    let job = job.ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    if applicant.resume.is_none() {
        return Err(AppError::Validation(
            "Please upload your resume before applying for jobs".to_string(),
        ));
    }
    if existing.is_some() {
        return Err(AppError::Conflict(
            "You have already applied for this job".to_string(),
        ));
    }
    Ok(job)
}

/// Resolves the status the owner asked for. `None` keeps the current status.
pub fn authorize_status_change(
    actor: Uuid,
    job: &Job,
    application: &Application,
    requested: Option<ApplicationStatus>,
) -> Result<ApplicationStatus, AppError> {
    ensure_owner(actor, job, "Not authorized")?;

    let next = requested.unwrap_or(application.status);
    if !transition_allowed(application.status, next) {
        return Err(AppError::Conflict(format!(
            "Cannot change application status from {} to {}",
            application.status, next
        )));
    }
    Ok(next)
}

pub fn authorize_withdrawal(actor: Uuid, application: &Application) -> Result<(), AppError> {
    ensure_owner(actor, application, "Not authorized")?;
    if application.status == ApplicationStatus::Accepted {
        return Err(AppError::Conflict(
            "An accepted application cannot be withdrawn".to_string(),
        ));
    }
    Ok(())
}

/// Applicant or job owner.
pub fn can_view(actor: Uuid, application: &Application, job: &Job) -> bool {
    is_owner(actor, application) || is_owner(actor, job)
}

/// Creates a pending application for `applicant`.
pub async fn apply(
    store: &dyn Store,
    applicant: &User,
    req: ApplyRequest,
) -> Result<ApplicationWithJob, AppError> {
    req.validate()?;
    let job_id = req
        .job_id
        .ok_or_else(|| AppError::Validation("Job ID is required".to_string()))?;

    let job = store.find_job(job_id).await?;
    let existing = store.find_application_for(job_id, applicant.id).await?;
    let job = check_apply_preconditions(job.as_ref(), applicant, existing.as_ref())?;

    // The unique (job_id, user_id) index still guards concurrent duplicates.
    let application = store
        .create_application(NewApplication {
            job_id: job.id,
            user_id: applicant.id,
            cover_letter: trimmed_non_empty(req.cover_letter),
        })
        .await?;

    info!(
        "User {} applied to job {} (application {})",
        applicant.id, job.id, application.id
    );
    Ok(ApplicationWithJob {
        application,
        job: job.clone(),
    })
}

pub async fn update_status(
    store: &dyn Store,
    actor: &User,
    application_id: Uuid,
    req: StatusUpdateRequest,
) -> Result<Application, AppError> {
    let application = find_application(store, application_id).await?;
    let job = find_job(store, application.job_id).await?;

    let next = authorize_status_change(actor.id, &job, &application, req.status)?;
    if next == application.status {
        return Ok(application);
    }

    let updated = commit_status_change(store, &application, next).await?;
    info!(
        "Application {} moved from {} to {} by {}",
        updated.id, application.status, updated.status, actor.id
    );
    Ok(updated)
}

/// Writes `next` only if the stored status still equals the one `snapshot`
/// was authorized against.
async fn commit_status_change(
    store: &dyn Store,
    snapshot: &Application,
    next: ApplicationStatus,
) -> Result<Application, AppError> {
    match store
        .set_application_status(snapshot.id, snapshot.status, next)
        .await?
    {
        Some(updated) => Ok(updated),
        None => {
            let current = find_application(store, snapshot.id).await?;
            Err(AppError::Conflict(format!(
                "Application status changed to {} while this update was in progress",
                current.status
            )))
        }
    }
}

pub async fn withdraw(store: &dyn Store, actor: &User, application_id: Uuid) -> Result<(), AppError> {
    let application = find_application(store, application_id).await?;
    authorize_withdrawal(actor.id, &application)?;
    commit_withdrawal(store, &application).await?;
    info!("Application {} withdrawn by {}", application.id, actor.id);
    Ok(())
}

/// The delete re-checks acceptance in the same statement.
async fn commit_withdrawal(store: &dyn Store, snapshot: &Application) -> Result<(), AppError> {
    if store.delete_unaccepted_application(snapshot.id).await? {
        return Ok(());
    }
    // Still present means it was accepted in the meantime.
    find_application(store, snapshot.id).await?;
    Err(AppError::Conflict(
        "An accepted application cannot be withdrawn".to_string(),
    ))
}

/// One application with its job and applicant, for the applicant or job owner.
pub async fn get_detail(
    store: &dyn Store,
    actor: &User,
    application_id: Uuid,
) -> Result<ApplicationDetail, AppError> {
    let application = find_application(store, application_id).await?;
    let job = find_job(store, application.job_id).await?;
    if !can_view(actor.id, &application, &job) {
        return Err(AppError::NotAuthorized("Not authorized".to_string()));
    }

    let applicant = store
        .find_user(application.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Applicant not found".to_string()))?;

    Ok(ApplicationDetail {
        application,
        job,
        applicant: ApplicantProfile::from(&applicant),
    })
}

/// The caller's own applications, newest first, each with its job.
pub async fn list_mine(store: &dyn Store, user: &User) -> Result<Vec<ApplicationWithJob>, AppError> {
    let applications = store.applications_by_user(user.id).await?;
    let job_ids: Vec<Uuid> = applications.iter().map(|a| a.job_id).collect();
    let jobs = store.find_jobs(&job_ids).await?;

    Ok(applications
        .into_iter()
        .filter_map(|application| {
            let job = jobs.iter().find(|j| j.id == application.job_id)?.clone();
            Some(ApplicationWithJob { application, job })
        })
        .collect())
}

/// Applications received by a job, for the job's owner only.
pub async fn list_for_job(
    store: &dyn Store,
    actor: &User,
    job_id: Uuid,
) -> Result<Vec<ApplicationWithApplicant>, AppError> {
    let job = find_job(store, job_id).await?;
    ensure_owner(actor.id, &job, "Not authorized")?;

    let applications = store.applications_for_job(job.id).await?;
    let user_ids: Vec<Uuid> = applications.iter().map(|a| a.user_id).collect();
    let users = store.find_users(&user_ids).await?;

    Ok(applications
        .into_iter()
        .filter_map(|application| {
            let user = users.iter().find(|u| u.id == application.user_id)?;
            Some(ApplicationWithApplicant {
                application,
                applicant: ApplicantProfile::from(user),
            })
        })
        .collect())
}

async fn find_application(store: &dyn Store, id: Uuid) -> Result<Application, AppError> {
    store
        .find_application(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))
}

async fn find_job(store: &dyn Store, id: Uuid) -> Result<Job, AppError> {
    store
        .find_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
}
