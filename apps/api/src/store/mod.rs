//! Persistence seam. Handlers and services only see `Arc<dyn Store>`.
//!
//! `PgStore` backs the running service. Tests use `MemoryStore`, which
//! evaluates `JobFilter` with the same semantics the SQL encodes.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::search::JobFilter;
use crate::models::application::{Application, ApplicationStatus, NewApplication};
use crate::models::job::{Job, NewJob};
use crate::models::user::{NewUser, Resume, User};

#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(&self, new: NewUser) -> Result<User, AppError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError>;
    /// Persists name, email, password hash, skills and experience.
    async fn update_user(&self, user: &User) -> Result<User, AppError>;
    async fn set_resume(&self, user_id: Uuid, resume: Option<&Resume>) -> Result<(), AppError>;

    async fn create_job(&self, new: NewJob) -> Result<Job, AppError>;
    async fn find_job(&self, id: Uuid) -> Result<Option<Job>, AppError>;
    async fn find_jobs(&self, ids: &[Uuid]) -> Result<Vec<Job>, AppError>;
    async fn update_job(&self, job: &Job) -> Result<Job, AppError>;
    /// Removes the job and, with it, every application to it.
    async fn delete_job(&self, id: Uuid) -> Result<(), AppError>;
    /// Jobs matching every predicate in `filter`, newest first.
    async fn search_jobs(&self, filter: &JobFilter, limit: i64) -> Result<Vec<Job>, AppError>;

    /// Fails with `Conflict` when an application for (job, user) exists.
    async fn create_application(&self, new: NewApplication) -> Result<Application, AppError>;
    async fn find_application(&self, id: Uuid) -> Result<Option<Application>, AppError>;
    async fn find_application_for(
        &self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Application>, AppError>;
    /// Compare-and-set: writes `status` only while the stored status is still
    /// `expected`. `None` when the row is gone or its status has moved on.
    async fn set_application_status(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, AppError>;
    /// Deletes the application unless it is accepted. False when nothing was deleted.
    async fn delete_unaccepted_application(&self, id: Uuid) -> Result<bool, AppError>;
    /// Newest applied first.
    async fn applications_by_user(&self, user_id: Uuid) -> Result<Vec<Application>, AppError>;
    /// Newest applied first.
    async fn applications_for_job(&self, job_id: Uuid) -> Result<Vec<Application>, AppError>;
}
