use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::search::JobFilter;
use crate::models::application::{Application, ApplicationStatus, NewApplication};
use crate::models::job::{Job, NewJob};
use crate::models::user::{NewUser, Resume, User};
use crate::store::Store;

/// In-process store with the same uniqueness and cascade rules as the schema.
/// Rows are kept in insertion order; ties on timestamps resolve newest-inserted first.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    jobs: Vec<Job>,
    applications: Vec<Application>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn application_count(&self) -> usize {
        self.inner.read().await.applications.len()
    }
}

/// `filter` evaluated in process, with the semantics `PgStore` encodes in SQL.
fn job_matches(filter: &JobFilter, job: &Job) -> bool {
    if let Some(needle) = &filter.search {
        let hit = contains_ci(&job.title, needle)
            || contains_ci(&job.company, needle)
            || contains_ci(&job.description, needle);
        if !hit {
            return false;
        }
    }
    if let Some(needle) = &filter.location {
        if !contains_ci(&job.location, needle) {
            return false;
        }
    }
    if let Some(job_type) = filter.job_type {
        if job.job_type != job_type {
            return false;
        }
    }
    filter.skills.is_empty() || skills_intersect(&job.skills, &filter.skills)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Exact-string overlap, like Postgres `&&` on `TEXT[]`.
fn skills_intersect(job_skills: &[String], wanted: &[String]) -> bool {
    job_skills.iter().any(|s| wanted.contains(s))
}

fn newest_first<T, K: Ord>(mut rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    rows.reverse();
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    rows
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, new: NewUser) -> Result<User, AppError> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.email == new.email) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }
        let user = User::new(new);
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.inner.read().await.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn update_user(&self, user: &User) -> Result<User, AppError> {
        let mut inner = self.inner.write().await;
        if inner
            .users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(AppError::Conflict("Email is already in use".to_string()));
        }
        let stored = inner
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        stored.name = user.name.clone();
        stored.email = user.email.clone();
        stored.password_hash = user.password_hash.clone();
        stored.skills = user.skills.clone();
        stored.experience = user.experience.clone();
        Ok(stored.clone())
    }

    async fn set_resume(&self, user_id: Uuid, resume: Option<&Resume>) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        stored.resume = resume.cloned();
        Ok(())
    }

    async fn create_job(&self, new: NewJob) -> Result<Job, AppError> {
        let job = Job::new(new);
        self.inner.write().await.jobs.push(job.clone());
        Ok(job)
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        Ok(self.inner.read().await.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn find_jobs(&self, ids: &[Uuid]) -> Result<Vec<Job>, AppError> {
        Ok(self
            .inner
            .read()
            .await
            .jobs
            .iter()
            .filter(|j| ids.contains(&j.id))
            .cloned()
            .collect())
    }

    async fn update_job(&self, job: &Job) -> Result<Job, AppError> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .jobs
            .iter_mut()
            .find(|j| j.id == job.id)
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
        *stored = Job {
            posted_by: stored.posted_by,
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..job.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_job(&self, id: Uuid) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        inner.jobs.retain(|j| j.id != id);
        inner.applications.retain(|a| a.job_id != id);
        Ok(())
    }

    async fn search_jobs(&self, filter: &JobFilter, limit: i64) -> Result<Vec<Job>, AppError> {
        let inner = self.inner.read().await;
        let matching: Vec<Job> = inner.jobs.iter().filter(|j| job_matches(filter, j)).cloned().collect();
        let mut jobs = newest_first(matching, |j| j.created_at);
        jobs.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(jobs)
    }

    async fn create_application(&self, new: NewApplication) -> Result<Application, AppError> {
        let mut inner = self.inner.write().await;
        if inner
            .applications
            .iter()
            .any(|a| a.job_id == new.job_id && a.user_id == new.user_id)
        {
            return Err(AppError::Conflict(
                "You have already applied for this job".to_string(),
            ));
        }
        let application = Application::new(new);
        inner.applications.push(application.clone());
        Ok(application)
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>, AppError> {
        Ok(self
            .inner
            .read()
            .await
            .applications
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn find_application_for(
        &self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Application>, AppError> {
        Ok(self
            .inner
            .read()
            .await
            .applications
            .iter()
            .find(|a| a.job_id == job_id && a.user_id == user_id)
            .cloned())
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, AppError> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .applications
            .iter_mut()
            .find(|a| a.id == id && a.status == expected)
            .map(|stored| {
                stored.status = status;
                stored.clone()
            }))
    }

    async fn delete_unaccepted_application(&self, id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        let before = inner.applications.len();
        inner
            .applications
            .retain(|a| a.id != id || a.status == ApplicationStatus::Accepted);
        Ok(inner.applications.len() < before)
    }

    async fn applications_by_user(&self, user_id: Uuid) -> Result<Vec<Application>, AppError> {
        let inner = self.inner.read().await;
        let rows: Vec<_> = inner
            .applications
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |a| a.applied_at))
    }

    async fn applications_for_job(&self, job_id: Uuid) -> Result<Vec<Application>, AppError> {
        let inner = self.inner.read().await;
        let rows: Vec<_> = inner
            .applications
            .iter()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |a| a.applied_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{JobType, NewJob, Salary};

    fn job(title: &str, company: &str, location: &str, job_type: JobType, skills: &[&str]) -> Job {
        Job::new(NewJob {
            title: title.to_string(),
            company: company.to_string(),
            location: location.to_string(),
            description: format!("{title} role at {company}"),
            requirements: vec![],
            skills: skills.iter().map(|s| s.to_string()).collect(),
            salary: Salary::default(),
            job_type,
            posted_by: Uuid::new_v4(),
        })
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(job_matches(
            &JobFilter::default(),
            &job("Dev", "Acme", "Remote", JobType::Contract, &[])
        ));
    }

    #[test]
    fn test_search_is_case_insensitive_across_title_company_description() {
        let filter = JobFilter {
            search: Some("techcorp".into()),
            ..JobFilter::default()
        };
        assert!(job_matches(&filter, &job("Engineer", "TechCorp Inc.", "NY", JobType::FullTime, &[])));
        assert!(!job_matches(&filter, &job("Engineer", "DesignHub", "NY", JobType::FullTime, &[])));

        let by_title = JobFilter {
            search: Some("BACKEND".into()),
            ..JobFilter::default()
        };
        assert!(job_matches(&by_title, &job("Backend Engineer", "X", "NY", JobType::FullTime, &[])));
    }

    #[test]
    fn test_predicates_are_conjoined() {
        let filter = JobFilter {
            location: Some("remote".into()),
            job_type: Some(JobType::Internship),
            ..JobFilter::default()
        };
        assert!(job_matches(&filter, &job("Intern", "A", "Remote", JobType::Internship, &[])));
        assert!(!job_matches(&filter, &job("Intern", "A", "Austin, TX", JobType::Internship, &[])));
        assert!(!job_matches(&filter, &job("Dev", "A", "Remote", JobType::FullTime, &[])));
    }

    #[test]
    fn test_skills_filter_is_any_of() {
        let filter = JobFilter::any_skill(&strings(&["Rust", "Go"]));
        assert!(job_matches(&filter, &job("A", "B", "C", JobType::FullTime, &["Go", "Docker"])));
        assert!(!job_matches(&filter, &job("A", "B", "C", JobType::FullTime, &["Python"])));
        assert!(!job_matches(&filter, &job("A", "B", "C", JobType::FullTime, &[])));
    }

    #[test]
    fn test_search_metacharacters_match_literally() {
        let filter = JobFilter {
            search: Some("C++".into()),
            ..JobFilter::default()
        };
        assert!(job_matches(&filter, &job("C++ Developer", "A", "B", JobType::FullTime, &[])));
        assert!(!job_matches(&filter, &job("C Developer", "A", "B", JobType::FullTime, &[])));
    }

    #[test]
    fn test_skill_overlap_is_case_sensitive() {
        assert!(!skills_intersect(&strings(&["Python", "SQL"]), &strings(&["python", "Java"])));
        assert!(skills_intersect(&strings(&["Python", "SQL"]), &strings(&["SQL"])));
        assert!(!skills_intersect(&[], &strings(&["Rust"])));
    }
}
