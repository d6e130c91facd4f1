use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::search::{like_pattern, JobFilter};
use crate::models::application::{Application, ApplicationStatus, NewApplication};
use crate::models::job::{Job, NewJob};
use crate::models::user::{NewUser, Resume, User};
use crate::store::Store;

/// `Store` backed by the PostgreSQL schema in `migrations/`.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    skills: Vec<String>,
    experience: Option<String>,
    resume_filename: Option<String>,
    resume_path: Option<String>,
    resume_uploaded_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let resume = match (row.resume_filename, row.resume_path, row.resume_uploaded_at) {
            (Some(filename), Some(path), Some(upload_date)) => Some(Resume {
                filename,
                path,
                upload_date,
            }),
            _ => None,
        };
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            skills: row.skills,
            experience: row.experience,
            resume,
            created_at: row.created_at,
        }
    }
}

/// Maps a unique-index violation to `Conflict(message)`, anything else to `Database`.
fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err),
    }
}

/// Appends the WHERE clause for `filter`. Omitted predicates add nothing.
fn push_job_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
    qb.push(" WHERE TRUE");
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR company ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(location) = &filter.location {
        qb.push(" AND location ILIKE ")
            .push_bind(like_pattern(location));
    }
    if let Some(job_type) = filter.job_type {
        qb.push(" AND job_type = ").push_bind(job_type.as_str());
    }
    if !filter.skills.is_empty() {
        // && is array overlap: at least one element in common.
        qb.push(" AND skills && ").push_bind(filter.skills.clone());
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, new: NewUser) -> Result<User, AppError> {
        let user = User::new(new);
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "User already exists"))?;
        Ok(row.into())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update_user(&self, user: &User) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, skills = $5,
                experience = $6, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.skills)
        .bind(&user.experience)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Email is already in use"))?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(row.into())
    }

    async fn set_resume(&self, user_id: Uuid, resume: Option<&Resume>) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET resume_filename = $2, resume_path = $3, resume_uploaded_at = $4,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(resume.map(|r| r.filename.as_str()))
        .bind(resume.map(|r| r.path.as_str()))
        .bind(resume.map(|r| r.upload_date))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn create_job(&self, new: NewJob) -> Result<Job, AppError> {
        let job = Job::new(new);
        Ok(sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs
                (id, title, company, location, description, requirements, skills,
                 salary_min, salary_max, salary_currency, job_type, posted_by,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location)
        .bind(&job.description)
        .bind(&job.requirements)
        .bind(&job.skills)
        .bind(job.salary.min)
        .bind(job.salary.max)
        .bind(&job.salary.currency)
        .bind(job.job_type.as_str())
        .bind(job.posted_by)
        .bind(job.created_at)
        .bind(job.updated_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        Ok(sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_jobs(&self, ids: &[Uuid]) -> Result<Vec<Job>, AppError> {
        Ok(sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_job(&self, job: &Job) -> Result<Job, AppError> {
        sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET title = $2, company = $3, location = $4, description = $5,
                requirements = $6, skills = $7, salary_min = $8, salary_max = $9,
                salary_currency = $10, job_type = $11, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location)
        .bind(&job.description)
        .bind(&job.requirements)
        .bind(&job.skills)
        .bind(job.salary.min)
        .bind(job.salary.max)
        .bind(&job.salary.currency)
        .bind(job.job_type.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
    }

    async fn delete_job(&self, id: Uuid) -> Result<(), AppError> {
        // applications go with it via ON DELETE CASCADE
        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn search_jobs(&self, filter: &JobFilter, limit: i64) -> Result<Vec<Job>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM jobs");
        push_job_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit);

        Ok(qb.build_query_as::<Job>().fetch_all(&self.pool).await?)
    }

    async fn create_application(&self, new: NewApplication) -> Result<Application, AppError> {
        let application = Application::new(new);
        sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (id, job_id, user_id, status, cover_letter, applied_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(application.id)
        .bind(application.job_id)
        .bind(application.user_id)
        .bind(application.status.as_str())
        .bind(&application.cover_letter)
        .bind(application.applied_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "You have already applied for this job"))
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>, AppError> {
        Ok(
            sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_application_for(
        &self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Application>, AppError> {
        Ok(sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE job_id = $1 AND user_id = $2",
        )
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, AppError> {
        Ok(sqlx::query_as::<_, Application>(
            "UPDATE applications SET status = $2 WHERE id = $1 AND status = $3 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(expected.as_str())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_unaccepted_application(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1 AND status <> $2")
            .bind(id)
            .bind(ApplicationStatus::Accepted.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn applications_by_user(&self, user_id: Uuid) -> Result<Vec<Application>, AppError> {
        Ok(sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE user_id = $1 ORDER BY applied_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn applications_for_job(&self, job_id: Uuid) -> Result<Vec<Application>, AppError> {
        Ok(sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE job_id = $1 ORDER BY applied_at DESC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
