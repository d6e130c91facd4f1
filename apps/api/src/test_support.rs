//! Fixtures shared by unit and router tests.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::config::Config;
use crate::models::job::{Job, JobType, NewJob, Salary};
use crate::models::user::{NewUser, Resume, User};
use crate::state::AppState;
use crate::store::memory::MemoryStore;
use crate::store::Store;

/// Lowest cost bcrypt accepts; keeps hashing fast in tests.
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

pub async fn seed_user(store: &dyn Store, email: &str, skills: &[&str]) -> User {
    let mut user = store
        .create_user(NewUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: String::new(),
        })
        .await
        .unwrap();
    user.skills = skills.iter().map(|s| s.to_string()).collect();
    store.update_user(&user).await.unwrap()
}

/// Puts a resume reference on file without touching the filesystem.
pub async fn give_resume(store: &dyn Store, user: User) -> User {
    let resume = Resume {
        filename: format!("resume-{}-test.pdf", user.id),
        path: format!("/nonexistent/resume-{}-test.pdf", user.id),
        upload_date: Utc::now(),
    };
    store.set_resume(user.id, Some(&resume)).await.unwrap();
    store.find_user(user.id).await.unwrap().unwrap()
}

pub async fn seed_job(
    store: &dyn Store,
    owner: Uuid,
    title: &str,
    skills: &[&str],
    job_type: JobType,
) -> Job {
    store
        .create_job(NewJob {
            title: title.to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            description: format!("{title} position"),
            requirements: Vec::new(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            salary: Salary::default(),
            job_type,
            posted_by: owner,
        })
        .await
        .unwrap()
}

pub fn test_config(upload_dir: &Path) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_expires_in_days: 1,
        bcrypt_cost: TEST_BCRYPT_COST,
        client_url: "http://localhost:3000".to_string(),
        upload_dir: upload_dir.to_path_buf(),
        rate_limit_max: 100,
        rate_limit_window_secs: 900,
        trust_proxy: false,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

pub fn test_state(store: Arc<MemoryStore>, upload_dir: &Path) -> AppState {
    AppState::new(store, &test_config(upload_dir))
}
