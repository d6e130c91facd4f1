//! Ownership predicate shared by every mutating handler.
//!
//! Callers confirm existence first and check ownership second, so a
//! non-owner learns that the resource exists.

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::Application;
use crate::models::job::Job;

pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Job {
    fn owner_id(&self) -> Uuid {
        self.posted_by
    }
}

impl Owned for Application {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

pub fn is_owner<R: Owned + ?Sized>(actor: Uuid, resource: &R) -> bool {
    resource.owner_id() == actor
}

/// `NotAuthorized` with `message` unless `actor` owns `resource`.
pub fn ensure_owner<R: Owned + ?Sized>(
    actor: Uuid,
    resource: &R,
    message: &str,
) -> Result<(), AppError> {
    if is_owner(actor, resource) {
        Ok(())
    } else {
        Err(AppError::NotAuthorized(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::NewApplication;
    use crate::models::job::{JobType, NewJob, Salary};

    fn job_owned_by(owner: Uuid) -> Job {
        Job::new(NewJob {
            title: "t".into(),
            company: "c".into(),
            location: "l".into(),
            description: "d".into(),
            requirements: vec![],
            skills: vec![],
            salary: Salary::default(),
            job_type: JobType::FullTime,
            posted_by: owner,
        })
    }

    #[test]
    fn test_job_owner_is_poster() {
        let owner = Uuid::new_v4();
        let job = job_owned_by(owner);
        assert!(is_owner(owner, &job));
        assert!(!is_owner(Uuid::new_v4(), &job));
    }

    #[test]
    fn test_application_owner_is_applicant() {
        let applicant = Uuid::new_v4();
        let app = Application::new(NewApplication {
            job_id: Uuid::new_v4(),
            user_id: applicant,
            cover_letter: None,
        });
        assert!(ensure_owner(applicant, &app, "nope").is_ok());
        let err = ensure_owner(Uuid::new_v4(), &app, "Not authorized").unwrap_err();
        assert!(matches!(err, AppError::NotAuthorized(msg) if msg == "Not authorized"));
    }
}
