//! Resume upload and removal.
//!
//! The file and the user record live in different places and are not updated
//! atomically. Each operation orders its two writes so a failure in the second
//! can be undone:
//!
//! - upload writes the file first, then the record; a failed record update
//!   deletes the new file. The replaced file is removed afterwards, best-effort.
//! - delete clears the record first, then the file; a failed file removal
//!   puts the record back.

use chrono::Utc;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::user::{Resume, User};
use crate::resume::storage::{allowed_extension, ResumeStorage, MAX_RESUME_BYTES};
use crate::store::Store;

/// Checks name and size, returning the extension to store under.
pub fn check_upload(original_name: &str, size: usize) -> Result<String, AppError> {
    let ext = allowed_extension(original_name).ok_or_else(|| {
        AppError::Validation("Only .pdf, .doc and .docx files are allowed".to_string())
    })?;
    if size == 0 {
        return Err(AppError::Validation("Please upload a file".to_string()));
    }
    if size > MAX_RESUME_BYTES {
        return Err(AppError::Validation(
            "File too large. Maximum size is 5MB".to_string(),
        ));
    }
    Ok(ext)
}

pub async fn upload(
    store: &dyn Store,
    storage: &ResumeStorage,
    user: &User,
    original_name: &str,
    bytes: &[u8],
) -> Result<Resume, AppError> {
    let ext = check_upload(original_name, bytes.len())?;

    let stored = storage.save(user.id, &ext, bytes).await?;
    let resume = Resume {
        filename: stored.filename,
        path: stored.path,
        upload_date: Utc::now(),
    };

    if let Err(e) = store.set_resume(user.id, Some(&resume)).await {
        if let Err(cleanup) = storage.remove(&resume.path).await {
            warn!("Failed to remove orphaned resume {}: {cleanup}", resume.path);
        }
        return Err(e);
    }
    info!("Stored resume {} for user {}", resume.filename, user.id);

    if let Some(old) = &user.resume {
        if old.path != resume.path {
            if let Err(e) = storage.remove(&old.path).await {
                warn!("Failed to remove replaced resume {}: {e}", old.path);
            }
        }
    }

    Ok(resume)
}

pub async fn delete(store: &dyn Store, storage: &ResumeStorage, user: &User) -> Result<(), AppError> {
    let resume = user
        .resume
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

    store.set_resume(user.id, None).await?;

    if let Err(e) = storage.remove(&resume.path).await {
        warn!("Failed to remove resume {}, restoring reference: {e}", resume.path);
        store.set_resume(user.id, Some(resume)).await?;
        return Err(AppError::Storage(e));
    }

    info!("Deleted resume {} for user {}", resume.filename, user.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::NewUser;
    use crate::test_support::{memory_store, seed_user};
    use std::path::Path;

    #[test]
    fn test_check_upload() {
        assert_eq!(check_upload("cv.PDF", 10).unwrap(), "pdf");
        assert!(matches!(check_upload("cv.txt", 10), Err(AppError::Validation(_))));
        assert!(matches!(check_upload("cv.pdf", 0), Err(AppError::Validation(_))));
        assert!(matches!(
            check_upload("cv.pdf", MAX_RESUME_BYTES + 1),
            Err(AppError::Validation(_))
        ));
        assert!(check_upload("cv.pdf", MAX_RESUME_BYTES).is_ok());
    }

    #[tokio::test]
    async fn test_upload_replaces_previous_file() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = ResumeStorage::new(tmp.path());
        let store = memory_store();
        let user = seed_user(store.as_ref(), "dev@example.com", &[]).await;

        let first = upload(store.as_ref(), &storage, &user, "cv.pdf", b"one").await.unwrap();
        let user = store.find_user(user.id).await.unwrap().unwrap();
        let second = upload(store.as_ref(), &storage, &user, "cv.docx", b"two").await.unwrap();

        assert!(!Path::new(&first.path).exists());
        assert!(Path::new(&second.path).exists());
        let stored = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.resume, Some(second));
    }

    #[tokio::test]
    async fn test_failed_record_update_removes_new_file() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = ResumeStorage::new(tmp.path());
        let store = memory_store();
        // never inserted, so the record update fails
        let ghost = User::new(NewUser {
            name: "Ghost".into(),
            email: "ghost@example.com".into(),
            password_hash: String::new(),
        });

        let err = upload(store.as_ref(), &storage, &ghost, "cv.pdf", b"data")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_delete_clears_reference_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = ResumeStorage::new(tmp.path());
        let store = memory_store();
        let user = seed_user(store.as_ref(), "dev@example.com", &[]).await;
        let resume = upload(store.as_ref(), &storage, &user, "cv.pdf", b"x").await.unwrap();
        let user = store.find_user(user.id).await.unwrap().unwrap();

        delete(store.as_ref(), &storage, &user).await.unwrap();
        assert!(!Path::new(&resume.path).exists());
        assert!(store.find_user(user.id).await.unwrap().unwrap().resume.is_none());
    }

    #[tokio::test]
    async fn test_delete_tolerates_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = ResumeStorage::new(tmp.path());
        let store = memory_store();
        let user = seed_user(store.as_ref(), "dev@example.com", &[]).await;
        let resume = upload(store.as_ref(), &storage, &user, "cv.pdf", b"x").await.unwrap();
        std::fs::remove_file(&resume.path).unwrap();
        let user = store.find_user(user.id).await.unwrap().unwrap();

        delete(store.as_ref(), &storage, &user).await.unwrap();
        assert!(store.find_user(user.id).await.unwrap().unwrap().resume.is_none());
    }

    #[tokio::test]
    async fn test_failed_file_removal_restores_reference() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = ResumeStorage::new(tmp.path());
        let store = memory_store();
        let user = seed_user(store.as_ref(), "dev@example.com", &[]).await;

        // a directory cannot be removed with remove_file
        let blocker = tmp.path().join("resume-blocker.pdf");
        std::fs::create_dir(&blocker).unwrap();
        let resume = Resume {
            filename: "resume-blocker.pdf".into(),
            path: blocker.to_string_lossy().into_owned(),
            upload_date: Utc::now(),
        };
        store.set_resume(user.id, Some(&resume)).await.unwrap();
        let user = store.find_user(user.id).await.unwrap().unwrap();

        let err = delete(store.as_ref(), &storage, &user).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        let stored = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.resume, Some(resume));
    }

    #[tokio::test]
    async fn test_delete_without_resume_is_not_found() {
        let store = memory_store();
        let storage = ResumeStorage::new("unused");
        let user = seed_user(store.as_ref(), "dev@example.com", &[]).await;
        let err = delete(store.as_ref(), &storage, &user).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
