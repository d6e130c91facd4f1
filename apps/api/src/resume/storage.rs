use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// Largest accepted upload, in bytes.
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

/// A file written by `ResumeStorage::save`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub filename: String,
    pub path: String,
}

/// Resume files on local disk, one directory for everyone.
#[derive(Debug, Clone)]
pub struct ResumeStorage {
    dir: PathBuf,
}

impl ResumeStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    /// Writes `bytes` as `resume-<userId>-<uuid>.<ext>`.
    pub async fn save(&self, user_id: Uuid, extension: &str, bytes: &[u8]) -> io::Result<StoredFile> {
        self.ensure_dir().await?;
        let filename = format!("resume-{user_id}-{}.{extension}", Uuid::new_v4());
        let path = self.dir.join(&filename);
        fs::write(&path, bytes).await?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());

        Ok(StoredFile {
            filename,
            path: path.to_string_lossy().into_owned(),
        })
    }

    /// Removes a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, path: &str) -> io::Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Lower-cased extension of `filename` if it is an accepted resume format.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())?
        .to_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extension() {
        assert_eq!(allowed_extension("cv.pdf").as_deref(), Some("pdf"));
        assert_eq!(allowed_extension("CV.DOCX").as_deref(), Some("docx"));
        assert_eq!(allowed_extension("old.doc").as_deref(), Some("doc"));
        assert_eq!(allowed_extension("photo.png"), None);
        assert_eq!(allowed_extension("noext"), None);
        assert_eq!(allowed_extension(".pdf"), None);
    }

    #[tokio::test]
    async fn test_save_names_file_after_user() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = ResumeStorage::new(tmp.path().join("nested"));
        let user_id = Uuid::new_v4();

        let stored = storage.save(user_id, "pdf", b"%PDF-1.4").await.unwrap();
        assert!(stored.filename.starts_with(&format!("resume-{user_id}-")));
        assert!(stored.filename.ends_with(".pdf"));
        assert_eq!(fs::read(&stored.path).await.unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = ResumeStorage::new(tmp.path());
        let stored = storage.save(Uuid::new_v4(), "doc", b"x").await.unwrap();

        storage.remove(&stored.path).await.unwrap();
        assert!(!Path::new(&stored.path).exists());
        storage.remove(&stored.path).await.unwrap();
    }
}
