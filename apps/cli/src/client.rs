use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Application, ApplicationList, AuthResponse, Job, JobList, JobUpdate, Message, NewJob,
    ProfileUpdate, Resume, UploadResponse, User,
};
use crate::session::Session;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{message} ({status})")]
    Status { status: StatusCode, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not read {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turns a failed response body into `ApiError::Status`. Bodies that are not
/// the API's error envelope are passed through as the message.
pub fn status_error(status: StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => ApiError::Status {
            status,
            message: envelope.error.message,
        },
        Err(_) => ApiError::Status {
            status,
            message: if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                body.trim().to_string()
            },
        },
    }
}

#[derive(Debug, Default)]
pub struct JobQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub skills: Vec<String>,
}

impl JobQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(location) = &self.location {
            pairs.push(("location", location.clone()));
        }
        if let Some(job_type) = &self.job_type {
            pairs.push(("type", job_type.clone()));
        }
        if !self.skills.is_empty() {
            pairs.push(("skills", self.skills.join(",")));
        }
        pairs
    }
}

/// Thin typed wrapper over the job-board HTTP API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = json!({ "name": name, "email": email, "password": password });
        send(self.http.post(self.url("auth/register")).json(&body)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = json!({ "email": email, "password": password });
        send(self.http.post(self.url("auth/login")).json(&body)).await
    }

    pub async fn profile(&self, session: &Session) -> Result<User, ApiError> {
        send(self.authed(self.http.get(self.url("auth/profile")), session)).await
    }

    pub async fn update_profile(
        &self,
        session: &Session,
        update: &ProfileUpdate,
    ) -> Result<AuthResponse, ApiError> {
        let req = self.http.put(self.url("auth/profile")).json(update);
        send(self.authed(req, session)).await
    }

    pub async fn list_jobs(&self, query: &JobQuery) -> Result<JobList, ApiError> {
        send(self.http.get(self.url("jobs")).query(&query.pairs())).await
    }

    pub async fn matched_jobs(&self, session: &Session) -> Result<JobList, ApiError> {
        send(self.authed(self.http.get(self.url("jobs/matched")), session)).await
    }

    pub async fn get_job(&self, id: Uuid) -> Result<Job, ApiError> {
        send(self.http.get(self.url(&format!("jobs/{id}")))).await
    }

    pub async fn create_job(&self, session: &Session, job: &NewJob) -> Result<Job, ApiError> {
        let req = self.http.post(self.url("jobs")).json(job);
        send(self.authed(req, session)).await
    }

    pub async fn update_job(
        &self,
        session: &Session,
        id: Uuid,
        update: &JobUpdate,
    ) -> Result<Job, ApiError> {
        let req = self.http.put(self.url(&format!("jobs/{id}"))).json(update);
        send(self.authed(req, session)).await
    }

    pub async fn delete_job(&self, session: &Session, id: Uuid) -> Result<Message, ApiError> {
        let req = self.http.delete(self.url(&format!("jobs/{id}")));
        send(self.authed(req, session)).await
    }

    pub async fn job_applications(
        &self,
        session: &Session,
        job_id: Uuid,
    ) -> Result<ApplicationList, ApiError> {
        let req = self.http.get(self.url(&format!("jobs/{job_id}/applications")));
        send(self.authed(req, session)).await
    }

    pub async fn apply(
        &self,
        session: &Session,
        job_id: Uuid,
        cover_letter: Option<&str>,
    ) -> Result<Application, ApiError> {
        let body = json!({ "jobId": job_id, "coverLetter": cover_letter });
        let req = self.http.post(self.url("applications")).json(&body);
        send(self.authed(req, session)).await
    }

    pub async fn my_applications(&self, session: &Session) -> Result<ApplicationList, ApiError> {
        send(self.authed(self.http.get(self.url("applications")), session)).await
    }

    pub async fn get_application(&self, session: &Session, id: Uuid) -> Result<Application, ApiError> {
        let req = self.http.get(self.url(&format!("applications/{id}")));
        send(self.authed(req, session)).await
    }

    pub async fn set_status(
        &self,
        session: &Session,
        id: Uuid,
        status: &str,
    ) -> Result<Application, ApiError> {
        let req = self
            .http
            .put(self.url(&format!("applications/{id}")))
            .json(&json!({ "status": status }));
        send(self.authed(req, session)).await
    }

    pub async fn withdraw(&self, session: &Session, id: Uuid) -> Result<Message, ApiError> {
        let req = self.http.delete(self.url(&format!("applications/{id}")));
        send(self.authed(req, session)).await
    }

    pub async fn upload_resume(&self, session: &Session, file: &Path) -> Result<UploadResponse, ApiError> {
        let bytes = tokio::fs::read(file).await.map_err(|source| ApiError::File {
            path: file.display().to_string(),
            source,
        })?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());

        let form = Form::new().part("resume", Part::bytes(bytes).file_name(file_name));
        let req = self.http.post(self.url("resume/upload")).multipart(form);
        send(self.authed(req, session)).await
    }

    pub async fn get_resume(&self, session: &Session) -> Result<Resume, ApiError> {
        send(self.authed(self.http.get(self.url("resume")), session)).await
    }

    pub async fn delete_resume(&self, session: &Session) -> Result<Message, ApiError> {
        send(self.authed(self.http.delete(self.url("resume")), session)).await
    }

    fn authed(&self, req: RequestBuilder, session: &Session) -> RequestBuilder {
        req.bearer_auth(&session.token)
    }
}

async fn send<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ApiError> {
    decode(req.send().await?).await
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(status, &body));
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://localhost:5000/api/");
        assert_eq!(client.url("jobs"), "http://localhost:5000/api/jobs");
        assert_eq!(client.url("/auth/login"), "http://localhost:5000/api/auth/login");
    }

    #[test]
    fn test_error_envelope_is_parsed() {
        let err = status_error(
            StatusCode::CONFLICT,
            r#"{"error":{"code":"CONFLICT","message":"You have already applied for this job"}}"#,
        );
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, StatusCode::CONFLICT);
                assert_eq!(message, "You have already applied for this job");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_envelope_body_falls_back() {
        let err = status_error(StatusCode::UNPROCESSABLE_ENTITY, "Failed to parse body");
        assert_eq!(err.to_string(), "Failed to parse body (422 Unprocessable Entity)");

        let err = status_error(StatusCode::BAD_GATEWAY, "");
        assert!(err.to_string().starts_with("Bad Gateway"));
    }

    #[test]
    fn test_job_query_pairs() {
        let query = JobQuery {
            search: Some("rust".into()),
            job_type: Some("Internship".into()),
            skills: vec!["Rust".into(), "SQL".into()],
            ..JobQuery::default()
        };
        assert_eq!(
            query.pairs(),
            vec![
                ("search", "rust".to_string()),
                ("type", "Internship".to_string()),
                ("skills", "Rust,SQL".to_string()),
            ]
        );
    }
}
