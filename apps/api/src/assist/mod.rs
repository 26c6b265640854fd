/// Assist client: the single point of entry for calls to the external AI
/// backend (ATS scoring, writing suggestions, interview questions).
///
/// The backend is a separate service; this module only shapes requests,
/// retries transient failures and parses responses.
use std::time::Duration;

use bytes::Bytes;
use reqwest::{multipart, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::document::model::Document;

pub mod handlers;

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_SOURCE_TEXT_LENGTH: usize = 10_000;
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const UPLOAD_EXTENSIONS: &[&str] = &["pdf", "docx", "doc"];

#[derive(Debug, Error)]
pub enum AssistError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("assist backend error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("assist backend still failing after {retries} attempts")]
    RetriesExhausted { retries: u32 },

    #[error("invalid assist request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Deserialize)]
struct BackendError {
    detail: serde_json::Value,
}

// ────────────────────────────────────────────────────────────────────────────
// Request / response shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestTask {
    Summary,
    Bullet,
    Skills,
    Rewrite,
    Achievement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
    Entry,
    Intern,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRequest {
    pub task: SuggestTask,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<ExperienceLevel>,
    pub source_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_desc: Option<String>,
    #[serde(default = "default_count")]
    pub count: u8,
}

fn default_count() -> u8 {
    1
}

impl SuggestRequest {
    pub fn validate(&self) -> Result<(), AssistError> {
        if !(1..=10).contains(&self.count) {
            return Err(AssistError::InvalidRequest(format!(
                "count must be between 1 and 10 (got {})",
                self.count
            )));
        }
        let length = self.source_text.trim().chars().count();
        if length == 0 {
            return Err(AssistError::InvalidRequest(
                "sourceText must not be empty".to_string(),
            ));
        }
        if length > MAX_SOURCE_TEXT_LENGTH {
            return Err(AssistError::InvalidRequest(format!(
                "sourceText must be at most {MAX_SOURCE_TEXT_LENGTH} characters"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct SuggestResponse {
    suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsScore {
    pub score: u32,
    #[serde(default)]
    pub breakdown: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    pub suggested_answer: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterviewQuestions {
    #[serde(default)]
    pub technical_questions: Vec<InterviewQuestion>,
    #[serde(default)]
    pub behavioral_questions: Vec<InterviewQuestion>,
}

/// A resume file to generate interview questions from.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    pub fn validate(&self) -> Result<(), AssistError> {
        let extension = self
            .filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !UPLOAD_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AssistError::InvalidRequest(
                "unsupported file type; upload a PDF or DOCX file".to_string(),
            ));
        }
        if self.bytes.is_empty() {
            return Err(AssistError::InvalidRequest("file is empty".to_string()));
        }
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AssistError::InvalidRequest(
                "file size must be less than 5MB".to_string(),
            ));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AssistClient {
    client: Client,
    base_url: String,
    backoff: Duration,
}

impl AssistClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AssistError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            backoff: Duration::from_millis(1000),
        })
    }

    /// First retry delay; later retries double it.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends the request built by `build`, retrying on 429, 5xx and
    /// transport errors with exponential backoff.
    async fn send<T: DeserializeOwned>(
        &self,
        build: impl Fn(&Client) -> RequestBuilder,
    ) -> Result<T, AssistError> {
        let mut last_error: Option<AssistError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.backoff * (1 << (attempt - 1));
                warn!(
                    "assist call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match build(&self.client).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(AssistError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("assist backend returned {}: {}", status, body);
                last_error = Some(AssistError::Api {
                    status: status.as_u16(),
                    message: error_message(body),
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AssistError::Api {
                    status: status.as_u16(),
                    message: error_message(body),
                });
            }

            let body = response.text().await?;
            debug!(bytes = body.len(), "assist call succeeded");
            return serde_json::from_str(strip_json_fences(&body)).map_err(AssistError::Parse);
        }

        Err(last_error.unwrap_or(AssistError::RetriesExhausted {
            retries: MAX_RETRIES,
        }))
    }

    /// POST /api/ats/score
    pub async fn score(
        &self,
        resume: &Document,
        job_description: Option<&str>,
    ) -> Result<AtsScore, AssistError> {
        let payload = json!({ "resume": resume_payload(resume)?, "jobDesc": job_description });
        let url = self.url("/api/ats/score");
        self.send(|client| client.post(&url).json(&payload)).await
    }

    /// POST /api/ats/score-file
    pub async fn score_file(
        &self,
        upload: &Upload,
        job_description: Option<&str>,
    ) -> Result<AtsScore, AssistError> {
        upload.validate()?;
        let url = self.url("/api/ats/score-file");
        self.send(|client| client.post(&url).multipart(upload_form(upload, job_description)))
            .await
    }

    /// POST /api/suggest/
    pub async fn suggest(&self, request: &SuggestRequest) -> Result<Vec<String>, AssistError> {
        request.validate()?;
        let url = self.url("/api/suggest/");
        let response: SuggestResponse = self.send(|client| client.post(&url).json(request)).await?;
        Ok(response.suggestions)
    }

    /// POST /api/interview/generate-file
    pub async fn interview_questions(
        &self,
        upload: &Upload,
        job_description: Option<&str>,
    ) -> Result<InterviewQuestions, AssistError> {
        upload.validate()?;
        let url = self.url("/api/interview/generate-file");
        self.send(|client| client.post(&url).multipart(upload_form(upload, job_description)))
            .await
    }
}

/// The document in the backend's `Resume` shape. The backend reads
/// `current` and `github` where the editor says `isCurrent` and
/// `repositoryUrl`.
fn resume_payload(resume: &Document) -> Result<Value, AssistError> {
    let mut value = serde_json::to_value(resume)?;
    rename_in_entries(&mut value, "experience", "isCurrent", "current");
    rename_in_entries(&mut value, "projects", "repositoryUrl", "github");
    Ok(value)
}

fn rename_in_entries(value: &mut Value, list: &str, from: &str, to: &str) {
    let Some(entries) = value.get_mut(list).and_then(Value::as_array_mut) else {
        return;
    };
    for entry in entries.iter_mut().filter_map(Value::as_object_mut) {
        if let Some(field) = entry.remove(from) {
            entry.insert(to.to_string(), field);
        }
    }
}

/// A fresh multipart body per attempt: `file` plus an optional `jobDesc`.
fn upload_form(upload: &Upload, job_description: Option<&str>) -> multipart::Form {
    let part = || {
        multipart::Part::bytes(upload.bytes.to_vec()).file_name(upload.filename.clone())
    };
    // An unparsable client-supplied type is dropped, not fatal.
    let file = match upload.content_type.as_deref() {
        Some(mime) => part().mime_str(mime).unwrap_or_else(|_| part()),
        None => part(),
    };
    let mut form = multipart::Form::new().part("file", file);
    if let Some(job_description) = job_description {
        form = form.text("jobDesc", job_description.to_string());
    }
    form
}

/// FastAPI-style `{"detail": ...}` bodies collapse to their detail text.
fn error_message(body: String) -> String {
    match serde_json::from_str::<BackendError>(&body) {
        Ok(BackendError {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(BackendError { detail }) => detail.to_string(),
        Err(_) => body,
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from backend output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
