use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assist::{AssistClient, AtsScore, InterviewQuestions, SuggestRequest, Upload};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsScoreRequest {
    pub document_id: Uuid,
    #[serde(default)]
    pub job_desc: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<String>,
}

fn client(state: &AppState) -> Result<&AssistClient, AppError> {
    state.assist.as_ref().ok_or(AppError::AssistUnavailable)
}

/// POST /api/v1/assist/ats-score
pub async fn handle_ats_score(
    State(state): State<AppState>,
    Json(req): Json<AtsScoreRequest>,
) -> Result<Json<AtsScore>, AppError> {
    let assist = client(&state)?;
    let document = state.store.document(req.document_id).await?;
    let score = assist.score(&document, req.job_desc.as_deref()).await?;
    Ok(Json(score))
}

/// POST /api/v1/assist/suggestions
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Json(req): Json<SuggestRequest>,
) -> Result<Json<SuggestResponse>, AppError> {
    let assist = client(&state)?;
    let suggestions = assist.suggest(&req).await?;
    Ok(Json(SuggestResponse { suggestions }))
}

/// Reads a `file` part and an optional non-blank `jobDesc` part.
async fn read_upload(mut multipart: Multipart) -> Result<(Upload, Option<String>), AppError> {
    let mut upload: Option<Upload> = None;
    let mut job_desc: Option<String> = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                upload = Some(Upload {
                    filename,
                    content_type,
                    bytes,
                });
            }
            Some("jobDesc") => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    job_desc = Some(text);
                }
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| AppError::Validation("a 'file' part is required".into()))?;
    Ok((upload, job_desc))
}

/// POST /api/v1/assist/ats-score-file
///
/// Scores an uploaded resume file instead of a stored document. Same
/// multipart shape as the interview-questions endpoint.
pub async fn handle_ats_score_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AtsScore>, AppError> {
    let assist = client(&state)?;
    let (upload, job_desc) = read_upload(multipart).await?;
    let score = assist.score_file(&upload, job_desc.as_deref()).await?;
    Ok(Json(score))
}

/// POST /api/v1/assist/interview-questions
///
/// Multipart form with a `file` part (PDF/DOC/DOCX) and an optional
/// `jobDesc` text part.
pub async fn handle_interview_questions(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<InterviewQuestions>, AppError> {
    let assist = client(&state)?;
    let (upload, job_desc) = read_upload(multipart).await?;
    let questions = assist
        .interview_questions(&upload, job_desc.as_deref())
        .await?;
    Ok(Json(questions))
}
