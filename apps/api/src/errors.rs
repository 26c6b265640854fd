use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::assist::AssistError;
use crate::document::edit::DocumentError;
use crate::export::config::ConfigError;
use crate::export::error::ExportError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Invalid export configuration: {0}")]
    ExportConfig(#[from] ConfigError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Assist error: {0}")]
    Assist(#[from] AssistError),

    #[error("Assist backend is not configured")]
    AssistUnavailable,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Validation(format!("malformed multipart body: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Document(e) => (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
            AppError::ExportConfig(e) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Export(e) => {
                let status = match e {
                    ExportError::FrameUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    ExportError::EmptyContent { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    ExportError::PrintSurfaceBlocked(reason) => {
                        tracing::warn!("Print surface blocked: {reason}");
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                    ExportError::Failed { .. } => {
                        tracing::error!("Export error: {e:?}");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, e.code(), e.user_message().to_string())
            }
            AppError::Assist(AssistError::InvalidRequest(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Assist(AssistError::Api { status: 429, .. }) => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Too many requests. Please wait a moment and try again.".to_string(),
            ),
            AppError::Assist(e) => {
                tracing::error!("Assist error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "ASSIST_ERROR",
                    "The AI service could not complete the request".to_string(),
                )
            }
            AppError::AssistUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "ASSIST_UNAVAILABLE",
                "AI service is currently unavailable".to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::error::ExportStage;
    use uuid::Uuid;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_export_errors_map_to_distinct_codes() {
        let cases = [
            (
                AppError::from(ExportError::FrameUnavailable { attempts: 20 }),
                StatusCode::SERVICE_UNAVAILABLE,
                "PREVIEW_NOT_READY",
            ),
            (
                AppError::from(ExportError::EmptyContent {
                    width: 0.0,
                    height: 0.0,
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_CONTENT",
            ),
            (
                AppError::from(ExportError::PrintSurfaceBlocked("lp".into())),
                StatusCode::SERVICE_UNAVAILABLE,
                "PRINT_SURFACE_BLOCKED",
            ),
            (
                AppError::from(ExportError::failed(
                    ExportStage::Assemble,
                    anyhow::anyhow!("boom"),
                )),
                StatusCode::INTERNAL_SERVER_ERROR,
                "EXPORT_FAILED",
            ),
        ];
        for (err, status, code) in cases {
            let response = err.into_response();
            assert_eq!(response.status(), status);
            let body = body_json(response).await;
            assert_eq!(body["error"]["code"], code);
            assert!(!body["error"]["message"].as_str().unwrap().contains("boom"));
        }
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let response = AppError::from(DocumentError::NotFound(Uuid::nil())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_assist_errors() {
        let invalid = AppError::from(AssistError::InvalidRequest("count".into())).into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let limited = AppError::from(AssistError::Api {
            status: 429,
            message: "slow down".into(),
        })
        .into_response();
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

        let missing = AppError::AssistUnavailable.into_response();
        assert_eq!(missing.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
