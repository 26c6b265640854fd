use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::config::{ExportConfig, ExportRequest};
use crate::export::pdf::export_pdf;
use crate::export::print::{print, CommandPrintFacility, SpoolPrintFacility};
use crate::export::sink::{DirectorySink, FileSink, MemorySink};
use crate::state::AppState;

/// An absent or blank body means "use the defaults"; anything else must be
/// a well-formed `ExportRequest`.
fn parse_export_request(body: &[u8]) -> Result<ExportRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ExportRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("invalid export options: {e}")))
}

/// POST /api/v1/documents/:id/export/print
///
/// With a print command configured the document is printed here and the
/// outcome returned. Otherwise the print-ready HTML is returned for the
/// caller's own print dialog.
pub async fn handle_print(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Response, AppError> {
    let req = parse_export_request(&body)?;
    let (frame, document) = state.store.frame(id).await?;
    let config = ExportConfig::new(req, &document.personal, &state.config.export_defaults())?;
    let settings = state.config.pipeline();

    if let Some(facility) = state
        .config
        .print_command
        .as_deref()
        .and_then(CommandPrintFacility::from_command_line)
    {
        let outcome = print(
            &frame,
            &config,
            &facility,
            settings.retry,
            settings.print_timeout,
        )
        .await?;
        return Ok(Json(json!({ "outcome": outcome, "filename": config.filename() }))
            .into_response());
    }

    let spool = SpoolPrintFacility::new();
    print(&frame, &config, &spool, settings.retry, settings.print_timeout).await?;
    let document = spool
        .take()
        .await
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("print document was not spooled")))?;
    info!(document_id = %id, title = %document.title, "print document spooled");
    Ok(Html(document.html).into_response())
}

/// POST /api/v1/documents/:id/export/pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Response, AppError> {
    let req = parse_export_request(&body)?;
    let (frame, document) = state.store.frame(id).await?;
    let config = ExportConfig::new(req, &document.personal, &state.config.export_defaults())?;

    let sink: Box<dyn FileSink> = match &state.config.export_dir {
        Some(dir) => Box::new(DirectorySink::new(dir.clone())),
        None => Box::new(MemorySink::new()),
    };
    let export = export_pdf(
        &frame,
        &config,
        state.host.as_ref(),
        state.rasterizer.clone(),
        sink.as_ref(),
        &state.config.pipeline(),
    )
    .await?;

    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.bytes,
    )
        .into_response())
}
