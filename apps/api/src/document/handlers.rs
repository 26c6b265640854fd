use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::document::edit::{PersonalPatch, SectionEntry};
use crate::document::model::{EntryId, Extras, Personal};
use crate::document::store::SessionView;
use crate::document::validation::{validate_document, ValidationReport};
use crate::errors::AppError;
use crate::render::html::to_html;
use crate::render::TemplateId;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateDocumentRequest {
    #[serde(default)]
    pub demo: bool,
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct TemplateRequest {
    pub template: TemplateId,
}

/// POST /api/v1/documents
pub async fn handle_create_document(
    State(state): State<AppState>,
    body: Option<Json<CreateDocumentRequest>>,
) -> (StatusCode, Json<SessionView>) {
    let Json(req) = body.unwrap_or_default();
    let view = state.store.create(req.demo).await;
    (StatusCode::CREATED, Json(view))
}

/// GET /api/v1/documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.store.get(id).await?))
}

/// DELETE /api/v1/documents/:id
pub async fn handle_delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.store.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/documents/:id/personal
pub async fn handle_update_personal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<PersonalPatch>,
) -> Result<Json<Personal>, AppError> {
    let personal = state
        .store
        .edit(id, |doc| {
            doc.update_personal(patch);
            Ok(doc.personal.clone())
        })
        .await?;
    Ok(Json(personal))
}

/// PUT /api/v1/documents/:id/summary
pub async fn handle_set_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SummaryRequest>,
) -> Result<StatusCode, AppError> {
    state
        .store
        .edit(id, |doc| {
            doc.set_summary(req.summary);
            Ok(())
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/documents/:id/extras
pub async fn handle_set_extras(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(extras): Json<Extras>,
) -> Result<Json<Extras>, AppError> {
    let extras = state
        .store
        .edit(id, |doc| {
            doc.set_extras(extras);
            Ok(doc.extras.clone())
        })
        .await?;
    Ok(Json(extras))
}

/// POST /api/v1/documents/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    state
        .store
        .edit(id, |doc| {
            doc.reset();
            Ok(())
        })
        .await?;
    Ok(Json(state.store.get(id).await?))
}

/// POST /api/v1/documents/:id/demo
pub async fn handle_load_demo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    state
        .store
        .edit(id, |doc| {
            doc.load_demo();
            Ok(())
        })
        .await?;
    Ok(Json(state.store.get(id).await?))
}

/// GET /api/v1/documents/:id/validation
pub async fn handle_validate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ValidationReport>, AppError> {
    let document = state.store.document(id).await?;
    Ok(Json(validate_document(&document)))
}

/// PUT /api/v1/documents/:id/template
pub async fn handle_set_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TemplateRequest>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.store.set_template(id, req.template).await?))
}

/// GET /api/v1/documents/:id/preview
///
/// The mounted frame as HTML, editing chrome included.
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let (frame, _) = state.store.frame(id).await?;
    let lease = frame.await_root(state.config.pipeline().retry).await?;
    let html = to_html(&lease.surface().clone_subtree(lease.root()));
    Ok(Html(html))
}

// ────────────────────────────────────────────────────────────────────────────
// Section entries (one generic handler set per list section)
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/documents/:id/{section}
pub async fn handle_add_entry<T: SectionEntry>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(entry): Json<T>,
) -> Result<(StatusCode, Json<T>), AppError> {
    let entry = state.store.edit(id, |doc| Ok(doc.add_entry(entry))).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /api/v1/documents/:id/{section}/:entry_id
pub async fn handle_update_entry<T: SectionEntry>(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(Uuid, Uuid)>,
    Json(entry): Json<T>,
) -> Result<Json<T>, AppError> {
    let entry = state
        .store
        .edit(id, |doc| doc.update_entry(EntryId::from(entry_id), entry))
        .await?;
    Ok(Json(entry))
}

/// DELETE /api/v1/documents/:id/{section}/:entry_id
pub async fn handle_remove_entry<T: SectionEntry>(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    state
        .store
        .edit(id, |doc| doc.remove_entry::<T>(EntryId::from(entry_id)))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
