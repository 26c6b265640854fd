pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};

use crate::assist::{handlers as assist, MAX_UPLOAD_BYTES};
use crate::document::edit::SectionEntry;
use crate::document::handlers as documents;
use crate::document::model::{Achievement, Education, Experience, Project, Skill};
use crate::export::handlers as export;
use crate::state::AppState;

/// Room for the multipart envelope around a maximum-size upload.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

/// Add / update / remove routes for one list section.
fn entry_routes<T: SectionEntry>(router: Router<AppState>) -> Router<AppState> {
    let collection = format!("/api/v1/documents/:id/{}", T::SECTION);
    let item = format!("{collection}/:entry_id");
    router
        .route(&collection, post(documents::handle_add_entry::<T>))
        .route(
            &item,
            put(documents::handle_update_entry::<T>).delete(documents::handle_remove_entry::<T>),
        )
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health::health_handler))
        // Documents
        .route("/api/v1/documents", post(documents::handle_create_document))
        .route(
            "/api/v1/documents/:id",
            get(documents::handle_get_document).delete(documents::handle_delete_document),
        )
        .route(
            "/api/v1/documents/:id/personal",
            patch(documents::handle_update_personal),
        )
        .route(
            "/api/v1/documents/:id/summary",
            put(documents::handle_set_summary),
        )
        .route(
            "/api/v1/documents/:id/extras",
            put(documents::handle_set_extras),
        )
        .route("/api/v1/documents/:id/reset", post(documents::handle_reset))
        .route("/api/v1/documents/:id/demo", post(documents::handle_load_demo))
        .route(
            "/api/v1/documents/:id/validation",
            get(documents::handle_validate),
        )
        .route(
            "/api/v1/documents/:id/template",
            put(documents::handle_set_template),
        )
        .route(
            "/api/v1/documents/:id/preview",
            get(documents::handle_preview),
        )
        // Export
        .route(
            "/api/v1/documents/:id/export/print",
            post(export::handle_print),
        )
        .route(
            "/api/v1/documents/:id/export/pdf",
            post(export::handle_export_pdf),
        )
        // Assist
        .route("/api/v1/assist/ats-score", post(assist::handle_ats_score))
        .route(
            "/api/v1/assist/ats-score-file",
            post(assist::handle_ats_score_file).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/v1/assist/suggestions",
            post(assist::handle_suggestions),
        )
        .route(
            "/api/v1/assist/interview-questions",
            post(assist::handle_interview_questions)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        );

    let router = entry_routes::<Experience>(router);
    let router = entry_routes::<Education>(router);
    let router = entry_routes::<Skill>(router);
    let router = entry_routes::<Project>(router);
    let router = entry_routes::<Achievement>(router);

    router.with_state(state)
}
