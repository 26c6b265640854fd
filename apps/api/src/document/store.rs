//! In-memory editing sessions.
//!
//! A session owns one document, the template it is shown with, and the
//! frame its preview is mounted in. Every edit remounts the frame so the
//! preview (and any later export) always reflects the current document.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::document::demo::demo_document;
use crate::document::edit::DocumentError;
use crate::document::model::Document;
use crate::frame::{Frame, FrameMode};
use crate::render::{render, TemplateId};

#[derive(Debug)]
struct Session {
    id: Uuid,
    document: Document,
    template: TemplateId,
    frame: Frame,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            template: self.template,
            document: self.document.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Re-renders the document into the frame. The mount attaches in the
    /// background; readers wait for it through `Frame::await_root`.
    async fn remount(&self) {
        let content = render(&self.document, self.template);
        let _attach = self
            .frame
            .mount(content, self.template, FrameMode::Preview)
            .await;
        debug!(session_id = %self.id, template = %self.template, "preview remounted");
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub template: TemplateId,
    pub document: Document,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    viewport_width: f32,
}

impl SessionStore {
    pub fn new(viewport_width: f32) -> Self {
        SessionStore {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            viewport_width,
        }
    }

    /// Opens a session on an empty document, or on the demo resume.
    pub async fn create(&self, demo: bool) -> SessionView {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            document: if demo {
                demo_document()
            } else {
                Document::default()
            },
            template: TemplateId::default(),
            frame: Frame::new(self.viewport_width),
            created_at: now,
            updated_at: now,
        };
        session.remount().await;
        let view = session.view();

        self.sessions.write().await.insert(session.id, session);
        info!(session_id = %view.id, demo, "document session created");
        view
    }

    pub async fn get(&self, id: Uuid) -> Result<SessionView, DocumentError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .map(Session::view)
            .ok_or(DocumentError::NotFound(id))
    }

    pub async fn document(&self, id: Uuid) -> Result<Document, DocumentError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .map(|s| s.document.clone())
            .ok_or(DocumentError::NotFound(id))
    }

    /// Applies `edit` to the session's document. On success the session is
    /// touched and the preview remounted; on failure nothing changes.
    pub async fn edit<R>(
        &self,
        id: Uuid,
        edit: impl FnOnce(&mut Document) -> Result<R, DocumentError>,
    ) -> Result<R, DocumentError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(DocumentError::NotFound(id))?;

        let mut draft = session.document.clone();
        let result = edit(&mut draft)?;
        session.document = draft;
        session.updated_at = Utc::now();
        // Mount order follows lock order, so the newest edit always wins.
        session.remount().await;
        Ok(result)
    }

    pub async fn set_template(
        &self,
        id: Uuid,
        template: TemplateId,
    ) -> Result<SessionView, DocumentError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(DocumentError::NotFound(id))?;
        session.template = template;
        session.updated_at = Utc::now();
        session.remount().await;
        Ok(session.view())
    }

    /// The session's frame and a snapshot of the document it shows.
    pub async fn frame(&self, id: Uuid) -> Result<(Frame, Document), DocumentError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id).ok_or(DocumentError::NotFound(id))?;
        Ok((session.frame.clone(), session.document.clone()))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), DocumentError> {
        let session = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or(DocumentError::NotFound(id))?;
        session.frame.unmount().await;
        info!(session_id = %id, "document session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::Skill;
    use crate::frame::RetryPolicy;
    use crate::render::html::to_html;

    async fn preview_html(store: &SessionStore, id: Uuid) -> String {
        let (frame, _) = store.frame(id).await.unwrap();
        let lease = frame.await_root(RetryPolicy::default()).await.unwrap();
        to_html(&lease.surface().clone_subtree(lease.root()))
    }

    #[tokio::test]
    async fn test_create_empty_and_demo_sessions() {
        let store = SessionStore::new(794.0);
        let empty = store.create(false).await;
        assert_eq!(empty.document, Document::default());
        assert_eq!(empty.template, TemplateId::Classic);

        let demo = store.create(true).await;
        assert_eq!(demo.document.personal, demo_document().personal);
        assert_ne!(empty.id, demo.id);
        assert_eq!(store.get(demo.id).await.unwrap().id, demo.id);
    }

    #[tokio::test]
    async fn test_edit_remounts_preview() {
        let store = SessionStore::new(794.0);
        let session = store.create(true).await;

        let added = store
            .edit(session.id, |doc| {
                Ok(doc.add_entry(Skill {
                    name: "Zig".to_string(),
                    ..Default::default()
                }))
            })
            .await
            .unwrap();

        let document = store.document(session.id).await.unwrap();
        assert_eq!(document.skills.last().map(|s| s.id), Some(added.id));
        assert!(preview_html(&store, session.id).await.contains("Zig"));

        let view = store.get(session.id).await.unwrap();
        assert!(view.updated_at >= view.created_at);
    }

    #[tokio::test]
    async fn test_failed_edit_leaves_document_untouched() {
        let store = SessionStore::new(794.0);
        let session = store.create(true).await;

        let err = store
            .edit(session.id, |doc| {
                doc.set_summary("half-applied".to_string());
                doc.remove_entry::<Skill>(crate::document::model::EntryId::new())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::EntryNotFound { .. }));
        assert_eq!(store.document(session.id).await.unwrap(), session.document);
    }

    #[tokio::test]
    async fn test_set_template_and_remove() {
        let store = SessionStore::new(794.0);
        let session = store.create(true).await;

        let view = store
            .set_template(session.id, TemplateId::Modern)
            .await
            .unwrap();
        assert_eq!(view.template, TemplateId::Modern);
        let (frame, _) = store.frame(session.id).await.unwrap();
        let lease = frame.await_root(RetryPolicy::default()).await.unwrap();
        assert_eq!(lease.template(), TemplateId::Modern);
        drop(lease);

        store.remove(session.id).await.unwrap();
        assert!(matches!(
            store.get(session.id).await,
            Err(DocumentError::NotFound(_))
        ));
        assert!(store.remove(session.id).await.is_err());
    }
}
