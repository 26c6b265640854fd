//! Field-level edits on a [`Document`].
//!
//! Each edit replaces one field or one list entry. Only `reset` and
//! `load_demo` swap the whole document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::document::demo::demo_document;
use crate::document::model::{
    Achievement, Document, Education, EntryId, Experience, Extras, Personal, Project, Skill,
};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document {0} not found")]
    NotFound(Uuid),

    #[error("{section} entry {id} not found")]
    EntryNotFound { section: &'static str, id: EntryId },
}

// ────────────────────────────────────────────────────────────────────────────
// Section entries
// ────────────────────────────────────────────────────────────────────────────

/// A list entry that can be added, replaced and removed by id.
pub trait SectionEntry: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const SECTION: &'static str;

    fn id(&self) -> EntryId;
    fn set_id(&mut self, id: EntryId);
    fn list(document: &Document) -> &Vec<Self>;
    fn list_mut(document: &mut Document) -> &mut Vec<Self>;
}

macro_rules! section_entry {
    ($ty:ty, $section:literal, $field:ident) => {
        impl SectionEntry for $ty {
            const SECTION: &'static str = $section;

            fn id(&self) -> EntryId {
                self.id
            }

            fn set_id(&mut self, id: EntryId) {
                self.id = id;
            }

            fn list(document: &Document) -> &Vec<Self> {
                &document.$field
            }

            fn list_mut(document: &mut Document) -> &mut Vec<Self> {
                &mut document.$field
            }
        }
    };
}

section_entry!(Experience, "experience", experience);
section_entry!(Education, "education", education);
section_entry!(Skill, "skills", skills);
section_entry!(Project, "projects", projects);
section_entry!(Achievement, "achievements", achievements);

/// Partial update of the personal block; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

impl PersonalPatch {
    fn apply(self, personal: &mut Personal) {
        let fields = [
            (self.first_name, &mut personal.first_name),
            (self.last_name, &mut personal.last_name),
            (self.title, &mut personal.title),
            (self.email, &mut personal.email),
            (self.phone, &mut personal.phone),
            (self.location, &mut personal.location),
            (self.website, &mut personal.website),
            (self.linkedin, &mut personal.linkedin),
            (self.github, &mut personal.github),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Edits
// ────────────────────────────────────────────────────────────────────────────

impl Document {
    pub fn update_personal(&mut self, patch: PersonalPatch) {
        patch.apply(&mut self.personal);
    }

    pub fn set_summary(&mut self, summary: String) {
        self.summary = summary;
    }

    pub fn set_extras(&mut self, extras: Extras) {
        self.extras = extras;
    }

    /// Appends an entry under a freshly minted id. Any id carried by the
    /// payload is discarded so ids are never reused.
    pub fn add_entry<T: SectionEntry>(&mut self, mut entry: T) -> T {
        entry.set_id(EntryId::new());
        T::list_mut(self).push(entry.clone());
        entry
    }

    /// Replaces the entry with `id` in place, keeping its position and id.
    pub fn update_entry<T: SectionEntry>(
        &mut self,
        id: EntryId,
        mut entry: T,
    ) -> Result<T, DocumentError> {
        let slot = T::list_mut(self)
            .iter_mut()
            .find(|existing| existing.id() == id)
            .ok_or(DocumentError::EntryNotFound {
                section: T::SECTION,
                id,
            })?;
        entry.set_id(id);
        *slot = entry.clone();
        Ok(entry)
    }

    pub fn remove_entry<T: SectionEntry>(&mut self, id: EntryId) -> Result<T, DocumentError> {
        let list = T::list_mut(self);
        let index = list
            .iter()
            .position(|existing| existing.id() == id)
            .ok_or(DocumentError::EntryNotFound {
                section: T::SECTION,
                id,
            })?;
        Ok(list.remove(index))
    }

    pub fn entry<T: SectionEntry>(&self, id: EntryId) -> Option<&T> {
        T::list(self).iter().find(|existing| existing.id() == id)
    }

    pub fn reset(&mut self) {
        *self = Document::default();
    }

    pub fn load_demo(&mut self) {
        *self = demo_document();
    }
}
