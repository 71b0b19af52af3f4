//! Annotation persistence seam.
//!
//! The drawing controller only needs create; viewers use list to (re)load a
//! document and update/delete for edits.

use chrono::Utc;
use thiserror::Error;

use crate::annotation::{Annotation, AnnotationDraft, AnnotationId, AnnotationPatch, DocumentId};
use crate::wire::WireError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("annotation {0} not found")]
    NotFound(AnnotationId),
    #[error("stored annotation is invalid: {0}")]
    Invalid(#[from] WireError),
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("{0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait AnnotationStore {
    /// Persist a draft; the store assigns the id and timestamps.
    fn create(&mut self, draft: AnnotationDraft) -> StoreResult<Annotation>;

    fn update(&mut self, id: &AnnotationId, patch: AnnotationPatch) -> StoreResult<Annotation>;

    fn delete(&mut self, id: &AnnotationId) -> StoreResult<()>;

    /// Every annotation of a document in creation order.
    fn list(&self, document_id: &DocumentId) -> StoreResult<Vec<Annotation>>;
}

/// Fresh random annotation id.
pub fn new_annotation_id() -> AnnotationId {
    AnnotationId::new(uuid::Uuid::new_v4().to_string())
}

/// In-process store, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    annotations: Vec<Annotation>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

impl AnnotationStore for MemoryStore {
    fn create(&mut self, draft: AnnotationDraft) -> StoreResult<Annotation> {
        let annotation = Annotation::from_draft(new_annotation_id(), draft, Utc::now());
        self.annotations.push(annotation.clone());
        Ok(annotation)
    }

    fn update(&mut self, id: &AnnotationId, patch: AnnotationPatch) -> StoreResult<Annotation> {
        let annotation = self
            .annotations
            .iter_mut()
            .find(|a| a.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        annotation.apply(patch, Utc::now());
        Ok(annotation.clone())
    }

    fn delete(&mut self, id: &AnnotationId) -> StoreResult<()> {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id() != id);
        if self.annotations.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    fn list(&self, document_id: &DocumentId) -> StoreResult<Vec<Annotation>> {
        Ok(self
            .annotations
            .iter()
            .filter(|a| a.document_id() == document_id)
            .cloned()
            .collect())
    }
}
