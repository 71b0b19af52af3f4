//! Annotation data model
//!
//! Annotations pair typed document-space geometry with style and content.
//! Ids and timestamps are assigned by the persistence layer, so a freshly
//! drawn shape starts life as an [`AnnotationDraft`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use viewer_core::{DocPoint, DocumentSpace};

use crate::shapes::Shape;

pub use doc_model::{AnnotationId, AnnotationType, DocumentId, Metrics, StyleRecord as Style};

/// Geometry as stored: always document space.
pub type Geometry = Shape<DocumentSpace>;

/// Average glyph advance relative to the font size, used to size text hit boxes.
const GLYPH_WIDTH_RATIO: f64 = 0.6;
const DEFAULT_FONT_SIZE: f64 = 16.0;

/// An annotation that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDraft {
    pub document_id: DocumentId,
    /// 1-based page number
    pub page: u32,
    pub kind: AnnotationType,
    pub geometry: Geometry,
    pub style: Style,
    pub content: Option<String>,
    pub metrics: Option<Metrics>,
    pub is_visible: bool,
    pub author: Option<String>,
}

impl AnnotationDraft {
    /// Create a visible draft with no content, metrics or author
    pub fn new(
        document_id: DocumentId,
        page: u32,
        kind: AnnotationType,
        geometry: Geometry,
        style: Style,
    ) -> Self {
        Self {
            document_id,
            page,
            kind,
            geometry,
            style,
            content: None,
            metrics: None,
            is_visible: true,
            author: None,
        }
    }
}

/// Partial update applied by [`Annotation::apply`]
///
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationPatch {
    pub geometry: Option<Geometry>,
    pub style: Option<Style>,
    pub content: Option<String>,
    pub metrics: Option<Metrics>,
    pub is_visible: Option<bool>,
}

impl AnnotationPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A persisted annotation
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    id: AnnotationId,
    document_id: DocumentId,
    page: u32,
    kind: AnnotationType,
    geometry: Geometry,
    style: Style,
    content: Option<String>,
    metrics: Option<Metrics>,
    visible: bool,
    author: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl Annotation {
    /// Promote a draft once the store has assigned it an id
    pub fn from_draft(id: AnnotationId, draft: AnnotationDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            document_id: draft.document_id,
            page: draft.page,
            kind: draft.kind,
            geometry: draft.geometry,
            style: draft.style,
            content: draft.content,
            metrics: draft.metrics,
            visible: draft.is_visible,
            author: draft.author,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Rebuild an annotation loaded from storage, keeping its timestamps
    pub(crate) fn restore(
        id: AnnotationId,
        draft: AnnotationDraft,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        let mut annotation = Self::from_draft(id, draft, Utc::now());
        annotation.created_at = created_at;
        annotation.updated_at = updated_at;
        annotation
    }

    pub fn id(&self) -> &AnnotationId {
        &self.id
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    /// 1-based page number
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn kind(&self) -> &AnnotationType {
        &self.kind
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn metrics(&self) -> Option<&Metrics> {
        self.metrics.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Copy of the editable part, without id or timestamps
    pub fn to_draft(&self) -> AnnotationDraft {
        AnnotationDraft {
            document_id: self.document_id.clone(),
            page: self.page,
            kind: self.kind.clone(),
            geometry: self.geometry.clone(),
            style: self.style.clone(),
            content: self.content.clone(),
            metrics: self.metrics.clone(),
            is_visible: self.visible,
            author: self.author.clone(),
        }
    }

    /// Apply a partial update and bump `updated_at`
    pub fn apply(&mut self, patch: AnnotationPatch, now: DateTime<Utc>) {
        if let Some(geometry) = patch.geometry {
            self.geometry = geometry;
        }
        if let Some(style) = patch.style {
            self.style = style;
        }
        if let Some(content) = patch.content {
            self.content = Some(content);
        }
        if let Some(metrics) = patch.metrics {
            self.metrics = Some(metrics);
        }
        if let Some(visible) = patch.is_visible {
            self.visible = visible;
        }
        self.updated_at = Some(now);
    }

    /// Bounding box in document space
    ///
    /// Text annotations are sized from their content and font size, since
    /// the anchor alone has no extent.
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        match (&self.geometry, self.content.as_deref()) {
            (Shape::Anchor { position }, Some(text)) if self.kind == AnnotationType::Text => {
                let font_size = self.style.font_size.unwrap_or(DEFAULT_FONT_SIZE);
                let width = text.chars().count() as f64 * font_size * GLYPH_WIDTH_RATIO;
                // Text is drawn with its baseline at the anchor
                (position.x, position.y - font_size, position.x + width, position.y)
            }
            _ => self.geometry.bounding_box(),
        }
    }

    /// Check if a point hits this annotation (for selection)
    pub fn hit_test(&self, point: &DocPoint, tolerance: f64) -> bool {
        if !self.visible {
            return false;
        }
        match self.geometry {
            Shape::Anchor { .. } => {
                let (min_x, min_y, max_x, max_y) = self.bounding_box();
                point.x >= min_x - tolerance
                    && point.x <= max_x + tolerance
                    && point.y >= min_y - tolerance
                    && point.y <= max_y + tolerance
            }
            _ => self.geometry.contains_point(point, tolerance),
        }
    }
}

/// Annotations of one document, grouped by page
///
/// Every mutation bumps [`revision`](Self::revision) so renderers can tell
/// when their cached output is stale. Within a page, annotations keep their
/// insertion order, which is also their paint order.
#[derive(Debug, Default)]
pub struct AnnotationCollection {
    annotations: HashMap<AnnotationId, Annotation>,
    by_page: HashMap<u32, Vec<AnnotationId>>,
    revision: u64,
}

impl AnnotationCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from a store listing, keeping list order
    pub fn from_annotations(annotations: impl IntoIterator<Item = Annotation>) -> Self {
        let mut collection = Self::new();
        for annotation in annotations {
            collection.add(annotation);
        }
        collection
    }

    /// Monotonic change counter
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Add an annotation, replacing any existing one with the same id
    pub fn add(&mut self, annotation: Annotation) {
        let id = annotation.id().clone();
        if let Some(previous) = self.annotations.get(&id) {
            if previous.page() != annotation.page() {
                let old_page = previous.page();
                self.unlink(&id, old_page);
                self.by_page.entry(annotation.page()).or_default().push(id.clone());
            }
        } else {
            self.by_page.entry(annotation.page()).or_default().push(id.clone());
        }
        self.annotations.insert(id, annotation);
        self.revision += 1;
    }

    /// Remove an annotation by id
    pub fn remove(&mut self, id: &AnnotationId) -> Option<Annotation> {
        let annotation = self.annotations.remove(id)?;
        self.unlink(id, annotation.page());
        self.revision += 1;
        Some(annotation)
    }

    /// Apply a patch in place, returning false when the id is unknown
    pub fn update(&mut self, id: &AnnotationId, patch: AnnotationPatch) -> bool {
        match self.annotations.get_mut(id) {
            Some(annotation) => {
                annotation.apply(patch, Utc::now());
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    fn unlink(&mut self, id: &AnnotationId, page: u32) {
        if let Some(ids) = self.by_page.get_mut(&page) {
            ids.retain(|aid| aid != id);
            if ids.is_empty() {
                self.by_page.remove(&page);
            }
        }
    }

    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.annotations.get(id)
    }

    /// Annotations on a page in paint order
    pub fn page_annotations(&self, page: u32) -> Vec<&Annotation> {
        self.by_page
            .get(&page)
            .map(|ids| ids.iter().filter_map(|id| self.annotations.get(id)).collect())
            .unwrap_or_default()
    }

    /// All annotations, ordered by page then paint order
    pub fn all(&self) -> Vec<&Annotation> {
        let mut pages: Vec<u32> = self.by_page.keys().copied().collect();
        pages.sort_unstable();
        pages.into_iter().flat_map(|page| self.page_annotations(page)).collect()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn clear(&mut self) {
        self.annotations.clear();
        self.by_page.clear();
        self.revision += 1;
    }

    /// Hit test to find annotations at a point on a page
    ///
    /// The first result is the topmost (last painted) annotation.
    pub fn hit_test(&self, page: u32, point: &DocPoint, tolerance: f64) -> Vec<&Annotation> {
        let mut hits: Vec<&Annotation> = self
            .page_annotations(page)
            .into_iter()
            .filter(|a| a.hit_test(point, tolerance))
            .collect();
        hits.reverse();
        hits
    }
}
