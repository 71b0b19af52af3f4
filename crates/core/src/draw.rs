//! Pointer-driven drawing controller
//!
//! Drives one drawing gesture at a time: pointer-down starts a gesture and
//! creates a preview element on the drawing surface, pointer-move reshapes
//! the preview, pointer-up turns the gesture into a document-space
//! annotation and hands it to the store.
//!
//! The anchor is captured in document space so a zoom change mid-gesture
//! cannot shift where the shape started. The preview is rebuilt in view
//! space from the same builders the commit uses.
//!
//! Text-like kinds skip the gesture entirely: the press asks a
//! [`TextPrompt`] for content and commits immediately.

use viewer_core::{to_document_space, to_view_space, DocPoint, Size, ViewPoint};

use crate::annotation::{
    Annotation, AnnotationDraft, AnnotationType, DocumentId, Geometry, Metrics,
};
use crate::config::DrawSettings;
use crate::render::{shape_primitives, Decorations, Drawable};
use crate::shapes::build_shape;
use crate::store::AnnotationStore;

/// Handle for an element created on a [`DrawingSurface`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u64);

/// Retained-mode surface the preview is drawn on
pub trait DrawingSurface {
    /// Current laid-out size; zero on either axis means not ready.
    fn size(&self) -> Size;

    fn create(&mut self, drawables: &[Drawable]) -> ElementId;

    fn update(&mut self, element: ElementId, drawables: &[Drawable]);

    fn remove(&mut self, element: ElementId);
}

/// Asks the user for the text of a text or sticky-note annotation
pub trait TextPrompt {
    /// `None` or blank means the user dismissed the prompt.
    fn ask(&mut self, kind: &AnnotationType) -> Option<String>;
}

/// Computes derived measurement values for new annotations
pub trait MetricsProvider {
    fn metrics(&self, kind: &AnnotationType, geometry: &Geometry) -> Option<Metrics>;
}

/// Active tool of the markup toolbar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tool {
    Select,
    Draw(AnnotationType),
}

/// Collaborators borrowed for the duration of one pointer event
pub struct DrawContext<'a> {
    pub surface: &'a mut dyn DrawingSurface,
    pub store: &'a mut dyn AnnotationStore,
    pub prompt: &'a mut dyn TextPrompt,
    pub metrics: Option<&'a dyn MetricsProvider>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub draft: AnnotationDraft,
    /// `None` when the store rejected the annotation
    pub persisted: Option<Annotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutcome {
    /// Event did not apply in the current state
    Ignored,
    Started,
    Updated,
    Committed(Box<Commit>),
    /// Gesture ended with a zero-size shape
    Discarded,
    Cancelled,
}

#[derive(Debug)]
struct Gesture {
    kind: AnnotationType,
    page: u32,
    anchor: DocPoint,
    current: DocPoint,
    trail: Vec<DocPoint>,
    preview: ElementId,
}

#[derive(Debug, Default)]
enum DrawState {
    #[default]
    Idle,
    Drawing(Gesture),
}

pub struct DrawController {
    document_id: DocumentId,
    author: Option<String>,
    settings: DrawSettings,
    tool: Option<Tool>,
    state: DrawState,
}

impl DrawController {
    pub fn new(document_id: DocumentId, settings: DrawSettings) -> Self {
        Self { document_id, author: None, settings, tool: None, state: DrawState::Idle }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn tool(&self) -> Option<&Tool> {
        self.tool.as_ref()
    }

    /// Switch tools. A gesture already in progress keeps its own kind.
    pub fn set_tool(&mut self, tool: Option<Tool>) {
        self.tool = tool;
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing(_))
    }

    pub fn pointer_down(
        &mut self,
        point: ViewPoint,
        zoom: f64,
        page: u32,
        ctx: &mut DrawContext<'_>,
    ) -> DrawOutcome {
        if self.is_drawing() {
            return DrawOutcome::Ignored;
        }
        let kind = match &self.tool {
            Some(Tool::Draw(kind)) if kind.is_known() => kind.clone(),
            _ => return DrawOutcome::Ignored,
        };
        if ctx.surface.size().is_empty() {
            log::debug!("pointer down before the drawing surface was laid out");
            return DrawOutcome::Ignored;
        }

        let anchor = to_document_space(point, zoom);

        if kind.is_text_like() {
            let content = match ctx.prompt.ask(&kind) {
                Some(text) if !text.trim().is_empty() => text,
                _ => return DrawOutcome::Ignored,
            };
            let Some(geometry) = build_shape(&kind, anchor, anchor, &[]) else {
                return DrawOutcome::Ignored;
            };
            let mut draft = self.draft(kind, page, geometry, ctx);
            draft.content = Some(content);
            return self.persist(draft, ctx);
        }

        let trail = vec![anchor];
        let drawables = self.preview_drawables(&kind, anchor, anchor, &trail, zoom);
        let preview = ctx.surface.create(&drawables);
        log::debug!("started {kind} gesture on page {page} at ({}, {})", anchor.x, anchor.y);
        self.state = DrawState::Drawing(Gesture {
            kind,
            page,
            anchor,
            current: anchor,
            trail,
            preview,
        });
        DrawOutcome::Started
    }

    pub fn pointer_move(
        &mut self,
        point: ViewPoint,
        zoom: f64,
        ctx: &mut DrawContext<'_>,
    ) -> DrawOutcome {
        let DrawState::Drawing(gesture) = &mut self.state else {
            return DrawOutcome::Ignored;
        };
        let current = to_document_space(point, zoom);
        extend_trail(&gesture.kind, &mut gesture.trail, current, zoom, &self.settings, false);
        gesture.current = current;

        let drawables = preview_drawables(
            &self.settings,
            &gesture.kind,
            gesture.anchor,
            gesture.current,
            &gesture.trail,
            zoom,
        );
        ctx.surface.update(gesture.preview, &drawables);
        DrawOutcome::Updated
    }

    pub fn pointer_up(
        &mut self,
        point: ViewPoint,
        zoom: f64,
        ctx: &mut DrawContext<'_>,
    ) -> DrawOutcome {
        let DrawState::Drawing(mut gesture) = std::mem::take(&mut self.state) else {
            return DrawOutcome::Ignored;
        };
        let current = to_document_space(point, zoom);
        extend_trail(&gesture.kind, &mut gesture.trail, current, zoom, &self.settings, true);

        let geometry = build_shape(&gesture.kind, gesture.anchor, current, &gesture.trail)
            .filter(|shape| !shape.is_degenerate());
        let Some(geometry) = geometry else {
            ctx.surface.remove(gesture.preview);
            log::debug!("discarded zero-size {} gesture", gesture.kind);
            return DrawOutcome::Discarded;
        };

        let draft = self.draft(gesture.kind, gesture.page, geometry, ctx);
        let outcome = self.persist(draft, ctx);
        ctx.surface.remove(gesture.preview);
        outcome
    }

    /// Abort the gesture in progress and drop its preview.
    pub fn cancel(&mut self, ctx: &mut DrawContext<'_>) -> DrawOutcome {
        match std::mem::take(&mut self.state) {
            DrawState::Drawing(gesture) => {
                ctx.surface.remove(gesture.preview);
                DrawOutcome::Cancelled
            }
            DrawState::Idle => DrawOutcome::Ignored,
        }
    }

    fn preview_drawables(
        &self,
        kind: &AnnotationType,
        anchor: DocPoint,
        current: DocPoint,
        trail: &[DocPoint],
        zoom: f64,
    ) -> Vec<Drawable> {
        preview_drawables(&self.settings, kind, anchor, current, trail, zoom)
    }

    fn draft(
        &self,
        kind: AnnotationType,
        page: u32,
        geometry: Geometry,
        ctx: &DrawContext<'_>,
    ) -> AnnotationDraft {
        let metrics = ctx.metrics.and_then(|provider| provider.metrics(&kind, &geometry));
        let style = self.settings.style_for(&kind);
        let mut draft = AnnotationDraft::new(self.document_id.clone(), page, kind, geometry, style);
        draft.metrics = metrics;
        draft.author = self.author.clone();
        draft
    }

    /// Hand the draft to the store. A failure is logged; the commit still
    /// counts locally.
    fn persist(&self, draft: AnnotationDraft, ctx: &mut DrawContext<'_>) -> DrawOutcome {
        let persisted = match ctx.store.create(draft.clone()) {
            Ok(annotation) => {
                log::info!("saved {} annotation {} on page {}", draft.kind, annotation.id(), draft.page);
                Some(annotation)
            }
            Err(err) => {
                log::warn!("failed to save {} annotation on page {}: {err}", draft.kind, draft.page);
                None
            }
        };
        DrawOutcome::Committed(Box::new(Commit { draft, persisted }))
    }
}

/// Freehand keeps every sample; polyline only samples that moved far enough
/// on screen from the last vertex. The release point always closes the path.
fn extend_trail(
    kind: &AnnotationType,
    trail: &mut Vec<DocPoint>,
    point: DocPoint,
    zoom: f64,
    settings: &DrawSettings,
    release: bool,
) {
    let keep = match kind {
        AnnotationType::Freehand => true,
        AnnotationType::Polyline => match trail.last() {
            Some(last) if release => *last != point,
            Some(last) => last.distance_to(&point) * zoom >= settings.polyline_min_segment,
            None => true,
        },
        _ => false,
    };
    if keep && trail.last() != Some(&point) {
        trail.push(point);
    }
}

fn preview_drawables(
    settings: &DrawSettings,
    kind: &AnnotationType,
    anchor: DocPoint,
    current: DocPoint,
    trail: &[DocPoint],
    zoom: f64,
) -> Vec<Drawable> {
    let view_trail: Vec<ViewPoint> = trail.iter().map(|p| to_view_space(*p, zoom)).collect();
    let Some(shape) = build_shape(
        kind,
        to_view_space(anchor, zoom),
        to_view_space(current, zoom),
        &view_trail,
    ) else {
        return Vec::new();
    };
    let style = settings.style_for(kind);
    shape_primitives(kind, &shape, &style, zoom, Decorations::default())
        .into_iter()
        .map(|(primitive, paint)| Drawable { annotation_id: None, primitive, paint })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationId, AnnotationPatch};
    use crate::render::Primitive;
    use crate::shapes::Shape;
    use crate::store::{MemoryStore, StoreError, StoreResult};
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct RecordingSurface {
        size: Size,
        next: u64,
        elements: BTreeMap<ElementId, Vec<Drawable>>,
        created: usize,
    }

    impl RecordingSurface {
        fn ready() -> Self {
            Self { size: Size::new(800.0, 600.0), ..Self::default() }
        }
    }

    impl DrawingSurface for RecordingSurface {
        fn size(&self) -> Size {
            self.size
        }

        fn create(&mut self, drawables: &[Drawable]) -> ElementId {
            self.next += 1;
            self.created += 1;
            let id = ElementId(self.next);
            self.elements.insert(id, drawables.to_vec());
            id
        }

        fn update(&mut self, element: ElementId, drawables: &[Drawable]) {
            self.elements.insert(element, drawables.to_vec());
        }

        fn remove(&mut self, element: ElementId) {
            self.elements.remove(&element);
        }
    }

    struct Answer(Option<&'static str>);

    impl TextPrompt for Answer {
        fn ask(&mut self, _kind: &AnnotationType) -> Option<String> {
            self.0.map(str::to_owned)
        }
    }

    struct BrokenStore;

    impl AnnotationStore for BrokenStore {
        fn create(&mut self, _draft: AnnotationDraft) -> StoreResult<Annotation> {
            Err(StoreError::Backend("offline".into()))
        }

        fn update(&mut self, id: &AnnotationId, _patch: AnnotationPatch) -> StoreResult<Annotation> {
            Err(StoreError::NotFound(id.clone()))
        }

        fn delete(&mut self, id: &AnnotationId) -> StoreResult<()> {
            Err(StoreError::NotFound(id.clone()))
        }

        fn list(&self, _document_id: &DocumentId) -> StoreResult<Vec<Annotation>> {
            Ok(Vec::new())
        }
    }

    struct FixedLength;

    impl MetricsProvider for FixedLength {
        fn metrics(&self, _kind: &AnnotationType, _geometry: &Geometry) -> Option<Metrics> {
            Some(Metrics { text: Some("1 ft".into()), ..Default::default() })
        }
    }

    fn controller(kind: AnnotationType) -> DrawController {
        let mut controller = DrawController::new(DocumentId::new("doc"), DrawSettings::default());
        controller.set_tool(Some(Tool::Draw(kind)));
        controller
    }

    fn committed(outcome: DrawOutcome) -> Commit {
        match outcome {
            DrawOutcome::Committed(commit) => *commit,
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn rectangle_gesture_commits_document_space_box() {
        let mut surface = RecordingSurface::ready();
        let mut store = MemoryStore::new();
        let mut prompt = Answer(None);
        let mut ctx = DrawContext { surface: &mut surface, store: &mut store, prompt: &mut prompt, metrics: None };
        let mut draw = controller(AnnotationType::Rectangle);

        assert_eq!(draw.pointer_down(ViewPoint::new(100.0, 100.0), 1.0, 1, &mut ctx), DrawOutcome::Started);
        assert!(draw.is_drawing());
        assert_eq!(draw.pointer_move(ViewPoint::new(150.0, 130.0), 1.0, &mut ctx), DrawOutcome::Updated);
        let commit = committed(draw.pointer_up(ViewPoint::new(150.0, 130.0), 1.0, &mut ctx));

        assert_eq!(
            commit.draft.geometry,
            Shape::Box { origin: DocPoint::new(100.0, 100.0), width: 50.0, height: 30.0 }
        );
        assert_eq!(commit.draft.page, 1);
        assert!(commit.persisted.is_some());
        assert!(!draw.is_drawing());
        assert!(surface.elements.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn preview_is_drawn_in_view_space() {
        let mut surface = RecordingSurface::ready();
        let mut store = MemoryStore::new();
        let mut prompt = Answer(None);
        let mut ctx = DrawContext { surface: &mut surface, store: &mut store, prompt: &mut prompt, metrics: None };
        let mut draw = controller(AnnotationType::Rectangle);

        draw.pointer_down(ViewPoint::new(200.0, 200.0), 2.0, 1, &mut ctx);
        draw.pointer_move(ViewPoint::new(300.0, 260.0), 2.0, &mut ctx);

        let preview = surface.elements.values().next().expect("preview element");
        assert_eq!(preview[0].primitive, Primitive::Rect { x: 200.0, y: 200.0, width: 100.0, height: 60.0 });
        assert!(preview[0].annotation_id.is_none());
    }

    #[test]
    fn zoom_change_mid_gesture_keeps_document_anchor() {
        let mut surface = RecordingSurface::ready();
        let mut store = MemoryStore::new();
        let mut prompt = Answer(None);
        let mut ctx = DrawContext { surface: &mut surface, store: &mut store, prompt: &mut prompt, metrics: None };
        let mut draw = controller(AnnotationType::Line);

        draw.pointer_down(ViewPoint::new(20.0, 20.0), 2.0, 1, &mut ctx);
        let commit = committed(draw.pointer_up(ViewPoint::new(30.0, 10.0), 1.0, &mut ctx));
        assert_eq!(
            commit.draft.geometry,
            Shape::Segment { start: DocPoint::new(10.0, 10.0), end: DocPoint::new(30.0, 10.0) }
        );
    }

    #[test]
    fn zero_size_gesture_is_discarded() {
        let mut surface = RecordingSurface::ready();
        let mut store = MemoryStore::new();
        let mut prompt = Answer(None);
        let mut ctx = DrawContext { surface: &mut surface, store: &mut store, prompt: &mut prompt, metrics: None };
        let mut draw = controller(AnnotationType::Circle);

        draw.pointer_down(ViewPoint::new(50.0, 50.0), 1.0, 1, &mut ctx);
        assert_eq!(draw.pointer_up(ViewPoint::new(50.0, 50.0), 1.0, &mut ctx), DrawOutcome::Discarded);
        assert!(store.is_empty());
        assert!(surface.elements.is_empty());
    }

    #[test]
    fn events_without_gesture_or_tool_are_ignored() {
        let mut surface = RecordingSurface::ready();
        let mut store = MemoryStore::new();
        let mut prompt = Answer(None);
        let mut ctx = DrawContext { surface: &mut surface, store: &mut store, prompt: &mut prompt, metrics: None };

        let mut draw = DrawController::new(DocumentId::new("doc"), DrawSettings::default());
        assert_eq!(draw.pointer_down(ViewPoint::new(1.0, 1.0), 1.0, 1, &mut ctx), DrawOutcome::Ignored);
        draw.set_tool(Some(Tool::Select));
        assert_eq!(draw.pointer_down(ViewPoint::new(1.0, 1.0), 1.0, 1, &mut ctx), DrawOutcome::Ignored);
        assert_eq!(draw.pointer_move(ViewPoint::new(2.0, 2.0), 1.0, &mut ctx), DrawOutcome::Ignored);
        assert_eq!(draw.pointer_up(ViewPoint::new(2.0, 2.0), 1.0, &mut ctx), DrawOutcome::Ignored);
        assert_eq!(draw.cancel(&mut ctx), DrawOutcome::Ignored);

        draw.set_tool(Some(Tool::Draw(AnnotationType::Other("stamp".into()))));
        assert_eq!(draw.pointer_down(ViewPoint::new(1.0, 1.0), 1.0, 1, &mut ctx), DrawOutcome::Ignored);
        assert_eq!(surface.created, 0);
    }

    #[test]
    fn surface_without_layout_ignores_press() {
        let mut surface = RecordingSurface::default();
        let mut store = MemoryStore::new();
        let mut prompt = Answer(None);
        let mut ctx = DrawContext { surface: &mut surface, store: &mut store, prompt: &mut prompt, metrics: None };
        let mut draw = controller(AnnotationType::Rectangle);

        assert_eq!(draw.pointer_down(ViewPoint::new(1.0, 1.0), 1.0, 1, &mut ctx), DrawOutcome::Ignored);
        assert!(!draw.is_drawing());
    }

    #[test]
    fn second_press_during_gesture_is_ignored() {
        let mut surface = RecordingSurface::ready();
        let mut store = MemoryStore::new();
        let mut prompt = Answer(None);
        let mut ctx = DrawContext { surface: &mut surface, store: &mut store, prompt: &mut prompt, metrics: None };
        let mut draw = controller(AnnotationType::Rectangle);

        draw.pointer_down(ViewPoint::new(1.0, 1.0), 1.0, 1, &mut ctx);
        assert_eq!(draw.pointer_down(ViewPoint::new(5.0, 5.0), 1.0, 1, &mut ctx), DrawOutcome::Ignored);
        assert_eq!(surface.created, 1);
    }

    #[test]
    fn cancel_removes_preview_without_saving() {
        let mut surface = RecordingSurface::ready();
        let mut store = MemoryStore::new();
        let mut prompt = Answer(None);
        let mut ctx = DrawContext { surface: &mut surface, store: &mut store, prompt: &mut prompt, metrics: None };
        let mut draw = controller(AnnotationType::Ellipse);

        draw.pointer_down(ViewPoint::new(10.0, 10.0), 1.0, 1, &mut ctx);
        draw.pointer_move(ViewPoint::new(40.0, 30.0), 1.0, &mut ctx);
        assert_eq!(draw.cancel(&mut ctx), DrawOutcome::Cancelled);
        assert!(!draw.is_drawing());
        assert!(surface.elements.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn text_tool_prompts_and_commits_on_press() {
        let mut surface = RecordingSurface::ready();
        let mut store = MemoryStore::new();
        let mut prompt = Answer(Some("Check this"));
        let mut ctx = DrawContext { surface: &mut surface, store: &mut store, prompt: &mut prompt, metrics: None };
        let mut draw = controller(AnnotationType::Text).with_author("sam");

        let commit = committed(draw.pointer_down(ViewPoint::new(40.0, 60.0), 2.0, 3, &mut ctx));
        assert_eq!(commit.draft.geometry, Shape::Anchor { position: DocPoint::new(20.0, 30.0) });
        assert_eq!(commit.draft.content.as_deref(), Some("Check this"));
        assert_eq!(commit.draft.author.as_deref(), Some("sam"));
        assert!(!draw.is_drawing());
        assert_eq!(surface.created, 0);
    }

    #[test]
    fn dismissed_prompt_creates_nothing() {
        let mut surface = RecordingSurface::ready();
        let mut store = MemoryStore::new();
        let mut prompt = Answer(Some("   "));
        let mut ctx = DrawContext { surface: &mut surface, store: &mut store, prompt: &mut prompt, metrics: None };
        let mut draw = controller(AnnotationType::StickyNote);

        assert_eq!(draw.pointer_down(ViewPoint::new(4.0, 4.0), 1.0, 1, &mut ctx), DrawOutcome::Ignored);
        assert!(store.is_empty());
    }

    #[test]
    fn store_failure_still_commits_locally() {
        let mut surface = RecordingSurface::ready();
        let mut store = BrokenStore;
        let mut prompt = Answer(None);
        let mut ctx = DrawContext { surface: &mut surface, store: &mut store, prompt: &mut prompt, metrics: None };
        let mut draw = controller(AnnotationType::Highlight);

        draw.pointer_down(ViewPoint::new(0.0, 0.0), 1.0, 1, &mut ctx);
        let commit = committed(draw.pointer_up(ViewPoint::new(80.0, 12.0), 1.0, &mut ctx));
        assert!(commit.persisted.is_none());
        assert_eq!(commit.draft.kind, AnnotationType::Highlight);
        assert!(surface.elements.is_empty());
        assert!(!draw.is_drawing());
    }

    #[test]
    fn metrics_provider_fills_draft() {
        let mut surface = RecordingSurface::ready();
        let mut store = MemoryStore::new();
        let mut prompt = Answer(None);
        let provider = FixedLength;
        let mut ctx = DrawContext {
            surface: &mut surface,
            store: &mut store,
            prompt: &mut prompt,
            metrics: Some(&provider),
        };
        let mut draw = controller(AnnotationType::Measurement);

        draw.pointer_down(ViewPoint::new(0.0, 0.0), 1.0, 1, &mut ctx);
        let commit = committed(draw.pointer_up(ViewPoint::new(100.0, 0.0), 1.0, &mut ctx));
        assert_eq!(commit.draft.metrics.and_then(|m| m.text).as_deref(), Some("1 ft"));
        assert_eq!(commit.draft.style.color, "#ff6b00");
    }

    #[test]
    fn freehand_records_every_sample() {
        let mut surface = RecordingSurface::ready();
        let mut store = MemoryStore::new();
        let mut prompt = Answer(None);
        let mut ctx = DrawContext { surface: &mut surface, store: &mut store, prompt: &mut prompt, metrics: None };
        let mut draw = controller(AnnotationType::Freehand);

        draw.pointer_down(ViewPoint::new(0.0, 0.0), 1.0, 1, &mut ctx);
        draw.pointer_move(ViewPoint::new(1.0, 0.0), 1.0, &mut ctx);
        draw.pointer_move(ViewPoint::new(2.0, 1.0), 1.0, &mut ctx);
        let commit = committed(draw.pointer_up(ViewPoint::new(3.0, 1.0), 1.0, &mut ctx));
        let Shape::Path { points } = commit.draft.geometry else { panic!("expected path") };
        assert_eq!(points.len(), 4);
    }

    #[test]
    fn polyline_skips_short_moves_but_keeps_release_point() {
        let mut surface = RecordingSurface::ready();
        let mut store = MemoryStore::new();
        let mut prompt = Answer(None);
        let mut ctx = DrawContext { surface: &mut surface, store: &mut store, prompt: &mut prompt, metrics: None };
        let mut draw = controller(AnnotationType::Polyline);

        draw.pointer_down(ViewPoint::new(0.0, 0.0), 1.0, 1, &mut ctx);
        draw.pointer_move(ViewPoint::new(3.0, 0.0), 1.0, &mut ctx);
        draw.pointer_move(ViewPoint::new(20.0, 0.0), 1.0, &mut ctx);
        draw.pointer_move(ViewPoint::new(22.0, 4.0), 1.0, &mut ctx);
        let commit = committed(draw.pointer_up(ViewPoint::new(24.0, 5.0), 1.0, &mut ctx));
        let Shape::Path { points } = commit.draft.geometry else { panic!("expected path") };
        assert_eq!(
            points,
            vec![DocPoint::new(0.0, 0.0), DocPoint::new(20.0, 0.0), DocPoint::new(24.0, 5.0)]
        );
    }

    #[test]
    fn tool_switch_mid_gesture_applies_to_next_gesture() {
        let mut surface = RecordingSurface::ready();
        let mut store = MemoryStore::new();
        let mut prompt = Answer(None);
        let mut ctx = DrawContext { surface: &mut surface, store: &mut store, prompt: &mut prompt, metrics: None };
        let mut draw = controller(AnnotationType::Rectangle);

        draw.pointer_down(ViewPoint::new(0.0, 0.0), 1.0, 1, &mut ctx);
        draw.set_tool(Some(Tool::Draw(AnnotationType::Circle)));
        let commit = committed(draw.pointer_up(ViewPoint::new(10.0, 10.0), 1.0, &mut ctx));
        assert_eq!(commit.draft.kind, AnnotationType::Rectangle);
        assert_eq!(draw.tool(), Some(&Tool::Draw(AnnotationType::Circle)));
    }
}
