//! Markup Core Library
//!
//! Annotation model, shape builders, the drawing controller and the renderer
//! for the PDF markup viewer. Geometry is stored in document space (zoom 1)
//! and scaled into view space only for drawing.

pub mod annotation;
pub mod calibration;
pub mod config;
pub mod draw;
pub mod exchange;
pub mod notes;
pub mod render;
pub mod shapes;
pub mod store;
pub mod svg;
pub mod wire;

pub use annotation::{
    Annotation, AnnotationCollection, AnnotationDraft, AnnotationId, AnnotationPatch,
    AnnotationType, DocumentId, Geometry, Metrics, Style,
};
pub use calibration::{Calibration, CalibrationError};
pub use config::{DrawSettings, MarkupSettings};
pub use draw::{
    Commit, DrawContext, DrawController, DrawOutcome, DrawingSurface, ElementId, MetricsProvider,
    TextPrompt, Tool,
};
pub use exchange::{
    export_annotations, export_json, import_json, read_annotations, ExchangeError, Import, ImportStats,
};
pub use notes::{parse_mentions, ProjectNote};
pub use render::{render_annotation, render_page, Drawable, Overlay, Paint, Primitive};
pub use shapes::{build_shape, ArcShape, Shape};
pub use store::{new_annotation_id, AnnotationStore, MemoryStore, StoreError, StoreResult};
pub use svg::{render_svg, SvgSurface};
pub use wire::{annotation_from_record, annotation_to_record, WireError};
