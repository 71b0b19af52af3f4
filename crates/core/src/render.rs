//! Annotation rendering
//!
//! Turns annotations into backend-neutral drawables in view space. The same
//! per-kind mapping is used for stored annotations and for the live preview
//! of a gesture, so a committed shape looks exactly like its preview did.
//!
//! Rendering is a pure function of (annotations, page, zoom). [`Overlay`]
//! caches the last output and only recomputes when one of those changes.

use std::f64::consts::PI;

use viewer_core::{Point, ViewPoint, ViewSpace};

use crate::annotation::{Annotation, AnnotationCollection, AnnotationId, AnnotationType, Style};
use crate::shapes::{format_number, ArcShape, Shape};

const DEFAULT_STROKE_WIDTH: f64 = 2.0;
const DEFAULT_FONT_SIZE: f64 = 16.0;
const DEFAULT_STICKY_FILL: &str = "#ffd54f";

/// On-screen size of the sticky note marker, independent of zoom
const STICKY_NOTE_SIZE: f64 = 24.0;
const ARROW_HEAD_LENGTH: f64 = 12.0;
const ARROW_HEAD_HALF_ANGLE: f64 = PI / 6.0;
const LABEL_FONT_SIZE: f64 = 12.0;
const LABEL_OFFSET: f64 = 6.0;
/// Approximate chord of one cloud scallop in view pixels
const SCALLOP_LENGTH: f64 = 12.0;
/// Longer edges get wider scallops instead of more of them
const MAX_SCALLOPS_PER_EDGE: f64 = 256.0;

/// A single drawing primitive in view-space pixels
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Circle { cx: f64, cy: f64, r: f64 },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// Text with its baseline starting at (x, y)
    Text { x: f64, y: f64, content: String },
    /// SVG path data
    Path { d: String },
}

/// Resolved paint for a primitive
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub stroke: Option<String>,
    pub fill: Option<String>,
    pub stroke_width: f64,
    pub opacity: f64,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub dashed: bool,
}

impl Paint {
    fn stroked(color: &str, width: f64, opacity: f64) -> Self {
        Self {
            stroke: Some(color.to_owned()),
            fill: None,
            stroke_width: width,
            opacity,
            font_size: None,
            font_family: None,
            dashed: false,
        }
    }

    fn filled(color: &str, opacity: f64) -> Self {
        Self { stroke: None, fill: Some(color.to_owned()), stroke_width: 0.0, ..Self::stroked(color, 0.0, opacity) }
    }

    fn text(color: &str, font_size: f64, font_family: Option<String>, opacity: f64) -> Self {
        Self { font_size: Some(font_size), font_family, ..Self::filled(color, opacity) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    /// Owning annotation; `None` for gesture previews
    pub annotation_id: Option<AnnotationId>,
    pub primitive: Primitive,
    pub paint: Paint,
}

/// What to draw beside the geometry
#[derive(Debug, Clone, Copy, Default)]
pub struct Decorations<'a> {
    pub content: Option<&'a str>,
    pub label: Option<&'a str>,
}

/// Map one view-space shape of `kind` to primitives.
///
/// Returns nothing for unknown kinds and for shapes that do not fit the kind.
pub fn shape_primitives(
    kind: &AnnotationType,
    shape: &Shape<ViewSpace>,
    style: &Style,
    zoom: f64,
    decorations: Decorations<'_>,
) -> Vec<(Primitive, Paint)> {
    let stroke_color = style.stroke_color.as_deref().unwrap_or(&style.color);
    let stroke_width = style.stroke_width.unwrap_or(DEFAULT_STROKE_WIDTH);
    let outline = || {
        let mut paint = Paint::stroked(stroke_color, stroke_width, style.opacity);
        paint.fill = style.fill_color.clone();
        paint
    };
    let line = || Paint::stroked(stroke_color, stroke_width, style.opacity);

    match (kind, shape) {
        (AnnotationType::Highlight, Shape::Box { origin, width, height }) => {
            let fill = style.fill_color.as_deref().unwrap_or(&style.color);
            vec![(
                Primitive::Rect { x: origin.x, y: origin.y, width: *width, height: *height },
                Paint::filled(fill, style.opacity),
            )]
        }
        (AnnotationType::Rectangle, Shape::Box { origin, width, height }) => vec![(
            Primitive::Rect { x: origin.x, y: origin.y, width: *width, height: *height },
            outline(),
        )],
        (AnnotationType::Circle, Shape::Circle { center, radius }) => {
            vec![(Primitive::Circle { cx: center.x, cy: center.y, r: *radius }, outline())]
        }
        (AnnotationType::Ellipse, Shape::Ellipse { center, rx, ry }) => vec![(
            Primitive::Ellipse { cx: center.x, cy: center.y, rx: *rx, ry: *ry },
            outline(),
        )],
        (AnnotationType::Line, Shape::Segment { start, end }) => vec![(segment(start, end), line())],
        (AnnotationType::Arrow, Shape::Segment { start, end }) => {
            let mut head = Paint::filled(stroke_color, style.opacity);
            head.stroke = Some(stroke_color.to_owned());
            head.stroke_width = stroke_width;
            let mut out = vec![(segment(start, end), line())];
            if let Some(d) = arrow_head(start, end) {
                out.push((Primitive::Path { d }, head));
            }
            out
        }
        (AnnotationType::Measurement | AnnotationType::Calibrate, Shape::Segment { start, end }) => {
            let mut paint = line();
            paint.dashed = *kind == AnnotationType::Calibrate;
            let mut out = vec![(segment(start, end), paint)];
            if let Some(label) = decorations.label {
                let mid = start.midpoint(end);
                out.push((
                    Primitive::Text { x: mid.x, y: mid.y - LABEL_OFFSET, content: label.to_owned() },
                    Paint::text(stroke_color, LABEL_FONT_SIZE, None, style.opacity),
                ));
            }
            out
        }
        (AnnotationType::Arc, Shape::Arc(arc)) => {
            vec![(Primitive::Path { d: arc_path(arc) }, line())]
        }
        (AnnotationType::Cloud, Shape::Path { points }) if points.len() >= 2 => {
            vec![(Primitive::Path { d: cloud_path(points) }, outline())]
        }
        (AnnotationType::Freehand | AnnotationType::Polyline, Shape::Path { points })
            if !points.is_empty() =>
        {
            vec![(Primitive::Path { d: polyline_path(points) }, line())]
        }
        (AnnotationType::Text, Shape::Anchor { position }) => match decorations.content {
            Some(content) if !content.is_empty() => {
                let font_size = style.font_size.unwrap_or(DEFAULT_FONT_SIZE) * zoom;
                vec![(
                    Primitive::Text { x: position.x, y: position.y, content: content.to_owned() },
                    Paint::text(&style.color, font_size, style.font_family.clone(), style.opacity),
                )]
            }
            _ => Vec::new(),
        },
        (AnnotationType::StickyNote, Shape::Anchor { position }) => {
            let mut paint = Paint::filled(
                style.fill_color.as_deref().unwrap_or(DEFAULT_STICKY_FILL),
                style.opacity,
            );
            paint.stroke = Some(stroke_color.to_owned());
            paint.stroke_width = 1.0;
            vec![(
                Primitive::Rect {
                    x: position.x,
                    y: position.y,
                    width: STICKY_NOTE_SIZE,
                    height: STICKY_NOTE_SIZE,
                },
                paint,
            )]
        }
        _ => Vec::new(),
    }
}

fn segment(start: &ViewPoint, end: &ViewPoint) -> Primitive {
    Primitive::Line { x1: start.x, y1: start.y, x2: end.x, y2: end.y }
}

fn arrow_head(start: &ViewPoint, end: &ViewPoint) -> Option<String> {
    let length = start.distance_to(end);
    if length <= f64::EPSILON {
        return None;
    }
    let angle = (end.y - start.y).atan2(end.x - start.x);
    let wing = |offset: f64| {
        let a = angle + PI + offset;
        Point::<ViewSpace>::new(
            end.x + ARROW_HEAD_LENGTH * a.cos(),
            end.y + ARROW_HEAD_LENGTH * a.sin(),
        )
    };
    let left = wing(-ARROW_HEAD_HALF_ANGLE);
    let right = wing(ARROW_HEAD_HALF_ANGLE);
    Some(format!(
        "M {} {} L {} {} L {} {} Z",
        format_number(end.x),
        format_number(end.y),
        format_number(left.x),
        format_number(left.y),
        format_number(right.x),
        format_number(right.y)
    ))
}

fn arc_path(arc: &ArcShape<ViewSpace>) -> String {
    arc.path_data()
}

fn polyline_path(points: &[ViewPoint]) -> String {
    let mut d = String::new();
    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            d.push(' ');
        }
        d.push_str(if i == 0 { "M " } else { "L " });
        d.push_str(&format_number(point.x));
        d.push(' ');
        d.push_str(&format_number(point.y));
    }
    d
}

/// Closed outline made of outward scallops along every edge.
///
/// Scallops bulge outward when the outline runs clockwise on screen.
fn cloud_path(points: &[ViewPoint]) -> String {
    let mut d = format!("M {} {}", format_number(points[0].x), format_number(points[0].y));
    for (i, from) in points.iter().enumerate() {
        let to = &points[(i + 1) % points.len()];
        let length = from.distance_to(to);
        if length <= f64::EPSILON || !length.is_finite() {
            continue;
        }
        let count = (length / SCALLOP_LENGTH).ceil().clamp(1.0, MAX_SCALLOPS_PER_EDGE);
        let radius = length / count / 2.0;
        for step in 1..=count as usize {
            let t = step as f64 / count;
            let x = from.x + (to.x - from.x) * t;
            let y = from.y + (to.y - from.y) * t;
            d.push_str(&format!(
                " A {r} {r} 0 0 1 {} {}",
                format_number(x),
                format_number(y),
                r = format_number(radius)
            ));
        }
    }
    d.push_str(" Z");
    d
}

/// Drawables for one stored annotation at `zoom`.
///
/// Unknown kinds render nothing.
pub fn render_annotation(annotation: &Annotation, zoom: f64) -> Vec<Drawable> {
    if !annotation.kind().is_known() {
        return Vec::new();
    }
    let shape = annotation.geometry().to_view(zoom);
    let decorations = Decorations {
        content: annotation.content(),
        label: annotation.metrics().and_then(|m| m.text.as_deref()),
    };
    shape_primitives(annotation.kind(), &shape, annotation.style(), zoom, decorations)
        .into_iter()
        .map(|(primitive, paint)| Drawable {
            annotation_id: Some(annotation.id().clone()),
            primitive,
            paint,
        })
        .collect()
}

/// Drawables for every visible annotation on `page`, in paint order.
pub fn render_page<'a>(
    annotations: impl IntoIterator<Item = &'a Annotation>,
    page: u32,
    zoom: f64,
) -> Vec<Drawable> {
    annotations
        .into_iter()
        .filter(|a| a.page() == page && a.is_visible())
        .flat_map(|a| render_annotation(a, zoom))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RenderKey {
    revision: u64,
    page: u32,
    zoom: f64,
}

/// Cached page overlay
#[derive(Debug, Default)]
pub struct Overlay {
    key: Option<RenderKey>,
    drawables: Vec<Drawable>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-render if the collection, page or zoom changed since last time.
    ///
    /// Returns whether the drawables were recomputed.
    pub fn refresh(&mut self, collection: &AnnotationCollection, page: u32, zoom: f64) -> bool {
        let key = RenderKey { revision: collection.revision(), page, zoom };
        if self.key == Some(key) {
            return false;
        }
        self.drawables = render_page(collection.page_annotations(page), page, zoom);
        self.key = Some(key);
        log::trace!("overlay re-rendered: page {page}, zoom {zoom}, {} drawables", self.drawables.len());
        true
    }

    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }
}
