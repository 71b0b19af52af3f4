//! Shape builders
//!
//! A drag gesture is turned into geometry twice: repeatedly in view space for
//! the live preview, and once in document space when the pointer is
//! released. Both go through the same generic builders so the preview and the
//! stored annotation can never disagree on the arithmetic.
//!
//! Builders never validate. A zero-size drag yields a zero-size shape; it is
//! up to the caller to decide whether to keep it (see [`Shape::is_degenerate`]).

use doc_model::AnnotationType;
use viewer_core::{
    length_to_document, length_to_view, to_document_space, to_view_space, DocumentSpace, Point,
    Space, ViewSpace,
};

const DEGENERATE_EPSILON: f64 = 1e-9;

/// Format a coordinate for path data: at most three decimals, no `-0`.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_owned();
    }
    format!("{rounded}")
}

/// Circular arc from `start` to `end` around `center`.
///
/// Angles are in degrees, measured from the positive x axis with y pointing
/// down (so positive angles turn clockwise on screen, matching the SVG sweep
/// flag).
#[derive(Debug, Clone, PartialEq)]
pub struct ArcShape<S: Space> {
    pub center: Point<S>,
    pub start: Point<S>,
    pub end: Point<S>,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub sweep: bool,
    pub large_arc: bool,
}

impl<S: Space> ArcShape<S> {
    /// SVG path data for this arc.
    pub fn path_data(&self) -> String {
        format!(
            "M {} {} A {} {} 0 {} {} {} {}",
            format_number(self.start.x),
            format_number(self.start.y),
            format_number(self.radius),
            format_number(self.radius),
            u8::from(self.large_arc),
            u8::from(self.sweep),
            format_number(self.end.x),
            format_number(self.end.y)
        )
    }

    /// Angular extent travelled in the sweep direction, in degrees.
    pub fn extent(&self) -> f64 {
        let clockwise = (self.end_angle - self.start_angle).rem_euclid(360.0);
        if self.sweep {
            clockwise
        } else {
            (360.0 - clockwise).rem_euclid(360.0)
        }
    }
}

/// Annotation geometry as a tagged union.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape<S: Space> {
    /// Axis-aligned box from its top-left corner.
    Box { origin: Point<S>, width: f64, height: f64 },
    Circle { center: Point<S>, radius: f64 },
    Ellipse { center: Point<S>, rx: f64, ry: f64 },
    /// Line-like shapes: line, arrow, measurement, calibrate.
    Segment { start: Point<S>, end: Point<S> },
    Arc(ArcShape<S>),
    /// Ordered point list: freehand, polyline, cloud outline.
    Path { points: Vec<Point<S>> },
    /// Zero-size anchor for text and sticky notes.
    Anchor { position: Point<S> },
}

impl<S: Space> Shape<S> {
    fn map_space<T: Space>(
        &self,
        point: impl Fn(Point<S>) -> Point<T>,
        length: impl Fn(f64) -> f64,
    ) -> Shape<T> {
        match self {
            Shape::Box { origin, width, height } => {
                Shape::Box { origin: point(*origin), width: length(*width), height: length(*height) }
            }
            Shape::Circle { center, radius } => {
                Shape::Circle { center: point(*center), radius: length(*radius) }
            }
            Shape::Ellipse { center, rx, ry } => {
                Shape::Ellipse { center: point(*center), rx: length(*rx), ry: length(*ry) }
            }
            Shape::Segment { start, end } => Shape::Segment { start: point(*start), end: point(*end) },
            Shape::Arc(arc) => Shape::Arc(ArcShape {
                center: point(arc.center),
                start: point(arc.start),
                end: point(arc.end),
                radius: length(arc.radius),
                start_angle: arc.start_angle,
                end_angle: arc.end_angle,
                sweep: arc.sweep,
                large_arc: arc.large_arc,
            }),
            Shape::Path { points } => Shape::Path { points: points.iter().copied().map(point).collect() },
            Shape::Anchor { position } => Shape::Anchor { position: point(*position) },
        }
    }

    /// Bounding box as `(min_x, min_y, max_x, max_y)`.
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        match self {
            Shape::Box { origin, width, height } => {
                (origin.x, origin.y, origin.x + width, origin.y + height)
            }
            Shape::Circle { center, radius } => {
                (center.x - radius, center.y - radius, center.x + radius, center.y + radius)
            }
            Shape::Ellipse { center, rx, ry } => {
                (center.x - rx, center.y - ry, center.x + rx, center.y + ry)
            }
            Shape::Segment { start, end } => {
                (start.x.min(end.x), start.y.min(end.y), start.x.max(end.x), start.y.max(end.y))
            }
            // Conservative: the whole circle the arc lies on
            Shape::Arc(arc) => (
                arc.center.x - arc.radius,
                arc.center.y - arc.radius,
                arc.center.x + arc.radius,
                arc.center.y + arc.radius,
            ),
            Shape::Path { points } => {
                let Some(first) = points.first() else {
                    return (0.0, 0.0, 0.0, 0.0);
                };
                points.iter().skip(1).fold(
                    (first.x, first.y, first.x, first.y),
                    |(min_x, min_y, max_x, max_y), p| {
                        (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
                    },
                )
            }
            Shape::Anchor { position } => (position.x, position.y, position.x, position.y),
        }
    }

    /// True when the shape covers no area or length worth keeping.
    ///
    /// Anchors are never degenerate: text has no drag extent by nature.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Shape::Box { width, height, .. } => {
                width.abs() <= DEGENERATE_EPSILON || height.abs() <= DEGENERATE_EPSILON
            }
            Shape::Circle { radius, .. } => *radius <= DEGENERATE_EPSILON,
            Shape::Ellipse { rx, ry, .. } => *rx <= DEGENERATE_EPSILON || *ry <= DEGENERATE_EPSILON,
            Shape::Segment { start, end } => start.distance_to(end) <= DEGENERATE_EPSILON,
            Shape::Arc(arc) => arc.radius <= DEGENERATE_EPSILON,
            Shape::Path { points } => {
                let (min_x, min_y, max_x, max_y) = self.bounding_box();
                points.len() < 2
                    || (max_x - min_x <= DEGENERATE_EPSILON && max_y - min_y <= DEGENERATE_EPSILON)
            }
            Shape::Anchor { .. } => false,
        }
    }

    /// Check if a point is near this shape (within tolerance).
    ///
    /// Outlines hit on their stroke; boxes and anchors hit anywhere inside.
    pub fn contains_point(&self, point: &Point<S>, tolerance: f64) -> bool {
        match self {
            Shape::Segment { start, end } => point_near_segment(point, start, end, tolerance),
            Shape::Path { points } => {
                if points.len() == 1 {
                    return point.distance_to(&points[0]) <= tolerance;
                }
                points.windows(2).any(|pair| point_near_segment(point, &pair[0], &pair[1], tolerance))
            }
            Shape::Box { .. } | Shape::Anchor { .. } => {
                let (min_x, min_y, max_x, max_y) = self.bounding_box();
                point.x >= min_x - tolerance
                    && point.x <= max_x + tolerance
                    && point.y >= min_y - tolerance
                    && point.y <= max_y + tolerance
            }
            Shape::Circle { center, radius } => (point.distance_to(center) - radius).abs() <= tolerance,
            Shape::Ellipse { center, rx, ry } => {
                if *rx <= DEGENERATE_EPSILON || *ry <= DEGENERATE_EPSILON {
                    return point.distance_to(center) <= tolerance;
                }
                let dx = (point.x - center.x) / rx;
                let dy = (point.y - center.y) / ry;
                let dist = (dx * dx + dy * dy).sqrt();
                (dist - 1.0).abs() * rx.max(*ry) <= tolerance
            }
            Shape::Arc(arc) => {
                if (point.distance_to(&arc.center) - arc.radius).abs() > tolerance {
                    return false;
                }
                let angle = (point.y - arc.center.y).atan2(point.x - arc.center.x).to_degrees();
                let travelled = if arc.sweep {
                    (angle - arc.start_angle).rem_euclid(360.0)
                } else {
                    (arc.start_angle - angle).rem_euclid(360.0)
                };
                travelled <= arc.extent()
            }
        }
    }
}

impl Shape<DocumentSpace> {
    /// Scale stored geometry into view space for drawing.
    pub fn to_view(&self, zoom: f64) -> Shape<ViewSpace> {
        self.map_space(|p| to_view_space(p, zoom), |l| length_to_view(l, zoom))
    }
}

impl Shape<ViewSpace> {
    /// Bring on-screen geometry back to document space.
    pub fn to_document(&self, zoom: f64) -> Shape<DocumentSpace> {
        self.map_space(|p| to_document_space(p, zoom), |l| length_to_document(l, zoom))
    }
}

fn point_near_segment<S: Space>(
    point: &Point<S>,
    start: &Point<S>,
    end: &Point<S>,
    tolerance: f64,
) -> bool {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length_sq = dx * dx + dy * dy;

    if length_sq < 1e-12 {
        return point.distance_to(start) <= tolerance;
    }

    let t = (((point.x - start.x) * dx + (point.y - start.y) * dy) / length_sq).clamp(0.0, 1.0);
    let closest = Point::<S>::new(start.x + t * dx, start.y + t * dy);
    point.distance_to(&closest) <= tolerance
}

/// Rectangle and highlight: the box spanned by the two points, in any order.
pub fn build_box<S: Space>(anchor: Point<S>, current: Point<S>) -> Shape<S> {
    Shape::Box {
        origin: Point::new(anchor.x.min(current.x), anchor.y.min(current.y)),
        width: (current.x - anchor.x).abs(),
        height: (current.y - anchor.y).abs(),
    }
}

/// Circle centered on the drag start, not the drag midpoint.
pub fn build_circle<S: Space>(anchor: Point<S>, current: Point<S>) -> Shape<S> {
    Shape::Circle { center: anchor, radius: anchor.distance_to(&current) }
}

pub fn build_ellipse<S: Space>(anchor: Point<S>, current: Point<S>) -> Shape<S> {
    Shape::Ellipse {
        center: anchor,
        rx: (current.x - anchor.x).abs(),
        ry: (current.y - anchor.y).abs(),
    }
}

/// Line, arrow, measurement and calibrate.
pub fn build_segment<S: Space>(anchor: Point<S>, current: Point<S>) -> Shape<S> {
    Shape::Segment { start: anchor, end: current }
}

pub fn build_anchor<S: Space>(position: Point<S>) -> Shape<S> {
    Shape::Anchor { position }
}

pub fn build_path<S: Space>(points: &[Point<S>]) -> Shape<S> {
    Shape::Path { points: points.to_vec() }
}

/// Closed outline of the dragged box, clockwise from the top-left corner.
pub fn build_cloud<S: Space>(anchor: Point<S>, current: Point<S>) -> Shape<S> {
    let (min_x, max_x) = (anchor.x.min(current.x), anchor.x.max(current.x));
    let (min_y, max_y) = (anchor.y.min(current.y), anchor.y.max(current.y));
    Shape::Path {
        points: vec![
            Point::new(min_x, min_y),
            Point::new(max_x, min_y),
            Point::new(max_x, max_y),
            Point::new(min_x, max_y),
        ],
    }
}

/// Three-point arc. The radius comes from `start`; `end` only fixes the
/// direction and is projected onto the circle.
pub fn build_arc<S: Space>(
    center: Point<S>,
    start: Point<S>,
    end: Point<S>,
    sweep: bool,
) -> Shape<S> {
    let radius = center.distance_to(&start);
    let start_angle = (start.y - center.y).atan2(start.x - center.x);
    let end_angle = (end.y - center.y).atan2(end.x - center.x);
    let projected =
        Point::new(center.x + radius * end_angle.cos(), center.y + radius * end_angle.sin());

    let mut arc = ArcShape {
        center,
        start,
        end: projected,
        radius,
        start_angle: start_angle.to_degrees(),
        end_angle: end_angle.to_degrees(),
        sweep,
        large_arc: false,
    };
    arc.large_arc = arc.extent() > 180.0;
    Shape::Arc(arc)
}

/// Drag gesture arc: a clockwise half circle over the dragged chord.
pub fn build_drag_arc<S: Space>(anchor: Point<S>, current: Point<S>) -> Shape<S> {
    build_arc(anchor.midpoint(&current), anchor, current, true)
}

/// Build the shape for one annotation kind from a gesture.
///
/// `trail` is the ordered point list collected so far for freehand and
/// polyline; other kinds only look at `anchor` and `current`. Returns `None`
/// for kinds that have no builder.
pub fn build_shape<S: Space>(
    kind: &AnnotationType,
    anchor: Point<S>,
    current: Point<S>,
    trail: &[Point<S>],
) -> Option<Shape<S>> {
    let shape = match kind {
        AnnotationType::Rectangle | AnnotationType::Highlight => build_box(anchor, current),
        AnnotationType::Circle => build_circle(anchor, current),
        AnnotationType::Ellipse => build_ellipse(anchor, current),
        AnnotationType::Line
        | AnnotationType::Arrow
        | AnnotationType::Measurement
        | AnnotationType::Calibrate => build_segment(anchor, current),
        AnnotationType::Text | AnnotationType::StickyNote => build_anchor(anchor),
        AnnotationType::Arc => build_drag_arc(anchor, current),
        AnnotationType::Cloud => build_cloud(anchor, current),
        AnnotationType::Freehand | AnnotationType::Polyline => build_path(trail),
        AnnotationType::Other(_) => return None,
    };
    Some(shape)
}
