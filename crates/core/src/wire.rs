//! Conversion between typed annotations and the flat stored records.
//!
//! The flat `position` overloads `width`/`height` by kind; this is the only
//! module that knows the mapping.

use doc_model::{AnnotationRecord, PointRecord, PositionRecord};
use thiserror::Error;
use viewer_core::DocPoint;

use crate::annotation::{Annotation, AnnotationDraft, AnnotationType, Geometry};
use crate::shapes::{build_arc, ArcShape, Shape};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireError {
    #[error("{kind} annotation is missing position.{field}")]
    MissingField { kind: String, field: &'static str },
    #[error("stored annotation has no id")]
    MissingId,
    #[error("page numbers start at 1, got {0}")]
    InvalidPage(u32),
}

fn doc_point(record: PointRecord) -> DocPoint {
    DocPoint::new(record.x, record.y)
}

fn point_record(point: DocPoint) -> PointRecord {
    PointRecord::new(point.x, point.y)
}

fn missing(kind: &AnnotationType, field: &'static str) -> WireError {
    WireError::MissingField { kind: kind.to_string(), field }
}

/// Flatten geometry into the stored position layout
pub fn shape_to_position(shape: &Geometry) -> PositionRecord {
    match shape {
        Shape::Box { origin, width, height } => PositionRecord {
            x: origin.x,
            y: origin.y,
            width: *width,
            height: *height,
            ..Default::default()
        },
        Shape::Circle { center, radius } => PositionRecord {
            x: center.x,
            y: center.y,
            width: *radius,
            ..Default::default()
        },
        Shape::Ellipse { center, rx, ry } => PositionRecord {
            x: center.x,
            y: center.y,
            width: *rx,
            height: *ry,
            ..Default::default()
        },
        Shape::Segment { start, end } => PositionRecord {
            x: start.x,
            y: start.y,
            width: end.x,
            height: end.y,
            ..Default::default()
        },
        Shape::Arc(arc) => PositionRecord {
            x: arc.center.x,
            y: arc.center.y,
            center: Some(point_record(arc.center)),
            start_point: Some(point_record(arc.start)),
            end_point: Some(point_record(arc.end)),
            radius: Some(arc.radius),
            start_angle: Some(arc.start_angle),
            end_angle: Some(arc.end_angle),
            sweep_flag: Some(arc.sweep),
            large_arc_flag: Some(arc.large_arc),
            path_data: Some(arc.path_data()),
            ..Default::default()
        },
        Shape::Path { points } => {
            let (min_x, min_y, max_x, max_y) = shape.bounding_box();
            PositionRecord {
                x: min_x,
                y: min_y,
                width: max_x - min_x,
                height: max_y - min_y,
                points: Some(points.iter().copied().map(point_record).collect()),
                ..Default::default()
            }
        }
        Shape::Anchor { position } => {
            PositionRecord { x: position.x, y: position.y, ..Default::default() }
        }
    }
}

/// Rebuild typed geometry from a stored position
///
/// Unknown kinds get the closest lossless reading of whatever fields are
/// present so they can be written back unchanged in spirit.
pub fn shape_from_position(
    kind: &AnnotationType,
    position: &PositionRecord,
) -> Result<Geometry, WireError> {
    let origin = DocPoint::new(position.x, position.y);
    let shape = match kind {
        AnnotationType::Rectangle | AnnotationType::Highlight => {
            Shape::Box { origin, width: position.width, height: position.height }
        }
        AnnotationType::Circle => Shape::Circle { center: origin, radius: position.width },
        AnnotationType::Ellipse => {
            Shape::Ellipse { center: origin, rx: position.width, ry: position.height }
        }
        AnnotationType::Line
        | AnnotationType::Arrow
        | AnnotationType::Measurement
        | AnnotationType::Calibrate => Shape::Segment {
            start: origin,
            end: DocPoint::new(position.width, position.height),
        },
        AnnotationType::Arc => arc_from_position(kind, position)?,
        AnnotationType::Cloud | AnnotationType::Freehand | AnnotationType::Polyline => {
            let points = position.points.as_ref().ok_or_else(|| missing(kind, "points"))?;
            Shape::Path { points: points.iter().copied().map(doc_point).collect() }
        }
        AnnotationType::Text | AnnotationType::StickyNote => Shape::Anchor { position: origin },
        AnnotationType::Other(_) => {
            if let Some(points) = &position.points {
                Shape::Path { points: points.iter().copied().map(doc_point).collect() }
            } else if position.center.is_some() {
                arc_from_position(kind, position)?
            } else {
                Shape::Box { origin, width: position.width, height: position.height }
            }
        }
    };
    Ok(shape)
}

fn arc_from_position(kind: &AnnotationType, position: &PositionRecord) -> Result<Geometry, WireError> {
    let center = position.center.map(doc_point).ok_or_else(|| missing(kind, "center"))?;
    let start = position.start_point.map(doc_point).ok_or_else(|| missing(kind, "startPoint"))?;
    let end = position.end_point.map(doc_point).ok_or_else(|| missing(kind, "endPoint"))?;
    let sweep = position.sweep_flag.unwrap_or(true);

    // Derived fields missing from older records are recomputed
    let Shape::Arc(derived) = build_arc(center, start, end, sweep) else {
        return Err(missing(kind, "center"));
    };
    Ok(Shape::Arc(ArcShape {
        center,
        start,
        end,
        radius: position.radius.unwrap_or(derived.radius),
        start_angle: position.start_angle.unwrap_or(derived.start_angle),
        end_angle: position.end_angle.unwrap_or(derived.end_angle),
        sweep,
        large_arc: position.large_arc_flag.unwrap_or(derived.large_arc),
    }))
}

pub fn draft_to_record(draft: &AnnotationDraft) -> AnnotationRecord {
    AnnotationRecord {
        id: None,
        document_id: draft.document_id.clone(),
        page: draft.page,
        kind: draft.kind.clone(),
        position: shape_to_position(&draft.geometry),
        style: draft.style.clone(),
        content: draft.content.clone(),
        metrics: draft.metrics.clone(),
        is_visible: draft.is_visible,
        author: draft.author.clone(),
        created_at: None,
        updated_at: None,
    }
}

pub fn annotation_to_record(annotation: &Annotation) -> AnnotationRecord {
    AnnotationRecord {
        id: Some(annotation.id().clone()),
        created_at: annotation.created_at(),
        updated_at: annotation.updated_at(),
        ..draft_to_record(&annotation.to_draft())
    }
}

/// Read a record as a draft, ignoring any id it carries
pub fn draft_from_record(record: &AnnotationRecord) -> Result<AnnotationDraft, WireError> {
    if record.page == 0 {
        return Err(WireError::InvalidPage(record.page));
    }
    Ok(AnnotationDraft {
        document_id: record.document_id.clone(),
        page: record.page,
        kind: record.kind.clone(),
        geometry: shape_from_position(&record.kind, &record.position)?,
        style: record.style.clone(),
        content: record.content.clone(),
        metrics: record.metrics.clone(),
        is_visible: record.is_visible,
        author: record.author.clone(),
    })
}

/// Read a stored record; the id is required
pub fn annotation_from_record(record: &AnnotationRecord) -> Result<Annotation, WireError> {
    let id = record.id.clone().ok_or(WireError::MissingId)?;
    let draft = draft_from_record(record)?;
    Ok(Annotation::restore(id, draft, record.created_at, record.updated_at))
}
