//! Drawing scale and measurement values
//!
//! A calibration maps document-space lengths to real-world units. It is
//! usually taken from a calibrate annotation drawn over a known distance.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use viewer_core::DocPoint;

use crate::annotation::{Annotation, AnnotationType, Geometry, Metrics};
use crate::draw::MetricsProvider;
use crate::shapes::Shape;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    #[error("scale must be a finite positive number, got {0}")]
    InvalidScale(f64),
    #[error("reference line has zero length")]
    ZeroLength,
    #[error("{0} annotation cannot calibrate a drawing")]
    NotACalibrationLine(String),
}

/// Document units per real-world unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calibration {
    units_per_real: f64,
    unit: String,
}

impl Calibration {
    /// Manual scale, e.g. 72 document units per inch
    pub fn manual(units_per_real: f64, unit: impl Into<String>) -> Result<Self, CalibrationError> {
        if !units_per_real.is_finite() || units_per_real <= 0.0 {
            return Err(CalibrationError::InvalidScale(units_per_real));
        }
        Ok(Self { units_per_real, unit: unit.into() })
    }

    /// Two-point calibration: the segment `p1`-`p2` measures `distance` real units
    pub fn from_reference(
        p1: DocPoint,
        p2: DocPoint,
        distance: f64,
        unit: impl Into<String>,
    ) -> Result<Self, CalibrationError> {
        let length = p1.distance_to(&p2);
        if length <= f64::EPSILON {
            return Err(CalibrationError::ZeroLength);
        }
        if !distance.is_finite() || distance <= 0.0 {
            return Err(CalibrationError::InvalidScale(distance));
        }
        Self::manual(length / distance, unit)
    }

    /// Calibrate from a stored calibrate annotation
    pub fn from_annotation(
        annotation: &Annotation,
        distance: f64,
        unit: impl Into<String>,
    ) -> Result<Self, CalibrationError> {
        match (annotation.kind(), annotation.geometry()) {
            (AnnotationType::Calibrate, Shape::Segment { start, end }) => {
                Self::from_reference(*start, *end, distance, unit)
            }
            (kind, _) => Err(CalibrationError::NotACalibrationLine(kind.to_string())),
        }
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn units_per_real(&self) -> f64 {
        self.units_per_real
    }

    pub fn to_real(&self, length: f64) -> f64 {
        length / self.units_per_real
    }

    pub fn area_to_real(&self, area: f64) -> f64 {
        area / (self.units_per_real * self.units_per_real)
    }

    fn length_metrics(&self, length: f64) -> Metrics {
        let real = self.to_real(length);
        Metrics {
            length: Some(real),
            length_px: Some(length),
            text: Some(format!("{real:.2} {}", self.unit)),
            ..Metrics::default()
        }
    }

    fn area_metrics(&self, area: f64, perimeter: f64) -> Metrics {
        let real = self.area_to_real(area);
        Metrics {
            area: Some(real),
            perimeter: Some(self.to_real(perimeter)),
            area_px: Some(area),
            text: Some(format!("{real:.2} {}²", self.unit)),
            ..Metrics::default()
        }
    }
}

fn polyline_length(points: &[DocPoint]) -> f64 {
    points.windows(2).map(|pair| pair[0].distance_to(&pair[1])).sum()
}

/// Shoelace area of a closed outline
fn polygon_area(points: &[DocPoint]) -> f64 {
    let n = points.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice.abs() / 2.0
}

/// Ramanujan's approximation of an ellipse perimeter
fn ellipse_perimeter(rx: f64, ry: f64) -> f64 {
    PI * (3.0 * (rx + ry) - ((3.0 * rx + ry) * (rx + 3.0 * ry)).sqrt())
}

impl MetricsProvider for Calibration {
    fn metrics(&self, kind: &AnnotationType, geometry: &Geometry) -> Option<Metrics> {
        let metrics = match (kind, geometry) {
            (AnnotationType::Measurement | AnnotationType::Calibrate, Shape::Segment { start, end }) => {
                self.length_metrics(start.distance_to(end))
            }
            (AnnotationType::Polyline, Shape::Path { points }) => {
                self.length_metrics(polyline_length(points))
            }
            (AnnotationType::Rectangle, Shape::Box { width, height, .. }) => {
                self.area_metrics(width * height, 2.0 * (width + height))
            }
            (AnnotationType::Cloud, Shape::Path { points }) if points.len() >= 3 => {
                let mut closed = points.clone();
                closed.push(points[0]);
                self.area_metrics(polygon_area(points), polyline_length(&closed))
            }
            (AnnotationType::Circle, Shape::Circle { radius, .. }) => Metrics {
                radius: Some(self.to_real(*radius)),
                ..self.area_metrics(PI * radius * radius, 2.0 * PI * radius)
            },
            (AnnotationType::Ellipse, Shape::Ellipse { rx, ry, .. }) => Metrics {
                rx: Some(self.to_real(*rx)),
                ry: Some(self.to_real(*ry)),
                ..self.area_metrics(PI * rx * ry, ellipse_perimeter(*rx, *ry))
            },
            _ => return None,
        };
        Some(metrics)
    }
}
