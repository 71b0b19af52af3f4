//! Document space and view space
//!
//! Document space is the zoom-independent, page-relative pixel grid that all
//! persisted geometry lives in (scale 1x, origin at the page's top-left,
//! y growing downward). View space is the same grid multiplied by the active
//! zoom and is only ever used for on-screen drawing.
//!
//! Points carry their space as a type parameter so a view-space value cannot
//! be persisted by accident.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Marker trait for a coordinate space.
pub trait Space: Copy + Clone + fmt::Debug + PartialEq + Default + 'static {
    const NAME: &'static str;
}

/// Zoom-independent page coordinates (storage representation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentSpace;

/// Zoom-scaled pixel coordinates (drawing representation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewSpace;

impl Space for DocumentSpace {
    const NAME: &'static str = "document";
}

impl Space for ViewSpace {
    const NAME: &'static str = "view";
}

/// A point tagged with its coordinate space.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Point<S: Space> {
    pub x: f64,
    pub y: f64,
    #[serde(skip)]
    space: PhantomData<S>,
}

pub type DocPoint = Point<DocumentSpace>;
pub type ViewPoint = Point<ViewSpace>;

impl<S: Space> Point<S> {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, space: PhantomData }
    }

    pub fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Euclidean distance to another point in the same space.
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl<S: Space> Default for Point<S> {
    fn default() -> Self {
        Self::origin()
    }
}

impl<S: Space> fmt::Debug for Point<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", S::NAME, self.x, self.y)
    }
}

impl<S: Space> From<(f64, f64)> for Point<S> {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Scale a document-space point into view space.
///
/// `zoom` must be positive; the viewport keeps it inside its bounds.
pub fn to_view_space(point: DocPoint, zoom: f64) -> ViewPoint {
    ViewPoint::new(point.x * zoom, point.y * zoom)
}

/// Bring a view-space point back to document space.
///
/// `zoom` must be positive; the viewport keeps it inside its bounds.
pub fn to_document_space(point: ViewPoint, zoom: f64) -> DocPoint {
    DocPoint::new(point.x / zoom, point.y / zoom)
}

/// Scale a length (radius, stroke width) into view space.
pub fn length_to_view(length: f64, zoom: f64) -> f64 {
    length * zoom
}

/// Bring a view-space length back to document space.
pub fn length_to_document(length: f64, zoom: f64) -> f64 {
    length / zoom
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A surface that has not been laid out yet measures zero on an axis.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}
