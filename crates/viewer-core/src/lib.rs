//! Viewer math shared by the markup crates: coordinate spaces, the viewport
//! record with its double-click zoom cycle, and the page geometry seam to the
//! PDF backend.

pub mod coords;
pub mod page;
pub mod zoom;

pub use coords::{
    length_to_document, length_to_view, to_document_space, to_view_space, DocPoint,
    DocumentSpace, Point, Size, Space, ViewPoint, ViewSpace,
};
pub use page::{FixedPages, PageSource, PageSourceError};
pub use zoom::{
    next_cycle_zoom, plan_recenter, RecenterController, RecenterPlan, Rotation, ScrollOffset,
    Viewport, ViewportError, ZoomSettings, MAX_ZOOM, MIN_ZOOM, RECENTER_MAX_ZOOM,
};
